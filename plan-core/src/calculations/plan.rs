//! Business plan calculation.
//!
//! Derives the figures a small business needs to reach a monthly profit
//! target, given the number of working days and the expected margin.
//!
//! # Derived Figures
//!
//! | Figure                     | Formula |
//! |----------------------------|---------|
//! | margin ratio               | `margin_percent / 100` |
//! | daily profit target        | `monthly_profit / days` |
//! | monthly operational cost   | `monthly_profit × (1 / margin_ratio − 1)` |
//! | daily operational cost     | `monthly_operational_cost / days` |
//! | pre-tax monthly base       | `monthly_profit + monthly_operational_cost` |
//! | pre-tax daily base         | `daily_profit + daily_operational_cost` |
//! | yearly profit goal         | `monthly_profit × 12` |
//!
//! Margin is profit over revenue, so the pre-tax monthly base is the implied
//! monthly revenue.
//!
//! # Example
//!
//! ```
//! use plan_core::{CalculationInputs, PlanCalculator, normalize_snapshot};
//! use rust_decimal_macros::dec;
//! use serde_json::json;
//!
//! let snapshot = normalize_snapshot(&json!({}));
//! let calculator = PlanCalculator::new(&snapshot);
//!
//! let result = calculator.calculate(&CalculationInputs {
//!     monthly_profit_target: dec!(150000),
//!     days_in_month: 30,
//!     margin_percent: dec!(30),
//!     entity_form_code: Some("OOO".to_string()),
//!     tax_regime_code: Some("USN_15".to_string()),
//! });
//!
//! assert_eq!(result.daily_profit_target, dec!(5000));
//! assert_eq!(result.selected_tax_code.as_deref(), Some("USN_15"));
//! assert_eq!(result.tax_rows.len(), 3);
//! ```

use std::ops::RangeInclusive;

use rust_decimal::Decimal;
use tracing::debug;

use super::tax_projection::{build_tax_projection, build_tax_rows};
use crate::{
    CalculationInputs, LegalEntityForm, PlanResult, ProfitabilityRow, RegulatorySnapshot,
    SalesRow, TaxRegime,
};

pub const MONTHS_PER_YEAR: u32 = 12;

/// Sales-per-day counts covered by the sales breakdown.
pub const SALES_PER_DAY_RANGE: RangeInclusive<u32> = 1..=10;

/// Margins, in percent, swept by the profitability table.
pub const PROFITABILITY_MARGINS: RangeInclusive<u32> = 10..=80;
pub const PROFITABILITY_MARGIN_STEP: usize = 5;

/// The tax regimes an entity form can choose from, and the one chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegimeSelection<'a> {
    /// Candidate codes, including any the snapshot cannot resolve.
    pub available_codes: Vec<String>,
    pub available_regimes: Vec<&'a TaxRegime>,
    pub selected_code: Option<String>,
    pub selected: Option<&'a TaxRegime>,
}

/// Resolves the candidate regimes of `entity_form` and picks the requested one.
///
/// Candidates are the form's allowed regimes, or every regime in the snapshot
/// when the form lists none (or there is no form). The requested code wins if
/// it resolves among the candidates; otherwise the first resolvable candidate
/// is selected.
pub fn resolve_tax_regimes<'a>(
    snapshot: &'a RegulatorySnapshot,
    entity_form: Option<&LegalEntityForm>,
    requested_code: Option<&str>,
) -> RegimeSelection<'a> {
    let available_codes = match entity_form {
        Some(form) if !form.allowed_tax_regimes.is_empty() => form.allowed_tax_regimes.clone(),
        _ => snapshot.tax_regime_codes(),
    };

    let available_regimes: Vec<&TaxRegime> = available_codes
        .iter()
        .filter_map(|code| snapshot.lookup_tax_regime(Some(code.as_str())))
        .collect();

    let selected = requested_code
        .and_then(|code| available_regimes.iter().find(|regime| regime.code == code))
        .or_else(|| available_regimes.first())
        .copied();

    RegimeSelection {
        selected_code: selected.map(|regime| regime.code.clone()),
        available_codes,
        available_regimes,
        selected,
    }
}

/// Calculator for business plans against a fixed regulatory snapshot.
#[derive(Debug, Clone, Copy)]
pub struct PlanCalculator<'a> {
    snapshot: &'a RegulatorySnapshot,
}

impl<'a> PlanCalculator<'a> {
    pub fn new(snapshot: &'a RegulatorySnapshot) -> Self {
        Self { snapshot }
    }

    /// Calculates the complete plan.
    ///
    /// Inputs are sanitized first, so this never fails: out-of-range values
    /// fall back to their defaults and a missing regime only leaves the tax
    /// projection empty.
    pub fn calculate(
        &self,
        inputs: &CalculationInputs,
    ) -> PlanResult<'a> {
        let inputs = inputs.clone().sanitized();
        let monthly_profit = inputs.monthly_profit_target;
        let days = Decimal::from(inputs.days_in_month);
        let months = Decimal::from(MONTHS_PER_YEAR);

        let selected_entity_form = self
            .snapshot
            .lookup_entity_form(inputs.entity_form_code.as_deref());
        let selection = resolve_tax_regimes(
            self.snapshot,
            selected_entity_form,
            inputs.tax_regime_code.as_deref(),
        );

        let margin_ratio = inputs.margin_percent / Decimal::ONE_HUNDRED;
        let daily_profit_target = monthly_profit / days;
        let monthly_operational_cost = monthly_profit * (Decimal::ONE / margin_ratio - Decimal::ONE);
        let daily_operational_cost = monthly_operational_cost / days;

        let tax_projection = build_tax_projection(
            daily_profit_target,
            daily_operational_cost,
            inputs.days_in_month,
            selection.selected,
        );
        let tax_rows = build_tax_rows(
            daily_profit_target,
            daily_operational_cost,
            inputs.days_in_month,
            &selection.available_codes,
            self.snapshot,
        );

        debug!(
            entity_form = ?selected_entity_form.map(|form| &form.code),
            tax_regime = ?selection.selected_code,
            candidates = selection.available_codes.len(),
            "calculated business plan"
        );

        PlanResult {
            margin_ratio,
            daily_profit_target,
            daily_operational_cost,
            monthly_operational_cost,
            pre_tax_monthly_base: monthly_profit + monthly_operational_cost,
            pre_tax_daily_base: daily_profit_target + daily_operational_cost,
            yearly_profit_goal: monthly_profit * months,
            sales_breakdown: sales_breakdown(daily_profit_target, inputs.days_in_month),
            profitability_rows: profitability_rows(monthly_profit),
            snapshot: self.snapshot,
            selected_entity_form,
            selected_tax_code: selection.selected_code,
            selected_tax_regime: selection.selected,
            available_tax_codes: selection.available_codes,
            available_tax_regimes: selection.available_regimes,
            tax_projection,
            tax_rows,
            inputs,
        }
    }
}

/// Calculates a plan in one call; see [`PlanCalculator::calculate`].
pub fn compute_plan<'a>(
    inputs: &CalculationInputs,
    snapshot: &'a RegulatorySnapshot,
) -> PlanResult<'a> {
    PlanCalculator::new(snapshot).calculate(inputs)
}

/// Profit each sale must bring for one to ten sales a day.
fn sales_breakdown(
    daily_profit_target: Decimal,
    days_in_month: u32,
) -> Vec<SalesRow> {
    SALES_PER_DAY_RANGE
        .map(|sales_per_day| {
            let monthly_sales = u64::from(sales_per_day) * u64::from(days_in_month);
            SalesRow {
                sales_per_day,
                profit_per_sale: daily_profit_target / Decimal::from(sales_per_day),
                monthly_sales,
                yearly_sales: monthly_sales * u64::from(MONTHS_PER_YEAR),
            }
        })
        .collect()
}

/// Revenue needed at margins from 10% to 80%, independent of the chosen margin.
fn profitability_rows(monthly_profit: Decimal) -> Vec<ProfitabilityRow> {
    PROFITABILITY_MARGINS
        .step_by(PROFITABILITY_MARGIN_STEP)
        .map(|margin| {
            let monthly_revenue = monthly_profit / (Decimal::from(margin) / Decimal::ONE_HUNDRED);
            ProfitabilityRow {
                margin,
                monthly_revenue,
                yearly_revenue: monthly_revenue * Decimal::from(MONTHS_PER_YEAR),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;
    use crate::calculations::common::round_dp_half_up;
    use crate::normalize_snapshot;

    fn default_snapshot() -> RegulatorySnapshot {
        normalize_snapshot(&json!({}))
    }

    fn inputs(
        entity_form_code: Option<&str>,
        tax_regime_code: Option<&str>,
    ) -> CalculationInputs {
        CalculationInputs {
            entity_form_code: entity_form_code.map(str::to_string),
            tax_regime_code: tax_regime_code.map(str::to_string),
            ..Default::default()
        }
    }

    // =========================================================================
    // core figures
    // =========================================================================

    #[test]
    fn default_inputs_produce_expected_core_figures() {
        let snapshot = default_snapshot();
        let result = compute_plan(&CalculationInputs::default(), &snapshot);

        assert_eq!(result.margin_ratio, dec!(0.3));
        assert_eq!(result.daily_profit_target, dec!(5000));
        assert_eq!(round_dp_half_up(result.monthly_operational_cost, 0), dec!(350000));
        assert_eq!(round_dp_half_up(result.daily_operational_cost, 2), dec!(11666.67));
        assert_eq!(round_dp_half_up(result.pre_tax_monthly_base, 0), dec!(500000));
        assert_eq!(round_dp_half_up(result.pre_tax_daily_base, 2), dec!(16666.67));
        assert_eq!(result.yearly_profit_goal, dec!(1800000));
    }

    #[test]
    fn calculate_sanitizes_invalid_inputs() {
        let snapshot = default_snapshot();
        let result = compute_plan(
            &CalculationInputs {
                monthly_profit_target: dec!(-10),
                days_in_month: 0,
                margin_percent: dec!(0),
                entity_form_code: None,
                tax_regime_code: None,
            },
            &snapshot,
        );

        assert_eq!(result.inputs, CalculationInputs::default());
        assert_eq!(result.daily_profit_target, dec!(5000));
    }

    // =========================================================================
    // sales breakdown and profitability
    // =========================================================================

    #[test]
    fn sales_breakdown_has_ten_ascending_rows() {
        let snapshot = default_snapshot();
        let result = compute_plan(&CalculationInputs::default(), &snapshot);

        let counts: Vec<_> = result.sales_breakdown.iter().map(|row| row.sales_per_day).collect();
        assert_eq!(counts, (1..=10u32).collect::<Vec<_>>());

        let fourth = &result.sales_breakdown[3];
        assert_eq!(fourth.profit_per_sale, dec!(1250));
        assert_eq!(fourth.monthly_sales, 120);
        assert_eq!(fourth.yearly_sales, 1440);
    }

    #[test]
    fn profitability_table_sweeps_margins() {
        let snapshot = default_snapshot();
        let result = compute_plan(&CalculationInputs::default(), &snapshot);

        let margins: Vec<_> = result.profitability_rows.iter().map(|row| row.margin).collect();
        assert_eq!(margins, (10..=80u32).step_by(5).collect::<Vec<_>>());
        assert_eq!(margins.len(), 15);

        let first = &result.profitability_rows[0];
        assert_eq!(first.monthly_revenue, dec!(1500000));
        assert_eq!(first.yearly_revenue, dec!(18000000));
    }

    // =========================================================================
    // regime selection
    // =========================================================================

    #[test]
    fn unknown_entity_form_falls_back_to_first_form() {
        let snapshot = default_snapshot();
        let result = compute_plan(&inputs(Some("ZAO"), None), &snapshot);

        assert_eq!(result.selected_entity_form.unwrap().code, "IP");
        assert_eq!(result.selected_tax_code.as_deref(), Some("USN_6"));
        assert_eq!(
            result.available_tax_codes,
            vec!["USN_6", "USN_15", "PSN", "AUSN", "OSN_IP"]
        );
        assert_eq!(result.tax_rows.len(), 5);
    }

    #[test]
    fn requested_regime_is_selected_when_allowed() {
        let snapshot = default_snapshot();
        let result = compute_plan(&inputs(Some("OOO"), Some("OSN_OOO")), &snapshot);

        assert_eq!(result.selected_tax_regime.unwrap().code, "OSN_OOO");
        assert_eq!(result.tax_rate_percent(), Some(dec!(20)));
    }

    #[test]
    fn requested_regime_outside_form_falls_back_to_first_candidate() {
        let snapshot = default_snapshot();
        let result = compute_plan(&inputs(Some("OOO"), Some("PSN")), &snapshot);

        assert_eq!(result.selected_tax_code.as_deref(), Some("USN_6"));
    }

    #[test]
    fn selected_projection_matches_its_tax_row() {
        let snapshot = default_snapshot();
        let result = compute_plan(&inputs(Some("IP"), Some("PSN")), &snapshot);

        let row = result.tax_rows.iter().find(|row| row.code == "PSN").unwrap();
        assert_eq!(result.tax_projection.as_ref(), Some(&row.projection));
    }

    #[test]
    fn form_without_allowed_regimes_offers_every_regime() {
        let snapshot = normalize_snapshot(&json!({"opf": [{"code": "NKO"}]}));
        let result = compute_plan(&inputs(None, Some("AUSN")), &snapshot);

        assert_eq!(result.available_tax_codes, snapshot.tax_regime_codes());
        assert_eq!(result.selected_tax_code.as_deref(), Some("AUSN"));
    }

    #[test]
    fn unresolvable_candidates_leave_projection_empty() {
        let snapshot = normalize_snapshot(&json!({
            "opf": [{"code": "X", "tax_systems": ["GONE", "ALSO_GONE"]}]
        }));
        let result = compute_plan(&inputs(Some("X"), Some("GONE")), &snapshot);

        assert_eq!(result.available_tax_codes, vec!["GONE", "ALSO_GONE"]);
        assert!(result.available_tax_regimes.is_empty());
        assert_eq!(result.selected_tax_code, None);
        assert_eq!(result.selected_tax_regime, None);
        assert_eq!(result.tax_projection, None);
        assert_eq!(result.tax_rate_percent(), None);
        assert!(result.tax_rows.is_empty());
    }

    #[test]
    fn resolve_tax_regimes_without_form_uses_whole_snapshot() {
        let snapshot = default_snapshot();

        let selection = resolve_tax_regimes(&snapshot, None, None);

        assert_eq!(selection.available_codes, snapshot.tax_regime_codes());
        assert_eq!(selection.selected_code.as_deref(), Some("OSN_OOO"));
    }
}
