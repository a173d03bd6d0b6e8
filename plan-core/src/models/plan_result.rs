use rust_decimal::Decimal;
use serde::Serialize;

use super::{CalculationInputs, LegalEntityForm, RegulatorySnapshot, TaxRegime};

/// Profit per sale for a given number of sales per day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalesRow {
    pub sales_per_day: u32,
    pub profit_per_sale: Decimal,
    pub monthly_sales: u64,
    pub yearly_sales: u64,
}

/// Revenue required to reach the profit target at a given margin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfitabilityRow {
    pub margin: u32,
    pub monthly_revenue: Decimal,
    pub yearly_revenue: Decimal,
}

/// Revenue and tax figures under a single tax regime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxProjection {
    /// Effective rate after clamping.
    pub rate: Decimal,
    pub rate_percent: Decimal,
    pub tax_daily: Decimal,
    pub tax_monthly: Decimal,
    pub tax_yearly: Decimal,
    pub daily_revenue: Decimal,
    pub monthly_revenue: Decimal,
    pub yearly_revenue: Decimal,
}

/// A [`TaxProjection`] labelled with the regime it was computed for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxRow {
    pub code: String,
    pub title: String,
    pub law_reference: Option<String>,
    pub source_url: Option<String>,
    pub note: Option<String>,
    #[serde(flatten)]
    pub projection: TaxProjection,
}

/// Everything computed for one plan request.
///
/// Borrows the regulatory data from the snapshot it was calculated against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanResult<'a> {
    /// Inputs after sanitization.
    pub inputs: CalculationInputs,
    pub margin_ratio: Decimal,
    pub daily_profit_target: Decimal,
    pub daily_operational_cost: Decimal,
    pub monthly_operational_cost: Decimal,
    pub pre_tax_monthly_base: Decimal,
    pub pre_tax_daily_base: Decimal,
    pub yearly_profit_goal: Decimal,
    pub sales_breakdown: Vec<SalesRow>,
    pub profitability_rows: Vec<ProfitabilityRow>,
    #[serde(rename = "regulatory_snapshot")]
    pub snapshot: &'a RegulatorySnapshot,
    pub selected_entity_form: Option<&'a LegalEntityForm>,
    pub selected_tax_code: Option<String>,
    pub selected_tax_regime: Option<&'a TaxRegime>,
    /// Candidate codes as listed by the entity form, resolvable or not.
    pub available_tax_codes: Vec<String>,
    pub available_tax_regimes: Vec<&'a TaxRegime>,
    pub tax_projection: Option<TaxProjection>,
    pub tax_rows: Vec<TaxRow>,
}

impl PlanResult<'_> {
    /// Rate of the selected regime in percent, if a regime was selected.
    pub fn tax_rate_percent(&self) -> Option<Decimal> {
        self.tax_projection
            .as_ref()
            .map(|projection| projection.rate_percent)
    }
}
