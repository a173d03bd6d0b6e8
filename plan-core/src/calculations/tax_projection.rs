//! Per-regime tax projections.
//!
//! Tax is extracted so that the target profit survives it:
//!
//! | Basis              | Daily revenue                          | Daily tax                 |
//! |--------------------|----------------------------------------|---------------------------|
//! | revenue, patent    | `(profit + cost) / (1 - rate)`         | `revenue × rate`          |
//! | profit, income     | `cost + profit / (1 - rate)`           | `profit / (1 - rate) × rate` |
//!
//! Monthly figures multiply by the working days, yearly figures by twelve months.

use rust_decimal::Decimal;
use tracing::trace;

use super::common::safe_divisor;
use super::plan::MONTHS_PER_YEAR;
use crate::{RegulatorySnapshot, TaxProjection, TaxRegime, TaxRow};

/// Projects revenue and tax for one regime.
///
/// Returns `None` when no regime is given.
///
/// ```
/// use plan_core::calculations::build_tax_projection;
/// use plan_core::{TaxBasis, TaxRegime};
/// use rust_decimal_macros::dec;
///
/// let regime = TaxRegime {
///     code: "TEST".to_string(),
///     title: "Test".to_string(),
///     effective_rate: dec!(0.20),
///     law_reference: None,
///     basis: TaxBasis::Revenue,
///     source_url: None,
///     note: None,
/// };
///
/// let projection = build_tax_projection(dec!(5000), dec!(3000), 30, Some(&regime)).unwrap();
///
/// assert_eq!(projection.daily_revenue, dec!(10000));
/// assert_eq!(projection.tax_daily, dec!(2000));
/// assert_eq!(projection.rate_percent, dec!(20));
/// ```
pub fn build_tax_projection(
    daily_profit: Decimal,
    daily_operational_cost: Decimal,
    days_in_month: u32,
    regime: Option<&TaxRegime>,
) -> Option<TaxProjection> {
    let regime = regime?;
    let rate = regime.clamped_rate();
    let divisor = safe_divisor(rate);

    let (daily_revenue, tax_daily) = if regime.basis.is_revenue_like() {
        let daily_revenue = (daily_profit + daily_operational_cost) / divisor;
        (daily_revenue, daily_revenue * rate)
    } else {
        let profit_before_tax = daily_profit / divisor;
        (daily_operational_cost + profit_before_tax, profit_before_tax * rate)
    };

    let days = Decimal::from(days_in_month);
    let months = Decimal::from(MONTHS_PER_YEAR);
    let tax_monthly = tax_daily * days;

    trace!(code = %regime.code, %rate, basis = %regime.basis, %daily_revenue, %tax_daily, "tax projection");

    Some(TaxProjection {
        rate,
        rate_percent: rate * Decimal::ONE_HUNDRED,
        tax_daily,
        tax_monthly,
        tax_yearly: tax_monthly * months,
        daily_revenue,
        monthly_revenue: daily_revenue * days,
        yearly_revenue: daily_revenue * days * months,
    })
}

/// Projects every listed regime side by side, skipping codes the snapshot does not know.
pub fn build_tax_rows<S: AsRef<str>>(
    daily_profit: Decimal,
    daily_operational_cost: Decimal,
    days_in_month: u32,
    regime_codes: &[S],
    snapshot: &RegulatorySnapshot,
) -> Vec<TaxRow> {
    regime_codes
        .iter()
        .filter_map(|code| snapshot.lookup_tax_regime(Some(code.as_ref())))
        .filter_map(|regime| {
            let projection = build_tax_projection(
                daily_profit,
                daily_operational_cost,
                days_in_month,
                Some(regime),
            )?;
            Some(TaxRow {
                code: regime.code.clone(),
                title: regime.title.clone(),
                law_reference: regime.law_reference.clone(),
                source_url: regime.source_url.clone(),
                note: regime.note.clone(),
                projection,
            })
        })
        .collect()
}
