use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::input::{
    DEFAULT_DAYS_IN_MONTH, DEFAULT_MARGIN_PERCENT, DEFAULT_MONTHLY_PROFIT, MAX_MARGIN_PERCENT,
    parse_decimal_input, parse_margin_percent, parse_positive_int,
};

/// Largest monthly profit target the calculator accepts; larger targets are capped.
pub const MAX_MONTHLY_PROFIT: Decimal = dec!(1000000000000);

/// Smallest margin the calculator accepts; smaller positive margins are raised to it.
pub const MIN_MARGIN_PERCENT: Decimal = dec!(0.01);

/// Unparsed caller input, e.g. query parameters or command-line flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawInputs {
    pub monthly_profit: Option<String>,
    pub days_in_month: Option<String>,
    pub margin_percent: Option<String>,
    pub entity_form_code: Option<String>,
    pub tax_regime_code: Option<String>,
}

/// Validated numeric inputs for a plan calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationInputs {
    pub monthly_profit_target: Decimal,
    pub days_in_month: u32,
    /// Profit as a percentage of revenue, in `(0, 99.9]`.
    pub margin_percent: Decimal,
    pub entity_form_code: Option<String>,
    pub tax_regime_code: Option<String>,
}

impl Default for CalculationInputs {
    fn default() -> Self {
        Self {
            monthly_profit_target: DEFAULT_MONTHLY_PROFIT,
            days_in_month: DEFAULT_DAYS_IN_MONTH,
            margin_percent: DEFAULT_MARGIN_PERCENT,
            entity_form_code: None,
            tax_regime_code: None,
        }
    }
}

impl CalculationInputs {
    /// Parses raw values, replacing anything invalid or missing with its default.
    ///
    /// ```
    /// use plan_core::{CalculationInputs, RawInputs};
    /// use rust_decimal_macros::dec;
    ///
    /// let inputs = CalculationInputs::from_raw(RawInputs {
    ///     monthly_profit: Some("200 000".to_string()),
    ///     days_in_month: Some("-2".to_string()),
    ///     margin_percent: Some("250".to_string()),
    ///     ..Default::default()
    /// });
    ///
    /// assert_eq!(inputs.monthly_profit_target, dec!(200000));
    /// assert_eq!(inputs.days_in_month, 30);
    /// assert_eq!(inputs.margin_percent, dec!(99.9));
    /// ```
    pub fn from_raw(raw: RawInputs) -> Self {
        Self {
            monthly_profit_target: parse_decimal_input(
                raw.monthly_profit.as_deref(),
                DEFAULT_MONTHLY_PROFIT,
            ),
            days_in_month: parse_positive_int(raw.days_in_month.as_deref(), DEFAULT_DAYS_IN_MONTH),
            margin_percent: parse_margin_percent(raw.margin_percent.as_deref()),
            entity_form_code: non_blank(raw.entity_form_code),
            tax_regime_code: non_blank(raw.tax_regime_code),
        }
        .sanitized()
    }

    /// Re-applies the leniency rules to already typed values.
    ///
    /// Non-positive figures fall back to their defaults, margins are kept in
    /// `[0.01, 99.9]` and the profit target is capped at [`MAX_MONTHLY_PROFIT`]
    /// so that every derived figure stays inside the decimal range.
    pub fn sanitized(self) -> Self {
        let monthly_profit_target = if self.monthly_profit_target <= Decimal::ZERO {
            DEFAULT_MONTHLY_PROFIT
        } else {
            self.monthly_profit_target.min(MAX_MONTHLY_PROFIT)
        };

        let days_in_month = if self.days_in_month == 0 {
            DEFAULT_DAYS_IN_MONTH
        } else {
            self.days_in_month
        };

        let margin_percent = if self.margin_percent <= Decimal::ZERO {
            DEFAULT_MARGIN_PERCENT
        } else {
            self.margin_percent.clamp(MIN_MARGIN_PERCENT, MAX_MARGIN_PERCENT)
        };

        Self {
            monthly_profit_target,
            days_in_month,
            margin_percent,
            entity_form_code: non_blank(self.entity_form_code),
            tax_regime_code: non_blank(self.tax_regime_code),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
