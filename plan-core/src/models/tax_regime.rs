use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound applied to every effective rate before it is used.
pub const MAX_EFFECTIVE_RATE: Decimal = dec!(0.99);

/// Returned when a basis string names none of the supported tax bases.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown tax basis '{0}'")]
pub struct UnknownTaxBasis(pub String);

/// The accounting quantity a tax regime's rate is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxBasis {
    Revenue,
    Profit,
    Income,
    Patent,
}

impl TaxBasis {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Revenue => "revenue",
            Self::Profit => "profit",
            Self::Income => "income",
            Self::Patent => "patent",
        }
    }

    /// Whether the rate is levied on the whole revenue rather than on profit.
    ///
    /// Patent regimes share the revenue formula: the assessed potential income
    /// is approximated by the derived revenue.
    pub fn is_revenue_like(&self) -> bool {
        matches!(self, Self::Revenue | Self::Patent)
    }
}

impl FromStr for TaxBasis {
    type Err = UnknownTaxBasis;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "revenue" => Ok(Self::Revenue),
            "profit" => Ok(Self::Profit),
            "income" => Ok(Self::Income),
            "patent" => Ok(Self::Patent),
            _ => Err(UnknownTaxBasis(s.to_string())),
        }
    }
}

impl fmt::Display for TaxBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named taxation scheme with a flat effective rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRegime {
    pub code: String,
    pub title: String,
    /// Rate as supplied by the catalog; see [`TaxRegime::clamped_rate`].
    pub effective_rate: Decimal,
    pub law_reference: Option<String>,
    pub basis: TaxBasis,
    pub source_url: Option<String>,
    pub note: Option<String>,
}

impl TaxRegime {
    /// The effective rate clamped into `[0, 0.99]`.
    ///
    /// ```
    /// use plan_core::{TaxBasis, TaxRegime};
    /// use rust_decimal_macros::dec;
    ///
    /// let regime = TaxRegime {
    ///     code: "BROKEN".to_string(),
    ///     title: "Broken".to_string(),
    ///     effective_rate: dec!(1.5),
    ///     law_reference: None,
    ///     basis: TaxBasis::Revenue,
    ///     source_url: None,
    ///     note: None,
    /// };
    ///
    /// assert_eq!(regime.clamped_rate(), dec!(0.99));
    /// ```
    pub fn clamped_rate(&self) -> Decimal {
        self.effective_rate.clamp(Decimal::ZERO, MAX_EFFECTIVE_RATE)
    }
}
