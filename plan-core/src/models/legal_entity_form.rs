use serde::{Deserialize, Serialize};

/// A registered business structure (OPF) and the tax regimes it may use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalEntityForm {
    pub code: String,
    pub title: String,
    pub source_url: Option<String>,
    /// Regime codes in catalog order. Empty means "any regime the snapshot knows".
    pub allowed_tax_regimes: Vec<String>,
}
