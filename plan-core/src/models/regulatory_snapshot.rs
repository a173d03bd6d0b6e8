use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use super::{LegalEntityForm, TaxRegime};

/// A fully defaulted copy of the regulatory catalog used for one calculation.
///
/// Built by [`crate::regulations::normalize_snapshot`]; never mutated afterwards.
/// Tax regimes keep the order in which the catalog listed them, since the
/// first candidate regime becomes the default selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegulatorySnapshot {
    checked_at: Option<DateTime<FixedOffset>>,
    legal_entity_forms: Vec<LegalEntityForm>,
    tax_regimes: Vec<TaxRegime>,
    default_entity_form_code: String,
    sources: BTreeMap<String, String>,
}

impl RegulatorySnapshot {
    /// Assembles a snapshot from already normalized parts.
    ///
    /// Later regimes replace earlier ones with the same code, keeping the
    /// position of the first occurrence.
    pub(crate) fn new(
        checked_at: Option<DateTime<FixedOffset>>,
        legal_entity_forms: Vec<LegalEntityForm>,
        tax_regimes: impl IntoIterator<Item = TaxRegime>,
        default_entity_form_code: String,
        sources: BTreeMap<String, String>,
    ) -> Self {
        let mut unique: Vec<TaxRegime> = Vec::new();
        for regime in tax_regimes {
            match unique.iter_mut().find(|existing| existing.code == regime.code) {
                Some(existing) => *existing = regime,
                None => unique.push(regime),
            }
        }

        Self {
            checked_at,
            legal_entity_forms,
            tax_regimes: unique,
            default_entity_form_code,
            sources,
        }
    }

    pub fn checked_at(&self) -> Option<DateTime<FixedOffset>> {
        self.checked_at
    }

    pub fn legal_entity_forms(&self) -> &[LegalEntityForm] {
        &self.legal_entity_forms
    }

    pub fn tax_regimes(&self) -> &[TaxRegime] {
        &self.tax_regimes
    }

    pub fn tax_regime_codes(&self) -> Vec<String> {
        self.tax_regimes.iter().map(|regime| regime.code.clone()).collect()
    }

    pub fn default_entity_form_code(&self) -> &str {
        &self.default_entity_form_code
    }

    /// Upstream catalog URLs keyed by catalog name (`opf`, `tax_systems`).
    pub fn sources(&self) -> &BTreeMap<String, String> {
        &self.sources
    }

    /// Finds an entity form by code.
    ///
    /// An empty or unknown code falls back to the first form in the catalog;
    /// `None` only when the catalog has no forms at all.
    pub fn lookup_entity_form(&self, code: Option<&str>) -> Option<&LegalEntityForm> {
        let first = self.legal_entity_forms.first()?;
        match code.filter(|code| !code.is_empty()) {
            Some(code) => Some(
                self.legal_entity_forms
                    .iter()
                    .find(|form| form.code == code)
                    .unwrap_or(first),
            ),
            None => Some(first),
        }
    }

    /// Finds a tax regime by code. Empty and unknown codes yield `None`.
    pub fn lookup_tax_regime(&self, code: Option<&str>) -> Option<&TaxRegime> {
        let code = code.filter(|code| !code.is_empty())?;
        self.tax_regimes.iter().find(|regime| regime.code == code)
    }

    /// The form named by `default_entity_form_code`, with the same fallback
    /// as [`RegulatorySnapshot::lookup_entity_form`].
    pub fn default_entity_form(&self) -> Option<&LegalEntityForm> {
        self.lookup_entity_form(Some(&self.default_entity_form_code))
    }
}
