//! Normalization of loosely shaped regulatory payloads.
//!
//! Upstream catalogs arrive with renamed keys, numeric codes, missing fields
//! and empty strings. Every accessor here treats `null`, `false` and blank
//! strings as absent and walks a list of key aliases until one yields a value.

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::catalog::{
    BUILTIN_ENTITY_FORMS, BUILTIN_TAX_REGIMES, builtin_entity_form, builtin_regime,
    builtin_sources, default_entity_form_code,
};
use crate::input::parse_decimal_text;
use crate::{LegalEntityForm, RegulatorySnapshot, TaxBasis, TaxRegime};

const CHECKED_AT_KEYS: &[&str] = &["checked_at", "fetched_at"];
const DEFAULT_FORM_KEYS: &[&str] = &["default_opf", "default_entity_form_code"];
const ENTITY_FORMS_KEYS: &[&str] = &["opf", "legal_entity_forms"];
const TAX_REGIMES_KEYS: &[&str] = &["tax_systems", "tax_regimes"];

const FORM_CODE_KEYS: &[&str] = &["code", "OPF", "OPF_CODE", "id", "kod"];
const FORM_TITLE_KEYS: &[&str] = &["title", "FULLNAME", "OPF_NAME", "NAME", "name", "full_name"];
const FORM_SOURCE_KEYS: &[&str] = &["source_url", "source"];
const FORM_REGIMES_KEYS: &[&str] = &["tax_systems", "allowed_tax_regimes", "tax_regimes"];

const REGIME_CODE_KEYS: &[&str] = &["code", "tax_code", "id", "system", "regime"];
const REGIME_TITLE_KEYS: &[&str] = &["title", "name"];
const REGIME_RATE_KEYS: &[&str] = &["effective_rate", "rate", "tax_rate"];

/// Builds a fully defaulted snapshot from a raw catalog payload.
///
/// Never fails: a payload that is not a JSON object is treated as empty, and
/// records without a resolvable code are dropped one by one. Every built-in
/// tax regime is present in the result whatever the payload contains.
///
/// ```
/// use plan_core::normalize_snapshot;
/// use serde_json::json;
///
/// let snapshot = normalize_snapshot(&json!({
///     "tax_regimes": [{"tax_code": "USN_6", "rate": "0.04"}]
/// }));
///
/// let usn = snapshot.lookup_tax_regime(Some("USN_6")).unwrap();
/// assert_eq!(usn.effective_rate.to_string(), "0.04");
/// assert!(snapshot.lookup_tax_regime(Some("PSN")).is_some());
/// ```
pub fn normalize_snapshot(payload: &Value) -> RegulatorySnapshot {
    let empty = Map::new();
    let payload = match payload.as_object() {
        Some(object) => object,
        None => {
            if !payload.is_null() {
                warn!("regulatory payload is not an object, using built-in catalog");
            }
            &empty
        }
    };

    let checked_at = first_text(payload, CHECKED_AT_KEYS).and_then(|raw| parse_timestamp(&raw));
    let legal_entity_forms = normalize_entity_forms(first_value(payload, ENTITY_FORMS_KEYS));

    let mut tax_regimes = normalize_tax_regimes(first_value(payload, TAX_REGIMES_KEYS));
    for defaults in &BUILTIN_TAX_REGIMES {
        if !tax_regimes.iter().any(|regime| regime.code == defaults.code) {
            tax_regimes.push(defaults.to_tax_regime());
        }
    }

    let default_entity_form_code = first_text(payload, DEFAULT_FORM_KEYS)
        .unwrap_or_else(|| default_entity_form_code().to_string());

    let mut sources = builtin_sources();
    if let Some(Value::Object(raw_sources)) = payload.get("sources") {
        for (name, url) in raw_sources {
            if let Some(url) = text(url) {
                sources.insert(name.clone(), url);
            }
        }
    }

    let snapshot = RegulatorySnapshot::new(
        checked_at,
        legal_entity_forms,
        tax_regimes,
        default_entity_form_code,
        sources,
    );
    debug!(
        entity_forms = snapshot.legal_entity_forms().len(),
        tax_regimes = snapshot.tax_regimes().len(),
        checked_at = ?snapshot.checked_at(),
        "normalized regulatory snapshot"
    );
    snapshot
}

fn normalize_entity_forms(raw: Option<&Value>) -> Vec<LegalEntityForm> {
    let forms: Vec<LegalEntityForm> = records(raw)
        .filter_map(|record| {
            let form = normalize_entity_form(record);
            if form.is_none() {
                warn!(?record, "dropping entity form record without a code");
            }
            form
        })
        .collect();

    if forms.is_empty() {
        BUILTIN_ENTITY_FORMS
            .iter()
            .map(|defaults| defaults.to_entity_form())
            .collect()
    } else {
        forms
    }
}

fn normalize_entity_form(record: &Map<String, Value>) -> Option<LegalEntityForm> {
    let code = first_text(record, FORM_CODE_KEYS)?;
    let defaults = builtin_entity_form(&code);

    let allowed_tax_regimes = first_code_list(record, FORM_REGIMES_KEYS).unwrap_or_else(|| {
        defaults
            .map(|d| d.allowed_tax_regimes.iter().map(|c| c.to_string()).collect())
            .unwrap_or_default()
    });

    Some(LegalEntityForm {
        title: first_text(record, FORM_TITLE_KEYS)
            .or_else(|| defaults.map(|d| d.title.to_string()))
            .unwrap_or_else(|| code.clone()),
        source_url: first_text(record, FORM_SOURCE_KEYS)
            .or_else(|| defaults.map(|d| d.source_url.to_string())),
        allowed_tax_regimes,
        code,
    })
}

fn normalize_tax_regimes(raw: Option<&Value>) -> Vec<TaxRegime> {
    records(raw)
        .filter_map(|record| {
            let regime = normalize_tax_regime(record);
            if regime.is_none() {
                warn!(?record, "dropping tax regime record without a code");
            }
            regime
        })
        .collect()
}

fn normalize_tax_regime(record: &Map<String, Value>) -> Option<TaxRegime> {
    let code = first_text(record, REGIME_CODE_KEYS)?;
    let defaults = builtin_regime(&code);

    let effective_rate = match first_text(record, REGIME_RATE_KEYS) {
        Some(raw) => parse_rate(&code, &raw),
        None => defaults.map_or(Decimal::ZERO, |d| d.effective_rate),
    };

    let basis = match text_field(record, "basis") {
        Some(raw) => raw.parse::<TaxBasis>().unwrap_or_else(|e| {
            warn!(%code, "{}, treating as profit", e);
            TaxBasis::Profit
        }),
        None => defaults.map_or(TaxBasis::Revenue, |d| d.basis),
    };

    Some(TaxRegime {
        title: first_text(record, REGIME_TITLE_KEYS)
            .or_else(|| defaults.map(|d| d.title.to_string()))
            .unwrap_or_else(|| code.clone()),
        effective_rate,
        law_reference: text_field(record, "law_reference")
            .or_else(|| defaults.map(|d| d.law_reference.to_string())),
        basis,
        source_url: text_field(record, "source_url")
            .or_else(|| defaults.map(|d| d.source_url.to_string())),
        note: text_field(record, "note").or_else(|| defaults.map(|d| d.note.to_string())),
        code,
    })
}

/// Object records of a catalog given either as an array or as an object of records.
fn records(raw: Option<&Value>) -> Box<dyn Iterator<Item = &Map<String, Value>> + '_> {
    match raw {
        Some(Value::Array(items)) => Box::new(items.iter().filter_map(Value::as_object)),
        Some(Value::Object(items)) => Box::new(items.values().filter_map(Value::as_object)),
        _ => Box::new(std::iter::empty()),
    }
}

/// Textual form of a scalar; `None` for null, booleans, containers and blank strings.
fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn text_field(record: &Map<String, Value>, key: &str) -> Option<String> {
    record.get(key).and_then(text)
}

fn first_text(record: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| text_field(record, key))
}

fn first_value<'a>(record: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find(|value| match value {
            Value::Array(items) => !items.is_empty(),
            Value::Object(items) => !items.is_empty(),
            _ => false,
        })
}

fn first_code_list(record: &Map<String, Value>, keys: &[&str]) -> Option<Vec<String>> {
    keys.iter().find_map(|key| {
        let codes: Vec<String> = record.get(*key)?.as_array()?.iter().filter_map(text).collect();
        (!codes.is_empty()).then_some(codes)
    })
}

fn parse_rate(
    code: &str,
    raw: &str,
) -> Decimal {
    parse_decimal_text(raw).unwrap_or_else(|e| {
        warn!(%code, rate = %raw, "unparseable tax rate, using 0: {}", e);
        Decimal::ZERO
    })
}

fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc().fixed_offset())
        })
        .or_else(|| {
            warn!(checked_at = %raw, "unparseable snapshot timestamp, ignoring");
            None
        })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;

    const BUILTIN_CODES: [&str; 6] = ["OSN_OOO", "OSN_IP", "USN_6", "USN_15", "PSN", "AUSN"];

    #[test]
    fn empty_payload_yields_builtin_catalog() {
        let snapshot = normalize_snapshot(&json!({}));

        assert_eq!(snapshot.tax_regime_codes(), BUILTIN_CODES);
        for defaults in &BUILTIN_TAX_REGIMES {
            let regime = snapshot.lookup_tax_regime(Some(defaults.code)).unwrap();
            assert_eq!(*regime, defaults.to_tax_regime());
        }

        let form_codes: Vec<_> = snapshot
            .legal_entity_forms()
            .iter()
            .map(|form| form.code.as_str())
            .collect();
        assert_eq!(form_codes, vec!["IP", "OOO"]);
        assert_eq!(snapshot.default_entity_form_code(), "IP");
        assert_eq!(snapshot.checked_at(), None);
        assert_eq!(snapshot.sources().len(), 2);
    }

    #[test]
    fn non_object_payload_is_treated_as_empty() {
        assert_eq!(normalize_snapshot(&json!([1, 2, 3])), normalize_snapshot(&json!({})));
        assert_eq!(normalize_snapshot(&Value::Null), normalize_snapshot(&json!({})));
    }

    #[test]
    fn regime_mapping_with_partial_records_is_backfilled() {
        let snapshot = normalize_snapshot(&json!({
            "tax_systems": {
                "USN_6": {"code": "USN_6", "effective_rate": "0.04"},
            }
        }));

        let usn = snapshot.lookup_tax_regime(Some("USN_6")).unwrap();
        assert_eq!(usn.effective_rate, dec!(0.04));
        assert_eq!(usn.title, "УСН «Доходы»");
        assert_eq!(usn.basis, TaxBasis::Revenue);
        assert_eq!(usn.law_reference.as_deref(), Some("ст. 346.20 НК РФ"));

        // provided records keep their position ahead of merged-in defaults
        assert_eq!(snapshot.tax_regime_codes()[0], "USN_6");
        assert_eq!(snapshot.tax_regimes().len(), 6);
    }

    #[test]
    fn regime_sequence_resolves_code_aliases() {
        let snapshot = normalize_snapshot(&json!({
            "tax_regimes": [
                {"tax_code": "LOCAL", "name": "Local levy", "rate": 0.02},
                {"id": 77, "tax_rate": "0.1", "basis": "Profit"},
                {"regime": "SPECIAL", "basis": "patent"},
            ]
        }));

        let local = snapshot.lookup_tax_regime(Some("LOCAL")).unwrap();
        assert_eq!(local.title, "Local levy");
        assert_eq!(local.effective_rate, dec!(0.02));
        assert_eq!(local.basis, TaxBasis::Revenue);
        assert_eq!(local.law_reference, None);

        let numeric = snapshot.lookup_tax_regime(Some("77")).unwrap();
        assert_eq!(numeric.title, "77");
        assert_eq!(numeric.effective_rate, dec!(0.1));
        assert_eq!(numeric.basis, TaxBasis::Profit);

        let special = snapshot.lookup_tax_regime(Some("SPECIAL")).unwrap();
        assert_eq!(special.effective_rate, Decimal::ZERO);
        assert_eq!(special.basis, TaxBasis::Patent);
    }

    #[test]
    fn records_without_code_are_dropped() {
        let snapshot = normalize_snapshot(&json!({
            "tax_systems": [
                {"title": "Nameless", "rate": "0.5"},
                {"code": "", "rate": "0.5"},
                "not a record",
                {"code": "KEPT"},
            ]
        }));

        assert_eq!(snapshot.tax_regimes().len(), 7);
        assert!(snapshot.lookup_tax_regime(Some("KEPT")).is_some());
        assert!(
            snapshot
                .tax_regimes()
                .iter()
                .all(|regime| regime.title != "Nameless")
        );
    }

    #[test]
    fn unparseable_rate_becomes_zero_and_unknown_basis_becomes_profit() {
        let snapshot = normalize_snapshot(&json!({
            "tax_systems": [{"code": "ODD", "rate": "six percent", "basis": "turnover"}]
        }));

        let odd = snapshot.lookup_tax_regime(Some("ODD")).unwrap();
        assert_eq!(odd.effective_rate, Decimal::ZERO);
        assert_eq!(odd.basis, TaxBasis::Profit);
    }

    #[test]
    fn rates_beyond_decimal_range_are_clamped() {
        let snapshot = normalize_snapshot(&json!({
            "tax_systems": [
                {"code": "USN_6", "rate": 1e30},
                {"code": "AUSN", "rate": "1e100"},
                {"code": "TINY", "rate": "-1e40"},
            ]
        }));

        let usn = snapshot.lookup_tax_regime(Some("USN_6")).unwrap();
        assert_eq!(usn.effective_rate, Decimal::MAX);
        assert_eq!(usn.clamped_rate(), dec!(0.99));

        let ausn = snapshot.lookup_tax_regime(Some("AUSN")).unwrap();
        assert_eq!(ausn.clamped_rate(), dec!(0.99));

        let tiny = snapshot.lookup_tax_regime(Some("TINY")).unwrap();
        assert_eq!(tiny.clamped_rate(), Decimal::ZERO);
    }

    #[test]
    fn explicit_zero_rate_is_kept() {
        let snapshot = normalize_snapshot(&json!({
            "tax_systems": [
                {"code": "USN_6", "rate": 0},
                {"code": "PSN", "effective_rate": "0", "rate": "0.5"},
            ]
        }));

        assert_eq!(snapshot.lookup_tax_regime(Some("USN_6")).unwrap().effective_rate, dec!(0));
        assert_eq!(snapshot.lookup_tax_regime(Some("PSN")).unwrap().effective_rate, dec!(0));
    }

    #[test]
    fn later_duplicate_regime_wins() {
        let snapshot = normalize_snapshot(&json!({
            "tax_systems": [
                {"code": "AUSN", "rate": "0.05"},
                {"code": "AUSN", "rate": "0.07"},
            ]
        }));

        let ausn = snapshot.lookup_tax_regime(Some("AUSN")).unwrap();
        assert_eq!(ausn.effective_rate, dec!(0.07));
        assert_eq!(snapshot.tax_regimes().len(), 6);
    }

    #[test]
    fn entity_forms_from_payload_replace_builtin_list() {
        let snapshot = normalize_snapshot(&json!({
            "opf": [
                {"OPF_CODE": "AO", "FULLNAME": "Акционерное общество", "tax_systems": ["OSN_OOO"]},
                {"code": "OOO"},
                {"name": "no code"},
            ]
        }));

        let forms = snapshot.legal_entity_forms();
        assert_eq!(forms.len(), 2);
        assert_eq!(forms[0].code, "AO");
        assert_eq!(forms[0].title, "Акционерное общество");
        assert_eq!(forms[0].allowed_tax_regimes, vec!["OSN_OOO"]);
        assert_eq!(forms[0].source_url, None);

        // a known code is filled in from the built-in entry
        assert_eq!(forms[1].title, "Общество с ограниченной ответственностью");
        assert_eq!(forms[1].allowed_tax_regimes, vec!["USN_6", "USN_15", "OSN_OOO"]);
    }

    #[test]
    fn unknown_form_without_regimes_keeps_empty_list() {
        let snapshot = normalize_snapshot(&json!({"opf": [{"code": "NKO", "title": "НКО"}]}));

        assert!(snapshot.legal_entity_forms()[0].allowed_tax_regimes.is_empty());
    }

    #[test]
    fn empty_entity_form_list_falls_back_to_builtin() {
        let snapshot = normalize_snapshot(&json!({"opf": []}));

        assert_eq!(snapshot.legal_entity_forms().len(), 2);

        let garbage = normalize_snapshot(&json!({"opf": [{"title": "no code"}]}));
        assert_eq!(garbage.legal_entity_forms()[0].code, "IP");
    }

    #[test]
    fn snapshot_metadata_is_read_with_aliases() {
        let snapshot = normalize_snapshot(&json!({
            "fetched_at": "2025-03-01T10:15:00.123456+03:00",
            "default_opf": "OOO",
            "sources": {"opf": "https://example.org/opf.json", "broken": 5, "empty": ""},
        }));

        let checked_at = snapshot.checked_at().unwrap();
        assert_eq!(checked_at.to_rfc3339(), "2025-03-01T10:15:00.123456+03:00");
        assert_eq!(snapshot.default_entity_form_code(), "OOO");
        assert_eq!(snapshot.sources()["opf"], "https://example.org/opf.json");
        assert_eq!(snapshot.sources()["broken"], "5");
        assert!(!snapshot.sources().contains_key("empty"));
        assert!(snapshot.sources().contains_key("tax_systems"));
    }

    #[test]
    fn naive_and_invalid_timestamps() {
        let naive = normalize_snapshot(&json!({"checked_at": "2025-01-02T03:04:05"}));
        assert_eq!(
            naive.checked_at().unwrap().to_rfc3339(),
            "2025-01-02T03:04:05+00:00"
        );

        let invalid = normalize_snapshot(&json!({"checked_at": "yesterday"}));
        assert_eq!(invalid.checked_at(), None);
    }

    #[test]
    fn builtin_catalog_is_not_mutated_by_overrides() {
        let _ = normalize_snapshot(&json!({
            "tax_systems": [{"code": "USN_6", "rate": "0.5", "title": "override"}]
        }));

        let defaults = normalize_snapshot(&json!({}));
        let usn = defaults.lookup_tax_regime(Some("USN_6")).unwrap();
        assert_eq!(usn.effective_rate, dec!(0.06));
        assert_eq!(usn.title, "УСН «Доходы»");
    }
}
