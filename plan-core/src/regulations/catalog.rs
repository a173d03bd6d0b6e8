//! Built-in regulatory catalog.
//!
//! These tables are what every snapshot falls back to when the upstream
//! catalog is missing, partial or malformed. They are plain `static` data and
//! are only ever copied into owned records, never modified.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::{LegalEntityForm, TaxBasis, TaxRegime};

/// Static description of a built-in legal entity form.
#[derive(Debug)]
pub struct EntityFormDefaults {
    pub code: &'static str,
    pub title: &'static str,
    pub source_url: &'static str,
    pub allowed_tax_regimes: &'static [&'static str],
}

/// Static description of a built-in tax regime.
#[derive(Debug)]
pub struct TaxRegimeDefaults {
    pub code: &'static str,
    pub title: &'static str,
    pub effective_rate: Decimal,
    pub law_reference: &'static str,
    pub basis: TaxBasis,
    pub source_url: &'static str,
    pub note: &'static str,
}

pub static BUILTIN_ENTITY_FORMS: [EntityFormDefaults; 2] = [
    EntityFormDefaults {
        code: "IP",
        title: "Индивидуальный предприниматель",
        source_url: "https://www.nalog.gov.ru/opendata/7707329152-egrip/",
        allowed_tax_regimes: &["USN_6", "USN_15", "PSN", "AUSN", "OSN_IP"],
    },
    EntityFormDefaults {
        code: "OOO",
        title: "Общество с ограниченной ответственностью",
        source_url: "https://www.nalog.gov.ru/opendata/7707329152-egrul/",
        allowed_tax_regimes: &["USN_6", "USN_15", "OSN_OOO"],
    },
];

pub static BUILTIN_TAX_REGIMES: [TaxRegimeDefaults; 6] = [
    TaxRegimeDefaults {
        code: "OSN_OOO",
        title: "ОСНО для ООО",
        effective_rate: dec!(0.20),
        law_reference: "ст. 284 НК РФ",
        basis: TaxBasis::Profit,
        source_url: "https://www.nalog.gov.ru/opendata/7707329152-taxprofit/",
        note: "20% налог на прибыль организаций",
    },
    TaxRegimeDefaults {
        code: "OSN_IP",
        title: "ОСНО для ИП",
        effective_rate: dec!(0.13),
        law_reference: "ст. 224 НК РФ",
        basis: TaxBasis::Income,
        source_url: "https://www.nalog.gov.ru/opendata/7707329152-ndfl/",
        note: "13% НДФЛ от чистой прибыли",
    },
    TaxRegimeDefaults {
        code: "USN_6",
        title: "УСН «Доходы»",
        effective_rate: dec!(0.06),
        law_reference: "ст. 346.20 НК РФ",
        basis: TaxBasis::Revenue,
        source_url: "https://www.nalog.gov.ru/opendata/7707329152-usn/",
        note: "6% с выручки",
    },
    TaxRegimeDefaults {
        code: "USN_15",
        title: "УСН «Доходы минус расходы»",
        effective_rate: dec!(0.15),
        law_reference: "ст. 346.20 НК РФ",
        basis: TaxBasis::Profit,
        source_url: "https://www.nalog.gov.ru/opendata/7707329152-usn/",
        note: "15% от прибыли",
    },
    TaxRegimeDefaults {
        code: "PSN",
        title: "Патентная система",
        effective_rate: dec!(0.06),
        law_reference: "ст. 346.50 НК РФ",
        basis: TaxBasis::Patent,
        source_url: "https://www.nalog.gov.ru/opendata/7707329152-psn/",
        note: "Ставка рассчитывается от потенциального дохода",
    },
    TaxRegimeDefaults {
        code: "AUSN",
        title: "Автоматизированная УСН",
        effective_rate: dec!(0.08),
        law_reference: "Федеральный закон № 17-ФЗ",
        basis: TaxBasis::Revenue,
        source_url: "https://www.nalog.gov.ru/opendata/7707329152-ausn/",
        note: "8% с выручки",
    },
];

/// Upstream open-data catalogs, keyed by catalog name.
pub static BUILTIN_SOURCES: [(&str, &str); 2] = [
    (
        "opf",
        "https://www.nalog.gov.ru/opendata/7707329152-spravOKOPF/data-structure-7707329152-spravOKOPF.json",
    ),
    (
        "tax_systems",
        "https://www.nalog.gov.ru/opendata/7707329152-taxsystem/data-structure-7707329152-taxsystem.json",
    ),
];

/// Code of the entity form selected when a payload names none.
pub fn default_entity_form_code() -> &'static str {
    BUILTIN_ENTITY_FORMS[0].code
}

pub fn builtin_entity_form(code: &str) -> Option<&'static EntityFormDefaults> {
    BUILTIN_ENTITY_FORMS.iter().find(|form| form.code == code)
}

pub fn builtin_regime(code: &str) -> Option<&'static TaxRegimeDefaults> {
    BUILTIN_TAX_REGIMES.iter().find(|regime| regime.code == code)
}

pub fn builtin_sources() -> BTreeMap<String, String> {
    BUILTIN_SOURCES
        .iter()
        .map(|(name, url)| (name.to_string(), url.to_string()))
        .collect()
}

impl EntityFormDefaults {
    pub fn to_entity_form(&self) -> LegalEntityForm {
        LegalEntityForm {
            code: self.code.to_string(),
            title: self.title.to_string(),
            source_url: Some(self.source_url.to_string()),
            allowed_tax_regimes: self
                .allowed_tax_regimes
                .iter()
                .map(|code| code.to_string())
                .collect(),
        }
    }
}

impl TaxRegimeDefaults {
    pub fn to_tax_regime(&self) -> TaxRegime {
        TaxRegime {
            code: self.code.to_string(),
            title: self.title.to_string(),
            effective_rate: self.effective_rate,
            law_reference: Some(self.law_reference.to_string()),
            basis: self.basis,
            source_url: Some(self.source_url.to_string()),
            note: Some(self.note.to_string()),
        }
    }
}
