mod calculation_inputs;
mod legal_entity_form;
mod plan_result;
mod regulatory_snapshot;
mod tax_regime;

pub use calculation_inputs::{
    CalculationInputs, MAX_MONTHLY_PROFIT, MIN_MARGIN_PERCENT, RawInputs,
};
pub use legal_entity_form::LegalEntityForm;
pub use plan_result::{PlanResult, ProfitabilityRow, SalesRow, TaxProjection, TaxRow};
pub use regulatory_snapshot::RegulatorySnapshot;
pub use tax_regime::{MAX_EFFECTIVE_RATE, TaxBasis, TaxRegime, UnknownTaxBasis};
