//! Plan and tax projection calculations.
//!
//! All arithmetic uses [`rust_decimal::Decimal`] at full precision; rounding
//! is left to whoever presents the figures.

pub mod common;
pub mod plan;
pub mod tax_projection;

pub use plan::{PlanCalculator, RegimeSelection, compute_plan, resolve_tax_regimes};
pub use tax_projection::{build_tax_projection, build_tax_rows};
