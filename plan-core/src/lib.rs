//! Business plan calculation core.
//!
//! Derives daily, monthly and yearly revenue and cost figures from a target
//! profit and margin, and projects the tax burden of every tax regime that a
//! legal entity form allows. Nothing in this crate performs I/O: callers hand
//! in a raw regulatory payload and plain inputs and get plain records back.

pub mod calculations;
pub mod input;
pub mod models;
pub mod regulations;

pub use calculations::{PlanCalculator, compute_plan};
pub use models::*;
pub use regulations::normalize_snapshot;
