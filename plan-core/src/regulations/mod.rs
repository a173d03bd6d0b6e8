//! Regulatory catalog: built-in defaults and snapshot normalization.

pub mod catalog;
mod normalize;

pub use normalize::normalize_snapshot;
