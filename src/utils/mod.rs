//! Shared helpers for argument validation

pub mod numeric;

pub use numeric::NumericValidator;
