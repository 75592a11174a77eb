//! Data-quality classification engine.
//!
//! Builds the QA code table registry, adapts it to the column layout of each
//! dataset kind and classifies records into quality categories with an
//! indicator naming the codes responsible.

pub mod adapter;
pub mod classifier;
pub mod code_table;
pub mod policy;

#[cfg(test)]
pub mod tests;

pub use adapter::{AdapterRule, adapt, rules_for};
pub use classifier::{QualityClassifier, classify};
pub use code_table::{CodeTable, FieldCodes, MAX_SEVERITY};
pub use policy::{FieldPolicy, YearPosition, parse_year, sample_year};
