//! Test data builders

pub mod test_data;

pub use test_data::{TagBuilder, TriggerBuilder, VariableBuilder};
