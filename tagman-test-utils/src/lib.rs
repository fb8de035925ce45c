//! Test utilities for the Tag Manager automation client
//!
//! This crate provides a mock container client and test-data builders
//! for exercising the analyzer, planner, and orchestrator without a live
//! API.

pub mod builders;
pub mod mocks;

// Re-export commonly used types
pub use builders::{TagBuilder, TriggerBuilder, VariableBuilder};
pub use mocks::{MockContainerClient, RecordedCall};
