//! Mock implementations for testing

pub mod client;

pub use client::{MockContainerClient, RecordedCall};
