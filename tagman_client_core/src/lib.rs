//! Tag Manager Automation Core Library
//!
//! This is the core library for the Tag Manager automation client,
//! providing the container entity model, cross-reference analysis,
//! mutation planning, and the remote container API client.

pub mod analyzer;
pub mod api;
pub mod auth;
pub mod entities;
pub mod error;
pub mod planner;
pub mod service;

// Re-export main types
pub use api::ContainerApi;
pub use auth::{API_NAME, StoredToken, TokenCache};
pub use entities::{Condition, Container, Parameter, ParameterType, Tag, Trigger, Variable};
pub use error::{Error, Result};
pub use planner::{Action, CleanupPolicy, ConditionSpec};
pub use service::{ServiceConfig, TagManagerService};
