//! Container entity data model
//!
//! This module contains the serde-backed wire representations of the
//! entities held by a Tag Manager container: tags, triggers, variables,
//! and the recursive parameter structure they share.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Well-known variable type discriminators on the v1 wire format.
pub mod variable_type {
    /// Constant value
    pub const CONSTANT: &str = "c";
    /// Data-layer lookup
    pub const DATA_LAYER: &str = "v";
    /// Custom JavaScript
    pub const CUSTOM_SCRIPT: &str = "jsm";
    /// Lookup table
    pub const LOOKUP_TABLE: &str = "smm";
}

/// Well-known tag type discriminators.
pub mod tag_type {
    /// Universal Analytics beacon
    pub const UNIVERSAL_ANALYTICS: &str = "ua";
    /// Custom HTML
    pub const CUSTOM_HTML: &str = "html";
}

/// The `type` discriminator of a [`Parameter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    Template,
    Boolean,
    Integer,
    List,
    Map,
}

/// Recursive typed key/value structure used to configure tags, triggers,
/// and variables.
///
/// On the wire every scalar value is a string; booleans and integers are
/// carried as `"true"` / `"2"` style text in `value`. `list` and `map`
/// nest further parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(rename = "type")]
    pub kind: ParameterType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list: Option<Vec<Parameter>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map: Option<Vec<Parameter>>,
}

impl Parameter {
    /// Create a keyed template (string) parameter.
    pub fn template(key: &str, value: &str) -> Self {
        Self {
            kind: ParameterType::Template,
            key: Some(key.to_string()),
            value: Some(value.to_string()),
            list: None,
            map: None,
        }
    }

    /// Create a keyed boolean parameter (carried as `"true"`/`"false"`).
    pub fn boolean(key: &str, value: bool) -> Self {
        Self {
            kind: ParameterType::Boolean,
            key: Some(key.to_string()),
            value: Some(value.to_string()),
            list: None,
            map: None,
        }
    }

    /// Create a keyed integer parameter (carried as decimal text).
    pub fn integer(key: &str, value: i64) -> Self {
        Self {
            kind: ParameterType::Integer,
            key: Some(key.to_string()),
            value: Some(value.to_string()),
            list: None,
            map: None,
        }
    }

    /// Create a keyed list parameter holding nested parameters.
    pub fn list(key: &str, items: Vec<Parameter>) -> Self {
        Self {
            kind: ParameterType::List,
            key: Some(key.to_string()),
            value: None,
            list: Some(items),
            map: None,
        }
    }

    /// Create an unkeyed map entry holding nested parameters.
    ///
    /// Map entries appear inside list parameters and carry no key of
    /// their own.
    pub fn map(entries: Vec<Parameter>) -> Self {
        Self {
            kind: ParameterType::Map,
            key: None,
            value: None,
            list: None,
            map: Some(entries),
        }
    }
}

/// A configured action (e.g. fire an analytics beacon) with trigger-based
/// activation rules.
///
/// Unknown wire fields are retained in `extra` so that serialized forms
/// used by the reference scan cover the full payload, not just the fields
/// this client models.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Tag {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tag_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameter: Vec<Parameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firing_trigger_id: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocking_trigger_id: Option<Vec<String>>,
    // Legacy rule-era equivalents of the trigger id lists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firing_rule_id: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocking_rule_id: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teardown_tag: Option<serde_json::Value>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A single filter condition on a trigger: an operator kind plus the two
/// templated arguments (and optional negate / ignore-case flags) in its
/// parameter list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(rename = "type")]
    pub kind: String,
    pub parameter: Vec<Parameter>,
}

/// A named condition/filter set that activates tags.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Trigger {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub trigger_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_event_filter: Option<Vec<Condition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Vec<Condition>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A named, typed value substitutable into tag/trigger/variable
/// configuration via a `{{name}}` token.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Variable {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub variable_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameter: Vec<Parameter>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// The named configuration unit holding tags, triggers, and variables.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Container {
    pub container_id: String,
    pub name: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}
