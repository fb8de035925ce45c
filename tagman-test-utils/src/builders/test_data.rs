//! Test data builders for container entities

use tagman_client_core::{Condition, Parameter, Tag, Trigger, Variable};

/// Builder for test tags
pub struct TagBuilder {
    tag: Tag,
}

impl TagBuilder {
    /// Create a builder with an id and name; type defaults to `ua`.
    pub fn new(tag_id: &str, name: &str) -> Self {
        Self {
            tag: Tag {
                tag_id: tag_id.to_string(),
                name: name.to_string(),
                kind: "ua".to_string(),
                ..Default::default()
            },
        }
    }

    pub fn with_type(mut self, kind: &str) -> Self {
        self.tag.kind = kind.to_string();
        self
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.tag.parameter.push(parameter);
        self
    }

    pub fn with_firing_trigger(mut self, trigger_id: &str) -> Self {
        self.tag
            .firing_trigger_id
            .get_or_insert_with(Vec::new)
            .push(trigger_id.to_string());
        self
    }

    pub fn with_blocking_trigger(mut self, trigger_id: &str) -> Self {
        self.tag
            .blocking_trigger_id
            .get_or_insert_with(Vec::new)
            .push(trigger_id.to_string());
        self
    }

    pub fn with_firing_rule(mut self, rule_id: &str) -> Self {
        self.tag
            .firing_rule_id
            .get_or_insert_with(Vec::new)
            .push(rule_id.to_string());
        self
    }

    pub fn with_teardown_marker(mut self) -> Self {
        self.tag.teardown_tag = Some(serde_json::json!([{"tagName": "teardown"}]));
        self
    }

    pub fn build(self) -> Tag {
        self.tag
    }
}

/// Builder for test triggers
pub struct TriggerBuilder {
    trigger: Trigger,
}

impl TriggerBuilder {
    /// Create a builder with an id and name; type defaults to `pageview`.
    pub fn new(trigger_id: &str, name: &str) -> Self {
        Self {
            trigger: Trigger {
                trigger_id: trigger_id.to_string(),
                name: name.to_string(),
                kind: "pageview".to_string(),
                ..Default::default()
            },
        }
    }

    pub fn with_type(mut self, kind: &str) -> Self {
        self.trigger.kind = kind.to_string();
        self
    }

    /// Add an equals filter comparing a templated argument to a value.
    pub fn with_equals_filter(mut self, arg0: &str, arg1: &str) -> Self {
        self.trigger
            .filter
            .get_or_insert_with(Vec::new)
            .push(Condition {
                kind: "equals".to_string(),
                parameter: vec![
                    Parameter::template("arg0", arg0),
                    Parameter::template("arg1", arg1),
                ],
            });
        self
    }

    pub fn build(self) -> Trigger {
        self.trigger
    }
}

/// Builder for test variables
pub struct VariableBuilder {
    variable: Variable,
}

impl VariableBuilder {
    /// Create a builder with an id and name; type defaults to `v`
    /// (data-layer lookup).
    pub fn new(variable_id: &str, name: &str) -> Self {
        Self {
            variable: Variable {
                variable_id: variable_id.to_string(),
                name: name.to_string(),
                kind: "v".to_string(),
                ..Default::default()
            },
        }
    }

    pub fn with_type(mut self, kind: &str) -> Self {
        self.variable.kind = kind.to_string();
        self
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.variable.parameter.push(parameter);
        self
    }

    pub fn build(self) -> Variable {
        self.variable
    }
}
