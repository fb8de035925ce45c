//! Mutation planning
//!
//! Turns the analyzer's used/unused sets plus an explicit [`CleanupPolicy`]
//! into an ordered list of [`Action`]s for a container client to execute.
//! Planning is pure; execution (and per-entity error recovery) belongs to
//! the caller.

use crate::analyzer;
use crate::entities::{Condition, Parameter, Tag, Trigger, Variable, variable_type};
use crate::error::{Error, Result};
use std::collections::BTreeSet;

/// Field name under which an analytics tag carries the user id.
pub const USER_ID_FIELD: &str = "&uid";
/// Parameter key of the field-override list on analytics tags.
pub const FIELDS_TO_SET_KEY: &str = "fieldsToSet";
/// Default token substituted as the user id value.
pub const DEFAULT_USER_ID_VALUE: &str = "{{user id}}";
/// Trigger type for custom-event triggers.
pub const CUSTOM_EVENT_TRIGGER_TYPE: &str = "customEvent";

/// Which cleanup rules to apply, and the knobs they take.
///
/// Keep-lists are caller-supplied: they protect entities referenced by
/// mechanisms outside the textual scan (manual or legacy references).
#[derive(Debug, Clone)]
pub struct CleanupPolicy {
    pub delete_unused_triggers: bool,
    pub delete_unused_variables: bool,
    pub delete_tags_without_triggers: bool,
    pub ensure_user_id_field: bool,
    /// Variable ids never deleted regardless of the scan outcome.
    pub keep_variable_ids: BTreeSet<String>,
    /// Tag ids never deleted by the no-trigger rule.
    pub keep_tag_ids: BTreeSet<String>,
    /// Tag type the user-id rule applies to.
    pub target_tag_type: String,
    /// Value written into the user-id field override.
    pub user_id_value: String,
}

impl Default for CleanupPolicy {
    fn default() -> Self {
        Self {
            delete_unused_triggers: false,
            delete_unused_variables: false,
            delete_tags_without_triggers: false,
            ensure_user_id_field: false,
            keep_variable_ids: BTreeSet::new(),
            keep_tag_ids: BTreeSet::new(),
            target_tag_type: crate::entities::tag_type::UNIVERSAL_ANALYTICS.to_string(),
            user_id_value: DEFAULT_USER_ID_VALUE.to_string(),
        }
    }
}

/// One side-effecting step against the container.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    DeleteTrigger { trigger_id: String },
    DeleteVariable { variable_id: String },
    DeleteTag { tag_id: String },
    UpdateTag { tag: Tag },
}

impl Action {
    /// Short human-readable description for logs.
    pub fn describe(&self) -> String {
        match self {
            Self::DeleteTrigger { trigger_id } => format!("delete trigger {trigger_id}"),
            Self::DeleteVariable { variable_id } => format!("delete variable {variable_id}"),
            Self::DeleteTag { tag_id } => format!("delete tag {tag_id}"),
            Self::UpdateTag { tag } => format!("update tag {}", tag.tag_id),
        }
    }
}

/// Trigger ids present in the container but referenced by no tag.
pub fn unreferenced_trigger_ids(triggers: &[Trigger], tags: &[Tag]) -> Vec<String> {
    let referenced = analyzer::firing_trigger_ids(tags);
    triggers
        .iter()
        .filter(|t| !referenced.contains(&t.trigger_id))
        .map(|t| t.trigger_id.clone())
        .collect()
}

/// Variable ids neither referenced by the scan nor protected by the
/// keep-list.
pub fn unused_variable_ids(
    tags: &[Tag],
    triggers: &[Trigger],
    variables: &[Variable],
    keep: &BTreeSet<String>,
) -> Vec<String> {
    let used = analyzer::used_variable_ids(tags, triggers, variables);
    variables
        .iter()
        .filter(|v| !used.contains(&v.variable_id) && !keep.contains(&v.variable_id))
        .map(|v| v.variable_id.clone())
        .collect()
}

/// Tags deletable under the no-trigger rule: no firing-trigger list, no
/// teardown marker, id not in the keep-list.
pub fn tags_without_triggers<'a>(tags: &'a [Tag], keep: &BTreeSet<String>) -> Vec<&'a Tag> {
    tags.iter()
        .filter(|tag| {
            tag.firing_trigger_id.is_none()
                && tag.teardown_tag.is_none()
                && !keep.contains(&tag.tag_id)
        })
        .collect()
}

/// Ensure a tag's `fieldsToSet` list carries a `&uid` entry.
///
/// Returns the updated tag when a change is needed, `None` when the entry
/// already exists. Three states, recomputed fresh per tag:
/// no `fieldsToSet` parameter at all (append a new list with the entry),
/// the parameter exists without a `&uid` entry (append to it), or the
/// entry is already present (no-op).
pub fn ensure_user_id_field(tag: &Tag, user_id_value: &str) -> Option<Tag> {
    let mut fields_to_set_present = false;
    let mut user_id_present = false;
    for parameter in &tag.parameter {
        if parameter.key.as_deref() == Some(FIELDS_TO_SET_KEY) {
            fields_to_set_present = true;
            for entry in parameter.list.iter().flatten() {
                for field in entry.map.iter().flatten() {
                    if field.value.as_deref() == Some(USER_ID_FIELD) {
                        user_id_present = true;
                    }
                }
            }
        }
    }
    if user_id_present {
        return None;
    }

    let mut updated = tag.clone();
    if fields_to_set_present {
        for parameter in &mut updated.parameter {
            if parameter.key.as_deref() == Some(FIELDS_TO_SET_KEY) {
                parameter
                    .list
                    .get_or_insert_with(Vec::new)
                    .push(user_id_entry(user_id_value));
            }
        }
    } else {
        updated.parameter.push(Parameter::list(
            FIELDS_TO_SET_KEY,
            vec![user_id_entry(user_id_value)],
        ));
    }
    Some(updated)
}

fn user_id_entry(user_id_value: &str) -> Parameter {
    Parameter::map(vec![
        Parameter::template("fieldName", USER_ID_FIELD),
        Parameter::template("value", user_id_value),
    ])
}

/// Produce the ordered action list for one cleanup run.
///
/// Rule order: unused triggers, unused variables, trigger-less tags, then
/// user-id field updates.
pub fn plan(
    policy: &CleanupPolicy,
    tags: &[Tag],
    triggers: &[Trigger],
    variables: &[Variable],
) -> Vec<Action> {
    let mut actions = Vec::new();

    if policy.delete_unused_triggers {
        for trigger_id in unreferenced_trigger_ids(triggers, tags) {
            actions.push(Action::DeleteTrigger { trigger_id });
        }
    }

    if policy.delete_unused_variables {
        for variable_id in unused_variable_ids(tags, triggers, variables, &policy.keep_variable_ids)
        {
            actions.push(Action::DeleteVariable { variable_id });
        }
    }

    if policy.delete_tags_without_triggers {
        for tag in tags_without_triggers(tags, &policy.keep_tag_ids) {
            actions.push(Action::DeleteTag {
                tag_id: tag.tag_id.clone(),
            });
        }
    }

    if policy.ensure_user_id_field {
        for tag in tags.iter().filter(|t| t.kind == policy.target_tag_type) {
            if let Some(updated) = ensure_user_id_field(tag, &policy.user_id_value) {
                actions.push(Action::UpdateTag { tag: updated });
            }
        }
    }

    actions
}

/// Build a constant variable: type `c`, single `value` template parameter.
pub fn constant_variable(name: &str, value: &str) -> Variable {
    Variable {
        name: name.to_string(),
        kind: variable_type::CONSTANT.to_string(),
        parameter: vec![Parameter::template("value", value)],
        ..Default::default()
    }
}

/// Build a data-layer variable: type `v`, `name` parameter, and when a
/// default is supplied, `defaultValue` plus the `setDefaultValue` flag.
pub fn data_layer_variable(name: &str, default_value: Option<&str>) -> Variable {
    let mut parameter = vec![Parameter::template("name", name)];
    if let Some(default) = default_value {
        parameter.push(Parameter::template("defaultValue", default));
        parameter.push(Parameter::boolean("setDefaultValue", true));
    }
    Variable {
        name: name.to_string(),
        kind: variable_type::DATA_LAYER.to_string(),
        parameter,
        ..Default::default()
    }
}

/// Declarative condition input for [`custom_event_trigger`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ConditionSpec {
    /// Comparison logic, e.g. `equals`, `does_not_equal`,
    /// `match_regex_ignore_case`.
    pub logic: String,
    /// Left-hand templated argument, typically a `{{variable}}` token.
    pub condition: String,
    /// Right-hand comparison value.
    pub value: String,
}

// Each logic value maps to a filter type plus optional negate /
// ignore-case flags.
fn filter_kind(logic: &str) -> Result<(&'static str, bool, bool)> {
    let mapped = match logic {
        "equals" => ("equals", false, false),
        "does_not_equal" => ("equals", true, false),
        "contains" => ("contains", false, false),
        "does_not_contain" => ("contains", true, false),
        "starts_with" => ("startsWith", false, false),
        "does_not_start_with" => ("startsWith", true, false),
        "ends_with" => ("endsWith", false, false),
        "does_not_end_with" => ("endsWith", true, false),
        "match_regex" => ("matchRegex", false, false),
        "match_regex_ignore_case" => ("matchRegex", false, true),
        "does_not_match_regex" => ("matchRegex", true, false),
        "less_than" => ("less", false, false),
        "greater_than" => ("greater", false, false),
        other => {
            return Err(Error::validation(format!(
                "unrecognized condition logic: {other}"
            )));
        }
    };
    Ok(mapped)
}

/// Build a custom-event trigger from declarative conditions.
///
/// An unrecognized logic value is an error; nothing is silently dropped.
pub fn custom_event_trigger(name: &str, conditions: &[ConditionSpec]) -> Result<Trigger> {
    let mut filters = Vec::with_capacity(conditions.len());
    for condition in conditions {
        let (kind, negate, ignore_case) = filter_kind(&condition.logic)?;
        let mut parameter = vec![
            Parameter::template("arg0", &condition.condition),
            Parameter::template("arg1", &condition.value),
        ];
        if negate {
            parameter.push(Parameter::boolean("negate", true));
        }
        if ignore_case {
            parameter.push(Parameter::boolean("ignore_case", true));
        }
        filters.push(Condition {
            kind: kind.to_string(),
            parameter,
        });
    }
    Ok(Trigger {
        name: name.to_string(),
        kind: CUSTOM_EVENT_TRIGGER_TYPE.to_string(),
        custom_event_filter: Some(filters),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::ParameterType;

    fn ua_tag(id: &str) -> Tag {
        Tag {
            tag_id: id.to_string(),
            name: format!("tag {id}"),
            kind: "ua".to_string(),
            firing_trigger_id: Some(vec!["100".to_string()]),
            ..Default::default()
        }
    }

    fn trigger(id: &str) -> Trigger {
        Trigger {
            trigger_id: id.to_string(),
            name: format!("trigger {id}"),
            kind: "pageview".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn only_unreferenced_triggers_are_planned_for_deletion() {
        let triggers = vec![trigger("10"), trigger("20")];
        let mut tag = ua_tag("1");
        tag.firing_trigger_id = Some(vec!["10".to_string()]);
        let policy = CleanupPolicy {
            delete_unused_triggers: true,
            ..Default::default()
        };
        let actions = plan(&policy, &[tag], &triggers, &[]);
        assert_eq!(
            actions,
            vec![Action::DeleteTrigger {
                trigger_id: "20".to_string()
            }]
        );
    }

    #[test]
    fn keep_list_protects_unused_variables() {
        let variables = vec![
            Variable {
                variable_id: "817".to_string(),
                name: "legacy".to_string(),
                kind: "v".to_string(),
                ..Default::default()
            },
            Variable {
                variable_id: "2".to_string(),
                name: "orphan".to_string(),
                kind: "v".to_string(),
                ..Default::default()
            },
        ];
        let keep = BTreeSet::from(["817".to_string()]);
        let unused = unused_variable_ids(&[], &[], &variables, &keep);
        assert_eq!(unused, vec!["2".to_string()]);
    }

    #[test]
    fn user_id_added_when_fields_to_set_is_missing() {
        let tag = ua_tag("1");
        let updated = ensure_user_id_field(&tag, DEFAULT_USER_ID_VALUE).expect("update expected");
        let fields = updated
            .parameter
            .iter()
            .find(|p| p.key.as_deref() == Some(FIELDS_TO_SET_KEY))
            .expect("fieldsToSet appended");
        assert_eq!(fields.kind, ParameterType::List);
        let entries = fields.list.as_ref().unwrap();
        assert_eq!(entries.len(), 1);
        let map = entries[0].map.as_ref().unwrap();
        assert_eq!(map[0].value.as_deref(), Some(USER_ID_FIELD));
        assert_eq!(map[1].value.as_deref(), Some(DEFAULT_USER_ID_VALUE));
    }

    #[test]
    fn user_id_appended_to_existing_fields_to_set() {
        let mut tag = ua_tag("1");
        tag.parameter = vec![Parameter::list(FIELDS_TO_SET_KEY, vec![])];
        let updated = ensure_user_id_field(&tag, DEFAULT_USER_ID_VALUE).expect("update expected");
        let fields = &updated.parameter[0];
        assert_eq!(fields.list.as_ref().unwrap().len(), 1);
        // Exactly one update is planned for this tag.
        let policy = CleanupPolicy {
            ensure_user_id_field: true,
            ..Default::default()
        };
        let actions = plan(&policy, &[tag], &[], &[]);
        assert_eq!(actions.len(), 1);
        assert!(matches!(actions[0], Action::UpdateTag { .. }));
    }

    #[test]
    fn ensure_user_id_field_is_idempotent() {
        let tag = ua_tag("1");
        let once = ensure_user_id_field(&tag, DEFAULT_USER_ID_VALUE).unwrap();
        assert!(ensure_user_id_field(&once, DEFAULT_USER_ID_VALUE).is_none());

        let fields = once
            .parameter
            .iter()
            .find(|p| p.key.as_deref() == Some(FIELDS_TO_SET_KEY))
            .unwrap();
        let uid_entries = fields
            .list
            .as_ref()
            .unwrap()
            .iter()
            .filter(|entry| {
                entry
                    .map
                    .iter()
                    .flatten()
                    .any(|f| f.value.as_deref() == Some(USER_ID_FIELD))
            })
            .count();
        assert_eq!(uid_entries, 1);
    }

    #[test]
    fn user_id_rule_only_touches_target_tag_type() {
        let mut html = ua_tag("2");
        html.kind = "html".to_string();
        let policy = CleanupPolicy {
            ensure_user_id_field: true,
            ..Default::default()
        };
        let actions = plan(&policy, &[html], &[], &[]);
        assert!(actions.is_empty());
    }

    #[test]
    fn trigger_less_tag_is_deleted_unless_protected() {
        let mut orphan = ua_tag("1");
        orphan.firing_trigger_id = None;
        let mut teardown = ua_tag("2");
        teardown.firing_trigger_id = None;
        teardown.teardown_tag = Some(serde_json::json!([{"tagName": "cleanup"}]));
        let mut kept = ua_tag("741");
        kept.firing_trigger_id = None;
        let wired = ua_tag("3");

        let keep = BTreeSet::from(["741".to_string()]);
        let binding = [orphan, teardown, kept, wired];
        let deletable = tags_without_triggers(&binding, &keep);
        let ids: Vec<&str> = deletable.iter().map(|t| t.tag_id.as_str()).collect();
        assert_eq!(ids, vec!["1"]);
    }

    #[test]
    fn plan_orders_triggers_variables_tags_then_updates() {
        let triggers = vec![trigger("20")];
        let variables = vec![Variable {
            variable_id: "5".to_string(),
            name: "orphan".to_string(),
            kind: "v".to_string(),
            ..Default::default()
        }];
        let mut orphan_tag = ua_tag("2");
        orphan_tag.firing_trigger_id = None;
        let tags = vec![ua_tag("1"), orphan_tag];
        let policy = CleanupPolicy {
            delete_unused_triggers: true,
            delete_unused_variables: true,
            delete_tags_without_triggers: true,
            ensure_user_id_field: true,
            ..Default::default()
        };
        let actions = plan(&policy, &tags, &triggers, &variables);
        let kinds: Vec<&str> = actions
            .iter()
            .map(|a| match a {
                Action::DeleteTrigger { .. } => "trigger",
                Action::DeleteVariable { .. } => "variable",
                Action::DeleteTag { .. } => "tag",
                Action::UpdateTag { .. } => "update",
            })
            .collect();
        assert_eq!(kinds, vec!["trigger", "variable", "tag", "update", "update"]);
    }

    #[test]
    fn constant_variable_has_single_value_parameter() {
        let variable = constant_variable("testconstant", "tet");
        assert_eq!(variable.kind, "c");
        assert_eq!(variable.parameter.len(), 1);
        assert_eq!(variable.parameter[0].key.as_deref(), Some("value"));
        assert_eq!(variable.parameter[0].value.as_deref(), Some("tet"));
    }

    #[test]
    fn data_layer_variable_defaults_are_optional() {
        let bare = data_layer_variable("page", None);
        assert_eq!(bare.kind, "v");
        assert_eq!(bare.parameter.len(), 1);

        let with_default = data_layer_variable("page", Some("unknown"));
        let keys: Vec<&str> = with_default
            .parameter
            .iter()
            .filter_map(|p| p.key.as_deref())
            .collect();
        assert_eq!(keys, vec!["name", "defaultValue", "setDefaultValue"]);
        assert_eq!(with_default.parameter[2].value.as_deref(), Some("true"));
    }

    #[test]
    fn negated_logic_maps_to_base_filter_with_negate_flag() {
        let trigger = custom_event_trigger(
            "signup",
            &[ConditionSpec {
                logic: "does_not_equal".to_string(),
                condition: "{{event}}".to_string(),
                value: "gtm.js".to_string(),
            }],
        )
        .unwrap();
        let filters = trigger.custom_event_filter.as_ref().unwrap();
        assert_eq!(filters[0].kind, "equals");
        let negate = filters[0]
            .parameter
            .iter()
            .find(|p| p.key.as_deref() == Some("negate"))
            .expect("negate flag present");
        assert_eq!(negate.value.as_deref(), Some("true"));
    }

    #[test]
    fn regex_ignore_case_maps_to_match_regex_with_flag() {
        let trigger = custom_event_trigger(
            "purchase",
            &[ConditionSpec {
                logic: "match_regex_ignore_case".to_string(),
                condition: "{{event}}".to_string(),
                value: "^buy_.*".to_string(),
            }],
        )
        .unwrap();
        let filters = trigger.custom_event_filter.as_ref().unwrap();
        assert_eq!(filters[0].kind, "matchRegex");
        assert!(
            filters[0]
                .parameter
                .iter()
                .any(|p| p.key.as_deref() == Some("ignore_case"))
        );
    }

    #[test]
    fn unrecognized_condition_logic_is_an_error() {
        let result = custom_event_trigger(
            "broken",
            &[ConditionSpec {
                logic: "sounds_like".to_string(),
                condition: "{{event}}".to_string(),
                value: "x".to_string(),
            }],
        );
        assert!(matches!(result, Err(Error::Validation { .. })));
    }
}
