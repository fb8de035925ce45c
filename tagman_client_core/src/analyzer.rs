//! Cross-reference analysis over container entities
//!
//! Pure functions that compute which triggers and variables are actually
//! referenced inside a container, given the full entity listings. No I/O;
//! callers fetch the listings and act on the resulting sets.
//!
//! Variable detection is a textual heuristic: a variable counts as used
//! when its `{{name}}` token appears as a substring of the serialized
//! form of some tag, trigger, or scannable variable. That gives false
//! positives when one name's token happens to occur inside unrelated
//! text, and false negatives around escaping. This is the documented
//! behavior, not a bug; a structural walk of parameter trees would be a
//! separate, stricter mode.

use crate::entities::{Tag, Trigger, Variable, variable_type};
use serde::Serialize;
use std::collections::BTreeSet;

/// The `{{name}}` token form under which a variable is referenced.
pub fn variable_token(name: &str) -> String {
    format!("{{{{{name}}}}}")
}

/// Flat textual form of an entity for substring scanning.
///
/// Field order is deterministic (struct declaration order, retained
/// unknown fields sorted by key) so repeated runs scan identical text.
fn scan_text<T: Serialize>(entity: &T) -> String {
    serde_json::to_string(entity).unwrap_or_default()
}

/// Compute the ids of variables referenced by a `{{name}}` token anywhere
/// in the container.
///
/// The scan corpus is every tag, every custom-script variable, every
/// lookup-table variable, and every trigger. Other variable types are not
/// scanned as referrers; their configuration cannot embed tokens.
pub fn used_variable_ids(
    tags: &[Tag],
    triggers: &[Trigger],
    variables: &[Variable],
) -> BTreeSet<String> {
    let mut corpus: Vec<String> = tags.iter().map(scan_text).collect();
    corpus.extend(
        variables
            .iter()
            .filter(|v| v.kind == variable_type::CUSTOM_SCRIPT || v.kind == variable_type::LOOKUP_TABLE)
            .map(scan_text),
    );
    corpus.extend(triggers.iter().map(scan_text));

    let mut used = BTreeSet::new();
    for variable in variables {
        let token = variable_token(&variable.name);
        if corpus.iter().any(|text| text.contains(&token)) {
            log::debug!("variable {} ({}) is referenced", variable.variable_id, variable.name);
            used.insert(variable.variable_id.clone());
        }
    }
    used
}

/// Compute the union of trigger ids referenced from any tag's firing,
/// blocking, or legacy rule id lists.
///
/// A tag lacking all four lists contributes nothing; that is an ordinary
/// state for paused or teardown tags, not an error.
pub fn firing_trigger_ids(tags: &[Tag]) -> BTreeSet<String> {
    let mut ids = BTreeSet::new();
    for tag in tags {
        for list in [
            &tag.firing_trigger_id,
            &tag.blocking_trigger_id,
            &tag.firing_rule_id,
            &tag.blocking_rule_id,
        ]
        .into_iter()
        .flatten()
        {
            ids.extend(list.iter().cloned());
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Parameter;
    use proptest::prelude::*;

    fn variable(id: &str, name: &str) -> Variable {
        Variable {
            variable_id: id.to_string(),
            name: name.to_string(),
            kind: variable_type::DATA_LAYER.to_string(),
            ..Default::default()
        }
    }

    fn tag_with_value(value: &str) -> Tag {
        Tag {
            tag_id: "1".to_string(),
            name: "t".to_string(),
            kind: "ua".to_string(),
            parameter: vec![Parameter::template("trackingId", value)],
            ..Default::default()
        }
    }

    #[test]
    fn empty_container_has_empty_used_set() {
        let variables = vec![variable("1", "x"), variable("2", "y")];
        let used = used_variable_ids(&[], &[], &variables);
        assert!(used.is_empty());
    }

    #[test]
    fn variable_referenced_from_tag_is_used() {
        let variables = vec![variable("1", "x")];
        let tags = vec![tag_with_value("prefix {{x}} suffix")];
        let used = used_variable_ids(&tags, &[], &variables);
        assert_eq!(used, BTreeSet::from(["1".to_string()]));
    }

    #[test]
    fn unreferenced_variable_stays_out_of_used_set() {
        let variables = vec![variable("1", "x"), variable("2", "y")];
        let tags = vec![tag_with_value("{{x}}")];
        let used = used_variable_ids(&tags, &[], &variables);
        assert!(used.contains("1"));
        assert!(!used.contains("2"));
    }

    #[test]
    fn variable_referenced_from_custom_script_variable_is_used() {
        let mut script = variable("9", "helper");
        script.kind = variable_type::CUSTOM_SCRIPT.to_string();
        script.parameter = vec![Parameter::template("javascript", "function(){return {{x}};}")];
        let variables = vec![variable("1", "x"), script];
        let used = used_variable_ids(&[], &[], &variables);
        assert_eq!(used, BTreeSet::from(["1".to_string()]));
    }

    #[test]
    fn variable_referenced_only_from_constant_variable_is_not_used() {
        // Constant variables are not part of the scan corpus.
        let mut constant = variable("9", "other");
        constant.kind = variable_type::CONSTANT.to_string();
        constant.parameter = vec![Parameter::template("value", "{{x}}")];
        let variables = vec![variable("1", "x"), constant];
        let used = used_variable_ids(&[], &[], &variables);
        assert!(used.is_empty());
    }

    #[test]
    fn variable_referenced_from_trigger_is_used() {
        let trigger = Trigger {
            trigger_id: "7".to_string(),
            name: "click".to_string(),
            kind: "click".to_string(),
            filter: Some(vec![crate::entities::Condition {
                kind: "equals".to_string(),
                parameter: vec![
                    Parameter::template("arg0", "{{Click Classes}}"),
                    Parameter::template("arg1", "buy"),
                ],
            }]),
            ..Default::default()
        };
        let variables = vec![variable("3", "Click Classes")];
        let used = used_variable_ids(&[], &[trigger], &variables);
        assert_eq!(used, BTreeSet::from(["3".to_string()]));
    }

    #[test]
    fn substring_token_hit_counts_as_used() {
        // Textual heuristic: the token matching anywhere in the text is
        // enough, including inside a longer literal.
        let variables = vec![variable("1", "x")];
        let tags = vec![tag_with_value("{{x}}y")];
        assert_eq!(
            used_variable_ids(&tags, &[], &variables),
            BTreeSet::from(["1".to_string()])
        );
    }

    #[test]
    fn firing_set_unions_all_four_id_lists() {
        let tag = Tag {
            tag_id: "1".to_string(),
            firing_trigger_id: Some(vec!["10".to_string()]),
            blocking_trigger_id: Some(vec!["11".to_string()]),
            firing_rule_id: Some(vec!["12".to_string()]),
            blocking_rule_id: Some(vec!["13".to_string(), "10".to_string()]),
            ..Default::default()
        };
        let ids = firing_trigger_ids(&[tag]);
        assert_eq!(
            ids,
            BTreeSet::from([
                "10".to_string(),
                "11".to_string(),
                "12".to_string(),
                "13".to_string()
            ])
        );
    }

    #[test]
    fn tag_without_trigger_lists_contributes_nothing() {
        let tags = vec![tag_with_value("{{x}}")];
        assert!(firing_trigger_ids(&tags).is_empty());
    }

    proptest! {
        #[test]
        fn no_referrers_means_nothing_used(names in prop::collection::vec("[a-z]{1,12}", 0..8)) {
            let variables: Vec<Variable> = names
                .iter()
                .enumerate()
                .map(|(i, name)| variable(&i.to_string(), name))
                .collect();
            prop_assert!(used_variable_ids(&[], &[], &variables).is_empty());
        }

        #[test]
        fn tags_without_token_syntax_reference_nothing(
            names in prop::collection::vec("[a-z]{1,12}", 1..6),
            values in prop::collection::vec("[a-zA-Z0-9 ]{0,24}", 1..6),
        ) {
            let variables: Vec<Variable> = names
                .iter()
                .enumerate()
                .map(|(i, name)| variable(&i.to_string(), name))
                .collect();
            let tags: Vec<Tag> = values.iter().map(|v| tag_with_value(v)).collect();
            prop_assert!(used_variable_ids(&tags, &[], &variables).is_empty());
        }
    }
}
