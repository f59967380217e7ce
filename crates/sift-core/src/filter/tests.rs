use super::*;
use crate::{
    error::ConfigError,
    model::{Category, Value},
    param::Param,
    query::{Pattern, Predicate},
};
use serde_json::json;

fn def(kind: FilterKind, category: Category, options: Vec<FilterOption>) -> FilterDefinition {
    FilterDefinition::create(kind, "person", category, options)
        .expect("filter definition should succeed")
}

fn raw(value: serde_json::Value) -> Param {
    Param::from(value)
}

fn colors() -> SetValues {
    SetValues::list(["red", "green", "blue"])
}

//
// definitions
//

#[test]
fn create_rejects_illegal_category() {
    let err = FilterDefinition::create(FilterKind::Range, "person", Category::String, vec![])
        .expect_err("range over strings should fail");

    assert_eq!(
        err,
        ConfigError::IllegalCategory {
            kind: FilterKind::Range,
            category: Category::String,
        }
    );
}

#[test]
fn create_rejects_string_only_options_elsewhere() {
    let err = FilterDefinition::create(
        FilterKind::Default,
        "person",
        Category::Numeric,
        vec![FilterOption::Blank],
    )
    .expect_err("blank on numeric should fail");

    assert!(matches!(err, ConfigError::IllegalOption { option: "blank", .. }));
}

#[test]
fn create_rejects_options_foreign_to_kind() {
    let err = FilterDefinition::create(
        FilterKind::Pattern,
        "person",
        Category::String,
        vec![FilterOption::Multiple],
    )
    .expect_err("multiple on pattern should fail");

    assert!(matches!(err, ConfigError::IllegalOption { option: "multiple", .. }));
}

#[test]
fn create_rejects_duplicate_options() {
    let err = FilterDefinition::create(
        FilterKind::Default,
        "person",
        Category::String,
        vec![FilterOption::Not, FilterOption::Not],
    )
    .expect_err("duplicate option should fail");

    assert_eq!(
        err,
        ConfigError::DuplicateOption {
            kind: FilterKind::Default,
            option: "not",
        }
    );
}

#[test]
fn set_requires_non_empty_values() {
    let missing = FilterDefinition::create(FilterKind::Set, "person", Category::String, vec![])
        .expect_err("set without values should fail");
    assert!(matches!(missing, ConfigError::MissingOption { option: "values", .. }));

    let empty = FilterDefinition::create(
        FilterKind::Set,
        "person",
        Category::String,
        vec![FilterOption::Values(SetValues::default())],
    )
    .expect_err("set with empty values should fail");
    assert!(matches!(empty, ConfigError::EmptySetValues { .. }));
}

#[test]
fn null_blank_and_empty_are_exclusive() {
    let err = FilterDefinition::create(
        FilterKind::Null,
        "person",
        Category::String,
        vec![FilterOption::Blank, FilterOption::Empty],
    )
    .expect_err("blank with empty should fail");

    assert!(matches!(err, ConfigError::ExclusiveOptions { .. }));
}

#[test]
fn non_true_is_boolean_only() {
    let ok = def(
        FilterKind::Boolean,
        Category::Boolean,
        vec![FilterOption::NonTrue, FilterOption::Radio],
    );
    assert!(ok.non_true());
    assert_eq!(ok.presentation(), Presentation::Radio);

    let err = FilterDefinition::create(
        FilterKind::Default,
        "person",
        Category::Boolean,
        vec![FilterOption::NonTrue],
    )
    .expect_err("non_true on default should fail");
    assert!(matches!(err, ConfigError::IllegalOption { .. }));
}

#[test]
fn options_deserialize_from_config() {
    let options: Vec<FilterOption> = serde_json::from_value(json!([
        "not",
        "multiple",
        { "display": "Colour" },
        { "values": ["red", "green"] },
    ]))
    .expect("options should deserialize");

    let def = def(FilterKind::Set, Category::String, options);
    assert!(def.negatable());
    assert!(def.multiple());
    assert_eq!(def.display(), Some("Colour"));
    assert_eq!(def.values().get(1), Some(("green", &Value::from("green"))));
}

#[test]
fn labelled_set_values_keep_order() {
    let values: SetValues = serde_json::from_value(json!([["Low", "1"], ["High", "9"]]))
        .expect("pairs should deserialize");

    let labels: Vec<&str> = values.iter().map(|(label, _)| label).collect();
    assert_eq!(labels, ["Low", "High"]);
}

#[test]
fn set_values_from_config_take_the_attribute_category() {
    let options: Vec<FilterOption> =
        serde_json::from_value(json!([{ "values": ["1", "2", " 3 "] }]))
            .expect("options should deserialize");
    let def = def(FilterKind::Set, Category::Numeric, options);
    assert_eq!(def.values().get(2), Some((" 3 ", &Value::Int(3))));

    let mut state = FilterState::new("rank", &def);
    assert!(state.mutate(&def, &raw(json!({ "selected": "0" }))));
    assert_eq!(
        state.atom(&def, "rank"),
        Some(Predicate::eq("rank", Value::Int(1)))
    );
}

#[test]
fn set_values_outside_the_category_are_rejected() {
    let err = FilterDefinition::create(
        FilterKind::Set,
        "person",
        Category::Numeric,
        vec![FilterOption::Values(SetValues::list(["1", "two"]))],
    )
    .expect_err("non-numeric set value should fail");
    assert_eq!(
        err,
        ConfigError::SetValueCategory {
            entity: "person".to_string(),
            value: "two".to_string(),
            category: Category::Numeric,
        }
    );

    let err = FilterDefinition::create(
        FilterKind::Set,
        "person",
        Category::String,
        vec![FilterOption::Values(SetValues::list([1_i64, 2]))],
    )
    .expect_err("numeric value on a string set should fail");
    assert!(matches!(err, ConfigError::SetValueCategory { .. }));
}

//
// default
//

#[test]
fn default_begins_compiles_to_starts_with() {
    let def = def(FilterKind::Default, Category::String, vec![FilterOption::Not]);
    let mut state = FilterState::new("name", &def);

    assert!(state.mutate(&def, &raw(json!({ "comparison": "begins", "value": "ab" }))));
    assert_eq!(
        state.atom(&def, "name"),
        Some(Predicate::compare("name", crate::query::CompareOp::StartsWith, Value::from("ab")))
    );

    assert!(state.mutate(&def, &raw(json!({ "not": "1" }))));
    assert_eq!(
        state.atom(&def, "name"),
        Some(Predicate::not(Predicate::compare(
            "name",
            crate::query::CompareOp::StartsWith,
            Value::from("ab"),
        )))
    );
}

#[test]
fn default_numeric_negation_inverts_operator() {
    let def = def(FilterKind::Default, Category::Numeric, vec![FilterOption::Not]);
    let mut state = FilterState::new("age", &def);

    state.mutate(
        &def,
        &raw(json!({ "comparison": "greater", "value": "30", "not": "true" })),
    );

    assert_eq!(
        state.atom(&def, "age"),
        Some(Predicate::lte("age", Value::Int(30)))
    );
    assert_eq!(
        state.describe(&def, "Age").as_deref(),
        Some("Age is at most 30")
    );
}

#[test]
fn negation_is_ignored_without_not_option() {
    let def = def(FilterKind::Default, Category::Numeric, vec![]);
    let mut state = FilterState::new("age", &def);

    let outcome = state.apply(&def, &raw(json!({ "not": "1", "value": "4" })));
    assert_eq!(outcome.ignored, 1);
    assert!(!state.negated);
    assert_eq!(state.atom(&def, "age"), Some(Predicate::eq("age", Value::Int(4))));
}

#[test]
fn pseudo_comparison_clears_value() {
    let def = def(FilterKind::Default, Category::String, vec![FilterOption::Blank]);
    let mut state = FilterState::new("name", &def);

    state.mutate(&def, &raw(json!({ "value": "bob" })));
    assert!(state.mutate(&def, &raw(json!({ "comparison": "is_blank" }))));

    assert_eq!(
        state.fields,
        FilterFields::Default {
            comparison: Some(Comparison::IsBlank),
            value: None,
        }
    );
    assert_eq!(state.atom(&def, "name"), Some(Predicate::is_blank("name")));
}

#[test]
fn malformed_value_keeps_prior_state() {
    let def = def(FilterKind::Default, Category::Temporal, vec![]);
    let mut state = FilterState::new("born", &def);

    assert!(state.mutate(&def, &raw(json!({ "value": "2020-01-31" }))));
    let before = state.clone();

    let outcome = state.apply(&def, &raw(json!({ "value": "31/01/2020" })));
    assert!(!outcome.material);
    assert_eq!(outcome.ignored, 1);
    assert_eq!(state, before);
}

#[test]
fn comparison_change_without_value_is_not_material() {
    let def = def(FilterKind::Default, Category::Numeric, vec![]);
    let mut state = FilterState::new("age", &def);

    assert!(!state.mutate(&def, &raw(json!({ "comparison": "less" }))));
    assert!(!state.matches());
    assert!(state.mutate(&def, &raw(json!({ "value": "3" }))));
    assert!(!state.mutate(&def, &raw(json!({ "value": "3" }))));
    assert!(state.mutate(&def, &raw(json!({ "value": "" }))));
}

#[test]
fn temporal_aliases_parse() {
    let def = def(FilterKind::Default, Category::Temporal, vec![]);

    assert_eq!(Comparison::parse("Before", &def), Some(Comparison::Less));
    assert_eq!(Comparison::parse("on_or_after", &def), Some(Comparison::GreaterOrEqual));
    assert_eq!(Comparison::parse("begins", &def), None);
}

#[test]
fn default_boolean_needs_no_value() {
    let def = def(FilterKind::Default, Category::Boolean, vec![]);
    let mut state = FilterState::new("active", &def);
    assert!(!state.matches());

    assert!(state.mutate(&def, &raw(json!({ "comparison": "false" }))));
    assert_eq!(
        state.atom(&def, "active"),
        Some(Predicate::eq("active", Value::Bool(false)))
    );
}

//
// set
//

#[test]
fn set_single_index_compiles_to_equality() {
    let def = def(FilterKind::Set, Category::String, vec![FilterOption::Values(colors())]);
    let mut state = FilterState::new("color", &def);

    assert!(state.mutate(&def, &raw(json!({ "selected": "1" }))));
    assert_eq!(
        state.atom(&def, "color"),
        Some(Predicate::eq("color", Value::from("green")))
    );
}

#[test]
fn set_rejects_out_of_range_and_multiple_without_option() {
    let def = def(FilterKind::Set, Category::String, vec![FilterOption::Values(colors())]);
    let mut state = FilterState::new("color", &def);

    assert_eq!(state.apply(&def, &raw(json!({ "selected": "3" }))).ignored, 1);
    assert_eq!(state.apply(&def, &raw(json!({ "selected": "-1" }))).ignored, 1);
    assert_eq!(state.apply(&def, &raw(json!({ "selected": ["0", "2"] }))).ignored, 1);
    assert!(!state.matches());
}

#[test]
fn set_multiple_with_pseudo_member() {
    let def = def(
        FilterKind::Set,
        Category::String,
        vec![
            FilterOption::Values(colors()),
            FilterOption::Multiple,
            FilterOption::Unset,
            FilterOption::Not,
        ],
    );
    let mut state = FilterState::new("color", &def);

    state.mutate(&def, &raw(json!({ "selected": ["2", "0", "-1", "0"] })));
    assert_eq!(
        state.fields,
        FilterFields::Set {
            selected: vec![-1, 0, 2]
        }
    );
    assert_eq!(
        state.atom(&def, "color"),
        Some(Predicate::Or(vec![
            Predicate::In {
                field: "color".to_string(),
                values: vec![Value::from("red"), Value::from("blue")],
            },
            Predicate::is_null("color"),
        ]))
    );

    state.mutate(&def, &raw(json!({ "not": "1" })));
    assert_eq!(
        state.atom(&def, "color"),
        Some(Predicate::And(vec![
            Predicate::NotIn {
                field: "color".to_string(),
                values: vec![Value::from("red"), Value::from("blue")],
            },
            Predicate::is_not_null("color"),
        ]))
    );
    assert_eq!(
        state.describe(&def, "Color").as_deref(),
        Some("Color is none of unset, red, blue")
    );
}

//
// null / boolean
//

#[test]
fn null_tri_state() {
    let def = def(FilterKind::Null, Category::String, vec![FilterOption::Blank]);
    let mut state = FilterState::new("nick", &def);

    assert!(state.mutate(&def, &raw(json!({ "value": "true" }))));
    assert_eq!(state.atom(&def, "nick"), Some(Predicate::is_blank("nick")));

    assert!(state.mutate(&def, &raw(json!({ "value": "false" }))));
    assert_eq!(state.atom(&def, "nick"), Some(Predicate::is_not_blank("nick")));

    assert!(state.mutate(&def, &raw(json!({ "value": "" }))));
    assert_eq!(state.atom(&def, "nick"), None);
}

#[test]
fn boolean_non_true_false_branch() {
    let def = def(
        FilterKind::Boolean,
        Category::Boolean,
        vec![FilterOption::NonTrue, FilterOption::Not],
    );
    let mut state = FilterState::new("active", &def);

    state.mutate(&def, &raw(json!({ "value": "0" })));
    assert_eq!(
        state.atom(&def, "active"),
        Some(Predicate::ne("active", Value::Bool(true)))
    );

    state.mutate(&def, &raw(json!({ "not": "1" })));
    assert_eq!(
        state.atom(&def, "active"),
        Some(Predicate::eq("active", Value::Bool(true)))
    );
}

#[test]
fn boolean_plain_false_branch() {
    let def = def(FilterKind::Boolean, Category::Boolean, vec![]);
    let mut state = FilterState::new("active", &def);

    state.mutate(&def, &raw(json!({ "value": "no" })));
    assert_eq!(
        state.atom(&def, "active"),
        Some(Predicate::eq("active", Value::Bool(false)))
    );
    assert_eq!(
        state.describe(&def, "Active").as_deref(),
        Some("Active is false")
    );
}

//
// range / pattern
//

#[test]
fn range_applies_only_with_both_bounds() {
    let def = def(FilterKind::Range, Category::Numeric, vec![FilterOption::Not]);
    let mut state = FilterState::new("age", &def);

    assert!(!state.mutate(&def, &raw(json!({ "first": "18" }))));
    assert_eq!(state.atom(&def, "age"), None);

    assert!(state.mutate(&def, &raw(json!({ "last": "65" }))));
    assert_eq!(
        state.atom(&def, "age"),
        Some(Predicate::between("age", Value::Int(18), Value::Int(65)))
    );

    state.mutate(&def, &raw(json!({ "not": "on" })));
    assert_eq!(
        state.atom(&def, "age"),
        Some(Predicate::not(Predicate::between(
            "age",
            Value::Int(18),
            Value::Int(65)
        )))
    );
}

#[test]
fn pattern_compiles_wildcards() {
    let def = def(FilterKind::Pattern, Category::String, vec![FilterOption::Not]);
    let mut state = FilterState::new("email", &def);

    state.mutate(&def, &raw(json!({ "value": "*@example.com" })));
    assert_eq!(
        state.atom(&def, "email"),
        Some(Predicate::matches("email", Pattern::parse("*@example.com")))
    );

    state.mutate(&def, &raw(json!({ "not": "1" })));
    assert_eq!(
        state.atom(&def, "email"),
        Some(Predicate::not_matches("email", Pattern::parse("*@example.com")))
    );
}

//
// lifecycle
//

#[test]
fn reset_reports_material_only_when_applying() {
    let def = def(FilterKind::Pattern, Category::String, vec![]);
    let mut state = FilterState::new("email", &def);
    assert!(!state.reset(&def));

    state.mutate(&def, &raw(json!({ "value": "a*" })));
    assert!(state.reset(&def));
    assert_eq!(state, FilterState::new("email", &def));
}

#[test]
fn conforms_detects_stale_state() {
    let set = def(FilterKind::Set, Category::String, vec![FilterOption::Values(colors())]);
    let pattern = def(FilterKind::Pattern, Category::String, vec![]);

    let mut state = FilterState::new("color", &set);
    state.fields = FilterFields::Set { selected: vec![7] };

    assert!(!state.conforms(&set));
    assert!(!FilterState::new("color", &set).conforms(&pattern));
    assert!(FilterState::new("color", &set).conforms(&set));
}

#[test]
fn state_serializes_with_kind_tag() {
    let def = def(FilterKind::Range, Category::Numeric, vec![]);
    let mut state = FilterState::new("age", &def);
    state.mutate(&def, &raw(json!({ "first": "1", "last": "2" })));

    let json = serde_json::to_value(&state).expect("serialize should succeed");
    assert_eq!(json["kind"], "range");
    assert_eq!(json["attribute"], "age");

    let back: FilterState = serde_json::from_value(json).expect("deserialize should succeed");
    assert_eq!(back, state);
}
