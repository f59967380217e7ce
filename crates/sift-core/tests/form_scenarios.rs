//! End-to-end interactions against the in-memory store.

use serde_json::json;
use sift_core::{
    ConfigError,
    binding::{BindOptions, BindingId, Selector},
    config::Settings,
    filter::{FilterKind, FilterOption, SetValues},
    form::{Form, PageItem},
    model::{AccessorModel, Category, EntityModel, Value},
    obs::{metrics_report, metrics_reset_all},
    param::Params,
    query::{CompareOp, Predicate},
    schema::{Schema, SchemaBuilder},
    state::{EndpointState, MemorySessionStore, RuntimeState, SessionStore, StateKey},
    store::{MemoryRecord, MemoryStore, Record},
};
use time::{Date, Month};

const COLORS: [&str; 3] = ["red", "green", "blue"];

///
/// Fixture
///

struct Fixture {
    schema: Schema,
    store: MemoryStore,
    all: BindingId,
    reviews: BindingId,
    in_stock: BindingId,
}

fn catalog(builder: &mut SchemaBuilder) {
    builder
        .entity(
            EntityModel::new("product")
                .field("id", "bigint")
                .field("name", "varchar")
                .field("color", "varchar")
                .field("price", "integer")
                .field("stock", "integer")
                .field("released", "date")
                .field("note", "text")
                .accessor(AccessorModel::scope("in_stock", "product"))
                .accessor(AccessorModel::has_many("reviews", "review")),
        )
        .expect("product should register");
    builder
        .entity(
            EntityModel::new("review")
                .field("id", "bigint")
                .field("product_id", "bigint")
                .field("stars", "integer"),
        )
        .expect("review should register");
}

fn fixture() -> Fixture {
    let mut builder = SchemaBuilder::new();
    catalog(&mut builder);
    builder
        .settings(Settings {
            default_per_page: 10,
            ..Settings::default()
        })
        .expect("settings should validate");

    for name in ["id", "stock"] {
        builder
            .define("product", name, &[name], None)
            .expect("define should succeed")
            .displayable(None)
            .sortable(None)
            .expect("sortable should succeed");
    }
    builder
        .define("product", "name", &["name"], None)
        .expect("define should succeed")
        .displayable(None)
        .sortable(None)
        .expect("sortable should succeed")
        .searchable(FilterKind::Default, vec![FilterOption::Not])
        .expect("searchable should succeed");
    builder
        .define("product", "color", &["color"], None)
        .expect("define should succeed")
        .displayable(None)
        .sortable(None)
        .expect("sortable should succeed")
        .searchable(
            FilterKind::Set,
            vec![
                FilterOption::Values(SetValues::list(COLORS)),
                FilterOption::Not,
                FilterOption::Unset,
            ],
        )
        .expect("searchable should succeed");
    builder
        .define("product", "price", &["price"], None)
        .expect("define should succeed")
        .displayable(Some("Price (EUR)"))
        .sortable(None)
        .expect("sortable should succeed")
        .searchable(FilterKind::Default, vec![FilterOption::Not])
        .expect("searchable should succeed");
    builder
        .define("product", "released", &["released"], None)
        .expect("define should succeed")
        .displayable(None)
        .searchable(FilterKind::Range, vec![FilterOption::Not])
        .expect("searchable should succeed");
    builder
        .define("product", "note", &["note"], None)
        .expect("define should succeed")
        .searchable(FilterKind::Null, vec![FilterOption::Blank])
        .expect("searchable should succeed");
    builder
        .define("review", "stars", &["stars"], None)
        .expect("define should succeed")
        .displayable(None)
        .sortable(None)
        .expect("sortable should succeed")
        .searchable(FilterKind::Default, vec![])
        .expect("searchable should succeed");

    let all = builder
        .bind(
            "catalog",
            BindOptions::new("product")
                .handle("all")
                .child(BindOptions::new("review").accessor("reviews")),
        )
        .expect("bind should succeed");
    let in_stock = builder
        .bind("catalog", BindOptions::new("product").accessor("in_stock"))
        .expect("bind should succeed");

    Fixture {
        schema: builder.build(),
        store: store(),
        all,
        reviews: BindingId(all.0 + 1),
        in_stock,
    }
}

// 200 products: price = id, color cycles red/green/blue, stock = id % 4,
// released on the first of month (id % 12) + 1, every tenth note is null
// and every tenth (offset five) note is empty.
fn store() -> MemoryStore {
    let mut store = MemoryStore::new();

    for id in 1..=200_i64 {
        let month = u8::try_from(id % 12 + 1)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .expect("month should be valid");
        let released = Date::from_calendar_date(2024, month, 1).expect("date should be valid");
        let note = match id % 10 {
            0 => Value::Null,
            5 => Value::from(""),
            _ => Value::from("ok"),
        };
        let color = COLORS[usize::try_from((id - 1) % 3).expect("index fits")];

        store.insert(
            "product",
            MemoryRecord::new()
                .with("id", id)
                .with("name", format!("Item {id:03}"))
                .with("color", color)
                .with("price", id)
                .with("stock", id % 4)
                .with("released", released)
                .with("note", note),
        );
    }

    let reviews: [(i64, i64, i64); 3] = [(1, 1, 5), (2, 1, 3), (3, 2, 4)];
    for (id, product, stars) in reviews {
        store.insert(
            "review",
            MemoryRecord::new()
                .with("id", id)
                .with("product_id", product)
                .with("stars", stars),
        );
    }

    store.scope("product", "in_stock", Predicate::gt("stock", Value::Int(0)));
    store.relation("product", "reviews", "review", "id", "product_id");

    store
}

fn ids<R: Record>(records: &[R]) -> Vec<i64> {
    records
        .iter()
        .filter_map(|r| match r.field("id") {
            Some(Value::Int(id)) => Some(id),
            _ => None,
        })
        .collect()
}

fn params(value: serde_json::Value) -> Params {
    Params::from(value)
}

//
// registration
//

#[test]
fn literal_attributes_infer_their_category() {
    let fixture = fixture();
    let price = fixture
        .schema
        .attribute("product", "price")
        .expect("price should be registered");
    assert_eq!(price.category(), Category::Numeric);
    assert_eq!(price.caption(), "Price (EUR)");

    let mut builder = SchemaBuilder::new();
    catalog(&mut builder);
    let err = builder
        .define("product", "price", &["price"], Some("text"))
        .err()
        .expect("mismatched category should fail");
    assert!(matches!(err, ConfigError::CategoryMismatch { .. }));

    let err = builder
        .define("product", "label", &["name", "color"], None)
        .err()
        .expect("logical attribute without category should fail");
    assert!(matches!(err, ConfigError::LogicalWithoutCategory { .. }));
}

#[test]
fn binding_paths_resolve_from_the_endpoint() {
    let fixture = fixture();
    let bindings = fixture.schema.bindings();

    let reviews = bindings
        .lookup("catalog", &["all".into(), "reviews".into()])
        .expect("nested path should resolve");
    assert_eq!(reviews.id, fixture.reviews);

    let stock = bindings
        .lookup("catalog", &[Selector::Handle("in_stock".to_string())])
        .expect("handle should resolve");
    assert_eq!(stock.id, fixture.in_stock);

    // both roots bind "product"
    assert!(
        bindings
            .lookup("catalog", &[Selector::Entity("product".to_string())])
            .is_none()
    );
}

//
// predicate composition
//

#[test]
fn string_begins_and_its_negation() {
    let fixture = fixture();
    let mut state = RuntimeState::new(fixture.schema.settings());
    let mut form = Form::new(&fixture.schema, fixture.all, &mut state, &fixture.store, None)
        .expect("form should build");

    form.update(&params(json!({ "add_filter": "name" })), None)
        .expect("update should succeed");
    form.update(
        &params(json!({ "filters": [{ "comparison": "begins", "value": "Item 01" }] })),
        Some("update"),
    )
    .expect("update should succeed");

    let begins = Predicate::compare("name", CompareOp::StartsWith, Value::from("Item 01"));
    assert_eq!(form.filter_predicate(), Some(begins.clone()));
    assert_eq!(form.state().total(), 10);

    form.update(&params(json!({ "filters": [{ "not": "1" }] })), Some("update"))
        .expect("update should succeed");
    assert_eq!(form.filter_predicate(), Some(Predicate::not(begins)));
    assert_eq!(form.state().total(), 190);
}

#[test]
fn single_set_selection_is_equality() {
    let fixture = fixture();
    let mut state = RuntimeState::new(fixture.schema.settings());
    let mut form = Form::new(&fixture.schema, fixture.all, &mut state, &fixture.store, None)
        .expect("form should build");

    form.update(&params(json!({ "add_filter": "color" })), None)
        .expect("update should succeed");
    form.update(
        &params(json!({ "filters": [{ "selected": "1" }] })),
        Some("update"),
    )
    .expect("update should succeed");

    assert_eq!(
        form.filter_predicate(),
        Some(Predicate::eq("color", Value::from("green")))
    );
    assert_eq!(form.state().total(), 67);

    // several values need the multiple option; the selection is kept
    form.update(
        &params(json!({ "filters": [{ "selected": ["0", "1"] }] })),
        Some("update"),
    )
    .expect("update should succeed");
    assert_eq!(form.state().total(), 67);
    assert_eq!(
        form.active_filters()[0].description.as_deref(),
        Some("Color is green")
    );
}

#[test]
fn negated_greater_is_at_most() {
    let fixture = fixture();
    let mut state = RuntimeState::new(fixture.schema.settings());
    let mut form = Form::new(&fixture.schema, fixture.all, &mut state, &fixture.store, None)
        .expect("form should build");

    form.add_filter("price");
    form.update(
        &params(json!({
            "filters": { "0": { "comparison": "greater", "value": "30", "not": "1" } }
        })),
        Some("update"),
    )
    .expect("update should succeed");

    assert_eq!(
        form.filter_predicate(),
        Some(Predicate::lte("price", Value::Int(30)))
    );
    assert_eq!(form.state().total(), 30);
    assert_eq!(
        form.active_filters()[0].description.as_deref(),
        Some("Price (EUR) is at most 30")
    );
}

#[test]
fn filters_conjoin_across_attributes() {
    let fixture = fixture();
    let mut state = RuntimeState::new(fixture.schema.settings());
    let mut form = Form::new(&fixture.schema, fixture.all, &mut state, &fixture.store, None)
        .expect("form should build");

    form.add_filter("released");
    form.add_filter("note");
    form.update(
        &params(json!({
            "filters": [
                { "first": "2024-03-01", "last": "2024-04-30" },
                { "value": "1" }
            ]
        })),
        Some("update"),
    )
    .expect("update should succeed");

    // months 3 and 4 hold ids with id % 12 in {2, 3}; blank notes are
    // ids ending in 0 or 5
    let expected = (1..=200_i64)
        .filter(|id| matches!(id % 12, 2 | 3) && matches!(id % 10, 0 | 5))
        .count() as u64;
    assert_eq!(form.state().total(), expected);

    let descriptions: Vec<String> = form
        .active_filters()
        .into_iter()
        .filter_map(|filter| filter.description)
        .collect();
    assert_eq!(
        descriptions,
        [
            "Released is between 2024-03-01 and 2024-04-30",
            "Note is blank",
        ]
    );
}

//
// ordering
//

#[test]
fn sort_toggles_promotes_and_evicts() {
    let fixture = fixture();
    let mut state = RuntimeState::new(fixture.schema.settings());
    let mut form = Form::new(&fixture.schema, fixture.all, &mut state, &fixture.store, None)
        .expect("form should build");

    form.update(&params(json!({ "sort": "price" })), None)
        .expect("update should succeed");
    assert_eq!(ids(form.records())[..3], [1, 2, 3]);

    form.update(&params(json!({ "sort": "price" })), None)
        .expect("update should succeed");
    assert_eq!(form.state().sorts.len(), 1);
    assert_eq!(form.sort_indicator("price"), Some((1, true)));
    assert_eq!(ids(form.records())[..3], [200, 199, 198]);

    for name in ["stock", "color", "id"] {
        form.update(&params(json!({ "sort": name })), None)
            .expect("update should succeed");
    }

    let order: Vec<&str> = form
        .state()
        .sorts
        .iter()
        .map(|clause| clause.attribute.as_str())
        .collect();
    assert_eq!(order, ["id", "color", "stock"]);
    assert_eq!(form.sort_indicator("price"), None);
}

#[test]
fn sort_change_returns_to_first_record() {
    let fixture = fixture();
    let mut state = RuntimeState::new(fixture.schema.settings());
    let mut form = Form::new(&fixture.schema, fixture.all, &mut state, &fixture.store, None)
        .expect("form should build");

    form.update(&params(json!({ "offset": "57" })), None)
        .expect("update should succeed");
    assert_eq!((form.state().page(), form.state().selected()), (6, 8));

    form.update(&params(json!({ "sort": "stock" })), None)
        .expect("update should succeed");
    assert_eq!(form.state().offset(), 0);
}

//
// pagination
//

#[test]
fn page_window_around_the_middle() {
    let fixture = fixture();
    let mut state = RuntimeState::new(fixture.schema.settings());
    let mut form = Form::new(&fixture.schema, fixture.all, &mut state, &fixture.store, None)
        .expect("form should build");

    form.update(&params(json!({ "page": "10" })), None)
        .expect("update should succeed");
    assert_eq!(form.total_pages(), 20);

    let window = form.pagination();
    assert_eq!(window.main, Some(6..=14));
    assert_eq!(window.first, Some(1..=2));
    assert_eq!(window.last, Some(19..=20));
    assert!(window.gap_before && window.gap_after);

    let gaps = window
        .items()
        .iter()
        .filter(|item| **item == PageItem::Gap)
        .count();
    assert_eq!(gaps, 2);
}

#[test]
fn per_page_change_keeps_the_selected_record() {
    let fixture = fixture();
    let mut state = RuntimeState::new(fixture.schema.settings());
    let mut form = Form::new(&fixture.schema, fixture.all, &mut state, &fixture.store, None)
        .expect("form should build");

    form.update(&params(json!({ "page": "4", "record": "3" })), None)
        .expect("update should succeed");
    let selected = form.selected_record().cloned();
    assert_eq!(form.state().offset(), 32);

    form.update(&params(json!({ "per_page": "25" })), None)
        .expect("update should succeed");
    assert_eq!(form.state().offset(), 32);
    assert_eq!((form.state().page(), form.state().selected()), (2, 8));
    assert_eq!(form.selected_record().cloned(), selected);

    // clamped to the configured maximum and at least one
    form.update(&params(json!({ "per_page": "0" })), None)
        .expect("update should succeed");
    assert_eq!(form.state().per_page(), 1);
    assert_eq!(form.state().page(), 33);
}

#[test]
fn reload_twice_is_stable() {
    let fixture = fixture();
    let mut state = RuntimeState::new(fixture.schema.settings());
    let mut form = Form::new(&fixture.schema, fixture.all, &mut state, &fixture.store, None)
        .expect("form should build");

    form.update(&params(json!({ "sort": "color", "page": "7" })), None)
        .expect("update should succeed");

    form.reload().expect("reload should succeed");
    let first = (ids(form.records()), form.state().clone(), form.pagination());
    form.reload().expect("reload should succeed");
    let second = (ids(form.records()), form.state().clone(), form.pagination());

    assert_eq!(first, second);
}

//
// scoping
//

#[test]
fn root_accessor_scopes_the_collection() {
    let fixture = fixture();
    let mut state = RuntimeState::new(fixture.schema.settings());
    let mut form = Form::new(
        &fixture.schema,
        fixture.in_stock,
        &mut state,
        &fixture.store,
        None,
    )
    .expect("form should build");

    form.reload().expect("reload should succeed");
    assert_eq!(form.state().total(), 150);
    assert_eq!(ids(form.records())[..3], [1, 2, 3]);
}

#[test]
fn child_binding_follows_the_parent_selection() {
    let fixture = fixture();

    let mut parent_state = RuntimeState::new(fixture.schema.settings());
    let mut parent = Form::new(
        &fixture.schema,
        fixture.all,
        &mut parent_state,
        &fixture.store,
        None,
    )
    .expect("form should build");
    parent.update(&params(json!({ "record": "2" })), None)
        .expect("update should succeed");
    let product = parent.selected_record().cloned().expect("a product is selected");

    let mut state = RuntimeState::new(fixture.schema.settings());
    let mut reviews = Form::new(
        &fixture.schema,
        fixture.reviews,
        &mut state,
        &fixture.store,
        Some(&product),
    )
    .expect("form should build");
    reviews
        .update(&params(json!({ "sort": "stars" })), None)
        .expect("update should succeed");

    assert_eq!(reviews.state().total(), 1);
    assert_eq!(ids(reviews.records()), [3]);

    let mut state = RuntimeState::new(fixture.schema.settings());
    assert!(matches!(
        Form::new(&fixture.schema, fixture.reviews, &mut state, &fixture.store, None).err(),
        Some(ConfigError::MissingParentRecord { .. })
    ));
}

//
// persistence
//

#[test]
fn state_survives_a_session_round_trip() {
    let fixture = fixture();
    let mut sessions = MemorySessionStore::new();
    let key = StateKey::new("catalog", fixture.all);

    {
        let mut state = sessions
            .get(&key)
            .unwrap_or_else(|| RuntimeState::new(fixture.schema.settings()));
        {
            let mut form =
                Form::new(&fixture.schema, fixture.all, &mut state, &fixture.store, None)
                    .expect("form should build");
            form.update(&params(json!({ "add_filter": "price", "sort": "price" })), None)
                .expect("update should succeed");
            form.update(
                &params(json!({
                    "filters": [{ "comparison": "greater_or_equal", "value": "150" }],
                    "page": "3"
                })),
                Some("update"),
            )
            .expect("update should succeed");
        }
        sessions.set(key.clone(), state);
    }

    let mut endpoint = EndpointState::new();
    endpoint.insert(
        fixture.all,
        sessions.get(&key).expect("state should be stored"),
    );
    let json = endpoint.to_json().expect("state should serialize");
    let restored = EndpointState::from_json(&json).expect("state should parse");

    let mut state = restored
        .get(fixture.all)
        .cloned()
        .expect("binding state should be present");
    assert_eq!(state.total(), 51);
    assert_eq!(state.page(), 3);

    let mut form = Form::new(&fixture.schema, fixture.all, &mut state, &fixture.store, None)
        .expect("form should build");
    form.reload().expect("reload should succeed");
    assert_eq!(ids(form.records())[0], 170);

    assert!(matches!(
        EndpointState::from_json("{\"0\": {\"per_page\": \"many\"}}"),
        Err(ConfigError::InvalidState { .. })
    ));
}

#[test]
fn state_naming_unknown_attributes_is_rejected() {
    let fixture = fixture();
    let mut state: RuntimeState = serde_json::from_value(json!({
        "filters": [{ "attribute": "weight", "kind": "range" }]
    }))
    .expect("state should parse");

    let err = Form::new(&fixture.schema, fixture.all, &mut state, &fixture.store, None)
        .err()
        .expect("unknown attribute should fail");
    assert!(matches!(err, ConfigError::UnknownAttribute { .. }));
}

//
// raw input
//

#[test]
fn malformed_input_is_ignored_and_counted() {
    metrics_reset_all();
    let fixture = fixture();
    let mut state = RuntimeState::new(fixture.schema.settings());
    let mut form = Form::new(&fixture.schema, fixture.all, &mut state, &fixture.store, None)
        .expect("form should build");

    form.update(
        &params(json!({
            "add_filter": "weight",
            "per_page": "lots",
            "page": "-2",
            "sort": "released"
        })),
        None,
    )
    .expect("update should succeed");
    assert!(form.state().filters.is_empty());
    assert!(form.state().sorts.is_empty());
    assert_eq!(form.state().per_page(), 10);

    form.add_filter("price");
    form.update(
        &params(json!({ "filters": [{ "comparison": "matches", "value": "cheap" }] })),
        Some("update"),
    )
    .expect("update should succeed");
    assert!(!form.state().filters[0].matches());
    assert_eq!(form.state().total(), 200);

    let report = metrics_report();
    assert_eq!(report.counters.ops.reloads, 2);
    assert_eq!(report.counters.ops.inputs_ignored, 2);
    assert_eq!(report.entity_counters[0].entity, "product");
    assert_eq!(report.entity_counters[0].last_total, 200);
}
