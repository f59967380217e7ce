use super::*;
use crate::model::{AccessorModel, EntityModel};

fn catalog() -> Catalog {
    let mut catalog = Catalog::new();
    catalog
        .insert(
            EntityModel::new("author")
                .field("id", "integer")
                .field("name", "text")
                .accessor(AccessorModel::scope("living", "author"))
                .accessor(AccessorModel::has_many("books", "book"))
                .accessor(AccessorModel::has_one("agent", "agent")),
        )
        .expect("author insert should succeed");
    catalog
        .insert(
            EntityModel::new("book")
                .field("id", "integer")
                .field("author_id", "integer")
                .field("title", "text"),
        )
        .expect("book insert should succeed");
    catalog
        .insert(EntityModel::new("agent").field("id", "integer"))
        .expect("agent insert should succeed");

    catalog
}

#[test]
fn bind_tree_assigns_ids_in_insertion_order() {
    let catalog = catalog();
    let mut registry = BindingRegistry::new();

    let root = registry
        .bind(
            &catalog,
            "authors#index",
            BindOptions::new("author")
                .child(BindOptions::new("book").accessor("books"))
                .child(
                    BindOptions::new("agent")
                        .kind(BindingKind::Single)
                        .accessor("agent"),
                ),
        )
        .expect("bind should succeed");

    assert_eq!(root, BindingId(0));
    assert_eq!(registry.len(), 3);

    let children: Vec<&str> = registry.children(root).map(|b| b.handle.as_str()).collect();
    assert_eq!(children, ["books", "agent"]);

    let books = registry.get(BindingId(1)).expect("child should exist");
    assert_eq!(books.parent, Some(root));
    assert_eq!(books.entity, "book");

    let path: Vec<BindingId> = registry.path(BindingId(2)).iter().map(|b| b.id).collect();
    assert_eq!(path, [BindingId(0), BindingId(2)]);
}

#[test]
fn root_handle_defaults_to_accessor_then_entity() {
    let catalog = catalog();
    let mut registry = BindingRegistry::new();

    registry
        .bind(&catalog, "home", BindOptions::new("author").accessor("living"))
        .expect("scoped root should bind");
    registry
        .bind(&catalog, "home", BindOptions::new("author"))
        .expect("plain root should bind");

    let handles: Vec<&str> = registry.roots("home").map(|b| b.handle.as_str()).collect();
    assert_eq!(handles, ["living", "author"]);
}

#[test]
fn duplicate_sibling_handles_are_rejected() {
    let catalog = catalog();
    let mut registry = BindingRegistry::new();

    registry
        .bind(&catalog, "home", BindOptions::new("author"))
        .expect("first bind should succeed");
    let err = registry
        .bind(&catalog, "home", BindOptions::new("author"))
        .expect_err("duplicate handle should fail");
    assert!(matches!(err, ConfigError::DuplicateHandle { .. }));

    // other endpoints are independent
    registry
        .bind(&catalog, "away", BindOptions::new("author"))
        .expect("other endpoint should bind");
}

#[test]
fn child_requires_instance_accessor() {
    let catalog = catalog();
    let mut registry = BindingRegistry::new();

    let missing = registry
        .bind(
            &catalog,
            "home",
            BindOptions::new("author").child(BindOptions::new("book")),
        )
        .expect_err("child without accessor should fail");
    assert!(matches!(missing, ConfigError::MissingAccessor { .. }));

    let wrong_level = registry
        .bind(
            &catalog,
            "other",
            BindOptions::new("author").child(BindOptions::new("author").accessor("living")),
        )
        .expect_err("class accessor on child should fail");
    assert!(matches!(wrong_level, ConfigError::UnknownAccessor { .. }));
}

#[test]
fn accessor_target_and_cardinality_are_checked() {
    let catalog = catalog();
    let mut registry = BindingRegistry::new();

    let target = registry
        .bind(
            &catalog,
            "a",
            BindOptions::new("author").child(BindOptions::new("agent").accessor("books")),
        )
        .expect_err("wrong target should fail");
    assert!(matches!(target, ConfigError::AccessorTarget { .. }));

    let cardinality = registry
        .bind(
            &catalog,
            "b",
            BindOptions::new("author").child(BindOptions::new("agent").accessor("agent")),
        )
        .expect_err("set binding over has_one should fail");
    assert!(matches!(cardinality, ConfigError::AccessorCardinality { .. }));
}

#[test]
fn lookup_resolves_unambiguous_selectors() {
    let catalog = catalog();
    let mut registry = BindingRegistry::new();

    registry
        .bind(
            &catalog,
            "home",
            BindOptions::new("author").child(BindOptions::new("book").accessor("books")),
        )
        .expect("bind should succeed");
    registry
        .bind(
            &catalog,
            "home",
            BindOptions::new("author").accessor("living"),
        )
        .expect("bind should succeed");

    let book = registry
        .lookup("home", &["author".into(), "books".into()])
        .expect("handle path should resolve");
    assert_eq!(book.id, BindingId(1));

    let by_id = registry
        .lookup("home", &[Selector::Id(BindingId(2))])
        .expect("id should resolve");
    assert_eq!(by_id.handle, "living");

    // two author roots at this level
    assert!(
        registry
            .lookup("home", &[Selector::Entity("author".to_string())])
            .is_none()
    );
    assert!(registry.lookup("home", &["missing".into()]).is_none());
    assert!(registry.lookup("nowhere", &["author".into()]).is_none());
}

#[test]
fn auto_selector_tries_id_then_handle_then_entity() {
    let catalog = catalog();
    let mut registry = BindingRegistry::new();

    registry
        .bind(
            &catalog,
            "home",
            BindOptions::new("author")
                .handle("writers")
                .child(BindOptions::new("book").accessor("books").handle("works")),
        )
        .expect("bind should succeed");

    assert_eq!(
        registry.lookup("home", &["0".into()]).map(|b| b.id),
        Some(BindingId(0))
    );
    assert_eq!(
        registry
            .lookup("home", &["writers".into(), "book".into()])
            .map(|b| b.id),
        Some(BindingId(1))
    );
}
