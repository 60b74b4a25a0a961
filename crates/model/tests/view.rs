use keel_model::*;
use keel_store::{InsertOptions, MemoryStore, Store};
use serde_json::{Value, json};
use std::sync::Arc;

fn record(value: Value) -> Record {
    value.as_object().cloned().unwrap_or_default()
}

fn model(store: Arc<dyn Store>) -> Arc<Model> {
    let mut model = Model::new(store);
    model.add_field("id", AliasField::new().property("_id"));
    model.add_field("foo", AliasField::new().property("_foo"));
    model.add_field(
        "full",
        FieldDescriptor::new()
            .getter(|data| {
                let first = data.get("first")?.as_str()?;
                let last = data.get("last")?.as_str()?;
                Some(Value::from(format!("{first} {last}")))
            })
            .requires(["first", "last"]),
    );
    model.add_field("opaque", FieldDescriptor::new().getter(|_| Some(json!("x"))));
    Arc::new(model)
}

#[test]
fn empty_selection_hides_everything() {
    let view = model(Arc::new(MemoryStore::new())).select(FieldMask::empty());
    assert!(!view.has("foo"));
    assert!(view.fields(&FieldMask::all()).is_empty());
    assert_eq!(view.query_field("foo"), None);
}

#[test]
fn selection_filters_field_operations() {
    let base = model(Arc::new(MemoryStore::new()));
    let view = Arc::clone(&base).select(FieldMask::from(["foo"]));
    let data = record(json!({ "_foo": 1, "first": "a", "last": "b" }));

    assert_eq!(view.get_field_value(&data, "foo"), Some(json!(1)));
    assert_eq!(view.get_field_value(&data, "full"), None);
    assert_eq!(base.get_field_value(&data, "full"), Some(json!("a b")));

    let mut target = Record::new();
    assert_eq!(view.set_field_value(&mut target, "id", json!(1)), None);
    assert_eq!(view.set_field_value(&mut target, "foo", json!(2)), Some(()));
    assert_eq!(target, record(json!({ "_foo": 2 })));
    assert_eq!(view.query_field("foo"), Some(FieldInfo { readable: true, writable: true }));
}

#[test]
fn reads_require_every_dependency_present() {
    let view = model(Arc::new(MemoryStore::new())).select(FieldMask::from(["full", "opaque"]));

    assert_eq!(view.get_field_value(&record(json!({ "first": "a" })), "full"), None);
    assert_eq!(
        view.get_field_value(&record(json!({ "first": "a", "last": "b" })), "full"),
        Some(json!("a b"))
    );
    assert_eq!(view.get_field_value(&Record::new(), "opaque"), Some(json!("x")));
}

#[test]
fn nested_selection_only_narrows() {
    let base = model(Arc::new(MemoryStore::new()));
    let outer = Arc::clone(&base).select(FieldMask::from(["id", "foo"]));
    let inner = Arc::clone(&outer).select(FieldMask::from(["foo", "full"]));

    assert_eq!(inner.fields(&FieldMask::all()), ["foo"]);
    assert!(!inner.has("full"));
    assert_eq!(inner.dependency_mask(&FieldMask::all()), Some(PropertyMask::from(["_foo"])));
}

#[test]
fn dependency_mask_is_computed_within_selection() {
    let view = model(Arc::new(MemoryStore::new())).select(FieldMask::from(["id", "full"]));
    assert_eq!(view.dependency_mask(&FieldMask::all()), Some(PropertyMask::from(["_id", "first", "last"])));
    assert_eq!(view.dependency_mask(&FieldMask::from(["opaque"])), Some(PropertyMask::empty()));
}

#[test]
fn translate_drops_unselected_entries() {
    let view = model(Arc::new(MemoryStore::new())).select(FieldMask::from(["foo"]));
    let translated = view.translate_data(&record(json!({ "foo": 1, "id": 2, "opaque": 3 })));
    assert_eq!(translated, Some(record(json!({ "_foo": 1 }))));
}

#[test]
fn wrap_binds_instance_to_view() {
    let view = model(Arc::new(MemoryStore::new())).select(FieldMask::from(["foo"]));
    let instance = Arc::clone(&view).wrap(record(json!({ "_foo": 1, "_id": 2 })));

    assert!(Arc::ptr_eq(instance.view(), &view));
    assert_eq!(instance.get("foo"), Some(json!(1)));
    assert_eq!(instance.get("id"), None);
    assert!(instance.is_floating());
}

#[test]
fn view_identity_delegates_to_base() {
    let mut base = Model::default().with_type_value("user").with_identity_field("key");
    base.add_field("key", AliasField::new());
    let view = Arc::new(base).select(FieldMask::empty());

    assert_eq!(view.identity_field(), "key");
    assert_eq!(view.type_field(), "type");
    assert_eq!(view.type_value().as_deref(), Some("user"));
}

#[test]
fn find_through_view_restricts_and_rebinds() {
    let store = MemoryStore::new();
    let mut items = vec![
        record(json!({ "_id": 1, "_foo": "a", "first": "x", "last": "y" })),
        record(json!({ "_id": 2, "_foo": "b", "first": "x", "last": "z" })),
    ];
    store.insert(&mut items, InsertOptions::default()).unwrap();
    let view = model(Arc::new(store)).select(FieldMask::from(["id", "foo"]));

    let found = Arc::clone(&view)
        .find(&record(json!({ "foo": "b", "opaque": 1 })), FindQuery::default())
        .unwrap();
    assert_eq!(found.len(), 1);
    assert!(Arc::ptr_eq(found[0].view(), &view));
    assert_eq!(found[0].data(), record(json!({ "_id": 2, "_foo": "b" })));
    assert_eq!(found[0].get("full"), None);
    assert!(!found[0].is_floating());

    let narrowed = view.find(&Record::new(), FindQuery::default().select(["foo", "full"])).unwrap();
    assert_eq!(narrowed.len(), 2);
    assert_eq!(narrowed[0].get_many(&FieldMask::all()), record(json!({ "foo": "a" })));
}

#[test]
fn instance_from_view_saves_through_identity() {
    let store = MemoryStore::new();
    store.insert_one(&mut record(json!({ "_id": 1, "_foo": "a" }))).unwrap();
    let view = model(Arc::new(store.clone())).select(FieldMask::from(["id", "foo"]));

    let mut instance = view.find_by_id(json!(1), FindQuery::default()).unwrap().unwrap();
    instance.set("foo", json!("b")).unwrap();
    assert_eq!(instance.save().unwrap(), 1);
    assert_eq!(store.find(&record(json!({ "_foo": "b" })), &Default::default()).unwrap().len(), 1);
}

#[test]
fn saving_through_view_keeps_unselected_properties() {
    let store = MemoryStore::new();
    store.insert_one(&mut record(json!({ "_id": 1, "_foo": "a", "first": "x", "last": "y" }))).unwrap();
    let view = model(Arc::new(store.clone())).select(FieldMask::from(["id", "foo"]));

    let mut instance = view.find_by_id(json!(1), FindQuery::default()).unwrap().unwrap();
    instance.set("foo", json!("b")).unwrap();
    assert_eq!(instance.save().unwrap(), 1);

    let stored = store.find(&Record::new(), &Default::default()).unwrap();
    assert_eq!(stored, vec![record(json!({ "_id": 1, "_foo": "b", "first": "x", "last": "y" }))]);
}
