use keel_model::*;
use keel_store::{InsertOptions, MemoryStore, Store};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn record(value: Value) -> Record {
    value.as_object().cloned().unwrap_or_default()
}

fn counting_getter(value: Value) -> (Arc<AtomicUsize>, FieldDescriptor) {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let descriptor = FieldDescriptor::new().getter(move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
        Some(value.clone())
    });
    (calls, descriptor)
}

#[test]
fn explicit_type_value_wins() {
    let model = Model::default().with_type_value("foo");
    assert_eq!(model.type_value().as_deref(), Some("foo"));
}

#[test]
fn type_value_reads_dependency_free_type_field() {
    let (calls, descriptor) = counting_getter(json!("foo"));
    let mut model = Model::default();
    model.add_field("type", descriptor.requires(PropertyMask::empty()));

    assert_eq!(model.type_value().as_deref(), Some("foo"));
    assert!(calls.load(Ordering::SeqCst) > 0);
}

#[test]
fn type_value_is_unknown_when_type_field_has_dependencies() {
    let (calls, descriptor) = counting_getter(json!("foo"));
    let mut model = Model::default();
    model.add_field("type", descriptor.requires(["_type"]));

    assert_eq!(model.type_value(), None);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn has_consults_parent() {
    let mut parent = Model::default();
    parent.add_field("foo", AliasField::new());
    let child = Model::default().with_parent(Arc::new(parent));

    assert!(child.has("foo"));
    assert!(!child.has("bar"));
}

#[test]
fn add_field_rejects_names_defined_here_or_in_parent() {
    let mut parent = Model::default();
    assert!(parent.add_field("foo", AliasField::new()));
    assert!(!parent.add_field("foo", AliasField::new()));

    let mut child = Model::default().with_parent(Arc::new(parent));
    assert!(!child.add_field("foo", json!(1)));
    assert!(child.add_field("bar", json!(1)));
}

#[test]
fn add_field_accepts_every_declaration_shape() {
    struct Answer;
    impl IntoFieldDescriptor for Answer {
        fn into_field_descriptor(self: Box<Self>) -> FieldDescriptor {
            FieldDescriptor::new().getter(|_| Some(json!(42)))
        }
    }

    let (calls, descriptor) = counting_getter(json!(123));
    let mut model = Model::default();
    model.add_field("described", descriptor);
    model.add_field("aliased", AliasField::new());
    model.add_field("converted", FieldSpec::convertible(Answer));
    model.add_field("constant", json!(7));

    let instance = Arc::new(model).wrap(record(json!({ "aliased": 5 })));
    assert_eq!(instance.get("described"), Some(json!(123)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(instance.get("aliased"), Some(json!(5)));
    assert_eq!(instance.get("converted"), Some(json!(42)));
    assert_eq!(instance.get("constant"), Some(json!(7)));
}

#[test]
fn fields_list_parent_first_and_honour_selection() {
    let mut parent = Model::default();
    parent.add_field("a", AliasField::new());
    let mut child = Model::default().with_parent(Arc::new(parent));
    child.add_field("b", AliasField::new());
    child.add_field("c", AliasField::new());

    assert_eq!(child.fields(&FieldMask::all()), ["a", "b", "c"]);
    assert_eq!(child.fields(&FieldMask::from(["c", "a"])), ["a", "c"]);
    assert!(child.fields(&FieldMask::empty()).is_empty());
}

#[test]
fn query_field_reports_local_capabilities_only() {
    let mut parent = Model::default();
    parent.add_field("constant", json!(1));
    parent.add_field("sink", FieldDescriptor::new().setter(|_, _| {}));

    assert_eq!(parent.query_field("missing"), None);
    assert_eq!(parent.query_field("constant"), Some(FieldInfo { readable: true, writable: false }));
    assert_eq!(parent.query_field("sink"), Some(FieldInfo { readable: false, writable: true }));

    let child = Model::default().with_parent(Arc::new(parent));
    assert_eq!(child.query_field("constant"), None);
}

#[test]
fn getter_sees_only_required_properties() {
    let mut model = Model::default();
    model.add_field(
        "keys",
        FieldDescriptor::new()
            .getter(|data| Some(Value::from(data.keys().cloned().collect::<Vec<_>>())))
            .requires(["a"]),
    );

    let data = record(json!({ "a": 1, "b": 2 }));
    assert_eq!(model.get_field_value(&data, "keys"), Some(json!(["a"])));
}

#[test]
fn get_and_set_delegate_to_parent() {
    let mut parent = Model::default();
    parent.add_field("foo", AliasField::new().property("_foo"));
    let child = Model::default().with_parent(Arc::new(parent));

    let mut data = Record::new();
    assert_eq!(child.set_field_value(&mut data, "foo", json!(3)), Some(()));
    assert_eq!(data, record(json!({ "_foo": 3 })));
    assert_eq!(child.get_field_value(&data, "foo"), Some(json!(3)));
}

#[test]
fn unwritable_or_unknown_fields_do_not_set() {
    let mut model = Model::default();
    model.add_field("constant", json!(1));

    let mut data = Record::new();
    assert_eq!(model.set_field_value(&mut data, "constant", json!(2)), None);
    assert_eq!(model.set_field_value(&mut data, "missing", json!(2)), None);
    assert!(data.is_empty());
}

#[test]
fn validate_field_merges_validators_and_delegates() {
    let mut parent = Model::default();
    parent.add_field(
        "n",
        AliasField::new().validator(validators::required()).validator(validators::lt(json!(3))),
    );
    let child = Arc::new(Model::default().with_parent(Arc::new(parent)));
    let instance = Arc::clone(&child).create_instance();

    let result = child.validate_field(&instance, "n", &json!(5)).unwrap_or_default();
    assert_eq!(result.errors_for("n").collect::<Vec<_>>(), ["Field must be less than 3"]);
    assert!(child.validate_field(&instance, "missing", &json!(5)).is_none());
}

#[test]
fn dependency_mask_unions_requirements() {
    let mut model = Model::default();
    model.add_field("foo", FieldDescriptor::new().getter(|_| None).requires(["bar"]));
    model.add_field("id", AliasField::new().property("_id"));

    assert_eq!(model.dependency_mask(&FieldMask::from(["foo"])), Some(PropertyMask::from(["bar"])));
    assert_eq!(
        model.dependency_mask(&FieldMask::from(["foo", "id"])),
        Some(PropertyMask::from(["bar", "_id"]))
    );
    assert_eq!(model.dependency_mask(&FieldMask::empty()), Some(PropertyMask::empty()));
}

#[test]
fn dependency_mask_is_unknown_for_opaque_fields() {
    let mut model = Model::default();
    model.add_field("foo", FieldDescriptor::new().getter(|_| Some(json!(123))));
    model.add_field("bar", AliasField::new());

    assert_eq!(model.dependency_mask(&FieldMask::from(["foo"])), None);
    assert_eq!(model.dependency_mask(&FieldMask::all()), None);
    assert_eq!(model.dependency_mask(&FieldMask::from(["bar"])), Some(PropertyMask::from(["bar"])));
}

#[test]
fn dependency_mask_includes_parent_fields() {
    let mut parent = Model::default();
    parent.add_field("id", AliasField::new().property("_id"));
    let mut child = Model::default().with_parent(Arc::new(parent));
    child.add_field("name", AliasField::new());

    assert_eq!(
        child.dependency_mask(&FieldMask::all()),
        Some(PropertyMask::from(["_id", "name"]))
    );
}

#[test]
fn translate_data_maps_fields_to_properties() {
    let mut model = Model::default();
    model.add_field("foo", AliasField::new().property("_foo"));
    model.add_field("computed", FieldDescriptor::new().getter(|_| Some(json!(1))));

    let translated = model.translate_data(&record(json!({ "foo": 1, "unknown": 2 })));
    assert_eq!(translated, Some(record(json!({ "_foo": 1 }))));
    assert_eq!(model.translate_data(&record(json!({ "computed": 1 }))), None);
}

#[test]
fn translate_data_delegates_parent_fields() {
    let mut parent = Model::default();
    parent.add_field("id", AliasField::new().property("_id"));
    let mut child = Model::default().with_parent(Arc::new(parent));
    child.add_field("name", AliasField::new().property("_name"));

    let translated = child.translate_data(&record(json!({ "id": 1, "name": "x" })));
    assert_eq!(translated, Some(record(json!({ "_id": 1, "_name": "x" }))));
}

#[test]
fn select_returns_view_over_selected_fields() {
    let mut model = Model::default();
    model.add_field("foo", AliasField::new());
    model.add_field("bar", AliasField::new());

    let view = Arc::new(model).select(FieldMask::from(["foo"]));
    assert!(view.has("foo"));
    assert!(!view.has("bar"));
}

fn stored_model() -> (MemoryStore, Arc<Model>) {
    let store = MemoryStore::new();
    let mut model = Model::new(Arc::new(store.clone()));
    model.add_field("id", AliasField::new().property("_id"));
    model.add_field("name", AliasField::new().property("_name"));
    model.add_field("rank", AliasField::new());
    (store, Arc::new(model))
}

#[test]
fn find_by_id_returns_none_when_missing() {
    let (_, model) = stored_model();
    assert!(model.find_by_id(json!(1), FindQuery::default()).unwrap().is_none());
}

#[test]
fn find_by_id_returns_sunk_instance_of_model() {
    let (store, model) = stored_model();
    store.insert_one(&mut record(json!({ "_id": 1, "_name": "a" }))).unwrap();

    let instance = Arc::clone(&model).find_by_id(json!(1), FindQuery::default()).unwrap().unwrap();
    assert!(!instance.is_floating());
    assert_eq!(instance.get("name"), Some(json!("a")));
    assert!(!instance.is_modified());
}

#[test]
fn find_returns_every_match() {
    let (store, model) = stored_model();
    assert!(Arc::clone(&model).find(&Record::new(), FindQuery::default()).unwrap().is_empty());

    let mut items = vec![record(json!({ "_id": 1 })), record(json!({ "_id": 2 }))];
    store.insert(&mut items, InsertOptions::default()).unwrap();
    assert_eq!(model.find(&Record::new(), FindQuery::default()).unwrap().len(), 2);
}

#[test]
fn find_translates_filter_and_ordering() {
    let (store, model) = stored_model();
    let mut items = vec![
        record(json!({ "_name": "a", "rank": 2 })),
        record(json!({ "_name": "b", "rank": 1 })),
        record(json!({ "_name": "a", "rank": 3 })),
    ];
    store.insert(&mut items, InsertOptions::default()).unwrap();

    let found = model
        .find(&record(json!({ "name": "a" })), FindQuery::default().order_by("rank", -1))
        .unwrap();
    let ranks: Vec<Value> = found.iter().filter_map(|i| i.get("rank")).collect();
    assert_eq!(ranks, [json!(3), json!(2)]);
}

#[test]
fn find_with_selection_projects_and_restricts_fields() {
    let (store, model) = stored_model();
    store.insert_one(&mut record(json!({ "_id": 1, "_name": "a", "rank": 1 }))).unwrap();

    let found = model.find(&Record::new(), FindQuery::default().select(["name"])).unwrap();
    assert_eq!(found[0].data(), record(json!({ "_name": "a" })));
    assert_eq!(found[0].get("name"), Some(json!("a")));
    assert_eq!(found[0].get("rank"), None);
    assert!(!found[0].is_floating());
}

#[test]
fn saving_selected_instance_keeps_unloaded_properties() {
    let (store, model) = stored_model();
    store.insert_one(&mut record(json!({ "_id": 1, "_name": "a", "rank": 1 }))).unwrap();

    let mut found = model.find(&Record::new(), FindQuery::default().select(["id", "name"])).unwrap();
    found[0].set("name", json!("b")).unwrap();
    assert_eq!(found[0].save().unwrap(), 1);

    let stored = store.find(&Record::new(), &Default::default()).unwrap();
    assert_eq!(stored, vec![record(json!({ "_id": 1, "_name": "b", "rank": 1 }))]);
}

#[test]
fn find_rejects_untranslatable_filter() {
    let (_, model) = stored_model();
    let mut model = Arc::try_unwrap(model).unwrap();
    model.add_field("computed", FieldDescriptor::new().getter(|_| Some(json!(1))));

    let err = Arc::new(model).find(&record(json!({ "computed": 1 })), FindQuery::default()).unwrap_err();
    assert!(matches!(err, ModelError::Untranslatable { .. }));
}

#[test]
fn find_surfaces_store_errors() {
    let (store, model) = stored_model();
    store.insert_one(&mut record(json!({ "_id": 1 }))).unwrap();

    let err = model.find(&Record::new(), FindQuery::default().order_by("rank", true)).unwrap_err();
    assert!(matches!(err, ModelError::Store { .. }));
}
