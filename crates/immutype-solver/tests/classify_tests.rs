use super::*;
use crate::overrides::TypeSpecifier;
use crate::store::{ConditionalType, ObjectShape, TypeData, TypeStore};
use crate::types::{PropertyFlags, SourceFileInfo};

fn classify(store: &TypeStore, ty: impl Into<TypeRef>) -> Immutability {
    classify_at(store, ty, Immutability::Immutable)
}

fn classify_at(
    store: &TypeStore,
    ty: impl Into<TypeRef>,
    threshold: Immutability,
) -> Immutability {
    let mut cache = ImmutabilityCache::new();
    Classifier::new(store, &[], &mut cache)
        .run(ty.into(), threshold)
        .0
}

fn readonly_object(store: &TypeStore, name: &str, ty: TypeId) -> TypeId {
    store.object(vec![PropertyInfo::readonly(name, ty)])
}

// =============================================================================
// Leaves
// =============================================================================

#[test]
fn test_primitives_are_immutable() {
    let store = TypeStore::new();
    let literal = store.literal("\"a\"");
    let param = store.type_parameter("T", vec![]);

    for ty in [TypeId::STRING, TypeId::NUMBER, TypeId::NULL, TypeId::ANY, literal, param] {
        assert_eq!(classify(&store, ty), Immutability::Immutable);
    }
}

#[test]
fn test_error_types_contribute_nothing() {
    let store = TypeStore::new();
    assert_eq!(classify(&store, TypeId::ERROR), Immutability::Unknown);

    let never_defined = store.reserve();
    assert_eq!(classify(&store, never_defined), Immutability::Unknown);

    let holder = readonly_object(&store, "broken", TypeId::ERROR);
    assert_eq!(classify(&store, holder), Immutability::Immutable);
}

#[test]
fn test_function_without_properties_is_immutable() {
    let store = TypeStore::new();
    assert_eq!(classify(&store, store.function()), Immutability::Immutable);
}

#[test]
fn test_callable_with_writable_property_is_mutable() {
    let store = TypeStore::new();
    let callable = store.object_with_shape(
        ObjectShape::plain(vec![PropertyInfo::new("count", TypeId::NUMBER)]).with_call_signature(),
    );
    assert_eq!(classify(&store, callable), Immutability::Mutable);
}

// =============================================================================
// Objects
// =============================================================================

#[test]
fn test_readonly_object_is_immutable() {
    let store = TypeStore::new();
    let ty = readonly_object(&store, "foo", TypeId::STRING);
    assert_eq!(classify(&store, ty), Immutability::Immutable);
}

#[test]
fn test_writable_object_is_mutable() {
    let store = TypeStore::new();
    let ty = store.object(vec![PropertyInfo::new("foo", TypeId::STRING)]);
    assert_eq!(classify(&store, ty), Immutability::Mutable);
}

#[test]
fn test_empty_object_is_immutable() {
    let store = TypeStore::new();
    assert_eq!(classify(&store, store.object(vec![])), Immutability::Immutable);
}

#[test]
fn test_adding_writable_property_makes_object_mutable() {
    let store = TypeStore::new();
    let base = vec![
        PropertyInfo::readonly("a", TypeId::STRING),
        PropertyInfo::readonly("b", TypeId::NUMBER),
    ];
    let frozen = store.object(base.clone());
    assert_eq!(classify(&store, frozen), Immutability::Immutable);

    let mut extended = base;
    extended.push(PropertyInfo::new("c", TypeId::BOOLEAN));
    let thawed = store.object(extended);
    assert_eq!(classify(&store, thawed), Immutability::Mutable);
}

#[test]
fn test_method_caps_at_readonly_deep() {
    let store = TypeStore::new();
    let ty = store.object(vec![
        PropertyInfo::readonly("value", TypeId::STRING),
        PropertyInfo::method("get", store.method_type()),
    ]);
    assert_eq!(classify(&store, ty), Immutability::ReadonlyDeep);
}

#[test]
fn test_private_names_are_skipped() {
    let store = TypeStore::new();
    let ty = store.object(vec![
        PropertyInfo::new("#secret", TypeId::NUMBER).with_flags(PropertyFlags::PRIVATE_NAME),
        PropertyInfo::readonly("visible", TypeId::STRING),
    ]);
    assert_eq!(classify(&store, ty), Immutability::Immutable);
}

#[test]
fn test_readonly_property_of_mutable_type_is_shallow() {
    let store = TypeStore::new();
    let inner = store.object(vec![PropertyInfo::new("x", TypeId::NUMBER)]);
    let outer = readonly_object(&store, "inner", inner);
    assert_eq!(classify(&store, outer), Immutability::ReadonlyShallow);
}

// =============================================================================
// Arrays and tuples
// =============================================================================

#[test]
fn test_mutable_array_is_mutable() {
    let store = TypeStore::new();
    assert_eq!(classify(&store, store.array(TypeId::STRING)), Immutability::Mutable);
}

#[test]
fn test_readonly_array_of_primitives_is_readonly_deep() {
    let store = TypeStore::new();
    let ty = store.readonly_array(TypeId::STRING);
    assert_eq!(classify(&store, ty), Immutability::ReadonlyDeep);
}

#[test]
fn test_readonly_array_of_mutable_objects_is_shallow() {
    let store = TypeStore::new();
    let element = store.object(vec![PropertyInfo::new("foo", TypeId::STRING)]);
    let ty = store.readonly_array(element);
    assert_eq!(classify(&store, ty), Immutability::ReadonlyShallow);
}

#[test]
fn test_readonly_array_of_readonly_objects_is_deep() {
    let store = TypeStore::new();
    let element = readonly_object(&store, "foo", TypeId::STRING);
    let ty = store.readonly_array(element);
    assert_eq!(classify(&store, ty), Immutability::ReadonlyDeep);
}

#[test]
fn test_mutable_tuple_is_mutable() {
    let store = TypeStore::new();
    let ty = store.tuple(vec![TypeId::STRING, TypeId::NUMBER], false);
    assert_eq!(classify(&store, ty), Immutability::Mutable);
}

#[test]
fn test_readonly_tuple_ignores_length() {
    let store = TypeStore::new();
    let ty = store.tuple(vec![TypeId::STRING, TypeId::NUMBER], true);
    assert_eq!(classify(&store, ty), Immutability::ReadonlyDeep);
}

#[test]
fn test_readonly_tuple_of_mutable_object_is_shallow() {
    let store = TypeStore::new();
    let element = store.object(vec![PropertyInfo::new("foo", TypeId::STRING)]);
    let ty = store.tuple(vec![element], true);
    assert_eq!(classify(&store, ty), Immutability::ReadonlyShallow);
}

// =============================================================================
// Unions, conditionals, intersections
// =============================================================================

#[test]
fn test_union_is_min_of_members() {
    let store = TypeStore::new();
    let mutable = store.object(vec![PropertyInfo::new("foo", TypeId::STRING)]);
    let union = store.union(vec![mutable, TypeId::STRING]);
    assert_eq!(classify(&store, union), Immutability::Mutable);

    let frozen = readonly_object(&store, "a", TypeId::STRING);
    let deep = store.readonly_array(TypeId::STRING);
    let union = store.union(vec![frozen, deep]);
    assert_eq!(classify(&store, union), Immutability::ReadonlyDeep);
}

#[test]
fn test_conditional_takes_min_of_branches() {
    let store = TypeStore::new();
    let param = store.type_parameter("T", vec![]);
    let frozen = readonly_object(&store, "a", TypeId::STRING);
    let mutable = store.object(vec![PropertyInfo::new("a", TypeId::STRING)]);

    let mixed = store.conditional(param, TypeId::STRING, frozen, mutable);
    assert_eq!(classify(&store, mixed), Immutability::Mutable);

    let both_frozen = store.conditional(param, TypeId::STRING, frozen, TypeId::NUMBER);
    assert_eq!(classify(&store, both_frozen), Immutability::Immutable);
}

#[test]
fn test_intersection_merges_properties() {
    let store = TypeStore::new();
    let a = readonly_object(&store, "a", TypeId::STRING);
    let b = readonly_object(&store, "b", TypeId::NUMBER);
    let both = store.intersection(vec![a, b]);
    assert_eq!(classify(&store, both), Immutability::Immutable);

    let writable = store.object(vec![PropertyInfo::new("c", TypeId::NUMBER)]);
    let mixed = store.intersection(vec![a, writable]);
    assert_eq!(classify(&store, mixed), Immutability::Mutable);
}

#[test]
fn test_intersection_reads_index_signatures_of_every_member() {
    let store = TypeStore::new();
    let a = readonly_object(&store, "a", TypeId::STRING);
    let dictionary = store.object_with_shape(
        ObjectShape::plain(vec![]).with_index(IndexKind::String, TypeId::NUMBER, false),
    );
    let ty = store.intersection(vec![a, dictionary]);
    assert_eq!(classify(&store, ty), Immutability::ReadonlyShallow);
}

// =============================================================================
// Index signatures
// =============================================================================

#[test]
fn test_readonly_index_signature_of_primitive_is_immutable() {
    let store = TypeStore::new();
    let ty = store.object_with_shape(
        ObjectShape::plain(vec![]).with_index(IndexKind::String, TypeId::STRING, true),
    );
    assert_eq!(classify(&store, ty), Immutability::Immutable);
}

#[test]
fn test_writable_index_signature_is_mutable() {
    let store = TypeStore::new();
    let ty = store.object_with_shape(
        ObjectShape::plain(vec![]).with_index(IndexKind::Number, TypeId::STRING, false),
    );
    assert_eq!(classify(&store, ty), Immutability::Mutable);
}

#[test]
fn test_readonly_index_signature_of_mutable_value_is_shallow() {
    let store = TypeStore::new();
    let value = store.object(vec![PropertyInfo::new("foo", TypeId::STRING)]);
    let ty = store.object_with_shape(
        ObjectShape::plain(vec![]).with_index(IndexKind::String, value, true),
    );
    assert_eq!(classify(&store, ty), Immutability::ReadonlyShallow);
}

#[test]
fn test_self_referential_index_signature() {
    let store = TypeStore::new();
    let file = store.add_source_file(SourceFileInfo::project("/project/tree.ts"));
    let symbol = store.declare("Tree", vec![file]);

    let tree = store.reserve();
    store.define(
        tree,
        TypeData::Object(ObjectShape::named(symbol, vec![]).with_index(
            IndexKind::String,
            tree,
            true,
        )),
    );
    assert_eq!(classify(&store, tree), Immutability::Immutable);

    let nested = store.reserve();
    let value = store.union(vec![TypeId::STRING, nested]);
    store.define(
        nested,
        TypeData::Object(ObjectShape::named(symbol, vec![]).with_index(
            IndexKind::String,
            value,
            true,
        )),
    );
    assert_eq!(classify(&store, nested), Immutability::Immutable);
}

// =============================================================================
// Cycles
// =============================================================================

#[test]
fn test_self_referential_record_is_immutable() {
    let store = TypeStore::new();
    let node = store.reserve();
    let next = store.union(vec![node, TypeId::NULL]);
    store.define(
        node,
        TypeData::Object(ObjectShape::plain(vec![PropertyInfo::readonly("next", next)])),
    );
    assert_eq!(classify(&store, node), Immutability::Immutable);
}

#[test]
fn test_self_referential_record_with_writable_link_is_mutable() {
    let store = TypeStore::new();
    let node = store.reserve();
    let next = store.union(vec![node, TypeId::NULL]);
    store.define(
        node,
        TypeData::Object(ObjectShape::plain(vec![PropertyInfo::new("next", next)])),
    );
    assert_eq!(classify(&store, node), Immutability::Mutable);
}

#[test]
fn test_purely_self_referential_conditional_is_unknown() {
    let store = TypeStore::new();
    let param = store.type_parameter("T", vec![]);
    let looped = store.reserve();
    store.define(
        looped,
        TypeData::Conditional(ConditionalType {
            check_type: param,
            extends_type: TypeId::STRING,
            true_type: TypeRef::new(looped),
            false_type: TypeRef::new(looped),
        }),
    );
    assert_eq!(classify(&store, looped), Immutability::Unknown);
}

#[test]
fn test_deep_object_chain_does_not_overflow() {
    let store = TypeStore::new();
    let mut ty = TypeId::STRING;
    for _ in 0..50_000 {
        ty = readonly_object(&store, "next", ty);
    }
    assert_eq!(classify(&store, ty), Immutability::Immutable);
}

#[test]
fn test_deep_array_chain_does_not_overflow() {
    let store = TypeStore::new();
    let mut ty = TypeId::STRING;
    for _ in 0..10_000 {
        ty = store.readonly_array(ty);
    }
    assert_eq!(classify(&store, ty), Immutability::ReadonlyDeep);
}

// =============================================================================
// Thresholds and caching
// =============================================================================

#[test]
fn test_threshold_allows_early_exit() {
    let store = TypeStore::new();
    let ty = store.readonly_array(TypeId::STRING);
    assert_eq!(
        classify_at(&store, ty, Immutability::ReadonlyShallow),
        Immutability::ReadonlyShallow
    );
    // Values below the threshold are still exact.
    assert_eq!(
        classify_at(&store, store.array(TypeId::STRING), Immutability::ReadonlyDeep),
        Immutability::Mutable
    );
}

#[test]
fn test_truncated_cache_entry_is_recomputed_for_higher_threshold() {
    let store = TypeStore::new();
    let ty = store.readonly_array(TypeId::STRING);
    let mut cache = ImmutabilityCache::new();

    let shallow = Classifier::new(&store, &[], &mut cache)
        .run(TypeRef::new(ty), Immutability::ReadonlyShallow);
    assert_eq!(shallow, (Immutability::ReadonlyShallow, false));

    let full = Classifier::new(&store, &[], &mut cache).run(TypeRef::new(ty), Immutability::Immutable);
    assert_eq!(full, (Immutability::ReadonlyDeep, false));

    let again = Classifier::new(&store, &[], &mut cache)
        .run(TypeRef::new(ty), Immutability::ReadonlyShallow);
    assert_eq!(again, (Immutability::ReadonlyDeep, true));
}

#[test]
fn test_classification_is_deterministic() {
    let store = TypeStore::new();
    let element = store.object(vec![PropertyInfo::new("foo", TypeId::STRING)]);
    let ty = store.readonly_array(element);
    let first = classify(&store, ty);
    let second = classify(&store, ty);
    assert_eq!(first, second);
}

#[test]
fn test_no_entry_is_left_calculating() {
    let store = TypeStore::new();
    let node = store.reserve();
    let next = store.union(vec![node, TypeId::NULL]);
    store.define(
        node,
        TypeData::Object(ObjectShape::plain(vec![PropertyInfo::readonly("next", next)])),
    );
    let mut cache = ImmutabilityCache::new();
    Classifier::new(&store, &[], &mut cache).run(TypeRef::new(node), Immutability::Immutable);

    for ty in [node, next, TypeId::NULL] {
        let key = ImmutabilityCache::lookup_key(&store, TypeRef::new(ty));
        let entry = cache.get_entry(&key);
        assert!(entry.is_some_and(|entry| !entry.value.is_calculating()));
    }
}

// =============================================================================
// Overrides inside the engine
// =============================================================================

fn boxed(store: &TypeStore, name: &str, properties: Vec<PropertyInfo>) -> TypeId {
    let file = store.add_source_file(SourceFileInfo::project("/project/box.ts"));
    store.interface(name, vec![file], properties)
}

#[test]
fn test_unconditional_override_wins() {
    let store = TypeStore::new();
    let ty = boxed(&store, "Box", vec![PropertyInfo::new("value", TypeId::STRING)]);
    let overrides = vec![ImmutabilityOverride::new(
        TypeSpecifier::named("Box"),
        Immutability::Immutable,
    )];
    let mut cache = ImmutabilityCache::new();
    let (value, _) = Classifier::new(&store, &overrides, &mut cache)
        .run(TypeRef::new(ty), Immutability::Immutable);
    assert_eq!(value, Immutability::Immutable);
}

#[test]
fn test_conditional_override_applies_inside_interval() {
    let store = TypeStore::new();
    let inner = store.object(vec![PropertyInfo::new("a", TypeId::STRING)]);
    let shallow = boxed(&store, "Box", vec![PropertyInfo::readonly("value", inner)]);
    let mutable = boxed(&store, "Box", vec![PropertyInfo::new("value", TypeId::STRING)]);
    let overrides = vec![
        ImmutabilityOverride::new(TypeSpecifier::named("Box"), Immutability::Immutable)
            .with_from(Immutability::ReadonlyShallow),
    ];

    let mut cache = ImmutabilityCache::new();
    let mut classifier = Classifier::new(&store, &overrides, &mut cache);
    assert_eq!(
        classifier.run(TypeRef::new(shallow), Immutability::Immutable).0,
        Immutability::Immutable
    );
    assert_eq!(
        classifier.run(TypeRef::new(mutable), Immutability::Immutable).0,
        Immutability::Mutable
    );
}

#[test]
fn test_conditional_override_ignores_threshold_truncation() {
    let store = TypeStore::new();
    let ty = boxed(
        &store,
        "Handle",
        vec![PropertyInfo::method("read", store.method_type())],
    );
    let overrides = vec![
        ImmutabilityOverride::new(TypeSpecifier::named("Handle"), Immutability::Mutable)
            .with_from(Immutability::ReadonlyShallow),
    ];

    let mut cache = ImmutabilityCache::new();
    let (value, _) = Classifier::new(&store, &overrides, &mut cache)
        .run(TypeRef::new(ty), Immutability::ReadonlyShallow);
    assert_eq!(value, Immutability::ReadonlyDeep);
}

#[test]
fn test_reversed_conditional_override_applies_inside_interval() {
    let store = TypeStore::new();
    let inner = store.object(vec![PropertyInfo::new("a", TypeId::STRING)]);
    let shallow = boxed(&store, "Holder", vec![PropertyInfo::readonly("value", inner)]);
    let deep = boxed(
        &store,
        "Holder",
        vec![PropertyInfo::readonly("value", TypeId::STRING)],
    );
    let overrides = vec![
        ImmutabilityOverride::new(TypeSpecifier::named("Holder"), Immutability::Mutable)
            .with_from(Immutability::ReadonlyDeep),
    ];

    let mut cache = ImmutabilityCache::new();
    let mut classifier = Classifier::new(&store, &overrides, &mut cache);
    assert_eq!(
        classifier.run(TypeRef::new(shallow), Immutability::Immutable).0,
        Immutability::Mutable
    );
    // Immutable lies outside [Mutable, ReadonlyDeep].
    assert_eq!(
        classifier.run(TypeRef::new(deep), Immutability::Immutable).0,
        Immutability::Immutable
    );
}
