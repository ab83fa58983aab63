use super::*;

#[test]
fn test_intrinsics_are_preregistered() {
    let store = TypeStore::new();
    assert_eq!(store.shape(TypeId::STRING), TypeShape::Primitive);
    assert_eq!(store.shape(TypeId::OBJECT), TypeShape::Primitive);
    assert_eq!(store.shape(TypeId::ERROR), TypeShape::Error);
    assert!(store.declaration_files(TypeId::STRING).is_empty());
}

#[test]
fn test_reserved_type_is_an_error_until_defined() {
    let store = TypeStore::new();
    let id = store.reserve();
    assert_eq!(store.shape(id), TypeShape::Error);

    store.define(id, TypeData::Object(ObjectShape::plain(vec![])));
    assert_eq!(store.shape(id), TypeShape::Object(ObjectKind::Plain));
}

#[test]
fn test_union_interning_and_collapse() {
    let store = TypeStore::new();
    let a = store.union(vec![TypeId::STRING, TypeId::NUMBER]);
    let b = store.union(vec![TypeId::STRING, TypeId::NUMBER, TypeId::STRING]);
    assert_eq!(a, b);
    assert_eq!(store.union(vec![TypeId::STRING]), TypeId::STRING);

    let TypeShape::Union(members) = store.shape(a) else {
        panic!("expected a union");
    };
    assert_eq!(members.as_slice(), &[TypeId::STRING, TypeId::NUMBER]);
}

#[test]
fn test_array_references_are_interned() {
    let store = TypeStore::new();
    assert_eq!(store.array(TypeId::STRING), store.array(TypeId::STRING));
    assert_ne!(store.array(TypeId::STRING), store.readonly_array(TypeId::STRING));
    assert_eq!(
        store.tuple(vec![TypeId::STRING], true),
        store.tuple(vec![TypeId::STRING], true)
    );
}

#[test]
fn test_array_surface() {
    let store = TypeStore::new();
    let array = store.array(TypeId::STRING);
    assert_eq!(store.shape(array), TypeShape::Object(ObjectKind::Array));
    assert!(store.is_type_reference(array));
    assert_eq!(store.type_arguments(array).as_slice(), &[TypeId::STRING]);

    let length = store
        .properties(array)
        .into_iter()
        .find(|property| property.name == "length");
    assert!(length.is_some_and(|property| !property.is_readonly()));

    let index = store.index_signature(array, IndexKind::Number);
    assert_eq!(
        index,
        Some(IndexSignature {
            value_type: TypeId::STRING,
            readonly: false,
        })
    );

    let readonly = store.readonly_array(TypeId::STRING);
    assert!(
        store
            .properties(readonly)
            .iter()
            .all(|property| property.is_readonly() || property.is_method())
    );
    assert!(
        store
            .index_signature(readonly, IndexKind::Number)
            .is_some_and(|signature| signature.readonly)
    );
}

#[test]
fn test_tuple_surface() {
    let store = TypeStore::new();
    let tuple = store.tuple(vec![TypeId::STRING, TypeId::NUMBER], true);
    assert_eq!(
        store.shape(tuple),
        TypeShape::Object(ObjectKind::Tuple { readonly: true })
    );
    let properties = store.properties(tuple);
    assert!(properties[0].is_readonly());
    assert_eq!(properties[0].name, "0");
    assert_eq!(properties[1].type_id, TypeId::NUMBER);
    assert!(
        properties
            .iter()
            .any(|property| property.name == "length" && !property.is_readonly())
    );
}

#[test]
fn test_intersection_properties_are_merged() {
    let store = TypeStore::new();
    let a = store.object(vec![
        PropertyInfo::readonly("shared", TypeId::STRING),
        PropertyInfo::method("run", store.method_type()),
    ]);
    let b = store.object(vec![
        PropertyInfo::new("shared", TypeId::NUMBER),
        PropertyInfo::new("run", TypeId::NUMBER),
        PropertyInfo::new("extra", TypeId::BOOLEAN),
    ]);
    let both = store.intersection(vec![a, b]);
    let properties = store.properties(both);

    let names: Vec<&str> = properties.iter().map(|property| property.name.as_str()).collect();
    assert_eq!(names, ["shared", "run", "extra"]);

    // Readonly in any member wins.
    assert!(properties[0].is_readonly());
    assert_eq!(
        store.shape(properties[0].type_id),
        TypeShape::Intersection([TypeId::STRING, TypeId::NUMBER].into_iter().collect())
    );
    // Method only when every member declares a method.
    assert!(!properties[1].is_method());
    assert!(!properties[2].is_readonly());
}

#[test]
fn test_callable_intersection() {
    let store = TypeStore::new();
    let function = store.function();
    let both = store.intersection(vec![function, store.object(vec![])]);
    assert!(store.has_call_signatures(both));
}

#[test]
fn test_declaration_files_follow_symbol() {
    let store = TypeStore::new();
    let file = store.add_source_file(SourceFileInfo::project("/project/a.ts"));
    let local = store.interface("Local", vec![file], vec![]);
    let files = store.declaration_files(local);
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].file_name, "/project/a.ts");

    let array = store.array(TypeId::STRING);
    let files = store.declaration_files(array);
    assert!(files.iter().all(|file| file.is_default_library));
    assert_eq!(files[0].file_name, DEFAULT_LIB_FILE);
}

#[test]
fn test_lib_symbols_are_shared() {
    let store = TypeStore::new();
    assert_eq!(store.lib_symbol("Map"), store.lib_symbol("Map"));
    assert_ne!(store.lib_symbol("Map"), store.lib_symbol("Set"));
    assert_eq!(store.symbol_name(store.lib_symbol("Map")).as_deref(), Some("Map"));
}

#[test]
fn test_reference_builder_sees_own_id() {
    let store = TypeStore::new();
    let file = store.add_source_file(SourceFileInfo::project("/project/list.ts"));
    let symbol = store.declare("List", vec![file]);
    let mut seen = None;
    let list = store.reference(symbol, vec![TypeId::STRING], |id| {
        seen = Some(id);
        ObjectShape::named(symbol, vec![PropertyInfo::readonly("tail", id)])
            .with_type_arguments([TypeId::STRING])
    });
    assert_eq!(seen, Some(list));
    assert_eq!(store.properties(list)[0].type_id, list);
}
