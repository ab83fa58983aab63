//! In-memory host type system snapshot.
//!
//! `TypeStore` implements [`StructuralAdapter`] over types registered through
//! its builder methods. It stands in for a real checker in tests and
//! benchmarks, and is usable directly by tools that already lowered their
//! types into this form.
//!
//! Registration takes `&self` (storage is `DashMap`-backed), so a store can be
//! shared across threads once built. Recursive graphs are built by reserving
//! an id first and defining it afterwards:
//!
//! ```ignore
//! let store = TypeStore::new();
//! let node = store.reserve();
//! let next = store.union(vec![node, TypeId::NULL]);
//! store.define(node, TypeData::Object(ObjectShape::plain(vec![
//!     PropertyInfo::readonly("next", next),
//! ])));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use indexmap::IndexMap;
use smallvec::smallvec;
use tracing::trace;

use crate::adapter::StructuralAdapter;
use crate::format::TypeFormatter;
use crate::type_name::TypeName;
use crate::types::{
    FileId, IndexKind, IndexSignature, NodeId, ObjectKind, PropertyFlags, PropertyInfo,
    RecursionIdentity, SourceFileInfo, SymbolId, TypeId, TypeList, TypeRef, TypeShape,
};

/// Global counter for telling store instances apart in traces.
static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

/// Default location of the standard library declarations.
pub const DEFAULT_LIB_FILE: &str = "/lib/lib.es5.d.ts";

const ARRAY_METHODS: &[&str] = &[
    "push", "pop", "shift", "unshift", "splice", "sort", "reverse", "fill", "concat", "slice",
    "map", "filter", "indexOf", "join",
];

const READONLY_ARRAY_METHODS: &[&str] = &[
    "concat", "slice", "map", "filter", "indexOf", "includes", "join", "at", "every", "some",
];

// =============================================================================
// Stored data
// =============================================================================

/// Intrinsic (built-in, declaration-less) types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntrinsicKind {
    Any,
    Unknown,
    Never,
    Void,
    Undefined,
    Null,
    Boolean,
    Number,
    Bigint,
    String,
    Symbol,
    Object,
}

impl IntrinsicKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Unknown => "unknown",
            Self::Never => "never",
            Self::Void => "void",
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::Bigint => "bigint",
            Self::String => "string",
            Self::Symbol => "symbol",
            Self::Object => "object",
        }
    }
}

/// `C extends E ? T : F`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalType {
    pub check_type: TypeId,
    pub extends_type: TypeId,
    pub true_type: TypeRef,
    pub false_type: TypeRef,
}

/// Structure of an object-category type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectShape {
    pub kind: ObjectKind,
    /// Declaring symbol; `None` for object literals and other anonymous types.
    pub symbol: Option<SymbolId>,
    pub properties: Vec<PropertyInfo>,
    pub callable: bool,
    /// Set for references to generic declarations (`Foo<A>`), arrays and tuples.
    pub is_reference: bool,
    pub type_arguments: TypeList,
    pub string_index: Option<IndexSignature>,
    pub number_index: Option<IndexSignature>,
}

impl ObjectShape {
    /// An anonymous object literal type.
    pub fn plain(properties: Vec<PropertyInfo>) -> Self {
        Self {
            kind: ObjectKind::Plain,
            symbol: None,
            properties,
            callable: false,
            is_reference: false,
            type_arguments: TypeList::new(),
            string_index: None,
            number_index: None,
        }
    }

    /// A named (interface/class) object type.
    pub fn named(symbol: SymbolId, properties: Vec<PropertyInfo>) -> Self {
        Self {
            symbol: Some(symbol),
            ..Self::plain(properties)
        }
    }

    /// Builder: make this a reference with the given type arguments.
    pub fn with_type_arguments(mut self, type_arguments: impl IntoIterator<Item = TypeId>) -> Self {
        self.is_reference = true;
        self.type_arguments = type_arguments.into_iter().collect();
        self
    }

    pub fn with_index(mut self, kind: IndexKind, value_type: TypeId, readonly: bool) -> Self {
        let signature = Some(IndexSignature {
            value_type,
            readonly,
        });
        match kind {
            IndexKind::String => self.string_index = signature,
            IndexKind::Number => self.number_index = signature,
        }
        self
    }

    pub fn with_call_signature(mut self) -> Self {
        self.callable = true;
        self
    }

    pub fn with_kind(mut self, kind: ObjectKind) -> Self {
        self.kind = kind;
        self
    }
}

/// A stored type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeData {
    /// Reserved by [`TypeStore::reserve`] and never defined. Reported as an
    /// error type.
    Pending,
    Error,
    Intrinsic(IntrinsicKind),
    /// Literal type, stored as its source text (`"a"`, `1`, `true`).
    Literal(String),
    TypeParameter(SymbolId),
    Union(TypeList),
    Intersection(TypeList),
    Conditional(ConditionalType),
    Object(ObjectShape),
}

/// A declared name and where it was declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolInfo {
    pub name: String,
    pub declarations: Vec<FileId>,
}

/// `type Name<Args> = ...` attached to the type it names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasInfo {
    pub symbol: SymbolId,
    pub type_arguments: TypeList,
}

#[derive(Debug, Clone)]
struct TypeNode {
    type_id: TypeId,
    written: String,
}

// =============================================================================
// TypeStore
// =============================================================================

/// Thread-safe storage for a host type graph.
pub struct TypeStore {
    instance_id: u64,
    types: DashMap<TypeId, Arc<TypeData>>,
    next_type: AtomicU32,
    symbols: DashMap<SymbolId, SymbolInfo>,
    next_symbol: AtomicU32,
    files: DashMap<FileId, SourceFileInfo>,
    next_file: AtomicU32,
    nodes: DashMap<NodeId, TypeNode>,
    next_node: AtomicU32,
    aliases: DashMap<TypeId, AliasInfo>,
    lib_symbols: DashMap<String, SymbolId>,
    unions: DashMap<TypeList, TypeId>,
    intersections: DashMap<TypeList, TypeId>,
    references: DashMap<(SymbolId, TypeList), TypeId>,
    tuples: DashMap<(bool, TypeList), TypeId>,
    lib_file: FileId,
    method_type: TypeId,
    current_directory: String,
    type_roots: Vec<String>,
}

impl Default for TypeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeStore {
    /// A store for a project rooted at `/project`.
    pub fn new() -> Self {
        Self::with_program("/project", vec!["/project/node_modules/@types".to_string()])
    }

    /// A store for a project rooted at `current_directory`.
    pub fn with_program(current_directory: impl Into<String>, type_roots: Vec<String>) -> Self {
        let instance_id = NEXT_INSTANCE_ID.fetch_add(1, Ordering::SeqCst);
        trace!(instance_id, "TypeStore::new");

        let mut store = Self {
            instance_id,
            types: DashMap::new(),
            next_type: AtomicU32::new(TypeId::FIRST_USER),
            symbols: DashMap::new(),
            next_symbol: AtomicU32::new(1),
            files: DashMap::new(),
            next_file: AtomicU32::new(1),
            nodes: DashMap::new(),
            next_node: AtomicU32::new(1),
            aliases: DashMap::new(),
            lib_symbols: DashMap::new(),
            unions: DashMap::new(),
            intersections: DashMap::new(),
            references: DashMap::new(),
            tuples: DashMap::new(),
            lib_file: FileId(0),
            method_type: TypeId::ERROR,
            current_directory: current_directory.into(),
            type_roots,
        };

        store.types.insert(TypeId::ERROR, Arc::new(TypeData::Error));
        for (id, kind) in [
            (TypeId::ANY, IntrinsicKind::Any),
            (TypeId::UNKNOWN, IntrinsicKind::Unknown),
            (TypeId::NEVER, IntrinsicKind::Never),
            (TypeId::VOID, IntrinsicKind::Void),
            (TypeId::UNDEFINED, IntrinsicKind::Undefined),
            (TypeId::NULL, IntrinsicKind::Null),
            (TypeId::BOOLEAN, IntrinsicKind::Boolean),
            (TypeId::NUMBER, IntrinsicKind::Number),
            (TypeId::BIGINT, IntrinsicKind::Bigint),
            (TypeId::STRING, IntrinsicKind::String),
            (TypeId::SYMBOL, IntrinsicKind::Symbol),
            (TypeId::OBJECT, IntrinsicKind::Object),
        ] {
            store.types.insert(id, Arc::new(TypeData::Intrinsic(kind)));
        }

        store.lib_file = store.add_source_file(SourceFileInfo::default_library(DEFAULT_LIB_FILE));
        store.method_type = store.function();
        store
    }

    // -------------------------------------------------------------------------
    // Allocation
    // -------------------------------------------------------------------------

    fn register(&self, data: TypeData) -> TypeId {
        let id = TypeId(self.next_type.fetch_add(1, Ordering::SeqCst));
        trace!(instance_id = self.instance_id, type_id = id.0, "TypeStore::register");
        self.types.insert(id, Arc::new(data));
        id
    }

    /// Reserve an id to be defined later with [`define`](Self::define).
    pub fn reserve(&self) -> TypeId {
        self.register(TypeData::Pending)
    }

    /// Define (or redefine) the type behind `id`.
    pub fn define(&self, id: TypeId, data: TypeData) {
        self.types.insert(id, Arc::new(data));
    }

    /// Register an arbitrary type.
    pub fn intern(&self, data: TypeData) -> TypeId {
        self.register(data)
    }

    pub fn lookup(&self, id: TypeId) -> Option<Arc<TypeData>> {
        self.types.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    // -------------------------------------------------------------------------
    // Program structure
    // -------------------------------------------------------------------------

    pub fn add_source_file(&self, info: SourceFileInfo) -> FileId {
        let id = FileId(self.next_file.fetch_add(1, Ordering::SeqCst));
        self.files.insert(id, info);
        id
    }

    /// The standard library file every lib symbol is declared in.
    pub fn lib_file(&self) -> FileId {
        self.lib_file
    }

    /// Declare a symbol in the given files.
    pub fn declare(&self, name: impl Into<String>, declarations: Vec<FileId>) -> SymbolId {
        let id = SymbolId(self.next_symbol.fetch_add(1, Ordering::SeqCst));
        self.symbols.insert(
            id,
            SymbolInfo {
                name: name.into(),
                declarations,
            },
        );
        id
    }

    /// The standard-library symbol called `name`, declared on first use.
    pub fn lib_symbol(&self, name: &str) -> SymbolId {
        if let Some(id) = self.lib_symbols.get(name) {
            return *id;
        }
        match self.lib_symbols.entry(name.to_string()) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                let id = self.declare(name, vec![self.lib_file]);
                entry.insert(id);
                id
            }
        }
    }

    pub fn symbol(&self, id: SymbolId) -> Option<SymbolInfo> {
        self.symbols.get(&id).map(|entry| entry.value().clone())
    }

    pub fn symbol_name(&self, id: SymbolId) -> Option<String> {
        self.symbols.get(&id).map(|entry| entry.name.clone())
    }

    /// Name `ty` with a type alias.
    pub fn set_alias(&self, ty: TypeId, symbol: SymbolId, type_arguments: Vec<TypeId>) {
        self.aliases.insert(
            ty,
            AliasInfo {
                symbol,
                type_arguments: type_arguments.into_iter().collect(),
            },
        );
    }

    pub fn alias(&self, ty: TypeId) -> Option<AliasInfo> {
        self.aliases.get(&ty).map(|entry| entry.value().clone())
    }

    /// Record that `ty` was written out in source as `written`.
    pub fn type_node(&self, ty: TypeId, written: impl Into<String>) -> TypeRef {
        let id = NodeId(self.next_node.fetch_add(1, Ordering::SeqCst));
        self.nodes.insert(
            id,
            TypeNode {
                type_id: ty,
                written: written.into(),
            },
        );
        TypeRef::with_node(ty, id)
    }

    pub fn written_text(&self, node: NodeId) -> Option<String> {
        self.nodes.get(&node).map(|entry| entry.written.clone())
    }

    // -------------------------------------------------------------------------
    // Type builders
    // -------------------------------------------------------------------------

    pub fn literal(&self, text: impl Into<String>) -> TypeId {
        self.register(TypeData::Literal(text.into()))
    }

    pub fn type_parameter(&self, name: impl Into<String>, declared_in: Vec<FileId>) -> TypeId {
        let symbol = self.declare(name, declared_in);
        self.register(TypeData::TypeParameter(symbol))
    }

    /// A union of `members`. Duplicates are removed; a single member is
    /// returned as-is. Identical member lists share one id.
    pub fn union(&self, members: Vec<TypeId>) -> TypeId {
        self.composite(members, true)
    }

    /// An intersection of `members`, interned like [`union`](Self::union).
    pub fn intersection(&self, members: Vec<TypeId>) -> TypeId {
        self.composite(members, false)
    }

    fn composite(&self, members: Vec<TypeId>, is_union: bool) -> TypeId {
        let mut list = TypeList::new();
        for member in members {
            if !list.contains(&member) {
                list.push(member);
            }
        }
        match list.len() {
            0 => return TypeId::NEVER,
            1 => return list[0],
            _ => {}
        }
        let table = if is_union {
            &self.unions
        } else {
            &self.intersections
        };
        match table.entry(list.clone()) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                let data = if is_union {
                    TypeData::Union(list)
                } else {
                    TypeData::Intersection(list)
                };
                let id = self.register(data);
                entry.insert(id);
                id
            }
        }
    }

    pub fn conditional(
        &self,
        check_type: TypeId,
        extends_type: TypeId,
        true_type: impl Into<TypeRef>,
        false_type: impl Into<TypeRef>,
    ) -> TypeId {
        self.register(TypeData::Conditional(ConditionalType {
            check_type,
            extends_type,
            true_type: true_type.into(),
            false_type: false_type.into(),
        }))
    }

    /// An anonymous object literal type.
    pub fn object(&self, properties: Vec<PropertyInfo>) -> TypeId {
        self.register(TypeData::Object(ObjectShape::plain(properties)))
    }

    pub fn object_with_shape(&self, shape: ObjectShape) -> TypeId {
        self.register(TypeData::Object(shape))
    }

    /// A named interface declared in `declared_in`.
    pub fn interface(
        &self,
        name: impl Into<String>,
        declared_in: Vec<FileId>,
        properties: Vec<PropertyInfo>,
    ) -> TypeId {
        let symbol = self.declare(name, declared_in);
        self.object_with_shape(ObjectShape::named(symbol, properties))
    }

    /// A function type: callable, no own properties.
    pub fn function(&self) -> TypeId {
        self.object_with_shape(ObjectShape::plain(Vec::new()).with_call_signature())
    }

    /// Shared function type used for library method members.
    pub fn method_type(&self) -> TypeId {
        self.method_type
    }

    /// `symbol<type_arguments>`, interned per symbol and argument list.
    ///
    /// `build` receives the reference's own id so the shape may refer back to
    /// it. It runs outside any internal lock.
    pub fn reference(
        &self,
        symbol: SymbolId,
        type_arguments: Vec<TypeId>,
        build: impl FnOnce(TypeId) -> ObjectShape,
    ) -> TypeId {
        let key: TypeList = type_arguments.into_iter().collect();
        let id = match self.references.entry((symbol, key)) {
            Entry::Occupied(entry) => return *entry.get(),
            Entry::Vacant(entry) => {
                let id = self.reserve();
                entry.insert(id);
                id
            }
        };
        let shape = build(id);
        self.define(id, TypeData::Object(shape));
        id
    }

    /// `Array<element>` (`element[]`).
    pub fn array(&self, element: TypeId) -> TypeId {
        let symbol = self.lib_symbol("Array");
        self.reference(symbol, vec![element], |_| {
            let mut properties = vec![PropertyInfo::new("length", TypeId::NUMBER)];
            properties.extend(
                ARRAY_METHODS
                    .iter()
                    .map(|name| PropertyInfo::method(*name, self.method_type)),
            );
            ObjectShape::named(symbol, properties)
                .with_kind(ObjectKind::Array)
                .with_type_arguments([element])
                .with_index(IndexKind::Number, element, false)
        })
    }

    /// `ReadonlyArray<element>` (`readonly element[]`).
    pub fn readonly_array(&self, element: TypeId) -> TypeId {
        let symbol = self.lib_symbol("ReadonlyArray");
        self.reference(symbol, vec![element], |_| {
            let mut properties = vec![PropertyInfo::readonly("length", TypeId::NUMBER)];
            properties.extend(
                READONLY_ARRAY_METHODS
                    .iter()
                    .map(|name| PropertyInfo::method(*name, self.method_type)),
            );
            ObjectShape::named(symbol, properties)
                .with_kind(ObjectKind::Array)
                .with_type_arguments([element])
                .with_index(IndexKind::Number, element, true)
        })
    }

    /// `[A, B, ...]` or `readonly [A, B, ...]`.
    pub fn tuple(&self, elements: Vec<TypeId>, readonly: bool) -> TypeId {
        let key: TypeList = elements.iter().copied().collect();
        let id = match self.tuples.entry((readonly, key)) {
            Entry::Occupied(entry) => return *entry.get(),
            Entry::Vacant(entry) => {
                let id = self.reserve();
                entry.insert(id);
                id
            }
        };

        let element_flags = if readonly {
            PropertyFlags::READONLY
        } else {
            PropertyFlags::empty()
        };
        let mut properties: Vec<PropertyInfo> = elements
            .iter()
            .enumerate()
            .map(|(index, element)| {
                PropertyInfo::new(index.to_string(), *element).with_flags(element_flags)
            })
            .collect();
        // Tuples carry a writable `length` even when the tuple is readonly.
        properties.push(PropertyInfo::new("length", TypeId::NUMBER));
        let methods = if readonly {
            READONLY_ARRAY_METHODS
        } else {
            ARRAY_METHODS
        };
        properties.extend(
            methods
                .iter()
                .map(|name| PropertyInfo::method(*name, self.method_type)),
        );

        let element_union = match elements.len() {
            0 => TypeId::NEVER,
            _ => self.union(elements.clone()),
        };
        let shape = ObjectShape::plain(properties)
            .with_kind(ObjectKind::Tuple { readonly })
            .with_type_arguments(elements)
            .with_index(IndexKind::Number, element_union, readonly);
        self.define(id, TypeData::Object(shape));
        id
    }

    // -------------------------------------------------------------------------
    // Internal queries
    // -------------------------------------------------------------------------

    fn object_shape(&self, ty: TypeId) -> Option<Arc<TypeData>> {
        self.lookup(ty)
            .filter(|data| matches!(data.as_ref(), TypeData::Object(_)))
    }

    fn symbol_of(&self, ty: TypeId) -> Option<SymbolId> {
        match self.lookup(ty)?.as_ref() {
            TypeData::Object(shape) => shape.symbol,
            TypeData::TypeParameter(symbol) => Some(*symbol),
            _ => None,
        }
    }

    /// Properties of every constituent of an intersection, merged by name in
    /// first-seen order.
    fn intersection_properties(&self, members: &TypeList) -> Vec<PropertyInfo> {
        let mut merged: IndexMap<String, (Vec<TypeId>, PropertyFlags)> = IndexMap::new();
        for member in members {
            for property in self.properties(*member) {
                let PropertyInfo {
                    name,
                    type_id,
                    flags,
                } = property;
                let (types, merged_flags) = merged
                    .entry(name)
                    .or_insert_with(|| (Vec::new(), flags));
                if !types.contains(&type_id) {
                    types.push(type_id);
                }
                let readonly = merged_flags.contains(PropertyFlags::READONLY)
                    || flags.contains(PropertyFlags::READONLY);
                let method = merged_flags.contains(PropertyFlags::METHOD)
                    && flags.contains(PropertyFlags::METHOD);
                *merged_flags |= flags;
                merged_flags.set(PropertyFlags::READONLY, readonly);
                merged_flags.set(PropertyFlags::METHOD, method);
            }
        }
        merged
            .into_iter()
            .map(|(name, (types, flags))| PropertyInfo {
                name,
                type_id: self.intersection(types),
                flags,
            })
            .collect()
    }
}

impl StructuralAdapter for TypeStore {
    fn shape(&self, ty: TypeId) -> TypeShape {
        let Some(data) = self.lookup(ty) else {
            return TypeShape::Error;
        };
        match data.as_ref() {
            TypeData::Pending | TypeData::Error => TypeShape::Error,
            TypeData::Intrinsic(_) | TypeData::Literal(_) | TypeData::TypeParameter(_) => {
                TypeShape::Primitive
            }
            TypeData::Union(members) => TypeShape::Union(members.clone()),
            TypeData::Intersection(members) => TypeShape::Intersection(members.clone()),
            TypeData::Conditional(conditional) => TypeShape::Conditional {
                true_type: conditional.true_type,
                false_type: conditional.false_type,
            },
            TypeData::Object(shape) => TypeShape::Object(shape.kind),
        }
    }

    fn properties(&self, ty: TypeId) -> Vec<PropertyInfo> {
        let Some(data) = self.lookup(ty) else {
            return Vec::new();
        };
        match data.as_ref() {
            TypeData::Object(shape) => shape.properties.clone(),
            TypeData::Intersection(members) => self.intersection_properties(members),
            _ => Vec::new(),
        }
    }

    fn has_call_signatures(&self, ty: TypeId) -> bool {
        let Some(data) = self.lookup(ty) else {
            return false;
        };
        match data.as_ref() {
            TypeData::Object(shape) => shape.callable,
            TypeData::Intersection(members) => {
                members.iter().any(|member| self.has_call_signatures(*member))
            }
            _ => false,
        }
    }

    fn is_type_reference(&self, ty: TypeId) -> bool {
        self.object_shape(ty).is_some_and(|data| match data.as_ref() {
            TypeData::Object(shape) => shape.is_reference,
            _ => false,
        })
    }

    fn type_arguments(&self, ty: TypeId) -> TypeList {
        match self.object_shape(ty).as_deref() {
            Some(TypeData::Object(shape)) => shape.type_arguments.clone(),
            _ => smallvec![],
        }
    }

    fn index_signature(&self, ty: TypeId, kind: IndexKind) -> Option<IndexSignature> {
        match self.object_shape(ty)?.as_ref() {
            TypeData::Object(shape) => match kind {
                IndexKind::String => shape.string_index,
                IndexKind::Number => shape.number_index,
            },
            _ => None,
        }
    }

    fn recursion_identity(&self, ty: TypeId) -> RecursionIdentity {
        RecursionIdentity(u64::from(ty.0))
    }

    fn type_name(&self, ty: TypeRef) -> TypeName {
        TypeFormatter::new(self).type_name(ty)
    }

    fn declaration_files(&self, ty: TypeId) -> Vec<SourceFileInfo> {
        let symbol = self
            .symbol_of(ty)
            .or_else(|| self.alias(ty).map(|alias| alias.symbol));
        let Some(info) = symbol.and_then(|symbol| self.symbol(symbol)) else {
            return Vec::new();
        };
        info.declarations
            .iter()
            .filter_map(|file| self.files.get(file).map(|entry| entry.value().clone()))
            .collect()
    }

    fn current_directory(&self) -> String {
        self.current_directory.clone()
    }

    fn type_roots(&self) -> Vec<String> {
        self.type_roots.clone()
    }
}

#[cfg(test)]
#[path = "../tests/store_tests.rs"]
mod tests;
