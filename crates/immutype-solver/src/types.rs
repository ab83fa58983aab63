//! Handles and structural records exchanged with the host type system.
//!
//! The engine never owns types. It holds [`TypeId`] handles into a host (see
//! [`crate::adapter::StructuralAdapter`]) and asks the host for the few
//! structural facts it needs: a [`TypeShape`], [`PropertyInfo`] lists,
//! [`IndexSignature`]s and type arguments.

use bitflags::bitflags;
use immutype_common::limits::TYPE_LIST_INLINE;
use smallvec::SmallVec;

/// Opaque handle to a type in the host type system.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

impl TypeId {
    // Intrinsics pre-registered by `TypeStore`. Hosts with their own numbering
    // are free to ignore these.
    pub const ERROR: Self = Self(0);
    pub const ANY: Self = Self(1);
    pub const UNKNOWN: Self = Self(2);
    pub const NEVER: Self = Self(3);
    pub const VOID: Self = Self(4);
    pub const UNDEFINED: Self = Self(5);
    pub const NULL: Self = Self(6);
    pub const BOOLEAN: Self = Self(7);
    pub const NUMBER: Self = Self(8);
    pub const BIGINT: Self = Self(9);
    pub const STRING: Self = Self(10);
    pub const SYMBOL: Self = Self(11);
    pub const OBJECT: Self = Self(12);

    /// First id available for non-intrinsic types.
    pub const FIRST_USER: u32 = 13;
}

/// Handle to a syntactic type node: a place where a type was written out
/// explicitly rather than inferred.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

/// A type plus, optionally, the syntax it was written with.
///
/// The node only feeds name/pattern matching and cache keying; classification
/// itself looks at `id` alone.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeRef {
    pub id: TypeId,
    pub node: Option<NodeId>,
}

impl TypeRef {
    pub const fn new(id: TypeId) -> Self {
        Self { id, node: None }
    }

    pub const fn with_node(id: TypeId, node: NodeId) -> Self {
        Self {
            id,
            node: Some(node),
        }
    }
}

impl From<TypeId> for TypeRef {
    fn from(id: TypeId) -> Self {
        Self::new(id)
    }
}

/// The key the host uses to recognise "the same type" when detecting type
/// recursion. Distinct [`TypeRef`]s of one type share it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct RecursionIdentity(pub u64);

/// Handle to a declared symbol (interface, class, alias, type parameter).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SymbolId(pub u32);

/// Handle to a source file of the host program.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FileId(pub u32);

/// Small inline list of types.
pub type TypeList = SmallVec<[TypeId; TYPE_LIST_INLINE]>;

bitflags! {
    /// Facts about a property that the writable-field scan looks at.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PropertyFlags: u8 {
        /// Declared `readonly` (or read-only in every constituent).
        const READONLY = 1 << 0;
        /// The property's only form is a callable signature (a method, or a
        /// property signature whose type is a function type).
        const METHOD = 1 << 1;
        /// ECMAScript private name (`#field`).
        const PRIVATE_NAME = 1 << 2;
        const OPTIONAL = 1 << 3;
    }
}

/// An own property of an object-like type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyInfo {
    pub name: String,
    pub type_id: TypeId,
    pub flags: PropertyFlags,
}

impl PropertyInfo {
    /// A writable data property.
    pub fn new(name: impl Into<String>, type_id: TypeId) -> Self {
        Self {
            name: name.into(),
            type_id,
            flags: PropertyFlags::empty(),
        }
    }

    pub fn readonly(name: impl Into<String>, type_id: TypeId) -> Self {
        Self::new(name, type_id).with_flags(PropertyFlags::READONLY)
    }

    pub fn method(name: impl Into<String>, type_id: TypeId) -> Self {
        Self::new(name, type_id).with_flags(PropertyFlags::METHOD)
    }

    pub fn with_flags(mut self, flags: PropertyFlags) -> Self {
        self.flags |= flags;
        self
    }

    #[inline]
    pub fn is_readonly(&self) -> bool {
        self.flags.contains(PropertyFlags::READONLY)
    }

    #[inline]
    pub fn is_method(&self) -> bool {
        self.flags.contains(PropertyFlags::METHOD)
    }

    #[inline]
    pub fn is_private_name(&self) -> bool {
        self.flags.contains(PropertyFlags::PRIVATE_NAME)
    }
}

/// Which key type an index signature is declared over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexKind {
    String,
    Number,
}

impl IndexKind {
    /// Classification visits string signatures before numeric ones.
    pub const ORDER: [Self; 2] = [Self::String, Self::Number];
}

/// An index signature: `[key: string]: T` or `[key: number]: T`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSignature {
    pub value_type: TypeId,
    pub readonly: bool,
}

/// Flavour of an object-category type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Records, interfaces, class instances, functions.
    Plain,
    /// `Array<T>` / `ReadonlyArray<T>`.
    Array,
    /// A tuple reference. `readonly` is the tuple target's own modifier.
    Tuple { readonly: bool },
}

/// Structural category of a type, as reported by the host.
///
/// The set is closed: every host type maps onto exactly one variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeShape {
    /// The host could not produce a type (unresolved reference, error type).
    Error,
    Union(TypeList),
    Intersection(TypeList),
    /// `C extends E ? T : F`; both branches are kept since the condition is
    /// never evaluated here.
    Conditional {
        true_type: TypeRef,
        false_type: TypeRef,
    },
    Object(ObjectKind),
    /// Everything else: primitives, literals, type parameters, `any`, ...
    Primitive,
}

/// Facts about a source file that provenance matching needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFileInfo {
    pub file_name: String,
    /// Part of the host's standard library (`lib.*.d.ts`).
    pub is_default_library: bool,
    /// Loaded from an external library (e.g. `node_modules`).
    pub is_external_library: bool,
    /// Package the file belongs to, when it came from one.
    pub package_name: Option<String>,
}

impl SourceFileInfo {
    /// A file of the user's own project.
    pub fn project(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            is_default_library: false,
            is_external_library: false,
            package_name: None,
        }
    }

    /// A standard-library declaration file.
    pub fn default_library(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            is_default_library: true,
            is_external_library: false,
            package_name: None,
        }
    }

    /// A declaration file of an installed package.
    pub fn package(file_name: impl Into<String>, package_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            is_default_library: false,
            is_external_library: true,
            package_name: Some(package_name.into()),
        }
    }
}
