//! Immutability classification over a host type system.
//!
//! Classifies a type into the lattice
//! `Mutable < ReadonlyShallow < ReadonlyDeep < Immutable`. It is built from:
//!
//! - **Explicit worklist**: no native recursion, so deep and cyclic type
//!   graphs cannot overflow the stack
//! - **`Calculating` markers** in the cache to break cycles
//! - **Override rules** matched by name, pattern and declaration provenance
//!
//! The host type system is reached only through [`StructuralAdapter`].
//! [`TypeStore`] is an in-memory implementation of it.

pub mod adapter;
pub mod cache;
pub mod checker;
mod classify;
pub mod config;
pub mod format;
pub mod immutability;
pub mod overrides;
pub mod predicates;
mod query_trace;
mod recursion;
pub mod store;
pub mod type_name;
pub mod types;

pub use adapter::StructuralAdapter;
pub use cache::{CacheKey, CacheScope, CachedImmutability, ImmutabilityCache};
pub use checker::{TypeImmutabilityChecker, get_type_immutability};
pub use config::{OverrideConfig, OverrideConfigError, compile_overrides};
pub use format::TypeFormatter;
pub use immutability::{Immutability, ParseImmutabilityError};
pub use overrides::{
    DeclarationSource, ImmutabilityOverride, TypeSpecifier, default_overrides, find_override,
};
pub use predicates::{
    is_immutable_type, is_mutable_type, is_readonly_deep_type, is_readonly_shallow_type,
};
pub use store::{ObjectShape, TypeData, TypeStore};
pub use type_name::TypeName;
pub use types::{
    FileId, IndexKind, IndexSignature, NodeId, ObjectKind, PropertyFlags, PropertyInfo,
    RecursionIdentity, SourceFileInfo, SymbolId, TypeId, TypeList, TypeRef, TypeShape,
};

// Test modules: most are loaded by their source files via #[path = "../tests/..."]
// declarations. Only cross-cutting suites are included here.
#[cfg(test)]
#[path = "../tests/recursive_types_tests.rs"]
mod recursive_types_tests;
#[cfg(test)]
#[path = "../tests/parallel_tests.rs"]
mod parallel_tests;
#[cfg(test)]
#[path = "../tests/tracing_tests.rs"]
mod tracing_tests;
