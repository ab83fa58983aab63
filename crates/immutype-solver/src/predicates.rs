//! Threshold predicates over [`get_type_immutability`].
//!
//! Each one classifies with the lowest threshold that still settles its
//! answer, so the engine can stop early.

use crate::adapter::StructuralAdapter;
use crate::cache::CacheScope;
use crate::checker::get_type_immutability;
use crate::immutability::Immutability;
use crate::overrides::ImmutabilityOverride;
use crate::types::TypeRef;

pub fn is_immutable_type<A: StructuralAdapter + ?Sized>(
    db: &A,
    ty: impl Into<TypeRef>,
    overrides: &[ImmutabilityOverride],
    cache: CacheScope<'_>,
) -> bool {
    get_type_immutability(db, ty, overrides, cache, Immutability::Immutable).is_immutable()
}

pub fn is_readonly_deep_type<A: StructuralAdapter + ?Sized>(
    db: &A,
    ty: impl Into<TypeRef>,
    overrides: &[ImmutabilityOverride],
    cache: CacheScope<'_>,
) -> bool {
    get_type_immutability(db, ty, overrides, cache, Immutability::ReadonlyDeep).is_readonly_deep()
}

pub fn is_readonly_shallow_type<A: StructuralAdapter + ?Sized>(
    db: &A,
    ty: impl Into<TypeRef>,
    overrides: &[ImmutabilityOverride],
    cache: CacheScope<'_>,
) -> bool {
    get_type_immutability(db, ty, overrides, cache, Immutability::ReadonlyShallow)
        .is_readonly_shallow()
}

/// Classifies up to `ReadonlyShallow`: anything below it is exact, which is
/// all `Mutable` needs. A `Mutable` threshold would let a property-less
/// object stop before its index signatures are read.
pub fn is_mutable_type<A: StructuralAdapter + ?Sized>(
    db: &A,
    ty: impl Into<TypeRef>,
    overrides: &[ImmutabilityOverride],
    cache: CacheScope<'_>,
) -> bool {
    get_type_immutability(db, ty, overrides, cache, Immutability::ReadonlyShallow).is_mutable()
}

#[cfg(test)]
#[path = "../tests/predicates_tests.rs"]
mod tests;
