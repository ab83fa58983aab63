//! Caller-facing classification API.
//!
//! Two entry points:
//!
//! - [`get_type_immutability`]: a free function taking the overrides and an
//!   explicit [`CacheScope`].
//! - [`TypeImmutabilityChecker`]: owns the overrides and a cache shared by
//!   every query made through it, typically one per analysis run over one
//!   host snapshot.

use crate::adapter::StructuralAdapter;
use crate::cache::{CacheScope, ImmutabilityCache};
use crate::classify::Classifier;
use crate::immutability::Immutability;
use crate::overrides::{ImmutabilityOverride, default_overrides};
use crate::query_trace;
use crate::types::TypeRef;

/// Classifies `ty`.
///
/// With a `max_immutability` below `Immutable`, any result at or above it
/// only promises "at least this much"; results below it are exact. A
/// sentinel threshold is treated as `Immutable`.
pub fn get_type_immutability<A: StructuralAdapter + ?Sized>(
    db: &A,
    ty: impl Into<TypeRef>,
    overrides: &[ImmutabilityOverride],
    cache: CacheScope<'_>,
    max_immutability: Immutability,
) -> Immutability {
    let ty = ty.into();
    match cache {
        CacheScope::Custom(cache) => classify_with(db, ty, overrides, cache, max_immutability),
        CacheScope::Disabled => {
            let mut fresh = ImmutabilityCache::new();
            classify_with(db, ty, overrides, &mut fresh, max_immutability)
        }
    }
}

fn classify_with<A: StructuralAdapter + ?Sized>(
    db: &A,
    ty: TypeRef,
    overrides: &[ImmutabilityOverride],
    cache: &mut ImmutabilityCache,
    max_immutability: Immutability,
) -> Immutability {
    let threshold = if max_immutability.is_known() {
        max_immutability
    } else {
        Immutability::Immutable
    };

    let query_id = query_trace::enabled().then(query_trace::next_query_id);
    if let Some(query_id) = query_id {
        query_trace::classify_start(query_id, ty.id, threshold);
    }

    let (result, cache_hit) = Classifier::new(db, overrides, cache).run(ty, threshold);

    if let Some(query_id) = query_id {
        query_trace::classify_end(query_id, result, cache_hit);
    }
    result
}

/// Classifier bound to one host snapshot, with a cache shared across calls.
///
/// ```ignore
/// let store = TypeStore::new();
/// let mut checker = TypeImmutabilityChecker::new(&store);
/// let ty = store.object(vec![PropertyInfo::readonly("foo", TypeId::STRING)]);
/// assert!(checker.is_immutable_type(ty));
/// ```
pub struct TypeImmutabilityChecker<'a, A: StructuralAdapter + ?Sized> {
    db: &'a A,
    overrides: Vec<ImmutabilityOverride>,
    cache: ImmutabilityCache,
}

impl<'a, A: StructuralAdapter + ?Sized> TypeImmutabilityChecker<'a, A> {
    /// A checker using [`default_overrides`].
    pub fn new(db: &'a A) -> Self {
        Self::with_overrides(db, default_overrides())
    }

    pub fn with_overrides(db: &'a A, overrides: Vec<ImmutabilityOverride>) -> Self {
        Self {
            db,
            overrides,
            cache: ImmutabilityCache::new(),
        }
    }

    pub fn overrides(&self) -> &[ImmutabilityOverride] {
        &self.overrides
    }

    pub fn cache(&self) -> &ImmutabilityCache {
        &self.cache
    }

    /// Forget every cached classification.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn get_type_immutability(
        &mut self,
        ty: impl Into<TypeRef>,
        max_immutability: Immutability,
    ) -> Immutability {
        classify_with(
            self.db,
            ty.into(),
            &self.overrides,
            &mut self.cache,
            max_immutability,
        )
    }

    pub fn is_immutable_type(&mut self, ty: impl Into<TypeRef>) -> bool {
        self.get_type_immutability(ty, Immutability::Immutable)
            .is_immutable()
    }

    pub fn is_readonly_deep_type(&mut self, ty: impl Into<TypeRef>) -> bool {
        self.get_type_immutability(ty, Immutability::ReadonlyDeep)
            .is_readonly_deep()
    }

    pub fn is_readonly_shallow_type(&mut self, ty: impl Into<TypeRef>) -> bool {
        self.get_type_immutability(ty, Immutability::ReadonlyShallow)
            .is_readonly_shallow()
    }

    pub fn is_mutable_type(&mut self, ty: impl Into<TypeRef>) -> bool {
        self.get_type_immutability(ty, Immutability::ReadonlyShallow)
            .is_mutable()
    }
}

#[cfg(test)]
#[path = "../tests/checker_tests.rs"]
mod tests;
