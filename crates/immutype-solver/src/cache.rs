//! Classification cache.
//!
//! Entries are written under the syntactic node a type was written with, when
//! there is one, and always under the host's recursion identity as well. A
//! read uses the node key when the reference has a node and the identity key
//! otherwise, never both. Distinct spellings of one recursive type can
//! therefore carry distinct override results, and a node-less visit (a
//! property type, a union member) finds whatever was last computed for the
//! type under any spelling.
//!
//! An entry remembers the threshold ("ceiling") it was computed under. The
//! engine stops refining once a value reaches the requested threshold, so a
//! value at or above its ceiling only says "at least this much"; it is reused
//! for requests whose threshold does not exceed the ceiling, and recomputed
//! otherwise.

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::adapter::StructuralAdapter;
use crate::immutability::Immutability;
use crate::types::{NodeId, RecursionIdentity, TypeRef};

/// Where a cache entry is filed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Node(NodeId),
    Identity(RecursionIdentity),
}

/// A cached classification and the threshold it was computed under.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CachedImmutability {
    pub value: Immutability,
    pub ceiling: Immutability,
}

impl CachedImmutability {
    /// Marker for a type whose classification is in progress.
    pub const CALCULATING: Self = Self {
        value: Immutability::Calculating,
        ceiling: Immutability::Immutable,
    };

    /// Whether this entry answers a request made with `threshold`.
    pub fn satisfies(&self, threshold: Immutability) -> bool {
        self.value.is_calculating()
            || !self.value.is_at_least(self.ceiling)
            || self.ceiling.is_at_least(threshold)
    }
}

/// Memoized classifications for one host snapshot.
#[derive(Debug, Default)]
pub struct ImmutabilityCache {
    entries: FxHashMap<CacheKey, CachedImmutability>,
}

impl ImmutabilityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The key reads use for `ty`: its node if present, else its identity.
    pub fn lookup_key<A: StructuralAdapter + ?Sized>(db: &A, ty: TypeRef) -> CacheKey {
        match ty.node {
            Some(node) => CacheKey::Node(node),
            None => CacheKey::Identity(db.recursion_identity(ty.id)),
        }
    }

    /// The cached value for `ty` if it answers a request with `threshold`.
    pub fn get<A: StructuralAdapter + ?Sized>(
        &self,
        db: &A,
        ty: TypeRef,
        threshold: Immutability,
    ) -> Option<Immutability> {
        let key = Self::lookup_key(db, ty);
        let entry = self.entries.get(&key)?;
        if !entry.satisfies(threshold) {
            trace!(?key, value = entry.value.as_str(), "cache entry below requested threshold");
            return None;
        }
        trace!(?key, value = entry.value.as_str(), "cache hit");
        Some(entry.value)
    }

    /// Records `entry` under the node key (if any) and the identity key,
    /// replacing whatever was there.
    pub fn set<A: StructuralAdapter + ?Sized>(
        &mut self,
        db: &A,
        ty: TypeRef,
        entry: CachedImmutability,
    ) {
        if let Some(node) = ty.node {
            self.entries.insert(CacheKey::Node(node), entry);
        }
        self.entries
            .insert(CacheKey::Identity(db.recursion_identity(ty.id)), entry);
    }

    pub fn get_entry(&self, key: &CacheKey) -> Option<CachedImmutability> {
        self.entries.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Which cache a free-function classification uses.
pub enum CacheScope<'a> {
    /// A cache owned by the caller, reused across calls.
    Custom(&'a mut ImmutabilityCache),
    /// A fresh cache for this call only.
    Disabled,
}
