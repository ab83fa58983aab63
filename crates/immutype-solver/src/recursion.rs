//! Bounds for the type walks that still use native recursion.
//!
//! The classification engine runs on an explicit worklist. Type-name
//! formatting does not: it descends into type arguments and object members
//! directly, and a recursive type would render forever. [`RecursionGuard`]
//! denies entry to a type already on the current path, past a depth limit,
//! or once the total number of steps is spent.
//!
//! In debug builds a guard dropped with entries still open panics, as does a
//! `leave` without a matching `enter`.

use immutype_common::limits::{
    MAX_TYPE_NAME_DEPTH, MAX_TYPE_NAME_ITERATIONS, MAX_TYPE_NAME_VISITING,
};
use rustc_hash::FxHashSet;
use std::hash::Hash;

/// Named limit presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RecursionProfile {
    /// Rendering a type and its arguments or members to text.
    ///
    /// depth = 8, iterations = 10,000
    TypeName,
}

impl RecursionProfile {
    const fn max_depth(self) -> u32 {
        match self {
            Self::TypeName => MAX_TYPE_NAME_DEPTH,
        }
    }

    const fn max_iterations(self) -> u32 {
        match self {
            Self::TypeName => MAX_TYPE_NAME_ITERATIONS,
        }
    }

    const fn max_visiting(self) -> u32 {
        match self {
            Self::TypeName => MAX_TYPE_NAME_VISITING,
        }
    }
}

/// Outcome of [`RecursionGuard::enter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RecursionResult {
    Entered,
    /// The key is already on the current path.
    Cycle,
    /// Too deep, or too many keys open at once.
    DepthExceeded,
    IterationExceeded,
}

impl RecursionResult {
    #[inline]
    pub(crate) fn is_entered(self) -> bool {
        matches!(self, Self::Entered)
    }
}

/// Tracks the keys on the current path of a recursive walk.
///
/// ```ignore
/// let mut guard = RecursionGuard::with_profile(RecursionProfile::TypeName);
/// if !guard.enter(ty).is_entered() {
///     return "...".to_string();
/// }
/// let text = render(ty);
/// guard.leave(ty);
/// ```
pub(crate) struct RecursionGuard<K: Hash + Eq + Copy> {
    visiting: FxHashSet<K>,
    depth: u32,
    iterations: u32,
    max_depth: u32,
    max_iterations: u32,
    max_visiting: u32,
}

impl<K: Hash + Eq + Copy> RecursionGuard<K> {
    pub(crate) fn with_profile(profile: RecursionProfile) -> Self {
        Self {
            visiting: FxHashSet::default(),
            depth: 0,
            iterations: 0,
            max_depth: profile.max_depth(),
            max_iterations: profile.max_iterations(),
            max_visiting: profile.max_visiting(),
        }
    }

    /// On [`RecursionResult::Entered`] the caller must [`leave`](Self::leave)
    /// with the same key.
    pub(crate) fn enter(&mut self, key: K) -> RecursionResult {
        self.iterations = self.iterations.saturating_add(1);
        if self.iterations > self.max_iterations {
            return RecursionResult::IterationExceeded;
        }
        if self.depth >= self.max_depth || self.visiting.len() as u32 >= self.max_visiting {
            return RecursionResult::DepthExceeded;
        }
        if !self.visiting.insert(key) {
            return RecursionResult::Cycle;
        }
        self.depth += 1;
        RecursionResult::Entered
    }

    pub(crate) fn leave(&mut self, key: K) {
        let was_present = self.visiting.remove(&key);
        debug_assert!(was_present, "RecursionGuard::leave() without a matching enter()");
        self.depth = self.depth.saturating_sub(1);
    }
}

#[cfg(debug_assertions)]
impl<K: Hash + Eq + Copy> Drop for RecursionGuard<K> {
    fn drop(&mut self) {
        if !std::thread::panicking() && !self.visiting.is_empty() {
            panic!(
                "RecursionGuard dropped with {} entries still open",
                self.visiting.len()
            );
        }
    }
}
