//! Centralized limits and capacity hints for the immutability engine.
//!
//! The classification engine itself has no depth limit: it runs on an
//! explicit worklist, so its memory use grows with the size of the type
//! graph rather than with native call depth. The limits here cover the
//! helpers around it (type-name formatting, which does recurse) and
//! pre-allocation sizes.
//!
//! # Solver recursion limits
//!
//! The formatter limits are read by the solver's `RecursionProfile::TypeName`
//! preset rather than at each call site.

// =============================================================================
// Formatting Limits
// =============================================================================

/// Maximum nesting depth when rendering a type to text.
///
/// Override patterns are matched against textual forms of a type, and those
/// forms include the type's arguments, which include their own arguments, and
/// so on. Past this depth the formatter emits `...` instead of descending.
///
/// # TypeScript example
///
/// ```typescript
/// type Deep = { readonly a: { readonly b: { readonly c: /* ... */ } } };
/// // evaluated form is cut off once the nesting passes the limit:
/// // { readonly a: { readonly b: { readonly c: ... } } }
/// ```
pub const MAX_TYPE_NAME_DEPTH: u32 = 8;

/// Maximum number of formatter steps spent on one type name.
///
/// Wide unions of wide object literals can make even a depth-limited render
/// expensive. Once the budget is exhausted the remaining parts render as
/// `...`.
pub const MAX_TYPE_NAME_ITERATIONS: u32 = 10_000;

/// Maximum number of distinct types tracked as in-progress by one formatter.
pub const MAX_TYPE_NAME_VISITING: u32 = 1_000;

// =============================================================================
// Capacity Hints
// =============================================================================

/// Initial capacity of the classification worklist.
///
/// Most types resolve within a handful of frames; the stack grows on demand
/// for deep graphs.
pub const WORKLIST_INITIAL_CAPACITY: usize = 32;

/// Inline capacity for small type lists (union members, type arguments).
///
/// Lists at or below this length live on the stack inside a `SmallVec`.
pub const TYPE_LIST_INLINE: usize = 4;
