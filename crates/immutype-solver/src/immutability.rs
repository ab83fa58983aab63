//! The immutability lattice.
//!
//! Four ordered levels, `Mutable < ReadonlyShallow < ReadonlyDeep < Immutable`,
//! plus two sentinels that sit outside the order:
//!
//! - [`Immutability::Unknown`]: "no information yet". It is the identity of
//!   both [`min`](Immutability::min) and [`max`](Immutability::max), so folding
//!   it into a reduction never moves the result.
//! - [`Immutability::Calculating`]: marks a type whose classification is in
//!   progress. It only ever lives in the cache; the engine converts it to
//!   `Unknown` before any lattice operation sees it.
//!
//! A sentinel is unordered against every level (`partial_cmp` returns
//! `None`), so threshold checks against a level are `false` for it.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// How immutable a type is, ordered from least to most immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum Immutability {
    /// No information was ever combined into this value.
    Unknown,
    /// The type is currently being classified. Internal to the engine.
    Calculating,
    /// Something reachable through the type can be written.
    Mutable,
    /// The type's own fields cannot be written, but nested values may be.
    ReadonlyShallow,
    /// Nothing reachable can be written, but methods may observe hidden state.
    ReadonlyDeep,
    /// Nothing reachable can be written.
    Immutable,
}

impl Immutability {
    /// The ordered levels, least immutable first.
    pub const LEVELS: [Self; 4] = [
        Self::Mutable,
        Self::ReadonlyShallow,
        Self::ReadonlyDeep,
        Self::Immutable,
    ];

    const fn rank(self) -> Option<u8> {
        match self {
            Self::Unknown | Self::Calculating => None,
            Self::Mutable => Some(1),
            Self::ReadonlyShallow => Some(2),
            Self::ReadonlyDeep => Some(3),
            Self::Immutable => Some(4),
        }
    }

    #[inline]
    pub const fn is_unknown(self) -> bool {
        matches!(self, Self::Unknown)
    }

    #[inline]
    pub const fn is_calculating(self) -> bool {
        matches!(self, Self::Calculating)
    }

    /// Returns `true` for the four ordered levels.
    #[inline]
    pub const fn is_known(self) -> bool {
        self.rank().is_some()
    }

    /// Collapse the in-progress marker into "no information".
    ///
    /// Used when a reentrant lookup hands a `Calculating` entry back to a
    /// parent that is about to fold it into a reduction.
    #[inline]
    pub const fn settled(self) -> Self {
        match self {
            Self::Calculating => Self::Unknown,
            other => other,
        }
    }

    /// The lesser of two values. `Unknown` is ignored when the other side
    /// carries information.
    #[inline]
    pub fn min(self, other: Self) -> Self {
        debug_assert!(
            !self.is_calculating() && !other.is_calculating(),
            "Immutability::Calculating must not reach the lattice"
        );
        match (self.rank(), other.rank()) {
            (None, _) => other,
            (_, None) => self,
            (Some(a), Some(b)) => {
                if a <= b {
                    self
                } else {
                    other
                }
            }
        }
    }

    /// The greater of two values. `Unknown` is ignored when the other side
    /// carries information.
    #[inline]
    pub fn max(self, other: Self) -> Self {
        debug_assert!(
            !self.is_calculating() && !other.is_calculating(),
            "Immutability::Calculating must not reach the lattice"
        );
        match (self.rank(), other.rank()) {
            (None, _) => other,
            (_, None) => self,
            (Some(a), Some(b)) => {
                if a >= b {
                    self
                } else {
                    other
                }
            }
        }
    }

    /// `max(lower, min(upper, value))`.
    #[inline]
    pub fn clamp(lower: Self, value: Self, upper: Self) -> Self {
        lower.max(upper.min(value))
    }

    /// Is this value at least `other`? `false` when a sentinel meets a level.
    #[inline]
    pub fn is_at_least(self, other: Self) -> bool {
        matches!(self.partial_cmp(&other), Some(Ordering::Greater | Ordering::Equal))
    }

    #[inline]
    pub fn is_immutable(self) -> bool {
        self.is_at_least(Self::Immutable)
    }

    #[inline]
    pub fn is_readonly_deep(self) -> bool {
        self.is_at_least(Self::ReadonlyDeep)
    }

    #[inline]
    pub fn is_readonly_shallow(self) -> bool {
        self.is_at_least(Self::ReadonlyShallow)
    }

    #[inline]
    pub fn is_mutable(self) -> bool {
        matches!(
            self.partial_cmp(&Self::Mutable),
            Some(Ordering::Less | Ordering::Equal)
        )
    }

    /// Direction-agnostic closed-interval test: is `self` between `a` and `b`?
    pub fn is_between(self, a: Self, b: Self) -> bool {
        (self.is_at_least(a) && b.is_at_least(self)) || (a.is_at_least(self) && self.is_at_least(b))
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Calculating => "Calculating",
            Self::Mutable => "Mutable",
            Self::ReadonlyShallow => "ReadonlyShallow",
            Self::ReadonlyDeep => "ReadonlyDeep",
            Self::Immutable => "Immutable",
        }
    }
}

impl PartialOrd for Immutability {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.rank(), other.rank()) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ if self == other => Some(Ordering::Equal),
            _ => None,
        }
    }
}

impl fmt::Display for Immutability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an immutability level from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{0}` is not an immutability level (expected Mutable, ReadonlyShallow, ReadonlyDeep or Immutable)")]
pub struct ParseImmutabilityError(pub String);

impl FromStr for Immutability {
    type Err = ParseImmutabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::LEVELS
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseImmutabilityError(s.to_string()))
    }
}

impl TryFrom<String> for Immutability {
    type Error = ParseImmutabilityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
