// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interned property names.
//!
//! Property names are compared by identity, not by string content. A
//! [`NameRegistry`] maps name strings to compact [`PropName`] handles. It is
//! built once at startup, then shared read-only by every node's
//! [`PropsContainer`](crate::PropsContainer).
//!
//! The names the engine itself reads (`x`, `width`, `transform`, ...) are
//! pre-interned by [`NameRegistry::new`] at fixed indices and exposed as
//! associated constants on [`PropName`].
//!
//! ## Example
//!
//! ```rust
//! use understory_node_props::{NameRegistry, PropName};
//!
//! let mut names = NameRegistry::new();
//! assert_eq!(names.get("width"), Some(PropName::WIDTH));
//!
//! let opacity = names.intern("opacity");
//! assert_eq!(names.intern("opacity"), opacity);
//! assert_eq!(names.name(opacity), Some("opacity"));
//! ```

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;
use core::hash::BuildHasher;

use hashbrown::{DefaultHashBuilder, HashMap};
use smallvec::SmallVec;

/// An interned property name.
///
/// This is a lightweight handle (u32) that identifies a name within a
/// [`NameRegistry`]. Two names are equal iff they were interned from equal
/// strings in the same registry.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct PropName(u32);

/// Names pre-interned by [`NameRegistry::new`], in index order.
const WELL_KNOWN: [&str; 23] = [
    "x",
    "y",
    "width",
    "height",
    "r",
    "rx",
    "ry",
    "rect",
    "c",
    "cx",
    "cy",
    "transform",
    "origin",
    "matrix",
    "translateX",
    "translateY",
    "scale",
    "scaleX",
    "scaleY",
    "skewX",
    "skewY",
    "rotate",
    "rotateZ",
];

impl PropName {
    /// `x`
    pub const X: Self = Self(0);
    /// `y`
    pub const Y: Self = Self(1);
    /// `width`
    pub const WIDTH: Self = Self(2);
    /// `height`
    pub const HEIGHT: Self = Self(3);
    /// `r`, a uniform radius.
    pub const R: Self = Self(4);
    /// `rx`
    pub const RX: Self = Self(5);
    /// `ry`
    pub const RY: Self = Self(6);
    /// `rect`, the usual structured rectangle source.
    pub const RECT: Self = Self(7);
    /// `c`, a structured circle center.
    pub const C: Self = Self(8);
    /// `cx`
    pub const CX: Self = Self(9);
    /// `cy`
    pub const CY: Self = Self(10);
    /// `transform`
    pub const TRANSFORM: Self = Self(11);
    /// `origin`
    pub const ORIGIN: Self = Self(12);
    /// `matrix`
    pub const MATRIX: Self = Self(13);
    /// `translateX`
    pub const TRANSLATE_X: Self = Self(14);
    /// `translateY`
    pub const TRANSLATE_Y: Self = Self(15);
    /// `scale`
    pub const SCALE: Self = Self(16);
    /// `scaleX`
    pub const SCALE_X: Self = Self(17);
    /// `scaleY`
    pub const SCALE_Y: Self = Self(18);
    /// `skewX`
    pub const SKEW_X: Self = Self(19);
    /// `skewY`
    pub const SKEW_Y: Self = Self(20);
    /// `rotate`
    pub const ROTATE: Self = Self(21);
    /// `rotateZ`
    pub const ROTATE_Z: Self = Self(22);

    /// Returns this name as a `usize` index.
    #[inline]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// Returns the raw numeric id.
    #[inline]
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for PropName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match WELL_KNOWN.get(self.as_usize()) {
            Some(name) => write!(f, "PropName({})", name),
            None => f.debug_tuple("PropName").field(&self.0).finish(),
        }
    }
}

/// Interns property name strings into [`PropName`] handles.
///
/// Strings are stored once in an internal table. Lookups use a hash-bucket
/// index (hash -> small list of candidate names) so each string is only
/// stored once.
#[derive(Clone)]
pub struct NameRegistry {
    names: Vec<Box<str>>,
    buckets: HashMap<u64, SmallVec<[PropName; 1]>>,
    build_hasher: DefaultHashBuilder,
}

impl Default for NameRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl NameRegistry {
    /// Creates a registry holding the well-known names at their fixed indices.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self {
            names: Vec::with_capacity(WELL_KNOWN.len()),
            buckets: HashMap::new(),
            build_hasher: DefaultHashBuilder::default(),
        };
        for name in WELL_KNOWN {
            registry.intern(name);
        }
        registry
    }

    /// Returns the number of interned names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if the registry holds no names.
    ///
    /// A registry built with [`NameRegistry::new`] is never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns the string for an interned name, if it belongs to this registry.
    #[must_use]
    pub fn name(&self, name: PropName) -> Option<&str> {
        self.names.get(name.as_usize()).map(|s| &**s)
    }

    /// Looks up a name without interning it.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<PropName> {
        let hash = self.build_hasher.hash_one(name);
        self.buckets
            .get(&hash)?
            .iter()
            .copied()
            .find(|id| &*self.names[id.as_usize()] == name)
    }

    /// Interns `name` and returns its [`PropName`].
    ///
    /// Interning an already-known string returns the existing handle.
    ///
    /// # Panics
    ///
    /// Panics if more than `u32::MAX` names are interned.
    pub fn intern(&mut self, name: &str) -> PropName {
        if let Some(existing) = self.get(name) {
            return existing;
        }
        let id = PropName(
            u32::try_from(self.names.len()).expect("too many interned names for PropName (u32)"),
        );
        let hash = self.build_hasher.hash_one(name);
        self.names.push(name.into());
        self.buckets.entry(hash).or_default().push(id);
        id
    }

    /// Returns a printable form of `name`, falling back to its id.
    pub(crate) fn display(&self, name: PropName) -> alloc::string::String {
        use alloc::string::ToString;
        match self.name(name) {
            Some(s) => s.to_string(),
            None => alloc::format!("#{}", name.as_u32()),
        }
    }
}

impl fmt::Debug for NameRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NameRegistry")
            .field("len", &self.names.len())
            .finish_non_exhaustive()
    }
}
