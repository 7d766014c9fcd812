// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node property storage and change tracking.
//!
//! # Implementation
//!
//! Properties live in a `SmallVec` in declaration order. Name lookups go
//! through a second `SmallVec` sorted by [`PropName`] and searched with
//! binary search, which is fast for the handful of properties a node
//! declares and keeps everything inline in the common case.
//!
//! Change tracking is generation based: every update pass bumps the
//! container's [`Generation`], and each property stamps the generation it was
//! last set in. A property changed in the current pass iff its stamp equals
//! the current generation, so stale markers can never leak into the next pass.

use alloc::rc::Rc;
use smallvec::SmallVec;

use crate::error::{PropError, PropResult};
use crate::name::{NameRegistry, PropName};
use crate::property::{Generation, NodeProp, PropHandle};
use crate::value::HostValue;

/// Default inline capacity for declared properties.
///
/// Drawing nodes rarely declare more than a dozen properties.
const INLINE_CAPACITY: usize = 12;

/// The set of properties owned by one node.
///
/// # Example
///
/// ```rust
/// use std::rc::Rc;
/// use understory_node_props::{HostValue, NameRegistry, PropName, PropsContainer};
///
/// let mut props = PropsContainer::new(Rc::new(NameRegistry::new()));
/// let r = props.define_property(PropName::R);
/// let cx = props.define_property(PropName::CX);
///
/// props.begin_update_pass([(PropName::R, HostValue::Number(5.0))]);
/// assert!(props.has_changed(PropName::R));
/// assert!(!props.has_changed(PropName::CX));
/// assert!(props.is_set(r));
/// assert!(!props.is_set(cx));
///
/// // A new pass starts with a clean changed-set.
/// props.begin_update_pass([]);
/// assert!(!props.has_changed(PropName::R));
/// assert!(props.is_set(r));
/// ```
#[derive(Clone, Debug)]
pub struct PropsContainer {
    names: Rc<NameRegistry>,
    /// Declared properties, in declaration order.
    props: SmallVec<[NodeProp; INLINE_CAPACITY]>,
    /// Declared names, sorted by [`PropName`] for binary search lookup.
    by_name: SmallVec<[(PropName, PropHandle); INLINE_CAPACITY]>,
    /// Names changed in the current pass, in update order.
    changed: SmallVec<[PropName; INLINE_CAPACITY]>,
    generation: Generation,
}

impl PropsContainer {
    /// Creates an empty container reading names from `names`.
    #[must_use]
    pub fn new(names: Rc<NameRegistry>) -> Self {
        Self {
            names,
            props: SmallVec::new(),
            by_name: SmallVec::new(),
            changed: SmallVec::new(),
            generation: 0,
        }
    }

    /// Returns the name registry shared by this container.
    #[must_use]
    #[inline]
    pub fn names(&self) -> &NameRegistry {
        &self.names
    }

    /// Returns the number of declared properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.props.len()
    }

    /// Returns `true` if no properties have been declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    /// Returns the current update pass generation.
    #[must_use]
    #[inline]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    #[inline]
    fn find(&self, name: PropName) -> Result<usize, usize> {
        self.by_name.binary_search_by_key(&name, |(n, _)| *n)
    }

    /// Declares a property and returns a handle for later reads.
    ///
    /// Declaring a name twice returns the existing handle, so every derived
    /// property that reads, say, `x` shares one slot.
    ///
    /// # Panics
    ///
    /// Panics if more than 65,535 properties are declared.
    pub fn define_property(&mut self, name: PropName) -> PropHandle {
        match self.find(name) {
            Ok(idx) => self.by_name[idx].1,
            Err(idx) => {
                assert!(
                    self.props.len() < u16::MAX as usize,
                    "Too many properties declared (max {})",
                    u16::MAX
                );
                #[expect(clippy::cast_possible_truncation, reason = "checked above")]
                let handle = PropHandle::new(self.props.len() as u16);
                self.props.push(NodeProp::new(name));
                self.by_name.insert(idx, (name, handle));
                handle
            }
        }
    }

    /// Returns the handle of a declared property.
    #[must_use]
    pub fn handle(&self, name: PropName) -> Option<PropHandle> {
        self.find(name).ok().map(|idx| self.by_name[idx].1)
    }

    /// Returns the declared properties, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &NodeProp> + '_ {
        self.props.iter()
    }

    /// Starts a new update pass and applies `updates`.
    ///
    /// The changed-set is reset first, then every `(name, value)` pair is
    /// stored into its declared property and the name is recorded as changed.
    /// Properties absent from `updates` keep their values. Names that were
    /// never declared are ignored.
    pub fn begin_update_pass(&mut self, updates: impl IntoIterator<Item = (PropName, HostValue)>) {
        self.generation += 1;
        self.changed.clear();
        for (name, value) in updates {
            let Ok(idx) = self.find(name) else {
                tracing::trace!(name = ?name, "ignoring update for undeclared property");
                continue;
            };
            let handle = self.by_name[idx].1;
            self.props[usize::from(handle.index())].set(value, self.generation);
            if !self.changed.contains(&name) {
                self.changed.push(name);
            }
        }
        tracing::debug!(
            generation = self.generation,
            changed = self.changed.len(),
            "update pass"
        );
    }

    /// Returns `true` if `name` was updated in the current pass.
    ///
    /// # Panics
    ///
    /// Panics if `name` was never declared on this container.
    #[must_use]
    pub fn has_changed(&self, name: PropName) -> bool {
        let Ok(idx) = self.find(name) else {
            panic!(
                "Property '{}' was queried for changes but never declared",
                self.names.display(name)
            );
        };
        self.generation != 0 && self.changed_in(self.by_name[idx].1) == self.generation
    }

    /// Returns the names updated in the current pass, in update order.
    #[must_use]
    pub fn changed_names(&self) -> &[PropName] {
        &self.changed
    }

    /// Returns the property behind `handle`.
    ///
    /// # Panics
    ///
    /// Panics if `handle` did not come from this container.
    #[must_use]
    #[inline]
    pub fn property(&self, handle: PropHandle) -> &NodeProp {
        &self.props[usize::from(handle.index())]
    }

    /// Returns `true` if the property behind `handle` holds a value.
    #[must_use]
    #[inline]
    pub fn is_set(&self, handle: PropHandle) -> bool {
        self.property(handle).is_set()
    }

    /// Returns the value behind `handle`, or `None` if unset.
    #[must_use]
    #[inline]
    pub fn get(&self, handle: PropHandle) -> Option<&HostValue> {
        self.property(handle).get()
    }

    /// Returns the value behind `handle`.
    ///
    /// Fails with [`PropError::UnsetProperty`] if unset.
    pub fn value(&self, handle: PropHandle) -> PropResult<&HostValue> {
        self.property(handle).value(&self.names)
    }

    /// Returns the generation `handle` last changed in.
    #[must_use]
    #[inline]
    pub fn changed_in(&self, handle: PropHandle) -> Generation {
        self.property(handle).changed_in()
    }

    /// Returns the latest change generation among `handles`.
    #[must_use]
    pub fn latest_change(&self, handles: &[PropHandle]) -> Generation {
        handles
            .iter()
            .map(|h| self.changed_in(*h))
            .max()
            .unwrap_or(0)
    }

    /// Fails fast if the property behind `handle` has no value.
    pub fn require_property_to_be_set(&self, handle: PropHandle) -> PropResult<&HostValue> {
        let prop = self.property(handle);
        prop.get().ok_or_else(|| {
            PropError::missing(alloc::format!("`{}`", self.names.display(prop.name())))
        })
    }

    /// Formats a list of names for error messages, e.g. `x/y/width`.
    pub(crate) fn describe(&self, names: &[PropName]) -> alloc::string::String {
        let mut out = alloc::string::String::new();
        for (i, name) in names.iter().enumerate() {
            if i > 0 {
                out.push('/');
            }
            out.push_str(&self.names.display(*name));
        }
        out
    }
}
