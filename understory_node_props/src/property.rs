// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raw property slots.

use core::fmt;

use crate::error::{PropError, PropResult};
use crate::name::{NameRegistry, PropName};
use crate::value::HostValue;

/// An update pass counter.
///
/// Each [`PropsContainer::begin_update_pass`](crate::PropsContainer::begin_update_pass)
/// advances the generation by one. Properties stamp the generation they last
/// changed in, and derived properties stamp the generation they last
/// recomputed in.
pub type Generation = u64;

/// Handle to a property declared in a [`PropsContainer`](crate::PropsContainer).
///
/// Handles are only meaningful for the container that returned them.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PropHandle(u16);

impl PropHandle {
    #[inline]
    pub(crate) const fn new(index: u16) -> Self {
        Self(index)
    }

    /// Returns the declaration index of this handle.
    #[must_use]
    #[inline]
    pub const fn index(self) -> u16 {
        self.0
    }
}

impl fmt::Debug for PropHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PropHandle").field(&self.0).finish()
    }
}

/// A named slot holding one raw host value.
///
/// A `NodeProp` never interprets its value; type checks happen at read time
/// in whatever derives from it.
#[derive(Clone, Debug)]
pub struct NodeProp {
    name: PropName,
    value: HostValue,
    changed_in: Generation,
}

impl NodeProp {
    pub(crate) fn new(name: PropName) -> Self {
        Self {
            name,
            value: HostValue::Undefined,
            changed_in: 0,
        }
    }

    /// Returns the property name.
    #[must_use]
    #[inline]
    pub fn name(&self) -> PropName {
        self.name
    }

    /// Stores a raw value and stamps `generation` as its change generation.
    ///
    /// Storing `Undefined` or `Null` unsets the property, which still counts as
    /// a change.
    pub(crate) fn set(&mut self, value: HostValue, generation: Generation) {
        self.value = value;
        self.changed_in = generation;
    }

    /// Returns `true` if the property currently holds a non-empty value.
    #[must_use]
    #[inline]
    pub fn is_set(&self) -> bool {
        !self.value.is_empty()
    }

    /// Returns the stored value.
    ///
    /// Fails with [`PropError::UnsetProperty`] if the property is unset.
    pub fn value(&self, names: &NameRegistry) -> PropResult<&HostValue> {
        if self.is_set() {
            Ok(&self.value)
        } else {
            Err(PropError::UnsetProperty {
                name: names.display(self.name),
            })
        }
    }

    /// Returns the stored value, or `None` if unset.
    #[must_use]
    pub fn get(&self) -> Option<&HostValue> {
        self.is_set().then_some(&self.value)
    }

    /// Returns the generation of the last store.
    #[must_use]
    #[inline]
    pub fn changed_in(&self) -> Generation {
        self.changed_in
    }
}
