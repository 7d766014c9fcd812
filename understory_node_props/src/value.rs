// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Read-only view of host-supplied values.
//!
//! The host pushes loosely typed values into node properties. This module
//! models them as a closed tagged union, [`HostValue`], whose accessors fail
//! with [`PropError::TypeMismatch`] instead of coercing. The engine never
//! builds host values itself; it only reads them.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::fmt;

use crate::error::{PropError, PropResult};
use crate::name::PropName;

/// The type tag of a [`HostValue`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum HostType {
    /// No value.
    Undefined,
    /// Explicit null.
    Null,
    /// A boolean.
    Bool,
    /// A number.
    Number,
    /// A string.
    String,
    /// An ordered sequence of values.
    Array,
    /// A plain keyed record.
    Object,
    /// An opaque native object owned by the host.
    HostObject,
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
            Self::HostObject => "host object",
        })
    }
}

/// A host-backed native object.
///
/// This wraps a value of any `'static` type behind an `Rc`, keeping its type
/// information for later downcasting. Cloning is cheap and shares the object.
///
/// # Example
///
/// ```rust
/// use understory_node_props::HostObject;
/// use kurbo::Point;
///
/// let obj = HostObject::new(Point::new(1.0, 2.0));
/// assert!(obj.is::<Point>());
/// assert_eq!(obj.downcast_ref::<Point>(), Some(&Point::new(1.0, 2.0)));
/// assert_eq!(obj.downcast_ref::<f64>(), None);
/// ```
#[derive(Clone)]
pub struct HostObject {
    inner: Rc<dyn Any>,
    type_id: TypeId,
}

impl HostObject {
    /// Wraps a native object.
    #[must_use]
    pub fn new<T: 'static>(object: T) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            inner: Rc::new(object),
        }
    }

    /// Returns `true` if the wrapped object is of type `T`.
    #[must_use]
    #[inline]
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Attempts to downcast to a reference of type `T`.
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.inner.downcast_ref()
    }

    /// Returns `true` if both handles share the same native object.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for HostObject {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for HostObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostObject")
            .field("type_id", &self.type_id)
            .finish_non_exhaustive()
    }
}

/// A value supplied by the host for a node property.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum HostValue {
    /// No value.
    #[default]
    Undefined,
    /// Explicit null.
    Null,
    /// A boolean.
    Bool(bool),
    /// A number.
    Number(f64),
    /// A string.
    String(String),
    /// An ordered sequence of values.
    Array(Vec<HostValue>),
    /// A plain record. Keys keep the order the host gave them.
    Object(Vec<(PropName, HostValue)>),
    /// An opaque native object.
    HostObject(HostObject),
}

impl HostValue {
    /// Builds an object value from `(name, value)` pairs.
    pub fn object(fields: impl IntoIterator<Item = (PropName, Self)>) -> Self {
        Self::Object(fields.into_iter().collect())
    }

    /// Builds an array of numbers.
    pub fn numbers(values: impl IntoIterator<Item = f64>) -> Self {
        Self::Array(values.into_iter().map(Self::Number).collect())
    }

    /// Wraps a native object.
    pub fn host_object<T: 'static>(object: T) -> Self {
        Self::HostObject(HostObject::new(object))
    }

    /// Returns the type tag of this value.
    #[must_use]
    pub fn value_type(&self) -> HostType {
        match self {
            Self::Undefined => HostType::Undefined,
            Self::Null => HostType::Null,
            Self::Bool(_) => HostType::Bool,
            Self::Number(_) => HostType::Number,
            Self::String(_) => HostType::String,
            Self::Array(_) => HostType::Array,
            Self::Object(_) => HostType::Object,
            Self::HostObject(_) => HostType::HostObject,
        }
    }

    /// Returns `true` for `Undefined` and `Null`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Undefined | Self::Null)
    }

    fn mismatch(&self, expected: HostType) -> PropError {
        PropError::TypeMismatch {
            expected,
            found: self.value_type(),
        }
    }

    /// Reads a number.
    pub fn as_number(&self) -> PropResult<f64> {
        match self {
            Self::Number(n) => Ok(*n),
            _ => Err(self.mismatch(HostType::Number)),
        }
    }

    /// Reads an array.
    pub fn as_array(&self) -> PropResult<&[Self]> {
        match self {
            Self::Array(items) => Ok(items),
            _ => Err(self.mismatch(HostType::Array)),
        }
    }

    /// Returns the keys of an object, in host order.
    pub fn keys(&self) -> PropResult<impl ExactSizeIterator<Item = PropName> + '_> {
        match self {
            Self::Object(fields) => Ok(fields.iter().map(|(name, _)| *name)),
            _ => Err(self.mismatch(HostType::Object)),
        }
    }

    /// Returns `true` if this is an object with a non-empty value for `name`.
    #[must_use]
    pub fn has_value(&self, name: PropName) -> bool {
        self.field(name).is_some_and(|v| !v.is_empty())
    }

    /// Reads the value stored under `name` in an object.
    ///
    /// A missing key reads as [`HostValue::Undefined`].
    pub fn value(&self, name: PropName) -> PropResult<&Self> {
        match self {
            Self::Object(_) => Ok(self.field(name).unwrap_or(&Self::Undefined)),
            _ => Err(self.mismatch(HostType::Object)),
        }
    }

    /// Reads a native object handle.
    pub fn as_host_object(&self) -> PropResult<&HostObject> {
        match self {
            Self::HostObject(obj) => Ok(obj),
            _ => Err(self.mismatch(HostType::HostObject)),
        }
    }

    fn field(&self, name: PropName) -> Option<&Self> {
        match self {
            Self::Object(fields) => fields.iter().find(|(n, _)| *n == name).map(|(_, v)| v),
            _ => None,
        }
    }
}

impl From<f64> for HostValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for HostValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn accessors_check_the_tag() {
        let n = HostValue::Number(4.0);
        assert_eq!(n.as_number(), Ok(4.0));
        assert_eq!(
            n.as_array().unwrap_err(),
            PropError::TypeMismatch {
                expected: HostType::Array,
                found: HostType::Number,
            }
        );
        assert!(n.keys().is_err());
        assert!(n.as_host_object().is_err());
    }

    #[test]
    fn object_fields_keep_host_order() {
        let obj = HostValue::object([
            (PropName::Y, HostValue::Number(2.0)),
            (PropName::X, HostValue::Number(1.0)),
            (PropName::R, HostValue::Null),
        ]);
        let keys: Vec<_> = obj.keys().unwrap().collect();
        assert_eq!(keys, vec![PropName::Y, PropName::X, PropName::R]);
        assert!(obj.has_value(PropName::X));
        assert!(!obj.has_value(PropName::R));
        assert!(!obj.has_value(PropName::WIDTH));
        assert_eq!(obj.value(PropName::X).unwrap().as_number(), Ok(1.0));
        assert_eq!(obj.value(PropName::WIDTH), Ok(&HostValue::Undefined));
    }

    #[test]
    fn empty_values() {
        assert!(HostValue::Undefined.is_empty());
        assert!(HostValue::Null.is_empty());
        assert!(!HostValue::Number(0.0).is_empty());
        assert!(!HostValue::Array(Vec::new()).is_empty());
    }

    #[test]
    fn host_objects_compare_by_identity() {
        let a = HostObject::new(1_u8);
        let b = a.clone();
        let c = HostObject::new(1_u8);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.is::<u8>());
        assert_eq!(c.downcast_ref::<u8>(), Some(&1));
    }
}
