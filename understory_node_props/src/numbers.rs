// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Numeric derived properties.

use alloc::string::String;
use alloc::vec::Vec;

use crate::container::PropsContainer;
use crate::derived::{DerivedCache, DerivedProp};
use crate::error::PropResult;
use crate::name::PropName;
use crate::property::{Generation, PropHandle};
use crate::value::HostValue;

/// Narrows a host number to `u16`.
///
/// This is a narrowing conversion, not a range check: the fractional part is
/// truncated toward zero, out-of-range values saturate at `0` and
/// `u16::MAX`, and NaN becomes `0`.
///
/// ```rust
/// use understory_node_props::narrow_to_u16;
///
/// assert_eq!(narrow_to_u16(3.9), 3);
/// assert_eq!(narrow_to_u16(300_000.0), u16::MAX);
/// assert_eq!(narrow_to_u16(-2.5), 0);
/// assert_eq!(narrow_to_u16(f64::NAN), 0);
/// ```
#[must_use]
#[inline]
#[expect(
    clippy::cast_possible_truncation,
    reason = "float to int casts saturate, which is the documented rule"
)]
pub fn narrow_to_u16(value: f64) -> u16 {
    value as u16
}

fn collect_numbers<T>(value: &HostValue, convert: impl Fn(f64) -> T) -> PropResult<Vec<T>> {
    value
        .as_array()?
        .iter()
        .map(|item| item.as_number().map(&convert))
        .collect()
}

/// A single number read from a named property.
#[derive(Debug)]
pub struct NumberProp {
    prop: PropHandle,
    cache: DerivedCache<f64>,
}

impl NumberProp {
    /// Declares `name` on `props` and reads it as a number.
    pub fn new(props: &mut PropsContainer, name: PropName) -> Self {
        Self {
            prop: props.define_property(name),
            cache: DerivedCache::new(),
        }
    }
}

impl DerivedProp for NumberProp {
    type Value = f64;

    fn changed_in(&self, props: &PropsContainer) -> Generation {
        props.changed_in(self.prop)
    }

    fn update_derived_value(&mut self, props: &PropsContainer) -> PropResult<Option<f64>> {
        props.get(self.prop).map(HostValue::as_number).transpose()
    }

    fn describe(&self, props: &PropsContainer) -> String {
        let name = props.property(self.prop).name();
        alloc::format!("`{}`", props.describe(&[name]))
    }

    fn cache(&self) -> &DerivedCache<f64> {
        &self.cache
    }

    fn cache_mut(&mut self) -> &mut DerivedCache<f64> {
        &mut self.cache
    }
}

/// An array of numbers at full precision.
///
/// An unset property derives no value, which is distinct from an empty array.
#[derive(Debug)]
pub struct NumbersProp {
    prop: PropHandle,
    cache: DerivedCache<Vec<f64>>,
}

impl NumbersProp {
    /// Declares `name` on `props` and reads it as an array of numbers.
    pub fn new(props: &mut PropsContainer, name: PropName) -> Self {
        Self {
            prop: props.define_property(name),
            cache: DerivedCache::new(),
        }
    }
}

impl DerivedProp for NumbersProp {
    type Value = Vec<f64>;

    fn changed_in(&self, props: &PropsContainer) -> Generation {
        props.changed_in(self.prop)
    }

    fn update_derived_value(&mut self, props: &PropsContainer) -> PropResult<Option<Vec<f64>>> {
        props
            .get(self.prop)
            .map(|v| collect_numbers(v, |n| n))
            .transpose()
    }

    fn describe(&self, props: &PropsContainer) -> String {
        let name = props.property(self.prop).name();
        alloc::format!("`{}`", props.describe(&[name]))
    }

    fn cache(&self) -> &DerivedCache<Vec<f64>> {
        &self.cache
    }

    fn cache_mut(&mut self) -> &mut DerivedCache<Vec<f64>> {
        &mut self.cache
    }
}

/// An array of numbers narrowed to `u16`, e.g. vertex indices.
///
/// Elements go through [`narrow_to_u16`].
#[derive(Debug)]
pub struct Numbers16Prop {
    prop: PropHandle,
    cache: DerivedCache<Vec<u16>>,
}

impl Numbers16Prop {
    /// Declares `name` on `props` and reads it as an array of `u16`.
    pub fn new(props: &mut PropsContainer, name: PropName) -> Self {
        Self {
            prop: props.define_property(name),
            cache: DerivedCache::new(),
        }
    }
}

impl DerivedProp for Numbers16Prop {
    type Value = Vec<u16>;

    fn changed_in(&self, props: &PropsContainer) -> Generation {
        props.changed_in(self.prop)
    }

    fn update_derived_value(&mut self, props: &PropsContainer) -> PropResult<Option<Vec<u16>>> {
        props
            .get(self.prop)
            .map(|v| collect_numbers(v, narrow_to_u16))
            .transpose()
    }

    fn describe(&self, props: &PropsContainer) -> String {
        let name = props.property(self.prop).name();
        alloc::format!("`{}`", props.describe(&[name]))
    }

    fn cache(&self) -> &DerivedCache<Vec<u16>> {
        &self.cache
    }

    fn cache_mut(&mut self) -> &mut DerivedCache<Vec<u16>> {
        &mut self.cache
    }
}
