// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Point properties, including circle centers.

use alloc::string::String;

use kurbo::Point;

use crate::composite::{Fallback, StructuredSource};
use crate::container::PropsContainer;
use crate::derived::{DerivedCache, DerivedProp};
use crate::error::{PropError, PropResult};
use crate::name::PropName;
use crate::property::{Generation, PropHandle};
use crate::rect::{object_numbers, prop_numbers};
use crate::value::{HostType, HostValue};

/// A point read from one structured property.
///
/// The property may hold a native [`Point`] or a plain object with `x` and `y`.
#[derive(Debug)]
pub struct PointProp {
    prop: PropHandle,
    cache: DerivedCache<Point>,
}

impl PointProp {
    /// Declares `name` on `props`.
    pub fn new(props: &mut PropsContainer, name: PropName) -> Self {
        Self {
            prop: props.define_property(name),
            cache: DerivedCache::new(),
        }
    }
}

impl DerivedProp for PointProp {
    type Value = Point;

    fn changed_in(&self, props: &PropsContainer) -> Generation {
        props.changed_in(self.prop)
    }

    fn update_derived_value(&mut self, props: &PropsContainer) -> PropResult<Option<Point>> {
        let Some(value) = props.get(self.prop) else {
            return Ok(None);
        };
        match value {
            HostValue::HostObject(obj) => match obj.downcast_ref::<Point>() {
                Some(point) => Ok(Some(*point)),
                None => Err(PropError::InvalidHostObject { expected: "point" }),
            },
            HostValue::Object(_) => match object_numbers(value, [PropName::X, PropName::Y])? {
                Some([x, y]) => Ok(Some(Point::new(x, y))),
                None => Err(PropError::missing(alloc::format!(
                    "`{}`",
                    props.describe(&[PropName::X, PropName::Y])
                ))),
            },
            other => Err(PropError::TypeMismatch {
                expected: HostType::Object,
                found: other.value_type(),
            }),
        }
    }

    fn describe(&self, props: &PropsContainer) -> String {
        alloc::format!("`{}`", props.describe(&[props.property(self.prop).name()]))
    }

    fn cache(&self) -> &DerivedCache<Point> {
        &self.cache
    }

    fn cache_mut(&mut self) -> &mut DerivedCache<Point> {
        &mut self.cache
    }
}

impl StructuredSource for PointProp {
    fn is_present(&self, props: &PropsContainer) -> bool {
        props.is_set(self.prop)
    }
}

/// A point read from two numeric properties, e.g. `cx` and `cy`.
#[derive(Debug)]
pub struct PointFromProps {
    names: [PropName; 2],
    xy: [PropHandle; 2],
    cache: DerivedCache<Point>,
}

impl PointFromProps {
    /// Declares `x` and `y` on `props`.
    pub fn new(props: &mut PropsContainer, x: PropName, y: PropName) -> Self {
        Self {
            names: [x, y],
            xy: [props.define_property(x), props.define_property(y)],
            cache: DerivedCache::new(),
        }
    }
}

impl DerivedProp for PointFromProps {
    type Value = Point;

    fn changed_in(&self, props: &PropsContainer) -> Generation {
        props.latest_change(&self.xy)
    }

    fn update_derived_value(&mut self, props: &PropsContainer) -> PropResult<Option<Point>> {
        Ok(prop_numbers(props, self.xy)?.map(|[x, y]| Point::new(x, y)))
    }

    fn describe(&self, props: &PropsContainer) -> String {
        alloc::format!("`{}`", props.describe(&self.names))
    }

    fn cache(&self) -> &DerivedCache<Point> {
        &self.cache
    }

    fn cache_mut(&mut self) -> &mut DerivedCache<Point> {
        &mut self.cache
    }
}

/// A circle center from `c` or from `cx`/`cy`.
pub type CircleProp = Fallback<PointProp, PointFromProps>;

impl CircleProp {
    /// Declares `c`, `cx` and `cy` on `props`.
    pub fn new(props: &mut PropsContainer) -> Self {
        Self::from_sources(
            PointProp::new(props, PropName::C),
            PointFromProps::new(props, PropName::CX, PropName::CY),
        )
    }
}
