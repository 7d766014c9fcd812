// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rectangle and rounded rectangle properties.

use alloc::string::String;

use kurbo::{Rect, RoundedRect, Vec2};

use crate::composite::{Fallback, StructuredSource};
use crate::container::PropsContainer;
use crate::derived::{DerivedCache, DerivedProp};
use crate::error::{PropError, PropResult};
use crate::name::PropName;
use crate::property::{Generation, PropHandle};
use crate::value::{HostType, HostValue};

/// A rectangle with elliptical corners sharing one x/y radius pair.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RRect {
    /// The bounding rectangle.
    pub rect: Rect,
    /// Corner radii along x and y.
    pub radii: Vec2,
}

impl RRect {
    /// Creates a rounded rectangle with independent x/y corner radii.
    #[must_use]
    pub fn from_rect_xy(rect: Rect, rx: f64, ry: f64) -> Self {
        Self {
            rect,
            radii: Vec2::new(rx, ry),
        }
    }

    /// Creates a rounded rectangle from origin, size and x/y radii.
    #[must_use]
    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64, rx: f64, ry: f64) -> Self {
        Self::from_rect_xy(Rect::new(x, y, x + width, y + height), rx, ry)
    }

    /// Converts to a Kurbo rounded rect when the corners are circular.
    #[must_use]
    pub fn as_rounded_rect(&self) -> Option<RoundedRect> {
        (self.radii.x == self.radii.y).then(|| RoundedRect::from_rect(self.rect, self.radii.x))
    }
}

/// Reads `fields` from a plain object.
///
/// Returns `Ok(None)` if any field is missing, and an error if a present field
/// is not a number.
pub(crate) fn object_numbers<const N: usize>(
    value: &HostValue,
    fields: [PropName; N],
) -> PropResult<Option<[f64; N]>> {
    if !fields.iter().all(|f| value.has_value(*f)) {
        return Ok(None);
    }
    let mut out = [0.0; N];
    for (slot, field) in out.iter_mut().zip(fields) {
        *slot = value.value(field)?.as_number()?;
    }
    Ok(Some(out))
}

/// Reads the values behind `handles` as numbers, or `None` if any is unset.
pub(crate) fn prop_numbers<const N: usize>(
    props: &PropsContainer,
    handles: [PropHandle; N],
) -> PropResult<Option<[f64; N]>> {
    if !handles.iter().all(|h| props.is_set(*h)) {
        return Ok(None);
    }
    let mut out = [0.0; N];
    for (slot, handle) in out.iter_mut().zip(handles) {
        *slot = props.value(handle)?.as_number()?;
    }
    Ok(Some(out))
}

fn quoted(props: &PropsContainer, names: &[PropName]) -> String {
    alloc::format!("`{}`", props.describe(names))
}

fn plain_object_rect(props: &PropsContainer, value: &HostValue) -> PropResult<Rect> {
    const FIELDS: [PropName; 4] = [PropName::X, PropName::Y, PropName::WIDTH, PropName::HEIGHT];
    match object_numbers(value, FIELDS)? {
        Some([x, y, w, h]) => Ok(Rect::new(x, y, x + w, y + h)),
        None => Err(PropError::missing(quoted(props, &FIELDS))),
    }
}

/// A rectangle read from one structured property.
///
/// The property may hold a native [`Rect`] or a plain object with `x`, `y`,
/// `width` and `height`.
#[derive(Debug)]
pub struct RectProp {
    prop: PropHandle,
    cache: DerivedCache<Rect>,
}

impl RectProp {
    /// Declares `name` on `props`.
    pub fn new(props: &mut PropsContainer, name: PropName) -> Self {
        Self {
            prop: props.define_property(name),
            cache: DerivedCache::new(),
        }
    }
}

impl DerivedProp for RectProp {
    type Value = Rect;

    fn changed_in(&self, props: &PropsContainer) -> Generation {
        props.changed_in(self.prop)
    }

    fn update_derived_value(&mut self, props: &PropsContainer) -> PropResult<Option<Rect>> {
        let Some(value) = props.get(self.prop) else {
            return Ok(None);
        };
        match value {
            HostValue::HostObject(obj) => match obj.downcast_ref::<Rect>() {
                Some(rect) => Ok(Some(*rect)),
                None => Err(PropError::InvalidHostObject { expected: "rect" }),
            },
            HostValue::Object(_) => plain_object_rect(props, value).map(Some),
            other => Err(PropError::TypeMismatch {
                expected: HostType::Object,
                found: other.value_type(),
            }),
        }
    }

    fn describe(&self, props: &PropsContainer) -> String {
        quoted(props, &[props.property(self.prop).name()])
    }

    fn cache(&self) -> &DerivedCache<Rect> {
        &self.cache
    }

    fn cache_mut(&mut self) -> &mut DerivedCache<Rect> {
        &mut self.cache
    }
}

impl StructuredSource for RectProp {
    fn is_present(&self, props: &PropsContainer) -> bool {
        props.is_set(self.prop)
    }
}

/// A rectangle read from the node's `x`, `y`, `width` and `height`.
#[derive(Debug)]
pub struct RectFromProps {
    xywh: [PropHandle; 4],
    cache: DerivedCache<Rect>,
}

impl RectFromProps {
    /// Declares `x`, `y`, `width` and `height` on `props`.
    pub fn new(props: &mut PropsContainer) -> Self {
        Self {
            xywh: [PropName::X, PropName::Y, PropName::WIDTH, PropName::HEIGHT]
                .map(|name| props.define_property(name)),
            cache: DerivedCache::new(),
        }
    }
}

impl DerivedProp for RectFromProps {
    type Value = Rect;

    fn changed_in(&self, props: &PropsContainer) -> Generation {
        props.latest_change(&self.xywh)
    }

    fn update_derived_value(&mut self, props: &PropsContainer) -> PropResult<Option<Rect>> {
        Ok(prop_numbers(props, self.xywh)?.map(|[x, y, w, h]| Rect::new(x, y, x + w, y + h)))
    }

    fn describe(&self, props: &PropsContainer) -> String {
        quoted(props, &[PropName::X, PropName::Y, PropName::WIDTH, PropName::HEIGHT])
    }

    fn cache(&self) -> &DerivedCache<Rect> {
        &self.cache
    }

    fn cache_mut(&mut self) -> &mut DerivedCache<Rect> {
        &mut self.cache
    }
}

/// A rectangle from a structured property or from `x`/`y`/`width`/`height`.
pub type RectProps = Fallback<RectProp, RectFromProps>;

impl RectProps {
    /// Declares the structured property `name` and the discrete fallbacks.
    pub fn new(props: &mut PropsContainer, name: PropName) -> Self {
        Self::from_sources(RectProp::new(props, name), RectFromProps::new(props))
    }
}

/// A rounded rectangle read from one structured property.
///
/// The property may hold a native [`RRect`] (its radii are passed through
/// unmodified), a Kurbo [`RoundedRect`] with uniform corners, or a plain
/// object with `x`, `y`, `width`, `height` and either `rx` and `ry` or a
/// uniform `r`.
#[derive(Debug)]
pub struct RRectProp {
    prop: PropHandle,
    cache: DerivedCache<RRect>,
}

impl RRectProp {
    /// Declares `name` on `props`.
    pub fn new(props: &mut PropsContainer, name: PropName) -> Self {
        Self {
            prop: props.define_property(name),
            cache: DerivedCache::new(),
        }
    }

    fn from_plain_object(props: &PropsContainer, value: &HostValue) -> PropResult<RRect> {
        let rect = plain_object_rect(props, value)?;
        if let Some([rx, ry]) = object_numbers(value, [PropName::RX, PropName::RY])? {
            return Ok(RRect::from_rect_xy(rect, rx, ry));
        }
        if let Some([r]) = object_numbers(value, [PropName::R])? {
            return Ok(RRect::from_rect_xy(rect, r, r));
        }
        Err(PropError::missing(alloc::format!(
            "{} or {}",
            quoted(props, &[PropName::RX, PropName::RY]),
            quoted(props, &[PropName::R])
        )))
    }
}

impl DerivedProp for RRectProp {
    type Value = RRect;

    fn changed_in(&self, props: &PropsContainer) -> Generation {
        props.changed_in(self.prop)
    }

    fn update_derived_value(&mut self, props: &PropsContainer) -> PropResult<Option<RRect>> {
        let Some(value) = props.get(self.prop) else {
            return Ok(None);
        };
        match value {
            HostValue::HostObject(obj) => {
                if let Some(rrect) = obj.downcast_ref::<RRect>() {
                    return Ok(Some(*rrect));
                }
                obj.downcast_ref::<RoundedRect>()
                    .and_then(|rr| {
                        let r = rr.radii().as_single_radius()?;
                        Some(RRect::from_rect_xy(rr.rect(), r, r))
                    })
                    .map(Some)
                    .ok_or(PropError::InvalidHostObject {
                        expected: "rounded rect",
                    })
            }
            HostValue::Object(_) => Self::from_plain_object(props, value).map(Some),
            other => Err(PropError::TypeMismatch {
                expected: HostType::Object,
                found: other.value_type(),
            }),
        }
    }

    fn describe(&self, props: &PropsContainer) -> String {
        quoted(props, &[props.property(self.prop).name()])
    }

    fn cache(&self) -> &DerivedCache<RRect> {
        &self.cache
    }

    fn cache_mut(&mut self) -> &mut DerivedCache<RRect> {
        &mut self.cache
    }
}

impl StructuredSource for RRectProp {
    fn is_present(&self, props: &PropsContainer) -> bool {
        props.is_set(self.prop)
    }
}

/// A rounded rectangle read from the node's `x`, `y`, `width`, `height` and
/// either a uniform `r` or `rx` and `ry`.
///
/// `rx`/`ry` win over `r` when both are given.
#[derive(Debug)]
pub struct RRectFromProps {
    rect: RectFromProps,
    r: PropHandle,
    rxy: [PropHandle; 2],
    cache: DerivedCache<RRect>,
}

impl RRectFromProps {
    /// Declares the rectangle and radius properties on `props`.
    pub fn new(props: &mut PropsContainer) -> Self {
        Self {
            rect: RectFromProps::new(props),
            r: props.define_property(PropName::R),
            rxy: [
                props.define_property(PropName::RX),
                props.define_property(PropName::RY),
            ],
            cache: DerivedCache::new(),
        }
    }
}

impl DerivedProp for RRectFromProps {
    type Value = RRect;

    fn changed_in(&self, props: &PropsContainer) -> Generation {
        self.rect
            .changed_in(props)
            .max(props.changed_in(self.r))
            .max(props.latest_change(&self.rxy))
    }

    fn update_derived_value(&mut self, props: &PropsContainer) -> PropResult<Option<RRect>> {
        let Some(rect) = self.rect.derived_value(props)?.copied() else {
            return Ok(None);
        };
        if let Some([rx, ry]) = prop_numbers(props, self.rxy)? {
            return Ok(Some(RRect::from_rect_xy(rect, rx, ry)));
        }
        Ok(prop_numbers(props, [self.r])?.map(|[r]| RRect::from_rect_xy(rect, r, r)))
    }

    fn describe(&self, props: &PropsContainer) -> String {
        alloc::format!(
            "{} with {} or {}",
            self.rect.describe(props),
            quoted(props, &[PropName::RX, PropName::RY]),
            quoted(props, &[PropName::R])
        )
    }

    fn cache(&self) -> &DerivedCache<RRect> {
        &self.cache
    }

    fn cache_mut(&mut self) -> &mut DerivedCache<RRect> {
        &mut self.cache
    }
}

/// A rounded rectangle from a structured property or from discrete
/// `x`/`y`/`width`/`height`/`r` properties.
///
/// # Example
///
/// ```rust
/// use std::rc::Rc;
/// use understory_node_props::{
///     DerivedProp, HostValue, NameRegistry, PropName, PropsContainer, RRect, RRectProps,
/// };
///
/// let mut props = PropsContainer::new(Rc::new(NameRegistry::new()));
/// let mut rrect = RRectProps::new(&mut props, PropName::RECT);
///
/// props.begin_update_pass([
///     (PropName::X, HostValue::Number(0.0)),
///     (PropName::Y, HostValue::Number(0.0)),
///     (PropName::WIDTH, HostValue::Number(10.0)),
///     (PropName::HEIGHT, HostValue::Number(20.0)),
///     (PropName::R, HostValue::Number(3.0)),
/// ]);
/// assert_eq!(
///     rrect.require_derived_value(&props),
///     Ok(&RRect::from_xywh(0.0, 0.0, 10.0, 20.0, 3.0, 3.0))
/// );
/// ```
pub type RRectProps = Fallback<RRectProp, RRectFromProps>;

impl RRectProps {
    /// Declares the structured property `name` and the discrete fallbacks.
    pub fn new(props: &mut PropsContainer, name: PropName) -> Self {
        Self::from_sources(RRectProp::new(props, name), RRectFromProps::new(props))
    }
}
