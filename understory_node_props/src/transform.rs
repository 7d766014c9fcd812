// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transform arrays and local matrices.
//!
//! A transform array is an ordered list of single-key records, e.g.
//! `[{ translateX: 10 }, { scale: 2 }, { rotate: 0.5 }]`. Each record is
//! pre-composed onto the accumulated matrix in array order, so reading the
//! array left to right gives successive local-space transforms.

use alloc::string::String;

use kurbo::{Affine, Point};

use crate::container::PropsContainer;
use crate::derived::{DerivedCache, DerivedProp};
use crate::error::{PropError, PropResult};
use crate::name::{NameRegistry, PropName};
use crate::point::PointProp;
use crate::property::{Generation, PropHandle};
use crate::value::{HostType, HostValue};

const EXPECTED_KEYS: &str =
    "expected translateX, translateY, scale, scaleX, scaleY, skewX, skewY, rotate or rotateZ";

/// Folds a transform array into `matrix`.
///
/// Operations are applied in array order, each pre-composed (`m = m * op`).
/// `rotate` and `rotateZ` are in radians. `skewX` and `skewY` are shear
/// factors.
///
/// Fails with [`PropError::InvalidTransformSyntax`] if an entry is not an
/// object with exactly one known key.
///
/// # Example
///
/// ```rust
/// use kurbo::{Affine, Point};
/// use understory_node_props::{process_transform, HostValue, NameRegistry, PropName};
///
/// let names = NameRegistry::new();
/// let transform = HostValue::Array(vec![
///     HostValue::object([(PropName::SCALE, HostValue::Number(2.0))]),
///     HostValue::object([(PropName::TRANSLATE_X, HostValue::Number(5.0))]),
/// ]);
/// let m = process_transform(Affine::IDENTITY, &transform, &names).unwrap();
/// assert_eq!(m * Point::new(1.0, 0.0), Point::new(12.0, 0.0));
/// ```
pub fn process_transform(
    matrix: Affine,
    transform: &HostValue,
    names: &NameRegistry,
) -> PropResult<Affine> {
    let mut m = matrix;
    for (index, entry) in transform.as_array()?.iter().enumerate() {
        let HostValue::Object(fields) = entry else {
            return Err(PropError::transform_syntax(
                index,
                alloc::format!("{} entry, {EXPECTED_KEYS}", entry.value_type()),
            ));
        };
        let (key, value) = match fields.as_slice() {
            [(key, value)] => (*key, value),
            [] => {
                return Err(PropError::transform_syntax(
                    index,
                    alloc::format!("empty value, {EXPECTED_KEYS}"),
                ));
            }
            more => {
                return Err(PropError::transform_syntax(
                    index,
                    alloc::format!("{} keys in one entry, {EXPECTED_KEYS}", more.len()),
                ));
            }
        };
        let v = value.as_number()?;
        let op = match key {
            PropName::TRANSLATE_X => Affine::translate((v, 0.0)),
            PropName::TRANSLATE_Y => Affine::translate((0.0, v)),
            PropName::SCALE => Affine::scale(v),
            PropName::SCALE_X => Affine::scale_non_uniform(v, 1.0),
            PropName::SCALE_Y => Affine::scale_non_uniform(1.0, v),
            PropName::SKEW_X => Affine::skew(v, 0.0),
            PropName::SKEW_Y => Affine::skew(0.0, v),
            PropName::ROTATE | PropName::ROTATE_Z => Affine::rotate(v),
            unknown => {
                return Err(PropError::transform_syntax(
                    index,
                    alloc::format!("unknown key `{}`, {EXPECTED_KEYS}", names.display(unknown)),
                ));
            }
        };
        m = m * op;
    }
    Ok(m)
}

/// Applies `transform` around `origin` instead of around `(0, 0)`.
#[must_use]
pub fn transform_origin(origin: Point, transform: Affine) -> Affine {
    let offset = origin.to_vec2();
    Affine::translate(offset) * transform * Affine::translate(-offset)
}

/// Reads a matrix: a native [`Affine`] or six coefficients in Kurbo order.
fn read_matrix(value: &HostValue) -> PropResult<Affine> {
    match value {
        HostValue::HostObject(obj) => obj
            .downcast_ref::<Affine>()
            .copied()
            .ok_or(PropError::InvalidHostObject { expected: "matrix" }),
        HostValue::Array(items) if items.len() == 6 => {
            let mut coeffs = [0.0; 6];
            for (slot, item) in coeffs.iter_mut().zip(items) {
                *slot = item.as_number()?;
            }
            Ok(Affine::new(coeffs))
        }
        HostValue::Array(_) => Err(PropError::missing("six `matrix` coefficients")),
        other => Err(PropError::TypeMismatch {
            expected: HostType::HostObject,
            found: other.value_type(),
        }),
    }
}

/// The local matrix of a drawing node.
///
/// Combines `matrix` with the `transform` array (in that order). `origin`
/// only moves the pivot of the `transform` array; it never wraps `matrix` and
/// is ignored when no `transform` is set. Derives no value when neither
/// `matrix` nor `transform` is set.
#[derive(Debug)]
pub struct LocalMatrixProp {
    matrix: PropHandle,
    transform: PropHandle,
    origin: PointProp,
    cache: DerivedCache<Affine>,
}

impl LocalMatrixProp {
    /// Declares `matrix`, `transform` and `origin` on `props`.
    pub fn new(props: &mut PropsContainer) -> Self {
        Self {
            matrix: props.define_property(PropName::MATRIX),
            transform: props.define_property(PropName::TRANSFORM),
            origin: PointProp::new(props, PropName::ORIGIN),
            cache: DerivedCache::new(),
        }
    }
}

impl DerivedProp for LocalMatrixProp {
    type Value = Affine;

    fn changed_in(&self, props: &PropsContainer) -> Generation {
        props
            .latest_change(&[self.matrix, self.transform])
            .max(self.origin.changed_in(props))
    }

    fn update_derived_value(&mut self, props: &PropsContainer) -> PropResult<Option<Affine>> {
        let matrix = props.get(self.matrix).map(read_matrix).transpose()?;
        let transform = match props.get(self.transform) {
            Some(t) => {
                let t = process_transform(Affine::IDENTITY, t, props.names())?;
                Some(match self.origin.derived_value(props)? {
                    Some(origin) => transform_origin(*origin, t),
                    None => t,
                })
            }
            None => None,
        };
        if matrix.is_none() && transform.is_none() {
            return Ok(None);
        }
        Ok(Some(
            matrix.unwrap_or(Affine::IDENTITY) * transform.unwrap_or(Affine::IDENTITY),
        ))
    }

    fn describe(&self, props: &PropsContainer) -> String {
        alloc::format!(
            "`{}` or `{}`",
            props.describe(&[PropName::MATRIX]),
            props.describe(&[PropName::TRANSFORM])
        )
    }

    fn cache(&self) -> &DerivedCache<Affine> {
        &self.cache
    }

    fn cache_mut(&mut self) -> &mut DerivedCache<Affine> {
        &mut self.cache
    }
}
