// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Node Props: cached, lazily derived node properties.
//!
//! A declarative host (a reconciler, a scripting bridge, a markup loader)
//! pushes loosely typed values onto scene nodes once per frame. This crate
//! turns those values into strongly typed drawing inputs, recomputing each
//! derived value at most once per update pass and only when its inputs
//! changed.
//!
//! ## Core Concepts
//!
//! ### Names and values
//!
//! Property names are interned into a shared [`NameRegistry`] and compared by
//! [`PropName`] identity. Values arrive as [`HostValue`]s: numbers, arrays,
//! plain objects, or opaque native [`HostObject`]s such as a Kurbo [`Rect`].
//!
//! ### Containers and update passes
//!
//! Every node owns a [`PropsContainer`]. Properties are declared up front and
//! addressed by [`PropHandle`]. [`PropsContainer::begin_update_pass`] starts
//! a new [`Generation`], stores the host's changed values, and records which
//! names changed.
//!
//! ### Derived properties
//!
//! A [`DerivedProp`] computes a typed value from one or more properties and
//! caches it in a [`DerivedCache`]. The cache remembers the generation it was
//! computed in, so a value is recomputed on read only when some dependency
//! changed since. Invalidation is lazy and transitive: a composite that reads
//! other derived properties reports their dependencies as its own.
//!
//! [`Fallback`] resolves a value from a structured property (e.g. `rect`),
//! falling back to discrete ones (e.g. `x`/`y`/`width`/`height`). The common
//! combinations are provided as [`RectProps`], [`RRectProps`] and
//! [`CircleProp`].
//!
//! ### Transforms
//!
//! [`process_transform`] folds a transform array such as
//! `[{ translateX: 10 }, { rotate: 0.5 }]` into an [`Affine`].
//! [`LocalMatrixProp`] combines `matrix`, `transform` and `origin` into a
//! node's local matrix.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::rc::Rc;
//! use kurbo::{Affine, Point, Rect};
//! use understory_node_props::{
//!     Canvas, CircleNode, DrawingNode, HostValue, NameRegistry, PropName, RRect,
//! };
//!
//! #[derive(Default)]
//! struct Log(Vec<String>);
//!
//! impl Canvas for Log {
//!     fn save(&mut self) {}
//!     fn restore(&mut self) {}
//!     fn concat(&mut self, _: Affine) {}
//!     fn draw_circle(&mut self, c: Point, r: f64) {
//!         self.0.push(format!("circle {} {} {}", c.x, c.y, r));
//!     }
//!     fn draw_rect(&mut self, _: Rect) {}
//!     fn draw_rrect(&mut self, _: &RRect) {}
//! }
//!
//! let names = Rc::new(NameRegistry::new());
//! let mut circle = CircleNode::new(names);
//!
//! circle.update([
//!     (PropName::CX, HostValue::Number(10.0)),
//!     (PropName::CY, HostValue::Number(20.0)),
//!     (PropName::R, HostValue::Number(5.0)),
//! ]);
//!
//! let mut log = Log::default();
//! circle.draw(&mut log).unwrap();
//! assert_eq!(log.0, ["circle 10 20 5"]);
//! ```
//!
//! ## Errors
//!
//! Reads that cannot produce a value fail with a [`PropError`]. Errors are
//! never cached: a failed recompute leaves the derived property stale, so the
//! next read tries again.
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. Kurbo needs either the `std`
//! (default) or the `libm` feature for its float math.
//!
//! [`Rect`]: kurbo::Rect
//! [`Affine`]: kurbo::Affine

#![no_std]

extern crate alloc;

mod composite;
mod container;
mod derived;
mod error;
mod name;
mod node;
mod numbers;
mod point;
mod property;
mod rect;
mod transform;
mod value;

pub use composite::{Fallback, StructuredSource};
pub use container::PropsContainer;
pub use derived::{DerivedCache, DerivedProp};
pub use error::{PropError, PropResult};
pub use name::{NameRegistry, PropName};
pub use node::{Canvas, CircleNode, DrawingNode, NodeBase, RRectNode, RectNode};
pub use numbers::{NumberProp, Numbers16Prop, NumbersProp, narrow_to_u16};
pub use point::{CircleProp, PointFromProps, PointProp};
pub use property::{Generation, NodeProp, PropHandle};
pub use rect::{RRect, RRectFromProps, RRectProp, RectFromProps, RectProp, RectProps, RRectProps};
pub use transform::{LocalMatrixProp, process_transform, transform_origin};
pub use value::{HostObject, HostType, HostValue};
