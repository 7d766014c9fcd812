// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawing nodes built on the property engine.
//!
//! A drawing node owns a [`PropsContainer`] and the derived properties it
//! declares at construction. The host runs one update pass per frame with
//! [`DrawingNode::update`], then calls [`DrawingNode::draw`], which reads only
//! fully derived values and fails fast when a required one is missing.

use alloc::rc::Rc;

use kurbo::{Affine, Point, Rect};

use crate::container::PropsContainer;
use crate::derived::DerivedProp;
use crate::error::PropResult;
use crate::name::{NameRegistry, PropName};
use crate::point::CircleProp;
use crate::property::PropHandle;
use crate::rect::{RRect, RRectProps, RectProps};
use crate::transform::LocalMatrixProp;
use crate::value::HostValue;

/// The graphics backend a node draws into.
pub trait Canvas {
    /// Pushes the current matrix.
    fn save(&mut self);

    /// Pops the matrix pushed by the matching [`save`](Self::save).
    fn restore(&mut self);

    /// Pre-concatenates `transform` onto the current matrix.
    fn concat(&mut self, transform: Affine);

    /// Draws a circle.
    fn draw_circle(&mut self, center: Point, radius: f64);

    /// Draws a rectangle.
    fn draw_rect(&mut self, rect: Rect);

    /// Draws a rounded rectangle.
    fn draw_rrect(&mut self, rrect: &RRect);
}

/// State shared by every drawing node: its properties and local matrix.
#[derive(Debug)]
pub struct NodeBase {
    props: PropsContainer,
    matrix: LocalMatrixProp,
}

impl NodeBase {
    /// Creates a container on `names` and declares the matrix properties.
    #[must_use]
    pub fn new(names: Rc<NameRegistry>) -> Self {
        let mut props = PropsContainer::new(names);
        let matrix = LocalMatrixProp::new(&mut props);
        Self { props, matrix }
    }

    /// Returns the node's properties.
    #[must_use]
    pub fn props(&self) -> &PropsContainer {
        &self.props
    }

    /// Returns the node's properties mutably, for declaring more of them.
    pub fn props_mut(&mut self) -> &mut PropsContainer {
        &mut self.props
    }

    /// Returns the node's local matrix, if it has one.
    pub fn local_matrix(&mut self) -> PropResult<Option<Affine>> {
        Ok(self.matrix.derived_value(&self.props)?.copied())
    }
}

/// A node that draws one primitive.
pub trait DrawingNode {
    /// Returns the shared node state.
    fn base(&self) -> &NodeBase;

    /// Returns the shared node state mutably.
    fn base_mut(&mut self) -> &mut NodeBase;

    /// Draws the node's primitive in local coordinates.
    fn draw_primitive(&mut self, canvas: &mut dyn Canvas) -> PropResult<()>;

    /// Runs one update pass with the host's changed values.
    fn update(&mut self, updates: impl IntoIterator<Item = (PropName, HostValue)>)
    where
        Self: Sized,
    {
        self.base_mut().props_mut().begin_update_pass(updates);
    }

    /// Draws the node, applying its local matrix around the primitive.
    fn draw(&mut self, canvas: &mut dyn Canvas) -> PropResult<()> {
        let Some(matrix) = self.base_mut().local_matrix()? else {
            return self.draw_primitive(canvas);
        };
        canvas.save();
        canvas.concat(matrix);
        let result = self.draw_primitive(canvas);
        canvas.restore();
        result
    }
}

/// Draws a circle from `c` or `cx`/`cy`, with radius `r`.
#[derive(Debug)]
pub struct CircleNode {
    base: NodeBase,
    center: CircleProp,
    r: PropHandle,
}

impl CircleNode {
    /// Creates a circle node and declares its properties.
    #[must_use]
    pub fn new(names: Rc<NameRegistry>) -> Self {
        let mut base = NodeBase::new(names);
        let center = CircleProp::new(base.props_mut());
        let r = base.props_mut().define_property(PropName::R);
        Self { base, center, r }
    }
}

impl DrawingNode for CircleNode {
    fn base(&self) -> &NodeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut NodeBase {
        &mut self.base
    }

    fn draw_primitive(&mut self, canvas: &mut dyn Canvas) -> PropResult<()> {
        let props = &self.base.props;
        let center = *self.center.require_derived_value(props)?;
        let r = props.require_property_to_be_set(self.r)?.as_number()?;
        canvas.draw_circle(center, r);
        Ok(())
    }
}

/// Draws a rectangle from `rect` or `x`/`y`/`width`/`height`.
#[derive(Debug)]
pub struct RectNode {
    base: NodeBase,
    rect: RectProps,
}

impl RectNode {
    /// Creates a rectangle node and declares its properties.
    #[must_use]
    pub fn new(names: Rc<NameRegistry>) -> Self {
        let mut base = NodeBase::new(names);
        let rect = RectProps::new(base.props_mut(), PropName::RECT);
        Self { base, rect }
    }
}

impl DrawingNode for RectNode {
    fn base(&self) -> &NodeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut NodeBase {
        &mut self.base
    }

    fn draw_primitive(&mut self, canvas: &mut dyn Canvas) -> PropResult<()> {
        let rect = *self.rect.require_derived_value(&self.base.props)?;
        canvas.draw_rect(rect);
        Ok(())
    }
}

/// Draws a rounded rectangle from `rect` or `x`/`y`/`width`/`height`/`r`.
#[derive(Debug)]
pub struct RRectNode {
    base: NodeBase,
    rrect: RRectProps,
}

impl RRectNode {
    /// Creates a rounded rectangle node and declares its properties.
    #[must_use]
    pub fn new(names: Rc<NameRegistry>) -> Self {
        let mut base = NodeBase::new(names);
        let rrect = RRectProps::new(base.props_mut(), PropName::RECT);
        Self { base, rrect }
    }
}

impl DrawingNode for RRectNode {
    fn base(&self) -> &NodeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut NodeBase {
        &mut self.base
    }

    fn draw_primitive(&mut self, canvas: &mut dyn Canvas) -> PropResult<()> {
        let rrect = *self.rrect.require_derived_value(&self.base.props)?;
        canvas.draw_rrect(&rrect);
        Ok(())
    }
}
