// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end behavior of update passes, derived reads and drawing.

use std::rc::Rc;

use kurbo::{Affine, Point, Rect, Vec2};
use understory_node_props::{
    Canvas, DerivedCache, DerivedProp, DrawingNode, Generation, HostValue, NameRegistry,
    Numbers16Prop, PropError, PropHandle, PropName, PropResult, PropsContainer, RRect, RRectNode,
    RRectProps, process_transform,
};

/// Sums `x` and `y`, counting recomputes.
#[derive(Debug)]
struct Sum {
    inputs: [PropHandle; 2],
    recomputes: usize,
    cache: DerivedCache<f64>,
}

impl Sum {
    fn new(props: &mut PropsContainer) -> Self {
        Self {
            inputs: [
                props.define_property(PropName::X),
                props.define_property(PropName::Y),
            ],
            recomputes: 0,
            cache: DerivedCache::new(),
        }
    }
}

impl DerivedProp for Sum {
    type Value = f64;

    fn changed_in(&self, props: &PropsContainer) -> Generation {
        props.latest_change(&self.inputs)
    }

    fn update_derived_value(&mut self, props: &PropsContainer) -> PropResult<Option<f64>> {
        self.recomputes += 1;
        let mut total = 0.0;
        for handle in self.inputs {
            let Some(value) = props.get(handle) else {
                return Ok(None);
            };
            total += value.as_number()?;
        }
        Ok(Some(total))
    }

    fn describe(&self, _props: &PropsContainer) -> String {
        "`x/y`".into()
    }

    fn cache(&self) -> &DerivedCache<f64> {
        &self.cache
    }

    fn cache_mut(&mut self) -> &mut DerivedCache<f64> {
        &mut self.cache
    }
}

fn container() -> PropsContainer {
    PropsContainer::new(Rc::new(NameRegistry::new()))
}

#[test]
fn repeated_reads_in_one_pass_hit_the_cache() {
    let mut props = container();
    let mut sum = Sum::new(&mut props);
    props.begin_update_pass([
        (PropName::X, HostValue::Number(1.0)),
        (PropName::Y, HostValue::Number(2.0)),
    ]);

    assert_eq!(sum.derived_value(&props), Ok(Some(&3.0)));
    assert_eq!(sum.derived_value(&props), Ok(Some(&3.0)));
    assert_eq!(sum.recomputes, 1);

    // A pass that touches nothing the sum reads keeps the cache.
    props.begin_update_pass([]);
    assert_eq!(sum.derived_value(&props), Ok(Some(&3.0)));
    assert_eq!(sum.recomputes, 1);
}

#[test]
fn unread_changes_do_no_work() {
    let mut props = container();
    let mut sum = Sum::new(&mut props);
    for x in 0..5 {
        props.begin_update_pass([
            (PropName::X, HostValue::Number(f64::from(x))),
            (PropName::Y, HostValue::Number(1.0)),
        ]);
    }
    assert_eq!(sum.recomputes, 0);
    assert_eq!(sum.derived_value(&props), Ok(Some(&5.0)));
    assert_eq!(sum.recomputes, 1);
}

#[test]
fn changes_do_not_leak_into_the_next_pass() {
    let mut props = container();
    let _sum = Sum::new(&mut props);
    props.begin_update_pass([(PropName::X, HostValue::Number(1.0))]);
    assert!(props.has_changed(PropName::X));
    assert_eq!(props.changed_names(), &[PropName::X]);

    props.begin_update_pass([(PropName::Y, HostValue::Number(1.0))]);
    assert!(!props.has_changed(PropName::X));
    assert!(props.has_changed(PropName::Y));

    props.begin_update_pass([]);
    assert!(!props.has_changed(PropName::Y));
    assert!(props.changed_names().is_empty());
}

#[test]
fn structured_rrect_beats_discrete() {
    let mut props = container();
    let mut rrect = RRectProps::new(&mut props, PropName::RECT);
    props.begin_update_pass([
        (PropName::X, HostValue::Number(0.0)),
        (PropName::Y, HostValue::Number(0.0)),
        (PropName::WIDTH, HostValue::Number(10.0)),
        (PropName::HEIGHT, HostValue::Number(20.0)),
        (PropName::R, HostValue::Number(3.0)),
        (
            PropName::RECT,
            HostValue::object([
                (PropName::X, HostValue::Number(5.0)),
                (PropName::Y, HostValue::Number(6.0)),
                (PropName::WIDTH, HostValue::Number(7.0)),
                (PropName::HEIGHT, HostValue::Number(8.0)),
                (PropName::RX, HostValue::Number(1.0)),
                (PropName::RY, HostValue::Number(2.0)),
            ]),
        ),
    ]);
    assert_eq!(
        rrect.require_derived_value(&props),
        Ok(&RRect::from_xywh(5.0, 6.0, 7.0, 8.0, 1.0, 2.0))
    );
}

#[test]
fn discrete_rrect_fallback() {
    let mut props = container();
    let mut rrect = RRectProps::new(&mut props, PropName::RECT);
    props.begin_update_pass([
        (PropName::X, HostValue::Number(0.0)),
        (PropName::Y, HostValue::Number(0.0)),
        (PropName::WIDTH, HostValue::Number(10.0)),
        (PropName::HEIGHT, HostValue::Number(20.0)),
        (PropName::R, HostValue::Number(3.0)),
    ]);
    let value = *rrect.require_derived_value(&props).unwrap();
    assert_eq!(value.rect, Rect::new(0.0, 0.0, 10.0, 20.0));
    assert_eq!(value.radii, Vec2::new(3.0, 3.0));
}

#[test]
fn transform_entries_fold_by_pre_composition() {
    let names = NameRegistry::new();
    let transform = HostValue::Array(vec![
        HostValue::object([(PropName::SCALE, HostValue::Number(2.0))]),
        HostValue::object([(PropName::TRANSLATE_X, HostValue::Number(5.0))]),
    ]);
    let m = process_transform(Affine::IDENTITY, &transform, &names).unwrap();
    // scale(2) * translate(5, 0): translate first, then scale.
    assert_eq!(m, Affine::scale(2.0) * Affine::translate((5.0, 0.0)));
    assert_eq!(m * Point::new(1.0, 0.0), Point::new(12.0, 0.0));
}

#[test]
fn empty_transform_entry_is_a_syntax_error() {
    let names = NameRegistry::new();
    let transform = HostValue::Array(vec![HostValue::object([])]);
    assert!(matches!(
        process_transform(Affine::IDENTITY, &transform, &names),
        Err(PropError::InvalidTransformSyntax { index: 0, .. })
    ));
}

#[derive(Default)]
struct CountingCanvas {
    draws: usize,
}

impl Canvas for CountingCanvas {
    fn save(&mut self) {}
    fn restore(&mut self) {}
    fn concat(&mut self, _transform: Affine) {}
    fn draw_circle(&mut self, _center: Point, _radius: f64) {
        self.draws += 1;
    }
    fn draw_rect(&mut self, _rect: Rect) {
        self.draws += 1;
    }
    fn draw_rrect(&mut self, _rrect: &RRect) {
        self.draws += 1;
    }
}

#[test]
fn rrect_node_without_sources_fails_at_draw() {
    let mut node = RRectNode::new(Rc::new(NameRegistry::new()));
    node.update([(PropName::WIDTH, HostValue::Number(10.0))]);
    let mut canvas = CountingCanvas::default();

    let err = node.draw(&mut canvas).unwrap_err();
    assert!(matches!(err, PropError::MissingRequiredProperty { .. }));
    assert_eq!(
        err.to_string(),
        "missing required property: either `rect` or `x/y/width/height` with `rx/ry` or `r` must be set"
    );
    assert_eq!(canvas.draws, 0);

    // Supplying the rest recovers on the next pass.
    node.update([
        (PropName::X, HostValue::Number(0.0)),
        (PropName::Y, HostValue::Number(0.0)),
        (PropName::HEIGHT, HostValue::Number(10.0)),
        (PropName::R, HostValue::Number(2.0)),
    ]);
    node.draw(&mut canvas).unwrap();
    assert_eq!(canvas.draws, 1);
}

#[test]
fn u16_narrowing_truncates_and_saturates() {
    let mut names = NameRegistry::new();
    let indices = names.intern("indices");
    let mut props = PropsContainer::new(Rc::new(names));
    let mut narrowed = Numbers16Prop::new(&mut props, indices);

    props.begin_update_pass([(indices, HostValue::numbers([3.9, 300_000.0]))]);
    assert_eq!(
        narrowed.require_derived_value(&props).map(Vec::as_slice),
        Ok(&[3_u16, u16::MAX][..])
    );
}
