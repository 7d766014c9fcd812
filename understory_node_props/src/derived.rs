// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cached values derived from node properties.
//!
//! A derived property is either **fresh** (its cached value reflects the
//! current inputs) or **stale**. It starts stale, and becomes fresh when it is
//! read with [`DerivedProp::derived_value`]. It goes stale again when any
//! property it depends on, directly or through a child derived property, is
//! set in a later update pass.
//!
//! Staleness is checked lazily at read time by comparing generations: the
//! cache remembers the generation it was computed in, and
//! [`DerivedProp::changed_in`] reports the latest generation any input changed
//! in. A derived property that is never read never recomputes, and one that
//! is read many times in a pass recomputes at most once.

use alloc::string::String;

use crate::container::PropsContainer;
use crate::error::{PropError, PropResult};
use crate::property::Generation;

/// The cached value of a derived property.
#[derive(Clone, Debug)]
pub struct DerivedCache<T> {
    value: Option<T>,
    computed_in: Option<Generation>,
}

impl<T> Default for DerivedCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DerivedCache<T> {
    /// Creates an empty, stale cache.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            value: None,
            computed_in: None,
        }
    }

    /// Returns the cached value, if any.
    ///
    /// This does not check freshness.
    #[must_use]
    #[inline]
    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Returns the generation of the last successful recompute.
    #[must_use]
    #[inline]
    pub fn computed_in(&self) -> Option<Generation> {
        self.computed_in
    }

    /// Returns `true` if inputs that changed in `changed_in` invalidate the cache.
    #[must_use]
    #[inline]
    pub fn is_stale(&self, changed_in: Generation) -> bool {
        self.computed_in.is_none_or(|computed| changed_in > computed)
    }

    fn store(&mut self, value: Option<T>, generation: Generation) {
        self.value = value;
        self.computed_in = Some(generation);
    }
}

/// A value derived from one or more properties of a node.
///
/// Implementors hold [`PropHandle`](crate::PropHandle)s for the properties
/// they read and own any child derived properties they build on. They supply
/// the dependency check and a recompute; the caching protocol lives in the
/// provided methods.
///
/// # Example
///
/// ```rust
/// use std::rc::Rc;
/// use understory_node_props::{
///     DerivedCache, DerivedProp, Generation, HostValue, NameRegistry, PropHandle, PropName,
///     PropResult, PropsContainer,
/// };
///
/// /// Area of a `width` x `height` box.
/// struct Area {
///     width: PropHandle,
///     height: PropHandle,
///     cache: DerivedCache<f64>,
/// }
///
/// impl DerivedProp for Area {
///     type Value = f64;
///
///     fn changed_in(&self, props: &PropsContainer) -> Generation {
///         props.latest_change(&[self.width, self.height])
///     }
///
///     fn update_derived_value(&mut self, props: &PropsContainer) -> PropResult<Option<f64>> {
///         let (Some(w), Some(h)) = (props.get(self.width), props.get(self.height)) else {
///             return Ok(None);
///         };
///         Ok(Some(w.as_number()? * h.as_number()?))
///     }
///
///     fn describe(&self, _props: &PropsContainer) -> String {
///         "`width`/`height`".into()
///     }
///
///     fn cache(&self) -> &DerivedCache<f64> { &self.cache }
///     fn cache_mut(&mut self) -> &mut DerivedCache<f64> { &mut self.cache }
/// }
///
/// let mut props = PropsContainer::new(Rc::new(NameRegistry::new()));
/// let mut area = Area {
///     width: props.define_property(PropName::WIDTH),
///     height: props.define_property(PropName::HEIGHT),
///     cache: DerivedCache::new(),
/// };
///
/// assert_eq!(area.derived_value(&props), Ok(None));
/// props.begin_update_pass([
///     (PropName::WIDTH, HostValue::Number(3.0)),
///     (PropName::HEIGHT, HostValue::Number(4.0)),
/// ]);
/// assert_eq!(area.derived_value(&props), Ok(Some(&12.0)));
/// ```
pub trait DerivedProp {
    /// The derived value type.
    type Value;

    /// Returns the latest generation in which any dependency changed.
    ///
    /// This must cover the full dependency set, including the properties read
    /// by child derived properties.
    fn changed_in(&self, props: &PropsContainer) -> Generation;

    /// Recomputes the value from the current inputs.
    ///
    /// Returns `Ok(None)` when no value is available, e.g. because required
    /// inputs are unset. An error leaves the previous cache untouched.
    fn update_derived_value(&mut self, props: &PropsContainer) -> PropResult<Option<Self::Value>>;

    /// Describes the source(s) of this value for error messages.
    fn describe(&self, props: &PropsContainer) -> String;

    /// Returns the cache.
    fn cache(&self) -> &DerivedCache<Self::Value>;

    /// Returns the cache mutably.
    fn cache_mut(&mut self) -> &mut DerivedCache<Self::Value>;

    /// Returns `true` if the next read will recompute.
    fn is_stale(&self, props: &PropsContainer) -> bool {
        self.cache().is_stale(self.changed_in(props))
    }

    /// Returns the derived value, recomputing first if stale.
    fn derived_value(&mut self, props: &PropsContainer) -> PropResult<Option<&Self::Value>> {
        if self.is_stale(props) {
            let value = self.update_derived_value(props)?;
            tracing::trace!(
                generation = props.generation(),
                has_value = value.is_some(),
                "recomputed derived property"
            );
            self.cache_mut().store(value, props.generation());
        }
        Ok(self.cache().get())
    }

    /// Returns `true` if a derived value is available.
    fn has_value(&mut self, props: &PropsContainer) -> PropResult<bool> {
        Ok(self.derived_value(props)?.is_some())
    }

    /// Returns the derived value, failing with
    /// [`PropError::MissingRequiredProperty`] if none is available.
    fn require_derived_value(&mut self, props: &PropsContainer) -> PropResult<&Self::Value> {
        self.derived_value(props)?;
        match self.cache().get() {
            Some(value) => Ok(value),
            None => Err(PropError::missing(self.describe(props))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name::{NameRegistry, PropName};
    use crate::property::PropHandle;
    use crate::value::HostValue;
    use alloc::rc::Rc;

    /// Doubles `x`, counting recomputes.
    struct Doubled {
        x: PropHandle,
        recomputes: u32,
        cache: DerivedCache<f64>,
    }

    impl Doubled {
        fn new(props: &mut PropsContainer) -> Self {
            Self {
                x: props.define_property(PropName::X),
                recomputes: 0,
                cache: DerivedCache::new(),
            }
        }
    }

    impl DerivedProp for Doubled {
        type Value = f64;

        fn changed_in(&self, props: &PropsContainer) -> Generation {
            props.changed_in(self.x)
        }

        fn update_derived_value(&mut self, props: &PropsContainer) -> PropResult<Option<f64>> {
            self.recomputes += 1;
            match props.get(self.x) {
                Some(v) => Ok(Some(v.as_number()? * 2.0)),
                None => Ok(None),
            }
        }

        fn describe(&self, _props: &PropsContainer) -> String {
            "`x`".into()
        }

        fn cache(&self) -> &DerivedCache<f64> {
            &self.cache
        }

        fn cache_mut(&mut self) -> &mut DerivedCache<f64> {
            &mut self.cache
        }
    }

    fn setup() -> (PropsContainer, Doubled) {
        let mut props = PropsContainer::new(Rc::new(NameRegistry::new()));
        props.define_property(PropName::Y);
        let doubled = Doubled::new(&mut props);
        (props, doubled)
    }

    #[test]
    fn starts_stale_and_caches_within_a_pass() {
        let (mut props, mut d) = setup();
        assert!(d.is_stale(&props));

        props.begin_update_pass([(PropName::X, HostValue::Number(2.0))]);
        assert_eq!(d.derived_value(&props), Ok(Some(&4.0)));
        assert_eq!(d.derived_value(&props), Ok(Some(&4.0)));
        assert_eq!(d.recomputes, 1);
        assert!(!d.is_stale(&props));
    }

    #[test]
    fn unrelated_changes_keep_the_cache() {
        let (mut props, mut d) = setup();
        props.begin_update_pass([(PropName::X, HostValue::Number(2.0))]);
        d.derived_value(&props).unwrap();

        props.begin_update_pass([(PropName::Y, HostValue::Number(9.0))]);
        assert!(!d.is_stale(&props));
        assert_eq!(d.derived_value(&props), Ok(Some(&4.0)));
        assert_eq!(d.recomputes, 1);
    }

    #[test]
    fn invalidation_is_lazy() {
        let (mut props, mut d) = setup();
        props.begin_update_pass([(PropName::X, HostValue::Number(2.0))]);
        d.derived_value(&props).unwrap();

        props.begin_update_pass([(PropName::X, HostValue::Number(5.0))]);
        assert_eq!(d.recomputes, 1);
        assert!(d.is_stale(&props));
    }

    #[test]
    fn change_in_an_unread_pass_is_not_lost() {
        let (mut props, mut d) = setup();
        props.begin_update_pass([(PropName::X, HostValue::Number(2.0))]);
        d.derived_value(&props).unwrap();

        props.begin_update_pass([(PropName::X, HostValue::Number(5.0))]);
        props.begin_update_pass([]);
        assert_eq!(d.derived_value(&props), Ok(Some(&10.0)));
        assert_eq!(d.recomputes, 2);
    }

    #[test]
    fn failed_recompute_keeps_previous_cache_and_stays_stale() {
        let (mut props, mut d) = setup();
        props.begin_update_pass([(PropName::X, HostValue::Number(2.0))]);
        d.derived_value(&props).unwrap();
        let computed_in = d.cache().computed_in();

        props.begin_update_pass([(PropName::X, HostValue::Bool(true))]);
        assert!(matches!(
            d.derived_value(&props),
            Err(PropError::TypeMismatch { .. })
        ));
        assert_eq!(d.cache().get(), Some(&4.0));
        assert_eq!(d.cache().computed_in(), computed_in);
        assert!(d.is_stale(&props));
    }

    #[test]
    fn empty_value_and_requirement() {
        let (props, mut d) = setup();
        assert_eq!(d.derived_value(&props), Ok(None));
        assert_eq!(d.has_value(&props), Ok(false));
        assert_eq!(
            d.require_derived_value(&props),
            Err(PropError::missing("`x`"))
        );
        // Empty results are cached too.
        assert_eq!(d.recomputes, 1);
    }
}
