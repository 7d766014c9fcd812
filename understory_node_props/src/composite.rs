// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Priority-ordered resolution across two candidate sources.
//!
//! Many drawing properties can be given either as one structured value (a
//! `rect` object, a native rounded rect, a `c` point) or as a set of discrete
//! numeric properties (`x`, `y`, `width`, ...). [`Fallback`] owns one source
//! of each kind and resolves them in a fixed order:
//!
//! 1. If the structured property is present at all, its result is used. A
//!    present but malformed structured value is an error; it never falls
//!    through to the discrete source.
//! 2. Otherwise the discrete source is used if all of its inputs are set.
//! 3. Otherwise resolution fails with
//!    [`PropError::MissingRequiredProperty`].

use alloc::string::String;

use crate::container::PropsContainer;
use crate::derived::{DerivedCache, DerivedProp};
use crate::error::{PropError, PropResult};
use crate::property::Generation;

/// A derived property read from a single structured property.
pub trait StructuredSource: DerivedProp {
    /// Returns `true` if the structured property holds any value.
    ///
    /// When this is `true`, [`Fallback`] commits to this source.
    fn is_present(&self, props: &PropsContainer) -> bool;
}

/// Resolves a value from a structured source, falling back to a discrete one.
pub struct Fallback<S, D>
where
    S: StructuredSource,
    D: DerivedProp<Value = S::Value>,
{
    structured: S,
    discrete: D,
    cache: DerivedCache<S::Value>,
}

impl<S, D> Fallback<S, D>
where
    S: StructuredSource,
    D: DerivedProp<Value = S::Value>,
    S::Value: Clone,
{
    /// Combines two sources, `structured` taking priority.
    pub fn from_sources(structured: S, discrete: D) -> Self {
        Self {
            structured,
            discrete,
            cache: DerivedCache::new(),
        }
    }

    /// Returns the structured source.
    pub fn structured(&self) -> &S {
        &self.structured
    }

    /// Returns the discrete source.
    pub fn discrete(&self) -> &D {
        &self.discrete
    }
}

impl<S, D> core::fmt::Debug for Fallback<S, D>
where
    S: StructuredSource + core::fmt::Debug,
    D: DerivedProp<Value = S::Value> + core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Fallback")
            .field("structured", &self.structured)
            .field("discrete", &self.discrete)
            .field("computed_in", &self.cache.computed_in())
            .finish_non_exhaustive()
    }
}

impl<S, D> DerivedProp for Fallback<S, D>
where
    S: StructuredSource,
    D: DerivedProp<Value = S::Value>,
    S::Value: Clone,
{
    type Value = S::Value;

    fn changed_in(&self, props: &PropsContainer) -> Generation {
        self.structured
            .changed_in(props)
            .max(self.discrete.changed_in(props))
    }

    fn update_derived_value(&mut self, props: &PropsContainer) -> PropResult<Option<S::Value>> {
        if self.structured.is_present(props) {
            let value = self.structured.derived_value(props)?.cloned();
            return match value {
                Some(value) => Ok(Some(value)),
                None => Err(PropError::missing(self.structured.describe(props))),
            };
        }
        if let Some(value) = self.discrete.derived_value(props)? {
            return Ok(Some(value.clone()));
        }
        Err(PropError::missing(self.describe(props)))
    }

    fn describe(&self, props: &PropsContainer) -> String {
        alloc::format!(
            "either {} or {} must be set",
            self.structured.describe(props),
            self.discrete.describe(props)
        )
    }

    fn cache(&self) -> &DerivedCache<S::Value> {
        &self.cache
    }

    fn cache_mut(&mut self) -> &mut DerivedCache<S::Value> {
        &mut self.cache
    }
}
