// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors raised while reading and deriving node properties.

use alloc::string::String;

use crate::value::HostType;

/// Result alias used throughout the crate.
pub type PropResult<T> = Result<T, PropError>;

/// Failures of a single update or draw attempt on one node.
///
/// None of these are retried or recovered internally. Whether to skip the
/// node, log, or fall back to a default is up to the caller.
#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum PropError {
    /// A required property was read before a value was ever stored.
    #[error("property `{name}` was read before it was set")]
    UnsetProperty {
        /// Name of the unset property.
        name: String,
    },

    /// A structured source held a host object of the wrong native type.
    #[error("could not read {expected} from unknown host object type")]
    InvalidHostObject {
        /// What the host object was expected to be.
        expected: &'static str,
    },

    /// No candidate source satisfied a required value.
    #[error("missing required property: {checked}")]
    MissingRequiredProperty {
        /// The source(s) that were checked.
        checked: String,
    },

    /// A transform array entry could not be interpreted.
    #[error("invalid transform entry at index {index}: {reason}")]
    InvalidTransformSyntax {
        /// Position of the offending entry in the transform array.
        index: usize,
        /// What was wrong with it, naming the offending key where there is one.
        reason: String,
    },

    /// A host value accessor was used on a value of another type.
    #[error("expected {expected} host value, found {found}")]
    TypeMismatch {
        /// The type the accessor reads.
        expected: HostType,
        /// The type actually held.
        found: HostType,
    },
}

impl PropError {
    pub(crate) fn missing(checked: impl Into<String>) -> Self {
        Self::MissingRequiredProperty {
            checked: checked.into(),
        }
    }

    pub(crate) fn transform_syntax(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidTransformSyntax {
            index,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn display_names_the_offender() {
        let err = PropError::UnsetProperty {
            name: "r".to_string(),
        };
        assert_eq!(err.to_string(), "property `r` was read before it was set");

        let err = PropError::transform_syntax(2, "unknown key `spin`");
        assert!(err.to_string().contains("index 2"));
        assert!(err.to_string().contains("`spin`"));

        let err = PropError::missing("`rect` or x/y/width/height/r");
        assert!(err.to_string().starts_with("missing required property:"));
    }

    #[test]
    fn type_mismatch_display() {
        let err = PropError::TypeMismatch {
            expected: HostType::Number,
            found: HostType::Array,
        };
        assert_eq!(err.to_string(), "expected number host value, found array");
    }
}
