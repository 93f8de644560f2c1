//! Error types for option trees
//!
//! Two families, both fatal for the current operation:
//! - [`StructuralViolation`]: misuse of the variant or schema API (a caller bug)
//! - [`IntegrityError`]: the tree was built or mutated incorrectly
//!
//! Malformed input to `load` is not an error (the default value is used) and
//! lookup misses are plain `None`.

use crate::tree::NodeId;

/// Main option tree error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// Variant or schema API misuse
    #[error("structural violation: {0}")]
    Structural(#[from] StructuralViolation),

    /// Broken tree invariants
    #[error("tree integrity error: {0}")]
    Integrity(#[from] IntegrityError),
}

impl TreeError {
    #[inline]
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Structural(_))
    }

    #[inline]
    #[must_use]
    pub fn is_integrity(&self) -> bool {
        matches!(self, Self::Integrity(_))
    }
}

/// Variant or schema API misuse
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructuralViolation {
    /// Variant operation on a single-variance option
    #[error("option '{option}' does not support variants")]
    NotVariantCapable { option: String },

    /// Variant operation on a node that is itself a non-default variant
    #[error("option '{option}' is not the default variant")]
    NotDefaultVariant { option: String },

    /// Empty variant parameter
    #[error("option '{option}': variant parameter is empty")]
    EmptyParameter { option: String },

    /// Parameter equal to the default parameter
    #[error("option '{option}': '{parameter}' is the default parameter")]
    DefaultParameter { option: String, parameter: String },

    /// Parameter already used by another variant
    #[error("option '{option}': variant '{parameter}' already exists")]
    DuplicateParameter { option: String, parameter: String },

    /// Parameter containing a path separator
    #[error("option '{option}': invalid variant parameter '{parameter}'")]
    InvalidParameter { option: String, parameter: String },

    /// Node passed to remove is not a variant of this default node
    #[error("'{variant}' is not a variant of option '{option}'")]
    NotAVariantOf { option: String, variant: String },

    /// Two siblings or roots share a name
    #[error("duplicate option name '{name}' under '{parent}'")]
    DuplicateName { parent: String, name: String },
}

/// Broken tree invariants
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntegrityError {
    /// Non-default variant without a parent
    #[error("variant '{parameter}' of option '{option}' has no parent")]
    ParentlessVariant { option: String, parameter: String },

    /// Node id no longer refers to a live node
    #[error("node {0} is not part of the tree")]
    StaleNode(NodeId),
}

impl From<NodeId> for TreeError {
    fn from(id: NodeId) -> Self {
        Self::Integrity(IntegrityError::StaleNode(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_classification() {
        let structural: TreeError = StructuralViolation::EmptyParameter {
            option: "Channel".into(),
        }
        .into();
        assert!(structural.is_structural());
        assert!(!structural.is_integrity());

        let integrity: TreeError = IntegrityError::ParentlessVariant {
            option: "Channel".into(),
            parameter: "1".into(),
        }
        .into();
        assert!(integrity.is_integrity());
    }

    #[test]
    fn error_messages() {
        let err = TreeError::from(StructuralViolation::DuplicateParameter {
            option: "Channel".into(),
            parameter: "left".into(),
        });
        assert_eq!(
            err.to_string(),
            "structural violation: option 'Channel': variant 'left' already exists"
        );
    }
}
