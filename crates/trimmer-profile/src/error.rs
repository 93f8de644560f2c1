//! Error types for profiles

use trimmer_options::TreeError;
use trimmer_store::PathError;

/// Main profile error type
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    /// Malformed option path
    #[error("invalid path: {0}")]
    Path(#[from] PathError),

    /// Tree structure or integrity failure
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// Path is well-formed but names no option in the tree
    #[error("no such option: {0}")]
    NoSuchOption(String),

    /// No build target given and none configured
    #[error("no build target configured")]
    NoTarget,

    /// TOML config could not be parsed
    #[error("invalid toml config: {0}")]
    TomlConfig(#[from] toml::de::Error),

    /// Config could not be rendered as TOML
    #[error("toml serialization failed: {0}")]
    TomlOutput(#[from] toml::ser::Error),

    /// YAML config could not be parsed
    #[error("invalid yaml config: {0}")]
    YamlConfig(#[from] serde_yaml::Error),
}

impl ProfileError {
    /// Whether the error reports a missing option rather than a bug
    ///
    /// Hosts show lookup misses to users; everything else is a developer
    /// diagnostic.
    #[inline]
    #[must_use]
    pub fn is_lookup_miss(&self) -> bool {
        matches!(self, Self::NoSuchOption(_) | Self::Path(_))
    }
}

/// Result type for profile operations
pub type Result<T> = std::result::Result<T, ProfileError>;

#[cfg(test)]
mod tests {
    use super::*;
    use trimmer_options::StructuralViolation;

    #[test]
    fn lookup_miss_classification() {
        assert!(ProfileError::NoSuchOption("Graphics/Nope".into()).is_lookup_miss());
        assert!(ProfileError::from(PathError::Empty).is_lookup_miss());

        let tree: TreeError = StructuralViolation::EmptyParameter {
            option: "Channel".into(),
        }
        .into();
        assert!(!ProfileError::from(tree).is_lookup_miss());
    }

    #[test]
    fn error_messages() {
        let err = ProfileError::NoSuchOption("Graphics/Nope".into());
        assert_eq!(err.to_string(), "no such option: Graphics/Nope");
    }
}
