//! Inclusion outcomes and requests

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Whether an option's feature and/or editable option end up in a build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Inclusion {
    /// Neither feature nor option
    Remove,
    /// The feature, statically configured, without the editable option
    FeatureOnly,
    /// The editable option without its feature
    OptionOnly,
    /// Both
    FeatureAndOption,
}

impl Inclusion {
    /// Combine the two independent flags
    #[inline]
    #[must_use]
    pub fn from_flags(feature: bool, option: bool) -> Self {
        match (feature, option) {
            (false, false) => Self::Remove,
            (true, false) => Self::FeatureOnly,
            (false, true) => Self::OptionOnly,
            (true, true) => Self::FeatureAndOption,
        }
    }

    #[inline]
    #[must_use]
    pub fn has_feature(self) -> bool {
        matches!(self, Self::FeatureOnly | Self::FeatureAndOption)
    }

    #[inline]
    #[must_use]
    pub fn has_option(self) -> bool {
        matches!(self, Self::OptionOnly | Self::FeatureAndOption)
    }

    #[inline]
    #[must_use]
    pub fn is_removed(self) -> bool {
        self == Self::Remove
    }
}

impl Display for Inclusion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Remove => "remove",
            Self::FeatureOnly => "feature-only",
            Self::OptionOnly => "option-only",
            Self::FeatureAndOption => "feature-and-option",
        };
        f.write_str(s)
    }
}

bitflags! {
    /// What a profile asks to include for one option
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct InclusionRequest: u8 {
        /// Build the option's feature in
        const FEATURE = 1 << 0;
        /// Build the editable option in
        const OPTION = 1 << 1;
    }
}

impl Default for InclusionRequest {
    fn default() -> Self {
        Self::all()
    }
}

impl From<Inclusion> for InclusionRequest {
    fn from(inclusion: Inclusion) -> Self {
        let mut request = Self::empty();
        request.set(Self::FEATURE, inclusion.has_feature());
        request.set(Self::OPTION, inclusion.has_option());
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_combine() {
        assert_eq!(Inclusion::from_flags(false, false), Inclusion::Remove);
        assert_eq!(Inclusion::from_flags(true, false), Inclusion::FeatureOnly);
        assert_eq!(Inclusion::from_flags(false, true), Inclusion::OptionOnly);
        assert_eq!(Inclusion::from_flags(true, true), Inclusion::FeatureAndOption);
    }

    #[test]
    fn request_from_inclusion() {
        assert_eq!(InclusionRequest::from(Inclusion::Remove), InclusionRequest::empty());
        assert_eq!(
            InclusionRequest::from(Inclusion::FeatureOnly),
            InclusionRequest::FEATURE
        );
        assert_eq!(InclusionRequest::from(Inclusion::FeatureAndOption), InclusionRequest::all());
    }

    #[test]
    fn inclusion_display() {
        assert_eq!(Inclusion::FeatureOnly.to_string(), "feature-only");
        assert!(Inclusion::Remove.is_removed());
        assert!(!Inclusion::OptionOnly.has_feature());
    }
}
