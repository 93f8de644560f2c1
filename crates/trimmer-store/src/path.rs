//! Option paths
//!
//! Provides [`OptionPath`] for addressing nodes in both the live option tree
//! and the value store.
//!
//! Grammar: a root name, then any number of `/name` (child descent) or
//! `:parameter` (variant selection). A variant selection always applies to
//! the segment right before it, so a path is a list of [`PathSegment`]s
//! each carrying a name and an optional parameter. Matching is
//! case-insensitive for names and parameters alike.

use smallvec::SmallVec;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Separator for descending into a child
pub const CHILD_SEPARATOR: char = '/';

/// Separator for selecting a variant
pub const VARIANT_SEPARATOR: char = ':';

/// Case-insensitive comparison used for every name and parameter match
#[inline]
#[must_use]
pub fn names_match(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b) || a.to_lowercase() == b.to_lowercase()
}

/// Fold a name or parameter into its lookup key
#[inline]
#[must_use]
pub fn fold_case(s: &str) -> String {
    s.to_lowercase()
}

/// Check whether a string can be used as a name or parameter
#[inline]
#[must_use]
pub fn is_valid_key(s: &str) -> bool {
    !s.is_empty() && !s.contains([CHILD_SEPARATOR, VARIANT_SEPARATOR])
}

/// One step of an [`OptionPath`]
///
/// `Graphics` is a plain segment, `Channel:2` selects variant `2` of
/// `Channel`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathSegment {
    name: String,
    parameter: Option<String>,
}

impl PathSegment {
    /// Plain child segment
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameter: None,
        }
    }

    /// Variant segment
    #[inline]
    #[must_use]
    pub fn variant(name: impl Into<String>, parameter: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameter: Some(parameter.into()),
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn parameter(&self) -> Option<&str> {
        self.parameter.as_deref()
    }

    /// Whether this segment selects a non-default variant
    #[inline]
    #[must_use]
    pub fn is_variant(&self) -> bool {
        self.parameter.is_some()
    }

    /// Case-insensitive match on name and parameter
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        names_match(&self.name, &other.name)
            && match (&self.parameter, &other.parameter) {
                (None, None) => true,
                (Some(a), Some(b)) => names_match(a, b),
                _ => false,
            }
    }
}

impl Display for PathSegment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.parameter {
            Some(parameter) => write!(f, "{}{VARIANT_SEPARATOR}{parameter}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Path to an option or store entry
///
/// # Examples
/// - `Graphics` → the `Graphics` root
/// - `Graphics/Quality` → child `Quality` of `Graphics`
/// - `Graphics/Channel:2` → variant `2` of `Graphics/Channel`
/// - `Channel:2/Volume` → child `Volume` of variant `2` of root `Channel`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct OptionPath(SmallVec<[PathSegment; 4]>);

impl OptionPath {
    /// Create path from segments
    #[inline]
    #[must_use]
    pub fn new(segments: impl IntoIterator<Item = PathSegment>) -> Self {
        Self(segments.into_iter().collect())
    }

    /// Path to a root option
    #[inline]
    #[must_use]
    pub fn root(name: impl Into<String>) -> Self {
        let mut segments = SmallVec::new();
        segments.push(PathSegment::new(name));
        Self(segments)
    }

    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<&PathSegment> {
        self.0.first()
    }

    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&PathSegment> {
        self.0.last()
    }

    /// Path without its last step
    ///
    /// For a variant segment the parent is the default variant
    /// (`A/B:1` → `A/B`), otherwise the enclosing node (`A/B` → `A`).
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let last = self.0.last()?;
        let mut parent = self.clone();
        if last.is_variant() {
            if let Some(seg) = parent.0.last_mut() {
                seg.parameter = None;
            }
        } else {
            parent.0.pop();
            if parent.0.is_empty() {
                return None;
            }
        }
        Some(parent)
    }

    /// Append a child segment, returning new path
    #[inline]
    #[must_use]
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut new = self.clone();
        new.0.push(PathSegment::new(name));
        new
    }

    /// Select a variant of the last segment, returning new path
    ///
    /// # Errors
    /// Returns error if the path is empty or already ends in a variant
    pub fn variant(&self, parameter: impl Into<String>) -> Result<Self, PathError> {
        let mut new = self.clone();
        let last = new.0.last_mut().ok_or(PathError::Empty)?;
        if last.parameter.is_some() {
            return Err(PathError::NestedVariant(self.to_string()));
        }
        last.parameter = Some(parameter.into());
        Ok(new)
    }

    /// Case-insensitive equality
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self.0.len() == other.0.len() && self.0.iter().zip(&other.0).all(|(a, b)| a.matches(b))
    }

    /// Iterator over segments from root to leaf
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &PathSegment> {
        self.0.iter()
    }
}

impl Display for OptionPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "{CHILD_SEPARATOR}")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for OptionPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(PathError::Empty);
        }

        let segments = s
            .split(CHILD_SEPARATOR)
            .map(|piece| {
                let (name, parameter) = match piece.split_once(VARIANT_SEPARATOR) {
                    Some((name, parameter)) => (name, Some(parameter)),
                    None => (piece, None),
                };
                if name.is_empty() {
                    return Err(PathError::EmptySegment(s.to_string()));
                }
                match parameter {
                    None => Ok(PathSegment::new(name)),
                    Some("") => Err(PathError::EmptyParameter(s.to_string())),
                    Some(p) if p.contains(VARIANT_SEPARATOR) => {
                        Err(PathError::NestedVariant(s.to_string()))
                    }
                    Some(p) => Ok(PathSegment::variant(name, p)),
                }
            })
            .collect::<Result<SmallVec<_>, _>>()?;

        Ok(Self(segments))
    }
}

impl From<PathSegment> for OptionPath {
    fn from(segment: PathSegment) -> Self {
        Self::new([segment])
    }
}

/// Errors related to option paths
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Empty path text
    #[error("path is empty")]
    Empty,

    /// Empty name between separators
    #[error("path '{0}' contains an empty segment")]
    EmptySegment(String),

    /// Variant separator with nothing after it
    #[error("path '{0}' contains an empty variant parameter")]
    EmptyParameter(String),

    /// Variant of a variant
    #[error("path '{0}' selects a variant of a variant")]
    NestedVariant(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn path_root() {
        let path = OptionPath::root("Graphics");
        assert_eq!(path.len(), 1);
        assert_eq!(path.to_string(), "Graphics");
    }

    #[test]
    fn path_child_and_variant() {
        let path = OptionPath::root("Graphics")
            .child("Channel")
            .variant("2")
            .unwrap()
            .child("Volume");
        assert_eq!(path.to_string(), "Graphics/Channel:2/Volume");
        assert_eq!(path.segments()[1].parameter(), Some("2"));
    }

    #[test]
    fn path_variant_of_variant_fails() {
        let path: OptionPath = "Channel:1".parse().unwrap();
        assert!(matches!(path.variant("2"), Err(PathError::NestedVariant(_))));
    }

    #[test]
    fn path_parent() {
        let path: OptionPath = "A/B:1".parse().unwrap();
        let parent = path.parent().unwrap();
        assert_eq!(parent.to_string(), "A/B");
        assert_eq!(parent.parent().unwrap().to_string(), "A");
        assert!(OptionPath::root("A").parent().is_none());
    }

    #[test]
    fn path_root_variant_parent_is_root_default() {
        let path: OptionPath = "Channel:3".parse().unwrap();
        assert_eq!(path.parent().unwrap().to_string(), "Channel");
    }

    #[test]
    fn path_from_str_valid() {
        let path: OptionPath = "Root:x/Child/Leaf:7".parse().unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(path.first().unwrap().parameter(), Some("x"));
        assert_eq!(path.last().unwrap().name(), "Leaf");
    }

    #[test]
    fn path_from_str_empty() {
        assert_eq!("".parse::<OptionPath>(), Err(PathError::Empty));
    }

    #[test]
    fn path_from_str_empty_segment() {
        assert!(matches!(
            "a//b".parse::<OptionPath>(),
            Err(PathError::EmptySegment(_))
        ));
        assert!(matches!(
            ":x".parse::<OptionPath>(),
            Err(PathError::EmptySegment(_))
        ));
    }

    #[test]
    fn path_from_str_empty_parameter() {
        assert!(matches!(
            "a/b:".parse::<OptionPath>(),
            Err(PathError::EmptyParameter(_))
        ));
    }

    #[test]
    fn path_from_str_nested_variant() {
        assert!(matches!(
            "a:1:2".parse::<OptionPath>(),
            Err(PathError::NestedVariant(_))
        ));
    }

    #[test]
    fn path_matches_ignores_case() {
        let a: OptionPath = "graphics/CHANNEL:Left".parse().unwrap();
        let b: OptionPath = "Graphics/channel:left".parse().unwrap();
        assert!(a.matches(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn segment_default_does_not_match_variant() {
        assert!(!PathSegment::new("A").matches(&PathSegment::variant("A", "1")));
    }

    #[test]
    fn valid_keys() {
        assert!(is_valid_key("Left"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("a/b"));
        assert!(!is_valid_key("a:b"));
    }

    fn key() -> impl Strategy<Value = String> {
        "[A-Za-z0-9_ .-]{1,8}"
    }

    proptest! {
        #[test]
        fn prop_display_parse_roundtrip(
            segments in proptest::collection::vec((key(), proptest::option::of(key())), 1..6)
        ) {
            let path = OptionPath::new(segments.into_iter().map(|(name, parameter)| {
                match parameter {
                    Some(p) => PathSegment::variant(name, p),
                    None => PathSegment::new(name),
                }
            }));
            let parsed: OptionPath = path.to_string().parse().unwrap();
            prop_assert_eq!(parsed, path);
        }
    }
}
