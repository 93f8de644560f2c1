//! Per-profile inclusion choices

use crate::inclusion::InclusionRequest;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use trimmer_store::names_match;

/// Requested inclusion per root option name
///
/// Names match case-insensitively. Roots without a recorded choice use
/// [`InclusionChoices::default_request`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InclusionChoices {
    #[serde(default)]
    default_request: InclusionRequest,
    #[serde(default)]
    choices: IndexMap<String, InclusionRequest>,
}

impl InclusionChoices {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Choices where unlisted roots request `request`
    #[inline]
    #[must_use]
    pub fn with_default_request(mut self, request: InclusionRequest) -> Self {
        self.default_request = request;
        self
    }

    #[inline]
    #[must_use]
    pub fn default_request(&self) -> InclusionRequest {
        self.default_request
    }

    /// Record a choice, replacing any previous one for the same name
    pub fn set(&mut self, root: &str, request: InclusionRequest) {
        match self.choices.iter_mut().find(|(name, _)| names_match(name, root)) {
            Some((_, existing)) => *existing = request,
            None => {
                self.choices.insert(root.to_string(), request);
            }
        }
    }

    /// Recorded choice only
    #[must_use]
    pub fn get(&self, root: &str) -> Option<InclusionRequest> {
        self.choices
            .iter()
            .find(|(name, _)| names_match(name, root))
            .map(|(_, &request)| request)
    }

    /// Recorded choice, or the default request
    #[must_use]
    pub fn request_for(&self, root: &str) -> InclusionRequest {
        self.get(root).unwrap_or(self.default_request)
    }

    /// Forget a choice, returning it
    pub fn remove(&mut self, root: &str) -> Option<InclusionRequest> {
        let index = self.choices.keys().position(|name| names_match(name, root))?;
        self.choices.shift_remove_index(index).map(|(_, request)| request)
    }

    /// Recorded choices, in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, InclusionRequest)> {
        self.choices.iter().map(|(name, &request)| (name.as_str(), request))
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.choices.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }
}
