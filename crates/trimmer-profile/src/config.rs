//! Profile configuration

use crate::error::Result;
use serde::{Deserialize, Serialize};
use trimmer_options::{BuildTarget, SyncOptions};

/// How a profile reconciles its tree and store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Apply the edited option's tree after every [`crate::Profile::set`]
    pub apply_on_edit: bool,
    /// Create variants for stored parameters when instantiating a tree
    pub hydrate_variants: bool,
    /// Drop stored variants the tree no longer has when saving
    pub prune_removed_variants: bool,
    /// Target used when none is given explicitly
    pub default_target: Option<BuildTarget>,
}

impl ProfileConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn with_apply_on_edit(mut self, apply: bool) -> Self {
        self.apply_on_edit = apply;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_hydrate_variants(mut self, hydrate: bool) -> Self {
        self.hydrate_variants = hydrate;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_prune_removed_variants(mut self, prune: bool) -> Self {
        self.prune_removed_variants = prune;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_default_target(mut self, target: impl Into<BuildTarget>) -> Self {
        self.default_target = Some(target.into());
        self
    }

    /// Reconciliation switches for tree ⇄ store sync
    #[inline]
    #[must_use]
    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            hydrate_variants: self.hydrate_variants,
            prune_removed_variants: self.prune_removed_variants,
        }
    }

    /// Parse from TOML; missing keys keep their defaults
    ///
    /// # Errors
    /// Returns error if the text is not valid TOML for this config
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Parse from YAML; missing keys keep their defaults
    ///
    /// # Errors
    /// Returns error if the text is not valid YAML for this config
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Render as TOML
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            apply_on_edit: true,
            hydrate_variants: true,
            prune_removed_variants: true,
            default_target: None,
        }
    }
}
