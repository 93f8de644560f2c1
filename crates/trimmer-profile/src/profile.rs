//! Profiles
//!
//! A [`Profile`] owns a [`ValueStore`] and the inclusion choices for one
//! build configuration. Trees are instantiated from it, edited through it and
//! thrown away; the store outlives them. Every entry point takes the tree
//! explicitly, there is no ambient "current" profile.

use crate::config::ProfileConfig;
use crate::error::{ProfileError, Result};
use serde::{Deserialize, Serialize};
use std::any::Any;
use trimmer_inclusion::{InclusionCalculator, InclusionChoices, InclusionPlan};
use trimmer_options::{
    BuildTarget, LoadOutcome, LoadSummary, NodeId, OptionSchema, OptionTree, PathResolver,
};
use trimmer_store::{OptionPath, ValueStore};

/// Named store plus inclusion choices
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    name: String,
    #[serde(default)]
    store: ValueStore,
    #[serde(default)]
    choices: InclusionChoices,
    #[serde(default)]
    config: ProfileConfig,
}

impl Profile {
    /// Create empty profile
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Create profile around an existing store
    #[must_use]
    pub fn with_store(name: impl Into<String>, store: ValueStore) -> Self {
        Self {
            name: name.into(),
            store,
            ..Self::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn with_config(mut self, config: ProfileConfig) -> Self {
        self.config = config;
        self
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn store(&self) -> &ValueStore {
        &self.store
    }

    #[inline]
    pub fn store_mut(&mut self) -> &mut ValueStore {
        &mut self.store
    }

    #[inline]
    #[must_use]
    pub fn choices(&self) -> &InclusionChoices {
        &self.choices
    }

    #[inline]
    pub fn choices_mut(&mut self) -> &mut InclusionChoices {
        &mut self.choices
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &ProfileConfig {
        &self.config
    }

    /// Build a fresh tree for `schema` and load it from the store
    ///
    /// # Errors
    /// Returns error if the schema or the hydrated variants violate tree
    /// invariants
    pub fn instantiate(&self, schema: &OptionSchema) -> Result<OptionTree> {
        let (tree, _) = self.instantiate_with_summary(schema)?;
        Ok(tree)
    }

    /// [`Profile::instantiate`], also reporting what the load did
    ///
    /// # Errors
    /// Same as [`Profile::instantiate`]
    pub fn instantiate_with_summary(
        &self,
        schema: &OptionSchema,
    ) -> Result<(OptionTree, LoadSummary)> {
        let mut tree = OptionTree::new(schema)?;
        let summary = tree.load_from_store(&self.store, self.config.sync_options())?;
        tracing::debug!(profile = %self.name, nodes = tree.len(), "tree instantiated");
        Ok((tree, summary))
    }

    /// Resolve a path to a node
    ///
    /// # Errors
    /// Returns error if the path is malformed or names no option
    pub fn resolve(&self, tree: &OptionTree, path: &str) -> Result<NodeId> {
        let parsed: OptionPath = path.parse()?;
        PathResolver::new(tree)
            .resolve(&parsed)
            .ok_or_else(|| ProfileError::NoSuchOption(path.to_string()))
    }

    /// Current value of the option at `path`
    ///
    /// # Errors
    /// Returns error if the path names no option
    pub fn get(&self, tree: &OptionTree, path: &str) -> Result<String> {
        let id = self.resolve(tree, path)?;
        Ok(tree.save(id)?)
    }

    /// Edit the option at `path`
    ///
    /// Loads `value` into the node, saves it back to the store (marking the
    /// entry dirty when it changed) and, with `apply_on_edit`, applies the
    /// node's whole tree against `env`.
    ///
    /// # Errors
    /// Returns error if the path names no option or applying fails
    pub fn set(
        &mut self,
        tree: &mut OptionTree,
        path: &str,
        value: &str,
        env: &mut dyn Any,
    ) -> Result<LoadOutcome> {
        let id = self.resolve(tree, path)?;
        let outcome = tree.load(id, value)?;
        let changed = tree.save_node_to_store(id, &mut self.store)?;
        tracing::debug!(profile = %self.name, path, ?outcome, changed, "option edited");
        if self.config.apply_on_edit {
            tree.apply_from_root(id, env)?;
        }
        Ok(outcome)
    }

    /// Run one console line: `path = value` sets, a bare `path` queries
    ///
    /// Returns the option's value after the line ran.
    ///
    /// # Errors
    /// Returns error if the path names no option or applying fails
    pub fn execute(
        &mut self,
        tree: &mut OptionTree,
        line: &str,
        env: &mut dyn Any,
    ) -> Result<String> {
        match line.split_once('=') {
            Some((path, value)) => {
                let path = path.trim();
                self.set(tree, path, value.trim(), env)?;
                self.get(tree, path)
            }
            None => self.get(tree, line.trim()),
        }
    }

    /// Completion candidates for a partial path
    #[must_use]
    pub fn complete(&self, tree: &OptionTree, prefix: &str) -> Vec<String> {
        PathResolver::new(tree).complete(prefix)
    }

    /// Write the whole tree into the store
    ///
    /// The tree records where each variant now lives in the store.
    ///
    /// # Errors
    /// Returns error if the tree is inconsistent
    pub fn save(&mut self, tree: &mut OptionTree) -> Result<()> {
        tree.save_to_store(&mut self.store, self.config.sync_options())?;
        Ok(())
    }

    /// Whether the store changed, optionally clearing the flags
    pub fn is_dirty(&mut self, reset_if_dirty: bool) -> bool {
        self.store.is_dirty(reset_if_dirty)
    }

    /// Independent deep copy, e.g. to queue a build while editing goes on
    #[must_use]
    pub fn working_copy(&self) -> Self {
        self.clone()
    }

    /// Inclusion of every root of `tree` for `target`
    #[must_use]
    pub fn inclusion_plan(&self, tree: &OptionTree, target: &BuildTarget) -> InclusionPlan {
        InclusionCalculator::new(tree, &self.choices).plan(target)
    }

    /// [`Profile::inclusion_plan`] for the configured default target
    ///
    /// # Errors
    /// Returns error if no default target is configured
    pub fn inclusion_plan_default(&self, tree: &OptionTree) -> Result<InclusionPlan> {
        let target = self.config.default_target.as_ref().ok_or(ProfileError::NoTarget)?;
        Ok(self.inclusion_plan(tree, target))
    }
}
