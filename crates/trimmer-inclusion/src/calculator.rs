//! Inclusion calculation
//!
//! Rules, in order, for one root option and one build target:
//! 1. An option unavailable for the target is removed outright.
//! 2. The feature flag needs [`Capabilities::HAS_ASSOCIATED_FEATURE`] and a
//!    requested feature.
//! 3. The option flag needs [`Capabilities::CAN_INCLUDE_OPTION`] and a
//!    requested option.
//! 4. A feature-only result may be vetoed by the option, downgrading it to
//!    removal.
//!
//! Children and variants inherit the result of their root.

use crate::choices::InclusionChoices;
use crate::inclusion::{Inclusion, InclusionRequest};
use indexmap::IndexMap;
use trimmer_options::{BuildTarget, Capabilities, NodeId, OptionTree};
use trimmer_store::names_match;

/// Computes inclusion for the roots of one tree under one set of choices
#[derive(Debug, Clone, Copy)]
pub struct InclusionCalculator<'a> {
    tree: &'a OptionTree,
    choices: &'a InclusionChoices,
}

impl<'a> InclusionCalculator<'a> {
    #[inline]
    #[must_use]
    pub fn new(tree: &'a OptionTree, choices: &'a InclusionChoices) -> Self {
        Self { tree, choices }
    }

    /// Inclusion of the root `node` belongs to, `None` if the node is stale
    #[must_use]
    pub fn compute(&self, node: NodeId, target: &BuildTarget) -> Option<Inclusion> {
        let root = self.tree.root_of(node)?;
        let root = self.tree.node(root)?;

        if !root.descriptor().is_available(target) {
            tracing::trace!(option = root.name(), %target, "unavailable for target");
            return Some(Inclusion::Remove);
        }

        let capabilities = root.capabilities();
        let request = self.choices.request_for(root.name());
        let feature = capabilities.contains(Capabilities::HAS_ASSOCIATED_FEATURE)
            && request.contains(InclusionRequest::FEATURE);
        let option = capabilities.contains(Capabilities::CAN_INCLUDE_OPTION)
            && request.contains(InclusionRequest::OPTION);

        let inclusion = match Inclusion::from_flags(feature, option) {
            Inclusion::FeatureOnly if !root.allows_feature_only() => {
                tracing::debug!(option = root.name(), %target, "feature-only inclusion vetoed");
                Inclusion::Remove
            }
            inclusion => inclusion,
        };
        tracing::trace!(option = root.name(), %target, %inclusion, "inclusion computed");
        Some(inclusion)
    }

    /// Compute every root once
    #[must_use]
    pub fn plan(&self, target: &BuildTarget) -> InclusionPlan {
        let mut roots = IndexMap::with_capacity(self.tree.roots().len());
        for &root in self.tree.roots() {
            let (Some(node), Some(inclusion)) = (self.tree.node(root), self.compute(root, target))
            else {
                continue;
            };
            roots.insert(
                root,
                PlannedRoot {
                    name: node.name(),
                    inclusion,
                    capabilities: node.capabilities(),
                },
            );
        }
        tracing::debug!(%target, roots = roots.len(), "inclusion plan computed");
        InclusionPlan {
            target: target.clone(),
            roots,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PlannedRoot {
    name: &'static str,
    inclusion: Inclusion,
    capabilities: Capabilities,
}

/// Inclusion of every root of a tree for one build target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InclusionPlan {
    target: BuildTarget,
    roots: IndexMap<NodeId, PlannedRoot>,
}

impl InclusionPlan {
    #[inline]
    #[must_use]
    pub fn target(&self) -> &BuildTarget {
        &self.target
    }

    /// Result for a root node
    #[must_use]
    pub fn get(&self, root: NodeId) -> Option<Inclusion> {
        self.roots.get(&root).map(|r| r.inclusion)
    }

    /// Result for a root, by name (case-insensitive)
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<Inclusion> {
        self.roots
            .values()
            .find(|r| names_match(r.name, name))
            .map(|r| r.inclusion)
    }

    /// Result for any node: children and variants inherit from their root
    #[must_use]
    pub fn inclusion_of(&self, tree: &OptionTree, node: NodeId) -> Option<Inclusion> {
        self.get(tree.root_of(node)?)
    }

    /// Roots and results, in tree order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, Inclusion)> + '_ {
        self.roots.iter().map(|(&id, r)| (id, r.inclusion))
    }

    /// Roots that are not removed
    #[must_use]
    pub fn included(&self) -> Vec<NodeId> {
        self.filter(|_| true)
    }

    /// Included roots that configure the build
    #[must_use]
    pub fn configures_build(&self) -> Vec<NodeId> {
        self.filter(|caps| caps.contains(Capabilities::CONFIGURES_BUILD))
    }

    /// Included roots usable while playing live
    #[must_use]
    pub fn plays_live(&self) -> Vec<NodeId> {
        self.filter(|caps| caps.contains(Capabilities::CAN_PLAY_LIVE))
    }

    /// Included roots applied outside of play mode
    #[must_use]
    pub fn executes_outside_play(&self) -> Vec<NodeId> {
        self.filter(|caps| caps.contains(Capabilities::EXECUTE_OUTSIDE_PLAY))
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    fn filter(&self, keep: impl Fn(Capabilities) -> bool) -> Vec<NodeId> {
        self.roots
            .iter()
            .filter(|(_, r)| !r.inclusion.is_removed() && keep(r.capabilities))
            .map(|(&id, _)| id)
            .collect()
    }
}
