//! Tree ⇄ store reconciliation
//!
//! Loading feeds every node the value stored at its own path; a missing
//! entry means the default value and nothing is written back. Saving writes
//! every node's value into the store. Store entries no node claims are left
//! alone in both directions.

use crate::natural::natural_cmp;
use crate::option_type::Variance;
use crate::tree::{NodeId, OptionTree};
use crate::value::LoadOutcome;
use crate::TreeError;
use std::collections::HashSet;
use trimmer_store::{
    fold_case, is_valid_key, names_match, OptionPath, PathSegment, StoreNode, ValueStore,
};

/// Reconciliation switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Create tree variants for every stored parameter on load
    pub hydrate_variants: bool,
    /// Drop stored variant entries the tree no longer has on save
    pub prune_removed_variants: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            hydrate_variants: true,
            prune_removed_variants: true,
        }
    }
}

/// What a load did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Nodes whose stored text parsed
    pub parsed: usize,
    /// Nodes left at (or reset to) their default value
    pub defaulted: usize,
    /// Variants created from stored parameters
    pub hydrated: usize,
}

impl LoadSummary {
    fn record(&mut self, outcome: LoadOutcome) {
        match outcome {
            LoadOutcome::Parsed => self.parsed += 1,
            LoadOutcome::Defaulted => self.defaulted += 1,
        }
    }
}

impl OptionTree {
    /// Load every node from `store`
    ///
    /// Variants remember the stored parameter they were loaded from, so
    /// loading the same store again into an already renumbered tree matches
    /// every entry to the same variant and hydrates nothing twice.
    ///
    /// # Errors
    /// Returns error if variant hydration violates tree invariants
    pub fn load_from_store(
        &mut self,
        store: &ValueStore,
        options: SyncOptions,
    ) -> Result<LoadSummary, TreeError> {
        let mut summary = LoadSummary::default();
        for root in self.roots().to_vec() {
            self.load_option(root, Some(store.root()), options, &mut summary)?;
        }
        tracing::debug!(
            parsed = summary.parsed,
            defaulted = summary.defaulted,
            hydrated = summary.hydrated,
            "tree loaded from store"
        );
        Ok(summary)
    }

    /// Write every node into `store`
    ///
    /// Entries of renumbered variants move to the variant's current
    /// parameter together with their subtree before values are written.
    /// Only entries whose value changes are marked dirty.
    ///
    /// # Errors
    /// Returns error if the tree is inconsistent
    pub fn save_to_store(
        &mut self,
        store: &mut ValueStore,
        options: SyncOptions,
    ) -> Result<(), TreeError> {
        for root in self.roots().to_vec() {
            self.save_option(root, store.root_mut(), options)?;
        }
        Ok(())
    }

    /// Load a single node (not its subtree) from the entry it is stored at
    ///
    /// # Errors
    /// Returns error if the node is stale or its path cannot be derived
    pub fn load_node_from_store(
        &mut self,
        id: NodeId,
        store: &ValueStore,
    ) -> Result<LoadOutcome, TreeError> {
        let path = self.store_path(id)?;
        let value = store.get_node(&path).map_or("", StoreNode::value);
        self.load(id, value)
    }

    /// Save a single node (not its subtree) to the entry at its path
    ///
    /// Renumbered variants on the way are moved to their current parameter
    /// first, so the edited value never lands in another variant's entry.
    /// Returns whether the store changed.
    ///
    /// # Errors
    /// Returns error if the node is stale or its path cannot be derived
    pub fn save_node_to_store(
        &mut self,
        id: NodeId,
        store: &mut ValueStore,
    ) -> Result<bool, TreeError> {
        let value = self.save(id)?;
        let lineage = self.lineage(id)?;
        let mut changed = false;
        let mut entry = store.root_mut();
        let mut steps = lineage.iter().copied().peekable();
        while let Some(step) = steps.next() {
            let name = self.try_node(step)?.name();
            let segment = match steps.next_if(|&next| self.is_variant(next)) {
                Some(variant) => {
                    changed |= self.relocate_variants(step, entry)?;
                    let parameter = self.try_node(variant)?.parameter().unwrap_or_default();
                    PathSegment::variant(name, parameter)
                }
                None => PathSegment::new(name),
            };
            entry = entry.get_or_create_entry(&segment);
        }
        Ok(entry.set_value(value) || changed)
    }

    /// Ids from the root down to `id`, a variant following its default
    fn lineage(&self, id: NodeId) -> Result<Vec<NodeId>, TreeError> {
        let mut lineage = vec![id];
        let mut current = id;
        while let Some(parent) = self.try_node(current)?.parent() {
            lineage.push(parent);
            current = parent;
        }
        lineage.reverse();
        Ok(lineage)
    }

    fn is_variant(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(|node| !node.is_default_variant())
    }

    /// Store address of a node, following stored variant parameters
    ///
    /// Default variants are stored without a parameter.
    fn store_path(&self, id: NodeId) -> Result<OptionPath, TreeError> {
        let lineage = self.lineage(id)?;
        let mut segments = Vec::with_capacity(lineage.len());
        let mut steps = lineage.iter().copied().peekable();
        while let Some(step) = steps.next() {
            let name = self.try_node(step)?.name();
            segments.push(match steps.next_if(|&next| self.is_variant(next)) {
                Some(variant) => {
                    let variant = self.try_node(variant)?;
                    let parameter = variant
                        .stored_parameter()
                        .or_else(|| variant.parameter())
                        .unwrap_or_default();
                    PathSegment::variant(name, parameter)
                }
                None => PathSegment::new(name),
            });
        }
        Ok(OptionPath::new(segments))
    }

    /// Store parameter of every variant of `host`
    ///
    /// A variant matched to a store entry keeps that entry's parameter. Any
    /// other variant uses its own parameter unless a matched variant claims
    /// it, in which case it has no entry yet.
    fn variant_store_keys(&self, host: NodeId) -> Result<Vec<(NodeId, Option<String>)>, TreeError> {
        let variants: Vec<NodeId> = self.try_node(host)?.variants().collect();
        let mut claimed = HashSet::new();
        for &variant in &variants {
            if let Some(stored) = self.try_node(variant)?.stored_parameter() {
                claimed.insert(fold_case(stored));
            }
        }

        let mut keys = Vec::with_capacity(variants.len());
        for variant in variants {
            let node = self.try_node(variant)?;
            let key = match node.stored_parameter() {
                Some(stored) => Some(stored.to_string()),
                None => node
                    .parameter()
                    .filter(|p| !claimed.contains(&fold_case(p)))
                    .map(str::to_string),
            };
            keys.push((variant, key));
        }
        Ok(keys)
    }

    /// Move the entries of renumbered variants of `host` inside `container`
    /// to their current parameter
    ///
    /// Returns whether any entry moved.
    fn relocate_variants(
        &mut self,
        host: NodeId,
        container: &mut StoreNode,
    ) -> Result<bool, TreeError> {
        let name = self.try_node(host)?.name();
        let mut moves = Vec::new();
        for (variant, key) in self.variant_store_keys(host)? {
            let node = self.try_node_mut(variant)?;
            let parameter = node.parameter().unwrap_or_default().to_string();
            if let Some(key) = key.filter(|key| !names_match(key, &parameter)) {
                node.stored_parameter = Some(parameter.clone());
                moves.push((key, parameter));
            }
        }
        if moves.is_empty() {
            return Ok(false);
        }
        let moved = container.move_variants(name, &moves);
        tracing::debug!(option = name, moved, "renumbered variant entries relocated");
        Ok(moved > 0)
    }

    /// Load a default variant (or single) node and its variants from the
    /// entries named after it inside `container`
    fn load_option(
        &mut self,
        id: NodeId,
        container: Option<&StoreNode>,
        options: SyncOptions,
        summary: &mut LoadSummary,
    ) -> Result<(), TreeError> {
        let node = self.try_node(id)?;
        let name = node.name();
        let has_variants = node.variance().has_variants();
        let is_array = node.variance() == Variance::Array;
        let default_parameter = node.default_parameter().map(str::to_string);

        self.load_subtree(id, container.and_then(|c| c.child(name)), options, summary)?;
        if !has_variants {
            return Ok(());
        }

        if let (true, Some(container)) = (options.hydrate_variants, container) {
            let claimed: HashSet<String> = self
                .variant_store_keys(id)?
                .into_iter()
                .filter_map(|(_, key)| key.map(|key| fold_case(&key)))
                .collect();
            let mut seen = HashSet::new();
            let mut missing: Vec<&str> = container
                .variant_parameters(name)
                .into_iter()
                .filter(|p| is_valid_key(p))
                .filter(|p| !default_parameter.as_deref().is_some_and(|d| names_match(d, p)))
                .filter(|p| !claimed.contains(&fold_case(p)))
                .filter(|p| seen.insert(fold_case(p)))
                .collect();
            if is_array {
                missing.sort_by(|a, b| natural_cmp(a, b));
            }
            let added = self.add_variants(id, &missing)?;
            summary.hydrated += added.len();
            for (variant, stored) in added.into_iter().zip(missing) {
                self.try_node_mut(variant)?.stored_parameter = Some(stored.to_string());
            }
        }

        for (variant, key) in self.variant_store_keys(id)? {
            let entry = key
                .as_deref()
                .and_then(|key| container.and_then(|c| c.variant(name, key)));
            self.try_node_mut(variant)?.stored_parameter = entry.and(key);
            self.load_subtree(variant, entry, options, summary)?;
        }
        Ok(())
    }

    fn load_subtree(
        &mut self,
        id: NodeId,
        entry: Option<&StoreNode>,
        options: SyncOptions,
        summary: &mut LoadSummary,
    ) -> Result<(), TreeError> {
        let outcome = self.load(id, entry.map_or("", StoreNode::value))?;
        summary.record(outcome);
        for child in self.try_node(id)?.children().to_vec() {
            self.load_option(child, entry, options, summary)?;
        }
        Ok(())
    }

    fn save_option(
        &mut self,
        id: NodeId,
        container: &mut StoreNode,
        options: SyncOptions,
    ) -> Result<(), TreeError> {
        let node = self.try_node(id)?;
        let name = node.name();
        let has_variants = node.variance().has_variants();
        self.save_subtree(id, container.get_or_create_entry(&PathSegment::new(name)), options)?;
        if !has_variants {
            return Ok(());
        }

        self.relocate_variants(id, container)?;
        let mut kept = HashSet::new();
        for variant in self.try_node(id)?.variants().collect::<Vec<_>>() {
            let parameter = self.try_node(variant)?.parameter().unwrap_or_default().to_string();
            kept.insert(fold_case(&parameter));
            let entry = container.get_or_create_entry(&PathSegment::variant(name, &parameter));
            self.save_subtree(variant, entry, options)?;
            self.try_node_mut(variant)?.stored_parameter = Some(parameter);
        }

        if options.prune_removed_variants {
            let removed = container.retain_variants(name, |p| kept.contains(&fold_case(p)));
            if removed > 0 {
                tracing::debug!(option = name, removed, "stale variant entries pruned");
            }
        }
        Ok(())
    }

    fn save_subtree(
        &mut self,
        id: NodeId,
        entry: &mut StoreNode,
        options: SyncOptions,
    ) -> Result<(), TreeError> {
        let node = self.try_node(id)?;
        entry.set_value(node.save());
        for child in node.children().to_vec() {
            self.save_option(child, entry, options)?;
        }
        Ok(())
    }
}
