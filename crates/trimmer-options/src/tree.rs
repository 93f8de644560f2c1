//! Live option tree
//!
//! [`OptionTree`] is an arena of [`OptionNode`]s addressed by [`NodeId`].
//! Structure is owned top-down: a node owns its `children` and, when it is
//! the default variant of a variant-capable option, its `variants`. The
//! `parent` link is a plain id used for lookups only.
//!
//! For children the parent is the enclosing option. For non-default
//! variants the parent is the default variant they hang off, so a variant's
//! path is `parent_path:parameter`.

mod variant;

use crate::error::{IntegrityError, StructuralViolation, TreeError};
use crate::instance::{ApplyInfo, ErasedOption};
use crate::option_type::{Capabilities, NodeConfig, OptionType, Variance};
use crate::registry::{OptionDescriptor, OptionSchema};
use crate::value::LoadOutcome;
use indexmap::IndexMap;
use std::any::Any;
use std::cell::OnceCell;
use std::fmt::{self, Display, Formatter};
use trimmer_store::{names_match, CHILD_SEPARATOR, VARIANT_SEPARATOR};

/// Handle to a node in an [`OptionTree`]
///
/// Ids of removed nodes go stale and never alias a later node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.index, self.generation)
    }
}

/// Lifecycle position of a node
///
/// Construction and configuration happen in one step, so a node is first
/// observed as `Configured`. `Loaded` and `Applied` repeat any number of
/// times once structured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NodeState {
    Configured,
    Structured,
    Loaded,
    Applied,
}

/// One configurable unit
pub struct OptionNode {
    descriptor: OptionDescriptor,
    config: NodeConfig,
    option: Box<dyn ErasedOption>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    parameter: Option<String>,
    is_default_variant: bool,
    /// Folded parameter -> variant, only populated on default variants
    variants: IndexMap<String, NodeId>,
    /// Parameter of the store entry this variant was loaded from or last
    /// saved to; differs from `parameter` after array renumbering
    pub(crate) stored_parameter: Option<String>,
    path: OnceCell<String>,
    state: NodeState,
}

impl OptionNode {
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.descriptor.name()
    }

    #[inline]
    #[must_use]
    pub fn descriptor(&self) -> &OptionDescriptor {
        &self.descriptor
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn variance(&self) -> Variance {
        self.config.variance()
    }

    /// Variant parameter; the default parameter on default variants
    #[inline]
    #[must_use]
    pub fn parameter(&self) -> Option<&str> {
        self.parameter.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn default_parameter(&self) -> Option<&str> {
        self.config.default_parameter()
    }

    #[inline]
    #[must_use]
    pub fn is_default_variant(&self) -> bool {
        self.is_default_variant
    }

    #[inline]
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.config.category()
    }

    #[inline]
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        self.config.capabilities()
    }

    #[inline]
    #[must_use]
    pub fn apply_order(&self) -> i32 {
        self.config.apply_order()
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Direct children, sorted by apply order
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Non-default variants, in insertion (or renumbered) order
    pub fn variants(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.variants.values().copied()
    }

    /// Parameter this variant is stored under, `None` until it is matched to
    /// a store entry
    #[inline]
    #[must_use]
    pub fn stored_parameter(&self) -> Option<&str> {
        self.stored_parameter.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn variant_count(&self) -> usize {
        self.variants.len()
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> NodeState {
        self.state
    }

    #[inline]
    #[must_use]
    pub fn is<T: OptionType>(&self) -> bool {
        self.descriptor.is::<T>()
    }

    /// Parse `input` into the value, falling back to the default
    pub fn load(&mut self, input: &str) -> LoadOutcome {
        let outcome = self.option.load(input);
        self.state = NodeState::Loaded;
        tracing::trace!(option = self.name(), ?outcome, "loaded");
        outcome
    }

    /// Serialized current value
    #[must_use]
    pub fn save(&self) -> String {
        self.option.save()
    }

    /// Serialized default value
    #[must_use]
    pub fn default_value(&self) -> String {
        self.option.default_string()
    }

    /// Typed value, `None` if the node is not a `T`
    #[must_use]
    pub fn value<T: OptionType>(&self) -> Option<&T::Value> {
        if !self.is::<T>() {
            return None;
        }
        self.option.value_any().downcast_ref()
    }

    /// Replace the typed value, `false` if the node is not a `T`
    pub fn set_value<T: OptionType>(&mut self, value: T::Value) -> bool {
        if !self.is::<T>() {
            return false;
        }
        match self.option.value_any_mut().downcast_mut::<T::Value>() {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Whether the current value permits a feature-only build
    #[must_use]
    pub fn allows_feature_only(&self) -> bool {
        self.option.allows_feature_only()
    }
}

impl fmt::Debug for OptionNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionNode")
            .field("name", &self.name())
            .field("parameter", &self.parameter)
            .field("is_default_variant", &self.is_default_variant)
            .field("option", &self.option)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("variants", &self.variants)
            .field("stored_parameter", &self.stored_parameter)
            .field("state", &self.state)
            .finish()
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<OptionNode>,
}

/// Arena holding every node instantiated from an [`OptionSchema`]
#[derive(Debug)]
pub struct OptionTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    roots: Vec<NodeId>,
}

impl OptionTree {
    /// Instantiate every root of `schema` with its children
    ///
    /// Default variants are built here; other variants are added later.
    ///
    /// # Errors
    /// Returns error if an option type declares two children with the same name
    pub fn new(schema: &OptionSchema) -> Result<Self, TreeError> {
        let mut tree = Self {
            slots: Vec::new(),
            free: Vec::new(),
            roots: Vec::with_capacity(schema.len()),
        };
        for descriptor in schema.roots() {
            let id = tree.build_node(*descriptor, None, None)?;
            tree.roots.push(id);
        }
        tracing::debug!(roots = tree.roots.len(), nodes = tree.len(), "option tree built");
        Ok(tree)
    }

    /// Number of live nodes
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&OptionNode> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_ref()
    }

    #[must_use]
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut OptionNode> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_mut()
    }

    pub(crate) fn try_node(&self, id: NodeId) -> Result<&OptionNode, TreeError> {
        self.node(id).ok_or_else(|| id.into())
    }

    pub(crate) fn try_node_mut(&mut self, id: NodeId) -> Result<&mut OptionNode, TreeError> {
        self.node_mut(id).ok_or_else(|| id.into())
    }

    /// Root nodes, in schema order
    #[inline]
    #[must_use]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Lookup root by name (case-insensitive)
    #[must_use]
    pub fn root(&self, name: &str) -> Option<NodeId> {
        self.roots
            .iter()
            .copied()
            .find(|&id| self.node(id).is_some_and(|n| names_match(n.name(), name)))
    }

    /// Direct child by name (case-insensitive)
    ///
    /// Does not recurse and does not look into variants.
    #[must_use]
    pub fn get_child(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.node(id)?
            .children
            .iter()
            .copied()
            .find(|&child| self.node(child).is_some_and(|n| names_match(n.name(), name)))
    }

    /// First direct child of type `T`
    #[must_use]
    pub fn get_child_of<T: OptionType>(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?
            .children
            .iter()
            .copied()
            .find(|&child| self.node(child).is_some_and(OptionNode::is::<T>))
    }

    /// The default variant a node belongs to (itself for default variants)
    #[must_use]
    pub fn default_variant_of(&self, id: NodeId) -> Option<NodeId> {
        let node = self.node(id)?;
        if node.is_default_variant {
            Some(id)
        } else {
            node.parent
        }
    }

    /// Walk parent links up to the root
    #[must_use]
    pub fn root_of(&self, id: NodeId) -> Option<NodeId> {
        let mut current = id;
        loop {
            match self.node(current)?.parent {
                Some(parent) => current = parent,
                None => return Some(current),
            }
        }
    }

    /// Derived path of a node, cached until its parent or parameter changes
    ///
    /// # Errors
    /// Returns error if the node is stale or a non-default variant on the way
    /// up has no parent
    pub fn path(&self, id: NodeId) -> Result<String, TreeError> {
        let node = self.try_node(id)?;
        if let Some(path) = node.path.get() {
            return Ok(path.clone());
        }

        let path = if node.is_default_variant {
            match node.parent {
                Some(parent) => format!("{}{CHILD_SEPARATOR}{}", self.path(parent)?, node.name()),
                None => node.name().to_string(),
            }
        } else {
            let parameter = node.parameter.as_deref().unwrap_or_default();
            let parent = node.parent.ok_or_else(|| IntegrityError::ParentlessVariant {
                option: node.name().to_string(),
                parameter: parameter.to_string(),
            })?;
            format!("{}{VARIANT_SEPARATOR}{parameter}", self.path(parent)?)
        };

        Ok(node.path.get_or_init(|| path).clone())
    }

    /// Clear cached paths of a node, its children and its variants
    pub fn invalidate_path_recursive(&mut self, id: NodeId) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        node.path.take();
        let below: Vec<NodeId> = node.variants().chain(node.children.iter().copied()).collect();
        for next in below {
            self.invalidate_path_recursive(next);
        }
    }

    /// Depth-first subtree: node, then its variants, then its children
    ///
    /// Same order as [`OptionTree::apply`].
    #[must_use]
    pub fn walk(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.walk_into(id, &mut out);
        out
    }

    fn walk_into(&self, id: NodeId, out: &mut Vec<NodeId>) {
        let Some(node) = self.node(id) else {
            return;
        };
        out.push(id);
        for variant in node.variants() {
            self.walk_into(variant, out);
        }
        for &child in &node.children {
            self.walk_into(child, out);
        }
    }

    /// Every live node, roots first, each root followed by its subtree
    #[must_use]
    pub fn walk_all(&self) -> Vec<NodeId> {
        self.roots.iter().flat_map(|&root| self.walk(root)).collect()
    }

    /// Load a node from text
    ///
    /// # Errors
    /// Returns error if the node is stale
    pub fn load(&mut self, id: NodeId, input: &str) -> Result<LoadOutcome, TreeError> {
        Ok(self.try_node_mut(id)?.load(input))
    }

    /// Serialized value of a node
    ///
    /// # Errors
    /// Returns error if the node is stale
    pub fn save(&self, id: NodeId) -> Result<String, TreeError> {
        Ok(self.try_node(id)?.save())
    }

    /// Typed value of a node, `None` if stale or not a `T`
    #[must_use]
    pub fn value<T: OptionType>(&self, id: NodeId) -> Option<&T::Value> {
        self.node(id)?.value::<T>()
    }

    /// Replace the typed value of a node, `false` if stale or not a `T`
    pub fn set_value<T: OptionType>(&mut self, id: NodeId, value: T::Value) -> bool {
        self.node_mut(id).is_some_and(|node| node.set_value::<T>(value))
    }

    /// Apply a node, then all its variants, then all its children
    ///
    /// `env` is handed to every [`OptionType::apply`] hook, which downcasts
    /// it to the host environment it expects.
    ///
    /// # Errors
    /// Returns error if the subtree is inconsistent
    pub fn apply(&mut self, id: NodeId, env: &mut dyn Any) -> Result<(), TreeError> {
        for next in self.walk(id) {
            let path = self.path(next)?;
            let node = self.try_node(next)?;
            tracing::trace!(%path, "apply");
            node.option.apply(
                ApplyInfo {
                    path: &path,
                    parameter: node.parameter.as_deref(),
                    is_default_variant: node.is_default_variant,
                },
                env,
            );
            self.try_node_mut(next)?.state = NodeState::Applied;
        }
        Ok(())
    }

    /// Apply the whole tree a node belongs to, starting at its root
    ///
    /// # Errors
    /// Returns error if the node is stale or the tree inconsistent
    pub fn apply_from_root(&mut self, id: NodeId, env: &mut dyn Any) -> Result<(), TreeError> {
        let root = self.root_of(id).ok_or(id)?;
        self.apply(root, env)
    }

    /// Apply every root in schema order
    ///
    /// # Errors
    /// Returns error if the tree is inconsistent
    pub fn apply_all(&mut self, env: &mut dyn Any) -> Result<(), TreeError> {
        for root in self.roots.clone() {
            self.apply(root, env)?;
        }
        Ok(())
    }

    fn insert(&mut self, node: OptionNode) -> NodeId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        #[allow(clippy::cast_possible_truncation)]
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            index,
            generation: 0,
        }
    }

    /// Drop a node with its children and variants
    fn free_subtree(&mut self, id: NodeId) {
        for next in self.walk(id) {
            if let Some(slot) = self.slots.get_mut(next.index as usize) {
                slot.node = None;
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(next.index);
            }
        }
    }

    /// Construct, configure and attach children of one node
    ///
    /// `parameter` is `Some` only for non-default variants.
    fn build_node(
        &mut self,
        descriptor: OptionDescriptor,
        parent: Option<NodeId>,
        parameter: Option<String>,
    ) -> Result<NodeId, TreeError> {
        let (option, config) = descriptor.instantiate();
        let is_default_variant = parameter.is_none();
        let parameter = parameter.or_else(|| config.default_parameter().map(str::to_string));
        let id = self.insert(OptionNode {
            descriptor,
            config,
            option,
            parent,
            children: Vec::new(),
            parameter,
            is_default_variant,
            variants: IndexMap::new(),
            stored_parameter: None,
            path: OnceCell::new(),
            state: NodeState::Configured,
        });

        let declared = descriptor.children();
        let mut children = Vec::with_capacity(declared.len());
        for (i, child) in declared.iter().enumerate() {
            if declared[..i].iter().any(|d| names_match(d.name(), child.name())) {
                return Err(StructuralViolation::DuplicateName {
                    parent: descriptor.name().to_string(),
                    name: child.name().to_string(),
                }
                .into());
            }
            children.push(self.build_node(*child, Some(id), None)?);
        }
        children.sort_by_key(|&child| self.node(child).map_or(0, OptionNode::apply_order));

        let node = self.try_node_mut(id)?;
        node.children = children;
        node.state = NodeState::Structured;
        Ok(id)
    }
}
