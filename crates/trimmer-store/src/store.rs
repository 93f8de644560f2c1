//! Persistent value store
//!
//! [`ValueStore`] keeps option values as a tree of [`StoreNode`]s addressed by
//! name and, for variants, by parameter. Its shape is independent of any live
//! option tree: it may hold entries no option claims anymore and may lack
//! entries a newer schema expects. Both are valid states.
//!
//! Variants of one option are stored as sibling entries sharing a name: the
//! default variant has no parameter, every other variant carries its
//! parameter.

use crate::path::{fold_case, names_match, OptionPath, PathError, PathSegment};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One entry in the value store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PersistedNode", into = "PersistedNode")]
pub struct StoreNode {
    name: String,
    parameter: Option<String>,
    value: String,
    dirty: bool,
    /// Folded name -> entries with that name (default first, then variants)
    children: IndexMap<String, Vec<StoreNode>>,
}

impl StoreNode {
    /// Create plain entry
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Create variant entry
    #[inline]
    #[must_use]
    pub fn with_parameter(name: impl Into<String>, parameter: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameter: Some(parameter.into()),
            ..Self::default()
        }
    }

    fn from_segment(segment: &PathSegment) -> Self {
        match segment.parameter() {
            Some(parameter) => Self::with_parameter(segment.name(), parameter),
            None => Self::new(segment.name()),
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

    #[inline]
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The path segment addressing this entry from its parent
    #[must_use]
    pub fn segment(&self) -> PathSegment {
        match &self.parameter {
            Some(parameter) => PathSegment::variant(&self.name, parameter),
            None => PathSegment::new(&self.name),
        }
    }

    /// Set the value, marking only this entry dirty
    ///
    /// Returns `false` (and leaves the dirty flag alone) when the value is
    /// unchanged.
    pub fn set_value(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        if self.value == value {
            return false;
        }
        self.value = value;
        self.dirty = true;
        true
    }

    /// Lookup a direct entry by name and optional parameter
    #[must_use]
    pub fn entry(&self, segment: &PathSegment) -> Option<&StoreNode> {
        self.children
            .get(&fold_case(segment.name()))?
            .iter()
            .find(|node| node.matches(segment))
    }

    /// Mutable variant of [`StoreNode::entry`]
    #[must_use]
    pub fn entry_mut(&mut self, segment: &PathSegment) -> Option<&mut StoreNode> {
        self.children
            .get_mut(&fold_case(segment.name()))?
            .iter_mut()
            .find(|node| node.matches(segment))
    }

    /// Lookup the parameterless entry with the given name
    #[inline]
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&StoreNode> {
        self.entry(&PathSegment::new(name))
    }

    /// Lookup the variant entry with the given name and parameter
    #[inline]
    #[must_use]
    pub fn variant(&self, name: &str, parameter: &str) -> Option<&StoreNode> {
        self.entry(&PathSegment::variant(name, parameter))
    }

    /// Walk to a direct entry, creating it when missing
    pub fn get_or_create_entry(&mut self, segment: &PathSegment) -> &mut StoreNode {
        let entries = self.children.entry(fold_case(segment.name())).or_default();
        let index = match entries.iter().position(|node| node.matches(segment)) {
            Some(index) => index,
            None if segment.is_variant() => {
                entries.push(StoreNode::from_segment(segment));
                entries.len() - 1
            }
            None => {
                entries.insert(0, StoreNode::from_segment(segment));
                0
            }
        };
        &mut entries[index]
    }

    /// All entries sharing a name, default first
    #[must_use]
    pub fn entries(&self, name: &str) -> &[StoreNode] {
        self.children
            .get(&fold_case(name))
            .map_or(&[][..], Vec::as_slice)
    }

    /// Variant entries for a name
    pub fn variants<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a StoreNode> + 'a {
        self.entries(name)
            .iter()
            .filter(|node| node.parameter.is_some())
    }

    /// Parameters of the variant entries for a name, in stored order
    #[must_use]
    pub fn variant_parameters(&self, name: &str) -> Vec<&str> {
        self.variants(name).filter_map(StoreNode::parameter).collect()
    }

    /// Iterate over all direct entries
    pub fn children(&self) -> impl Iterator<Item = &StoreNode> {
        self.children.values().flatten()
    }

    /// Number of direct entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.values().map(Vec::len).sum()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Remove a direct entry, marking this entry dirty
    pub fn remove_entry(&mut self, segment: &PathSegment) -> Option<StoreNode> {
        let key = fold_case(segment.name());
        let entries = self.children.get_mut(&key)?;
        let index = entries.iter().position(|node| node.matches(segment))?;
        let removed = entries.remove(index);
        if entries.is_empty() {
            self.children.shift_remove(&key);
        }
        self.dirty = true;
        Some(removed)
    }

    /// Drop variant entries of `name` whose parameter fails `keep`
    ///
    /// Returns the number of removed entries.
    pub fn retain_variants(&mut self, name: &str, mut keep: impl FnMut(&str) -> bool) -> usize {
        let key = fold_case(name);
        let Some(entries) = self.children.get_mut(&key) else {
            return 0;
        };
        let before = entries.len();
        entries.retain(|node| node.parameter.as_deref().map_or(true, &mut keep));
        let removed = before - entries.len();
        if entries.is_empty() {
            self.children.shift_remove(&key);
        }
        if removed > 0 {
            self.dirty = true;
        }
        removed
    }

    /// Re-key variant entries of `name`, each `(from, to)` pair at once
    ///
    /// Entries keep their value and whole subtree. All sources are detached
    /// before any is re-inserted, so swapped or shifted parameters never
    /// collide; an entry already sitting at a target parameter is replaced.
    /// Returns the number of moved entries.
    pub fn move_variants<F, T>(&mut self, name: &str, moves: &[(F, T)]) -> usize
    where
        F: AsRef<str>,
        T: AsRef<str>,
    {
        let mut detached = Vec::with_capacity(moves.len());
        for (from, to) in moves {
            let (from, to) = (from.as_ref(), to.as_ref());
            if names_match(from, to) {
                continue;
            }
            if let Some(node) = self.remove_entry(&PathSegment::variant(name, from)) {
                detached.push((node, to));
            }
        }

        let moved = detached.len();
        for (mut node, to) in detached {
            let segment = PathSegment::variant(name, to);
            if let Some(replaced) = self.remove_entry(&segment) {
                tracing::debug!(
                    entry = %segment,
                    value = replaced.value(),
                    "variant entry replaced"
                );
            }
            node.parameter = Some(to.to_string());
            *self.get_or_create_entry(&segment) = node;
        }
        moved
    }

    /// Whether this entry's own flag is set, ignoring descendants
    #[inline]
    #[must_use]
    pub fn is_marked_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether this entry or any descendant is dirty
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty || self.children().any(StoreNode::is_dirty)
    }

    /// Report [`StoreNode::is_dirty`], clearing the whole subtree if it was set
    pub fn take_dirty(&mut self) -> bool {
        let dirty = self.is_dirty();
        if dirty {
            self.clear_dirty();
        }
        dirty
    }

    /// Clear dirty flags in the whole subtree
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
        for node in self.children.values_mut().flatten() {
            node.clear_dirty();
        }
    }

    fn matches(&self, segment: &PathSegment) -> bool {
        names_match(&self.name, segment.name())
            && match (&self.parameter, segment.parameter()) {
                (None, None) => true,
                (Some(a), Some(b)) => names_match(a, b),
                _ => false,
            }
    }

    fn insert_entry(&mut self, node: StoreNode) {
        if self.entry(&node.segment()).is_some() {
            tracing::warn!(
                parent = %self.name,
                entry = %node.segment(),
                "duplicate store entry ignored"
            );
            return;
        }
        let slot = self.get_or_create_entry(&node.segment());
        *slot = node;
    }
}

/// Serialized shape of a [`StoreNode`]
///
/// Children are a flat list; the folded-name index is rebuilt on load.
#[derive(Serialize, Deserialize)]
struct PersistedNode {
    #[serde(default)]
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parameter: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    value: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<PersistedNode>,
}

impl From<PersistedNode> for StoreNode {
    fn from(persisted: PersistedNode) -> Self {
        let mut node = StoreNode {
            name: persisted.name,
            parameter: persisted.parameter,
            value: persisted.value,
            ..StoreNode::default()
        };
        for child in persisted.children {
            node.insert_entry(child.into());
        }
        node
    }
}

impl From<StoreNode> for PersistedNode {
    fn from(node: StoreNode) -> Self {
        PersistedNode {
            name: node.name,
            parameter: node.parameter,
            value: node.value,
            children: node
                .children
                .into_values()
                .flatten()
                .map(PersistedNode::from)
                .collect(),
        }
    }
}

/// Tree of persisted option values
///
/// `Clone` is a deep copy: the clone and the source share no nodes, so
/// values and dirty flags evolve independently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueStore {
    root: StoreNode,
}

impl ValueStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The unnamed node holding all roots
    #[inline]
    #[must_use]
    pub fn root(&self) -> &StoreNode {
        &self.root
    }

    #[inline]
    pub fn root_mut(&mut self) -> &mut StoreNode {
        &mut self.root
    }

    /// Top-level entries
    pub fn roots(&self) -> impl Iterator<Item = &StoreNode> {
        self.root.children()
    }

    /// Tolerant lookup: case-insensitive, `None` when any step is missing
    #[must_use]
    pub fn get_node(&self, path: &OptionPath) -> Option<&StoreNode> {
        path.iter()
            .try_fold(&self.root, |node, segment| node.entry(segment))
    }

    /// Mutable variant of [`ValueStore::get_node`]
    #[must_use]
    pub fn get_node_mut(&mut self, path: &OptionPath) -> Option<&mut StoreNode> {
        let mut node = &mut self.root;
        for segment in path.iter() {
            node = node.entry_mut(segment)?;
        }
        Some(node)
    }

    /// Walk the path, creating every missing entry
    pub fn get_or_create_node(&mut self, path: &OptionPath) -> &mut StoreNode {
        let mut node = &mut self.root;
        for segment in path.iter() {
            node = node.get_or_create_entry(segment);
        }
        node
    }

    /// Value at a textual path, `None` if the path is malformed or missing
    #[must_use]
    pub fn get_value(&self, path: &str) -> Option<&str> {
        let path: OptionPath = path.parse().ok()?;
        self.get_node(&path).map(StoreNode::value)
    }

    /// Set the value at a textual path, creating entries as needed
    ///
    /// Only the touched entry is marked dirty, never its ancestors.
    ///
    /// # Errors
    /// Returns error if the path is malformed
    pub fn set_value(&mut self, path: &str, value: impl Into<String>) -> Result<bool, PathError> {
        let path: OptionPath = path.parse()?;
        Ok(self.get_or_create_node(&path).set_value(value))
    }

    /// Remove the entry at `path` together with its subtree
    pub fn remove_node(&mut self, path: &OptionPath) -> Option<StoreNode> {
        let (last, init) = path.segments().split_last()?;
        let parent = if init.is_empty() {
            &mut self.root
        } else {
            self.get_node_mut(&OptionPath::new(init.iter().cloned()))?
        };
        parent.remove_entry(last)
    }

    /// Whether anything in the store is dirty
    ///
    /// With `reset_if_dirty`, a positive answer also clears every flag.
    pub fn is_dirty(&mut self, reset_if_dirty: bool) -> bool {
        if reset_if_dirty {
            self.root.take_dirty()
        } else {
            self.root.is_dirty()
        }
    }

    /// Clear every dirty flag
    pub fn clear_dirty(&mut self) {
        self.root.clear_dirty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn path(s: &str) -> OptionPath {
        s.parse().unwrap()
    }

    fn sample() -> ValueStore {
        let mut store = ValueStore::new();
        store.set_value("Graphics/Quality", "High").unwrap();
        store.set_value("Graphics/Channel:1", "0.5").unwrap();
        store.set_value("Graphics/Channel:9", "0.2").unwrap();
        store.clear_dirty();
        store
    }

    #[test]
    fn store_set_and_get() {
        let store = sample();
        assert_eq!(store.get_value("Graphics/Quality"), Some("High"));
        assert_eq!(store.get_value("Graphics/Channel:9"), Some("0.2"));
        assert_eq!(store.get_value("Graphics/Missing"), None);
    }

    #[test]
    fn store_lookup_ignores_case() {
        let store = sample();
        assert_eq!(store.get_value("graphics/QUALITY"), Some("High"));
    }

    #[test]
    fn store_malformed_path_is_miss() {
        let store = sample();
        assert_eq!(store.get_value("Graphics//Quality"), None);
        assert_eq!(store.get_value(""), None);
    }

    #[test]
    fn store_variants_are_siblings() {
        let store = sample();
        let graphics = store.get_node(&path("Graphics")).unwrap();
        assert_eq!(graphics.variant_parameters("Channel"), vec!["1", "9"]);
        assert!(graphics.child("Channel").is_none());
    }

    #[test]
    fn store_default_entry_sorts_first() {
        let mut store = sample();
        store.set_value("Graphics/Channel", "1.0").unwrap();
        let graphics = store.get_node(&path("Graphics")).unwrap();
        let entries = graphics.entries("channel");
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].parameter(), None);
    }

    #[test]
    fn store_set_marks_only_touched_node() {
        let mut store = sample();
        store.set_value("Graphics/Quality", "Low").unwrap();
        assert!(!store.get_node(&path("Graphics")).unwrap().is_marked_dirty());
        assert!(store.get_node(&path("Graphics/Quality")).unwrap().is_marked_dirty());
        assert!(store.get_node(&path("Graphics")).unwrap().is_dirty());
    }

    #[test]
    fn store_unchanged_value_stays_clean() {
        let mut store = sample();
        assert!(!store.set_value("Graphics/Quality", "High").unwrap());
        assert!(!store.is_dirty(false));
    }

    #[test]
    fn store_is_dirty_reset() {
        let mut store = sample();
        store.set_value("Graphics/Channel:1", "0.7").unwrap();
        assert!(store.is_dirty(false));
        assert!(store.is_dirty(true));
        assert!(!store.is_dirty(true));
    }

    #[test]
    fn store_remove_node() {
        let mut store = sample();
        let removed = store.remove_node(&path("Graphics/Channel:9")).unwrap();
        assert_eq!(removed.value(), "0.2");
        assert_eq!(store.get_value("Graphics/Channel:9"), None);
        assert!(store.get_node(&path("Graphics")).unwrap().is_marked_dirty());
    }

    #[test]
    fn store_retain_variants() {
        let mut store = sample();
        let graphics = store.get_node_mut(&path("Graphics")).unwrap();
        assert_eq!(graphics.retain_variants("Channel", |p| p == "1"), 1);
        assert_eq!(graphics.variant_parameters("Channel"), vec!["1"]);
    }

    #[test]
    fn store_move_variants_keeps_subtrees() {
        let mut store = sample();
        store.set_value("Graphics/Channel:1/Legacy", "first").unwrap();
        store.clear_dirty();

        let graphics = store.get_node_mut(&path("Graphics")).unwrap();
        assert_eq!(graphics.move_variants("channel", &[("1", "2"), ("9", "1")]), 2);
        assert!(graphics.is_marked_dirty());

        assert_eq!(store.get_value("Graphics/Channel:1"), Some("0.2"));
        assert_eq!(store.get_value("Graphics/Channel:1/Legacy"), None);
        assert_eq!(store.get_value("Graphics/Channel:2"), Some("0.5"));
        assert_eq!(store.get_value("Graphics/Channel:2/Legacy"), Some("first"));
        assert_eq!(store.get_value("Graphics/Channel:9"), None);
    }

    #[test]
    fn store_move_variants_skips_noops() {
        let mut store = sample();
        let graphics = store.get_node_mut(&path("Graphics")).unwrap();
        assert_eq!(graphics.move_variants("Channel", &[("1", "1"), ("7", "3")]), 0);
        assert!(!store.is_dirty(false));
    }

    #[test]
    fn store_move_variants_replaces_occupied_target() {
        let mut store = sample();
        let graphics = store.get_node_mut(&path("Graphics")).unwrap();
        assert_eq!(graphics.move_variants("Channel", &[("9", "1")]), 1);
        assert_eq!(graphics.variant_parameters("Channel"), vec!["1"]);
        assert_eq!(store.get_value("Graphics/Channel:1"), Some("0.2"));
    }

    #[test]
    fn store_serde_roundtrip() {
        let store = sample();
        let json = serde_json::to_string(&store).unwrap();
        let restored: ValueStore = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, store);
        assert_eq!(restored.get_value("graphics/channel:9"), Some("0.2"));
    }

    #[test]
    fn store_deserialize_ignores_duplicate_entries() {
        let json = r#"{"name":"","children":[
            {"name":"A","value":"1"},
            {"name":"a","value":"2"}
        ]}"#;
        let store: ValueStore = serde_json::from_str(json).unwrap();
        assert_eq!(store.get_value("A"), Some("1"));
        assert_eq!(store.roots().count(), 1);
    }

    proptest! {
        #[test]
        fn prop_clone_is_independent(value in "[a-z0-9]{0,8}", reset in any::<bool>()) {
            let mut source = sample();
            source.set_value("Graphics/Quality", "Medium").unwrap();
            let source_dirty = source.is_dirty(false);

            let mut copy = source.clone();
            copy.set_value("Graphics/Quality", value.clone()).unwrap();
            copy.set_value("Audio/Volume", value).unwrap();
            copy.is_dirty(reset);

            prop_assert_eq!(source.get_value("Graphics/Quality"), Some("Medium"));
            prop_assert_eq!(source.get_value("Audio/Volume"), None);
            prop_assert_eq!(source.is_dirty(false), source_dirty);
        }
    }
}
