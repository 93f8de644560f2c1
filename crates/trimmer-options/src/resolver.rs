//! Path resolution over a live tree
//!
//! Resolves `root/child:parameter/...` left to right. A child step looks at
//! direct children only; a parameter step selects a variant of the default
//! variant reached so far. Any failing step turns the whole lookup into a
//! miss.

use crate::natural::natural_cmp;
use crate::tree::{NodeId, OptionTree};
use trimmer_store::{fold_case, OptionPath};

/// Read-only path lookups against one [`OptionTree`]
#[derive(Debug, Clone, Copy)]
pub struct PathResolver<'t> {
    tree: &'t OptionTree,
}

impl<'t> PathResolver<'t> {
    #[inline]
    #[must_use]
    pub fn new(tree: &'t OptionTree) -> Self {
        Self { tree }
    }

    /// Lookup by textual path, `None` on malformed text or any missing step
    #[must_use]
    pub fn get_option(&self, path: &str) -> Option<NodeId> {
        let path: OptionPath = path.parse().ok()?;
        self.resolve(&path)
    }

    /// Lookup by parsed path
    #[must_use]
    pub fn resolve(&self, path: &OptionPath) -> Option<NodeId> {
        let mut segments = path.iter();
        let first = segments.next()?;
        let mut current = self.tree.root(first.name())?;
        if let Some(parameter) = first.parameter() {
            current = self.tree.find_variant(current, parameter)?;
        }

        for segment in segments {
            current = self.tree.get_child(current, segment.name())?;
            if let Some(parameter) = segment.parameter() {
                current = self.tree.find_variant(current, parameter)?;
            }
        }
        Some(current)
    }

    /// Every existing path starting with `prefix`, case-insensitively
    ///
    /// Results are sorted in natural order.
    #[must_use]
    pub fn complete(&self, prefix: &str) -> Vec<String> {
        let prefix = fold_case(prefix);
        let mut paths: Vec<String> = self
            .tree
            .walk_all()
            .into_iter()
            .filter_map(|id| self.tree.path(id).ok())
            .filter(|path| fold_case(path).starts_with(&prefix))
            .collect();
        paths.sort_by(|a, b| natural_cmp(a, b));
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option_type::{OptionConfig, OptionType, Variance};
    use crate::registry::{ChildRegistry, OptionSchema};
    use proptest::prelude::*;

    struct Network;
    struct Server;
    struct Port;
    struct Slot;
    struct Retry;

    impl OptionType for Network {
        type Value = bool;
        const NAME: &'static str = "Network";

        fn children(children: &mut ChildRegistry) {
            children.add::<Server>().add::<Retry>();
        }
    }

    impl OptionType for Server {
        type Value = String;
        const NAME: &'static str = "Server";

        fn configure(config: &mut OptionConfig<String>) {
            config.variance(Variance::Dictionary);
        }

        fn children(children: &mut ChildRegistry) {
            children.add::<Port>().add::<Slot>();
        }
    }

    impl OptionType for Port {
        type Value = u32;
        const NAME: &'static str = "Port";
    }

    impl OptionType for Slot {
        type Value = i32;
        const NAME: &'static str = "Slot";

        fn configure(config: &mut OptionConfig<i32>) {
            config.variance(Variance::Array);
        }
    }

    impl OptionType for Retry {
        type Value = i32;
        const NAME: &'static str = "Retry";
    }

    fn tree() -> OptionTree {
        let schema = OptionSchema::builder().root::<Network>().build().unwrap();
        OptionTree::new(&schema).unwrap()
    }

    #[test]
    fn resolves_children_and_variants() {
        let mut tree = tree();
        let root = tree.root("Network").unwrap();
        let server = tree.get_child(root, "Server").unwrap();
        let eu = tree.add_variant(server, "eu").unwrap();
        let eu_port = tree.get_child(eu, "Port").unwrap();

        let resolver = PathResolver::new(&tree);
        assert_eq!(resolver.get_option("network"), Some(root));
        assert_eq!(resolver.get_option("Network/Server:EU"), Some(eu));
        assert_eq!(resolver.get_option("Network/Server:eu/port"), Some(eu_port));
        assert_eq!(resolver.get_option("Network/Server:Default"), Some(server));
    }

    #[test]
    fn misses_are_none() {
        let tree = tree();
        let resolver = PathResolver::new(&tree);
        assert_eq!(resolver.get_option(""), None);
        assert_eq!(resolver.get_option("Nope"), None);
        assert_eq!(resolver.get_option("Network/Port"), None);
        assert_eq!(resolver.get_option("Network/Server:asia"), None);
        assert_eq!(resolver.get_option("Network/Retry:1"), None);
        assert_eq!(resolver.get_option("Network//Server"), None);
    }

    #[test]
    fn completion_is_prefix_filtered_and_natural() {
        let mut tree = tree();
        let root = tree.root("Network").unwrap();
        let server = tree.get_child(root, "Server").unwrap();
        let slot = tree.get_child(server, "Slot").unwrap();
        tree.add_variants(slot, (1..=10).map(|i| i.to_string())).unwrap();

        let resolver = PathResolver::new(&tree);
        let slots = resolver.complete("network/server/slot:");
        assert_eq!(slots.len(), 10);
        assert_eq!(slots[1], "Network/Server/Slot:2");
        assert_eq!(slots[9], "Network/Server/Slot:10");

        assert_eq!(resolver.complete("net/"), Vec::<String>::new());
        assert_eq!(resolver.complete("network/r"), vec!["Network/Retry"]);
    }

    proptest! {
        #[test]
        fn prop_path_roundtrip(
            servers in proptest::collection::hash_set("[a-z][a-z0-9]{0,4}", 0..4),
            slots in 0usize..4,
        ) {
            let mut tree = tree();
            let root = tree.root("Network").unwrap();
            let server = tree.get_child(root, "Server").unwrap();
            for name in servers.iter().filter(|s| *s != "default") {
                let variant = tree.add_variant(server, name).unwrap();
                let slot = tree.get_child(variant, "Slot").unwrap();
                tree.add_variants(slot, (0..slots).map(|i| format!("s{i}"))).unwrap();
            }

            let resolver = PathResolver::new(&tree);
            for id in tree.walk_all() {
                let path = tree.path(id).unwrap();
                prop_assert_eq!(resolver.get_option(&path), Some(id), "path {}", path);
            }
        }
    }
}
