//! Store ⇄ tree scenarios through a profile

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use trimmer_profile::{Profile, ProfileConfig, ProfileError};
use trimmer_store::ValueStore;
use trimmer_test_utils::{
    init_tracing, sample_schema, sample_store, Channel, Quality, QualityLevel,
};

fn sample_profile() -> Profile {
    init_tracing();
    Profile::with_store("Default", sample_store())
}

#[test]
fn stored_array_variant_is_renumbered() {
    let profile = sample_profile();
    let tree = profile.instantiate(&sample_schema()).unwrap();

    assert_eq!(profile.get(&tree, "Graphics/Quality").unwrap(), "High");
    assert_eq!(profile.get(&tree, "Graphics/Channel").unwrap(), "1");
    assert_eq!(profile.get(&tree, "Graphics/Channel:1").unwrap(), "0.5");
    assert_eq!(profile.get(&tree, "Graphics/Channel:2").unwrap(), "0.2");
    assert!(matches!(
        profile.get(&tree, "Graphics/Channel:9"),
        Err(ProfileError::NoSuchOption(_))
    ));
}

#[test]
fn typed_access_after_load() {
    let profile = sample_profile();
    let tree = profile.instantiate(&sample_schema()).unwrap();
    let graphics = tree.root("Graphics").unwrap();
    let quality = tree.get_child_of::<Quality>(graphics).unwrap();
    let channel = tree.get_child_of::<Channel>(graphics).unwrap();

    assert_eq!(tree.value::<Quality>(quality), Some(&QualityLevel::High));
    let second = tree.find_variant(channel, "2").unwrap();
    assert_eq!(tree.value::<Channel>(second), Some(&0.2));
}

#[test]
fn save_moves_renumbered_variant_entries() {
    let mut profile = sample_profile();
    let mut tree = profile.instantiate(&sample_schema()).unwrap();
    assert!(!profile.is_dirty(false));

    profile.save(&mut tree).unwrap();
    let store = profile.store();
    assert_eq!(store.get_value("Graphics/Channel:1"), Some("0.5"));
    assert_eq!(store.get_value("Graphics/Channel:2"), Some("0.2"));
    assert_eq!(store.get_value("Graphics/Channel:9"), None);
    assert!(profile.is_dirty(true));

    profile.save(&mut tree).unwrap();
    assert!(!profile.is_dirty(false));
}

#[test]
fn save_without_pruning_keeps_removed_variants() {
    let profile = sample_profile();
    let mut profile = profile.with_config(ProfileConfig::new().with_prune_removed_variants(false));
    let mut tree = profile.instantiate(&sample_schema()).unwrap();
    let channel = profile.resolve(&tree, "Graphics/Channel").unwrap();
    let second = profile.resolve(&tree, "Graphics/Channel:2").unwrap();
    tree.remove_variant(channel, second).unwrap();

    profile.save(&mut tree).unwrap();
    assert_eq!(profile.store().get_value("Graphics/Channel:1"), Some("0.5"));
    assert_eq!(profile.store().get_value("Graphics/Channel:2"), None);
    assert_eq!(profile.store().get_value("Graphics/Channel:9"), Some("0.2"));
}

#[test]
fn without_hydration_stored_variants_stay_unloaded() {
    let profile = sample_profile();
    let profile = profile.with_config(ProfileConfig::new().with_hydrate_variants(false));
    let tree = profile.instantiate(&sample_schema()).unwrap();

    assert!(profile.get(&tree, "Graphics/Channel:1").is_err());
    assert_eq!(profile.get(&tree, "Graphics/Quality").unwrap(), "High");
}

#[test]
fn unknown_entries_survive_load_and_save() {
    let mut store = sample_store();
    store.set_value("Legacy/Renderer", "gl").unwrap();
    store.set_value("Graphics/Removed:3", "x").unwrap();
    let mut profile = Profile::with_store("Default", store);

    let mut tree = profile.instantiate(&sample_schema()).unwrap();
    profile.save(&mut tree).unwrap();

    assert_eq!(profile.store().get_value("Legacy/Renderer"), Some("gl"));
    assert_eq!(profile.store().get_value("Graphics/Removed:3"), Some("x"));
}

#[test]
fn missing_and_malformed_values_fall_back() {
    let mut store = ValueStore::new();
    store.set_value("Graphics/Quality", "Ultra").unwrap();
    store.set_value("Network/Server/Port", "").unwrap();
    let profile = Profile::with_store("Default", store);

    let (tree, summary) = profile.instantiate_with_summary(&sample_schema()).unwrap();
    assert_eq!(profile.get(&tree, "Graphics/Quality").unwrap(), "Medium");
    assert_eq!(profile.get(&tree, "Network/Server/Port").unwrap(), "8080");
    assert_eq!(profile.get(&tree, "Console").unwrap(), "true");
    assert_eq!(summary.parsed, 0);
    assert_eq!(profile.store().get_value("Graphics/Quality"), Some("Ultra"));
}

#[test]
fn dictionary_variants_hydrate_by_name() {
    let mut store = ValueStore::new();
    store.set_value("Network/Server:eu", "eu.example.net").unwrap();
    store.set_value("Network/Server:eu/Port", "443").unwrap();
    store.set_value("Network/Server:Main", "ignored").unwrap();
    let profile = Profile::with_store("Default", store);

    let tree = profile.instantiate(&sample_schema()).unwrap();
    assert_eq!(profile.get(&tree, "network/server:EU").unwrap(), "eu.example.net");
    assert_eq!(profile.get(&tree, "Network/Server:eu/Port").unwrap(), "443");
    assert_eq!(profile.get(&tree, "Network/Server:Main").unwrap(), "localhost");
    let server = profile.resolve(&tree, "Network/Server").unwrap();
    assert_eq!(tree.node(server).unwrap().variant_count(), 1);
}

#[test]
fn completion_lists_paths_in_natural_order() {
    let mut store = sample_store();
    for i in 10..12 {
        store.set_value(&format!("Graphics/Channel:{i}"), "0.1").unwrap();
    }
    let profile = Profile::with_store("Default", store);
    let tree = profile.instantiate(&sample_schema()).unwrap();

    assert_eq!(
        profile.complete(&tree, "graphics/channel:"),
        vec![
            "Graphics/Channel:1",
            "Graphics/Channel:2",
            "Graphics/Channel:3",
            "Graphics/Channel:4",
        ]
    );
    assert_eq!(
        profile.complete(&tree, "Net"),
        vec!["Network", "Network/Server", "Network/Server/Port"]
    );
}

proptest! {
    #[test]
    fn prop_stored_array_values_follow_natural_order(
        entries in proptest::collection::btree_map(1u32..1000, 0i32..100, 1..8),
    ) {
        let mut store = ValueStore::new();
        for (parameter, value) in &entries {
            store
                .set_value(&format!("Graphics/Channel:{parameter}"), value.to_string())
                .unwrap();
        }
        let profile = Profile::with_store("Prop", store);
        let tree = profile.instantiate(&sample_schema()).unwrap();

        for (position, value) in entries.values().enumerate() {
            let path = format!("Graphics/Channel:{}", position + 1);
            prop_assert_eq!(profile.get(&tree, &path).unwrap(), value.to_string());
        }
        let missing = format!("Graphics/Channel:{}", entries.len() + 1);
        prop_assert!(profile.get(&tree, &missing).is_err());
    }
}
