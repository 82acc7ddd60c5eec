use petal_core::defaults::load_embedded_defaults;
use petal_store::{CareGuideStore, NO_INFO};

const HIBISCUS: &str = "Needs bright light and consistent watering. Plant in nutrient-rich, well-draining soil. Fertilize every 2 weeks during flowering season. Spring pruning encourages new growth. Bud drop occurs if underwatered.";

#[test]
fn reseeding_never_reverts_a_user_edit() {
    let defaults = load_embedded_defaults().expect("failed to load defaults");
    let mut store = CareGuideStore::open_in_memory().expect("failed to open store");

    assert_eq!(store.initialize(&defaults).expect("seed failed"), 20);
    assert_eq!(
        store.lookup("Hibiscus").expect("lookup failed").as_deref(),
        Some(HIBISCUS)
    );

    store.upsert("Hibiscus", "trimmed").expect("upsert failed");
    assert_eq!(
        store.lookup("Hibiscus").expect("lookup failed").as_deref(),
        Some("trimmed")
    );

    assert_eq!(store.initialize(&defaults).expect("reseed failed"), 0);
    assert_eq!(
        store.lookup("Hibiscus").expect("lookup failed").as_deref(),
        Some("trimmed")
    );
    store.close().expect("close failed");
}

#[test]
fn every_default_is_reachable_by_lookup_and_search() {
    let defaults = load_embedded_defaults().expect("failed to load defaults");
    let mut store = CareGuideStore::open_in_memory().expect("failed to open store");
    store.initialize(&defaults).expect("seed failed");

    for (name, care) in &defaults {
        assert_eq!(
            store.lookup(&name.to_uppercase()).expect("lookup failed").as_deref(),
            Some(care.as_str()),
            "lookup of {name}"
        );
        assert!(
            store.search(name).expect("search failed").contains(name),
            "search for {name}"
        );
    }

    assert_eq!(
        store.search("lan").expect("search failed"),
        vec!["Common Lantana".to_string()]
    );
    let missing = store.lookup("Tulip").expect("lookup failed");
    assert_eq!(missing.as_deref().unwrap_or(NO_INFO), "No info.");
}
