use proptest::prelude::*;
use shimgen_generator::{
    select, ArtifactCategory, CancellationFlag, CandidateArtifact, Catalog, Configuration,
    SelectedArtifact, StaticOracle,
};
use std::collections::BTreeSet;

const POOL: [&str; 8] = [
    "Demo.A0", "Demo.A1", "Demo.A2", "Demo.A3", "Demo.A4", "Demo.A5", "Demo.A6", "Demo.A7",
];

fn pick(mask: u8) -> Vec<String> {
    POOL.iter()
        .enumerate()
        .filter(|(bit, _)| mask & (1 << bit) != 0)
        .map(|(_, id)| (*id).to_string())
        .collect()
}

fn catalog(runtime_mask: u8) -> Catalog {
    Catalog::new(POOL.iter().enumerate().map(|(bit, id)| {
        let category = if runtime_mask & (1 << bit) != 0 {
            ArtifactCategory::RuntimeSupported
        } else {
            ArtifactCategory::LanguageSupport
        };
        CandidateArtifact::new(*id, category)
    }))
    .expect("pool ids are unique")
}

fn run(catalog: &Catalog, oracle: &StaticOracle, config: &Configuration) -> Vec<SelectedArtifact> {
    select(catalog, oracle, config, &CancellationFlag::new()).expect("not cancelled")
}

fn ids(selection: &[SelectedArtifact]) -> BTreeSet<String> {
    selection.iter().map(|artifact| artifact.id.clone()).collect()
}

prop_compose! {
    fn scenario()(
        runtime_mask in any::<u8>(),
        accessible_mask in any::<u8>(),
        include_mask in any::<u8>(),
        exclude_mask in any::<u8>(),
        include_runtime_supported in any::<bool>(),
        use_public_accessibility in any::<bool>(),
    ) -> (Catalog, StaticOracle, Configuration) {
        let oracle = StaticOracle::new().with_accessible(pick(accessible_mask));
        let config = Configuration {
            use_public_accessibility,
            include_runtime_supported,
            include_list: pick(include_mask).into_iter().collect(),
            exclude_list: pick(exclude_mask).into_iter().collect(),
            ..Configuration::default()
        };
        (catalog(runtime_mask), oracle, config)
    }
}

proptest! {
    #[test]
    fn proptest_selection_is_pure((catalog, oracle, config) in scenario()) {
        let first = run(&catalog, &oracle, &config);
        let second = run(&catalog, &oracle, &config);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn proptest_excluded_ids_are_never_selected((catalog, oracle, config) in scenario()) {
        let selected = ids(&run(&catalog, &oracle, &config));
        for id in &config.exclude_list {
            prop_assert!(!selected.contains(id), "{id} was excluded but selected");
        }
    }

    #[test]
    fn proptest_explicit_mode_is_exclusive((catalog, oracle, config) in scenario()) {
        prop_assume!(config.is_explicit_mode());
        let selected = ids(&run(&catalog, &oracle, &config));
        for id in &selected {
            prop_assert!(config.is_included(id), "{id} selected without being included");
        }
    }

    #[test]
    fn proptest_accessible_ids_are_never_selected(
        (catalog, _, config) in scenario(),
        accessible_mask in any::<u8>(),
    ) {
        let accessible = pick(accessible_mask);
        let oracle = StaticOracle::new().with_accessible(accessible.clone());
        let selected = ids(&run(&catalog, &oracle, &config));
        for id in &accessible {
            prop_assert!(!selected.contains(id), "{id} is accessible but selected");
        }
    }

    #[test]
    fn proptest_selection_follows_catalog_order((catalog, oracle, config) in scenario()) {
        let selected: Vec<String> = run(&catalog, &oracle, &config)
            .into_iter()
            .map(|artifact| artifact.id)
            .collect();
        let catalog_order: Vec<String> = catalog
            .iter()
            .map(|candidate| candidate.id.clone())
            .filter(|id| selected.contains(id))
            .collect();
        prop_assert_eq!(selected, catalog_order);
    }

    #[test]
    fn proptest_accessibility_follows_configuration((catalog, oracle, config) in scenario()) {
        for artifact in run(&catalog, &oracle, &config) {
            prop_assert_eq!(artifact.accessibility_public, config.use_public_accessibility);
        }
    }
}
