//! Decides which catalog candidates a target environment is missing.
//!
//! Per candidate, in catalog order:
//!
//! 1. natively accessible → skip
//! 2. `System.Range` without a supporting tuple type → skip
//! 3. explicit mode (include list non-empty) → select iff included and not excluded
//! 4. default mode → skip excluded, select language support, and select
//!    runtime supported only when asked to
//! 5. attach the fixups the candidate and the environment call for

use crate::cancel::CancellationFlag;
use crate::catalog::{ArtifactCategory, CandidateArtifact, Catalog};
use crate::config::Configuration;
use crate::error::Result;
use crate::oracle::CapabilityOracle;
use crate::types::{well_known, FixupKind, FixupSet, SelectedArtifact};

/// Compute the artifacts to materialize, in catalog order.
///
/// Returns `Err(Cancelled)` if `cancel` is raised before the last candidate
/// has been decided.
pub fn select(
    catalog: &Catalog,
    oracle: &dyn CapabilityOracle,
    config: &Configuration,
    cancel: &CancellationFlag,
) -> Result<Vec<SelectedArtifact>> {
    if !oracle.supports_pipeline() {
        log::debug!("Target environment does not support generated artifacts, selecting nothing");
        return Ok(Vec::new());
    }

    let environment_fixups = EnvironmentFixups::probe(oracle);
    let mut selected = Vec::new();

    for candidate in catalog.iter() {
        cancel.check()?;

        if !is_wanted(candidate, oracle, config) {
            continue;
        }

        let artifact = SelectedArtifact::new(
            candidate.id.clone(),
            config.use_public_accessibility,
            fixups_for(candidate, config, &environment_fixups),
        );
        log::debug!("Selected {artifact}");
        selected.push(artifact);
    }

    Ok(selected)
}

fn is_wanted(
    candidate: &CandidateArtifact,
    oracle: &dyn CapabilityOracle,
    config: &Configuration,
) -> bool {
    let id = candidate.id.as_str();

    if oracle.is_accessible(id) {
        log::debug!("Skipping {id}: natively accessible");
        return false;
    }

    if id == well_known::RANGE_ARTIFACT && !oracle.exists(well_known::RANGE_SUPPORT_TUPLE) {
        log::debug!(
            "Skipping {id}: {} is not available",
            well_known::RANGE_SUPPORT_TUPLE
        );
        return false;
    }

    let included = config.is_included(id);
    let excluded = config.is_excluded(id);

    if config.is_explicit_mode() {
        return included && !excluded;
    }

    if excluded {
        return false;
    }

    match candidate.category {
        ArtifactCategory::LanguageSupport => true,
        ArtifactCategory::RuntimeSupported => config.include_runtime_supported,
    }
}

/// Fixup triggers that only depend on the environment, probed once per
/// evaluation.
struct EnvironmentFixups {
    coverage_hints_unavailable: bool,
    method_impl_hints_unavailable: bool,
    global_aliases_supported: bool,
}

impl EnvironmentFixups {
    fn probe(oracle: &dyn CapabilityOracle) -> Self {
        Self {
            coverage_hints_unavailable: !oracle
                .is_accessible(well_known::COVERAGE_EXCLUSION_ATTRIBUTE),
            method_impl_hints_unavailable: !oracle.exists(well_known::AGGRESSIVE_INLINING_MEMBER),
            global_aliases_supported: oracle.supports_global_aliases(),
        }
    }
}

fn fixups_for(
    candidate: &CandidateArtifact,
    config: &Configuration,
    environment: &EnvironmentFixups,
) -> FixupSet {
    let id = candidate.id.as_str();
    let mut fixups = candidate.intrinsic_fixups;

    if environment.coverage_hints_unavailable {
        fixups = fixups.with(FixupKind::RemoveCoverageExclusionHints);
    }

    if environment.method_impl_hints_unavailable
        && (id == well_known::INDEX_ARTIFACT || id == well_known::RANGE_ARTIFACT)
    {
        fixups = fixups.with(FixupKind::RemoveMethodImplHints);
    }

    if id == well_known::NATIVE_CALL_ARTIFACT && config.use_alt_namespace_for_native_call_artifact {
        fixups = fixups.with(FixupKind::AliasNamespaceForNativeCallArtifact);
    }

    if id == well_known::INLINE_ARRAY_ARTIFACT && environment.global_aliases_supported {
        fixups = fixups.with(FixupKind::EmitGlobalAliasForInlineArrayArtifact);
    }

    fixups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::StaticOracle;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    fn alpha_beta() -> Catalog {
        Catalog::new([
            CandidateArtifact::new("Alpha", ArtifactCategory::LanguageSupport),
            CandidateArtifact::new("Beta", ArtifactCategory::RuntimeSupported),
        ])
        .unwrap()
    }

    /// An environment where every optional hint is available, so selections
    /// carry no environment-derived fixups.
    fn modern_oracle() -> StaticOracle {
        StaticOracle::new()
            .with_accessible([well_known::COVERAGE_EXCLUSION_ATTRIBUTE])
            .with_existing([
                well_known::AGGRESSIVE_INLINING_MEMBER,
                well_known::RANGE_SUPPORT_TUPLE,
            ])
    }

    fn selected_ids(catalog: &Catalog, oracle: &StaticOracle, config: &Configuration) -> Vec<String> {
        select(catalog, oracle, config, &CancellationFlag::new())
            .unwrap()
            .into_iter()
            .map(|artifact| artifact.id)
            .collect()
    }

    #[test]
    fn default_mode_selects_language_support_only() {
        let ids = selected_ids(&alpha_beta(), &modern_oracle(), &Configuration::default());
        assert_eq!(ids, vec!["Alpha"]);
    }

    #[test]
    fn explicit_mode_is_exclusive() {
        let config = Configuration {
            include_list: BTreeSet::from(["Beta".to_string()]),
            ..Configuration::default()
        };
        let ids = selected_ids(&alpha_beta(), &modern_oracle(), &config);
        assert_eq!(ids, vec!["Beta"]);
    }

    #[test]
    fn exclusion_without_runtime_supported_selects_nothing() {
        let config = Configuration {
            exclude_list: BTreeSet::from(["Alpha".to_string()]),
            ..Configuration::default()
        };
        assert!(selected_ids(&alpha_beta(), &modern_oracle(), &config).is_empty());
    }

    #[test]
    fn runtime_supported_is_opt_in() {
        let config = Configuration {
            include_runtime_supported: true,
            ..Configuration::default()
        };
        let ids = selected_ids(&alpha_beta(), &modern_oracle(), &config);
        assert_eq!(ids, vec!["Alpha", "Beta"]);
    }

    #[test]
    fn exclusion_wins_over_inclusion() {
        let config = Configuration {
            include_list: BTreeSet::from(["Alpha".to_string(), "Beta".to_string()]),
            exclude_list: BTreeSet::from(["Beta".to_string()]),
            ..Configuration::default()
        };
        let ids = selected_ids(&alpha_beta(), &modern_oracle(), &config);
        assert_eq!(ids, vec!["Alpha"]);
    }

    #[test]
    fn accessible_artifacts_are_never_selected() {
        let oracle = modern_oracle().with_accessible(["Beta"]);
        let config = Configuration {
            include_list: BTreeSet::from(["Beta".to_string()]),
            ..Configuration::default()
        };
        assert!(selected_ids(&alpha_beta(), &oracle, &config).is_empty());
    }

    #[test]
    fn range_requires_supporting_tuple() {
        let catalog = Catalog::new([
            CandidateArtifact::new(well_known::INDEX_ARTIFACT, ArtifactCategory::LanguageSupport),
            CandidateArtifact::new(well_known::RANGE_ARTIFACT, ArtifactCategory::LanguageSupport),
        ])
        .unwrap();
        let config = Configuration {
            include_list: BTreeSet::from([well_known::RANGE_ARTIFACT.to_string()]),
            ..Configuration::default()
        };

        let without_tuple = StaticOracle::new();
        assert!(selected_ids(&catalog, &without_tuple, &config).is_empty());

        let with_tuple = StaticOracle::new().with_existing([well_known::RANGE_SUPPORT_TUPLE]);
        assert_eq!(
            selected_ids(&catalog, &with_tuple, &config),
            vec![well_known::RANGE_ARTIFACT]
        );
    }

    #[test]
    fn unsupported_pipeline_selects_nothing() {
        let oracle = modern_oracle().with_pipeline_supported(false);
        assert!(selected_ids(&alpha_beta(), &oracle, &Configuration::default()).is_empty());
    }

    #[test]
    fn environment_derives_fixups() {
        let catalog = Catalog::new([
            CandidateArtifact::new(well_known::INDEX_ARTIFACT, ArtifactCategory::LanguageSupport),
            CandidateArtifact::new(well_known::NATIVE_CALL_ARTIFACT, ArtifactCategory::LanguageSupport),
            CandidateArtifact::new(well_known::INLINE_ARRAY_ARTIFACT, ArtifactCategory::LanguageSupport),
        ])
        .unwrap();
        let config = Configuration {
            use_public_accessibility: true,
            use_alt_namespace_for_native_call_artifact: true,
            ..Configuration::default()
        };

        let selected = select(&catalog, &StaticOracle::new(), &config, &CancellationFlag::new()).unwrap();
        let by_id = |id: &str| selected.iter().find(|s| s.id == id).unwrap().clone();

        let coverage = FixupSet::from(FixupKind::RemoveCoverageExclusionHints);
        assert_eq!(
            by_id(well_known::INDEX_ARTIFACT).fixups,
            coverage.with(FixupKind::RemoveMethodImplHints)
        );
        assert_eq!(
            by_id(well_known::NATIVE_CALL_ARTIFACT).fixups,
            coverage.with(FixupKind::AliasNamespaceForNativeCallArtifact)
        );
        assert_eq!(
            by_id(well_known::INLINE_ARRAY_ARTIFACT).fixups,
            coverage.with(FixupKind::EmitGlobalAliasForInlineArrayArtifact)
        );
        assert!(selected.iter().all(|s| s.accessibility_public));
    }

    #[test]
    fn modern_environment_adds_no_fixups() {
        let catalog = Catalog::new([
            CandidateArtifact::new(well_known::INDEX_ARTIFACT, ArtifactCategory::LanguageSupport),
            CandidateArtifact::new(well_known::INLINE_ARRAY_ARTIFACT, ArtifactCategory::LanguageSupport),
        ])
        .unwrap();
        let oracle = modern_oracle().with_global_aliases_supported(false);

        let selected = select(&catalog, &oracle, &Configuration::default(), &CancellationFlag::new()).unwrap();
        assert_eq!(selected.len(), 2);
        assert!(selected.iter().all(|s| s.fixups.is_empty()));
    }

    #[test]
    fn intrinsic_fixups_are_kept() {
        let catalog = Catalog::new([CandidateArtifact::new("Alpha", ArtifactCategory::LanguageSupport)
            .with_intrinsic_fixups(FixupKind::RemoveMethodImplHints)])
        .unwrap();
        let selected = select(&catalog, &modern_oracle(), &Configuration::default(), &CancellationFlag::new()).unwrap();
        assert_eq!(selected[0].fixups, FixupKind::RemoveMethodImplHints.into());
    }

    #[test]
    fn cancelled_selection_returns_error() {
        let cancel = CancellationFlag::new();
        cancel.cancel();
        let err = select(&alpha_beta(), &modern_oracle(), &Configuration::default(), &cancel).unwrap_err();
        assert!(err.is_cancelled());
    }
}
