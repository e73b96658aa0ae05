use anyhow::{Context as AnyhowContext, Result};
use shimgen_generator::StaticOracle;
use shimgen_protocol::EnvironmentSnapshot;
use std::fs;
use std::path::Path;

pub fn load_snapshot(path: &Path) -> Result<EnvironmentSnapshot> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read environment snapshot {}", path.display()))?;
    EnvironmentSnapshot::from_json_str(&raw).with_context(|| format!("in {}", path.display()))
}

pub fn oracle_from_snapshot(snapshot: &EnvironmentSnapshot) -> StaticOracle {
    StaticOracle::new()
        .with_accessible(snapshot.accessible.iter().cloned())
        .with_existing(snapshot.existing.iter().cloned())
        .with_local_types(snapshot.local_types.iter().cloned())
        .with_forward_targets(snapshot.forward_targets.iter().cloned())
        .with_pipeline_supported(snapshot.pipeline_supported)
        .with_global_aliases_supported(snapshot.global_aliases_supported)
}
