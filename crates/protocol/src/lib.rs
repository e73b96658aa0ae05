use anyhow::{Context, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const REPORT_SCHEMA_VERSION: u32 = 1;

fn default_true() -> bool {
    true
}

/// What a target environment already provides, as handed over by a build
/// integration. Names are fully qualified.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct EnvironmentSnapshot {
    /// The target language level is new enough for generated artifacts.
    #[serde(default = "default_true")]
    pub pipeline_supported: bool,

    /// The target language accepts `global using` aliases.
    #[serde(default = "default_true")]
    pub global_aliases_supported: bool,

    /// Names that are natively available and accessible. Implies `existing`.
    #[serde(default)]
    pub accessible: Vec<String>,

    /// Names that exist, accessible or not.
    #[serde(default)]
    pub existing: Vec<String>,

    /// Names the target defines itself as regular types.
    #[serde(default)]
    pub local_types: Vec<String>,

    /// Names the native runtime library provides as forwardable types.
    #[serde(default)]
    pub forward_targets: Vec<String>,
}

impl Default for EnvironmentSnapshot {
    fn default() -> Self {
        Self {
            pipeline_supported: true,
            global_aliases_supported: true,
            accessible: Vec::new(),
            existing: Vec::new(),
            local_types: Vec::new(),
            forward_targets: Vec::new(),
        }
    }
}

impl EnvironmentSnapshot {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("invalid environment snapshot")
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct ReportedSource {
    pub name: String,
    pub bytes: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct ReportedDiagnostic {
    pub code: String,
    /// `warning` or `error`
    pub severity: String,
    pub message: String,
}

/// Machine-readable outcome of one `generate` run.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct GenerationReport {
    pub schema_version: u32,
    #[serde(default)]
    pub sources: Vec<ReportedSource>,
    #[serde(default)]
    pub diagnostics: Vec<ReportedDiagnostic>,
}

impl Default for GenerationReport {
    fn default() -> Self {
        Self {
            schema_version: REPORT_SCHEMA_VERSION,
            sources: Vec::new(),
            diagnostics: Vec::new(),
        }
    }
}

impl GenerationReport {
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diagnostic| diagnostic.severity == "error")
    }
}

/// JSON schema of [`EnvironmentSnapshot`]
pub fn snapshot_schema() -> Result<serde_json::Value> {
    let schema = schemars::schema_for!(EnvironmentSnapshot);
    serde_json::to_value(&schema).context("failed to serialize snapshot schema")
}

/// Pretty-printed JSON as written to stdout by the command line.
pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("failed to serialize JSON output")
}
