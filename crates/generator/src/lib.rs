//! # shimgen generator
//!
//! Selects the polyfill artifacts a target environment is missing and
//! produces their final source text.
//!
//! ## Architecture
//!
//! ```text
//! raw options ──> Configuration Resolver ──> Configuration (+ warnings)
//!                                               │
//! Catalog + CapabilityOracle ──> Selection ─────┤
//!                                   │           └──> Type-Forward Resolver
//!                                   │                   └─ forward declarations
//!                                   ▼
//!                           SelectedArtifact[]
//!                                   │ (rayon, per artifact)
//!                                   ├──> MaterializationCache (DashMap)
//!                                   │      └─ miss: TemplateStore → Fixup Pipeline
//!                                   ▼
//!                  OutputSink: marker, artifacts, forwards
//! ```
//!
//! Selection and materialization are pure functions of their inputs, so a
//! single [`Generator`] can serve concurrent evaluations and keep reusing
//! its cache across them.
//!
//! ## Example
//!
//! ```rust
//! use shimgen_generator::{CancellationFlag, Diagnostic, GeneratedSource, Generator, StaticOracle};
//! use std::collections::BTreeMap;
//!
//! let generator = Generator::builtin();
//! let oracle = StaticOracle::new().with_existing(["System.ValueTuple`2"]);
//! let mut options = BTreeMap::new();
//! options.insert("UsePublicAccessibility".to_string(), "true".to_string());
//!
//! let mut sources: Vec<GeneratedSource> = Vec::new();
//! let mut diagnostics: Vec<Diagnostic> = Vec::new();
//! let summary = generator
//!     .evaluate(&options, &oracle, &CancellationFlag::new(), &mut sources, &mut diagnostics)
//!     .unwrap();
//!
//! assert!(summary.artifacts > 0);
//! assert!(sources.iter().any(|s| s.name == "System.Range.g.cs"));
//! ```

mod cache;
mod cancel;
mod catalog;
mod config;
mod diagnostics;
mod error;
mod evaluate;
mod fixup;
mod forwards;
mod oracle;
mod selection;
mod store;
mod types;

pub use cache::MaterializationCache;
pub use cancel::CancellationFlag;
pub use catalog::{load_template_dir, ArtifactCategory, CandidateArtifact, Catalog};
pub use config::{keys, parse_list, resolve_configuration, Configuration, ResolvedConfiguration};
pub use diagnostics::{
    Diagnostic, DiagnosticDescriptor, DiagnosticSink, Severity, INVALID_BOOL_OPTION,
    UNKNOWN_ARTIFACT_NAME, UNSUPPORTED_LANGUAGE_LEVEL,
};
pub use error::{GeneratorError, Result};
pub use evaluate::{EvaluationSummary, GeneratedSource, Generator, OutputSink};
pub use fixup::{materialize, materialize_artifact};
pub use forwards::{forward_generated_name, forward_text, select_forwards, BUILTIN_FORWARD_CANDIDATES};
pub use oracle::{CapabilityOracle, StaticOracle};
pub use selection::select;
pub use store::{embedded_marker_source, BuiltinTemplates, MemoryTemplates, TemplateStore};
pub use types::{
    generated_name, well_known, FixupKind, FixupSet, MaterializedArtifact, SelectedArtifact,
    GENERATED_SUFFIX,
};
