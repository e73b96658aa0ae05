use crate::cache::MaterializationCache;
use crate::cancel::CancellationFlag;
use crate::catalog::{load_template_dir, Catalog};
use crate::config::{resolve_configuration, Configuration, ResolvedConfiguration};
use crate::diagnostics::{Diagnostic, DiagnosticSink, UNSUPPORTED_LANGUAGE_LEVEL};
use crate::error::Result;
use crate::fixup::materialize_artifact;
use crate::forwards::{forward_generated_name, forward_text, select_forwards, BUILTIN_FORWARD_CANDIDATES};
use crate::oracle::CapabilityOracle;
use crate::selection::select;
use crate::store::{embedded_marker_source, BuiltinTemplates, TemplateStore};
use crate::types::{generated_name, MaterializedArtifact};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::Path;

/// Receives the sources of a completed evaluation.
pub trait OutputSink {
    fn add_source(&mut self, name: &str, text: &str);
}

/// One emitted source, as collected by the `Vec` sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSource {
    pub name: String,
    pub text: String,
}

impl OutputSink for Vec<GeneratedSource> {
    fn add_source(&mut self, name: &str, text: &str) {
        self.push(GeneratedSource {
            name: name.to_string(),
            text: text.to_string(),
        });
    }
}

/// Counts describing one completed evaluation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    /// Catalog artifacts emitted
    pub artifacts: usize,
    /// Type-forward declarations emitted
    pub forwards: usize,
    /// Diagnostics reported, of any severity
    pub diagnostics: usize,
    /// Entries held by the materialization cache after the evaluation
    pub cache_entries: usize,
}

/// Runs the whole pipeline against one environment and option set.
///
/// A generator owns its materialization cache, so repeated evaluations
/// (including concurrent ones through a shared reference) reuse text already
/// produced for equal selections.
pub struct Generator {
    catalog: Cow<'static, Catalog>,
    templates: Box<dyn TemplateStore>,
    forward_candidates: Vec<String>,
    cache: MaterializationCache,
}

impl Generator {
    /// A generator over the templates compiled into the binary
    pub fn builtin() -> Self {
        Self::with_parts(Cow::Borrowed(Catalog::builtin()), Box::new(BuiltinTemplates))
    }

    /// A generator over a caller-supplied catalog and its matching templates
    pub fn new(catalog: Catalog, templates: impl TemplateStore + 'static) -> Self {
        Self::with_parts(Cow::Owned(catalog), Box::new(templates))
    }

    /// A generator over a template directory, see [`load_template_dir`]
    pub fn from_template_dir(root: &Path) -> Result<Self> {
        let (catalog, templates) = load_template_dir(root)?;
        Ok(Self::new(catalog, templates))
    }

    fn with_parts(catalog: Cow<'static, Catalog>, templates: Box<dyn TemplateStore>) -> Self {
        Self {
            catalog,
            templates,
            forward_candidates: BUILTIN_FORWARD_CANDIDATES
                .iter()
                .map(|id| (*id).to_string())
                .collect(),
            cache: MaterializationCache::new(),
        }
    }

    /// Builder: replace the type-forward candidate set
    #[must_use]
    pub fn with_forward_candidates<I, S>(mut self, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.forward_candidates = candidates.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn cache(&self) -> &MaterializationCache {
        &self.cache
    }

    /// Resolve raw options against this generator's catalog
    #[must_use]
    pub fn resolve(&self, raw_options: &BTreeMap<String, String>) -> ResolvedConfiguration {
        resolve_configuration(raw_options, &self.catalog)
    }

    /// Run one evaluation.
    ///
    /// Nothing reaches either sink unless the evaluation completes: on
    /// cancellation this returns `Err(Cancelled)` and both sinks stay
    /// untouched. Otherwise diagnostics are reported first, then the
    /// embedded marker source, the selected artifacts in catalog order, and
    /// the type forwards.
    ///
    /// # Panics
    ///
    /// When a selected artifact has no template in this generator's store.
    pub fn evaluate(
        &self,
        raw_options: &BTreeMap<String, String>,
        oracle: &dyn CapabilityOracle,
        cancel: &CancellationFlag,
        output: &mut dyn OutputSink,
        diagnostic_sink: &mut dyn DiagnosticSink,
    ) -> Result<EvaluationSummary> {
        let ResolvedConfiguration {
            configuration,
            mut diagnostics,
        } = self.resolve(raw_options);

        if !oracle.supports_pipeline() {
            log::warn!("Target language level is too old for generated artifacts");
            diagnostics.push(Diagnostic::new(&UNSUPPORTED_LANGUAGE_LEVEL, &[]));
        }

        let artifacts = self.materialize_selection(&configuration, oracle, cancel)?;
        let forwards = select_forwards(&self.forward_candidates, oracle, &configuration, cancel)?;
        cancel.check()?;

        let summary = EvaluationSummary {
            artifacts: artifacts.len(),
            forwards: forwards.len(),
            diagnostics: diagnostics.len(),
            cache_entries: self.cache.len(),
        };

        for diagnostic in diagnostics {
            diagnostic_sink.report(diagnostic);
        }

        let (marker_id, marker_text) = embedded_marker_source();
        output.add_source(&generated_name(marker_id), marker_text);

        for artifact in &artifacts {
            output.add_source(&artifact.generated_name(), &artifact.text);
        }

        for id in &forwards {
            output.add_source(&forward_generated_name(id), &forward_text(id));
        }

        log::info!(
            "Generated {} artifacts and {} type forwards ({} diagnostics, {} cached texts)",
            summary.artifacts,
            summary.forwards,
            summary.diagnostics,
            summary.cache_entries
        );
        Ok(summary)
    }

    /// Select artifacts and materialize them in parallel, keeping catalog order
    fn materialize_selection(
        &self,
        configuration: &Configuration,
        oracle: &dyn CapabilityOracle,
        cancel: &CancellationFlag,
    ) -> Result<Vec<MaterializedArtifact>> {
        let selected = select(&self.catalog, oracle, configuration, cancel)?;

        selected
            .par_iter()
            .map(|artifact| -> Result<MaterializedArtifact> {
                cancel.check()?;
                let text = self.cache.get_or_compute(artifact, || {
                    materialize_artifact(&*self.templates, artifact)
                });
                Ok(MaterializedArtifact {
                    id: artifact.id.clone(),
                    text,
                })
            })
            .collect()
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::builtin()
    }
}

impl std::fmt::Debug for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator")
            .field("catalog", &self.catalog.len())
            .field("forward_candidates", &self.forward_candidates)
            .field("cache", &self.cache.len())
            .finish_non_exhaustive()
    }
}
