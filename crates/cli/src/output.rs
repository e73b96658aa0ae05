use anyhow::{Context as AnyhowContext, Result};
use shimgen_generator::{Diagnostic, GeneratedSource};
use shimgen_protocol::{GenerationReport, ReportedDiagnostic, ReportedSource};
use std::fs;
use std::path::Path;

pub fn write_sources(out_dir: &Path, sources: &[GeneratedSource]) -> Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory {}", out_dir.display()))?;
    for source in sources {
        let path = out_dir.join(&source.name);
        fs::write(&path, &source.text)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    log::debug!("Wrote {} sources to {}", sources.len(), out_dir.display());
    Ok(())
}

pub fn build_report(sources: &[GeneratedSource], diagnostics: &[Diagnostic]) -> GenerationReport {
    GenerationReport {
        sources: sources
            .iter()
            .map(|source| ReportedSource {
                name: source.name.clone(),
                bytes: source.text.len(),
            })
            .collect(),
        diagnostics: diagnostics
            .iter()
            .map(|diagnostic| ReportedDiagnostic {
                code: diagnostic.code.clone(),
                severity: diagnostic.severity.to_string(),
                message: diagnostic.message.clone(),
            })
            .collect(),
        ..GenerationReport::default()
    }
}
