use crate::error::{GeneratorError, Result};
use crate::store::{MemoryTemplates, BUILTIN_TEMPLATES};
use crate::types::FixupSet;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// Extracts the qualified artifact id from a template file name.
static TEMPLATE_FILE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\w+(?:\.\w+)+)\.cs$").expect("valid template name regex"));

static BUILTIN_CATALOG: Lazy<Catalog> = Lazy::new(|| {
    Catalog::new(BUILTIN_TEMPLATES.iter().map(|template| {
        CandidateArtifact::new(template.id, template.category)
    }))
    .unwrap_or_else(|err| panic!("built-in templates are inconsistent: {err}"))
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ArtifactCategory {
    /// Baseline artifacts the language itself needs; selected by default.
    LanguageSupport,
    /// Artifacts the runtime normally provides; opt-in.
    RuntimeSupported,
}

impl ArtifactCategory {
    pub const ALL: [ArtifactCategory; 2] = [Self::LanguageSupport, Self::RuntimeSupported];

    /// Sub-directory holding this category in a template directory
    #[must_use]
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::LanguageSupport => "language_support",
            Self::RuntimeSupported => "runtime_supported",
        }
    }
}

impl fmt::Display for ArtifactCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// An artifact the system knows how to produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateArtifact {
    pub id: String,
    pub category: ArtifactCategory,
    /// Fixups this artifact always needs, regardless of environment.
    pub intrinsic_fixups: FixupSet,
}

impl CandidateArtifact {
    pub fn new(id: impl Into<String>, category: ArtifactCategory) -> Self {
        Self {
            id: id.into(),
            category,
            intrinsic_fixups: FixupSet::empty(),
        }
    }

    /// Builder: set intrinsic fixups
    #[must_use]
    pub fn with_intrinsic_fixups(mut self, fixups: impl Into<FixupSet>) -> Self {
        self.intrinsic_fixups = fixups.into();
        self
    }
}

/// Immutable registry of candidate artifacts.
///
/// Iteration order is fixed: language-support candidates first, then
/// runtime-supported ones, each group sorted by id.
#[derive(Debug, Clone)]
pub struct Catalog {
    candidates: Vec<CandidateArtifact>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog; ids must be unique
    pub fn new(candidates: impl IntoIterator<Item = CandidateArtifact>) -> Result<Self> {
        let mut candidates: Vec<_> = candidates.into_iter().collect();
        candidates.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.id.cmp(&b.id)));

        let mut index = HashMap::with_capacity(candidates.len());
        for (position, candidate) in candidates.iter().enumerate() {
            if index.insert(candidate.id.clone(), position).is_some() {
                return Err(GeneratorError::duplicate_artifact(&candidate.id));
            }
        }

        Ok(Self { candidates, index })
    }

    /// The process-wide catalog of artifacts compiled into the binary
    #[must_use]
    pub fn builtin() -> &'static Catalog {
        &BUILTIN_CATALOG
    }

    pub fn iter(&self) -> impl Iterator<Item = &CandidateArtifact> {
        self.candidates.iter()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&CandidateArtifact> {
        self.index.get(id).map(|position| &self.candidates[*position])
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn language_support(&self) -> impl Iterator<Item = &CandidateArtifact> {
        self.in_category(ArtifactCategory::LanguageSupport)
    }

    pub fn runtime_supported(&self) -> impl Iterator<Item = &CandidateArtifact> {
        self.in_category(ArtifactCategory::RuntimeSupported)
    }

    fn in_category(&self, category: ArtifactCategory) -> impl Iterator<Item = &CandidateArtifact> {
        self.candidates
            .iter()
            .filter(move |candidate| candidate.category == category)
    }
}

/// Load a catalog and its templates from a directory laid out as
/// `language_support/<id>.cs` and `runtime_supported/<id>.cs`.
///
/// A missing category directory is treated as empty.
pub fn load_template_dir(root: &Path) -> Result<(Catalog, MemoryTemplates)> {
    let mut candidates = Vec::new();
    let mut templates = MemoryTemplates::new();

    for category in ArtifactCategory::ALL {
        let dir = root.join(category.dir_name());
        if !dir.is_dir() {
            log::debug!("No {} templates under {}", category, root.display());
            continue;
        }

        let mut entries: Vec<_> = fs::read_dir(&dir)?.collect::<std::io::Result<_>>()?;
        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let id = file_name
                .to_str()
                .and_then(|name| TEMPLATE_FILE_NAME.captures(name))
                .map(|captures| captures[1].to_string())
                .ok_or_else(|| GeneratorError::invalid_template_name(&path))?;

            let text = fs::read_to_string(&path)?;
            if templates.insert(id.clone(), text).is_some() {
                return Err(GeneratorError::duplicate_artifact(id));
            }
            candidates.push(CandidateArtifact::new(id, category));
        }
    }

    let catalog = Catalog::new(candidates)?;
    log::debug!(
        "Loaded {} templates from {}",
        catalog.len(),
        root.display()
    );
    Ok((catalog, templates))
}
