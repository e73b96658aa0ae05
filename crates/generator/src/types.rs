use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Suffix appended to an artifact id to build the name of its emitted source.
pub const GENERATED_SUFFIX: &str = "g.cs";

/// Artifact and environment names the pipeline treats specially.
pub mod well_known {
    /// The native-call artifact, which can be moved to an alternate namespace.
    pub const NATIVE_CALL_ARTIFACT: &str =
        "System.Runtime.InteropServices.UnmanagedCallersOnlyAttribute";

    /// The inline-array artifact. Its template already lives in an alternate
    /// namespace and gets a process-wide alias when the language allows it.
    pub const INLINE_ARRAY_ARTIFACT: &str = "System.Runtime.CompilerServices.InlineArrayAttribute";

    pub const INDEX_ARTIFACT: &str = "System.Index";

    /// The intervals/sub-ranges artifact.
    pub const RANGE_ARTIFACT: &str = "System.Range";

    /// Tuple-like type the range artifact depends on.
    pub const RANGE_SUPPORT_TUPLE: &str = "System.ValueTuple`2";

    pub const COVERAGE_EXCLUSION_ATTRIBUTE: &str =
        "System.Diagnostics.CodeAnalysis.ExcludeFromCodeCoverageAttribute";

    pub const AGGRESSIVE_INLINING_MEMBER: &str =
        "System.Runtime.CompilerServices.MethodImplOptions.AggressiveInlining";

    /// The assembly-private marker every template annotates itself with.
    pub const EMBEDDED_MARKER_ARTIFACT: &str = "Microsoft.CodeAnalysis.EmbeddedAttribute";
}

/// A single text transformation the fixup pipeline knows how to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FixupKind {
    /// Strip performance-hint attributes.
    RemoveMethodImplHints,
    /// Strip coverage-exclusion attributes.
    RemoveCoverageExclusionHints,
    /// Move the native-call artifact into its alternate namespace.
    AliasNamespaceForNativeCallArtifact,
    /// Prepend a process-wide alias for the inline-array artifact.
    EmitGlobalAliasForInlineArrayArtifact,
    /// Emit only the alias declaration, without the type body.
    GenerateAliasOnly,
}

impl FixupKind {
    pub const ALL: [FixupKind; 5] = [
        FixupKind::RemoveMethodImplHints,
        FixupKind::RemoveCoverageExclusionHints,
        FixupKind::AliasNamespaceForNativeCallArtifact,
        FixupKind::EmitGlobalAliasForInlineArrayArtifact,
        FixupKind::GenerateAliasOnly,
    ];

    const fn flag(self) -> FixupSet {
        match self {
            FixupKind::RemoveMethodImplHints => FixupSet::REMOVE_METHOD_IMPL_HINTS,
            FixupKind::RemoveCoverageExclusionHints => FixupSet::REMOVE_COVERAGE_EXCLUSION_HINTS,
            FixupKind::AliasNamespaceForNativeCallArtifact => {
                FixupSet::ALIAS_NAMESPACE_FOR_NATIVE_CALL_ARTIFACT
            }
            FixupKind::EmitGlobalAliasForInlineArrayArtifact => {
                FixupSet::EMIT_GLOBAL_ALIAS_FOR_INLINE_ARRAY_ARTIFACT
            }
            FixupKind::GenerateAliasOnly => FixupSet::GENERATE_ALIAS_ONLY,
        }
    }
}

bitflags! {
    /// A set of [`FixupKind`]s. Membership is all that matters: the pipeline
    /// decides the order in which members are applied.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct FixupSet: u8 {
        const REMOVE_METHOD_IMPL_HINTS = 1 << 0;
        const REMOVE_COVERAGE_EXCLUSION_HINTS = 1 << 1;
        const ALIAS_NAMESPACE_FOR_NATIVE_CALL_ARTIFACT = 1 << 2;
        const EMIT_GLOBAL_ALIAS_FOR_INLINE_ARRAY_ARTIFACT = 1 << 3;
        const GENERATE_ALIAS_ONLY = 1 << 4;
    }
}

impl Default for FixupSet {
    fn default() -> Self {
        Self::empty()
    }
}

impl FixupSet {
    /// Check whether `kind` is a member of this set
    #[must_use]
    pub fn has(self, kind: FixupKind) -> bool {
        self.contains(kind.flag())
    }

    /// Builder: add `kind` to the set
    #[must_use]
    pub fn with(self, kind: FixupKind) -> Self {
        self.union(kind.flag())
    }

    /// Iterate members in pipeline order
    pub fn kinds(self) -> impl Iterator<Item = FixupKind> {
        FixupKind::ALL.into_iter().filter(move |kind| self.has(*kind))
    }
}

impl From<FixupKind> for FixupSet {
    fn from(kind: FixupKind) -> Self {
        kind.flag()
    }
}

impl FromIterator<FixupKind> for FixupSet {
    fn from_iter<I: IntoIterator<Item = FixupKind>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::empty(), |set, kind| set.with(kind))
    }
}

/// An artifact chosen for materialization, together with everything that
/// influences its final text. Equal values always materialize to equal text,
/// which is what makes this usable as a cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectedArtifact {
    pub id: String,
    pub accessibility_public: bool,
    pub fixups: FixupSet,
}

impl SelectedArtifact {
    pub fn new(id: impl Into<String>, accessibility_public: bool, fixups: FixupSet) -> Self {
        Self {
            id: id.into(),
            accessibility_public,
            fixups,
        }
    }

    /// The same selection, but asking the pipeline for the alias declaration
    /// only instead of the full body.
    #[must_use]
    pub fn alias_only(&self) -> Self {
        Self {
            fixups: self.fixups.with(FixupKind::GenerateAliasOnly),
            ..self.clone()
        }
    }

    /// Name of the emitted source for this artifact
    #[must_use]
    pub fn generated_name(&self) -> String {
        generated_name(&self.id)
    }
}

impl fmt::Display for SelectedArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)?;
        if self.accessibility_public {
            write!(f, " [public]")?;
        }
        for kind in self.fixups.kinds() {
            write!(f, " +{kind:?}")?;
        }
        Ok(())
    }
}

/// Final text of one artifact, ready to be handed to an output sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializedArtifact {
    pub id: String,
    pub text: Arc<str>,
}

impl MaterializedArtifact {
    #[must_use]
    pub fn generated_name(&self) -> String {
        generated_name(&self.id)
    }
}

/// `"{artifact_id}.g.cs"`
#[must_use]
pub fn generated_name(artifact_id: &str) -> String {
    format!("{artifact_id}.{GENERATED_SUFFIX}")
}
