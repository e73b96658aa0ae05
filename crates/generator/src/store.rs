use crate::catalog::ArtifactCategory;
use crate::types::well_known;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Opaque, key-addressed store of artifact templates.
///
/// Templates are immutable UTF-8 text looked up by artifact id. A catalog id
/// with no template is a programming error on the caller's side.
pub trait TemplateStore: Send + Sync {
    fn template(&self, id: &str) -> Option<&str>;
}

pub(crate) struct BuiltinTemplate {
    pub id: &'static str,
    pub category: ArtifactCategory,
    pub text: &'static str,
}

macro_rules! language_support {
    ($id:literal) => {
        BuiltinTemplate {
            id: $id,
            category: ArtifactCategory::LanguageSupport,
            text: include_str!(concat!("../templates/language_support/", $id, ".cs")),
        }
    };
}

macro_rules! runtime_supported {
    ($id:literal) => {
        BuiltinTemplate {
            id: $id,
            category: ArtifactCategory::RuntimeSupported,
            text: include_str!(concat!("../templates/runtime_supported/", $id, ".cs")),
        }
    };
}

pub(crate) static BUILTIN_TEMPLATES: &[BuiltinTemplate] = &[
    language_support!("System.Diagnostics.CodeAnalysis.AllowNullAttribute"),
    language_support!("System.Diagnostics.CodeAnalysis.DisallowNullAttribute"),
    language_support!("System.Diagnostics.CodeAnalysis.DoesNotReturnAttribute"),
    language_support!("System.Diagnostics.CodeAnalysis.DoesNotReturnIfAttribute"),
    language_support!("System.Diagnostics.CodeAnalysis.MaybeNullAttribute"),
    language_support!("System.Diagnostics.CodeAnalysis.MaybeNullWhenAttribute"),
    language_support!("System.Diagnostics.CodeAnalysis.MemberNotNullAttribute"),
    language_support!("System.Diagnostics.CodeAnalysis.NotNullAttribute"),
    language_support!("System.Diagnostics.CodeAnalysis.NotNullIfNotNullAttribute"),
    language_support!("System.Diagnostics.CodeAnalysis.NotNullWhenAttribute"),
    language_support!("System.Diagnostics.CodeAnalysis.SetsRequiredMembersAttribute"),
    language_support!("System.Diagnostics.CodeAnalysis.StringSyntaxAttribute"),
    language_support!("System.Diagnostics.CodeAnalysis.UnscopedRefAttribute"),
    language_support!("System.Index"),
    language_support!("System.Range"),
    language_support!("System.Runtime.CompilerServices.CallerArgumentExpressionAttribute"),
    language_support!("System.Runtime.CompilerServices.CollectionBuilderAttribute"),
    language_support!("System.Runtime.CompilerServices.CompilerFeatureRequiredAttribute"),
    language_support!("System.Runtime.CompilerServices.InlineArrayAttribute"),
    language_support!("System.Runtime.CompilerServices.InterpolatedStringHandlerArgumentAttribute"),
    language_support!("System.Runtime.CompilerServices.InterpolatedStringHandlerAttribute"),
    language_support!("System.Runtime.CompilerServices.IsExternalInit"),
    language_support!("System.Runtime.CompilerServices.ModuleInitializerAttribute"),
    language_support!("System.Runtime.CompilerServices.OverloadResolutionPriorityAttribute"),
    language_support!("System.Runtime.CompilerServices.RequiredMemberAttribute"),
    language_support!("System.Runtime.CompilerServices.RequiresLocationAttribute"),
    language_support!("System.Runtime.CompilerServices.SkipLocalsInitAttribute"),
    language_support!("System.Runtime.InteropServices.UnmanagedCallersOnlyAttribute"),
    runtime_supported!("System.Diagnostics.CodeAnalysis.RequiresDynamicCodeAttribute"),
    runtime_supported!("System.Diagnostics.CodeAnalysis.RequiresUnreferencedCodeAttribute"),
    runtime_supported!("System.Diagnostics.CodeAnalysis.UnconditionalSuppressMessageAttribute"),
    runtime_supported!("System.Diagnostics.StackTraceHiddenAttribute"),
    runtime_supported!("System.Runtime.CompilerServices.DisableRuntimeMarshallingAttribute"),
    runtime_supported!("System.Runtime.Versioning.RequiresPreviewFeaturesAttribute"),
];

static EMBEDDED_MARKER_TEMPLATE: &str =
    include_str!("../templates/private/Microsoft.CodeAnalysis.EmbeddedAttribute.cs");

static BUILTIN_INDEX: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    BUILTIN_TEMPLATES
        .iter()
        .map(|template| (template.id, template.text))
        .collect()
});

/// Source of the assembly-private marker attribute the templates rely on.
/// It is emitted as-is, outside of the catalog.
#[must_use]
pub fn embedded_marker_source() -> (&'static str, &'static str) {
    (well_known::EMBEDDED_MARKER_ARTIFACT, EMBEDDED_MARKER_TEMPLATE)
}

/// Templates compiled into the binary, matching [`crate::Catalog::builtin`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinTemplates;

impl TemplateStore for BuiltinTemplates {
    fn template(&self, id: &str) -> Option<&str> {
        BUILTIN_INDEX.get(id).copied()
    }
}

/// Templates held in memory, e.g. loaded from a template directory.
#[derive(Debug, Clone, Default)]
pub struct MemoryTemplates {
    templates: HashMap<String, String>,
}

impl MemoryTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a template, returning the one it replaced
    pub fn insert(&mut self, id: impl Into<String>, text: impl Into<String>) -> Option<String> {
        self.templates.insert(id.into(), text.into())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MemoryTemplates {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            templates: iter
                .into_iter()
                .map(|(id, text)| (id.into(), text.into()))
                .collect(),
        }
    }
}

impl TemplateStore for MemoryTemplates {
    fn template(&self, id: &str) -> Option<&str> {
        self.templates.get(id).map(String::as_str)
    }
}
