use crate::catalog::Catalog;
use crate::diagnostics::{Diagnostic, INVALID_BOOL_OPTION, UNKNOWN_ARTIFACT_NAME};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Recognized option keys.
pub mod keys {
    pub const USE_PUBLIC_ACCESSIBILITY: &str = "UsePublicAccessibility";
    pub const INCLUDE_RUNTIME_SUPPORTED: &str = "IncludeRuntimeSupported";
    pub const USE_ALT_NAMESPACE_FOR_NATIVE_CALL: &str = "UseAltNamespaceForNativeCall";
    pub const EXCLUDE_TYPE_FORWARDS: &str = "ExcludeTypeForwards";
    pub const EXCLUDE_GENERATED_ARTIFACTS: &str = "ExcludeGeneratedArtifacts";
    pub const INCLUDE_GENERATED_ARTIFACTS: &str = "IncludeGeneratedArtifacts";

    /// Prefix build systems put in front of the keys they forward.
    pub const BUILD_PROPERTY_PREFIX: &str = "build_property.";
}

const TRUE_TOKEN: &str = "true";
const FALSE_TOKEN: &str = "false";

/// Validated generation options for one evaluation.
///
/// Equality is structural, so callers can use it to decide whether a
/// previous evaluation can be reused.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Configuration {
    /// Rewrite restricted visibility to public in emitted artifacts
    pub use_public_accessibility: bool,

    /// Select runtime-supported artifacts by default as well
    pub include_runtime_supported: bool,

    /// Emit the native-call artifact in its alternate namespace
    pub use_alt_namespace_for_native_call_artifact: bool,

    /// Never emit type-forward declarations
    pub exclude_type_forwards: bool,

    /// Ids to generate exclusively; empty means "use category defaults".
    /// Kept as a set so entry order and repeats do not affect equality.
    pub include_list: BTreeSet<String>,

    /// Ids never to generate
    pub exclude_list: BTreeSet<String>,
}

impl Configuration {
    #[must_use]
    pub fn is_included(&self, id: &str) -> bool {
        self.include_list.contains(id)
    }

    #[must_use]
    pub fn is_excluded(&self, id: &str) -> bool {
        self.exclude_list.contains(id)
    }

    /// Whether an include list is in effect
    #[must_use]
    pub fn is_explicit_mode(&self) -> bool {
        !self.include_list.is_empty()
    }
}

/// A resolved configuration plus the validation diagnostics raised while
/// resolving it. Diagnostics never prevent resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfiguration {
    pub configuration: Configuration,
    pub diagnostics: Vec<Diagnostic>,
}

/// Turn raw option strings into a [`Configuration`].
///
/// Keys may carry the `build_property.` prefix. Unknown keys are ignored.
pub fn resolve_configuration(
    raw: &BTreeMap<String, String>,
    catalog: &Catalog,
) -> ResolvedConfiguration {
    let options: BTreeMap<&str, &str> = raw
        .iter()
        .map(|(key, value)| {
            let key = key
                .strip_prefix(keys::BUILD_PROPERTY_PREFIX)
                .unwrap_or(key);
            (key, value.as_str())
        })
        .collect();

    let mut diagnostics = Vec::new();
    let mut flag = |key: &str| read_bool(&options, key, &mut diagnostics);

    let use_public_accessibility = flag(keys::USE_PUBLIC_ACCESSIBILITY);
    let include_runtime_supported = flag(keys::INCLUDE_RUNTIME_SUPPORTED);
    let use_alt_namespace_for_native_call_artifact = flag(keys::USE_ALT_NAMESPACE_FOR_NATIVE_CALL);
    let exclude_type_forwards = flag(keys::EXCLUDE_TYPE_FORWARDS);

    let exclude_list = read_list(&options, keys::EXCLUDE_GENERATED_ARTIFACTS, catalog, &mut diagnostics);
    let include_list = read_list(&options, keys::INCLUDE_GENERATED_ARTIFACTS, catalog, &mut diagnostics);

    ResolvedConfiguration {
        configuration: Configuration {
            use_public_accessibility,
            include_runtime_supported,
            use_alt_namespace_for_native_call_artifact,
            exclude_type_forwards,
            include_list,
            exclude_list,
        },
        diagnostics,
    }
}

/// Split a raw list value on `,` or `;`, trimming whitespace and dropping
/// empty segments. Duplicates are kept.
#[must_use]
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split([',', ';'])
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

fn read_bool(options: &BTreeMap<&str, &str>, key: &str, diagnostics: &mut Vec<Diagnostic>) -> bool {
    let Some(&value) = options.get(key) else {
        return false;
    };

    if value.eq_ignore_ascii_case(TRUE_TOKEN) {
        return true;
    }

    if !value.is_empty() && !value.eq_ignore_ascii_case(FALSE_TOKEN) {
        log::warn!("Option {key} has invalid bool value {value:?}, using false");
        diagnostics.push(Diagnostic::new(&INVALID_BOOL_OPTION, &[value, key]));
    }

    false
}

fn read_list(
    options: &BTreeMap<&str, &str>,
    key: &str,
    catalog: &Catalog,
    diagnostics: &mut Vec<Diagnostic>,
) -> BTreeSet<String> {
    let Some(&value) = options.get(key) else {
        return BTreeSet::new();
    };

    let tokens = parse_list(value);
    for token in tokens.iter().filter(|token| !catalog.contains(token)) {
        log::warn!("Option {key} names unknown artifact {token:?}");
        diagnostics.push(Diagnostic::new(&UNKNOWN_ARTIFACT_NAME, &[token.as_str(), key]));
    }
    tokens.into_iter().collect()
}
