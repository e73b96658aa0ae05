use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fmt;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{(\d+)\}").expect("valid placeholder regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => f.write_str("warning"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// Static description of a diagnostic kind. Messages use positional `{0}`,
/// `{1}` placeholders filled from the diagnostic arguments.
#[derive(Debug, PartialEq, Eq)]
pub struct DiagnosticDescriptor {
    pub id: &'static str,
    pub title: &'static str,
    pub message_format: &'static str,
    pub severity: Severity,
}

/// A bool option was set to something other than `true`/`false`.
///
/// Format: `"The value "{0}" is not valid for property "{1}" (it has to be a valid bool value)"`.
pub static INVALID_BOOL_OPTION: DiagnosticDescriptor = DiagnosticDescriptor {
    id: "SHIM0001",
    title: "Invalid bool option",
    message_format:
        "The value \"{0}\" is not valid for property \"{1}\" (it has to be a valid bool value)",
    severity: Severity::Warning,
};

/// An include/exclude list names an id the catalog does not know.
///
/// Format: `"The fully qualified name "{0}" used in property "{1}" is not valid, and it does not match any available artifact"`.
pub static UNKNOWN_ARTIFACT_NAME: DiagnosticDescriptor = DiagnosticDescriptor {
    id: "SHIM0002",
    title: "Invalid fully qualified name for artifact",
    message_format: "The fully qualified name \"{0}\" used in property \"{1}\" is not valid, and it does not match any available artifact",
    severity: Severity::Warning,
};

/// The target language level is below what the generated artifacts need.
pub static UNSUPPORTED_LANGUAGE_LEVEL: DiagnosticDescriptor = DiagnosticDescriptor {
    id: "SHIM0003",
    title: "Unsupported language level",
    message_format: "The target language level is not supported: a newer language version is required to use generated artifacts",
    severity: Severity::Error,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: String,
    pub severity: Severity,
    pub message: String,
    pub args: Vec<String>,
}

impl Diagnostic {
    pub fn new(descriptor: &DiagnosticDescriptor, args: &[&str]) -> Self {
        Self {
            code: descriptor.id.to_string(),
            severity: descriptor.severity,
            message: format_message(descriptor.message_format, args),
            args: args.iter().map(|arg| (*arg).to_string()).collect(),
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.severity, self.code, self.message)
    }
}

/// Fill `{N}` placeholders in one pass over `format`; argument text is
/// never scanned for placeholders itself. Out-of-range placeholders stay as is.
fn format_message(format: &str, args: &[&str]) -> String {
    PLACEHOLDER
        .replace_all(format, |captures: &Captures<'_>| {
            captures[1]
                .parse::<usize>()
                .ok()
                .and_then(|index| args.get(index))
                .map_or_else(|| captures[0].to_string(), |arg| (*arg).to_string())
        })
        .into_owned()
}

/// Receives the diagnostics of a completed evaluation.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_positional_arguments() {
        let diagnostic = Diagnostic::new(&INVALID_BOOL_OPTION, &["yes", "UsePublicAccessibility"]);
        assert_eq!(diagnostic.code, "SHIM0001");
        assert_eq!(diagnostic.severity, Severity::Warning);
        assert_eq!(
            diagnostic.message,
            "The value \"yes\" is not valid for property \"UsePublicAccessibility\" (it has to be a valid bool value)"
        );
        assert_eq!(diagnostic.args, vec!["yes", "UsePublicAccessibility"]);
    }

    #[test]
    fn language_level_is_an_error_without_arguments() {
        let diagnostic = Diagnostic::new(&UNSUPPORTED_LANGUAGE_LEVEL, &[]);
        assert!(diagnostic.is_error());
        assert!(diagnostic.args.is_empty());
        assert_eq!(diagnostic.to_string(), format!("error SHIM0003: {}", diagnostic.message));
    }

    #[test]
    fn arguments_are_not_rescanned_for_placeholders() {
        let diagnostic = Diagnostic::new(&INVALID_BOOL_OPTION, &["{1}", "UsePublicAccessibility"]);
        assert_eq!(
            diagnostic.message,
            "The value \"{1}\" is not valid for property \"UsePublicAccessibility\" (it has to be a valid bool value)"
        );
    }

    #[test]
    fn missing_arguments_leave_placeholders() {
        assert_eq!(format_message("{0} and {1}", &["one"]), "one and {1}");
    }

    #[test]
    fn severity_serializes_in_snake_case() {
        let diagnostic = Diagnostic::new(&UNKNOWN_ARTIFACT_NAME, &["System.Nope", "ExcludeGeneratedArtifacts"]);
        let value = serde_json::to_value(&diagnostic).unwrap();
        assert_eq!(value["severity"], "warning");
        assert_eq!(value["code"], "SHIM0002");
    }
}
