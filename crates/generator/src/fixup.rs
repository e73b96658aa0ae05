//! The fixup pipeline: a fixed, ordered sequence of text transformations
//! applied to a stored template.
//!
//! ```text
//! template
//!   │
//!   ├─ 1. public accessibility   internal → public, strip [Embedded]
//!   ├─ 2. RemoveMethodImplHints  strip [MethodImpl(...)]
//!   ├─ 3. RemoveCoverageExclusionHints  strip [ExcludeFromCodeCoverage]
//!   ├─ 4. AliasNamespaceForNativeCallArtifact  InteropServices → InteropServices2
//!   └─ 5. EmitGlobalAliasForInlineArrayArtifact  `global using` before `namespace`
//!        (or GenerateAliasOnly: the alias declaration replaces the whole body)
//! ```
//!
//! Every step is a pure textual rewrite and re-applying a step to its own
//! output changes nothing.

use crate::store::TemplateStore;
use crate::types::{FixupKind, FixupSet, SelectedArtifact};
use once_cell::sync::Lazy;
use regex::Regex;

const PUBLIC_TOKEN: &str = "public";
const NATIVE_CALL_ALT_NAMESPACE: &str = "System.Runtime.InteropServices2";
const AUTO_GENERATED_HEADER: &str = "// <auto-generated/>";

static RESTRICTED_VISIBILITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\binternal\b").expect("valid visibility regex"));

static NATIVE_CALL_NAMESPACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bSystem\.Runtime\.InteropServices\b").expect("valid namespace regex")
});

static NAMESPACE_DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*namespace[ \t]+([\w.]+)").expect("valid namespace declaration regex")
});

static TYPE_DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^[ \t]*(?:(?:public|internal|private|protected|sealed|static|readonly|partial|abstract|unsafe|ref)[ \t]+)*(?:class|struct|interface|enum|record)[ \t]+(\w+)",
    )
    .expect("valid type declaration regex")
});

static EMBEDDED_MARKER: Lazy<AttributePattern> =
    Lazy::new(|| AttributePattern::new(r"(?:global::Microsoft\.CodeAnalysis\.)?Embedded(?:Attribute)?"));

static METHOD_IMPL_HINT: Lazy<AttributePattern> = Lazy::new(|| {
    AttributePattern::new(
        r"(?:global::System\.Runtime\.CompilerServices\.)?MethodImpl\w*(?:\([^\]\r\n]*\))?",
    )
});

static COVERAGE_EXCLUSION_HINT: Lazy<AttributePattern> = Lazy::new(|| {
    AttributePattern::new(
        r"(?:global::System\.Diagnostics\.CodeAnalysis\.)?ExcludeFromCodeCoverage(?:Attribute)?(?:\(\))?",
    )
});

/// Removes one attribute usage wherever it appears.
///
/// An attribute alone on its line takes the line (and its terminator) with
/// it; an attribute sharing a line with other code takes the horizontal
/// whitespace that follows it.
struct AttributePattern {
    own_line: Regex,
    inline: Regex,
}

impl AttributePattern {
    fn new(name: &str) -> Self {
        Self {
            own_line: Regex::new(&format!(r"(?m)^[ \t]*\[{name}\][ \t]*(?:\r?\n|\z)"))
                .expect("valid attribute line regex"),
            inline: Regex::new(&format!(r"\[{name}\][ \t]*")).expect("valid attribute regex"),
        }
    }

    fn strip(&self, text: &str) -> String {
        let text = self.own_line.replace_all(text, "");
        self.inline.replace_all(&text, "").into_owned()
    }
}

/// Produce the final text of an artifact from its template.
///
/// Pure and total: the same inputs always give the same output.
#[must_use]
pub fn materialize(template: &str, accessibility_public: bool, fixups: FixupSet) -> String {
    let mut text = template.to_string();

    if accessibility_public {
        text = RESTRICTED_VISIBILITY
            .replace_all(&text, PUBLIC_TOKEN)
            .into_owned();
        // The marker is illegal on publicly visible declarations
        text = EMBEDDED_MARKER.strip(&text);
    }

    if fixups.has(FixupKind::RemoveMethodImplHints) {
        text = METHOD_IMPL_HINT.strip(&text);
    }

    if fixups.has(FixupKind::RemoveCoverageExclusionHints) {
        text = COVERAGE_EXCLUSION_HINT.strip(&text);
    }

    if fixups.has(FixupKind::AliasNamespaceForNativeCallArtifact) {
        text = NATIVE_CALL_NAMESPACE
            .replace_all(&text, NATIVE_CALL_ALT_NAMESPACE)
            .into_owned();
    }

    if fixups.has(FixupKind::GenerateAliasOnly) {
        return match global_alias(&text) {
            Some(alias) => format!("{AUTO_GENERATED_HEADER}\n{alias}\n"),
            None => {
                log::debug!("Template has no namespaced type declaration, nothing to alias");
                format!("{AUTO_GENERATED_HEADER}\n")
            }
        };
    }

    if fixups.has(FixupKind::EmitGlobalAliasForInlineArrayArtifact) {
        text = insert_global_alias(&text);
    }

    text
}

/// Fetch the template of `selected` and run it through the pipeline.
///
/// # Panics
///
/// When the store has no template for `selected.id`: the catalog and the
/// template store are out of sync, which is a programming error.
#[must_use]
pub fn materialize_artifact(store: &dyn TemplateStore, selected: &SelectedArtifact) -> String {
    let template = store.template(&selected.id).unwrap_or_else(|| {
        panic!(
            "template store has no entry for catalog artifact `{}`",
            selected.id
        )
    });
    materialize(template, selected.accessibility_public, selected.fixups)
}

/// `global using T = global::Ns.T;` for the first type declared in `text`
fn global_alias(text: &str) -> Option<String> {
    let namespace = NAMESPACE_DECLARATION.captures(text)?.get(1)?.as_str();
    let type_name = TYPE_DECLARATION.captures(text)?.get(1)?.as_str();
    Some(format!(
        "global using {type_name} = global::{namespace}.{type_name};"
    ))
}

fn insert_global_alias(text: &str) -> String {
    let Some(alias) = global_alias(text) else {
        log::debug!("Template has no namespaced type declaration, skipping global alias");
        return text.to_string();
    };
    if text.contains(&alias) {
        return text.to_string();
    }
    let Some(declaration) = NAMESPACE_DECLARATION.find(text) else {
        return text.to_string();
    };

    let mut output = String::with_capacity(text.len() + alias.len() + 2);
    output.push_str(&text[..declaration.start()]);
    output.push_str(&alias);
    output.push_str("\n\n");
    output.push_str(&text[declaration.start()..]);
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryTemplates;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    const NATIVE_CALL_TEMPLATE: &str = "\
// <auto-generated/>
namespace System.Runtime.InteropServices
{
    /// <summary>Called from native code.</summary>
    [global::System.Diagnostics.CodeAnalysis.ExcludeFromCodeCoverage]
    [global::Microsoft.CodeAnalysis.Embedded]
    internal sealed class UnmanagedCallersOnlyAttribute : global::System.Attribute
    {
    }
}
";

    const INLINE_ARRAY_TEMPLATE: &str = "\
// <auto-generated/>
namespace System.Runtime.CompilerServices2
{
    /// <summary>This class should be aliased.</summary>
    [global::Microsoft.CodeAnalysis.Embedded]
    internal sealed class InlineArrayAttribute : global::System.Attribute
    {
        [global::System.Runtime.CompilerServices.MethodImpl(global::System.Runtime.CompilerServices.MethodImplOptions.AggressiveInlining)]
        public InlineArrayAttribute(int length) { Length = length; }

        public int Length { get; }
    }
}
";

    #[test]
    fn public_accessibility_with_inline_hint() {
        let output = materialize(
            "internal class X { [MethodImplHint] void M(){} }",
            true,
            FixupKind::RemoveMethodImplHints.into(),
        );
        assert_eq!(output, "public class X { void M(){} }");
    }

    #[test]
    fn no_fixups_and_internal_accessibility_is_identity() {
        assert_eq!(
            materialize(NATIVE_CALL_TEMPLATE, false, FixupSet::empty()),
            NATIVE_CALL_TEMPLATE
        );
    }

    #[test]
    fn public_accessibility_strips_embedded_marker_lines() {
        let output = materialize(NATIVE_CALL_TEMPLATE, true, FixupSet::empty());
        assert!(output.contains("    public sealed class UnmanagedCallersOnlyAttribute"));
        assert!(!output.contains("Embedded"));
        assert!(!output.contains("internal"));
        // the coverage attribute is untouched without its fixup
        assert!(output.contains("[global::System.Diagnostics.CodeAnalysis.ExcludeFromCodeCoverage]\n"));
    }

    #[test]
    fn visibility_rewrite_respects_word_boundaries() {
        let output = materialize("internal class Internals { int internalCount; }", true, FixupSet::empty());
        assert_eq!(output, "public class Internals { int internalCount; }");
    }

    #[test]
    fn coverage_hint_removal_drops_whole_lines() {
        let output = materialize(
            NATIVE_CALL_TEMPLATE,
            false,
            FixupKind::RemoveCoverageExclusionHints.into(),
        );
        assert_eq!(
            output,
            NATIVE_CALL_TEMPLATE.replace(
                "    [global::System.Diagnostics.CodeAnalysis.ExcludeFromCodeCoverage]\n",
                ""
            )
        );
    }

    #[test]
    fn native_call_namespace_moves_to_alternate_namespace() {
        let fixups = FixupSet::from(FixupKind::AliasNamespaceForNativeCallArtifact);
        let output = materialize(NATIVE_CALL_TEMPLATE, false, fixups);
        assert!(output.contains("namespace System.Runtime.InteropServices2\n"));

        // applying it again must not produce InteropServices22
        assert_eq!(materialize(&output, false, fixups), output);
    }

    #[test]
    fn native_call_alias_only_emits_just_the_alias() {
        let fixups = FixupSet::from(FixupKind::AliasNamespaceForNativeCallArtifact)
            .with(FixupKind::GenerateAliasOnly);
        let output = materialize(NATIVE_CALL_TEMPLATE, false, fixups);
        assert_eq!(
            output,
            "// <auto-generated/>\nglobal using UnmanagedCallersOnlyAttribute = global::System.Runtime.InteropServices2.UnmanagedCallersOnlyAttribute;\n"
        );
    }

    #[test]
    fn inline_array_alias_goes_before_namespace() {
        let output = materialize(
            INLINE_ARRAY_TEMPLATE,
            false,
            FixupKind::EmitGlobalAliasForInlineArrayArtifact.into(),
        );
        assert!(output.starts_with(
            "// <auto-generated/>\nglobal using InlineArrayAttribute = global::System.Runtime.CompilerServices2.InlineArrayAttribute;\n\nnamespace System.Runtime.CompilerServices2\n"
        ));
    }

    #[test]
    fn alias_and_hint_removal_compose() {
        let fixups = FixupSet::from(FixupKind::EmitGlobalAliasForInlineArrayArtifact)
            .with(FixupKind::RemoveMethodImplHints);
        let output = materialize(INLINE_ARRAY_TEMPLATE, true, fixups);

        assert!(output.contains("global using InlineArrayAttribute = global::System.Runtime.CompilerServices2.InlineArrayAttribute;"));
        assert!(!output.contains("MethodImpl"));
        assert!(!output.contains("Embedded"));
        assert!(output.contains("        public InlineArrayAttribute(int length)"));
        assert_eq!(materialize(&output, true, fixups), output);
    }

    #[test]
    fn materialize_artifact_reads_the_store() {
        let store: MemoryTemplates = [("Demo.X", "internal class X {}")].into_iter().collect();
        let selected = SelectedArtifact::new("Demo.X", true, FixupSet::empty());
        assert_eq!(materialize_artifact(&store, &selected), "public class X {}");
    }

    #[test]
    #[should_panic(expected = "no entry for catalog artifact `Demo.Missing`")]
    fn missing_template_is_a_contract_violation() {
        let store = MemoryTemplates::new();
        let selected = SelectedArtifact::new("Demo.Missing", false, FixupSet::empty());
        let _ = materialize_artifact(&store, &selected);
    }

    fn fixup_sets() -> impl Strategy<Value = FixupSet> {
        // GenerateAliasOnly replaces the body, so it is not idempotent by construction
        (0u8..16).prop_map(FixupSet::from_bits_truncate)
    }

    proptest! {
        #[test]
        fn proptest_materialization_is_idempotent(public in any::<bool>(), fixups in fixup_sets()) {
            for template in [NATIVE_CALL_TEMPLATE, INLINE_ARRAY_TEMPLATE] {
                let once = materialize(template, public, fixups);
                let twice = materialize(&once, public, fixups);
                prop_assert_eq!(once, twice);
            }
        }

        #[test]
        fn proptest_hint_removal_leaves_surrounding_code(
            indent in "[ ]{0,8}",
            body in "[a-z]{1,12}",
        ) {
            let template = format!(
                "{indent}[global::System.Runtime.CompilerServices.MethodImpl(global::System.Runtime.CompilerServices.MethodImplOptions.AggressiveInlining)]\n{indent}void {body}() {{}}\n"
            );
            let output = materialize(&template, false, FixupKind::RemoveMethodImplHints.into());
            prop_assert_eq!(output, format!("{indent}void {body}() {{}}\n"));
        }
    }
}
