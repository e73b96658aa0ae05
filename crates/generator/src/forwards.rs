use crate::cancel::CancellationFlag;
use crate::config::Configuration;
use crate::error::Result;
use crate::oracle::CapabilityOracle;
use crate::types::GENERATED_SUFFIX;

/// Names that may be forwarded to the native runtime instead of generated.
pub const BUILTIN_FORWARD_CANDIDATES: &[&str] = &[
    "System.Index",
    "System.Range",
    "System.Runtime.CompilerServices.IsExternalInit",
    "System.Runtime.CompilerServices.RequiresLocationAttribute",
    "System.Runtime.CompilerServices.CollectionBuilderAttribute",
];

/// Pick the forward candidates whose native implementation is reachable.
///
/// A candidate is forwarded when the target does not define it locally, the
/// native runtime has it as a real type, and forwards are not disabled.
pub fn select_forwards<S: AsRef<str>>(
    candidates: &[S],
    oracle: &dyn CapabilityOracle,
    config: &Configuration,
    cancel: &CancellationFlag,
) -> Result<Vec<String>> {
    let mut forwards = Vec::new();

    for candidate in candidates {
        cancel.check()?;
        let id = candidate.as_ref();

        if config.exclude_type_forwards {
            continue;
        }
        if oracle.defines_locally(id) || !oracle.has_forward_target(id) {
            continue;
        }

        log::debug!("Forwarding {id} to the native runtime");
        forwards.push(id.to_string());
    }

    Ok(forwards)
}

/// Source text of the forward declaration for `id`.
#[must_use]
pub fn forward_text(id: &str) -> String {
    format!(
        "// <auto-generated/>\n[assembly: global::System.Runtime.CompilerServices.TypeForwardedTo(typeof(global::{id}))]\n"
    )
}

/// `"{id}.TypeForward.g.cs"`
#[must_use]
pub fn forward_generated_name(id: &str) -> String {
    format!("{id}.TypeForward.{GENERATED_SUFFIX}")
}
