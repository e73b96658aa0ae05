use std::collections::HashSet;

/// The external authority on what the target environment already provides.
///
/// Queries are expected to be fast, synchronous lookups; the pipeline calls
/// them from worker threads without coordination.
pub trait CapabilityOracle: Send + Sync {
    /// Whether `id` is natively available and accessible from the target.
    fn is_accessible(&self, id: &str) -> bool;

    /// Whether a type or member named `id` exists at all, accessible or not.
    fn exists(&self, id: &str) -> bool;

    /// Gate supplied by the caller: is the target language level new enough
    /// to benefit from generated artifacts at all.
    fn supports_pipeline(&self) -> bool {
        true
    }

    /// Whether the target language accepts process-wide alias declarations.
    fn supports_global_aliases(&self) -> bool {
        true
    }

    /// Whether the target defines `id` itself as a local, non-forwarded type.
    fn defines_locally(&self, _id: &str) -> bool {
        false
    }

    /// Whether the target's native runtime library contains `id` as a real
    /// type that a forward declaration can point at.
    fn has_forward_target(&self, _id: &str) -> bool {
        false
    }
}

impl<T: CapabilityOracle + ?Sized> CapabilityOracle for &T {
    fn is_accessible(&self, id: &str) -> bool {
        (**self).is_accessible(id)
    }

    fn exists(&self, id: &str) -> bool {
        (**self).exists(id)
    }

    fn supports_pipeline(&self) -> bool {
        (**self).supports_pipeline()
    }

    fn supports_global_aliases(&self) -> bool {
        (**self).supports_global_aliases()
    }

    fn defines_locally(&self, id: &str) -> bool {
        (**self).defines_locally(id)
    }

    fn has_forward_target(&self, id: &str) -> bool {
        (**self).has_forward_target(id)
    }
}

/// A snapshot oracle backed by plain name sets.
///
/// Every accessible name also counts as existing.
#[derive(Debug, Clone)]
pub struct StaticOracle {
    accessible: HashSet<String>,
    existing: HashSet<String>,
    local_types: HashSet<String>,
    forward_targets: HashSet<String>,
    pipeline_supported: bool,
    global_aliases_supported: bool,
}

impl Default for StaticOracle {
    fn default() -> Self {
        Self {
            accessible: HashSet::new(),
            existing: HashSet::new(),
            local_types: HashSet::new(),
            forward_targets: HashSet::new(),
            pipeline_supported: true,
            global_aliases_supported: true,
        }
    }
}

impl StaticOracle {
    /// An environment that provides nothing natively
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: mark names as natively accessible
    #[must_use]
    pub fn with_accessible<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accessible.extend(names.into_iter().map(Into::into));
        self
    }

    /// Builder: mark names as existing (possibly inaccessible)
    #[must_use]
    pub fn with_existing<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.existing.extend(names.into_iter().map(Into::into));
        self
    }

    /// Builder: mark names as types the target defines itself
    #[must_use]
    pub fn with_local_types<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.local_types.extend(names.into_iter().map(Into::into));
        self
    }

    /// Builder: mark names the native runtime can be forwarded to
    #[must_use]
    pub fn with_forward_targets<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.forward_targets.extend(names.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_pipeline_supported(mut self, supported: bool) -> Self {
        self.pipeline_supported = supported;
        self
    }

    #[must_use]
    pub fn with_global_aliases_supported(mut self, supported: bool) -> Self {
        self.global_aliases_supported = supported;
        self
    }
}

impl CapabilityOracle for StaticOracle {
    fn is_accessible(&self, id: &str) -> bool {
        self.accessible.contains(id)
    }

    fn exists(&self, id: &str) -> bool {
        self.accessible.contains(id) || self.existing.contains(id)
    }

    fn supports_pipeline(&self) -> bool {
        self.pipeline_supported
    }

    fn supports_global_aliases(&self) -> bool {
        self.global_aliases_supported
    }

    fn defines_locally(&self, id: &str) -> bool {
        self.local_types.contains(id)
    }

    fn has_forward_target(&self, id: &str) -> bool {
        self.forward_targets.contains(id)
    }
}
