//! One monitored host and its shared dependency graph

use std::collections::HashMap;
use std::sync::Arc;

use crate::starter::{Starter, StarterRegistry};

/// The target context: one monitored host, shared by reference across
/// every probe pointing at it.
///
/// Supplies the canonical host name used when a probe does not name a host
/// explicitly, a free-form property bag consumed by templating, and owns
/// the [`StarterRegistry`] deduplicating the host's starters. All methods
/// take `&self`; a context wrapped in an [`Arc`] is safe to share across
/// concurrently polled probes.
pub struct TargetContext {
    canonical_name: String,
    properties: HashMap<String, String>,
    starters: StarterRegistry,
}

impl TargetContext {
    pub fn new(canonical_name: impl Into<String>) -> Self {
        Self {
            canonical_name: canonical_name.into(),
            properties: HashMap::new(),
            starters: StarterRegistry::new(),
        }
    }

    /// Attach a host property visible to `${name}` template variables.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn canonical_name(&self) -> &str {
        &self.canonical_name
    }

    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    /// Register a starter under `key`, returning the shared instance.
    ///
    /// Delegates to the owned registry; see [`StarterRegistry::register`].
    pub fn register_starter<F>(&self, key: &str, factory: F) -> Arc<dyn Starter>
    where
        F: FnOnce() -> Arc<dyn Starter>,
    {
        self.starters.register(key, factory)
    }

    /// Look up a registered starter without creating one.
    pub fn starter(&self, key: &str) -> Option<Arc<dyn Starter>> {
        self.starters.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::starter::resolver::Resolver;

    #[test]
    fn exposes_canonical_name_and_properties() {
        let ctx = TargetContext::new("web-01.example.net")
            .with_property("rack", "r12")
            .with_property("dc", "fra");

        assert_eq!(ctx.canonical_name(), "web-01.example.net");
        assert_eq!(ctx.property("rack"), Some("r12"));
        assert_eq!(ctx.property("missing"), None);
    }

    #[test]
    fn register_starter_deduplicates_across_probes() {
        let ctx = TargetContext::new("web-01.example.net");
        let key = Resolver::key_for("web-01.example.net");

        // two probes registering for the same host share one resolver
        let first = ctx.register_starter(&key, || Arc::new(Resolver::new("web-01.example.net")));
        let second = ctx.register_starter(&key, || Arc::new(Resolver::new("web-01.example.net")));

        assert!(Arc::ptr_eq(&first, &second));
        assert!(ctx.starter(&key).is_some());
    }
}
