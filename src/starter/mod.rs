//! Shared startable dependencies gating probe readiness
//!
//! A [`Starter`] models anything a probe depends on before it may run,
//! the clearest example being a resolved hostname.
//! Starters are registered in a [`StarterRegistry`] owned by the target
//! context and deduplicated by key, so every probe pointing at the same
//! host shares a single instance.
//!
//! Starting is lazy and idempotent: the first readiness poll kicks the
//! starter, later polls observe its state. A failed starter stays failed;
//! recovery means registering a fresh instance under a fresh key.

pub mod resolver;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Lifecycle state of a [`Starter`].
///
/// Transitions are one-directional: `NotStarted → Starting → Started`
/// or `NotStarted → Starting → Failed`. A failed starter never leaves
/// `Failed` within the same instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StarterState {
    /// Never started.
    NotStarted,

    /// Start requested, completion pending.
    Starting,

    /// Ready for use.
    Started,

    /// Start failed; terminal for this instance.
    Failed,
}

/// A named, lazily-started, idempotent dependency resource.
pub trait Starter: Send + Sync {
    /// Identity used for deduplication in a [`StarterRegistry`].
    fn key(&self) -> &str;

    /// Request the starter to start.
    ///
    /// Idempotent: invoking on an already-starting or already-started
    /// instance is a no-op. Completion may be asynchronous - callers
    /// observe it by re-polling [`state`](Starter::state), never by
    /// blocking.
    fn start(&self);

    /// Current lifecycle state.
    fn state(&self) -> StarterState;

    /// True only in the `Started` state.
    fn is_started(&self) -> bool {
        self.state() == StarterState::Started
    }

    /// True only in the `Failed` state.
    fn is_failed(&self) -> bool {
        self.state() == StarterState::Failed
    }

    /// Why the last start failed, if it did.
    fn last_error(&self) -> Option<String> {
        None
    }
}

/// Registry deduplicating starters by key.
///
/// Owned by a target context and shared by every probe pointing at that
/// host. Registration is safe under concurrent first registration of the
/// same key: the lock is held across the check-and-insert, so exactly one
/// live instance per key is ever created.
#[derive(Default)]
pub struct StarterRegistry {
    starters: Mutex<HashMap<String, Arc<dyn Starter>>>,
}

impl StarterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the starter registered under `key`, creating it via
    /// `factory` if absent.
    ///
    /// The first registrant wins; later callers receive the existing
    /// instance and `factory` is not invoked.
    pub fn register<F>(&self, key: &str, factory: F) -> Arc<dyn Starter>
    where
        F: FnOnce() -> Arc<dyn Starter>,
    {
        let mut starters = self
            .starters
            .lock()
            .expect("starter registry lock poisoned");
        Arc::clone(starters.entry(key.to_string()).or_insert_with(factory))
    }

    /// Look up a starter without creating one.
    pub fn get(&self, key: &str) -> Option<Arc<dyn Starter>> {
        self.starters
            .lock()
            .expect("starter registry lock poisoned")
            .get(key)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.starters
            .lock()
            .expect("starter registry lock poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
