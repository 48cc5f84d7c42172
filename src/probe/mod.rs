//! Generic probe lifecycle
//!
//! A probe is configured exactly once, then polled repeatedly by an
//! external scheduler: every tick re-evaluates readiness against the
//! probe's shared starters and, when ready, runs one collection.
//!
//! ```text
//! Unconfigured --configure()--> Configured --poll--> Ready | Blocked
//! ```
//!
//! Configuration failures leave the probe permanently unconfigured and it
//! is never polled. Blocked is transient: a probe oscillates between
//! Ready and Blocked with the state of its shared resolver. On the
//! polling path every failure degrades to "no sample this tick" plus a
//! log line - nothing panics and nothing propagates to the scheduler.

pub mod desc;
pub mod http;

use std::hash::Hash;

use async_trait::async_trait;

use crate::SampleMap;
use crate::config::ProbeOptions;
use crate::context::TargetContext;

use self::desc::ProbeDesc;

/// The generic polling contract implemented by every probe flavor.
#[async_trait]
pub trait Probe: Send {
    /// Sample key produced by this probe's parser.
    type Key: Eq + Hash + Send + Sync;

    /// Resolve the configuration into a fixed target.
    ///
    /// Returns `false` on a configuration error (malformed target,
    /// placeholder/argument mismatch); the error is logged and the probe
    /// stays unconfigured forever. Succeeds at most once: the resolved
    /// target is fixed for the probe's lifetime, and a later call is a
    /// logged no-op.
    fn configure(&mut self, ctx: &TargetContext, options: ProbeOptions) -> bool;

    /// Readiness gate, re-evaluated on every scheduler tick.
    ///
    /// Idempotent and cheap to call defensively; lazily kicks the probe's
    /// shared starters on first poll.
    fn is_ready(&self) -> bool;

    /// Run one collection attempt.
    ///
    /// Either a complete sample map or `None` - transport failures are
    /// logged, yield nothing for this tick, and leave the probe pollable.
    async fn collect(&self) -> Option<SampleMap<Self::Key>>;

    /// Display name for logs and configuration tooling.
    fn name(&self) -> &str;

    /// Transport flavor, e.g. `"HTTP"`.
    fn source_type(&self) -> &'static str;
}

/// Creates probes from descriptors.
///
/// The seam the external configuration loader drives: the loader owns the
/// descriptors and asks a factory for matching probe instances.
pub trait ProbeFactory {
    type Probe: Probe;

    fn make_probe(&self, desc: ProbeDesc<<Self::Probe as Probe>::Key>) -> Self::Probe;
}
