//! Asynchronous hostname resolution as a starter

use std::net::IpAddr;
use std::sync::{Arc, Mutex, OnceLock};

use tracing::{debug, error};

use super::{Starter, StarterState};

/// A [`Starter`] that resolves a hostname in the background.
///
/// Resolution runs on a spawned tokio task; pollers observe completion
/// through the starter state, never by blocking. The resolved address is
/// immutable once set. A failed resolution is terminal for this instance -
/// retrying requires registering a fresh resolver under a fresh key.
pub struct Resolver {
    key: String,
    hostname: String,
    inner: Arc<Inner>,
}

struct Inner {
    state: Mutex<Resolution>,
    address: OnceLock<IpAddr>,
}

struct Resolution {
    state: StarterState,
    error: Option<String>,
}

impl Resolver {
    /// Registry key for the resolver of `hostname`.
    ///
    /// Every probe aimed at one host registers under the same key and so
    /// shares one resolver per target context.
    pub fn key_for(hostname: &str) -> String {
        format!("resolver:{hostname}")
    }

    pub fn new(hostname: impl Into<String>) -> Self {
        let hostname = hostname.into();
        Self {
            key: Self::key_for(&hostname),
            hostname,
            inner: Arc::new(Inner {
                state: Mutex::new(Resolution {
                    state: StarterState::NotStarted,
                    error: None,
                }),
                address: OnceLock::new(),
            }),
        }
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// The resolved address, absent until the starter reports started.
    pub fn address(&self) -> Option<IpAddr> {
        self.inner.address.get().copied()
    }
}

impl Starter for Resolver {
    fn key(&self) -> &str {
        &self.key
    }

    fn start(&self) {
        {
            let mut resolution = self.inner.state.lock().expect("resolver state lock poisoned");
            if resolution.state != StarterState::NotStarted {
                return;
            }
            resolution.state = StarterState::Starting;
        }

        let hostname = self.hostname.clone();
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            // lookup_host wants a port; any value does for pure resolution
            let outcome = tokio::net::lookup_host((hostname.as_str(), 0)).await;
            let mut resolution = inner.state.lock().expect("resolver state lock poisoned");
            match outcome {
                Ok(mut addresses) => match addresses.next() {
                    Some(address) => {
                        let _ = inner.address.set(address.ip());
                        resolution.state = StarterState::Started;
                        debug!("resolved {hostname} to {}", address.ip());
                    }
                    None => {
                        resolution.state = StarterState::Failed;
                        resolution.error = Some(format!("no addresses for {hostname}"));
                        error!("resolution of {hostname} returned no addresses");
                    }
                },
                Err(e) => {
                    resolution.state = StarterState::Failed;
                    resolution.error = Some(e.to_string());
                    error!("resolution of {hostname} failed: {e}");
                }
            }
        });
    }

    fn state(&self) -> StarterState {
        self.inner
            .state
            .lock()
            .expect("resolver state lock poisoned")
            .state
    }

    fn last_error(&self) -> Option<String> {
        self.inner
            .state
            .lock()
            .expect("resolver state lock poisoned")
            .error
            .clone()
    }
}
