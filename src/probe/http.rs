//! HTTP-flavored probe engine
//!
//! [`HttpProbe`] turns declarative configuration into a concrete HTTP
//! target, gates collection on the shared hostname resolver, and reduces
//! each successful response into a sample map through a protocol-specific
//! [`PayloadParser`].

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, instrument};

use crate::SampleMap;
use crate::config::ProbeOptions;
use crate::context::TargetContext;
use crate::starter::Starter;
use crate::starter::resolver::Resolver;
use crate::target::template::{PropertyTemplater, TemplateEngine};
use crate::target::{Target, TargetBuilder};

use super::Probe;
use super::desc::ProbeDesc;

/// Protocol-specific reduction of a response body into samples.
///
/// Invoked once per successful collection with the fully-read body.
/// Parsers own their error policy; a parser that cannot make sense of the
/// body simply returns fewer (or no) samples.
pub trait PayloadParser: Send + Sync {
    type Key: Eq + Hash + Send + Sync;

    fn parse(&self, body: &[u8]) -> SampleMap<Self::Key>;
}

/// Read a response body as UTF-8 text split into lines.
///
/// A convenience offered to textual parsers. A decode fault logs an error
/// and yields an empty sequence instead of failing the collection.
pub fn parse_to_lines(body: &[u8]) -> Vec<String> {
    match std::str::from_utf8(body) {
        Ok(text) => text.lines().map(str::to_string).collect(),
        Err(e) => {
            error!("unable to read response body as text: {e}");
            Vec::new()
        }
    }
}

/// A probe collecting one HTTP target.
///
/// Configured exactly once; the resolved target, the shared resolver
/// handle and the HTTP client are all fixed at configure time. The client
/// is reused across collections so keep-alive connections survive between
/// ticks.
pub struct HttpProbe<P: PayloadParser> {
    parser: P,
    desc: Option<ProbeDesc<P::Key>>,
    templater: Box<dyn TemplateEngine>,
    options: ProbeOptions,
    target: Option<Target>,
    resolver: Option<Arc<dyn Starter>>,
    client: Option<reqwest::Client>,
    configured: bool,
}

impl<P: PayloadParser> HttpProbe<P> {
    pub fn new(parser: P) -> Self {
        Self {
            parser,
            desc: None,
            templater: Box::new(PropertyTemplater),
            options: ProbeOptions::default(),
            target: None,
            resolver: None,
            client: None,
            configured: false,
        }
    }

    /// Attach the descriptor this probe was instantiated from.
    pub fn with_desc(mut self, desc: ProbeDesc<P::Key>) -> Self {
        self.desc = Some(desc);
        self
    }

    /// Replace the named-variable templating collaborator.
    pub fn with_templater(mut self, templater: impl TemplateEngine + 'static) -> Self {
        self.templater = Box::new(templater);
        self
    }

    pub fn desc(&self) -> Option<&ProbeDesc<P::Key>> {
        self.desc.as_ref()
    }

    pub fn target(&self) -> Option<&Target> {
        self.target.as_ref()
    }

    pub fn url_as_string(&self) -> Option<String> {
        self.target.as_ref().map(Target::to_string)
    }

    pub fn scheme(&self) -> Option<&str> {
        self.target.as_ref().map(Target::scheme)
    }

    pub fn host(&self) -> Option<&str> {
        self.target.as_ref().and_then(|target| target.host())
    }

    pub fn port(&self) -> Option<u16> {
        self.target.as_ref().and_then(|target| target.port())
    }

    pub fn path(&self) -> Option<&str> {
        self.target.as_ref().map(Target::path)
    }

    pub fn login(&self) -> Option<&str> {
        self.options.login.as_deref()
    }

    pub fn password(&self) -> Option<&str> {
        self.options.password.as_deref()
    }

    pub fn connection_name(&self) -> Option<&str> {
        self.options.connection_name.as_deref()
    }

    /// One HTTP exchange against the configured target.
    ///
    /// Every failure degrades to `None` plus a log line; the probe stays
    /// pollable afterwards.
    #[instrument(skip(self), fields(probe = %self.name()))]
    async fn fetch(&self) -> Option<SampleMap<P::Key>> {
        let (Some(target), Some(client)) = (&self.target, &self.client) else {
            debug!("collect invoked on a probe without a target");
            return None;
        };

        debug!("getting {target}");
        let response = match client.get(target.as_url().clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                error!("connection to {target} failed: {e}");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            // drain the error body so the pooled connection can be reused
            // for the next tick instead of forcing a fresh handshake
            match response.bytes().await {
                Ok(_) => error!(
                    "unable to read {target}, http error code: {}",
                    status.as_u16()
                ),
                Err(e) => error!("unable to recover from error in {target}: {e}"),
            }
            return None;
        }

        match response.bytes().await {
            Ok(body) => Some(self.parser.parse(&body)),
            Err(e) => {
                error!("unable to read {target}: {e}");
                None
            }
        }
    }
}

#[async_trait]
impl<P: PayloadParser> Probe for HttpProbe<P> {
    type Key = P::Key;

    fn configure(&mut self, ctx: &TargetContext, options: ProbeOptions) -> bool {
        if self.configured {
            debug!("probe already configured, keeping existing target");
            return true;
        }

        if options.connection_name.is_some() {
            // collection goes through a named external connection; there is
            // no target to compose and no resolver to gate on
            self.options = options;
            self.configured = true;
            return true;
        }

        let target = match TargetBuilder::build(ctx, self.templater.as_ref(), &options) {
            Ok(target) => target,
            Err(e) => {
                error!("target configuration failed: {e}");
                return false;
            }
        };

        // composed network targets are gated on hostname resolution;
        // a pre-supplied literal target is trusted as-is
        if options.url.is_none()
            && matches!(target.scheme(), "http" | "https")
            && let Some(host) = target.host()
        {
            let host = host.to_string();
            let key = Resolver::key_for(&host);
            self.resolver =
                Some(ctx.register_starter(&key, || Arc::new(Resolver::new(host))));
        }

        let timeout = Duration::from_secs(options.timeout);
        let client = match reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
        {
            Ok(client) => client,
            Err(e) => {
                error!("unable to build HTTP client: {e}");
                return false;
            }
        };

        debug!("URL to collect is {target}");
        self.client = Some(client);
        self.target = Some(target);
        self.options = options;
        self.configured = true;
        true
    }

    fn is_ready(&self) -> bool {
        if !self.configured {
            return false;
        }
        match &self.resolver {
            None => true,
            Some(resolver) => {
                // lazy kick; a no-op once the resolver left NotStarted
                resolver.start();
                resolver.is_started()
            }
        }
    }

    async fn collect(&self) -> Option<SampleMap<Self::Key>> {
        self.fetch().await
    }

    fn name(&self) -> &str {
        match &self.desc {
            Some(desc) => &desc.probe_name,
            None => "http",
        }
    }

    fn source_type(&self) -> &'static str {
        "HTTP"
    }
}
