//! Target address composition
//!
//! Turns declarative probe configuration into a concrete network target.
//! Composition is pure (no I/O) and fails fast: every failure surfaces as
//! a [`ConfigError`], a malformed target never escapes, and nothing on
//! this path panics.

pub mod template;

use std::fmt;

use url::Url;

use crate::config::ProbeOptions;
use crate::context::TargetContext;

use self::template::{TemplateEngine, positional_format};

/// Result type alias for target construction.
pub type TargetResult<T> = Result<T, ConfigError>;

/// Errors surfaced while turning configuration into a target.
///
/// Both variants are configuration failures: the probe reports
/// `configure() == false` and is never polled.
#[derive(Debug)]
pub enum ConfigError {
    /// Positional placeholders and supplied arguments do not line up.
    Format {
        /// The composite string the placeholders live in.
        template: String,

        /// How many arguments the configuration supplied.
        supplied: usize,
    },

    /// The composed string is not a valid network address.
    InvalidTarget { url: String, source: url::ParseError },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Format { template, supplied } => write!(
                f,
                "illegal format string '{}' for {} argument(s)",
                template, supplied
            ),
            ConfigError::InvalidTarget { url, source } => {
                write!(f, "target '{}' is invalid: {}", url, source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidTarget { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// A fully composed network address.
///
/// Immutable once built. Accessors mirror the underlying URL components;
/// `port()` is `None` when the scheme default applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    url: Url,
}

impl Target {
    /// Parse a complete target string, failing fast on anything invalid.
    pub fn parse(input: &str) -> TargetResult<Self> {
        Url::parse(input)
            .map(|url| Self { url })
            .map_err(|source| ConfigError::InvalidTarget {
                url: input.to_string(),
                source,
            })
    }

    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    /// Encoded user-info login, if any.
    pub fn username(&self) -> Option<&str> {
        let username = self.url.username();
        (!username.is_empty()).then_some(username)
    }

    /// Encoded user-info password, if any.
    pub fn password(&self) -> Option<&str> {
        self.url.password()
    }

    pub fn host(&self) -> Option<&str> {
        self.url.host_str()
    }

    /// Explicit port; `None` means the default for the scheme.
    pub fn port(&self) -> Option<u16> {
        self.url.port()
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    pub fn as_url(&self) -> &Url {
        &self.url
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.url.fmt(f)
    }
}

/// Composes a [`Target`] from declarative options.
///
/// Rules apply in order: pre-built target short-circuit, scheme
/// defaulting, credential encoding, port suffix, host fallback to the
/// context's canonical name, positional formatting, named-variable
/// substitution, final parse.
pub struct TargetBuilder;

impl TargetBuilder {
    pub fn build(
        ctx: &TargetContext,
        templater: &dyn TemplateEngine,
        options: &ProbeOptions,
    ) -> TargetResult<Target> {
        if let Some(url) = &options.url {
            // pre-built target, taken verbatim
            return Target::parse(url);
        }

        let scheme = match &options.scheme {
            Some(scheme) if !scheme.is_empty() => scheme.as_str(),
            // an absent port short-circuits the 443 rule
            _ => match options.port {
                Some(443) => "https",
                _ => "http",
            },
        };

        // encoding valid UTF-8 cannot fail, so there is no error path here
        let mut user_info = String::new();
        if let Some(login) = &options.login {
            user_info.push_str(&urlencoding::encode(login));
            if let Some(password) = &options.password {
                user_info.push(':');
                user_info.push_str(&urlencoding::encode(password));
            }
            user_info.push('@');
        }

        let port = match options.port {
            Some(port) if port > 0 => format!(":{port}"),
            _ => String::new(),
        };

        let host = options
            .host
            .as_deref()
            .unwrap_or_else(|| ctx.canonical_name());

        let composite = format!("{scheme}://{user_info}{host}{port}{}", options.path);

        let rendered = match &options.args {
            Some(args) => {
                let formatted = positional_format(&composite, args)?;
                templater.render(&formatted, ctx, args)
            }
            None => templater.render(&composite, ctx, &[]),
        };

        Target::parse(&rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::template::{PropertyTemplater, TemplateArg};
    use super::*;
    use pretty_assertions::assert_eq;

    fn build(ctx: &TargetContext, options: &ProbeOptions) -> TargetResult<Target> {
        TargetBuilder::build(ctx, &PropertyTemplater, options)
    }

    fn ctx() -> TargetContext {
        TargetContext::new("host.example.net")
    }

    #[test]
    fn scheme_defaults_to_http_without_port() {
        let options = ProbeOptions::default();

        let target = build(&ctx(), &options).unwrap();

        assert_eq!(target.scheme(), "http");
    }

    #[test]
    fn scheme_defaults_to_https_on_port_443() {
        let options = ProbeOptions {
            port: Some(443),
            ..ProbeOptions::default()
        };

        let target = build(&ctx(), &options).unwrap();

        assert_eq!(target.scheme(), "https");
    }

    #[test]
    fn scheme_defaults_to_http_for_other_ports() {
        let options = ProbeOptions {
            port: Some(8443),
            ..ProbeOptions::default()
        };

        let target = build(&ctx(), &options).unwrap();

        assert_eq!(target.scheme(), "http");
        assert_eq!(target.port(), Some(8443));
    }

    #[test]
    fn port_zero_counts_as_unset() {
        let options = ProbeOptions {
            port: Some(0),
            ..ProbeOptions::default()
        };

        let target = build(&ctx(), &options).unwrap();

        assert_eq!(target.scheme(), "http");
        assert_eq!(target.port(), None);
    }

    #[test]
    fn explicit_scheme_wins_over_defaulting() {
        let options = ProbeOptions {
            scheme: Some("https".to_string()),
            port: Some(80),
            ..ProbeOptions::default()
        };

        let target = build(&ctx(), &options).unwrap();

        assert_eq!(target.scheme(), "https");
        assert_eq!(target.port(), Some(80));
    }

    #[test]
    fn credentials_are_percent_encoded() {
        let options = ProbeOptions {
            login: Some("a b".to_string()),
            password: Some("c@d".to_string()),
            ..ProbeOptions::default()
        };

        let target = build(&ctx(), &options).unwrap();

        assert_eq!(target.username(), Some("a%20b"));
        assert_eq!(target.password(), Some("c%40d"));
        assert!(target.to_string().starts_with("http://a%20b:c%40d@"));
    }

    #[test]
    fn login_without_password_has_no_password_segment() {
        let options = ProbeOptions {
            login: Some("admin".to_string()),
            ..ProbeOptions::default()
        };

        let target = build(&ctx(), &options).unwrap();

        assert_eq!(target.username(), Some("admin"));
        assert_eq!(target.password(), None);
    }

    #[test]
    fn absent_login_yields_no_user_info() {
        let options = ProbeOptions {
            password: Some("ignored".to_string()),
            ..ProbeOptions::default()
        };

        let target = build(&ctx(), &options).unwrap();

        assert_eq!(target.username(), None);
        assert_eq!(target.password(), None);
    }

    #[test]
    fn host_defaults_to_canonical_name() {
        let options = ProbeOptions::default();

        let target = build(&ctx(), &options).unwrap();

        assert_eq!(target.host(), Some("host.example.net"));
    }

    #[test]
    fn explicit_host_wins() {
        let options = ProbeOptions {
            host: Some("other.example.net".to_string()),
            ..ProbeOptions::default()
        };

        let target = build(&ctx(), &options).unwrap();

        assert_eq!(target.host(), Some("other.example.net"));
    }

    #[test]
    fn target_round_trips() {
        let options = ProbeOptions {
            host: Some("example".to_string()),
            path: "/x".to_string(),
            ..ProbeOptions::default()
        };

        let target = build(&ctx(), &options).unwrap();
        assert_eq!(target.to_string(), "http://example/x");

        let reparsed = Target::parse(&target.to_string()).unwrap();
        assert_eq!(reparsed.scheme(), "http");
        assert_eq!(reparsed.host(), Some("example"));
        assert_eq!(reparsed.port(), None);
        assert_eq!(reparsed.path(), "/x");
    }

    #[test]
    fn prebuilt_target_is_taken_verbatim() {
        let options = ProbeOptions {
            url: Some("https://static.example.net:8443/status".to_string()),
            // everything else is ignored when a full target is supplied
            host: Some("other".to_string()),
            port: Some(80),
            ..ProbeOptions::default()
        };

        let target = build(&ctx(), &options).unwrap();

        assert_eq!(target.to_string(), "https://static.example.net:8443/status");
    }

    #[test]
    fn invalid_prebuilt_target_fails_fast() {
        let options = ProbeOptions {
            url: Some("not a url".to_string()),
            ..ProbeOptions::default()
        };

        assert!(build(&ctx(), &options).is_err());
    }

    #[test]
    fn positional_then_named_substitution() {
        let ctx = TargetContext::new("host.example.net").with_property("instance", "primary");
        let options = ProbeOptions {
            path: "/stats/%s/${instance}".to_string(),
            args: Some(vec![TemplateArg::Str("cpu".to_string())]),
            ..ProbeOptions::default()
        };

        let target = build(&ctx, &options).unwrap();

        assert_eq!(target.path(), "/stats/cpu/primary");
    }

    #[test]
    fn placeholder_argument_mismatch_is_a_config_error() {
        let options = ProbeOptions {
            path: "/%s/%s".to_string(),
            args: Some(vec![TemplateArg::Str("one".to_string())]),
            ..ProbeOptions::default()
        };

        let result = build(&ctx(), &options);

        assert!(matches!(result, Err(ConfigError::Format { .. })));
    }

    #[test]
    fn unparsable_composite_is_a_config_error() {
        let options = ProbeOptions {
            scheme: Some("ht tp".to_string()),
            ..ProbeOptions::default()
        };

        let result = build(&ctx(), &options);

        assert!(matches!(result, Err(ConfigError::InvalidTarget { .. })));
    }
}
