use tracing::trace;

use crate::target::template::TemplateArg;

/// Declarative configuration for a single probe.
///
/// The one entry point every configuration path converges on: a pre-built
/// `url` wins outright, otherwise the target is composed from the
/// remaining fields. A `port` left absent means "default for the scheme".
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ProbeOptions {
    /// Pre-built full target, taken verbatim.
    pub url: Option<String>,

    pub scheme: Option<String>,

    /// Explicit host; defaults to the target context's canonical name.
    pub host: Option<String>,

    pub port: Option<u16>,

    #[serde(default = "default_path")]
    pub path: String,

    pub login: Option<String>,

    pub password: Option<String>,

    /// Named external connection to collect through instead of a target.
    pub connection_name: Option<String>,

    /// Positional template arguments for the composed target string.
    pub args: Option<Vec<TemplateArg>>,

    /// Connect and read timeout, in whole seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            url: None,
            scheme: None,
            host: None,
            port: None,
            path: default_path(),
            login: None,
            password: None,
            connection_name: None,
            args: None,
            timeout: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub probes: Vec<ProbeSpec>,
}

/// One probe entry: a name, the descriptor it instantiates, its options.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ProbeSpec {
    pub name: String,

    /// Name of the probe descriptor this entry instantiates.
    pub desc: Option<String>,

    #[serde(flatten)]
    pub options: ProbeOptions,
}

fn default_path() -> String {
    String::from("/")
}

fn default_timeout() -> u64 {
    10
}

pub fn read_config_file(path: &str) -> anyhow::Result<Config> {
    let file_content = std::fs::read_to_string(path)?;
    serde_json::from_str(&file_content)
        .map_err(|_| anyhow::anyhow!("Invalid probe configuration file provided!"))
        .inspect(|config| trace!("loaded config: {config:?}"))
}
