//! Widget configuration.
//!
//! Every value has a default, so `WidgetConfig::default()` is a working
//! configuration. With the `console` feature, [`WidgetConfig::load`] layers
//! (lowest to highest priority) defaults, an optional YAML file,
//! `CHAT_WIDGET__*` environment variables and CLI flags.

use std::time::Duration;

use serde::Deserialize;

#[cfg(feature = "console")]
use clap::Parser;
#[cfg(feature = "console")]
use config::{Config, Environment, File};

/// Command line flags for the console front-end.
#[cfg(feature = "console")]
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Backend origin the chat endpoint is resolved against
    #[arg(long, env = "CHAT_BACKEND_URL")]
    pub backend_url: Option<String>,

    /// Chat endpoint path
    #[arg(long, env = "CHAT_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Give up on a request after this many seconds
    #[arg(long, env = "CHAT_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct WidgetConfig {
    pub backend: BackendConfig,
    pub elements: ElementIds,
    pub labels: Labels,
}

/// Where chat requests go.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub endpoint: String,
    /// Request timeout. Unset means a request may wait forever and keep the
    /// widget disabled.
    pub timeout_secs: Option<u64>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:80".to_string(),
            endpoint: "/chat".to_string(),
            timeout_secs: None,
        }
    }
}

impl BackendConfig {
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Identifiers of the three elements the widget binds to.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ElementIds {
    pub messages: String,
    pub input: String,
    pub send_button: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            messages: "messages".to_string(),
            input: "messageInput".to_string(),
            send_button: "sendButton".to_string(),
        }
    }
}

/// User-visible strings.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Labels {
    /// Placeholder shown while waiting for the backend.
    pub loading: String,
    /// Prefix of backend-reported errors.
    pub error_prefix: String,
    /// Prefix of transport and decoding failures.
    pub connection_error_prefix: String,
    /// Shown after `error_prefix` when a response has neither field.
    pub empty_reply: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            loading: "Pensando...".to_string(),
            error_prefix: "❌ Erro: ".to_string(),
            connection_error_prefix: "❌ Erro de conexão: ".to_string(),
            empty_reply: "resposta vazia do servidor".to_string(),
        }
    }
}

#[cfg(feature = "console")]
impl WidgetConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Self::from_cli(&cli)
    }

    pub fn from_cli(cli: &Cli) -> Result<Self, config::ConfigError> {
        let defaults = Self::default();
        let mut builder = Config::builder()
            .set_default("backend.base_url", defaults.backend.base_url)?
            .set_default("backend.endpoint", defaults.backend.endpoint)?
            .set_default("elements.messages", defaults.elements.messages)?
            .set_default("elements.input", defaults.elements.input)?
            .set_default("elements.send_button", defaults.elements.send_button)?
            .set_default("labels.loading", defaults.labels.loading)?
            .set_default("labels.error_prefix", defaults.labels.error_prefix)?
            .set_default(
                "labels.connection_error_prefix",
                defaults.labels.connection_error_prefix,
            )?
            .set_default("labels.empty_reply", defaults.labels.empty_reply)?;

        if let Some(path) = &cli.config {
            builder = builder.add_source(File::with_name(path));
        }

        // E.g. CHAT_WIDGET__BACKEND__TIMEOUT_SECS=30
        builder = builder.add_source(
            Environment::with_prefix("CHAT_WIDGET")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        // Flags (and their env fallbacks) win over everything else.
        if let Some(url) = &cli.backend_url {
            builder = builder.set_override("backend.base_url", url.as_str())?;
        }
        if let Some(endpoint) = &cli.endpoint {
            builder = builder.set_override("backend.endpoint", endpoint.as_str())?;
        }
        if let Some(secs) = cli.timeout_secs {
            let secs = i64::try_from(secs).unwrap_or(i64::MAX);
            builder = builder.set_override("backend.timeout_secs", secs)?;
        }

        builder.build()?.try_deserialize()
    }
}
