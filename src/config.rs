use std::fmt;
use std::path::Path;

use ::config::builder::DefaultState;
use ::config::{Config, ConfigBuilder, Environment, File, FileFormat};
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Looked up in the working directory when no `--config` path is given.
pub const DEFAULT_CONFIG_FILE: &str = "backlink_checker.toml";
pub const ENV_PREFIX: &str = "SE_RANKING";

/// API token; never printed in full.
#[derive(Clone, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ApiToken(String);

impl ApiToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken(***)")
    }
}

/// How the token is attached to upstream requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthScheme {
    /// `Authorization: Bearer <token>`
    #[default]
    Bearer,
    /// `apiKey=<token>` query parameter
    Query,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default)]
    pub api_token: Option<ApiToken>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub auth_scheme: AuthScheme,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_cli_limit")]
    pub cli_limit: usize,
    #[serde(default = "default_web_limit")]
    pub web_limit: usize,
    #[serde(default = "default_server_host")]
    pub server_host: String,
    #[serde(default = "default_server_port")]
    pub server_port: u16,
}

fn default_base_url() -> String {
    "https://api.seranking.com".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_cli_limit() -> usize {
    100
}

fn default_web_limit() -> usize {
    1000
}

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    9999
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_token: None,
            base_url: default_base_url(),
            auth_scheme: AuthScheme::default(),
            timeout_secs: default_timeout_secs(),
            cli_limit: default_cli_limit(),
            web_limit: default_web_limit(),
            server_host: default_server_host(),
            server_port: default_server_port(),
        }
    }
}

impl Settings {
    /// Layered load: built-in defaults, then the TOML file, then
    /// `SE_RANKING_*` environment variables.
    ///
    /// An explicit `path` must exist; the default file is optional.
    pub fn new(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::InvalidInput(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                File::from(path).required(true)
            }
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let builder = Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        Self::build(builder)
    }

    /// Settings from a TOML document only, without the environment.
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        Self::build(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let config = builder.build()?;
        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;

        debug!(
            action = "loaded",
            component = "settings",
            base_url = %settings.base_url,
            auth_scheme = ?settings.auth_scheme,
            api_configured = settings.token().is_some(),
            "Loaded settings"
        );

        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(Error::InvalidInput("timeout_secs must be greater than 0".into()));
        }
        if self.cli_limit == 0 || self.web_limit == 0 {
            return Err(Error::InvalidInput("limits must be greater than 0".into()));
        }
        if self.server_port == 0 {
            return Err(Error::InvalidInput("server_port must be greater than 0".into()));
        }
        if url::Url::parse(&self.base_url).is_err() {
            return Err(Error::InvalidInput(format!(
                "base_url is not a valid URL: {}",
                self.base_url
            )));
        }
        Ok(())
    }

    /// The configured token, ignoring blank values.
    pub fn token(&self) -> Option<&ApiToken> {
        self.api_token
            .as_ref()
            .filter(|token| !token.expose().trim().is_empty())
    }

    pub fn require_token(&self) -> Result<&ApiToken> {
        self.token().ok_or(Error::MissingToken)
    }
}
