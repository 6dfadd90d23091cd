//! TOML-based connection configuration for the cluster API client.
//!
//! Secrets are never stored in the file. The bearer token is referenced by the
//! name of an environment variable (`auth.token_env`) and resolved at runtime
//! via [`ClientConfig::resolve_env_vars`]. Precedence, lowest to highest:
//! config file, environment, command-line overrides.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::ConfigError;

/// Environment variable naming an alternate config file.
pub const CONFIG_ENV: &str = "USERMAP_CONFIG";
/// Environment variable overriding `[cluster].server`.
pub const SERVER_ENV: &str = "USERMAP_SERVER";

/// Commented template written by `usermap init`.
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# usermap connection configuration

[cluster]
server = "https://api.cluster.example.com:6443"
# certificate_authority = "/etc/usermap/ca.crt"
insecure_skip_tls_verify = false

[auth]
# Name of the environment variable holding the bearer token.
token_env = "USERMAP_TOKEN"

[client]
timeout_secs = 30
"#;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Connection settings for the cluster API server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Where the API server lives and how to trust it.
    #[serde(default)]
    pub cluster: ClusterConfig,

    /// Credentials.
    #[serde(default)]
    pub auth: AuthConfig,

    /// HTTP client tuning.
    #[serde(default)]
    pub client: HttpConfig,
}

/// API server location and TLS trust settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// API server base URL (e.g. `https://api.cluster.example.com:6443`).
    #[serde(default)]
    pub server: String,

    /// PEM bundle used to verify the server certificate.
    #[serde(default)]
    pub certificate_authority: Option<PathBuf>,

    /// Skip server certificate verification entirely.
    #[serde(default)]
    pub insecure_skip_tls_verify: bool,
}

/// Credential settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Environment variable holding the bearer token.
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Resolved token (populated by `resolve_env_vars` or an override).
    #[serde(skip)]
    pub token: Option<String>,
}

fn default_token_env() -> String {
    "USERMAP_TOKEN".into()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_env: default_token_env(),
            token: None,
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds (default 30).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// `User-Agent` header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout() -> u64 {
    30
}
fn default_user_agent() -> String {
    format!("usermap/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Values supplied on the command line; these win over file and environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub server: Option<String>,
    pub token: Option<String>,
    pub insecure_skip_tls_verify: bool,
}

// ---------------------------------------------------------------------------
// Loading & resolving
// ---------------------------------------------------------------------------

impl ClientConfig {
    /// Load a [`ClientConfig`] from a TOML file at the given path.
    ///
    /// This does **not** resolve environment variables -- call
    /// [`resolve_env_vars`](Self::resolve_env_vars) afterwards.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading configuration");

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        let config: ClientConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        debug!("configuration parsed successfully");
        Ok(config)
    }

    /// Like [`load_from_file`](Self::load_from_file), but a missing file
    /// yields the defaults so the server can come from env or flags alone.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        match Self::load_from_file(path.as_ref()) {
            Err(ConfigError::FileNotFound(p)) => {
                debug!(path = %p, "no configuration file, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Resolve the token and server override from the process environment.
    pub fn resolve_env_vars(&mut self) {
        self.resolve_with(|name| std::env::var(name).ok());
    }

    /// Resolve environment references through `lookup`.
    ///
    /// A missing token variable only logs a warning: anonymous requests are
    /// allowed and the server decides whether to reject them.
    pub fn resolve_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        info!("resolving environment variable references in config");

        if let Some(server) = lookup(SERVER_ENV).filter(|s| !s.is_empty()) {
            debug!(env_name = SERVER_ENV, "server overridden from environment");
            self.cluster.server = server;
        }

        self.auth.token = match lookup(&self.auth.token_env) {
            Some(val) if !val.is_empty() => {
                debug!(field = "auth.token_env", env_name = %self.auth.token_env, "resolved env var");
                Some(val)
            }
            Some(_) => {
                warn!(field = "auth.token_env", env_name = %self.auth.token_env, "env var is set but empty");
                None
            }
            None => {
                debug!(field = "auth.token_env", env_name = %self.auth.token_env, "env var not set");
                None
            }
        };
    }

    /// Apply command-line overrides on top of file and environment values.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(ref server) = overrides.server {
            self.cluster.server = server.clone();
        }
        if let Some(ref token) = overrides.token {
            self.auth.token = Some(token.clone());
        }
        if overrides.insecure_skip_tls_verify {
            self.cluster.insecure_skip_tls_verify = true;
        }
    }

    /// Validate that all required fields are present and sane.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let server = self.cluster.server.trim();
        if server.is_empty() {
            return Err(ConfigError::MissingServer);
        }
        if !(server.starts_with("https://") || server.starts_with("http://")) {
            return Err(ConfigError::InvalidValue {
                field: "cluster.server".into(),
                detail: format!("'{}' must start with http:// or https://", server),
            });
        }
        if self.cluster.certificate_authority.is_some() && self.cluster.insecure_skip_tls_verify {
            return Err(ConfigError::InvalidValue {
                field: "cluster.certificate_authority".into(),
                detail: "specifying a root certificates file with the insecure flag is not allowed"
                    .into(),
            });
        }
        if self.client.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "client.timeout_secs".into(),
                detail: "timeout must be > 0".into(),
            });
        }

        Ok(())
    }

    /// Load (tolerating a missing file), resolve, override, and validate.
    pub fn resolve<P: AsRef<Path>>(
        path: P,
        overrides: &ConfigOverrides,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::load_or_default(path)?;
        config.resolve_env_vars();
        config.apply_overrides(overrides);
        config.validate()?;
        Ok(config)
    }
}

/// Default config location: `$USERMAP_CONFIG`, else
/// `<platform config dir>/usermap/config.toml`.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("usermap")
        .join("config.toml")
}
