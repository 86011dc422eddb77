//! Configuration for formmailer.
//!
//! Values come from three layers, lowest precedence first: built-in
//! defaults, an optional TOML file, and environment variables. The SMTP
//! password is never read from the file; `smtp.password_env` names the
//! environment variable that holds it.
//!
//! The resulting [`AppConfig`] is built once at startup and shared
//! read-only.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::ConfigError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Outgoing SMTP settings.
    #[serde(default)]
    pub smtp: SmtpConfig,

    /// Confirmation email settings.
    #[serde(default)]
    pub mail: MailConfig,
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind (default `0.0.0.0`).
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Listen port (default 3000).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding the static site.
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,

    /// Allowed CORS origin. `None` allows any origin.
    #[serde(default)]
    pub cors_origin: Option<String>,

    /// Minimum tracing level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_bind_addr() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    3000
}
fn default_static_dir() -> PathBuf {
    PathBuf::from("./public")
}
fn default_log_level() -> String {
    "info".into()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            static_dir: default_static_dir(),
            cors_origin: None,
            log_level: default_log_level(),
        }
    }
}

impl ServerConfig {
    /// `bind_addr:port`, suitable for `SocketAddr` parsing.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

// ---------------------------------------------------------------------------
// SMTP
// ---------------------------------------------------------------------------

/// How the SMTP connection is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TlsMode {
    /// Plain connection upgraded with STARTTLS (port 587).
    Starttls,
    /// TLS from the first byte (port 465).
    Tls,
    /// No encryption. Only for local relays and tests.
    None,
}

impl FromStr for TlsMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "starttls" => Ok(Self::Starttls),
            "tls" | "ssl" | "implicit" => Ok(Self::Tls),
            "none" | "plain" | "off" => Ok(Self::None),
            other => Err(format!("unknown TLS mode '{}'", other)),
        }
    }
}

impl std::fmt::Display for TlsMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Starttls => write!(f, "starttls"),
            Self::Tls => write!(f, "tls"),
            Self::None => write!(f, "none"),
        }
    }
}

/// Outgoing SMTP configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    /// SMTP relay host.
    #[serde(default = "default_smtp_host")]
    pub host: String,

    /// SMTP port (default 587).
    #[serde(default = "default_smtp_port")]
    pub port: u16,

    /// Login user, also used as the sender address.
    #[serde(default = "default_smtp_username")]
    pub username: String,

    /// Environment variable holding the SMTP password.
    #[serde(default = "default_password_env")]
    pub password_env: String,

    /// Explicit TLS mode. When unset it is derived from the port.
    #[serde(default)]
    pub tls: Option<TlsMode>,

    /// Connection and command timeout in seconds.
    #[serde(default = "default_smtp_timeout")]
    pub timeout_secs: u64,

    /// Resolved password (populated from `password_env`).
    #[serde(skip)]
    pub password: Option<String>,
}

fn default_smtp_host() -> String {
    "localhost".into()
}
fn default_smtp_port() -> u16 {
    587
}
fn default_smtp_username() -> String {
    "noreply@localhost".into()
}
fn default_password_env() -> String {
    "EMAIL_PASSWORD".into()
}
fn default_smtp_timeout() -> u64 {
    30
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: default_smtp_host(),
            port: default_smtp_port(),
            username: default_smtp_username(),
            password_env: default_password_env(),
            tls: None,
            timeout_secs: default_smtp_timeout(),
            password: None,
        }
    }
}

impl SmtpConfig {
    /// TLS mode in effect: the explicit setting, or implicit TLS on port 465
    /// and STARTTLS everywhere else.
    pub fn effective_tls(&self) -> TlsMode {
        match self.tls {
            Some(mode) => mode,
            None if self.port == 465 => TlsMode::Tls,
            None => TlsMode::Starttls,
        }
    }

    /// Domain part of the sender address, used for `Message-ID`s.
    pub fn sender_domain(&self) -> &str {
        self.username
            .rsplit_once('@')
            .map(|(_, domain)| domain)
            .unwrap_or("localhost")
    }
}

// ---------------------------------------------------------------------------
// Mail
// ---------------------------------------------------------------------------

/// Confirmation email settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Display name on the `From:` header and in the email footer.
    #[serde(default = "default_from_name")]
    pub from_name: String,

    /// Prefix of generated references.
    #[serde(default = "default_reference_prefix")]
    pub reference_prefix: String,
}

fn default_from_name() -> String {
    "Transfer Service".into()
}
fn default_reference_prefix() -> String {
    "TRF".into()
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            from_name: default_from_name(),
            reference_prefix: default_reference_prefix(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading & resolving
// ---------------------------------------------------------------------------

impl AppConfig {
    /// Load an [`AppConfig`] from a TOML file at the given path.
    ///
    /// This does **not** apply environment overrides -- call
    /// [`apply_env_overrides`](Self::apply_env_overrides) afterwards.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading configuration");

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        debug!("configuration parsed successfully");
        Ok(config)
    }

    /// Defaults overridden by the process environment, validated.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None::<&Path>)
    }

    /// Load from an optional file, apply the process environment, validate.
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Override values from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_env_overrides_with(|name| std::env::var(name).ok())
    }

    /// Override values using `lookup` as the environment.
    ///
    /// Empty variables are treated as unset.
    pub fn apply_env_overrides_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("BIND_ADDR") {
            self.server.bind_addr = v;
        }
        if let Some(v) = get("PORT") {
            self.server.port = parse_env("PORT", &v)?;
        }
        if let Some(v) = get("STATIC_DIR") {
            self.server.static_dir = PathBuf::from(v);
        }
        if let Some(v) = get("CORS_ORIGIN") {
            self.server.cors_origin = Some(v);
        }
        if let Some(v) = get("LOG_LEVEL") {
            self.server.log_level = v;
        }

        if let Some(v) = get("SMTP_HOST") {
            self.smtp.host = v;
        }
        if let Some(v) = get("SMTP_PORT") {
            self.smtp.port = parse_env("SMTP_PORT", &v)?;
        }
        if let Some(v) = get("SMTP_TLS") {
            self.smtp.tls = Some(parse_env("SMTP_TLS", &v)?);
        }
        if let Some(v) = get("SMTP_TIMEOUT_SECS") {
            self.smtp.timeout_secs = parse_env("SMTP_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = get("EMAIL_USER") {
            self.smtp.username = v;
        }
        if let Some(v) = get("EMAIL_FROM_NAME") {
            self.mail.from_name = v;
        }
        if let Some(v) = get("REFERENCE_PREFIX") {
            self.mail.reference_prefix = v;
        }

        self.smtp.password = get(&self.smtp.password_env);
        if self.smtp.password.is_some() {
            debug!(env_name = %self.smtp.password_env, "resolved SMTP password");
        } else {
            warn!(env_name = %self.smtp.password_env, "SMTP password env var not set");
        }

        Ok(())
    }

    /// Validate that all required fields are present and sane.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".into(),
                detail: "port must be > 0".into(),
            });
        }
        if self.smtp.host.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "smtp.host".into(),
                detail: "SMTP host must not be empty".into(),
            });
        }
        if self.smtp.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "smtp.port".into(),
                detail: "SMTP port must be > 0".into(),
            });
        }
        if !self.smtp.username.contains('@') {
            return Err(ConfigError::InvalidValue {
                field: "smtp.username".into(),
                detail: "sender must be an email address".into(),
            });
        }
        if self.smtp.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "smtp.timeout_secs".into(),
                detail: "timeout must be > 0".into(),
            });
        }
        if self.mail.reference_prefix.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "mail.reference_prefix".into(),
                detail: "reference prefix must not be empty".into(),
            });
        }

        Ok(())
    }
}

fn parse_env<T>(var: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidEnvVar {
            var: var.into(),
            value: value.into(),
            detail: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn sample_toml() -> &'static str {
        r#"
[server]
bind_addr = "127.0.0.1"
port = 8080
static_dir = "/srv/site"
cors_origin = "https://forms.example.com"
log_level = "debug"

[smtp]
host = "smtp.example.com"
port = 465
username = "forms@example.com"
password_env = "FORMS_SMTP_PASSWORD"
timeout_secs = 10

[mail]
from_name = "Example Forms"
reference_prefix = "EXF"
"#
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.listen_addr(), "0.0.0.0:3000");
        assert_eq!(config.smtp.host, "localhost");
        assert_eq!(config.smtp.port, 587);
        assert_eq!(config.smtp.username, "noreply@localhost");
        assert_eq!(config.smtp.password_env, "EMAIL_PASSWORD");
        assert_eq!(config.smtp.effective_tls(), TlsMode::Starttls);
        assert_eq!(config.mail.reference_prefix, "TRF");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let config: AppConfig = toml::from_str(sample_toml()).expect("failed to parse toml");
        assert_eq!(config.server.listen_addr(), "127.0.0.1:8080");
        assert_eq!(config.smtp.effective_tls(), TlsMode::Tls);
        assert_eq!(config.smtp.sender_domain(), "example.com");
        assert_eq!(config.mail.from_name, "Example Forms");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("formmailer.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(sample_toml().as_bytes()).unwrap();

        let config = AppConfig::load_from_file(&path).expect("load_from_file failed");
        assert_eq!(config.server.log_level, "debug");
        assert_eq!(config.smtp.timeout_secs, 10);
    }

    #[test]
    fn test_file_not_found() {
        let result = AppConfig::load_from_file("/nonexistent/formmailer.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config
            .apply_env_overrides_with(env(&[
                ("PORT", "8081"),
                ("SMTP_HOST", "mail.example.org"),
                ("SMTP_PORT", "2525"),
                ("SMTP_TLS", "none"),
                ("EMAIL_USER", "bot@example.org"),
                ("EMAIL_PASSWORD", "s3cret"),
                ("CORS_ORIGIN", ""),
            ]))
            .unwrap();

        assert_eq!(config.server.port, 8081);
        assert_eq!(config.smtp.host, "mail.example.org");
        assert_eq!(config.smtp.port, 2525);
        assert_eq!(config.smtp.effective_tls(), TlsMode::None);
        assert_eq!(config.smtp.username, "bot@example.org");
        assert_eq!(config.smtp.password.as_deref(), Some("s3cret"));
        assert_eq!(config.server.cors_origin, None);
    }

    #[test]
    fn test_password_read_from_named_env_var() {
        let mut config: AppConfig = toml::from_str(sample_toml()).unwrap();
        config
            .apply_env_overrides_with(env(&[
                ("EMAIL_PASSWORD", "wrong"),
                ("FORMS_SMTP_PASSWORD", "right"),
            ]))
            .unwrap();
        assert_eq!(config.smtp.password.as_deref(), Some("right"));
    }

    #[test]
    fn test_bad_port_env_rejected() {
        let mut config = AppConfig::default();
        let result = config.apply_env_overrides_with(env(&[("SMTP_PORT", "smtp")]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SMTP_PORT"
        ));
    }

    #[test]
    fn test_validate_rejects_bad_sender() {
        let mut config = AppConfig::default();
        config.smtp.username = "nobody".into();
        let result = config.validate();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "smtp.username"
        ));
    }

    #[test]
    fn test_tls_mode_parsing() {
        assert_eq!("STARTTLS".parse::<TlsMode>(), Ok(TlsMode::Starttls));
        assert_eq!("ssl".parse::<TlsMode>(), Ok(TlsMode::Tls));
        assert_eq!("off".parse::<TlsMode>(), Ok(TlsMode::None));
        assert!("maybe".parse::<TlsMode>().is_err());
    }
}
