//! Configuration management
//!
//! Settings are resolved in this order:
//! 1. Environment variables (`SULLA_*`)
//! 2. The `wa-proxy.toml` file, if present
//! 3. Defaults (optional settings only)
//!
//! `${VAR_NAME}` inside the TOML file is replaced by the variable's value.

use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::{Error, Result};

/// Default config file looked up by [`Config::load`]
pub const DEFAULT_CONFIG_FILE: &str = "wa-proxy.toml";

fn default_account_sid() -> String {
    "sulla".to_string()
}

fn default_wa_api_url() -> String {
    "http://127.0.0.1:8002".to_string()
}

fn default_events_port() -> u16 {
    8003
}

fn default_events_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

/// Where attachments are written and how they are addressed publicly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaConfig {
    /// Directory stored attachments are written to
    pub dir: PathBuf,
    /// Public URL prefix; the stored filename is appended verbatim
    pub root: String,
}

/// Outbound webhook target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookConfig {
    pub endpoint: String,
    pub shared_secret: String,
    /// Value sent as `AccountSid`
    pub account_sid: String,
}

/// HTTP API server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
}

/// The open-wa sidecar that owns the WhatsApp Web session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhatsAppConfig {
    pub api_url: String,
    /// Sent to the sidecar and required on its event posts
    pub api_key: Option<String>,
    /// Interface the event listener binds to (loopback unless configured)
    pub events_host: IpAddr,
    /// Port the event listener binds to
    pub events_port: u16,
}

/// Main configuration for wa-proxy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Administrator phone number, digits with optional leading `+`
    pub admin_sender: String,
    pub media: MediaConfig,
    pub webhook: WebhookConfig,
    pub server: ServerConfig,
    pub whatsapp: WhatsAppConfig,
}

impl Config {
    /// Load configuration from environment variables only
    pub fn from_env() -> Result<Self> {
        let mut raw = RawConfig::default();
        raw.apply_env_overrides()?;
        raw.finish()
    }

    /// Load `wa-proxy.toml` when it exists, otherwise the environment
    pub fn load() -> Result<Self> {
        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            return Self::from_toml_file(DEFAULT_CONFIG_FILE);
        }
        Self::from_env()
    }

    /// Load a TOML file; environment variables take precedence over its values
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let mut raw = RawConfig::from_toml_str(&expand_env_vars(&content))?;
        raw.apply_env_overrides()?;
        raw.finish()
    }
}

/// Replace `${VAR_NAME}` with the variable's value (empty when unset)
fn expand_env_vars(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next();

            let mut var_name = String::new();
            while let Some(c) = chars.next_if(|&c| c != '}') {
                var_name.push(c);
            }
            chars.next();

            if let Ok(env_value) = std::env::var(&var_name) {
                result.push_str(&env_value);
            }
        } else {
            result.push(c);
        }
    }

    result
}

// ============================================================================
// Partially filled configuration (file + environment)
// ============================================================================

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    admin_sender: Option<String>,
    #[serde(default)]
    media: RawMedia,
    #[serde(default)]
    webhook: RawWebhook,
    #[serde(default)]
    server: RawServer,
    #[serde(default)]
    whatsapp: RawWhatsApp,
}

#[derive(Debug, Default, Deserialize)]
struct RawMedia {
    dir: Option<String>,
    root: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawWebhook {
    endpoint: Option<String>,
    shared_secret: Option<String>,
    account_sid: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawServer {
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct RawWhatsApp {
    api_url: Option<String>,
    api_key: Option<String>,
    events_host: Option<String>,
    events_port: Option<u16>,
}

impl RawConfig {
    fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Overlay `SULLA_*` values from `lookup`; empty values are ignored
    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if let Some(v) = var("SULLA_ADMIN_SENDER") {
            self.admin_sender = Some(v);
        }
        if let Some(v) = var("SULLA_MEDIA_DIR") {
            self.media.dir = Some(v);
        }
        if let Some(v) = var("SULLA_MEDIA_ROOT") {
            self.media.root = Some(v);
        }
        if let Some(v) = var("SULLA_ENDPOINT") {
            self.webhook.endpoint = Some(v);
        }
        if let Some(v) = var("SULLA_SHARED_SECRET") {
            self.webhook.shared_secret = Some(v);
        }
        if let Some(v) = var("SULLA_ACCOUNT_SID") {
            self.webhook.account_sid = Some(v);
        }
        if let Some(v) = var("SULLA_SERVER_PORT") {
            self.server.port = Some(parse_value(&v, "SULLA_SERVER_PORT")?);
        }
        if let Some(v) = var("SULLA_WA_API_URL") {
            self.whatsapp.api_url = Some(v);
        }
        if let Some(v) = var("SULLA_WA_API_KEY") {
            self.whatsapp.api_key = Some(v);
        }
        if let Some(v) = var("SULLA_EVENTS_HOST") {
            self.whatsapp.events_host = Some(v);
        }
        if let Some(v) = var("SULLA_EVENTS_PORT") {
            self.whatsapp.events_port = Some(parse_value(&v, "SULLA_EVENTS_PORT")?);
        }

        Ok(())
    }

    /// Check required values and fill in defaults
    fn finish(self) -> Result<Config> {
        fn required<T>(value: Option<T>, name: &str) -> Result<T> {
            value.ok_or_else(|| Error::Config(format!("{} not set", name)))
        }

        Ok(Config {
            admin_sender: required(self.admin_sender, "SULLA_ADMIN_SENDER")?,
            media: MediaConfig {
                dir: PathBuf::from(required(self.media.dir, "SULLA_MEDIA_DIR")?),
                root: required(self.media.root, "SULLA_MEDIA_ROOT")?,
            },
            webhook: WebhookConfig {
                endpoint: required(self.webhook.endpoint, "SULLA_ENDPOINT")?,
                shared_secret: required(self.webhook.shared_secret, "SULLA_SHARED_SECRET")?,
                account_sid: self.webhook.account_sid.unwrap_or_else(default_account_sid),
            },
            server: ServerConfig {
                port: required(self.server.port, "SULLA_SERVER_PORT")?,
            },
            whatsapp: WhatsAppConfig {
                api_url: self.whatsapp.api_url.unwrap_or_else(default_wa_api_url),
                api_key: self.whatsapp.api_key,
                events_host: match self.whatsapp.events_host {
                    Some(host) => parse_value(&host, "SULLA_EVENTS_HOST")?,
                    None => default_events_host(),
                },
                events_port: self.whatsapp.events_port.unwrap_or_else(default_events_port),
            },
        })
    }
}

fn parse_value<T: FromStr>(value: &str, name: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("invalid {}: {}", name, value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_TOML: &str = r#"
admin_sender = "+49123456789"

[media]
dir = "media"
root = "https://proxy.example.com/media/"

[webhook]
endpoint = "https://app.example.com/whatsapp"
shared_secret = "s3cret"

[server]
port = 3000
"#;

    #[test]
    fn test_full_toml_with_defaults() {
        let config = RawConfig::from_toml_str(FULL_TOML).unwrap().finish().unwrap();

        assert_eq!(config.admin_sender, "+49123456789");
        assert_eq!(config.media.dir, PathBuf::from("media"));
        assert_eq!(config.media.root, "https://proxy.example.com/media/");
        assert_eq!(config.webhook.shared_secret, "s3cret");
        assert_eq!(config.webhook.account_sid, "sulla");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.whatsapp.api_url, "http://127.0.0.1:8002");
        assert_eq!(config.whatsapp.events_port, 8003);
        assert_eq!(config.whatsapp.events_host, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert!(config.whatsapp.api_key.is_none());
    }

    #[test]
    fn test_missing_required_value() {
        let toml = FULL_TOML.replace("shared_secret = \"s3cret\"", "");
        let err = RawConfig::from_toml_str(&toml).unwrap().finish().unwrap_err();
        assert!(err.to_string().contains("SULLA_SHARED_SECRET"));
    }

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: Vec<(String, String)> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| {
            vars.iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
        }
    }

    #[test]
    fn test_invalid_port_override_is_an_error() {
        let mut raw = RawConfig::from_toml_str(FULL_TOML).unwrap();
        let err = raw
            .apply_overrides(lookup(&[("SULLA_SERVER_PORT", "http")]))
            .unwrap_err();
        assert!(err.to_string().contains("invalid SULLA_SERVER_PORT"));

        let mut raw = RawConfig::default();
        let err = raw
            .apply_overrides(lookup(&[("SULLA_EVENTS_PORT", "70000")]))
            .unwrap_err();
        assert!(err.to_string().contains("invalid SULLA_EVENTS_PORT"));
    }

    #[test]
    fn test_env_overrides_file() {
        let mut raw = RawConfig::from_toml_str(FULL_TOML).unwrap();
        raw.apply_overrides(lookup(&[
            ("SULLA_SERVER_PORT", "8080"),
            ("SULLA_EVENTS_HOST", "0.0.0.0"),
            ("SULLA_SHARED_SECRET", ""),
        ]))
        .unwrap();
        let config = raw.finish().unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.whatsapp.events_host, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(config.webhook.shared_secret, "s3cret");
    }

    #[test]
    fn test_invalid_events_host() {
        let toml = format!("{}\n[whatsapp]\nevents_host = \"not-an-ip\"\n", FULL_TOML);
        let err = RawConfig::from_toml_str(&toml).unwrap().finish().unwrap_err();
        assert!(err.to_string().contains("invalid SULLA_EVENTS_HOST"));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(RawConfig::from_toml_str("admin_sender = ").is_err());
    }

    #[test]
    fn test_from_toml_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("wa-proxy.toml");
        std::fs::write(&path, FULL_TOML).unwrap();

        let config = Config::from_toml_file(&path).unwrap();
        assert_eq!(config.webhook.endpoint, "https://app.example.com/whatsapp");
    }

    #[test]
    fn test_expand_env_vars() {
        unsafe {
            std::env::set_var("WA_PROXY_TEST_VAR", "test_value");
        }

        let result = expand_env_vars("prefix_${WA_PROXY_TEST_VAR}_suffix");
        assert_eq!(result, "prefix_test_value_suffix");

        let result = expand_env_vars("prefix_${WA_PROXY_NONEXISTENT_VAR}_suffix");
        assert_eq!(result, "prefix__suffix");

        unsafe {
            std::env::remove_var("WA_PROXY_TEST_VAR");
        }
    }

    #[test]
    fn test_expand_env_vars_passthrough() {
        assert_eq!(expand_env_vars("no_vars_here"), "no_vars_here");
        assert_eq!(expand_env_vars("cost: $5"), "cost: $5");
    }
}
