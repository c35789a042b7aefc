//! Defines the core runtime `Config` struct, its defaults, and related utilities.
//! Submodules handle loading, building, and validation.

pub(crate) mod builder;
pub(crate) mod file;
pub(crate) mod loading;
pub(crate) mod validation;

pub use builder::ConfigBuilder;
pub use file::ConfigFile;
pub use loading::load_config_file;

use crate::core::error::{AppError, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// How the SMTP connection is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsPolicy {
    /// Plain text only.
    None,
    /// STARTTLS when the server offers it.
    Opportunistic,
    /// STARTTLS is mandatory.
    Required,
    /// Implicit TLS from the first byte (port 465 style).
    Wrapper,
}

impl FromStr for TlsPolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "off" => Ok(TlsPolicy::None),
            "opportunistic" => Ok(TlsPolicy::Opportunistic),
            "required" | "starttls" => Ok(TlsPolicy::Required),
            "wrapper" | "implicit" => Ok(TlsPolicy::Wrapper),
            other => Err(AppError::Config(format!(
                "unknown TLS policy '{}' (expected none, opportunistic, required or wrapper)",
                other
            ))),
        }
    }
}

/// Connection parameters for the SMTP relay.
#[derive(Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub sender: Option<String>,
    pub tls: TlsPolicy,
    pub accept_invalid_certs: bool,
    pub timeout: Duration,
}

impl SmtpSettings {
    /// The From address; the relay account itself unless overridden.
    pub fn sender(&self) -> &str {
        self.sender.as_deref().unwrap_or(&self.username)
    }
}

impl Default for SmtpSettings {
    fn default() -> Self {
        SmtpSettings {
            host: "mail.example.com".to_string(),
            port: 25,
            username: "archive@mail.example.com".to_string(),
            password: "StrongPass".to_string(),
            sender: None,
            tls: TlsPolicy::Required,
            accept_invalid_certs: true,
            timeout: Duration::from_secs(30),
        }
    }
}

impl std::fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("sender", &self.sender)
            .field("tls", &self.tls)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Runtime configuration settings used by the mailcast core logic.
#[derive(Debug, Clone)]
pub struct Config {
    pub smtp: SmtpSettings,
    pub log_dir: PathBuf,
    pub api_bind: Option<String>,
    pub loaded_config_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            smtp: SmtpSettings::default(),
            log_dir: PathBuf::from("logs"),
            api_bind: None,
            loaded_config_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tls_policy_parses_aliases() {
        assert_eq!("STARTTLS".parse::<TlsPolicy>().unwrap(), TlsPolicy::Required);
        assert_eq!("implicit".parse::<TlsPolicy>().unwrap(), TlsPolicy::Wrapper);
        assert_eq!(" none ".parse::<TlsPolicy>().unwrap(), TlsPolicy::None);
        assert!("tls1.3".parse::<TlsPolicy>().is_err());
    }

    #[test]
    fn sender_falls_back_to_username() {
        let mut smtp = SmtpSettings::default();
        assert_eq!(smtp.sender(), "archive@mail.example.com");
        smtp.sender = Some("noreply@example.com".to_string());
        assert_eq!(smtp.sender(), "noreply@example.com");
    }

    #[test]
    fn debug_output_hides_password() {
        let rendered = format!("{:?}", Config::default());
        assert!(!rendered.contains("StrongPass"));
        assert!(rendered.contains("<redacted>"));
    }
}
