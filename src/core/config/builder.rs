//! Merges defaults, the config file and command-line overrides into a `Config`.

use super::file::ConfigFile;
use super::validation::validate;
use super::{Config, TlsPolicy};
use crate::core::error::Result;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Builder for [`Config`]. Later layers win: defaults, then file, then overrides.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies every value present in a parsed config file.
    pub fn apply_file(mut self, file: &ConfigFile, path: &Path) -> Result<Self> {
        let smtp = &file.smtp;
        if let Some(host) = &smtp.host {
            self.config.smtp.host = host.clone();
        }
        if let Some(port) = smtp.port {
            self.config.smtp.port = port;
        }
        if let Some(username) = &smtp.username {
            self.config.smtp.username = username.clone();
        }
        if let Some(password) = &smtp.password {
            self.config.smtp.password = password.clone();
        }
        if let Some(sender) = &smtp.sender {
            self.config.smtp.sender = Some(sender.clone());
        }
        if let Some(tls) = &smtp.tls {
            self.config.smtp.tls = tls.parse()?;
        }
        if let Some(accept) = smtp.accept_invalid_certs {
            self.config.smtp.accept_invalid_certs = accept;
        }
        if let Some(secs) = smtp.timeout_secs {
            self.config.smtp.timeout = Duration::from_secs(secs);
        }
        if let Some(dir) = &file.storage.log_dir {
            self.config.log_dir = PathBuf::from(dir);
        }
        if let Some(bind) = &file.api.bind {
            self.config.api_bind = Some(bind.clone());
        }
        self.config.loaded_config_path = Some(path.display().to_string());
        Ok(self)
    }

    pub fn host(mut self, host: Option<String>) -> Self {
        if let Some(host) = host {
            self.config.smtp.host = host;
        }
        self
    }

    pub fn port(mut self, port: Option<u16>) -> Self {
        if let Some(port) = port {
            self.config.smtp.port = port;
        }
        self
    }

    pub fn username(mut self, username: Option<String>) -> Self {
        if let Some(username) = username {
            self.config.smtp.username = username;
        }
        self
    }

    pub fn password(mut self, password: Option<String>) -> Self {
        if let Some(password) = password {
            self.config.smtp.password = password;
        }
        self
    }

    pub fn sender(mut self, sender: Option<String>) -> Self {
        if sender.is_some() {
            self.config.smtp.sender = sender;
        }
        self
    }

    pub fn tls(mut self, tls: Option<TlsPolicy>) -> Self {
        if let Some(tls) = tls {
            self.config.smtp.tls = tls;
        }
        self
    }

    pub fn log_dir(mut self, dir: Option<PathBuf>) -> Self {
        if let Some(dir) = dir {
            self.config.log_dir = dir;
        }
        self
    }

    pub fn api_bind(mut self, bind: Option<String>) -> Self {
        if bind.is_some() {
            self.config.api_bind = bind;
        }
        self
    }

    /// Validates and returns the finished configuration.
    pub fn build(self) -> Result<Config> {
        validate(&self.config)?;
        tracing::debug!("Effective configuration: {:?}", self.config);
        Ok(self.config)
    }
}
