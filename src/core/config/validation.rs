//! Sanity checks applied to a fully merged `Config`.

use super::Config;
use crate::core::error::{AppError, Result};

pub(crate) fn validate(config: &Config) -> Result<()> {
    let smtp = &config.smtp;
    if smtp.host.trim().is_empty() {
        return Err(AppError::Config("SMTP host must not be empty".to_string()));
    }
    if smtp.port == 0 {
        return Err(AppError::Config("SMTP port must be non-zero".to_string()));
    }
    if smtp.username.trim().is_empty() {
        return Err(AppError::Config("SMTP username must not be empty".to_string()));
    }
    if smtp.timeout.is_zero() {
        return Err(AppError::Config("SMTP timeout must be positive".to_string()));
    }
    if config.log_dir.as_os_str().is_empty() {
        return Err(AppError::Config("log directory must not be empty".to_string()));
    }
    if let Some(bind) = &config.api_bind {
        if bind.trim().is_empty() {
            return Err(AppError::Config("API bind address must not be empty".to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn defaults_are_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn rejects_zero_port_and_blank_host() {
        let mut config = Config::default();
        config.smtp.port = 0;
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.smtp.host = "  ".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn rejects_zero_timeout() {
        let mut config = Config::default();
        config.smtp.timeout = Duration::ZERO;
        assert!(matches!(validate(&config), Err(AppError::Config(_))));
    }
}
