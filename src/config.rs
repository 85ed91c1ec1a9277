//! Service configuration loaded from the environment (and `.env`, if present).

use crate::validation::ValidationConfig;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DNS_TIMEOUT_MS: u64 = 2000;
pub const DEFAULT_DNS_ATTEMPTS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{var} has invalid value {value:?}")]
    InvalidValue { var: &'static str, value: String },
}

/// Settings of the validator exposed by the HTTP service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationSettings {
    pub use_mx: bool,
    pub use_mx_with_fallback_to_a: bool,
    pub message: Option<String>,
    pub mx_message: Option<String>,
    pub dns_timeout: Duration,
    pub dns_attempts: usize,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            use_mx: false,
            use_mx_with_fallback_to_a: false,
            message: None,
            mx_message: None,
            dns_timeout: Duration::from_millis(DEFAULT_DNS_TIMEOUT_MS),
            dns_attempts: DEFAULT_DNS_ATTEMPTS,
        }
    }
}

impl ValidationSettings {
    /// Validator options for these settings. The DNS timeout also bounds
    /// each query from the caller's side.
    pub fn validation_config(&self) -> ValidationConfig {
        ValidationConfig {
            use_mx: self.use_mx,
            use_mx_with_fallback_to_a: self.use_mx_with_fallback_to_a,
            message: self.message.clone(),
            mx_message: self.mx_message.clone(),
            dns_timeout: Some(self.dns_timeout),
            ..ValidationConfig::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub validation: ValidationSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            validation: ValidationSettings::default(),
        }
    }
}

impl AppConfig {
    /// Reads the configuration from `.env` and the process environment.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `EMAIL_VERIFIER_HOST` | `127.0.0.1` |
    /// | `EMAIL_VERIFIER_PORT` | `8080` |
    /// | `EMAIL_VERIFIER_USE_MX` | `false` |
    /// | `EMAIL_VERIFIER_MX_FALLBACK_A` | `false` |
    /// | `EMAIL_VERIFIER_MESSAGE` | unset |
    /// | `EMAIL_VERIFIER_MX_MESSAGE` | unset |
    /// | `EMAIL_VERIFIER_DNS_TIMEOUT_MS` | `2000` |
    /// | `EMAIL_VERIFIER_DNS_ATTEMPTS` | `2` |
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Builds the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AppConfig::default();

        Ok(Self {
            host: lookup("EMAIL_VERIFIER_HOST").unwrap_or(defaults.host),
            port: parse_var(&lookup, "EMAIL_VERIFIER_PORT")?.unwrap_or(defaults.port),
            validation: ValidationSettings {
                use_mx: parse_flag(&lookup, "EMAIL_VERIFIER_USE_MX")?.unwrap_or(false),
                use_mx_with_fallback_to_a: parse_flag(&lookup, "EMAIL_VERIFIER_MX_FALLBACK_A")?
                    .unwrap_or(false),
                message: lookup("EMAIL_VERIFIER_MESSAGE").filter(|m| !m.is_empty()),
                mx_message: lookup("EMAIL_VERIFIER_MX_MESSAGE").filter(|m| !m.is_empty()),
                dns_timeout: parse_var(&lookup, "EMAIL_VERIFIER_DNS_TIMEOUT_MS")?
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.validation.dns_timeout),
                dns_attempts: parse_var(&lookup, "EMAIL_VERIFIER_DNS_ATTEMPTS")?
                    .unwrap_or(defaults.validation.dns_attempts),
            },
        })
    }
}

fn parse_var<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { var, value }),
    }
}

fn parse_flag<F>(lookup: &F, var: &'static str) -> Result<Option<bool>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" | "" => Ok(Some(false)),
            _ => Err(ConfigError::InvalidValue { var, value }),
        },
    }
}
