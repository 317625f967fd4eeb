//! Configuration module - environment variable parsing

use std::env;
use std::str::FromStr;

use crate::host::SandboxConfig;
use crate::radar::SmoothingSettings;
use crate::util::rate_limit::INPUT_RATE_LIMIT;
use crate::util::time::DEFAULT_TPS;

/// Output format for logs and the HUD
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(()),
        }
    }
}

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Log line format
    pub log_format: OutputFormat,

    /// Initial bearing smoothing parameters
    pub smoothing: SmoothingSettings,

    /// Sandbox ticks per second
    pub sandbox_tps: u32,
    /// Sandbox turn limit, 0 for none
    pub sandbox_max_turns: u64,
    /// Sandbox radar noise seed
    pub sandbox_seed: u64,

    /// Ticks between HUD renders, 0 disables the HUD
    pub hud_interval_ticks: u32,
    pub hud_format: OutputFormat,

    /// Max terminal key events per second
    pub input_rate_limit: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let smoothing_enabled = parse_or(&lookup, "SMOOTHING_ENABLED", true, parse_bool)?;
        let smoothing_alpha = parse_or(&lookup, "SMOOTHING_ALPHA", 0.3, |v| v.parse().ok())?;
        let smoothing = SmoothingSettings::new(smoothing_enabled, smoothing_alpha)
            .map_err(|_| ConfigError::Invalid("SMOOTHING_ALPHA"))?;

        let sandbox_tps: u32 = parse_or(&lookup, "SANDBOX_TPS", DEFAULT_TPS, |v| v.parse().ok())?;
        if sandbox_tps == 0 {
            return Err(ConfigError::Invalid("SANDBOX_TPS"));
        }

        Ok(Self {
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            log_format: parse_or(&lookup, "LOG_FORMAT", OutputFormat::Text, |v| v.parse().ok())?,

            smoothing,

            sandbox_tps,
            sandbox_max_turns: parse_or(&lookup, "SANDBOX_MAX_TURNS", 0, |v| v.parse().ok())?,
            sandbox_seed: parse_or(&lookup, "SANDBOX_SEED", 7, |v| v.parse().ok())?,

            hud_interval_ticks: parse_or(&lookup, "HUD_INTERVAL_TICKS", 15, |v| v.parse().ok())?,
            hud_format: parse_or(&lookup, "HUD_FORMAT", OutputFormat::Text, |v| v.parse().ok())?,

            input_rate_limit: parse_or(&lookup, "INPUT_RATE_LIMIT", INPUT_RATE_LIMIT, |v| {
                v.parse().ok()
            })?,
        })
    }

    /// Sandbox settings derived from this configuration
    pub fn sandbox(&self) -> SandboxConfig {
        SandboxConfig {
            tps: self.sandbox_tps,
            max_turns: (self.sandbox_max_turns > 0).then_some(self.sandbox_max_turns),
            seed: self.sandbox_seed,
            ..SandboxConfig::default()
        }
    }
}

fn parse_or<F, T>(
    lookup: &F,
    key: &'static str,
    default: T,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => parse(value.trim()).ok_or(ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, OutputFormat::Text);
        assert!(config.smoothing.enabled);
        assert_eq!(config.smoothing.alpha, 0.3);
        assert_eq!(config.sandbox_tps, 30);
        assert_eq!(config.hud_interval_ticks, 15);
        assert_eq!(config.input_rate_limit, 60);
        assert_eq!(config.sandbox().max_turns, None);
    }

    #[test]
    fn overrides() {
        let config = load(&[
            ("LOG_LEVEL", "debug"),
            ("LOG_FORMAT", "JSON"),
            ("SMOOTHING_ENABLED", "off"),
            ("SMOOTHING_ALPHA", "1"),
            ("SANDBOX_MAX_TURNS", "500"),
            ("SANDBOX_SEED", "42"),
            ("HUD_FORMAT", "json"),
        ])
        .unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_format, OutputFormat::Json);
        assert!(!config.smoothing.enabled);
        assert_eq!(config.smoothing.alpha, 1.0);
        assert_eq!(config.hud_format, OutputFormat::Json);

        let sandbox = config.sandbox();
        assert_eq!(sandbox.max_turns, Some(500));
        assert_eq!(sandbox.seed, 42);
    }

    #[test]
    fn rejects_bad_values() {
        for (key, value) in [
            ("SMOOTHING_ALPHA", "0"),
            ("SMOOTHING_ALPHA", "1.2"),
            ("SMOOTHING_ALPHA", "abc"),
            ("SMOOTHING_ENABLED", "maybe"),
            ("SANDBOX_TPS", "0"),
            ("HUD_FORMAT", "xml"),
            ("INPUT_RATE_LIMIT", "-1"),
        ] {
            let err = load(&[(key, value)]).unwrap_err();
            assert!(err.to_string().contains(key), "{key}={value}: {err}");
        }
    }
}
