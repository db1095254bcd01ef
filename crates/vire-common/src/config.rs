//! ---
//! vire_section: "01-core-functionality"
//! vire_subsection: "module"
//! vire_type: "source"
//! vire_scope: "code"
//! vire_description: "Shared primitives and utilities for the messaging model."
//! vire_version: "v0.0.0-prealpha"
//! vire_owner: "tbd"
//! ---
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::logging::LogFormat;

fn default_emitter() -> String {
    "vire.client.0".to_owned()
}

fn default_body_layout_name() -> String {
    "vire::message::body_format::typed_payload".to_owned()
}

fn default_body_layout_version() -> Option<String> {
    Some("1.0".to_owned())
}

fn default_logging_directory() -> PathBuf {
    PathBuf::from("target/logs")
}

fn default_log_format() -> LogFormat {
    LogFormat::StructuredJson
}

/// Primary configuration object for a Vire messaging endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub envelope: EnvelopeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Metadata describing where an [`AppConfig`] was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedAppConfig {
    pub config: AppConfig,
    pub source: PathBuf,
}

impl AppConfig {
    pub const ENV_CONFIG_PATH: &'static str = "VIRE_CONFIG";

    /// Load configuration from disk, respecting the `VIRE_CONFIG` override.
    pub fn load<P: AsRef<Path>>(candidates: &[P]) -> Result<Self> {
        Ok(Self::load_with_source(candidates)?.config)
    }

    /// Load configuration from disk together with the effective source path.
    pub fn load_with_source<P: AsRef<Path>>(candidates: &[P]) -> Result<LoadedAppConfig> {
        if let Ok(env_path) = std::env::var(Self::ENV_CONFIG_PATH) {
            if !env_path.trim().is_empty() {
                let path = PathBuf::from(env_path);
                let config = Self::from_path(&path)?;
                return Ok(LoadedAppConfig {
                    config,
                    source: path,
                });
            }
        }

        for candidate in candidates {
            if candidate.as_ref().exists() {
                let path = candidate.as_ref().to_path_buf();
                let config = Self::from_path(&path)?;
                return Ok(LoadedAppConfig {
                    config,
                    source: path,
                });
            }
        }

        Err(anyhow!(
            "no configuration files found. inspected: {}",
            candidates
                .iter()
                .map(|p| p.as_ref().display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    }

    /// Read and validate a single configuration file.
    pub fn from_path(path: &Path) -> Result<Self> {
        debug!(config_path = %path.display(), "loading configuration");
        let contents = fs::read_to_string(path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;
        let config = toml::from_str::<AppConfig>(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate structural invariants.
    pub fn validate(&self) -> Result<()> {
        self.envelope.validate()
    }
}

impl std::str::FromStr for AppConfig {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        let config: AppConfig =
            toml::from_str(content).with_context(|| "failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }
}

/// Defaults applied to every envelope produced by a messaging endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvelopeConfig {
    /// Name stamped as the emitter of outgoing message identifiers.
    #[serde(default = "default_emitter")]
    pub emitter: String,
    /// Model identifier name of the body layout.
    #[serde(default = "default_body_layout_name")]
    pub body_layout_name: String,
    /// Optional version of the body layout.
    #[serde(default = "default_body_layout_version")]
    pub body_layout_version: Option<String>,
    /// Deliver responses asynchronously to `async_address`.
    #[serde(default)]
    pub asynchronous: bool,
    #[serde(default)]
    pub async_address: Option<String>,
    /// Metadata attached, in order, to every header.
    #[serde(default)]
    pub metadata: IndexMap<String, String>,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            emitter: default_emitter(),
            body_layout_name: default_body_layout_name(),
            body_layout_version: default_body_layout_version(),
            asynchronous: false,
            async_address: None,
            metadata: IndexMap::new(),
        }
    }
}

impl EnvelopeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.emitter.trim().is_empty() {
            return Err(anyhow!("envelope emitter must not be empty"));
        }
        if self.body_layout_name.is_empty() {
            return Err(anyhow!("envelope body_layout_name must not be empty"));
        }
        if matches!(self.body_layout_version.as_deref(), Some("")) {
            return Err(anyhow!(
                "envelope body_layout_version must be omitted rather than empty"
            ));
        }
        if self.metadata.keys().any(|key| key.is_empty()) {
            return Err(anyhow!("envelope metadata keys must not be empty"));
        }
        if self.asynchronous && self.async_address().is_none() {
            return Err(anyhow!(
                "envelope is asynchronous but declares no async_address"
            ));
        }
        Ok(())
    }

    /// The asynchronous reply address, if one is configured and non-empty.
    pub fn async_address(&self) -> Option<&str> {
        self.async_address
            .as_deref()
            .filter(|address| !address.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    #[serde(default)]
    pub file_prefix: Option<String>,
    /// Also write a daily rolling JSON log file under `directory`.
    #[serde(default)]
    pub file_output: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_logging_directory(),
            format: default_log_format(),
            file_prefix: None,
            file_output: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        config.validate().expect("default config validates");
        assert_eq!(config.envelope.emitter, "vire.client.0");
        assert_eq!(config.envelope.body_layout_version.as_deref(), Some("1.0"));
    }

    #[test]
    fn parses_envelope_section_with_ordered_metadata() {
        let config: AppConfig = r#"
            [envelope]
            emitter = "vire.server.1"
            asynchronous = true
            async_address = "vire.client.0.replies"

            [envelope.metadata]
            zeta = "1"
            alpha = "2"
        "#
        .parse()
        .expect("config parses");

        assert_eq!(config.envelope.emitter, "vire.server.1");
        assert_eq!(
            config.envelope.async_address(),
            Some("vire.client.0.replies")
        );
        let keys: Vec<_> = config.envelope.metadata.keys().cloned().collect();
        assert_eq!(keys, vec!["zeta".to_owned(), "alpha".to_owned()]);
    }

    #[test]
    fn asynchronous_without_address_is_rejected() {
        let err = r#"
            [envelope]
            asynchronous = true
            async_address = ""
        "#
        .parse::<AppConfig>()
        .expect_err("missing address must fail");
        assert!(err.to_string().contains("async_address"));
    }

    #[test]
    fn empty_metadata_key_is_rejected() {
        let err = r#"
            [envelope.metadata]
            "" = "orphan"
        "#
        .parse::<AppConfig>()
        .expect_err("keyless metadata must fail");
        assert!(err.to_string().contains("metadata keys"));
    }

    #[test]
    fn empty_emitter_is_rejected() {
        assert!(r#"
            [envelope]
            emitter = "  "
        "#
        .parse::<AppConfig>()
        .is_err());
    }
}
