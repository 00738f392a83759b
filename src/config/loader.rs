// Copyright (c) 2025 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::core::ExploitConfig;
use super::validation::ConfigValidator;

pub struct ConfigLoader {
    config_path: PathBuf,
    format: ConfigFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
    Json,
}

impl ConfigLoader {
    pub fn new<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let path = config_path.as_ref().to_path_buf();
        let format = Self::detect_format(&path)?;

        Ok(Self {
            config_path: path,
            format,
        })
    }

    pub fn with_format<P: AsRef<Path>>(config_path: P, format: ConfigFormat) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            format,
        }
    }

    fn detect_format(path: &Path) -> Result<ConfigFormat> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| anyhow::anyhow!("Could not determine config file format"))?;

        match extension {
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            "toml" => Ok(ConfigFormat::Toml),
            "json" => Ok(ConfigFormat::Json),
            _ => Err(anyhow::anyhow!("Unsupported config file format: {}", extension)),
        }
    }

    /// Read, parse, apply environment overrides and validate
    pub fn load_config(&self) -> Result<ExploitConfig> {
        let content = std::fs::read_to_string(&self.config_path)
            .with_context(|| format!("Failed to read config file: {:?}", self.config_path))?;

        let mut config = Self::parse(&content, self.format)?;

        apply_overrides(&mut config, |key| std::env::var(key).ok())?;

        ConfigValidator::validate_exploit_config(&config)?;

        Ok(config)
    }

    pub fn parse(content: &str, format: ConfigFormat) -> Result<ExploitConfig> {
        let config = match format {
            ConfigFormat::Yaml => serde_yaml::from_str(content)
                .context("Failed to parse YAML config")?,
            ConfigFormat::Toml => toml::from_str(content)
                .context("Failed to parse TOML config")?,
            ConfigFormat::Json => serde_json::from_str(content)
                .context("Failed to parse JSON config")?,
        };
        Ok(config)
    }
}

/// Apply `SSTI_*` and `LOG_LEVEL` overrides looked up through `lookup`
pub fn apply_overrides<F>(config: &mut ExploitConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(chunk_size) = lookup("SSTI_CHUNK_SIZE") {
        config.transfer.chunk_size = chunk_size.parse()
            .context("Invalid SSTI_CHUNK_SIZE")?;
    }

    if let Some(overwrite) = lookup("SSTI_FORCE_OVERWRITE") {
        config.transfer.overwrite = overwrite.parse()
            .context("Invalid SSTI_FORCE_OVERWRITE")?;
    }

    if let Some(confirm) = lookup("SSTI_CONFIRM_CHUNKS") {
        config.transfer.confirm_chunks = confirm.parse()
            .context("Invalid SSTI_CONFIRM_CHUNKS")?;
    }

    if let Some(engine) = lookup("SSTI_ENGINE") {
        config.detection.engine = engine;
    }

    if let Some(log_level) = lookup("LOG_LEVEL") {
        config.observability.log_level = log_level;
    }

    Ok(())
}
