// Copyright (c) 2025 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use anyhow::{Context, Result};
use validator::Validate;

use super::core::ExploitConfig;
use crate::engines;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate_exploit_config(config: &ExploitConfig) -> Result<()> {
        config.validate()
            .context("Configuration validation failed")?;

        Self::validate_detection_config(config)?;
        Self::validate_observability_config(config)?;

        Ok(())
    }

    fn validate_detection_config(config: &ExploitConfig) -> Result<()> {
        engines::by_name(&config.detection.engine)
            .map_err(|e| anyhow::anyhow!("{}", e))?;

        Ok(())
    }

    fn validate_observability_config(config: &ExploitConfig) -> Result<()> {
        let level = config.observability.log_level.to_lowercase();
        // Full EnvFilter directives ("lonkero_ssti=debug") are accepted as-is
        if !level.contains('=') && !LOG_LEVELS.contains(&level.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log level: {}",
                config.observability.log_level
            ));
        }

        Ok(())
    }
}
