// Copyright (c) 2025 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::context::MAX_NESTING_LEVEL;
use crate::file_channel::DEFAULT_CHUNK_SIZE;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ExploitConfig {
    #[validate(nested)]
    #[serde(default)]
    pub transfer: TransferConfig,

    #[validate(nested)]
    #[serde(default)]
    pub detection: DetectionConfig,

    #[validate(nested)]
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TransferConfig {
    /// Raw bytes per append fragment; keep the encoded payload under the
    /// transport's length limit
    #[validate(range(min = 1, max = 65536))]
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Replace files that already exist on the remote host
    #[serde(default = "default_false")]
    pub overwrite: bool,

    /// Confirm the remote size after every chunk instead of only at the end
    #[serde(default = "default_false")]
    pub confirm_chunks: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DetectionConfig {
    #[validate(length(min = 1))]
    #[serde(default = "default_engine")]
    pub engine: String,

    /// Deepest context nesting level to probe
    #[validate(range(min = 1, max = 5))]
    #[serde(default = "default_max_level")]
    pub max_level: u8,

    #[serde(default = "default_true")]
    pub probe_exec: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ObservabilityConfig {
    #[validate(length(min = 1))]
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_false")]
    pub log_json: bool,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            overwrite: false,
            confirm_chunks: false,
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            engine: default_engine(),
            max_level: default_max_level(),
            probe_exec: true,
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_false() -> bool {
    false
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_engine() -> String {
    "mako".to_string()
}

fn default_max_level() -> u8 {
    MAX_NESTING_LEVEL
}

fn default_log_level() -> String {
    "info".to_string()
}
