// Copyright (c) 2025 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

pub mod core;
pub mod loader;
pub mod validation;

pub use core::{DetectionConfig, ExploitConfig, ObservabilityConfig, TransferConfig};
pub use loader::{apply_overrides, ConfigFormat, ConfigLoader};
pub use validation::ConfigValidator;
