// Copyright (c) 2025 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Exploitation Error Types
 * Terminal failures of the template-injection core, built with thiserror
 *
 * @copyright 2025 Bountyy Oy
 * @license Proprietary
 */

use thiserror::Error;

/// Terminal failures surfaced by the exploitation core.
///
/// Integrity mismatches are not errors; they travel as
/// [`crate::file_channel::Integrity::Mismatch`] on an otherwise successful result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExploitError {
    /// Transport-level failure reported by the oracle for one call
    #[error("Oracle unreachable: {reason}")]
    OracleUnreachable { reason: String },

    /// No catalog entry produced the expected sentinel
    #[error("No breakout context matched for {engine} after {attempts} probes")]
    ContextUnresolved { engine: String, attempts: usize },

    /// Fingerprint probe contradicts the expected engine
    #[error("Engine mismatch for {engine}: expected {expected:?}, observed {observed:?}")]
    EngineMismatch {
        engine: String,
        expected: String,
        observed: Option<String>,
    },

    #[error("Remote file missing or unreadable: {path}")]
    RemoteFileMissing { path: String },

    #[error("Remote path already exists and overwrite is disabled: {path}")]
    OverwriteDenied { path: String },

    /// Oracle answered but the content could not be decoded
    #[error("Malformed oracle response for {operation}: {reason}")]
    MalformedResponse { operation: String, reason: String },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Stable machine-readable names for callers that branch on failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    OracleUnreachable,
    ContextUnresolved,
    EngineMismatch,
    RemoteFileMissing,
    OverwriteDenied,
    MalformedResponse,
    Configuration,
}

impl ExploitError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExploitError::OracleUnreachable { .. } => ErrorKind::OracleUnreachable,
            ExploitError::ContextUnresolved { .. } => ErrorKind::ContextUnresolved,
            ExploitError::EngineMismatch { .. } => ErrorKind::EngineMismatch,
            ExploitError::RemoteFileMissing { .. } => ErrorKind::RemoteFileMissing,
            ExploitError::OverwriteDenied { .. } => ErrorKind::OverwriteDenied,
            ExploitError::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            ExploitError::Configuration(_) => ErrorKind::Configuration,
        }
    }

    /// Whether the whole session is unusable after this error.
    ///
    /// The remaining variants only end the current call or operation.
    pub fn is_terminal_for_session(&self) -> bool {
        matches!(
            self,
            ExploitError::ContextUnresolved { .. }
                | ExploitError::EngineMismatch { .. }
                | ExploitError::Configuration(_)
        )
    }

    /// Caller can fix the failure by changing its own input (e.g. the overwrite flag)
    pub fn is_caller_correctable(&self) -> bool {
        matches!(
            self,
            ExploitError::OverwriteDenied { .. } | ExploitError::Configuration(_)
        )
    }
}

/// Result type for exploitation operations
pub type ExploitResult<T> = Result<T, ExploitError>;
