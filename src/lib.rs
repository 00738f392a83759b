// Copyright (c) 2025 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Template Injection Exploitation Library
 * Context breakout resolution, engine detection, command execution and
 * verified file transfer over an already identified SSTI injection point
 *
 * @copyright 2025 Bountyy Oy
 * @license Proprietary
 */

pub mod config;
pub mod context;
pub mod detector;
pub mod engines;
pub mod errors;
pub mod escape;
pub mod executor;
pub mod file_channel;
pub mod fingerprint;
pub mod injector;
pub mod oracle;
pub mod payload;
pub mod session;
pub mod telemetry;
pub mod tokens;

pub use context::{Context, ContextCatalog};
pub use detector::{EngineDetector, ProbeResult};
pub use engines::EngineProfile;
pub use errors::{ExploitError, ExploitResult};
pub use executor::CommandExecutor;
pub use file_channel::{FileChannel, Integrity, ReadReport, TransferState, WriteReport};
pub use fingerprint::ContentFingerprint;
pub use injector::Injector;
pub use oracle::{InjectionOracle, OracleResponse};
pub use payload::{FramedPayload, PayloadBuilder};
pub use session::ExploitSession;
