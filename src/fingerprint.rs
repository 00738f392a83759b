// Copyright (c) 2025 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;

/// Hex length of a SHA-256 digest
pub const FINGERPRINT_HEX_LEN: usize = 64;

/// SHA-256 of file content, compared against the same digest computed remotely.
///
/// Only ever used to detect corruption, never to authenticate anything.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ContentFingerprint(String);

impl ContentFingerprint {
    pub fn of(data: &[u8]) -> Self {
        Self(hex::encode(Sha256::digest(data)))
    }

    /// Accept remote output only if it looks exactly like a digest.
    ///
    /// Empty output, error pages and anything else yield `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let well_formed = text.len() == FINGERPRINT_HEX_LEN
            && text.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        well_formed.then(|| Self(text.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
