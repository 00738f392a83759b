// Copyright (c) 2025 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Injection Oracle Boundary
 * The single seam between the exploitation core and whatever transport
 * delivers a payload to the vulnerable renderer
 *
 * @copyright 2025 Bountyy Oy
 * @license Proprietary
 */

use async_trait::async_trait;

/// Text returned by one oracle call plus the transport's success flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleResponse {
    pub text: String,
    pub ok: bool,
}

impl OracleResponse {
    pub fn rendered(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ok: true,
        }
    }

    /// Transport failure; `reason` is carried in `text` for logging
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            text: reason.into(),
            ok: false,
        }
    }
}

/// A remote renderer that evaluates attacker-influenced template text.
///
/// Every call may change remote state. Implementations must not retry on their
/// own behalf in a way that could replay a payload out of order; retry and
/// backoff belong to the transport wrapped behind this trait.
#[async_trait]
pub trait InjectionOracle: Send + Sync {
    async fn invoke(&self, payload: &str) -> OracleResponse;
}
