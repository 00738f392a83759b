// Copyright (c) 2025 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Template Engine Profiles
 * Declarative per-engine data: tag syntax, breakout table, code templates
 *
 * @copyright 2025 Bountyy Oy
 * @license Proprietary
 */

pub mod mako;

use crate::context::{Context, ContextCatalog};
use crate::errors::{ExploitError, ExploitResult};

/// Opening and closing markers of one template construct
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagPair {
    pub open: &'static str,
    pub close: &'static str,
}

impl TagPair {
    pub fn wrap(&self, fragment: &str) -> String {
        format!("{}{}{}", self.open, fragment, self.close)
    }
}

/// Engine-language code snippets with `{name}` placeholders.
///
/// Statement templates that produce output assign it to `output_var`.
#[derive(Debug, Clone, Copy)]
pub struct CodeTemplates {
    pub output_var: &'static str,
    /// `{a}`, `{b}`: integers; assigns their product
    pub sentinel: &'static str,
    /// Marker expression; `{a}`, `{b}`: integers summed by the engine
    pub marker: &'static str,
    /// Expression; `{separator}`, `{chars}`: literals
    pub join: &'static str,
    /// Assigns "<os name>-<platform>"
    pub platform: &'static str,
    /// `{command}`: literal; assigns stdout and stderr interleaved
    pub exec: &'static str,
    /// `{path}`: literal; assigns the hex SHA-256 of the file
    pub digest: &'static str,
    /// `{path}`: literal; assigns the standard base64 of the file
    pub read: &'static str,
    /// `{path}`: literal
    pub truncate: &'static str,
    /// `{path}`, `{chunk}`: literals; chunk is URL-safe base64
    pub append: &'static str,
    /// `{path}`: literal; assigns the file size in bytes
    pub size: &'static str,
    /// `{path}`: literal; assigns `True` or `False` without raising
    pub exists: &'static str,
}

/// A value substituted into a code template
#[derive(Debug, Clone, Copy)]
pub enum Slot<'a> {
    /// Any caller-influenced text; always quoted through the engine's escaper
    Literal(&'a str),
    /// Internally generated integer, inserted verbatim
    Number(u64),
}

/// Everything the core needs to know about one template engine.
#[derive(Debug, Clone, Copy)]
pub struct EngineProfile {
    pub name: &'static str,
    pub language: &'static str,
    pub expression_tag: TagPair,
    pub block_tag: TagPair,
    pub contexts: &'static [Context],
    pub code: CodeTemplates,
    /// Quotes a value as a string literal of `language`
    pub quote: fn(&str) -> String,
}

impl EngineProfile {
    pub fn catalog(&self) -> ExploitResult<ContextCatalog> {
        ContextCatalog::new(self.contexts)
    }

    /// Substitute `slots` into `template`.
    ///
    /// Literal slots go through `quote`; there is no path for raw strings.
    pub fn fill(&self, template: &str, slots: &[(&str, Slot<'_>)]) -> String {
        let mut code = template.to_string();
        for (name, slot) in slots {
            let value = match slot {
                Slot::Literal(text) => (self.quote)(text),
                Slot::Number(n) => n.to_string(),
            };
            code = code.replace(&format!("{{{}}}", name), &value);
        }
        code
    }
}

/// Look up a built-in profile by case-insensitive name
pub fn by_name(name: &str) -> ExploitResult<&'static EngineProfile> {
    match name.to_ascii_lowercase().as_str() {
        "mako" => Ok(&mako::MAKO),
        other => Err(ExploitError::Configuration(format!(
            "unsupported template engine: {}",
            other
        ))),
    }
}
