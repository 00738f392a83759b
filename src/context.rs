// Copyright (c) 2025 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Breakout Context Catalog
 * Ordered table of syntactic breakouts for a reflection point
 *
 * @copyright 2025 Bountyy Oy
 * @license Proprietary
 */

use crate::errors::{ExploitError, ExploitResult};
use serde::Serialize;
use std::collections::HashSet;
use tracing::warn;

pub const MIN_NESTING_LEVEL: u8 = 1;
pub const MAX_NESTING_LEVEL: u8 = 5;

/// How the reflected text is enclosed, and how to get out of it.
///
/// `breakout_prefix` is appended right after the reflected text to close the
/// enclosing structures. `reentry_trailer` reopens a harmless wrapper so the
/// rest of the original template still parses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Context {
    pub nesting_level: u8,
    pub breakout_prefix: &'static str,
    pub reentry_trailer: &'static str,
}

impl Context {
    pub const fn new(
        nesting_level: u8,
        breakout_prefix: &'static str,
        reentry_trailer: &'static str,
    ) -> Self {
        Self {
            nesting_level,
            breakout_prefix,
            reentry_trailer,
        }
    }

    /// Surround an already rendered body with this context's breakout
    pub fn enclose(&self, body: &str) -> String {
        let mut out = String::with_capacity(
            self.breakout_prefix.len() + body.len() + self.reentry_trailer.len(),
        );
        out.push_str(self.breakout_prefix);
        out.push_str(body);
        out.push_str(self.reentry_trailer);
        out
    }
}

/// Immutable, level-ordered list of candidate contexts.
#[derive(Debug, Clone)]
pub struct ContextCatalog {
    entries: Vec<Context>,
}

impl ContextCatalog {
    /// Build a catalog from raw table rows.
    ///
    /// Rows are stably sorted by nesting level so authoring order is kept
    /// within a level. Exact duplicates are dropped.
    pub fn new(rows: &[Context]) -> ExploitResult<Self> {
        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(rows.len());

        for row in rows {
            if !(MIN_NESTING_LEVEL..=MAX_NESTING_LEVEL).contains(&row.nesting_level) {
                return Err(ExploitError::Configuration(format!(
                    "context {:?} has nesting level {} outside {}..={}",
                    row.breakout_prefix, row.nesting_level, MIN_NESTING_LEVEL, MAX_NESTING_LEVEL
                )));
            }
            if row.breakout_prefix.is_empty() {
                return Err(ExploitError::Configuration(format!(
                    "context at level {} has an empty breakout prefix",
                    row.nesting_level
                )));
            }
            if !seen.insert(*row) {
                warn!("[SSTI] Dropping duplicate context row {:?}", row);
                continue;
            }
            entries.push(*row);
        }

        if entries.is_empty() {
            return Err(ExploitError::Configuration(
                "context catalog is empty".to_string(),
            ));
        }

        entries.sort_by_key(|c| c.nesting_level);
        Ok(Self { entries })
    }

    /// Entries with nesting level not above `max_level`, in probe order
    pub fn up_to_level(&self, max_level: u8) -> impl Iterator<Item = &Context> {
        self.entries
            .iter()
            .take_while(move |c| c.nesting_level <= max_level)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Context> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
