// Copyright (c) 2025 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Literal quoting for values embedded inside injected code.
//!
//! This is independent of context breakout: a breakout closes the template
//! structure around the reflection point, while these functions keep a caller
//! value (a path, a shell command) from closing the string literal it sits in.

use std::fmt::Write;

/// Characters that pass through a literal unchanged
fn is_plain(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '-' | '.' | '/' | ':' | ',' | '=' | '+' | '@' | '~')
}

/// Render `value` as a double-quoted Python string literal.
///
/// Everything outside a small plain set is emitted as a numeric escape, so the
/// literal never contains quotes, backslashes, braces, newlines or `%` (which
/// would end a Mako `<% %>` block early when followed by `>`).
pub fn python_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if is_plain(c) {
            out.push(c);
            continue;
        }
        let code = c as u32;
        // Writing to a String cannot fail
        let _ = if code <= 0xff {
            write!(out, "\\x{:02x}", code)
        } else if code <= 0xffff {
            write!(out, "\\u{:04x}", code)
        } else {
            write!(out, "\\U{:08x}", code)
        };
    }
    out.push('"');
    out
}
