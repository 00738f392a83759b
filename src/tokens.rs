// Copyright (c) 2025 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use rand::Rng;

/// Separator alphabet for the join probe
const SEPARATOR_CHARSET: &[u8] = b"abcdefghijklm";
/// Joined-string alphabet, disjoint from the separator alphabet
const JOINED_CHARSET: &[u8] = b"nopqrstuvwxyz";

pub const JOIN_TOKEN_LEN: usize = 2;

fn random_from(charset: &[u8], len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| charset[rng.random_range(0..charset.len())] as char)
        .collect()
}

/// Two-character separator/joined pair drawn from disjoint alphabets
pub fn join_pair() -> (String, String) {
    (
        random_from(SEPARATOR_CHARSET, JOIN_TOKEN_LEN),
        random_from(JOINED_CHARSET, JOIN_TOKEN_LEN),
    )
}

/// Random integer with exactly `digits` decimal digits
pub fn random_int(digits: u32) -> u64 {
    let low = 10u64.pow(digits.saturating_sub(1));
    let high = 10u64.pow(digits);
    rand::rng().random_range(low..high)
}

/// Joining `chars` with `separator`, the same way the remote `str.join` does
pub fn join_chars(separator: &str, chars: &str) -> String {
    let parts: Vec<String> = chars.chars().map(String::from).collect();
    parts.join(separator)
}
