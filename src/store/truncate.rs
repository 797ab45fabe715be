//! Middle truncation
//!
//! Oversized values keep a fixed head and the longest tail that fits under
//! `limit - head - 1`, so the newest data at the end survives intact.

use std::borrow::Cow;

/// Cut the middle out of `value` when it has more than `limit` characters
///
/// Counts characters, never bytes. With the cookie settings
/// (`limit = 1650`, `prefix = 33`) the result is the first 33 and the last
/// 1616 characters.
pub fn truncate_middle(value: &str, limit: usize, prefix: usize) -> Cow<'_, str> {
    let len = value.chars().count();
    if len <= limit {
        return Cow::Borrowed(value);
    }

    let prefix = prefix.min(limit);
    let suffix = limit.saturating_sub(prefix + 1);

    let head_end = byte_offset(value, prefix);
    let tail_start = byte_offset(value, len - suffix);

    let mut out = String::with_capacity(head_end + value.len() - tail_start);
    out.push_str(&value[..head_end]);
    out.push_str(&value[tail_start..]);
    Cow::Owned(out)
}

fn byte_offset(value: &str, char_index: usize) -> usize {
    value
        .char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or(value.len())
}
