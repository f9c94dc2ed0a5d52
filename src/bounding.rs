//! Character-budget truncation for tool output.
//!
//! Lengths are measured in `char`s, never bytes, so a cut can not land inside
//! a multi-byte sequence.

/// Appended to output that was cut to fit its budget.
pub const TRUNCATION_MARKER: &str = "... [Output truncated]";

/// Smallest budget a model-suggested truncation length may request.
pub const MIN_OUTPUT_CHARS: usize = 100;

/// Output text after bounding, with the budget that was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedOutput {
    pub text: String,
    /// Character budget in effect.
    pub limit: usize,
    /// True when `text` was cut and ends with [`TRUNCATION_MARKER`].
    pub truncated: bool,
}

/// Bound `text` to at most `max_chars` characters.
///
/// Text within budget is returned unchanged. Longer text keeps its first
/// `max_chars - marker_len` characters followed by [`TRUNCATION_MARKER`], so
/// the result is exactly `max_chars` long. A budget smaller than the marker
/// yields a prefix of the marker itself.
pub fn bound(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let marker_len = TRUNCATION_MARKER.chars().count();
    if max_chars < marker_len {
        return TRUNCATION_MARKER.chars().take(max_chars).collect();
    }
    let mut out: String = text.chars().take(max_chars - marker_len).collect();
    out.push_str(TRUNCATION_MARKER);
    out
}

/// Bound `text` and record whether truncation happened.
pub fn bound_output(text: &str, max_chars: usize) -> BoundedOutput {
    let truncated = text.chars().count() > max_chars;
    if truncated {
        tracing::debug!(
            original_chars = text.chars().count(),
            limit = max_chars,
            "truncating tool output"
        );
    }
    BoundedOutput {
        text: bound(text, max_chars),
        limit: max_chars,
        truncated,
    }
}

/// Resolve the budget for one session from an optional model preference.
///
/// A preference is clamped to `[MIN_OUTPUT_CHARS, max_limit]`; without one
/// the configured default applies.
pub fn effective_limit(default_limit: usize, preferred: Option<i64>, max_limit: usize) -> usize {
    match preferred {
        Some(value) => {
            let floor = MIN_OUTPUT_CHARS.min(max_limit);
            let value = usize::try_from(value.max(0)).unwrap_or(usize::MAX);
            value.clamp(floor, max_limit)
        }
        None => default_limit,
    }
}
