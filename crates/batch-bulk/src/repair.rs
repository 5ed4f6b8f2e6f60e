//! Result-body decoding with separator repair.
//!
//! The remote system has been observed to omit the comma between adjacent
//! records in some JSON result payloads. [`DelimiterRepair`] recovers
//! exactly that class of damage: when the decoder reports a missing
//! `,` separator at a position, a single comma is inserted at the
//! reported byte offset and the decode is retried. Any other decode
//! failure propagates unchanged. The algorithm is purely textual and
//! offset-based; it must not be broadened into general JSON repair.
//!
//! The strategy sits behind [`ResultDecoder`] so a stricter decoder can
//! be substituted without touching the retrieval flow.

use std::fmt;

use serde_json::Value;
use tracing::debug;

/// Decodes a raw result body into a JSON value.
pub trait ResultDecoder: fmt::Debug + Send + Sync {
    /// Decode `text`, possibly repairing it first. Failures are the
    /// decoder's own error; callers propagate them unchanged.
    fn decode(&self, text: &str) -> serde_json::Result<Value>;
}

/// Default decoder: retries after inserting a comma at the offset of a
/// missing-separator error.
#[derive(Debug, Clone, Copy, Default)]
pub struct DelimiterRepair;

impl ResultDecoder for DelimiterRepair {
    fn decode(&self, text: &str) -> serde_json::Result<Value> {
        let first_err = match serde_json::from_str(text) {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        let mut patched = text.to_string();
        let mut err = first_err;
        loop {
            let Some(offset) = missing_separator_offset(&patched, &err) else {
                return Err(err);
            };
            debug!(offset, "repairing result body, inserting separator");
            patched.insert(offset, ',');

            match serde_json::from_str(&patched) {
                Ok(value) => return Ok(value),
                Err(next_err) => err = next_err,
            }
        }
    }
}

/// The byte offset at which a comma is missing, if `err` is exactly the
/// missing-separator symptom; `None` for every other failure.
fn missing_separator_offset(text: &str, err: &serde_json::Error) -> Option<usize> {
    if !err.is_syntax() {
        return None;
    }
    let message = err.to_string();
    if !(message.starts_with("expected `,` or `]`") || message.starts_with("expected `,` or `}`"))
    {
        return None;
    }
    byte_offset(text, err.line(), err.column())
}

/// Map a 1-based line/column error position to a byte offset into `text`.
/// The column points at the unexpected character, so the insertion point
/// is `column - 1` within its line.
fn byte_offset(text: &str, line: usize, column: usize) -> Option<usize> {
    if line == 0 || column == 0 {
        return None;
    }

    let mut start_of_line = 0;
    let mut remaining = line - 1;
    if remaining > 0 {
        for (index, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                remaining -= 1;
                if remaining == 0 {
                    start_of_line = index + 1;
                    break;
                }
            }
        }
        if remaining > 0 {
            return None;
        }
    }

    let offset = start_of_line + column - 1;
    (offset <= text.len() && text.is_char_boundary(offset)).then_some(offset)
}
