//! JSON parser for the historical accident dataset.
//!
//! Spreadsheet exports write missing cells as bare `NaN` tokens, which strict
//! JSON rejects. Those tokens (and `Infinity`/`-Infinity`) are rewritten to
//! `null` before decoding.

use std::borrow::Cow;

use serde_json::Value;
use tracing::warn;

use crate::record::AccidentRecord;

const NON_FINITE_TOKENS: [&[u8]; 3] = [b"-Infinity", b"Infinity", b"NaN"];

/// Decodes a JSON array of accident records from raw bytes.
///
/// Array elements that are not objects are skipped.
///
/// # Errors
///
/// Returns an error if the bytes are not a JSON array.
pub fn parse_dataset(bytes: &[u8]) -> Result<Vec<AccidentRecord>, serde_json::Error> {
    let normalized = normalize_non_finite(bytes);
    let values: Vec<Value> = serde_json::from_slice(&normalized)?;
    let total = values.len();

    let records: Vec<AccidentRecord> = values
        .into_iter()
        .filter_map(AccidentRecord::from_value)
        .collect();

    if records.len() < total {
        warn!(
            skipped = total - records.len(),
            "Dataset contains non-object entries"
        );
    }

    Ok(records)
}

/// Replaces bare non-finite number tokens outside of strings with `null`.
///
/// Returns the input unchanged (borrowed) when there is nothing to replace.
pub fn normalize_non_finite(bytes: &[u8]) -> Cow<'_, [u8]> {
    let mut out: Option<Vec<u8>> = None;
    let mut in_string = false;
    let mut escaped = false;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];

        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
        } else if b == b'"' {
            in_string = true;
        } else if let Some(token) = NON_FINITE_TOKENS
            .iter()
            .find(|token| bytes[i..].starts_with(token))
        {
            let buf = out.get_or_insert_with(|| bytes[..i].to_vec());
            buf.extend_from_slice(b"null");
            i += token.len();
            continue;
        }

        if let Some(buf) = out.as_mut() {
            buf.push(b);
        }
        i += 1;
    }

    match out {
        Some(buf) => Cow::Owned(buf),
        None => Cow::Borrowed(bytes),
    }
}
