//! Portable encodings for template documents.
//!
//! A template travels in one of two forms: pretty-printed JSON for the text
//! export dialog, and a compact token (zlib-deflated JSON in url-safe base64)
//! embedded in `?template=` share links. Payloads stay flexible here
//! (`serde_json::Value`); the typed schema lives in the `canvas` crate.

use std::io::{Read, Write};

use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Query parameter carrying the compact token in a share link.
pub const TEMPLATE_PARAM: &str = "template";

/// Longest share link accepted by [`share_link`] unless configured otherwise.
pub const DEFAULT_MAX_LINK_LEN: usize = 8000;

/// Url-safe alphabet, no padding on encode, padding optional on decode.
const URL_SAFE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Error returned by the encode and decode functions.
#[derive(Debug, thiserror::Error)]
pub enum ShareError {
    /// Nothing but whitespace was supplied.
    #[error("template text is empty")]
    Empty,
    /// The text is neither JSON nor a template token.
    #[error("unreadable template: not JSON and not a template token")]
    Unreadable,
    /// The text parsed, but not to a JSON object.
    #[error("invalid template: expected a JSON object, found {found}")]
    NotAnObject { found: &'static str },
    /// The value could not be serialized to JSON.
    #[error("failed to serialize template: {0}")]
    Serialize(#[from] serde_json::Error),
    /// The deflate stream could not be written.
    #[error("failed to compress template: {0}")]
    Compress(#[from] std::io::Error),
    /// The finished link is over the configured length limit.
    #[error("share link is {len} characters, over the {max}-character limit")]
    LinkTooLong { len: usize, max: usize },
}

/// Output form for exported templates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Pretty-printed JSON.
    #[default]
    Plain,
    /// Deflated, url-safe base64 token.
    Compact,
}

/// Encode a value as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`ShareError::Serialize`] if the value cannot be represented as JSON.
pub fn encode_plain<T: Serialize + ?Sized>(value: &T) -> Result<String, ShareError> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Encode a value as a compact token: JSON, zlib deflate, url-safe base64.
///
/// # Errors
///
/// Returns [`ShareError::Serialize`] or [`ShareError::Compress`].
pub fn encode_compact<T: Serialize + ?Sized>(value: &T) -> Result<String, ShareError> {
    let json = serde_json::to_vec(value)?;
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(json.len() / 2), Compression::default());
    encoder.write_all(&json)?;
    let compressed = encoder.finish()?;
    Ok(URL_SAFE.encode(compressed))
}

/// Encode a value in the requested form.
///
/// # Errors
///
/// See [`encode_plain`] and [`encode_compact`].
pub fn encode<T: Serialize + ?Sized>(value: &T, format: ExportFormat) -> Result<String, ShareError> {
    match format {
        ExportFormat::Plain => encode_plain(value),
        ExportFormat::Compact => encode_compact(value),
    }
}

/// Decode template text in any supported form.
///
/// Tries plain JSON first, then the compact token, then the uncompressed
/// base64 token older share links carried.
///
/// # Errors
///
/// - [`ShareError::Empty`] for blank input.
/// - [`ShareError::Unreadable`] when no form parses.
/// - [`ShareError::NotAnObject`] when the parsed value is not a JSON object.
pub fn decode(text: &str) -> Result<Value, ShareError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ShareError::Empty);
    }

    let value = match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => value,
        Err(json_err) => {
            tracing::debug!(error = %json_err, "template is not plain JSON; trying token forms");
            decode_token(trimmed).ok_or(ShareError::Unreadable)?
        }
    };

    match value {
        Value::Object(_) => Ok(value),
        other => Err(ShareError::NotAnObject { found: json_kind(&other) }),
    }
}

fn decode_token(token: &str) -> Option<Value> {
    let bytes = decode_base64(token)?;

    if let Some(json) = inflate(&bytes) {
        match serde_json::from_slice(&json) {
            Ok(value) => return Some(value),
            Err(e) => tracing::debug!(error = %e, "inflated token is not JSON"),
        }
    }

    // Older links: base64 of the UTF-8 JSON, no compression.
    match serde_json::from_slice(&bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(error = %e, "token is not a legacy JSON token either");
            None
        }
    }
}

/// Accepts both alphabets: `+`/`/` are folded onto `-`/`_` first.
fn decode_base64(token: &str) -> Option<Vec<u8>> {
    let normalized: String = token
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();
    match URL_SAFE.decode(normalized) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            tracing::debug!(error = %e, "token is not base64");
            None
        }
    }
}

fn inflate(bytes: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(bytes.len() * 4);
    match ZlibDecoder::new(bytes).read_to_end(&mut out) {
        Ok(_) => Some(out),
        Err(e) => {
            tracing::debug!(error = %e, "token is not a zlib stream");
            None
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Build a share link by attaching `token` to `base_url` as `?template=`.
///
/// Any query or fragment already on `base_url` is dropped.
///
/// # Errors
///
/// Returns [`ShareError::LinkTooLong`] if the link exceeds `max_len` characters.
pub fn share_link(base_url: &str, token: &str, max_len: usize) -> Result<String, ShareError> {
    let base = base_url.split(['?', '#']).next().unwrap_or(base_url);
    let link = format!("{base}?{TEMPLATE_PARAM}={token}");
    let len = link.chars().count();
    if len > max_len {
        return Err(ShareError::LinkTooLong { len, max: max_len });
    }
    Ok(link)
}

/// Extract the percent-decoded `template` parameter from a URL, if present.
#[must_use]
pub fn template_param(url: &str) -> Option<String> {
    let (_, query) = url.split_once('?')?;
    let query = query.split('#').next().unwrap_or(query);
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        (key == TEMPLATE_PARAM).then(|| percent_decode(value))
    })
}

fn percent_decode(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3).and_then(|h| std::str::from_utf8(h).ok());
            if let Some(byte) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
