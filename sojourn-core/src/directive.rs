//! The `update profile:` chat directive.
//!
//! Grammar of the text following the marker:
//!
//! ```text
//! directive := piece ("," piece)*
//! piece     := key "=" value        (split on the first '=')
//! ```
//!
//! Keys and values are trimmed; keys are lower-cased. A piece without `=`, or
//! with a blank key or value, is dropped. Malformed pieces are never an error.

use std::collections::BTreeMap;

use tracing::debug;

/// Marker that turns a chat message into a profile directive (matched case-insensitively).
pub const PROFILE_UPDATE_MARKER: &str = "update profile:";

/// Field name (lower-cased) -> raw value, in key order.
pub type ProfileUpdates = BTreeMap<String, String>;

/// Byte offset just past the first occurrence of the marker, if any.
///
/// The marker is ASCII, so the search compares ASCII-case-insensitively on the
/// original text; offsets stay valid for slicing even when the surrounding
/// text is not ASCII.
fn marker_end(text: &str) -> Option<usize> {
    let len = PROFILE_UPDATE_MARKER.len();
    text.char_indices()
        .map(|(i, _)| i)
        .find(|&i| {
            text.get(i..i + len)
                .is_some_and(|s| s.eq_ignore_ascii_case(PROFILE_UPDATE_MARKER))
        })
        .map(|i| i + len)
}

/// True when the text carries the profile directive marker anywhere.
pub fn contains_marker(text: &str) -> bool {
    marker_end(text).is_some()
}

/// Extract `key=value` pairs following the marker.
///
/// Returns an empty map when the marker is absent or no piece is well formed.
/// Keys are not checked against the profile allow-list here.
pub fn extract_updates(text: &str) -> ProfileUpdates {
    match marker_end(text) {
        Some(start) => parse_pieces(&text[start..]),
        None => ProfileUpdates::new(),
    }
}

fn parse_pieces(body: &str) -> ProfileUpdates {
    let mut out = ProfileUpdates::new();
    for piece in body.split(',') {
        match parse_piece(piece) {
            Some((key, value)) => {
                out.insert(key, value);
            }
            None if !piece.trim().is_empty() => {
                debug!(piece = piece.trim(), "dropping malformed profile directive piece");
            }
            None => {}
        }
    }
    out
}

fn parse_piece(piece: &str) -> Option<(String, String)> {
    let (key, value) = piece.split_once('=')?;
    let key = key.trim();
    let value = value.trim();
    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key.to_lowercase(), value.to_string()))
}
