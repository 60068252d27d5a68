//! Canonical key encoding.
//!
//! A key's identity is its encoded form: two keys are equivalent iff their
//! encodings are byte-equal. Both the relational uniqueness constraint and
//! the log-line matching depend on the encoding being stable across calls.

use serde::Serialize;

use crate::error::Result;

/// Encode a key into its canonical JSON form.
///
/// The encoding is deterministic for a fixed key type: derived structs
/// serialize fields in declaration order and JSON escapes newlines, so the
/// result is a single line. Keys built on map types with nondeterministic
/// iteration order (e.g. `HashMap`) are the caller's responsibility.
pub fn encode_key<K: Serialize + ?Sized>(key: &K) -> Result<String> {
    Ok(serde_json::to_string(key)?)
}
