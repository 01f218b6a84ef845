// src/utils/serialization.rs
//! JSON serialization helpers used by snapshot storage and the CLI.

use serde::{Deserialize, Serialize};

/// Serializes a value to indented JSON, for files people may read.
pub fn serialize_pretty<T: Serialize>(data: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(data)
}

/// Deserializes a value from a JSON string.
///
/// # Note
/// The lifetime parameter lets the result borrow from the input string.
pub fn deserialize<'a, T: Deserialize<'a>>(data: &'a str) -> Result<T, serde_json::Error> {
    serde_json::from_str(data)
}
