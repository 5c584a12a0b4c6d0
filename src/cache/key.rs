//! Key Codec Module
//!
//! Maps logical cache keys onto physical object keys under the configured prefix.

// == Key Codec ==
/// Applies and strips the cache's key prefix.
///
/// No character validation happens here; whatever the object store accepts
/// as a key name is passed through.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyCodec {
    prefix: String,
}

impl KeyCodec {
    /// Creates a codec for `prefix` (may be empty).
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Returns the configured prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Maps a logical key to its physical key.
    pub fn to_physical(&self, logical_key: &str) -> String {
        format!("{}{}", self.prefix, logical_key)
    }

    /// Maps a physical key back to its logical key.
    ///
    /// Returns `None` when the key lies outside this cache's namespace.
    pub fn strip_prefix<'a>(&self, physical_key: &'a str) -> Option<&'a str> {
        physical_key.strip_prefix(self.prefix.as_str())
    }
}
