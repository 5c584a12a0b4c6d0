//! Envelope Codec Module
//!
//! Serializes a [`CacheEntry`] into the bytes stored at a physical key.
//!
//! Layout (integers big-endian):
//!
//! ```text
//! 0..4   magic  b"BCE1"
//! 4      version (1)
//! 5      expiry tag: 0 = never, 1 = timestamp
//! 6..14  expiry, Unix milliseconds (0 when the tag is "never")
//! 14..   value as JSON
//! ```

use bytes::{BufMut, Bytes, BytesMut};
use serde_json::Value;
use thiserror::Error;

use crate::cache::{CacheEntry, Expiry};

/// Leading bytes of every envelope.
pub const ENVELOPE_MAGIC: &[u8; 4] = b"BCE1";

/// Current envelope format version.
pub const ENVELOPE_VERSION: u8 = 1;

/// Size of the fixed header preceding the payload.
pub const HEADER_LEN: usize = 14;

const TAG_NEVER: u8 = 0;
const TAG_AT: u8 = 1;

// == Envelope Error ==
/// Reasons a stored object is not a valid envelope.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeError {
    #[error("envelope truncated: {0} bytes")]
    Truncated(usize),

    #[error("bad envelope magic")]
    BadMagic,

    #[error("unsupported envelope version {0}")]
    UnsupportedVersion(u8),

    #[error("bad expiry tag {tag} (timestamp {timestamp})")]
    BadExpiryTag { tag: u8, timestamp: u64 },

    #[error("unparseable payload: {0}")]
    Payload(String),
}

// == Encode ==
/// Encodes a value and its expiry into an envelope.
pub fn encode(value: &Value, expires_at: Expiry) -> Result<Bytes, serde_json::Error> {
    let payload = serde_json::to_vec(value)?;

    let (tag, timestamp) = match expires_at {
        Expiry::Never => (TAG_NEVER, 0),
        Expiry::At(ms) => (TAG_AT, ms),
    };

    let mut buf = BytesMut::with_capacity(HEADER_LEN + payload.len());
    buf.put_slice(ENVELOPE_MAGIC);
    buf.put_u8(ENVELOPE_VERSION);
    buf.put_u8(tag);
    buf.put_u64(timestamp);
    buf.put_slice(&payload);

    Ok(buf.freeze())
}

// == Decode ==
/// Decodes an envelope, rejecting anything this codec did not produce.
pub fn decode(data: &[u8]) -> Result<CacheEntry, EnvelopeError> {
    if data.len() < HEADER_LEN {
        return Err(EnvelopeError::Truncated(data.len()));
    }
    if &data[0..4] != ENVELOPE_MAGIC {
        return Err(EnvelopeError::BadMagic);
    }
    if data[4] != ENVELOPE_VERSION {
        return Err(EnvelopeError::UnsupportedVersion(data[4]));
    }

    let tag = data[5];
    let mut raw_ts = [0u8; 8];
    raw_ts.copy_from_slice(&data[6..HEADER_LEN]);
    let timestamp = u64::from_be_bytes(raw_ts);

    let expires_at = match (tag, timestamp) {
        (TAG_NEVER, 0) => Expiry::Never,
        (TAG_AT, ms) => Expiry::At(ms),
        (tag, timestamp) => return Err(EnvelopeError::BadExpiryTag { tag, timestamp }),
    };

    let value = serde_json::from_slice(&data[HEADER_LEN..])
        .map_err(|e| EnvelopeError::Payload(e.to_string()))?;

    Ok(CacheEntry { value, expires_at })
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_roundtrip_structured_value() {
        let value = json!({"name": "polonius", "lines": [2, 2], "wit": null, "ratio": 0.5});
        let bytes = encode(&value, Expiry::At(1_700_000_000_000)).unwrap();

        let entry = decode(&bytes).unwrap();
        assert_eq!(entry.value, value);
        assert_eq!(entry.expires_at, Expiry::At(1_700_000_000_000));
    }

    #[test]
    fn test_header_layout() {
        let bytes = encode(&json!(42), Expiry::At(258)).unwrap();

        assert_eq!(&bytes[0..4], b"BCE1");
        assert_eq!(bytes[4], 1);
        assert_eq!(bytes[5], 1);
        assert_eq!(&bytes[6..14], &[0u8, 0, 0, 0, 0, 0, 1, 2][..]);
        assert_eq!(&bytes[14..], b"42");
    }

    #[test]
    fn test_never_is_distinct_from_zero_timestamp() {
        let never = encode(&json!(1), Expiry::Never).unwrap();
        let zero = encode(&json!(1), Expiry::At(0)).unwrap();

        assert_ne!(never, zero);
        assert_eq!(decode(&never).unwrap().expires_at, Expiry::Never);
        assert_eq!(decode(&zero).unwrap().expires_at, Expiry::At(0));
    }

    #[test]
    fn test_decode_truncated() {
        assert_eq!(decode(b""), Err(EnvelopeError::Truncated(0)));
        assert_eq!(decode(b"BCE1\x01"), Err(EnvelopeError::Truncated(5)));
    }

    #[test]
    fn test_decode_foreign_bytes() {
        let result = decode(b"something I'd like to cache");
        assert_eq!(result, Err(EnvelopeError::BadMagic));
    }

    #[test]
    fn test_decode_unsupported_version() {
        let mut bytes = encode(&json!("v"), Expiry::Never).unwrap().to_vec();
        bytes[4] = 9;
        assert_eq!(decode(&bytes), Err(EnvelopeError::UnsupportedVersion(9)));
    }

    #[test]
    fn test_decode_bad_expiry_tag() {
        let mut bytes = encode(&json!("v"), Expiry::Never).unwrap().to_vec();
        bytes[5] = 7;
        assert!(matches!(decode(&bytes), Err(EnvelopeError::BadExpiryTag { tag: 7, .. })));

        // "never" with a timestamp attached is not something encode produces
        let mut bytes = encode(&json!("v"), Expiry::Never).unwrap().to_vec();
        bytes[13] = 1;
        assert!(matches!(decode(&bytes), Err(EnvelopeError::BadExpiryTag { tag: 0, .. })));
    }

    #[test]
    fn test_decode_bad_payload() {
        let mut bytes = encode(&json!("complete"), Expiry::Never).unwrap().to_vec();
        bytes.truncate(bytes.len() - 3);
        assert!(matches!(decode(&bytes), Err(EnvelopeError::Payload(_))));
    }

    #[test]
    fn test_floats_survive_bit_for_bit() {
        let floats = [
            1.0715660391465826e-75,
            -1.81996730402717e-179,
            -1.603964615428183e143,
            0.1 + 0.2,
            f64::MIN_POSITIVE,
            f64::MAX,
            5e-324,
        ];

        for f in floats {
            let bytes = encode(&json!(f), Expiry::Never).unwrap();
            let decoded = decode(&bytes).unwrap().value.as_f64().unwrap();
            assert_eq!(decoded.to_bits(), f.to_bits(), "{f:e} came back as {decoded:e}");
        }
    }
}
