//! Snapshot Codec - the fixed binary record format.
//!
//! Every producer (the integrator and the reference ephemeris) writes the
//! same bit-exact layout:
//!
//! ```text
//! offset 0:   u32 LE          body count n
//! offset 4:   n records of 64 bytes, each eight f64 LE:
//!               x, y, z, vx, vy, vz, mass, radius
//! total size: 4 + 64 * n
//! ```
//!
//! Decoding is atomic: it yields a complete [`Snapshot`] or an error, never a
//! partially filled one.

use crate::body::{Body, BodyError, Snapshot};
use thiserror::Error;

/// Size of the body count header in bytes.
pub const HEADER_LEN: usize = 4;

/// Number of f64 fields in one body record.
pub const FIELDS_PER_RECORD: usize = 8;

/// Size of one body record in bytes.
pub const RECORD_LEN: usize = FIELDS_PER_RECORD * std::mem::size_of::<f64>();

/// Errors produced while decoding a snapshot buffer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CodecError {
    /// The buffer ends before the header or the declared records do
    #[error("Truncated input: expected {expected} bytes, got {actual}")]
    TruncatedInput { expected: usize, actual: usize },

    /// The declared count disagrees with the payload length
    #[error("Malformed count: {declared} bodies declared but payload is {payload_len} bytes")]
    MalformedCount { declared: u32, payload_len: usize },

    /// A complete record holds values no body can have
    #[error("Invalid record {index}: {source}")]
    InvalidRecord {
        index: usize,
        #[source]
        source: BodyError,
    },
}

/// Total encoded size of a snapshot with `count` bodies.
///
/// Returns `None` when the size does not fit in `usize`.
pub fn encoded_len(count: usize) -> Option<usize> {
    count.checked_mul(RECORD_LEN)?.checked_add(HEADER_LEN)
}

/// Decodes one snapshot from a complete byte buffer.
pub fn decode(bytes: &[u8]) -> Result<Snapshot, CodecError> {
    if bytes.len() < HEADER_LEN {
        return Err(CodecError::TruncatedInput {
            expected: HEADER_LEN,
            actual: bytes.len(),
        });
    }

    let (header, payload) = bytes.split_at(HEADER_LEN);
    let mut count_bytes = [0u8; HEADER_LEN];
    count_bytes.copy_from_slice(header);
    let declared = u32::from_le_bytes(count_bytes);

    // A size past usize::MAX is longer than any buffer we could hold
    let expected = encoded_len(declared as usize).unwrap_or(usize::MAX);

    if bytes.len() < expected {
        return Err(CodecError::TruncatedInput {
            expected,
            actual: bytes.len(),
        });
    }
    if bytes.len() > expected {
        return Err(CodecError::MalformedCount {
            declared,
            payload_len: payload.len(),
        });
    }

    let mut bodies = Vec::with_capacity(declared as usize);
    for (index, chunk) in payload.chunks_exact(RECORD_LEN).enumerate() {
        let body = Body::from_record(read_record(chunk))
            .map_err(|source| CodecError::InvalidRecord { index, source })?;
        bodies.push(body);
    }

    Ok(Snapshot::from_decoded(bodies))
}

/// Encodes a snapshot into the wire layout.
///
/// `decode(&encode(s)) == Ok(s)` for every snapshot.
pub fn encode(snapshot: &Snapshot) -> Vec<u8> {
    let capacity = encoded_len(snapshot.len()).unwrap_or(HEADER_LEN);
    let mut out = Vec::with_capacity(capacity);

    out.extend_from_slice(&snapshot.count().to_le_bytes());
    for body in snapshot {
        for value in body.to_record() {
            out.extend_from_slice(&value.to_le_bytes());
        }
    }

    out
}

fn read_record(chunk: &[u8]) -> [f64; FIELDS_PER_RECORD] {
    let mut record = [0f64; FIELDS_PER_RECORD];
    for (field, raw) in record.iter_mut().zip(chunk.chunks_exact(8)) {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(raw);
        *field = f64::from_le_bytes(buf);
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;
    use proptest::prelude::*;

    fn sample_snapshot() -> Snapshot {
        let sun = Body::new(Vector3::zeros(), Vector3::zeros(), 1.0, 0.00465).unwrap();
        let earth = Body::new(
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 6.2832, 0.0),
            3.003e-6,
            4.26e-5,
        )
        .unwrap();
        Snapshot::new(vec![sun, earth]).unwrap()
    }

    fn finite() -> std::ops::Range<f64> {
        -1.0e12..1.0e12
    }

    prop_compose! {
        fn arb_body()(
            pos in prop::array::uniform3(finite()),
            vel in prop::array::uniform3(finite()),
            mass in 0.0..1.0e6f64,
            radius in 0.0..1.0e3f64,
        ) -> Body {
            Body::from_record([
                pos[0], pos[1], pos[2], vel[0], vel[1], vel[2], mass, radius,
            ])
            .unwrap()
        }
    }

    #[test]
    fn test_layout_is_bit_exact() {
        let snapshot = sample_snapshot();
        let bytes = encode(&snapshot);

        assert_eq!(bytes.len(), 4 + 64 * 2);
        assert_eq!(&bytes[0..4], &2u32.to_le_bytes());
        // Second record, field 0 (x) = 1.0
        assert_eq!(&bytes[4 + 64..4 + 64 + 8], &1.0f64.to_le_bytes());
        // Second record, field 6 (mass)
        assert_eq!(&bytes[4 + 64 + 48..4 + 64 + 56], &3.003e-6f64.to_le_bytes());
    }

    #[test]
    fn test_empty_snapshot() {
        let bytes = encode(&Snapshot::empty());
        assert_eq!(bytes, vec![0, 0, 0, 0]);
        assert_eq!(decode(&bytes).unwrap(), Snapshot::empty());
    }

    #[test]
    fn test_missing_header_is_truncated() {
        assert_eq!(
            decode(&[1, 0]),
            Err(CodecError::TruncatedInput { expected: 4, actual: 2 })
        );
        assert_eq!(
            decode(&[]),
            Err(CodecError::TruncatedInput { expected: 4, actual: 0 })
        );
    }

    #[test]
    fn test_trailing_bytes_are_malformed() {
        let mut bytes = encode(&sample_snapshot());
        bytes.extend_from_slice(&[0u8; 64]);

        assert_eq!(
            decode(&bytes),
            Err(CodecError::MalformedCount { declared: 2, payload_len: 192 })
        );
    }

    #[test]
    fn test_huge_declared_count_is_truncated() {
        let bytes = u32::MAX.to_le_bytes();
        let expected = encoded_len(u32::MAX as usize).unwrap_or(usize::MAX);
        assert_eq!(
            decode(&bytes),
            Err(CodecError::TruncatedInput { expected, actual: 4 })
        );
    }

    #[test]
    fn test_invalid_record_reports_index() {
        let mut bytes = encode(&sample_snapshot());
        // Corrupt the mass of body 1 to a negative value
        let offset = HEADER_LEN + RECORD_LEN + 6 * 8;
        bytes[offset..offset + 8].copy_from_slice(&(-5.0f64).to_le_bytes());

        assert_eq!(
            decode(&bytes),
            Err(CodecError::InvalidRecord {
                index: 1,
                source: BodyError::NegativeMass(-5.0),
            })
        );
    }

    proptest! {
        #[test]
        fn prop_roundtrip(bodies in prop::collection::vec(arb_body(), 0..32)) {
            let snapshot = Snapshot::new(bodies).unwrap();
            let bytes = encode(&snapshot);
            prop_assert_eq!(bytes.len(), encoded_len(snapshot.len()).unwrap());
            prop_assert_eq!(decode(&bytes).unwrap(), snapshot);
        }

        #[test]
        fn prop_short_buffer_is_truncated(
            bodies in prop::collection::vec(arb_body(), 1..16),
            cut in 1usize..64,
        ) {
            let snapshot = Snapshot::new(bodies).unwrap();
            let bytes = encode(&snapshot);
            let short = &bytes[..bytes.len() - cut];

            prop_assert_eq!(
                decode(short),
                Err(CodecError::TruncatedInput {
                    expected: bytes.len(),
                    actual: short.len(),
                })
            );
        }
    }
}
