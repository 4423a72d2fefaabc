//! Fixed-width big-endian octet helpers
//!
//! JWK integers are minimal (RFC 7518 §6.3) while SEC1 and ASN.1 fields are
//! fixed width, so every conversion passes through these two functions.

use crate::{KeyUtilsError, error::Result};

/// Strips leading zero octets.
///
/// An all-zero input yields an empty vector rather than a single zero octet.
pub fn prune_leading_zeros(bytes: &[u8]) -> Vec<u8> {
    let offset = bytes.iter().take_while(|b| **b == 0).count();
    bytes[offset..].to_vec()
}

/// Right-aligns `bytes` into a zero-filled buffer of exactly `len` octets
pub fn append_leading_zeros(bytes: &[u8], len: usize) -> Result<Vec<u8>> {
    if bytes.len() > len {
        return Err(KeyUtilsError::InvalidLength {
            len: bytes.len(),
            max: len,
        });
    }

    let mut padded = vec![0u8; len];
    padded[len - bytes.len()..].copy_from_slice(bytes);
    Ok(padded)
}

/// Normalizes a big-endian integer to exactly `len` octets.
///
/// Oversized input is accepted as long as the excess is leading zeros.
pub(crate) fn fixed_width(bytes: &[u8], len: usize) -> Result<Vec<u8>> {
    append_leading_zeros(&prune_leading_zeros(bytes), len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prune() {
        assert_eq!(prune_leading_zeros(&[0, 0, 1, 0, 2]), vec![1, 0, 2]);
        assert_eq!(prune_leading_zeros(&[7, 0]), vec![7, 0]);
        assert!(prune_leading_zeros(&[]).is_empty());
        assert!(prune_leading_zeros(&[0, 0, 0, 0]).is_empty());
    }

    #[test]
    fn append() {
        assert_eq!(append_leading_zeros(&[1, 2], 4).unwrap(), vec![0, 0, 1, 2]);
        assert_eq!(append_leading_zeros(&[], 2).unwrap(), vec![0, 0]);
        assert_eq!(
            append_leading_zeros(&[1, 2, 3], 2),
            Err(KeyUtilsError::InvalidLength { len: 3, max: 2 })
        );
    }

    #[test]
    fn prune_then_append_restores_input() {
        let samples: [&[u8]; 5] = [&[0, 0, 0], &[0, 1, 2, 3], &[9, 8, 7], &[0], &[]];
        for sample in samples {
            assert_eq!(
                append_leading_zeros(&prune_leading_zeros(sample), sample.len()).unwrap(),
                sample
            );
        }
    }

    #[test]
    fn fixed_width_accepts_oversized_zero_prefix() {
        assert_eq!(fixed_width(&[0, 0, 0, 5], 2).unwrap(), vec![0, 5]);
        assert!(fixed_width(&[1, 0, 0], 2).is_err());
    }
}
