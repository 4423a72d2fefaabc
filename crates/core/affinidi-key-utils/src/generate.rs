//! Key pair generation

use tracing::debug;

use crate::{JWK, KeyUtilsError, NamedCurve, ec, error::Result, jwk::KeyType};

/// A freshly generated key pair as JWKs
#[derive(Debug, Clone, PartialEq)]
pub struct KeyPair {
    pub public_key: JWK,
    pub private_key: JWK,
}

/// Generates a key pair from the OS RNG.
///
/// EC keys default to P-256 when no curve is given. RSA generation fails with
/// `RSAIsUnsupported`.
pub fn generate_key(key_type: KeyType, curve: Option<NamedCurve>) -> Result<KeyPair> {
    match key_type {
        KeyType::EC => {
            let curve = curve.unwrap_or(NamedCurve::P256);
            debug!(%curve, "generating EC key pair");

            let d = ec::random_scalar(curve)?;
            let point = ec::derive_public(curve, &d)?;
            let (x, y) = ec::point_coordinates(curve, &point)?;
            let private_key = JWK::from_ec(curve, &x, &y, Some(&d))?;

            Ok(KeyPair {
                public_key: private_key.to_public(),
                private_key,
            })
        }
        KeyType::RSA => Err(KeyUtilsError::RSAIsUnsupported),
    }
}
