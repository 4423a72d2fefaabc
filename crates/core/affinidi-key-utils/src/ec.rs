//! Elliptic curve point handling
//!
//! Arithmetic is only needed in three places: deriving the public point of a
//! bare private scalar, decompressing a compressed point and generating new
//! keys. Each curve is behind its own feature flag.

use elliptic_curve::{
    AffinePoint, CurveArithmetic, FieldBytesSize, SecretKey,
    sec1::{EncodedPoint, FromEncodedPoint, ModulusSize, ToEncodedPoint},
};
use rand_core::OsRng;
use zeroize::Zeroizing;

use crate::{KeyUtilsError, NamedCurve, error::Result};

/// SEC1 encoding of fixed-width coordinates
pub(crate) fn encode_point(x: &[u8], y: &[u8], compact: bool) -> Vec<u8> {
    if compact {
        let tag = y.last().map_or(0x02, |last| 0x02 | (last & 1));
        let mut point = Vec::with_capacity(x.len() + 1);
        point.push(tag);
        point.extend_from_slice(x);
        point
    } else {
        let mut point = Vec::with_capacity(x.len() + y.len() + 1);
        point.push(0x04);
        point.extend_from_slice(x);
        point.extend_from_slice(y);
        point
    }
}

/// Splits a SEC1 point into fixed-width x and y, decompressing when needed
pub(crate) fn point_coordinates(curve: NamedCurve, point: &[u8]) -> Result<(Vec<u8>, Vec<u8>)> {
    let len = curve.payload_size();

    let uncompressed = match (point.len(), point.first()) {
        (l, Some(0x04)) if l == 2 * len + 1 => point.to_vec(),
        (l, Some(0x02 | 0x03)) if l == len + 1 => decompress(curve, point)?,
        (l, _) => {
            return Err(KeyUtilsError::UnsupportedKeyStructure(format!(
                "{l} octets isn't a {curve} point"
            )));
        }
    };

    Ok((
        uncompressed[1..=len].to_vec(),
        uncompressed[len + 1..].to_vec(),
    ))
}

/// Uncompressed public point of private scalar `d`
pub(crate) fn derive_public(curve: NamedCurve, d: &[u8]) -> Result<Vec<u8>> {
    match curve {
        #[cfg(feature = "p256")]
        NamedCurve::P256 => public_point::<p256::NistP256>(d),
        #[cfg(feature = "p384")]
        NamedCurve::P384 => public_point::<p384::NistP384>(d),
        #[cfg(feature = "p521")]
        NamedCurve::P521 => public_point::<p521::NistP521>(d),
        #[cfg(feature = "k256")]
        NamedCurve::Secp256k1 => public_point::<k256::Secp256k1>(d),
        #[allow(unreachable_patterns)]
        _ => Err(disabled(curve)),
    }
}

/// Uncompressed form of a compressed point
pub(crate) fn decompress(curve: NamedCurve, point: &[u8]) -> Result<Vec<u8>> {
    match curve {
        #[cfg(feature = "p256")]
        NamedCurve::P256 => decompress_point::<p256::NistP256>(point),
        #[cfg(feature = "p384")]
        NamedCurve::P384 => decompress_point::<p384::NistP384>(point),
        #[cfg(feature = "p521")]
        NamedCurve::P521 => decompress_point::<p521::NistP521>(point),
        #[cfg(feature = "k256")]
        NamedCurve::Secp256k1 => decompress_point::<k256::Secp256k1>(point),
        #[allow(unreachable_patterns)]
        _ => Err(disabled(curve)),
    }
}

/// Fresh private scalar from the OS RNG
pub(crate) fn random_scalar(curve: NamedCurve) -> Result<Zeroizing<Vec<u8>>> {
    match curve {
        #[cfg(feature = "p256")]
        NamedCurve::P256 => Ok(random::<p256::NistP256>()),
        #[cfg(feature = "p384")]
        NamedCurve::P384 => Ok(random::<p384::NistP384>()),
        #[cfg(feature = "p521")]
        NamedCurve::P521 => Ok(random::<p521::NistP521>()),
        #[cfg(feature = "k256")]
        NamedCurve::Secp256k1 => Ok(random::<k256::Secp256k1>()),
        #[allow(unreachable_patterns)]
        _ => Err(disabled(curve)),
    }
}

#[allow(dead_code)]
fn disabled(curve: NamedCurve) -> KeyUtilsError {
    KeyUtilsError::UnsupportedCurve(format!("{curve} support isn't compiled in"))
}

fn public_point<C>(d: &[u8]) -> Result<Vec<u8>>
where
    C: CurveArithmetic,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    let secret = SecretKey::<C>::from_slice(d)
        .map_err(|_| KeyUtilsError::InvalidECKey("private scalar out of range".into()))?;

    Ok(secret.public_key().to_encoded_point(false).as_bytes().to_vec())
}

fn decompress_point<C>(point: &[u8]) -> Result<Vec<u8>>
where
    C: CurveArithmetic,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    let encoded = EncodedPoint::<C>::from_bytes(point)
        .map_err(|e| KeyUtilsError::InvalidECKey(format!("Invalid SEC1 point: {e}")))?;
    let affine: Option<AffinePoint<C>> =
        <AffinePoint<C> as FromEncodedPoint<C>>::from_encoded_point(&encoded).into();
    let affine =
        affine.ok_or_else(|| KeyUtilsError::InvalidECKey("point isn't on the curve".into()))?;

    Ok(affine.to_encoded_point(false).as_bytes().to_vec())
}

fn random<C>() -> Zeroizing<Vec<u8>>
where
    C: CurveArithmetic,
{
    let secret = SecretKey::<C>::random(&mut OsRng);
    Zeroizing::new(secret.to_bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    const P256_D: &str = "f0de8365216529ff97e8c68daa8de173b276ab81de5a7f84ef570a7cf851b6a3";
    const P256_POINT: &str = "04a5bb1062491a25afabbf191a77d9bb80eb9cf29dc3a9df0ddfbf9bbc3e7d54f54f8246d51c58f3789a99324e534b8fd16d3f1252a2a6436b1bd65facbcd3fc2d";

    #[test]
    fn derive_p256_public() {
        let d = hex::decode(P256_D).unwrap();
        assert_eq!(
            hex::encode(derive_public(NamedCurve::P256, &d).unwrap()),
            P256_POINT
        );
    }

    #[test]
    fn compress_and_decompress() {
        let point = hex::decode(P256_POINT).unwrap();
        let (x, y) = point_coordinates(NamedCurve::P256, &point).unwrap();
        assert_eq!(x.len(), 32);

        let compressed = encode_point(&x, &y, true);
        assert_eq!(compressed[0], 0x03);
        assert_eq!(compressed.len(), 33);

        assert_eq!(
            point_coordinates(NamedCurve::P256, &compressed).unwrap(),
            (x.clone(), y.clone())
        );
        assert_eq!(encode_point(&x, &y, false), point);
    }

    #[test]
    fn rejects_wrong_length() {
        let point = hex::decode(P256_POINT).unwrap();
        assert!(matches!(
            point_coordinates(NamedCurve::P384, &point),
            Err(KeyUtilsError::UnsupportedKeyStructure(_))
        ));
    }

    #[test]
    fn rejects_zero_scalar() {
        assert!(matches!(
            derive_public(NamedCurve::Secp256k1, &[0u8; 32]),
            Err(KeyUtilsError::InvalidECKey(_))
        ));
    }

    #[test]
    fn random_scalars_are_fixed_width() {
        for curve in [
            NamedCurve::P256,
            NamedCurve::P384,
            NamedCurve::P521,
            NamedCurve::Secp256k1,
        ] {
            let d = random_scalar(curve).unwrap();
            assert_eq!(d.len(), curve.payload_size());
            assert_eq!(
                derive_public(curve, &d).unwrap().len(),
                2 * curve.payload_size() + 1
            );
        }
    }
}
