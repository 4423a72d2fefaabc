//! SEC1 octet codec (EC keys only)
//!
//! Public keys are `04‖x‖y` or, when compact, `02|03‖x`. Private keys are the
//! bare scalar `d`. Octets carry no curve, so decoding needs it named.

use tracing::debug;
use zeroize::Zeroizing;

use crate::{
    JWK, KeyData, NamedCurve,
    detect::{KeyVisibility, classify_sec1, octet_bytes},
    ec,
    error::Result,
    jwk::{ECParams, KeyEncoder},
    options::OctetOutput,
    padding::fixed_width,
};

/// JWK to SEC1 settings with defaults applied
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OctetEncodeConfig {
    pub output_public: bool,
    pub compact: bool,
    pub output: OctetOutput,
}

/// SEC1 to JWK settings with defaults applied
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OctetDecodeConfig {
    pub output_public: bool,
}

/// Encodes an EC JWK as SEC1 octets, hex encoded for [`OctetOutput::String`]
pub fn from_jwk(jwk: &JWK, config: &OctetEncodeConfig) -> Result<KeyData> {
    let octets = Zeroizing::new(jwk.params.to_octet(config)?);
    debug!(len = octets.len(), output = ?config.output, "encoded SEC1 key");

    Ok(match config.output {
        OctetOutput::Binary => KeyData::Binary(octets.to_vec()),
        OctetOutput::String => KeyData::Text(hex::encode(octets.as_slice())),
    })
}

pub(crate) fn encode_ec(params: &ECParams, config: &OctetEncodeConfig) -> Result<Vec<u8>> {
    let curve = params.named_curve()?;

    match params.scalar(curve)? {
        Some(d) if !config.output_public => Ok(d.to_vec()),
        _ => params.point(curve, config.compact),
    }
}

/// Decodes SEC1 octets on `curve` into a JWK
///
/// A private scalar always yields `x` and `y` as well, derived from `d`.
pub fn to_jwk(key: &KeyData, curve: NamedCurve, config: &OctetDecodeConfig) -> Result<JWK> {
    let visibility = classify_sec1(key, curve)?;
    let octets = Zeroizing::new(octet_bytes(key)?);
    debug!(?visibility, %curve, "decoding SEC1 key");

    match visibility {
        KeyVisibility::Public => {
            let (x, y) = ec::point_coordinates(curve, &octets)?;
            JWK::from_ec(curve, &x, &y, None)
        }
        KeyVisibility::Private => {
            let d = Zeroizing::new(fixed_width(&octets, curve.payload_size())?);
            let point = ec::derive_public(curve, &d)?;
            let (x, y) = ec::point_coordinates(curve, &point)?;
            JWK::from_ec(
                curve,
                &x,
                &y,
                (!config.output_public).then_some(d.as_slice()),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{KeyUtilsError, jwk::Params};

    const D_HEX: &str = "f0de8365216529ff97e8c68daa8de173b276ab81de5a7f84ef570a7cf851b6a3";
    const POINT_HEX: &str = "04a5bb1062491a25afabbf191a77d9bb80eb9cf29dc3a9df0ddfbf9bbc3e7d54f54f8246d51c58f3789a99324e534b8fd16d3f1252a2a6436b1bd65facbcd3fc2d";
    const COMPRESSED_HEX: &str =
        "03a5bb1062491a25afabbf191a77d9bb80eb9cf29dc3a9df0ddfbf9bbc3e7d54f5";

    fn private_jwk() -> JWK {
        JWK::from_value(&json!({
            "kty": "EC",
            "crv": "P-256",
            "x": "pbsQYkkaJa-rvxkad9m7gOuc8p3Dqd8N37-bvD59VPU",
            "y": "T4JG1RxY83iamTJOU0uP0W0_ElKipkNrG9ZfrLzT_C0",
            "d": "8N6DZSFlKf-X6MaNqo3hc7J2q4HeWn-E71cKfPhRtqM"
        }))
        .unwrap()
    }

    #[test]
    fn encode_variants() {
        let jwk = private_jwk();

        let d = from_jwk(&jwk, &OctetEncodeConfig::default()).unwrap();
        assert_eq!(d, KeyData::Binary(hex::decode(D_HEX).unwrap()));

        let public = OctetEncodeConfig {
            output_public: true,
            output: OctetOutput::String,
            ..Default::default()
        };
        assert_eq!(from_jwk(&jwk, &public).unwrap(), KeyData::Text(POINT_HEX.into()));

        let compact = OctetEncodeConfig {
            output_public: true,
            compact: true,
            output: OctetOutput::String,
        };
        assert_eq!(
            from_jwk(&jwk, &compact).unwrap(),
            KeyData::Text(COMPRESSED_HEX.into())
        );
    }

    #[test]
    fn decode_variants() {
        let config = OctetDecodeConfig::default();

        assert_eq!(
            to_jwk(&KeyData::Text(D_HEX.into()), NamedCurve::P256, &config).unwrap(),
            private_jwk()
        );
        assert_eq!(
            to_jwk(&KeyData::Text(POINT_HEX.into()), NamedCurve::P256, &config).unwrap(),
            private_jwk().to_public()
        );
        assert_eq!(
            to_jwk(
                &KeyData::Binary(hex::decode(COMPRESSED_HEX).unwrap()),
                NamedCurve::P256,
                &config
            )
            .unwrap(),
            private_jwk().to_public()
        );

        let public = OctetDecodeConfig {
            output_public: true,
        };
        assert_eq!(
            to_jwk(&KeyData::Text(D_HEX.into()), NamedCurve::P256, &public).unwrap(),
            private_jwk().to_public()
        );
    }

    #[test]
    fn short_scalars_are_padded() {
        use base64::{Engine, prelude::BASE64_URL_SAFE_NO_PAD};

        let config = OctetDecodeConfig::default();
        for (short, curve) in [
            (vec![0x11u8; 31], NamedCurve::P256),
            (vec![0x01u8; 65], NamedCurve::P521),
        ] {
            let mut full = vec![0u8];
            full.extend_from_slice(&short);

            let jwk = to_jwk(&KeyData::Binary(short), curve, &config).unwrap();
            assert_eq!(
                jwk,
                to_jwk(&KeyData::Binary(full.clone()), curve, &config).unwrap()
            );

            let Params::EC(params) = &jwk.params else {
                panic!("Expected EC params");
            };
            let d = BASE64_URL_SAFE_NO_PAD
                .decode(params.d.as_deref().unwrap())
                .unwrap();
            assert_eq!(d, full);
        }
    }

    #[test]
    fn wrong_curve_length() {
        assert!(matches!(
            to_jwk(
                &KeyData::Text(POINT_HEX.into()),
                NamedCurve::P384,
                &OctetDecodeConfig::default()
            ),
            Err(KeyUtilsError::UnsupportedKeyStructure(_))
        ));
    }
}
