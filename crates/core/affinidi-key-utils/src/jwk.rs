//! JWK (JSON Web Key) types per RFC 7517/7518
//!
//! Loosely typed JSON is resolved into [`Params::EC`] or [`Params::RSA`] once,
//! in [`JWK::from_value`]. From there on every codec works through the
//! [`KeyEncoder`] capability of the parameter variant instead of probing
//! fields again.

use std::fmt;

use base64::{Engine, prelude::BASE64_URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::{
    KeyUtilsError, NamedCurve,
    asn1::{self, Asn1Document, Asn1EncodeConfig},
    detect::{Asn1KeyKind, KeyVisibility, classify_jwk},
    ec,
    error::Result,
    octet::{self, OctetEncodeConfig},
    padding::{fixed_width, prune_leading_zeros},
    rsa,
};

/// RFC 7517 JWK Struct
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Zeroize, ZeroizeOnDrop)]
#[serde(try_from = "Value")]
pub struct JWK {
    #[serde(rename = "kid")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
    #[serde(flatten)]
    pub params: Params,
}

/// JWK `kty` values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyType {
    EC,
    RSA,
}

impl TryFrom<&str> for KeyType {
    type Error = KeyUtilsError;

    fn try_from(value: &str) -> Result<Self> {
        match value {
            "EC" => Ok(KeyType::EC),
            "RSA" => Ok(KeyType::RSA),
            _ => Err(KeyUtilsError::UnsupportedKeyType(value.to_string())),
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            KeyType::EC => write!(f, "EC"),
            KeyType::RSA => write!(f, "RSA"),
        }
    }
}

/// JWK Key Types and associated Parameters
#[derive(Debug, Serialize, Clone, PartialEq, Zeroize, ZeroizeOnDrop)]
#[serde(tag = "kty")]
pub enum Params {
    EC(ECParams),
    RSA(RSAParams),
}

/// Elliptic Curve parameters (P-256, P-384, P-521, secp256k1)
#[derive(Debug, Serialize, Clone, Zeroize, PartialEq, ZeroizeOnDrop)]
pub struct ECParams {
    #[serde(rename = "crv")]
    pub curve: String,
    pub x: String,
    pub y: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
}

/// RSA parameters
#[derive(Debug, Serialize, Clone, Zeroize, PartialEq, ZeroizeOnDrop)]
pub struct RSAParams {
    pub n: String,
    pub e: String,
    #[serde(flatten)]
    pub private: Option<RSAPrivateParams>,
}

/// RSA private exponent and CRT members, always present as a full set
#[derive(Debug, Serialize, Clone, Zeroize, PartialEq, ZeroizeOnDrop)]
pub struct RSAPrivateParams {
    pub d: String,
    pub p: String,
    pub q: String,
    pub dp: String,
    pub dq: String,
    pub qi: String,
}

/// Per key type encoding capabilities
pub trait KeyEncoder {
    /// Whether private members are present
    fn visibility(&self) -> KeyVisibility;

    /// SubjectPublicKeyInfo DER of the public part
    fn to_spki(&self, compact: bool) -> Result<Vec<u8>>;

    /// Unencrypted PKCS8 OneAsymmetricKey DER
    fn to_pkcs8(&self, compact: bool) -> Result<Zeroizing<Vec<u8>>>;

    /// SEC1 octet string
    fn to_octet(&self, config: &OctetEncodeConfig) -> Result<Vec<u8>>;

    /// Picks SPKI, PKCS8 or encrypted PKCS8 according to the key and `config`
    fn to_asn1(&self, config: &Asn1EncodeConfig) -> Result<Asn1Document> {
        if config.output_public || self.visibility() == KeyVisibility::Public {
            if config.encryption.is_some() {
                warn!("passphrase ignored: public keys are never encrypted");
            }
            return Ok(Asn1Document {
                kind: Asn1KeyKind::Public,
                der: self.to_spki(config.compact)?,
            });
        }

        let pkcs8 = self.to_pkcs8(config.compact)?;
        match &config.encryption {
            Some(pbes2) => Ok(Asn1Document {
                kind: Asn1KeyKind::EncryptedPrivate,
                der: asn1::encrypt_pkcs8(&pkcs8, pbes2)?,
            }),
            None => Ok(Asn1Document {
                kind: Asn1KeyKind::Private,
                der: pkcs8.to_vec(),
            }),
        }
    }
}

impl JWK {
    /// Resolves a JSON object into a typed JWK.
    ///
    /// Fails with `InvalidJWKAsObject` for non-objects, `UnsupportedKeyType`
    /// for a `kty` other than EC/RSA and `InvalidECKey`/`InvalidRSAKey` for an
    /// incomplete member set.
    pub fn from_value(value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            KeyUtilsError::InvalidJWKAsObject(format!("expected an object, got {value}"))
        })?;

        let key_type = KeyType::try_from(member(object, "kty").unwrap_or_default())?;
        let visibility = classify_jwk(value)?;
        let key_id = member(object, "kid").map(str::to_string);

        let params = match key_type {
            KeyType::EC => {
                let invalid = |name: &str| KeyUtilsError::InvalidECKey(format!("missing {name}"));
                Params::EC(ECParams {
                    curve: member(object, "crv").ok_or_else(|| invalid("crv"))?.to_string(),
                    x: member(object, "x").ok_or_else(|| invalid("x"))?.to_string(),
                    y: member(object, "y").ok_or_else(|| invalid("y"))?.to_string(),
                    d: match visibility {
                        KeyVisibility::Private => {
                            Some(member(object, "d").ok_or_else(|| invalid("d"))?.to_string())
                        }
                        KeyVisibility::Public => None,
                    },
                })
            }
            KeyType::RSA => {
                let required = |name: &str| {
                    member(object, name)
                        .map(str::to_string)
                        .ok_or_else(|| KeyUtilsError::InvalidRSAKey(format!("missing {name}")))
                };
                let private = match visibility {
                    KeyVisibility::Private => Some(RSAPrivateParams {
                        d: required("d")?,
                        p: required("p")?,
                        q: required("q")?,
                        dp: required("dp")?,
                        dq: required("dq")?,
                        qi: required("qi")?,
                    }),
                    KeyVisibility::Public => None,
                };
                Params::RSA(RSAParams {
                    n: required("n")?,
                    e: required("e")?,
                    private,
                })
            }
        };

        Ok(JWK { key_id, params })
    }

    /// Builds an EC JWK, normalizing every member to the curve's fixed width
    pub fn from_ec(curve: NamedCurve, x: &[u8], y: &[u8], d: Option<&[u8]>) -> Result<Self> {
        let len = curve.payload_size();
        let d = match d {
            Some(d) => Some(BASE64_URL_SAFE_NO_PAD.encode(Zeroizing::new(fixed_width(d, len)?))),
            None => None,
        };

        Ok(JWK {
            key_id: None,
            params: Params::EC(ECParams {
                curve: curve.name().to_string(),
                x: BASE64_URL_SAFE_NO_PAD.encode(fixed_width(x, len)?),
                y: BASE64_URL_SAFE_NO_PAD.encode(fixed_width(y, len)?),
                d,
            }),
        })
    }

    /// Returns the JWK `kty`
    pub fn key_type(&self) -> KeyType {
        match &self.params {
            Params::EC(_) => KeyType::EC,
            Params::RSA(_) => KeyType::RSA,
        }
    }

    pub fn visibility(&self) -> KeyVisibility {
        self.params.visibility()
    }

    pub fn is_private(&self) -> bool {
        self.visibility() == KeyVisibility::Private
    }

    /// Copy of this key with every private member removed
    pub fn to_public(&self) -> JWK {
        let params = match &self.params {
            Params::EC(params) => Params::EC(ECParams {
                curve: params.curve.clone(),
                x: params.x.clone(),
                y: params.y.clone(),
                d: None,
            }),
            Params::RSA(params) => Params::RSA(RSAParams {
                n: params.n.clone(),
                e: params.e.clone(),
                private: None,
            }),
        };

        JWK {
            key_id: self.key_id.clone(),
            params,
        }
    }

    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self)
            .map_err(|e| KeyUtilsError::Encoding(format!("Couldn't serialize JWK: {e}")))
    }
}

impl TryFrom<Value> for JWK {
    type Error = KeyUtilsError;

    fn try_from(value: Value) -> Result<Self> {
        JWK::from_value(&value)
    }
}

impl ECParams {
    pub fn named_curve(&self) -> Result<NamedCurve> {
        NamedCurve::try_from(self.curve.as_str())
    }

    /// Fixed-width x and y coordinates
    pub fn coordinates(&self, curve: NamedCurve) -> Result<(Vec<u8>, Vec<u8>)> {
        let len = curve.payload_size();
        Ok((
            fixed_width(&decode_member("x", &self.x)?, len)?,
            fixed_width(&decode_member("y", &self.y)?, len)?,
        ))
    }

    /// Fixed-width private scalar, if present
    pub fn scalar(&self, curve: NamedCurve) -> Result<Option<Zeroizing<Vec<u8>>>> {
        match &self.d {
            Some(d) => {
                let raw = Zeroizing::new(decode_member("d", d)?);
                Ok(Some(Zeroizing::new(fixed_width(&raw, curve.payload_size())?)))
            }
            None => Ok(None),
        }
    }

    /// SEC1 encoding of the public point
    pub fn point(&self, curve: NamedCurve, compact: bool) -> Result<Vec<u8>> {
        let (x, y) = self.coordinates(curve)?;
        Ok(ec::encode_point(&x, &y, compact))
    }
}

impl KeyEncoder for ECParams {
    fn visibility(&self) -> KeyVisibility {
        if self.d.is_some() {
            KeyVisibility::Private
        } else {
            KeyVisibility::Public
        }
    }

    fn to_spki(&self, compact: bool) -> Result<Vec<u8>> {
        let curve = self.named_curve()?;
        asn1::ec_spki(curve, &self.point(curve, compact)?)
    }

    fn to_pkcs8(&self, compact: bool) -> Result<Zeroizing<Vec<u8>>> {
        let curve = self.named_curve()?;
        let d = self
            .scalar(curve)?
            .ok_or_else(|| KeyUtilsError::InvalidECKey("missing d".into()))?;
        asn1::ec_pkcs8(curve, &d, &self.point(curve, compact)?)
    }

    fn to_octet(&self, config: &OctetEncodeConfig) -> Result<Vec<u8>> {
        octet::encode_ec(self, config)
    }
}

impl RSAParams {
    /// Minimal big-endian modulus and public exponent
    pub fn public_integers(&self) -> Result<(Vec<u8>, Vec<u8>)> {
        Ok((
            prune_leading_zeros(&decode_member("n", &self.n)?),
            prune_leading_zeros(&decode_member("e", &self.e)?),
        ))
    }
}

impl KeyEncoder for RSAParams {
    fn visibility(&self) -> KeyVisibility {
        if self.private.is_some() {
            KeyVisibility::Private
        } else {
            KeyVisibility::Public
        }
    }

    fn to_spki(&self, _compact: bool) -> Result<Vec<u8>> {
        rsa::spki(self)
    }

    fn to_pkcs8(&self, _compact: bool) -> Result<Zeroizing<Vec<u8>>> {
        rsa::pkcs8(self)
    }

    fn to_octet(&self, _config: &OctetEncodeConfig) -> Result<Vec<u8>> {
        Err(KeyUtilsError::UnsupportedConversion(
            "octet encoding is only defined for EC keys".into(),
        ))
    }
}

impl KeyEncoder for Params {
    fn visibility(&self) -> KeyVisibility {
        match self {
            Params::EC(params) => params.visibility(),
            Params::RSA(params) => params.visibility(),
        }
    }

    fn to_spki(&self, compact: bool) -> Result<Vec<u8>> {
        match self {
            Params::EC(params) => params.to_spki(compact),
            Params::RSA(params) => params.to_spki(compact),
        }
    }

    fn to_pkcs8(&self, compact: bool) -> Result<Zeroizing<Vec<u8>>> {
        match self {
            Params::EC(params) => params.to_pkcs8(compact),
            Params::RSA(params) => params.to_pkcs8(compact),
        }
    }

    fn to_octet(&self, config: &OctetEncodeConfig) -> Result<Vec<u8>> {
        match self {
            Params::EC(params) => params.to_octet(config),
            Params::RSA(params) => params.to_octet(config),
        }
    }
}

/// Non-empty string member of a JSON object
pub(crate) fn member<'a>(object: &'a Map<String, Value>, name: &str) -> Option<&'a str> {
    object
        .get(name)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
}

pub(crate) fn decode_member(name: &str, value: &str) -> Result<Vec<u8>> {
    BASE64_URL_SAFE_NO_PAD
        .decode(value)
        .map_err(|e| KeyUtilsError::Decoding(format!("JWK member {name} isn't base64url: {e}")))
}
