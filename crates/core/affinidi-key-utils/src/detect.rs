//! Key structure detection
//!
//! Classifies an input blob before any conversion runs: ASN.1 keys by which
//! of the three PKCS structures parses, SEC1 octets by length and leading
//! byte, and JWKs by which members are present.

use der::Decode;
use pkcs8::{EncryptedPrivateKeyInfo, PrivateKeyInfo};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use spki::SubjectPublicKeyInfoRef;
use tracing::debug;

use crate::{
    KeyData, KeyFormat, KeyUtilsError, NamedCurve, error::Result, jwk::member,
};

/// Public or private half of a key pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyVisibility {
    Public,
    Private,
}

/// Which ASN.1 key structure a DER blob holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Asn1KeyKind {
    Public,
    Private,
    EncryptedPrivate,
}

impl Asn1KeyKind {
    /// RFC 7468 label of the structure
    pub fn pem_label(self) -> &'static str {
        match self {
            Asn1KeyKind::Public => "PUBLIC KEY",
            Asn1KeyKind::Private => "PRIVATE KEY",
            Asn1KeyKind::EncryptedPrivate => "ENCRYPTED PRIVATE KEY",
        }
    }
}

/// A parsed ASN.1 key, borrowing from its DER
#[derive(Debug)]
pub enum KeyStructure<'a> {
    SubjectPublicKeyInfo(SubjectPublicKeyInfoRef<'a>),
    OneAsymmetricKey(PrivateKeyInfo<'a>),
    EncryptedPrivateKeyInfo(EncryptedPrivateKeyInfo<'a>),
}

impl<'a> KeyStructure<'a> {
    /// Tries EncryptedPrivateKeyInfo, then PKCS8, then SPKI
    pub fn decode(der: &'a [u8]) -> Result<Self> {
        if let Ok(encrypted) = EncryptedPrivateKeyInfo::from_der(der) {
            return Ok(KeyStructure::EncryptedPrivateKeyInfo(encrypted));
        }
        if let Ok(private) = PrivateKeyInfo::from_der(der) {
            return Ok(KeyStructure::OneAsymmetricKey(private));
        }
        if let Ok(public) = SubjectPublicKeyInfoRef::from_der(der) {
            return Ok(KeyStructure::SubjectPublicKeyInfo(public));
        }

        Err(KeyUtilsError::NotSpkiNorPkcs8Key)
    }

    pub fn kind(&self) -> Asn1KeyKind {
        match self {
            KeyStructure::SubjectPublicKeyInfo(_) => Asn1KeyKind::Public,
            KeyStructure::OneAsymmetricKey(_) => Asn1KeyKind::Private,
            KeyStructure::EncryptedPrivateKeyInfo(_) => Asn1KeyKind::EncryptedPrivate,
        }
    }
}

/// Determines which ASN.1 key structure `key` holds
pub fn classify_asn1(key: &KeyData, format: KeyFormat) -> Result<Asn1KeyKind> {
    let der = key.to_der(format)?;
    KeyStructure::decode(&der).map(|structure| structure.kind())
}

/// True only for a well formed EncryptedPrivateKeyInfo
pub fn is_asn1_encrypted(key: &KeyData, format: KeyFormat) -> bool {
    match classify_asn1(key, format) {
        Ok(kind) => kind == Asn1KeyKind::EncryptedPrivate,
        Err(e) => {
            debug!("key isn't a recognizable ASN.1 key: {e}");
            false
        }
    }
}

/// True only for a well formed SubjectPublicKeyInfo
pub fn is_asn1_public(key: &KeyData, format: KeyFormat) -> bool {
    match classify_asn1(key, format) {
        Ok(kind) => kind == Asn1KeyKind::Public,
        Err(e) => {
            debug!("key isn't a recognizable ASN.1 key: {e}");
            false
        }
    }
}

/// Raw SEC1 octets, hex decoding text input
pub(crate) fn octet_bytes(key: &KeyData) -> Result<Vec<u8>> {
    match key {
        KeyData::Binary(bytes) => Ok(bytes.clone()),
        KeyData::Text(text) => hex::decode(text.trim()).map_err(|e| {
            KeyUtilsError::InvalidObjectType(format!("octet key string isn't hex: {e}"))
        }),
    }
}

/// Classifies SEC1 octets on `curve`.
///
/// Anything up to the curve's payload size is a private scalar (leading zeros
/// may be pruned). `04‖x‖y` and `02|03‖x` are public points. Anything else is
/// `UnsupportedKeyStructure`.
pub fn classify_sec1(key: &KeyData, curve: NamedCurve) -> Result<KeyVisibility> {
    let bytes = octet_bytes(key)?;
    let len = curve.payload_size();

    match (bytes.len(), bytes.first()) {
        (l, _) if l <= len => Ok(KeyVisibility::Private),
        (l, Some(0x04)) if l == 2 * len + 1 => Ok(KeyVisibility::Public),
        (l, Some(0x02 | 0x03)) if l == len + 1 => Ok(KeyVisibility::Public),
        (l, _) => Err(KeyUtilsError::UnsupportedKeyStructure(format!(
            "{l} octets isn't a {curve} point or scalar"
        ))),
    }
}

const RSA_PRIVATE_MEMBERS: [&str; 6] = ["d", "p", "q", "dp", "dq", "qi"];

/// Classifies a JWK by its members
pub fn classify_jwk(jwk: &Value) -> Result<KeyVisibility> {
    let object = jwk.as_object().ok_or_else(|| {
        KeyUtilsError::InvalidJWKAsObject(format!("expected an object, got {jwk}"))
    })?;
    let has = |name: &str| member(object, name).is_some();

    match member(object, "kty") {
        Some("EC") => {
            if !(has("x") && has("y")) {
                return Err(KeyUtilsError::InvalidECKey("x and y are required".into()));
            }
            if has("d") {
                Ok(KeyVisibility::Private)
            } else {
                Ok(KeyVisibility::Public)
            }
        }
        Some("RSA") => {
            if !(has("n") && has("e")) {
                return Err(KeyUtilsError::InvalidRSAKey("n and e are required".into()));
            }
            let present = RSA_PRIVATE_MEMBERS.iter().filter(|name| has(name)).count();
            match present {
                0 => Ok(KeyVisibility::Public),
                n if n == RSA_PRIVATE_MEMBERS.len() => Ok(KeyVisibility::Private),
                _ => Err(KeyUtilsError::InvalidRSAKey(
                    "private keys need d, p, q, dp, dq and qi".into(),
                )),
            }
        }
        other => Err(KeyUtilsError::UnsupportedJWKType(
            other.unwrap_or("<missing>").to_string(),
        )),
    }
}
