//! Named curve parameter table
//!
//! Maps each supported curve to the byte length of its coordinates/scalar
//! (`payload_size`) and to its ASN.1 object identifier.

use std::{fmt, str::FromStr};

use der::asn1::ObjectIdentifier;
use serde::{Deserialize, Serialize};

use crate::{KeyUtilsError, error::Result};

/// id-ecPublicKey (RFC 5480)
pub const EC_PUBLIC_KEY_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");

/// rsaEncryption (RFC 8017)
pub const RSA_ENCRYPTION_OID: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");

pub const P256_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7");
pub const P384_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.34");
pub const P521_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.35");
pub const SECP256K1_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.10");

/// Supported elliptic curves, named as in the JWK `crv` member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamedCurve {
    #[serde(rename = "P-256")]
    P256,
    #[serde(rename = "P-384")]
    P384,
    #[serde(rename = "P-521")]
    P521,
    #[serde(rename = "secp256k1", alias = "P-256K")]
    Secp256k1,
}

/// Immutable table entry for a named curve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurveParams {
    pub curve: NamedCurve,
    pub name: &'static str,
    pub payload_size: usize,
    pub oid: ObjectIdentifier,
}

static CURVES: [CurveParams; 4] = [
    CurveParams {
        curve: NamedCurve::P256,
        name: "P-256",
        payload_size: 32,
        oid: P256_OID,
    },
    CurveParams {
        curve: NamedCurve::P384,
        name: "P-384",
        payload_size: 48,
        oid: P384_OID,
    },
    CurveParams {
        curve: NamedCurve::P521,
        name: "P-521",
        payload_size: 66,
        oid: P521_OID,
    },
    CurveParams {
        curve: NamedCurve::Secp256k1,
        name: "secp256k1",
        payload_size: 32,
        oid: SECP256K1_OID,
    },
];

impl NamedCurve {
    pub fn params(self) -> &'static CurveParams {
        match self {
            NamedCurve::P256 => &CURVES[0],
            NamedCurve::P384 => &CURVES[1],
            NamedCurve::P521 => &CURVES[2],
            NamedCurve::Secp256k1 => &CURVES[3],
        }
    }

    /// Byte length of a coordinate or private scalar on this curve
    pub fn payload_size(self) -> usize {
        self.params().payload_size
    }

    pub fn oid(self) -> ObjectIdentifier {
        self.params().oid
    }

    /// JWK `crv` name
    pub fn name(self) -> &'static str {
        self.params().name
    }

    /// Resolves a named-curve OID taken from an ASN.1 algorithm identifier
    pub fn from_oid(oid: &ObjectIdentifier) -> Result<Self> {
        CURVES
            .iter()
            .find(|entry| &entry.oid == oid)
            .map(|entry| entry.curve)
            .ok_or_else(|| KeyUtilsError::UnsupportedCurve(oid.to_string()))
    }
}

impl TryFrom<&str> for NamedCurve {
    type Error = KeyUtilsError;

    fn try_from(value: &str) -> Result<Self> {
        match value {
            "P-256" | "prime256v1" | "secp256r1" => Ok(NamedCurve::P256),
            "P-384" | "secp384r1" => Ok(NamedCurve::P384),
            "P-521" | "secp521r1" => Ok(NamedCurve::P521),
            "secp256k1" | "P-256K" => Ok(NamedCurve::Secp256k1),
            _ => Err(KeyUtilsError::UnsupportedCurve(value.to_string())),
        }
    }
}

impl FromStr for NamedCurve {
    type Err = KeyUtilsError;

    fn from_str(s: &str) -> Result<Self> {
        NamedCurve::try_from(s)
    }
}

impl fmt::Display for NamedCurve {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Looks up the payload size of a curve by its name
pub fn payload_size(curve: &str) -> Result<usize> {
    NamedCurve::try_from(curve).map(NamedCurve::payload_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_sizes() {
        assert_eq!(payload_size("P-256").unwrap(), 32);
        assert_eq!(payload_size("P-384").unwrap(), 48);
        assert_eq!(payload_size("P-521").unwrap(), 66);
        assert_eq!(payload_size("secp256k1").unwrap(), 32);
        assert_eq!(payload_size("P-256K").unwrap(), 32);
    }

    #[test]
    fn unknown_curve() {
        assert_eq!(
            payload_size("Ed25519"),
            Err(KeyUtilsError::UnsupportedCurve("Ed25519".to_string()))
        );
    }

    #[test]
    fn oid_lookup() {
        for curve in [
            NamedCurve::P256,
            NamedCurve::P384,
            NamedCurve::P521,
            NamedCurve::Secp256k1,
        ] {
            assert_eq!(NamedCurve::from_oid(&curve.oid()).unwrap(), curve);
            assert_eq!(NamedCurve::try_from(curve.name()).unwrap(), curve);
        }

        assert!(matches!(
            NamedCurve::from_oid(&EC_PUBLIC_KEY_OID),
            Err(KeyUtilsError::UnsupportedCurve(_))
        ));
    }

    #[test]
    fn serde_names() {
        let curve: NamedCurve = serde_json::from_str("\"P-256K\"").unwrap();
        assert_eq!(curve, NamedCurve::Secp256k1);
        assert_eq!(
            serde_json::to_string(&NamedCurve::P521).unwrap(),
            "\"P-521\""
        );
    }
}
