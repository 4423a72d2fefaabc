//! RSA key structures (RFC 8017 Appendix A.1)
//!
//! Only the ASN.1 shape is handled here. RSA keys are carried through the
//! SPKI/PKCS8 codec unchanged but are never generated or SEC1 encoded.

use base64::{Engine, prelude::BASE64_URL_SAFE_NO_PAD};
use der::{Decode, Encode, Sequence, asn1::BitStringRef, asn1::UintRef};
use pkcs8::PrivateKeyInfo;
use spki::SubjectPublicKeyInfoRef;
use zeroize::Zeroizing;

use crate::{
    JWK, KeyUtilsError,
    asn1::{encoding_error, rsa_algorithm},
    error::Result,
    jwk::{Params, RSAParams, RSAPrivateParams, decode_member},
    padding::prune_leading_zeros,
};

/// RSAPublicKey
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
struct RsaPublicKey<'a> {
    modulus: UintRef<'a>,
    public_exponent: UintRef<'a>,
}

/// Two-prime RSAPrivateKey (version 0)
#[derive(Sequence)]
struct RsaPrivateKey<'a> {
    version: u8,
    modulus: UintRef<'a>,
    public_exponent: UintRef<'a>,
    private_exponent: UintRef<'a>,
    prime1: UintRef<'a>,
    prime2: UintRef<'a>,
    exponent1: UintRef<'a>,
    exponent2: UintRef<'a>,
    coefficient: UintRef<'a>,
}

fn uint(bytes: &[u8]) -> Result<UintRef<'_>> {
    UintRef::new(bytes).map_err(encoding_error)
}

fn b64(uint: &UintRef<'_>) -> String {
    BASE64_URL_SAFE_NO_PAD.encode(uint.as_bytes())
}

fn private_member(name: &str, value: &str) -> Result<Zeroizing<Vec<u8>>> {
    let raw = Zeroizing::new(decode_member(name, value)?);
    Ok(Zeroizing::new(prune_leading_zeros(&raw)))
}

pub(crate) fn spki(params: &RSAParams) -> Result<Vec<u8>> {
    let (n, e) = params.public_integers()?;
    let public_key = RsaPublicKey {
        modulus: uint(&n)?,
        public_exponent: uint(&e)?,
    }
    .to_der()
    .map_err(encoding_error)?;

    SubjectPublicKeyInfoRef {
        algorithm: rsa_algorithm(),
        subject_public_key: BitStringRef::from_bytes(&public_key).map_err(encoding_error)?,
    }
    .to_der()
    .map_err(encoding_error)
}

pub(crate) fn pkcs8(params: &RSAParams) -> Result<Zeroizing<Vec<u8>>> {
    let private = params
        .private
        .as_ref()
        .ok_or_else(|| KeyUtilsError::InvalidRSAKey("missing private members".into()))?;
    let (n, e) = params.public_integers()?;
    let d = private_member("d", &private.d)?;
    let p = private_member("p", &private.p)?;
    let q = private_member("q", &private.q)?;
    let dp = private_member("dp", &private.dp)?;
    let dq = private_member("dq", &private.dq)?;
    let qi = private_member("qi", &private.qi)?;

    let private_key = Zeroizing::new(
        RsaPrivateKey {
            version: 0,
            modulus: uint(&n)?,
            public_exponent: uint(&e)?,
            private_exponent: uint(&d)?,
            prime1: uint(&p)?,
            prime2: uint(&q)?,
            exponent1: uint(&dp)?,
            exponent2: uint(&dq)?,
            coefficient: uint(&qi)?,
        }
        .to_der()
        .map_err(encoding_error)?,
    );

    let info = PrivateKeyInfo {
        algorithm: rsa_algorithm(),
        private_key: &private_key,
        public_key: None,
    };
    Ok(Zeroizing::new(info.to_der().map_err(encoding_error)?))
}

/// JWK from the RSAPublicKey held in an SPKI bit string
pub(crate) fn public_jwk(public_key: &[u8]) -> Result<JWK> {
    let key = RsaPublicKey::from_der(public_key)
        .map_err(|e| KeyUtilsError::InvalidRSAKey(format!("RSAPublicKey: {e}")))?;

    Ok(JWK {
        key_id: None,
        params: Params::RSA(RSAParams {
            n: b64(&key.modulus),
            e: b64(&key.public_exponent),
            private: None,
        }),
    })
}

/// JWK from the RSAPrivateKey held in a PKCS8 octet string
pub(crate) fn private_jwk(private_key: &[u8], output_public: bool) -> Result<JWK> {
    let key = RsaPrivateKey::from_der(private_key)
        .map_err(|e| KeyUtilsError::InvalidRSAKey(format!("RSAPrivateKey: {e}")))?;
    if key.version != 0 {
        return Err(KeyUtilsError::UnsupportedKeyStructure(
            "multi-prime RSA keys".into(),
        ));
    }

    let private = if output_public {
        None
    } else {
        Some(RSAPrivateParams {
            d: b64(&key.private_exponent),
            p: b64(&key.prime1),
            q: b64(&key.prime2),
            dp: b64(&key.exponent1),
            dq: b64(&key.exponent2),
            qi: b64(&key.coefficient),
        })
    };

    Ok(JWK {
        key_id: None,
        params: Params::RSA(RSAParams {
            n: b64(&key.modulus),
            e: b64(&key.public_exponent),
            private,
        }),
    })
}
