//! PEM/DER codec
//!
//! Public keys are SubjectPublicKeyInfo (RFC 5280), private keys are PKCS8
//! OneAsymmetricKey (RFC 5208) and encrypted private keys are PBES2
//! EncryptedPrivateKeyInfo (RFC 8018). EC keys carry the named curve as the
//! algorithm parameter and SEC1 ECPrivateKey (RFC 5915) as the PKCS8 payload.

use std::fmt;

use der::{
    Decode, Encode,
    asn1::{AnyRef, BitStringRef, Null, ObjectIdentifier},
};
use pkcs5::pbes2;
use pkcs8::{EncryptedPrivateKeyInfo, PrivateKeyInfo};
use rand_core::{OsRng, RngCore};
use sec1::EcPrivateKey;
use spki::{AlgorithmIdentifierRef, SubjectPublicKeyInfoRef};
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::{
    JWK, KeyData, KeyFormat, KeyUtilsError, NamedCurve,
    curves::{EC_PUBLIC_KEY_OID, RSA_ENCRYPTION_OID},
    detect::{Asn1KeyKind, KeyStructure},
    ec,
    error::Result,
    jwk::KeyEncoder,
    key_data::encode_pem,
    options::{DEFAULT_ITERATION_COUNT, EncryptParams, PbeCipher},
    padding::fixed_width,
    rsa,
};

/// PBKDF2 salt length
pub const PBES2_SALT_LEN: usize = 8;

const AES_BLOCK_LEN: usize = 16;

/// Resolved PBES2 parameters (PBKDF2-HMAC-SHA256 + AES-CBC)
#[derive(Clone)]
pub struct Pbes2Config {
    passphrase: Zeroizing<String>,
    pub iterations: u32,
    pub cipher: PbeCipher,
}

impl Pbes2Config {
    pub fn new(passphrase: &str) -> Self {
        Pbes2Config {
            passphrase: Zeroizing::new(passphrase.to_string()),
            iterations: DEFAULT_ITERATION_COUNT,
            cipher: PbeCipher::default(),
        }
    }

    /// `None` when no passphrase was given, meaning no encryption
    pub fn resolve(params: Option<&EncryptParams>) -> Option<Self> {
        let params = params?;
        if params.passphrase.is_empty() {
            return None;
        }

        Some(Pbes2Config {
            passphrase: Zeroizing::new(params.passphrase.clone()),
            iterations: params.iteration_count.unwrap_or(DEFAULT_ITERATION_COUNT),
            cipher: params.cipher.unwrap_or_default(),
        })
    }
}

impl fmt::Debug for Pbes2Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pbes2Config")
            .field("passphrase", &"<redacted>")
            .field("iterations", &self.iterations)
            .field("cipher", &self.cipher)
            .finish()
    }
}

/// JWK to ASN.1 settings with defaults applied
#[derive(Debug, Clone, Default)]
pub struct Asn1EncodeConfig {
    pub output_public: bool,
    pub compact: bool,
    pub encryption: Option<Pbes2Config>,
}

/// ASN.1 to JWK settings with defaults applied
#[derive(Clone, Default)]
pub struct Asn1DecodeConfig {
    pub output_public: bool,
    /// Empty when the caller has none
    pub passphrase: Zeroizing<String>,
}

impl fmt::Debug for Asn1DecodeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Asn1DecodeConfig")
            .field("output_public", &self.output_public)
            .field("passphrase", &"<redacted>")
            .finish()
    }
}

/// An encoded key together with the structure it holds
#[derive(Debug, Clone, Zeroize, ZeroizeOnDrop)]
pub struct Asn1Document {
    #[zeroize(skip)]
    pub kind: Asn1KeyKind,
    pub der: Vec<u8>,
}

impl Asn1Document {
    pub fn to_pem(&self) -> Result<String> {
        encode_pem(self.kind.pem_label(), &self.der)
    }
}

/// Encodes a JWK as SPKI, PKCS8 or encrypted PKCS8 in `format`
pub fn from_jwk(jwk: &JWK, format: KeyFormat, config: &Asn1EncodeConfig) -> Result<KeyData> {
    let document = jwk.params.to_asn1(config)?;
    debug!(kind = ?document.kind, %format, "encoded ASN.1 key");

    match format {
        KeyFormat::Der => Ok(KeyData::Binary(document.der.clone())),
        KeyFormat::Pem => Ok(KeyData::Text(document.to_pem()?)),
        KeyFormat::Oct => Err(KeyUtilsError::UnsupportedConversion(
            "octet output isn't an ASN.1 format".into(),
        )),
    }
}

/// Decodes SPKI, PKCS8 or encrypted PKCS8 into a JWK
pub fn to_jwk(key: &KeyData, format: KeyFormat, config: &Asn1DecodeConfig) -> Result<JWK> {
    let der = Zeroizing::new(key.to_der(format)?);
    let structure = KeyStructure::decode(&der)?;
    debug!(kind = ?structure.kind(), %format, "decoding ASN.1 key");

    match structure {
        KeyStructure::SubjectPublicKeyInfo(spki) => decode_spki(&spki),
        KeyStructure::OneAsymmetricKey(info) => decode_pkcs8(&info, config.output_public),
        KeyStructure::EncryptedPrivateKeyInfo(encrypted) => {
            let plain = decrypt_info(&encrypted, &config.passphrase)?;
            let info =
                PrivateKeyInfo::from_der(&plain).map_err(|_| KeyUtilsError::DecryptionFailed)?;
            decode_pkcs8(&info, config.output_public)
        }
    }
}

/// Encrypts PKCS8 DER under a fresh salt and IV
pub(crate) fn encrypt_pkcs8(pkcs8_der: &[u8], config: &Pbes2Config) -> Result<Vec<u8>> {
    let mut salt = [0u8; PBES2_SALT_LEN];
    let mut iv = [0u8; AES_BLOCK_LEN];
    OsRng.fill_bytes(&mut salt);
    OsRng.fill_bytes(&mut iv);

    let params = match config.cipher {
        PbeCipher::Aes128Cbc => {
            pbes2::Parameters::pbkdf2_sha256_aes128cbc(config.iterations, &salt, &iv)
        }
        PbeCipher::Aes256Cbc => {
            pbes2::Parameters::pbkdf2_sha256_aes256cbc(config.iterations, &salt, &iv)
        }
    }
    .map_err(|e| KeyUtilsError::Encoding(format!("Invalid PBES2 parameters: {e}")))?;

    let info = PrivateKeyInfo::from_der(pkcs8_der).map_err(encoding_error)?;
    let document = info
        .encrypt_with_params(params, config.passphrase.as_bytes())
        .map_err(|e| KeyUtilsError::Encoding(format!("PKCS8 encryption failed: {e}")))?;

    Ok(document.as_bytes().to_vec())
}

/// Decrypts EncryptedPrivateKeyInfo DER to plain PKCS8 DER
pub(crate) fn decrypt_pkcs8(der: &[u8], passphrase: &str) -> Result<Zeroizing<Vec<u8>>> {
    let encrypted =
        EncryptedPrivateKeyInfo::from_der(der).map_err(|_| KeyUtilsError::NotSpkiNorPkcs8Key)?;
    let plain = decrypt_info(&encrypted, passphrase)?;
    PrivateKeyInfo::from_der(&plain).map_err(|_| KeyUtilsError::DecryptionFailed)?;
    Ok(plain)
}

fn decrypt_info(
    encrypted: &EncryptedPrivateKeyInfo<'_>,
    passphrase: &str,
) -> Result<Zeroizing<Vec<u8>>> {
    if passphrase.is_empty() {
        return Err(KeyUtilsError::DecryptionFailed);
    }

    let document = encrypted.decrypt(passphrase).map_err(|e| {
        debug!("PKCS8 decryption failed: {e}");
        KeyUtilsError::DecryptionFailed
    })?;
    Ok(Zeroizing::new(document.as_bytes().to_vec()))
}

fn decode_spki(spki: &SubjectPublicKeyInfoRef<'_>) -> Result<JWK> {
    let public_key = spki.subject_public_key.as_bytes().ok_or_else(|| {
        KeyUtilsError::UnsupportedKeyStructure("public key bit string isn't octet aligned".into())
    })?;

    let oid = spki.algorithm.oid;
    if oid == EC_PUBLIC_KEY_OID {
        let curve = named_curve(&spki.algorithm)?;
        let (x, y) = ec::point_coordinates(curve, public_key)?;
        JWK::from_ec(curve, &x, &y, None)
    } else if oid == RSA_ENCRYPTION_OID {
        rsa::public_jwk(public_key)
    } else {
        Err(KeyUtilsError::UnsupportedKeyType(oid.to_string()))
    }
}

fn decode_pkcs8(info: &PrivateKeyInfo<'_>, output_public: bool) -> Result<JWK> {
    let oid = info.algorithm.oid;
    if oid == RSA_ENCRYPTION_OID {
        return rsa::private_jwk(info.private_key, output_public);
    }
    if oid != EC_PUBLIC_KEY_OID {
        return Err(KeyUtilsError::UnsupportedKeyType(oid.to_string()));
    }

    let curve = named_curve(&info.algorithm)?;
    let key = EcPrivateKey::from_der(info.private_key)
        .map_err(|e| KeyUtilsError::UnsupportedKeyStructure(format!("ECPrivateKey: {e}")))?;

    if let Some(inner) = key.parameters.as_ref().and_then(|p| p.named_curve())
        && inner != curve.oid()
    {
        return Err(KeyUtilsError::UnsupportedKeyStructure(format!(
            "ECPrivateKey curve {inner} contradicts {curve}"
        )));
    }

    let d = Zeroizing::new(fixed_width(key.private_key, curve.payload_size())?);
    let point = match key.public_key {
        Some(point) => point.to_vec(),
        None => ec::derive_public(curve, &d)?,
    };
    let (x, y) = ec::point_coordinates(curve, &point)?;

    JWK::from_ec(curve, &x, &y, (!output_public).then_some(d.as_slice()))
}

fn named_curve(algorithm: &AlgorithmIdentifierRef<'_>) -> Result<NamedCurve> {
    let oid = algorithm.parameters_oid().map_err(|_| {
        KeyUtilsError::UnsupportedKeyStructure("EC algorithm has no named curve".into())
    })?;
    NamedCurve::from_oid(&oid)
}

pub(crate) fn ec_algorithm(curve: &ObjectIdentifier) -> AlgorithmIdentifierRef<'_> {
    AlgorithmIdentifierRef {
        oid: EC_PUBLIC_KEY_OID,
        parameters: Some(AnyRef::from(curve)),
    }
}

pub(crate) fn rsa_algorithm() -> AlgorithmIdentifierRef<'static> {
    AlgorithmIdentifierRef {
        oid: RSA_ENCRYPTION_OID,
        parameters: Some(AnyRef::from(Null)),
    }
}

pub(crate) fn encoding_error(e: der::Error) -> KeyUtilsError {
    KeyUtilsError::Encoding(format!("DER: {e}"))
}

pub(crate) fn ec_spki(curve: NamedCurve, point: &[u8]) -> Result<Vec<u8>> {
    let oid = curve.oid();
    SubjectPublicKeyInfoRef {
        algorithm: ec_algorithm(&oid),
        subject_public_key: BitStringRef::from_bytes(point).map_err(encoding_error)?,
    }
    .to_der()
    .map_err(encoding_error)
}

/// PKCS8 wrapping an ECPrivateKey that carries the public point
pub(crate) fn ec_pkcs8(curve: NamedCurve, d: &[u8], point: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    let private_key = Zeroizing::new(
        EcPrivateKey {
            private_key: d,
            parameters: None,
            public_key: Some(point),
        }
        .to_der()
        .map_err(encoding_error)?,
    );

    let oid = curve.oid();
    let info = PrivateKeyInfo {
        algorithm: ec_algorithm(&oid),
        private_key: &private_key,
        public_key: None,
    };
    Ok(Zeroizing::new(info.to_der().map_err(encoding_error)?))
}
