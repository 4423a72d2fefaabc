//! Key format conversion for Affinidi TDK
//!
//! This crate provides:
//! - Conversion between JWK and SPKI/PKCS8 (DER or PEM), including PBES2
//!   encrypted PKCS8
//! - Conversion between EC JWKs and SEC1 octets
//! - Detection of the key structure held in a blob
//! - A [`Key`] object, RFC 7638 thumbprints and EC key generation
//!
//! Supported curves are P-256, P-384, P-521 and secp256k1, each behind its own
//! feature flag. RSA keys are carried through the ASN.1 codec but not generated.

pub mod asn1;
pub mod curves;
pub mod detect;
pub mod octet;
pub mod padding;

mod convert;
mod ec;
mod error;
mod generate;
mod jwk;
mod key;
mod key_data;
mod options;
mod rsa;

pub use convert::{from_jwk_to, from_jwk_value_to, to_jwk_from, to_jwk_value_from};
pub use curves::{NamedCurve, payload_size};
pub use error::{KeyUtilsError, Result};
pub use generate::{KeyPair, generate_key};
pub use jwk::{ECParams, JWK, KeyEncoder, KeyType, Params, RSAParams, RSAPrivateParams};
pub use key::{Key, ThumbprintHash};
pub use key_data::KeyData;
pub use options::{
    DEFAULT_ITERATION_COUNT, EncryptParams, JwkExportOptions, KeyExportOptions, KeyFormat,
    OctetOutput, PbeCipher,
};
