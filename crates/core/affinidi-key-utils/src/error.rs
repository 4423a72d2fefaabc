//! Error types for key conversion

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum KeyUtilsError {
    // Caller input that fails validation
    #[error("Invalid output form: {0} (expected pem, der or oct)")]
    InvalidOutputForm(String),

    #[error("Invalid input form: {0} (expected pem, der or oct)")]
    InvalidInputForm(String),

    #[error("JWK must be a JSON object: {0}")]
    InvalidJWKAsObject(String),

    #[error("Unsupported key type: {0}")]
    UnsupportedKeyType(String),

    #[error("outputPublic must be a boolean")]
    OutputPublicMustBeBoolean,

    #[error("Inappropriate options: {0}")]
    InappropriateOptions(String),

    #[error("Invalid object type: {0}")]
    InvalidObjectType(String),

    #[error("Invalid length: {len} bytes doesn't fit into {max} bytes")]
    InvalidLength { len: usize, max: usize },

    // Structural and parse failures
    #[error("Key is neither SPKI nor PKCS8")]
    NotSpkiNorPkcs8Key,

    #[error("Unsupported key structure: {0}")]
    UnsupportedKeyStructure(String),

    #[error("Unsupported curve: {0}")]
    UnsupportedCurve(String),

    #[error("Invalid EC key: {0}")]
    InvalidECKey(String),

    #[error("Invalid RSA key: {0}")]
    InvalidRSAKey(String),

    #[error("Unsupported JWK type: {0}")]
    UnsupportedJWKType(String),

    #[error("Decryption failed")]
    DecryptionFailed,

    // Paths that exist but are not implemented
    #[error("Unsupported conversion: {0}")]
    UnsupportedConversion(String),

    #[error("RSA is unsupported")]
    RSAIsUnsupported,

    #[error("Key error: {0}")]
    KeyError(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Decoding error: {0}")]
    Decoding(String),
}

pub type Result<T> = std::result::Result<T, KeyUtilsError>;
