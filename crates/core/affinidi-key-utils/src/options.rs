//! Caller-facing conversion options
//!
//! These mirror the JSON option objects callers already pass around
//! (`outputPublic`, `compact`, `encryptParams`, ...). Defaults are resolved
//! once by the conversion facade into the immutable codec configurations.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{KeyUtilsError, error::Result};

/// Default PBKDF2 iteration count for PKCS8 encryption
pub const DEFAULT_ITERATION_COUNT: u32 = 2048;

/// Serialized key representations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyFormat {
    Pem,
    Der,
    Oct,
}

impl KeyFormat {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "pem" => Some(KeyFormat::Pem),
            "der" => Some(KeyFormat::Der),
            "oct" => Some(KeyFormat::Oct),
            _ => None,
        }
    }

    /// Parses a conversion target
    pub fn output(value: &str) -> Result<Self> {
        KeyFormat::parse(value).ok_or_else(|| KeyUtilsError::InvalidOutputForm(value.to_string()))
    }

    /// Parses a conversion source
    pub fn input(value: &str) -> Result<Self> {
        KeyFormat::parse(value).ok_or_else(|| KeyUtilsError::InvalidInputForm(value.to_string()))
    }

    /// PEM or DER, both carrying SPKI/PKCS8
    pub fn is_asn1(self) -> bool {
        matches!(self, KeyFormat::Pem | KeyFormat::Der)
    }
}

impl fmt::Display for KeyFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            KeyFormat::Pem => write!(f, "pem"),
            KeyFormat::Der => write!(f, "der"),
            KeyFormat::Oct => write!(f, "oct"),
        }
    }
}

/// Rendering of SEC1 octet output
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OctetOutput {
    #[default]
    Binary,
    /// Lowercase hex string
    String,
}

/// Content cipher for PBES2 encrypted PKCS8
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PbeCipher {
    #[serde(rename = "aes128-cbc")]
    Aes128Cbc,
    #[default]
    #[serde(rename = "aes256-cbc")]
    Aes256Cbc,
}

/// PKCS8 encryption parameters
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EncryptParams {
    /// An empty passphrase leaves the private key unencrypted
    pub passphrase: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iteration_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cipher: Option<PbeCipher>,
}

impl EncryptParams {
    pub fn new(passphrase: &str) -> Self {
        EncryptParams {
            passphrase: passphrase.to_string(),
            ..Default::default()
        }
    }
}

impl fmt::Debug for EncryptParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptParams")
            .field("passphrase", &"<redacted>")
            .field("iteration_count", &self.iteration_count)
            .field("cipher", &self.cipher)
            .finish()
    }
}

/// Options for converting a JWK into PEM, DER or SEC1 octets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyExportOptions {
    /// Emit only the public part of a private key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_public: Option<bool>,
    /// Compress EC points
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compact: Option<bool>,
    /// Octet output rendering (`oct` only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OctetOutput>,
    /// PKCS8 encryption (`pem`/`der` only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encrypt_params: Option<EncryptParams>,
}

impl KeyExportOptions {
    /// Loads options from a JSON object
    pub fn from_value(value: &Value) -> Result<Self> {
        check_output_public(value)?;
        serde_json::from_value(value.clone())
            .map_err(|e| KeyUtilsError::InappropriateOptions(e.to_string()))
    }

    pub fn public() -> Self {
        KeyExportOptions {
            output_public: Some(true),
            ..Default::default()
        }
    }

    pub fn encrypted(passphrase: &str) -> Self {
        KeyExportOptions {
            encrypt_params: Some(EncryptParams::new(passphrase)),
            ..Default::default()
        }
    }
}

/// Options for converting PEM, DER or SEC1 octets into a JWK
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JwkExportOptions {
    /// Return only the public members of a private key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_public: Option<bool>,
    /// Passphrase for an encrypted PKCS8 input
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passphrase: Option<String>,
    /// Curve of a SEC1 octet input, which carries no curve identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub named_curve: Option<String>,
}

impl JwkExportOptions {
    /// Loads options from a JSON object
    pub fn from_value(value: &Value) -> Result<Self> {
        check_output_public(value)?;
        serde_json::from_value(value.clone())
            .map_err(|e| KeyUtilsError::InappropriateOptions(e.to_string()))
    }

    pub fn with_curve(named_curve: &str) -> Self {
        JwkExportOptions {
            named_curve: Some(named_curve.to_string()),
            ..Default::default()
        }
    }

    pub fn with_passphrase(passphrase: &str) -> Self {
        JwkExportOptions {
            passphrase: Some(passphrase.to_string()),
            ..Default::default()
        }
    }
}

impl fmt::Debug for JwkExportOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwkExportOptions")
            .field("output_public", &self.output_public)
            .field("passphrase", &self.passphrase.as_ref().map(|_| "<redacted>"))
            .field("named_curve", &self.named_curve)
            .finish()
    }
}

/// `outputPublic` may be absent, but when present it must be a JSON boolean
fn check_output_public(value: &Value) -> Result<()> {
    let Some(object) = value.as_object() else {
        return Err(KeyUtilsError::InappropriateOptions(
            "options must be a JSON object".into(),
        ));
    };

    match object.get("outputPublic") {
        None | Some(Value::Bool(_)) => Ok(()),
        Some(_) => Err(KeyUtilsError::OutputPublicMustBeBoolean),
    }
}
