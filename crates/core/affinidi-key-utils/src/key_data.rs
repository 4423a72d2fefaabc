//! Opaque key blobs as handed in or out of the converters

use pem_rfc7468::LineEnding;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{KeyFormat, KeyUtilsError, error::Result};

/// A serialized key, either raw octets (DER, SEC1) or text (PEM, hex SEC1)
#[derive(Debug, Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub enum KeyData {
    Binary(Vec<u8>),
    Text(String),
}

impl KeyData {
    /// Raw octets of the blob; for text this is its UTF-8 encoding
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            KeyData::Binary(bytes) => bytes,
            KeyData::Text(text) => text.as_bytes(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            KeyData::Binary(_) => None,
            KeyData::Text(text) => Some(text),
        }
    }

    /// DER octets of an ASN.1 key, unwrapping the PEM armor when `format` is PEM
    pub(crate) fn to_der(&self, format: KeyFormat) -> Result<Vec<u8>> {
        match (format, self) {
            (KeyFormat::Der, KeyData::Binary(bytes)) => Ok(bytes.clone()),
            (KeyFormat::Der, KeyData::Text(_)) => Err(KeyUtilsError::InvalidObjectType(
                "DER key must be binary".into(),
            )),
            (KeyFormat::Pem, KeyData::Text(text)) => decode_pem(text),
            (KeyFormat::Pem, KeyData::Binary(bytes)) => {
                let text = std::str::from_utf8(bytes).map_err(|_| {
                    KeyUtilsError::InvalidObjectType("PEM key must be UTF-8 text".into())
                })?;
                decode_pem(text)
            }
            (KeyFormat::Oct, _) => Err(KeyUtilsError::UnsupportedConversion(
                "octet keys carry no ASN.1 structure".into(),
            )),
        }
    }
}

impl From<Vec<u8>> for KeyData {
    fn from(bytes: Vec<u8>) -> Self {
        KeyData::Binary(bytes)
    }
}

impl From<&[u8]> for KeyData {
    fn from(bytes: &[u8]) -> Self {
        KeyData::Binary(bytes.to_vec())
    }
}

impl From<String> for KeyData {
    fn from(text: String) -> Self {
        KeyData::Text(text)
    }
}

impl From<&str> for KeyData {
    fn from(text: &str) -> Self {
        KeyData::Text(text.to_string())
    }
}

/// Strips PEM armor, accepting any label
pub(crate) fn decode_pem(pem: &str) -> Result<Vec<u8>> {
    let (_label, der) = pem_rfc7468::decode_vec(pem.trim().as_bytes())
        .map_err(|e| KeyUtilsError::Decoding(format!("Invalid PEM armor: {e}")))?;
    Ok(der)
}

/// Applies PEM armor with the given label
pub(crate) fn encode_pem(label: &str, der: &[u8]) -> Result<String> {
    pem_rfc7468::encode_string(label, LineEnding::LF, der)
        .map_err(|e| KeyUtilsError::Encoding(format!("Couldn't apply PEM armor: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pem_armor_round_trip() {
        let pem = encode_pem("PUBLIC KEY", &[0x30, 0x03, 0x02, 0x01, 0x05]).unwrap();
        assert!(pem.starts_with("-----BEGIN PUBLIC KEY-----\n"));
        assert!(pem.trim_end().ends_with("-----END PUBLIC KEY-----"));
        assert_eq!(decode_pem(&pem).unwrap(), vec![0x30, 0x03, 0x02, 0x01, 0x05]);
    }

    #[test]
    fn shape_must_fit_format() {
        assert!(matches!(
            KeyData::from("not der").to_der(KeyFormat::Der),
            Err(KeyUtilsError::InvalidObjectType(_))
        ));
        assert!(matches!(
            KeyData::from(vec![0xff, 0xfe]).to_der(KeyFormat::Pem),
            Err(KeyUtilsError::InvalidObjectType(_))
        ));
        assert!(matches!(
            KeyData::from("-----BEGIN nothing").to_der(KeyFormat::Pem),
            Err(KeyUtilsError::Decoding(_))
        ));
    }
}
