//! Token payload representations and canonical byte encoding
//!
//! Callers resolve the payload form explicitly before invoking delivery:
//! raw bytes pass through, ASCII text encodes one byte per character code
//! (the form the lock firmware base64-decodes on its side), and base64 text
//! decodes to the underlying binary record.

use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use thiserror::Error;

/// Payload conversion failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("character U+{codepoint:04X} at index {index} does not fit in one byte")]
    NonByteCharacter { index: usize, codepoint: u32 },

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// The bytes to write to the token characteristic, in one of the accepted
/// source forms
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenPayload {
    /// Text written as one byte per character code point (must be <= 0xFF)
    Ascii(String),
    /// Standard base64 text, decoded before the write
    Base64(String),
    /// Already-binary buffer, passed through unchanged
    Raw(Vec<u8>),
}

impl TokenPayload {
    /// Convert to the canonical byte sequence
    pub fn encode(&self) -> std::result::Result<Vec<u8>, EncodingError> {
        match self {
            TokenPayload::Ascii(text) => text
                .chars()
                .enumerate()
                .map(|(index, c)| {
                    let codepoint = c as u32;
                    if codepoint > 0xFF {
                        Err(EncodingError::NonByteCharacter { index, codepoint })
                    } else {
                        Ok(codepoint as u8)
                    }
                })
                .collect(),
            TokenPayload::Base64(text) => Ok(BASE64_STANDARD.decode(text.as_bytes())?),
            TokenPayload::Raw(bytes) => Ok(bytes.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_ascii_byte_per_character() {
        let payload = TokenPayload::Ascii("abc".to_string());
        assert_eq!(payload.encode().unwrap(), vec![0x61, 0x62, 0x63]);

        let text = "sOmE/tOkEn+123=";
        let encoded = TokenPayload::Ascii(text.to_string()).encode().unwrap();
        assert_eq!(encoded.len(), text.chars().count());
        for (byte, c) in encoded.iter().zip(text.chars()) {
            assert_eq!(*byte as u32, c as u32);
        }
    }

    #[test]
    fn test_ascii_accepts_full_byte_range() {
        // U+00FF is the last code point that fits in one byte
        let payload = TokenPayload::Ascii("\u{00ff}".to_string());
        assert_eq!(payload.encode().unwrap(), vec![0xFF]);
    }

    #[test]
    fn test_ascii_rejects_wide_characters() {
        let payload = TokenPayload::Ascii("ab\u{20AC}".to_string());
        match payload.encode() {
            Err(EncodingError::NonByteCharacter { index, codepoint }) => {
                assert_eq!(index, 2);
                assert_eq!(codepoint, 0x20AC);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_base64_decoding() {
        let payload = TokenPayload::Base64("aGVsbG8=".to_string());
        assert_eq!(payload.encode().unwrap(), b"hello".to_vec());
    }

    #[test]
    fn test_malformed_base64_rejected() {
        let payload = TokenPayload::Base64("!!!".to_string());
        assert!(matches!(payload.encode(), Err(EncodingError::Base64(_))));
    }

    #[test]
    fn test_raw_passthrough() {
        let bytes = vec![0x00, 0xFF, 0x7F, 0x80];
        let payload = TokenPayload::Raw(bytes.clone());
        assert_eq!(payload.encode().unwrap(), bytes);
    }

    proptest! {
        // encode(decode(x)) == x for every well-formed base64 string x
        #[test]
        fn prop_base64_round_trip(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
            let armored = BASE64_STANDARD.encode(&bytes);
            let decoded = TokenPayload::Base64(armored.clone()).encode().unwrap();
            prop_assert_eq!(&decoded, &bytes);
            prop_assert_eq!(BASE64_STANDARD.encode(&decoded), armored);
        }

        #[test]
        fn prop_ascii_length_law(text in "[ -~]{0,64}") {
            let encoded = TokenPayload::Ascii(text.clone()).encode().unwrap();
            prop_assert_eq!(encoded.len(), text.chars().count());
        }
    }
}
