//! Spacelock access-token wire format
//!
//! A token grants access to the lock during a validity window. Wire layout,
//! as the firmware consumes it:
//!
//! ```text
//! mac[16] || valid_from: u64 LE || valid_until: u64 LE || user_id: ASCII
//! ```
//!
//! `mac` is HMAC-SHA256 over everything after it, keyed with the lock's
//! 32-byte secret and truncated to 16 bytes. The whole record is
//! base64-armored for QR and BLE transport. Timestamps are Unix seconds;
//! the window is inclusive on both ends.

use std::fmt;
use std::path::Path;

use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Truncated MAC length on the wire
pub const MAC_LEN: usize = 16;

/// Secret key length shared with the firmware
pub const SECRET_KEY_LEN: usize = 32;

/// Two little-endian u64 timestamps
const WINDOW_LEN: usize = 16;

/// Token encoding, decoding and verification failures
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token record too short: {0} bytes")]
    Truncated(usize),

    #[error("user id must be non-empty printable ASCII")]
    InvalidUserId,

    #[error("validity window is inverted (valid_from > valid_until)")]
    InvertedWindow,

    #[error("invalid base64 armor: {0}")]
    Armor(#[from] base64::DecodeError),

    #[error("MAC verification failed")]
    BadMac,

    #[error("invalid secret key: {0}")]
    BadKey(String),
}

/// The lock's shared secret
#[derive(Clone)]
pub struct SecretKey([u8; SECRET_KEY_LEN]);

impl SecretKey {
    pub fn from_bytes(bytes: [u8; SECRET_KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Generate a fresh random key
    pub fn generate() -> Self {
        let mut bytes = [0u8; SECRET_KEY_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn from_hex(hex_str: &str) -> std::result::Result<Self, TokenError> {
        let bytes = hex::decode(hex_str.trim())
            .map_err(|e| TokenError::BadKey(format!("not hexadecimal: {}", e)))?;
        if bytes.len() != SECRET_KEY_LEN {
            return Err(TokenError::BadKey(format!(
                "expected {} bytes, got {}",
                SECRET_KEY_LEN,
                bytes.len()
            )));
        }
        let mut key = [0u8; SECRET_KEY_LEN];
        key.copy_from_slice(&bytes);
        Ok(Self(key))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Load a hex-encoded key from a file
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::from_hex(&text)?)
    }

    /// Write the key to a file as hex
    pub fn store(&self, path: &Path) -> crate::error::Result<()> {
        std::fs::write(path, self.to_hex())?;
        Ok(())
    }
}

impl fmt::Debug for SecretKey {
    // Key material stays out of logs
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey(..)")
    }
}

/// An unsigned token: validity window plus user id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub valid_from: u64,
    pub valid_until: u64,
    pub user_id: String,
}

impl Token {
    pub fn new(valid_from: u64, valid_until: u64, user_id: &str) -> std::result::Result<Self, TokenError> {
        if valid_from > valid_until {
            return Err(TokenError::InvertedWindow);
        }
        if user_id.is_empty() || !user_id.bytes().all(|b| (0x20..0x7F).contains(&b)) {
            return Err(TokenError::InvalidUserId);
        }
        Ok(Self {
            valid_from,
            valid_until,
            user_id: user_id.to_string(),
        })
    }

    /// The MAC'd portion of the wire record
    pub fn body_bytes(&self) -> Vec<u8> {
        let mut body = Vec::with_capacity(WINDOW_LEN + self.user_id.len());
        body.extend_from_slice(&self.valid_from.to_le_bytes());
        body.extend_from_slice(&self.valid_until.to_le_bytes());
        body.extend_from_slice(self.user_id.as_bytes());
        body
    }

    /// Whether the window covers the given Unix timestamp (inclusive ends,
    /// matching the firmware's checks)
    pub fn is_valid_at(&self, unix_time: u64) -> bool {
        self.valid_from <= unix_time && unix_time <= self.valid_until
    }

    /// Sign with the lock secret, producing the deliverable record
    pub fn sign(&self, key: &SecretKey) -> SignedToken {
        let digest = compute_mac(key, &self.body_bytes());
        let mut mac = [0u8; MAC_LEN];
        mac.copy_from_slice(&digest[..MAC_LEN]);
        SignedToken {
            mac,
            token: self.clone(),
        }
    }
}

/// A signed token ready for armor and delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedToken {
    mac: [u8; MAC_LEN],
    token: Token,
}

impl SignedToken {
    pub fn mac(&self) -> &[u8; MAC_LEN] {
        &self.mac
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    /// Full wire record: mac || body
    pub fn to_bytes(&self) -> Vec<u8> {
        let body = self.token.body_bytes();
        let mut bytes = Vec::with_capacity(MAC_LEN + body.len());
        bytes.extend_from_slice(&self.mac);
        bytes.extend_from_slice(&body);
        bytes
    }

    /// Base64-armored wire record
    pub fn to_base64(&self) -> String {
        BASE64_STANDARD.encode(self.to_bytes())
    }

    pub fn from_bytes(bytes: &[u8]) -> std::result::Result<Self, TokenError> {
        // mac + window + at least one user id byte
        if bytes.len() <= MAC_LEN + WINDOW_LEN {
            return Err(TokenError::Truncated(bytes.len()));
        }
        let mut mac = [0u8; MAC_LEN];
        mac.copy_from_slice(&bytes[..MAC_LEN]);

        let mut from_bytes = [0u8; 8];
        from_bytes.copy_from_slice(&bytes[MAC_LEN..MAC_LEN + 8]);
        let mut until_bytes = [0u8; 8];
        until_bytes.copy_from_slice(&bytes[MAC_LEN + 8..MAC_LEN + 16]);

        let user_id = std::str::from_utf8(&bytes[MAC_LEN + WINDOW_LEN..])
            .map_err(|_| TokenError::InvalidUserId)?;
        let token = Token::new(
            u64::from_le_bytes(from_bytes),
            u64::from_le_bytes(until_bytes),
            user_id,
        )?;
        Ok(Self { mac, token })
    }

    pub fn from_base64(armored: &str) -> std::result::Result<Self, TokenError> {
        let bytes = BASE64_STANDARD.decode(armored.trim().as_bytes())?;
        Self::from_bytes(&bytes)
    }

    /// Recompute the MAC and compare in constant time
    pub fn verify(&self, key: &SecretKey) -> std::result::Result<(), TokenError> {
        let mut mac = HmacSha256::new_from_slice(key.0.as_slice())
            .map_err(|e| TokenError::BadKey(e.to_string()))?;
        mac.update(&self.token.body_bytes());
        mac.verify_truncated_left(&self.mac)
            .map_err(|_| TokenError::BadMac)
    }
}

fn compute_mac(key: &SecretKey, body: &[u8]) -> [u8; 32] {
    // new_from_slice only fails on oversized keys, and ours is fixed-length
    let mut mac = HmacSha256::new_from_slice(key.0.as_slice())
        .expect("HMAC accepts 32-byte keys");
    mac.update(body);
    mac.finalize().into_bytes().into()
}
