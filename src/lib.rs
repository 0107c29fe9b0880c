//! Spacelock - BLE access-token delivery for the spacelock smart lock
//!
//! The lock advertises a GATT service with a single writable token
//! characteristic. Access is granted by writing a signed token (an
//! HMAC-SHA256-authenticated validity window plus user id, base64-armored)
//! to that characteristic. This crate provides:
//! - the token wire format the firmware consumes
//! - a single-shot delivery workflow over an abstract GATT transport
//! - a btleplug-backed transport (feature `bluetooth`)

pub mod error;
pub mod uuids; // GATT service/characteristic identifiers
pub mod selector; // Device selection criteria
pub mod payload; // Payload forms and byte encoding
pub mod token; // Signed token wire format
pub mod transport; // GATT transport seam (btleplug behind `bluetooth`)
pub mod delivery; // The delivery workflow
pub mod config; // Delivery tunables

// Re-export commonly used types for easy access
pub use config::DeliveryConfig;
pub use delivery::{deliver, deliver_with, DeliveryError, DeliveryReceipt, DeliveryRequest};
pub use error::{Error, Result};
pub use payload::{EncodingError, TokenPayload};
pub use selector::{Advertisement, DeviceFilter, DeviceSelector};
pub use token::{SecretKey, SignedToken, Token};
pub use transport::{
    CharacteristicHandle, DeviceHandle, GattTransport, ServiceHandle, TransportError,
};
pub use uuids::{CharacteristicId, ServiceId, LOCK_SERVICE, TOKEN_CHARACTERISTIC};

#[cfg(feature = "bluetooth")]
pub use transport::BtleplugTransport;
