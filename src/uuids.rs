//! GATT identifier types
//!
//! Services and characteristics are addressed by UUID. Callers may supply
//! the full 128-bit form or a SIG-style 16-/32-bit short hex form, which is
//! expanded against the Bluetooth base UUID.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Suffix of the Bluetooth base UUID, used to expand short identifiers
const BLUETOOTH_BASE_SUFFIX: &str = "-0000-1000-8000-00805f9b34fb";

/// GATT service advertised by the spacelock firmware
pub const LOCK_SERVICE: ServiceId =
    ServiceId(Uuid::from_u128(0x12345678_1234_5678_1234_56789abcdef0));

/// Characteristic the firmware accepts token writes on
pub const TOKEN_CHARACTERISTIC: CharacteristicId =
    CharacteristicId(Uuid::from_u128(0x12345678_1234_5678_1234_56789abcdef5));

/// Failed to parse a GATT identifier string
#[derive(Debug, Clone, Error)]
#[error("invalid GATT identifier '{input}': {reason}")]
pub struct IdParseError {
    pub input: String,
    pub reason: String,
}

fn parse_gatt_uuid(input: &str) -> std::result::Result<Uuid, IdParseError> {
    let trimmed = input.trim().trim_start_matches("0x");
    let normalized = match trimmed.len() {
        4 => format!("0000{}{}", trimmed, BLUETOOTH_BASE_SUFFIX),
        8 => format!("{}{}", trimmed, BLUETOOTH_BASE_SUFFIX),
        _ => trimmed.to_string(),
    };
    Uuid::parse_str(&normalized).map_err(|e| IdParseError {
        input: input.to_string(),
        reason: e.to_string(),
    })
}

/// Identifier of a GATT primary service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServiceId(Uuid);

/// Identifier of a GATT characteristic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CharacteristicId(Uuid);

impl ServiceId {
    pub const fn new(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl CharacteristicId {
    pub const fn new(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl FromStr for ServiceId {
    type Err = IdParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        parse_gatt_uuid(s).map(Self)
    }
}

impl FromStr for CharacteristicId {
    type Err = IdParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        parse_gatt_uuid(s).map(Self)
    }
}

impl TryFrom<String> for ServiceId {
    type Error = IdParseError;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        s.parse()
    }
}

impl TryFrom<String> for CharacteristicId {
    type Error = IdParseError;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ServiceId> for String {
    fn from(id: ServiceId) -> String {
        id.0.to_string()
    }
}

impl From<CharacteristicId> for String {
    fn from(id: CharacteristicId) -> String {
        id.0.to_string()
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for CharacteristicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_uuid_parsing() {
        let id: ServiceId = "12345678-1234-5678-1234-56789abcdef0".parse().unwrap();
        assert_eq!(id, LOCK_SERVICE);

        let chr: CharacteristicId = "12345678-1234-5678-1234-56789abcdef5".parse().unwrap();
        assert_eq!(chr, TOKEN_CHARACTERISTIC);
    }

    #[test]
    fn test_short_form_expansion() {
        // 16-bit Battery Service short form
        let id: ServiceId = "180f".parse().unwrap();
        assert_eq!(
            id.as_uuid().to_string(),
            "0000180f-0000-1000-8000-00805f9b34fb"
        );

        // 0x prefix and surrounding whitespace are tolerated
        let id: ServiceId = " 0x180f ".parse().unwrap();
        assert_eq!(
            id.as_uuid().to_string(),
            "0000180f-0000-1000-8000-00805f9b34fb"
        );

        // 32-bit short form
        let id: ServiceId = "0000180f".parse().unwrap();
        assert_eq!(
            id.as_uuid().to_string(),
            "0000180f-0000-1000-8000-00805f9b34fb"
        );
    }

    #[test]
    fn test_invalid_identifier_rejected() {
        assert!("not-a-uuid".parse::<ServiceId>().is_err());
        assert!("12345".parse::<CharacteristicId>().is_err());
        assert!("".parse::<ServiceId>().is_err());
    }

    #[test]
    fn test_serde_string_form() {
        let id: ServiceId = serde_json::from_str("\"180f\"").unwrap();
        assert_eq!(
            id.as_uuid().to_string(),
            "0000180f-0000-1000-8000-00805f9b34fb"
        );

        let json = serde_json::to_string(&LOCK_SERVICE).unwrap();
        assert_eq!(json, "\"12345678-1234-5678-1234-56789abcdef0\"");
    }
}
