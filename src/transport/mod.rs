//! GATT transport layer
//!
//! This module is the seam between the delivery workflow and the host
//! platform's device-discovery and GATT APIs:
//! - `GattTransport` abstraction trait
//! - Opaque handles for devices, services and characteristics
//! - btleplug-backed BLE implementation (feature `bluetooth`)

pub mod traits;

#[cfg(feature = "bluetooth")]
pub mod bluetooth;

pub use traits::*;

#[cfg(feature = "bluetooth")]
pub use bluetooth::BtleplugTransport;

/// Opaque handle to a peripheral chosen during device selection
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceHandle {
    id: String,
    name: Option<String>,
}

impl DeviceHandle {
    pub fn new(id: impl Into<String>, name: Option<String>) -> Self {
        Self {
            id: id.into(),
            name,
        }
    }

    /// Platform identifier of the peripheral (address or OS handle)
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Advertised name, when one was seen
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Opaque handle to a resolved primary service, minted by the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceHandle(u64);

impl ServiceHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Opaque handle to a resolved characteristic, minted by the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CharacteristicHandle(u64);

impl CharacteristicHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Transport-specific error types
#[derive(Debug, Clone)]
pub enum TransportError {
    AdapterUnavailable(String),
    ScanFailed(String),
    ConnectionFailed(String),
    DiscoveryFailed(String),
    WriteFailed(String),
    UnknownHandle,
    Timeout,
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::AdapterUnavailable(msg) => write!(f, "Adapter unavailable: {}", msg),
            TransportError::ScanFailed(msg) => write!(f, "Scan failed: {}", msg),
            TransportError::ConnectionFailed(msg) => write!(f, "Connection failed: {}", msg),
            TransportError::DiscoveryFailed(msg) => write!(f, "Discovery failed: {}", msg),
            TransportError::WriteFailed(msg) => write!(f, "Write failed: {}", msg),
            TransportError::UnknownHandle => write!(f, "Handle does not belong to this transport"),
            TransportError::Timeout => write!(f, "Operation timed out"),
        }
    }
}

impl std::error::Error for TransportError {}
