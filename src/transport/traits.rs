//! GATT transport trait definitions

use crate::selector::DeviceSelector;
use crate::transport::{CharacteristicHandle, DeviceHandle, ServiceHandle, TransportError};
use crate::uuids::{CharacteristicId, ServiceId};
use async_trait::async_trait;

/// Core GATT client trait - defines what any transport must do for the
/// delivery workflow. Each operation is a single platform round trip;
/// `Ok(None)` means the platform answered but the requested item does not
/// exist (no match, no such service, no such characteristic).
#[async_trait]
pub trait GattTransport: Send {
    /// Present candidate peripherals matching the selector and resolve to
    /// the chosen one, or `None` when the chooser is dismissed or nothing
    /// matches before the scan deadline
    async fn select_device(
        &mut self,
        selector: &DeviceSelector,
    ) -> Result<Option<DeviceHandle>, TransportError>;

    /// Open a GATT connection to the selected device
    async fn connect(&mut self, device: &DeviceHandle) -> Result<(), TransportError>;

    /// Look up a primary service on the connected device
    async fn primary_service(
        &mut self,
        device: &DeviceHandle,
        service: &ServiceId,
    ) -> Result<Option<ServiceHandle>, TransportError>;

    /// Look up a characteristic within a resolved service
    async fn characteristic(
        &mut self,
        service: &ServiceHandle,
        characteristic: &CharacteristicId,
    ) -> Result<Option<CharacteristicHandle>, TransportError>;

    /// Write a value to a resolved characteristic
    async fn write(
        &mut self,
        characteristic: &CharacteristicHandle,
        value: &[u8],
    ) -> Result<(), TransportError>;
}
