//! Bluetooth LE transport implementation using btleplug
//!
//! Scans the first available adapter for peripherals matching the device
//! selector, then drives connect / service discovery / characteristic
//! writes through the btleplug central API. Discovery polls the adapter's
//! peripheral list against the selector until a match appears or the scan
//! deadline passes; there is no interactive chooser on this platform, so a
//! deadline with no match reports as a cancelled selection upstream.

use std::collections::HashMap;

use btleplug::api::{Central, Manager as _, Peripheral as _, ScanFilter, WriteType};
use btleplug::platform::{Adapter, Manager, Peripheral};
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::DeliveryConfig;
use crate::selector::{Advertisement, DeviceSelector};
use crate::transport::{
    CharacteristicHandle, DeviceHandle, GattTransport, ServiceHandle, TransportError,
};
use crate::uuids::{CharacteristicId, ServiceId};
use async_trait::async_trait;

/// GATT transport backed by the host's BLE adapter
pub struct BtleplugTransport {
    _manager: Manager,
    adapter: Adapter,
    config: DeliveryConfig,
    peripherals: HashMap<String, Peripheral>,
    services: HashMap<u64, (String, Uuid)>,
    characteristics: HashMap<u64, (String, btleplug::api::Characteristic)>,
    next_handle: u64,
}

impl BtleplugTransport {
    /// Acquire the first Bluetooth adapter on the host
    pub async fn new(config: DeliveryConfig) -> Result<Self, TransportError> {
        let manager = Manager::new()
            .await
            .map_err(|e| TransportError::AdapterUnavailable(e.to_string()))?;
        let adapters = manager
            .adapters()
            .await
            .map_err(|e| TransportError::AdapterUnavailable(e.to_string()))?;
        let adapter = adapters
            .into_iter()
            .next()
            .ok_or_else(|| TransportError::AdapterUnavailable("no Bluetooth adapter present".to_string()))?;

        Ok(Self {
            _manager: manager,
            adapter,
            config,
            peripherals: HashMap::new(),
            services: HashMap::new(),
            characteristics: HashMap::new(),
            next_handle: 0,
        })
    }

    fn mint_handle(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }

    fn peripheral(&self, device_id: &str) -> Result<&Peripheral, TransportError> {
        self.peripherals
            .get(device_id)
            .ok_or(TransportError::UnknownHandle)
    }

    async fn advertisement(peripheral: &Peripheral) -> Advertisement {
        match peripheral.properties().await {
            Ok(Some(properties)) => Advertisement {
                local_name: properties.local_name,
                services: properties
                    .services
                    .into_iter()
                    .map(ServiceId::new)
                    .collect(),
            },
            Ok(None) => Advertisement::default(),
            Err(e) => {
                warn!("could not read peripheral properties: {}", e);
                Advertisement::default()
            }
        }
    }
}

#[async_trait]
impl GattTransport for BtleplugTransport {
    async fn select_device(
        &mut self,
        selector: &DeviceSelector,
    ) -> Result<Option<DeviceHandle>, TransportError> {
        self.adapter
            .start_scan(ScanFilter::default())
            .await
            .map_err(|e| TransportError::ScanFailed(e.to_string()))?;

        let deadline = Instant::now() + self.config.scan_timeout();
        let mut matched: Option<(Peripheral, Advertisement)> = None;

        while Instant::now() < deadline {
            let peripherals = self
                .adapter
                .peripherals()
                .await
                .map_err(|e| TransportError::ScanFailed(e.to_string()))?;
            for peripheral in peripherals {
                let advertisement = Self::advertisement(&peripheral).await;
                if selector.matches(&advertisement) {
                    matched = Some((peripheral, advertisement));
                    break;
                }
            }
            if matched.is_some() {
                break;
            }
            sleep(self.config.scan_poll()).await;
        }
        // Best effort - a failed stop does not invalidate the selection
        self.adapter.stop_scan().await.ok();

        let Some((peripheral, advertisement)) = matched else {
            debug!("scan deadline passed with no matching peripheral");
            return Ok(None);
        };

        let device_id = peripheral.address().to_string();
        debug!(
            "selected peripheral {} ({:?})",
            device_id, advertisement.local_name
        );
        self.peripherals.insert(device_id.clone(), peripheral);
        Ok(Some(DeviceHandle::new(device_id, advertisement.local_name)))
    }

    async fn connect(&mut self, device: &DeviceHandle) -> Result<(), TransportError> {
        let peripheral = self.peripheral(device.id())?;
        let connected = peripheral
            .is_connected()
            .await
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;
        if !connected {
            peripheral
                .connect()
                .await
                .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;
        }
        debug!("connected to {}", device.id());
        Ok(())
    }

    async fn primary_service(
        &mut self,
        device: &DeviceHandle,
        service: &ServiceId,
    ) -> Result<Option<ServiceHandle>, TransportError> {
        let peripheral = self.peripheral(device.id())?;
        peripheral
            .discover_services()
            .await
            .map_err(|e| TransportError::DiscoveryFailed(e.to_string()))?;

        let found = peripheral
            .services()
            .into_iter()
            .find(|candidate| candidate.primary && candidate.uuid == service.as_uuid());
        match found {
            Some(resolved) => {
                let handle = self.mint_handle();
                self.services
                    .insert(handle, (device.id().to_string(), resolved.uuid));
                Ok(Some(ServiceHandle::new(handle)))
            }
            None => {
                debug!("service {} not present on {}", service, device.id());
                Ok(None)
            }
        }
    }

    async fn characteristic(
        &mut self,
        service: &ServiceHandle,
        characteristic: &CharacteristicId,
    ) -> Result<Option<CharacteristicHandle>, TransportError> {
        let (device_id, service_uuid) = self
            .services
            .get(&service.raw())
            .cloned()
            .ok_or(TransportError::UnknownHandle)?;
        let peripheral = self.peripheral(&device_id)?;

        let found = peripheral
            .services()
            .into_iter()
            .find(|candidate| candidate.uuid == service_uuid)
            .and_then(|resolved| {
                resolved
                    .characteristics
                    .into_iter()
                    .find(|chr| chr.uuid == characteristic.as_uuid())
            });
        match found {
            Some(resolved) => {
                let handle = self.mint_handle();
                self.characteristics.insert(handle, (device_id, resolved));
                Ok(Some(CharacteristicHandle::new(handle)))
            }
            None => {
                debug!("characteristic {} not present", characteristic);
                Ok(None)
            }
        }
    }

    async fn write(
        &mut self,
        characteristic: &CharacteristicHandle,
        value: &[u8],
    ) -> Result<(), TransportError> {
        let (device_id, chr) = self
            .characteristics
            .get(&characteristic.raw())
            .cloned()
            .ok_or(TransportError::UnknownHandle)?;
        let peripheral = self.peripheral(&device_id)?;

        let write_type = if self.config.write_with_response {
            WriteType::WithResponse
        } else {
            WriteType::WithoutResponse
        };
        peripheral
            .write(&chr, value, write_type)
            .await
            .map_err(|e| TransportError::WriteFailed(e.to_string()))?;
        debug!("wrote {} bytes to {}", value.len(), chr.uuid);
        Ok(())
    }
}
