//! Shared test doubles for the delivery workflow

use async_trait::async_trait;

use spacelock::{
    Advertisement, CharacteristicHandle, CharacteristicId, DeviceHandle, DeviceSelector,
    GattTransport, ServiceHandle, ServiceId, TransportError,
};

/// What the fake lock exposes once connected
#[derive(Debug, Clone)]
pub struct FakeGattDb {
    pub services: Vec<(ServiceId, Vec<CharacteristicId>)>,
}

/// Scripted failure injection, one knob per pipeline step
#[derive(Debug, Clone, Default)]
pub struct FakeFaults {
    pub cancel_selection: bool,
    pub fail_scan: bool,
    pub fail_connect: bool,
    pub fail_discovery: bool,
    pub fail_write: bool,
}

/// A fully cooperative (unless scripted otherwise) in-memory GATT platform.
/// Records every call and every write for later assertions.
pub struct FakeGatt {
    pub advertisement: Advertisement,
    pub db: FakeGattDb,
    pub faults: FakeFaults,
    pub calls: Vec<&'static str>,
    pub writes: Vec<Vec<u8>>,
    next_handle: u64,
    resolved_services: Vec<(u64, ServiceId)>,
}

impl FakeGatt {
    /// A lock advertising `name` with one writable characteristic
    pub fn cooperative(name: &str, service: ServiceId, characteristic: CharacteristicId) -> Self {
        Self {
            advertisement: Advertisement::named(name).with_service(service),
            db: FakeGattDb {
                services: vec![(service, vec![characteristic])],
            },
            faults: FakeFaults::default(),
            calls: Vec::new(),
            writes: Vec::new(),
            next_handle: 0,
            resolved_services: Vec::new(),
        }
    }

    pub fn with_faults(mut self, faults: FakeFaults) -> Self {
        self.faults = faults;
        self
    }

    /// Connected device that advertises nothing extra and has no services
    pub fn empty_device(name: &str) -> Self {
        Self {
            advertisement: Advertisement::named(name),
            db: FakeGattDb {
                services: Vec::new(),
            },
            faults: FakeFaults::default(),
            calls: Vec::new(),
            writes: Vec::new(),
            next_handle: 0,
            resolved_services: Vec::new(),
        }
    }

    fn mint(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }
}

#[async_trait]
impl GattTransport for FakeGatt {
    async fn select_device(
        &mut self,
        selector: &DeviceSelector,
    ) -> Result<Option<DeviceHandle>, TransportError> {
        self.calls.push("select_device");
        if self.faults.fail_scan {
            return Err(TransportError::ScanFailed("adapter gone".to_string()));
        }
        if self.faults.cancel_selection {
            return Ok(None);
        }
        if !selector.matches(&self.advertisement) {
            return Ok(None);
        }
        Ok(Some(DeviceHandle::new(
            "aa:bb:cc:dd:ee:ff",
            self.advertisement.local_name.clone(),
        )))
    }

    async fn connect(&mut self, _device: &DeviceHandle) -> Result<(), TransportError> {
        self.calls.push("connect");
        if self.faults.fail_connect {
            return Err(TransportError::ConnectionFailed(
                "peripheral refused".to_string(),
            ));
        }
        Ok(())
    }

    async fn primary_service(
        &mut self,
        _device: &DeviceHandle,
        service: &ServiceId,
    ) -> Result<Option<ServiceHandle>, TransportError> {
        self.calls.push("primary_service");
        if self.faults.fail_discovery {
            return Err(TransportError::DiscoveryFailed(
                "discovery interrupted".to_string(),
            ));
        }
        let known = self.db.services.iter().any(|(id, _)| id == service);
        if !known {
            return Ok(None);
        }
        let handle = self.mint();
        self.resolved_services.push((handle, *service));
        Ok(Some(ServiceHandle::new(handle)))
    }

    async fn characteristic(
        &mut self,
        service: &ServiceHandle,
        characteristic: &CharacteristicId,
    ) -> Result<Option<CharacteristicHandle>, TransportError> {
        self.calls.push("characteristic");
        let resolved = self
            .resolved_services
            .iter()
            .find(|(handle, _)| *handle == service.raw())
            .map(|(_, id)| *id)
            .ok_or(TransportError::UnknownHandle)?;
        let present = self
            .db
            .services
            .iter()
            .find(|(id, _)| *id == resolved)
            .map(|(_, chars)| chars.contains(characteristic))
            .unwrap_or(false);
        if !present {
            return Ok(None);
        }
        let handle = self.mint();
        Ok(Some(CharacteristicHandle::new(handle)))
    }

    async fn write(
        &mut self,
        _characteristic: &CharacteristicHandle,
        value: &[u8],
    ) -> Result<(), TransportError> {
        self.calls.push("write");
        if self.faults.fail_write {
            return Err(TransportError::WriteFailed(
                "ATT write rejected".to_string(),
            ));
        }
        self.writes.push(value.to_vec());
        Ok(())
    }
}
