//! Token delivery workflow
//!
//! One invocation performs exactly one discovery -> connect -> resolve ->
//! write sequence and produces exactly one outcome. The pipeline is
//! fail-fast: the first failing step categorizes the whole attempt, later
//! steps never run, and nothing is retried. Payload bytes are resolved
//! before any radio traffic, so a malformed payload costs no scan.
//!
//! Concurrent deliveries are independent (no shared state), but callers
//! must not aim two invocations at the same physical connection; the
//! platform's behavior for that is undefined.

use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::config::DeliveryConfig;
use crate::payload::{EncodingError, TokenPayload};
use crate::selector::DeviceSelector;
use crate::transport::{DeviceHandle, GattTransport};
use crate::uuids::{CharacteristicId, ServiceId};

/// Terminal failure categories for a delivery attempt, one per pipeline
/// step plus payload encoding
#[derive(Debug, Clone, Error)]
pub enum DeliveryError {
    #[error("device selection was cancelled or no device matched")]
    SelectionCancelled,

    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("service {0} not found on the selected device")]
    ServiceNotFound(ServiceId),

    #[error("characteristic {0} not found in service {1}")]
    CharacteristicNotFound(CharacteristicId, ServiceId),

    #[error("write failed: {0}")]
    WriteFailed(String),

    #[error("payload encoding failed: {0}")]
    Encoding(#[from] EncodingError),
}

impl DeliveryError {
    /// Stable machine-readable category name
    pub fn category(&self) -> &'static str {
        match self {
            DeliveryError::SelectionCancelled => "selection-cancelled",
            DeliveryError::ConnectionFailed(_) => "connection-failed",
            DeliveryError::ServiceNotFound(_) => "service-not-found",
            DeliveryError::CharacteristicNotFound(_, _) => "characteristic-not-found",
            DeliveryError::WriteFailed(_) => "write-failed",
            DeliveryError::Encoding(_) => "encoding",
        }
    }
}

/// Everything one delivery needs. Single-use: `deliver` consumes it.
#[derive(Debug, Clone)]
pub struct DeliveryRequest {
    pub selector: DeviceSelector,
    pub service: ServiceId,
    pub characteristic: CharacteristicId,
    pub payload: TokenPayload,
}

impl DeliveryRequest {
    pub fn new(
        selector: DeviceSelector,
        service: ServiceId,
        characteristic: CharacteristicId,
        payload: TokenPayload,
    ) -> Self {
        Self {
            selector,
            service,
            characteristic,
            payload,
        }
    }
}

/// Proof of a completed delivery
#[derive(Debug, Clone)]
pub struct DeliveryReceipt {
    pub device: DeviceHandle,
    pub bytes_written: usize,
}

/// Run the delivery pipeline with default timeouts
pub async fn deliver<T>(
    transport: &mut T,
    request: DeliveryRequest,
) -> Result<DeliveryReceipt, DeliveryError>
where
    T: GattTransport + ?Sized,
{
    deliver_with(transport, request, &DeliveryConfig::default()).await
}

/// Run the delivery pipeline: select -> connect -> resolve service ->
/// resolve characteristic -> write
pub async fn deliver_with<T>(
    transport: &mut T,
    request: DeliveryRequest,
    config: &DeliveryConfig,
) -> Result<DeliveryReceipt, DeliveryError>
where
    T: GattTransport + ?Sized,
{
    // Encoding failures abort before the radio is touched
    let value = request.payload.encode()?;

    let device = match timeout(
        config.selection_budget(),
        transport.select_device(&request.selector),
    )
    .await
    {
        Ok(Ok(Some(device))) => device,
        Ok(Ok(None)) => return Err(DeliveryError::SelectionCancelled),
        Ok(Err(e)) => {
            debug!("device selection failed: {}", e);
            return Err(DeliveryError::SelectionCancelled);
        }
        Err(_) => return Err(DeliveryError::SelectionCancelled),
    };
    debug!("device selected: {}", device.id());

    let op_timeout = config.operation_timeout();

    timeout(op_timeout, transport.connect(&device))
        .await
        .map_err(|_| DeliveryError::ConnectionFailed("timed out".to_string()))?
        .map_err(|e| DeliveryError::ConnectionFailed(e.to_string()))?;

    let service = timeout(
        op_timeout,
        transport.primary_service(&device, &request.service),
    )
    .await
    .map_err(|_| DeliveryError::ServiceNotFound(request.service))?
    .map_err(|e| {
        debug!("service discovery failed: {}", e);
        DeliveryError::ServiceNotFound(request.service)
    })?
    .ok_or(DeliveryError::ServiceNotFound(request.service))?;

    let characteristic = timeout(
        op_timeout,
        transport.characteristic(&service, &request.characteristic),
    )
    .await
    .map_err(|_| DeliveryError::CharacteristicNotFound(request.characteristic, request.service))?
    .map_err(|e| {
        debug!("characteristic lookup failed: {}", e);
        DeliveryError::CharacteristicNotFound(request.characteristic, request.service)
    })?
    .ok_or(DeliveryError::CharacteristicNotFound(
        request.characteristic,
        request.service,
    ))?;

    timeout(op_timeout, transport.write(&characteristic, &value))
        .await
        .map_err(|_| DeliveryError::WriteFailed("timed out".to_string()))?
        .map_err(|e| DeliveryError::WriteFailed(e.to_string()))?;

    info!(
        "delivered {} bytes to {} on {}",
        value.len(),
        request.characteristic,
        device.id()
    );
    Ok(DeliveryReceipt {
        device,
        bytes_written: value.len(),
    })
}
