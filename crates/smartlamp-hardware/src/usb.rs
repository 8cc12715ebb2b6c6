//! USB bulk transport.
//!
//! Drives the lamp's bulk endpoints directly through libusb, bypassing the
//! host serial driver. The first interface offering both a bulk IN and a
//! bulk OUT endpoint is claimed. The IN endpoint's max packet size is the
//! transfer size; the framer always reads with a buffer at least that
//! large. Enabled with the `hardware-usb` feature.

use std::time::Duration;

use rusb::{DeviceHandle, Direction, GlobalContext, TransferType};
use smartlamp_core::constants::{PRODUCT_ID, VENDOR_ID};
use smartlamp_core::{Error, Result};
use tracing::{debug, info, warn};

use crate::traits::Transport;

/// Endpoint addresses found on the lamp's interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkEndpoints {
    /// Interface number the endpoints belong to.
    pub interface: u8,

    /// Bulk IN endpoint address.
    pub endpoint_in: u8,

    /// Bulk OUT endpoint address.
    pub endpoint_out: u8,

    /// Max packet size of the IN endpoint.
    pub max_packet_size: usize,
}

/// Lamp transport over raw USB bulk transfers.
pub struct UsbBulkTransport {
    handle: DeviceHandle<GlobalContext>,
    endpoints: BulkEndpoints,
}

impl UsbBulkTransport {
    /// Open the first lamp on the bus.
    pub fn open() -> Result<Self> {
        Self::open_with_ids(VENDOR_ID, PRODUCT_ID)
    }

    /// Open the first device matching `vendor_id`/`product_id`.
    pub fn open_with_ids(vendor_id: u16, product_id: u16) -> Result<Self> {
        let handle = rusb::open_device_with_vid_pid(vendor_id, product_id).ok_or_else(|| {
            Error::disconnected(format!("usb {vendor_id:04x}:{product_id:04x}"))
        })?;

        let endpoints = find_bulk_endpoints(&handle)?;

        if let Err(e) = handle.set_auto_detach_kernel_driver(true) {
            debug!("Kernel driver auto-detach unavailable: {}", e);
        }
        handle
            .claim_interface(endpoints.interface)
            .map_err(map_usb_error)?;

        info!(
            interface = endpoints.interface,
            endpoint_in = endpoints.endpoint_in,
            endpoint_out = endpoints.endpoint_out,
            max_packet_size = endpoints.max_packet_size,
            "Claimed lamp USB interface"
        );
        Ok(Self { handle, endpoints })
    }

    /// Endpoints in use.
    pub fn endpoints(&self) -> BulkEndpoints {
        self.endpoints
    }
}

impl std::fmt::Debug for UsbBulkTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsbBulkTransport")
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

impl Transport for UsbBulkTransport {
    fn write(&mut self, bytes: &[u8], timeout: Duration) -> Result<usize> {
        self.handle
            .write_bulk(self.endpoints.endpoint_out, bytes, timeout)
            .map_err(|e| map_transfer_error(e, timeout))
    }

    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        self.handle
            .read_bulk(self.endpoints.endpoint_in, buf, timeout)
            .map_err(|e| map_transfer_error(e, timeout))
    }

    fn max_transfer_size(&self) -> usize {
        self.endpoints.max_packet_size
    }

    fn name(&self) -> &str {
        "usb bulk"
    }
}

impl Drop for UsbBulkTransport {
    fn drop(&mut self) {
        if let Err(e) = self.handle.release_interface(self.endpoints.interface) {
            warn!("Failed to release lamp interface: {}", e);
        }
    }
}

fn find_bulk_endpoints(handle: &DeviceHandle<GlobalContext>) -> Result<BulkEndpoints> {
    let config = handle
        .device()
        .active_config_descriptor()
        .map_err(map_usb_error)?;

    for interface in config.interfaces() {
        for descriptor in interface.descriptors() {
            let mut endpoint_in = None;
            let mut endpoint_out = None;

            for endpoint in descriptor.endpoint_descriptors() {
                if endpoint.transfer_type() != TransferType::Bulk {
                    continue;
                }
                match endpoint.direction() {
                    Direction::In if endpoint_in.is_none() => {
                        endpoint_in = Some((endpoint.address(), endpoint.max_packet_size()))
                    }
                    Direction::Out if endpoint_out.is_none() => {
                        endpoint_out = Some(endpoint.address())
                    }
                    _ => {}
                }
            }

            if let (Some((endpoint_in, max_packet_size)), Some(endpoint_out)) =
                (endpoint_in, endpoint_out)
            {
                return Ok(BulkEndpoints {
                    interface: descriptor.interface_number(),
                    endpoint_in,
                    endpoint_out,
                    max_packet_size: usize::from(max_packet_size),
                });
            }
        }
    }

    Err(Error::transport("no interface with bulk IN and OUT endpoints"))
}

fn map_transfer_error(error: rusb::Error, timeout: Duration) -> Error {
    match error {
        rusb::Error::Timeout => Error::timeout(timeout.as_millis() as u64),
        other => map_usb_error(other),
    }
}

fn map_usb_error(error: rusb::Error) -> Error {
    match error {
        rusb::Error::NoDevice => Error::disconnected("usb"),
        other => Error::transport(format!("usb: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usb_error_mapping() {
        assert!(matches!(
            map_usb_error(rusb::Error::NoDevice),
            Error::Disconnected { .. }
        ));
        assert!(matches!(
            map_usb_error(rusb::Error::Pipe),
            Error::Transport { .. }
        ));
        assert!(map_usb_error(rusb::Error::Io).is_transport());
    }

    #[test]
    fn test_transfer_timeout_keeps_duration() {
        let err = map_transfer_error(rusb::Error::Timeout, Duration::from_millis(1000));
        assert!(matches!(err, Error::Timeout { duration_ms: 1000 }));

        let err = map_transfer_error(rusb::Error::NoDevice, Duration::from_millis(1000));
        assert!(matches!(err, Error::Disconnected { .. }));
    }
}
