//! Device registry — read-only queries over the currently attached
//! capture devices.
//!
//! The registry reflects live OS/driver state: results may differ between
//! calls as devices are plugged and unplugged, so callers must not cache
//! them across selections.

use crate::camera::error::Result;
use crate::camera::types::{CaptureDevice, DeviceKind, VIRTUAL_DEVICE_ID};

/// Registry of available capture devices.
///
/// Implemented per-platform (AVFoundation on macOS, DirectShow on Windows,
/// V4L2 on Linux) by the host. The lookup helpers are defined over
/// `enumerate_devices` so that every implementation resolves ties the same
/// way: the first matching device in enumeration order wins.
pub trait DeviceRegistry: Send + Sync {
    /// Enumerate all currently attached devices, in the backend's stable
    /// enumeration order.
    fn enumerate_devices(&self) -> Result<Vec<CaptureDevice>>;

    /// Look up the virtual background device by its well-known identifier.
    fn find_virtual_device(&self) -> Result<Option<CaptureDevice>> {
        Ok(self
            .enumerate_devices()?
            .into_iter()
            .find(|d| d.id.as_str() == VIRTUAL_DEVICE_ID))
    }

    /// Look up the default front-facing physical camera.
    fn find_default_physical_device(&self) -> Result<Option<CaptureDevice>> {
        Ok(self
            .enumerate_devices()?
            .into_iter()
            .find(|d| d.kind == DeviceKind::PhysicalFront))
    }
}

/// A registry over a fixed device snapshot.
///
/// Hosts that enumerate devices themselves hand the result to the selector
/// through this type.
pub struct StaticRegistry {
    devices: Vec<CaptureDevice>,
}

impl StaticRegistry {
    /// Create a registry over the given snapshot.
    pub fn new(devices: Vec<CaptureDevice>) -> Self {
        Self { devices }
    }

    /// A registry with no devices attached.
    pub fn empty() -> Self {
        Self { devices: vec![] }
    }
}

impl DeviceRegistry for StaticRegistry {
    fn enumerate_devices(&self) -> Result<Vec<CaptureDevice>> {
        Ok(self.devices.clone())
    }
}

/// A registry that merges device lists from multiple sub-registries.
///
/// Enumeration concatenates results in sub-registry order (logging
/// failures), so a virtual-device provider and a platform provider can be
/// combined without either blocking the other.
pub struct CompositeRegistry {
    registries: Vec<Box<dyn DeviceRegistry>>,
}

impl CompositeRegistry {
    /// Create a new composite from the given registries.
    pub fn new(registries: Vec<Box<dyn DeviceRegistry>>) -> Self {
        Self { registries }
    }
}

impl DeviceRegistry for CompositeRegistry {
    fn enumerate_devices(&self) -> Result<Vec<CaptureDevice>> {
        let mut all = Vec::new();
        for registry in &self.registries {
            match registry.enumerate_devices() {
                Ok(devices) => all.extend(devices),
                Err(e) => tracing::warn!("Registry enumeration failed: {e}"),
            }
        }
        Ok(all)
    }
}
