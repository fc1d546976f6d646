//! Camera source selection — decides which capture device feeds the
//! preview/output path.
//!
//! Selection is a pure function of the configuration flag and a fresh
//! registry snapshot. It owns no state, so callers may invoke it from any
//! thread, and a configuration change takes effect on the next call.

use serde::Serialize;

use crate::camera::error::Result;
use crate::camera::registry::DeviceRegistry;
use crate::camera::types::{CaptureDevice, DeviceId};
use crate::config::SelectorConfig;

/// Terminal outcome of a camera source selection.
///
/// `NoDevice` is a valid steady state, not an error: consumers render a
/// placeholder for it rather than failing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Selection {
    VirtualActive(CaptureDevice),
    PhysicalActive(CaptureDevice),
    NoDevice,
}

impl Selection {
    /// The selected device, if any.
    pub fn device(&self) -> Option<&CaptureDevice> {
        match self {
            Self::VirtualActive(device) | Self::PhysicalActive(device) => Some(device),
            Self::NoDevice => None,
        }
    }

    /// The selected device's identifier, if any.
    pub fn device_id(&self) -> Option<&DeviceId> {
        self.device().map(|d| &d.id)
    }
}

/// Pick the single device to activate.
///
/// In virtual mode, only the well-known virtual device qualifies; when it is
/// absent the result is `NoDevice` with no fallback to a physical camera.
/// In physical mode, the first front-facing camera in the registry's
/// enumeration order wins; the selector does not re-sort or score devices.
pub fn select_source(config: SelectorConfig, registry: &dyn DeviceRegistry) -> Result<Selection> {
    if config.use_virtual_camera {
        return Ok(match registry.find_virtual_device()? {
            Some(device) => Selection::VirtualActive(device),
            None => Selection::NoDevice,
        });
    }

    Ok(match registry.find_default_physical_device()? {
        Some(device) => Selection::PhysicalActive(device),
        None => Selection::NoDevice,
    })
}
