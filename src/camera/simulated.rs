use crate::camera::error::Result;
use crate::camera::registry::DeviceRegistry;
use crate::camera::types::{CaptureDevice, DeviceId, DeviceKind};

const SIMULATED_FRONT_ID: &str = "simulated:front:camera-001";
const SIMULATED_FRONT_NAME: &str = "Simulated Front Camera";

/// A fake device registry for running without real capture hardware.
///
/// Reports the virtual background device and one front-facing camera, so
/// both selection modes resolve to a device.
///
/// Enable via `SIMULATED_CAMERAS=1` environment variable.
pub struct SimulatedRegistry {
    devices: Vec<CaptureDevice>,
}

impl SimulatedRegistry {
    /// Create a registry with the default simulated device set.
    pub fn new() -> Self {
        Self {
            devices: vec![
                CaptureDevice {
                    id: DeviceId::virtual_device(),
                    name: "Backdrop Virtual Camera".to_string(),
                    kind: DeviceKind::Virtual,
                },
                CaptureDevice {
                    id: Self::front_device_id(),
                    name: SIMULATED_FRONT_NAME.to_string(),
                    kind: DeviceKind::PhysicalFront,
                },
            ],
        }
    }

    /// Whether the simulated registry is enabled via environment variable.
    pub fn is_enabled() -> bool {
        std::env::var("SIMULATED_CAMERAS").is_ok_and(|v| v == "1" || v == "true")
    }

    /// The stable device ID of the simulated front camera.
    pub fn front_device_id() -> DeviceId {
        DeviceId::new(SIMULATED_FRONT_ID)
    }
}

impl Default for SimulatedRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceRegistry for SimulatedRegistry {
    fn enumerate_devices(&self) -> Result<Vec<CaptureDevice>> {
        Ok(self.devices.clone())
    }
}
