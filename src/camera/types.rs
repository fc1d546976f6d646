use serde::Serialize;
use std::fmt;

/// Well-known identifier of the virtual background camera device.
///
/// The virtual device registers itself under this key; the selector looks it
/// up by exactly this identifier and nothing else.
pub const VIRTUAL_DEVICE_ID: &str = "virtual:backdrop:camera-001";

/// Stable capture device identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DeviceId(String);

impl DeviceId {
    /// Create a new `DeviceId` from a raw string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The well-known virtual background device identifier.
    pub fn virtual_device() -> Self {
        Self(VIRTUAL_DEVICE_ID.to_string())
    }

    /// Return the inner string representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Category of a capture device, as reported by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    /// Software-emulated device registered under [`VIRTUAL_DEVICE_ID`].
    Virtual,
    /// Front-facing physical camera, the default for direct preview.
    PhysicalFront,
    /// Any other physical camera (rear, external, capture card).
    PhysicalOther,
}

/// Read-only snapshot of a capture device's identity.
///
/// Produced by a [`DeviceRegistry`](crate::camera::registry::DeviceRegistry);
/// consumers never mutate descriptors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureDevice {
    pub id: DeviceId,
    pub name: String,
    pub kind: DeviceKind,
}
