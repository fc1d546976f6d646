use crate::camera::error::Result;
use crate::camera::selector::Selection;
use crate::camera::types::CaptureDevice;

/// Consumer of selection outcomes — owns the live video stream.
///
/// Implemented by the host's capture layer; the core only hands it the
/// device to stream from. A detached session shows the placeholder.
pub trait CaptureSession: Send {
    /// Begin streaming from the given device.
    ///
    /// Fails with `DeviceNotFound` when the device disappeared between
    /// selection and attach; callers re-select on the next registry change.
    fn attach(&mut self, device: &CaptureDevice) -> Result<()>;

    /// Stop streaming and show the placeholder.
    fn detach(&mut self);
}

/// Hand a selection outcome to a session.
///
/// `NoDevice` maps to `detach`, so every consumer renders the placeholder
/// the same way instead of improvising its own fallback.
pub fn apply_selection(session: &mut dyn CaptureSession, selection: &Selection) -> Result<()> {
    match selection.device() {
        Some(device) => session.attach(device),
        None => {
            session.detach();
            Ok(())
        }
    }
}
