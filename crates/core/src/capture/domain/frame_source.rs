use thiserror::Error;

use crate::shared::frame::Frame;

#[derive(Debug, Error)]
pub enum CaptureError {
    /// The device could not be opened. Fatal to `Pipeline::start`.
    #[error("capture device unavailable: {0}")]
    DeviceUnavailable(String),
    /// No frame was ready this tick. The worker skips the cycle.
    #[error("no frame ready")]
    Transient,
    /// The device produced an unreadable frame. Recovered like a
    /// transient failure but worth logging.
    #[error("frame read failed: {0}")]
    Fatal(String),
}

/// Produces raw frames from a camera-like device.
///
/// The handle lives inside the implementation: `open` acquires it,
/// `close` releases it unconditionally. Only the pipeline worker thread
/// ever touches an open source.
pub trait FrameSource: Send {
    /// Acquires the device. Called once by `Pipeline::start` before the
    /// worker begins; a failed open must leave the source closed.
    fn open(&mut self) -> Result<(), CaptureError>;

    /// Reads the next frame. `Transient` means try again next tick.
    fn read_frame(&mut self) -> Result<Frame, CaptureError>;

    /// Releases the device. Must be safe to call when already closed.
    fn close(&mut self);
}
