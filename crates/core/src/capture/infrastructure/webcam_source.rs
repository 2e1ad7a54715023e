use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;

use crate::capture::domain::frame_source::{CaptureError, FrameSource};
use crate::shared::frame::Frame;

/// Live webcam feed via `nokhwa`.
///
/// The device handle exists only between `open` and `close`; a failed
/// open leaves the source without a handle so `start` can be retried.
pub struct WebcamSource {
    device_index: u32,
    camera: Option<Camera>,
    next_index: u64,
}

impl WebcamSource {
    pub fn new(device_index: u32) -> Self {
        Self {
            device_index,
            camera: None,
            next_index: 0,
        }
    }
}

impl FrameSource for WebcamSource {
    fn open(&mut self) -> Result<(), CaptureError> {
        let format = RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
        let mut camera = Camera::new(CameraIndex::Index(self.device_index), format)
            .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))?;
        camera
            .open_stream()
            .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))?;
        self.camera = Some(camera);
        Ok(())
    }

    fn read_frame(&mut self) -> Result<Frame, CaptureError> {
        let camera = self
            .camera
            .as_mut()
            .ok_or_else(|| CaptureError::Fatal("source not open".into()))?;

        // A missed capture is normal under load; the worker just skips
        // the tick.
        let buffer = camera.frame().map_err(|_| CaptureError::Transient)?;
        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CaptureError::Fatal(e.to_string()))?;

        let (width, height) = decoded.dimensions();
        let frame = Frame::new(decoded.into_raw(), width, height, self.next_index);
        self.next_index += 1;
        Ok(frame)
    }

    fn close(&mut self) {
        if let Some(mut camera) = self.camera.take() {
            if let Err(e) = camera.stop_stream() {
                log::warn!("failed to stop camera stream: {e}");
            }
        }
    }
}
