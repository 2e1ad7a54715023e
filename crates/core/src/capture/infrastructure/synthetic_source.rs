use crate::capture::domain::frame_source::{CaptureError, FrameSource};
use crate::shared::frame::Frame;

/// Deterministic generated feed for demos and tests.
///
/// Renders a flat background with an optional square "face" patch that
/// drifts horizontally across frames. Patch brightness and texture are
/// fixed per source, so the heuristic classifier produces a stable,
/// predictable label for any given configuration.
pub struct SyntheticSource {
    width: u32,
    height: u32,
    background: u8,
    patch: Option<Patch>,
    open: bool,
    next_index: u64,
}

/// Square patch rendered as a checkerboard of `base ± amplitude`.
#[derive(Clone, Copy)]
struct Patch {
    size: u32,
    base: u8,
    amplitude: u8,
}

impl SyntheticSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            background: 40,
            patch: None,
            open: false,
            next_index: 0,
        }
    }

    /// Adds a drifting face patch. `base` sets the mean luminance,
    /// `amplitude` the contrast (stddev equals amplitude exactly for a
    /// checkerboard).
    pub fn with_patch(mut self, size: u32, base: u8, amplitude: u8) -> Self {
        self.patch = Some(Patch {
            size: size.min(self.width).min(self.height),
            base,
            amplitude,
        });
        self
    }

    fn render(&self, index: u64) -> Frame {
        let w = self.width as usize;
        let h = self.height as usize;
        let mut data = vec![self.background; w * h * 3];

        if let Some(patch) = self.patch {
            let size = patch.size as usize;
            let max_x = w.saturating_sub(size);
            let px = if max_x == 0 {
                0
            } else {
                (index as usize * 2) % (max_x + 1)
            };
            let py = (h - size) / 2;

            for row in 0..size {
                for col in 0..size {
                    let value = if (row + col) % 2 == 0 {
                        patch.base.saturating_add(patch.amplitude)
                    } else {
                        patch.base.saturating_sub(patch.amplitude)
                    };
                    let offset = ((py + row) * w + px + col) * 3;
                    data[offset..offset + 3].fill(value);
                }
            }
        }

        Frame::new(data, self.width, self.height, index)
    }
}

impl FrameSource for SyntheticSource {
    fn open(&mut self) -> Result<(), CaptureError> {
        self.open = true;
        Ok(())
    }

    fn read_frame(&mut self) -> Result<Frame, CaptureError> {
        if !self.open {
            return Err(CaptureError::Fatal("source not open".into()));
        }
        let frame = self.render(self.next_index);
        self.next_index += 1;
        Ok(frame)
    }

    fn close(&mut self) {
        self.open = false;
    }
}
