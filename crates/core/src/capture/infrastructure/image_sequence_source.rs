use std::path::{Path, PathBuf};

use crate::capture::domain::frame_source::{CaptureError, FrameSource};
use crate::shared::frame::Frame;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

/// Plays a directory of still images as a looping live feed.
///
/// Useful for demos and soak tests on machines without a camera: each
/// `read_frame` decodes the next image in lexicographic order and wraps
/// around at the end, so the feed never runs dry.
pub struct ImageSequenceSource {
    dir: PathBuf,
    paths: Vec<PathBuf>,
    cursor: usize,
    next_index: u64,
    open: bool,
}

impl ImageSequenceSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            paths: Vec::new(),
            cursor: 0,
            next_index: 0,
            open: false,
        }
    }

    fn is_image(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
            .unwrap_or(false)
    }
}

impl FrameSource for ImageSequenceSource {
    fn open(&mut self) -> Result<(), CaptureError> {
        let entries = std::fs::read_dir(&self.dir)
            .map_err(|e| CaptureError::DeviceUnavailable(format!("{}: {e}", self.dir.display())))?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| Self::is_image(p))
            .collect();
        paths.sort();

        if paths.is_empty() {
            return Err(CaptureError::DeviceUnavailable(format!(
                "no images in {}",
                self.dir.display()
            )));
        }

        self.paths = paths;
        self.cursor = 0;
        self.open = true;
        Ok(())
    }

    fn read_frame(&mut self) -> Result<Frame, CaptureError> {
        if !self.open {
            return Err(CaptureError::Fatal("source not open".into()));
        }

        let path = &self.paths[self.cursor];
        self.cursor = (self.cursor + 1) % self.paths.len();

        // A single unreadable file should not starve the feed.
        let decoded = image::open(path)
            .map_err(|e| CaptureError::Fatal(format!("{}: {e}", path.display())))?;

        let rgb = decoded.to_rgb8();
        let (width, height) = rgb.dimensions();
        let frame = Frame::new(rgb.into_raw(), width, height, self.next_index);
        self.next_index += 1;
        Ok(frame)
    }

    fn close(&mut self) {
        self.paths.clear();
        self.open = false;
    }
}
