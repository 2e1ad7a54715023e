use ndarray::ArrayView3;

use crate::shared::region::Region;

/// A single captured frame: contiguous RGB bytes in row-major order.
///
/// Pixel format conversion happens at the capture boundary only; every
/// later stage treats the data as opaque RGB8. A frame is owned by
/// exactly one stage at a time and moves forward through the pipeline.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    index: u64,
}

pub const CHANNELS: usize = 3;

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, index: u64) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * CHANNELS,
            "data length must equal width * height * 3"
        );
        Self {
            data,
            width,
            height,
            index,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Monotonic capture index assigned by the frame source.
    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Extracts the pixels under `region` as a new frame.
    ///
    /// The region must satisfy the in-bounds invariant; callers filter
    /// degenerate regions before cropping.
    pub fn crop(&self, region: &Region) -> Frame {
        debug_assert!(region.fits_within(self.width, self.height));

        let x = region.x as usize;
        let y = region.y as usize;
        let w = region.width as usize;
        let h = region.height as usize;
        let stride = self.width as usize * CHANNELS;

        let mut data = Vec::with_capacity(w * h * CHANNELS);
        for row in y..y + h {
            let start = row * stride + x * CHANNELS;
            data.extend_from_slice(&self.data[start..start + w * CHANNELS]);
        }
        Frame::new(data, w as u32, h as u32, self.index)
    }

    fn shape(&self) -> (usize, usize, usize) {
        (self.height as usize, self.width as usize, CHANNELS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 12]; // 2x2x3
        let frame = Frame::new(data.clone(), 2, 2, 5);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.index(), 5);
        assert_eq!(frame.data(), &data[..]);
    }

    #[test]
    fn test_clone_is_independent() {
        let frame = Frame::new(vec![100u8; 12], 2, 2, 0);
        let mut cloned = frame.clone();
        cloned.data_mut()[0] = 0;
        assert_eq!(frame.data()[0], 100);
        assert_eq!(cloned.data()[0], 0);
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * 3")]
    fn test_mismatched_data_length_panics_in_debug() {
        Frame::new(vec![0u8; 10], 2, 2, 0);
    }

    #[test]
    fn test_as_ndarray_shape_and_access() {
        // 2x2 RGB: set pixel (row=1, col=0) to red
        let mut data = vec![0u8; 12];
        data[6] = 255;
        let frame = Frame::new(data, 2, 2, 0);
        let arr = frame.as_ndarray();
        assert_eq!(arr.shape(), &[2, 2, 3]);
        assert_eq!(arr[[1, 0, 0]], 255);
        assert_eq!(arr[[1, 0, 1]], 0);
    }

    #[test]
    fn test_crop_extracts_subrect() {
        // 4x2 frame, pixel value = column index in R channel
        let mut data = vec![0u8; 4 * 2 * 3];
        for row in 0..2 {
            for col in 0..4 {
                data[(row * 4 + col) * 3] = col as u8;
            }
        }
        let frame = Frame::new(data, 4, 2, 7);
        let crop = frame.crop(&Region::new(1, 0, 2, 2));

        assert_eq!(crop.width(), 2);
        assert_eq!(crop.height(), 2);
        assert_eq!(crop.index(), 7);
        assert_eq!(crop.data()[0], 1); // col 1
        assert_eq!(crop.data()[3], 2); // col 2
    }

    #[test]
    fn test_crop_full_frame_is_identity() {
        let frame = Frame::new(vec![42u8; 2 * 3 * 3], 3, 2, 0);
        let crop = frame.crop(&Region::new(0, 0, 3, 2));
        assert_eq!(crop.data(), frame.data());
    }
}
