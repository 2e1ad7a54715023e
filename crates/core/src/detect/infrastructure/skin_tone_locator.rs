use crate::detect::domain::face_locator::FaceLocator;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Heuristic locator: finds face-sized clusters of skin-toned pixels.
///
/// The frame is scanned on a coarse block grid; blocks whose skin-pixel
/// coverage clears the threshold are grouped into 4-connected components
/// and each component's bounding box becomes one candidate region. No
/// model file required, which makes this the default locator.
pub struct SkinToneLocator {
    block_px: u32,
    coverage_min: f32,
}

impl SkinToneLocator {
    pub fn new(block_px: u32, coverage_min: f32) -> Self {
        Self {
            block_px: block_px.max(1),
            coverage_min: coverage_min.clamp(0.0, 1.0),
        }
    }

    /// Classic RGB skin rule: dominant red with enough spread between
    /// channels. Intentionally loose; the classifier judges the crop.
    fn is_skin(r: u8, g: u8, b: u8) -> bool {
        let (r, g, b) = (r as i32, g as i32, b as i32);
        r > 95 && g > 40 && b > 20 && r > g && r > b && (r - g.min(b)) > 15 && (r - g).abs() > 15
    }

    fn block_coverage(&self, frame: &Frame, bx: u32, by: u32) -> f32 {
        let x0 = bx * self.block_px;
        let y0 = by * self.block_px;
        let x1 = (x0 + self.block_px).min(frame.width());
        let y1 = (y0 + self.block_px).min(frame.height());

        let data = frame.data();
        let stride = frame.width() as usize * 3;
        let mut skin = 0u32;
        let mut total = 0u32;

        for y in y0..y1 {
            let row = y as usize * stride;
            for x in x0..x1 {
                let p = row + x as usize * 3;
                if Self::is_skin(data[p], data[p + 1], data[p + 2]) {
                    skin += 1;
                }
                total += 1;
            }
        }

        if total == 0 {
            0.0
        } else {
            skin as f32 / total as f32
        }
    }
}

impl FaceLocator for SkinToneLocator {
    fn locate(&mut self, frame: &Frame) -> Vec<Region> {
        let grid_w = frame.width().div_ceil(self.block_px) as usize;
        let grid_h = frame.height().div_ceil(self.block_px) as usize;
        if grid_w == 0 || grid_h == 0 {
            return Vec::new();
        }

        let mut marked = vec![false; grid_w * grid_h];
        for by in 0..grid_h {
            for bx in 0..grid_w {
                if self.block_coverage(frame, bx as u32, by as u32) >= self.coverage_min {
                    marked[by * grid_w + bx] = true;
                }
            }
        }

        // Group marked blocks into 4-connected components; each becomes
        // one candidate bounding box.
        let mut visited = vec![false; grid_w * grid_h];
        let mut regions = Vec::new();

        for start in 0..marked.len() {
            if !marked[start] || visited[start] {
                continue;
            }

            let (mut min_x, mut min_y) = (usize::MAX, usize::MAX);
            let (mut max_x, mut max_y) = (0usize, 0usize);
            let mut stack = vec![start];
            visited[start] = true;

            while let Some(cell) = stack.pop() {
                let (cx, cy) = (cell % grid_w, cell / grid_w);
                min_x = min_x.min(cx);
                min_y = min_y.min(cy);
                max_x = max_x.max(cx);
                max_y = max_y.max(cy);

                let neighbors = [
                    (cx > 0).then(|| cell - 1),
                    (cx + 1 < grid_w).then(|| cell + 1),
                    (cy > 0).then(|| cell - grid_w),
                    (cy + 1 < grid_h).then(|| cell + grid_w),
                ];
                for n in neighbors.into_iter().flatten() {
                    if marked[n] && !visited[n] {
                        visited[n] = true;
                        stack.push(n);
                    }
                }
            }

            let block = self.block_px as i64;
            let x = min_x as i64 * block;
            let y = min_y as i64 * block;
            let w = ((max_x as i64 + 1) * block).min(frame.width() as i64) - x;
            let h = ((max_y as i64 + 1) * block).min(frame.height() as i64) - y;
            regions.push(Region::new(x as i32, y as i32, w as i32, h as i32));
        }

        regions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SKIN: [u8; 3] = [200, 120, 90];

    fn frame_with_rect(w: u32, h: u32, x0: u32, y0: u32, rw: u32, rh: u32) -> Frame {
        let mut data = vec![0u8; (w * h * 3) as usize];
        for y in y0..y0 + rh {
            for x in x0..x0 + rw {
                let p = ((y * w + x) * 3) as usize;
                data[p..p + 3].copy_from_slice(&SKIN);
            }
        }
        Frame::new(data, w, h, 0)
    }

    #[test]
    fn test_skin_rule() {
        assert!(SkinToneLocator::is_skin(200, 120, 90));
        assert!(!SkinToneLocator::is_skin(50, 50, 50)); // dark gray
        assert!(!SkinToneLocator::is_skin(90, 200, 90)); // green-dominant
        assert!(!SkinToneLocator::is_skin(200, 195, 190)); // washed out
    }

    #[test]
    fn test_empty_frame_finds_nothing() {
        let mut locator = SkinToneLocator::new(8, 0.4);
        let frame = Frame::new(vec![0u8; 64 * 64 * 3], 64, 64, 0);
        assert!(locator.locate(&frame).is_empty());
    }

    #[test]
    fn test_single_skin_rect_found() {
        let mut locator = SkinToneLocator::new(8, 0.4);
        // Rect aligned to the block grid for an exact bounding box.
        let frame = frame_with_rect(64, 64, 16, 16, 24, 24);
        let regions = locator.locate(&frame);

        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0], Region::new(16, 16, 24, 24));
    }

    #[test]
    fn test_two_separate_rects_found() {
        let mut locator = SkinToneLocator::new(8, 0.4);
        let mut frame = frame_with_rect(96, 64, 0, 0, 16, 16);
        // Second blob far from the first.
        let second = frame_with_rect(96, 64, 64, 40, 16, 16);
        for (dst, src) in frame.data_mut().iter_mut().zip(second.data()) {
            *dst = (*dst).max(*src);
        }

        let regions = locator.locate(&frame);
        assert_eq!(regions.len(), 2);
    }

    #[test]
    fn test_low_coverage_block_ignored() {
        let mut locator = SkinToneLocator::new(8, 0.9);
        // Rect covers only a quarter of each block it touches.
        let frame = frame_with_rect(64, 64, 0, 0, 4, 4);
        assert!(locator.locate(&frame).is_empty());
    }

    #[test]
    fn test_regions_are_within_frame() {
        let mut locator = SkinToneLocator::new(16, 0.2);
        // Rect touching the bottom-right corner; grid blocks are partial.
        let frame = frame_with_rect(50, 50, 34, 34, 16, 16);
        let regions = locator.locate(&frame);
        assert_eq!(regions.len(), 1);
        assert!(regions[0].is_usable(50, 50));
    }
}
