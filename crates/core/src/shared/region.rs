/// An axis-aligned candidate face rectangle in frame coordinates.
///
/// Locators may emit regions that stray outside the frame; the pipeline
/// validates with [`Region::is_usable`] before any crop, so downstream
/// stages only ever see in-bounds, non-degenerate rectangles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> i64 {
        self.width.max(0) as i64 * self.height.max(0) as i64
    }

    /// True when the region lies fully inside a `frame_w` x `frame_h` frame.
    pub fn fits_within(&self, frame_w: u32, frame_h: u32) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.width >= 0
            && self.height >= 0
            && (self.x as i64 + self.width as i64) <= frame_w as i64
            && (self.y as i64 + self.height as i64) <= frame_h as i64
    }

    /// In-bounds and strictly positive area. Anything else counts as
    /// "no face" to the pipeline.
    pub fn is_usable(&self, frame_w: u32, frame_h: u32) -> bool {
        self.width > 0 && self.height > 0 && self.fits_within(frame_w, frame_h)
    }

    /// Selects the usable region with the largest area; ties resolve to
    /// the first in iteration order.
    pub fn select_largest<'a>(
        regions: &'a [Region],
        frame_w: u32,
        frame_h: u32,
    ) -> Option<&'a Region> {
        let mut best: Option<&Region> = None;
        for r in regions {
            if !r.is_usable(frame_w, frame_h) {
                continue;
            }
            match best {
                Some(b) if r.area() <= b.area() => {}
                _ => best = Some(r),
            }
        }
        best
    }

    pub fn iou(&self, other: &Region) -> f64 {
        let ix1 = self.x.max(other.x);
        let iy1 = self.y.max(other.y);
        let ix2 = (self.x + self.width).min(other.x + other.width);
        let iy2 = (self.y + self.height).min(other.y + other.height);

        let inter = (ix2 - ix1).max(0) as f64 * (iy2 - iy1).max(0) as f64;
        if inter == 0.0 {
            return 0.0;
        }

        let area_a = self.width as f64 * self.height as f64;
        let area_b = other.width as f64 * other.height as f64;
        inter / (area_a + area_b - inter)
    }
}
