use crate::render::domain::annotation_renderer::AnnotationRenderer;
use crate::shared::classification::{Classification, Emotion};
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Outline thickness in pixels.
const BORDER_PX: i32 = 2;

/// Draws the selected face region as a colored rectangle outline.
///
/// Copy-on-annotate: returns a new frame, leaving the input untouched.
pub struct BoxAnnotationRenderer;

/// RGB outline color keyed to the published label.
fn emotion_color(label: Emotion) -> [u8; 3] {
    match label {
        Emotion::Happy => [46, 204, 113],
        Emotion::Sad => [52, 152, 219],
        Emotion::Angry => [231, 76, 60],
        Emotion::Fear | Emotion::Surprise => [241, 196, 15],
        Emotion::Disgust => [155, 89, 182],
        Emotion::Neutral => [189, 195, 199],
        Emotion::NoFace | Emotion::DetectionFailed => [127, 140, 141],
    }
}

impl AnnotationRenderer for BoxAnnotationRenderer {
    fn annotate(
        &self,
        frame: &Frame,
        region: Option<&Region>,
        classification: &Classification,
    ) -> Frame {
        let mut out = frame.clone();
        let Some(region) = region else {
            return out;
        };

        let color = emotion_color(classification.label);
        let fw = out.width() as i32;
        let fh = out.height() as i32;
        let stride = out.width() as usize * 3;
        let data = out.data_mut();

        let x0 = region.x;
        let y0 = region.y;
        let x1 = region.x + region.width;
        let y1 = region.y + region.height;

        let mut put = |x: i32, y: i32| {
            if x >= 0 && x < fw && y >= 0 && y < fh {
                let p = y as usize * stride + x as usize * 3;
                data[p..p + 3].copy_from_slice(&color);
            }
        };

        for t in 0..BORDER_PX {
            for x in x0..x1 {
                put(x, y0 + t);
                put(x, y1 - 1 - t);
            }
            for y in y0..y1 {
                put(x0 + t, y);
                put(x1 - 1 - t, y);
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray_frame(w: u32, h: u32) -> Frame {
        Frame::new(vec![50u8; (w * h * 3) as usize], w, h, 0)
    }

    fn happy() -> Classification {
        Classification::new(Emotion::Happy, 0.8)
    }

    #[test]
    fn test_input_frame_is_never_mutated() {
        let frame = gray_frame(32, 32);
        let before = frame.clone();

        let renderer = BoxAnnotationRenderer;
        let _ = renderer.annotate(&frame, Some(&Region::new(4, 4, 16, 16)), &happy());

        assert_eq!(frame, before);
    }

    #[test]
    fn test_no_region_returns_unchanged_copy() {
        let frame = gray_frame(16, 16);
        let renderer = BoxAnnotationRenderer;
        let out = renderer.annotate(&frame, None, &Classification::no_face());
        assert_eq!(out.data(), frame.data());
    }

    #[test]
    fn test_outline_drawn_interior_untouched() {
        let frame = gray_frame(32, 32);
        let renderer = BoxAnnotationRenderer;
        let out = renderer.annotate(&frame, Some(&Region::new(8, 8, 16, 16)), &happy());

        let px = |x: usize, y: usize| {
            let p = (y * 32 + x) * 3;
            [out.data()[p], out.data()[p + 1], out.data()[p + 2]]
        };

        assert_eq!(px(8, 8), emotion_color(Emotion::Happy)); // corner
        assert_eq!(px(16, 8), emotion_color(Emotion::Happy)); // top edge
        assert_eq!(px(16, 16), [50, 50, 50]); // interior untouched
        assert_eq!(px(0, 0), [50, 50, 50]); // outside untouched
    }

    #[test]
    fn test_color_tracks_label() {
        let frame = gray_frame(32, 32);
        let renderer = BoxAnnotationRenderer;
        let region = Region::new(8, 8, 16, 16);

        let sad = renderer.annotate(
            &frame,
            Some(&region),
            &Classification::new(Emotion::Sad, 0.7),
        );
        let p = (8 * 32 + 8) * 3;
        assert_eq!(
            &sad.data()[p..p + 3],
            &emotion_color(Emotion::Sad)[..]
        );
    }

    #[test]
    fn test_region_on_frame_edge_does_not_panic() {
        let frame = gray_frame(16, 16);
        let renderer = BoxAnnotationRenderer;
        let out = renderer.annotate(&frame, Some(&Region::new(0, 0, 16, 16)), &happy());
        assert_eq!(out.width(), 16);
    }
}
