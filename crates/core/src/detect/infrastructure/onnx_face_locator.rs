use std::path::Path;

use crate::detect::domain::face_locator::FaceLocator;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Detector input resolution.
const INPUT_W: u32 = 320;
const INPUT_H: u32 = 240;

/// Greedy NMS IoU threshold.
const NMS_IOU_THRESH: f64 = 0.3;

/// Face locator backed by an ONNX Runtime session.
///
/// Expects a single-output detection model emitting `[N, 5]` rows of
/// `(x1, y1, x2, y2, score)` in coordinates normalized to `[0, 1]`.
/// Inference errors are logged and degrade to "no face"; a bad frame
/// must never take down the pipeline loop.
pub struct OnnxFaceLocator {
    session: ort::session::Session,
    confidence: f32,
}

impl OnnxFaceLocator {
    pub fn new(model_path: &Path, confidence: f32) -> Result<Self, Box<dyn std::error::Error>> {
        let session = ort::session::Session::builder()?.commit_from_file(model_path)?;
        Ok(Self {
            session,
            confidence,
        })
    }

    fn run(&mut self, frame: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
        let input_tensor = preprocess(frame, INPUT_W, INPUT_H);
        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;

        let detections = outputs[0].try_extract_array::<f32>()?;
        let data = detections
            .as_slice()
            .ok_or("cannot get detection slice")?;

        let fw = frame.width() as f32;
        let fh = frame.height() as f32;

        let mut candidates: Vec<(f32, Region)> = Vec::new();
        for row in data.chunks_exact(5) {
            let score = row[4];
            if score < self.confidence {
                continue;
            }
            let x1 = (row[0] * fw).clamp(0.0, fw);
            let y1 = (row[1] * fh).clamp(0.0, fh);
            let x2 = (row[2] * fw).clamp(0.0, fw);
            let y2 = (row[3] * fh).clamp(0.0, fh);
            if x2 <= x1 || y2 <= y1 {
                continue;
            }
            candidates.push((
                score,
                Region::new(x1 as i32, y1 as i32, (x2 - x1) as i32, (y2 - y1) as i32),
            ));
        }

        Ok(nms(candidates, NMS_IOU_THRESH))
    }
}

impl FaceLocator for OnnxFaceLocator {
    fn locate(&mut self, frame: &Frame) -> Vec<Region> {
        match self.run(frame) {
            Ok(regions) => regions,
            Err(e) => {
                log::warn!("face locator inference failed: {e}");
                Vec::new()
            }
        }
    }
}

/// Resize to model resolution (nearest neighbor), normalize to `[0, 1]`,
/// NCHW layout.
fn preprocess(frame: &Frame, width: u32, height: u32) -> ndarray::Array4<f32> {
    let src = frame.as_ndarray();
    let (fw, fh) = (frame.width() as usize, frame.height() as usize);

    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, height as usize, width as usize));
    for y in 0..height as usize {
        let sy = (y * fh / height as usize).min(fh - 1);
        for x in 0..width as usize {
            let sx = (x * fw / width as usize).min(fw - 1);
            for c in 0..3 {
                tensor[[0, c, y, x]] = src[[sy, sx, c]] as f32 / 255.0;
            }
        }
    }
    tensor
}

/// Greedy non-maximum suppression: highest score first, drop any
/// candidate overlapping a kept one above the threshold.
fn nms(mut candidates: Vec<(f32, Region)>, iou_thresh: f64) -> Vec<Region> {
    candidates.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    let mut kept: Vec<Region> = Vec::with_capacity(candidates.len());
    for (_, region) in candidates {
        if kept.iter().all(|k| k.iou(&region) <= iou_thresh) {
            kept.push(region);
        }
    }
    kept
}
