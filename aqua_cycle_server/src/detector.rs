// ONNX-backed hand-landmark detector.
//
// Expects a single-hand landmark model: input `1x3xNxN` float RGB in
// `[0, 1]`, outputs a `[1, 63]` tensor of 21 `(x, y, z)` landmark coordinates
// in model-input pixels and, when present, a `[1, 1]` hand-presence score.
// The presence score is gated on the engine's minimum confidence of 0.6, so
// frames below the gate report no hand. Any inference failure also reports no hand;
// the frame loop's recovery policy is always "skip and try the next frame."

use std::path::Path;

use anyhow::Context;
use aqua_cycle::pipeline::{HandLandmarkSource, HandLandmarks, LANDMARK_COUNT, Landmark, MIN_CONFIDENCE};
use image::RgbImage;
use image::imageops::FilterType;
use ndarray::Array4;
use ort::session::Session;
use ort::value::Value;
use tracing::debug;

const MODEL_INPUT_SIZE: u32 = 224;

pub struct OrtHandDetector {
    session: Session,
    has_score_output: bool,
}

impl OrtHandDetector {
    pub fn load(model_path: &Path) -> anyhow::Result<Self> {
        let session = Session::builder()
            .context("creating inference session builder")?
            .commit_from_file(model_path)
            .with_context(|| format!("loading hand landmark model {}", model_path.display()))?;
        let has_score_output = session.outputs.len() > 1;
        debug!(model = %model_path.display(), "hand landmark model loaded");
        Ok(Self { session, has_score_output })
    }
}

impl HandLandmarkSource for OrtHandDetector {
    fn detect(&mut self, frame: &RgbImage) -> Option<HandLandmarks> {
        let n = MODEL_INPUT_SIZE;
        let resized = image::imageops::resize(frame, n, n, FilterType::Triangle);

        let mut input = Array4::<f32>::zeros((1, 3, n as usize, n as usize));
        for y in 0..n {
            for x in 0..n {
                let p = resized.get_pixel(x, y);
                for c in 0..3 {
                    input[[0, c, y as usize, x as usize]] = p[c] as f32 / 255.0;
                }
            }
        }

        let Ok(input_val) = Value::from_array(input) else {
            return None;
        };
        let input_name = self
            .session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "image".into());
        let Ok(outputs) = self.session.run(ort::inputs![input_name => input_val]) else {
            return None;
        };

        if self.has_score_output {
            let score = outputs[1]
                .try_extract_array::<f32>()
                .ok()
                .and_then(|arr| arr.iter().next().copied())
                .unwrap_or(0.0);
            if score < MIN_CONFIDENCE {
                return None;
            }
        }

        let Ok(coords) = outputs[0].try_extract_array::<f32>() else {
            return None;
        };
        let flat: Vec<f32> = coords.iter().copied().collect();
        if flat.len() < LANDMARK_COUNT * 3 {
            return None;
        }

        // Model-input pixel coordinates, normalized back to [0, 1].
        let scale = n as f32;
        let mut points = [Landmark::default(); LANDMARK_COUNT];
        for (i, point) in points.iter_mut().enumerate() {
            let base = i * 3;
            point.x = flat[base] / scale;
            point.y = flat[base + 1] / scale;
            point.z = flat[base + 2] / scale;
        }
        Some(HandLandmarks { points })
    }
}
