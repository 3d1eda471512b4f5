// Shared server state. All mutable per-session state (the capture handle,
// the detector, the simulation pipeline) lives inside one `CameraSession`
// value behind a single async mutex, with a separate atomic running flag the
// stream loop polls between frames. One camera session and one stream
// consumer at a time is the supported topology; the mutex serializes anything
// beyond that.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Instant;

use aqua_cycle::core_modules::sprite_store::SpriteStore;
use aqua_cycle::pipeline::{HandLandmarkSource, PipelineConfig, ScenePipeline};
use image::RgbImage;
use image::codecs::jpeg::JpegEncoder;
use tokio::sync::Mutex;

use crate::camera::Camera;
use crate::detector::OrtHandDetector;

pub const JPEG_QUALITY: u8 = 85;

/// Server configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub asset_dir: PathBuf,
    pub model_path: PathBuf,
    pub camera_index: i32,
    pub rng_seed: Option<u64>,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("AQUA_BIND").unwrap_or_else(|_| "127.0.0.1:8000".to_string()),
            asset_dir: std::env::var("AQUA_ASSET_DIR")
                .unwrap_or_else(|_| "assets".to_string())
                .into(),
            model_path: std::env::var("AQUA_HAND_MODEL")
                .unwrap_or_else(|_| "models/hand_landmark.onnx".to_string())
                .into(),
            camera_index: std::env::var("AQUA_CAMERA_INDEX")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            rng_seed: std::env::var("AQUA_SEED").ok().and_then(|v| v.parse().ok()),
        }
    }
}

/// Everything a running camera session owns: capture handle, detector, and
/// the simulation pipeline. Dropped wholesale on `/camera/stop`, which also
/// releases the device.
pub struct CameraSession {
    camera: Camera,
    detector: OrtHandDetector,
    pipeline: ScenePipeline,
}

impl CameraSession {
    pub fn open(config: &ServerConfig, sprites: SpriteStore) -> anyhow::Result<Self> {
        let camera = Camera::open(config.camera_index)?;
        let detector = OrtHandDetector::load(&config.model_path)?;
        let pipeline = ScenePipeline::new(
            sprites,
            PipelineConfig {
                rng_seed: config.rng_seed,
                ..Default::default()
            },
        );
        Ok(Self { camera, detector, pipeline })
    }

    /// Runs one full frame pass: capture, detect, simulate, composite,
    /// encode. `None` means this frame is skipped (transient read or encode
    /// failure) and the caller should simply try the next one.
    pub fn produce_jpeg(&mut self, now: Instant) -> Option<Vec<u8>> {
        let mut frame = match self.camera.read_frame() {
            Ok(Some(frame)) => frame,
            _ => return None,
        };
        let hand = self.detector.detect(&frame);
        self.pipeline.process_frame(&mut frame, hand.as_ref(), now);
        encode_jpeg(&frame).ok()
    }
}

fn encode_jpeg(frame: &RgbImage) -> Result<Vec<u8>, image::ImageError> {
    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
    encoder.encode_image(frame)?;
    Ok(out)
}

/// Cloneable handle shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: ServerConfig,
    /// Pristine sprite assets, cloned into each new camera session.
    pub sprites: SpriteStore,
    pub camera_on: Arc<AtomicBool>,
    pub session: Arc<Mutex<Option<CameraSession>>>,
}

impl AppState {
    pub fn new(config: ServerConfig, sprites: SpriteStore) -> Self {
        Self {
            config,
            sprites,
            camera_on: Arc::new(AtomicBool::new(false)),
            session: Arc::new(Mutex::new(None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn jpeg_encoding_produces_a_jfif_payload() {
        let frame = RgbImage::from_pixel(64, 48, Rgb([120, 180, 240]));
        let jpeg = encode_jpeg(&frame).expect("encode");
        // SOI marker.
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
        assert!(jpeg.len() > 100);
    }
}
