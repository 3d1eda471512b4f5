// Capture-device wrapper. Opens the preferred index with a fallback to index
// 1, configures the working resolution and a single-frame driver buffer to
// minimize staleness, and hands out frames as mirrored RGB images ready for
// the pipeline. The device is released when the value is dropped.

use anyhow::{Context, bail};
use image::RgbImage;
use opencv::core::Mat;
use opencv::prelude::*;
use opencv::{imgproc, videoio};
use tracing::{debug, info};

pub const CAPTURE_WIDTH: f64 = 1280.0;
pub const CAPTURE_HEIGHT: f64 = 720.0;
const FALLBACK_INDEX: i32 = 1;

pub struct Camera {
    cap: videoio::VideoCapture,
}

impl Camera {
    /// Opens a capture device, trying `preferred_index` first and falling
    /// back to index 1, then configures resolution and buffer depth.
    pub fn open(preferred_index: i32) -> anyhow::Result<Self> {
        let mut cap = videoio::VideoCapture::new(preferred_index, videoio::CAP_ANY)
            .context("creating capture handle")?;
        if !cap.is_opened().context("probing capture device")? {
            debug!(index = preferred_index, "capture device unavailable, trying fallback");
            cap = videoio::VideoCapture::new(FALLBACK_INDEX, videoio::CAP_ANY)
                .context("creating fallback capture handle")?;
        }
        if !cap.is_opened().context("probing fallback capture device")? {
            bail!("no capture device at index {preferred_index} or {FALLBACK_INDEX}");
        }

        cap.set(videoio::CAP_PROP_FRAME_WIDTH, CAPTURE_WIDTH)?;
        cap.set(videoio::CAP_PROP_FRAME_HEIGHT, CAPTURE_HEIGHT)?;
        cap.set(videoio::CAP_PROP_BUFFERSIZE, 1.0)?;

        info!("capture device opened");
        Ok(Self { cap })
    }

    /// Reads the next frame as a horizontally-mirrored RGB image. A device
    /// hiccup (failed or empty read) yields `Ok(None)` so the caller can skip
    /// the frame and try again.
    pub fn read_frame(&mut self) -> anyhow::Result<Option<RgbImage>> {
        let mut frame = Mat::default();
        match self.cap.read(&mut frame) {
            Ok(true) if !frame.empty() => {}
            _ => return Ok(None),
        }

        // Mirror so on-screen motion matches the user's own.
        let mut mirrored = Mat::default();
        opencv::core::flip(&frame, &mut mirrored, 1)?;

        let mut rgb = Mat::default();
        imgproc::cvt_color(&mirrored, &mut rgb, imgproc::COLOR_BGR2RGB, 0)?;

        let (width, height) = (rgb.cols() as u32, rgb.rows() as u32);
        let data = rgb.data_bytes()?.to_vec();
        Ok(RgbImage::from_raw(width, height, data))
    }
}
