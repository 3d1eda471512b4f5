// THEORY:
// The `SpriteStore` owns every static raster asset the interaction layer
// composites over the camera feed. Assets are loaded once at process startup
// and pre-scaled to their on-screen working sizes, so the per-frame path never
// touches the filesystem and only the ocean backdrop is ever resized again.
//
// The ocean is special: its on-screen size depends on the camera frame, which
// can vary by device. Its scaled form is therefore derived per frame from the
// pristine source raster, cached by frame dimensions so a steady camera pays
// the resize exactly once.

use std::path::Path;
use std::sync::Arc;

use image::imageops::{self, FilterType};
use image::{ImageError, RgbaImage};

/// On-screen working width of the cloud sprite, applied at load.
pub const CLOUD_TARGET_WIDTH: u32 = 240;
/// On-screen working width of the sun sprite, applied at load.
pub const SUN_TARGET_WIDTH: u32 = 260;
/// On-screen working width of a single raindrop, applied at load.
pub const RAINDROP_TARGET_WIDTH: u32 = 40;
/// Fraction of the frame height the ocean strip occupies.
pub const OCEAN_HEIGHT_RATIO: f32 = 0.28;

/// Immutable sprite assets, shared read-only with the scene objects.
#[derive(Clone)]
pub struct SpriteStore {
    pub cloud: Arc<RgbaImage>,
    pub sun: Arc<RgbaImage>,
    pub raindrop: Arc<RgbaImage>,
    ocean_source: Arc<RgbaImage>,
    ocean_scaled: Option<((u32, u32), Arc<RgbaImage>)>,
}

impl SpriteStore {
    /// Loads the four sprite assets from `dir` and pre-scales the cloud, sun
    /// and raindrop to their working widths. Any missing or undecodable file
    /// is an error; the caller is expected to treat it as fatal.
    pub fn load(dir: &Path) -> Result<Self, ImageError> {
        let cloud = load_rgba(&dir.join("cloud.png"))?;
        let sun = load_rgba(&dir.join("sun.png"))?;
        let ocean = load_rgba(&dir.join("ocean.png"))?;
        let raindrop = load_rgba(&dir.join("raindrop.png"))?;

        Ok(Self::from_images(
            scale_to_width(&cloud, CLOUD_TARGET_WIDTH),
            scale_to_width(&sun, SUN_TARGET_WIDTH),
            ocean,
            scale_to_width(&raindrop, RAINDROP_TARGET_WIDTH),
        ))
    }

    /// Builds a store from already-prepared rasters. No rescaling is applied;
    /// the images are used exactly as given.
    pub fn from_images(cloud: RgbaImage, sun: RgbaImage, ocean: RgbaImage, raindrop: RgbaImage) -> Self {
        Self {
            cloud: Arc::new(cloud),
            sun: Arc::new(sun),
            raindrop: Arc::new(raindrop),
            ocean_source: Arc::new(ocean),
            ocean_scaled: None,
        }
    }

    /// Returns the ocean sprite scaled to span the full frame width at
    /// [`OCEAN_HEIGHT_RATIO`] of the frame height. Cached by frame size.
    pub fn ocean_for_frame(&mut self, frame_width: u32, frame_height: u32) -> Arc<RgbaImage> {
        let target = (frame_width, (frame_height as f32 * OCEAN_HEIGHT_RATIO) as u32);
        if let Some((cached, sprite)) = &self.ocean_scaled {
            if *cached == target {
                return Arc::clone(sprite);
            }
        }
        let scaled = Arc::new(imageops::resize(
            self.ocean_source.as_ref(),
            target.0.max(1),
            target.1.max(1),
            FilterType::Triangle,
        ));
        self.ocean_scaled = Some((target, Arc::clone(&scaled)));
        scaled
    }
}

fn load_rgba(path: &Path) -> Result<RgbaImage, ImageError> {
    Ok(image::open(path)?.to_rgba8())
}

/// Aspect-preserving resize to a target width, where the scale factor is
/// derived from the larger of the two source dimensions.
pub fn scale_to_width(img: &RgbaImage, target: u32) -> RgbaImage {
    let largest = img.width().max(img.height());
    let scale = target as f32 / largest as f32;
    let new_w = ((img.width() as f32 * scale) as u32).max(1);
    let new_h = ((img.height() as f32 * scale) as u32).max(1);
    imageops::resize(img, new_w, new_h, FilterType::Triangle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([0, 0, 255, 255]))
    }

    #[test]
    fn scale_to_width_uses_the_larger_dimension() {
        let scaled = scale_to_width(&solid(100, 50), 40);
        assert_eq!((scaled.width(), scaled.height()), (40, 20));

        let tall = scale_to_width(&solid(50, 100), 40);
        assert_eq!((tall.width(), tall.height()), (20, 40));
    }

    #[test]
    fn ocean_is_scaled_to_frame_and_cached() {
        let mut store = SpriteStore::from_images(solid(4, 4), solid(4, 4), solid(100, 50), solid(4, 4));

        let first = store.ocean_for_frame(1280, 720);
        assert_eq!(first.width(), 1280);
        assert_eq!(first.height(), (720.0 * OCEAN_HEIGHT_RATIO) as u32);

        let second = store.ocean_for_frame(1280, 720);
        assert!(Arc::ptr_eq(&first, &second));

        let other = store.ocean_for_frame(640, 480);
        assert_eq!(other.width(), 640);
        assert!(!Arc::ptr_eq(&first, &other));
    }

    #[test]
    fn missing_asset_is_an_error() {
        let missing = Path::new("/nonexistent/sprite/dir");
        assert!(SpriteStore::load(missing).is_err());
    }
}
