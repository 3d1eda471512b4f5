// THEORY:
// A `SceneObject` is a named, positioned sprite with behavioral flags. The
// three fixed instances (cloud, sun, ocean) are owned exclusively by the
// interaction state machine; the sprite rasters themselves are shared
// read-only handles into the `SpriteStore`. Width and height are never set
// directly: they always track the current sprite, so swapping the sprite (the
// per-frame ocean rescale) keeps the hit-testing geometry honest.

use std::sync::Arc;

use image::RgbaImage;

/// Role of a scene object in the water-cycle scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Cloud,
    Sun,
    Ocean,
}

/// A positioned sprite with interaction flags.
#[derive(Clone)]
pub struct SceneObject {
    pub kind: ObjectKind,
    pub sprite: Arc<RgbaImage>,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub active: bool,
    pub grabbed: bool,
}

impl SceneObject {
    pub fn new(kind: ObjectKind, sprite: Arc<RgbaImage>, x: i32, y: i32, active: bool) -> Self {
        let (width, height) = (sprite.width(), sprite.height());
        Self {
            kind,
            sprite,
            x,
            y,
            width,
            height,
            active,
            grabbed: false,
        }
    }

    /// Swaps the sprite and re-syncs the object's size to it.
    pub fn set_sprite(&mut self, sprite: Arc<RgbaImage>) {
        self.width = sprite.width();
        self.height = sprite.height();
        self.sprite = sprite;
    }

    pub fn center(&self) -> (i32, i32) {
        (
            self.x + self.width as i32 / 2,
            self.y + self.height as i32 / 2,
        )
    }

    /// True when `(px, py)` lies within `radius` of the object's center on
    /// each axis independently.
    pub fn is_near(&self, px: i32, py: i32, radius: i32) -> bool {
        let (cx, cy) = self.center();
        (px - cx).abs() < radius && (py - cy).abs() < radius
    }

    /// Moves the object so its center sits at `(px, py)`.
    pub fn center_on(&mut self, px: i32, py: i32) {
        self.x = px - self.width as i32 / 2;
        self.y = py - self.height as i32 / 2;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn object(w: u32, h: u32) -> SceneObject {
        let sprite = Arc::new(RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255])));
        SceneObject::new(ObjectKind::Cloud, sprite, 100, 50, true)
    }

    #[test]
    fn size_tracks_the_sprite() {
        let mut obj = object(40, 20);
        assert_eq!((obj.width, obj.height), (40, 20));

        obj.set_sprite(Arc::new(RgbaImage::new(80, 60)));
        assert_eq!((obj.width, obj.height), (80, 60));
    }

    #[test]
    fn is_near_uses_per_axis_distance() {
        let obj = object(40, 20); // center at (120, 60)
        assert!(obj.is_near(120, 60, 70));
        assert!(obj.is_near(120 + 69, 60 - 69, 70));
        // Inside the euclidean radius but outside on one axis.
        assert!(!obj.is_near(120 + 70, 60, 70));
        assert!(!obj.is_near(120, 60 + 70, 70));
    }

    #[test]
    fn center_on_anchors_the_visual_center() {
        let mut obj = object(40, 20);
        obj.center_on(200, 100);
        assert_eq!((obj.x, obj.y), (180, 90));
        assert_eq!(obj.center(), (200, 100));
    }
}
