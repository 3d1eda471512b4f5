// THEORY:
// The temperature bar is the one continuously-valued control in the scene: a
// vertical slider dragged by pinching. Two behaviors define it:
//
// 1.  **Drag-lock**: grabbing starts only while the pinch anchor is inside
//     the bar's (generous) hit rectangle, but once grabbed the bar follows
//     the hand until the pinch *ends*; leaving the rectangle mid-drag does
//     not release it. Without this, tracking jitter near the rect edge makes
//     the slider stutter.
// 2.  **Clamped linear mapping**: while grabbed, the temperature is a linear
//     map of the anchor's y over the bar's pixel range, clamped to
//     `[0, MAX_TEMP]` no matter where the hand goes.

use image::{Rgb, RgbImage};

use crate::core_modules::draw;
use crate::core_modules::hand_tracker::GestureSignal;

pub const MAX_TEMP: f32 = 100.0;
pub const INITIAL_TEMP: f32 = 25.0;

// Bar geometry, in frame pixels.
pub const BAR_X: i32 = 100;
pub const BAR_WIDTH: i32 = 40;
pub const BAR_TOP: i32 = 60;
pub const BAR_BOTTOM: i32 = 430;

// The hit rect is wider than the bar itself to make grabbing forgiving.
const HIT_LEFT: i32 = BAR_X - 30;
const HIT_RIGHT: i32 = BAR_X + 70;

const OUTLINE: Rgb<u8> = Rgb([50, 50, 50]);
const FILL: Rgb<u8> = Rgb([255, 0, 0]);

/// The draggable temperature slider.
#[derive(Debug, Clone)]
pub struct TemperatureBar {
    pub temp_celsius: f32,
    pub grabbed: bool,
}

impl TemperatureBar {
    pub fn new() -> Self {
        Self {
            temp_celsius: INITIAL_TEMP,
            grabbed: false,
        }
    }

    /// Advances the drag state one frame and, while grabbed, recomputes the
    /// temperature from the anchor's vertical position.
    pub fn update(&mut self, gesture: &GestureSignal) {
        if gesture.grab {
            if let Some((ax, ay)) = gesture.anchor {
                if (HIT_LEFT..HIT_RIGHT).contains(&ax) && (BAR_TOP..BAR_BOTTOM).contains(&ay) {
                    self.grabbed = true;
                }
            }
        } else {
            self.grabbed = false;
        }

        if self.grabbed {
            if let Some((_, ay)) = gesture.anchor {
                let span = (BAR_BOTTOM - BAR_TOP) as f32;
                let raw = (BAR_BOTTOM - ay) as f32 / span * MAX_TEMP;
                self.temp_celsius = raw.clamp(0.0, MAX_TEMP);
            }
        }
    }

    /// Draws the bar outline and the red fill proportional to the current
    /// temperature.
    pub fn render(&self, frame: &mut RgbImage) {
        draw::stroke_rect(frame, BAR_X, BAR_TOP, BAR_X + BAR_WIDTH, BAR_BOTTOM, 2, OUTLINE);
        let fill_top = BAR_BOTTOM - (self.temp_celsius / MAX_TEMP * (BAR_BOTTOM - BAR_TOP) as f32) as i32;
        draw::fill_rect(frame, BAR_X, fill_top, BAR_X + BAR_WIDTH, BAR_BOTTOM, FILL);
    }
}

impl Default for TemperatureBar {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grab_at(x: i32, y: i32) -> GestureSignal {
        GestureSignal { anchor: Some((x, y)), grab: true }
    }

    #[test]
    fn grab_inside_hit_rect_starts_a_drag() {
        let mut bar = TemperatureBar::new();
        bar.update(&grab_at(BAR_X + 10, 200));
        assert!(bar.grabbed);
    }

    #[test]
    fn grab_outside_hit_rect_is_ignored() {
        let mut bar = TemperatureBar::new();
        bar.update(&grab_at(BAR_X + 200, 200));
        assert!(!bar.grabbed);
        assert_eq!(bar.temp_celsius, INITIAL_TEMP);
    }

    #[test]
    fn drag_lock_survives_leaving_the_rect() {
        let mut bar = TemperatureBar::new();
        bar.update(&grab_at(BAR_X, 200));
        assert!(bar.grabbed);

        // Anchor wanders far outside the rect; the drag keeps tracking.
        bar.update(&grab_at(900, BAR_TOP));
        assert!(bar.grabbed);
        assert_eq!(bar.temp_celsius, MAX_TEMP);

        // Releasing the pinch ends it regardless of position.
        bar.update(&GestureSignal { anchor: Some((BAR_X, 200)), grab: false });
        assert!(!bar.grabbed);
    }

    #[test]
    fn temperature_clamps_beyond_the_bar_range() {
        let mut bar = TemperatureBar::new();
        bar.update(&grab_at(BAR_X, 200));

        bar.update(&grab_at(BAR_X, BAR_BOTTOM + 300));
        assert_eq!(bar.temp_celsius, 0.0);

        bar.update(&grab_at(BAR_X, BAR_TOP - 300));
        assert_eq!(bar.temp_celsius, MAX_TEMP);
    }

    #[test]
    fn mapping_is_linear_over_the_bar() {
        let mut bar = TemperatureBar::new();
        let mid = (BAR_TOP + BAR_BOTTOM) / 2;
        bar.update(&grab_at(BAR_X, mid));
        assert!((bar.temp_celsius - 50.0).abs() < 1.0);
    }

    #[test]
    fn render_fills_in_proportion() {
        let mut frame = RgbImage::new(640, 480);
        let bar = TemperatureBar { temp_celsius: MAX_TEMP, grabbed: false };
        bar.render(&mut frame);
        assert_eq!(*frame.get_pixel((BAR_X + 10) as u32, (BAR_TOP + 20) as u32), FILL);
    }
}
