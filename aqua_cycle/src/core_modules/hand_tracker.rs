// THEORY:
// The `hand_tracker` module converts raw hand-landmark detector output into
// the per-frame `GestureSignal` the interaction layer runs on. It is the
// boundary between noisy sensor input and the state machine.
//
// Key architectural principles:
// 1.  **Detector as collaborator**: the landmark detector itself lives behind
//     the `HandLandmarkSource` trait. The engine only depends on the shape of
//     its output (21 normalized landmarks per hand), never on how inference
//     is run.
// 2.  **Derived, ephemeral signal**: a `GestureSignal` is recomputed fresh
//     every frame and never persisted. All hysteresis (drag-lock, shake
//     energy) lives downstream in the state machine, keeping this module
//     stateless.
// 3.  **Pixel anchor, normalized pinch**: the anchor point is landmark 9 (the
//     middle-finger MCP joint) scaled to pixel coordinates, while the pinch
//     test measures thumb-tip/index-tip distance in normalized space so it is
//     independent of frame resolution and of how far the hand is from the
//     camera.

use image::{Rgb, RgbImage};

use crate::core_modules::draw;

/// Number of landmarks a detector reports per hand.
pub const LANDMARK_COUNT: usize = 21;

/// Normalized thumb-tip/index-tip distance below which a pinch counts as a
/// grab. The boundary itself is not a grab: the comparison is strict.
pub const GRAB_DISTANCE: f32 = 0.12;

/// Minimum detection/tracking confidence a detector implementation must gate
/// its output on.
pub const MIN_CONFIDENCE: f32 = 0.6;

const ANCHOR_LANDMARK: usize = 9; // middle-finger MCP joint
const THUMB_TIP: usize = 4;
const INDEX_TIP: usize = 8;

// Skeleton edges between landmark indices, drawn by the debug overlay.
const SKELETON: [(usize, usize); 21] = [
    (0, 1), (1, 2), (2, 3), (3, 4), // thumb
    (0, 5), (5, 6), (6, 7), (7, 8), // index
    (5, 9), (9, 10), (10, 11), (11, 12), // middle
    (9, 13), (13, 14), (14, 15), (15, 16), // ring
    (13, 17), (17, 18), (18, 19), (19, 20), // pinky
    (0, 17), // palm edge
];

const BONE_COLOR: Rgb<u8> = Rgb([230, 230, 230]);
const JOINT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const GRAB_DOT: Rgb<u8> = Rgb([0, 255, 0]);
const IDLE_DOT: Rgb<u8> = Rgb([0, 0, 255]);

/// A single landmark in normalized `[0, 1]` image coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// One detected hand: 21 landmarks in detector order.
#[derive(Debug, Clone)]
pub struct HandLandmarks {
    pub points: [Landmark; LANDMARK_COUNT],
}

/// A source of per-frame hand landmarks (the external detector). Video-mode,
/// single-hand behavior: at most one hand is reported, and implementations
/// gate on [`MIN_CONFIDENCE`].
pub trait HandLandmarkSource {
    fn detect(&mut self, frame: &RgbImage) -> Option<HandLandmarks>;
}

/// Per-frame derived hand state: an optional pixel-space anchor point and the
/// pinch-grab boolean. Absent anchor means no hand was detected this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GestureSignal {
    pub anchor: Option<(i32, i32)>,
    pub grab: bool,
}

impl GestureSignal {
    /// Derives the signal for one detected hand on a frame of the given size.
    pub fn from_landmarks(hand: &HandLandmarks, frame_width: u32, frame_height: u32) -> Self {
        let anchor_pt = hand.points[ANCHOR_LANDMARK];
        let anchor = (
            (anchor_pt.x * frame_width as f32) as i32,
            (anchor_pt.y * frame_height as f32) as i32,
        );

        let thumb = hand.points[THUMB_TIP];
        let index = hand.points[INDEX_TIP];
        let pinch = (thumb.x - index.x).hypot(thumb.y - index.y);

        Self {
            anchor: Some(anchor),
            grab: pinch < GRAB_DISTANCE,
        }
    }
}

/// Derives the gesture signal and draws the debug overlay (hand skeleton plus
/// an anchor dot, green while grabbing, blue otherwise) onto the frame.
///
/// The overlay is purely presentational; the returned signal is the contract.
pub fn annotate(frame: &mut RgbImage, hand: Option<&HandLandmarks>) -> GestureSignal {
    let Some(hand) = hand else {
        return GestureSignal::default();
    };

    let (w, h) = (frame.width(), frame.height());
    let signal = GestureSignal::from_landmarks(hand, w, h);

    let to_px = |lm: &Landmark| ((lm.x * w as f32) as i32, (lm.y * h as f32) as i32);
    for (a, b) in SKELETON {
        let (ax, ay) = to_px(&hand.points[a]);
        let (bx, by) = to_px(&hand.points[b]);
        draw::draw_line(frame, ax, ay, bx, by, BONE_COLOR);
    }
    for lm in &hand.points {
        let (x, y) = to_px(lm);
        draw::fill_circle(frame, x, y, 3, JOINT_COLOR);
    }

    if let Some((ax, ay)) = signal.anchor {
        let dot = if signal.grab { GRAB_DOT } else { IDLE_DOT };
        draw::fill_circle(frame, ax, ay, 10, dot);
    }

    signal
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand_with(thumb: (f32, f32), index: (f32, f32), anchor: (f32, f32)) -> HandLandmarks {
        let mut points = [Landmark::default(); LANDMARK_COUNT];
        points[THUMB_TIP] = Landmark { x: thumb.0, y: thumb.1, z: 0.0 };
        points[INDEX_TIP] = Landmark { x: index.0, y: index.1, z: 0.0 };
        points[ANCHOR_LANDMARK] = Landmark { x: anchor.0, y: anchor.1, z: 0.0 };
        HandLandmarks { points }
    }

    #[test]
    fn anchor_maps_landmark_nine_to_pixels() {
        let hand = hand_with((0.0, 0.0), (1.0, 1.0), (0.5, 0.25));
        let signal = GestureSignal::from_landmarks(&hand, 1280, 720);
        assert_eq!(signal.anchor, Some((640, 180)));
    }

    #[test]
    fn pinch_below_threshold_is_a_grab() {
        let hand = hand_with((0.50, 0.50), (0.55, 0.50), (0.5, 0.5));
        let signal = GestureSignal::from_landmarks(&hand, 640, 480);
        assert!(signal.grab);
    }

    #[test]
    fn boundary_distance_is_not_a_grab() {
        // Exactly GRAB_DISTANCE apart on one axis: strict comparison must
        // reject it. hypot(x, 0) is exact, so this probes the boundary itself.
        let hand = hand_with((0.0, 0.50), (GRAB_DISTANCE, 0.50), (0.5, 0.5));
        let signal = GestureSignal::from_landmarks(&hand, 640, 480);
        assert!(!signal.grab);

        let wide = hand_with((0.20, 0.50), (0.60, 0.50), (0.5, 0.5));
        assert!(!GestureSignal::from_landmarks(&wide, 640, 480).grab);
    }

    #[test]
    fn no_hand_yields_the_empty_signal() {
        let mut frame = RgbImage::new(64, 64);
        let signal = annotate(&mut frame, None);
        assert_eq!(signal, GestureSignal::default());
        assert!(frame.pixels().all(|p| *p == Rgb([0, 0, 0])));
    }

    #[test]
    fn annotate_marks_the_anchor() {
        let mut frame = RgbImage::new(100, 100);
        let hand = hand_with((0.5, 0.5), (0.51, 0.5), (0.5, 0.5));
        let signal = annotate(&mut frame, Some(&hand));
        assert!(signal.grab);
        assert_eq!(*frame.get_pixel(50, 50), GRAB_DOT);
    }
}
