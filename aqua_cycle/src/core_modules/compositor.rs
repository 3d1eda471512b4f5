// THEORY:
// The `compositor` module is the single place where sprites meet the camera
// frame. It implements classic "over" alpha compositing at an arbitrary signed
// offset, with the intersection math done up front so that the per-pixel loop
// only ever touches valid coordinates.
//
// The contract matters more than the math here: callers position sprites from
// noisy hand-tracking data, so offsets are routinely negative or beyond the
// frame. A placement whose bounding box misses the frame entirely is a no-op,
// and a partial placement blends only the visible crop. Nothing here panics.

use image::{RgbImage, RgbaImage};

/// Alpha-blends an RGBA overlay onto the background at offset `(x, y)`.
///
/// Per-pixel: `out = alpha * overlay + (1 - alpha) * background`, with alpha
/// normalized from `[0, 255]`. The overlay is cropped to the intersection of
/// its bounding box with the frame; a disjoint box leaves the frame untouched.
pub fn overlay_rgba(bg: &mut RgbImage, overlay: &RgbaImage, x: i32, y: i32) {
    let Some((x0, y0, x1, y1)) = intersect(bg.width(), bg.height(), overlay.width(), overlay.height(), x, y)
    else {
        return;
    };

    for py in y0..y1 {
        for px in x0..x1 {
            let over = overlay.get_pixel((px - x) as u32, (py - y) as u32);
            let alpha = over[3] as f32 / 255.0;
            let under = bg.get_pixel_mut(px as u32, py as u32);
            for c in 0..3 {
                under[c] = (alpha * over[c] as f32 + (1.0 - alpha) * under[c] as f32) as u8;
            }
        }
    }
}

/// Hard-copies an RGB overlay (no alpha channel, no blending) onto the
/// background at offset `(x, y)`, with the same clipping rules as
/// [`overlay_rgba`].
pub fn overlay_rgb(bg: &mut RgbImage, overlay: &RgbImage, x: i32, y: i32) {
    let Some((x0, y0, x1, y1)) = intersect(bg.width(), bg.height(), overlay.width(), overlay.height(), x, y)
    else {
        return;
    };

    for py in y0..y1 {
        for px in x0..x1 {
            let over = overlay.get_pixel((px - x) as u32, (py - y) as u32);
            bg.put_pixel(px as u32, py as u32, *over);
        }
    }
}

/// Returns the frame-space rectangle `[x0, x1) x [y0, y1)` covered by an
/// overlay of size `(ow, oh)` placed at `(x, y)`, or `None` when the overlay
/// lies entirely outside the frame.
fn intersect(bw: u32, bh: u32, ow: u32, oh: u32, x: i32, y: i32) -> Option<(i32, i32, i32, i32)> {
    let (bw, bh) = (bw as i32, bh as i32);
    let (ow, oh) = (ow as i32, oh as i32);
    if x + ow <= 0 || y + oh <= 0 || x >= bw || y >= bh {
        return None;
    }
    Some((x.max(0), y.max(0), (x + ow).min(bw), (y + oh).min(bh)))
}
