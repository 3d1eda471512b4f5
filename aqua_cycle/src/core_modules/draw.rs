// Clipped raster primitives used for the temperature bar, the vapor
// particles, and the hand-skeleton debug overlay. Every primitive accepts
// signed coordinates and silently clips to the frame, so callers never have
// to pre-validate positions that drift off screen.

use image::{Rgb, RgbImage};

fn put_pixel_clipped(frame: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < frame.width() && (y as u32) < frame.height() {
        frame.put_pixel(x as u32, y as u32, color);
    }
}

/// Fills the axis-aligned rectangle `[x0, x1) x [y0, y1)`.
pub fn fill_rect(frame: &mut RgbImage, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb<u8>) {
    let cx0 = x0.max(0);
    let cy0 = y0.max(0);
    let cx1 = x1.min(frame.width() as i32);
    let cy1 = y1.min(frame.height() as i32);
    for y in cy0..cy1 {
        for x in cx0..cx1 {
            frame.put_pixel(x as u32, y as u32, color);
        }
    }
}

/// Strokes the outline of `[x0, x1) x [y0, y1)` with the given edge thickness.
pub fn stroke_rect(
    frame: &mut RgbImage,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    thickness: i32,
    color: Rgb<u8>,
) {
    fill_rect(frame, x0, y0, x1, y0 + thickness, color);
    fill_rect(frame, x0, y1 - thickness, x1, y1, color);
    fill_rect(frame, x0, y0, x0 + thickness, y1, color);
    fill_rect(frame, x1 - thickness, y0, x1, y1, color);
}

/// Fills a disc centered at `(cx, cy)`.
pub fn fill_circle(frame: &mut RgbImage, cx: i32, cy: i32, radius: i32, color: Rgb<u8>) {
    let r_sq = radius * radius;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= r_sq {
                put_pixel_clipped(frame, cx + dx, cy + dy, color);
            }
        }
    }
}

/// Draws a one-pixel line between two points (Bresenham).
pub fn draw_line(frame: &mut RgbImage, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb<u8>) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);
    loop {
        put_pixel_clipped(frame, x, y, color);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_rect_clips_to_frame() {
        let mut frame = RgbImage::new(10, 10);
        fill_rect(&mut frame, -5, -5, 5, 5, Rgb([255, 0, 0]));
        assert_eq!(*frame.get_pixel(0, 0), Rgb([255, 0, 0]));
        assert_eq!(*frame.get_pixel(4, 4), Rgb([255, 0, 0]));
        assert_eq!(*frame.get_pixel(5, 5), Rgb([0, 0, 0]));
    }

    #[test]
    fn circle_fully_off_screen_is_a_no_op() {
        let mut frame = RgbImage::new(10, 10);
        fill_circle(&mut frame, -50, -50, 10, Rgb([255, 255, 255]));
        assert!(frame.pixels().all(|p| *p == Rgb([0, 0, 0])));
    }

    #[test]
    fn line_endpoints_are_painted() {
        let mut frame = RgbImage::new(10, 10);
        draw_line(&mut frame, 1, 1, 8, 6, Rgb([0, 255, 0]));
        assert_eq!(*frame.get_pixel(1, 1), Rgb([0, 255, 0]));
        assert_eq!(*frame.get_pixel(8, 6), Rgb([0, 255, 0]));
    }
}
