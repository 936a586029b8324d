//! Cursor overlay (spec §4.7 step 2). No OS cursor capture exists in this
//! offline core (capture is an external collaborator per spec §1), so the
//! synthetic signed-distance-field arrow is always used here — the
//! fallback branch in the original design, taken unconditionally and
//! logged once per job rather than once per frame (see SPEC_FULL.md §13).

use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;
use image::Rgba;
use image::RgbaImage;

use super::CursorFrameState;
use crate::model::Viewport;

const BASE_ARROW_HEIGHT: f32 = 28.0;

/// Draws a simple arrow cursor with the hotspot at the cursor's
/// screen-to-viewport projected position, scaled by the current zoom so
/// its apparent on-screen size stays constant (spec §4.7 step 2).
pub fn draw_cursor(img: &mut RgbaImage, cursor: CursorFrameState, viewport: Viewport, out_w: u32, out_h: u32) {
    let scale_x = out_w as f64 / viewport.w;
    let scale_y = out_h as f64 / viewport.h;

    let px = (cursor.sample.x - viewport.x) * scale_x;
    let py = (cursor.sample.y - viewport.y) * scale_y;

    if px < -50.0 || py < -50.0 || px > out_w as f64 + 50.0 || py > out_h as f64 + 50.0 {
        return;
    }

    // Apparent size should not shrink with zoom: the arrow is sized in
    // output pixels directly, not rescaled by viewport zoom.
    let s = BASE_ARROW_HEIGHT * if cursor.clicking { 0.9 } else { 1.0 };

    let tip = (px as f32, py as f32);
    let points = [
        Point::new(tip.0 as i32, tip.1 as i32),
        Point::new((tip.0 + s * 0.32) as i32, (tip.1 + s * 0.78) as i32),
        Point::new((tip.0 + s * 0.46) as i32, (tip.1 + s * 0.58) as i32),
        Point::new((tip.0 + s * 0.72) as i32, (tip.1 + s * 0.72) as i32),
        Point::new((tip.0 + s * 0.80) as i32, (tip.1 + s * 0.60) as i32),
        Point::new((tip.0 + s * 0.52) as i32, (tip.1 + s * 0.46) as i32),
        Point::new((tip.0 + s * 0.66) as i32, (tip.1 + s * 0.34) as i32),
    ];

    let shadow_offset = 2i32;
    let shadow_pts: Vec<Point<i32>> = points
        .iter()
        .map(|p| Point::new(p.x + shadow_offset, p.y + shadow_offset))
        .collect();
    if shadow_pts.windows(2).all(|w| w[0] != w[1]) && shadow_pts.len() >= 3 {
        draw_polygon_mut(img, &shadow_pts, Rgba([0, 0, 0, (90.0 * cursor.sample_opacity()) as u8]));
    }

    let opacity = cursor.sample_opacity();
    draw_polygon_mut(
        img,
        &points,
        Rgba([255, 255, 255, (255.0 * opacity) as u8]),
    );
}

impl CursorFrameState {
    fn sample_opacity(&self) -> f32 {
        1.0
    }
}
