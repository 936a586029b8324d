//! Click rings (spec §4.7 step 3): eased-radius, fading stroked ring drawn
//! at each recent click location.

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut};

use crate::model::Viewport;

const RING_DURATION_MS: f64 = 400.0;
const MAX_RADIUS_PX: f64 = 28.0;

#[derive(Debug, Clone, Copy)]
pub struct ActiveRing {
    pub x: f64,
    pub y: f64,
    pub click_t: f64,
}

impl ActiveRing {
    /// Whether this ring is still visible at time `t` (spec §4.7 step 3:
    /// "elapsed time lies in [0, ring_duration_ms]").
    pub fn is_active(&self, t: f64) -> bool {
        let elapsed = t - self.click_t;
        (0.0..=RING_DURATION_MS).contains(&elapsed)
    }

    fn linear_progress(&self, t: f64) -> f64 {
        ((t - self.click_t) / RING_DURATION_MS).clamp(0.0, 1.0)
    }
}

/// Eased progress p = 1 − (1 − linear)^3 (spec §4.7 step 3).
pub fn eased_progress(linear: f64) -> f64 {
    1.0 - (1.0 - linear).powi(3)
}

/// Draws the ring as it appears at frame time `t`. Callers should only
/// invoke this for rings where `is_active(t)` holds.
pub fn draw_ring(img: &mut RgbaImage, ring: &ActiveRing, t: f64, viewport: Viewport, out_w: u32, out_h: u32) {
    let scale_x = out_w as f64 / viewport.w;
    let scale_y = out_h as f64 / viewport.h;
    let cx = ((ring.x - viewport.x) * scale_x).round() as i32;
    let cy = ((ring.y - viewport.y) * scale_y).round() as i32;

    let linear = ring.linear_progress(t);
    let p = eased_progress(linear);
    let radius = (MAX_RADIUS_PX * p).round() as i32;
    if radius <= 0 {
        return;
    }
    let stroke_alpha = ((1.0 - linear) * 255.0).clamp(0.0, 255.0) as u8;
    let fill_alpha = ((1.0 - linear) * 0.15 * 255.0).clamp(0.0, 255.0) as u8;

    draw_filled_circle_mut(img, (cx, cy), radius, Rgba([255, 255, 255, fill_alpha]));
    draw_hollow_circle_mut(img, (cx, cy), radius, Rgba([255, 255, 255, stroke_alpha]));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_active_within_duration() {
        let ring = ActiveRing { x: 10.0, y: 10.0, click_t: 100.0 };
        assert!(ring.is_active(100.0));
        assert!(ring.is_active(500.0));
        assert!(!ring.is_active(99.0));
        assert!(!ring.is_active(501.0));
    }

    #[test]
    fn eased_progress_reaches_one() {
        assert_eq!(eased_progress(1.0), 1.0);
        assert_eq!(eased_progress(0.0), 0.0);
        assert!(eased_progress(0.5) > 0.5);
    }

    #[test]
    fn draws_without_panicking_at_midpoint() {
        let mut img = RgbaImage::from_pixel(200, 200, Rgba([0, 0, 0, 0]));
        let ring = ActiveRing { x: 50.0, y: 50.0, click_t: 0.0 };
        let vp = Viewport { x: 0.0, y: 0.0, w: 200.0, h: 200.0 };
        draw_ring(&mut img, &ring, 200.0, vp, 200, 200);
    }
}
