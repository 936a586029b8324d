//! Crop/scale, rounded corners, drop shadow, background (spec §4.7 steps
//! 1, 5, 6, 7). Grounded on `prvnsmpth-glide`'s `processing::effects`
//! module split (`apply_rounded_corners`, `draw_shadow`, `Background`).

use image::imageops::FilterType;
use image::{GenericImageView, Rgba, RgbaImage};

use crate::model::Viewport;
use crate::settings::{BackgroundConfig, BackgroundKind};

use super::blend_pixel;

/// Step 1: resample the source frame's viewport rect to the output
/// resolution with a bilinear/triangle filter — a deliberate
/// quality/speed tradeoff over Lanczos (spec §4.7 step 1).
pub fn crop_and_scale(source: &RgbaImage, viewport: Viewport, out_w: u32, out_h: u32) -> RgbaImage {
    let x = viewport.x.round().max(0.0) as u32;
    let y = viewport.y.round().max(0.0) as u32;
    let w = viewport.w.round().max(1.0) as u32;
    let h = viewport.h.round().max(1.0) as u32;

    let w = w.min(source.width().saturating_sub(x).max(1));
    let h = h.min(source.height().saturating_sub(y).max(1));

    let cropped = source.view(x, y, w, h).to_image();
    image::imageops::resize(&cropped, out_w, out_h, FilterType::Triangle)
}

/// Step 5: a rounded-rectangle alpha mask with sub-pixel antialiasing,
/// computed once per job and reused every frame.
pub struct CornerMask {
    alpha: Vec<u8>,
    width: u32,
    height: u32,
}

impl CornerMask {
    pub fn build(width: u32, height: u32, radius: u32) -> Self {
        let mut alpha = vec![255u8; (width * height) as usize];
        let r = radius as f64;
        if r > 0.0 {
            for y in 0..height {
                for x in 0..width {
                    let a = corner_alpha(x as f64, y as f64, width as f64, height as f64, r);
                    alpha[(y * width + x) as usize] = (a * 255.0).round().clamp(0.0, 255.0) as u8;
                }
            }
        }
        CornerMask { alpha, width, height }
    }

    pub fn alpha_at(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.alpha[(y * self.width + x) as usize]
    }
}

fn corner_alpha(x: f64, y: f64, w: f64, h: f64, r: f64) -> f64 {
    let in_left = x < r;
    let in_right = x > w - r;
    let in_top = y < r;
    let in_bottom = y > h - r;

    let (cx, cy) = match (in_left, in_right, in_top, in_bottom) {
        (true, _, true, _) => (r, r),
        (_, true, true, _) => (w - r, r),
        (_, true, _, true) => (w - r, h - r),
        (true, _, _, true) => (r, h - r),
        _ => return 1.0,
    };

    let dist = ((x - cx).powi(2) + (y - cy).powi(2)).sqrt();
    let distance_outside_radius = dist - r;
    (1.0 - distance_outside_radius).clamp(0.0, 1.0)
}

pub fn apply_corner_mask(img: &mut RgbaImage, mask: &CornerMask) {
    for y in 0..img.height() {
        for x in 0..img.width() {
            let a = mask.alpha_at(x, y);
            if a == 255 {
                continue;
            }
            let p = img.get_pixel_mut(x, y);
            let new_a = (p.0[3] as u16 * a as u16 / 255) as u8;
            p.0[3] = new_a;
        }
    }
}

/// Step 6: a Gaussian-approximated drop shadow of the rounded content
/// rectangle, composited beneath it (spec §4.7 step 6).
fn shadow_layer(content: &RgbaImage, bg_w: u32, bg_h: u32, offset: (i64, i64)) -> RgbaImage {
    let mut shadow = RgbaImage::from_pixel(bg_w, bg_h, Rgba([0, 0, 0, 0]));
    let cx0 = ((bg_w as i64 - content.width() as i64) / 2 + offset.0).max(0) as i64;
    let cy0 = ((bg_h as i64 - content.height() as i64) / 2 + offset.1).max(0) as i64;

    for y in 0..content.height() {
        for x in 0..content.width() {
            let a = content.get_pixel(x, y).0[3];
            if a == 0 {
                continue;
            }
            let dx = cx0 + x as i64;
            let dy = cy0 + y as i64;
            if dx >= 0 && dy >= 0 && (dx as u32) < bg_w && (dy as u32) < bg_h {
                shadow.put_pixel(dx as u32, dy as u32, Rgba([0, 0, 0, (a as u32 * 140 / 255) as u8]));
            }
        }
    }

    image::imageops::blur(&shadow, 12.0)
}

/// Step 7: composite the content (with shadow) onto the cached background.
pub fn composite_with_shadow(background: &RgbaImage, content: &RgbaImage) -> RgbaImage {
    let mut out = background.clone();
    let shadow = shadow_layer(content, out.width(), out.height(), (6, 10));
    for y in 0..out.height() {
        for x in 0..out.width() {
            let s = *shadow.get_pixel(x, y);
            blend_pixel(out.get_pixel_mut(x, y), s);
        }
    }
    composite_content(&mut out, content);
    out
}

pub fn composite_plain(background: &RgbaImage, content: &RgbaImage) -> RgbaImage {
    let mut out = background.clone();
    composite_content(&mut out, content);
    out
}

fn composite_content(out: &mut RgbaImage, content: &RgbaImage) {
    let cx0 = (out.width() as i64 - content.width() as i64) / 2;
    let cy0 = (out.height() as i64 - content.height() as i64) / 2;
    for y in 0..content.height() {
        for x in 0..content.width() {
            let dx = cx0 + x as i64;
            let dy = cy0 + y as i64;
            if dx >= 0 && dy >= 0 && (dx as u32) < out.width() && (dy as u32) < out.height() {
                let src = *content.get_pixel(x, y);
                blend_pixel(out.get_pixel_mut(dx as u32, dy as u32), src);
            }
        }
    }
}

/// Generated once per job and cached; only the content offset and shadow
/// differ per frame (spec §4.7 step 7).
pub fn render_background(width: u32, height: u32, config: &BackgroundConfig) -> RgbaImage {
    match config.kind {
        BackgroundKind::Transparent => RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0])),
        BackgroundKind::Solid => {
            let c = config.start_color;
            RgbaImage::from_pixel(width, height, Rgba([c.r, c.g, c.b, 255]))
        }
        BackgroundKind::Gradient => render_gradient(width, height, config),
    }
}

fn render_gradient(width: u32, height: u32, config: &BackgroundConfig) -> RgbaImage {
    let mut img = RgbaImage::new(width, height);
    let theta = config.angle_deg.to_radians();
    let (dx, dy) = (theta.cos(), theta.sin());
    let diag = ((width * width + height * height) as f32).sqrt().max(1.0);

    for y in 0..height {
        for x in 0..width {
            let proj = (x as f32 * dx + y as f32 * dy) / diag;
            let t = ((proj + 1.0) / 2.0).clamp(0.0, 1.0);
            let r = lerp(config.start_color.r, config.end_color.r, t);
            let g = lerp(config.start_color.g, config.end_color.g, t);
            let b = lerp(config.start_color.b, config.end_color.b, t);
            img.put_pixel(x, y, Rgba([r, g, b, 255]));
        }
    }
    img
}

fn lerp(a: u8, b: u8, t: f32) -> u8 {
    (a as f32 + (b as f32 - a as f32) * t).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corner_mask_is_opaque_at_center() {
        let mask = CornerMask::build(200, 100, 20);
        assert_eq!(mask.alpha_at(100, 50), 255);
    }

    #[test]
    fn corner_mask_fades_at_corner() {
        let mask = CornerMask::build(200, 100, 20);
        assert!(mask.alpha_at(0, 0) < 255);
    }

    #[test]
    fn solid_background_is_uniform() {
        let config = BackgroundConfig {
            kind: BackgroundKind::Solid,
            ..BackgroundConfig::default()
        };
        let bg = render_background(50, 40, &config);
        let first = *bg.get_pixel(0, 0);
        let last = *bg.get_pixel(49, 39);
        assert_eq!(first, last);
    }

    #[test]
    fn crop_and_scale_produces_requested_resolution() {
        let source = RgbaImage::from_pixel(400, 300, Rgba([10, 20, 30, 255]));
        let vp = Viewport { x: 0.0, y: 0.0, w: 200.0, h: 150.0 };
        let out = crop_and_scale(&source, vp, 1920, 1080);
        assert_eq!(out.width(), 1920);
        assert_eq!(out.height(), 1080);
    }
}
