//! Key badges (spec §4.7 step 4): a formatted modifier label shown in a
//! rounded rectangle at output-bottom-center with fade in/out.
//!
//! Text is drawn with a runtime-loaded `ab_glyph` font rather than an
//! embedded one — no real font file exists in the retrieved pack to
//! ground an `include_bytes!` on, so the caller supplies a font path
//! (spec SPEC_FULL.md §10.2) and badges silently draw background-only
//! (no glyphs) when no font was loaded, degrading gracefully.

use ab_glyph::{FontArc, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut};
use imageproc::rect::Rect as ImgRect;

const BADGE_DURATION_MS: f64 = 1_500.0;
const FADE_MS: f64 = 150.0;
const BADGE_HEIGHT: u32 = 48;
const BADGE_BOTTOM_MARGIN: u32 = 60;

#[derive(Debug, Clone)]
pub struct ActiveBadge {
    pub label: String,
    pub start_t: f64,
}

impl ActiveBadge {
    pub fn is_active(&self, t: f64) -> bool {
        let elapsed = t - self.start_t;
        (0.0..=BADGE_DURATION_MS).contains(&elapsed)
    }

    fn opacity(&self, t: f64) -> f32 {
        let elapsed = t - self.start_t;
        if elapsed < FADE_MS {
            (elapsed / FADE_MS) as f32
        } else if elapsed > BADGE_DURATION_MS - FADE_MS {
            ((BADGE_DURATION_MS - elapsed) / FADE_MS) as f32
        } else {
            1.0
        }
        .clamp(0.0, 1.0)
    }
}

/// Formats a key event as a label like "Ctrl+C" (spec §4.7 step 4).
pub fn format_label(key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> String {
    let mut parts = Vec::new();
    if ctrl {
        parts.push("Ctrl");
    }
    if alt {
        parts.push("Alt");
    }
    if shift {
        parts.push("Shift");
    }
    if meta {
        parts.push("Meta");
    }
    let key_label = capitalize_special(key);
    parts.push(&key_label);
    parts.join("+")
}

fn capitalize_special(key: &str) -> String {
    match key {
        "enter" | "Enter" => "Enter".into(),
        "tab" | "Tab" => "Tab".into(),
        "escape" | "Escape" | "esc" => "Escape".into(),
        "backspace" | "Backspace" => "Backspace".into(),
        "delete" | "Delete" => "Delete".into(),
        "space" | "Space" => "Space".into(),
        "arrowup" | "ArrowUp" | "up" => "Up".into(),
        "arrowdown" | "ArrowDown" | "down" => "Down".into(),
        "arrowleft" | "ArrowLeft" | "left" => "Left".into(),
        "arrowright" | "ArrowRight" | "right" => "Right".into(),
        other if other.len() == 1 => other.to_uppercase(),
        other => other.to_string(),
    }
}

/// Whether a bare keypress (no modifiers) is still badge-worthy: the
/// spec's special-key list (spec §4.7 step 4).
pub fn is_special_key(key: &str) -> bool {
    matches!(
        key.to_lowercase().as_str(),
        "enter" | "tab" | "escape" | "esc" | "backspace" | "delete" | "space"
            | "arrowup" | "arrowdown" | "arrowleft" | "arrowright" | "up" | "down" | "left" | "right"
    ) || (key.len() == 2 && key.starts_with('f') && key[1..].parse::<u32>().is_ok_and(|n| (1..=12).contains(&n)))
        || (key.len() == 3 && key.starts_with('f') && key[1..].parse::<u32>().is_ok_and(|n| (1..=12).contains(&n)))
}

pub fn draw_badge(img: &mut RgbaImage, badge: &ActiveBadge, t: f64, out_w: u32, out_h: u32, ) {
    draw_badge_with_font(img, badge, t, out_w, out_h, None);
}

pub fn draw_badge_with_font(
    img: &mut RgbaImage,
    badge: &ActiveBadge,
    t: f64,
    out_w: u32,
    out_h: u32,
    font: Option<&FontArc>,
) {
    let opacity = badge.opacity(t);
    if opacity <= 0.0 {
        return;
    }

    let width = (badge.label.len() as u32 * 18 + 40).max(80);
    let x = (out_w.saturating_sub(width)) / 2;
    let y = out_h.saturating_sub(BADGE_HEIGHT + BADGE_BOTTOM_MARGIN);

    let rect = ImgRect::at(x as i32, y as i32).of_size(width, BADGE_HEIGHT);
    let bg_alpha = (220.0 * opacity) as u8;
    draw_filled_rect_mut(img, rect, Rgba([24, 24, 32, bg_alpha]));

    if let Some(font) = font {
        let scale = PxScale::from(24.0);
        let text_alpha = (255.0 * opacity) as u8;
        draw_text_mut(
            img,
            Rgba([255, 255, 255, text_alpha]),
            (x + 16) as i32,
            (y + 10) as i32,
            scale,
            font,
            &badge.label,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_modifier_label() {
        assert_eq!(format_label("c", true, false, false, false), "Ctrl+C");
        assert_eq!(format_label("enter", false, false, false, false), "Enter");
    }

    #[test]
    fn special_key_recognition() {
        assert!(is_special_key("Enter"));
        assert!(is_special_key("F5"));
        assert!(is_special_key("F12"));
        assert!(!is_special_key("q"));
    }

    #[test]
    fn badge_fades_in_and_out() {
        let badge = ActiveBadge { label: "Ctrl+C".into(), start_t: 1000.0 };
        assert!(badge.opacity(1000.0) < badge.opacity(1100.0));
        assert!(badge.opacity(2490.0) < badge.opacity(2400.0));
        assert!(badge.is_active(1000.0));
        assert!(!badge.is_active(2501.0));
    }

    #[test]
    fn draws_without_font_without_panicking() {
        let mut img = RgbaImage::from_pixel(400, 300, Rgba([0, 0, 0, 0]));
        let badge = ActiveBadge { label: "Ctrl+C".into(), start_t: 0.0 };
        draw_badge(&mut img, &badge, 100.0, 400, 300);
    }
}
