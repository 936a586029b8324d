//! Zoom planner (spec §4.4): converts scenes plus idle spans into an
//! ordered keyframe list with anticipated start times.
//!
//! Grounded on the teacher's `commands/zoom.rs` (`generate_zoom_segments`),
//! whose click-cluster merge/dedup logic is reused here, but whose
//! click-only triggering is superseded by the scene-splitter pipeline
//! (spec §9 "open questions").

use crate::model::{Keyframe, Rect, Scene, ScreenSize, SpringHint, Transition};
use crate::settings::{AnimationSpeed, RecordingMode, Settings};

struct HalfLives {
    zoom: f64,
    pan: f64,
}

const FIRST_OR_ZOOM_IN: HalfLives = HalfLives {
    zoom: 0.20,
    pan: 0.20,
};
const ADJACENT_SMOOTH: HalfLives = HalfLives {
    zoom: 0.25,
    pan: 0.25,
};
const MEDIUM_IDLE_OUT: HalfLives = HalfLives {
    zoom: 0.35,
    pan: 0.30,
};
const LONG_IDLE_OUT: HalfLives = HalfLives {
    zoom: 0.40,
    pan: 0.35,
};

const ANTICIPATION_FACTOR: f64 = 3.0;
const MIN_KEYFRAME_SPACING_MS: f64 = 200.0;
const DEDUP_WINDOW_MS: f64 = 200.0;
const ZOOM_COLLINEAR_EPS: f64 = 0.01;
const MIN_ZOOM: f64 = 1.2;

fn scaled(h: &HalfLives, speed: AnimationSpeed) -> SpringHint {
    let m = speed.multiplier();
    SpringHint {
        zoom_half_life: h.zoom * m,
        pan_half_life: h.pan * m,
    }
}

/// The prior scene's medium-idle zoom-out target: its window's center at
/// the window-fit zoom level when a window rect is known, falling back
/// to the scene's own center/zoom otherwise (spec §4.4 medium-idle).
fn medium_idle_target(scene: &Scene, screen: ScreenSize, max_zoom: f64) -> ((f64, f64), f64) {
    match scene.window_rect {
        Some(rect) => window_fit(rect, screen, max_zoom),
        None => (scene.center, scene.zoom_level),
    }
}

fn window_fit(rect: Rect, screen: ScreenSize, max_zoom: f64) -> ((f64, f64), f64) {
    let (x, y, w, h) = rect;
    let center = (x + w / 2.0, y + h / 2.0);
    let zoom = (screen.width / w).min(screen.height / h).clamp(MIN_ZOOM, max_zoom);
    (center, zoom)
}

fn kf(t: f64, target: (f64, f64), zoom: f64, transition: Transition, hint: SpringHint) -> Keyframe {
    Keyframe {
        t,
        target_x: target.0,
        target_y: target.1,
        zoom_level: zoom,
        transition,
        spring_hint: Some(hint),
    }
}

/// Builds the keyframe list. Returns an empty list when auto-zoom is
/// disabled (spec §4.4 "Auto-zoom disabled").
pub fn plan_keyframes(
    scenes: &[Scene],
    recording_end_ms: f64,
    screen: ScreenSize,
    settings: &Settings,
) -> Vec<Keyframe> {
    if !settings.auto_zoom_enabled || scenes.is_empty() {
        return Vec::new();
    }

    let speed = settings.animation_speed;
    let full_screen = settings.recording_mode == RecordingMode::Display;
    let mut out: Vec<Keyframe> = Vec::new();
    let mut prev_end: Option<f64> = None;

    for (i, scene) in scenes.iter().enumerate() {
        if let Some(prev_end_t) = prev_end {
            let gap = scene.start_t - prev_end_t;

            if gap >= settings.overview_idle_ms && full_screen {
                let hint = scaled(&LONG_IDLE_OUT, speed);
                let t = last_kf_clamped(&out, prev_end_t + 1.0, prev_end_t);
                out.push(kf(t, screen.center(), 1.0, Transition::SpringOut, hint));
            } else if gap >= settings.zoom_out_idle_ms {
                let hint = scaled(&MEDIUM_IDLE_OUT, speed);
                let (target, zoom) = medium_idle_target(&scenes[i - 1], screen, settings.max_zoom);
                let t = last_kf_clamped(&out, prev_end_t + 1.0, prev_end_t);
                out.push(kf(t, target, zoom, Transition::SpringOut, hint));
            }
        }

        let had_idle_out = out.last().map(|k| k.transition == Transition::SpringOut).unwrap_or(false);

        let (t, hint, transition) = if i == 0 {
            (0.0, scaled(&FIRST_OR_ZOOM_IN, speed), Transition::SpringIn)
        } else {
            let transition = if had_idle_out {
                Transition::SpringIn
            } else {
                Transition::Smooth
            };
            // Post-idle zoom-in reuses the first-scene half-lives (spec
            // §4.4's "First scene / post-long-idle zoom-in" row); only a
            // plain adjacent-scene transition uses the smooth row.
            let hint = if had_idle_out {
                scaled(&FIRST_OR_ZOOM_IN, speed)
            } else {
                scaled(&ADJACENT_SMOOTH, speed)
            };
            let anticipated = scene.start_t - ANTICIPATION_FACTOR * hint.pan_half_life * 1000.0;
            let floor = prev_end.unwrap_or(0.0);
            let last_kf_t = out.last().map(|k| k.t).unwrap_or(0.0);
            let t = anticipated.max(floor).max(last_kf_t + MIN_KEYFRAME_SPACING_MS);
            (t, hint, transition)
        };

        out.push(kf(t, scene.center, scene.zoom_level, transition, hint));
        prev_end = Some(scene.end_t);
    }

    if full_screen {
        if let Some(last_end) = prev_end {
            if recording_end_ms - last_end >= settings.overview_idle_ms {
                let hint = scaled(&LONG_IDLE_OUT, speed);
                let t = last_end + 1.0;
                out.push(kf(t, screen.center(), 1.0, Transition::SpringOut, hint));
            }
        }
    }

    dedup(out)
}

fn last_kf_clamped(out: &[Keyframe], candidate: f64, floor: f64) -> f64 {
    let last_kf_t = out.last().map(|k| k.t).unwrap_or(0.0);
    candidate.max(floor).max(last_kf_t + MIN_KEYFRAME_SPACING_MS)
}

/// Drops keyframes within `DEDUP_WINDOW_MS` of the previous one, keeping
/// the later; collapses colinear zoom-level runs (spec §4.4).
fn dedup(keyframes: Vec<Keyframe>) -> Vec<Keyframe> {
    let mut out: Vec<Keyframe> = Vec::with_capacity(keyframes.len());
    for k in keyframes {
        if let Some(last) = out.last() {
            if k.t - last.t < DEDUP_WINDOW_MS {
                out.pop();
            }
        }
        out.push(k);
    }

    let mut collapsed: Vec<Keyframe> = Vec::with_capacity(out.len());
    for k in out {
        if let (Some(a), Some(b)) = (
            collapsed.len().checked_sub(2).map(|i| collapsed[i]),
            collapsed.last().copied(),
        ) {
            if (a.zoom_level - b.zoom_level).abs() < ZOOM_COLLINEAR_EPS
                && (b.zoom_level - k.zoom_level).abs() < ZOOM_COLLINEAR_EPS
            {
                collapsed.pop();
            }
        }
        collapsed.push(k);
    }
    collapsed
}
