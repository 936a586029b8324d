//! Viewport integrator (spec §4.5): three springs (cx, cy, zoom) driven by
//! a keyframe cursor, producing a clamped crop rectangle per frame.
//!
//! Grounded on the teacher's `rendering/zoom_interpolation.rs`
//! (`SegmentsCursor`, `ZoomFocusInterpolator`), reworked around three
//! independent half-life springs instead of tension/mass/friction.

use crate::model::{Keyframe, ScreenSize, Transition, Viewport};
use crate::spring::Spring;

const DEFAULT_PAN_HALF_LIFE: f64 = 0.25;
const DEFAULT_ZOOM_HALF_LIFE: f64 = 0.25;

pub struct ViewportIntegrator {
    cx: Spring,
    cy: Spring,
    zoom: Spring,
    keyframes: Vec<Keyframe>,
    cursor: usize,
    pan_half_life: f64,
    zoom_half_life: f64,
    screen: ScreenSize,
}

impl ViewportIntegrator {
    pub fn new(keyframes: Vec<Keyframe>, screen: ScreenSize) -> Self {
        let (cx, cy) = screen.center();
        ViewportIntegrator {
            cx: Spring::new(cx),
            cy: Spring::new(cy),
            zoom: Spring::new(1.0),
            keyframes,
            cursor: 0,
            pan_half_life: DEFAULT_PAN_HALF_LIFE,
            zoom_half_life: DEFAULT_ZOOM_HALF_LIFE,
            screen,
        }
    }

    fn apply_keyframe(&mut self, k: &Keyframe) {
        self.cx.target = k.target_x;
        self.cy.target = k.target_y;
        self.zoom.target = k.zoom_level;
        if let Some(hint) = k.spring_hint {
            self.pan_half_life = hint.pan_half_life;
            self.zoom_half_life = hint.zoom_half_life;
        }
    }

    /// Advances the integrator to time `t` (ms) given `dt` (ms) elapsed
    /// since the previous frame, applying any keyframes crossed along the
    /// way, then returns the clamped viewport rectangle.
    pub fn advance(&mut self, t: f64, dt_ms: f64) -> Viewport {
        while self.cursor < self.keyframes.len() && self.keyframes[self.cursor].t <= t {
            let k = self.keyframes[self.cursor];
            self.apply_keyframe(&k);
            self.cursor += 1;
        }

        let dt = (dt_ms / 1000.0).max(0.0);
        self.cx.update(self.pan_half_life, dt);
        self.cy.update(self.pan_half_life, dt);
        self.zoom.update(self.zoom_half_life, dt);

        self.current_viewport()
    }

    fn current_viewport(&self) -> Viewport {
        let zoom_eff = self.zoom.position.max(1.0);
        let vp_w = self.screen.width / zoom_eff;
        let vp_h = self.screen.height / zoom_eff;
        let x = (self.cx.position - vp_w / 2.0).clamp(0.0, (self.screen.width - vp_w).max(0.0));
        let y = (self.cy.position - vp_h / 2.0).clamp(0.0, (self.screen.height - vp_h).max(0.0));
        Viewport {
            x,
            y,
            w: vp_w,
            h: vp_h,
        }
    }
}

/// Materializes the full per-frame viewport trajectory in one sequential
/// pass (spec §5: the spring sweep that must run single-threaded before
/// any per-frame compositing may parallelize).
pub fn materialize_trajectory(keyframes: Vec<Keyframe>, screen: ScreenSize, frame_times_ms: &[f64]) -> Vec<Viewport> {
    let mut integrator = ViewportIntegrator::new(keyframes, screen);
    let mut out = Vec::with_capacity(frame_times_ms.len());
    let mut prev_t = frame_times_ms.first().copied().unwrap_or(0.0);
    for &t in frame_times_ms {
        let dt = t - prev_t;
        out.push(integrator.advance(t, dt));
        prev_t = t;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SpringHint;

    fn screen() -> ScreenSize {
        ScreenSize {
            width: 1920.0,
            height: 1080.0,
        }
    }

    #[test]
    fn no_keyframes_stays_at_identity() {
        let vp = materialize_trajectory(Vec::new(), screen(), &[0.0, 16.0, 33.0]);
        for v in vp {
            assert_eq!(v.x, 0.0);
            assert_eq!(v.y, 0.0);
            assert_eq!(v.w, 1920.0);
            assert_eq!(v.h, 1080.0);
        }
    }

    #[test]
    fn viewport_always_bounded() {
        let kfs = vec![Keyframe {
            t: 0.0,
            target_x: 100.0,
            target_y: 100.0,
            zoom_level: 3.0,
            transition: Transition::SpringIn,
            spring_hint: Some(SpringHint {
                zoom_half_life: 0.2,
                pan_half_life: 0.2,
            }),
        }];
        let times: Vec<f64> = (0..200).map(|i| i as f64 * 16.0).collect();
        let vp = materialize_trajectory(kfs, screen(), &times);
        for v in vp {
            assert!(v.x >= 0.0 && v.x + v.w <= screen().width + 1e-6);
            assert!(v.y >= 0.0 && v.y + v.h <= screen().height + 1e-6);
            assert!(v.w > 0.0 && v.h > 0.0);
        }
    }

    #[test]
    fn settles_near_target_after_many_half_lives() {
        let kfs = vec![Keyframe {
            t: 0.0,
            target_x: 960.0,
            target_y: 540.0,
            zoom_level: 2.0,
            transition: Transition::Smooth,
            spring_hint: Some(SpringHint {
                zoom_half_life: 0.1,
                pan_half_life: 0.1,
            }),
        }];
        let times: Vec<f64> = (0..120).map(|i| i as f64 * 16.0).collect();
        let vp = materialize_trajectory(kfs, screen(), &times);
        let last = vp.last().unwrap();
        let expected_w = 1920.0 / 2.0;
        assert!((last.w - expected_w).abs() < 1.0);
    }
}
