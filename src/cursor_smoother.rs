//! Cursor smoother (spec §4.6): spring-filters the raw cursor path against
//! real inter-sample timestamps.
//!
//! Grounded on the teacher's `rendering/cursor_interpolation.rs`
//! (`get_smoothed_events`, shake filter), replacing its tension-based
//! `SpringProfile` presets with the spec's single half-life and
//! displacement/velocity pre-gate.

use crate::spring::Spring;

const CURSOR_HALF_LIFE_S: f64 = 0.05;
const MIN_DISPLACEMENT_PX: f64 = 2.0;
const MIN_VELOCITY_PX_PER_S: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorSample {
    pub t: f64,
    pub x: f64,
    pub y: f64,
}

/// Smooths a raw cursor path; output has the same length as input.
pub fn smooth_cursor(samples: &[CursorSample]) -> Vec<CursorSample> {
    if samples.is_empty() {
        return Vec::new();
    }

    let mut gated: Vec<CursorSample> = Vec::with_capacity(samples.len());
    gated.push(samples[0]);
    for i in 1..samples.len() {
        let prev = gated[i - 1];
        let cur = samples[i];
        let dt_s = ((cur.t - prev.t) / 1000.0).max(1e-6);
        let dist = ((cur.x - prev.x).powi(2) + (cur.y - prev.y).powi(2)).sqrt();
        let velocity = dist / dt_s;

        if dist < MIN_DISPLACEMENT_PX && velocity < MIN_VELOCITY_PX_PER_S {
            gated.push(CursorSample {
                t: cur.t,
                x: prev.x,
                y: prev.y,
            });
        } else {
            gated.push(cur);
        }
    }

    let mut sx = Spring::new(gated[0].x);
    let mut sy = Spring::new(gated[0].y);
    sx.target = gated[0].x;
    sy.target = gated[0].y;

    let mut out = Vec::with_capacity(gated.len());
    out.push(CursorSample {
        t: gated[0].t,
        x: sx.position,
        y: sy.position,
    });

    for i in 1..gated.len() {
        let dt_s = ((gated[i].t - gated[i - 1].t) / 1000.0).max(0.0);
        sx.target = gated[i].x;
        sy.target = gated[i].y;
        sx.update(CURSOR_HALF_LIFE_S, dt_s);
        sy.update(CURSOR_HALF_LIFE_S, dt_s);
        out.push(CursorSample {
            t: gated[i].t,
            x: sx.position,
            y: sy.position,
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(smooth_cursor(&[]).is_empty());
    }

    #[test]
    fn output_length_matches_input() {
        let samples: Vec<_> = (0..50)
            .map(|i| CursorSample {
                t: i as f64 * 16.0,
                x: i as f64,
                y: 0.0,
            })
            .collect();
        assert_eq!(smooth_cursor(&samples).len(), samples.len());
    }

    #[test]
    fn first_point_is_unchanged() {
        let samples = vec![
            CursorSample { t: 0.0, x: 10.0, y: 20.0 },
            CursorSample { t: 16.0, x: 12.0, y: 20.0 },
        ];
        let out = smooth_cursor(&samples);
        assert_eq!(out[0], samples[0]);
    }

    #[test]
    fn sub_threshold_jitter_is_suppressed() {
        let samples = vec![
            CursorSample { t: 0.0, x: 100.0, y: 100.0 },
            CursorSample { t: 16.0, x: 100.3, y: 100.2 },
            CursorSample { t: 33.0, x: 100.1, y: 100.4 },
        ];
        let out = smooth_cursor(&samples);
        // with sub-threshold gating, the spring target never moves, so the
        // smoothed path stays essentially fixed near the first sample.
        for s in &out {
            assert!((s.x - 100.0).abs() < 1.0);
            assert!((s.y - 100.0).abs() < 1.0);
        }
    }

    #[test]
    fn large_deliberate_motion_tracks_target_closely_over_time() {
        let mut samples = Vec::new();
        let mut t = 0.0;
        let mut x = 0.0;
        while t < 2000.0 {
            samples.push(CursorSample { t, x, y: 0.0 });
            t += 16.0;
            x += 20.0;
        }
        let out = smooth_cursor(&samples);
        let last_in = samples.last().unwrap();
        let last_out = out.last().unwrap();
        assert!((last_out.x - last_in.x).abs() < 50.0);
    }
}
