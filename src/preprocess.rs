//! Event preprocessor (spec §4.2): mouse-move decimation and drag inference.
//!
//! Grounded on the teacher's `rendering/cursor_interpolation.rs`
//! (`filter_cursor_shake`, `densify_cursor_moves`), generalized from
//! tremor suppression on an already-recorded path to decimating the raw
//! event stream itself and deriving drag spans from it.

use crate::model::{DragSpan, Event};

const DECIMATE_DISTANCE_PX: f64 = 3.0;
const PROTECTION_WINDOW_MS: f64 = 100.0;
const QUIET_GAP_MS: f64 = 200.0;
const DRAG_PATH_THRESHOLD_PX: f64 = 20.0;
const DRAG_FALLBACK_PATH_PX: f64 = 50.0;

/// Runs decimation and drag inference over a time-ordered event list.
///
/// Returns the decimated events (non-mouse-move events pass through
/// unchanged, the universal "decimation preserves semantics" property from
/// spec §8) plus the inferred drag spans.
pub fn preprocess(events: &[Event]) -> (Vec<Event>, Vec<DragSpan>) {
    let decimated = decimate(events);
    let drags = infer_drags(events);
    (decimated, drags)
}

fn is_significant(e: &Event) -> bool {
    matches!(
        e,
        Event::Click { .. } | Event::KeyPress { .. } | Event::Scroll { .. }
    )
}

fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

fn decimate(events: &[Event]) -> Vec<Event> {
    let mut out = Vec::with_capacity(events.len());
    let mut last_kept_move: Option<(f64, (f64, f64))> = None;
    let mut last_event_t: Option<f64> = None;

    for e in events {
        if !e.is_mouse_move() {
            out.push(e.clone());
            last_event_t = Some(e.t());
            continue;
        }

        let t = e.t();
        let pos = e.position().expect("mouse move always has a position");

        let within_protection = events.iter().any(|other| {
            is_significant(other) && (other.t() - t).abs() <= PROTECTION_WINDOW_MS
        });

        let after_quiet_gap = match last_event_t {
            Some(prev_t) => t - prev_t >= QUIET_GAP_MS,
            None => true,
        };

        let far_enough = match last_kept_move {
            Some((_, prev_pos)) => distance(prev_pos, pos) >= DECIMATE_DISTANCE_PX,
            None => true,
        };

        if far_enough || within_protection || after_quiet_gap {
            out.push(e.clone());
            last_kept_move = Some((t, pos));
        }

        last_event_t = Some(t);
    }

    out
}

/// Infers drag spans from Click/MouseMove/ClickRelease runs (spec §4.2).
fn infer_drags(events: &[Event]) -> Vec<DragSpan> {
    let mut drags = Vec::new();
    let mut i = 0;

    while i < events.len() {
        if let Event::Click {
            t: start_t,
            x,
            y,
            button,
            ..
        } = &events[i]
        {
            let start_pos = (*x, *y);
            let button = *button;
            let mut path_len = 0.0;
            let mut last_pos = start_pos;
            let mut release: Option<(f64, (f64, f64))> = None;
            let mut next_click: Option<f64> = None;

            let mut j = i + 1;
            while j < events.len() {
                match &events[j] {
                    Event::MouseMove { x, y, .. } => {
                        let pos = (*x, *y);
                        path_len += distance(last_pos, pos);
                        last_pos = pos;
                    }
                    Event::ClickRelease {
                        t, x, y, button: rb, ..
                    } if *rb == button => {
                        release = Some((*t, (*x, *y)));
                        break;
                    }
                    Event::Click { t, .. } => {
                        next_click = Some(*t);
                        break;
                    }
                    _ => {}
                }
                j += 1;
            }

            match release {
                Some((end_t, end_pos)) if path_len >= DRAG_PATH_THRESHOLD_PX => {
                    drags.push(DragSpan {
                        start_t: *start_t,
                        end_t,
                        start_pos,
                        end_pos,
                    });
                }
                None if path_len >= DRAG_FALLBACK_PATH_PX => {
                    if let Some(end_t) = next_click {
                        drags.push(DragSpan {
                            start_t: *start_t,
                            end_t,
                            start_pos,
                            end_pos: last_pos,
                        });
                    }
                }
                _ => {}
            }
        }
        i += 1;
    }

    drags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MouseButton;

    fn mv(t: f64, x: f64, y: f64) -> Event {
        Event::MouseMove { t, x, y }
    }

    fn click(t: f64, x: f64, y: f64) -> Event {
        Event::Click {
            t,
            button: MouseButton::Left,
            x,
            y,
        }
    }

    fn release(t: f64, x: f64, y: f64) -> Event {
        Event::ClickRelease {
            t,
            button: MouseButton::Left,
            x,
            y,
        }
    }

    #[test]
    fn decimation_preserves_non_mouse_move_events() {
        let events = vec![
            click(0.0, 1.0, 1.0),
            mv(10.0, 1.0, 1.0),
            mv(20.0, 1.1, 1.1),
            Event::KeyPress {
                t: 500.0,
                key: "a".into(),
                modifiers: Default::default(),
            },
        ];
        let (decimated, _) = preprocess(&events);
        let sig_before: Vec<_> = events.iter().filter(|e| !e.is_mouse_move()).collect();
        let sig_after: Vec<_> = decimated.iter().filter(|e| !e.is_mouse_move()).collect();
        assert_eq!(sig_before, sig_after);
    }

    #[test]
    fn tiny_moves_are_dropped() {
        let events = vec![mv(0.0, 0.0, 0.0), mv(10.0, 1.0, 0.0), mv(20.0, 2.0, 0.0)];
        let (decimated, _) = preprocess(&events);
        assert_eq!(decimated.len(), 1);
    }

    #[test]
    fn move_inside_protection_window_is_kept() {
        let events = vec![click(1000.0, 0.0, 0.0), mv(1050.0, 0.2, 0.0)];
        let (decimated, _) = preprocess(&events);
        assert_eq!(decimated.len(), 2);
    }

    #[test]
    fn drag_inference_from_click_release() {
        let events = vec![
            click(100.0, 200.0, 200.0),
            mv(300.0, 240.0, 210.0),
            mv(500.0, 260.0, 220.0),
            release(800.0, 280.0, 220.0),
        ];
        let (_, drags) = infer_drags_wrapper(&events);
        assert_eq!(drags.len(), 1);
        let d = drags[0];
        assert_eq!(d.start_t, 100.0);
        assert_eq!(d.end_t, 800.0);
        assert_eq!(d.start_pos, (200.0, 200.0));
        assert_eq!(d.end_pos, (280.0, 220.0));
    }

    fn infer_drags_wrapper(events: &[Event]) -> (Vec<Event>, Vec<DragSpan>) {
        (Vec::new(), infer_drags(events))
    }

    #[test]
    fn click_without_drag_yields_no_span() {
        let events = vec![click(100.0, 200.0, 200.0), release(150.0, 201.0, 200.0)];
        let (_, drags) = infer_drags_wrapper(&events);
        assert!(drags.is_empty());
    }
}
