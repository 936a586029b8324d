//! Scene splitter (spec §4.3): the semantically hardest stage. Turns a
//! preprocessed event stream into a list of time-disjoint scenes.
//!
//! Grounded on NeuroScreenCaster's `auto_zoom.rs` clustering approach
//! (temporal + spatial thresholds over projected activity points, bbox
//! union/expand/clamp), generalized here into the spec's 4-step pipeline.

use crate::model::{ActivityPoint, Event, Rect, Scene, ScreenSize};
use std::collections::HashMap;

const KEY_CLICK_LOOKBACK_MS: f64 = 2_000.0;
const GROUP_GAP_MS: f64 = 1_500.0;
const RECT_EQUAL_TOLERANCE_PX: f64 = 50.0;
const BBOX_PADDING_PX: f64 = 80.0;
const BBOX_MIN_SIZE_PX: f64 = 200.0;
const SPLIT_AREA_FRACTION: f64 = 0.5;
const SPLIT_TIME_GAP_MS: f64 = 500.0;
const SPLIT_SPATIAL_GAP_PX: f64 = 400.0;
const MIN_ZOOM: f64 = 1.2;

/// Step 1 — project events onto activity points (spec §4.3 step 1).
pub fn extract_activity_points(events: &[Event]) -> Vec<ActivityPoint> {
    let mut points = Vec::new();
    let mut active_window: Option<Rect> = None;
    let mut last_click: Option<(f64, (f64, f64))> = None;

    for e in events {
        match e {
            Event::Click { t, x, y, .. } | Event::ClickRelease { t, x, y, .. } => {
                points.push(ActivityPoint {
                    t: *t,
                    x: *x,
                    y: *y,
                    window_rect: active_window,
                });
                if matches!(e, Event::Click { .. }) {
                    last_click = Some((*t, (*x, *y)));
                }
            }
            Event::Scroll { t, x, y, .. } => {
                points.push(ActivityPoint {
                    t: *t,
                    x: *x,
                    y: *y,
                    window_rect: active_window,
                });
            }
            Event::KeyPress { t, .. } => {
                let pos = match last_click {
                    Some((click_t, pos)) if *t - click_t <= KEY_CLICK_LOOKBACK_MS => Some(pos),
                    _ => active_window.map(|(x, y, w, h)| (x + w / 2.0, y + h / 2.0)),
                };
                if let Some((x, y)) = pos {
                    points.push(ActivityPoint {
                        t: *t,
                        x,
                        y,
                        window_rect: active_window,
                    });
                }
            }
            Event::WindowFocus { rect, .. } => {
                active_window = Some(*rect);
            }
            Event::MouseMove { .. } => {}
        }
    }

    points
}

fn rects_equal(a: Rect, b: Rect) -> bool {
    (a.0 - b.0).abs() <= RECT_EQUAL_TOLERANCE_PX
        && (a.1 - b.1).abs() <= RECT_EQUAL_TOLERANCE_PX
        && (a.0 + a.2 - (b.0 + b.2)).abs() <= RECT_EQUAL_TOLERANCE_PX
        && (a.1 + a.3 - (b.1 + b.3)).abs() <= RECT_EQUAL_TOLERANCE_PX
}

/// Step 2 — temporal/window grouping (spec §4.3 step 2).
fn group_by_time_and_window(points: &[ActivityPoint]) -> Vec<Vec<ActivityPoint>> {
    let mut groups: Vec<Vec<ActivityPoint>> = Vec::new();

    for &p in points {
        let start_new = match groups.last().and_then(|g| g.last()) {
            None => false,
            Some(prev) => {
                let gap = p.t - prev.t;
                let window_changed = match (prev.window_rect, p.window_rect) {
                    (Some(a), Some(b)) => !rects_equal(a, b),
                    (None, None) => false,
                    _ => true,
                };
                gap >= GROUP_GAP_MS || window_changed
            }
        };

        if start_new || groups.is_empty() {
            groups.push(vec![p]);
        } else {
            groups.last_mut().unwrap().push(p);
        }
    }

    groups
}

fn padded_bbox(points: &[ActivityPoint]) -> Rect {
    let min_x = points.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
    let max_x = points.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
    let min_y = points.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
    let max_y = points.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);

    let x0 = min_x - BBOX_PADDING_PX;
    let y0 = min_y - BBOX_PADDING_PX;
    let mut w = (max_x - min_x) + 2.0 * BBOX_PADDING_PX;
    let mut h = (max_y - min_y) + 2.0 * BBOX_PADDING_PX;
    let mut x0 = x0;
    let mut y0 = y0;

    if w < BBOX_MIN_SIZE_PX {
        let cx = x0 + w / 2.0;
        w = BBOX_MIN_SIZE_PX;
        x0 = cx - w / 2.0;
    }
    if h < BBOX_MIN_SIZE_PX {
        let cy = y0 + h / 2.0;
        h = BBOX_MIN_SIZE_PX;
        y0 = cy - h / 2.0;
    }

    (x0, y0, w, h)
}

/// Step 3 — spatial sub-splitting of oversized groups (spec §4.3 step 3).
fn spatial_subsplit(group: Vec<ActivityPoint>, screen: ScreenSize) -> Vec<Vec<ActivityPoint>> {
    let bbox = padded_bbox(&group);
    if bbox.2 * bbox.3 <= SPLIT_AREA_FRACTION * screen.area() || group.len() < 2 {
        return vec![group];
    }

    for i in 1..group.len() {
        let (prev, next) = (group[i - 1], group[i]);
        let time_gap = next.t - prev.t;
        let spatial_gap = ((next.x - prev.x).powi(2) + (next.y - prev.y).powi(2)).sqrt();
        if time_gap >= SPLIT_TIME_GAP_MS && spatial_gap >= SPLIT_SPATIAL_GAP_PX {
            let (left, right) = group.split_at(i);
            let mut out = spatial_subsplit(left.to_vec(), screen);
            out.extend(spatial_subsplit(right.to_vec(), screen));
            return out;
        }
    }

    // No split point found; degrade to a single oversized scene.
    vec![group]
}

fn most_common_window(group: &[ActivityPoint]) -> Option<Rect> {
    let mut counts: HashMap<(i64, i64, i64, i64), (Rect, usize)> = HashMap::new();
    for p in group {
        if let Some(r) = p.window_rect {
            let key = (r.0 as i64, r.1 as i64, r.2 as i64, r.3 as i64);
            let entry = counts.entry(key).or_insert((r, 0));
            entry.1 += 1;
        }
    }
    counts.into_values().max_by_key(|(_, c)| *c).map(|(r, _)| r)
}

/// Step 4 — derive per-scene fields (spec §4.3 step 4).
fn finalize_scene(id: usize, group: Vec<ActivityPoint>, screen: ScreenSize, max_zoom: f64) -> Scene {
    let bbox = padded_bbox(&group);
    let center = (bbox.0 + bbox.2 / 2.0, bbox.1 + bbox.3 / 2.0);
    let zoom_level = (screen.width / bbox.2)
        .min(screen.height / bbox.3)
        .clamp(MIN_ZOOM, max_zoom);

    let start_t = group.iter().map(|p| p.t).fold(f64::INFINITY, f64::min);
    let end_t = group.iter().map(|p| p.t).fold(f64::NEG_INFINITY, f64::max);

    Scene {
        id,
        start_t,
        end_t,
        bbox,
        center,
        zoom_level,
        window_rect: most_common_window(&group),
        event_count: group.len(),
    }
}

/// Runs the full 4-step splitter. Empty input yields an empty scene list
/// (spec §4.3 "failure modes").
pub fn split_scenes(events: &[Event], screen: ScreenSize, max_zoom: f64) -> Vec<Scene> {
    let points = extract_activity_points(events);
    if points.is_empty() {
        return Vec::new();
    }

    let groups = group_by_time_and_window(&points);
    let mut scenes = Vec::new();
    let mut id = 0;
    for group in groups {
        for sub in spatial_subsplit(group, screen) {
            if sub.is_empty() {
                continue;
            }
            scenes.push(finalize_scene(id, sub, screen, max_zoom));
            id += 1;
        }
    }
    scenes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MouseButton;

    fn screen() -> ScreenSize {
        ScreenSize {
            width: 1920.0,
            height: 1080.0,
        }
    }

    fn click(t: f64, x: f64, y: f64) -> Event {
        Event::Click {
            t,
            button: MouseButton::Left,
            x,
            y,
        }
    }

    #[test]
    fn empty_events_yield_empty_scenes() {
        assert!(split_scenes(&[], screen(), 3.0).is_empty());
    }

    #[test]
    fn single_click_scene_clamps_zoom() {
        let events = vec![click(500.0, 500.0, 300.0)];
        let scenes = split_scenes(&events, screen(), 3.0);
        assert_eq!(scenes.len(), 1);
        let s = &scenes[0];
        assert_eq!(s.zoom_level, 3.0);
        assert!(s.bbox.2 >= BBOX_MIN_SIZE_PX);
        assert!(s.bbox.0 <= 500.0 && s.bbox.0 + s.bbox.2 >= 500.0);
    }

    #[test]
    fn scenes_are_time_disjoint_and_cover_every_point() {
        let events = vec![
            click(0.0, 100.0, 100.0),
            click(3_000.0, 1500.0, 800.0),
        ];
        let scenes = split_scenes(&events, screen(), 3.0);
        assert_eq!(scenes.len(), 2);
        assert!(scenes[0].end_t <= scenes[1].start_t);
    }

    #[test]
    fn large_time_gap_produces_one_new_group_per_gap() {
        let events = vec![
            click(0.0, 100.0, 100.0),
            click(100.0, 110.0, 110.0),
            click(5_000.0, 1800.0, 900.0),
        ];
        let scenes = split_scenes(&events, screen(), 3.0);
        assert_eq!(scenes.len(), 2);
        assert_eq!(scenes[0].event_count, 2);
        assert_eq!(scenes[1].event_count, 1);
    }

    #[test]
    fn terminal_key_input_uses_window_rect_center() {
        let events = vec![
            Event::WindowFocus {
                t: 0.0,
                title: "term".into(),
                rect: (100.0, 100.0, 800.0, 600.0),
            },
            Event::KeyPress {
                t: 3_000.0,
                key: "a".into(),
                modifiers: Default::default(),
            },
            Event::KeyPress {
                t: 3_500.0,
                key: "b".into(),
                modifiers: Default::default(),
            },
        ];
        let scenes = split_scenes(&events, screen(), 3.0);
        assert_eq!(scenes.len(), 1);
        assert_eq!(scenes[0].center, (500.0, 400.0));
    }
}
