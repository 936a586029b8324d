//! Core data model (spec §3): events, derived activity points, scenes,
//! and the sparse keyframe list that drives the viewport integrator.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Ctrl,
    Shift,
    Alt,
    Meta,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

pub type Rect = (f64, f64, f64, f64);

/// A tagged record from `events.jsonl`, globally time-ordered (spec §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    MouseMove {
        t: f64,
        x: f64,
        y: f64,
    },
    Click {
        t: f64,
        button: MouseButton,
        x: f64,
        y: f64,
    },
    ClickRelease {
        t: f64,
        button: MouseButton,
        x: f64,
        y: f64,
    },
    KeyPress {
        t: f64,
        key: String,
        #[serde(default)]
        modifiers: HashSet<Modifier>,
    },
    Scroll {
        t: f64,
        x: f64,
        y: f64,
        dx: f64,
        dy: f64,
    },
    WindowFocus {
        t: f64,
        title: String,
        rect: Rect,
    },
}

impl Event {
    pub fn t(&self) -> f64 {
        match self {
            Event::MouseMove { t, .. } => *t,
            Event::Click { t, .. } => *t,
            Event::ClickRelease { t, .. } => *t,
            Event::KeyPress { t, .. } => *t,
            Event::Scroll { t, .. } => *t,
            Event::WindowFocus { t, .. } => *t,
        }
    }

    pub fn is_mouse_move(&self) -> bool {
        matches!(self, Event::MouseMove { .. })
    }

    pub fn position(&self) -> Option<(f64, f64)> {
        match self {
            Event::MouseMove { x, y, .. }
            | Event::Click { x, y, .. }
            | Event::ClickRelease { x, y, .. }
            | Event::Scroll { x, y, .. } => Some((*x, *y)),
            Event::KeyPress { .. } | Event::WindowFocus { .. } => None,
        }
    }
}

/// A derived drag gesture; not persisted with raw events (spec §4.2).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSpan {
    pub start_t: f64,
    pub end_t: f64,
    pub start_pos: (f64, f64),
    pub end_pos: (f64, f64),
}

/// A time-and-place projection of a semantically meaningful event,
/// consumed by the scene splitter (spec §4.3).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivityPoint {
    pub t: f64,
    pub x: f64,
    pub y: f64,
    pub window_rect: Option<Rect>,
}

/// A maximal time interval of semantically related activity (spec §3).
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub id: usize,
    pub start_t: f64,
    pub end_t: f64,
    pub bbox: Rect,
    pub center: (f64, f64),
    pub zoom_level: f64,
    pub window_rect: Option<Rect>,
    pub event_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    SpringIn,
    SpringOut,
    Smooth,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpringHint {
    pub zoom_half_life: f64,
    pub pan_half_life: f64,
}

/// A sparse control point consumed by the viewport integrator (spec §4.5).
/// Also the wire shape for an externally-supplied keyframe list that
/// bypasses the scene splitter and zoom planner (spec §1, §12).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub t: f64,
    pub target_x: f64,
    pub target_y: f64,
    pub zoom_level: f64,
    pub transition: Transition,
    pub spring_hint: Option<SpringHint>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenSize {
    pub width: f64,
    pub height: f64,
}

impl ScreenSize {
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }
}
