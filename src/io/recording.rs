//! Recording artifact loader (spec §6): `meta.json`, `events.jsonl`,
//! `window_events.jsonl`, `frames/frame_NNNNNNNN.png`, `frame_count.txt`,
//! `dimensions.txt`.
//!
//! Malformed individual event lines are `InputInvalid` and recovered
//! locally (discarded + logged); a missing or unparseable required
//! artifact (`meta.json`, `dimensions.txt`, `frame_count.txt`) propagates
//! as a fatal `InputInvalid` (spec §7).

use std::fs;
use std::path::{Path, PathBuf};

use log::warn;
use serde::Deserialize;

use crate::error::{EngineError, Result};
use crate::model::{Event, ScreenSize};

#[derive(Debug, Clone, Deserialize)]
pub struct RecordingMeta {
    pub version: i64,
    pub id: String,
    pub screen_width: u32,
    pub screen_height: u32,
    #[serde(default)]
    pub fps: u32,
    pub duration_ms: f64,
    #[serde(default)]
    pub has_audio: bool,
    #[serde(default)]
    pub recording_dir: String,
}

pub struct Recording {
    pub meta: RecordingMeta,
    pub events: Vec<Event>,
    pub window_events: Vec<Event>,
    pub frame_count: u32,
    pub dimensions: (u32, u32),
    pub dir: PathBuf,
}

impl Recording {
    pub fn screen_size(&self) -> ScreenSize {
        ScreenSize {
            width: self.dimensions.0 as f64,
            height: self.dimensions.1 as f64,
        }
    }

    /// Effective frame timestamps: `t_i = i * duration_ms / frame_count`,
    /// not the nominal fps (spec §6).
    pub fn frame_timestamps(&self) -> Vec<f64> {
        if self.frame_count == 0 {
            return Vec::new();
        }
        (0..self.frame_count)
            .map(|i| i as f64 * self.meta.duration_ms / self.frame_count as f64)
            .collect()
    }

    pub fn frame_path(&self, index: u32) -> PathBuf {
        self.dir.join("frames").join(format!("frame_{:08}.png", index + 1))
    }
}

pub fn load_recording(dir: &Path) -> Result<Recording> {
    let meta_path = dir.join("meta.json");
    let meta_text = fs::read_to_string(&meta_path)
        .map_err(|e| EngineError::input_invalid("meta.json", e.to_string()))?;
    let meta: RecordingMeta = serde_json::from_str(&meta_text)
        .map_err(|e| EngineError::input_invalid("meta.json", e.to_string()))?;

    let dims_path = dir.join("dimensions.txt");
    let dims_text = fs::read_to_string(&dims_path)
        .map_err(|e| EngineError::input_invalid("dimensions.txt", e.to_string()))?;
    let dimensions = parse_dimensions(&dims_text)?;

    let count_path = dir.join("frame_count.txt");
    let count_text = fs::read_to_string(&count_path)
        .map_err(|e| EngineError::input_invalid("frame_count.txt", e.to_string()))?;
    let frame_count: u32 = count_text
        .trim()
        .parse()
        .map_err(|_| EngineError::input_invalid("frame_count.txt", "not an integer"))?;

    let events = load_jsonl_events(&dir.join("events.jsonl"), true)?;
    let window_events = load_jsonl_events(&dir.join("window_events.jsonl"), false)?;

    Ok(Recording {
        meta,
        events,
        window_events,
        frame_count,
        dimensions,
        dir: dir.to_path_buf(),
    })
}

fn parse_dimensions(text: &str) -> Result<(u32, u32)> {
    let text = text.trim();
    let (w, h) = text
        .split_once('x')
        .or_else(|| text.split_once('X'))
        .ok_or_else(|| EngineError::input_invalid("dimensions.txt", "expected WxH"))?;
    let w: u32 = w
        .trim()
        .parse()
        .map_err(|_| EngineError::input_invalid("dimensions.txt", "bad width"))?;
    let h: u32 = h
        .trim()
        .parse()
        .map_err(|_| EngineError::input_invalid("dimensions.txt", "bad height"))?;
    Ok((w, h))
}

/// Loads a JSONL file of events, tolerating malformed lines when
/// `required` is false (the file itself is optional, per spec §6).
fn load_jsonl_events(path: &Path, required: bool) -> Result<Vec<Event>> {
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) => {
            if required {
                return Err(EngineError::input_invalid(
                    path.display().to_string(),
                    e.to_string(),
                ));
            }
            return Ok(Vec::new());
        }
    };

    let mut events = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Event>(line) {
            Ok(event) => events.push(event),
            Err(e) => {
                warn!(
                    "discarding malformed event at {}:{}: {}",
                    path.display(),
                    lineno + 1,
                    e
                );
            }
        }
    }
    Ok(events)
}
