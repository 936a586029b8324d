//! Orchestrator (spec §5, §6): walks frames, interleaves the single-
//! threaded spring sweep with per-frame compositing, and feeds rendered
//! frames to the external encoder subprocess.
//!
//! Grounded on the teacher's `commands/export.rs::export_composited_mp4`
//! (render-then-pipe-to-ffmpeg loop), split here into a pure
//! precomputation phase (preprocessor/splitter/planner/smoother, safely
//! parallelizable per spec §5) followed by a sequential spring sweep and
//! a parallel compositing phase.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use image::RgbaImage;
use log::info;
use rayon::prelude::*;

use crate::compositor::{self, ActiveBadge, ActiveRing, CursorFrameState, FrameCaches};
use crate::cursor_smoother::{self, CursorSample};
use crate::encoder::{EncoderConfig, EncoderProcess};
use crate::error::{EngineError, Result};
use crate::io::recording::Recording;
use crate::model::{Event, Keyframe, MouseButton, Viewport};
use crate::preprocess;
use crate::scene;
use crate::settings::Settings;
use crate::viewport::materialize_trajectory;
use crate::zoom_planner;

/// Progress published through an optional channel (spec §6):
/// `{stage, progress, output_path?}`.
#[derive(Debug, Clone)]
pub struct Progress {
    pub stage: Stage,
    pub progress: f32,
    pub output_path: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Composing,
    Encoding,
    Complete,
}

pub type ProgressSink = std::sync::mpsc::Sender<Progress>;

struct Plan {
    viewports: Vec<Viewport>,
    cursor: Vec<CursorSample>,
    rings: Vec<ActiveRing>,
    badges: Vec<ActiveBadge>,
}

/// Runs every pure precomputation stage. Safe to call from any thread;
/// does not touch shared mutable state (spec §5).
///
/// `keyframe_override`, when given, bypasses the scene splitter and zoom
/// planner entirely and is used verbatim (spec §1 / §12: "no manual
/// timeline editing semantics beyond accepting an externally-supplied
/// keyframe list" — this is that acceptance point).
fn precompute(
    recording: &Recording,
    settings: &Settings,
    keyframe_override: Option<Vec<Keyframe>>,
) -> Result<Plan> {
    let (preprocessed, _drags) = preprocess::preprocess(&recording.events);

    let keyframes = match keyframe_override {
        Some(kfs) => kfs,
        None => {
            let mut all_events: Vec<Event> = preprocessed.clone();
            all_events.extend(recording.window_events.iter().cloned());
            all_events.sort_by(|a, b| a.t().partial_cmp(&b.t()).unwrap_or(std::cmp::Ordering::Equal));

            let scenes = scene::split_scenes(&all_events, recording.screen_size(), settings.max_zoom);
            zoom_planner::plan_keyframes(
                &scenes,
                recording.meta.duration_ms,
                recording.screen_size(),
                settings,
            )
        }
    };

    let frame_times = recording.frame_timestamps();
    if frame_times
        .windows(2)
        .any(|w| w[1] < w[0])
    {
        return Err(EngineError::internal("non-monotonic frame timestamps"));
    }

    let viewports = materialize_trajectory(keyframes, recording.screen_size(), &frame_times);

    let raw_cursor: Vec<CursorSample> = preprocessed
        .iter()
        .filter_map(|e| e.position().map(|(x, y)| CursorSample { t: e.t(), x, y }))
        .collect();
    let cursor = if settings.cursor_smoothing {
        cursor_smoother::smooth_cursor(&raw_cursor)
    } else {
        raw_cursor
    };

    let rings = if settings.click_ring_enabled {
        preprocessed
            .iter()
            .filter_map(|e| match e {
                Event::Click { t, x, y, .. } => Some(ActiveRing { x: *x, y: *y, click_t: *t }),
                _ => None,
            })
            .collect()
    } else {
        Vec::new()
    };

    let badges = if settings.key_badge_enabled {
        preprocessed
            .iter()
            .filter_map(|e| match e {
                Event::KeyPress { t, key, modifiers } => {
                    let has_modifier = !modifiers.is_empty();
                    let special = compositor::badge_is_special_key(key);
                    if has_modifier || special {
                        let label = compositor::badge_format_label(
                            key,
                            modifiers.contains(&crate::model::Modifier::Ctrl),
                            modifiers.contains(&crate::model::Modifier::Shift),
                            modifiers.contains(&crate::model::Modifier::Alt),
                            modifiers.contains(&crate::model::Modifier::Meta),
                        );
                        Some(ActiveBadge { label, start_t: *t })
                    } else {
                        None
                    }
                }
                _ => None,
            })
            .collect()
    } else {
        Vec::new()
    };

    Ok(Plan {
        viewports,
        cursor,
        rings,
        badges,
    })
}

fn cursor_at(cursor: &[CursorSample], t: f64) -> Option<CursorSample> {
    if cursor.is_empty() {
        return None;
    }
    match cursor.binary_search_by(|s| s.t.partial_cmp(&t).unwrap_or(std::cmp::Ordering::Equal)) {
        Ok(i) => Some(cursor[i]),
        Err(0) => Some(cursor[0]),
        Err(i) if i >= cursor.len() => Some(cursor[cursor.len() - 1]),
        Err(i) => {
            let a = cursor[i - 1];
            let b = cursor[i];
            if (t - a.t).abs() <= (b.t - t).abs() {
                Some(a)
            } else {
                Some(b)
            }
        }
    }
}

fn clicking_at(events: &[Event], t: f64) -> bool {
    let mut down: Option<MouseButton> = None;
    for e in events {
        if e.t() > t {
            break;
        }
        match e {
            Event::Click { button, .. } => down = Some(*button),
            Event::ClickRelease { button, .. } if Some(*button) == down => down = None,
            _ => {}
        }
    }
    down.is_some()
}

/// Runs the full job: precompute, sweep, composite, encode.
///
/// `keyframe_override` lets a caller hand in its own keyframe list
/// (e.g. from a manual timeline edit upstream), bypassing the scene
/// splitter and zoom planner for this job only (spec §1, §12).
pub fn run_job(
    recording_dir: &Path,
    settings: &Settings,
    encoder_config: EncoderConfig,
    cancel: Arc<AtomicBool>,
    progress: Option<ProgressSink>,
) -> Result<()> {
    run_job_with_keyframes(recording_dir, settings, encoder_config, cancel, progress, None)
}

/// As [`run_job`], but accepts an explicit keyframe override.
pub fn run_job_with_keyframes(
    recording_dir: &Path,
    settings: &Settings,
    encoder_config: EncoderConfig,
    cancel: Arc<AtomicBool>,
    progress: Option<ProgressSink>,
    keyframe_override: Option<Vec<Keyframe>>,
) -> Result<()> {
    let recording = crate::io::recording::load_recording(recording_dir)?;
    let plan = precompute(&recording, settings, keyframe_override)?;
    let frame_times = recording.frame_timestamps();
    let caches = FrameCaches::build(settings);

    let total = frame_times.len().max(1);
    let composited: Vec<Result<RgbaImage>> = frame_times
        .par_iter()
        .enumerate()
        .map(|(i, &t)| {
            if cancel.load(Ordering::SeqCst) {
                return Err(EngineError::Cancelled);
            }
            let frame_path = recording.frame_path(i as u32);
            let source = image::open(&frame_path)
                .map_err(|_| EngineError::AssetMissing { path: frame_path.clone() })?
                .to_rgba8();

            let cursor = cursor_at(&plan.cursor, t).map(|sample| CursorFrameState {
                sample,
                zoom: plan.viewports[i].w.recip() * recording.screen_size().width,
                clicking: clicking_at(&recording.events, t),
            });

            let active_badge = plan.badges.iter().find(|b| b.is_active(t));

            let frame = compositor::composite_frame(
                t,
                &source,
                plan.viewports[i],
                cursor,
                &plan.rings,
                active_badge,
                settings,
                &caches,
            );
            Ok(frame)
        })
        .collect();

    if let Some(sink) = &progress {
        let _ = sink.send(Progress {
            stage: Stage::Composing,
            progress: 1.0,
            output_path: None,
        });
    }

    let ffmpeg = crate::encoder::find_ffmpeg()
        .ok_or_else(|| EngineError::EncoderFailure { detail: "ffmpeg not found".into() })?;
    let output_display = encoder_config.output_path.display().to_string();
    let mut encoder = EncoderProcess::spawn(&ffmpeg, encoder_config, Arc::clone(&cancel))?;

    for (i, frame) in composited.into_iter().enumerate() {
        if cancel.load(Ordering::SeqCst) {
            encoder.abort();
            return Err(EngineError::Cancelled);
        }
        let frame = frame?;
        encoder.write_frame(&frame)?;
        if let Some(sink) = &progress {
            let _ = sink.send(Progress {
                stage: Stage::Encoding,
                progress: (i + 1) as f32 / total as f32,
                output_path: None,
            });
        }
    }

    encoder.finish()?;
    info!("job complete: {}", output_display);
    if let Some(sink) = &progress {
        let _ = sink.send(Progress {
            stage: Stage::Complete,
            progress: 1.0,
            output_path: Some(output_display),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_at_picks_nearest_sample() {
        let samples = vec![
            CursorSample { t: 0.0, x: 0.0, y: 0.0 },
            CursorSample { t: 100.0, x: 10.0, y: 10.0 },
            CursorSample { t: 200.0, x: 20.0, y: 20.0 },
        ];
        let s = cursor_at(&samples, 150.0).unwrap();
        assert_eq!(s.t, 200.0);
    }

    #[test]
    fn cursor_at_empty_is_none() {
        assert!(cursor_at(&[], 10.0).is_none());
    }

    #[test]
    fn clicking_at_tracks_button_state() {
        let events = vec![
            Event::Click { t: 0.0, button: MouseButton::Left, x: 0.0, y: 0.0 },
            Event::ClickRelease { t: 100.0, button: MouseButton::Left, x: 0.0, y: 0.0 },
        ];
        assert!(clicking_at(&events, 50.0));
        assert!(!clicking_at(&events, 150.0));
    }

    fn fixture_recording() -> crate::io::recording::Recording {
        use crate::io::recording::RecordingMeta;
        crate::io::recording::Recording {
            meta: RecordingMeta {
                version: 1,
                id: "fixture".into(),
                screen_width: 1920,
                screen_height: 1080,
                fps: 30,
                duration_ms: 1000.0,
                has_audio: false,
                recording_dir: String::new(),
            },
            events: vec![Event::Click { t: 200.0, button: MouseButton::Left, x: 300.0, y: 300.0 }],
            window_events: Vec::new(),
            frame_count: 10,
            dimensions: (1920, 1080),
            dir: std::path::PathBuf::new(),
        }
    }

    #[test]
    fn keyframe_override_bypasses_scene_splitter_and_planner() {
        let recording = fixture_recording();
        let settings = Settings::default();

        let overridden = vec![crate::model::Keyframe {
            t: 0.0,
            target_x: 960.0,
            target_y: 540.0,
            zoom_level: 2.0,
            transition: crate::model::Transition::Smooth,
            spring_hint: None,
        }];

        let plan = precompute(&recording, &settings, Some(overridden)).unwrap();
        // With the override, the trajectory converges toward the override's
        // target/zoom, not the click at (300, 300) the scene splitter would
        // have produced on its own.
        let last = plan.viewports.last().unwrap();
        let cx = last.x + last.w / 2.0;
        assert!((cx - 960.0).abs() < (cx - 300.0).abs());
    }
}
