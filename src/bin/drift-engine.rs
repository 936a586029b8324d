//! CLI entry point, grounded on `prvnsmpth-glide`'s `clap::Parser` CLI
//! shape and on the teacher's `apps/cli` package (a thin binary invoking
//! the rendering/export crates directly, no Tauri runtime involved).

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;

use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use drift_engine::encoder::{EncoderConfig, FrameFormat};
use drift_engine::model::Keyframe;
use drift_engine::orchestrator::{self, Stage};
use drift_engine::settings::{AnimationSpeed, RecordingMode, Settings};

#[derive(Parser, Debug)]
#[command(name = "drift-engine", about = "Auto-zoom compositing engine for screen recordings")]
struct Args {
    /// Directory containing meta.json, events.jsonl, frames/, etc.
    recording_dir: PathBuf,

    /// Output video path, passed straight through to ffmpeg. Defaults to a
    /// timestamped file in the user's videos directory.
    output: Option<PathBuf>,

    /// Optional drift.toml settings file.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    no_auto_zoom: bool,

    #[arg(long)]
    max_zoom: Option<f64>,

    #[arg(long, value_enum)]
    speed: Option<SpeedArg>,

    #[arg(long)]
    zoom_out_idle_ms: Option<f64>,

    #[arg(long)]
    overview_idle_ms: Option<f64>,

    #[arg(long)]
    no_click_rings: bool,

    #[arg(long)]
    no_key_badges: bool,

    #[arg(long)]
    no_cursor_smoothing: bool,

    #[arg(long)]
    border_radius: Option<u32>,

    #[arg(long)]
    no_shadow: bool,

    #[arg(long, value_enum)]
    recording_mode: Option<RecordingModeArg>,

    #[arg(long, value_enum, default_value = "rgba")]
    encoder_format: EncoderFormatArg,

    #[arg(long)]
    fps: Option<u32>,

    /// Extra arguments forwarded verbatim to ffmpeg (e.g. "-crf 18").
    #[arg(long, value_delimiter = ' ')]
    ffmpeg_args: Vec<String>,

    /// Path to a JSON array of keyframes. When given, bypasses the scene
    /// splitter and zoom planner entirely and drives the viewport from
    /// this list instead (spec: "accepting an externally-supplied
    /// keyframe list").
    #[arg(long)]
    keyframes: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum SpeedArg {
    Slow,
    Mellow,
    Quick,
    Rapid,
}

impl From<SpeedArg> for AnimationSpeed {
    fn from(s: SpeedArg) -> Self {
        match s {
            SpeedArg::Slow => AnimationSpeed::Slow,
            SpeedArg::Mellow => AnimationSpeed::Mellow,
            SpeedArg::Quick => AnimationSpeed::Quick,
            SpeedArg::Rapid => AnimationSpeed::Rapid,
        }
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum RecordingModeArg {
    Display,
    Window,
    Area,
}

impl From<RecordingModeArg> for RecordingMode {
    fn from(m: RecordingModeArg) -> Self {
        match m {
            RecordingModeArg::Display => RecordingMode::Display,
            RecordingModeArg::Window => RecordingMode::Window,
            RecordingModeArg::Area => RecordingMode::Area,
        }
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum EncoderFormatArg {
    Rgba,
    Bmp,
}

/// Picks a default output path when the user doesn't name one, grounded on
/// the teacher's `commands/export.rs::resolve_output_path` (videos dir +
/// timestamped filename).
fn resolve_output_path() -> PathBuf {
    let dir = dirs_next::video_dir().unwrap_or_else(std::env::temp_dir);
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    dir.join(format!("drift-{}.mp4", stamp))
}

fn apply_overrides(settings: &mut Settings, args: &Args) {
    if args.no_auto_zoom {
        settings.auto_zoom_enabled = false;
    }
    if let Some(v) = args.max_zoom {
        settings.max_zoom = v;
    }
    if let Some(v) = args.speed {
        settings.animation_speed = v.into();
    }
    if let Some(v) = args.zoom_out_idle_ms {
        settings.zoom_out_idle_ms = v;
    }
    if let Some(v) = args.overview_idle_ms {
        settings.overview_idle_ms = v;
    }
    if args.no_click_rings {
        settings.click_ring_enabled = false;
    }
    if args.no_key_badges {
        settings.key_badge_enabled = false;
    }
    if args.no_cursor_smoothing {
        settings.cursor_smoothing = false;
    }
    if let Some(v) = args.border_radius {
        settings.border_radius = v;
    }
    if args.no_shadow {
        settings.shadow_enabled = false;
    }
    if let Some(v) = args.recording_mode {
        settings.recording_mode = v.into();
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut settings = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config file {}", path.display()))?;
            Settings::load_from_str(&text)?
        }
        None => Settings::default(),
    };
    apply_overrides(&mut settings, &args);

    let format = match args.encoder_format {
        EncoderFormatArg::Rgba => FrameFormat::Rgba,
        EncoderFormatArg::Bmp => FrameFormat::Bmp,
    };

    let output_path = args.output.clone().unwrap_or_else(resolve_output_path);

    let encoder_config = EncoderConfig {
        output_path: output_path.clone(),
        fps: args.fps.unwrap_or(30),
        width: settings.output_width,
        height: settings.output_height,
        format,
        extra_args: args.ffmpeg_args.clone(),
    };

    let keyframe_override = match &args.keyframes {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading keyframes file {}", path.display()))?;
            let kfs: Vec<Keyframe> = serde_json::from_str(&text)
                .with_context(|| format!("parsing keyframes file {}", path.display()))?;
            Some(kfs)
        }
        None => None,
    };

    let cancel = Arc::new(AtomicBool::new(false));
    let (tx, rx) = std::sync::mpsc::channel();

    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    let bar_handle = bar.clone();
    let reporter = thread::spawn(move || {
        for update in rx {
            let (label, frac) = match update.stage {
                Stage::Composing => ("compositing", update.progress),
                Stage::Encoding => ("encoding", update.progress),
                Stage::Complete => ("done", 1.0),
            };
            bar_handle.set_position((frac * 100.0) as u64);
            bar_handle.set_message(label);
        }
    });

    let result = orchestrator::run_job_with_keyframes(
        &args.recording_dir,
        &settings,
        encoder_config,
        cancel,
        Some(tx),
        keyframe_override,
    )
    .context("compositing job failed");
    let _ = reporter.join();
    result?;
    bar.finish_with_message("complete");

    println!("wrote {}", output_path.display());
    Ok(())
}
