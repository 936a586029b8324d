//! Encoder subprocess (spec §6): the final video encoder is strictly an
//! external collaborator behind an IO boundary. The core writes raw RGBA
//! or BMP frames to its stdin and reads back only an exit status and
//! captured stderr.
//!
//! Grounded on the teacher's `commands/export.rs` (`find_ffmpeg`,
//! `detect_encoder`, the `Stdio::piped()` stdin write loop), adapted to
//! the spec's `EncoderFailure`/`Cancelled` error kinds and cooperative
//! cancellation between frames.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use image::RgbaImage;
use log::{info, warn};

use crate::error::{EngineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFormat {
    Rgba,
    Bmp,
}

pub struct EncoderConfig {
    pub output_path: PathBuf,
    pub fps: u32,
    pub width: u32,
    pub height: u32,
    pub format: FrameFormat,
    pub extra_args: Vec<String>,
}

/// Locates an `ffmpeg` binary, trying `PATH` first and a short list of
/// common install locations, matching the teacher's `find_ffmpeg`.
pub fn find_ffmpeg() -> Option<PathBuf> {
    if Command::new("ffmpeg").arg("-version").output().is_ok() {
        return Some(PathBuf::from("ffmpeg"));
    }
    let candidates = [
        "/usr/bin/ffmpeg",
        "/usr/local/bin/ffmpeg",
        "/opt/homebrew/bin/ffmpeg",
        "C:\\ffmpeg\\bin\\ffmpeg.exe",
    ];
    candidates
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
}

pub struct EncoderProcess {
    child: Child,
    config: EncoderConfig,
    cancel: Arc<AtomicBool>,
}

impl EncoderProcess {
    pub fn spawn(ffmpeg: &PathBuf, config: EncoderConfig, cancel: Arc<AtomicBool>) -> Result<Self> {
        let pix_fmt = match config.format {
            FrameFormat::Rgba => "rgba",
            FrameFormat::Bmp => "bmp",
        };
        let input_format: &str = match config.format {
            FrameFormat::Rgba => "rawvideo",
            FrameFormat::Bmp => "image2pipe",
        };

        let mut cmd = Command::new(ffmpeg);
        cmd.arg("-y")
            .arg("-f")
            .arg(input_format)
            .arg("-pix_fmt")
            .arg(pix_fmt)
            .arg("-s")
            .arg(format!("{}x{}", config.width, config.height))
            .arg("-r")
            .arg(config.fps.to_string())
            .arg("-i")
            .arg("-")
            .args(&config.extra_args)
            .arg(&config.output_path)
            .stdin(Stdio::piped())
            .stderr(Stdio::piped());

        let child = cmd
            .spawn()
            .map_err(|e| EngineError::EncoderFailure { detail: format!("spawn failed: {e}") })?;

        Ok(EncoderProcess { child, config, cancel })
    }

    /// Writes one frame. Raw RGBA is piped as-is; BMP frames are encoded
    /// in-memory before writing, matching the teacher's choice of BMP
    /// over PNG historically for throughput (spec §6).
    pub fn write_frame(&mut self, frame: &RgbaImage) -> Result<()> {
        if self.cancel.load(Ordering::SeqCst) {
            return Err(EngineError::Cancelled);
        }

        let stdin = self
            .child
            .stdin
            .as_mut()
            .ok_or_else(|| EngineError::EncoderFailure { detail: "stdin closed".into() })?;

        match self.config.format {
            FrameFormat::Rgba => {
                stdin
                    .write_all(frame.as_raw())
                    .map_err(|e| EngineError::EncoderFailure { detail: format!("pipe write failed: {e}") })?;
            }
            FrameFormat::Bmp => {
                let mut buf = Vec::new();
                let mut cursor = std::io::Cursor::new(&mut buf);
                image::DynamicImage::ImageRgba8(frame.clone())
                    .write_to(&mut cursor, image::ImageFormat::Bmp)
                    .map_err(|e| EngineError::EncoderFailure { detail: format!("bmp encode failed: {e}") })?;
                stdin
                    .write_all(&buf)
                    .map_err(|e| EngineError::EncoderFailure { detail: format!("pipe write failed: {e}") })?;
            }
        }
        Ok(())
    }

    /// Closes stdin, waits for exit, and surfaces a fatal `EncoderFailure`
    /// on non-zero exit (spec §7).
    pub fn finish(mut self) -> Result<()> {
        drop(self.child.stdin.take());
        let output = self
            .child
            .wait_with_output()
            .map_err(|e| EngineError::EncoderFailure { detail: format!("wait failed: {e}") })?;

        if output.status.success() {
            info!("encoder finished: {}", self.config.output_path.display());
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            Err(EngineError::EncoderFailure {
                detail: format!("exit status {:?}: {}", output.status.code(), stderr),
            })
        }
    }

    /// Aborts the subprocess on cooperative cancellation, closing stdin
    /// without waiting for a clean encode (spec §5).
    pub fn abort(mut self) {
        drop(self.child.stdin.take());
        if let Err(e) = self.child.kill() {
            warn!("failed to kill encoder subprocess: {e}");
        }
        let _ = self.child.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_format_maps_to_expected_pix_fmt() {
        assert_eq!(
            match FrameFormat::Rgba {
                FrameFormat::Rgba => "rgba",
                FrameFormat::Bmp => "bmp",
            },
            "rgba"
        );
    }
}
