//! Audio conversion and probing through the ffmpeg command line tools.

use crate::error::{DomainErrorKind, Error, InternalErrorKind};
use log::*;
use service::config::Config;
use std::ffi::OsStr;
use std::path::Path;
use std::process::Output;
use tokio::process::Command;

/// Locations of the ffmpeg executables.
#[derive(Debug, Clone)]
pub struct MediaTools {
    ffmpeg: String,
    ffprobe: String,
}

impl MediaTools {
    pub fn new(ffmpeg: impl Into<String>, ffprobe: impl Into<String>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.ffmpeg_path(), config.ffprobe_path())
    }

    /// Re-encode `input` as MP3 at `output`, overwriting anything already there.
    pub async fn convert_to_mp3(&self, input: &Path, output: &Path) -> Result<(), Error> {
        debug!("Converting {} to {}", input.display(), output.display());

        let mut command = Command::new(&self.ffmpeg);
        command
            .args(["-y", "-loglevel", "error", "-i"])
            .arg(input)
            .arg(output);
        run(&self.ffmpeg, command).await?;

        Ok(())
    }

    /// Length of the audio at `path` in seconds.
    pub async fn probe_duration(&self, path: &Path) -> Result<f64, Error> {
        let mut command = Command::new(&self.ffprobe);
        command
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(path);
        let output = run(&self.ffprobe, command).await?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_duration(&stdout).ok_or_else(|| {
            Error::internal(InternalErrorKind::Media(format!(
                "ffprobe reported no duration for {}",
                path.display()
            )))
        })
    }
}

/// Uploads in any format other than MP3 are converted before they are stored.
pub fn needs_conversion(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(OsStr::to_str)
        .map(|ext| !ext.eq_ignore_ascii_case("mp3"))
        .unwrap_or(true)
}

/// Parse the bare number ffprobe prints for `format=duration`.
pub(crate) fn parse_duration(stdout: &str) -> Option<f64> {
    stdout
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .and_then(|line| line.parse::<f64>().ok())
        .filter(|seconds| seconds.is_finite() && *seconds >= 0.0)
}

async fn run(program: &str, mut command: Command) -> Result<Output, Error> {
    let output = command
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| {
            warn!("Failed to start {program}: {e}");
            Error {
                source: Some(Box::new(e)),
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Media(
                    format!("failed to run {program}"),
                )),
            }
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        warn!("{program} exited with {}: {}", output.status, stderr.trim());
        return Err(Error::internal(InternalErrorKind::Media(format!(
            "{program} exited with {}: {}",
            output.status,
            stderr.trim()
        ))));
    }

    Ok(output)
}
