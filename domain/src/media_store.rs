//! On-disk storage for uploaded audio and generated transcripts.

use crate::error::Error;
use log::*;
use service::config::Config;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

const FALLBACK_FILENAME: &str = "upload";

#[derive(Debug, Clone)]
pub struct MediaStore {
    audio_directory: PathBuf,
    transcript_directory: PathBuf,
}

impl MediaStore {
    pub fn new(audio_directory: impl Into<PathBuf>, transcript_directory: impl Into<PathBuf>) -> Self {
        Self {
            audio_directory: audio_directory.into(),
            transcript_directory: transcript_directory.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.audio_directory(), config.transcript_directory())
    }

    /// Create the storage directories if they do not exist yet.
    pub async fn prepare(&self) -> Result<(), Error> {
        tokio::fs::create_dir_all(&self.audio_directory).await?;
        tokio::fs::create_dir_all(&self.transcript_directory).await?;
        info!(
            "Storing audio in {} and transcripts in {}",
            self.audio_directory.display(),
            self.transcript_directory.display()
        );
        Ok(())
    }

    pub fn audio_path(&self, filename: &str) -> PathBuf {
        self.audio_directory.join(filename)
    }

    /// Transcripts are named after the audio file they belong to.
    pub fn transcript_path(&self, audio_filename: &str) -> PathBuf {
        self.transcript_directory
            .join(format!("{audio_filename}.txt"))
    }

    /// Open a new file in the audio directory for an upload, named with
    /// [`unique_filename`]. The bytes are written as they arrive.
    pub async fn create_audio(&self, original_filename: &str) -> Result<AudioWriter, Error> {
        let filename = unique_filename(original_filename);
        let path = self.audio_path(&filename);
        let file = File::create(&path).await?;

        Ok(AudioWriter {
            staged: StagedAudio {
                original_filename: original_filename.to_string(),
                filename,
                path,
            },
            file,
            written: 0,
        })
    }

    pub async fn save_transcript(&self, audio_filename: &str, text: &str) -> Result<PathBuf, Error> {
        let path = self.transcript_path(audio_filename);
        tokio::fs::write(&path, text).await?;
        debug!("Wrote transcript {}", path.display());
        Ok(path)
    }
}

/// An upload that has been written to the audio directory.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedAudio {
    /// Name the client sent
    pub original_filename: String,
    /// Unique name in the audio directory
    pub filename: String,
    pub path: PathBuf,
}

impl StagedAudio {
    /// Remove the staged file. Failures are logged, not returned.
    pub async fn discard(&self) {
        if let Err(e) = remove_file(&self.path).await {
            warn!("Failed to remove staged upload {}: {e}", self.path.display());
        }
    }
}

/// Writes an upload chunk by chunk into its staged file.
#[derive(Debug)]
pub struct AudioWriter {
    staged: StagedAudio,
    file: File,
    written: u64,
}

impl AudioWriter {
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), Error> {
        self.file.write_all(chunk).await?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    /// Flush everything written so far. The file is removed if that fails.
    pub async fn finish(mut self) -> Result<StagedAudio, Error> {
        if let Err(e) = self.file.flush().await {
            self.discard().await;
            return Err(e.into());
        }
        debug!("Wrote {} bytes to {}", self.written, self.staged.path.display());
        Ok(self.staged)
    }

    /// Abandon a partially written upload.
    pub async fn discard(self) {
        drop(self.file);
        self.staged.discard().await;
    }
}

/// A storage name that cannot collide with earlier uploads of the same file.
pub fn unique_filename(original_filename: &str) -> String {
    format!("{}_{}", uuid::Uuid::new_v4(), sanitize_filename(original_filename))
}

/// Same name with an `.mp3` extension.
pub fn mp3_filename(filename: &str) -> String {
    Path::new(filename)
        .with_extension("mp3")
        .to_string_lossy()
        .into_owned()
}

/// Reduce a client supplied name to a safe single path component.
pub fn sanitize_filename(original_filename: &str) -> String {
    // Browsers on Windows may send the full client path.
    let basename = original_filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let sanitized: String = basename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = sanitized.trim_start_matches('.');
    if trimmed.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Read a stored transcript. A missing file reads as `None`.
pub async fn read_transcript(path: &Path) -> Result<Option<String>, Error> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("Transcript {} is missing", path.display());
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Delete a stored file. Returns whether anything was removed.
pub async fn remove_file(path: &Path) -> Result<bool, Error> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            debug!("Removed {}", path.display());
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}
