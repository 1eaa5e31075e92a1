//! The helper that rewrites an audio file's bitrate and sample rate.

use crate::error::Result;
use crate::executor::Executor;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

/// Re-encodes audio files in place through an external transcoding tool.
///
/// The re-encoded data goes to a temporary file first; the original is only
/// replaced after the tool reports success, so a failed transcode leaves it
/// byte-identical. The temporary file is removed on every exit path.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalizer {
    /// The path to the transcoder executable.
    pub executable_path: PathBuf,
    /// The timeout for one transcode.
    pub timeout: Duration,
    /// The directory temporary files are created in.
    pub temp_dir: PathBuf,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            executable_path: PathBuf::from("ffmpeg"),
            timeout: Duration::from_secs(600),
            temp_dir: std::env::temp_dir(),
        }
    }
}

impl Normalizer {
    /// Creates a normalizer using the given transcoder executable.
    pub fn new(executable_path: PathBuf) -> Self {
        Self {
            executable_path,
            ..Self::default()
        }
    }

    /// Configures the directory temporary files are created in.
    pub fn with_temp_dir(mut self, temp_dir: PathBuf) -> Self {
        self.temp_dir = temp_dir;
        self
    }

    /// Rewrites the file at `path` with the given audio bitrate (e.g. "320k")
    /// and sample rate in Hz.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::Tool`] when the transcoder exits
    /// non-zero (the original file is untouched), and
    /// [`crate::error::Error::IO`] for temp-file or replacement failures.
    pub async fn normalize(&self, path: &Path, bitrate: &str, sample_rate: u32) -> Result<()> {
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("mp3");
        let temp = TempFile::create(&self.temp_dir, extension)?;

        debug!(
            "transcoding {} via {}",
            path.display(),
            temp.path().display()
        );

        // Argument order matters: the overwrite flag must precede the output.
        let args = vec![
            "-i".to_string(),
            path.to_string_lossy().into_owned(),
            "-b:a".to_string(),
            bitrate.to_string(),
            "-ar".to_string(),
            sample_rate.to_string(),
            "-y".to_string(),
            temp.path().to_string_lossy().into_owned(),
        ];

        let executor = Executor {
            executable_path: self.executable_path.clone(),
            timeout: self.timeout,
            args,
        };
        executor.execute().await?;

        tokio::fs::copy(temp.path(), path).await?;
        info!(
            "rewrote {} at {} / {} Hz",
            path.display(),
            bitrate,
            sample_rate
        );
        Ok(())
    }
}

/// A uniquely named temporary file, removed when the value goes out of scope.
struct TempFile {
    path: PathBuf,
}

impl TempFile {
    /// Creates the file up front so the name is reserved before the tool runs.
    fn create(dir: &Path, extension: &str) -> Result<Self> {
        let name: String = Uuid::new_v4()
            .to_string()
            .replace('-', "")
            .chars()
            .take(16)
            .collect();
        let path = dir.join(format!("{}.{}", name, extension));
        std::fs::File::create(&path)?;
        Ok(Self { path })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!(
                "failed to remove temporary file {}: {}",
                self.path.display(),
                e
            );
        }
    }
}
