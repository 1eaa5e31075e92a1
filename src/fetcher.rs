//! Tools for fetching remote data over HTTPS.

use crate::error::Result;
use futures_util::StreamExt;
use reqwest::header::USER_AGENT;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;

/// The display size of a rendered thumbnail.
pub const THUMBNAIL_WIDTH: u32 = 320;
/// The display size of a rendered thumbnail.
pub const THUMBNAIL_HEIGHT: u32 = 180;

const WRITE_BUFFER_SIZE: usize = 1024 * 1024;
const PROGRESS_INTERVAL: Duration = Duration::from_millis(250);
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Observer for transfer progress: bytes downloaded so far and the current
/// rate in bytes per second.
pub type ProgressCallback = Arc<dyn Fn(u64, f64) + Send + Sync>;

/// A decoded thumbnail, resized for display, free of any GUI types.
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailImage {
    /// The width in pixels.
    pub width: usize,
    /// The height in pixels.
    pub height: usize,
    /// Tightly packed RGBA pixel data, row-major.
    pub rgba: Vec<u8>,
}

/// The fetcher is responsible for downloading data from a URL.
pub struct Fetcher {
    /// The URL from which to download the data.
    url: String,
    /// Callback for tracking transfer progress.
    progress_callback: Option<ProgressCallback>,
}

impl Fetcher {
    /// Creates a new fetcher for the given URL.
    pub fn new(url: impl AsRef<str>) -> Self {
        Self {
            url: url.as_ref().to_string(),
            progress_callback: None,
        }
    }

    /// Configures a callback for tracking transfer progress.
    pub fn with_progress_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(u64, f64) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(callback));
        self
    }

    /// Downloads the asset at the URL and writes it to the given destination,
    /// creating the parent directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::Reqwest`] on transport failures and
    /// [`crate::error::Error::IO`] when the destination cannot be written.
    pub async fn fetch_asset(&self, destination: impl AsRef<Path>) -> Result<()> {
        log::debug!("fetching {} to {:?}", self.url, destination.as_ref());

        if let Some(parent) = destination.as_ref().parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()?;

        let response = client
            .get(&self.url)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .send()
            .await?
            .error_for_status()?;

        let mut dest = tokio::fs::File::create(&destination).await?;
        let mut stream = response.bytes_stream();

        let mut buffer = Vec::with_capacity(WRITE_BUFFER_SIZE);
        let mut downloaded_bytes: u64 = 0;
        let mut window_bytes: u64 = 0;
        let mut window_start = Instant::now();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            buffer.extend_from_slice(&chunk);
            downloaded_bytes += chunk.len() as u64;
            window_bytes += chunk.len() as u64;

            if let Some(callback) = &self.progress_callback {
                let elapsed = window_start.elapsed();
                if elapsed >= PROGRESS_INTERVAL {
                    let rate = window_bytes as f64 / elapsed.as_secs_f64();
                    callback(downloaded_bytes, rate);
                    window_bytes = 0;
                    window_start = Instant::now();
                }
            }

            if buffer.len() >= WRITE_BUFFER_SIZE {
                dest.write_all(&buffer).await?;
                buffer.clear();
            }
        }

        if !buffer.is_empty() {
            dest.write_all(&buffer).await?;
        }
        dest.flush().await?;

        if let Some(callback) = &self.progress_callback {
            callback(downloaded_bytes, 0.0);
        }

        Ok(())
    }

    /// Downloads the asset at the URL into memory.
    pub async fn fetch_bytes(&self) -> Result<Vec<u8>> {
        log::debug!("fetching {} into memory", self.url);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        let response = client
            .get(&self.url)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.bytes().await?.to_vec())
    }
}

/// Decodes raw image bytes and resizes them to the thumbnail display size.
pub fn decode_thumbnail(bytes: &[u8]) -> Result<ThumbnailImage> {
    let image = image::load_from_memory(bytes)?
        .resize_exact(
            THUMBNAIL_WIDTH,
            THUMBNAIL_HEIGHT,
            image::imageops::FilterType::Lanczos3,
        )
        .to_rgba8();

    Ok(ThumbnailImage {
        width: THUMBNAIL_WIDTH as usize,
        height: THUMBNAIL_HEIGHT as usize,
        rgba: image.into_raw(),
    })
}
