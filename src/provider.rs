//! The seam between the interaction logic and the outside world.
//!
//! Everything the controller needs from the network or external binaries
//! goes through [`VideoProvider`], so the interaction flow can be exercised
//! against a stub.

use crate::MediaFormat;
use crate::error::{Error, Result};
use crate::fetcher::{Fetcher, ProgressCallback, ThumbnailImage, decode_thumbnail};
use crate::model::{Video, sanitize_title};
use crate::resolver::Resolver;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// What the controller needs from the remote side.
#[async_trait]
pub trait VideoProvider: Send + Sync {
    /// Resolves a URL into video metadata.
    async fn resolve(&self, url: &str) -> Result<Video>;

    /// Retrieves and decodes the display thumbnail of a resolved video.
    async fn fetch_thumbnail(&self, video: &Video) -> Result<ThumbnailImage>;

    /// Downloads the stream matching `format` into the `destination`
    /// directory and returns the final file path, extension rename included.
    async fn download(
        &self,
        video: &Video,
        format: MediaFormat,
        destination: &Path,
        progress: Option<ProgressCallback>,
    ) -> Result<PathBuf>;
}

/// The production provider: an external resolver binary plus direct HTTPS
/// retrieval of the chosen stream.
pub struct YoutubeProvider {
    resolver: Resolver,
}

impl YoutubeProvider {
    /// Creates a provider resolving URLs through the given binary.
    pub fn new(resolver_path: PathBuf) -> Self {
        Self {
            resolver: Resolver::new(resolver_path),
        }
    }
}

#[async_trait]
impl VideoProvider for YoutubeProvider {
    async fn resolve(&self, url: &str) -> Result<Video> {
        self.resolver.fetch_video_infos(url).await
    }

    async fn fetch_thumbnail(&self, video: &Video) -> Result<ThumbnailImage> {
        let url = video.thumbnail.as_deref().ok_or(Error::MissingThumbnail)?;
        let bytes = Fetcher::new(url).fetch_bytes().await?;
        decode_thumbnail(&bytes)
    }

    async fn download(
        &self,
        video: &Video,
        format: MediaFormat,
        destination: &Path,
        progress: Option<ProgressCallback>,
    ) -> Result<PathBuf> {
        let stream = match format {
            MediaFormat::Mp4 => video
                .best_video_format()
                .ok_or_else(|| Error::MissingFormat("video".to_string()))?,
            MediaFormat::Mp3 => video
                .first_audio_format()
                .ok_or_else(|| Error::MissingFormat("audio".to_string()))?,
        };
        let url = stream
            .url
            .as_deref()
            .ok_or_else(|| Error::MissingUrl(stream.format_id.clone()))?;

        let file_name = format!("{}.{}", sanitize_title(&video.title), stream.container());
        let output = destination.join(file_name);

        let mut fetcher = Fetcher::new(url);
        if let Some(callback) = progress {
            fetcher = fetcher.with_progress_callback(move |bytes, rate| callback(bytes, rate));
        }
        fetcher.fetch_asset(&output).await?;

        let finished = final_output_path(output.clone(), format);
        if finished != output {
            tokio::fs::rename(&output, &finished).await?;
        }
        Ok(finished)
    }
}

/// The path the finished download should live at: audio-only results always
/// get the audio extension, whatever container the stream carried.
fn final_output_path(output: PathBuf, format: MediaFormat) -> PathBuf {
    match format {
        MediaFormat::Mp4 => output,
        MediaFormat::Mp3 => output.with_extension("mp3"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_downloads_get_the_audio_extension() {
        let path = final_output_path(PathBuf::from("out/A song.webm"), MediaFormat::Mp3);
        assert_eq!(path, PathBuf::from("out/A song.mp3"));
    }

    #[test]
    fn an_audio_container_needs_no_rename() {
        let original = PathBuf::from("out/track.mp3");
        assert_eq!(
            final_output_path(original.clone(), MediaFormat::Mp3),
            original
        );
    }

    #[test]
    fn video_downloads_keep_their_container() {
        let original = PathBuf::from("out/clip.mp4");
        assert_eq!(
            final_output_path(original.clone(), MediaFormat::Mp4),
            original
        );
    }
}
