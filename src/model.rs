//! The models used to represent the data reported by the resolver.

use serde::Deserialize;
use std::cmp::Ordering;
use std::fmt;

/// Characters that cannot appear in a file name on the common platforms.
const RESERVED_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Represents a resolved remote video and its selectable streams.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Video {
    /// The ID of the video.
    pub id: String,
    /// The title of the video.
    pub title: String,
    /// The thumbnail URL of the video, usually the highest quality.
    #[serde(default)]
    pub thumbnail: Option<String>,
    /// The available formats of the video.
    #[serde(default)]
    pub formats: Vec<StreamFormat>,
}

/// Represents one selectable encoding of a video: a video stream (with or
/// without audio) or an audio-only track.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StreamFormat {
    /// The ID of the format, e.g. '137'.
    pub format_id: String,
    /// The direct download URL of the format.
    #[serde(default)]
    pub url: Option<String>,
    /// The container extension, e.g. 'mp4' or 'webm'.
    #[serde(default)]
    pub ext: Option<String>,
    /// The video codec, 'none' for audio-only formats.
    #[serde(default)]
    pub vcodec: Option<String>,
    /// The audio codec, 'none' for video-only formats.
    #[serde(default)]
    pub acodec: Option<String>,
    /// The height of the video in pixels.
    #[serde(default)]
    pub height: Option<i64>,
    /// The width of the video in pixels.
    #[serde(default)]
    pub width: Option<i64>,
    /// The frames per second of the video.
    #[serde(default)]
    pub fps: Option<f64>,
    /// The average audio bitrate in kbit/s.
    #[serde(default)]
    pub abr: Option<f64>,
    /// The total bitrate in kbit/s.
    #[serde(default)]
    pub tbr: Option<f64>,
}

impl fmt::Display for Video {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Video(id={}, title={})", self.id, self.title)
    }
}

impl fmt::Display for StreamFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Format(id={}, ext={})",
            self.format_id,
            self.ext.as_deref().unwrap_or("unknown")
        )
    }
}

impl StreamFormat {
    /// Whether the format carries a video track.
    pub fn has_video(&self) -> bool {
        self.vcodec.as_deref().is_some_and(|codec| codec != "none")
    }

    /// Whether the format carries an audio track.
    pub fn has_audio(&self) -> bool {
        self.acodec.as_deref().is_some_and(|codec| codec != "none")
    }

    /// Whether the format is an audio-only track.
    pub fn is_audio_only(&self) -> bool {
        self.has_audio() && !self.has_video()
    }

    /// Whether the format carries both tracks and downloads as one file.
    pub fn is_progressive(&self) -> bool {
        self.has_video() && self.has_audio()
    }

    /// The container extension to name the downloaded file with.
    pub fn container(&self) -> &str {
        self.ext.as_deref().unwrap_or("mp4")
    }
}

impl Video {
    /// Returns the highest-resolution video format available.
    /// Formats sorting : "progressive", "height", "fps", "total bitrate" —
    /// a combined audio+video stream wins over a taller video-only one, so
    /// the result plays standalone whenever the video offers that.
    /// If the video has no video formats, it returns None.
    pub fn best_video_format(&self) -> Option<&StreamFormat> {
        self.formats
            .iter()
            .filter(|f| f.has_video())
            .max_by(|a, b| Self::compare_video_formats(a, b))
    }

    /// Returns the first audio-only format, in resolver enumeration order.
    /// If the video has no audio-only formats, it returns None.
    pub fn first_audio_format(&self) -> Option<&StreamFormat> {
        self.formats.iter().find(|f| f.is_audio_only())
    }

    /// Compares two video formats.
    /// Formats sorting : "progressive", "height", "fps", "total bitrate"
    fn compare_video_formats(a: &StreamFormat, b: &StreamFormat) -> Ordering {
        let cmp_progressive = a.is_progressive().cmp(&b.is_progressive());
        if cmp_progressive != Ordering::Equal {
            return cmp_progressive;
        }

        let cmp_height = a.height.unwrap_or(0).cmp(&b.height.unwrap_or(0));
        if cmp_height != Ordering::Equal {
            return cmp_height;
        }

        let a_fps = a.fps.unwrap_or(0.0);
        let b_fps = b.fps.unwrap_or(0.0);

        let cmp_fps = a_fps.partial_cmp(&b_fps).unwrap_or(Ordering::Equal);
        if cmp_fps != Ordering::Equal {
            return cmp_fps;
        }

        let a_tbr = a.tbr.unwrap_or(0.0);
        let b_tbr = b.tbr.unwrap_or(0.0);

        a_tbr.partial_cmp(&b_tbr).unwrap_or(Ordering::Equal)
    }
}

/// Turns a video title into a usable file name by replacing characters that
/// are reserved on at least one supported platform.
pub fn sanitize_title(title: &str) -> String {
    let sanitized: String = title
        .chars()
        .map(|c| if RESERVED_CHARS.contains(&c) { '_' } else { c })
        .collect();

    let trimmed = sanitized.trim();
    if trimmed.is_empty() {
        "video".to_string()
    } else {
        trimmed.to_string()
    }
}
