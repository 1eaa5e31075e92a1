//! A desktop downloader for YouTube videos.
//!
//! A pasted URL is resolved through `yt-dlp` once the input has rested for
//! a moment, the video's thumbnail is shown, and the video is downloaded
//! either as the highest resolution stream or as an audio-only stream
//! stored under an `.mp3` name. A file of URLs can be downloaded in one
//! go, and a separate helper re-encodes audio files in place through
//! `ffmpeg`.
//!
//! [`Controller`] is the entry point for interfaces: it owns the
//! [`session::Session`] state machine and a background worker task, and
//! is polled once per frame for display updates.

pub mod batch;
pub mod controller;
pub mod error;
pub mod executor;
pub mod fetcher;
pub mod lang;
pub mod model;
pub mod provider;
pub mod resolver;
pub mod session;
pub mod transcode;

pub use crate::controller::{Controller, Update};
pub use crate::error::{Error, Result};
pub use crate::lang::Language;
pub use crate::provider::{VideoProvider, YoutubeProvider};
pub use crate::transcode::Normalizer;

/// The formats a video can be saved in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaFormat {
    /// The highest resolution video stream.
    #[default]
    Mp4,
    /// The first audio-only stream, stored under an `.mp3` name.
    Mp3,
}

impl MediaFormat {
    /// Every format, in selector order.
    pub const ALL: [MediaFormat; 2] = [MediaFormat::Mp4, MediaFormat::Mp3];

    /// The label shown next to the format selector.
    pub fn label(self) -> &'static str {
        match self {
            MediaFormat::Mp4 => "MP4",
            MediaFormat::Mp3 => "MP3",
        }
    }
}
