//! The interface texts and their languages.
//!
//! Every user-facing string lives in a [`Messages`] table so the rest of the
//! crate never formats status text ad hoc. Errors are turned into status
//! lines in exactly one place, the mapping methods below.

use crate::error::Error;
use std::path::Path;

/// The available interface languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    /// English, the default.
    #[default]
    English,
    /// German.
    Deutsch,
}

impl Language {
    /// Every language, in selector order.
    pub const ALL: [Language; 2] = [Language::English, Language::Deutsch];

    /// The language's own name, shown in the selector.
    pub fn label(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Deutsch => "Deutsch",
        }
    }

    /// The message table for this language.
    pub fn messages(self) -> &'static Messages {
        match self {
            Language::English => &ENGLISH,
            Language::Deutsch => &GERMAN,
        }
    }
}

/// How a status line should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    /// Plain informational text.
    #[default]
    Neutral,
    /// Something worked.
    Success,
    /// Something failed.
    Error,
}

/// A line of status text together with its tone.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusLine {
    /// The text to display.
    pub text: String,
    /// The tone to render it in.
    pub tone: Tone,
}

impl StatusLine {
    /// A success line.
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: Tone::Success,
        }
    }

    /// An error line.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: Tone::Error,
        }
    }
}

/// One language's worth of interface text.
///
/// The `*_prefix` and trailing-space fields are completed at runtime with
/// values that are not known ahead of time, such as rates or error details.
#[derive(Debug)]
pub struct Messages {
    pub title: &'static str,
    pub url_label: &'static str,
    pub format_label: &'static str,
    pub location_button: &'static str,
    pub download_button: &'static str,
    pub file_download_button: &'static str,
    pub speed_prefix: &'static str,
    pub videos_prefix: &'static str,
    pub fetch_success: &'static str,
    pub fetch_fail: &'static str,
    pub video_unavailable: &'static str,
    pub no_video: &'static str,
    pub download_complete: &'static str,
    pub download_fail: &'static str,
    pub all_downloads_complete: &'static str,
    pub error_reading_file: &'static str,
    pub no_file_selected: &'static str,
    pub enter_url: &'static str,
    pub location_set: &'static str,
    pub batch_unavailable: &'static str,
}

/// The English table.
pub static ENGLISH: Messages = Messages {
    title: "YouTube Video Downloader",
    url_label: "YouTube URL:",
    format_label: "Format:",
    location_button: "Select Download Location",
    download_button: "Download",
    file_download_button: "Download from File",
    speed_prefix: "Speed:",
    videos_prefix: "Videos:",
    fetch_success: "Video fetched successfully",
    fetch_fail: "Failed to fetch video: ",
    video_unavailable: "This video is unavailable",
    no_video: "No video fetched to download",
    download_complete: "Download completed",
    download_fail: "Failed to download video: ",
    all_downloads_complete: "All downloads completed",
    error_reading_file: "Error reading file: ",
    no_file_selected: "No file selected",
    enter_url: "Please enter a YouTube URL",
    location_set: "Download location set to: ",
    batch_unavailable: "Video unavailable: ",
};

/// The German table.
pub static GERMAN: Messages = Messages {
    title: "YouTube Video Downloader",
    url_label: "YouTube URL:",
    format_label: "Format:",
    location_button: "Download Ort auswählen",
    download_button: "Download",
    file_download_button: "Download von einer Datei",
    speed_prefix: "Geschwindigkeit:",
    videos_prefix: "Videos:",
    fetch_success: "Video erfolgreich abgerufen",
    fetch_fail: "Fehler beim Abrufen des Videos: ",
    video_unavailable: "Dieses Video ist nicht verfügbar",
    no_video: "Kein Video zum Herunterladen abgerufen",
    download_complete: "Download abgeschlossen",
    download_fail: "Fehler beim Herunterladen des Videos: ",
    all_downloads_complete: "Alle Downloads abgeschlossen",
    error_reading_file: "Fehler beim Lesen der Datei: ",
    no_file_selected: "Keine Datei ausgewählt",
    enter_url: "Bitte gebe eine YouTube URL ein",
    location_set: "Download Ort festgelegt: ",
    batch_unavailable: "Video nicht verfügbar: ",
};

impl Messages {
    /// The status line for a failed fetch.
    pub fn fetch_failure(&self, error: &Error) -> StatusLine {
        match error {
            Error::Unavailable => StatusLine::error(self.video_unavailable),
            Error::EmptyUrl => StatusLine::error(self.enter_url),
            other => StatusLine::error(format!("{}{}", self.fetch_fail, other)),
        }
    }

    /// The status line for a failed download.
    pub fn download_failure(&self, error: &Error) -> StatusLine {
        match error {
            Error::Unavailable => StatusLine::error(self.video_unavailable),
            Error::NoVideo => StatusLine::error(self.no_video),
            other => StatusLine::error(format!("{}{}", self.download_fail, other)),
        }
    }

    /// The status line for one failed entry of a URL file.
    ///
    /// An unavailable video names the URL, so a long list stays traceable.
    pub fn batch_item_failure(&self, url: &str, error: &Error) -> StatusLine {
        match error {
            Error::Unavailable => {
                StatusLine::error(format!("{}{}", self.batch_unavailable, url))
            }
            other => StatusLine::error(format!("{}{}", self.download_fail, other)),
        }
    }

    /// The status line for a URL file that could not be used at all.
    pub fn batch_failure(&self, error: &Error) -> StatusLine {
        match error {
            Error::NoFileSelected => StatusLine::error(self.no_file_selected),
            other => StatusLine::error(format!("{}{}", self.error_reading_file, other)),
        }
    }

    /// The status line confirming a chosen download location.
    pub fn location_confirmation(&self, directory: &Path) -> StatusLine {
        StatusLine::success(format!("{}{}", self.location_set, directory.display()))
    }

    /// The speed readout, such as `Speed: 1.25 MB/s`.
    pub fn speed_readout(&self, bytes_per_second: f64) -> String {
        format!(
            "{} {:.2} MB/s",
            self.speed_prefix,
            bytes_per_second / 1_000_000.0
        )
    }

    /// The batch counter, such as `Videos: 2/5`.
    pub fn videos_readout(&self, done: usize, total: usize) -> String {
        format!("{} {}/{}", self.videos_prefix, done, total)
    }
}
