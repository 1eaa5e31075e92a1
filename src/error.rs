//! The errors that can occur.

use std::time::Duration;
use thiserror::Error;

/// A type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// The possible errors that can occur.
#[derive(Debug, Error)]
pub enum Error {
    /// An error occurred while running the runtime.
    #[error("An error occurred while running the runtime: {0}")]
    Runtime(#[from] tokio::task::JoinError),
    /// An error occurred while interacting with the file system.
    #[error("An IO error occurred: {0}")]
    IO(#[from] std::io::Error),
    /// An error occurred while fetching over HTTP.
    #[error("An error occurred while fetching: {0}")]
    Reqwest(#[from] reqwest::Error),
    /// An error occurred while parsing JSON.
    #[error("An error occurred while parsing JSON: {0}")]
    Serde(#[from] serde_json::Error),
    /// An error occurred while decoding an image.
    #[error("An error occurred while decoding an image: {0}")]
    Image(#[from] image::ImageError),

    /// An external tool exited with a failure status.
    #[error("{tool} exited with code {code}: {stderr}")]
    Tool {
        /// The name of the tool that failed.
        tool: String,
        /// The exit code of the process.
        code: i32,
        /// The captured stderr of the process.
        stderr: String,
    },
    /// An error occurred while spawning a process or capturing its output.
    #[error("Failed to execute command: {0}")]
    Command(String),
    /// An error occurred due to a timeout.
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// The referenced video cannot be resolved.
    #[error("This video is unavailable")]
    Unavailable,
    /// An error occurred due to missing format.
    #[error("No {0} format available for video")]
    MissingFormat(String),
    /// An error occurred due to missing URL in format.
    #[error("Format {0} has no URL available")]
    MissingUrl(String),
    /// An error occurred due to missing thumbnail.
    #[error("No thumbnail available for video")]
    MissingThumbnail,

    /// No URL was entered before the fetch fired.
    #[error("No URL was provided")]
    EmptyUrl,
    /// A download was requested with no fetched video.
    #[error("No video fetched to download")]
    NoVideo,
    /// The batch file chooser was cancelled.
    #[error("No file selected")]
    NoFileSelected,
}
