//! The resolver that turns a URL into video metadata.
//!
//! Resolution is delegated to an external `yt-dlp` binary invoked with
//! `--dump-json`; this module owns the invocation and the parse.

use crate::error::{Error, Result};
use crate::executor::Executor;
use crate::model::Video;
use log::debug;
use regex::Regex;
use std::path::PathBuf;
use std::time::Duration;

/// Stderr fragments that mean the remote video cannot be served, as opposed
/// to the resolver itself breaking.
const UNAVAILABLE_PATTERNS: [&str; 5] = [
    r"[Vv]ideo unavailable",
    r"Private video",
    r"This video is not available",
    r"has been removed",
    r"not available in your country",
];

/// Resolves video metadata by running the resolver binary.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolver {
    /// The path to the resolver executable.
    pub executable_path: PathBuf,
    /// The timeout for one resolution.
    pub timeout: Duration,
}

impl Default for Resolver {
    fn default() -> Self {
        Self {
            executable_path: PathBuf::from("yt-dlp"),
            timeout: Duration::from_secs(30),
        }
    }
}

impl Resolver {
    /// Creates a resolver using the given executable.
    pub fn new(executable_path: PathBuf) -> Self {
        Self {
            executable_path,
            ..Self::default()
        }
    }

    /// Fetches the information of the given video URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unavailable`] when the binary reports the video as
    /// unserveable, [`Error::Tool`] for any other resolver failure, and
    /// [`Error::Serde`] when the metadata dump cannot be parsed.
    pub async fn fetch_video_infos(&self, url: &str) -> Result<Video> {
        debug!("fetching video infos for {}", url);

        let args = vec![
            "--no-progress".to_string(),
            "--dump-json".to_string(),
            url.to_string(),
        ];

        let executor = Executor {
            executable_path: self.executable_path.clone(),
            timeout: self.timeout,
            args,
        };

        let output = match executor.execute().await {
            Ok(output) => output,
            Err(Error::Tool { stderr, .. }) if is_unavailable(&stderr) => {
                return Err(Error::Unavailable);
            }
            Err(e) => return Err(e),
        };

        let video: Video = serde_json::from_str(&output.stdout)?;
        Ok(video)
    }
}

fn is_unavailable(stderr: &str) -> bool {
    for pattern in UNAVAILABLE_PATTERNS.iter() {
        let re = Regex::new(pattern).unwrap();
        if re.is_match(stderr) {
            return true;
        }
    }
    false
}
