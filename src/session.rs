//! The interaction state machine.
//!
//! [`Session`] owns every piece of interaction state and is only mutated
//! through named transitions, so the whole flow can be driven and asserted
//! in tests without constructing any visual surface.

use crate::MediaFormat;
use crate::model::Video;
use std::path::{Path, PathBuf};

/// The observable phase of the fetch-and-download flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Nothing has happened yet.
    #[default]
    Idle,
    /// A debounce timer is armed for the current input.
    PendingFetch,
    /// A fetch is in flight.
    Fetching,
    /// The last fetch stored a handle.
    FetchSucceeded,
    /// The last fetch failed.
    FetchFailed,
    /// A download is in flight.
    Downloading,
    /// The last download finished.
    DownloadSucceeded,
    /// The last download failed.
    DownloadFailed,
}

/// What the session decided when a debounce timer fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchDecision {
    /// Dispatch a fetch for this URL, tagged with this generation.
    Start {
        /// The URL to resolve.
        url: String,
        /// The generation the completion must present to be applied.
        generation: u64,
    },
    /// The input was empty; report the prompt instead of fetching.
    EmptyInput,
    /// The timer was superseded by newer input; nothing to do.
    Superseded,
}

/// Why a download request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadRefusal {
    /// No video has been fetched yet.
    NoVideo,
    /// A fetch or download is already in flight.
    Busy,
}

/// Everything the worker needs to carry out one download.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadPlan {
    /// The resolved video to download.
    pub video: Video,
    /// The chosen format.
    pub format: MediaFormat,
    /// The directory the file lands in.
    pub destination: PathBuf,
}

/// The single owner of interaction state.
#[derive(Debug, Clone, Default)]
pub struct Session {
    url: String,
    handle: Option<Video>,
    format: MediaFormat,
    destination: Option<PathBuf>,
    phase: Phase,
    fetch_generation: u64,
}

impl Session {
    /// Creates a session in the `Idle` phase.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The last successfully fetched video, if any.
    pub fn handle(&self) -> Option<&Video> {
        self.handle.as_ref()
    }

    /// The chosen format.
    pub fn format(&self) -> MediaFormat {
        self.format
    }

    /// The chosen destination directory, if any.
    pub fn destination(&self) -> Option<&Path> {
        self.destination.as_deref()
    }

    /// Stores the format choice.
    pub fn set_format(&mut self, format: MediaFormat) {
        self.format = format;
    }

    /// The user edited the URL input: a new debounce round starts and any
    /// older timer becomes stale. Returns the generation the new timer must
    /// carry.
    ///
    /// A download in flight keeps its phase; the controller defers the
    /// timer's firing until the download has finished.
    pub fn input_changed(&mut self, url: &str) -> u64 {
        self.url = url.to_string();
        self.fetch_generation += 1;
        if self.phase != Phase::Downloading {
            self.phase = Phase::PendingFetch;
        }
        self.fetch_generation
    }

    /// The debounce timer carrying `generation` fired.
    ///
    /// The last fetched handle survives an empty input: it still names the
    /// last successful fetch, so a download may keep using it.
    pub fn debounce_fired(&mut self, generation: u64) -> FetchDecision {
        if generation != self.fetch_generation {
            return FetchDecision::Superseded;
        }
        if self.url.trim().is_empty() {
            self.phase = Phase::FetchFailed;
            return FetchDecision::EmptyInput;
        }
        self.phase = Phase::Fetching;
        FetchDecision::Start {
            url: self.url.clone(),
            generation,
        }
    }

    /// A fetch completed with a resolved video. Returns `false` when the
    /// completion was stale and nothing was applied.
    pub fn fetch_succeeded(&mut self, generation: u64, video: Video) -> bool {
        if generation != self.fetch_generation {
            return false;
        }
        self.handle = Some(video);
        self.phase = Phase::FetchSucceeded;
        true
    }

    /// A fetch completed with an error: the handle is discarded so it can
    /// never be reused silently. Returns `false` when the completion was
    /// stale and nothing was applied.
    pub fn fetch_failed(&mut self, generation: u64) -> bool {
        if generation != self.fetch_generation {
            return false;
        }
        self.handle = None;
        self.phase = Phase::FetchFailed;
        true
    }

    /// The destination chooser closed. A cancelled dialog leaves the prior
    /// choice in place; a selection is stored and returned.
    pub fn destination_chosen(&mut self, directory: Option<PathBuf>) -> Option<&Path> {
        if let Some(dir) = directory {
            self.destination = Some(dir);
            return self.destination.as_deref();
        }
        None
    }

    /// The directory downloads land in: the chosen one, or the process
    /// working directory when none was picked.
    pub fn download_destination(&self) -> PathBuf {
        self.destination
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    /// A download was requested. On refusal nothing changes, not even the
    /// phase.
    pub fn begin_download(&mut self) -> Result<DownloadPlan, DownloadRefusal> {
        if matches!(self.phase, Phase::Fetching | Phase::Downloading) {
            return Err(DownloadRefusal::Busy);
        }
        let video = match &self.handle {
            Some(video) => video.clone(),
            None => return Err(DownloadRefusal::NoVideo),
        };
        self.phase = Phase::Downloading;
        Ok(DownloadPlan {
            video,
            format: self.format,
            destination: self.download_destination(),
        })
    }

    /// The in-flight download finished.
    pub fn download_finished(&mut self, success: bool) {
        self.phase = if success {
            Phase::DownloadSucceeded
        } else {
            Phase::DownloadFailed
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved_video() -> Video {
        Video {
            id: "dQw4w9WgXcQ".to_string(),
            title: "A video".to_string(),
            thumbnail: None,
            formats: vec![],
        }
    }

    #[test]
    fn typing_arms_a_new_generation_each_time() {
        let mut session = Session::new();

        let first = session.input_changed("a");
        let second = session.input_changed("ab");

        assert!(second > first);
        assert_eq!(session.phase(), Phase::PendingFetch);
    }

    #[test]
    fn only_the_latest_timer_starts_a_fetch() {
        let mut session = Session::new();

        let stale = session.input_changed("a");
        let current = session.input_changed("ab");

        assert_eq!(session.debounce_fired(stale), FetchDecision::Superseded);
        assert_eq!(
            session.debounce_fired(current),
            FetchDecision::Start {
                url: "ab".to_string(),
                generation: current,
            }
        );
        assert_eq!(session.phase(), Phase::Fetching);
    }

    #[test]
    fn empty_input_fails_without_fetching_and_keeps_the_old_handle() {
        let mut session = Session::new();

        let generation = session.input_changed("https://youtu.be/abc");
        session.debounce_fired(generation);
        assert!(session.fetch_succeeded(generation, resolved_video()));

        let generation = session.input_changed("");
        assert_eq!(session.debounce_fired(generation), FetchDecision::EmptyInput);
        assert_eq!(session.phase(), Phase::FetchFailed);
        assert!(session.handle().is_some());
    }

    #[test]
    fn a_stale_fetch_completion_is_ignored_entirely() {
        let mut session = Session::new();

        let stale = session.input_changed("https://youtu.be/old");
        session.debounce_fired(stale);

        let current = session.input_changed("https://youtu.be/new");
        session.debounce_fired(current);

        assert!(!session.fetch_succeeded(stale, resolved_video()));
        assert!(session.handle().is_none());
        assert_eq!(session.phase(), Phase::Fetching);

        assert!(!session.fetch_failed(stale));
        assert_eq!(session.phase(), Phase::Fetching);
    }

    #[test]
    fn a_failed_fetch_discards_the_handle() {
        let mut session = Session::new();

        let generation = session.input_changed("https://youtu.be/abc");
        session.debounce_fired(generation);
        assert!(session.fetch_succeeded(generation, resolved_video()));

        let generation = session.input_changed("https://youtu.be/gone");
        session.debounce_fired(generation);
        assert!(session.fetch_failed(generation));

        assert!(session.handle().is_none());
        assert_eq!(session.phase(), Phase::FetchFailed);
    }

    #[test]
    fn cancelling_the_second_chooser_keeps_the_first_destination() {
        let mut session = Session::new();

        assert!(
            session
                .destination_chosen(Some(PathBuf::from("/downloads")))
                .is_some()
        );
        assert!(session.destination_chosen(None).is_none());

        assert_eq!(session.destination(), Some(Path::new("/downloads")));
    }

    #[test]
    fn download_without_a_fetch_is_refused_without_any_state_change() {
        let mut session = Session::new();

        assert_eq!(session.begin_download(), Err(DownloadRefusal::NoVideo));
        assert_eq!(session.phase(), Phase::Idle);

        let generation = session.input_changed("https://youtu.be/gone");
        session.debounce_fired(generation);
        session.fetch_failed(generation);

        assert_eq!(session.begin_download(), Err(DownloadRefusal::NoVideo));
        assert_eq!(session.phase(), Phase::FetchFailed);
    }

    #[test]
    fn download_uses_the_handle_format_and_destination() {
        let mut session = Session::new();
        session.set_format(MediaFormat::Mp3);
        session.destination_chosen(Some(PathBuf::from("/downloads")));

        let generation = session.input_changed("https://youtu.be/abc");
        session.debounce_fired(generation);
        session.fetch_succeeded(generation, resolved_video());

        let plan = session.begin_download().unwrap();
        assert_eq!(plan.video.id, "dQw4w9WgXcQ");
        assert_eq!(plan.format, MediaFormat::Mp3);
        assert_eq!(plan.destination, PathBuf::from("/downloads"));
        assert_eq!(session.phase(), Phase::Downloading);
    }

    #[test]
    fn downloads_fall_back_to_the_working_directory() {
        let session = Session::new();

        assert_eq!(
            session.download_destination(),
            std::env::current_dir().unwrap()
        );
    }

    #[test]
    fn a_second_download_request_is_refused_while_one_is_in_flight() {
        let mut session = Session::new();

        let generation = session.input_changed("https://youtu.be/abc");
        session.debounce_fired(generation);
        session.fetch_succeeded(generation, resolved_video());

        assert!(session.begin_download().is_ok());
        assert_eq!(session.begin_download(), Err(DownloadRefusal::Busy));

        session.download_finished(true);
        assert_eq!(session.phase(), Phase::DownloadSucceeded);
        assert!(session.begin_download().is_ok());
    }

    #[test]
    fn download_during_an_in_flight_fetch_is_refused() {
        let mut session = Session::new();

        let generation = session.input_changed("https://youtu.be/abc");
        session.debounce_fired(generation);
        session.fetch_succeeded(generation, resolved_video());

        let generation = session.input_changed("https://youtu.be/next");
        session.debounce_fired(generation);
        assert_eq!(session.phase(), Phase::Fetching);

        assert_eq!(session.begin_download(), Err(DownloadRefusal::Busy));
    }

    #[test]
    fn typing_while_downloading_keeps_the_download_phase() {
        let mut session = Session::new();

        let generation = session.input_changed("https://youtu.be/abc");
        session.debounce_fired(generation);
        session.fetch_succeeded(generation, resolved_video());
        session.begin_download().unwrap();

        session.input_changed("https://youtu.be/next");
        assert_eq!(session.phase(), Phase::Downloading);

        session.download_finished(false);
        assert_eq!(session.phase(), Phase::DownloadFailed);
    }
}
