//! The bridge between the interface and the background work.
//!
//! The [`Controller`] owns the [`Session`] and a handle to a single worker
//! task. Interface callbacks become [`WorkerCommand`]s, the worker answers
//! with [`WorkerEvent`]s, and [`Controller::poll`] turns those into
//! [`Update`]s once per frame. The worker processes one command at a time,
//! so at most one fetch, download or batch is ever in flight.

use crate::batch;
use crate::error::{Error, Result};
use crate::fetcher::{ProgressCallback, ThumbnailImage};
use crate::lang::{Language, Messages, StatusLine};
use crate::model::Video;
use crate::provider::VideoProvider;
use crate::session::{DownloadPlan, DownloadRefusal, FetchDecision, Phase, Session};
use crate::MediaFormat;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Duration;

/// How long the URL input must rest before a fetch is dispatched.
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(1000);

/// Work the controller hands to the worker task.
#[derive(Debug)]
pub enum WorkerCommand {
    /// Resolve a URL and fetch its thumbnail.
    Fetch {
        /// The URL to resolve.
        url: String,
        /// The generation tagging this round of input.
        generation: u64,
    },
    /// Download one video.
    Download {
        /// The resolved plan to carry out.
        plan: DownloadPlan,
    },
    /// Download every URL listed in a file.
    Batch {
        /// The file of URLs, one per line.
        path: PathBuf,
        /// The format every entry is downloaded in.
        format: MediaFormat,
        /// The directory every entry lands in.
        destination: PathBuf,
    },
}

/// A resolved video together with its display thumbnail.
///
/// The thumbnail is optional: failing to fetch it never fails the fetch.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// The resolved video.
    pub video: Video,
    /// The decoded thumbnail, when one could be fetched.
    pub thumbnail: Option<ThumbnailImage>,
}

/// Answers and notifications flowing back from the background.
#[derive(Debug)]
pub enum WorkerEvent {
    /// A debounce timer ran to completion.
    DebounceElapsed {
        /// The generation the timer was armed with.
        generation: u64,
    },
    /// A fetch finished.
    FetchFinished {
        /// The generation the fetch was dispatched with.
        generation: u64,
        /// The resolved video and thumbnail, or the failure.
        result: Result<FetchOutcome>,
    },
    /// A download made progress.
    DownloadProgress {
        /// Bytes written so far.
        bytes: u64,
        /// Current rate in bytes per second.
        rate: f64,
    },
    /// A download finished.
    DownloadFinished {
        /// The downloaded file, or the failure.
        result: Result<PathBuf>,
    },
    /// A URL file was read and its entries counted.
    BatchStarted {
        /// How many entries the file holds.
        total: usize,
    },
    /// One entry of a URL file was processed.
    BatchItemFinished {
        /// How many entries have been processed so far, this one included.
        index: usize,
        /// How many entries the file holds.
        total: usize,
        /// The entry's URL.
        url: String,
        /// The downloaded file, or the failure.
        result: Result<PathBuf>,
    },
    /// A batch ended, or its URL file could not be read.
    BatchFinished {
        /// `Ok` once every entry was processed.
        result: Result<()>,
    },
}

/// A change the interface should apply this frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    /// Show this status line.
    Status(StatusLine),
    /// Show this thumbnail, or clear it.
    Thumbnail(Option<ThumbnailImage>),
    /// Show this download rate, in bytes per second.
    Speed(f64),
    /// Show this batch counter.
    BatchCount {
        /// Entries processed so far.
        done: usize,
        /// Entries in the file.
        total: usize,
    },
}

/// Drives the session from interface callbacks and worker events.
pub struct Controller {
    session: Session,
    language: Language,
    runtime: Handle,
    commands: mpsc::UnboundedSender<WorkerCommand>,
    events: mpsc::UnboundedSender<WorkerEvent>,
    inbox: mpsc::UnboundedReceiver<WorkerEvent>,
    debounce: Option<JoinHandle<()>>,
    deferred_debounce: Option<u64>,
    batch_running: bool,
    pending: Vec<Update>,
}

impl Controller {
    /// Spawns the worker task on `runtime` and returns the controller
    /// driving it.
    pub fn new(provider: Arc<dyn VideoProvider>, runtime: Handle) -> Self {
        let (commands, command_inbox) = mpsc::unbounded_channel();
        let (events, inbox) = mpsc::unbounded_channel();
        runtime.spawn(run_worker(provider, command_inbox, events.clone()));

        Self {
            session: Session::new(),
            language: Language::default(),
            runtime,
            commands,
            events,
            inbox,
            debounce: None,
            deferred_debounce: None,
            batch_running: false,
            pending: Vec::new(),
        }
    }

    /// The session being driven.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The active language.
    pub fn language(&self) -> Language {
        self.language
    }

    /// The message table for the active language.
    pub fn messages(&self) -> &'static Messages {
        self.language.messages()
    }

    /// Switches the interface language.
    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    /// Stores the format choice for subsequent downloads.
    pub fn set_format(&mut self, format: MediaFormat) {
        self.session.set_format(format);
    }

    /// The URL input changed: any armed timer is superseded and a fresh
    /// one starts counting the full delay again.
    pub fn input_changed(&mut self, text: &str) {
        let generation = self.session.input_changed(text);
        if let Some(timer) = self.debounce.take() {
            timer.abort();
        }

        let events = self.events.clone();
        self.debounce = Some(self.runtime.spawn(async move {
            tokio::time::sleep(DEBOUNCE_DELAY).await;
            let _ = events.send(WorkerEvent::DebounceElapsed { generation });
        }));
    }

    /// The destination chooser closed, with a directory or cancelled.
    pub fn destination_chosen(&mut self, directory: Option<PathBuf>) {
        if let Some(chosen) = self.session.destination_chosen(directory) {
            let line = self.language.messages().location_confirmation(chosen);
            self.pending.push(Update::Status(line));
        }
    }

    /// The download button was pressed.
    pub fn download_requested(&mut self) {
        if self.batch_running {
            log::warn!("A batch is already in flight, dropping the download request");
            return;
        }
        match self.session.begin_download() {
            Ok(plan) => {
                log::info!("Downloading {} to {}", plan.video.id, plan.destination.display());
                let _ = self.commands.send(WorkerCommand::Download { plan });
            }
            Err(DownloadRefusal::NoVideo) => {
                let line = self.language.messages().download_failure(&Error::NoVideo);
                self.pending.push(Update::Status(line));
            }
            Err(DownloadRefusal::Busy) => {
                log::warn!("An operation is already in flight, dropping the download request");
            }
        }
    }

    /// The URL file chooser closed, with a file or cancelled.
    pub fn batch_requested(&mut self, file: Option<PathBuf>) {
        let Some(path) = file else {
            let line = self.language.messages().batch_failure(&Error::NoFileSelected);
            self.pending.push(Update::Status(line));
            return;
        };
        if self.batch_running || self.session.phase() == Phase::Downloading {
            log::warn!("An operation is already in flight, dropping the batch request");
            return;
        }

        self.batch_running = true;
        let _ = self.commands.send(WorkerCommand::Batch {
            path,
            format: self.session.format(),
            destination: self.session.download_destination(),
        });
    }

    /// Applies everything the background produced since the last frame.
    pub fn poll(&mut self) -> Vec<Update> {
        while let Ok(event) = self.inbox.try_recv() {
            self.apply(event);
        }
        std::mem::take(&mut self.pending)
    }

    fn apply(&mut self, event: WorkerEvent) {
        match event {
            WorkerEvent::DebounceElapsed { generation } => {
                // A download or batch in flight holds the timer back until
                // it finishes, like every other piece of queued work.
                if self.batch_running || self.session.phase() == Phase::Downloading {
                    self.deferred_debounce = Some(generation);
                } else {
                    self.debounce_elapsed(generation);
                }
            }
            WorkerEvent::FetchFinished { generation, result } => match result {
                Ok(outcome) => {
                    if self.session.fetch_succeeded(generation, outcome.video) {
                        let messages = self.language.messages();
                        self.pending
                            .push(Update::Status(StatusLine::success(messages.fetch_success)));
                        self.pending.push(Update::Thumbnail(outcome.thumbnail));
                    }
                }
                Err(error) => {
                    if self.session.fetch_failed(generation) {
                        let line = self.language.messages().fetch_failure(&error);
                        self.pending.push(Update::Status(line));
                        self.pending.push(Update::Thumbnail(None));
                    }
                }
            },
            WorkerEvent::DownloadProgress { bytes: _, rate } => {
                self.pending.push(Update::Speed(rate));
            }
            WorkerEvent::DownloadFinished { result } => {
                self.session.download_finished(result.is_ok());
                let messages = self.language.messages();
                match result {
                    Ok(path) => {
                        log::info!("Downloaded {}", path.display());
                        self.pending
                            .push(Update::Status(StatusLine::success(messages.download_complete)));
                    }
                    Err(error) => {
                        self.pending
                            .push(Update::Status(messages.download_failure(&error)));
                    }
                }
                self.replay_deferred_debounce();
            }
            WorkerEvent::BatchStarted { total } => {
                self.pending.push(Update::BatchCount { done: 0, total });
            }
            WorkerEvent::BatchItemFinished {
                index,
                total,
                url,
                result,
            } => {
                self.pending.push(Update::BatchCount { done: index, total });
                if let Err(error) = result {
                    let line = self.language.messages().batch_item_failure(&url, &error);
                    self.pending.push(Update::Status(line));
                }
            }
            WorkerEvent::BatchFinished { result } => {
                self.batch_running = false;
                let messages = self.language.messages();
                match result {
                    Ok(()) => {
                        self.pending.push(Update::Status(StatusLine::success(
                            messages.all_downloads_complete,
                        )));
                    }
                    Err(error) => {
                        self.pending.push(Update::Status(messages.batch_failure(&error)));
                    }
                }
                self.replay_deferred_debounce();
            }
        }
    }

    fn debounce_elapsed(&mut self, generation: u64) {
        match self.session.debounce_fired(generation) {
            FetchDecision::Start { url, generation } => {
                log::debug!("Dispatching fetch for {url}");
                let _ = self.commands.send(WorkerCommand::Fetch { url, generation });
            }
            FetchDecision::EmptyInput => {
                let line = self.language.messages().fetch_failure(&Error::EmptyUrl);
                self.pending.push(Update::Status(line));
            }
            FetchDecision::Superseded => {}
        }
    }

    fn replay_deferred_debounce(&mut self) {
        if let Some(generation) = self.deferred_debounce.take() {
            self.debounce_elapsed(generation);
        }
    }
}

/// Processes commands one at a time until the controller goes away.
///
/// Every command runs on its own task, so a panic inside one is reported
/// as a failed operation instead of ending the worker.
async fn run_worker(
    provider: Arc<dyn VideoProvider>,
    mut commands: mpsc::UnboundedReceiver<WorkerCommand>,
    events: mpsc::UnboundedSender<WorkerEvent>,
) {
    while let Some(command) = commands.recv().await {
        match command {
            WorkerCommand::Fetch { url, generation } => {
                let provider = provider.clone();
                let result =
                    isolated(async move { fetch_with_thumbnail(provider.as_ref(), &url).await })
                        .await;
                if events
                    .send(WorkerEvent::FetchFinished { generation, result })
                    .is_err()
                {
                    break;
                }
            }
            WorkerCommand::Download { plan } => {
                let provider = provider.clone();
                let progress = progress_forwarder(&events);
                let result = isolated(async move {
                    provider
                        .download(&plan.video, plan.format, &plan.destination, Some(progress))
                        .await
                })
                .await;
                if events.send(WorkerEvent::DownloadFinished { result }).is_err() {
                    break;
                }
            }
            WorkerCommand::Batch {
                path,
                format,
                destination,
            } => {
                let provider = provider.clone();
                let batch_events = events.clone();
                let task = tokio::spawn(async move {
                    batch::run(provider.as_ref(), &path, format, &destination, &batch_events).await
                });
                if let Err(join_error) = task.await {
                    let _ = events.send(WorkerEvent::BatchFinished {
                        result: Err(join_error.into()),
                    });
                }
            }
        }
    }
}

async fn isolated<T, F>(work: F) -> Result<T>
where
    F: std::future::Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(work).await?
}

async fn fetch_with_thumbnail(provider: &dyn VideoProvider, url: &str) -> Result<FetchOutcome> {
    let video = provider.resolve(url).await?;
    let thumbnail = match provider.fetch_thumbnail(&video).await {
        Ok(image) => Some(image),
        Err(error) => {
            log::warn!("Failed to fetch the thumbnail of {}: {error}", video.id);
            None
        }
    };
    Ok(FetchOutcome { video, thumbnail })
}

fn progress_forwarder(events: &mpsc::UnboundedSender<WorkerEvent>) -> ProgressCallback {
    let events = events.clone();
    Arc::new(move |bytes, rate| {
        let _ = events.send(WorkerEvent::DownloadProgress { bytes, rate });
    })
}
