//! Downloading every URL of a list file.

use crate::controller::WorkerEvent;
use crate::error::Result;
use crate::provider::VideoProvider;
use crate::MediaFormat;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

/// Downloads every entry of `path`, one at a time.
///
/// Entries are trimmed and blank lines are skipped. A failing entry is
/// reported and the batch moves on to the next one. Only a file that
/// cannot be read at all ends the batch early.
pub async fn run(
    provider: &dyn VideoProvider,
    path: &Path,
    format: MediaFormat,
    destination: &Path,
    events: &mpsc::UnboundedSender<WorkerEvent>,
) {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(error) => {
            let _ = events.send(WorkerEvent::BatchFinished {
                result: Err(error.into()),
            });
            return;
        }
    };

    let urls: Vec<&str> = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    let total = urls.len();
    log::info!("Starting a batch of {total} downloads from {}", path.display());
    let _ = events.send(WorkerEvent::BatchStarted { total });

    for (index, url) in urls.iter().enumerate() {
        let result = download_entry(provider, url, format, destination).await;
        if let Err(error) = &result {
            log::warn!("Batch entry {url} failed: {error}");
        }
        let _ = events.send(WorkerEvent::BatchItemFinished {
            index: index + 1,
            total,
            url: url.to_string(),
            result,
        });
    }

    let _ = events.send(WorkerEvent::BatchFinished { result: Ok(()) });
}

async fn download_entry(
    provider: &dyn VideoProvider,
    url: &str,
    format: MediaFormat,
    destination: &Path,
) -> Result<PathBuf> {
    let video = provider.resolve(url).await?;
    provider.download(&video, format, destination, None).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::fetcher::{ProgressCallback, ThumbnailImage};
    use crate::model::Video;
    use async_trait::async_trait;
    use std::io::Write;
    use std::sync::Mutex;

    struct ListProvider {
        downloaded: Mutex<Vec<String>>,
        unavailable: &'static str,
    }

    #[async_trait]
    impl VideoProvider for ListProvider {
        async fn resolve(&self, url: &str) -> Result<Video> {
            if url == self.unavailable {
                return Err(Error::Unavailable);
            }
            Ok(Video {
                id: url.to_string(),
                title: url.to_string(),
                thumbnail: None,
                formats: vec![],
            })
        }

        async fn fetch_thumbnail(&self, _video: &Video) -> Result<ThumbnailImage> {
            Err(Error::MissingThumbnail)
        }

        async fn download(
            &self,
            video: &Video,
            _format: MediaFormat,
            destination: &Path,
            _progress: Option<ProgressCallback>,
        ) -> Result<PathBuf> {
            self.downloaded.lock().unwrap().push(video.id.clone());
            Ok(destination.join(format!("{}.mp4", video.id)))
        }
    }

    fn collect(mut inbox: mpsc::UnboundedReceiver<WorkerEvent>) -> Vec<WorkerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = inbox.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn a_failing_entry_does_not_stop_the_rest() {
        let provider = ListProvider {
            downloaded: Mutex::new(Vec::new()),
            unavailable: "https://youtu.be/gone",
        };
        let dir = tempfile::tempdir().unwrap();
        let list = dir.path().join("urls.txt");
        let mut file = std::fs::File::create(&list).unwrap();
        writeln!(file, "https://youtu.be/one").unwrap();
        writeln!(file, "  ").unwrap();
        writeln!(file, "https://youtu.be/gone").unwrap();
        writeln!(file, "https://youtu.be/two").unwrap();

        let (events, inbox) = mpsc::unbounded_channel();
        run(&provider, &list, MediaFormat::Mp4, dir.path(), &events).await;

        assert_eq!(
            *provider.downloaded.lock().unwrap(),
            vec![
                "https://youtu.be/one".to_string(),
                "https://youtu.be/two".to_string(),
            ]
        );

        let events = collect(inbox);
        assert_eq!(events.len(), 5);
        assert!(matches!(events[0], WorkerEvent::BatchStarted { total: 3 }));
        assert!(matches!(
            &events[1],
            WorkerEvent::BatchItemFinished { index: 1, total: 3, result: Ok(_), .. }
        ));
        assert!(matches!(
            &events[2],
            WorkerEvent::BatchItemFinished {
                index: 2,
                result: Err(Error::Unavailable),
                ..
            }
        ));
        assert!(matches!(
            &events[3],
            WorkerEvent::BatchItemFinished { index: 3, total: 3, result: Ok(_), .. }
        ));
        assert!(matches!(
            &events[4],
            WorkerEvent::BatchFinished { result: Ok(()) }
        ));
    }

    #[tokio::test]
    async fn an_unreadable_file_ends_the_batch_immediately() {
        let provider = ListProvider {
            downloaded: Mutex::new(Vec::new()),
            unavailable: "",
        };
        let dir = tempfile::tempdir().unwrap();

        let (events, inbox) = mpsc::unbounded_channel();
        run(
            &provider,
            &dir.path().join("missing.txt"),
            MediaFormat::Mp4,
            dir.path(),
            &events,
        )
        .await;

        let events = collect(inbox);
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            WorkerEvent::BatchFinished { result: Err(Error::IO(_)) }
        ));
        assert!(provider.downloaded.lock().unwrap().is_empty());
    }
}
