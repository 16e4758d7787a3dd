//! Model artifact download.
//!
//! The fetcher reports through an in-band event channel and never touches
//! the process-wide bus — the coordinator owns the terminal state
//! transition and decides what the rest of the application gets to see.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;

use super::registry::{ArtifactInfo, REQUIRED_ARTIFACTS};

// ---------------------------------------------------------------------------
// FetchEvent
// ---------------------------------------------------------------------------

/// One event on the fetch stream.
///
/// A fetch emits any number of `Status`/`Progress` events and exactly one
/// terminal event, `Done` or `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchEvent {
    /// Free-text phase description (which artifact is in flight).
    Status(String),
    /// Integer percentage 0–100 for the artifact currently transferring.
    Progress(u8),
    /// All required artifacts are now on disk.
    Done,
    /// The fetch stopped; remaining artifacts were not attempted.
    Failed(String),
}

// ---------------------------------------------------------------------------
// FetchError
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("write failed: {0}")]
    Io(#[from] io::Error),
}

// ---------------------------------------------------------------------------
// ModelFetcher trait
// ---------------------------------------------------------------------------

/// Asynchronous artifact fetch, reporting through `events`.
///
/// Implementations must finish the stream with exactly one terminal event
/// and treat an already-present artifact as fetched (skip, not error).
#[async_trait]
pub trait ModelFetcher: Send + Sync {
    async fn fetch(&self, events: mpsc::Sender<FetchEvent>);
}

// Compile-time assertion: Box<dyn ModelFetcher> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn ModelFetcher>) {}
};

// ---------------------------------------------------------------------------
// HttpModelFetcher
// ---------------------------------------------------------------------------

/// Streams the required artifacts from their source URLs into the models
/// directory.
///
/// Each artifact lands in a `.part` file first and is renamed into place
/// only after the transfer completes, so an interrupted download never
/// leaves a truncated artifact that would pass the presence check.
pub struct HttpModelFetcher {
    client: reqwest::Client,
    models_dir: PathBuf,
}

impl HttpModelFetcher {
    pub fn new(models_dir: impl Into<PathBuf>) -> Self {
        Self {
            client: reqwest::Client::new(),
            models_dir: models_dir.into(),
        }
    }

    async fn fetch_one(
        &self,
        artifact: &ArtifactInfo,
        events: &mpsc::Sender<FetchEvent>,
    ) -> Result<(), FetchError> {
        let target = artifact.target_path(&self.models_dir);
        if target.is_file() {
            return Ok(());
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }

        let _ = events
            .send(FetchEvent::Status(format!(
                "Downloading {}...",
                artifact.name
            )))
            .await;

        let response = self
            .client
            .get(artifact.url)
            .send()
            .await?
            .error_for_status()?;
        let total = response.content_length().unwrap_or(0);

        let part = target.with_extension("gguf.part");
        let mut file = fs::File::create(&part).await?;
        let mut stream = response.bytes_stream();
        let mut downloaded = 0u64;
        let mut last_percent = u8::MAX;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;

            if total > 0 {
                let percent = transfer_percent(downloaded, total);
                if percent != last_percent {
                    last_percent = percent;
                    let _ = events.send(FetchEvent::Progress(percent)).await;
                }
            }
        }
        file.flush().await?;
        drop(file);

        fs::rename(&part, &target).await?;
        Ok(())
    }
}

/// Integer transfer percentage, saturating at 100.
fn transfer_percent(downloaded: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    ((downloaded.min(total) * 100) / total) as u8
}

#[async_trait]
impl ModelFetcher for HttpModelFetcher {
    async fn fetch(&self, events: mpsc::Sender<FetchEvent>) {
        for artifact in REQUIRED_ARTIFACTS {
            if let Err(e) = self.fetch_one(artifact, &events).await {
                log::error!("fetch of {} failed: {e}", artifact.file_name);
                let _ = events
                    .send(FetchEvent::Failed(format!("{}: {e}", artifact.name)))
                    .await;
                return;
            }
        }
        let _ = events.send(FetchEvent::Done).await;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
