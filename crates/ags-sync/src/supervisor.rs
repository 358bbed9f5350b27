//! Concurrent supervision of per-collection watchers.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use ags_graph::Label;

use crate::feed::ChangeFeed;
use crate::sink::EventSink;
use crate::watcher::{RetryPolicy, SourceWatcher};

/// Create the shutdown signal pair shared by the supervisor's watchers.
pub fn shutdown_channel() -> (watch::Sender<bool>, watch::Receiver<bool>) {
    watch::channel(false)
}

/// Owns one watcher per managed collection and runs them concurrently.
pub struct SyncSupervisor {
    feed: Arc<dyn ChangeFeed>,
    sink: Arc<dyn EventSink>,
    retry: RetryPolicy,
}

impl SyncSupervisor {
    pub fn new(feed: Arc<dyn ChangeFeed>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            feed,
            sink,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Spawn one watcher per managed collection and wait for all of them.
    ///
    /// Watchers retry their own streams forever; a watcher that panics is
    /// logged without taking the others down. The call returns only after
    /// `shutdown` flips and every watcher has finished its in-flight work.
    pub async fn run(self, shutdown: watch::Receiver<bool>) {
        let mut handles: Vec<(Label, JoinHandle<()>)> = Vec::new();
        for label in Label::ALL {
            let watcher = SourceWatcher::new(
                label.collection(),
                label,
                Arc::clone(&self.feed),
                Arc::clone(&self.sink),
                self.retry.clone(),
                shutdown.clone(),
            );
            handles.push((label, tokio::spawn(watcher.run())));
        }
        info!(watchers = handles.len(), "sync supervisor running");

        for (label, handle) in handles {
            if let Err(err) = handle.await {
                error!(collection = label.collection(), %err, "watcher task aborted");
            }
        }
        info!("sync supervisor stopped");
    }
}
