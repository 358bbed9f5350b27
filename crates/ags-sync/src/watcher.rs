//! Per-collection change-stream consumption.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use ags_core::ChangeEvent;
use ags_graph::Label;

use crate::feed::{ChangeFeed, Checkpoint, EventStream, FeedError};
use crate::sink::EventSink;

/// Retry pacing for stream recovery.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Wait before re-subscribing after a transient fault.
    pub resumable_delay: Duration,
    /// Wait before restarting from "now" after the history window is lost.
    pub rewind_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            resumable_delay: Duration::from_secs(5),
            rewind_delay: Duration::from_secs(2),
        }
    }
}

enum Outcome {
    Shutdown,
    Fault(FeedError),
}

/// Tails one collection's change feed and applies every event in arrival
/// order. Events across collections are not ordered relative to each other.
pub struct SourceWatcher {
    collection: String,
    label: Label,
    feed: Arc<dyn ChangeFeed>,
    sink: Arc<dyn EventSink>,
    retry: RetryPolicy,
    shutdown: watch::Receiver<bool>,
}

impl SourceWatcher {
    pub fn new(
        collection: impl Into<String>,
        label: Label,
        feed: Arc<dyn ChangeFeed>,
        sink: Arc<dyn EventSink>,
        retry: RetryPolicy,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            collection: collection.into(),
            label,
            feed,
            sink,
            retry,
            shutdown,
        }
    }

    /// Run until shutdown. Stream faults trigger re-subscription per the
    /// retry policy; a single bad event never terminates the loop.
    pub async fn run(mut self) {
        info!(
            collection = %self.collection,
            label = self.label.as_str(),
            "watcher started"
        );
        let mut checkpoint: Option<Checkpoint> = None;
        loop {
            if self.shutdown_requested() {
                break;
            }
            let outcome = match self
                .feed
                .subscribe(&self.collection, checkpoint.clone())
                .await
            {
                Ok(stream) => self.consume(stream, &mut checkpoint).await,
                Err(err) => Outcome::Fault(err),
            };
            match outcome {
                Outcome::Shutdown => break,
                Outcome::Fault(err) => {
                    if !self.pace(err, &mut checkpoint).await {
                        break;
                    }
                }
            }
        }
        info!(collection = %self.collection, "watcher stopped");
    }

    async fn consume(
        &mut self,
        mut stream: Box<dyn EventStream>,
        checkpoint: &mut Option<Checkpoint>,
    ) -> Outcome {
        loop {
            let next = tokio::select! {
                next = stream.next_event() => next,
                result = self.shutdown.changed() => {
                    if result.is_err() || *self.shutdown.borrow() {
                        return Outcome::Shutdown;
                    }
                    continue;
                }
            };
            match next {
                Some(Ok(raw)) => {
                    self.handle_event(&raw).await;
                    if let Some(position) = stream.checkpoint() {
                        *checkpoint = Some(position);
                    }
                }
                Some(Err(err)) => return Outcome::Fault(err),
                None => {
                    return Outcome::Fault(FeedError::Resumable(
                        "change stream ended".to_string(),
                    ))
                }
            }
        }
    }

    /// Decode, translate, and apply one event. Failures are logged with the
    /// offending payload and skipped.
    async fn handle_event(&self, raw: &Value) {
        let event = match ChangeEvent::from_raw(raw) {
            Ok(event) => event,
            Err(err) => {
                warn!(
                    collection = %self.collection,
                    %err,
                    payload = %raw,
                    "skipping undecodable change event"
                );
                return;
            }
        };
        debug!(
            collection = %self.collection,
            record_id = %event.record_id,
            operation = event.operation.as_str(),
            "applying change event"
        );
        if let Err(err) = self.sink.apply(self.label, &event).await {
            error!(
                collection = %self.collection,
                record_id = %event.record_id,
                %err,
                payload = %raw,
                "failed to apply change event; skipping"
            );
        }
    }

    /// Log a stream fault and wait out the retry delay. Non-resumable faults
    /// drop the checkpoint so the next subscription starts from "now".
    /// Returns false when shutdown interrupts the wait.
    async fn pace(&mut self, err: FeedError, checkpoint: &mut Option<Checkpoint>) -> bool {
        let delay = if err.is_resumable() {
            warn!(
                collection = %self.collection,
                %err,
                delay = ?self.retry.resumable_delay,
                "change stream interrupted; re-subscribing"
            );
            self.retry.resumable_delay
        } else {
            warn!(
                collection = %self.collection,
                %err,
                delay = ?self.retry.rewind_delay,
                "change stream history lost; restarting from now"
            );
            *checkpoint = None;
            self.retry.rewind_delay
        };
        tokio::select! {
            _ = sleep(delay) => true,
            result = self.shutdown.changed() => {
                result.is_ok() && !*self.shutdown.borrow()
            }
        }
    }

    fn shutdown_requested(&self) -> bool {
        *self.shutdown.borrow()
    }
}
