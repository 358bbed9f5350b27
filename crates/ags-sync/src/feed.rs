//! Change feed abstraction.
//!
//! The watcher consumes feeds through these traits, which keeps stream
//! recovery testable without a live document store.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Opaque resume position within one collection's change feed.
#[derive(Debug, Clone, PartialEq)]
pub struct Checkpoint(pub Value);

/// Stream failure classes.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Transient fault; the stream may be resumed from the last checkpoint.
    #[error("resumable stream fault: {0}")]
    Resumable(String),

    /// The feed's history no longer covers the checkpoint; consumption must
    /// restart from the present and a later backfill heals the gap.
    #[error("non-resumable stream fault: {0}")]
    NonResumable(String),
}

impl FeedError {
    pub fn is_resumable(&self) -> bool {
        matches!(self, Self::Resumable(_))
    }
}

/// A subscribable change feed over named collections.
#[async_trait]
pub trait ChangeFeed: Send + Sync {
    /// Open a subscription starting from `resume_from`, or from "now" when
    /// no checkpoint is held.
    async fn subscribe(
        &self,
        collection: &str,
        resume_from: Option<Checkpoint>,
    ) -> Result<Box<dyn EventStream>, FeedError>;
}

/// An open subscription yielding raw change events in arrival order.
#[async_trait]
pub trait EventStream: Send {
    /// The next raw event, or `None` when the stream ends.
    async fn next_event(&mut self) -> Option<Result<Value, FeedError>>;

    /// Latest resume position, if the feed retains one.
    fn checkpoint(&self) -> Option<Checkpoint>;
}
