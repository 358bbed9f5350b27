//! # AGS Sync
//!
//! The streaming half of the service: change-feed abstraction, the MongoDB
//! feed implementation, per-collection watchers, their supervisor, and the
//! bulk paths (flat backfill, record-source fetch).

pub mod backfill;
pub mod feed;
pub mod mongo;
pub mod sink;
pub mod source;
pub mod store;
pub mod supervisor;
pub mod watcher;

pub use feed::{ChangeFeed, Checkpoint, EventStream, FeedError};
pub use mongo::MongoChangeFeed;
pub use sink::{EventSink, GraphSink};
pub use source::RecordSource;
pub use store::DocumentStore;
pub use supervisor::{shutdown_channel, SyncSupervisor};
pub use watcher::{RetryPolicy, SourceWatcher};
