//! MongoDB change-stream feed.

use async_trait::async_trait;
use futures::StreamExt;
use mongodb::bson::{Bson, Document};
use mongodb::change_stream::event::{ChangeStreamEvent, OperationType, ResumeToken};
use mongodb::change_stream::ChangeStream;
use mongodb::options::FullDocumentType;
use mongodb::Client;
use serde_json::{json, Value};
use tracing::warn;

use crate::feed::{ChangeFeed, Checkpoint, EventStream, FeedError};

/// Server error codes after which no resume position remains valid:
/// CursorNotFound and ChangeStreamHistoryLost.
const NON_RESUMABLE_CODES: [i32; 2] = [43, 286];

/// Change feed backed by MongoDB change streams.
#[derive(Clone)]
pub struct MongoChangeFeed {
    client: Client,
    database: String,
}

impl MongoChangeFeed {
    pub fn new(client: Client, database: impl Into<String>) -> Self {
        Self {
            client,
            database: database.into(),
        }
    }
}

#[async_trait]
impl ChangeFeed for MongoChangeFeed {
    async fn subscribe(
        &self,
        collection: &str,
        resume_from: Option<Checkpoint>,
    ) -> Result<Box<dyn EventStream>, FeedError> {
        let handle = self
            .client
            .database(&self.database)
            .collection::<Document>(collection);

        // updateLookup gives replace/insert events the whole document, which
        // is what the upsert translation overwrites with.
        let mut watch = handle
            .watch()
            .full_document(FullDocumentType::UpdateLookup);

        if let Some(checkpoint) = resume_from {
            match serde_json::from_value::<ResumeToken>(checkpoint.0) {
                Ok(token) => watch = watch.resume_after(token),
                Err(err) => {
                    warn!(%err, "held checkpoint no longer deserializes; subscribing from now")
                }
            }
        }

        let stream = watch.await.map_err(classify)?;
        Ok(Box::new(MongoEventStream { inner: stream }))
    }
}

struct MongoEventStream {
    inner: ChangeStream<ChangeStreamEvent<Document>>,
}

#[async_trait]
impl EventStream for MongoEventStream {
    async fn next_event(&mut self) -> Option<Result<Value, FeedError>> {
        match self.inner.next().await {
            None => None,
            Some(Ok(event)) => Some(Ok(event_to_json(event))),
            Some(Err(err)) => Some(Err(classify(err))),
        }
    }

    fn checkpoint(&self) -> Option<Checkpoint> {
        let token = self.inner.resume_token()?;
        serde_json::to_value(&token).ok().map(Checkpoint)
    }
}

/// Classify a driver error into the feed fault taxonomy.
fn classify(err: mongodb::error::Error) -> FeedError {
    if let mongodb::error::ErrorKind::Command(ref command) = *err.kind {
        if NON_RESUMABLE_CODES.contains(&command.code) {
            return FeedError::NonResumable(err.to_string());
        }
    }
    FeedError::Resumable(err.to_string())
}

/// Re-shape a driver event into the raw JSON contract the decoder expects.
fn event_to_json(event: ChangeStreamEvent<Document>) -> Value {
    let mut raw = serde_json::Map::new();
    raw.insert(
        "operationType".to_string(),
        Value::String(operation_name(&event.operation_type).to_string()),
    );
    if let Some(key) = event.document_key {
        raw.insert(
            "documentKey".to_string(),
            Bson::Document(key).into_relaxed_extjson(),
        );
    }
    if let Some(document) = event.full_document {
        raw.insert(
            "fullDocument".to_string(),
            Bson::Document(document).into_relaxed_extjson(),
        );
    }
    if let Some(update) = event.update_description {
        raw.insert(
            "updateDescription".to_string(),
            json!({
                "updatedFields": Bson::Document(update.updated_fields).into_relaxed_extjson(),
                "removedFields": update.removed_fields,
            }),
        );
    }
    Value::Object(raw)
}

fn operation_name(operation: &OperationType) -> &'static str {
    match operation {
        OperationType::Insert => "insert",
        OperationType::Update => "update",
        OperationType::Replace => "replace",
        OperationType::Delete => "delete",
        OperationType::Invalidate => "invalidate",
        OperationType::Drop => "drop",
        OperationType::DropDatabase => "dropDatabase",
        OperationType::Rename => "rename",
        _ => "other",
    }
}
