//! Document store access.
//!
//! The document store owns record lifecycle; this handle only reads. Full
//! scans serve the bulk backfill paths and the read API, never the
//! streaming path.

use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::Client;
use thiserror::Error;
use tracing::warn;

use ags_core::change::record_id_from_json;
use ags_core::{DecodeError, Record};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("document store error: {0}")]
    Driver(#[from] mongodb::error::Error),
}

/// Read handle on the system-of-record document store.
#[derive(Clone)]
pub struct DocumentStore {
    client: Client,
    database: String,
}

impl DocumentStore {
    pub async fn connect(uri: &str, database: impl Into<String>) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri).await?;
        Ok(Self {
            client,
            database: database.into(),
        })
    }

    /// The shared driver handle, also used to open feed subscriptions.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Full scan of a collection, decoded into records. Documents that do
    /// not decode are logged and dropped rather than failing the scan.
    pub async fn list_records(&self, collection: &str) -> Result<Vec<Record>, StoreError> {
        let handle = self
            .client
            .database(&self.database)
            .collection::<Document>(collection);

        let mut cursor = handle.find(doc! {}).await?;
        let mut records = Vec::new();
        while let Some(document) = cursor.try_next().await? {
            match document_to_record(document) {
                Ok(record) => records.push(record),
                Err(err) => warn!(collection, %err, "skipping undecodable document"),
            }
        }
        Ok(records)
    }
}

/// Decode a stored document into a record, splitting out the id.
pub fn document_to_record(document: Document) -> Result<Record, DecodeError> {
    let value = Bson::Document(document).into_relaxed_extjson();
    let object = value
        .as_object()
        .ok_or_else(|| DecodeError::Malformed("document is not an object".to_string()))?;
    let id_value = object.get("_id").ok_or(DecodeError::MissingField("_id"))?;
    let id = record_id_from_json(id_value)?;
    Record::from_document(id, object)
}
