//! Graph schema bootstrap (uniqueness constraints).

use anyhow::Result;
use neo4rs::Query;
use tracing::info;

use crate::client::GraphClient;
use crate::model::Label;

/// Ensure the per-label id uniqueness constraints exist.
///
/// Safe to run repeatedly; every statement carries IF NOT EXISTS. Must run
/// before any streaming begins so merge-by-id upserts cannot race into
/// duplicate nodes.
pub async fn initialize_schema(client: &GraphClient) -> Result<()> {
    for label in Label::ALL {
        let statement = format!(
            "CREATE CONSTRAINT {}_id IF NOT EXISTS FOR (n:{}) REQUIRE n.id IS UNIQUE",
            label.as_str().to_lowercase(),
            label.as_str()
        );
        client.execute(Query::new(statement)).await?;
    }

    info!(labels = Label::ALL.len(), "graph schema initialized");
    Ok(())
}
