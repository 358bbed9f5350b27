//! Bulk backfill from flat collection scans.

use anyhow::{Context, Result};
use tracing::info;

use ags_graph::{GraphMutator, GraphStatement, Label};

use crate::store::DocumentStore;

/// Record counts from a backfill run.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackfillStats {
    pub records: usize,
}

/// Mirror the current contents of every managed collection into the graph.
///
/// The streaming path never calls this; it exists to seed an empty graph and
/// to heal the gaps a non-resumable stream fault leaves behind.
pub async fn backfill_collections(
    store: &DocumentStore,
    mutator: &GraphMutator,
) -> Result<BackfillStats> {
    let mut stats = BackfillStats::default();
    for label in Label::ALL {
        let collection = label.collection();
        let records = store
            .list_records(collection)
            .await
            .with_context(|| format!("failed to scan collection '{collection}'"))?;
        info!(
            collection,
            label = label.as_str(),
            count = records.len(),
            "backfilling collection"
        );
        for record in records {
            let statement = GraphStatement::UpsertNode {
                label,
                id: record.id,
                properties: record.fields,
            };
            mutator.apply(std::slice::from_ref(&statement)).await?;
            stats.records += 1;
        }
    }
    info!(records = stats.records, "backfill complete");
    Ok(stats)
}
