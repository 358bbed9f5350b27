//! Flat-collection backfill command.

use anyhow::Result;
use colored::Colorize;

use ags_graph::{schema, GraphMutator};
use ags_sync::backfill::backfill_collections;

use super::StoreArgs;

pub async fn execute(stores: &StoreArgs) -> Result<()> {
    let (store, graph) = stores.connect().await?;
    schema::initialize_schema(&graph).await?;

    let mutator = GraphMutator::new(graph);
    let stats = backfill_collections(&store, &mutator).await?;

    println!(
        "{} mirrored {} records into the graph",
        "✓".green(),
        stats.records
    );
    Ok(())
}
