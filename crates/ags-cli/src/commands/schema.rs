//! Schema bootstrap command.

use anyhow::Result;
use colored::Colorize;

use ags_graph::schema::initialize_schema;

use super::StoreArgs;

pub async fn execute(stores: &StoreArgs) -> Result<()> {
    let graph = stores.connect_graph().await?;
    initialize_schema(&graph).await?;

    println!("{} graph constraints are in place", "✓".green());
    Ok(())
}
