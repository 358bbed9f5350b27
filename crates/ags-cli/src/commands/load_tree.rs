//! Structured-tree load command.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use ags_core::{build_hierarchy, TreeNode};
use ags_graph::{replace, schema, GraphMutator, Label};
use ags_sync::{DocumentStore, RecordSource};

use super::StoreArgs;

#[derive(Args)]
pub struct LoadTreeArgs {
    /// Build the tree from the document store's records
    #[arg(long)]
    pub from_store: bool,

    /// Read the tree from a local JSON file instead of the record source
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Record-source endpoint
    #[arg(long, env = "AREAS_API")]
    pub areas_api: Option<String>,

    /// Wipe managed labels before loading
    #[arg(long)]
    pub full_refresh: bool,
}

pub async fn execute(args: LoadTreeArgs, stores: &StoreArgs) -> Result<()> {
    let roots: Vec<TreeNode> = if args.from_store {
        let store = DocumentStore::connect(&stores.mongo_uri, &stores.database)
            .await
            .context("failed to connect to the document store")?;
        let records = store.list_records(Label::Area.collection()).await?;
        build_hierarchy(&records)
    } else if let Some(path) = &args.file {
        let body = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&body)
            .with_context(|| format!("failed to parse {}", path.display()))?
    } else if let Some(url) = &args.areas_api {
        RecordSource::new(url.clone()).fetch_tree().await
    } else {
        bail!("one of --from-store, --file, or --areas-api (AREAS_API) is required");
    };

    if roots.is_empty() {
        println!("{} nothing to load", "!".yellow());
        return Ok(());
    }

    let graph = stores.connect_graph().await?;
    schema::initialize_schema(&graph).await?;

    let mutator = GraphMutator::new(graph);
    let stats = if args.full_refresh {
        replace::full_refresh(&mutator, &roots).await?
    } else {
        replace::replace_roots(&mutator, &roots).await?
    };

    println!(
        "{} loaded {} nodes and {} relationships",
        "✓".green(),
        stats.nodes,
        stats.relationships
    );
    Ok(())
}
