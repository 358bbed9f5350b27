//! Service command: schema bootstrap, watchers, and the read API.

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use tracing::{error, info};

use ags_graph::{replace, schema, GraphMutator};
use ags_sync::{shutdown_channel, GraphSink, MongoChangeFeed, RecordSource, SyncSupervisor};
use ags_web::AppState;

use super::StoreArgs;

#[derive(Args)]
pub struct ServeArgs {
    /// Port for the read API
    #[arg(long, default_value = "8000")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Record-source endpoint for the initial tree load
    #[arg(long, env = "AREAS_API")]
    pub areas_api: Option<String>,

    /// Fail node deletion while edges remain instead of detaching them
    #[arg(long)]
    pub no_detach: bool,

    /// Wipe managed labels and reload from the record source before streaming
    #[arg(long, env = "NEO4J_FULL_REFRESH")]
    pub full_refresh: bool,
}

pub async fn execute(args: ServeArgs, stores: &StoreArgs) -> Result<()> {
    let (store, graph) = stores.connect().await?;
    schema::initialize_schema(&graph).await?;

    let mutator = GraphMutator::new(graph.clone());

    // Seed the graph from the structured-tree source when one is configured.
    if let Some(url) = &args.areas_api {
        let source = RecordSource::new(url.clone());
        let roots = source.fetch_tree().await;
        if roots.is_empty() {
            info!("record source returned no roots; skipping initial tree load");
        } else if args.full_refresh {
            replace::full_refresh(&mutator, &roots).await?;
        } else {
            replace::replace_roots(&mutator, &roots).await?;
        }
    }

    let feed = Arc::new(MongoChangeFeed::new(
        store.client().clone(),
        stores.database.clone(),
    ));
    let sink = Arc::new(GraphSink::new(mutator, !args.no_detach));
    let supervisor = SyncSupervisor::new(feed, sink);

    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    let supervisor_handle = tokio::spawn(supervisor.run(shutdown_rx));

    let state = AppState {
        store,
        graph,
    };
    let host = args.host.clone();
    let server_handle = tokio::spawn(async move {
        if let Err(err) = ags_web::run_server(state, &host, args.port).await {
            error!(%err, "web server exited");
        }
    });

    banner(&args.host, args.port);

    tokio::signal::ctrl_c().await?;
    info!("shutting down");

    // Watchers finish their in-flight mutation before exiting; the read
    // surface can stop abruptly.
    let _ = shutdown_tx.send(true);
    supervisor_handle.await?;
    server_handle.abort();

    Ok(())
}

fn banner(host: &str, port: u16) {
    println!();
    println!("  {} {}", "AGS".cyan().bold(), "Sync Service".bold());
    println!();
    println!("  {}        http://{}:{}", "API".green(), host, port);
    println!(
        "  {}  http://{}:{}/areas-structured",
        "Hierarchy".green(),
        host,
        port
    );
    println!();
    println!("  {}", "Ctrl+C to stop".dimmed());
    println!();
}
