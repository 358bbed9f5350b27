//! CLI command definitions and handlers.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use ags_graph::{GraphClient, GraphConfig};
use ags_sync::DocumentStore;

pub mod backfill;
pub mod load_tree;
pub mod schema;
pub mod serve;

/// Area Graph Sync - keeps the property graph consistent with the document store
#[derive(Parser)]
#[command(name = "ags")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub stores: StoreArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Connection settings shared by every command.
#[derive(Args, Clone)]
pub struct StoreArgs {
    /// MongoDB connection string
    #[arg(long, env = "MONGO_DETAILS", default_value = "mongodb://localhost:27017")]
    pub mongo_uri: String,

    /// MongoDB database name
    #[arg(long, env = "DATABASE_NAME", default_value = "areas_db")]
    pub database: String,

    /// Neo4j bolt URI
    #[arg(long, env = "NEO4J_URI")]
    pub neo4j_uri: String,

    /// Neo4j user
    #[arg(long, env = "NEO4J_USER")]
    pub neo4j_user: String,

    /// Neo4j password
    #[arg(long, env = "NEO4J_PASSWORD")]
    pub neo4j_password: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the sync service: schema bootstrap, watchers, and the read API
    Serve(serve::ServeArgs),

    /// Mirror the flat collections into the graph
    Backfill,

    /// Load a structured tree through the full-tree replace path
    LoadTree(load_tree::LoadTreeArgs),

    /// Create the graph uniqueness constraints and exit
    Schema,
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Serve(args) => serve::execute(args, &self.stores).await,
            Commands::Backfill => backfill::execute(&self.stores).await,
            Commands::LoadTree(args) => load_tree::execute(args, &self.stores).await,
            Commands::Schema => schema::execute(&self.stores).await,
        }
    }
}

impl StoreArgs {
    /// Connect both stores. Unreachable stores are bootstrap faults: the
    /// command aborts here with a clear diagnostic.
    pub async fn connect(&self) -> Result<(DocumentStore, GraphClient)> {
        let store = DocumentStore::connect(&self.mongo_uri, &self.database)
            .await
            .context("failed to connect to the document store")?;
        let graph = self.connect_graph().await?;
        Ok((store, graph))
    }

    pub async fn connect_graph(&self) -> Result<GraphClient> {
        let config = GraphConfig {
            uri: self.neo4j_uri.clone(),
            user: self.neo4j_user.clone(),
            password: self.neo4j_password.clone(),
        };
        GraphClient::connect(&config)
            .await
            .context("failed to connect to Neo4j")
    }
}
