//! # AGS Graph
//!
//! Neo4j integration for the area graph sync service: the connection
//! client, the closed label/statement model, change-event translation,
//! and full-tree replacement.

pub mod client;
pub mod model;
pub mod mutate;
pub mod replace;
pub mod schema;
pub mod statement;
pub mod translate;

#[cfg(test)]
mod memgraph;

pub use client::{GraphClient, GraphConfig, GraphCounts};
pub use model::{Label, RelType};
pub use mutate::GraphMutator;
pub use statement::{GraphStatement, PropertyMap};
pub use translate::translate;
