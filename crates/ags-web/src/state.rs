//! Application state.

use ags_graph::GraphClient;
use ags_sync::DocumentStore;

/// Store handles shared across handlers, constructed once at startup.
#[derive(Clone)]
pub struct AppState {
    pub store: DocumentStore,
    pub graph: GraphClient,
}
