//! Route handlers for the read surface.

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use ags_core::{build_hierarchy, TreeNode};
use ags_graph::Label;

use crate::state::AppState;

/// Liveness probe.
pub async fn root() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// The ordered area hierarchy, rebuilt from the document store on every
/// request.
pub async fn areas_structured(
    State(state): State<AppState>,
) -> Result<Json<Vec<TreeNode>>, (StatusCode, String)> {
    let records = state
        .store
        .list_records(Label::Area.collection())
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(build_hierarchy(&records)))
}

/// Node and relationship totals from the graph store.
pub async fn graph_counts(
    State(state): State<AppState>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let counts = state
        .graph
        .get_counts()
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(json!({
        "nodes": counts.nodes,
        "relationships": counts.relationships,
    })))
}
