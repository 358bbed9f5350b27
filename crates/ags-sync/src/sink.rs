//! Application seam between the watcher and the graph store.

use async_trait::async_trait;

use ags_core::ChangeEvent;
use ags_graph::{translate, GraphMutator, Label};

/// Applies one decoded change event downstream.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn apply(&self, label: Label, event: &ChangeEvent) -> anyhow::Result<()>;
}

/// Production sink: translate the event and run the statements in order.
pub struct GraphSink {
    mutator: GraphMutator,
    detach_delete: bool,
}

impl GraphSink {
    pub fn new(mutator: GraphMutator, detach_delete: bool) -> Self {
        Self {
            mutator,
            detach_delete,
        }
    }
}

#[async_trait]
impl EventSink for GraphSink {
    async fn apply(&self, label: Label, event: &ChangeEvent) -> anyhow::Result<()> {
        let statements = translate(event, label, self.detach_delete);
        self.mutator.apply(&statements).await
    }
}
