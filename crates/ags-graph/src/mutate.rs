//! Statement execution against the graph store.

use anyhow::{Context, Result};
use tracing::debug;

use crate::client::GraphClient;
use crate::statement::GraphStatement;

/// Executes translated statement batches in order.
///
/// No transaction spans a batch: a crash mid-batch can leave a partial
/// multi-statement update, and because every statement is individually
/// idempotent, redelivery of the same event converges on the correct state.
#[derive(Clone)]
pub struct GraphMutator {
    client: GraphClient,
}

impl GraphMutator {
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &GraphClient {
        &self.client
    }

    /// Apply statements in order, failing on the first one the store rejects.
    pub async fn apply(&self, statements: &[GraphStatement]) -> Result<()> {
        for statement in statements {
            let cypher = statement.cypher()?;
            debug!(%cypher, "applying graph statement");
            self.client
                .execute(statement.to_query()?)
                .await
                .with_context(|| format!("graph statement failed: {cypher}"))?;
        }
        Ok(())
    }
}
