//! Structured-tree fetch from the external record source.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::error;

use ags_core::TreeNode;

/// Client for the endpoint that serves the fully structured tree.
///
/// The source is treated as unreliable: timeouts, bad status codes, and
/// malformed bodies all log an error and yield an empty list, so callers
/// treat "no data" as "skip this cycle" and nothing propagates.
#[derive(Clone)]
pub struct RecordSource {
    client: Client,
    url: String,
}

impl RecordSource {
    pub fn new(url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_default();
        Self {
            client,
            url: url.into(),
        }
    }

    /// Retrieve the nested tree from the source.
    pub async fn fetch_tree(&self) -> Vec<TreeNode> {
        match self.try_fetch().await {
            Ok(roots) => roots,
            Err(err) => {
                error!(url = %self.url, %err, "tree fetch failed");
                Vec::new()
            }
        }
    }

    async fn try_fetch(&self) -> anyhow::Result<Vec<TreeNode>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?;
        let body: Value = response.json().await?;

        // The endpoint may wrap the root list in {"data": [...]} or
        // {"results": [...]}.
        let list = match body {
            Value::Array(items) => Value::Array(items),
            Value::Object(mut object) => object
                .remove("data")
                .or_else(|| object.remove("results"))
                .unwrap_or(Value::Array(Vec::new())),
            _ => Value::Array(Vec::new()),
        };

        Ok(serde_json::from_value(list)?)
    }
}
