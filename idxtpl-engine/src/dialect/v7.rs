//! Composable index templates (`/_index_template`), Elasticsearch >= 7.8.

use async_trait::async_trait;
use tracing::debug;

use super::DialectAdapter;
use crate::client::{ClusterClient, IndexTemplateItem};
use crate::equivalence::canonicalize;
use crate::error::{Error, Result};

pub struct IndexTemplateV2<'a> {
    client: &'a ClusterClient,
}

impl<'a> IndexTemplateV2<'a> {
    pub fn new(client: &'a ClusterClient) -> Self {
        Self { client }
    }
}

/// Pick the first match and render its template body canonically.
///
/// First-match-wins is an assumption: the API may return several entries when
/// the name is a wildcard pattern.
fn select_first(name: &str, items: Vec<IndexTemplateItem>) -> Result<String> {
    if items.len() > 1 {
        debug!(
            "{} templates matched {}, using {}",
            items.len(),
            name,
            items[0].name
        );
    }
    let first = items
        .into_iter()
        .next()
        .ok_or_else(|| Error::NotFound(name.to_string()))?;
    canonicalize(&first.index_template)
}

#[async_trait]
impl<'a> DialectAdapter for IndexTemplateV2<'a> {
    async fn put(&self, name: &str, body: &str, create: bool) -> Result<()> {
        self.client.put_index_template(name, body, create).await
    }

    async fn get(&self, name: &str) -> Result<String> {
        let items = self.client.get_index_template(name).await?;
        select_first(name, items)
    }

    async fn delete(&self, name: &str) -> Result<()> {
        self.client.delete_index_template(name).await
    }
}
