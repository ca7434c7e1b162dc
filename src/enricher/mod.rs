pub mod enrich;
pub mod extract;
pub mod refresh;

use tracing::debug;

use crate::config::options::EnricherOptions;
use crate::error::EnrichError;
use crate::record::{BatchItem, ExecutionContext};
use crate::store::CredentialStore;

/// Runs the whole enrichment for one credential: trigger a best-effort
/// refresh, fetch the credential record, extract the bearer token, merge it
/// into every input item.
#[derive(Debug, Clone)]
pub struct TokenEnricher<S> {
    store: S,
    credential_name: String,
    node_name: String,
    options: EnricherOptions,
}

impl<S: CredentialStore> TokenEnricher<S> {
    pub fn new(
        store: S,
        credential_name: impl Into<String>,
        node_name: impl Into<String>,
        options: EnricherOptions,
    ) -> Self {
        Self {
            store,
            credential_name: credential_name.into(),
            node_name: node_name.into(),
            options,
        }
    }

    /// The sole externally observable operation: input batch in, index-aligned
    /// output batch out. Fatal before any item is produced when the credential
    /// cannot be retrieved or holds no recognizable token.
    pub async fn run(&self, ctx: &ExecutionContext) -> Result<Vec<BatchItem>, EnrichError> {
        self.options.validate(&self.node_name)?;

        let refreshed = refresh::trigger(
            &self.store,
            &self.credential_name,
            self.options.probe_url.as_deref(),
        )
        .await;

        let record = match refreshed {
            Some(record) => record,
            None => self.store.fetch(&self.credential_name).await.map_err(|source| {
                EnrichError::CredentialRetrieval {
                    node: self.node_name.clone(),
                    name: self.credential_name.clone(),
                    source,
                }
            })?,
        };

        let token = extract::access_token(&record).ok_or_else(|| EnrichError::TokenNotFound {
            node: self.node_name.clone(),
            name: self.credential_name.clone(),
        })?;
        debug!(
            "node '{}': extracted access token for credential '{}', enriching {} item(s)",
            self.node_name,
            self.credential_name,
            ctx.items.len()
        );

        enrich::batch(ctx, token, &self.options.access_token_field_name).map_err(
            |(index, source)| EnrichError::Item {
                node: self.node_name.clone(),
                index,
                source,
            },
        )
    }
}
