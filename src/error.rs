use thiserror::Error;

/// Fatal failures of a single enrichment invocation.
///
/// Probe failures are deliberately not represented here: the refresh probe is
/// best-effort and its errors are absorbed (and logged) inside the refresh
/// phase. Every variant carries the identity of the node the enricher runs as,
/// so the caller sees one descriptive failure instead of a raw trace.
#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("node '{node}': invalid options: {reason}")]
    InvalidOptions { node: String, reason: String },

    #[error("node '{node}': credential '{name}' could not be retrieved")]
    CredentialRetrieval {
        node: String,
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error(
        "node '{node}': no access token found in credential '{name}' — check the credential \
         structure (recognized shapes: accessToken, access_token, token, oauth.access_token, \
         data.access_token, oauthTokenData.access_token, oauthTokenData.accessToken)"
    )]
    TokenNotFound { node: String, name: String },

    #[error("node '{node}': item {index} failed")]
    Item {
        node: String,
        index: usize,
        #[source]
        source: anyhow::Error,
    },
}

impl EnrichError {
    /// Position of the failing input item, for item-level failures.
    pub fn item_index(&self) -> Option<usize> {
        match self {
            EnrichError::Item { index, .. } => Some(*index),
            _ => None,
        }
    }
}
