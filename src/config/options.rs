use serde::Deserialize;

use crate::error::EnrichError;

/// ================================
/// Per-invocation enricher options
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct EnricherOptions {
    /// Field name the extracted token is written into on every output record.
    #[serde(default = "default_access_token_field_name")]
    pub access_token_field_name: String,
    /// Override for the refresh probe target. When absent, the probe target is
    /// derived from the credential record itself.
    #[serde(default)]
    pub probe_url: Option<String>,
}

fn default_access_token_field_name() -> String {
    "accessToken".to_string()
}

impl Default for EnricherOptions {
    fn default() -> Self {
        Self {
            access_token_field_name: default_access_token_field_name(),
            probe_url: None,
        }
    }
}

impl EnricherOptions {
    /// Resolved once at invocation start, before any store call.
    pub fn validate(&self, node: &str) -> Result<(), EnrichError> {
        if self.access_token_field_name.trim().is_empty() {
            return Err(EnrichError::InvalidOptions {
                node: node.to_string(),
                reason: "access_token_field_name must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
