use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use reqwest::Client;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::enricher::extract;
use crate::store::{CredentialRecord, CredentialStore, ProbeRequest};

/// In-memory, reqwest-backed credential store for hosts that have no
/// credential manager of their own. Holds records keyed by credential name and
/// implements the refresh-before-request contract of `request_with_oauth2`:
/// when the stored token is past its `oauthTokenData.expires_at`, a
/// `grant_type=refresh_token` transaction against the record's token URL runs
/// before the probe request goes out.
#[derive(Debug, Clone)]
pub struct HttpCredentialStore {
    client: Client,
    records: Arc<RwLock<HashMap<String, CredentialRecord>>>,
}

impl HttpCredentialStore {
    pub fn new() -> Self {
        let client = Client::builder().build().expect("Failed to build HTTP client");
        Self {
            client,
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert or replace a credential record.
    pub async fn insert(&self, name: impl Into<String>, record: CredentialRecord) {
        let mut records = self.records.write().await;
        records.insert(name.into(), record);
    }

    async fn refresh_if_expired(&self, name: &str) -> Result<()> {
        let record = self.get(name).await?;
        if !token_expired(&record) {
            return Ok(());
        }

        let token_url = token_url(&record)
            .ok_or_else(|| anyhow!("credential '{name}' is expired but has no token URL"))?;
        let refresh_token = record
            .get("oauthTokenData")
            .and_then(Value::as_object)
            .and_then(|data| data.get("refresh_token"))
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("credential '{name}' is expired but has no refresh token"))?;

        info!("credential '{name}' is expired, refreshing against {token_url}");

        let mut form = HashMap::new();
        form.insert("grant_type", "refresh_token".to_string());
        form.insert("refresh_token", refresh_token.to_string());
        if let Some(client_id) = record.get("clientId").and_then(Value::as_str) {
            form.insert("client_id", client_id.to_string());
        }
        if let Some(client_secret) = record.get("clientSecret").and_then(Value::as_str) {
            form.insert("client_secret", client_secret.to_string());
        }

        let response = self.client.post(&token_url).form(&form).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!("OAuth2 token refresh failed: {}", response.status()));
        }
        let body: Value = response.json().await.context("invalid token endpoint response")?;
        let access_token = body
            .get("access_token")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("token endpoint response carries no access_token"))?;

        let mut records = self.records.write().await;
        let record = records
            .get_mut(name)
            .ok_or_else(|| anyhow!("credential '{name}' disappeared during refresh"))?;
        let data = record
            .entry("oauthTokenData")
            .or_insert_with(|| Value::Object(Default::default()));
        if let Value::Object(data) = data {
            data.insert("access_token".to_string(), Value::String(access_token.to_string()));
            if let Some(expires_in) = body.get("expires_in").and_then(Value::as_i64) {
                let expires_at = Utc::now().timestamp() + expires_in;
                data.insert("expires_at".to_string(), Value::from(expires_at));
            }
            // some providers rotate the refresh token on every refresh
            if let Some(rotated) = body.get("refresh_token").and_then(Value::as_str) {
                data.insert("refresh_token".to_string(), Value::String(rotated.to_string()));
            }
        }
        Ok(())
    }

    async fn get(&self, name: &str) -> Result<CredentialRecord> {
        let records = self.records.read().await;
        records
            .get(name)
            .cloned()
            .ok_or_else(|| anyhow!("credential '{name}' is not configured"))
    }
}

impl Default for HttpCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for HttpCredentialStore {
    async fn fetch(&self, credential: &str) -> Result<CredentialRecord> {
        self.get(credential).await
    }

    async fn request_with_oauth2(&self, credential: &str, probe: ProbeRequest) -> Result<()> {
        self.refresh_if_expired(credential).await?;

        let record = self.get(credential).await?;
        let token = extract::access_token(&record)
            .ok_or_else(|| anyhow!("credential '{credential}' has no access token to authorize the request"))?;

        let mut request = self
            .client
            .request(probe.method.clone(), &probe.url)
            .timeout(probe.timeout)
            .bearer_auth(token);
        if let Some(headers) = &probe.headers {
            for (key, value) in headers {
                request = request.header(key, value);
            }
        }

        let response = request.send().await?;
        if !probe.ignore_http_status && !response.status().is_success() {
            return Err(anyhow!("authorized request failed: {}", response.status()));
        }
        debug!(
            "probe against '{}' returned {}, body discarded",
            probe.url,
            response.status()
        );
        // response dropped without reading the body
        Ok(())
    }
}

fn token_expired(record: &CredentialRecord) -> bool {
    record
        .get("oauthTokenData")
        .and_then(Value::as_object)
        .and_then(|data| data.get("expires_at"))
        .and_then(Value::as_i64)
        .map(|expires_at| expires_at <= Utc::now().timestamp())
        .unwrap_or(false)
}

fn token_url(record: &CredentialRecord) -> Option<String> {
    ["tokenUrl", "token_url"]
        .iter()
        .find_map(|key| record.get(*key))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}
