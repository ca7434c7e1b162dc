use serde_json::Value;
use tracing::{debug, warn};

use crate::store::{CredentialRecord, CredentialStore, ProbeRequest};

/// Best-effort refresh trigger.
///
/// Stores with an explicit `ensure_fresh` capability are asked directly.
/// Otherwise one minimal authorized GET is sent through the store's
/// OAuth2-aware request path, whose refresh-before-request check is the actual
/// point of the call; the response itself is discarded. The record is always
/// refetched after the probe, the pre-probe record serving only as an
/// emergency fallback when that refetch fails.
///
/// Nothing in here aborts the invocation: every failure is logged and degrades
/// to the next fallback, down to returning `None` and leaving the credential
/// fetch phase to get a record or fail hard.
pub async fn trigger<S: CredentialStore>(
    store: &S,
    credential: &str,
    probe_url: Option<&str>,
) -> Option<CredentialRecord> {
    match store.ensure_fresh(credential).await {
        Ok(Some(record)) => {
            debug!("credential '{credential}' refreshed via store capability, skipping probe");
            return Some(record);
        }
        Ok(None) => {}
        Err(err) => warn!("explicit refresh of credential '{credential}' failed: {err:#}"),
    }

    let initial = match store.fetch(credential).await {
        Ok(record) => record,
        Err(err) => {
            warn!("pre-probe fetch of credential '{credential}' failed: {err:#}");
            return None;
        }
    };

    let target = match probe_url.filter(|url| !url.is_empty()) {
        Some(url) => Some(url.to_string()),
        None => derive_probe_target(&initial),
    };

    let Some(url) = target else {
        warn!(
            "credential '{credential}' has no token URL to probe and no probe URL is \
             configured; token refresh cannot be triggered"
        );
        return Some(initial);
    };

    if let Err(err) = store.request_with_oauth2(credential, ProbeRequest::get(url.as_str())).await {
        warn!("refresh probe against '{url}' failed: {err:#}");
    }

    match store.fetch(credential).await {
        Ok(record) => Some(record),
        Err(err) => {
            warn!("post-probe refetch of credential '{credential}' failed, using pre-probe record: {err:#}");
            Some(initial)
        }
    }
}

/// Default probe target: a top-level token URL, else the nested OAuth2
/// token endpoint.
fn derive_probe_target(record: &CredentialRecord) -> Option<String> {
    ["tokenUrl", "token_url"]
        .iter()
        .find_map(|key| non_empty_string(record.get(*key)))
        .or_else(|| match record.get("auth") {
            Some(Value::Object(auth)) => non_empty_string(auth.get("oauth_token_url")),
            _ => None,
        })
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}
