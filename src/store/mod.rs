/// Store module
///
/// Defines the interface of the external credential store the enricher
/// delegates token persistence and refresh to, plus a reqwest-backed
/// reference implementation for hosts without a credential manager.
pub mod http;

use std::collections::HashMap;
use std::time::Duration;

use anyhow::Result;
use ::http::Method;
use serde_json::{Map, Value};

/// External store's representation of a configured OAuth2 credential. Shape is
/// not contractually fixed; known variants are probed heuristically.
pub type CredentialRecord = Map<String, Value>;

/// A deliberately minimal authorized request whose sole purpose is to make the
/// store's OAuth2-aware request path check token expiry and refresh, not to
/// consume the response.
#[derive(Debug, Clone)]
pub struct ProbeRequest {
    pub method: Method,
    pub url: String,
    pub timeout: Duration,
    /// A 4xx/5xx response is not a probe failure, only transport-level or
    /// authorization failures are.
    pub ignore_http_status: bool,
    /// The response body is never retained.
    pub discard_body: bool,
    pub headers: Option<HashMap<String, String>>,
}

impl ProbeRequest {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            timeout: Self::DEFAULT_TIMEOUT,
            ignore_http_status: true,
            discard_body: true,
            headers: None,
        }
    }
}

/// Host-provided credential manager. The enricher only ever reads records and
/// issues one probe request; persistence, concurrent-refresh bookkeeping and
/// the token-endpoint transaction itself are the store's concern.
pub trait CredentialStore {
    /// Read the current credential record.
    fn fetch(
        &self,
        credential: &str,
    ) -> impl std::future::Future<Output = Result<CredentialRecord>> + Send;

    /// Explicit refresh capability. Stores that can refresh on demand return
    /// the refreshed record here and the enricher skips the network probe
    /// entirely. The default declines, which routes the enricher to the
    /// probe fallback.
    fn ensure_fresh(
        &self,
        _credential: &str,
    ) -> impl std::future::Future<Output = Result<Option<CredentialRecord>>> + Send {
        async { Ok(None) }
    }

    /// Issue one authorized request through the store's OAuth2-aware path,
    /// which is expected to refresh an expired token before sending.
    fn request_with_oauth2(
        &self,
        credential: &str,
        probe: ProbeRequest,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}
