// tests/common/mod.rs
pub use serde_json::json;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use serde_json::Value;

use crate::record::InputItem;
use crate::store::{CredentialRecord, CredentialStore, ProbeRequest};

/// Build a credential record from a `json!` object literal.
pub fn record(value: Value) -> CredentialRecord {
    match value {
        Value::Object(map) => map,
        other => panic!("credential record must be a JSON object, got {other}"),
    }
}

/// Build an input batch from `json!` payloads.
pub fn items(payloads: Vec<Value>) -> Vec<InputItem> {
    payloads.into_iter().map(InputItem::new).collect()
}

pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Scripted in-memory credential store. Fetch results are served from a queue
/// (the last entry repeats); probes and fetches are counted so tests can
/// assert on the exact store interaction sequence.
#[derive(Clone, Default)]
pub struct MockStore {
    fetch_results: Arc<Mutex<Vec<Result<CredentialRecord, String>>>>,
    fresh: Arc<Mutex<Option<CredentialRecord>>>,
    probe_error: Arc<Mutex<Option<String>>>,
    fetch_count: Arc<AtomicUsize>,
    probed_urls: Arc<Mutex<Vec<String>>>,
}

impl MockStore {
    /// Store serving the same record for every fetch.
    pub fn with_record(record: CredentialRecord) -> Self {
        Self::with_sequence(vec![Ok(record)])
    }

    /// Store whose fetches fail every time.
    pub fn failing(message: &str) -> Self {
        Self::with_sequence(vec![Err(message.to_string())])
    }

    /// Store serving scripted fetch results in order; the last one repeats.
    pub fn with_sequence(results: Vec<Result<CredentialRecord, String>>) -> Self {
        Self {
            fetch_results: Arc::new(Mutex::new(results)),
            ..Default::default()
        }
    }

    /// Make `ensure_fresh` answer with `record` instead of declining.
    pub fn with_fresh(self, record: CredentialRecord) -> Self {
        *self.fresh.lock().unwrap() = Some(record);
        self
    }

    /// Make every probe fail with `message`.
    pub fn with_probe_error(self, message: &str) -> Self {
        *self.probe_error.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }

    pub fn probed_urls(&self) -> Vec<String> {
        self.probed_urls.lock().unwrap().clone()
    }
}

impl CredentialStore for MockStore {
    async fn fetch(&self, _credential: &str) -> Result<CredentialRecord> {
        let call = self.fetch_count.fetch_add(1, Ordering::SeqCst);
        let results = self.fetch_results.lock().unwrap();
        if results.is_empty() {
            return Err(anyhow!("no record configured"));
        }
        match &results[call.min(results.len() - 1)] {
            Ok(record) => Ok(record.clone()),
            Err(message) => Err(anyhow!(message.clone())),
        }
    }

    async fn ensure_fresh(&self, _credential: &str) -> Result<Option<CredentialRecord>> {
        Ok(self.fresh.lock().unwrap().clone())
    }

    async fn request_with_oauth2(&self, _credential: &str, probe: ProbeRequest) -> Result<()> {
        self.probed_urls.lock().unwrap().push(probe.url.clone());
        match self.probe_error.lock().unwrap().as_ref() {
            Some(message) => Err(anyhow!(message.clone())),
            None => Ok(()),
        }
    }
}
