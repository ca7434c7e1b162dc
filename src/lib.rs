//! # Token Enricher Library
//!
//! Provides functionality for merging a managed OAuth2 access token into a
//! batch of passthrough records: triggering a best-effort refresh on the
//! upstream credential store, fetching the credential record, extracting the
//! bearer token from the record's loosely-structured shape, and writing the
//! token into a configurable field of every output record.
//!
//! Modules:
//! - `config` — per-invocation enricher options
//! - `store` — credential store interface and a reqwest-backed reference store
//! - `enricher` — the refresh / fetch / extract / enrich pipeline
//! - `record` — batch input/output data model

pub mod config;
pub mod enricher;
pub mod error;
pub mod record;
pub mod store;
pub mod tests;

pub use crate::config::options::EnricherOptions;
pub use crate::enricher::TokenEnricher;
pub use crate::error::EnrichError;
pub use crate::record::{BatchItem, ExecutionContext, InputItem, OutputRecord};
pub use crate::store::{CredentialRecord, CredentialStore, ProbeRequest};
