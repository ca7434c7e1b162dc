/// Token extraction
///
/// Credential stores disagree on where the bearer token lives inside a
/// credential record. Extraction is an ordered list of (shape, extractor)
/// rules probed in fixed priority, so tolerating one more convention means
/// adding one more rule, not touching control flow.
use serde_json::Value;
use tracing::debug;

use crate::store::CredentialRecord;

type Extractor = fn(&CredentialRecord) -> Option<&str>;

/// Recognized credential shapes, highest priority first.
const RULES: &[(&str, Extractor)] = &[
    ("accessToken", |r| string_field(r, "accessToken")),
    ("access_token", |r| string_field(r, "access_token")),
    ("token", |r| string_field(r, "token")),
    ("oauth.access_token", |r| {
        nested_string_field(r, "oauth", "access_token")
    }),
    ("data.access_token", |r| {
        nested_string_field(r, "data", "access_token")
    }),
    ("oauthTokenData.access_token", |r| {
        nested_string_field(r, "oauthTokenData", "access_token")
    }),
    ("oauthTokenData.accessToken", |r| {
        nested_string_field(r, "oauthTokenData", "accessToken")
    }),
];

/// Locate the bearer token in `record`, first non-empty match wins. The value
/// is treated as an opaque string; no expiry or signature validation happens
/// here.
pub fn access_token(record: &CredentialRecord) -> Option<String> {
    RULES.iter().find_map(|(shape, extractor)| {
        extractor(record).map(|token| {
            debug!("access token found via '{shape}' field");
            token.to_owned()
        })
    })
}

fn string_field<'a>(record: &'a CredentialRecord, key: &str) -> Option<&'a str> {
    non_empty(record.get(key))
}

fn nested_string_field<'a>(record: &'a CredentialRecord, outer: &str, key: &str) -> Option<&'a str> {
    match record.get(outer) {
        Some(Value::Object(inner)) => non_empty(inner.get(key)),
        _ => None,
    }
}

fn non_empty(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}
