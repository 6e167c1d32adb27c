//! Single-flight dedup signatures.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

/// Derive the dedup signature for a submission.
///
/// Two submissions collide exactly when configuration, action, and the
/// full variable set are equal; variable order does not matter because
/// the map iterates in key order.
pub fn dedup_signature(
    configuration: &str,
    action: &str,
    variables: &BTreeMap<String, String>,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(configuration.as_bytes());
    hasher.update([0]);
    hasher.update(action.as_bytes());
    for (key, value) in variables {
        hasher.update([0]);
        hasher.update(key.as_bytes());
        hasher.update([b'=']);
        hasher.update(value.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}
