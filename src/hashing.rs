//! Hashing - SHA-256 Fingerprints for Edit Batches
//!
//! Same accepted edits + same engine version = same hash, regardless of key order.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt::Write;

use crate::edits::Edit;

pub fn sha256_hex(data: &[u8]) -> String {
    Sha256::digest(data)
        .iter()
        .fold(String::with_capacity(64), |mut out, b| {
            let _ = write!(out, "{b:02x}");
            out
        })
}

/// Convert to canonical JSON (sorted keys, no whitespace)
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let v = serde_json::to_value(value)?;
    serde_json::to_string(&sort_value(v))
}

fn sort_value(v: Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(entries.into_iter().map(|(k, v)| (k, sort_value(v))).collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_value).collect()),
        other => other,
    }
}

/// batch_hash = sha256(canonical(edits) + ":" + engine_version)
pub fn compute_batch_hash(edits: &[Edit], engine_version: &str) -> Result<String, serde_json::Error> {
    let canonical = canonical_json(&edits)?;
    Ok(sha256_hex(format!("{canonical}:{engine_version}").as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_json_sorted() {
        let obj = json!({"z": 1, "a": 2, "m": {"y": 1, "b": [{"d": 0, "c": 1}]}});
        assert_eq!(
            canonical_json(&obj).unwrap(),
            r#"{"a":2,"m":{"b":[{"c":1,"d":0}],"y":1},"z":1}"#
        );
    }

    #[test]
    fn test_sha256_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_batch_hash_tracks_edits_and_version() {
        let edits = vec![Edit::Reorder { element_id: "a".into(), z: 2 }];
        let h1 = compute_batch_hash(&edits, "1.0.0").unwrap();
        assert_eq!(h1, compute_batch_hash(&edits.clone(), "1.0.0").unwrap());
        assert_ne!(h1, compute_batch_hash(&edits, "1.0.1").unwrap());
        assert_ne!(h1, compute_batch_hash(&[], "1.0.0").unwrap());
    }
}
