//! Save transfer - the base64 export/import codec
//!
//! An export is the whole key-value store wrapped in a small JSON
//! envelope (version stamp, export time, data map) and base64-encoded
//! for copy-paste transport. Import is all-or-nothing: the payload must
//! decode completely before the store is touched, and then the store is
//! replaced wholesale.

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::persistence::KvStore;

/// Version stamp carried by every export envelope.
pub const EXPORT_VERSION: &str = "1.0";

#[derive(Debug, Serialize, Deserialize)]
struct SaveEnvelope {
    #[serde(default)]
    version: String,
    #[serde(default)]
    timestamp: u64,
    #[serde(default)]
    data: Option<BTreeMap<String, String>>,
}

/// Why an import was rejected. The store is only modified after the
/// whole payload has decoded cleanly.
#[derive(Debug)]
pub enum TransferError {
    /// The payload is not valid base64.
    Base64(base64::DecodeError),
    /// The decoded payload is not a valid JSON envelope.
    Json(serde_json::Error),
    /// The envelope parsed but a required field is absent or empty.
    MissingField(&'static str),
}

impl From<base64::DecodeError> for TransferError {
    fn from(err: base64::DecodeError) -> Self {
        TransferError::Base64(err)
    }
}

impl From<serde_json::Error> for TransferError {
    fn from(err: serde_json::Error) -> Self {
        TransferError::Json(err)
    }
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferError::Base64(err) => write!(f, "save code is not valid base64: {err}"),
            TransferError::Json(err) => write!(f, "save payload is not valid JSON: {err}"),
            TransferError::MissingField(field) => {
                write!(f, "save payload is missing the {field} field")
            }
        }
    }
}

impl Error for TransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TransferError::Base64(err) => Some(err),
            TransferError::Json(err) => Some(err),
            TransferError::MissingField(_) => None,
        }
    }
}

/// Encode every stored key/value pair as a transport string.
pub fn export_save<S: KvStore + ?Sized>(store: &S, now_ms: u64) -> String {
    let mut data = BTreeMap::new();
    for key in store.keys() {
        if let Some(value) = store.get(&key) {
            data.insert(key, value);
        }
    }
    let envelope = SaveEnvelope {
        version: EXPORT_VERSION.to_string(),
        timestamp: now_ms,
        data: Some(data),
    };
    let json = match serde_json::to_string(&envelope) {
        Ok(json) => json,
        Err(err) => {
            log::error!("failed to encode save export: {err}");
            String::new()
        }
    };
    STANDARD.encode(json)
}

/// Decode a transport string and replace the store contents with it.
pub fn import_save<S: KvStore + ?Sized>(
    store: &mut S,
    payload: &str,
) -> Result<(), TransferError> {
    let bytes = STANDARD.decode(payload)?;
    let envelope: SaveEnvelope = serde_json::from_slice(&bytes)?;
    if envelope.version.is_empty() {
        return Err(TransferError::MissingField("version"));
    }
    let Some(data) = envelope.data else {
        return Err(TransferError::MissingField("data"));
    };

    store.clear();
    for (key, value) in data {
        store.set(&key, &value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{keys, MemoryStore};

    fn populated_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.set(keys::POKEDOLLARS, "1234");
        store.set(keys::EGG_SOURCE, "\"daycare\"");
        store.set(keys::PC, r#"[null,{"species":25}]"#);
        store
    }

    #[test]
    fn test_round_trip_preserves_every_pair() {
        let source = populated_store();
        let payload = export_save(&source, 777);

        let mut target = MemoryStore::new();
        target.set("stale", "true");
        import_save(&mut target, &payload).unwrap();

        assert_eq!(target.keys(), source.keys());
        for key in source.keys() {
            assert_eq!(target.get(&key), source.get(&key));
        }
        assert_eq!(target.get("stale"), None);
    }

    #[test]
    fn test_envelope_carries_version_and_timestamp() {
        let payload = export_save(&populated_store(), 1_700_000_000_000);
        let json = STANDARD.decode(payload).unwrap();
        let envelope: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(envelope["version"], EXPORT_VERSION);
        assert_eq!(envelope["timestamp"], 1_700_000_000_000u64);
    }

    #[test]
    fn test_garbage_payload_is_rejected_untouched() {
        let mut store = populated_store();

        let err = import_save(&mut store, "!!! not base64 !!!").unwrap_err();
        assert!(matches!(err, TransferError::Base64(_)));

        let err = import_save(&mut store, &STANDARD.encode("{ nope")).unwrap_err();
        assert!(matches!(err, TransferError::Json(_)));

        // The failed imports changed nothing.
        assert_eq!(store.get(keys::POKEDOLLARS).as_deref(), Some("1234"));
    }

    #[test]
    fn test_missing_fields_are_named() {
        let mut store = MemoryStore::new();

        let no_data = STANDARD.encode(r#"{"version":"1.0","timestamp":5}"#);
        let err = import_save(&mut store, &no_data).unwrap_err();
        assert!(matches!(err, TransferError::MissingField("data")));

        let no_version = STANDARD.encode(r#"{"timestamp":5,"data":{}}"#);
        let err = import_save(&mut store, &no_version).unwrap_err();
        assert!(matches!(err, TransferError::MissingField("version")));
    }

    #[test]
    fn test_empty_data_map_is_a_valid_save() {
        let mut store = populated_store();
        let payload = STANDARD.encode(r#"{"version":"1.0","timestamp":0,"data":{}}"#);
        import_save(&mut store, &payload).unwrap();
        assert!(store.keys().is_empty());
    }
}
