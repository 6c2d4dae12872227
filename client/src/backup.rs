/// Snapshot export and import for the local store.
///
/// A snapshot is one JSON object mapping every stored key to the JSON text
/// stored under it. Import accepts that shape and also raw JSON values, so a
/// hand-written backup with plain arrays is fine too.

use crate::error::{PortalError, Result};
use crate::models::Collection;
use crate::storage::LocalStore;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

/// Per-collection tallies from a merge import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeCounts {
    pub added: usize,
    pub replaced: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub collections: BTreeMap<Collection, MergeCounts>,
}

impl MergeReport {
    pub fn total(&self) -> MergeCounts {
        self.collections
            .values()
            .fold(MergeCounts::default(), |acc, c| MergeCounts {
                added: acc.added + c.added,
                replaced: acc.replaced + c.replaced,
                skipped: acc.skipped + c.skipped,
            })
    }
}

/// Serialize every stored key into a snapshot
pub fn export_snapshot(store: &LocalStore) -> Result<String> {
    let snapshot: Map<String, Value> = store
        .entries()?
        .into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect();

    log::info!("Exported snapshot with {} keys", snapshot.len());
    Ok(serde_json::to_string_pretty(&Value::Object(snapshot))?)
}

/// Replace the whole store with the snapshot contents.
/// The blob is fully validated before anything is written.
pub fn import_overwrite(store: &LocalStore, blob: &str) -> Result<()> {
    let snapshot = parse_snapshot(blob)?;

    let mut entries = Vec::with_capacity(snapshot.len());
    for (key, value) in snapshot {
        let encoded = encode_value(value)?;
        if let Some(collection) = Collection::from_name(&key) {
            let records = decode_records(collection, &encoded)?;
            check_records(collection, &records)?;
        }
        entries.push((key, encoded));
    }

    store.replace_all(&entries)?;
    log::info!("Imported snapshot with {} keys (overwrite)", entries.len());
    Ok(())
}

/// Union the snapshot into the store, keyed by record id. Incoming records win.
pub fn import_merge(store: &LocalStore, blob: &str) -> Result<MergeReport> {
    let snapshot = parse_snapshot(blob)?;

    let mut incoming_collections = Vec::new();
    let mut markers = Vec::new();
    for (key, value) in snapshot {
        let encoded = encode_value(value)?;
        match Collection::from_name(&key) {
            Some(collection) => {
                incoming_collections.push((collection, decode_records(collection, &encoded)?))
            }
            None => markers.push((key, encoded)),
        }
    }

    let mut report = MergeReport::default();
    let mut entries = Vec::new();
    for (collection, incoming) in incoming_collections {
        let mut local: Vec<Value> = store.read(collection.as_str())?;
        let counts = merge_records(&mut local, incoming, |record| {
            match collection.check_record(record) {
                Ok(()) => true,
                Err(e) => {
                    log::warn!("Skipping malformed {} record: {}", collection, e);
                    false
                }
            }
        });
        entries.push((collection.as_str().to_string(), serde_json::to_string(&local)?));
        log::debug!(
            "Merged {}: {} added, {} replaced, {} skipped",
            collection,
            counts.added,
            counts.replaced,
            counts.skipped
        );
        report.collections.insert(collection, counts);
    }

    for (key, encoded) in markers {
        if store.get_raw(&key)?.is_none() {
            entries.push((key, encoded));
        }
    }

    store.set_many(&entries)?;
    Ok(report)
}

fn parse_snapshot(blob: &str) -> Result<Map<String, Value>> {
    let value: Value = serde_json::from_str(blob)
        .map_err(|e| PortalError::Snapshot(format!("Invalid JSON: {}", e)))?;

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(PortalError::Snapshot(
            "Backup must be a JSON object".to_string(),
        )),
    }
}

/// String values are already encoded; anything else is encoded here
fn encode_value(value: Value) -> Result<String> {
    match value {
        Value::String(encoded) => Ok(encoded),
        other => Ok(serde_json::to_string(&other)?),
    }
}

fn decode_records(collection: Collection, encoded: &str) -> Result<Vec<Value>> {
    serde_json::from_str(encoded).map_err(|e| {
        PortalError::Snapshot(format!("Collection {} is not a JSON array: {}", collection, e))
    })
}

fn check_records(collection: Collection, records: &[Value]) -> Result<()> {
    for (i, record) in records.iter().enumerate() {
        collection.check_record(record).map_err(|e| {
            PortalError::Snapshot(format!("Record {} of {} is malformed: {}", i, collection, e))
        })?;
    }
    Ok(())
}

/// Merge identity of a record. `1` and `"1"` are different ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum RecordKey {
    Text(String),
    Number(String),
}

fn record_key(record: &Value) -> Option<RecordKey> {
    match record.get("id")? {
        Value::String(id) => Some(RecordKey::Text(id.clone())),
        Value::Number(id) => Some(RecordKey::Number(id.to_string())),
        _ => None,
    }
}

/// Union `incoming` into `local`. Records without an id, or rejected by
/// `accept`, are skipped.
fn merge_records(
    local: &mut Vec<Value>,
    incoming: Vec<Value>,
    accept: impl Fn(&Value) -> bool,
) -> MergeCounts {
    let mut index: HashMap<RecordKey, usize> = local
        .iter()
        .enumerate()
        .filter_map(|(i, record)| record_key(record).map(|key| (key, i)))
        .collect();

    let mut counts = MergeCounts::default();
    for record in incoming {
        let Some(key) = record_key(&record).filter(|_| accept(&record)) else {
            counts.skipped += 1;
            continue;
        };

        match index.get(&key) {
            Some(&i) => {
                local[i] = record;
                counts.replaced += 1;
            }
            None => {
                index.insert(key, local.len());
                local.push(record);
                counts.added += 1;
            }
        }
    }
    counts
}
