// src/integrations/supabase/column_mapping.rs
//
// Field-name translation between entries (camelCase) and the remote table,
// whose columns are all lowercase.
//
// The table below must list every multi-word field of CoffeeEntry. A field
// missing here still reaches the remote store, but comes back lowercase-only
// and lands in `CoffeeEntry::extra`.

use serde_json::{Map, Value};

use crate::domain::{CoffeeEntry, CoffeePatch};
use crate::error::AppResult;

/// One row as sent to or received from the remote store
pub type RemoteRecord = Map<String, Value>;

/// Remote column -> entry field, for names that differ beyond casing
const COLUMN_TO_FIELD: &[(&str, &str)] = &[
    ("grindingtime", "grindingTime"),
    ("grindingdegree", "grindingDegree"),
    ("coffeeamount", "coffeeAmount"),
    ("percentarabica", "percentArabica"),
    ("percentrobusta", "percentRobusta"),
    ("cremarating", "cremaRating"),
    ("tasterating", "tasteRating"),
    ("tastenotes", "tasteNotes"),
    ("roastlevel", "roastLevel"),
    ("brewingmethod", "brewingMethod"),
    ("recommendedmethod", "recommendedMethod"),
    ("packagesize", "packageSize"),
    ("preparationnotes", "preparationNotes"),
    ("coffeegroup", "coffeeGroup"),
    ("cuppingtime", "cuppingTime"),
];

/// Entry field name for a remote column; unknown columns pass through
pub fn local_field_name(column: &str) -> &str {
    COLUMN_TO_FIELD
        .iter()
        .find(|(remote, _)| *remote == column)
        .map(|(_, local)| *local)
        .unwrap_or(column)
}

/// Lowercase every key, leaving values untouched
pub fn lowercase_keys(record: Map<String, Value>) -> RemoteRecord {
    record
        .into_iter()
        .map(|(key, value)| (key.to_lowercase(), value))
        .collect()
}

pub fn to_remote_casing(entry: &CoffeeEntry) -> AppResult<RemoteRecord> {
    Ok(lowercase_keys(to_object(serde_json::to_value(entry)?)))
}

pub fn to_local_casing(record: RemoteRecord) -> Map<String, Value> {
    record
        .into_iter()
        .map(|(column, value)| (local_field_name(&column).to_string(), value))
        .collect()
}

pub fn entry_from_remote(record: RemoteRecord) -> AppResult<CoffeeEntry> {
    let local = to_local_casing(record);
    Ok(serde_json::from_value(Value::Object(local))?)
}

/// Only the fields present in the patch, with remote column names
pub fn patch_to_remote(patch: &CoffeePatch) -> AppResult<RemoteRecord> {
    Ok(lowercase_keys(to_object(serde_json::to_value(patch)?)))
}

fn to_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
