use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use super::coerce::{coerce_float, coerce_int, coerce_text};

/// Inventory item as exposed to clients.
///
/// `total_value` is derived from `quantity` and `cost` on every read and is never written
/// back to Airtable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub name: String,
    pub sku: String,
    pub quantity: i64,
    pub cost: f64,
    pub location: String,
    pub total_value: f64,
}

impl Item {
    /// Projects one Airtable record (`{"id": ..., "fields": {...}}`) onto an item.
    pub fn from_record(record: &Value) -> Self {
        let empty = Map::new();
        let fields = record
            .get("fields")
            .and_then(Value::as_object)
            .unwrap_or(&empty);
        let quantity = coerce_int(fields.get("quantity"));
        let cost = coerce_float(fields.get("cost"));
        // Serializes as null otherwise
        let total_value = Some(quantity as f64 * cost)
            .filter(|total| total.is_finite())
            .unwrap_or(0.0);

        Self {
            id: coerce_text(record.get("id")),
            name: coerce_text(fields.get("name")),
            sku: coerce_text(fields.get("sku")),
            quantity,
            cost,
            location: coerce_text(fields.get("location")),
            total_value,
        }
    }
}

/// The writable columns of the Inventory table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemFields {
    pub name: String,
    pub sku: String,
    pub quantity: i64,
    pub cost: f64,
    pub location: String,
}

impl ItemFields {
    /// Builds the outbound field set from a client payload, defaulting every missing field.
    pub fn from_payload(payload: &Map<String, Value>) -> Self {
        Self {
            name: coerce_text(payload.get("name")),
            sku: coerce_text(payload.get("sku")),
            quantity: coerce_int(payload.get("quantity")),
            cost: coerce_float(payload.get("cost")),
            location: coerce_text(payload.get("location")),
        }
    }
}

/// `{"fields": {...}}`, the body of a single-record PATCH and the element of a batch create.
#[derive(Debug, Serialize)]
pub struct FieldsEnvelope<'a> {
    pub fields: &'a ItemFields,
}

/// `{"records": [{"fields": {...}}]}`, the body of a create.
#[derive(Debug, Serialize)]
pub struct RecordsEnvelope<'a> {
    pub records: Vec<FieldsEnvelope<'a>>,
}

/// Decoded client request body. Anything that is not a JSON object reads as empty.
#[derive(Debug, Clone, Default)]
pub struct ItemPayload(Map<String, Value>);

impl ItemPayload {
    pub fn from_body(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(map)) => Self(map),
            _ => Self::default(),
        }
    }

    /// Record id addressed by update/delete; empty when absent.
    pub fn record_id(&self) -> String {
        coerce_text(self.0.get("id"))
    }

    pub fn fields(&self) -> ItemFields {
        ItemFields::from_payload(&self.0)
    }
}

/// Maps the `records` array of a list response to items.
///
/// A body without `records` is an empty table. An unparseable body is treated the same way
/// and logged.
pub fn parse_record_list(body: &str) -> Vec<Item> {
    let parsed: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(err) => {
            warn!(error = %err, "Airtable list response was not valid JSON; returning no items");
            return Vec::new();
        }
    };

    parsed
        .get("records")
        .and_then(Value::as_array)
        .map(|records| records.iter().map(Item::from_record).collect())
        .unwrap_or_default()
}

/// Extracts a readable message from an Airtable error body.
///
/// Airtable answers either `{"error": {"type": ..., "message": ...}}` or
/// `{"error": "NOT_FOUND"}`. Anything else is returned verbatim.
pub fn remote_error_message(body: &str) -> String {
    let Ok(parsed) = serde_json::from_str::<Value>(body) else {
        return body.to_string();
    };

    match parsed.get("error") {
        Some(Value::String(code)) => code.clone(),
        Some(Value::Object(details)) => details
            .get("message")
            .or_else(|| details.get("type"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string()),
        _ => body.to_string(),
    }
}
