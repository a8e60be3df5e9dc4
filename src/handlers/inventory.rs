use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::config::Credentials;
use crate::errors::ServiceError;
use crate::models::{parse_record_list, remote_error_message, Item, ItemPayload};
use crate::services::{is_addressable_record_id, TableClient};

/// `{"success": true, "data": [...]}`
#[derive(Debug, Serialize)]
pub struct ItemsResponse {
    pub success: bool,
    pub data: Vec<Item>,
}

/// `{"success": true, "message": "..."}`
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: &'static str,
}

impl MessageResponse {
    fn ok(message: &'static str) -> Self {
        Self {
            success: true,
            message,
        }
    }
}

/// Lists every record in the table.
///
/// This is the only action that refuses to call out when credentials are missing.
#[instrument(skip_all)]
pub async fn read_items(
    credentials: &Credentials,
    table: &dyn TableClient,
) -> Result<ItemsResponse, ServiceError> {
    if !credentials.is_configured() {
        return Err(ServiceError::NotConfigured {
            missing: credentials.missing_vars(),
        });
    }

    let response = table.list_records(credentials).await?;
    if !response.is_ok() {
        return Err(ServiceError::Upstream {
            status: response.status,
            message: format!(
                "Failed to fetch from Airtable: {}",
                remote_error_message(&response.body)
            ),
        });
    }

    let data = parse_record_list(&response.body);
    info!(count = data.len(), "Fetched inventory");
    Ok(ItemsResponse {
        success: true,
        data,
    })
}

#[instrument(skip_all)]
pub async fn create_item(
    credentials: &Credentials,
    table: &dyn TableClient,
    payload: &ItemPayload,
) -> Result<MessageResponse, ServiceError> {
    let fields = payload.fields();
    let response = table.create_record(credentials, &fields).await?;
    if !response.is_ok() {
        return Err(ServiceError::Upstream {
            status: response.status,
            message: format!("Failed to create item: {}", response.body),
        });
    }

    info!(sku = %fields.sku, "Item created");
    Ok(MessageResponse::ok("Item created"))
}

/// Rejects ids that cannot be expressed as a record path segment, answering the way Airtable
/// answers for a record that does not exist.
fn ensure_addressable(record_id: &str, failure: &str) -> Result<(), ServiceError> {
    if is_addressable_record_id(record_id) {
        return Ok(());
    }
    warn!("Record id cannot address a single record; not forwarding");
    Err(ServiceError::Upstream {
        status: 404,
        message: failure.to_string(),
    })
}

/// Updates one record. A missing id is sent as an empty path segment and Airtable decides.
#[instrument(skip_all, fields(record_id = tracing::field::Empty))]
pub async fn update_item(
    credentials: &Credentials,
    table: &dyn TableClient,
    payload: &ItemPayload,
) -> Result<MessageResponse, ServiceError> {
    let record_id = payload.record_id();
    tracing::Span::current().record("record_id", record_id.as_str());
    ensure_addressable(&record_id, "Failed to update item")?;

    let response = table
        .update_record(credentials, &record_id, &payload.fields())
        .await?;
    if !response.is_ok() {
        // The UI only ever shows this fixed text for update failures
        warn!(status = response.status, body = %response.body, "Airtable rejected update");
        return Err(ServiceError::Upstream {
            status: response.status,
            message: "Failed to update item".to_string(),
        });
    }

    info!("Item updated");
    Ok(MessageResponse::ok("Item updated"))
}

#[instrument(skip_all, fields(record_id = tracing::field::Empty))]
pub async fn delete_item(
    credentials: &Credentials,
    table: &dyn TableClient,
    payload: &ItemPayload,
) -> Result<MessageResponse, ServiceError> {
    let record_id = payload.record_id();
    tracing::Span::current().record("record_id", record_id.as_str());
    ensure_addressable(&record_id, "Failed to delete item")?;

    let response = table.delete_record(credentials, &record_id).await?;
    if !response.is_ok() {
        warn!(status = response.status, body = %response.body, "Airtable rejected delete");
        return Err(ServiceError::Upstream {
            status: response.status,
            message: "Failed to delete item".to_string(),
        });
    }

    info!("Item deleted");
    Ok(MessageResponse::ok("Item deleted"))
}
