//! Action routing.
//!
//! Every request lands on [`dispatch`], which reads the `action` query parameter and hands
//! the request to exactly one handler.

pub mod inventory;
pub mod status;

use axum::{
    body::{self, Body},
    extract::{Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use strum::{AsRefStr, EnumString};
use tracing::debug;

use crate::errors::ServiceError;
use crate::models::ItemPayload;
use crate::AppState;

/// Operation selected by `?action=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Action {
    Status,
    Read,
    Create,
    Update,
    Delete,
    Unknown,
}

impl Action {
    /// Parses an action name. Matching is exact; anything unrecognised is `Unknown`.
    pub fn parse(raw: &str) -> Self {
        raw.parse().unwrap_or(Action::Unknown)
    }
}

/// Largest request body buffered for create/update/delete.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Picks `action` out of the query pairs. A repeated key resolves to its last value.
pub fn action_from_query(pairs: &[(String, String)]) -> Action {
    pairs
        .iter()
        .rev()
        .find(|(key, _)| key == "action")
        .map(|(_, value)| Action::parse(value))
        .unwrap_or(Action::Unknown)
}

/// Buffers the body of a mutating action. Status and read never call this.
async fn read_payload(body: Body) -> Result<ItemPayload, ServiceError> {
    let bytes = body::to_bytes(body, MAX_BODY_BYTES).await.map_err(|err| {
        debug!(error = %err, "request body rejected");
        ServiceError::PayloadTooLarge
    })?;
    Ok(ItemPayload::from_body(&bytes))
}

pub async fn dispatch(
    State(state): State<AppState>,
    method: Method,
    query: Option<Query<Vec<(String, String)>>>,
    body: Body,
) -> Response {
    // CORS preflight
    if method == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }

    let action = query
        .map(|Query(pairs)| action_from_query(&pairs))
        .unwrap_or(Action::Unknown);
    debug!(action = action.as_ref(), %method, "dispatching");

    run(action, &state, body)
        .await
        .unwrap_or_else(|err| err.into_response())
}

async fn run(action: Action, state: &AppState, body: Body) -> Result<Response, ServiceError> {
    let credentials = state.credentials.as_ref();
    let table = state.table.as_ref();

    let response = match action {
        Action::Status => Json(status::report(credentials)).into_response(),
        Action::Read => Json(inventory::read_items(credentials, table).await?).into_response(),
        Action::Create => {
            let payload = read_payload(body).await?;
            Json(inventory::create_item(credentials, table, &payload).await?).into_response()
        }
        Action::Update => {
            let payload = read_payload(body).await?;
            Json(inventory::update_item(credentials, table, &payload).await?).into_response()
        }
        Action::Delete => {
            let payload = read_payload(body).await?;
            Json(inventory::delete_item(credentials, table, &payload).await?).into_response()
        }
        Action::Unknown => return Err(ServiceError::InvalidAction),
    };
    Ok(response)
}
