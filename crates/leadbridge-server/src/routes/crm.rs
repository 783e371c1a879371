//! Authenticated passthroughs to the CRM API.
//!
//! The CRM's business objects stay opaque here: remote JSON is echoed to the
//! caller unmodified.

use axum::{
    Json,
    extract::{Query, State},
};
use reqwest::Method;
use serde::Deserialize;

use crate::error::{Result, ServerError};
use crate::state::AppState;

/// Fixed page requested from the contact search endpoint.
const CONTACTS_PAGE: u32 = 1;

/// Fixed page size requested from the contact search endpoint.
const CONTACTS_PAGE_LIMIT: u32 = 10;

/// Query parameters for the contact search passthrough.
#[derive(Debug, Deserialize)]
pub struct ContactsQuery {
    #[serde(rename = "locationId", default)]
    pub location_id: String,
}

/// `GET /me` — passthrough to the CRM's "who am I" endpoint.
pub async fn me_handler(State(state): State<AppState>) -> Result<Json<serde_json::Value>> {
    let url = format!("{}/v1/me", state.config.api_base_url);
    let response = state.api.authorized_request(Method::GET, &url, None).await?;

    if !response.is_success() {
        return Err(ServerError::Upstream {
            status: response.status,
            body: response.body,
        });
    }

    let document: serde_json::Value = serde_json::from_str(&response.body)
        .map_err(|e| ServerError::Internal(format!("Failed to parse user info: {}", e)))?;
    Ok(Json(document))
}

/// `GET /contacts?locationId=` — passthrough to the CRM's contact search.
pub async fn contacts_handler(
    State(state): State<AppState>,
    Query(query): Query<ContactsQuery>,
) -> Result<Json<serde_json::Value>> {
    let url = format!("{}/contacts/search", state.config.services_base_url);
    let body = serde_json::json!({
        "page": CONTACTS_PAGE,
        "pageLimit": CONTACTS_PAGE_LIMIT,
        "locationId": query.location_id,
    });

    let response = state
        .api
        .authorized_request(Method::POST, &url, Some(body))
        .await?;

    if !response.is_success() {
        return Err(ServerError::Upstream {
            status: response.status,
            body: response.body,
        });
    }

    let document: serde_json::Value = serde_json::from_str(&response.body)
        .map_err(|e| ServerError::Internal(format!("Failed to parse contacts response: {}", e)))?;
    Ok(Json(document))
}
