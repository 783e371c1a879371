//! Webhook receiver.

use axum::body::Bytes;
use tracing::info;

/// `POST /webhook` — log the delivered payload and acknowledge it.
///
/// Non-POST methods are rejected by the method router.
pub async fn webhook_handler(body: Bytes) -> &'static str {
    info!(payload = %String::from_utf8_lossy(&body), "Webhook received");
    "Webhook received successfully"
}
