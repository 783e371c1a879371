//! Login and callback endpoints for the authorization flow.

use axum::{
    extract::{Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse},
};
use serde::Deserialize;

use crate::error::Result;
use crate::state::AppState;

/// Query parameters delivered by the authorization server on callback.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: String,
    pub state: String,
}

/// `GET /login` — redirect the browser to the authorization page.
///
/// No network call happens here; the URL carries the live state token.
pub async fn login_handler(State(state): State<AppState>) -> impl IntoResponse {
    let url = state.flow.login_url();
    (StatusCode::FOUND, [(header::LOCATION, url)])
}

/// `GET /callback` — validate state, exchange the code, persist the token.
pub async fn callback_handler(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Result<Html<&'static str>> {
    state
        .flow
        .handle_callback(&params.state, &params.code)
        .await?;

    Ok(Html("<html><body><p>Access token saved</p></body></html>"))
}
