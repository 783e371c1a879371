//! Root landing page.

use axum::response::Html;

/// Minimal landing page pointing at the login flow.
pub async fn root_handler() -> Html<&'static str> {
    Html("<html><body><a href='/login'>Login</a></body></html>")
}
