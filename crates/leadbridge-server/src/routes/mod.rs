//! API routes.

pub mod auth;
pub mod crm;
pub mod health;
pub mod root;
pub mod webhook;

pub use auth::{CallbackParams, callback_handler, login_handler};
pub use crm::{ContactsQuery, contacts_handler, me_handler};
pub use health::health_routes;
pub use root::root_handler;
pub use webhook::webhook_handler;
