pub mod admin;
pub mod error;
pub mod user;

use axum::{middleware::from_fn, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::entities::user::Role;
use crate::ledger::CartLedger;
use crate::middleware::{auth::AuthState, logging::logging_middleware};
use admin::admin_api_router;
use user::user_api_router;

pub fn create_api_router(shared_db: Arc<DatabaseConnection>, secret: &str) -> Router {
    let ledger = CartLedger::new(shared_db.clone());
    let auth = AuthState {
        db: shared_db,
        role: Role::User,
        secret: Arc::from(secret),
    };

    Router::new()
        .nest("/api", user_api_router(ledger.clone(), auth.clone()))
        .nest("/api/admin", admin_api_router(ledger, auth))
        .layer(from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
}
