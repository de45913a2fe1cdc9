pub mod cart;

use axum::{middleware::from_fn_with_state, Router};

use crate::entities::user::Role;
use crate::ledger::CartLedger;
use crate::middleware::auth::{auth_middleware, AuthState};
use cart::cart_router;

pub fn user_api_router(ledger: CartLedger, auth: AuthState) -> Router {
    Router::new()
        .merge(cart_router(ledger))
        .route_layer(from_fn_with_state(
            AuthState {
                role: Role::User,
                ..auth
            },
            auth_middleware,
        ))
}
