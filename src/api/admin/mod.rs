pub mod cart;
pub mod product;

use axum::{middleware::from_fn_with_state, Router};

use crate::entities::user::Role;
use crate::ledger::CartLedger;
use crate::middleware::auth::{auth_middleware, AuthState};
use cart::admin_cart_router;
use product::admin_product_router;

pub fn admin_api_router(ledger: CartLedger, auth: AuthState) -> Router {
    Router::new()
        .merge(admin_cart_router(ledger.clone()))
        .merge(admin_product_router(ledger))
        .route_layer(from_fn_with_state(
            AuthState {
                role: Role::Admin,
                ..auth
            },
            auth_middleware,
        ))
}
