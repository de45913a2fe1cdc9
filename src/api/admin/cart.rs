use axum::{
    extract::{Extension, Path},
    routing::{get, post},
    Json, Router,
};

use crate::api::error::ApiError;
use crate::ledger::{view::CartView, CartLedger};

pub fn admin_cart_router(ledger: CartLedger) -> Router {
    Router::new()
        .route("/carts", get(list_carts))
        .route(
            "/carts/:cart_id/product/:product_id/reconcile",
            post(reconcile_line),
        )
        .layer(Extension(ledger))
}

async fn list_carts(
    Extension(ledger): Extension<CartLedger>,
) -> Result<Json<Vec<CartView>>, ApiError> {
    Ok(Json(ledger.list_all_carts().await?))
}

async fn reconcile_line(
    Path((cart_id, product_id)): Path<(i32, i32)>,
    Extension(ledger): Extension<CartLedger>,
) -> Result<Json<CartView>, ApiError> {
    Ok(Json(
        ledger.reconcile_price_change(cart_id, product_id).await?,
    ))
}
