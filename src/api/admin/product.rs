use axum::{
    extract::{Extension, Path},
    routing::patch,
    Json, Router,
};
use validator::Validate;

use crate::api::error::ApiError;
use crate::ledger::{catalog::PriceUpdate, view::PriceChangeOutcome, CartLedger};

pub fn admin_product_router(ledger: CartLedger) -> Router {
    Router::new()
        .route("/products/:product_id/pricing", patch(update_pricing))
        .layer(Extension(ledger))
}

/// New price and discount; every cart holding the product is repriced.
async fn update_pricing(
    Path(product_id): Path<i32>,
    Extension(ledger): Extension<CartLedger>,
    Json(payload): Json<PriceUpdate>,
) -> Result<Json<PriceChangeOutcome>, ApiError> {
    payload.validate()?;
    Ok(Json(ledger.apply_price_change(product_id, payload).await?))
}
