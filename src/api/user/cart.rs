use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use validator::Validate;

use crate::api::error::ApiError;
use crate::ledger::{
    pricing::QuantityChange,
    view::{CartView, RemovedItem},
    Caller, CartLedger,
};

//ROUTERS
pub fn cart_router(ledger: CartLedger) -> Router {
    Router::new()
        .route(
            "/carts/products/:product_id/quantity/:quantity",
            post(add_product),
        )
        .route("/carts/users/cart", get(get_cart))
        .route("/cart/products/:product_id/quantity", put(set_quantity))
        .route(
            "/cart/products/:product_id/quantity/:operation",
            put(change_quantity),
        )
        .route("/carts/:cart_id/product/:product_id", delete(remove_product))
        .layer(Extension(ledger))
}

//ROUTES
async fn add_product(
    Path((product_id, quantity)): Path<(i32, i32)>,
    Extension(ledger): Extension<CartLedger>,
    Extension(caller): Extension<Caller>,
) -> Result<(StatusCode, Json<CartView>), ApiError> {
    let cart = ledger.add_product(&caller, product_id, quantity).await?;
    Ok((StatusCode::CREATED, Json(cart)))
}

async fn get_cart(
    Extension(ledger): Extension<CartLedger>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<CartView>, ApiError> {
    Ok(Json(ledger.cart_for_user(&caller.email).await?))
}

async fn change_quantity(
    Path((product_id, operation)): Path<(i32, String)>,
    Extension(ledger): Extension<CartLedger>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<CartView>, ApiError> {
    let change: QuantityChange = operation.parse()?;
    Ok(Json(
        ledger.update_quantity(&caller, product_id, change).await?,
    ))
}

async fn set_quantity(
    Path(product_id): Path<i32>,
    Extension(ledger): Extension<CartLedger>,
    Extension(caller): Extension<Caller>,
    Json(payload): Json<SetQuantity>,
) -> Result<Json<CartView>, ApiError> {
    payload.validate()?;
    Ok(Json(
        ledger
            .update_quantity(&caller, product_id, QuantityChange::SetTo(payload.quantity))
            .await?,
    ))
}

async fn remove_product(
    Path((cart_id, product_id)): Path<(i32, i32)>,
    Extension(ledger): Extension<CartLedger>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<RemovedItem>, ApiError> {
    Ok(Json(
        ledger.remove_product(&caller, cart_id, product_id).await?,
    ))
}

//Structs
#[derive(Deserialize, Debug, Validate)]
struct SetQuantity {
    #[validate(range(min = 0))]
    quantity: i32,
}
