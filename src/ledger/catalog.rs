//! Product catalog as seen by the ledger: lookups plus the price update that
//! triggers cart reconciliation.

use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set};
use serde::Deserialize;
use validator::Validate;

use crate::entities::product;
use crate::ledger::error::{on_write, LedgerError, Resource};
use crate::ledger::pricing::special_price;

#[derive(Clone, Copy, Debug, Deserialize, Validate)]
pub struct PriceUpdate {
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[validate(range(min = 0.0, max = 100.0))]
    pub discount: f64,
}

pub(crate) async fn find_product<C: ConnectionTrait>(
    conn: &C,
    product_id: i32,
) -> Result<product::Model, LedgerError> {
    product::Entity::find_by_id(product_id)
        .one(conn)
        .await?
        .ok_or_else(|| LedgerError::not_found(Resource::Product, "id", product_id))
}

pub(crate) async fn update_pricing<C: ConnectionTrait>(
    conn: &C,
    product: product::Model,
    update: PriceUpdate,
) -> Result<product::Model, LedgerError> {
    let product_id = product.id;
    let mut product: product::ActiveModel = product.into();
    product.price = Set(update.price);
    product.discount = Set(update.discount);
    product.special_price = Set(special_price(update.price, update.discount));
    product
        .update(conn)
        .await
        .map_err(|err| on_write(err, LedgerError::StaleProduct { product_id }))
}
