use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;

use crate::entities::{cart, cart_item, product};
use crate::ledger::error::{LedgerError, Resource};

#[derive(Clone, Debug, Serialize)]
pub struct CartView {
    pub cart_id: i32,
    pub user_id: i32,
    pub total_price: f64,
    pub products: Vec<CartProductView>,
}

/// A product as it sits in a cart. `quantity` is the line quantity, not the
/// catalog stock. `catalog_price` is the product's price right now, while
/// `discount` and `special_price` are what the line captured when it was
/// added or last reconciled; the total is built from the captured values.
#[derive(Clone, Debug, Serialize)]
pub struct CartProductView {
    pub product_id: i32,
    pub product_name: String,
    pub image: String,
    pub description: String,
    pub quantity: i32,
    pub catalog_price: f64,
    pub discount: f64,
    pub special_price: f64,
}

impl CartProductView {
    fn new(item: &cart_item::Model, product: product::Model) -> CartProductView {
        CartProductView {
            product_id: product.id,
            product_name: product.name,
            image: product.image,
            description: product.description,
            quantity: item.quantity,
            catalog_price: product.price,
            discount: item.discount,
            special_price: item.price,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ProductView {
    pub product_id: i32,
    pub product_name: String,
    pub quantity: i32,
    pub price: f64,
    pub discount: f64,
    pub special_price: f64,
}

impl From<product::Model> for ProductView {
    fn from(value: product::Model) -> Self {
        ProductView {
            product_id: value.id,
            product_name: value.name,
            quantity: value.quantity,
            price: value.price,
            discount: value.discount,
            special_price: value.special_price,
        }
    }
}

/// Outcome of dropping a line from a cart.
#[derive(Clone, Debug, Serialize)]
pub struct RemovedItem {
    pub cart_id: i32,
    pub product_id: i32,
    pub product_name: String,
    pub quantity: i32,
    pub released_amount: f64,
    pub total_price: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct PriceChangeOutcome {
    pub product: ProductView,
    pub reconciled_carts: Vec<i32>,
}

pub(crate) async fn load_cart_view<C: ConnectionTrait>(
    conn: &C,
    cart: cart::Model,
) -> Result<CartView, LedgerError> {
    let rows = cart_item::Entity::find()
        .filter(cart_item::Column::CartId.eq(cart.id))
        .order_by_asc(cart_item::Column::Id)
        .find_also_related(product::Entity)
        .all(conn)
        .await?;

    // Every line must be listed for the view to add up to the total.
    let products = rows
        .into_iter()
        .map(|(item, product)| match product {
            Some(product) => Ok(CartProductView::new(&item, product)),
            None => Err(LedgerError::not_found(
                Resource::Product,
                "id",
                item.product_id,
            )),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CartView {
        cart_id: cart.id,
        user_id: cart.user_id,
        total_price: cart.total_price,
        products,
    })
}
