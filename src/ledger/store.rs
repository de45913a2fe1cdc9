//! Cart and cart-item persistence. Every function takes the caller's
//! connection so a ledger operation can run them inside one transaction.

use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait,
    JoinType, ModelTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};

use crate::entities::{cart, cart_item, product, user};
use crate::ledger::error::{on_write, LedgerError, Resource};
use crate::ledger::pricing::cart_total;

/// Error mapper for writes touching `cart_id`: losing a race to another
/// transaction reads as a stale cart.
pub(crate) fn stale_cart(cart_id: i32) -> impl FnOnce(DbErr) -> LedgerError {
    move |err| on_write(err, LedgerError::StaleCart { cart_id })
}

pub(crate) async fn find_cart_by_email<C: ConnectionTrait>(
    conn: &C,
    email: &str,
) -> Result<cart::Model, LedgerError> {
    cart::Entity::find()
        .join(JoinType::InnerJoin, cart::Relation::User.def())
        .filter(user::Column::Email.eq(email))
        .one(conn)
        .await?
        .ok_or_else(|| LedgerError::not_found(Resource::Cart, "email", email))
}

pub(crate) async fn find_cart_by_id<C: ConnectionTrait>(
    conn: &C,
    cart_id: i32,
) -> Result<cart::Model, LedgerError> {
    cart::Entity::find_by_id(cart_id)
        .one(conn)
        .await?
        .ok_or_else(|| LedgerError::not_found(Resource::Cart, "id", cart_id))
}

/// Returns the user's cart, inserting an empty one the first time. Two
/// first adds racing on the unique `user_id` leave one of them with
/// `CartCreationRace`.
pub(crate) async fn find_or_create_cart<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
) -> Result<cart::Model, LedgerError> {
    if let Some(existing) = cart::Entity::find()
        .filter(cart::Column::UserId.eq(user_id))
        .one(conn)
        .await?
    {
        return Ok(existing);
    }

    let new_cart = cart::ActiveModel {
        user_id: Set(user_id),
        total_price: Set(0.0),
        version: Set(0),
        ..Default::default()
    };
    new_cart
        .insert(conn)
        .await
        .map_err(|err| on_write(err, LedgerError::CartCreationRace { user_id }))
}

pub(crate) async fn all_carts<C: ConnectionTrait>(conn: &C) -> Result<Vec<cart::Model>, LedgerError> {
    Ok(cart::Entity::find()
        .order_by_asc(cart::Column::Id)
        .all(conn)
        .await?)
}

pub(crate) async fn carts_with_product<C: ConnectionTrait>(
    conn: &C,
    product_id: i32,
) -> Result<Vec<cart::Model>, LedgerError> {
    Ok(cart::Entity::find()
        .join(JoinType::InnerJoin, cart::Relation::CartItem.def())
        .filter(cart_item::Column::ProductId.eq(product_id))
        .order_by_asc(cart::Column::Id)
        .all(conn)
        .await?)
}

pub(crate) async fn find_item<C: ConnectionTrait>(
    conn: &C,
    cart_id: i32,
    product_id: i32,
) -> Result<Option<cart_item::Model>, LedgerError> {
    Ok(cart_item::Entity::find()
        .filter(cart_item::Column::CartId.eq(cart_id))
        .filter(cart_item::Column::ProductId.eq(product_id))
        .one(conn)
        .await?)
}

/// Adds a line, capturing the product's current discount and special price.
pub(crate) async fn insert_item<C: ConnectionTrait>(
    conn: &C,
    cart_id: i32,
    product: &product::Model,
    quantity: i32,
) -> Result<cart_item::Model, LedgerError> {
    let new_item = cart_item::ActiveModel {
        cart_id: Set(cart_id),
        product_id: Set(product.id),
        quantity: Set(quantity),
        discount: Set(product.discount),
        price: Set(product.special_price),
        ..Default::default()
    };
    new_item.insert(conn).await.map_err(stale_cart(cart_id))
}

pub(crate) async fn set_item_quantity<C: ConnectionTrait>(
    conn: &C,
    item: cart_item::Model,
    quantity: i32,
) -> Result<cart_item::Model, LedgerError> {
    let cart_id = item.cart_id;
    let mut item: cart_item::ActiveModel = item.into();
    item.quantity = Set(quantity);
    item.update(conn).await.map_err(stale_cart(cart_id))
}

pub(crate) async fn reprice_item<C: ConnectionTrait>(
    conn: &C,
    item: cart_item::Model,
    product: &product::Model,
) -> Result<cart_item::Model, LedgerError> {
    let cart_id = item.cart_id;
    let mut item: cart_item::ActiveModel = item.into();
    item.price = Set(product.special_price);
    item.discount = Set(product.discount);
    item.update(conn).await.map_err(stale_cart(cart_id))
}

pub(crate) async fn delete_item<C: ConnectionTrait>(
    conn: &C,
    item: cart_item::Model,
) -> Result<(), LedgerError> {
    let cart_id = item.cart_id;
    item.delete(conn).await.map_err(stale_cart(cart_id))?;
    Ok(())
}

/// Recomputes the cart total from its remaining items and writes it back,
/// guarded by the version read earlier in the same operation.
pub(crate) async fn write_total<C: ConnectionTrait>(
    conn: &C,
    cart: cart::Model,
) -> Result<cart::Model, LedgerError> {
    let items = cart_item::Entity::find()
        .filter(cart_item::Column::CartId.eq(cart.id))
        .all(conn)
        .await?;
    let total_price = cart_total(&items);
    let version = cart.version + 1;

    let result = cart::Entity::update_many()
        .col_expr(cart::Column::TotalPrice, Expr::value(total_price))
        .col_expr(cart::Column::Version, Expr::value(version))
        .filter(cart::Column::Id.eq(cart.id))
        .filter(cart::Column::Version.eq(cart.version))
        .exec(conn)
        .await
        .map_err(stale_cart(cart.id))?;

    if result.rows_affected == 0 {
        return Err(LedgerError::StaleCart { cart_id: cart.id });
    }

    Ok(cart::Model {
        total_price,
        version,
        ..cart
    })
}
