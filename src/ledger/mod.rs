//! The cart ledger: per-user carts whose total always equals the sum of
//! `price * quantity` over their items.
//!
//! Each operation runs in its own transaction. Any error drops the
//! transaction uncommitted, so a failed call leaves no trace. A write or
//! commit that loses to a concurrent transaction fails with a Conflict
//! kind rather than a database error.

pub mod catalog;
pub mod error;
pub mod pricing;
pub(crate) mod store;
pub mod view;

use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use std::sync::Arc;
use tracing::{debug, info};

use crate::entities::{cart, product, user::Role};
use catalog::PriceUpdate;
use error::{on_write, LedgerError, Resource, RuleViolation};
use pricing::{check_stock, line_total, QuantityChange};
use view::{load_cart_view, CartView, PriceChangeOutcome, ProductView, RemovedItem};

/// Authenticated identity a ledger call acts on behalf of.
#[derive(Clone, Debug)]
pub struct Caller {
    pub user_id: i32,
    pub email: String,
    pub role: Role,
}

#[derive(Clone, Debug)]
pub struct CartLedger {
    db: Arc<DatabaseConnection>,
}

impl CartLedger {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        CartLedger { db }
    }

    pub async fn add_product(
        &self,
        caller: &Caller,
        product_id: i32,
        quantity: i32,
    ) -> Result<CartView, LedgerError> {
        if quantity <= 0 {
            return Err(RuleViolation::NonPositiveQuantity {
                requested: quantity,
            }
            .into());
        }

        let txn = self.db.begin().await?;
        let product = catalog::find_product(&txn, product_id).await?;
        let cart = store::find_or_create_cart(&txn, caller.user_id).await?;

        if store::find_item(&txn, cart.id, product_id).await?.is_some() {
            return Err(LedgerError::AlreadyInCart {
                cart_id: cart.id,
                product_id,
            });
        }
        check_stock(&product, quantity)?;

        store::insert_item(&txn, cart.id, &product, quantity).await?;
        let view = finish(txn, cart).await?;

        info!(
            cart_id = view.cart_id,
            product_id,
            quantity,
            total_price = view.total_price,
            "Added product to cart"
        );
        Ok(view)
    }

    pub async fn cart_for_user(&self, email: &str) -> Result<CartView, LedgerError> {
        let txn = self.db.begin().await?;
        let cart = store::find_cart_by_email(&txn, email).await?;
        let view = load_cart_view(&txn, cart).await?;
        txn.commit().await?;
        Ok(view)
    }

    pub async fn list_all_carts(&self) -> Result<Vec<CartView>, LedgerError> {
        let txn = self.db.begin().await?;
        let carts = store::all_carts(&txn).await?;
        if carts.is_empty() {
            return Err(LedgerError::NoCarts);
        }

        let mut views = Vec::with_capacity(carts.len());
        for cart in carts {
            views.push(load_cart_view(&txn, cart).await?);
        }
        txn.commit().await?;
        Ok(views)
    }

    pub async fn update_quantity(
        &self,
        caller: &Caller,
        product_id: i32,
        change: QuantityChange,
    ) -> Result<CartView, LedgerError> {
        let txn = self.db.begin().await?;
        let cart = store::find_cart_by_email(&txn, &caller.email).await?;
        let product = catalog::find_product(&txn, product_id).await?;

        if product.quantity <= 0 {
            return Err(RuleViolation::OutOfStock { product_id }.into());
        }

        let item = store::find_item(&txn, cart.id, product_id)
            .await?
            .ok_or(RuleViolation::NotInCart {
                cart_id: cart.id,
                product_id,
            })?;

        let current = item.quantity;
        let resulting = change.apply(current)?;
        if resulting > current && resulting > product.quantity {
            return Err(RuleViolation::InsufficientStock {
                product_id,
                requested: resulting,
                available: product.quantity,
            }
            .into());
        }

        if resulting == 0 {
            store::delete_item(&txn, item).await?;
        } else {
            store::set_item_quantity(&txn, item, resulting).await?;
        }
        let view = finish(txn, cart).await?;

        info!(
            cart_id = view.cart_id,
            product_id,
            from = current,
            to = resulting,
            total_price = view.total_price,
            "Updated cart quantity"
        );
        Ok(view)
    }

    /// Drops a line. Carts owned by someone else read as missing unless the
    /// caller is an admin.
    pub async fn remove_product(
        &self,
        caller: &Caller,
        cart_id: i32,
        product_id: i32,
    ) -> Result<RemovedItem, LedgerError> {
        let txn = self.db.begin().await?;
        let cart = store::find_cart_by_id(&txn, cart_id).await?;
        if cart.user_id != caller.user_id && caller.role != Role::Admin {
            return Err(LedgerError::not_found(Resource::Cart, "id", cart_id));
        }

        let item = store::find_item(&txn, cart.id, product_id)
            .await?
            .ok_or_else(|| LedgerError::not_found(Resource::CartItem, "product_id", product_id))?;
        let product = catalog::find_product(&txn, product_id).await?;

        let quantity = item.quantity;
        let released_amount = line_total(item.price, quantity);
        store::delete_item(&txn, item).await?;
        let cart = store::write_total(&txn, cart).await?;
        txn.commit().await.map_err(store::stale_cart(cart_id))?;

        info!(cart_id, product_id, quantity, "Removed product from cart");
        Ok(RemovedItem {
            cart_id,
            product_id,
            product_name: product.name,
            quantity,
            released_amount,
            total_price: cart.total_price,
        })
    }

    /// Re-captures the product's current special price on one cart line.
    pub async fn reconcile_price_change(
        &self,
        cart_id: i32,
        product_id: i32,
    ) -> Result<CartView, LedgerError> {
        let txn = self.db.begin().await?;
        let cart = store::find_cart_by_id(&txn, cart_id).await?;
        let product = catalog::find_product(&txn, product_id).await?;
        let cart = reconcile(&txn, cart, &product).await?;
        let view = load_cart_view(&txn, cart).await?;
        txn.commit().await.map_err(store::stale_cart(cart_id))?;
        Ok(view)
    }

    /// Updates a product's price and discount, then reprices every cart
    /// holding it.
    pub async fn apply_price_change(
        &self,
        product_id: i32,
        update: PriceUpdate,
    ) -> Result<PriceChangeOutcome, LedgerError> {
        let txn = self.db.begin().await?;
        let product = catalog::find_product(&txn, product_id).await?;
        let product = catalog::update_pricing(&txn, product, update).await?;

        let carts = store::carts_with_product(&txn, product_id).await?;
        let mut reconciled_carts = Vec::with_capacity(carts.len());
        for cart in carts {
            let cart = reconcile(&txn, cart, &product).await?;
            reconciled_carts.push(cart.id);
        }
        txn.commit()
            .await
            .map_err(|err| on_write(err, LedgerError::StaleProduct { product_id }))?;

        info!(
            product_id,
            special_price = product.special_price,
            carts = reconciled_carts.len(),
            "Applied price change"
        );
        Ok(PriceChangeOutcome {
            product: ProductView::from(product),
            reconciled_carts,
        })
    }
}

/// Writes the recomputed total, renders the view and commits.
async fn finish(txn: DatabaseTransaction, cart: cart::Model) -> Result<CartView, LedgerError> {
    let cart = store::write_total(&txn, cart).await?;
    let cart_id = cart.id;
    let view = load_cart_view(&txn, cart).await?;
    txn.commit().await.map_err(store::stale_cart(cart_id))?;
    Ok(view)
}

// The line quantity is authoritative here; catalog stock plays no part in
// the new total.
async fn reconcile(
    txn: &DatabaseTransaction,
    cart: cart::Model,
    product: &product::Model,
) -> Result<cart::Model, LedgerError> {
    let item = store::find_item(txn, cart.id, product.id)
        .await?
        .ok_or(RuleViolation::NotInCart {
            cart_id: cart.id,
            product_id: product.id,
        })?;
    debug!(
        cart_id = cart.id,
        product_id = product.id,
        old_price = item.price,
        new_price = product.special_price,
        "Repricing cart line"
    );
    store::reprice_item(txn, item, product).await?;
    store::write_total(txn, cart).await
}
