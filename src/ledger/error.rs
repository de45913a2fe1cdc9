use sea_orm::{sqlx, DbErr, RuntimeErr, SqlErr};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Coarse classification the transport layer maps onto responses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Conflict,
    BusinessRule,
    Database,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resource {
    Cart,
    CartItem,
    Product,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Resource::Cart => "Cart",
            Resource::CartItem => "Cart item",
            Resource::Product => "Product",
        })
    }
}

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("{resource} with {field} `{value}` was not found")]
    NotFound {
        resource: Resource,
        field: &'static str,
        value: String,
    },
    #[error("No carts found")]
    NoCarts,
    #[error("Product {product_id} already exists in cart {cart_id}")]
    AlreadyInCart { cart_id: i32, product_id: i32 },
    #[error("Cart {cart_id} was modified by a concurrent request")]
    StaleCart { cart_id: i32 },
    #[error("Cart of user {user_id} was created by a concurrent request")]
    CartCreationRace { user_id: i32 },
    #[error("Product {product_id} was modified by a concurrent request")]
    StaleProduct { product_id: i32 },
    #[error(transparent)]
    Rule(#[from] RuleViolation),
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl LedgerError {
    pub fn not_found(resource: Resource, field: &'static str, value: impl ToString) -> Self {
        LedgerError::NotFound {
            resource,
            field,
            value: value.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::NotFound { .. } | LedgerError::NoCarts => ErrorKind::NotFound,
            LedgerError::AlreadyInCart { .. }
            | LedgerError::StaleCart { .. }
            | LedgerError::CartCreationRace { .. }
            | LedgerError::StaleProduct { .. } => ErrorKind::Conflict,
            LedgerError::Rule(_) => ErrorKind::BusinessRule,
            LedgerError::Database(_) => ErrorKind::Database,
        }
    }
}

/// Maps a failed write to `conflict` when another transaction got there
/// first: SQLite busy or locked codes, or a lost unique-constraint race.
pub(crate) fn on_write(err: DbErr, conflict: LedgerError) -> LedgerError {
    if is_contention(&err) {
        conflict
    } else {
        LedgerError::Database(err)
    }
}

fn is_contention(err: &DbErr) -> bool {
    if let Some(SqlErr::UniqueConstraintViolation(_)) = err.sql_err() {
        return true;
    }
    let runtime = match err {
        DbErr::Conn(runtime) | DbErr::Exec(runtime) | DbErr::Query(runtime) => runtime,
        _ => return false,
    };
    let RuntimeErr::SqlxError(sqlx::Error::Database(db_err)) = runtime else {
        return false;
    };
    // Extended codes keep the primary code in the low byte.
    db_err
        .code()
        .and_then(|code| code.parse::<i32>().ok())
        .is_some_and(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
}

const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

/// Stock and quantity rules a request can break.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleViolation {
    #[error("Product {product_id} is not available")]
    OutOfStock { product_id: i32 },
    #[error("Requested {requested} of product {product_id}, only {available} in stock")]
    InsufficientStock {
        product_id: i32,
        requested: i32,
        available: i32,
    },
    #[error("Quantity must be greater than 0, got {requested}")]
    NonPositiveQuantity { requested: i32 },
    #[error("The resulting quantity cannot be negative (currently {current}, requested {resulting})")]
    NegativeQuantity { current: i32, resulting: i32 },
    #[error("Product {product_id} is not in cart {cart_id}")]
    NotInCart { cart_id: i32, product_id: i32 },
}
