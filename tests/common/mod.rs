#![allow(dead_code)]

use cart_ledger::api::create_api_router;
use cart_ledger::entities::{product, setup_schema, user};
use cart_ledger::ledger::{pricing::special_price, Caller};
use cart_ledger::middleware::auth::Claims;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use std::sync::Arc;
use tempfile::TempDir;

pub const SECRET: &str = "test-secret";

/// Fresh in-memory database with the schema in place. A single pooled
/// connection keeps every query on the same in-memory instance.
pub async fn setup_db() -> Arc<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory database");
    setup_schema(&db).await.expect("Failed to create schema");
    Arc::new(db)
}

/// File-backed database with a real connection pool, for suites that need
/// transactions to actually overlap. The directory must outlive the pool.
pub async fn setup_file_db(connections: u32) -> (TempDir, Arc<DatabaseConnection>) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("ledger.db").display());
    let mut options = ConnectOptions::new(url);
    options
        .max_connections(connections)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("Failed to open database file");
    setup_schema(&db).await.expect("Failed to create schema");
    (dir, Arc::new(db))
}

pub async fn insert_user(db: &DatabaseConnection, email: &str, role: user::Role) -> user::Model {
    user::ActiveModel {
        email: Set(email.to_owned()),
        role: Set(role),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert user")
}

pub async fn insert_product(
    db: &DatabaseConnection,
    name: &str,
    stock: i32,
    price: f64,
    discount: f64,
) -> product::Model {
    product::ActiveModel {
        name: Set(name.to_owned()),
        image: Set("default_img.png".to_owned()),
        description: Set(format!("{name} fresh from the oven")),
        quantity: Set(stock),
        price: Set(price),
        discount: Set(discount),
        special_price: Set(special_price(price, discount)),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert product")
}

pub fn caller(user: &user::Model) -> Caller {
    Caller {
        user_id: user.id,
        email: user.email.clone(),
        role: user.role,
    }
}

pub fn token_for(user: &user::Model) -> String {
    let claims = Claims {
        user_id: user.id,
        role: user.role.as_str().to_owned(),
        exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .expect("Failed to sign token")
}

/// Serves the API on an ephemeral port and returns its base url.
pub async fn spawn_app(db: Arc<DatabaseConnection>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let address = listener.local_addr().expect("No local address");
    let app = create_api_router(db, SECRET);
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server crashed");
    });
    format!("http://{address}")
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}
