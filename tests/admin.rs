mod common;

use cart_ledger::entities::{product, seed_demo_data, user, user::Role};
use cart_ledger::ledger::CartLedger;
use common::{assert_close, caller, insert_product, insert_user, setup_db, spawn_app, token_for};
use reqwest::{header, StatusCode};
use sea_orm::EntityTrait;
use serde_json::{json, Value};

fn auth_headers(token: &str) -> header::HeaderMap {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token))
            .expect("Failed to create Authorization header"),
    );
    headers
}

#[tokio::test]
async fn test_admin_lists_carts() {
    let db = setup_db().await;
    let admin = insert_user(&db, "admin@example.com", Role::Admin).await;
    let jane = insert_user(&db, "jane@example.com", Role::User).await;
    let bagel = insert_product(&db, "Poppy seed bagel", 10, 2.0, 0.0).await;
    let base = spawn_app(db.clone()).await;
    let client = reqwest::Client::new();
    let headers = auth_headers(&token_for(&admin));

    let response = client
        .get(format!("{base}/api/admin/carts"))
        .headers(headers.clone())
        .send()
        .await
        .expect("Failed to send list carts request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    CartLedger::new(db)
        .add_product(&caller(&jane), bagel.id, 3)
        .await
        .unwrap();

    let response = client
        .get(format!("{base}/api/admin/carts"))
        .headers(headers)
        .send()
        .await
        .expect("Failed to send list carts request");
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.json::<Value>().await.unwrap();
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["user_id"], jane.id);
    assert_eq!(body[0]["products"][0]["quantity"], 3);
}

#[tokio::test]
async fn test_admin_reprices_product() {
    let db = setup_db().await;
    let admin = insert_user(&db, "admin@example.com", Role::Admin).await;
    let jane = insert_user(&db, "jane@example.com", Role::User).await;
    let bagel = insert_product(&db, "Poppy seed bagel", 10, 2.0, 0.0).await;
    let ledger = CartLedger::new(db.clone());
    let cart = ledger.add_product(&caller(&jane), bagel.id, 3).await.unwrap();
    let base = spawn_app(db.clone()).await;
    let client = reqwest::Client::new();
    let headers = auth_headers(&token_for(&admin));

    let response = client
        .patch(format!("{base}/api/admin/products/{}/pricing", bagel.id))
        .headers(headers.clone())
        .json(&json!({ "price": 5.0, "discount": 40.0 }))
        .send()
        .await
        .expect("Failed to send pricing request");
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.json::<Value>().await.unwrap();
    assert_close(body["product"]["special_price"].as_f64().unwrap(), 3.0);
    assert_eq!(body["reconciled_carts"], json!([cart.cart_id]));

    let view = ledger.cart_for_user(&jane.email).await.unwrap();
    assert_close(view.total_price, 9.0);

    let response = client
        .patch(format!("{base}/api/admin/products/{}/pricing", bagel.id))
        .headers(headers.clone())
        .json(&json!({ "price": 5.0, "discount": 140.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .post(format!(
            "{base}/api/admin/carts/{}/product/{}/reconcile",
            cart.cart_id, bagel.id
        ))
        .headers(headers)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.json::<Value>().await.unwrap();
    assert_close(body["total_price"].as_f64().unwrap(), 9.0);
}

#[tokio::test]
async fn test_demo_seed_runs_once() {
    let db = setup_db().await;
    seed_demo_data(&db).await.unwrap();
    seed_demo_data(&db).await.unwrap();

    let users = user::Entity::find().all(&*db).await.unwrap();
    assert_eq!(users.len(), 2);
    assert!(users.iter().any(|u| u.role == Role::Admin));

    let products = product::Entity::find().all(&*db).await.unwrap();
    assert_eq!(products.len(), 2);
    let sesame = products
        .iter()
        .find(|p| p.name == "Sesame bagel")
        .unwrap();
    assert_close(sesame.special_price, 2.7);
}
