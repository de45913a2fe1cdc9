pub mod user;
pub mod product;
pub mod cart;
pub mod cart_item;

use sea_orm::{
    sea_query::Index, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, Schema, Set,
    TransactionTrait,
};
use tracing::info;

use crate::entities::{
    cart::Entity as Cart,
    cart_item::Entity as CartItem,
    product::Entity as Product,
    user::Entity as User,
};
use crate::ledger::pricing::special_price;

/// Creates every table the ledger needs. Referenced tables go first so the
/// foreign keys resolve on backends that check them at creation time.
pub async fn setup_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut create_user_table = schema.create_table_from_entity(User);
    let mut create_product_table = schema.create_table_from_entity(Product);
    let mut create_cart_table = schema.create_table_from_entity(Cart);
    let mut create_cart_item_table = schema.create_table_from_entity(CartItem);

    for table in [
        create_user_table.if_not_exists(),
        create_product_table.if_not_exists(),
        create_cart_table.if_not_exists(),
        create_cart_item_table.if_not_exists(),
    ] {
        db.execute(backend.build(&*table)).await?;
    }

    let cart_product_index = Index::create()
        .name("idx_cart_items_cart_product")
        .table(CartItem)
        .col(cart_item::Column::CartId)
        .col(cart_item::Column::ProductId)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(backend.build(&cart_product_index)).await?;

    Ok(())
}

/// Inserts a demo account pair and a couple of products, all or nothing.
/// Does nothing once any user exists.
pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    if User::find().one(db).await?.is_some() {
        return Ok(());
    }

    let users = [
        user::ActiveModel {
            email: Set("user@baranki.local".to_owned()),
            role: Set(user::Role::User),
            ..Default::default()
        },
        user::ActiveModel {
            email: Set("admin@baranki.local".to_owned()),
            role: Set(user::Role::Admin),
            ..Default::default()
        },
    ];

    let products = [
        ("Poppy seed bagel", 40, 2.5, 0.0),
        ("Sesame bagel", 25, 3.0, 10.0),
    ]
    .map(|(name, quantity, price, discount)| product::ActiveModel {
        name: Set(name.to_owned()),
        image: Set("default_img.png".to_owned()),
        description: Set(String::new()),
        quantity: Set(quantity),
        price: Set(price),
        discount: Set(discount),
        special_price: Set(special_price(price, discount)),
        ..Default::default()
    });

    let txn = db.begin().await?;
    User::insert_many(users).exec(&txn).await?;
    Product::insert_many(products).exec(&txn).await?;
    txn.commit().await?;

    info!("Seeded demo users and products");
    Ok(())
}
