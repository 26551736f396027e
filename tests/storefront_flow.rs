use std::io::Cursor;

use storefront_api::{
    db::{create_orm_conn, create_pool},
    dto::{
        auth::UpdateCustomerRequest,
        cart::{AddToCartRequest, UpdateCartItemRequest},
        catalog::{
            CreateCategoryRequest, CreateNotebookRequest, CreateSellerRequest,
            CreateSmartphoneRequest,
        },
        orders::MakeOrderRequest,
    },
    middleware::auth::{AuthUser, CartIdentity},
    models::ProductKind,
    routes::admin::UpdateOrderStatusRequest,
    services::{admin_service, cart_service, catalog_service, customer_service, order_service},
    state::AppState,
};
use uuid::Uuid;

// The tests share one database and truncate it on setup, so they take turns.
static DB_LOCK: tokio::sync::Mutex<()> = tokio::sync::Mutex::const_new(());

// Full storefront flow: catalog setup -> cart mutations -> checkout ->
// customer edit does not rewrite the order -> admin advances the status.
#[tokio::test]
async fn cart_checkout_and_admin_status_flow() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let state = match setup_state().await? {
        Some(state) => state,
        None => return Ok(()),
    };

    let user_id = create_user(&state, "user", "buyer@example.com").await?;
    let admin_id = create_user(&state, "admin", "admin@example.com").await?;

    let auth_user = AuthUser {
        user_id,
        role: "user".into(),
    };
    let auth_admin = AuthUser {
        user_id: admin_id,
        role: "admin".into(),
    };
    let identity = CartIdentity::Customer(auth_user.clone());

    // Catalog
    let category = catalog_service::create_category(
        &state.pool,
        CreateCategoryRequest {
            name: "Notebooks".into(),
            slug: "notebooks".into(),
        },
    )
    .await?
    .data
    .unwrap();

    let duplicate = catalog_service::create_category(
        &state.pool,
        CreateCategoryRequest {
            name: "Notebooks again".into(),
            slug: "notebooks".into(),
        },
    )
    .await;
    assert!(duplicate.is_err(), "duplicate category slug must be rejected");

    let seller = catalog_service::create_seller(
        &state.pool,
        CreateSellerRequest {
            name: "Test Seller".into(),
        },
    )
    .await?
    .data
    .unwrap();

    let notebook = catalog_service::create_notebook(
        &state.pool,
        CreateNotebookRequest {
            category_id: category.id,
            seller_id: seller.id,
            title: "Test Notebook".into(),
            slug: "test-notebook".into(),
            description: None,
            price: 129900,
            sale_price: 119900,
            diagonal: "15.6\"".into(),
            display: "IPS".into(),
            ram: "16GB".into(),
            video: "RTX 4060".into(),
            hdd: "1TB SSD".into(),
        },
    )
    .await?
    .data
    .unwrap();

    let smartphone = catalog_service::create_smartphone(
        &state.pool,
        CreateSmartphoneRequest {
            category_id: category.id,
            seller_id: seller.id,
            title: "Test Smartphone".into(),
            slug: "test-smartphone".into(),
            description: None,
            price: 79900,
            sale_price: 69900,
            diagonal: "6.1\"".into(),
            display: "OLED".into(),
            accum: "4500 mAh".into(),
            sd: true,
            hdd: "256GB".into(),
            cam: "48MP".into(),
        },
    )
    .await?
    .data
    .unwrap();

    // Add a notebook: line price is quantity x sale_price.
    let cart = cart_service::add_to_cart(
        &state,
        &identity,
        AddToCartRequest {
            product_kind: ProductKind::Notebook,
            product_id: notebook.id,
            quantity: 2,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].final_price, 2 * 119900);
    assert_eq!(cart.total_product, 2);
    assert_eq!(cart.final_price, 2 * 119900);

    // Add a smartphone, then grow its quantity.
    let cart = cart_service::add_to_cart(
        &state,
        &identity,
        AddToCartRequest {
            product_kind: ProductKind::Smartphone,
            product_id: smartphone.id,
            quantity: 1,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(cart.items.len(), 2);
    assert_eq!(cart.total_product, 3);
    assert_eq!(cart.final_price, 2 * 119900 + 69900);

    let phone_line = cart
        .items
        .iter()
        .find(|item| item.product_kind == ProductKind::Smartphone)
        .unwrap()
        .id;
    let cart = cart_service::update_item(
        &state,
        &identity,
        phone_line,
        UpdateCartItemRequest { quantity: 3 },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(cart.total_product, 5);
    assert_eq!(cart.final_price, 2 * 119900 + 3 * 69900);

    // Remove the smartphone line: aggregates shrink with it.
    let cart = cart_service::remove_item(&state, &identity, phone_line)
        .await?
        .data
        .unwrap();
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.total_product, 2);
    assert_eq!(cart.final_price, 2 * 119900);

    // Checkout snapshots buyer details onto the order.
    let checkout = order_service::make_order(
        &state,
        &auth_user,
        MakeOrderRequest {
            first_name: "Alice".into(),
            last_name: "Doe".into(),
            phone: "+1000000".into(),
            address: Some("1 Test Street".into()),
            buying_type: Some("delivery".into()),
            comment: None,
            order_date: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(checkout.order.status, "new");
    assert_eq!(checkout.order.buying_type, "delivery");
    assert_eq!(checkout.items.len(), 1);

    // The claimed cart is gone; a fresh view starts empty.
    let fresh = cart_service::view_cart(&state, &identity).await?.data.unwrap();
    assert_eq!(fresh.total_product, 0);
    assert!(fresh.items.is_empty());
    assert_ne!(fresh.id, cart.id);

    // Editing the customer must not rewrite the order snapshot.
    customer_service::update_me(
        &state.pool,
        &auth_user,
        UpdateCustomerRequest {
            phone: Some("+2000000".into()),
            address: None,
        },
    )
    .await?;
    let reread = order_service::get_order(&state, &auth_user, checkout.order.id)
        .await?
        .data
        .unwrap();
    assert_eq!(reread.order.phone, "+1000000");
    assert_eq!(reread.order.first_name, "Alice");

    // Admin advances the status; unknown statuses are rejected.
    let updated = admin_service::update_order_status(
        &state,
        &auth_admin,
        checkout.order.id,
        UpdateOrderStatusRequest {
            status: "in_progress".into(),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(updated.status, "in_progress");

    let bogus = admin_service::update_order_status(
        &state,
        &auth_admin,
        checkout.order.id,
        UpdateOrderStatusRequest {
            status: "shipped".into(),
        },
    )
    .await;
    assert!(bogus.is_err(), "status outside the enum must be rejected");

    // Non-admins cannot touch the workflow.
    let forbidden = admin_service::update_order_status(
        &state,
        &auth_user,
        checkout.order.id,
        UpdateOrderStatusRequest {
            status: "completed".into(),
        },
    )
    .await;
    assert!(forbidden.is_err());

    Ok(())
}

// Anonymous shoppers get their own cart keyed by the x-cart-token value.
#[tokio::test]
async fn anonymous_cart_is_separate_and_flagged() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let state = match setup_state().await? {
        Some(state) => state,
        None => return Ok(()),
    };

    let (category, seller) = seed_catalog_refs(&state).await?;
    let smartphone = catalog_service::create_smartphone(
        &state.pool,
        CreateSmartphoneRequest {
            category_id: category,
            seller_id: seller,
            title: "Anon Smartphone".into(),
            slug: "anon-smartphone".into(),
            description: None,
            price: 50000,
            sale_price: 45000,
            diagonal: "6.1\"".into(),
            display: "OLED".into(),
            accum: "4000 mAh".into(),
            sd: false,
            hdd: "128GB".into(),
            cam: "12MP".into(),
        },
    )
    .await?
    .data
    .unwrap();

    let identity = CartIdentity::Anonymous(Uuid::new_v4());
    let cart = cart_service::add_to_cart(
        &state,
        &identity,
        AddToCartRequest {
            product_kind: ProductKind::Smartphone,
            product_id: smartphone.id,
            quantity: 1,
        },
    )
    .await?
    .data
    .unwrap();
    assert!(cart.for_anon_user);
    assert_eq!(cart.final_price, 45000);

    // A different token sees a different, empty cart.
    let other = CartIdentity::Anonymous(Uuid::new_v4());
    let other_cart = cart_service::view_cart(&state, &other).await?.data.unwrap();
    assert_ne!(other_cart.id, cart.id);
    assert!(other_cart.items.is_empty());

    Ok(())
}

// Stored product images come back as 400x400 JPEG regardless of input shape.
#[tokio::test]
async fn product_image_is_normalized_on_upload() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let state = match setup_state().await? {
        Some(state) => state,
        None => return Ok(()),
    };

    let (category, seller) = seed_catalog_refs(&state).await?;
    let notebook = catalog_service::create_notebook(
        &state.pool,
        CreateNotebookRequest {
            category_id: category,
            seller_id: seller,
            title: "Imaged Notebook".into(),
            slug: "imaged-notebook".into(),
            description: None,
            price: 100000,
            sale_price: 90000,
            diagonal: "14\"".into(),
            display: "IPS".into(),
            ram: "8GB".into(),
            video: "integrated".into(),
            hdd: "512GB SSD".into(),
        },
    )
    .await?
    .data
    .unwrap();

    let png = {
        let img = image::RgbaImage::from_pixel(123, 456, image::Rgba([200, 10, 10, 255]));
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img).write_to(&mut buf, image::ImageFormat::Png)?;
        buf.into_inner()
    };

    catalog_service::set_product_image(&state.pool, ProductKind::Notebook, notebook.id, &png)
        .await?;

    let stored =
        catalog_service::get_product_image(&state.pool, ProductKind::Notebook, notebook.id)
            .await?;
    assert_eq!(image::guess_format(&stored)?, image::ImageFormat::Jpeg);
    let decoded = image::load_from_memory(&stored)?;
    assert_eq!((decoded.width(), decoded.height()), (400, 400));

    let garbage = catalog_service::set_product_image(
        &state.pool,
        ProductKind::Notebook,
        notebook.id,
        b"not an image",
    )
    .await;
    assert!(garbage.is_err());

    Ok(())
}

// Two first requests racing on the same token must end up in one cart, not
// split lines across twins.
#[tokio::test]
async fn concurrent_first_adds_share_one_cart() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let state = match setup_state().await? {
        Some(state) => state,
        None => return Ok(()),
    };

    let (category, seller) = seed_catalog_refs(&state).await?;
    let notebook = catalog_service::create_notebook(
        &state.pool,
        CreateNotebookRequest {
            category_id: category,
            seller_id: seller,
            title: "Race Notebook".into(),
            slug: "race-notebook".into(),
            description: None,
            price: 100000,
            sale_price: 90000,
            diagonal: "14\"".into(),
            display: "IPS".into(),
            ram: "8GB".into(),
            video: "integrated".into(),
            hdd: "512GB SSD".into(),
        },
    )
    .await?
    .data
    .unwrap();
    let smartphone = catalog_service::create_smartphone(
        &state.pool,
        CreateSmartphoneRequest {
            category_id: category,
            seller_id: seller,
            title: "Race Smartphone".into(),
            slug: "race-smartphone".into(),
            description: None,
            price: 50000,
            sale_price: 45000,
            diagonal: "6.1\"".into(),
            display: "OLED".into(),
            accum: "4000 mAh".into(),
            sd: false,
            hdd: "128GB".into(),
            cam: "12MP".into(),
        },
    )
    .await?
    .data
    .unwrap();

    let token = Uuid::new_v4();
    let identity = CartIdentity::Anonymous(token);

    let add_notebook = cart_service::add_to_cart(
        &state,
        &identity,
        AddToCartRequest {
            product_kind: ProductKind::Notebook,
            product_id: notebook.id,
            quantity: 1,
        },
    );
    let add_smartphone = cart_service::add_to_cart(
        &state,
        &identity,
        AddToCartRequest {
            product_kind: ProductKind::Smartphone,
            product_id: smartphone.id,
            quantity: 1,
        },
    );
    let (a, b) = tokio::join!(add_notebook, add_smartphone);
    let a = a?.data.unwrap();
    let b = b?.data.unwrap();
    assert_eq!(a.id, b.id, "both requests must land on the same open cart");

    let open_carts: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM carts WHERE anon_token = $1 AND NOT in_order")
            .bind(token)
            .fetch_one(&state.pool)
            .await?;
    assert_eq!(open_carts.0, 1);

    let cart = cart_service::view_cart(&state, &identity).await?.data.unwrap();
    assert_eq!(cart.items.len(), 2);
    assert_eq!(cart.total_product, 2);
    assert_eq!(cart.final_price, 90000 + 45000);

    Ok(())
}

// A cart belongs to a customer or to an anonymous token, never both or neither.
#[tokio::test]
async fn cart_identity_columns_are_mutually_exclusive() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let state = match setup_state().await? {
        Some(state) => state,
        None => return Ok(()),
    };

    let user_id = create_user(&state, "user", "exclusive@example.com").await?;
    let customer: (Uuid,) = sqlx::query_as("SELECT id FROM customers WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(&state.pool)
        .await?;

    let both = sqlx::query("INSERT INTO carts (id, customer_id, anon_token) VALUES ($1, $2, $3)")
        .bind(Uuid::new_v4())
        .bind(customer.0)
        .bind(Uuid::new_v4())
        .execute(&state.pool)
        .await;
    assert!(both.is_err(), "a cart with both owners must be rejected");

    let neither = sqlx::query("INSERT INTO carts (id) VALUES ($1)")
        .bind(Uuid::new_v4())
        .execute(&state.pool)
        .await;
    assert!(neither.is_err(), "an ownerless cart must be rejected");

    Ok(())
}

// Allow skipping when no DB is configured in the environment.
async fn setup_state() -> anyhow::Result<Option<AppState>> {
    let database_url =
        match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
            Ok(url) => url,
            Err(_) => {
                eprintln!(
                    "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
                );
                return Ok(None);
            }
        };

    let pool = create_pool(&database_url).await?;
    let orm = create_orm_conn(&database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    // Clean tables between runs.
    sqlx::query(
        "TRUNCATE TABLE orders, cart_products, carts, customers, audit_logs, notebooks, smartphones, sellers, categories, users RESTART IDENTITY CASCADE",
    )
    .execute(&pool)
    .await?;

    Ok(Some(AppState { pool, orm }))
}

async fn create_user(state: &AppState, role: &str, email: &str) -> anyhow::Result<Uuid> {
    let user_id = Uuid::new_v4();
    sqlx::query("INSERT INTO users (id, email, password_hash, role) VALUES ($1, $2, 'dummy', $3)")
        .bind(user_id)
        .bind(email)
        .bind(role)
        .execute(&state.pool)
        .await?;
    sqlx::query("INSERT INTO customers (id, user_id, phone, address) VALUES ($1, $2, '', '')")
        .bind(Uuid::new_v4())
        .bind(user_id)
        .execute(&state.pool)
        .await?;
    Ok(user_id)
}

async fn seed_catalog_refs(state: &AppState) -> anyhow::Result<(Uuid, Uuid)> {
    let category = catalog_service::create_category(
        &state.pool,
        CreateCategoryRequest {
            name: "Gadgets".into(),
            slug: "gadgets".into(),
        },
    )
    .await?
    .data
    .unwrap();
    let seller = catalog_service::create_seller(
        &state.pool,
        CreateSellerRequest {
            name: "Fixture Seller".into(),
        },
    )
    .await?
    .data
    .unwrap();
    Ok((category.id, seller.id))
}
