use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::cart::{AddToCartRequest, CartDto, CartItemDto, UpdateCartItemRequest},
    error::{AppError, AppResult},
    middleware::auth::CartIdentity,
    models::{Cart, ProductKind},
    response::{ApiResponse, Meta},
    state::AppState,
};

#[derive(FromRow)]
struct CartItemRow {
    id: Uuid,
    product_kind: String,
    product_id: Uuid,
    quantity: i32,
    final_price: i64,
    title: String,
    slug: String,
    sale_price: i64,
}

pub async fn view_cart(
    state: &AppState,
    identity: &CartIdentity,
) -> AppResult<ApiResponse<CartDto>> {
    let mut tx = state.pool.begin().await?;
    let cart = get_or_create_cart(&mut tx, identity).await?;
    let items = load_items(&mut tx, cart.id).await?;
    tx.commit().await?;

    Ok(ApiResponse::success(
        "OK",
        cart_dto(cart, items),
        Some(Meta::empty()),
    ))
}

pub async fn add_to_cart(
    state: &AppState,
    identity: &CartIdentity,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartDto>> {
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let mut tx = state.pool.begin().await?;
    let cart = get_or_create_cart(&mut tx, identity).await?;

    let sale_price = product_sale_price(&mut tx, payload.product_kind, payload.product_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("product not found".to_string()))?;

    // Line price is denormalized at save time: quantity x current sale_price.
    let final_price = i64::from(payload.quantity) * sale_price;

    sqlx::query(
        r#"
        INSERT INTO cart_products (id, cart_id, customer_id, product_kind, product_id, quantity, final_price)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (cart_id, product_kind, product_id)
        DO UPDATE SET quantity = EXCLUDED.quantity, final_price = EXCLUDED.final_price
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(cart.id)
    .bind(cart.customer_id)
    .bind(payload.product_kind.as_str())
    .bind(payload.product_id)
    .bind(payload.quantity)
    .bind(final_price)
    .execute(&mut *tx)
    .await?;

    let cart = refresh_totals(&mut tx, cart.id).await?;
    let items = load_items(&mut tx, cart.id).await?;
    tx.commit().await?;

    audit_cart(
        state,
        identity,
        "cart_add",
        serde_json::json!({
            "product_kind": payload.product_kind.as_str(),
            "product_id": payload.product_id,
            "quantity": payload.quantity,
        }),
    )
    .await;

    Ok(ApiResponse::success(
        "Added to cart",
        cart_dto(cart, items),
        Some(Meta::empty()),
    ))
}

pub async fn update_item(
    state: &AppState,
    identity: &CartIdentity,
    item_id: Uuid,
    payload: UpdateCartItemRequest,
) -> AppResult<ApiResponse<CartDto>> {
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let mut tx = state.pool.begin().await?;
    let cart = active_cart(&mut tx, identity)
        .await?
        .ok_or(AppError::NotFound)?;

    let line: Option<(String, Uuid)> = sqlx::query_as(
        "SELECT product_kind, product_id FROM cart_products WHERE id = $1 AND cart_id = $2 FOR UPDATE",
    )
    .bind(item_id)
    .bind(cart.id)
    .fetch_optional(&mut *tx)
    .await?;
    let (kind_tag, product_id) = line.ok_or(AppError::NotFound)?;

    let kind = ProductKind::parse(&kind_tag)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("unknown product kind {kind_tag}")))?;
    let sale_price = product_sale_price(&mut tx, kind, product_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("product is no longer available".to_string()))?;

    sqlx::query("UPDATE cart_products SET quantity = $2, final_price = $3 WHERE id = $1")
        .bind(item_id)
        .bind(payload.quantity)
        .bind(i64::from(payload.quantity) * sale_price)
        .execute(&mut *tx)
        .await?;

    let cart = refresh_totals(&mut tx, cart.id).await?;
    let items = load_items(&mut tx, cart.id).await?;
    tx.commit().await?;

    audit_cart(
        state,
        identity,
        "cart_update",
        serde_json::json!({ "item_id": item_id, "quantity": payload.quantity }),
    )
    .await;

    Ok(ApiResponse::success(
        "Cart updated",
        cart_dto(cart, items),
        Some(Meta::empty()),
    ))
}

pub async fn remove_item(
    state: &AppState,
    identity: &CartIdentity,
    item_id: Uuid,
) -> AppResult<ApiResponse<CartDto>> {
    let mut tx = state.pool.begin().await?;
    let cart = active_cart(&mut tx, identity)
        .await?
        .ok_or(AppError::NotFound)?;

    let result = sqlx::query("DELETE FROM cart_products WHERE id = $1 AND cart_id = $2")
        .bind(item_id)
        .bind(cart.id)
        .execute(&mut *tx)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    let cart = refresh_totals(&mut tx, cart.id).await?;
    let items = load_items(&mut tx, cart.id).await?;
    tx.commit().await?;

    audit_cart(
        state,
        identity,
        "cart_remove",
        serde_json::json!({ "item_id": item_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Removed from cart",
        cart_dto(cart, items),
        Some(Meta::empty()),
    ))
}

/// The caller's open cart, locked for the rest of the transaction. Carts
/// already claimed by an order are never returned here.
async fn active_cart(
    conn: &mut PgConnection,
    identity: &CartIdentity,
) -> AppResult<Option<Cart>> {
    let cart = match identity {
        CartIdentity::Customer(user) => {
            let customer: Option<(Uuid,)> =
                sqlx::query_as("SELECT id FROM customers WHERE user_id = $1")
                    .bind(user.user_id)
                    .fetch_optional(&mut *conn)
                    .await?;
            let (customer_id,) = match customer {
                Some(row) => row,
                None => return Ok(None),
            };
            sqlx::query_as::<_, Cart>(
                "SELECT * FROM carts WHERE customer_id = $1 AND NOT in_order FOR UPDATE",
            )
            .bind(customer_id)
            .fetch_optional(&mut *conn)
            .await?
        }
        CartIdentity::Anonymous(token) => {
            sqlx::query_as::<_, Cart>(
                "SELECT * FROM carts WHERE anon_token = $1 AND NOT in_order FOR UPDATE",
            )
            .bind(token)
            .fetch_optional(&mut *conn)
            .await?
        }
    };
    Ok(cart)
}

/// Find the caller's open cart or create it. The partial unique indexes on
/// carts admit one open cart per identity, so when two first requests race
/// the losing insert hits the index and re-selects the winner instead.
async fn get_or_create_cart(
    conn: &mut PgConnection,
    identity: &CartIdentity,
) -> AppResult<Cart> {
    if let Some(cart) = active_cart(conn, identity).await? {
        return Ok(cart);
    }

    let inserted = match identity {
        CartIdentity::Customer(user) => {
            let customer: Option<(Uuid,)> =
                sqlx::query_as("SELECT id FROM customers WHERE user_id = $1")
                    .bind(user.user_id)
                    .fetch_optional(&mut *conn)
                    .await?;
            let (customer_id,) = customer.ok_or_else(|| {
                AppError::BadRequest("no customer profile for this user".to_string())
            })?;
            sqlx::query_as::<_, Cart>(
                r#"
                INSERT INTO carts (id, customer_id) VALUES ($1, $2)
                ON CONFLICT (customer_id) WHERE NOT in_order DO NOTHING
                RETURNING *
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(customer_id)
            .fetch_optional(&mut *conn)
            .await?
        }
        CartIdentity::Anonymous(token) => {
            sqlx::query_as::<_, Cart>(
                r#"
                INSERT INTO carts (id, anon_token, for_anon_user) VALUES ($1, $2, TRUE)
                ON CONFLICT (anon_token) WHERE NOT in_order DO NOTHING
                RETURNING *
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(token)
            .fetch_optional(&mut *conn)
            .await?
        }
    };

    match inserted {
        Some(cart) => Ok(cart),
        // Lost the insert race; lock the cart the other request created.
        None => active_cart(conn, identity).await?.ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("open cart vanished after insert conflict"))
        }),
    }
}

/// Resolve the polymorphic (kind, id) reference to the product's sale price.
async fn product_sale_price(
    conn: &mut PgConnection,
    kind: ProductKind,
    product_id: Uuid,
) -> AppResult<Option<i64>> {
    let row: Option<(i64,)> = match kind {
        ProductKind::Notebook => {
            sqlx::query_as("SELECT sale_price FROM notebooks WHERE id = $1")
                .bind(product_id)
                .fetch_optional(&mut *conn)
                .await?
        }
        ProductKind::Smartphone => {
            sqlx::query_as("SELECT sale_price FROM smartphones WHERE id = $1")
                .bind(product_id)
                .fetch_optional(&mut *conn)
                .await?
        }
    };
    Ok(row.map(|(price,)| price))
}

/// Rewrite the cart aggregates from its lines, inside the caller's
/// transaction so a concurrent mutation cannot interleave.
async fn refresh_totals(conn: &mut PgConnection, cart_id: Uuid) -> AppResult<Cart> {
    let cart = sqlx::query_as::<_, Cart>(
        r#"
        UPDATE carts SET
            total_product = COALESCE((SELECT SUM(quantity) FROM cart_products WHERE cart_id = carts.id), 0),
            final_price = COALESCE((SELECT SUM(final_price) FROM cart_products WHERE cart_id = carts.id), 0)
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(cart_id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(cart)
}

async fn load_items(conn: &mut PgConnection, cart_id: Uuid) -> AppResult<Vec<CartItemDto>> {
    let rows = sqlx::query_as::<_, CartItemRow>(
        r#"
        SELECT cp.id, cp.product_kind, cp.product_id, cp.quantity, cp.final_price,
               n.title, n.slug, n.sale_price, cp.created_at
        FROM cart_products cp
        JOIN notebooks n ON cp.product_kind = 'notebook' AND n.id = cp.product_id
        WHERE cp.cart_id = $1
        UNION ALL
        SELECT cp.id, cp.product_kind, cp.product_id, cp.quantity, cp.final_price,
               s.title, s.slug, s.sale_price, cp.created_at
        FROM cart_products cp
        JOIN smartphones s ON cp.product_kind = 'smartphone' AND s.id = cp.product_id
        WHERE cp.cart_id = $1
        ORDER BY 9
        "#,
    )
    .bind(cart_id)
    .fetch_all(&mut *conn)
    .await?;

    rows.into_iter()
        .map(|row| {
            let kind = ProductKind::parse(&row.product_kind).ok_or_else(|| {
                AppError::Internal(anyhow::anyhow!(
                    "unknown product kind {} on cart line {}",
                    row.product_kind,
                    row.id
                ))
            })?;
            Ok(CartItemDto {
                id: row.id,
                product_kind: kind,
                product_id: row.product_id,
                title: row.title,
                slug: row.slug,
                sale_price: row.sale_price,
                quantity: row.quantity,
                final_price: row.final_price,
            })
        })
        .collect()
}

fn cart_dto(cart: Cart, items: Vec<CartItemDto>) -> CartDto {
    CartDto {
        id: cart.id,
        total_product: cart.total_product,
        final_price: cart.final_price,
        in_order: cart.in_order,
        for_anon_user: cart.for_anon_user,
        items,
    }
}

async fn audit_cart(
    state: &AppState,
    identity: &CartIdentity,
    action: &str,
    metadata: serde_json::Value,
) {
    let user_id = match identity {
        CartIdentity::Customer(user) => Some(user.user_id),
        CartIdentity::Anonymous(_) => None,
    };
    if let Err(err) = log_audit(
        &state.pool,
        user_id,
        action,
        Some("cart_products"),
        Some(metadata),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }
}
