use chrono::Utc;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::{
        cart::CartItemDto,
        orders::{MakeOrderRequest, OrderList, OrderWithItems},
    },
    entity::{
        cart_products::{Column as CartProductCol, Entity as CartProducts},
        carts::{ActiveModel as CartActive, Column as CartCol, Entity as Carts},
        customers::{Column as CustomerCol, Entity as Customers},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{BuyingType, Order, OrderStatus, ProductKind},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    state::AppState,
};

/// Convert the caller's open cart into an order. The buyer details on the
/// payload are copied onto the order row, so the order keeps its snapshot
/// even when the customer record is edited afterwards.
pub async fn make_order(
    state: &AppState,
    user: &AuthUser,
    payload: MakeOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    if payload.first_name.trim().is_empty() || payload.phone.trim().is_empty() {
        return Err(AppError::BadRequest(
            "first_name and phone are required".into(),
        ));
    }

    let buying_type = match payload.buying_type.as_deref() {
        None | Some("") => BuyingType::SelfPickup,
        Some(raw) => BuyingType::parse(raw)
            .ok_or_else(|| AppError::BadRequest(format!("unknown buying_type {raw}")))?,
    };

    let txn = state.orm.begin().await?;

    let customer = Customers::find()
        .filter(CustomerCol::UserId.eq(user.user_id))
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::BadRequest("no customer profile for this user".into()))?;

    let cart = Carts::find()
        .filter(
            Condition::all()
                .add(CartCol::CustomerId.eq(customer.id))
                .add(CartCol::InOrder.eq(false)),
        )
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::BadRequest("Cart is empty".into()))?;

    let lines = CartProducts::find()
        .filter(CartProductCol::CartId.eq(cart.id))
        .all(&txn)
        .await?;
    if lines.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    // Line totals were materialized when the lines were saved; the order
    // charges those, not today's product prices.
    let total_product: i32 = lines.iter().map(|l| l.quantity).sum();
    let final_price: i64 = lines.iter().map(|l| l.final_price).sum();

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        customer_id: Set(customer.id),
        cart_id: Set(Some(cart.id)),
        first_name: Set(payload.first_name),
        last_name: Set(payload.last_name),
        phone: Set(payload.phone),
        address: Set(payload.address),
        status: Set(OrderStatus::New.as_str().to_string()),
        buying_type: Set(buying_type.as_str().to_string()),
        comment: Set(payload.comment),
        created_at: Set(Utc::now().into()),
        order_date: Set(payload.order_date.unwrap_or_else(|| Utc::now().date_naive())),
    }
    .insert(&txn)
    .await?;

    // Claim the cart: it stops being the customer's active cart.
    let mut cart_active: CartActive = cart.into();
    cart_active.in_order = Set(true);
    cart_active.total_product = Set(total_product);
    cart_active.final_price = Set(final_price);
    let cart = cart_active.update(&txn).await?;

    let items = items_for_cart(&txn, cart.id).await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "make_order",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "cart_id": cart.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order created",
        OrderWithItems {
            order: order_from_entity(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination.normalize();

    let customer = Customers::find()
        .filter(CustomerCol::UserId.eq(user.user_id))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut condition = Condition::all().add(OrderCol::CustomerId.eq(customer.id));
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(OrderCol::Status.eq(status.clone()));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let mut finder = Orders::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Ok",
        OrderList { items: orders },
        Some(meta),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let customer = Customers::find()
        .filter(CustomerCol::UserId.eq(user.user_id))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::CustomerId.eq(customer.id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let items = match order.cart_id {
        Some(cart_id) => items_for_cart(&state.orm, cart_id).await?,
        None => Vec::new(),
    };

    Ok(ApiResponse::success(
        "OK",
        OrderWithItems {
            order: order_from_entity(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

/// The lines of the claimed cart, joined with product title/slug/sale_price.
/// Admin order views reuse this.
pub(crate) async fn items_for_cart<C: ConnectionTrait>(
    conn: &C,
    cart_id: Uuid,
) -> AppResult<Vec<CartItemDto>> {
    use sea_orm::{FromQueryResult, Statement};

    #[derive(FromQueryResult)]
    struct Row {
        id: Uuid,
        product_kind: String,
        product_id: Uuid,
        quantity: i32,
        final_price: i64,
        title: String,
        slug: String,
        sale_price: i64,
    }

    let backend = conn.get_database_backend();
    let rows = Row::find_by_statement(Statement::from_sql_and_values(
        backend,
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
        [cart_id.into()],
    ))
    .all(conn)
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

pub(crate) fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        customer_id: model.customer_id,
        cart_id: model.cart_id,
        first_name: model.first_name,
        last_name: model.last_name,
        phone: model.phone,
        address: model.address,
        status: model.status,
        buying_type: model.buying_type,
        comment: model.comment,
        created_at: model.created_at.with_timezone(&Utc),
        order_date: model.order_date,
    }
}
