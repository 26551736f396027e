use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::cart::{AddToCartRequest, CartDto, UpdateCartItemRequest},
    error::{AppResult, JsonBody},
    middleware::auth::CartIdentity,
    response::ApiResponse,
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(view_cart))
        .route("/items", axum::routing::post(add_to_cart))
        .route(
            "/items/{id}",
            axum::routing::patch(update_item).delete(remove_item),
        )
}

#[utoipa::path(
    get,
    path = "/api/cart",
    responses(
        (status = 200, description = "The caller's open cart with its lines", body = ApiResponse<CartDto>)
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn view_cart(
    State(state): State<AppState>,
    identity: CartIdentity,
) -> AppResult<Json<ApiResponse<CartDto>>> {
    let resp = cart_service::view_cart(&state, &identity).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/cart/items",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Line upserted; totals refreshed", body = ApiResponse<CartDto>),
        (status = 400, description = "Unknown product kind, missing product or bad quantity"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    identity: CartIdentity,
    JsonBody(payload): JsonBody<AddToCartRequest>,
) -> AppResult<Json<ApiResponse<CartDto>>> {
    let resp = cart_service::add_to_cart(&state, &identity, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/cart/items/{id}",
    params(("id" = Uuid, Path, description = "Cart line ID")),
    request_body = UpdateCartItemRequest,
    responses(
        (status = 200, description = "Quantity changed; line price and totals refreshed", body = ApiResponse<CartDto>),
        (status = 400, description = "Bad quantity"),
        (status = 404, description = "Line not in the caller's cart"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn update_item(
    State(state): State<AppState>,
    identity: CartIdentity,
    Path(id): Path<Uuid>,
    JsonBody(payload): JsonBody<UpdateCartItemRequest>,
) -> AppResult<Json<ApiResponse<CartDto>>> {
    let resp = cart_service::update_item(&state, &identity, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/cart/items/{id}",
    params(("id" = Uuid, Path, description = "Cart line ID")),
    responses(
        (status = 200, description = "Line removed; totals refreshed", body = ApiResponse<CartDto>),
        (status = 404, description = "Line not in the caller's cart"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn remove_item(
    State(state): State<AppState>,
    identity: CartIdentity,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CartDto>>> {
    let resp = cart_service::remove_item(&state, &identity, id).await?;
    Ok(Json(resp))
}
