use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::auth::UpdateCustomerRequest,
    error::{AppResult, JsonBody},
    middleware::auth::AuthUser,
    models::Customer,
    response::ApiResponse,
    services::customer_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/me", get(get_me).put(update_me))
}

#[utoipa::path(
    get,
    path = "/api/customers/me",
    responses(
        (status = 200, description = "The caller's customer profile", body = ApiResponse<Customer>),
        (status = 404, description = "No profile"),
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn get_me(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Customer>>> {
    let resp = customer_service::get_me(&state.pool, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/customers/me",
    request_body = UpdateCustomerRequest,
    responses(
        (status = 200, description = "Profile updated; past orders keep their snapshots", body = ApiResponse<Customer>),
        (status = 404, description = "No profile"),
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn update_me(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(payload): JsonBody<UpdateCustomerRequest>,
) -> AppResult<Json<ApiResponse<Customer>>> {
    let resp = customer_service::update_me(&state.pool, &user, payload).await?;
    Ok(Json(resp))
}
