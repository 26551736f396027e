use crate::{
    db::DbPool,
    dto::auth::UpdateCustomerRequest,
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Customer,
    response::{ApiResponse, Meta},
};

pub async fn get_me(pool: &DbPool, user: &AuthUser) -> AppResult<ApiResponse<Customer>> {
    let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE user_id = $1")
        .bind(user.user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::success("OK", customer, Some(Meta::empty())))
}

/// Update the customer profile. Existing orders keep the contact details
/// they snapshotted at checkout.
pub async fn update_me(
    pool: &DbPool,
    user: &AuthUser,
    payload: UpdateCustomerRequest,
) -> AppResult<ApiResponse<Customer>> {
    let existing = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE user_id = $1")
        .bind(user.user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound)?;

    let phone = payload.phone.unwrap_or(existing.phone);
    let address = payload.address.unwrap_or(existing.address);

    let customer = sqlx::query_as::<_, Customer>(
        "UPDATE customers SET phone = $2, address = $3 WHERE id = $1 RETURNING *",
    )
    .bind(existing.id)
    .bind(phone)
    .bind(address)
    .fetch_one(pool)
    .await?;

    Ok(ApiResponse::success(
        "Updated",
        customer,
        Some(Meta::empty()),
    ))
}
