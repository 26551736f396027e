use axum::{
    extract::{FromRequest, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::response::{ApiResponse, Meta};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error("Bad Request {0}")]
    BadRequest(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Database error")]
    DbError(#[from] sqlx::Error),

    #[error("ORM error")]
    OrmError(#[from] sea_orm::DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::DbError(_) | AppError::OrmError(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ApiResponse {
            message: self.to_string(),
            data: Some(ErrorData {
                error: self.to_string(),
            }),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// JSON request body that rejects malformed or invalid payloads as 400
/// through the standard error envelope instead of axum's bare 422.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request};

    use super::*;
    use crate::dto::cart::AddToCartRequest;

    fn json_request(body: &str) -> Request<Body> {
        Request::builder()
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn unknown_product_kind_in_body_is_bad_request() {
        let req = json_request(
            r#"{"product_kind":"category","product_id":"5f8f8c44-0cdd-4ec6-8bc1-6c38a2f0b0aa","quantity":1}"#,
        );
        let result = JsonBody::<AddToCartRequest>::from_request(req, &()).await;
        match result {
            Err(AppError::BadRequest(_)) => {}
            Err(other) => panic!("expected BadRequest, got {other:?}"),
            Ok(_) => panic!("unknown product kind must not deserialize"),
        }
    }

    #[tokio::test]
    async fn valid_body_still_deserializes() {
        let req = json_request(
            r#"{"product_kind":"notebook","product_id":"5f8f8c44-0cdd-4ec6-8bc1-6c38a2f0b0aa"}"#,
        );
        let JsonBody(payload) = JsonBody::<AddToCartRequest>::from_request(req, &())
            .await
            .unwrap();
        assert_eq!(payload.quantity, 1);
    }
}
