use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::catalog::{
        CategoryList, CategoryWithProducts, CreateCategoryRequest, CreateNotebookRequest,
        CreateSellerRequest, CreateSmartphoneRequest, ProductList, SellerList,
    },
    error::{AppResult, JsonBody},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Category, Notebook, ProductKind, Seller, Smartphone},
    response::ApiResponse,
    services::catalog_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/latest", get(latest_products))
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/{slug}", get(get_category))
        .route("/sellers", get(list_sellers).post(create_seller))
        .route("/notebooks", post(create_notebook))
        .route("/notebooks/{slug}", get(get_notebook))
        .route("/smartphones", post(create_smartphone))
        .route("/smartphones/{slug}", get(get_smartphone))
        .route(
            "/{kind}/{id}/image",
            put(upload_product_image).get(get_product_image),
        )
}

#[utoipa::path(
    get,
    path = "/api/catalog/latest",
    responses(
        (status = 200, description = "Newest notebooks and smartphones, newest first", body = ApiResponse<ProductList>)
    ),
    tag = "Catalog"
)]
pub async fn latest_products(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = catalog_service::latest_products(&state.pool).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/catalog/categories",
    responses(
        (status = 200, description = "List categories", body = ApiResponse<CategoryList>)
    ),
    tag = "Catalog"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    let resp = catalog_service::list_categories(&state.pool).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/catalog/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 200, description = "Category created", body = ApiResponse<Category>),
        (status = 400, description = "Duplicate slug"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn create_category(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(payload): JsonBody<CreateCategoryRequest>,
) -> AppResult<Json<ApiResponse<Category>>> {
    ensure_admin(&user)?;
    let resp = catalog_service::create_category(&state.pool, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/catalog/categories/{slug}",
    params(("slug" = String, Path, description = "Category slug")),
    responses(
        (status = 200, description = "Category with its products", body = ApiResponse<CategoryWithProducts>),
        (status = 404, description = "Category not found"),
    ),
    tag = "Catalog"
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ApiResponse<CategoryWithProducts>>> {
    let resp = catalog_service::get_category(&state.pool, &slug).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/catalog/sellers",
    responses(
        (status = 200, description = "List sellers", body = ApiResponse<SellerList>)
    ),
    tag = "Catalog"
)]
pub async fn list_sellers(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<SellerList>>> {
    let resp = catalog_service::list_sellers(&state.pool).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/catalog/sellers",
    request_body = CreateSellerRequest,
    responses(
        (status = 200, description = "Seller created", body = ApiResponse<Seller>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn create_seller(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(payload): JsonBody<CreateSellerRequest>,
) -> AppResult<Json<ApiResponse<Seller>>> {
    ensure_admin(&user)?;
    let resp = catalog_service::create_seller(&state.pool, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/catalog/notebooks",
    request_body = CreateNotebookRequest,
    responses(
        (status = 200, description = "Notebook created", body = ApiResponse<Notebook>),
        (status = 400, description = "Bad reference or duplicate slug"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn create_notebook(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(payload): JsonBody<CreateNotebookRequest>,
) -> AppResult<Json<ApiResponse<Notebook>>> {
    ensure_admin(&user)?;
    let resp = catalog_service::create_notebook(&state.pool, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/catalog/notebooks/{slug}",
    params(("slug" = String, Path, description = "Notebook slug")),
    responses(
        (status = 200, description = "Notebook detail", body = ApiResponse<Notebook>),
        (status = 404, description = "Not found"),
    ),
    tag = "Catalog"
)]
pub async fn get_notebook(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ApiResponse<Notebook>>> {
    let resp = catalog_service::get_notebook(&state.pool, &slug).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/catalog/smartphones",
    request_body = CreateSmartphoneRequest,
    responses(
        (status = 200, description = "Smartphone created", body = ApiResponse<Smartphone>),
        (status = 400, description = "Bad reference or duplicate slug"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn create_smartphone(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(payload): JsonBody<CreateSmartphoneRequest>,
) -> AppResult<Json<ApiResponse<Smartphone>>> {
    ensure_admin(&user)?;
    let resp = catalog_service::create_smartphone(&state.pool, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/catalog/smartphones/{slug}",
    params(("slug" = String, Path, description = "Smartphone slug")),
    responses(
        (status = 200, description = "Smartphone detail", body = ApiResponse<Smartphone>),
        (status = 404, description = "Not found"),
    ),
    tag = "Catalog"
)]
pub async fn get_smartphone(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ApiResponse<Smartphone>>> {
    let resp = catalog_service::get_smartphone(&state.pool, &slug).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/catalog/{kind}/{id}/image",
    params(
        ("kind" = String, Path, description = "Product kind: notebook or smartphone"),
        ("id" = Uuid, Path, description = "Product ID"),
    ),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Image normalized to 400x400 JPEG and stored"),
        (status = 400, description = "Body is not a decodable image"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn upload_product_image(
    State(state): State<AppState>,
    user: AuthUser,
    Path((kind, id)): Path<(ProductKind, Uuid)>,
    body: Bytes,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    ensure_admin(&user)?;
    let resp = catalog_service::set_product_image(&state.pool, kind, id, &body).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/catalog/{kind}/{id}/image",
    params(
        ("kind" = String, Path, description = "Product kind: notebook or smartphone"),
        ("id" = Uuid, Path, description = "Product ID"),
    ),
    responses(
        (status = 200, description = "The stored JPEG"),
        (status = 404, description = "No image stored"),
    ),
    tag = "Catalog"
)]
pub async fn get_product_image(
    State(state): State<AppState>,
    Path((kind, id)): Path<(ProductKind, Uuid)>,
) -> AppResult<impl IntoResponse> {
    let image = catalog_service::get_product_image(&state.pool, kind, id).await?;
    Ok(([(header::CONTENT_TYPE, "image/jpeg")], image))
}
