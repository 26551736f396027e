use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::catalog::{
        CategoryList, CategoryWithProducts, CreateCategoryRequest, CreateNotebookRequest,
        CreateSellerRequest, CreateSmartphoneRequest, ProductList, SellerList,
    },
    error::{AppError, AppResult},
    imaging,
    models::{Category, Notebook, ProductKind, ProductSummary, Seller, Smartphone},
    response::{ApiResponse, Meta},
};

/// How many of each product kind the storefront page shows.
const LATEST_PER_KIND: i64 = 5;

#[derive(FromRow)]
struct SummaryRow {
    id: Uuid,
    category_id: Uuid,
    title: String,
    slug: String,
    price: i64,
    sale_price: i64,
    created_at: DateTime<Utc>,
}

fn summary(kind: ProductKind, row: SummaryRow) -> ProductSummary {
    ProductSummary {
        kind,
        id: row.id,
        category_id: row.category_id,
        title: row.title,
        slug: row.slug,
        price: row.price,
        sale_price: row.sale_price,
        created_at: row.created_at,
    }
}

/// The storefront index: the newest notebooks and smartphones, merged and
/// ordered newest first.
pub async fn latest_products(pool: &DbPool) -> AppResult<ApiResponse<ProductList>> {
    let notebooks = sqlx::query_as::<_, SummaryRow>(
        "SELECT id, category_id, title, slug, price, sale_price, created_at
         FROM notebooks ORDER BY created_at DESC LIMIT $1",
    )
    .bind(LATEST_PER_KIND)
    .fetch_all(pool)
    .await?;

    let smartphones = sqlx::query_as::<_, SummaryRow>(
        "SELECT id, category_id, title, slug, price, sale_price, created_at
         FROM smartphones ORDER BY created_at DESC LIMIT $1",
    )
    .bind(LATEST_PER_KIND)
    .fetch_all(pool)
    .await?;

    let mut items: Vec<ProductSummary> = notebooks
        .into_iter()
        .map(|row| summary(ProductKind::Notebook, row))
        .chain(
            smartphones
                .into_iter()
                .map(|row| summary(ProductKind::Smartphone, row)),
        )
        .collect();
    items.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(ApiResponse::success(
        "Latest products",
        ProductList { items },
        Some(Meta::empty()),
    ))
}

pub async fn create_category(
    pool: &DbPool,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    let exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM categories WHERE slug = $1")
        .bind(payload.slug.as_str())
        .fetch_optional(pool)
        .await?;
    if exist.is_some() {
        return Err(AppError::BadRequest(format!(
            "slug {} is already taken",
            payload.slug
        )));
    }

    let category = sqlx::query_as::<_, Category>(
        "INSERT INTO categories (id, name, slug) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(payload.name)
    .bind(payload.slug)
    .fetch_one(pool)
    .await?;

    Ok(ApiResponse::success(
        "Category created",
        category,
        Some(Meta::empty()),
    ))
}

pub async fn list_categories(pool: &DbPool) -> AppResult<ApiResponse<CategoryList>> {
    let items = sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name")
        .fetch_all(pool)
        .await?;
    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        Some(Meta::empty()),
    ))
}

/// Category page: the category row plus every product (of either kind) in it.
pub async fn get_category(
    pool: &DbPool,
    slug: &str,
) -> AppResult<ApiResponse<CategoryWithProducts>> {
    let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE slug = $1")
        .bind(slug)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound)?;

    let notebooks = sqlx::query_as::<_, SummaryRow>(
        "SELECT id, category_id, title, slug, price, sale_price, created_at
         FROM notebooks WHERE category_id = $1 ORDER BY created_at DESC",
    )
    .bind(category.id)
    .fetch_all(pool)
    .await?;

    let smartphones = sqlx::query_as::<_, SummaryRow>(
        "SELECT id, category_id, title, slug, price, sale_price, created_at
         FROM smartphones WHERE category_id = $1 ORDER BY created_at DESC",
    )
    .bind(category.id)
    .fetch_all(pool)
    .await?;

    let mut products: Vec<ProductSummary> = notebooks
        .into_iter()
        .map(|row| summary(ProductKind::Notebook, row))
        .chain(
            smartphones
                .into_iter()
                .map(|row| summary(ProductKind::Smartphone, row)),
        )
        .collect();
    products.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(ApiResponse::success(
        "Category",
        CategoryWithProducts { category, products },
        Some(Meta::empty()),
    ))
}

pub async fn create_seller(
    pool: &DbPool,
    payload: CreateSellerRequest,
) -> AppResult<ApiResponse<Seller>> {
    let seller =
        sqlx::query_as::<_, Seller>("INSERT INTO sellers (id, name) VALUES ($1, $2) RETURNING *")
            .bind(Uuid::new_v4())
            .bind(payload.name)
            .fetch_one(pool)
            .await?;

    Ok(ApiResponse::success(
        "Seller created",
        seller,
        Some(Meta::empty()),
    ))
}

pub async fn list_sellers(pool: &DbPool) -> AppResult<ApiResponse<SellerList>> {
    let items = sqlx::query_as::<_, Seller>("SELECT * FROM sellers ORDER BY name")
        .fetch_all(pool)
        .await?;
    Ok(ApiResponse::success(
        "Sellers",
        SellerList { items },
        Some(Meta::empty()),
    ))
}

async fn check_product_refs(
    pool: &DbPool,
    kind: ProductKind,
    category_id: Uuid,
    seller_id: Uuid,
    slug: &str,
) -> AppResult<()> {
    let category: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM categories WHERE id = $1")
        .bind(category_id)
        .fetch_optional(pool)
        .await?;
    if category.is_none() {
        return Err(AppError::BadRequest("category not found".to_string()));
    }

    let seller: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM sellers WHERE id = $1")
        .bind(seller_id)
        .fetch_optional(pool)
        .await?;
    if seller.is_none() {
        return Err(AppError::BadRequest("seller not found".to_string()));
    }

    let slug_taken: Option<(Uuid,)> = match kind {
        ProductKind::Notebook => sqlx::query_as("SELECT id FROM notebooks WHERE slug = $1")
            .bind(slug)
            .fetch_optional(pool)
            .await?,
        ProductKind::Smartphone => sqlx::query_as("SELECT id FROM smartphones WHERE slug = $1")
            .bind(slug)
            .fetch_optional(pool)
            .await?,
    };
    if slug_taken.is_some() {
        return Err(AppError::BadRequest(format!(
            "slug {slug} is already taken"
        )));
    }

    Ok(())
}

pub async fn create_notebook(
    pool: &DbPool,
    payload: CreateNotebookRequest,
) -> AppResult<ApiResponse<Notebook>> {
    check_product_refs(
        pool,
        ProductKind::Notebook,
        payload.category_id,
        payload.seller_id,
        &payload.slug,
    )
    .await?;

    let notebook = sqlx::query_as::<_, Notebook>(
        r#"
        INSERT INTO notebooks
            (id, category_id, seller_id, title, slug, description, price, sale_price,
             diagonal, display, ram, video, hdd)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        RETURNING id, category_id, seller_id, title, slug, description, price, sale_price,
                  diagonal, display, ram, video, hdd, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(payload.category_id)
    .bind(payload.seller_id)
    .bind(payload.title)
    .bind(payload.slug)
    .bind(payload.description)
    .bind(payload.price)
    .bind(payload.sale_price)
    .bind(payload.diagonal)
    .bind(payload.display)
    .bind(payload.ram)
    .bind(payload.video)
    .bind(payload.hdd)
    .fetch_one(pool)
    .await?;

    Ok(ApiResponse::success(
        "Notebook created",
        notebook,
        Some(Meta::empty()),
    ))
}

pub async fn create_smartphone(
    pool: &DbPool,
    payload: CreateSmartphoneRequest,
) -> AppResult<ApiResponse<Smartphone>> {
    check_product_refs(
        pool,
        ProductKind::Smartphone,
        payload.category_id,
        payload.seller_id,
        &payload.slug,
    )
    .await?;

    let smartphone = sqlx::query_as::<_, Smartphone>(
        r#"
        INSERT INTO smartphones
            (id, category_id, seller_id, title, slug, description, price, sale_price,
             diagonal, display, accum, sd, hdd, cam)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        RETURNING id, category_id, seller_id, title, slug, description, price, sale_price,
                  diagonal, display, accum, sd, hdd, cam, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(payload.category_id)
    .bind(payload.seller_id)
    .bind(payload.title)
    .bind(payload.slug)
    .bind(payload.description)
    .bind(payload.price)
    .bind(payload.sale_price)
    .bind(payload.diagonal)
    .bind(payload.display)
    .bind(payload.accum)
    .bind(payload.sd)
    .bind(payload.hdd)
    .bind(payload.cam)
    .fetch_one(pool)
    .await?;

    Ok(ApiResponse::success(
        "Smartphone created",
        smartphone,
        Some(Meta::empty()),
    ))
}

pub async fn get_notebook(pool: &DbPool, slug: &str) -> AppResult<ApiResponse<Notebook>> {
    let notebook = sqlx::query_as::<_, Notebook>(
        "SELECT id, category_id, seller_id, title, slug, description, price, sale_price,
                diagonal, display, ram, video, hdd, created_at
         FROM notebooks WHERE slug = $1",
    )
    .bind(slug)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::success("Notebook", notebook, None))
}

pub async fn get_smartphone(pool: &DbPool, slug: &str) -> AppResult<ApiResponse<Smartphone>> {
    let smartphone = sqlx::query_as::<_, Smartphone>(
        "SELECT id, category_id, seller_id, title, slug, description, price, sale_price,
                diagonal, display, accum, sd, hdd, cam, created_at
         FROM smartphones WHERE slug = $1",
    )
    .bind(slug)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::success("Smartphone", smartphone, None))
}

/// Store a normalized product image: whatever arrives is decoded, converted
/// to RGB, resized to 400x400 and persisted as JPEG.
pub async fn set_product_image(
    pool: &DbPool,
    kind: ProductKind,
    id: Uuid,
    bytes: &[u8],
) -> AppResult<ApiResponse<serde_json::Value>> {
    let normalized = imaging::normalize(bytes)
        .map_err(|e| AppError::BadRequest(format!("could not decode image: {e}")))?;

    let result = match kind {
        ProductKind::Notebook => sqlx::query("UPDATE notebooks SET image = $2 WHERE id = $1")
            .bind(id)
            .bind(normalized.as_slice())
            .execute(pool)
            .await?,
        ProductKind::Smartphone => sqlx::query("UPDATE smartphones SET image = $2 WHERE id = $1")
            .bind(id)
            .bind(normalized.as_slice())
            .execute(pool)
            .await?,
    };
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::success(
        "Image stored",
        serde_json::json!({ "bytes": normalized.len() }),
        Some(Meta::empty()),
    ))
}

pub async fn get_product_image(
    pool: &DbPool,
    kind: ProductKind,
    id: Uuid,
) -> AppResult<Vec<u8>> {
    let row: Option<(Option<Vec<u8>>,)> = match kind {
        ProductKind::Notebook => sqlx::query_as("SELECT image FROM notebooks WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?,
        ProductKind::Smartphone => sqlx::query_as("SELECT image FROM smartphones WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?,
    };

    match row {
        Some((Some(image),)) => Ok(image),
        _ => Err(AppError::NotFound),
    }
}
