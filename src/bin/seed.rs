use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use storefront_api::{config::AppConfig, db::create_pool};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_user(&pool, "admin@example.com", "admin123", "admin").await?;
    let user_id = ensure_user(&pool, "user@example.com", "user123", "user").await?;
    seed_catalog(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, role)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_optional(pool)
    .await?;

    let user_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE email = $1")
                .bind(email)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    let customer: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM customers WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    if customer.is_none() {
        sqlx::query("INSERT INTO customers (id, user_id, phone, address) VALUES ($1, $2, '', '')")
            .bind(Uuid::new_v4())
            .bind(user_id)
            .execute(pool)
            .await?;
    }

    println!("Ensured user {email} (role={role})");
    Ok(user_id)
}

async fn seed_catalog(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let notebooks_cat = ensure_category(pool, "Notebooks", "notebooks").await?;
    let smartphones_cat = ensure_category(pool, "Smartphones", "smartphones").await?;
    let seller = ensure_seller(pool, "Demo Seller").await?;

    let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM notebooks WHERE slug = $1")
        .bind("demo-notebook")
        .fetch_optional(pool)
        .await?;
    if existing.is_none() {
        sqlx::query(
            r#"
            INSERT INTO notebooks
                (id, category_id, seller_id, title, slug, description, price, sale_price,
                 diagonal, display, ram, video, hdd)
            VALUES ($1, $2, $3, 'Demo Notebook', 'demo-notebook', 'A notebook for trying the API',
                    129900, 119900, '15.6"', 'IPS', '16GB', 'RTX 4060', '1TB SSD')
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(notebooks_cat)
        .bind(seller)
        .execute(pool)
        .await?;
    }

    let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM smartphones WHERE slug = $1")
        .bind("demo-smartphone")
        .fetch_optional(pool)
        .await?;
    if existing.is_none() {
        sqlx::query(
            r#"
            INSERT INTO smartphones
                (id, category_id, seller_id, title, slug, description, price, sale_price,
                 diagonal, display, accum, sd, hdd, cam)
            VALUES ($1, $2, $3, 'Demo Smartphone', 'demo-smartphone', 'A smartphone for trying the API',
                    79900, 69900, '6.1"', 'OLED', '4500 mAh', TRUE, '256GB', '48MP')
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(smartphones_cat)
        .bind(seller)
        .execute(pool)
        .await?;
    }

    println!("Seeded catalog");
    Ok(())
}

async fn ensure_category(pool: &sqlx::PgPool, name: &str, slug: &str) -> anyhow::Result<Uuid> {
    let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM categories WHERE slug = $1")
        .bind(slug)
        .fetch_optional(pool)
        .await?;
    if let Some((id,)) = existing {
        return Ok(id);
    }
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO categories (id, name, slug) VALUES ($1, $2, $3)")
        .bind(id)
        .bind(name)
        .bind(slug)
        .execute(pool)
        .await?;
    Ok(id)
}

async fn ensure_seller(pool: &sqlx::PgPool, name: &str) -> anyhow::Result<Uuid> {
    let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM sellers WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    if let Some((id,)) = existing {
        return Ok(id);
    }
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO sellers (id, name) VALUES ($1, $2)")
        .bind(id)
        .bind(name)
        .execute(pool)
        .await?;
    Ok(id)
}
