//! One-shot admin seeding binary.
//!
//! Creates a superuser account if one does not already exist. Credentials
//! come from `ADMIN_USERNAME`, `ADMIN_EMAIL`, and `ADMIN_PASSWORD`; the
//! defaults are meant for local development only.

use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use herald_api::routes::auth::hash_password;
use herald_common::config::AppConfig;
use herald_common::db::create_pool;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    let pool = create_pool(&config.database_url, 1).await?;

    let username = std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
    let email = std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.com".to_string());
    let password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "12345qwerty".to_string());

    let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE username = $1")
        .bind(&username)
        .fetch_optional(&pool)
        .await?;
    if let Some((id,)) = existing {
        tracing::warn!(user_id = %id, %username, "Admin user already exists, nothing to do");
        return Ok(());
    }

    let password_hash =
        hash_password(&password).map_err(|e| anyhow::anyhow!("password hashing failed: {e}"))?;

    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO users (id, username, email, password_hash, is_admin)
        VALUES ($1, $2, $3, $4, true)
        "#,
    )
    .bind(id)
    .bind(&username)
    .bind(&email)
    .bind(&password_hash)
    .execute(&pool)
    .await?;

    tracing::info!(user_id = %id, %username, %email, "Admin user created");

    Ok(())
}
