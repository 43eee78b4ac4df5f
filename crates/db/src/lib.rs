//! Atrium persistence layer.
//!
//! Row models and DTOs live in [`models`], query logic in [`repositories`]
//! (zero-sized structs whose async methods take `&PgPool`), and the
//! [`store`] module adapts the repositories to the trait seams the
//! lifecycle dispatcher consumes.

use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod repositories;
pub mod store;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Cheap connectivity probe.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await.map(|_| ())
}
