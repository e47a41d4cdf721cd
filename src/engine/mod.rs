mod helpers;
mod identity_api;
mod offer_api;
mod order_api;
mod rating_api;
mod verification_api;

use sqlx::{Pool, Sqlite};

use crate::api::Api;
use crate::error::Error;

type Database = Sqlite;

pub struct Engine {
    pool: Pool<Database>,
}

impl Engine {
    #[tracing::instrument(name = "Engine::new", skip_all)]
    pub async fn new(pool: Pool<Database>) -> Result<Self, Error> {
        // identity registry
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS passengers (
                id TEXT PRIMARY KEY,
                handle TEXT NOT NULL UNIQUE,
                data TEXT NOT NULL
            )",
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS drivers (
                id TEXT PRIMARY KEY,
                handle TEXT NOT NULL UNIQUE,
                data TEXT NOT NULL
            )",
        )
        .execute(&pool)
        .await?;

        // verification ledger: one live document per (driver, category)
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS driver_documents (
                id TEXT PRIMARY KEY,
                driver_id TEXT NOT NULL REFERENCES drivers(id),
                category TEXT NOT NULL,
                payload TEXT NOT NULL,
                status TEXT NOT NULL,
                reason TEXT,
                submitted_at TEXT NOT NULL,
                UNIQUE (driver_id, category)
            )",
        )
        .execute(&pool)
        .await?;

        // order engine
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS orders (
                id TEXT PRIMARY KEY,
                passenger_id TEXT NOT NULL REFERENCES passengers(id),
                status TEXT NOT NULL,
                created_at TEXT NOT NULL,
                data TEXT NOT NULL
            )",
        )
        .execute(&pool)
        .await?;

        // offer engine: one offer per (order, driver), whatever its status
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS driver_offers (
                id TEXT PRIMARY KEY,
                order_id TEXT NOT NULL REFERENCES orders(id),
                driver_id TEXT NOT NULL REFERENCES drivers(id),
                price INTEGER NOT NULL,
                note TEXT,
                status TEXT NOT NULL,
                created_at TEXT NOT NULL,
                UNIQUE (order_id, driver_id)
            )",
        )
        .execute(&pool)
        .await?;

        // negotiation thread: append-only, rows are never edited
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS negotiations (
                id TEXT PRIMARY KEY,
                order_id TEXT NOT NULL REFERENCES orders(id),
                from_user_id TEXT NOT NULL,
                from_party TEXT NOT NULL,
                to_user_id TEXT NOT NULL,
                price INTEGER NOT NULL,
                status TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
        )
        .execute(&pool)
        .await?;

        // rating aggregator: one rating per (order, author)
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS ratings (
                id TEXT PRIMARY KEY,
                order_id TEXT NOT NULL REFERENCES orders(id),
                from_user_id TEXT NOT NULL,
                to_user_id TEXT NOT NULL,
                to_role TEXT NOT NULL,
                score INTEGER NOT NULL,
                comment TEXT,
                created_at TEXT NOT NULL,
                UNIQUE (order_id, from_user_id)
            )",
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }
}

impl Api for Engine {}

#[test]
fn new_engine() {
    use crate::db::DbPool;
    use tokio_test::block_on;

    let DbPool(pool) = block_on(DbPool::new("sqlite::memory:", 1)).unwrap();

    block_on(Engine::new(pool)).unwrap();
}
