use droshky::db::DbPool;
use droshky::engine::Engine;
use droshky::server::serve;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let db_uri = std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:droshky.db?mode=rwc".into());

    let DbPool(pool) = DbPool::new(&db_uri, 5).await.unwrap();
    let engine = Engine::new(pool).await.unwrap();

    serve(engine).await;
}
