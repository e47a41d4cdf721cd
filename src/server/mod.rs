mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{get, patch, post},
    Router,
};

use crate::api::Api;
use crate::server::handlers::{documents, drivers, negotiations, offers, orders, passengers, ratings};

type DynApi = Arc<dyn Api + Send + Sync>;

pub async fn serve<T: Api + Send + Sync + 'static>(api: T) {
    let api = Arc::new(api) as DynApi;

    let app = Router::new()
        .route("/passengers", post(passengers::register))
        .route("/drivers", post(drivers::register))
        .route("/drivers/:handle/availability", patch(drivers::set_availability))
        .route("/drivers/:handle/documents", post(documents::submit))
        .route("/drivers/:handle/verification", get(documents::status))
        .route("/documents/:id/adjudicate", patch(documents::adjudicate))
        .route("/parties/:handle", get(passengers::classify))
        .route("/orders", post(orders::create))
        .route("/orders/available", get(orders::list_available))
        .route("/orders/:id/start", patch(orders::start))
        .route("/orders/:id/complete", patch(orders::complete))
        .route("/orders/:id/cancel", patch(orders::cancel))
        .route("/orders/:id/offers", get(offers::list))
        .route("/orders/:id/negotiations", post(negotiations::create))
        .route("/offers", post(offers::create))
        .route("/offers/:id/accept", patch(offers::accept))
        .route("/negotiations/:id/respond", patch(negotiations::respond))
        .route("/ratings", post(ratings::create))
        .route("/users/:id/rating", get(ratings::summary))
        .layer(Extension(api));

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));

    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .unwrap();
}
