use axum::Router;

pub mod catalog;
pub mod cycles;
pub mod markets;
pub mod products;
pub mod reports;
pub mod system;

/// Router for every endpoint behind the actor middleware.
pub fn router() -> Router {
    Router::new()
        .nest("/cycles", cycles::router())
        .nest("/products", products::router())
        .nest("/markets", markets::router())
        .nest("/catalog", catalog::router())
        .nest("/reports", reports::router())
}
