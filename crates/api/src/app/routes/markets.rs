use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use feira_core::DomainError;
use feira_markets::{MarketId, MarketPatch, NewMarket};

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(search_markets).post(create_market))
        .route("/:id", get(get_market).patch(update_market))
}

pub async fn search_markets(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::MarketsQuery>,
) -> axum::response::Response {
    Json(services.markets.search(query.query.as_deref().unwrap_or_default())).into_response()
}

pub async fn create_market(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Json(body): Json<NewMarket>,
) -> axum::response::Response {
    match services.markets.create_market(body) {
        Ok(market) => {
            tracing::debug!(market_id = %market.id, actor = %actor.actor_id(), "market created via api");
            (StatusCode::CREATED, Json(market)).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_market(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let market_id: MarketId = match errors::parse_id(&id, "market") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.markets.get(&market_id) {
        Some(market) => Json(market).into_response(),
        None => errors::domain_error_to_response(DomainError::not_found(format!("market {market_id}"))),
    }
}

pub async fn update_market(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<MarketPatch>,
) -> axum::response::Response {
    let market_id: MarketId = match errors::parse_id(&id, "market") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.markets.update_market(&market_id, body) {
        Ok(market) => {
            tracing::debug!(market_id = %market_id, actor = %actor.actor_id(), "market updated via api");
            Json(market).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}
