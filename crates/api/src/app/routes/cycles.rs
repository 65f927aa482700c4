use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use feira_core::DomainError;
use feira_cycles::{CycleId, OfferStatus};

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(open_cycle).get(list_cycles))
        .route("/:id", get(get_cycle))
        .route("/:id/products", get(list_products).post(save_draft))
        .route("/:id/reuse", post(reuse_previous))
        .route("/:id/publish", post(publish_cycle))
        .route("/:id/next", post(open_next_cycle))
        .route("/:id/history", get(cycle_history))
}

pub async fn open_cycle(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Json(body): Json<dto::OpenCycleRequest>,
) -> axum::response::Response {
    let cycle_id = body.cycle_id.unwrap_or_default();
    match services.cycles.open(cycle_id, body.supplier_id, actor.stamp()) {
        Ok(cycle) => {
            tracing::info!(cycle_id = %cycle_id, supplier_id = %body.supplier_id, "cycle opened");
            (StatusCode::CREATED, Json(dto::CycleResponse::from(&cycle))).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_cycles(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    let cycles: Vec<dto::CycleResponse> = services
        .cycles
        .cycles()
        .iter()
        .map(dto::CycleResponse::from)
        .collect();
    Json(cycles).into_response()
}

pub async fn get_cycle(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let cycle_id: CycleId = match errors::parse_id(&id, "cycle") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.cycles.get(&cycle_id) {
        Some(cycle) => Json(dto::CycleResponse::from(&cycle)).into_response(),
        None => errors::domain_error_to_response(DomainError::not_found(format!("cycle {cycle_id}"))),
    }
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Query(query): Query<dto::ProductsQuery>,
) -> axum::response::Response {
    let cycle_id: CycleId = match errors::parse_id(&id, "cycle") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let status = match query.status.as_deref().map(str::parse::<OfferStatus>).transpose() {
        Ok(s) => s,
        Err(e) => return errors::domain_error_to_response(e),
    };
    match services.cycles.list_products(&cycle_id, status) {
        Ok(products) => Json(products).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn save_draft(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::SaveDraftRequest>,
) -> axum::response::Response {
    let cycle_id: CycleId = match errors::parse_id(&id, "cycle") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let stamp = actor.stamp();
    let (offer, expected) = match body.into_offer(stamp) {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };
    match services.lifecycle.save_draft(cycle_id, offer, expected, stamp) {
        Ok(saved) => Json(saved).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn reuse_previous(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::ReuseRequest>,
) -> axum::response::Response {
    let cycle_id: CycleId = match errors::parse_id(&id, "cycle") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let stamp = actor.stamp();

    let drafts = match services.lifecycle.reuse_from_previous(&body.previous_cycle_id, stamp) {
        Ok(d) => d,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let merged = if body.merge {
        match services.lifecycle.merge_reused(cycle_id, drafts.clone(), stamp) {
            Ok(n) => n,
            Err(e) => return errors::domain_error_to_response(e),
        }
    } else {
        0
    };

    Json(dto::ReuseResponse { drafts, merged }).into_response()
}

pub async fn publish_cycle(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let cycle_id: CycleId = match errors::parse_id(&id, "cycle") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.lifecycle.publish(cycle_id, actor.stamp()) {
        Ok(published) => Json(dto::PublishResponse { cycle_id, published }).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn open_next_cycle(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::NextCycleRequest>,
) -> axum::response::Response {
    let published: CycleId = match errors::parse_id(&id, "cycle") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let next = body.next_cycle_id.unwrap_or_default();
    match services
        .lifecycle
        .open_next_cycle(&published, next, body.seed, actor.stamp())
    {
        Ok(cycle) => (StatusCode::CREATED, Json(dto::CycleResponse::from(&cycle))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn cycle_history(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let cycle_id: CycleId = match errors::parse_id(&id, "cycle") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if services.cycles.get(&cycle_id).is_none() {
        return errors::domain_error_to_response(DomainError::not_found(format!("cycle {cycle_id}")));
    }
    let events: Vec<serde_json::Value> = services
        .lifecycle
        .history(&cycle_id)
        .iter()
        .map(|env| env.summary())
        .collect();
    Json(events).into_response()
}
