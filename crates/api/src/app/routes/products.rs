//! Offer-level routes. Offers are addressed by id alone; the owning cycle is
//! looked up.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    response::IntoResponse,
    routing::{get, patch},
};

use feira_core::DomainError;
use feira_cycles::{OfferId, OfferStatus};

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/:id", get(get_offer).delete(remove_offer))
        .route("/:id/status", patch(change_status))
}

pub async fn get_offer(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let offer_id: OfferId = match errors::parse_id(&id, "offer") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.cycles.find_offer(&offer_id) {
        Some((cycle_id, offer)) => Json(dto::OfferLocation { cycle_id, offer }).into_response(),
        None => errors::domain_error_to_response(DomainError::not_found(format!("offer {offer_id}"))),
    }
}

pub async fn change_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::StatusChangeRequest>,
) -> axum::response::Response {
    let offer_id: OfferId = match errors::parse_id(&id, "offer") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let to: OfferStatus = match body.status.parse() {
        Ok(s) => s,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let result = match to {
        OfferStatus::Approved => services.lifecycle.approve(offer_id, actor.stamp()),
        OfferStatus::Rejected => services.lifecycle.reject(offer_id, actor.stamp()),
        OfferStatus::Draft => services.lifecycle.change_status(offer_id, to, actor.stamp()),
    };
    match result {
        Ok(offer) => Json(offer).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn remove_offer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let offer_id: OfferId = match errors::parse_id(&id, "offer") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.lifecycle.remove(offer_id, actor.stamp()) {
        Ok(removed) => Json(removed).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
