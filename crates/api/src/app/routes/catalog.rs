use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use feira_catalog::{NewReferenceProduct, ReferenceProductId};
use feira_core::DomainError;
use feira_cycles::ProductInCycle;

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(search_catalog).post(register_product))
        .route("/categories", get(list_categories))
        .route("/:id", get(get_product))
        .route("/:id/template", post(offer_template))
        .route("/:id/deactivate", post(deactivate_product))
}

pub async fn search_catalog(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::CatalogQuery>,
) -> axum::response::Response {
    let category = query.category.as_deref().filter(|c| !c.trim().is_empty());
    let hits = services
        .catalog
        .search(query.search.as_deref().unwrap_or_default(), category);
    Json(hits).into_response()
}

pub async fn list_categories(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    Json(services.catalog.categories()).into_response()
}

pub async fn register_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Json(body): Json<NewReferenceProduct>,
) -> axum::response::Response {
    match services.catalog.register(body) {
        Ok(product) => {
            tracing::debug!(product_id = %product.id, actor = %actor.actor_id(), "reference product registered via api");
            (StatusCode::CREATED, Json(product)).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let product_id: ReferenceProductId = match errors::parse_id(&id, "reference product") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.catalog.get(&product_id) {
        Some(product) => Json(product).into_response(),
        None => errors::domain_error_to_response(DomainError::not_found(format!("reference product {product_id}"))),
    }
}

/// "Use as base": a draft offer prefilled from the catalog entry. Nothing is
/// stored until the supplier saves it into a cycle.
pub async fn offer_template(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let product_id: ReferenceProductId = match errors::parse_id(&id, "reference product") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.catalog.offer_template(&product_id) {
        Ok(template) => Json(ProductInCycle::from_template(&template, actor.stamp())).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn deactivate_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let product_id: ReferenceProductId = match errors::parse_id(&id, "reference product") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.catalog.deactivate(&product_id) {
        Ok(product) => {
            tracing::debug!(product_id = %product_id, actor = %actor.actor_id(), "reference product deactivated via api");
            Json(product).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}
