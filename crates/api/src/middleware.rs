use axum::{
    http::{HeaderMap, Method, StatusCode},
    middleware::Next,
    response::Response,
};

use feira_core::UserId;

use crate::app::errors::json_error;
use crate::context::ActorContext;

pub const ACTOR_HEADER: &str = "x-actor-id";

/// Attach an [`ActorContext`] from the `x-actor-id` header.
///
/// Mutating requests without a valid header are refused before reaching a
/// handler. Reads pass through; a valid header is still attached.
pub async fn actor_middleware(
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let mutating = !matches!(*req.method(), Method::GET | Method::HEAD | Method::OPTIONS);

    match extract_actor(req.headers()) {
        Ok(actor) => {
            req.extensions_mut().insert(ActorContext::new(actor));
        }
        Err(rejection) if mutating => {
            tracing::warn!(method = %req.method(), path = %req.uri().path(), "request without actor refused");
            return Err(rejection);
        }
        Err(_) => {}
    }

    Ok(next.run(req).await)
}

fn extract_actor(headers: &HeaderMap) -> Result<UserId, Response> {
    let header = headers.get(ACTOR_HEADER).ok_or_else(|| {
        json_error(
            StatusCode::UNAUTHORIZED,
            "missing_actor",
            format!("{ACTOR_HEADER} header is required"),
        )
    })?;

    header
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse::<UserId>().ok())
        .ok_or_else(|| {
            json_error(
                StatusCode::BAD_REQUEST,
                "invalid_id",
                format!("{ACTOR_HEADER} must be a UUID"),
            )
        })
}
