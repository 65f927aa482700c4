use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Query},
    http::header,
    response::IntoResponse,
    routing::get,
};

use feira_reports::{export_csv, facets, harvest_calendar, report};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub const CSV_FILENAME: &str = "produtos-vencidos.csv";

pub fn router() -> Router {
    Router::new()
        .route("/expired", get(expired_report))
        .route("/expired.csv", get(expired_report_csv))
        .route("/harvest-calendar", get(harvest_schedule))
}

pub async fn expired_report(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ExpiredQuery>,
) -> axum::response::Response {
    let filter = match query.filter() {
        Ok(f) => f,
        Err(e) => return errors::domain_error_to_response(e),
    };
    Json(dto::ExpiredReportResponse {
        report: report(&services.expired_log, &filter, query.today()),
        facets: facets(&services.expired_log),
    })
    .into_response()
}

pub async fn expired_report_csv(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ExpiredQuery>,
) -> axum::response::Response {
    let filter = match query.filter() {
        Ok(f) => f,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let report = report(&services.expired_log, &filter, query.today());
    match export_csv(&report.entries) {
        Ok(body) => (
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{CSV_FILENAME}\""),
                ),
            ],
            body,
        )
            .into_response(),
        Err(e) => errors::report_error_to_response(e),
    }
}

pub async fn harvest_schedule(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    Json(harvest_calendar(&services.harvest_schedule)).into_response()
}
