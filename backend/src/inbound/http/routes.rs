//! Route table for the `/api` scope.
//!
//! ```text
//! GET  /api                   Endpoint index
//! POST /api/auth/register     POST /api/auth/login     GET /api/auth/me
//! /api/entries[/{id}]         /api/custom-types[/{id}] /api/companions[/{id}]
//! GET  /api/stats/{daily,aggregated,contribution}
//! ```

use actix_web::{HttpResponse, get, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::companions::{
    create_companion, delete_companion, get_companion, list_companions, update_companion,
};
use crate::inbound::http::custom_types::{
    create_custom_type, delete_custom_type, get_custom_type, list_custom_types,
    update_custom_type,
};
use crate::inbound::http::entries::{
    create_entry, delete_entry, get_entry, list_entries, update_entry,
};
use crate::inbound::http::stats::{aggregated_stats, contribution_stats, daily_stats};
use crate::inbound::http::users::{current_user, login, register};
use crate::inbound::http::validation::{json_config, query_config};

/// Register every `/api` handler and the extractor error mappings.
///
/// ```
/// use actix_web::{App, web};
/// use brewlog::inbound::http::routes::configure;
///
/// let app = App::new().service(web::scope("/api").configure(configure));
/// # let _ = app;
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .service(index)
        .service(register)
        .service(login)
        .service(current_user)
        .service(list_entries)
        .service(create_entry)
        .service(get_entry)
        .service(update_entry)
        .service(delete_entry)
        .service(list_custom_types)
        .service(create_custom_type)
        .service(get_custom_type)
        .service(update_custom_type)
        .service(delete_custom_type)
        .service(list_companions)
        .service(create_companion)
        .service(get_companion)
        .service(update_companion)
        .service(delete_companion)
        .service(daily_stats)
        .service(aggregated_stats)
        .service(contribution_stats);
}

/// Summary of the API surface.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiIndex {
    pub message: String,
    pub version: String,
    pub endpoints: Vec<String>,
}

const ENDPOINTS: &[&str] = &[
    "POST /api/auth/register",
    "POST /api/auth/login",
    "GET /api/auth/me",
    "GET /api/entries",
    "POST /api/entries",
    "GET /api/entries/{id}",
    "PUT /api/entries/{id}",
    "DELETE /api/entries/{id}",
    "GET /api/custom-types",
    "POST /api/custom-types",
    "GET /api/custom-types/{id}",
    "PUT /api/custom-types/{id}",
    "DELETE /api/custom-types/{id}",
    "GET /api/companions",
    "POST /api/companions",
    "GET /api/companions/{id}",
    "PUT /api/companions/{id}",
    "DELETE /api/companions/{id}",
    "GET /api/stats/daily",
    "GET /api/stats/aggregated",
    "GET /api/stats/contribution",
    "GET /health/live",
    "GET /health/ready",
];

/// List the available endpoints.
#[utoipa::path(
    get,
    path = "/api",
    responses((status = 200, description = "Endpoint index", body = ApiIndex)),
    tags = ["meta"],
    operation_id = "apiIndex",
    security([])
)]
#[get("")]
pub async fn index() -> web::Json<ApiIndex> {
    web::Json(ApiIndex {
        message: "Welcome to the Brewlog API".to_owned(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
        endpoints: ENDPOINTS.iter().map(|e| (*e).to_owned()).collect(),
    })
}

/// Fallback for unmatched paths.
pub async fn not_found() -> ApiResult<HttpResponse> {
    Err(Error::not_found("Not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use serde_json::Value;

    use crate::inbound::http::test_utils::{MockPorts, init_app};

    #[actix_web::test]
    async fn index_lists_endpoints() {
        let app = init_app(MockPorts::default()).await;

        let response =
            actix_test::call_service(&app, actix_test::TestRequest::get().uri("/api").to_request())
                .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        let endpoints = body["endpoints"].as_array().expect("endpoints");
        assert!(endpoints.iter().any(|e| e == "GET /api/stats/contribution"));
    }

    #[actix_web::test]
    async fn fallback_reports_not_found() {
        let app = actix_test::init_service(
            actix_web::App::new().default_service(web::to(not_found)),
        )
        .await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/nowhere").to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["error"], "Not found");
    }
}
