//! Companion handlers.
//!
//! ```text
//! GET    /api/companions
//! POST   /api/companions      {"name":"Carmen"}
//! GET    /api/companions/{id}
//! PUT    /api/companions/{id} {"name":"Carmen R"}
//! DELETE /api/companions/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Companion, CompanionId, CompanionName, Error, Patch};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, missing_field, parse_path_id};

const NOT_FOUND: &str = "Companion not found";

/// Request payload for creating a companion.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCompanionRequest {
    #[schema(example = "Carmen", max_length = 100)]
    pub name: Option<String>,
}

/// Partial update payload for a companion.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateCompanionRequest {
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub name: Patch<String>,
}

/// Companion as returned to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanionResponse {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub user_id: String,
    pub name: String,
    #[schema(format = "date-time")]
    pub created_at: String,
    #[schema(format = "date-time")]
    pub updated_at: String,
}

impl From<Companion> for CompanionResponse {
    fn from(value: Companion) -> Self {
        Self {
            id: value.id.to_string(),
            user_id: value.user_id.to_string(),
            name: value.name,
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

/// List the caller's companions ordered by name.
#[utoipa::path(
    get,
    path = "/api/companions",
    responses(
        (status = 200, description = "Companions", body = [CompanionResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["companions"],
    operation_id = "listCompanions",
    security(("BearerAuth" = []))
)]
#[get("/companions")]
pub async fn list_companions(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<CompanionResponse>>> {
    let companions = state.companions_query.list(user.user_id()).await?;
    Ok(web::Json(
        companions.into_iter().map(CompanionResponse::from).collect(),
    ))
}

/// Create a companion.
#[utoipa::path(
    post,
    path = "/api/companions",
    request_body = CreateCompanionRequest,
    responses(
        (status = 201, description = "Companion created", body = CompanionResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 409, description = "Name already used", body = ErrorSchema)
    ),
    tags = ["companions"],
    operation_id = "createCompanion",
    security(("BearerAuth" = []))
)]
#[post("/companions")]
pub async fn create_companion(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<CreateCompanionRequest>,
) -> ApiResult<HttpResponse> {
    let name = match payload.into_inner().name {
        Some(raw) => CompanionName::new(&raw),
        None => Err(missing_field(FieldName::new("name"))),
    }
    .map_err(|issue| Error::validation(vec![issue]))?;
    let created = state.companions.create(user.user_id(), name).await?;
    Ok(HttpResponse::Created().json(CompanionResponse::from(created)))
}

/// Fetch one companion.
#[utoipa::path(
    get,
    path = "/api/companions/{id}",
    params(("id" = String, Path, description = "Companion identifier")),
    responses(
        (status = 200, description = "Companion", body = CompanionResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["companions"],
    operation_id = "getCompanion",
    security(("BearerAuth" = []))
)]
#[get("/companions/{id}")]
pub async fn get_companion(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<CompanionResponse>> {
    let id: CompanionId = parse_path_id(&path, NOT_FOUND)?;
    let companion = state.companions_query.get(user.user_id(), &id).await?;
    Ok(web::Json(CompanionResponse::from(companion)))
}

/// Rename a companion.
#[utoipa::path(
    put,
    path = "/api/companions/{id}",
    params(("id" = String, Path, description = "Companion identifier")),
    request_body = UpdateCompanionRequest,
    responses(
        (status = 200, description = "Companion updated", body = CompanionResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Name already used", body = ErrorSchema)
    ),
    tags = ["companions"],
    operation_id = "updateCompanion",
    security(("BearerAuth" = []))
)]
#[put("/companions/{id}")]
pub async fn update_companion(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<UpdateCompanionRequest>,
) -> ApiResult<web::Json<CompanionResponse>> {
    let id: CompanionId = parse_path_id(&path, NOT_FOUND)?;
    let name = CompanionName::from_patch(payload.into_inner().name)
        .map_err(|issue| Error::validation(vec![issue]))?;
    let updated = state.companions.update(user.user_id(), &id, name).await?;
    Ok(web::Json(CompanionResponse::from(updated)))
}

/// Delete a companion and detach it from every entry.
#[utoipa::path(
    delete,
    path = "/api/companions/{id}",
    params(("id" = String, Path, description = "Companion identifier")),
    responses(
        (status = 204, description = "Companion deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["companions"],
    operation_id = "deleteCompanion",
    security(("BearerAuth" = []))
)]
#[delete("/companions/{id}")]
pub async fn delete_companion(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id: CompanionId = parse_path_id(&path, NOT_FOUND)?;
    state.companions.delete(user.user_id(), &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use serde_json::{Value, json};

    use crate::domain::UserId;
    use crate::inbound::http::test_utils::{MockPorts, bearer, init_app};
    use crate::test_support::companion;

    #[actix_web::test]
    async fn list_returns_repository_order() {
        let user_id = UserId::random();
        let mut ports = MockPorts::authenticating(user_id);
        ports.companions_query.expect_list().return_once(move |_| {
            Ok(vec![companion(user_id, "Ana"), companion(user_id, "Bruno")])
        });
        let app = init_app(ports).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/companions")
                .insert_header(bearer())
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        let names: Vec<&str> = body
            .as_array()
            .expect("array")
            .iter()
            .filter_map(|c| c["name"].as_str())
            .collect();
        assert_eq!(names, ["Ana", "Bruno"]);
    }

    #[actix_web::test]
    async fn blank_names_are_rejected() {
        let mut ports = MockPorts::authenticating(UserId::random());
        ports.companions.expect_create().never();
        let app = init_app(ports).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/companions")
                .insert_header(bearer())
                .set_json(json!({"name": "   "}))
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["details"][0]["field"], "name");
    }

    #[actix_web::test]
    async fn null_name_on_update_is_rejected() {
        let mut ports = MockPorts::authenticating(UserId::random());
        ports.companions.expect_update().never();
        let app = init_app(ports).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::put()
                .uri(&format!("/api/companions/{}", CompanionId::random()))
                .insert_header(bearer())
                .set_json(json!({"name": null}))
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn foreign_companion_is_not_found() {
        let mut ports = MockPorts::authenticating(UserId::random());
        ports
            .companions
            .expect_delete()
            .return_once(|_, _| Err(Error::not_found(NOT_FOUND)));
        let app = init_app(ports).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/api/companions/{}", CompanionId::random()))
                .insert_header(bearer())
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
