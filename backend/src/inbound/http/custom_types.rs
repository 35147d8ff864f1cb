//! Custom coffee type handlers.
//!
//! ```text
//! GET    /api/custom-types
//! POST   /api/custom-types      {"name":"Cold foam","caffeine":80}
//! GET    /api/custom-types/{id}
//! PUT    /api/custom-types/{id} {"caffeine":null}
//! DELETE /api/custom-types/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{CustomCoffeeType, CustomTypeChanges, CustomTypeDraft, CustomTypeId, Error, Patch};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, missing_field, parse_path_id};

const NOT_FOUND: &str = "Custom type not found";

/// Request payload for creating a custom type.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomTypeRequest {
    #[schema(example = "Cold foam cold brew", max_length = 50)]
    pub name: Option<String>,
    /// Caffeine at MEDIUM size in milligrams.
    #[schema(minimum = 0, maximum = 1000)]
    pub caffeine: Option<i64>,
}

/// Partial update payload; `caffeine: null` clears the base value.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomTypeRequest {
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub name: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<i64>)]
    pub caffeine: Patch<i64>,
}

/// Custom type as returned to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomTypeResponse {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub user_id: String,
    pub name: String,
    pub caffeine: Option<u32>,
    #[schema(format = "date-time")]
    pub created_at: String,
    #[schema(format = "date-time")]
    pub updated_at: String,
}

impl From<CustomCoffeeType> for CustomTypeResponse {
    fn from(value: CustomCoffeeType) -> Self {
        Self {
            id: value.id.to_string(),
            user_id: value.user_id.to_string(),
            name: value.name,
            caffeine: value.caffeine_mg,
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

fn parse_draft(payload: CreateCustomTypeRequest) -> Result<CustomTypeDraft, Error> {
    let name = payload
        .name
        .ok_or_else(|| Error::validation(vec![missing_field(FieldName::new("name"))]))?;
    CustomTypeDraft::try_new(&name, payload.caffeine).map_err(Error::validation)
}

/// List the caller's custom types ordered by name.
#[utoipa::path(
    get,
    path = "/api/custom-types",
    responses(
        (status = 200, description = "Custom types", body = [CustomTypeResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["custom-types"],
    operation_id = "listCustomTypes",
    security(("BearerAuth" = []))
)]
#[get("/custom-types")]
pub async fn list_custom_types(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<CustomTypeResponse>>> {
    let types = state.custom_types_query.list(user.user_id()).await?;
    Ok(web::Json(
        types.into_iter().map(CustomTypeResponse::from).collect(),
    ))
}

/// Create a custom type.
#[utoipa::path(
    post,
    path = "/api/custom-types",
    request_body = CreateCustomTypeRequest,
    responses(
        (status = 201, description = "Custom type created", body = CustomTypeResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 409, description = "Name already used", body = ErrorSchema)
    ),
    tags = ["custom-types"],
    operation_id = "createCustomType",
    security(("BearerAuth" = []))
)]
#[post("/custom-types")]
pub async fn create_custom_type(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<CreateCustomTypeRequest>,
) -> ApiResult<HttpResponse> {
    let draft = parse_draft(payload.into_inner())?;
    let created = state.custom_types.create(user.user_id(), draft).await?;
    Ok(HttpResponse::Created().json(CustomTypeResponse::from(created)))
}

/// Fetch one custom type.
#[utoipa::path(
    get,
    path = "/api/custom-types/{id}",
    params(("id" = String, Path, description = "Custom type identifier")),
    responses(
        (status = 200, description = "Custom type", body = CustomTypeResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["custom-types"],
    operation_id = "getCustomType",
    security(("BearerAuth" = []))
)]
#[get("/custom-types/{id}")]
pub async fn get_custom_type(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<CustomTypeResponse>> {
    let id: CustomTypeId = parse_path_id(&path, NOT_FOUND)?;
    let custom_type = state.custom_types_query.get(user.user_id(), &id).await?;
    Ok(web::Json(CustomTypeResponse::from(custom_type)))
}

/// Rename a custom type or change its base caffeine.
#[utoipa::path(
    put,
    path = "/api/custom-types/{id}",
    params(("id" = String, Path, description = "Custom type identifier")),
    request_body = UpdateCustomTypeRequest,
    responses(
        (status = 200, description = "Custom type updated", body = CustomTypeResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Name already used", body = ErrorSchema)
    ),
    tags = ["custom-types"],
    operation_id = "updateCustomType",
    security(("BearerAuth" = []))
)]
#[put("/custom-types/{id}")]
pub async fn update_custom_type(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<UpdateCustomTypeRequest>,
) -> ApiResult<web::Json<CustomTypeResponse>> {
    let id: CustomTypeId = parse_path_id(&path, NOT_FOUND)?;
    let UpdateCustomTypeRequest { name, caffeine } = payload.into_inner();
    let changes = CustomTypeChanges::try_new(name, caffeine).map_err(Error::validation)?;
    let updated = state
        .custom_types
        .update(user.user_id(), &id, changes)
        .await?;
    Ok(web::Json(CustomTypeResponse::from(updated)))
}

/// Delete a custom type. Entries that used it keep their stored caffeine.
#[utoipa::path(
    delete,
    path = "/api/custom-types/{id}",
    params(("id" = String, Path, description = "Custom type identifier")),
    responses(
        (status = 204, description = "Custom type deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["custom-types"],
    operation_id = "deleteCustomType",
    security(("BearerAuth" = []))
)]
#[delete("/custom-types/{id}")]
pub async fn delete_custom_type(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id: CustomTypeId = parse_path_id(&path, NOT_FOUND)?;
    state.custom_types.delete(user.user_id(), &id).await?;
    Ok(HttpResponse::NoContent().finish())
}
