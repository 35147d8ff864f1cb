//! Coffee entry handlers.
//!
//! ```text
//! GET    /api/entries?limit=50&offset=0&startDate=2024-03-01&endDate=2024-03-31
//! POST   /api/entries      {"type":"LATTE","size":"LARGE"}
//! GET    /api/entries/{id}
//! PUT    /api/entries/{id} {"customTypeId":"…","notes":null}
//! DELETE /api/entries/{id}
//! ```
//!
//! Enum, UUID and timestamp fields arrive as strings and are parsed here so
//! that every bad field is reported in one `400` body.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    CoffeeEntry, CoffeeSize, CoffeeType, CompanionId, CustomTypeId, EntryChanges, EntryId,
    EntryPage, Error, FieldIssue, NewEntry, Patch,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::companions::CompanionResponse;
use crate::inbound::http::custom_types::CustomTypeResponse;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, Issues, missing_field, non_null, null_field, parse_coffee_size, parse_coffee_type,
    parse_date_range, parse_page, parse_path_id, parse_timestamp, parse_uuid, parse_uuid_list,
};

const NOT_FOUND: &str = "Entry not found";

const TYPE: FieldName = FieldName::new("type");
const CUSTOM_TYPE_ID: FieldName = FieldName::new("customTypeId");
const SIZE: FieldName = FieldName::new("size");
const CONSUMED_AT: FieldName = FieldName::new("consumedAt");
const COMPANION_IDS: FieldName = FieldName::new("companionIds");

/// Request payload for logging a coffee.
///
/// Exactly one of `type` and `customTypeId` must be supplied.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntryRequest {
    #[serde(rename = "type")]
    #[schema(value_type = Option<CoffeeType>)]
    pub coffee_type: Option<String>,
    #[schema(format = "uuid")]
    pub custom_type_id: Option<String>,
    #[schema(value_type = CoffeeSize)]
    pub size: Option<String>,
    /// Defaults to the time of the request.
    #[schema(format = "date-time")]
    pub consumed_at: Option<String>,
    #[schema(max_length = 500)]
    pub notes: Option<String>,
    pub companion_ids: Option<Vec<String>>,
}

/// Partial update payload.
///
/// Setting `type` clears `customTypeId` and vice versa; `null` clears a
/// nullable field. `companionIds` replaces the companion set.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEntryRequest {
    #[serde(rename = "type", default)]
    #[schema(value_type = Option<CoffeeType>)]
    pub coffee_type: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>, format = "uuid")]
    pub custom_type_id: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<CoffeeSize>)]
    pub size: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>, format = "date-time")]
    pub consumed_at: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub notes: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<Vec<String>>)]
    pub companion_ids: Patch<Vec<String>>,
}

/// Query parameters for listing entries.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListEntriesQuery {
    /// Page size, 1 to 100.
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    /// RFC 3339 timestamp or `YYYY-MM-DD`.
    pub start_date: Option<String>,
    /// RFC 3339 timestamp or `YYYY-MM-DD`; a bare date covers the whole day.
    pub end_date: Option<String>,
}

/// Entry as returned to clients, with resolved associations.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntryResponse {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub user_id: String,
    #[serde(rename = "type")]
    pub coffee_type: Option<CoffeeType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(format = "uuid")]
    pub custom_type_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_type: Option<CustomTypeResponse>,
    pub size: CoffeeSize,
    /// Caffeine in milligrams, derived on the server.
    pub caffeine: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[schema(format = "date-time")]
    pub consumed_at: String,
    #[schema(format = "date-time")]
    pub created_at: String,
    #[schema(format = "date-time")]
    pub updated_at: String,
    pub companions: Vec<CompanionResponse>,
}

impl From<CoffeeEntry> for EntryResponse {
    fn from(value: CoffeeEntry) -> Self {
        Self {
            id: value.id.to_string(),
            user_id: value.user_id.to_string(),
            coffee_type: value.coffee_type,
            custom_type_id: value.custom_type_id().map(|id| id.to_string()),
            custom_type: value.custom_type.map(CustomTypeResponse::from),
            size: value.size,
            caffeine: value.caffeine_mg,
            notes: value.notes,
            consumed_at: value.consumed_at.to_rfc3339(),
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
            companions: value
                .companions
                .into_iter()
                .map(CompanionResponse::from)
                .collect(),
        }
    }
}

/// One page of entries.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntryListResponse {
    pub entries: Vec<EntryResponse>,
    pub total: u64,
    pub limit: u32,
    pub offset: u64,
    pub has_more: bool,
}

impl From<EntryPage> for EntryListResponse {
    fn from(page: EntryPage) -> Self {
        let has_more = page.has_more();
        Self {
            entries: page.entries.into_iter().map(EntryResponse::from).collect(),
            total: page.total,
            limit: page.limit,
            offset: page.offset,
            has_more,
        }
    }
}

fn parse_new_entry(payload: CreateEntryRequest) -> Result<NewEntry, Error> {
    let mut issues = Issues::default();
    let coffee_type = payload
        .coffee_type
        .as_deref()
        .and_then(|raw| issues.check(parse_coffee_type(raw, TYPE)));
    let custom_type_id = payload
        .custom_type_id
        .as_deref()
        .and_then(|raw| issues.check(parse_uuid::<CustomTypeId>(raw, CUSTOM_TYPE_ID)));
    let size = issues.check(match payload.size.as_deref() {
        Some(raw) => parse_coffee_size(raw, SIZE),
        None => Err(missing_field(SIZE)),
    });
    let consumed_at = payload
        .consumed_at
        .as_deref()
        .and_then(|raw| issues.check(parse_timestamp(raw, CONSUMED_AT)));
    let companion_ids: Vec<CompanionId> = issues
        .check(parse_uuid_list(
            payload.companion_ids.as_deref().unwrap_or_default(),
            COMPANION_IDS,
        ))
        .unwrap_or_default();
    issues.finish()?;

    let size = size.ok_or_else(|| Error::validation(vec![missing_field(SIZE)]))?;
    NewEntry::try_new(
        coffee_type,
        custom_type_id,
        size,
        consumed_at,
        payload.notes,
        companion_ids,
    )
    .map_err(Error::validation)
}

fn parse_patch<T>(
    patch: Patch<String>,
    field: FieldName,
    parse: impl FnOnce(&str, FieldName) -> Result<T, FieldIssue>,
) -> Result<Patch<T>, FieldIssue> {
    match patch {
        Patch::Absent => Ok(Patch::Absent),
        Patch::Clear => Ok(Patch::Clear),
        Patch::Set(raw) => parse(&raw, field).map(Patch::Set),
    }
}

fn parse_companion_patch(patch: Patch<Vec<String>>) -> Result<Option<Vec<CompanionId>>, FieldIssue> {
    match patch {
        Patch::Absent => Ok(None),
        Patch::Clear => Err(null_field(COMPANION_IDS)),
        Patch::Set(raw) => parse_uuid_list(&raw, COMPANION_IDS).map(Some),
    }
}

fn parse_changes(payload: UpdateEntryRequest) -> Result<EntryChanges, Error> {
    let mut issues = Issues::default();
    let coffee_type = issues.check(parse_patch(payload.coffee_type, TYPE, parse_coffee_type));
    let custom_type_id = issues.check(parse_patch(
        payload.custom_type_id,
        CUSTOM_TYPE_ID,
        parse_uuid::<CustomTypeId>,
    ));
    let size = issues.check(non_null(payload.size, SIZE, parse_coffee_size));
    let consumed_at = issues.check(non_null(payload.consumed_at, CONSUMED_AT, parse_timestamp));
    let companion_ids = issues.check(parse_companion_patch(payload.companion_ids));
    issues.finish()?;

    EntryChanges::try_new(
        coffee_type.unwrap_or_default(),
        custom_type_id.unwrap_or_default(),
        size.flatten(),
        consumed_at.flatten(),
        payload.notes,
        companion_ids.flatten(),
    )
    .map_err(Error::validation)
}

/// List the caller's entries, newest first.
#[utoipa::path(
    get,
    path = "/api/entries",
    params(ListEntriesQuery),
    responses(
        (status = 200, description = "Page of entries", body = EntryListResponse),
        (status = 400, description = "Invalid query", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["entries"],
    operation_id = "listEntries",
    security(("BearerAuth" = []))
)]
#[get("/entries")]
pub async fn list_entries(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    query: web::Query<ListEntriesQuery>,
) -> ApiResult<web::Json<EntryListResponse>> {
    let query = query.into_inner();
    let mut issues = Issues::default();
    let range = parse_date_range(
        query.start_date.as_deref(),
        query.end_date.as_deref(),
        &mut issues,
    );
    let page = parse_page(query.limit, query.offset, &mut issues);
    issues.finish()?;

    let page = state.entries_query.list(user.user_id(), range, page).await?;
    Ok(web::Json(EntryListResponse::from(page)))
}

/// Log a coffee.
#[utoipa::path(
    post,
    path = "/api/entries",
    request_body = CreateEntryRequest,
    responses(
        (status = 201, description = "Entry created", body = EntryResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Custom type or companion not found", body = ErrorSchema)
    ),
    tags = ["entries"],
    operation_id = "createEntry",
    security(("BearerAuth" = []))
)]
#[post("/entries")]
pub async fn create_entry(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<CreateEntryRequest>,
) -> ApiResult<HttpResponse> {
    let new_entry = parse_new_entry(payload.into_inner())?;
    let created = state.entries.create(user.user_id(), new_entry).await?;
    Ok(HttpResponse::Created().json(EntryResponse::from(created)))
}

/// Fetch one entry.
#[utoipa::path(
    get,
    path = "/api/entries/{id}",
    params(("id" = String, Path, description = "Entry identifier")),
    responses(
        (status = 200, description = "Entry", body = EntryResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["entries"],
    operation_id = "getEntry",
    security(("BearerAuth" = []))
)]
#[get("/entries/{id}")]
pub async fn get_entry(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<EntryResponse>> {
    let id: EntryId = parse_path_id(&path, NOT_FOUND)?;
    let entry = state.entries_query.get(user.user_id(), &id).await?;
    Ok(web::Json(EntryResponse::from(entry)))
}

/// Change an entry; caffeine is derived again when the drink or size moves.
#[utoipa::path(
    put,
    path = "/api/entries/{id}",
    params(("id" = String, Path, description = "Entry identifier")),
    request_body = UpdateEntryRequest,
    responses(
        (status = 200, description = "Entry updated", body = EntryResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["entries"],
    operation_id = "updateEntry",
    security(("BearerAuth" = []))
)]
#[put("/entries/{id}")]
pub async fn update_entry(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<UpdateEntryRequest>,
) -> ApiResult<web::Json<EntryResponse>> {
    let id: EntryId = parse_path_id(&path, NOT_FOUND)?;
    let changes = parse_changes(payload.into_inner())?;
    let updated = state.entries.update(user.user_id(), &id, changes).await?;
    Ok(web::Json(EntryResponse::from(updated)))
}

/// Delete an entry.
#[utoipa::path(
    delete,
    path = "/api/entries/{id}",
    params(("id" = String, Path, description = "Entry identifier")),
    responses(
        (status = 204, description = "Entry deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["entries"],
    operation_id = "deleteEntry",
    security(("BearerAuth" = []))
)]
#[delete("/entries/{id}")]
pub async fn delete_entry(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id: EntryId = parse_path_id(&path, NOT_FOUND)?;
    state.entries.delete(user.user_id(), &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "entries_tests.rs"]
mod tests;
