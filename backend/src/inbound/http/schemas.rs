//! OpenAPI schema definitions for domain types.
//!
//! Domain errors stay framework-agnostic by not deriving `ToSchema`. The
//! wrappers here mirror their serialised shape and live in the inbound
//! adapter where framework concerns belong.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// The resource does not exist or belongs to another user.
    #[schema(rename = "not_found")]
    NotFound,
    /// A uniqueness rule was violated.
    #[schema(rename = "conflict")]
    Conflict,
    /// A backing service is unreachable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::FieldIssue`].
#[derive(ToSchema)]
#[schema(as = crate::domain::FieldIssue)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct FieldIssueSchema {
    /// Offending request field in wire form.
    #[schema(example = "size")]
    field: String,
    /// Machine-readable issue code.
    #[schema(example = "invalid_value")]
    code: String,
    #[schema(example = "size must be one of SMALL, MEDIUM, LARGE, EXTRA_LARGE")]
    message: String,
}

/// OpenAPI schema for [`crate::domain::Error`].
///
/// Error body returned by every failing endpoint.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Human-readable message.
    #[schema(example = "Entry not found")]
    error: String,
    /// Stable machine-readable error code.
    code: ErrorCodeSchema,
    /// Field issues for validation failures.
    details: Option<Vec<FieldIssueSchema>>,
    /// Correlation identifier echoed in the `trace-id` header.
    #[schema(rename = "traceId", example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
}
