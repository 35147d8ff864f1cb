//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP handler, the error schema wrappers from
//! the inbound layer and the bearer token security scheme. The document is
//! served by Swagger UI in debug builds and exported via
//! `cargo run --bin openapi-dump`.

use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema, FieldIssueSchema};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerAuth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "Token issued by POST /api/auth/register or POST /api/auth/login.",
                    ))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Brewlog API",
        description = "Coffee consumption tracking: entries, custom drinks, companions and statistics.",
        license(name = "ISC", url = "https://opensource.org/license/isc-license-txt")
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerAuth" = [])),
    paths(
        crate::inbound::http::routes::index,
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::current_user,
        crate::inbound::http::entries::list_entries,
        crate::inbound::http::entries::create_entry,
        crate::inbound::http::entries::get_entry,
        crate::inbound::http::entries::update_entry,
        crate::inbound::http::entries::delete_entry,
        crate::inbound::http::custom_types::list_custom_types,
        crate::inbound::http::custom_types::create_custom_type,
        crate::inbound::http::custom_types::get_custom_type,
        crate::inbound::http::custom_types::update_custom_type,
        crate::inbound::http::custom_types::delete_custom_type,
        crate::inbound::http::companions::list_companions,
        crate::inbound::http::companions::create_companion,
        crate::inbound::http::companions::get_companion,
        crate::inbound::http::companions::update_companion,
        crate::inbound::http::companions::delete_companion,
        crate::inbound::http::stats::daily_stats,
        crate::inbound::http::stats::aggregated_stats,
        crate::inbound::http::stats::contribution_stats,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(ErrorSchema, ErrorCodeSchema, FieldIssueSchema)),
    tags(
        (name = "auth", description = "Registration, login and the current user"),
        (name = "entries", description = "Logged coffees"),
        (name = "custom-types", description = "User-defined drinks"),
        (name = "companions", description = "People coffees are shared with"),
        (name = "stats", description = "Daily, rolling and yearly statistics"),
        (name = "health", description = "Endpoints for health checks"),
        (name = "meta", description = "API index")
    )
)]
pub struct ApiDoc;
