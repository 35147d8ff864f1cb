//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_http::Request;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::header::AUTHORIZATION;
use actix_web::{App, test, web};

use crate::Trace;
use crate::domain::ports::{
    MockAuthService, MockCompanionsCommand, MockCompanionsQuery, MockCustomTypesCommand,
    MockCustomTypesQuery, MockEntriesCommand, MockEntriesQuery, MockStatsQuery,
};
use crate::domain::{Email, Error, User, UserId, Username};
use crate::inbound::http::routes;
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::test_support::fixture_now;

/// Token accepted by [`MockPorts::authenticating`].
pub(crate) const TEST_TOKEN: &str = "test-token";

/// One mock per driving port; set expectations, then build the app.
#[derive(Default)]
pub(crate) struct MockPorts {
    pub auth: MockAuthService,
    pub entries: MockEntriesCommand,
    pub entries_query: MockEntriesQuery,
    pub custom_types: MockCustomTypesCommand,
    pub custom_types_query: MockCustomTypesQuery,
    pub companions: MockCompanionsCommand,
    pub companions_query: MockCompanionsQuery,
    pub stats: MockStatsQuery,
}

impl MockPorts {
    /// Ports whose auth mock resolves [`TEST_TOKEN`] to `user_id`.
    pub(crate) fn authenticating(user_id: UserId) -> Self {
        let mut ports = Self::default();
        ports.auth.expect_authenticate().returning(move |token| {
            if token == TEST_TOKEN {
                Ok(user_id)
            } else {
                Err(Error::unauthorized("Invalid or expired token"))
            }
        });
        ports
    }

    pub(crate) fn into_state(self) -> web::Data<HttpState> {
        web::Data::new(HttpState::new(HttpStatePorts {
            auth: Arc::new(self.auth),
            entries: Arc::new(self.entries),
            entries_query: Arc::new(self.entries_query),
            custom_types: Arc::new(self.custom_types),
            custom_types_query: Arc::new(self.custom_types_query),
            companions: Arc::new(self.companions),
            companions_query: Arc::new(self.companions_query),
            stats: Arc::new(self.stats),
        }))
    }
}

/// `Authorization` header carrying [`TEST_TOKEN`].
pub(crate) fn bearer() -> (actix_web::http::header::HeaderName, String) {
    (AUTHORIZATION, format!("Bearer {TEST_TOKEN}"))
}

/// Initialise the `/api` routes over mocked ports.
pub(crate) async fn init_app(
    ports: MockPorts,
) -> impl Service<Request, Response = ServiceResponse, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(ports.into_state())
            .wrap(Trace)
            .service(web::scope("/api").configure(routes::configure)),
    )
    .await
}

pub(crate) fn sample_user(id: UserId) -> User {
    let (Ok(email), Ok(username)) = (Email::new("ada@example.com"), Username::new("ada")) else {
        panic!("fixture user fields are valid");
    };
    User {
        id,
        email,
        username,
        created_at: fixture_now(),
        updated_at: fixture_now(),
    }
}
