//! Account API handlers.
//!
//! ```text
//! POST /api/auth/register {"email":"ada@example.com","username":"ada","password":"..."}
//! POST /api/auth/login    {"email":"ada@example.com","password":"..."}
//! GET  /api/auth/me
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{AuthSession, Error, LoginCredentials, Registration, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Registration request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[schema(example = "ada_l")]
    pub username: String,
    #[schema(example = "correct horse battery")]
    pub password: String,
}

/// Login request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public view of an account.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[schema(format = "uuid")]
    pub id: String,
    pub email: String,
    pub username: String,
    #[schema(format = "date-time")]
    pub created_at: String,
    #[schema(format = "date-time")]
    pub updated_at: String,
}

/// Signed-in user plus the bearer token to present on later requests.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
}

/// Body of `GET /api/auth/me`.
#[derive(Debug, Serialize, ToSchema)]
pub struct CurrentUserResponse {
    pub user: UserResponse,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.to_string(),
            username: user.username.to_string(),
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.to_rfc3339(),
        }
    }
}

impl From<AuthSession> for AuthResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            user: UserResponse::from(session.user),
            token: session.token.into(),
        }
    }
}

/// Create an account and return a signed token.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Email or username already in use", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let RegisterRequest {
        email,
        username,
        password,
    } = payload.into_inner();
    let registration =
        Registration::try_from_parts(&email, &username, &password).map_err(Error::validation)?;
    let session = state.auth.register(registration).await?;
    Ok(HttpResponse::Created().json(AuthResponse::from(session)))
}

/// Exchange credentials for a signed token.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = AuthResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<AuthResponse>> {
    let credentials = LoginCredentials::try_from_parts(&payload.email, &payload.password)
        .map_err(|err| Error::validation(vec![err.to_issue()]))?;
    let session = state.auth.login(credentials).await?;
    Ok(web::Json(AuthResponse::from(session)))
}

/// Return the authenticated user's profile.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = CurrentUserResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Account no longer exists", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "currentUser",
    security(("BearerAuth" = []))
)]
#[get("/auth/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<CurrentUserResponse>> {
    let profile = state.auth.current_user(user.user_id()).await?;
    Ok(web::Json(CurrentUserResponse {
        user: UserResponse::from(profile),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::{Value, json};

    use crate::domain::{AuthToken, UserId};
    use crate::inbound::http::test_utils::{MockPorts, bearer, init_app, sample_user};

    #[actix_web::test]
    async fn register_returns_created_session() {
        let mut ports = MockPorts::default();
        ports
            .auth
            .expect_register()
            .withf(|registration| registration.username().as_ref() == "ada_l")
            .return_once(|registration| {
                let mut user = sample_user(UserId::random());
                user.username = registration.username().clone();
                Ok(AuthSession {
                    user,
                    token: AuthToken::new("signed"),
                })
            });
        let app = init_app(ports).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/auth/register")
                .set_json(json!({
                    "email": "ada@example.com",
                    "username": "ada_l",
                    "password": "correct horse",
                }))
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["token"], "signed");
        assert_eq!(body["user"]["username"], "ada_l");
        assert!(body["user"].get("passwordHash").is_none());
    }

    #[actix_web::test]
    async fn register_reports_every_invalid_field() {
        let mut ports = MockPorts::default();
        ports.auth.expect_register().never();
        let app = init_app(ports).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/auth/register")
                .set_json(json!({"email": "nope", "username": "a!", "password": "short"}))
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        let fields: Vec<&str> = body["details"]
            .as_array()
            .expect("details array")
            .iter()
            .filter_map(|issue| issue["field"].as_str())
            .collect();
        assert_eq!(fields, ["email", "username", "password"]);
    }

    #[rstest]
    #[case(json!({"email": "", "password": "secret"}), "email")]
    #[case(json!({"email": "ada@example.com", "password": ""}), "password")]
    #[actix_web::test]
    async fn login_requires_both_fields(#[case] payload: Value, #[case] field: &str) {
        let mut ports = MockPorts::default();
        ports.auth.expect_login().never();
        let app = init_app(ports).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/auth/login")
                .set_json(payload)
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["details"][0]["field"], field);
    }

    #[actix_web::test]
    async fn login_failure_is_unauthorised() {
        let mut ports = MockPorts::default();
        ports
            .auth
            .expect_login()
            .return_once(|_| Err(Error::unauthorized("Invalid credentials")));
        let app = init_app(ports).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/auth/login")
                .set_json(&LoginRequest {
                    email: "ada@example.com".into(),
                    password: "wrong password".into(),
                })
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["error"], "Invalid credentials");
    }

    #[actix_web::test]
    async fn me_returns_profile_of_token_owner() {
        let user_id = UserId::random();
        let mut ports = MockPorts::authenticating(user_id);
        ports
            .auth
            .expect_current_user()
            .withf(move |id| *id == user_id)
            .return_once(move |id| Ok(sample_user(*id)));
        let app = init_app(ports).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/auth/me")
                .insert_header(bearer())
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["user"]["id"], user_id.to_string());
    }

    #[actix_web::test]
    async fn malformed_json_is_a_bad_request() {
        let app = init_app(MockPorts::default()).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/auth/login")
                .insert_header(("content-type", "application/json"))
                .set_payload("{\"email\":")
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["error"], "Malformed JSON body");
    }
}
