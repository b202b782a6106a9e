//! Account lifecycle endpoints.
//!
//! ```text
//! POST /api/auth/register {"username":"ada","email":"ada@example.com","password":"secret1"}
//! POST /api/auth/login username=ada&password=secret1
//! POST /api/auth/request_email {"email":"ada@example.com"}
//! GET  /api/auth/confirmed_email/{token}
//! ```

use actix_web::{HttpRequest, HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{AccessToken, EmailAddress, Error, LoginCredentials, Registration};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::MessageResponse;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::UserResponse;
use crate::inbound::http::validation::{
    login_validation_error, registration_validation_error, user_validation_error,
};

/// Sign-up payload.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "ada")]
    pub username: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[schema(example = "correct horse")]
    pub password: String,
}

/// OAuth2 password-flow form fields.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Payload for re-sending the confirmation email.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RequestEmail {
    #[schema(example = "ada@example.com")]
    pub email: String,
}

/// Origin for email links: the configured public URL, else the scheme and
/// host the client used to reach us.
fn link_base_url(req: &HttpRequest, state: &HttpState) -> String {
    if let Some(base_url) = &state.public_base_url {
        return base_url.clone();
    }
    let info = req.connection_info();
    format!("{}://{}", info.scheme(), info.host())
}

/// Create an unconfirmed account and email a confirmation link.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email or username already registered", body = Error),
        (status = 503, description = "Database unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    req: HttpRequest,
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let RegisterRequest {
        username,
        email,
        password,
    } = payload.into_inner();
    let registration = Registration::try_from_parts(&username, &email, &password)
        .map_err(registration_validation_error)?;
    let user = state
        .auth
        .register(registration, &link_base_url(&req, &state))
        .await?;
    Ok(HttpResponse::Created().json(UserResponse::from(&user)))
}

/// Exchange username and password for a bearer token.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Login success", body = AccessToken),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials or unconfirmed email", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    form: web::Form<LoginForm>,
) -> ApiResult<web::Json<AccessToken>> {
    let credentials = LoginCredentials::try_from_parts(&form.username, &form.password)
        .map_err(login_validation_error)?;
    let token = state.auth.login(&credentials).await?;
    Ok(web::Json(token))
}

/// Re-send the confirmation email.
///
/// The response does not reveal whether the address is registered.
#[utoipa::path(
    post,
    path = "/api/auth/request_email",
    request_body = RequestEmail,
    responses(
        (status = 200, description = "Request accepted", body = MessageResponse),
        (status = 400, description = "Invalid request", body = Error)
    ),
    tags = ["auth"],
    operation_id = "requestEmail",
    security([])
)]
#[post("/auth/request_email")]
pub async fn request_email(
    req: HttpRequest,
    state: web::Data<HttpState>,
    payload: web::Json<RequestEmail>,
) -> ApiResult<web::Json<MessageResponse>> {
    let email = EmailAddress::new(payload.into_inner().email).map_err(user_validation_error)?;
    let outcome = state
        .auth
        .request_confirmation(&email, &link_base_url(&req, &state))
        .await?;
    Ok(web::Json(MessageResponse::new(outcome.message())))
}

/// Redeem an emailed confirmation token.
#[utoipa::path(
    get,
    path = "/api/auth/confirmed_email/{token}",
    params(("token" = String, Path, description = "Email verification token")),
    responses(
        (status = 200, description = "Email confirmed or already confirmed", body = MessageResponse),
        (status = 400, description = "Invalid or expired token", body = Error)
    ),
    tags = ["auth"],
    operation_id = "confirmedEmail",
    security([])
)]
#[get("/auth/confirmed_email/{token}")]
pub async fn confirmed_email(
    state: web::Data<HttpState>,
    token: web::Path<String>,
) -> ApiResult<web::Json<MessageResponse>> {
    let outcome = state.auth.confirm_email(&token.into_inner()).await?;
    Ok(web::Json(MessageResponse::new(outcome.message())))
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
