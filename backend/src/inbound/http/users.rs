//! Current-user endpoints.
//!
//! ```text
//! GET   /api/users/me
//! PATCH /api/users/avatar {"avatarUrl":"https://cdn.example.com/ada.png"}
//! ```

use actix_web::{patch, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{AvatarUrl, Error, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::bearer::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::user_validation_error;

/// Public view of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    #[schema(example = "ada")]
    pub username: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    pub avatar: Option<String>,
    pub confirmed: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: *user.id().as_uuid(),
            username: user.username().as_ref().to_owned(),
            email: user.email().as_ref().to_owned(),
            avatar: user.avatar().map(|avatar| avatar.as_ref().to_owned()),
            confirmed: user.is_confirmed(),
            created_at: user.created_at(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvatarRequest {
    #[schema(example = "https://cdn.example.com/ada.png")]
    pub avatar_url: String,
}

/// Return the authenticated user.
///
/// Mounted behind the per-client rate limiter, so it is registered as a
/// resource by the server rather than through a route macro.
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Authenticated user", body = UserResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 429, description = "Rate limit exceeded", body = Error)
    ),
    tags = ["users"],
    operation_id = "currentUser",
    security(("bearer_auth" = []))
)]
pub async fn current_user(auth: AuthenticatedUser) -> ApiResult<web::Json<UserResponse>> {
    Ok(web::Json(UserResponse::from(auth.user())))
}

/// Replace the authenticated user's avatar link.
#[utoipa::path(
    patch,
    path = "/api/users/avatar",
    request_body = AvatarRequest,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, description = "Invalid avatar URL", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "User no longer exists", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateAvatar",
    security(("bearer_auth" = []))
)]
#[patch("/users/avatar")]
pub async fn update_avatar(
    state: web::Data<HttpState>,
    auth: AuthenticatedUser,
    payload: web::Json<AvatarRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let avatar = AvatarUrl::new(payload.into_inner().avatar_url).map_err(user_validation_error)?;
    let user = state
        .profile
        .update_avatar(auth.user().id(), avatar)
        .await?;
    Ok(web::Json(UserResponse::from(&user)))
}
