//! Bearer-token extractor so handlers receive an authenticated [`User`]
//! instead of raw headers.
//!
//! The token is resolved through the [`CurrentUserResolver`] port held in
//! [`HttpState`]; any failure surfaces as `401 Unauthorized`, which the error
//! adapter decorates with `WWW-Authenticate: Bearer`.
//!
//! [`CurrentUserResolver`]: crate::domain::ports::CurrentUserResolver

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Error, User};
use crate::inbound::http::state::HttpState;

const SCHEME: &str = "bearer";

/// The user identified by the request's bearer token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl AuthenticatedUser {
    pub fn user(&self) -> &User {
        &self.0
    }

    pub fn into_inner(self) -> User {
        self.0
    }
}

/// Pull the token out of `Authorization: Bearer <token>`.
pub(crate) fn bearer_token(req: &HttpRequest) -> Result<String, Error> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("not authenticated"))?;
    let value = header
        .to_str()
        .map_err(|_| Error::unauthorized("could not validate credentials"))?;
    let (scheme, token) = value
        .split_once(' ')
        .ok_or_else(|| Error::unauthorized("not authenticated"))?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case(SCHEME) || token.is_empty() {
        return Err(Error::unauthorized("not authenticated"));
    }
    Ok(token.to_owned())
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let token = bearer_token(req);
        Box::pin(async move {
            let state = state.ok_or_else(|| Error::internal("HTTP state is not configured"))?;
            let token = token?;
            state.current_user.resolve(&token).await.map(Self)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::inbound::http::test_utils::{TestPorts, VALID_TOKEN, sample_user};
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test as actix_test};
    use rstest::rstest;

    #[rstest]
    #[case(None)]
    #[case(Some("Basic YWRhOnNlY3JldA=="))]
    #[case(Some("Bearer"))]
    #[case(Some("Bearer    "))]
    fn malformed_headers_are_unauthorized(#[case] header: Option<&str>) {
        let mut req = actix_test::TestRequest::get();
        if let Some(value) = header {
            req = req.insert_header((AUTHORIZATION, value));
        }
        let error = bearer_token(&req.to_http_request()).expect_err("rejected");
        assert_eq!(error.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    #[case("Bearer abc.def.ghi")]
    #[case("bearer abc.def.ghi")]
    fn scheme_is_case_insensitive(#[case] header: &str) {
        let req = actix_test::TestRequest::get()
            .insert_header((AUTHORIZATION, header))
            .to_http_request();
        assert_eq!(bearer_token(&req).expect("token"), "abc.def.ghi");
    }

    #[actix_web::test]
    async fn extractor_resolves_user_through_port() {
        let user = sample_user();
        let expected = user.username().as_ref().to_owned();
        let mut ports = TestPorts::default();
        ports.authenticate_as(user);
        let app = actix_test::init_service(App::new().app_data(ports.into_state()).route(
            "/whoami",
            web::get().to(|auth: AuthenticatedUser| async move {
                HttpResponse::Ok().body(auth.user().username().as_ref().to_owned())
            }),
        ))
        .await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/whoami")
                .insert_header((AUTHORIZATION, format!("Bearer {VALID_TOKEN}")))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = actix_test::read_body(res).await;
        assert_eq!(body, expected.as_bytes());
    }

    #[actix_web::test]
    async fn missing_token_yields_challenge() {
        let app = actix_test::init_service(
            App::new()
                .app_data(TestPorts::default().into_state())
                .route(
                    "/whoami",
                    web::get().to(|_auth: AuthenticatedUser| async { HttpResponse::Ok().finish() }),
                ),
        )
        .await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/whoami").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            res.headers()
                .get(actix_web::http::header::WWW_AUTHENTICATE)
                .expect("challenge"),
            "Bearer"
        );
    }
}
