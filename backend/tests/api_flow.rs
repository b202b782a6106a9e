//! End-to-end HTTP flows against the in-memory application.
//!
//! The app is assembled exactly as the server does it, with in-memory
//! repositories, the logging mailer and no user cache.

use std::sync::Arc;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{StatusCode, header};
use actix_web::test::{self, TestRequest};
use actix_web::web;
use chrono::{TimeDelta, Utc};
use jsonwebtoken::Algorithm;
use mockable::DefaultClock;
use rstest::rstest;
use serde_json::{Value, json};
use zeroize::Zeroizing;

use contacts_api::domain::TokenScope;
use contacts_api::domain::ports::TokenCodec;
use contacts_api::inbound::http::health::HealthState;
use contacts_api::outbound::security::{JwtCodec, JwtSettings};
use contacts_api::server::{AppDependencies, ServerConfig, build_app};

const JWT_SECRET: &str = "integration-secret";
const PASSWORD: &str = "s3cret-pass";

fn codec() -> JwtCodec {
    JwtCodec::new(
        JwtSettings {
            secret: Zeroizing::new(JWT_SECRET.to_owned()),
            algorithm: Algorithm::HS256,
            access_ttl: TimeDelta::seconds(3600),
        },
        Arc::new(DefaultClock),
    )
    .expect("codec")
}

async fn init_app()
-> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error> {
    let config = ServerConfig::new("127.0.0.1:0".parse().expect("addr"), codec());
    let deps = AppDependencies::from_config(web::Data::new(HealthState::new()), &config);
    test::init_service(build_app(deps)).await
}

fn verification_token(email: &str) -> String {
    codec()
        .issue(email, TokenScope::EmailVerification, Utc::now())
        .expect("verification token")
}

async fn call<S, B>(app: &S, req: Request) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = test::call_service(app, req).await;
    let status = res.status();
    let body = test::read_body(res).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("json body")
    };
    (status, value)
}

async fn register<S, B>(app: &S, username: &str, email: &str) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({ "username": username, "email": email, "password": PASSWORD }))
        .to_request();
    call(app, req).await
}

async fn login<S, B>(app: &S, username: &str, password: &str) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = TestRequest::post()
        .uri("/api/auth/login")
        .set_form([("username", username), ("password", password)])
        .to_request();
    call(app, req).await
}

async fn confirm<S, B>(app: &S, token: &str) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = TestRequest::get()
        .uri(&format!("/api/auth/confirmed_email/{token}"))
        .to_request();
    call(app, req).await
}

/// Register, confirm and log in; returns the bearer token.
async fn onboard<S, B>(app: &S, username: &str, email: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, _) = register(app, username, email).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = confirm(app, &verification_token(email)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = login(app, username, PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
    body["access_token"]
        .as_str()
        .expect("access token")
        .to_owned()
}

fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

fn contact_payload(first_name: &str) -> Value {
    json!({
        "firstName": first_name,
        "lastName": "Lovelace",
        "email": "Charles.Babbage@Example.com",
        "phoneNumber": "+44 20 7946 0000",
        "birthday": "1990-12-10",
        "additionalData": "met at the analytical engine demo"
    })
}

#[rstest]
#[actix_web::test]
async fn registration_confirmation_and_login_flow() {
    let app = init_app().await;

    let (status, user) = register(&app, "ada", "Ada@Example.com").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["email"], "ada@example.com");
    assert_eq!(user["confirmed"], false);
    assert!(
        user["avatar"]
            .as_str()
            .is_some_and(|avatar| avatar.starts_with("https://www.gravatar.com/avatar/"))
    );

    let (status, body) = login(&app, "ada", PASSWORD).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");

    let token = verification_token("ada@example.com");
    let (status, body) = confirm(&app, &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Email confirmed");

    let (status, body) = confirm(&app, &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Your email is already confirmed");

    let (status, body) = login(&app, "ada", PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
    let access = body["access_token"].as_str().expect("access token");

    let req = TestRequest::get()
        .uri("/api/users/me")
        .insert_header(bearer(access))
        .to_request();
    let (status, me) = call(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "ada");
    assert_eq!(me["confirmed"], true);
}

#[rstest]
#[actix_web::test]
async fn wrong_password_does_not_reveal_confirmation_status() {
    let app = init_app().await;
    let (status, _) = register(&app, "ada", "ada@example.com").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, unconfirmed) = login(&app, "ada", "not-the-password").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, unknown) = login(&app, "nobody", "not-the-password").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(unconfirmed["message"], unknown["message"]);

    let (_, body) = login(&app, "ada", PASSWORD).await;
    assert_eq!(body["message"], "email not confirmed");
}

#[rstest]
#[actix_web::test]
async fn duplicate_email_is_a_conflict() {
    let app = init_app().await;
    let (status, _) = register(&app, "ada", "ada@example.com").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = register(&app, "another", "ADA@example.com").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "conflict");
}

#[rstest]
#[actix_web::test]
async fn token_scopes_are_not_interchangeable() {
    let app = init_app().await;
    let access = onboard(&app, "ada", "ada@example.com").await;

    let (status, _) = confirm(&app, &access).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let req = TestRequest::get()
        .uri("/api/users/me")
        .insert_header(bearer(&verification_token("ada@example.com")))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        res.headers()
            .get(header::WWW_AUTHENTICATE)
            .and_then(|value| value.to_str().ok()),
        Some("Bearer")
    );
}

#[rstest]
#[actix_web::test]
async fn contacts_crud_round_trip() {
    let app = init_app().await;
    let token = onboard(&app, "ada", "ada@example.com").await;

    let req = TestRequest::post()
        .uri("/api/contacts")
        .insert_header(bearer(&token))
        .set_json(contact_payload("Charles"))
        .to_request();
    let (status, created) = call(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["email"], "Charles.Babbage@Example.com");
    let id = created["id"].as_str().expect("contact id").to_owned();

    let req = TestRequest::get()
        .uri("/api/contacts/search?text=ANALYTICAL")
        .insert_header(bearer(&token))
        .to_request();
    let (status, found) = call(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found.as_array().map(Vec::len), Some(1));

    let mut replacement = contact_payload("Charlie");
    replacement["additionalData"] = Value::Null;
    let req = TestRequest::put()
        .uri(&format!("/api/contacts/{id}"))
        .insert_header(bearer(&token))
        .set_json(replacement)
        .to_request();
    let (status, updated) = call(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["firstName"], "Charlie");
    assert_eq!(updated["additionalData"], Value::Null);

    let req = TestRequest::delete()
        .uri(&format!("/api/contacts/{id}"))
        .insert_header(bearer(&token))
        .to_request();
    let (status, _) = call(&app, req).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let req = TestRequest::get()
        .uri(&format!("/api/contacts/{id}"))
        .insert_header(bearer(&token))
        .to_request();
    let (status, body) = call(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[rstest]
#[actix_web::test]
async fn contacts_are_invisible_to_other_users() {
    let app = init_app().await;
    let ada = onboard(&app, "ada", "ada@example.com").await;
    let grace = onboard(&app, "grace", "grace@example.com").await;

    let req = TestRequest::post()
        .uri("/api/contacts")
        .insert_header(bearer(&ada))
        .set_json(contact_payload("Charles"))
        .to_request();
    let (_, created) = call(&app, req).await;
    let id = created["id"].as_str().expect("contact id").to_owned();
    let uri = format!("/api/contacts/{id}");

    let req = TestRequest::get()
        .uri("/api/contacts")
        .insert_header(bearer(&grace))
        .to_request();
    let (status, listed) = call(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, json!([]));

    for req in [
        TestRequest::get().uri(&uri),
        TestRequest::put()
            .uri(&uri)
            .set_json(contact_payload("Mallory")),
        TestRequest::delete().uri(&uri),
    ] {
        let (status, _) = call(&app, req.insert_header(bearer(&grace)).to_request()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    let req = TestRequest::get()
        .uri(&uri)
        .insert_header(bearer(&ada))
        .to_request();
    let (status, unchanged) = call(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unchanged["firstName"], "Charles");
}

#[rstest]
#[actix_web::test]
async fn protected_routes_require_a_bearer_token() {
    let app = init_app().await;
    let req = TestRequest::get().uri("/api/contacts").to_request();
    let (status, body) = call(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
}

#[rstest]
#[actix_web::test]
async fn current_user_endpoint_is_rate_limited() {
    let app = init_app().await;
    let token = onboard(&app, "ada", "ada@example.com").await;

    for _ in 0..5 {
        let req = TestRequest::get()
            .uri("/api/users/me")
            .insert_header(bearer(&token))
            .to_request();
        let (status, _) = call(&app, req).await;
        assert_eq!(status, StatusCode::OK);
    }

    let req = TestRequest::get()
        .uri("/api/users/me")
        .insert_header(bearer(&token))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(res.headers().contains_key(header::RETRY_AFTER));
}

#[rstest]
#[actix_web::test]
async fn utility_routes_respond() {
    let app = init_app().await;

    let (status, body) = call(&app, TestRequest::get().uri("/").to_request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Welcome to the Contacts API");

    let req = TestRequest::get().uri("/api/healthchecker").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("trace-id"));
}
