/// End-to-end session lifecycle over HTTP with the in-memory store
///
/// register -> login -> current-user -> refresh -> reuse rejected -> logout
mod common;

use actix_web::{http::StatusCode, test, web, App};
use auth_service::db::UserStore;
use auth_service::routes;
use serde_json::{json, Value};

use common::{app_state, register_body, response_cookie, PASSWORD};

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .configure(routes::configure(&$state)),
        )
        .await
    };
}

#[actix_web::test]
async fn test_register_returns_public_user_without_tokens() {
    let (state, _store) = app_state();
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/users/register")
        .set_json(register_body("Alice", "alice@example.com"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    assert!(response_cookie(&resp, "accessToken").is_none());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["statusCode"], 201);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["username"], "alice");
    assert!(body["data"].get("password").is_none());
    assert!(body["data"].get("passwordHash").is_none());
    assert!(body["data"].get("refreshToken").is_none());
}

#[actix_web::test]
async fn test_register_conflict() {
    let (state, _store) = app_state();
    let app = app!(state);

    for expected in [StatusCode::CREATED, StatusCode::CONFLICT] {
        let req = test::TestRequest::post()
            .uri("/api/v1/users/register")
            .set_json(register_body("alice", "alice@example.com"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected);
    }
}

#[actix_web::test]
async fn test_register_blank_fields_rejected() {
    let (state, store) = app_state();
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/users/register")
        .set_json(json!({ "email": "alice@example.com", "password": PASSWORD }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "All fields are required");
    assert!(store.is_empty().await);
}

#[actix_web::test]
async fn test_register_requires_avatar() {
    let (state, store) = app_state();
    let app = app!(state);

    let mut body = register_body("nadia", "nadia@example.com");
    body.as_object_mut().unwrap().remove("avatar");
    let req = test::TestRequest::post()
        .uri("/api/v1/users/register")
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Avatar is required");
    assert!(store.is_empty().await);
}

#[actix_web::test]
async fn test_padded_email_registers_and_logs_in() {
    let (state, _store) = app_state();
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/users/register")
        .set_json(register_body("zed", "  Zed@Example.com "))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["email"], "zed@example.com");

    let req = test::TestRequest::post()
        .uri("/api/v1/users/login")
        .set_json(json!({ "email": "  Zed@Example.com ", "password": PASSWORD }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_unknown_user_route_is_not_found() {
    let (state, _store) = app_state();
    let app = app!(state);

    let req = test::TestRequest::get()
        .uri("/api/v1/users/does-not-exist")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_gated_routes_require_token() {
    let (state, _store) = app_state();
    let app = app!(state);

    for req in [
        test::TestRequest::post().uri("/api/v1/users/logout").to_request(),
        test::TestRequest::get().uri("/api/v1/users/current-user").to_request(),
        test::TestRequest::post()
            .uri("/api/v1/users/change-password")
            .to_request(),
    ] {
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}

#[actix_web::test]
async fn test_malformed_json_uses_error_envelope() {
    let (state, _store) = app_state();
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/users/login")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["statusCode"], 400);
    assert_eq!(body["success"], false);
}

#[actix_web::test]
async fn test_full_session_lifecycle() {
    // GIVEN: A registered user
    let (state, store) = app_state();
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/users/register")
        .set_json(register_body("alice", "alice@example.com"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    // WHEN: Logging in by email
    let req = test::TestRequest::post()
        .uri("/api/v1/users/login")
        .set_json(json!({ "email": "alice@example.com", "password": PASSWORD }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // THEN: Session cookies are HttpOnly, Secure and site-wide
    for name in ["accessToken", "refreshToken"] {
        let cookie = response_cookie(&resp, name).expect("session cookie set");
        assert_eq!(cookie.http_only(), Some(true), "{name} HttpOnly");
        assert_eq!(cookie.secure(), Some(true), "{name} Secure");
        assert_eq!(cookie.path(), Some("/"), "{name} path");
    }

    let body: Value = test::read_body_json(resp).await;
    let access = body["data"]["accessToken"].as_str().unwrap().to_string();
    let refresh = body["data"]["refreshToken"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["user"]["email"], "alice@example.com");
    assert!(body["data"]["user"].get("refreshToken").is_none());

    let claims = state.tokens.decode_access(&access).unwrap();
    assert_eq!(body["data"]["user"]["id"], json!(claims.sub));

    // AND: The access token opens gated routes
    let req = test::TestRequest::get()
        .uri("/api/v1/users/current-user")
        .insert_header(("Authorization", format!("Bearer {}", access)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["username"], "alice");

    // WHEN: Rotating via the body field
    let req = test::TestRequest::post()
        .uri("/api/v1/users/refresh-token")
        .set_json(json!({ "refreshToken": refresh }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let rotated_cookie = response_cookie(&resp, "refreshToken").expect("rotated cookie");
    let body: Value = test::read_body_json(resp).await;
    let rotated = body["data"]["refreshToken"].as_str().unwrap().to_string();
    assert_ne!(rotated, refresh);
    assert_eq!(rotated_cookie.value(), rotated);

    // THEN: Replaying the original refresh token is rejected
    let req = test::TestRequest::post()
        .uri("/api/v1/users/refresh-token")
        .set_json(json!({ "refreshToken": refresh }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Refresh token is expired or used");

    // WHEN: Logging out twice
    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/api/v1/users/logout")
            .insert_header(("Authorization", format!("Bearer {}", access)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        // THEN: Both responses clear the cookies
        for name in ["accessToken", "refreshToken"] {
            let cookie = response_cookie(&resp, name).expect("removal cookie");
            assert_eq!(cookie.value(), "");
            assert_eq!(cookie.path(), Some("/"));
            assert_eq!(cookie.http_only(), Some(true));
        }
    }

    // AND: The stored refresh token is gone, so the rotated one no longer works
    let user_id = claims.sub;
    assert!(store.find_by_id(user_id).await.unwrap().unwrap().refresh_token.is_none());

    let req = test::TestRequest::post()
        .uri("/api/v1/users/refresh-token")
        .set_json(json!({ "refreshToken": rotated }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_refresh_cookie_wins_over_body() {
    let (state, _store) = app_state();
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/users/register")
        .set_json(register_body("bob", "bob@example.com"))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/users/login")
        .set_json(json!({ "username": "bob", "password": PASSWORD }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let refresh_cookie = response_cookie(&resp, "refreshToken").unwrap();

    // GIVEN: A valid cookie and a junk body token
    let req = test::TestRequest::post()
        .uri("/api/v1/users/refresh-token")
        .cookie(refresh_cookie)
        .set_json(json!({ "refreshToken": "junk" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    // THEN: The cookie is used
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_refresh_without_token_is_unauthorized() {
    let (state, _store) = app_state();
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/users/refresh-token")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_login_errors() {
    let (state, _store) = app_state();
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/users/register")
        .set_json(register_body("carol", "carol@example.com"))
        .to_request();
    test::call_service(&app, req).await;

    let cases = [
        (json!({ "password": PASSWORD }), StatusCode::BAD_REQUEST),
        (json!({ "username": "carol" }), StatusCode::BAD_REQUEST),
        (json!({ "username": "nobody", "password": PASSWORD }), StatusCode::NOT_FOUND),
        (json!({ "username": "carol", "password": "WrongPass123!" }), StatusCode::UNAUTHORIZED),
    ];

    for (payload, expected) in cases {
        let req = test::TestRequest::post()
            .uri("/api/v1/users/login")
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected, "payload {payload}");
    }
}

#[actix_web::test]
async fn test_change_password_over_http() {
    let (state, _store) = app_state();
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/users/register")
        .set_json(register_body("dave", "dave@example.com"))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/users/login")
        .set_json(json!({ "username": "dave", "password": PASSWORD }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let access_cookie = response_cookie(&resp, "accessToken").unwrap();

    let req = test::TestRequest::post()
        .uri("/api/v1/users/change-password")
        .cookie(access_cookie.clone())
        .set_json(json!({ "oldPassword": "WrongPass123!", "newPassword": "NewPass456!" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/v1/users/change-password")
        .cookie(access_cookie)
        .set_json(json!({ "oldPassword": PASSWORD, "newPassword": "NewPass456!" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/v1/users/login")
        .set_json(json!({ "username": "dave", "password": "NewPass456!" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_health_and_openapi() {
    let (state, _store) = app_state();
    let app = app!(state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/v1/openapi.json").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let doc: Value = test::read_body_json(resp).await;
    assert!(doc["paths"]["/api/v1/users/login"].is_object());
}
