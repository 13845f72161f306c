// SPDX-License-Identifier: MIT

//! Auth endpoints against a mocked Supabase: redirect passthrough, verbatim
//! body forwarding, and error translation.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use mockito::Matcher;
use tower::ServiceExt;

mod common;

#[tokio::test]
async fn test_authorize_redirects_to_supabase_location() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/auth/v1/authorize")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("provider".into(), "google".into()),
            Matcher::UrlEncoded("redirect_to".into(), "https://app.example/cb".into()),
            Matcher::UrlEncoded("code_challenge".into(), "abc".into()),
            Matcher::UrlEncoded("code_challenge_method".into(), "s256".into()),
        ]))
        .with_status(302)
        .with_header("location", "https://idp.example/cb")
        .create_async()
        .await;

    let app = common::app_with_downstream(&server.url());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/authorize?redirect_to=https://app.example/cb&code_challenge=abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "https://idp.example/cb"
    );
}

#[tokio::test]
async fn test_authorize_redirect_without_location_is_500() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/auth/v1/authorize")
        .match_query(Matcher::Any)
        .with_status(302)
        .create_async()
        .await;

    let app = common::app_with_downstream(&server.url());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/authorize?redirect_to=https://app.example/cb&code_challenge=abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = common::body_json(response).await;
    assert_eq!(body["code"], "NO_REDIRECT_LOCATION");
}

#[tokio::test]
async fn test_authorize_error_status_passed_through() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/auth/v1/authorize")
        .match_query(Matcher::Any)
        .with_status(403)
        .create_async()
        .await;

    let app = common::app_with_downstream(&server.url());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/authorize?redirect_to=https://app.example/cb&code_challenge=abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = common::body_json(response).await;
    assert_eq!(body["code"], "SUPABASE_OAUTH_ERROR");
}

#[tokio::test]
async fn test_exchange_token_success_passthrough() {
    let tokens = r#"{"access_token":"at","refresh_token":"rt","token_type":"bearer","expires_in":3600}"#;
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/auth/v1/token")
        .match_query(Matcher::UrlEncoded("grant_type".into(), "pkce".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(tokens)
        .create_async()
        .await;

    let app = common::app_with_downstream(&server.url());
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/exchange-token")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"auth_code":"c","code_verifier":"v"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body, serde_json::from_str::<serde_json::Value>(tokens).unwrap());
}

#[tokio::test]
async fn test_exchange_token_error_translated() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/auth/v1/token")
        .match_query(Matcher::Any)
        .with_status(400)
        .with_body(r#"{"error_code":"invalid_grant","error_description":"bad code"}"#)
        .create_async()
        .await;

    let app = common::app_with_downstream(&server.url());
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/exchange-token")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"auth_code":"c","code_verifier":"v"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = common::body_json(response).await;
    assert_eq!(body["code"], "invalid_grant");
    assert_eq!(body["message"], "bad code");
}

#[tokio::test]
async fn test_refresh_token_passthrough() {
    let tokens = r#"{"access_token":"at2","refresh_token":"rt2"}"#;
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/auth/v1/token")
        .match_query(Matcher::UrlEncoded(
            "grant_type".into(),
            "refresh_token".into(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(tokens)
        .create_async()
        .await;

    let app = common::app_with_downstream(&server.url());
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/refresh-token")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"refresh_token":"rt"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["access_token"], "at2");
}

#[tokio::test]
async fn test_logout_returns_204_without_body() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/auth/v1/logout")
        .with_status(204)
        .create_async()
        .await;

    let app = common::app_with_downstream(&server.url());
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/logout")
                .header(header::AUTHORIZATION, "Bearer token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(common::body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn test_me_passes_user_record_through() {
    let user = r#"{"id":"user-1","email":"u@example.com","app_metadata":{"provider":"google"}}"#;
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/auth/v1/user")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(user)
        .create_async()
        .await;

    let app = common::app_with_downstream(&server.url());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/me")
                .header(header::AUTHORIZATION, "Bearer token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body, serde_json::from_str::<serde_json::Value>(user).unwrap());
}

#[tokio::test]
async fn test_me_error_status_passed_through() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/auth/v1/user")
        .with_status(401)
        .with_body(r#"{"msg":"invalid JWT"}"#)
        .create_async()
        .await;

    let app = common::app_with_downstream(&server.url());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/me")
                .header(header::AUTHORIZATION, "Bearer stale")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = common::body_json(response).await;
    assert_eq!(body["code"], "SUPABASE_ERROR");
    assert_eq!(body["message"], "invalid JWT");
}
