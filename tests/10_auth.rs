mod common;

use anyhow::Result;
use reqwest::{Method, StatusCode};
use serde_json::json;

use common::{TestServer, ADMIN_EMAIL, PASSWORD};

#[tokio::test]
async fn health_and_root_are_public() -> Result<()> {
    let server = TestServer::spawn().await?;

    let (status, body) = server.call(Method::GET, "/health", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["storage"], "memory");

    let (status, body) = server.call(Method::GET, "/", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["categories"].as_array().is_some_and(|c| !c.is_empty()));
    Ok(())
}

#[tokio::test]
async fn register_issues_a_session() -> Result<()> {
    let server = TestServer::spawn().await?;

    let (status, body) = server.register("Dev@Example.com", "Dev").await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["user"]["email"], "dev@example.com");
    assert_eq!(body["data"]["user"]["role"], "user");
    assert!(body["data"]["user"].get("password_hash").is_none());
    assert!(body["data"]["expires_in"].as_i64().unwrap() > 0);

    let token = body["data"]["token"].as_str().unwrap();
    let (status, body) = server.call(Method::GET, "/api/auth/whoami", Some(token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Dev");
    assert!(body["data"]["expires_at"].is_string());
    Ok(())
}

#[tokio::test]
async fn configured_admin_email_gets_admin_role() -> Result<()> {
    let server = TestServer::spawn().await?;
    let (status, body) = server.register(ADMIN_EMAIL, "Admin").await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["user"]["role"], "admin");
    Ok(())
}

#[tokio::test]
async fn duplicate_email_conflicts() -> Result<()> {
    let server = TestServer::spawn().await?;
    server.register("dup@example.com", "First").await?;

    let (status, body) = server.register("DUP@example.com", "Second").await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "CONFLICT");
    Ok(())
}

#[tokio::test]
async fn registration_validation_reports_the_field() -> Result<()> {
    let server = TestServer::spawn().await?;

    let (status, body) = server.register("nameless@example.com", "   ").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["field_errors"]["name"], "Name is required");

    let (status, body) = server
        .call(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({ "email": "short@example.com", "password": "abc", "name": "Short" })),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["password"].is_string());
    Ok(())
}

#[tokio::test]
async fn login_rejects_wrong_password() -> Result<()> {
    let server = TestServer::spawn().await?;
    server.register("dev@example.com", "Dev").await?;

    let (status, body) = server
        .call(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": "dev@example.com", "password": "not-the-password" })),
        )
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid email or password");

    let (status, body) = server
        .call(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": "DEV@example.com", "password": PASSWORD })),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["token"].is_string());
    Ok(())
}

#[tokio::test]
async fn protected_routes_need_a_valid_token() -> Result<()> {
    let server = TestServer::spawn().await?;

    let (status, body) = server.call(Method::GET, "/api/projects", None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = server.call(Method::GET, "/api/projects", Some("garbage"), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn logout_revokes_the_token() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.token_for("leaving@example.com").await?;

    let (status, body) = server.call(Method::DELETE, "/api/auth/session", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["logged_out"], true);

    let (status, _) = server.call(Method::GET, "/api/auth/whoami", Some(&token), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}
