mod common;

use anyhow::Result;
use axum::{body::Body, http::Request, http::StatusCode};
use serde_json::json;

use desa_digital::auth::permissions::{POSTS_CREATE, POSTS_INDEX};
use desa_digital::routes;

fn principals() -> Result<common::MemoryPrincipals> {
    common::MemoryPrincipals::default().with_user(1, "admin", &[POSTS_INDEX, POSTS_CREATE])
}

#[tokio::test]
async fn login_returns_token_and_permission_map() -> Result<()> {
    let state = common::state(principals()?)?;
    let tokens = state.tokens.clone();
    let app = routes::app(state);

    let body = json!({ "username": "admin", "password": common::PASSWORD });
    let (res, json) = common::send(app, common::post_json("/api/login", &body)?).await?;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Login Success");
    assert_eq!(json["data"]["username"], "admin");
    assert_eq!(json["data"]["email"], "admin@example.com");
    assert_eq!(json["data"]["permissions"], json!({ "posts-create": true, "posts-index": true }));

    let token = json["data"]["token"].as_str().unwrap_or_default();
    assert_eq!(tokens.verify(token)?.sub, "admin");
    Ok(())
}

#[tokio::test]
async fn wrong_password_and_unknown_user_look_the_same() -> Result<()> {
    let app = routes::app(common::state(principals()?)?);

    let wrong = json!({ "username": "admin", "password": "salah" });
    let (res, wrong_json) = common::send(app.clone(), common::post_json("/api/login", &wrong)?).await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let unknown = json!({ "username": "nobody", "password": common::PASSWORD });
    let (res, unknown_json) = common::send(app, common::post_json("/api/login", &unknown)?).await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    assert_eq!(wrong_json["message"], "Username or Password is Wrong");
    assert_eq!(wrong_json, unknown_json);
    Ok(())
}

#[tokio::test]
async fn missing_fields_are_validation_errors() -> Result<()> {
    let app = routes::app(common::state(principals()?)?);

    let (res, json) = common::send(app, common::post_json("/api/login", &json!({}))?).await?;

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["success"], false);
    assert!(json["errors"]["username"].is_string());
    assert!(json["errors"]["password"].is_string());
    Ok(())
}

#[tokio::test]
async fn malformed_body_is_bad_request() -> Result<()> {
    let app = routes::app(common::state(principals()?)?);

    let request = Request::builder()
        .method("POST")
        .uri("/api/login")
        .header("Content-Type", "application/json")
        .body(Body::from("{not json"))?;
    let (res, json) = common::send(app, request).await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    Ok(())
}
