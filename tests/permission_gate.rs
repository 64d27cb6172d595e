mod common;

use std::sync::Arc;

use anyhow::Result;
use axum::{http::StatusCode, middleware::from_fn_with_state, routing::get, Router};
use chrono::{Duration, Utc};

use desa_digital::auth::permissions::{DASHBOARD_INDEX, POSTS_INDEX};
use desa_digital::auth::PrincipalStore;
use desa_digital::middleware::{jwt_auth_middleware, require};
use desa_digital::{routes, AppState};

fn probe(state: &AppState) -> Router {
    let store: Arc<dyn PrincipalStore> = state.principals.clone();
    Router::new()
        .route("/probe", get(|| async { "ok" }).layer(require(store, DASHBOARD_INDEX)))
        .route_layer(from_fn_with_state(state.tokens.clone(), jwt_auth_middleware))
}

fn principals() -> Result<common::MemoryPrincipals> {
    common::MemoryPrincipals::default()
        .with_user(1, "admin", &[DASHBOARD_INDEX, POSTS_INDEX])?
        .with_user(2, "viewer", &[POSTS_INDEX])?
        .with_user(3, "nobody", &[])
}

#[tokio::test]
async fn request_without_token_is_unauthorized() -> Result<()> {
    let state = common::state(principals()?)?;

    let (res, json) = common::send(probe(&state), common::get("/probe", None)?).await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Unauthorized");
    Ok(())
}

#[tokio::test]
async fn garbage_token_is_invalid() -> Result<()> {
    let state = common::state(principals()?)?;

    let (res, json) = common::send(probe(&state), common::get("/probe", Some("not.a.jwt"))?).await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Invalid token");
    Ok(())
}

#[tokio::test]
async fn expired_token_is_rejected() -> Result<()> {
    let state = common::state(principals()?)?;
    let issued = state.tokens.issue_at("admin", Utc::now() - Duration::days(2))?;

    let (res, json) = common::send(probe(&state), common::get("/probe", Some(&issued.token))?).await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Token expired");
    Ok(())
}

#[tokio::test]
async fn token_for_deleted_user_is_unauthorized() -> Result<()> {
    let state = common::state(principals()?)?;
    let issued = state.tokens.issue("ghost")?;

    let (res, json) = common::send(probe(&state), common::get("/probe", Some(&issued.token))?).await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "User not found");
    Ok(())
}

#[tokio::test]
async fn missing_permission_is_forbidden() -> Result<()> {
    let state = common::state(principals()?)?;

    for username in ["viewer", "nobody"] {
        let issued = state.tokens.issue(username)?;
        let (res, json) = common::send(probe(&state), common::get("/probe", Some(&issued.token))?).await?;

        assert_eq!(res.status(), StatusCode::FORBIDDEN, "{}", username);
        assert_eq!(json["success"], false);
    }
    Ok(())
}

#[tokio::test]
async fn granted_permission_reaches_handler() -> Result<()> {
    let state = common::state(principals()?)?;
    let issued = state.tokens.issue("admin")?;

    let response = tower::ServiceExt::oneshot(probe(&state), common::get("/probe", Some(&issued.token))?).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    assert_eq!(&bytes[..], b"ok");
    Ok(())
}

#[tokio::test]
async fn admin_router_checks_route_permission() -> Result<()> {
    let state = common::state(principals()?)?;
    let viewer = state.tokens.issue("viewer")?;
    let app = routes::app(state);

    let (res, _) = common::send(app.clone(), common::get("/api/admin/users", None)?).await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // viewer holds posts-index only
    let (res, json) = common::send(app, common::get("/api/admin/users", Some(&viewer.token))?).await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(json["message"], "Forbidden - permission denied");
    Ok(())
}
