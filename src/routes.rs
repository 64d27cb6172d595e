//! Router assembly. The route to permission mapping is fixed here at startup.

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, StatusCode},
    middleware::from_fn_with_state,
    response::{IntoResponse, Json},
    routing::{delete, get, post, put, MethodRouter},
    Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::warn;

use crate::auth::permissions::*;
use crate::auth::PrincipalStore;
use crate::database::DatabaseManager;
use crate::handlers::{admin, auth, public};
use crate::middleware::{jwt_auth_middleware, require};
use crate::AppState;

/// Full application router
pub fn app(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/health", get(health))
        .route("/api/login", post(auth::login))
        .nest("/api/admin", admin_routes(&state))
        .nest("/api/public", public_routes())
        .nest_service("/uploads", ServeDir::new(state.upload_root()))
        .layer(DefaultBodyLimit::max(state.config.api.max_request_size_bytes));

    if state.config.security.enable_cors {
        router = router.layer(cors_layer(&state.config.security.cors_origins));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

fn guard(
    store: &Arc<dyn PrincipalStore>,
    permission: &'static str,
    route: MethodRouter<AppState>,
) -> MethodRouter<AppState> {
    route.layer(require(store.clone(), permission))
}

/// `/api/admin` with a bearer token on every route and one permission per
/// method
pub fn admin_routes(state: &AppState) -> Router<AppState> {
    use admin::*;
    let s = &state.principals;

    Router::new()
        .route("/dashboard", guard(s, DASHBOARD_INDEX, get(dashboard::index)))
        // categories
        .route("/categories", guard(s, CATEGORIES_INDEX, get(categories::index)))
        .route("/categories", guard(s, CATEGORIES_CREATE, post(categories::store)))
        .route("/categories/all", guard(s, CATEGORIES_INDEX, get(categories::all)))
        .route("/categories/:id", guard(s, CATEGORIES_SHOW, get(categories::show)))
        .route("/categories/:id", guard(s, CATEGORIES_UPDATE, put(categories::update)))
        .route("/categories/:id", guard(s, CATEGORIES_DELETE, delete(categories::destroy)))
        // posts
        .route("/posts", guard(s, POSTS_INDEX, get(posts::index)))
        .route("/posts", guard(s, POSTS_CREATE, post(posts::store)))
        .route("/posts/:id", guard(s, POSTS_SHOW, get(posts::show)))
        .route("/posts/:id", guard(s, POSTS_UPDATE, put(posts::update)))
        .route("/posts/:id", guard(s, POSTS_DELETE, delete(posts::destroy)))
        // pages
        .route("/pages", guard(s, PAGES_INDEX, get(pages::index)))
        .route("/pages", guard(s, PAGES_CREATE, post(pages::store)))
        .route("/pages/:id", guard(s, PAGES_SHOW, get(pages::show)))
        .route("/pages/:id", guard(s, PAGES_UPDATE, put(pages::update)))
        .route("/pages/:id", guard(s, PAGES_DELETE, delete(pages::destroy)))
        // photos
        .route("/photos", guard(s, PHOTOS_INDEX, get(photos::index)))
        .route("/photos", guard(s, PHOTOS_CREATE, post(photos::store)))
        .route("/photos/:id", guard(s, PHOTOS_DELETE, delete(photos::destroy)))
        // sliders
        .route("/sliders", guard(s, SLIDERS_INDEX, get(sliders::index)))
        .route("/sliders", guard(s, SLIDERS_CREATE, post(sliders::store)))
        .route("/sliders/:id", guard(s, SLIDERS_DELETE, delete(sliders::destroy)))
        // products
        .route("/products", guard(s, PRODUCTS_INDEX, get(products::index)))
        .route("/products", guard(s, PRODUCTS_CREATE, post(products::store)))
        .route("/products/:id", guard(s, PRODUCTS_SHOW, get(products::show)))
        .route("/products/:id", guard(s, PRODUCTS_UPDATE, put(products::update)))
        .route("/products/:id", guard(s, PRODUCTS_DELETE, delete(products::destroy)))
        // aparaturs
        .route("/aparaturs", guard(s, APARATURS_INDEX, get(aparaturs::index)))
        .route("/aparaturs", guard(s, APARATURS_CREATE, post(aparaturs::store)))
        .route("/aparaturs/:id", guard(s, APARATURS_SHOW, get(aparaturs::show)))
        .route("/aparaturs/:id", guard(s, APARATURS_UPDATE, put(aparaturs::update)))
        .route("/aparaturs/:id", guard(s, APARATURS_DELETE, delete(aparaturs::destroy)))
        // users
        .route("/users", guard(s, USERS_INDEX, get(users::index)))
        .route("/users", guard(s, USERS_CREATE, post(users::store)))
        .route("/users/:id", guard(s, USERS_SHOW, get(users::show)))
        .route("/users/:id", guard(s, USERS_UPDATE, put(users::update)))
        .route("/users/:id", guard(s, USERS_DELETE, delete(users::destroy)))
        // roles
        .route("/roles", guard(s, ROLES_INDEX, get(roles::index)))
        .route("/roles", guard(s, ROLES_CREATE, post(roles::store)))
        .route("/roles/all", guard(s, ROLES_INDEX, get(roles::all)))
        .route("/roles/:id", guard(s, ROLES_SHOW, get(roles::show)))
        .route("/roles/:id", guard(s, ROLES_UPDATE, put(roles::update)))
        .route("/roles/:id", guard(s, ROLES_DELETE, delete(roles::destroy)))
        // permissions
        .route("/permissions", guard(s, PERMISSIONS_INDEX, get(permissions::index)))
        .route("/permissions", guard(s, PERMISSIONS_CREATE, post(permissions::store)))
        .route("/permissions/all", guard(s, PERMISSIONS_INDEX, get(permissions::all)))
        .route("/permissions/:id", guard(s, PERMISSIONS_SHOW, get(permissions::show)))
        .route("/permissions/:id", guard(s, PERMISSIONS_UPDATE, put(permissions::update)))
        .route("/permissions/:id", guard(s, PERMISSIONS_DELETE, delete(permissions::destroy)))
        .route_layer(from_fn_with_state(state.tokens.clone(), jwt_auth_middleware))
}

/// `/api/public`, no authentication
pub fn public_routes() -> Router<AppState> {
    use public::*;

    Router::new()
        .route("/posts", get(posts::index))
        .route("/posts/home", get(posts::home))
        .route("/posts/:slug", get(posts::show))
        .route("/pages", get(pages::index))
        .route("/pages/:slug", get(pages::show))
        .route("/photos", get(photos::index))
        .route("/photos/home", get(photos::home))
        .route("/sliders", get(sliders::index))
        .route("/products", get(products::index))
        .route("/products/home", get(products::home))
        .route("/products/:slug", get(products::show))
        .route("/aparaturs", get(aparaturs::index))
        .route("/aparaturs/home", get(aparaturs::home))
        .route("/aparaturs/:id", get(aparaturs::show))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "ok",
                "data": { "status": "ok", "timestamp": now, "database": "ok" }
            })),
        ),
        Err(e) => {
            warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "message": "database unavailable",
                    "data": { "status": "degraded", "timestamp": now }
                })),
            )
        }
    }
}
