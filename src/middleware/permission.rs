use axum::{
    extract::{Request, State},
    middleware::{from_fn_with_state, FromFnLayer, Next},
    response::Response,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{error, warn};

use super::auth::AuthUser;
use crate::auth::PrincipalStore;
use crate::error::ApiError;

/// Per-route authorization state: where principals come from and the one
/// permission the route requires.
#[derive(Clone)]
pub struct PermissionGate {
    pub store: Arc<dyn PrincipalStore>,
    pub permission: &'static str,
}

/// Resolve the principal placed by `jwt_auth_middleware` and require
/// `gate.permission` in the union of its role permissions. The principal is
/// re-read from storage on every request.
pub async fn permission_middleware(
    State(gate): State<PermissionGate>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let username = match request.extensions().get::<AuthUser>() {
        Some(user) => user.username.clone(),
        None => return Err(ApiError::unauthorized("Unauthorized")),
    };

    let principal = gate.store.find_principal(&username).await.map_err(|e| {
        error!("Failed to load principal {}: {}", username, e);
        ApiError::from(e)
    })?;

    let Some(principal) = principal else {
        warn!("Token subject {} no longer exists", username);
        return Err(ApiError::unauthorized("User not found"));
    };

    if !principal.permission_set().contains(gate.permission) {
        warn!("Permission {} denied for {}", gate.permission, username);
        return Err(ApiError::forbidden("Forbidden - permission denied"));
    }

    Ok(next.run(request).await)
}

type GateFuture = Pin<Box<dyn Future<Output = Result<Response, ApiError>> + Send>>;
type GateFn = fn(State<PermissionGate>, Request, Next) -> GateFuture;

fn gate_fn(state: State<PermissionGate>, request: Request, next: Next) -> GateFuture {
    Box::pin(permission_middleware(state, request, next))
}

/// Layer requiring `permission` for the wrapped route
pub fn require(
    store: Arc<dyn PrincipalStore>,
    permission: &'static str,
) -> FromFnLayer<GateFn, PermissionGate, (State<PermissionGate>, Request)> {
    from_fn_with_state(PermissionGate { store, permission }, gate_fn as GateFn)
}
