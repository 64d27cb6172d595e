pub mod auth;
pub mod permission;
pub mod response;

pub use auth::{jwt_auth_middleware, AuthUser};
pub use permission::{permission_middleware, require, PermissionGate};
pub use response::{ApiResponse, ApiResult};
