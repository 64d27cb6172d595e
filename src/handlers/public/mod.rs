//! Unauthenticated read-only endpoints under `/api/public`.

pub mod aparaturs;
pub mod pages;
pub mod photos;
pub mod posts;
pub mod products;
pub mod sliders;

/// Number of rows returned by the `/home` endpoints
pub const HOME_LIMIT: i64 = 6;
