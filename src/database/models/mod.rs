//! Row types, response shapes and write queries per entity.

pub mod aparatur;
pub mod category;
pub mod page;
pub mod permission;
pub mod photo;
pub mod post;
pub mod product;
pub mod role;
pub mod slider;
pub mod user;

use chrono::{DateTime, Utc};
use serde::Serialize;

pub use aparatur::{Aparatur, AparaturInput, AparaturResponse};
pub use category::{Category, CategoryInput, CategoryResponse, CategorySimple};
pub use page::{Page, PageDetail, PageInput, PageResponse, PageWithRelation};
pub use permission::{Permission, PermissionResponse};
pub use photo::{Photo, PhotoInput, PhotoResponse};
pub use post::{Post, PostDetail, PostInput, PostResponse, PostWithRelation};
pub use product::{Product, ProductDetail, ProductInput, ProductResponse, ProductWithRelation};
pub use role::{Role, RoleResponse};
pub use slider::{Slider, SliderInput, SliderResponse};
pub use user::{User, UserInput, UserResponse, UserSimple};

/// Timestamp layout used in every response body
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Counts shown on the admin dashboard
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct DashboardCounts {
    pub categories_count: i64,
    pub posts_count: i64,
    pub products_count: i64,
    pub aparaturs_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_timestamps_without_zone() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(format_timestamp(&ts), "2024-03-09 07:05:01");
    }
}
