//! Page envelopes for list endpoints.
//!
//! The engine is storage agnostic: callers count matching rows and fetch the
//! current page themselves, then hand both to [`Page::new`] together with the
//! request's [`BaseUrl`].

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 5;

const PREVIOUS_LABEL: &str = "&laquo; Previous";
const NEXT_LABEL: &str = "Next &raquo;";

/// Raw list query parameters. Kept as strings so malformed numbers fall back
/// to defaults instead of rejecting the request.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PageQuery {
    pub search: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Sanitised pagination parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageParams {
    pub search: String,
    pub page: i64,
    pub limit: i64,
}

impl PageParams {
    pub fn new(search: impl Into<String>, page: i64, limit: i64) -> Self {
        Self {
            search: search.into(),
            page,
            limit,
        }
    }

    /// `page` and `limit` fall back to 1 and 5 when missing, unparsable or
    /// below 1. `limit` is capped at `max_limit` (`PAGINATION_MAX_LIMIT`), so
    /// the envelope's `per_page` can be smaller than the requested limit.
    pub fn from_query(query: &PageQuery, max_limit: i64) -> Self {
        let page = positive_or(query.page.as_deref(), DEFAULT_PAGE);
        let limit = positive_or(query.limit.as_deref(), DEFAULT_LIMIT).min(max_limit.max(1));

        Self {
            search: query.search.clone().unwrap_or_default(),
            page,
            limit,
        }
    }

    /// Rows to skip; saturates instead of overflowing for huge pages
    pub fn offset(&self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    /// `%search%` pattern for substring matching
    pub fn like_pattern(&self) -> String {
        format!("%{}%", self.search)
    }
}

fn positive_or(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|v| *v >= 1)
        .unwrap_or(default)
}

/// Request URL without query string: `scheme://host/path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl(pub String);

impl BaseUrl {
    pub fn from_parts(parts: &Parts) -> Self {
        let scheme = parts
            .headers
            .get("x-forwarded-proto")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| match parts.uri.scheme_str() {
                Some("https") => "https".to_string(),
                _ => "http".to_string(),
            });

        let host = parts
            .headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .or_else(|| parts.uri.authority().map(|a| a.to_string()))
            .unwrap_or_default();

        BaseUrl(format!("{}://{}{}", scheme, host, parts.uri.path()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for BaseUrl
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(BaseUrl::from_parts(parts))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLink {
    pub url: String,
    pub label: String,
    pub active: bool,
}

/// Paginated list envelope. `per_page` is the effective limit after the
/// `PAGINATION_MAX_LIMIT` cap (100, or 50 in production, unless overridden).
#[derive(Debug, Clone, Serialize)]
pub struct Page<T: Serialize> {
    pub current_page: i64,
    pub data: Vec<T>,
    pub first_page_url: String,
    pub from: i64,
    pub last_page: i64,
    pub last_page_url: String,
    pub links: Vec<PageLink>,
    pub next_page_url: String,
    pub path: String,
    pub per_page: i64,
    pub prev_page_url: String,
    pub to: i64,
    pub total: i64,
}

impl<T: Serialize> Page<T> {
    pub fn new(data: Vec<T>, total: i64, params: &PageParams, base: &BaseUrl) -> Self {
        let base_url = base.as_str();
        let search = params.search.as_str();
        let page = params.page;
        let last = last_page(total, params.limit);
        let from = params.offset().saturating_add(1);
        let to = from.saturating_add(data.len() as i64).saturating_sub(1);

        Self {
            current_page: page,
            first_page_url: link_url(base_url, 1, search),
            from,
            last_page: last,
            last_page_url: link_url(base_url, last, search),
            links: build_links(page, last, base_url, search),
            next_page_url: page_url(base_url, page.saturating_add(1), last, search),
            path: base_url.to_string(),
            per_page: params.limit,
            prev_page_url: page_url(base_url, page.saturating_sub(1), last, search),
            to,
            total,
            data,
        }
    }
}

/// `ceil(total / limit)`; a zero limit yields a single page
pub fn last_page(total: i64, limit: i64) -> i64 {
    if limit == 0 {
        return 1;
    }
    total.saturating_add(limit - 1).div_euclid(limit)
}

fn query_suffix(search: &str) -> String {
    if search.is_empty() {
        String::new()
    } else {
        format!("&search={}", search)
    }
}

fn link_url(base_url: &str, page: i64, search: &str) -> String {
    format!("{}?page={}{}", base_url, page, query_suffix(search))
}

/// URL for `page`, or empty when it falls outside `1..=last_page`
pub fn page_url(base_url: &str, page: i64, last_page: i64, search: &str) -> String {
    if page < 1 || page > last_page {
        return String::new();
    }
    link_url(base_url, page, search)
}

/// Previous, one link per page, Next
pub fn build_links(current_page: i64, last_page: i64, base_url: &str, search: &str) -> Vec<PageLink> {
    let mut links = Vec::with_capacity(last_page.max(0) as usize + 2);

    links.push(PageLink {
        url: page_url(base_url, current_page.saturating_sub(1), last_page, search),
        label: PREVIOUS_LABEL.to_string(),
        active: false,
    });

    for i in 1..=last_page {
        links.push(PageLink {
            url: link_url(base_url, i, search),
            label: i.to_string(),
            active: i == current_page,
        });
    }

    links.push(PageLink {
        url: page_url(base_url, current_page.saturating_add(1), last_page, search),
        label: NEXT_LABEL.to_string(),
        active: false,
    });

    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    const BASE: &str = "http://desa.test/api/public/posts";

    fn base() -> BaseUrl {
        BaseUrl(BASE.to_string())
    }

    fn query(page: Option<&str>, limit: Option<&str>) -> PageQuery {
        PageQuery {
            search: None,
            page: page.map(str::to_string),
            limit: limit.map(str::to_string),
        }
    }

    #[test]
    fn last_page_is_ceiling_of_total_over_limit() {
        for limit in 1..=7 {
            for total in 0..=50 {
                let expected = (total as f64 / limit as f64).ceil() as i64;
                assert_eq!(last_page(total, limit), expected, "total={} limit={}", total, limit);
            }
        }
    }

    #[test]
    fn last_page_with_zero_limit_is_one() {
        assert_eq!(last_page(0, 0), 1);
        assert_eq!(last_page(42, 0), 1);
    }

    #[test]
    fn params_fall_back_to_defaults() {
        assert_eq!(PageParams::from_query(&query(None, None), 100), PageParams::new("", 1, 5));
        assert_eq!(PageParams::from_query(&query(Some("abc"), Some("x")), 100), PageParams::new("", 1, 5));
        assert_eq!(PageParams::from_query(&query(Some("0"), Some("-3")), 100), PageParams::new("", 1, 5));
        assert_eq!(PageParams::from_query(&query(Some("3"), Some("10")), 100), PageParams::new("", 3, 10));
    }

    #[test]
    fn limit_is_capped() {
        let params = PageParams::from_query(&query(Some("1"), Some("1000")), 100);
        assert_eq!(params.limit, 100);
    }

    #[test]
    fn offset_follows_page_and_limit() {
        assert_eq!(PageParams::new("", 1, 5).offset(), 0);
        assert_eq!(PageParams::new("", 3, 5).offset(), 10);
    }

    #[test]
    fn huge_page_saturates_instead_of_overflowing() {
        let max = i64::MAX.to_string();
        let params = PageParams::from_query(&query(Some(&max), Some("100")), 100);
        assert_eq!(params.page, i64::MAX);
        assert_eq!(params.offset(), i64::MAX);

        let page = Page::new(Vec::<i32>::new(), 12, &params, &base());
        assert_eq!(page.current_page, i64::MAX);
        assert_eq!(page.from, i64::MAX);
        assert_eq!(page.last_page, 1);
        assert_eq!(page.next_page_url, "");
        assert_eq!(page.prev_page_url, "");
        assert_eq!(page.links.last().map(|l| l.url.as_str()), Some(""));

        assert!(last_page(i64::MAX, 5) > 0);
    }

    #[test]
    fn from_and_to_follow_rows_returned() {
        let params = PageParams::new("", 2, 5);
        let page = Page::new(vec![1, 2, 3], 8, &params, &base());
        assert_eq!(page.from, 6);
        assert_eq!(page.to, 8);
        assert_eq!(page.last_page, 2);
        assert_eq!(page.per_page, 5);
        assert_eq!(page.total, 8);
        assert_eq!(page.path, BASE);
    }

    #[test]
    fn prev_and_next_empty_out_of_range() {
        let first = Page::new(vec!["a"], 3, &PageParams::new("", 1, 1), &base());
        assert_eq!(first.prev_page_url, "");
        assert_eq!(first.next_page_url, format!("{}?page=2", BASE));

        let last = Page::new(vec!["c"], 3, &PageParams::new("", 3, 1), &base());
        assert_eq!(last.prev_page_url, format!("{}?page=2", BASE));
        assert_eq!(last.next_page_url, "");

        let beyond = Page::new(Vec::<&str>::new(), 3, &PageParams::new("", 9, 1), &base());
        assert_eq!(beyond.next_page_url, "");
    }

    #[test]
    fn links_list_every_page_between_prev_and_next() {
        let links = build_links(2, 3, BASE, "");
        let labels: Vec<&str> = links.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, vec![PREVIOUS_LABEL, "1", "2", "3", NEXT_LABEL]);

        let active: Vec<bool> = links.iter().map(|l| l.active).collect();
        assert_eq!(active, vec![false, false, true, false, false]);

        assert_eq!(links[0].url, format!("{}?page=1", BASE));
        assert_eq!(links[4].url, format!("{}?page=3", BASE));
    }

    #[test]
    fn search_is_appended_only_when_present() {
        let links = build_links(1, 2, BASE, "desa");
        assert_eq!(links[0].url, "");
        assert_eq!(links[1].url, format!("{}?page=1&search=desa", BASE));
        assert_eq!(links[3].url, format!("{}?page=2&search=desa", BASE));

        let page = Page::new(vec![1], 1, &PageParams::new("", 1, 5), &base());
        assert_eq!(page.first_page_url, format!("{}?page=1", BASE));
        assert_eq!(page.last_page_url, format!("{}?page=1", BASE));
    }

    #[test]
    fn empty_result_has_no_numbered_links() {
        let page = Page::new(Vec::<i32>::new(), 0, &PageParams::new("", 1, 5), &base());
        assert_eq!(page.last_page, 0);
        assert_eq!(page.from, 1);
        assert_eq!(page.to, 0);
        // Previous, Next and no numbered links
        assert_eq!(page.links.len(), 2);
    }

    #[test]
    fn base_url_prefers_forwarded_proto() {
        let (parts, _) = Request::builder()
            .uri("/api/public/posts?page=2")
            .header("host", "desa.test")
            .header("x-forwarded-proto", "https")
            .body(())
            .unwrap()
            .into_parts();
        assert_eq!(BaseUrl::from_parts(&parts).as_str(), "https://desa.test/api/public/posts");

        let (parts, _) = Request::builder()
            .uri("/api/public/posts?page=2")
            .header("host", "desa.test")
            .body(())
            .unwrap()
            .into_parts();
        assert_eq!(BaseUrl::from_parts(&parts).as_str(), "http://desa.test/api/public/posts");
    }
}
