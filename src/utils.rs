use serde::{Deserialize, Serialize};

use crate::error::ApiError;

// Defaults applied whenever the query string omits a value or carries one
// that does not parse as a positive integer.
const DEFAULT_PAGE: u64 = 1;
const DEFAULT_PAGE_LIMIT: u64 = 10;
// Max limit to prevent excessive requests
const MAX_PAGE_LIMIT: u64 = 100;

/// Feed pagination parameters. Raw strings are kept so that unparseable
/// input falls back to the defaults instead of failing extraction.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    page: Option<String>,
    #[serde(default)]
    limit: Option<String>,
    #[serde(default)]
    sort: Option<String>,
}

impl PageParams {
    pub fn page(&self) -> u64 {
        parse_positive(self.page.as_deref()).unwrap_or(DEFAULT_PAGE)
    }

    pub fn limit(&self) -> u64 {
        parse_positive(self.limit.as_deref())
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .min(MAX_PAGE_LIMIT)
    }

    pub fn offset(&self) -> u64 {
        (self.page() - 1).saturating_mul(self.limit())
    }

    pub fn sort(&self) -> FeedSort {
        FeedSort::from_param(self.sort.as_deref())
    }
}

fn parse_positive(value: Option<&str>) -> Option<u64> {
    value
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .filter(|parsed| *parsed >= 1)
}

/// Sort modes accepted by the feed. Unknown values fall back to
/// `DateDesc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedSort {
    DateDesc,
    DateAsc,
    LikesDesc,
    LikesAsc,
}

impl FeedSort {
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some("date_asc") => FeedSort::DateAsc,
            Some("likes_desc") => FeedSort::LikesDesc,
            Some("likes_asc") => FeedSort::LikesAsc,
            _ => FeedSort::DateDesc,
        }
    }

    /// ORDER BY clause for the feed query. Ties break on the row id so
    /// pages stay stable across requests.
    pub fn order_clause(&self) -> &'static str {
        match self {
            FeedSort::DateDesc => "p.publish_date DESC, p.id DESC",
            FeedSort::DateAsc => "p.publish_date ASC, p.id ASC",
            FeedSort::LikesDesc => "likes_count DESC, p.id DESC",
            FeedSort::LikesAsc => "likes_count ASC, p.id ASC",
        }
    }
}

/// Comment listing parameters. The sort field is whitelisted; anything else
/// silently resets to the publish date.
#[derive(Debug, Default, Deserialize)]
pub struct CommentListParams {
    #[serde(default)]
    sort: Option<String>,
    #[serde(default)]
    order: Option<String>,
}

impl CommentListParams {
    pub fn sort_column(&self) -> &'static str {
        match self.sort.as_deref() {
            Some("login") => "u.login",
            Some("id") => "c.id",
            _ => "c.publish_date",
        }
    }

    pub fn sort_direction(&self) -> &'static str {
        match self.order.as_deref() {
            Some(raw) if raw.eq_ignore_ascii_case("desc") => "DESC",
            _ => "ASC",
        }
    }
}

/// Response envelope for paginated lists.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
    pub data: Vec<T>,
}

impl<T> Paginated<T> {
    pub fn new(page: u64, limit: u64, total: u64, data: Vec<T>) -> Self {
        let total_pages = if limit == 0 { 0 } else { (total + limit - 1) / limit };
        Self {
            page,
            limit,
            total,
            total_pages,
            data,
        }
    }
}

/// Normalizes the "categories" form value into a deduplicated list of ids.
///
/// Untyped form submissions deliver the list in four shapes: repeated
/// fields, a JSON-encoded array string, a comma-separated string, or a
/// single scalar. All tolerance lives here; handlers only ever see the
/// canonical `Vec<i64>`.
pub fn normalize_category_ids(values: &[String]) -> Result<Vec<i64>, ApiError> {
    let mut flat: Vec<String> = Vec::new();
    for raw in values {
        let trimmed = raw.trim();
        if trimmed.starts_with('[') {
            let parsed: Vec<serde_json::Value> = serde_json::from_str(trimmed)
                .map_err(|_| ApiError::bad_request("Invalid categories value"))?;
            for item in parsed {
                match item {
                    serde_json::Value::String(s) => flat.push(s),
                    serde_json::Value::Number(n) => flat.push(n.to_string()),
                    _ => return Err(ApiError::bad_request("Invalid categories value")),
                }
            }
        } else if trimmed.contains(',') {
            flat.extend(trimmed.split(',').map(|part| part.to_string()));
        } else {
            flat.push(trimmed.to_string());
        }
    }

    let mut ids: Vec<i64> = Vec::new();
    for entry in &flat {
        let trimmed = entry.trim();
        if trimmed.is_empty() {
            continue;
        }
        let id: i64 = trimmed
            .parse()
            .map_err(|_| ApiError::bad_request(format!("Invalid category id: {}", trimmed)))?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    if ids.is_empty() {
        return Err(ApiError::bad_request("At least one category is required"));
    }
    Ok(ids)
}
