use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Lifecycle state of a post. `Inactive` posts stay readable but reject new
/// comments.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum PostStatus {
    Active,
    Inactive,
}

impl PostStatus {
    /// Parses the wire form of a status. Anything outside the two-value enum
    /// is rejected rather than defaulted.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ACTIVE" => Some(PostStatus::Active),
            "INACTIVE" => Some(PostStatus::Inactive),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

/// Identity fields of a post or comment author, joined into feed rows.
#[derive(Serialize, Deserialize, Debug, Clone, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: i64,
    pub login: String,
    pub full_name: Option<String>,
    pub avatar: Option<String>,
}

/// A post together with the aggregates every feed row carries.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    pub author: Author,
    pub title: String,
    pub content: String,
    pub location: Option<String>,
    pub status: PostStatus,
    pub publish_date: DateTime<Utc>,
    #[serde(default)]
    pub images: Vec<String>,
    pub likes_count: i64,
    pub reposts_count: i64,
    pub comments_count: i64,
    pub stars: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub author_login: String,
    pub parent_id: Option<i64>,
    pub content: String,
    pub publish_date: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, FromRow)]
pub struct Category {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
}

/// A like or repost entry. Existence is the only state; counts are computed
/// by aggregation over these rows.
#[derive(Serialize, Deserialize, Debug, Clone, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ReactionEntry {
    pub user_id: i64,
    pub login: String,
    pub created_at: DateTime<Utc>,
}

/// A row of the star ledger. `user_id` is the giver; the receiving side is
/// the post's author.
#[derive(Serialize, Deserialize, Debug, Clone, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StarEntry {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub stars: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub login: String,
    pub full_name: Option<String>,
    pub avatar: Option<String>,
    pub role: Role,
    pub stars_balance: i64,
    pub created_at: DateTime<Utc>,
    pub followers_count: i64,
    pub following_count: i64,
}
