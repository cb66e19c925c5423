//! Database Models - structs representing database tables (used by sqlx/serde).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Blog post model
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: i64,
    pub title: String,
    pub lead: String,
    pub post: String,
    pub created: DateTime<Utc>,
    pub last_update: DateTime<Utc>,
}

/// New blog post for creation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewBlogPost {
    pub title: String,
    pub lead: String,
    #[serde(rename = "post_content")]
    pub post: String,
}

/// Blog post update
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateBlogPost {
    pub title: String,
    pub lead: String,
    #[serde(rename = "post_content")]
    pub post: String,
}

/// Social link of the blog's author
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Social {
    pub id: i64,
    pub user_id: i64,
    pub social_platform: String,
    pub link: String,
}

/// New social link for insertion
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewSocial {
    pub user_id: i64,
    pub social_platform: String,
    pub link: String,
}

/// User profile model
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub summary: String,
    pub content: String,
}

/// User profile update
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateUser {
    pub name: String,
    pub summary: String,
    pub content: String,
}
