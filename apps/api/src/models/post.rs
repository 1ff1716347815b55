use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
}

impl PostStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }
}

impl TryFrom<String> for PostStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            other => Err(format!("unknown post status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: String,
    #[sqlx(try_from = "String")]
    pub status: PostStatus,
    pub published_date: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn draft(title: impl Into<String>, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            slug: String::new(),
            content: content.into(),
            excerpt: String::new(),
            status: PostStatus::Draft,
            published_date: None,
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Normalizes the post before it is written.
    ///
    /// The publish date is stamped once, on the first save that sees
    /// `Published` without a date. Later saves keep whatever is stored.
    pub fn prepare_save(&mut self, now: DateTime<Utc>) {
        if self.slug.trim().is_empty() {
            self.slug = slugify(&self.title);
        }
        if self.status == PostStatus::Published && self.published_date.is_none() {
            self.published_date = Some(now);
        }
        self.updated_at = now;
    }
}

/// Lowercase ASCII slug: alphanumerics kept, everything else collapsed to `-`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}
