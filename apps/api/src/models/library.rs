use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    /// Comma-separated technology tags.
    pub technologies: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    /// Media key under `projects/`; empty when no image is attached.
    pub image: String,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn technology_tags(&self) -> Vec<String> {
        self.technologies
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect()
    }

    pub fn has_image(&self) -> bool {
        !self.image.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub technologies: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    pub image: String,
    pub featured: bool,
}

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub rating: Option<i32>,
    pub read_date: Option<NaiveDate>,
    pub cover_image: String,
    pub project_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub rating: Option<i32>,
    pub read_date: Option<NaiveDate>,
    pub cover_image: String,
    pub project_id: Option<Uuid>,
}

impl NewBook {
    /// Ratings are stored only inside `MIN_RATING..=MAX_RATING`.
    pub fn rating_in_range(&self) -> bool {
        self.rating
            .map_or(true, |r| (MIN_RATING..=MAX_RATING).contains(&r))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Photo {
    pub id: Uuid,
    pub title: String,
    pub image: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPhoto {
    pub title: String,
    pub image: String,
}
