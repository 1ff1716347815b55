//! Public projections of stored records. Media keys become URLs here.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::media::MediaUrls;
use crate::models::{
    Book, Country, Hobby, Initiative, LanguageProficiency, Photo, Post, ProgrammingLanguage,
    Project, Skill, Social, SpokenLanguage, SpokenProficiency,
};

#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub count: usize,
    pub results: Vec<T>,
}

impl<T> From<Vec<T>> for ListResponse<T> {
    fn from(results: Vec<T>) -> Self {
        Self {
            count: results.len(),
            results,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CountryView {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub flag_emoji: String,
    pub thoughts: String,
}

impl From<&Country> for CountryView {
    fn from(c: &Country) -> Self {
        Self {
            id: c.id,
            name: c.name.clone(),
            code: c.code.clone(),
            flag_emoji: c.flag_emoji.clone(),
            thoughts: c.thoughts.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HobbyView {
    pub id: Uuid,
    pub name: String,
    pub reason: String,
    pub category: String,
    pub social: Social,
    pub icon: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Hobby> for HobbyView {
    fn from(h: &Hobby) -> Self {
        Self {
            id: h.id,
            name: h.name.clone(),
            reason: h.reason.clone(),
            category: h.category.clone(),
            social: h.social,
            icon: h.icon.clone(),
            created_at: h.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SkillView {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub description: String,
    pub icon_url: Option<String>,
}

impl SkillView {
    pub fn new(skill: &Skill, urls: &MediaUrls) -> Self {
        Self {
            id: skill.id,
            name: skill.name.clone(),
            category: skill.category.clone(),
            description: skill.description.clone(),
            icon_url: skill.icon.as_deref().and_then(|key| urls.url(key)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub technologies: Vec<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    pub image_url: Option<String>,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
}

impl ProjectView {
    pub fn new(project: &Project, urls: &MediaUrls) -> Self {
        Self {
            id: project.id,
            title: project.title.clone(),
            description: project.description.clone(),
            technologies: project.technology_tags(),
            start_date: project.start_date,
            end_date: project.end_date,
            github_url: project.github_url.clone(),
            live_url: project.live_url.clone(),
            image_url: urls.url(&project.image),
            featured: project.featured,
            created_at: project.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BookView {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub rating: Option<i32>,
    pub read_date: Option<NaiveDate>,
    pub cover_image_url: Option<String>,
    pub project_id: Option<Uuid>,
}

impl BookView {
    pub fn new(book: &Book, urls: &MediaUrls) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
            author: book.author.clone(),
            rating: book.rating,
            read_date: book.read_date,
            cover_image_url: urls.url(&book.cover_image),
            project_id: book.project_id,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PhotoView {
    pub id: Uuid,
    pub title: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl PhotoView {
    pub fn new(photo: &Photo, urls: &MediaUrls) -> Self {
        Self {
            id: photo.id,
            title: photo.title.clone(),
            image_url: urls.url(&photo.image),
            created_at: photo.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub published_date: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
}

impl From<&Post> for PostView {
    fn from(p: &Post) -> Self {
        Self {
            id: p.id,
            title: p.title.clone(),
            slug: p.slug.clone(),
            excerpt: p.excerpt.clone(),
            content: p.content.clone(),
            published_date: p.published_date,
            tags: p.tags.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SpokenLanguageView {
    pub name: String,
    pub proficiency_level: SpokenProficiency,
    pub is_native: bool,
    pub flag_emoji: String,
}

impl From<&SpokenLanguage> for SpokenLanguageView {
    fn from(l: &SpokenLanguage) -> Self {
        Self {
            name: l.name.clone(),
            proficiency_level: l.proficiency_level,
            is_native: l.is_native,
            flag_emoji: l.flag_emoji.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgrammingLanguageView {
    pub name: String,
    pub proficiency: LanguageProficiency,
    pub years_experience: Option<i32>,
}

impl From<&ProgrammingLanguage> for ProgrammingLanguageView {
    fn from(l: &ProgrammingLanguage) -> Self {
        Self {
            name: l.name.clone(),
            proficiency: l.proficiency,
            years_experience: l.years_experience,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InitiativeView {
    pub title: String,
    pub description: String,
    pub url: Option<String>,
}

impl From<&Initiative> for InitiativeView {
    fn from(i: &Initiative) -> Self {
        Self {
            title: i.title.clone(),
            description: i.description.clone(),
            url: i.url.clone(),
        }
    }
}
