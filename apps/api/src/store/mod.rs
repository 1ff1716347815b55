//! Record Store: the persistence boundary for every portfolio entity.
//!
//! Handlers only create and read through this trait. Production uses
//! [`PgRecordStore`]; tests use the in-memory store.

#[cfg(test)]
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{
    Book, Country, Hobby, Initiative, NewBook, NewCountry, NewHobby, NewPhoto, NewProject,
    NewSkill, Photo, Post, ProgrammingLanguage, Project, Skill, SpokenLanguage,
};

pub use postgres::PgRecordStore;

pub const RATING_OUT_OF_RANGE: &str = "Rating must be between 1 and 5";

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("{0}")]
    Conflict(String),

    /// The record violates a persistence-level rule.
    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) | StoreError::Invalid(msg) => AppError::BadRequest(msg),
            StoreError::Database(e) => AppError::Database(e),
        }
    }
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn list_countries(&self) -> StoreResult<Vec<Country>>;
    async fn country_exists(&self, name: &str) -> StoreResult<bool>;
    async fn insert_country(&self, country: NewCountry) -> StoreResult<Country>;

    async fn list_hobbies(&self) -> StoreResult<Vec<Hobby>>;
    async fn hobby_exists(&self, name: &str) -> StoreResult<bool>;
    async fn insert_hobby(&self, hobby: NewHobby) -> StoreResult<Hobby>;

    async fn list_skills(&self) -> StoreResult<Vec<Skill>>;
    /// Case-insensitive.
    async fn skill_exists(&self, name: &str) -> StoreResult<bool>;
    async fn insert_skill(&self, skill: NewSkill) -> StoreResult<Skill>;

    async fn list_projects(&self) -> StoreResult<Vec<Project>>;
    async fn get_project(&self, id: Uuid) -> StoreResult<Option<Project>>;
    async fn insert_project(&self, project: NewProject) -> StoreResult<Project>;
    /// Deletes the project and clears `project_id` on books that referenced it.
    /// Returns false when no project had that id.
    async fn delete_project(&self, id: Uuid) -> StoreResult<bool>;

    async fn list_books(&self) -> StoreResult<Vec<Book>>;
    /// Rejects ratings outside 1..=5 with [`StoreError::Invalid`].
    async fn insert_book(&self, book: NewBook) -> StoreResult<Book>;

    async fn list_photos(&self) -> StoreResult<Vec<Photo>>;
    async fn insert_photo(&self, photo: NewPhoto) -> StoreResult<Photo>;

    async fn list_published_posts(&self) -> StoreResult<Vec<Post>>;
    /// Inserts or updates by id. An already stored publish date always wins.
    async fn save_post(&self, post: Post) -> StoreResult<Post>;

    async fn list_spoken_languages(&self) -> StoreResult<Vec<SpokenLanguage>>;
    async fn list_programming_languages(&self) -> StoreResult<Vec<ProgrammingLanguage>>;
    async fn list_initiatives(&self) -> StoreResult<Vec<Initiative>>;
}
