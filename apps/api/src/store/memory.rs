//! In-process record store used by handler and router tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::models::{
    Book, Country, Hobby, Initiative, NewBook, NewCountry, NewHobby, NewPhoto, NewProject,
    NewSkill, Photo, Post, PostStatus, ProgrammingLanguage, Project, Skill, SpokenLanguage,
};
use crate::store::{RecordStore, StoreError, StoreResult, RATING_OUT_OF_RANGE};

#[derive(Default)]
struct Tables {
    countries: Vec<Country>,
    hobbies: Vec<Hobby>,
    skills: Vec<Skill>,
    projects: Vec<Project>,
    books: Vec<Book>,
    photos: Vec<Photo>,
    posts: Vec<Post>,
    spoken_languages: Vec<SpokenLanguage>,
    programming_languages: Vec<ProgrammingLanguage>,
    initiatives: Vec<Initiative>,
}

#[derive(Default)]
pub struct MemoryRecordStore {
    tables: Mutex<Tables>,
    /// When set, every list query fails as if the database were unreachable.
    fail_reads: AtomicBool,
    /// When set, every insert fails after validation.
    fail_writes: AtomicBool,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn counts(&self) -> RowCounts {
        let t = self.tables.lock().unwrap();
        RowCounts {
            countries: t.countries.len(),
            hobbies: t.hobbies.len(),
            skills: t.skills.len(),
            projects: t.projects.len(),
            books: t.books.len(),
            photos: t.photos.len(),
        }
    }

    pub fn push_spoken_language(&self, language: SpokenLanguage) {
        self.tables.lock().unwrap().spoken_languages.push(language);
    }

    pub fn push_initiative(&self, initiative: Initiative) {
        self.tables.lock().unwrap().initiatives.push(initiative);
    }

    fn check_writes(&self) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> StoreResult<T> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(f(&self.tables.lock().unwrap()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowCounts {
    pub countries: usize,
    pub hobbies: usize,
    pub skills: usize,
    pub projects: usize,
    pub books: usize,
    pub photos: usize,
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn list_countries(&self) -> StoreResult<Vec<Country>> {
        self.read(|t| {
            let mut rows = t.countries.clone();
            rows.sort_by(|a, b| a.name.cmp(&b.name));
            rows
        })
    }

    async fn country_exists(&self, name: &str) -> StoreResult<bool> {
        Ok(self.tables.lock().unwrap().countries.iter().any(|c| c.name == name))
    }

    async fn insert_country(&self, country: NewCountry) -> StoreResult<Country> {
        self.check_writes()?;
        let mut t = self.tables.lock().unwrap();
        if t.countries.iter().any(|c| c.name == country.name) {
            return Err(StoreError::Conflict(
                "Country with this name already exists".to_string(),
            ));
        }
        let row = Country {
            id: Uuid::new_v4(),
            name: country.name,
            code: country.code,
            flag_emoji: country.flag_emoji,
            thoughts: country.thoughts,
            created_at: Utc::now(),
        };
        t.countries.push(row.clone());
        Ok(row)
    }

    async fn list_hobbies(&self) -> StoreResult<Vec<Hobby>> {
        self.read(|t| {
            let mut rows = t.hobbies.clone();
            rows.sort_by(|a, b| (&a.category, &a.name).cmp(&(&b.category, &b.name)));
            rows
        })
    }

    async fn hobby_exists(&self, name: &str) -> StoreResult<bool> {
        Ok(self.tables.lock().unwrap().hobbies.iter().any(|h| h.name == name))
    }

    async fn insert_hobby(&self, hobby: NewHobby) -> StoreResult<Hobby> {
        self.check_writes()?;
        let mut t = self.tables.lock().unwrap();
        if t.hobbies.iter().any(|h| h.name == hobby.name) {
            return Err(StoreError::Conflict(
                "Hobby with this name already exists".to_string(),
            ));
        }
        let row = Hobby {
            id: Uuid::new_v4(),
            name: hobby.name,
            reason: hobby.reason,
            category: hobby.category,
            social: hobby.social,
            icon: hobby.icon,
            created_at: Utc::now(),
        };
        t.hobbies.push(row.clone());
        Ok(row)
    }

    async fn list_skills(&self) -> StoreResult<Vec<Skill>> {
        self.read(|t| {
            let mut rows = t.skills.clone();
            rows.sort_by(|a, b| (&a.category, &a.name).cmp(&(&b.category, &b.name)));
            rows
        })
    }

    async fn skill_exists(&self, name: &str) -> StoreResult<bool> {
        let name = name.to_lowercase();
        Ok(self
            .tables
            .lock()
            .unwrap()
            .skills
            .iter()
            .any(|s| s.name.to_lowercase() == name))
    }

    async fn insert_skill(&self, skill: NewSkill) -> StoreResult<Skill> {
        self.check_writes()?;
        let mut t = self.tables.lock().unwrap();
        let lowered = skill.name.to_lowercase();
        if t.skills.iter().any(|s| s.name.to_lowercase() == lowered) {
            return Err(StoreError::Conflict(
                "Skill with this name already exists".to_string(),
            ));
        }
        let row = Skill {
            id: Uuid::new_v4(),
            name: skill.name,
            category: skill.category.map(|c| c.as_str().to_string()).unwrap_or_default(),
            description: skill.description,
            icon: skill.icon,
            created_at: Utc::now(),
        };
        t.skills.push(row.clone());
        Ok(row)
    }

    async fn list_projects(&self) -> StoreResult<Vec<Project>> {
        self.read(|t| {
            let mut rows = t.projects.clone();
            rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            rows
        })
    }

    async fn get_project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .projects
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn insert_project(&self, project: NewProject) -> StoreResult<Project> {
        self.check_writes()?;
        let now = Utc::now();
        let row = Project {
            id: Uuid::new_v4(),
            title: project.title,
            description: project.description,
            technologies: project.technologies,
            start_date: project.start_date,
            end_date: project.end_date,
            github_url: project.github_url,
            live_url: project.live_url,
            image: project.image,
            featured: project.featured,
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().unwrap().projects.push(row.clone());
        Ok(row)
    }

    async fn delete_project(&self, id: Uuid) -> StoreResult<bool> {
        let mut t = self.tables.lock().unwrap();
        let before = t.projects.len();
        t.projects.retain(|p| p.id != id);
        if t.projects.len() == before {
            return Ok(false);
        }
        for book in t.books.iter_mut().filter(|b| b.project_id == Some(id)) {
            book.project_id = None;
        }
        Ok(true)
    }

    async fn list_books(&self) -> StoreResult<Vec<Book>> {
        self.read(|t| {
            let mut rows = t.books.clone();
            // read_date DESC NULLS LAST, then created_at DESC
            rows.sort_by(|a, b| match (a.read_date, b.read_date) {
                (Some(x), Some(y)) => y.cmp(&x).then(b.created_at.cmp(&a.created_at)),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => b.created_at.cmp(&a.created_at),
            });
            rows
        })
    }

    async fn insert_book(&self, book: NewBook) -> StoreResult<Book> {
        self.check_writes()?;
        if !book.rating_in_range() {
            return Err(StoreError::Invalid(RATING_OUT_OF_RANGE.to_string()));
        }
        let row = Book {
            id: Uuid::new_v4(),
            title: book.title,
            author: book.author,
            rating: book.rating,
            read_date: book.read_date,
            cover_image: book.cover_image,
            project_id: book.project_id,
            created_at: Utc::now(),
        };
        self.tables.lock().unwrap().books.push(row.clone());
        Ok(row)
    }

    async fn list_photos(&self) -> StoreResult<Vec<Photo>> {
        self.read(|t| {
            let mut rows = t.photos.clone();
            rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            rows
        })
    }

    async fn insert_photo(&self, photo: NewPhoto) -> StoreResult<Photo> {
        self.check_writes()?;
        let row = Photo {
            id: Uuid::new_v4(),
            title: photo.title,
            image: photo.image,
            created_at: Utc::now(),
        };
        self.tables.lock().unwrap().photos.push(row.clone());
        Ok(row)
    }

    async fn list_published_posts(&self) -> StoreResult<Vec<Post>> {
        self.read(|t| {
            let mut rows: Vec<Post> = t
                .posts
                .iter()
                .filter(|p| p.status == PostStatus::Published)
                .cloned()
                .collect();
            rows.sort_by(|a, b| {
                b.published_date
                    .cmp(&a.published_date)
                    .then(b.created_at.cmp(&a.created_at))
            });
            rows
        })
    }

    async fn save_post(&self, mut post: Post) -> StoreResult<Post> {
        post.prepare_save(Utc::now());
        let mut t = self.tables.lock().unwrap();
        if t.posts.iter().any(|p| p.slug == post.slug && p.id != post.id) {
            return Err(StoreError::Conflict(
                "Post with this slug already exists".to_string(),
            ));
        }
        match t.posts.iter_mut().find(|p| p.id == post.id) {
            Some(existing) => {
                let published_date = existing.published_date.or(post.published_date);
                *existing = Post {
                    published_date,
                    created_at: existing.created_at,
                    ..post
                };
                Ok(existing.clone())
            }
            None => {
                t.posts.push(post.clone());
                Ok(post)
            }
        }
    }

    async fn list_spoken_languages(&self) -> StoreResult<Vec<SpokenLanguage>> {
        self.read(|t| {
            let mut rows = t.spoken_languages.clone();
            rows.sort_by(|a, b| b.is_native.cmp(&a.is_native).then(a.name.cmp(&b.name)));
            rows
        })
    }

    async fn list_programming_languages(&self) -> StoreResult<Vec<ProgrammingLanguage>> {
        self.read(|t| {
            let mut rows = t.programming_languages.clone();
            rows.sort_by(|a, b| a.name.cmp(&b.name));
            rows
        })
    }

    async fn list_initiatives(&self) -> StoreResult<Vec<Initiative>> {
        self.read(|t| {
            let mut rows = t.initiatives.clone();
            rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            rows
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Social;

    fn new_book(rating: Option<i32>, project_id: Option<Uuid>) -> NewBook {
        NewBook {
            title: "SICP".into(),
            author: "Abelson".into(),
            rating,
            read_date: None,
            cover_image: "books/sicp.jpg".into(),
            project_id,
        }
    }

    #[tokio::test]
    async fn test_rating_out_of_range_rejected() {
        let store = MemoryRecordStore::new();
        let err = store.insert_book(new_book(Some(6), None)).await.unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));
        assert!(store.insert_book(new_book(Some(0), None)).await.is_err());
        assert_eq!(store.counts().books, 0);
        assert!(store.insert_book(new_book(Some(5), None)).await.is_ok());
        assert_eq!(store.counts().books, 1);
    }

    #[tokio::test]
    async fn test_delete_project_nullifies_books() {
        let store = MemoryRecordStore::new();
        let project = store
            .insert_project(NewProject {
                title: "Compiler".into(),
                description: "Toy".into(),
                technologies: String::new(),
                start_date: None,
                end_date: None,
                github_url: None,
                live_url: None,
                image: "projects/c.png".into(),
                featured: false,
            })
            .await
            .unwrap();
        store.insert_book(new_book(None, Some(project.id))).await.unwrap();

        assert!(store.delete_project(project.id).await.unwrap());
        let books = store.list_books().await.unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].project_id, None);
        assert!(!store.delete_project(project.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_skill_uniqueness_is_case_insensitive() {
        let store = MemoryRecordStore::new();
        store
            .insert_skill(NewSkill {
                name: "Rust".into(),
                category: None,
                description: String::new(),
                icon: None,
            })
            .await
            .unwrap();
        assert!(store.skill_exists("rust").await.unwrap());
        assert!(store.skill_exists("RUST").await.unwrap());
        assert!(!store.skill_exists("Go").await.unwrap());
    }

    #[tokio::test]
    async fn test_save_post_keeps_first_publish_date() {
        let store = MemoryRecordStore::new();
        let mut post = store.save_post(Post::draft("Hello", "v1")).await.unwrap();
        assert!(post.published_date.is_none());

        post.status = PostStatus::Published;
        let published = store.save_post(post.clone()).await.unwrap();
        let stamped = published.published_date.expect("publish date set");

        // A stale copy without the date must not clear or move it.
        let mut edited = post;
        edited.content = "v2".into();
        let saved = store.save_post(edited).await.unwrap();
        assert_eq!(saved.published_date, Some(stamped));
        assert_eq!(saved.content, "v2");
        assert_eq!(store.list_published_posts().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_hobbies_ordered_by_category_then_name() {
        let store = MemoryRecordStore::new();
        for (name, category) in [("Tennis", "Sports"), ("Chess", "Games"), ("Climbing", "Sports")] {
            store
                .insert_hobby(NewHobby {
                    name: name.into(),
                    reason: String::new(),
                    category: category.into(),
                    social: Social::Maybe,
                    icon: String::new(),
                })
                .await
                .unwrap();
        }
        let names: Vec<_> = store
            .list_hobbies()
            .await
            .unwrap()
            .into_iter()
            .map(|h| h.name)
            .collect();
        assert_eq!(names, vec!["Chess", "Climbing", "Tennis"]);
    }
}
