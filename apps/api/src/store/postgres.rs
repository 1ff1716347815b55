use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::{
    Book, Country, Hobby, Initiative, NewBook, NewCountry, NewHobby, NewPhoto, NewProject,
    NewSkill, Photo, Post, ProgrammingLanguage, Project, Skill, SpokenLanguage,
};
use crate::store::{RecordStore, StoreError, StoreResult, RATING_OUT_OF_RANGE};

/// PostgreSQL-backed record store.
#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Maps a unique-constraint violation to a conflict with the given message.
fn conflict_or(err: sqlx::Error, message: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict(message.to_string())
        }
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn list_countries(&self) -> StoreResult<Vec<Country>> {
        Ok(
            sqlx::query_as::<_, Country>("SELECT * FROM countries ORDER BY name ASC")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn country_exists(&self, name: &str) -> StoreResult<bool> {
        Ok(
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM countries WHERE name = $1)")
                .bind(name)
                .fetch_one(&self.pool)
                .await?,
        )
    }

    async fn insert_country(&self, country: NewCountry) -> StoreResult<Country> {
        sqlx::query_as::<_, Country>(
            r#"
            INSERT INTO countries (id, name, code, flag_emoji, thoughts)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&country.name)
        .bind(&country.code)
        .bind(&country.flag_emoji)
        .bind(&country.thoughts)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_or(e, "Country with this name already exists"))
    }

    async fn list_hobbies(&self) -> StoreResult<Vec<Hobby>> {
        Ok(
            sqlx::query_as::<_, Hobby>("SELECT * FROM hobbies ORDER BY category ASC, name ASC")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn hobby_exists(&self, name: &str) -> StoreResult<bool> {
        Ok(
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM hobbies WHERE name = $1)")
                .bind(name)
                .fetch_one(&self.pool)
                .await?,
        )
    }

    async fn insert_hobby(&self, hobby: NewHobby) -> StoreResult<Hobby> {
        sqlx::query_as::<_, Hobby>(
            r#"
            INSERT INTO hobbies (id, name, reason, category, social, icon)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&hobby.name)
        .bind(&hobby.reason)
        .bind(&hobby.category)
        .bind(hobby.social.as_str())
        .bind(&hobby.icon)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_or(e, "Hobby with this name already exists"))
    }

    async fn list_skills(&self) -> StoreResult<Vec<Skill>> {
        Ok(
            sqlx::query_as::<_, Skill>("SELECT * FROM skills ORDER BY category ASC, name ASC")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn skill_exists(&self, name: &str) -> StoreResult<bool> {
        Ok(sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM skills WHERE lower(name) = lower($1))",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn insert_skill(&self, skill: NewSkill) -> StoreResult<Skill> {
        sqlx::query_as::<_, Skill>(
            r#"
            INSERT INTO skills (id, name, category, description, icon)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&skill.name)
        .bind(skill.category.map(|c| c.as_str()).unwrap_or(""))
        .bind(&skill.description)
        .bind(skill.icon.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_or(e, "Skill with this name already exists"))
    }

    async fn list_projects(&self) -> StoreResult<Vec<Project>> {
        Ok(
            sqlx::query_as::<_, Project>("SELECT * FROM projects ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn get_project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        Ok(
            sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn insert_project(&self, project: NewProject) -> StoreResult<Project> {
        Ok(sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects
                (id, title, description, technologies, start_date, end_date,
                 github_url, live_url, image, featured)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&project.title)
        .bind(&project.description)
        .bind(&project.technologies)
        .bind(project.start_date)
        .bind(project.end_date)
        .bind(project.github_url.as_deref())
        .bind(project.live_url.as_deref())
        .bind(&project.image)
        .bind(project.featured)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn delete_project(&self, id: Uuid) -> StoreResult<bool> {
        // books.project_id is ON DELETE SET NULL.
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        let deleted = result.rows_affected() > 0;
        if deleted {
            info!("Deleted project {id}");
        }
        Ok(deleted)
    }

    async fn list_books(&self) -> StoreResult<Vec<Book>> {
        Ok(sqlx::query_as::<_, Book>(
            "SELECT * FROM books ORDER BY read_date DESC NULLS LAST, created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn insert_book(&self, book: NewBook) -> StoreResult<Book> {
        if !book.rating_in_range() {
            return Err(StoreError::Invalid(RATING_OUT_OF_RANGE.to_string()));
        }
        Ok(sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (id, title, author, rating, read_date, cover_image, project_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.rating)
        .bind(book.read_date)
        .bind(&book.cover_image)
        .bind(book.project_id)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn list_photos(&self) -> StoreResult<Vec<Photo>> {
        Ok(
            sqlx::query_as::<_, Photo>("SELECT * FROM photos ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn insert_photo(&self, photo: NewPhoto) -> StoreResult<Photo> {
        Ok(sqlx::query_as::<_, Photo>(
            "INSERT INTO photos (id, title, image) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&photo.title)
        .bind(&photo.image)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn list_published_posts(&self) -> StoreResult<Vec<Post>> {
        Ok(sqlx::query_as::<_, Post>(
            r#"
            SELECT * FROM posts
            WHERE status = 'published'
            ORDER BY published_date DESC NULLS LAST, created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn save_post(&self, mut post: Post) -> StoreResult<Post> {
        post.prepare_save(Utc::now());
        // COALESCE keeps a publish date written by an earlier save.
        sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts
                (id, title, slug, content, excerpt, status, published_date, tags,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (id) DO UPDATE SET
                title = EXCLUDED.title,
                slug = EXCLUDED.slug,
                content = EXCLUDED.content,
                excerpt = EXCLUDED.excerpt,
                status = EXCLUDED.status,
                published_date = COALESCE(posts.published_date, EXCLUDED.published_date),
                tags = EXCLUDED.tags,
                updated_at = EXCLUDED.updated_at
            RETURNING *
            "#,
        )
        .bind(post.id)
        .bind(&post.title)
        .bind(&post.slug)
        .bind(&post.content)
        .bind(&post.excerpt)
        .bind(post.status.as_str())
        .bind(post.published_date)
        .bind(&post.tags)
        .bind(post.created_at)
        .bind(post.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_or(e, "Post with this slug already exists"))
    }

    async fn list_spoken_languages(&self) -> StoreResult<Vec<SpokenLanguage>> {
        Ok(sqlx::query_as::<_, SpokenLanguage>(
            "SELECT * FROM spoken_languages ORDER BY is_native DESC, name ASC",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn list_programming_languages(&self) -> StoreResult<Vec<ProgrammingLanguage>> {
        Ok(sqlx::query_as::<_, ProgrammingLanguage>(
            "SELECT * FROM programming_languages ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn list_initiatives(&self) -> StoreResult<Vec<Initiative>> {
        Ok(
            sqlx::query_as::<_, Initiative>("SELECT * FROM initiatives ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?,
        )
    }
}
