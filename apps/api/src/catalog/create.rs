//! Validation and creation for admin-submitted records.
//!
//! Each `create_*` checks required fields first, then field formats, then
//! uniqueness, and only then touches the media store. A blob uploaded for a
//! record that fails to insert is deleted again.

use std::future::Future;

use chrono::NaiveDate;
use tracing::{info, warn};
use uuid::Uuid;

use crate::catalog::payload::{Payload, UploadedFile};
use crate::errors::{AppError, AppResult};
use crate::media::{generate_key, MediaPrefix, MediaStore};
use crate::models::library::{MAX_RATING, MIN_RATING};
use crate::models::profile::{COUNTRY_CODE_MAX, FLAG_EMOJI_MAX, THOUGHTS_MAX};
use crate::models::{
    truncate_chars, Book, Country, Hobby, NewBook, NewCountry, NewHobby, NewPhoto, NewProject,
    NewSkill, Photo, Project, Skill, SkillCategory, Social,
};
use crate::state::AppState;
use crate::store::{StoreResult, RATING_OUT_OF_RANGE};

pub async fn create_hobby(state: &AppState, payload: &Payload) -> AppResult<Hobby> {
    let name = payload.require("name", "Name")?;
    let social = match payload.text("social") {
        Some(value) => Social::parse(&value)
            .ok_or_else(|| AppError::bad_request("Social must be one of yes, no, maybe"))?,
        None => Social::default(),
    };

    if state.store.hobby_exists(&name).await? {
        return Err(AppError::bad_request("Hobby with this name already exists"));
    }

    let hobby = state
        .store
        .insert_hobby(NewHobby {
            name,
            reason: payload.text_or_default("reason"),
            category: payload.text_or_default("category"),
            social,
            icon: payload.text_or_default("icon"),
        })
        .await?;
    info!("Created hobby '{}'", hobby.name);
    Ok(hobby)
}

pub async fn create_country(state: &AppState, payload: &Payload) -> AppResult<Country> {
    let name = payload.require("name", "Name")?;

    if state.store.country_exists(&name).await? {
        return Err(AppError::bad_request("Country with this name already exists"));
    }

    let country = state
        .store
        .insert_country(NewCountry {
            name,
            code: truncate_chars(&payload.text_or_default("code").to_uppercase(), COUNTRY_CODE_MAX),
            flag_emoji: truncate_chars(&payload.text_or_default("flag_emoji"), FLAG_EMOJI_MAX),
            thoughts: truncate_chars(&payload.text_or_default("thoughts"), THOUGHTS_MAX),
        })
        .await?;
    info!("Created country '{}'", country.name);
    Ok(country)
}

pub async fn create_skill(state: &AppState, payload: &Payload) -> AppResult<Skill> {
    let name = payload.require("name", "Name")?;
    let category = match payload.text("category") {
        Some(value) => Some(SkillCategory::parse(&value).ok_or_else(|| {
            AppError::bad_request(
                "Category must be one of Programming Languages, Soft, Hard, Spoken Languages",
            )
        })?),
        None => None,
    };

    if state.store.skill_exists(&name).await? {
        return Err(AppError::bad_request("Skill with this name already exists"));
    }

    let icon = match payload.file("icon") {
        Some(file) => Some(upload(state.media.as_ref(), MediaPrefix::SkillIcons, file).await?),
        None => None,
    };

    let skill = insert_or_discard(
        state.media.as_ref(),
        icon.as_deref(),
        state.store.insert_skill(NewSkill {
            name,
            category,
            description: payload.text_or_default("description"),
            icon: icon.clone(),
        }),
    )
    .await?;
    info!("Created skill '{}'", skill.name);
    Ok(skill)
}

pub async fn create_project(state: &AppState, payload: &Payload) -> AppResult<Project> {
    let title = payload.require("title", "Title")?;
    let description = payload.require("description", "Description")?;
    let image = payload.require_file("image", "Image")?;
    let start_date = parse_date(payload, "start_date")?;
    let end_date = parse_date(payload, "end_date")?;
    if let (Some(start), Some(end)) = (start_date, end_date) {
        if end < start {
            return Err(AppError::bad_request("End date cannot be before start date"));
        }
    }

    let key = upload(state.media.as_ref(), MediaPrefix::Projects, image).await?;
    let project = insert_or_discard(
        state.media.as_ref(),
        Some(&key),
        state.store.insert_project(NewProject {
            title,
            description,
            technologies: payload.text_or_default("technologies"),
            start_date,
            end_date,
            github_url: payload.text("github_url"),
            live_url: payload.text("live_url"),
            image: key.clone(),
            featured: payload.flag("featured"),
        }),
    )
    .await?;
    info!("Created project '{}'", project.title);
    Ok(project)
}

pub async fn create_book(state: &AppState, payload: &Payload) -> AppResult<Book> {
    let title = payload.require("title", "Title")?;
    let author = payload.require("author", "Author")?;
    let cover = payload.require_file("cover_image", "Cover image")?;
    let rating = parse_rating(payload)?;
    let read_date = parse_date(payload, "read_date")?;
    let project_id = match payload.text("project_id").or_else(|| payload.text("project")) {
        Some(raw) => {
            let id = Uuid::parse_str(&raw)
                .map_err(|_| AppError::bad_request("Project id is not a valid id"))?;
            if state.store.get_project(id).await?.is_none() {
                return Err(AppError::bad_request("Project not found"));
            }
            Some(id)
        }
        None => None,
    };

    let key = upload(state.media.as_ref(), MediaPrefix::Books, cover).await?;
    let book = insert_or_discard(
        state.media.as_ref(),
        Some(&key),
        state.store.insert_book(NewBook {
            title,
            author,
            rating,
            read_date,
            cover_image: key.clone(),
            project_id,
        }),
    )
    .await?;
    info!("Created book '{}'", book.title);
    Ok(book)
}

pub async fn create_photo(state: &AppState, payload: &Payload) -> AppResult<Photo> {
    let title = payload.require("title", "Title")?;
    let image = payload.require_file("image", "Image")?;

    let key = upload(state.media.as_ref(), MediaPrefix::Photos, image).await?;
    let photo = insert_or_discard(
        state.media.as_ref(),
        Some(&key),
        state.store.insert_photo(NewPhoto {
            title,
            image: key.clone(),
        }),
    )
    .await?;
    info!("Created photo '{}'", photo.title);
    Ok(photo)
}

/// `YYYY-MM-DD`; absent is `None`.
fn parse_date(payload: &Payload, field: &str) -> AppResult<Option<NaiveDate>> {
    payload
        .text(field)
        .map(|raw| {
            NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| {
                AppError::bad_request(format!("Invalid {field}; expected YYYY-MM-DD"))
            })
        })
        .transpose()
}

fn parse_rating(payload: &Payload) -> AppResult<Option<i32>> {
    let Some(raw) = payload.text("rating") else {
        return Ok(None);
    };
    let rating: i32 = raw
        .parse()
        .map_err(|_| AppError::bad_request(RATING_OUT_OF_RANGE))?;
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(AppError::bad_request(RATING_OUT_OF_RANGE));
    }
    Ok(Some(rating))
}

async fn upload(media: &dyn MediaStore, prefix: MediaPrefix, file: &UploadedFile) -> AppResult<String> {
    let key = generate_key(prefix, file.filename.as_deref());
    media
        .put(&key, file.bytes.clone(), &file.content_type)
        .await?;
    Ok(key)
}

/// Runs the insert; on failure removes the blob uploaded for it.
async fn insert_or_discard<T>(
    media: &dyn MediaStore,
    key: Option<&str>,
    insert: impl Future<Output = StoreResult<T>>,
) -> AppResult<T> {
    match insert.await {
        Ok(record) => Ok(record),
        Err(err) => {
            if let Some(key) = key {
                if let Err(e) = media.delete(key).await {
                    warn!("Failed to discard orphaned upload: {e}");
                }
            }
            Err(err.into())
        }
    }
}
