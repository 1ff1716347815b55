use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::AdminSession;
use crate::catalog::create::{
    create_book, create_country, create_hobby, create_photo, create_project, create_skill,
};
use crate::catalog::pages::{self, HomePage, LibraryPage, SkillGroup, SkillsPage};
use crate::catalog::payload::Payload;
use crate::catalog::views::{
    BookView, CountryView, HobbyView, ListResponse, PhotoView, PostView, ProjectView, SkillView,
};
use crate::contributions::Contributions;
use crate::errors::{AppError, AppResult};
use crate::state::AppState;

/// `{"success": true, "message": "<Label> created successfully", "<entity>": {...}}`
fn created<T: Serialize>(entity: &str, label: &str, record: T) -> AppResult<Json<Value>> {
    let record = serde_json::to_value(record).map_err(anyhow::Error::from)?;
    let mut body = Map::new();
    body.insert("success".into(), Value::Bool(true));
    body.insert(
        "message".into(),
        Value::String(format!("{label} created successfully")),
    );
    body.insert(entity.into(), record);
    Ok(Json(Value::Object(body)))
}

/// POST /api/hobbies/create/
pub async fn handle_create_hobby(
    State(state): State<AppState>,
    _admin: AdminSession,
    payload: Payload,
) -> AppResult<Json<Value>> {
    let hobby = create_hobby(&state, &payload).await?;
    created("hobby", "Hobby", HobbyView::from(&hobby))
}

/// POST /api/countries/create/
pub async fn handle_create_country(
    State(state): State<AppState>,
    _admin: AdminSession,
    payload: Payload,
) -> AppResult<Json<Value>> {
    let country = create_country(&state, &payload).await?;
    created("country", "Country", CountryView::from(&country))
}

/// POST /api/skills/create/
pub async fn handle_create_skill(
    State(state): State<AppState>,
    _admin: AdminSession,
    payload: Payload,
) -> AppResult<Json<Value>> {
    let skill = create_skill(&state, &payload).await?;
    created("skill", "Skill", SkillView::new(&skill, &state.media_urls))
}

/// POST /api/projects/create/
pub async fn handle_create_project(
    State(state): State<AppState>,
    _admin: AdminSession,
    payload: Payload,
) -> AppResult<Json<Value>> {
    let project = create_project(&state, &payload).await?;
    created("project", "Project", ProjectView::new(&project, &state.media_urls))
}

/// POST /api/books/create/
pub async fn handle_create_book(
    State(state): State<AppState>,
    _admin: AdminSession,
    payload: Payload,
) -> AppResult<Json<Value>> {
    let book = create_book(&state, &payload).await?;
    created("book", "Book", BookView::new(&book, &state.media_urls))
}

/// POST /api/photos/create/
pub async fn handle_create_photo(
    State(state): State<AppState>,
    _admin: AdminSession,
    payload: Payload,
) -> AppResult<Json<Value>> {
    let photo = create_photo(&state, &payload).await?;
    created("photo", "Photo", PhotoView::new(&photo, &state.media_urls))
}

/// DELETE /api/projects/:id/
pub async fn handle_delete_project(
    State(state): State<AppState>,
    admin: AdminSession,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    let project = state
        .store
        .get_project(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Project {id} not found")))?;
    if !state.store.delete_project(id).await? {
        return Err(AppError::NotFound(format!("Project {id} not found")));
    }
    if project.has_image() {
        if let Err(e) = state.media.delete(&project.image).await {
            warn!("Project image left behind: {e}");
        }
    }
    info!("Project '{}' deleted by {}", project.title, admin.username);

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Project deleted successfully",
    })))
}

/// GET /api/hobbies/
pub async fn handle_list_hobbies(
    State(state): State<AppState>,
) -> AppResult<Json<ListResponse<HobbyView>>> {
    let rows = state.store.list_hobbies().await?;
    Ok(Json(rows.iter().map(HobbyView::from).collect::<Vec<_>>().into()))
}

/// GET /api/countries/
pub async fn handle_list_countries(
    State(state): State<AppState>,
) -> AppResult<Json<ListResponse<CountryView>>> {
    let rows = state.store.list_countries().await?;
    Ok(Json(rows.iter().map(CountryView::from).collect::<Vec<_>>().into()))
}

/// GET /api/skills/
pub async fn handle_list_skills(
    State(state): State<AppState>,
) -> AppResult<Json<ListResponse<SkillView>>> {
    let rows = state.store.list_skills().await?;
    let views: Vec<_> = rows
        .iter()
        .map(|s| SkillView::new(s, &state.media_urls))
        .collect();
    Ok(Json(views.into()))
}

/// GET /api/skills/grouped/
pub async fn handle_list_skill_groups(
    State(state): State<AppState>,
) -> AppResult<Json<ListResponse<SkillGroup>>> {
    let rows = state.store.list_skills().await?;
    Ok(Json(pages::group_skills(&rows, &state.media_urls).into()))
}

/// GET /api/projects/
pub async fn handle_list_projects(
    State(state): State<AppState>,
) -> AppResult<Json<ListResponse<ProjectView>>> {
    let rows = state.store.list_projects().await?;
    let views: Vec<_> = rows
        .iter()
        .map(|p| ProjectView::new(p, &state.media_urls))
        .collect();
    Ok(Json(views.into()))
}

/// GET /api/books/
pub async fn handle_list_books(
    State(state): State<AppState>,
) -> AppResult<Json<ListResponse<BookView>>> {
    let rows = state.store.list_books().await?;
    let views: Vec<_> = rows
        .iter()
        .map(|b| BookView::new(b, &state.media_urls))
        .collect();
    Ok(Json(views.into()))
}

/// GET /api/photos/
pub async fn handle_list_photos(
    State(state): State<AppState>,
) -> AppResult<Json<ListResponse<PhotoView>>> {
    let rows = state.store.list_photos().await?;
    let views: Vec<_> = rows
        .iter()
        .map(|p| PhotoView::new(p, &state.media_urls))
        .collect();
    Ok(Json(views.into()))
}

/// GET /api/posts/
pub async fn handle_list_posts(
    State(state): State<AppState>,
) -> AppResult<Json<ListResponse<PostView>>> {
    let rows = state.store.list_published_posts().await?;
    Ok(Json(rows.iter().map(PostView::from).collect::<Vec<_>>().into()))
}

/// GET /api/contributions/
pub async fn handle_contributions(State(state): State<AppState>) -> Json<Contributions> {
    Json(state.contributions.get_contributions().await)
}

/// GET /api/pages/home/
pub async fn handle_home_page(State(state): State<AppState>) -> Json<HomePage> {
    Json(pages::home_page(&state).await)
}

/// GET /api/pages/skills/
pub async fn handle_skills_page(State(state): State<AppState>) -> Json<SkillsPage> {
    Json(pages::skills_page(&state).await)
}

/// GET /api/pages/library/
pub async fn handle_library_page(State(state): State<AppState>) -> Json<LibraryPage> {
    Json(pages::library_page(&state).await)
}
