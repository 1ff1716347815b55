//! Read-only page contexts. Every section is loaded independently; a failed
//! query logs a warning and leaves that section empty.

use chrono::Utc;
use serde::Serialize;
use tracing::warn;

use crate::catalog::views::{
    BookView, CountryView, HobbyView, InitiativeView, PhotoView, PostView,
    ProgrammingLanguageView, ProjectView, SkillView, SpokenLanguageView,
};
use crate::contributions::ContributionWeek;
use crate::media::MediaUrls;
use crate::models::{Skill, SkillCategory};
use crate::state::AppState;
use crate::store::StoreResult;

/// Label for skills stored without a category.
pub const UNCATEGORIZED: &str = "Other";

#[derive(Debug, Serialize)]
pub struct SkillGroup {
    pub category: String,
    pub skills: Vec<SkillView>,
}

#[derive(Debug, Serialize)]
pub struct HomePage {
    pub timestamp: i64,
    pub countries_visited: Vec<CountryView>,
    pub posts: Vec<PostView>,
    pub hobbies: Vec<HobbyView>,
    pub initiatives: Vec<InitiativeView>,
    pub github_weeks: Vec<ContributionWeek>,
    pub github_total: u64,
}

#[derive(Debug, Serialize)]
pub struct SkillsPage {
    pub timestamp: i64,
    pub skills: Vec<SkillView>,
    pub skill_groups: Vec<SkillGroup>,
    pub spoken_languages: Vec<SpokenLanguageView>,
    pub programming_languages: Vec<ProgrammingLanguageView>,
}

#[derive(Debug, Serialize)]
pub struct LibraryPage {
    pub timestamp: i64,
    pub projects: Vec<ProjectView>,
    pub books: Vec<BookView>,
    pub project_photos: Vec<ProjectView>,
    pub photos: Vec<PhotoView>,
    pub posts: Vec<PostView>,
}

fn section<T>(name: &str, result: StoreResult<Vec<T>>) -> Vec<T> {
    match result {
        Ok(rows) => rows,
        Err(e) => {
            warn!("Page section '{name}' unavailable: {e}");
            Vec::new()
        }
    }
}

/// Groups skills by category: the four known categories first in their
/// fixed order, then any other category in the order it was first seen,
/// then uncategorized skills.
pub fn group_skills(skills: &[Skill], urls: &MediaUrls) -> Vec<SkillGroup> {
    let mut groups: Vec<SkillGroup> = Vec::new();
    for skill in skills {
        let label = match skill.category.trim() {
            "" => UNCATEGORIZED,
            other => other,
        };
        let view = SkillView::new(skill, urls);
        match groups.iter_mut().find(|g| g.category == label) {
            Some(group) => group.skills.push(view),
            None => groups.push(SkillGroup {
                category: label.to_string(),
                skills: vec![view],
            }),
        }
    }

    let rank = |category: &str| {
        if category == UNCATEGORIZED {
            return SkillCategory::ORDER.len() + 1;
        }
        SkillCategory::ORDER
            .iter()
            .position(|c| c.as_str() == category)
            .unwrap_or(SkillCategory::ORDER.len())
    };
    // Stable: leftovers keep encounter order.
    groups.sort_by_key(|g| rank(&g.category));
    groups
}

pub async fn home_page(state: &AppState) -> HomePage {
    let store = state.store.as_ref();
    let countries = store.list_countries().await;
    let posts = store.list_published_posts().await;
    let hobbies = store.list_hobbies().await;
    let initiatives = store.list_initiatives().await;
    let contributions = state.contributions.get_contributions().await;

    HomePage {
        timestamp: Utc::now().timestamp(),
        countries_visited: section("countries", countries)
            .iter()
            .map(CountryView::from)
            .collect(),
        posts: section("posts", posts).iter().map(PostView::from).collect(),
        hobbies: section("hobbies", hobbies).iter().map(HobbyView::from).collect(),
        initiatives: section("initiatives", initiatives)
            .iter()
            .map(InitiativeView::from)
            .collect(),
        github_weeks: contributions.weeks,
        github_total: contributions.total,
    }
}

pub async fn skills_page(state: &AppState) -> SkillsPage {
    let store = state.store.as_ref();
    let skills = section("skills", store.list_skills().await);
    let spoken = store.list_spoken_languages().await;
    let programming = store.list_programming_languages().await;

    SkillsPage {
        timestamp: Utc::now().timestamp(),
        skill_groups: group_skills(&skills, &state.media_urls),
        skills: skills
            .iter()
            .map(|s| SkillView::new(s, &state.media_urls))
            .collect(),
        spoken_languages: section("spoken_languages", spoken)
            .iter()
            .map(SpokenLanguageView::from)
            .collect(),
        programming_languages: section("programming_languages", programming)
            .iter()
            .map(ProgrammingLanguageView::from)
            .collect(),
    }
}

pub async fn library_page(state: &AppState) -> LibraryPage {
    let store = state.store.as_ref();
    let urls = &state.media_urls;
    let projects = section("projects", store.list_projects().await);
    let books = store.list_books().await;
    let photos = store.list_photos().await;
    let posts = store.list_published_posts().await;

    LibraryPage {
        timestamp: Utc::now().timestamp(),
        project_photos: projects
            .iter()
            .filter(|p| p.has_image())
            .map(|p| ProjectView::new(p, urls))
            .collect(),
        projects: projects.iter().map(|p| ProjectView::new(p, urls)).collect(),
        books: section("books", books)
            .iter()
            .map(|b| BookView::new(b, urls))
            .collect(),
        photos: section("photos", photos)
            .iter()
            .map(|p| PhotoView::new(p, urls))
            .collect(),
        posts: section("posts", posts).iter().map(PostView::from).collect(),
    }
}
