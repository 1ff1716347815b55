use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const COUNTRY_CODE_MAX: usize = 2;
pub const FLAG_EMOJI_MAX: usize = 10;
pub const THOUGHTS_MAX: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Country {
    pub id: Uuid,
    pub name: String,
    /// ISO 3166-1 alpha-2, uppercase.
    pub code: String,
    pub flag_emoji: String,
    /// One-word opinion.
    pub thoughts: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCountry {
    pub name: String,
    pub code: String,
    pub flag_emoji: String,
    pub thoughts: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Social {
    Yes,
    No,
    #[default]
    Maybe,
}

impl Social {
    pub fn as_str(self) -> &'static str {
        match self {
            Social::Yes => "yes",
            Social::No => "no",
            Social::Maybe => "maybe",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "yes" => Some(Social::Yes),
            "no" => Some(Social::No),
            "maybe" => Some(Social::Maybe),
            _ => None,
        }
    }
}

impl TryFrom<String> for Social {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Social::parse(&value).ok_or_else(|| format!("unknown social value '{value}'"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Hobby {
    pub id: Uuid,
    pub name: String,
    pub reason: String,
    pub category: String,
    #[sqlx(try_from = "String")]
    pub social: Social,
    pub icon: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewHobby {
    pub name: String,
    pub reason: String,
    pub category: String,
    pub social: Social,
    pub icon: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillCategory {
    #[serde(rename = "Programming Languages")]
    ProgrammingLanguages,
    Soft,
    Hard,
    #[serde(rename = "Spoken Languages")]
    SpokenLanguages,
}

impl SkillCategory {
    /// Preferred display order when grouping skills.
    pub const ORDER: [SkillCategory; 4] = [
        SkillCategory::ProgrammingLanguages,
        SkillCategory::Soft,
        SkillCategory::Hard,
        SkillCategory::SpokenLanguages,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SkillCategory::ProgrammingLanguages => "Programming Languages",
            SkillCategory::Soft => "Soft",
            SkillCategory::Hard => "Hard",
            SkillCategory::SpokenLanguages => "Spoken Languages",
        }
    }

    /// Case-insensitive match against the display names.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ORDER
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(value))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Skill {
    pub id: Uuid,
    pub name: String,
    /// A `SkillCategory` display name, or empty.
    pub category: String,
    pub description: String,
    /// Media key under `skills/icons/`.
    pub icon: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSkill {
    pub name: String,
    pub category: Option<SkillCategory>,
    pub description: String,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpokenProficiency {
    Native,
    Fluent,
    Advanced,
    Intermediate,
    Beginner,
}

impl TryFrom<String> for SpokenProficiency {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "native" => Ok(SpokenProficiency::Native),
            "fluent" => Ok(SpokenProficiency::Fluent),
            "advanced" => Ok(SpokenProficiency::Advanced),
            "intermediate" => Ok(SpokenProficiency::Intermediate),
            "beginner" => Ok(SpokenProficiency::Beginner),
            other => Err(format!("unknown proficiency level '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SpokenLanguage {
    pub id: Uuid,
    pub name: String,
    #[sqlx(try_from = "String")]
    pub proficiency_level: SpokenProficiency,
    pub is_native: bool,
    pub flag_emoji: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageProficiency {
    Expert,
    Advanced,
    Intermediate,
    Beginner,
}

impl TryFrom<String> for LanguageProficiency {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "expert" => Ok(LanguageProficiency::Expert),
            "advanced" => Ok(LanguageProficiency::Advanced),
            "intermediate" => Ok(LanguageProficiency::Intermediate),
            "beginner" => Ok(LanguageProficiency::Beginner),
            other => Err(format!("unknown proficiency '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProgrammingLanguage {
    pub id: Uuid,
    pub name: String,
    #[sqlx(try_from = "String")]
    pub proficiency: LanguageProficiency,
    pub years_experience: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Initiative {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
}
