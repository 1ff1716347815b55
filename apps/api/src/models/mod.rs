pub mod library;
pub mod post;
pub mod profile;

pub use library::{Book, NewBook, NewPhoto, NewProject, Photo, Project};
pub use post::{Post, PostStatus};
pub use profile::{
    Country, Hobby, Initiative, LanguageProficiency, NewCountry, NewHobby, NewSkill,
    ProgrammingLanguage, Skill, SkillCategory, Social, SpokenLanguage, SpokenProficiency,
};

/// Truncates to at most `max` characters without splitting a code point.
pub fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_ascii() {
        assert_eq!(truncate_chars("abcdef", 2), "ab");
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        // Regional indicator pairs are two chars each.
        assert_eq!(truncate_chars("🇦🇺🇳🇿", 2), "🇦🇺");
    }

    #[test]
    fn test_truncate_chars_shorter_than_max() {
        assert_eq!(truncate_chars("ok", 50), "ok");
    }
}
