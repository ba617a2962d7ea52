//! Input bounds for story submissions and project titles.

use crate::error::CoreError;

/// Maximum story length, counted in characters (not bytes).
pub const MAX_STORY_CHARS: usize = 50_000;

/// Minimum project title length in characters.
pub const MIN_TITLE_CHARS: u64 = 3;

/// Maximum project title length in characters.
pub const MAX_TITLE_CHARS: u64 = 100;

/// Reject story text longer than [`MAX_STORY_CHARS`].
///
/// This is the only check the analysis call performs; it runs before any
/// external request is made.
pub fn check_story_length(story_text: &str) -> Result<(), CoreError> {
    let actual = story_text.chars().count();
    if actual > MAX_STORY_CHARS {
        return Err(CoreError::InputTooLarge {
            limit: MAX_STORY_CHARS,
            actual,
        });
    }
    Ok(())
}

/// Validate story text submitted for a new project: non-blank and bounded.
pub fn validate_story_text(story_text: &str) -> Result<(), CoreError> {
    if story_text.trim().is_empty() {
        return Err(CoreError::Validation(
            "story text must not be empty".to_string(),
        ));
    }
    check_story_length(story_text)
}

/// Validate a project title after trimming.
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    let len = title.trim().chars().count() as u64;
    if !(MIN_TITLE_CHARS..=MAX_TITLE_CHARS).contains(&len) {
        return Err(CoreError::Validation(format!(
            "title must be between {MIN_TITLE_CHARS} and {MAX_TITLE_CHARS} characters, got {len}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn story_at_exact_limit_is_accepted() {
        let story = "a".repeat(MAX_STORY_CHARS);
        assert!(check_story_length(&story).is_ok());
    }

    #[test]
    fn story_one_over_limit_is_rejected() {
        let story = "a".repeat(MAX_STORY_CHARS + 1);
        assert_matches!(
            check_story_length(&story),
            Err(CoreError::InputTooLarge { limit: MAX_STORY_CHARS, actual }) if actual == MAX_STORY_CHARS + 1
        );
    }

    #[test]
    fn story_length_counts_characters_not_bytes() {
        // Each 'é' is two bytes in UTF-8.
        let story = "é".repeat(MAX_STORY_CHARS);
        assert!(check_story_length(&story).is_ok());
    }

    #[test]
    fn blank_story_is_rejected() {
        assert_matches!(validate_story_text("   \n"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn title_bounds() {
        assert!(validate_title("Abc").is_ok());
        assert!(validate_title(&"t".repeat(100)).is_ok());
        assert!(validate_title("Ab").is_err());
        assert!(validate_title("  Ab  ").is_err());
        assert!(validate_title(&"t".repeat(101)).is_err());
    }
}
