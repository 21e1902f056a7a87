/// Field normalization for task input
///
/// Every function trims its input. Failures are [`TaskError::Validation`].

use super::error::{TaskError, TaskResult};
use crate::models::task::Priority;

/// Longest accepted title, in characters
pub const MAX_TITLE_LENGTH: usize = 255;

/// Trims a title and checks it is non-empty and at most 255 characters
pub fn normalize_title(raw: &str) -> TaskResult<String> {
    let title = raw.trim();

    if title.is_empty() {
        return Err(TaskError::Validation("Title cannot be empty".to_string()));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(TaskError::Validation(format!(
            "Title must be {} characters or less",
            MAX_TITLE_LENGTH
        )));
    }

    Ok(title.to_string())
}

/// Parses a priority; absent or blank means medium
pub fn normalize_priority(raw: Option<&str>) -> TaskResult<Priority> {
    match raw.map(str::trim) {
        None | Some("") => Ok(Priority::Medium),
        Some(value) => value.parse().map_err(|_| {
            TaskError::Validation("Priority must be 'low', 'medium', or 'high'".to_string())
        }),
    }
}

/// Splits comma-separated tags, trimming each and dropping empties
pub fn normalize_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Trims a description; an empty one becomes `None`
pub fn normalize_description(raw: &str) -> Option<String> {
    let description = raw.trim();
    (!description.is_empty()).then(|| description.to_string())
}
