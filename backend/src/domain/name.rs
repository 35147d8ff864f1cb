//! Display-name normalisation shared by custom types and companions.

use super::FieldIssue;

/// Trim `raw` and check it holds between one and `max` characters.
///
/// Returns the issue to report against `field` when the check fails.
pub(crate) fn normalize_name(raw: &str, max: usize, field: &str) -> Result<String, FieldIssue> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FieldIssue::new(field, "required", format!("{field} must not be empty")));
    }
    if trimmed.chars().count() > max {
        return Err(FieldIssue::new(
            field,
            "too_long",
            format!("{field} must be at most {max} characters"),
        ));
    }
    Ok(trimmed.to_owned())
}
