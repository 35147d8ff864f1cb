//! People a user shares coffee with.

use chrono::{DateTime, Utc};

use super::name::normalize_name;
use super::{CompanionId, FieldIssue, Patch, UserId};

/// Maximum length of a companion name.
pub const COMPANION_NAME_MAX: usize = 100;

/// A named companion owned by a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Companion {
    pub id: CompanionId,
    pub user_id: UserId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated companion name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanionName(String);

impl CompanionName {
    /// Trim and bound-check a raw name.
    pub fn new(raw: &str) -> Result<Self, FieldIssue> {
        normalize_name(raw, COMPANION_NAME_MAX, "name").map(Self)
    }

    /// Validate an update patch; `null` is rejected because the name is
    /// mandatory.
    pub fn from_patch(patch: Patch<String>) -> Result<Option<Self>, FieldIssue> {
        match patch {
            Patch::Absent => Ok(None),
            Patch::Clear => Err(FieldIssue::new("name", "required", "name must not be null")),
            Patch::Set(raw) => Self::new(&raw).map(Some),
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<CompanionName> for String {
    fn from(value: CompanionName) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn name_is_trimmed() {
        let name = CompanionName::new("  Carmen ").expect("valid");
        assert_eq!(name.as_str(), "Carmen");
    }

    #[rstest]
    fn long_names_are_rejected() {
        let issue = CompanionName::new(&"c".repeat(COMPANION_NAME_MAX + 1)).expect_err("too long");
        assert_eq!(issue.code, "too_long");
    }

    #[rstest]
    #[case(Patch::Absent, Ok(None))]
    #[case(Patch::Clear, Err("required"))]
    #[case(Patch::Set(" ".to_owned()), Err("required"))]
    fn patch_handling(
        #[case] patch: Patch<String>,
        #[case] expected: Result<Option<&str>, &str>,
    ) {
        let result = CompanionName::from_patch(patch);
        match expected {
            Ok(None) => assert_eq!(result, Ok(None)),
            Ok(Some(name)) => {
                assert_eq!(result.expect("valid").map(String::from).as_deref(), Some(name));
            }
            Err(code) => assert_eq!(result.expect_err("invalid").code, code),
        }
    }
}
