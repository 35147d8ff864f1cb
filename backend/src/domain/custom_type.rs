//! User-defined coffee types.
//!
//! A custom type carries an optional caffeine base at medium size; entries
//! referencing it scale that base through
//! [`calculate_custom_caffeine`](super::calculate_custom_caffeine).

use chrono::{DateTime, Utc};

use super::name::normalize_name;
use super::{CustomTypeId, FieldIssue, Patch, UserId};

/// Maximum length of a custom type name.
pub const CUSTOM_TYPE_NAME_MAX: usize = 50;
/// Upper bound for a custom type's medium-size caffeine base.
pub const CUSTOM_TYPE_CAFFEINE_MAX: i64 = 1000;

/// A coffee drink defined by a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomCoffeeType {
    pub id: CustomTypeId,
    pub user_id: UserId,
    pub name: String,
    /// Caffeine in milligrams at medium size; `None` falls back to the
    /// reference `OTHER` row.
    pub caffeine_mg: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn validate_caffeine(raw: i64) -> Result<u32, FieldIssue> {
    if !(0..=CUSTOM_TYPE_CAFFEINE_MAX).contains(&raw) {
        return Err(FieldIssue::new(
            "caffeine",
            "out_of_range",
            format!("caffeine must be between 0 and {CUSTOM_TYPE_CAFFEINE_MAX}"),
        ));
    }
    u32::try_from(raw).map_err(|_| FieldIssue::new("caffeine", "out_of_range", "caffeine is out of range"))
}

/// Validated input for creating a custom type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomTypeDraft {
    pub name: String,
    pub caffeine_mg: Option<u32>,
}

impl CustomTypeDraft {
    /// Validate raw request values.
    pub fn try_new(name: &str, caffeine: Option<i64>) -> Result<Self, Vec<FieldIssue>> {
        let mut issues = Vec::new();
        let name = normalize_name(name, CUSTOM_TYPE_NAME_MAX, "name")
            .map_err(|issue| issues.push(issue))
            .ok();
        let caffeine_mg = match caffeine.map(validate_caffeine).transpose() {
            Ok(value) => value,
            Err(issue) => {
                issues.push(issue);
                None
            }
        };
        match name {
            Some(name) if issues.is_empty() => Ok(Self { name, caffeine_mg }),
            _ => Err(issues),
        }
    }
}

/// Validated partial update for a custom type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomTypeChanges {
    pub name: Option<String>,
    pub caffeine_mg: Patch<u32>,
}

impl CustomTypeChanges {
    /// Validate raw patch values. A `null` name is rejected because the name
    /// is mandatory.
    pub fn try_new(name: Patch<String>, caffeine: Patch<i64>) -> Result<Self, Vec<FieldIssue>> {
        let mut issues = Vec::new();
        let name = match name {
            Patch::Absent => None,
            Patch::Clear => {
                issues.push(FieldIssue::new("name", "required", "name must not be null"));
                None
            }
            Patch::Set(raw) => normalize_name(&raw, CUSTOM_TYPE_NAME_MAX, "name")
                .map_err(|issue| issues.push(issue))
                .ok(),
        };
        let caffeine_mg = match caffeine {
            Patch::Absent => Patch::Absent,
            Patch::Clear => Patch::Clear,
            Patch::Set(raw) => match validate_caffeine(raw) {
                Ok(value) => Patch::Set(value),
                Err(issue) => {
                    issues.push(issue);
                    Patch::Absent
                }
            },
        };
        if issues.is_empty() {
            Ok(Self { name, caffeine_mg })
        } else {
            Err(issues)
        }
    }

    /// Apply the changes to `current`, stamping `now` as the update time.
    pub fn apply_to(self, mut current: CustomCoffeeType, now: DateTime<Utc>) -> CustomCoffeeType {
        if let Some(name) = self.name {
            current.name = name;
        }
        current.caffeine_mg = self.caffeine_mg.apply(current.caffeine_mg);
        current.updated_at = now;
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some(-1))]
    #[case(Some(1001))]
    fn draft_rejects_out_of_range_caffeine(#[case] caffeine: Option<i64>) {
        let issues = CustomTypeDraft::try_new("Cold foam", caffeine).expect_err("invalid");
        assert_eq!(issues[0].field, "caffeine");
    }

    #[rstest]
    fn draft_trims_name_and_keeps_missing_caffeine() {
        let draft = CustomTypeDraft::try_new("  Cold foam ", None).expect("valid");
        assert_eq!(draft.name, "Cold foam");
        assert_eq!(draft.caffeine_mg, None);
    }

    #[rstest]
    fn draft_reports_name_and_caffeine_together() {
        let issues = CustomTypeDraft::try_new("", Some(5000)).expect_err("invalid");
        assert_eq!(issues.len(), 2);
    }

    #[rstest]
    fn changes_reject_null_name() {
        let issues =
            CustomTypeChanges::try_new(Patch::Clear, Patch::Absent).expect_err("null name");
        assert_eq!(issues[0].field, "name");
    }

    #[rstest]
    fn changes_clear_caffeine_and_keep_name() {
        let now = Utc::now();
        let current = CustomCoffeeType {
            id: CustomTypeId::random(),
            user_id: UserId::random(),
            name: "Cold foam".to_owned(),
            caffeine_mg: Some(120),
            created_at: now,
            updated_at: now,
        };
        let changes = CustomTypeChanges::try_new(Patch::Absent, Patch::Clear).expect("valid");
        let updated = changes.apply_to(current, now);
        assert_eq!(updated.name, "Cold foam");
        assert_eq!(updated.caffeine_mg, None);
    }
}
