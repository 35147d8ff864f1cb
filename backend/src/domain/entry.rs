//! Logged coffee entries and the inputs that create or change them.

use chrono::{DateTime, Utc};

use super::{
    CoffeeSize, CoffeeType, Companion, CompanionId, CustomCoffeeType, CustomTypeId, EntryId,
    FieldIssue, Patch, UserId,
};

/// Maximum length of free-form entry notes.
pub const NOTES_MAX: usize = 500;
/// Largest page a client may request.
pub const PAGE_LIMIT_MAX: u32 = 100;
/// Page size used when the client does not ask for one.
pub const PAGE_LIMIT_DEFAULT: u32 = 50;

/// Stored shape of an entry, without resolved associations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRecord {
    pub id: EntryId,
    pub user_id: UserId,
    pub coffee_type: Option<CoffeeType>,
    pub custom_type_id: Option<CustomTypeId>,
    pub size: CoffeeSize,
    pub caffeine_mg: u32,
    pub consumed_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An entry with its custom type and companions resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoffeeEntry {
    pub id: EntryId,
    pub user_id: UserId,
    pub coffee_type: Option<CoffeeType>,
    pub custom_type: Option<CustomCoffeeType>,
    pub size: CoffeeSize,
    pub caffeine_mg: u32,
    pub consumed_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub companions: Vec<Companion>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CoffeeEntry {
    /// Combine a stored record with its resolved associations.
    pub fn from_record(
        record: EntryRecord,
        custom_type: Option<CustomCoffeeType>,
        companions: Vec<Companion>,
    ) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            coffee_type: record.coffee_type,
            custom_type,
            size: record.size,
            caffeine_mg: record.caffeine_mg,
            consumed_at: record.consumed_at,
            notes: record.notes,
            companions,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }

    pub fn custom_type_id(&self) -> Option<CustomTypeId> {
        self.custom_type.as_ref().map(|custom| custom.id)
    }

    /// Stored shape of this entry.
    pub fn to_record(&self) -> EntryRecord {
        EntryRecord {
            id: self.id,
            user_id: self.user_id,
            coffee_type: self.coffee_type,
            custom_type_id: self.custom_type_id(),
            size: self.size,
            caffeine_mg: self.caffeine_mg,
            consumed_at: self.consumed_at,
            notes: self.notes.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Where an entry's caffeine comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrinkSource {
    Fixed(CoffeeType),
    Custom(CustomTypeId),
}

impl DrinkSource {
    /// Resolve the source from optional type and custom type references.
    pub fn from_parts(
        coffee_type: Option<CoffeeType>,
        custom_type_id: Option<CustomTypeId>,
    ) -> Result<Self, FieldIssue> {
        match (coffee_type, custom_type_id) {
            (Some(coffee_type), None) => Ok(Self::Fixed(coffee_type)),
            (None, Some(id)) => Ok(Self::Custom(id)),
            (Some(_), Some(_)) => Err(FieldIssue::new(
                "customTypeId",
                "conflict",
                "Provide either type or customTypeId, not both",
            )),
            (None, None) => Err(FieldIssue::new(
                "type",
                "required",
                "Either type or customTypeId must be provided",
            )),
        }
    }
}

fn validate_notes(notes: &str) -> Result<(), FieldIssue> {
    if notes.chars().count() > NOTES_MAX {
        return Err(FieldIssue::new(
            "notes",
            "too_long",
            format!("Notes must be at most {NOTES_MAX} characters"),
        ));
    }
    Ok(())
}

/// Validated input for logging a new entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
    pub source: DrinkSource,
    pub size: CoffeeSize,
    /// Defaults to the current time when absent.
    pub consumed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub companion_ids: Vec<CompanionId>,
}

impl NewEntry {
    /// Validate the cross-field rules of a create request.
    pub fn try_new(
        coffee_type: Option<CoffeeType>,
        custom_type_id: Option<CustomTypeId>,
        size: CoffeeSize,
        consumed_at: Option<DateTime<Utc>>,
        notes: Option<String>,
        companion_ids: Vec<CompanionId>,
    ) -> Result<Self, Vec<FieldIssue>> {
        let mut issues = Vec::new();
        let source = DrinkSource::from_parts(coffee_type, custom_type_id)
            .map_err(|issue| issues.push(issue))
            .ok();
        if let Some(text) = notes.as_deref()
            && let Err(issue) = validate_notes(text)
        {
            issues.push(issue);
        }
        match source {
            Some(source) if issues.is_empty() => Ok(Self {
                source,
                size,
                consumed_at,
                notes,
                companion_ids: dedup(companion_ids),
            }),
            _ => Err(issues),
        }
    }
}

/// Validated partial update of an entry.
///
/// `coffee_type` and `custom_type_id` are tri-state: setting one source while
/// leaving the other absent clears the other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryChanges {
    pub coffee_type: Patch<CoffeeType>,
    pub custom_type_id: Patch<CustomTypeId>,
    pub size: Option<CoffeeSize>,
    pub consumed_at: Option<DateTime<Utc>>,
    pub notes: Patch<String>,
    /// Replaces the companion set wholesale when present.
    pub companion_ids: Option<Vec<CompanionId>>,
}

impl EntryChanges {
    /// Validate field-local rules of an update request.
    pub fn try_new(
        coffee_type: Patch<CoffeeType>,
        custom_type_id: Patch<CustomTypeId>,
        size: Option<CoffeeSize>,
        consumed_at: Option<DateTime<Utc>>,
        notes: Patch<String>,
        companion_ids: Option<Vec<CompanionId>>,
    ) -> Result<Self, Vec<FieldIssue>> {
        let mut issues = Vec::new();
        if let Patch::Set(text) = &notes
            && let Err(issue) = validate_notes(text)
        {
            issues.push(issue);
        }
        if matches!(
            (&coffee_type, &custom_type_id),
            (Patch::Set(_), Patch::Set(_))
        ) {
            issues.push(FieldIssue::new(
                "customTypeId",
                "conflict",
                "Provide either type or customTypeId, not both",
            ));
        }
        if !issues.is_empty() {
            return Err(issues);
        }
        Ok(Self {
            coffee_type,
            custom_type_id,
            size,
            consumed_at,
            notes,
            companion_ids: companion_ids.map(dedup),
        })
    }

    /// Whether caffeine must be derived again after applying these changes.
    pub fn affects_caffeine(&self) -> bool {
        self.coffee_type.is_present() || self.custom_type_id.is_present() || self.size.is_some()
    }

    /// Whether the patch touches either caffeine source field.
    pub fn addresses_source(&self) -> bool {
        self.coffee_type.is_present() || self.custom_type_id.is_present()
    }

    /// Resulting `(type, custom type)` pair once applied to `current`.
    pub fn resolve_source(
        &self,
        current_type: Option<CoffeeType>,
        current_custom: Option<CustomTypeId>,
    ) -> (Option<CoffeeType>, Option<CustomTypeId>) {
        let coffee_type = match (&self.coffee_type, &self.custom_type_id) {
            (Patch::Absent, Patch::Set(_)) => None,
            (patch, _) => patch.clone().apply(current_type),
        };
        let custom_type_id = match (&self.custom_type_id, &self.coffee_type) {
            (Patch::Absent, Patch::Set(_)) => None,
            (patch, _) => patch.clone().apply(current_custom),
        };
        (coffee_type, custom_type_id)
    }
}

fn dedup(ids: Vec<CompanionId>) -> Vec<CompanionId> {
    let mut seen = std::collections::HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

/// Upper bound on `consumed_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeEnd {
    /// Up to and including the instant.
    Through(DateTime<Utc>),
    /// Strictly before the instant; a whole calendar day ends before the
    /// next midnight.
    Before(DateTime<Utc>),
}

impl RangeEnd {
    pub fn admits(&self, instant: DateTime<Utc>) -> bool {
        match *self {
            Self::Through(end) => instant <= end,
            Self::Before(end) => instant < end,
        }
    }
}

/// Optional bounds on `consumed_at`; the start is inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<RangeEnd>,
}

impl DateRange {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<RangeEnd>) -> Self {
        Self { start, end }
    }

    /// Range with only a lower bound.
    pub fn since(start: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start.is_none_or(|start| instant >= start)
            && self.end.is_none_or(|end| end.admits(instant))
    }
}

/// Pagination window for entry listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u32,
    pub offset: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: PAGE_LIMIT_DEFAULT,
            offset: 0,
        }
    }
}

/// One page of entries plus the total matching the filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPage {
    pub entries: Vec<CoffeeEntry>,
    pub total: u64,
    pub limit: u32,
    pub offset: u64,
}

impl EntryPage {
    /// Whether rows remain past this window, judged by the requested limit.
    pub fn has_more(&self) -> bool {
        self.offset + u64::from(self.limit) < self.total
    }
}
