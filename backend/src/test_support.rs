//! Shared fixtures for unit tests across the crate.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{
    CoffeeEntry, CoffeeSize, CoffeeType, Companion, CompanionId, CustomCoffeeType, CustomTypeId,
    EntryId, UserId,
};

/// Clock frozen at a fixed instant.
pub(crate) struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

/// A clock frozen at `utc_now`.
pub(crate) fn fixture_clock(utc_now: DateTime<Utc>) -> Arc<dyn Clock> {
    Arc::new(FixtureClock { utc_now })
}

/// Build a UTC timestamp, panicking on invalid input.
pub(crate) fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0)
        .single()
        .unwrap_or_else(|| panic!("invalid fixture timestamp {y}-{m}-{d} {h}:{min}"))
}

/// The instant most fixtures treat as "now".
pub(crate) fn fixture_now() -> DateTime<Utc> {
    utc(2024, 3, 15, 12, 0)
}

pub(crate) fn custom_type(user_id: UserId, name: &str, caffeine_mg: Option<u32>) -> CustomCoffeeType {
    let now = fixture_now();
    CustomCoffeeType {
        id: CustomTypeId::random(),
        user_id,
        name: name.to_owned(),
        caffeine_mg,
        created_at: now,
        updated_at: now,
    }
}

pub(crate) fn companion(user_id: UserId, name: &str) -> Companion {
    let now = fixture_now();
    Companion {
        id: CompanionId::random(),
        user_id,
        name: name.to_owned(),
        created_at: now,
        updated_at: now,
    }
}

/// A fixed-type entry consumed at `consumed_at`.
pub(crate) fn entry(
    user_id: UserId,
    coffee_type: CoffeeType,
    size: CoffeeSize,
    consumed_at: DateTime<Utc>,
) -> CoffeeEntry {
    CoffeeEntry {
        id: EntryId::random(),
        user_id,
        coffee_type: Some(coffee_type),
        custom_type: None,
        size,
        caffeine_mg: crate::domain::calculate_caffeine(coffee_type, size),
        consumed_at,
        notes: None,
        companions: Vec::new(),
        created_at: consumed_at,
        updated_at: consumed_at,
    }
}
