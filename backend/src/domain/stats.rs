//! Consumption statistics: daily groups, rolling windows and the
//! contribution calendar.
//!
//! Everything here is pure; [`super::StatsService`] gathers the inputs from
//! the repositories. Calendar days are UTC dates.

use std::collections::HashMap;

use chrono::{DateTime, Days, NaiveDate, Utc};

use super::{CoffeeEntry, CoffeeType};

/// Number of days covered by the contribution calendar.
pub const CONTRIBUTION_DAYS: u64 = 365;
/// Length of the window `averageDaily` is computed over.
pub const AVERAGE_WINDOW_DAYS: u64 = 30;

/// Entries consumed on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyStats {
    pub date: NaiveDate,
    pub count: u32,
    pub total_caffeine: u64,
    /// Newest first.
    pub entries: Vec<CoffeeEntry>,
}

/// Rolling counts relative to "now".
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedStats {
    pub daily: u64,
    pub weekly: u64,
    pub monthly: u64,
    pub average_daily: f64,
    pub total_caffeine: u64,
    pub most_common_type: Option<CoffeeType>,
}

/// One cell of the contribution calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContributionDay {
    pub date: NaiveDate,
    pub count: u32,
    pub level: u8,
}

/// Group entries by the UTC date of `consumed_at`.
///
/// Groups are returned newest date first; each group keeps the relative order
/// of `entries`, which callers pass newest first.
pub fn group_daily(entries: Vec<CoffeeEntry>) -> Vec<DailyStats> {
    let mut groups: Vec<DailyStats> = Vec::new();
    let mut index: HashMap<NaiveDate, usize> = HashMap::new();

    for entry in entries {
        let date = entry.consumed_at.date_naive();
        let slot = *index.entry(date).or_insert_with(|| {
            groups.push(DailyStats {
                date,
                count: 0,
                total_caffeine: 0,
                entries: Vec::new(),
            });
            groups.len() - 1
        });
        let group = &mut groups[slot];
        group.count += 1;
        group.total_caffeine += u64::from(entry.caffeine_mg);
        group.entries.push(entry);
    }

    groups.sort_by(|a, b| b.date.cmp(&a.date));
    groups
}

/// Mean entries per day over the trailing month, rounded to one decimal.
///
/// # Examples
/// ```
/// use brewlog::domain::average_daily;
///
/// assert_eq!(average_daily(15), 0.5);
/// assert_eq!(average_daily(0), 0.0);
/// ```
pub fn average_daily(monthly: u64) -> f64 {
    let tenths = (monthly * 10 + AVERAGE_WINDOW_DAYS / 2) / AVERAGE_WINDOW_DAYS;
    tenths as f64 / 10.0
}

/// Most frequent fixed type; on a tie the type seen first wins.
///
/// `types` must be ordered oldest entry first.
pub fn most_common_type<I>(types: I) -> Option<CoffeeType>
where
    I: IntoIterator<Item = CoffeeType>,
{
    let mut tallies: Vec<(CoffeeType, u64)> = Vec::new();
    for coffee_type in types {
        match tallies.iter_mut().find(|(seen, _)| *seen == coffee_type) {
            Some((_, count)) => *count += 1,
            None => tallies.push((coffee_type, 1)),
        }
    }

    let mut best: Option<(CoffeeType, u64)> = None;
    for (coffee_type, count) in tallies {
        if best.is_none_or(|(_, max)| count > max) {
            best = Some((coffee_type, count));
        }
    }
    best.map(|(coffee_type, _)| coffee_type)
}

/// Intensity bucket for a day's count.
pub fn contribution_level(count: u32) -> u8 {
    match count {
        0 => 0,
        1..=2 => 1,
        3..=4 => 2,
        5..=6 => 3,
        _ => 4,
    }
}

/// First day covered by a calendar ending on `today`.
pub fn contribution_start(today: NaiveDate) -> NaiveDate {
    today
        .checked_sub_days(Days::new(CONTRIBUTION_DAYS - 1))
        .unwrap_or(NaiveDate::MIN)
}

/// Calendar of [`CONTRIBUTION_DAYS`] days ending on `today`, oldest first.
///
/// Timestamps outside the window are ignored.
pub fn contribution_grid<I>(today: NaiveDate, consumed: I) -> Vec<ContributionDay>
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    let start = contribution_start(today);
    let mut counts: HashMap<NaiveDate, u32> = HashMap::new();
    for instant in consumed {
        let date = instant.date_naive();
        if date >= start && date <= today {
            *counts.entry(date).or_default() += 1;
        }
    }

    start
        .iter_days()
        .take(CONTRIBUTION_DAYS as usize)
        .map(|date| {
            let count = counts.get(&date).copied().unwrap_or(0);
            ContributionDay {
                date,
                count,
                level: contribution_level(count),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CoffeeSize, EntryId, UserId};
    use chrono::TimeZone;
    use rstest::rstest;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).single().expect("valid timestamp")
    }

    fn entry(consumed_at: DateTime<Utc>, caffeine_mg: u32) -> CoffeeEntry {
        CoffeeEntry {
            id: EntryId::random(),
            user_id: UserId::random(),
            coffee_type: Some(CoffeeType::Latte),
            custom_type: None,
            size: CoffeeSize::Medium,
            caffeine_mg,
            consumed_at,
            notes: None,
            companions: Vec::new(),
            created_at: consumed_at,
            updated_at: consumed_at,
        }
    }

    #[rstest]
    fn groups_by_utc_date_newest_first() {
        let entries = vec![
            entry(at(2024, 1, 7, 9), 150),
            entry(at(2024, 1, 5, 18), 63),
            entry(at(2024, 1, 5, 8), 150),
        ];

        let groups = group_daily(entries);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].date, at(2024, 1, 7, 0).date_naive());
        assert_eq!(groups[0].count, 1);
        assert_eq!(groups[1].count, 2);
        assert_eq!(groups[1].total_caffeine, 213);
        assert_eq!(groups[1].entries[0].consumed_at, at(2024, 1, 5, 18));
    }

    #[rstest]
    fn grouping_nothing_yields_nothing() {
        assert!(group_daily(Vec::new()).is_empty());
    }

    #[rstest]
    #[case(0, 0.0)]
    #[case(1, 0.0)]
    #[case(2, 0.1)]
    #[case(5, 0.2)]
    #[case(15, 0.5)]
    #[case(30, 1.0)]
    #[case(95, 3.2)]
    fn average_daily_rounds_to_one_decimal(#[case] monthly: u64, #[case] expected: f64) {
        assert!((average_daily(monthly) - expected).abs() < f64::EPSILON);
    }

    #[rstest]
    fn most_common_type_breaks_ties_by_first_seen() {
        let types = [
            CoffeeType::Mocha,
            CoffeeType::Latte,
            CoffeeType::Latte,
            CoffeeType::Mocha,
        ];
        assert_eq!(most_common_type(types), Some(CoffeeType::Mocha));
    }

    #[rstest]
    fn most_common_type_prefers_higher_count() {
        let types = [CoffeeType::Mocha, CoffeeType::Latte, CoffeeType::Latte];
        assert_eq!(most_common_type(types), Some(CoffeeType::Latte));
        assert_eq!(most_common_type([]), None);
    }

    #[rstest]
    #[case(0, 0)]
    #[case(1, 1)]
    #[case(2, 1)]
    #[case(3, 2)]
    #[case(4, 2)]
    #[case(5, 3)]
    #[case(6, 3)]
    #[case(7, 4)]
    #[case(42, 4)]
    fn levels_bucket_counts(#[case] count: u32, #[case] expected: u8) {
        assert_eq!(contribution_level(count), expected);
    }

    #[rstest]
    fn grid_covers_a_year_in_ascending_order() {
        let today = at(2024, 3, 1, 0).date_naive();
        let consumed = vec![
            at(2024, 3, 1, 7),
            at(2024, 3, 1, 12),
            at(2024, 3, 1, 16),
            at(2023, 3, 3, 10),
            at(2023, 3, 2, 10),
        ];

        let grid = contribution_grid(today, consumed);

        assert_eq!(grid.len(), CONTRIBUTION_DAYS as usize);
        assert!(grid.windows(2).all(|pair| pair[0].date < pair[1].date));
        let last = grid.last().expect("non-empty grid");
        assert_eq!(last.date, today);
        assert_eq!((last.count, last.level), (3, 2));
        let first = grid.first().expect("non-empty grid");
        assert_eq!(first.date, at(2023, 3, 3, 0).date_naive());
        assert_eq!(first.count, 1);
        assert_eq!(grid.iter().map(|day| day.count).sum::<u32>(), 4);
    }
}
