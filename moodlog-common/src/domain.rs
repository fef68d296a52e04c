use std::str::FromStr;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::wellbeing::Reading;

/// Calendar dates travel as `YYYY-MM-DD` everywhere: the database, the cache and the CLI.
pub const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

pub fn parse_date(value: &str) -> Result<Date, time::error::Parse> {
    Date::parse(value.trim(), DATE_FORMAT)
}

pub fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}

/// Today's date in the local timezone, falling back to UTC when the offset cannot be determined.
pub fn today() -> Date {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn inner(&self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for UserId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// One of the three daily scales. Always an integer in 1..=10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    pub fn value(&self) -> u8 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingOutOfRange(pub i64);

impl std::fmt::Display for RatingOutOfRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "value {} is outside of {}-{}",
            self.0,
            Rating::MIN,
            Rating::MAX
        )
    }
}

impl std::error::Error for RatingOutOfRange {}

impl TryFrom<i64> for Rating {
    type Error = RatingOutOfRange;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value < Self::MIN as i64 || value > Self::MAX as i64 {
            return Err(RatingOutOfRange(value));
        }
        Ok(Self(value as u8))
    }
}

impl From<Rating> for i64 {
    fn from(value: Rating) -> Self {
        value.0 as i64
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Authenticated identity as handed out by the backend. The names come from the sign up
/// metadata and may be missing for accounts created without them.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Profile {
    pub id: UserId,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub avatar_path: Option<String>,
}

/// A single journal record. Older rows can miss any of the three scales, which is why they
/// are optional here even though every write validates all of them.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Entry {
    pub id: Uuid,
    pub user_id: UserId,
    pub entry_date: Date,
    pub mood: Option<Rating>,
    pub energy: Option<Rating>,
    pub stress: Option<Rating>,
    pub note: Option<String>,
    pub photo_path: Option<String>,
    pub created_at: OffsetDateTime,
}

impl Entry {
    pub fn reading(&self) -> Option<Reading> {
        Reading::new(
            self.mood?.value() as f64,
            self.energy?.value() as f64,
            self.stress?.value() as f64,
        )
    }
}

/// Sort entries by entry date, newest first. Ties keep their order.
pub fn sort_newest_first(entries: &mut [Entry]) {
    entries.sort_by(|a, b| b.entry_date.cmp(&a.entry_date));
}

/// Inclusive date range filter used by the history view.
pub fn filter_by_date(entries: &[Entry], from: Option<Date>, to: Option<Date>) -> Vec<Entry> {
    entries
        .iter()
        .filter(|e| from.map_or(true, |from| e.entry_date >= from))
        .filter(|e| to.map_or(true, |to| e.entry_date <= to))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn entry(entry_date: Date) -> Entry {
        Entry {
            id: Uuid::now_v7(),
            user_id: UserId::new(),
            entry_date,
            mood: Rating::try_from(5).ok(),
            energy: Rating::try_from(5).ok(),
            stress: Rating::try_from(5).ok(),
            note: None,
            photo_path: None,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn rating_rejects_values_outside_of_scale() {
        assert!(Rating::try_from(0).is_err());
        assert!(Rating::try_from(11).is_err());
        assert_eq!(Rating::try_from(1).unwrap().value(), 1);
        assert_eq!(Rating::try_from(10).unwrap().value(), 10);
    }

    #[test]
    fn rating_deserialization_is_validated() {
        assert!(serde_json::from_str::<Rating>("7").is_ok());
        assert!(serde_json::from_str::<Rating>("42").is_err());
    }

    #[test]
    fn dates_use_iso_calendar_format() {
        let d = parse_date("2024-03-09").unwrap();
        assert_eq!(d, date!(2024 - 03 - 09));
        assert_eq!(format_date(d), "2024-03-09");
        assert!(parse_date("2024-02-30").is_err());
        assert!(parse_date("yesterday").is_err());
    }

    #[test]
    fn entry_without_all_scales_has_no_reading() {
        let mut e = entry(date!(2024 - 01 - 01));
        assert!(e.reading().is_some());
        e.energy = None;
        assert!(e.reading().is_none());
    }

    #[test]
    fn date_filter_is_inclusive() {
        let entries = vec![
            entry(date!(2024 - 01 - 03)),
            entry(date!(2024 - 01 - 02)),
            entry(date!(2024 - 01 - 01)),
        ];

        let res = filter_by_date(&entries, Some(date!(2024 - 01 - 02)), Some(date!(2024 - 01 - 03)));
        assert_eq!(res.len(), 2);

        let res = filter_by_date(&entries, None, Some(date!(2024 - 01 - 01)));
        assert_eq!(res.len(), 1);

        let res = filter_by_date(&entries, None, None);
        assert_eq!(res.len(), 3);
    }

    #[test]
    fn sorting_puts_newest_first() {
        let mut entries = vec![
            entry(date!(2024 - 01 - 01)),
            entry(date!(2024 - 01 - 03)),
            entry(date!(2024 - 01 - 02)),
        ];
        sort_newest_first(&mut entries);
        assert_eq!(entries[0].entry_date, date!(2024 - 01 - 03));
        assert_eq!(entries[2].entry_date, date!(2024 - 01 - 01));
    }
}
