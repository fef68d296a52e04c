//! Wellbeing score for the advice view.
//!
//! Every day gets a score in `0..=1` built from mood, energy and inverted stress. The last
//! seven days are then averaged and the result is turned into one of a handful of fixed
//! messages.

use crate::domain::Entry;

const SCALE_MIN: f64 = 1.0;
const SCALE_MAX: f64 = 10.0;
const MAX_DAYS: usize = 7;

/// The three daily scales as plain numbers. Only finite values are accepted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub mood: f64,
    pub energy: f64,
    pub stress: f64,
}

impl Reading {
    pub fn new(mood: f64, energy: f64, stress: f64) -> Option<Self> {
        if [mood, energy, stress].iter().all(|v| v.is_finite()) {
            Some(Self {
                mood,
                energy,
                stress,
            })
        } else {
            None
        }
    }
}

fn norm_pos(value: f64) -> f64 {
    ((value - SCALE_MIN) / (SCALE_MAX - SCALE_MIN)).clamp(0.0, 1.0)
}

fn norm_neg(value: f64) -> f64 {
    1.0 - norm_pos(value)
}

/// Score for a single day.
///
/// High stress and low energy get an extra penalty on top of the weighted sum. The two
/// stress thresholds stack, so stress of 9 or more costs 0.25 in total.
pub fn wellbeing_score(reading: &Reading) -> f64 {
    let m = norm_pos(reading.mood);
    let e = norm_pos(reading.energy);
    let s = norm_neg(reading.stress);

    let mut score = 0.35 * m + 0.35 * e + 0.30 * s;

    if reading.stress >= 8.0 {
        score -= 0.15;
    }
    if reading.stress >= 9.0 {
        score -= 0.10;
    }
    if reading.energy <= 3.0 {
        score -= 0.10;
    }

    score.clamp(0.0, 1.0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// Mean of the daily scores, `0..=1`.
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    /// Number of days that had all three scales.
    pub days: usize,
    pub daily: Vec<f64>,
    pub avg_mood: f64,
    pub avg_energy: f64,
    pub avg_stress: f64,
}

impl Summary {
    /// Average score on the 0-10 scale the interpretation thresholds are written in.
    pub fn score10(&self) -> f64 {
        self.avg * 10.0
    }

    pub fn percent(&self) -> u32 {
        (self.avg * 100.0).round() as u32
    }
}

/// Aggregate the most recent week. Entries are expected newest first; anything past the
/// seventh is ignored before incomplete entries are dropped.
pub fn score_7_days(entries: &[Entry]) -> Option<Summary> {
    let valid = entries
        .iter()
        .take(MAX_DAYS)
        .filter_map(Entry::reading)
        .collect::<Vec<_>>();

    summarize(&valid)
}

pub fn summarize(readings: &[Reading]) -> Option<Summary> {
    if readings.is_empty() {
        return None;
    }

    let daily = readings.iter().map(wellbeing_score).collect::<Vec<_>>();
    let days = daily.len();
    let count = days as f64;

    let avg = daily.iter().sum::<f64>() / count;
    let min = daily.iter().copied().fold(f64::INFINITY, f64::min);
    let max = daily.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Some(Summary {
        avg,
        min,
        max,
        days,
        daily,
        avg_mood: readings.iter().map(|r| r.mood).sum::<f64>() / count,
        avg_energy: readings.iter().map(|r| r.energy).sum::<f64>() / count,
        avg_stress: readings.iter().map(|r| r.stress).sum::<f64>() / count,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    NoData,
    Overload,
    LowResources,
    HardTime,
    Great,
    Mixed,
}

impl Level {
    pub fn label(&self) -> &'static str {
        match self {
            Level::NoData => "No data",
            Level::Overload => "Overload",
            Level::LowResources => "Low resources",
            Level::HardTime => "Harder time",
            Level::Great => "Doing great",
            Level::Mixed => "Mixed",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Level::NoData => "Not enough data for an analysis yet.",
            Level::Overload => {
                "Stress is high and it is what lowers your wellbeing the most. Priority: bring the tension down."
            }
            Level::LowResources => {
                "The problem is not motivation but a lack of energy. Focus on rest."
            }
            Level::HardTime => {
                "You have been having a harder time lately. Remember that you can ask for support."
            }
            Level::Great => "You are in a stable, good period. Just keep an eye on recovery.",
            Level::Mixed => "Things are more or less OK, but there is room for small adjustments.",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Decision table, checked top to bottom. Stress always wins over the other rules.
pub fn interpret(summary: Option<&Summary>) -> Level {
    let Some(summary) = summary.filter(|s| s.days > 0 && s.avg.is_finite()) else {
        return Level::NoData;
    };

    let score = summary.score10();

    if summary.avg_stress >= 7.0 {
        return Level::Overload;
    }

    if summary.avg_energy <= 4.0 {
        return Level::LowResources;
    }

    if score < 4.0 {
        return Level::HardTime;
    }

    if score >= 7.5 && summary.avg_stress < 5.0 {
        return Level::Great;
    }

    Level::Mixed
}

const TIPS: [&str; 5] = [
    "Take a 10 minute walk without your phone.",
    "Write down 3 things you are grateful for.",
    "Drink some water and eat something with protein. It steadies your energy.",
    "Take 5 deep breaths (4 seconds in, 6 seconds out).",
    "Write down one small thing you can finish today.",
];

/// Tip of the day, rotating once per day since the unix epoch.
pub fn daily_tip(unix_days: i64) -> &'static str {
    TIPS[unix_days.rem_euclid(TIPS.len() as i64) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Rating, UserId};
    use quickcheck_macros::quickcheck;
    use time::macros::date;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn reading(mood: f64, energy: f64, stress: f64) -> Reading {
        Reading::new(mood, energy, stress).unwrap()
    }

    fn entry(mood: Option<i64>, energy: Option<i64>, stress: Option<i64>) -> Entry {
        Entry {
            id: Uuid::now_v7(),
            user_id: UserId::new(),
            entry_date: date!(2024 - 05 - 01),
            mood: mood.and_then(|v| Rating::try_from(v).ok()),
            energy: energy.and_then(|v| Rating::try_from(v).ok()),
            stress: stress.and_then(|v| Rating::try_from(v).ok()),
            note: None,
            photo_path: None,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    fn summary(avg: f64, avg_energy: f64, avg_stress: f64) -> Summary {
        Summary {
            avg,
            min: avg,
            max: avg,
            days: 3,
            daily: vec![avg; 3],
            avg_mood: 5.0,
            avg_energy,
            avg_stress,
        }
    }

    #[quickcheck]
    fn score_stays_in_unit_range(mood: u8, energy: u8, stress: u8) -> bool {
        let r = reading(
            (mood % 10 + 1) as f64,
            (energy % 10 + 1) as f64,
            (stress % 10 + 1) as f64,
        );
        let score = wellbeing_score(&r);
        (0.0..=1.0).contains(&score)
    }

    #[test]
    fn best_day_scores_one() {
        let score = wellbeing_score(&reading(10.0, 10.0, 1.0));
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn worst_day_is_clamped_to_zero() {
        assert_eq!(wellbeing_score(&reading(1.0, 1.0, 10.0)), 0.0);
    }

    #[test]
    fn stress_penalties_stack_to_a_quarter() {
        // mood/energy at 10 and stress 9: base 0.7 + 0.3 * (1 - 8/9)
        let base = 0.7 + 0.3 * (1.0 - 8.0 / 9.0);
        let score = wellbeing_score(&reading(10.0, 10.0, 9.0));
        assert!((score - (base - 0.25)).abs() < 1e-9);

        let base = 0.7 + 0.3 * (1.0 - 7.0 / 9.0);
        let score = wellbeing_score(&reading(10.0, 10.0, 8.0));
        assert!((score - (base - 0.15)).abs() < 1e-9);
    }

    #[test]
    fn low_energy_is_penalized() {
        let without = wellbeing_score(&reading(10.0, 4.0, 1.0));
        let with = wellbeing_score(&reading(10.0, 3.0, 1.0));
        let step = 0.35 / 9.0;
        assert!(((without - with) - (step + 0.10)).abs() < 1e-9);
    }

    #[test]
    fn non_finite_readings_are_rejected() {
        assert!(Reading::new(f64::NAN, 1.0, 1.0).is_none());
        assert!(Reading::new(1.0, f64::INFINITY, 1.0).is_none());
    }

    #[test]
    fn week_uses_at_most_seven_entries() {
        let mut entries = (0..9)
            .map(|_| entry(Some(10), Some(10), Some(1)))
            .collect::<Vec<_>>();
        // older entries past the week would drag the score down if they were used
        entries[7] = entry(Some(1), Some(1), Some(10));
        entries[8] = entry(Some(1), Some(1), Some(10));

        let s = score_7_days(&entries).unwrap();
        assert_eq!(s.days, 7);
        assert!((s.avg - 1.0).abs() < 1e-9);
    }

    #[test]
    fn fewer_entries_are_used_as_they_are() {
        let entries = vec![entry(Some(10), Some(10), Some(1)), entry(Some(1), Some(1), Some(10))];
        let s = score_7_days(&entries).unwrap();
        assert_eq!(s.days, 2);
        assert!((s.avg - 0.5).abs() < 1e-9);
        assert_eq!(s.min, 0.0);
        assert!((s.max - 1.0).abs() < 1e-9);
        assert!((s.avg_stress - 5.5).abs() < 1e-9);
    }

    #[test]
    fn incomplete_entries_are_skipped() {
        let entries = vec![
            entry(Some(10), None, Some(1)),
            entry(Some(10), Some(10), Some(1)),
            entry(None, None, None),
        ];
        let s = score_7_days(&entries).unwrap();
        assert_eq!(s.days, 1);
    }

    #[test]
    fn no_valid_entries_means_no_summary() {
        assert!(score_7_days(&[]).is_none());
        assert!(score_7_days(&[entry(Some(3), None, None)]).is_none());
    }

    #[test]
    fn stress_is_checked_before_anything_else() {
        assert_eq!(interpret(Some(&summary(0.9, 9.0, 8.0))), Level::Overload);
        assert_eq!(interpret(Some(&summary(0.1, 2.0, 7.0))), Level::Overload);
    }

    #[test]
    fn interpretation_table() {
        assert_eq!(interpret(None), Level::NoData);
        assert_eq!(interpret(Some(&summary(f64::NAN, 6.0, 3.0))), Level::NoData);
        assert_eq!(interpret(Some(&summary(0.9, 4.0, 3.0))), Level::LowResources);
        assert_eq!(interpret(Some(&summary(0.39, 6.0, 3.0))), Level::HardTime);
        assert_eq!(interpret(Some(&summary(0.75, 6.0, 4.9))), Level::Great);
        assert_eq!(interpret(Some(&summary(0.75, 6.0, 5.0))), Level::Mixed);
        assert_eq!(interpret(Some(&summary(0.5, 6.0, 3.0))), Level::Mixed);
    }

    #[test]
    fn tips_rotate_daily() {
        assert_eq!(daily_tip(0), daily_tip(5));
        assert_ne!(daily_tip(0), daily_tip(1));
        assert_eq!(daily_tip(-1), daily_tip(4));
    }
}
