//! Progress report aggregation.
//!
//! A report looks at one kid's progress records through a date interval and
//! sorts each record into at most one of three sections:
//!
//! | presented in range | validated in range | section                  |
//! |--------------------|--------------------|--------------------------|
//! | yes                | yes                | presented and validated  |
//! | yes                | no                 | presented                |
//! | no                 | yes                | validated                |
//! | no                 | no                 | (dropped)                |
//!
//! Completion percentages ignore the interval and count every record.

mod format;
pub mod render;
pub mod text;

use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::Database;
use crate::models::{Kid, Progress, Workshop};

pub use format::format_date;

/// An inclusive `[start, end]` range of instants.
///
/// An interval whose `start` is after its `end` contains nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    /// Missing bounds default to 1970-01-01 and 2100-01-01.
    pub fn new(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        Self {
            start: from.unwrap_or_else(default_start),
            end: to.unwrap_or_else(default_end),
        }
    }

    pub fn unbounded() -> Self {
        Self::new(None, None)
    }

    /// An interval that matches no timestamp at all.
    pub fn empty() -> Self {
        Self {
            start: default_end(),
            end: default_start(),
        }
    }

    /// Whether `timestamp` is set and lies within the bounds.
    pub fn contains(&self, timestamp: Option<DateTime<Utc>>) -> bool {
        match timestamp {
            Some(ts) => self.start <= ts && ts <= self.end,
            None => false,
        }
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self::unbounded()
    }
}

fn default_start() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

fn default_end() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2100, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// The period a report covers, as requested through `from` / `to` parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPeriod {
    /// Lower bound as given, when it parsed.
    pub from: Option<DateTime<Utc>>,
    /// Upper bound as given, when it parsed.
    pub to: Option<DateTime<Utc>>,
    pub interval: Interval,
}

impl ReportPeriod {
    /// Parse raw query values. Blank values count as absent.
    ///
    /// A value that does not parse is not an error: the resulting interval
    /// matches nothing, so every section comes out empty.
    pub fn parse(from: Option<&str>, to: Option<&str>) -> Self {
        let from = DateBound::parse(from);
        let to = DateBound::parse(to);

        let interval = match (from, to) {
            (DateBound::Invalid, _) | (_, DateBound::Invalid) => Interval::empty(),
            (from, to) => Interval::new(from.value(), to.value()),
        };

        Self {
            from: from.value(),
            to: to.value(),
            interval,
        }
    }

    pub fn unbounded() -> Self {
        Self {
            from: None,
            to: None,
            interval: Interval::unbounded(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum DateBound {
    Absent,
    Valid(DateTime<Utc>),
    Invalid,
}

impl DateBound {
    fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::Absent;
        };
        match parse_date(raw) {
            Some(dt) => Self::Valid(dt),
            None => {
                tracing::warn!("Ignoring unparsable report date: {:?}", raw);
                Self::Invalid
            }
        }
    }

    fn value(self) -> Option<DateTime<Utc>> {
        match self {
            Self::Valid(dt) => Some(dt),
            Self::Absent | Self::Invalid => None,
        }
    }
}

/// Parse an ISO-8601 date or date-time. Date-only and naive values are UTC.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// A kid's progress records split by what happened within an interval.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressSections {
    pub validated: Vec<Progress>,
    pub presented: Vec<Progress>,
    pub presented_and_validated: Vec<Progress>,
}

impl ProgressSections {
    pub fn len(&self) -> usize {
        self.validated.len() + self.presented.len() + self.presented_and_validated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Sort progress records into sections. Input order is kept within each one.
pub fn classify(progresses: &[Progress], interval: &Interval) -> ProgressSections {
    progresses
        .iter()
        .fold(ProgressSections::default(), |mut acc, progress| {
            let presented = interval.contains(progress.presented_at);
            let validated = interval.contains(progress.validated_at);

            match (presented, validated) {
                (true, true) => acc.presented_and_validated.push(progress.clone()),
                (true, false) => acc.presented.push(progress.clone()),
                (false, true) => acc.validated.push(progress.clone()),
                (false, false) => {}
            }
            acc
        })
}

/// Share of all workshops presented / validated, floored to whole percents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Percentages {
    pub presented: u32,
    pub validated: u32,
}

/// Count presented and validated records against `total_workshops`.
///
/// Dates are not filtered. With no workshops both shares are 0.
pub fn compute_percentages(progresses: &[Progress], total_workshops: usize) -> Percentages {
    let presented = progresses.iter().filter(|p| p.is_presented()).count();
    let validated = progresses.iter().filter(|p| p.is_validated()).count();

    Percentages {
        presented: percent(presented, total_workshops),
        validated: percent(validated, total_workshops),
    }
}

fn percent(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (count as u64 * 100 / total as u64) as u32
}

/// The three report sections, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Validated,
    Presented,
    PresentedAndValidated,
}

impl SectionKind {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Validated => "Validés",
            Self::Presented => "Présentés",
            Self::PresentedAndValidated => "Présentés et validés",
        }
    }
}

/// One line of a report section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub progress_id: Uuid,
    pub workshop_id: Uuid,
    pub workshop_name: String,
    pub presented_at: Option<DateTime<Utc>>,
    pub validated_at: Option<DateTime<Utc>>,
}

/// Everything needed to print one kid's progress report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KidReport {
    pub kid: Kid,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    /// Present only when percentages were requested.
    pub percentages: Option<Percentages>,
    pub validated: Vec<ReportEntry>,
    pub presented: Vec<ReportEntry>,
    pub presented_and_validated: Vec<ReportEntry>,
}

impl KidReport {
    /// Assemble a report. `workshops` must be the full workshop list: it is
    /// both the percentage denominator and the name lookup. Records whose
    /// workshop is unknown are left out of the sections.
    pub fn build(
        kid: Kid,
        progresses: &[Progress],
        workshops: &[Workshop],
        period: &ReportPeriod,
        include_percentages: bool,
    ) -> Self {
        let names: HashMap<Uuid, &str> = workshops
            .iter()
            .map(|w| (w.id, w.name.as_str()))
            .collect();

        let entries = |records: Vec<Progress>| -> Vec<ReportEntry> {
            records
                .into_iter()
                .filter_map(|p| {
                    let name = names.get(&p.workshop_id)?;
                    Some(ReportEntry {
                        progress_id: p.id,
                        workshop_id: p.workshop_id,
                        workshop_name: name.to_string(),
                        presented_at: p.presented_at,
                        validated_at: p.validated_at,
                    })
                })
                .collect()
        };

        let sections = classify(progresses, &period.interval);
        let percentages =
            include_percentages.then(|| compute_percentages(progresses, workshops.len()));

        Self {
            kid,
            from: period.from,
            to: period.to,
            percentages,
            validated: entries(sections.validated),
            presented: entries(sections.presented),
            presented_and_validated: entries(sections.presented_and_validated),
        }
    }

    /// Sections in display order, including empty ones.
    pub fn sections(&self) -> [(SectionKind, &[ReportEntry]); 3] {
        [
            (SectionKind::Validated, self.validated.as_slice()),
            (SectionKind::Presented, self.presented.as_slice()),
            (
                SectionKind::PresentedAndValidated,
                self.presented_and_validated.as_slice(),
            ),
        ]
    }
}

/// Build the report of one kid from the store. `None` when the kid is unknown.
pub fn kid_report(
    db: &Database,
    kid_id: Uuid,
    period: &ReportPeriod,
    include_percentages: bool,
) -> Result<Option<KidReport>> {
    let Some(kid) = db.get_kid(kid_id)? else {
        tracing::debug!(kid_id = %kid_id, "No kid for report");
        return Ok(None);
    };
    let workshops = db.get_all_workshops()?;
    let progresses = db.get_progresses_for_kid(kid_id)?;

    Ok(Some(KidReport::build(
        kid,
        &progresses,
        &workshops,
        period,
        include_percentages,
    )))
}

/// Build one report per kid, in store order.
pub fn all_kids_reports(
    db: &Database,
    period: &ReportPeriod,
    include_percentages: bool,
) -> Result<Vec<KidReport>> {
    let workshops = db.get_all_workshops()?;
    db.get_all_kids()?
        .into_iter()
        .map(|kid| {
            let progresses = db.get_progresses_for_kid(kid.id)?;
            Ok(KidReport::build(
                kid,
                &progresses,
                &workshops,
                period,
                include_percentages,
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::KidLevel;

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn progress(
        presented_at: Option<DateTime<Utc>>,
        validated_at: Option<DateTime<Utc>>,
    ) -> Progress {
        Progress {
            id: Uuid::new_v4(),
            kid_id: Uuid::nil(),
            workshop_id: Uuid::new_v4(),
            bookmarked_at: None,
            presented_at,
            validated_at,
        }
    }

    fn january() -> Interval {
        Interval::new(Some(day(2024, 1, 1)), Some(day(2024, 1, 31)))
    }

    fn january_february() -> Interval {
        Interval::new(Some(day(2024, 1, 1)), Some(day(2024, 2, 28)))
    }

    #[test]
    fn presented_in_range_validated_after_is_presented_only() {
        let p = progress(Some(day(2024, 1, 10)), Some(day(2024, 2, 1)));
        let sections = classify(&[p.clone()], &january());
        assert_eq!(sections.presented, vec![p]);
        assert!(sections.validated.is_empty());
        assert!(sections.presented_and_validated.is_empty());
    }

    #[test]
    fn both_in_range_is_presented_and_validated() {
        let p = progress(Some(day(2024, 1, 10)), Some(day(2024, 2, 1)));
        let sections = classify(&[p.clone()], &january_february());
        assert_eq!(sections.presented_and_validated, vec![p]);
        assert_eq!(sections.len(), 1);
    }

    #[test]
    fn validated_without_presentation_is_validated() {
        let p = progress(None, Some(day(2024, 2, 1)));
        let sections = classify(&[p.clone()], &january_february());
        assert_eq!(sections.validated, vec![p]);
        assert_eq!(sections.len(), 1);
    }

    #[test]
    fn record_without_timestamps_is_dropped() {
        let sections = classify(&[progress(None, None)], &Interval::unbounded());
        assert!(sections.is_empty());
    }

    #[test]
    fn bounds_are_inclusive() {
        let interval = january();
        assert!(interval.contains(Some(day(2024, 1, 1))));
        assert!(interval.contains(Some(day(2024, 1, 31))));
        assert!(!interval.contains(Some(day(2024, 1, 31) + chrono::Duration::seconds(1))));
        assert!(!interval.contains(None));
    }

    #[test]
    fn empty_interval_contains_nothing() {
        let interval = Interval::empty();
        assert!(!interval.contains(Some(day(1970, 1, 1))));
        assert!(!interval.contains(Some(day(2024, 6, 1))));
        assert!(!interval.contains(Some(day(2100, 1, 1))));
    }

    #[test]
    fn default_interval_spans_1970_to_2100() {
        let interval = Interval::unbounded();
        assert_eq!(interval.start, day(1970, 1, 1));
        assert_eq!(interval.end, day(2100, 1, 1));
    }

    #[test]
    fn sections_keep_input_order() {
        let a = progress(Some(day(2024, 1, 3)), None);
        let b = progress(Some(day(2024, 1, 1)), None);
        let c = progress(Some(day(2024, 1, 2)), None);
        let sections = classify(&[a.clone(), b.clone(), c.clone()], &january());
        assert_eq!(sections.presented, vec![a, b, c]);
    }

    #[test]
    fn percentages_floor_against_workshop_count() {
        let records = vec![
            progress(Some(day(2024, 1, 1)), Some(day(2024, 1, 2))),
            progress(Some(day(2023, 1, 1)), None),
            progress(None, None),
        ];
        let p = compute_percentages(&records, 10);
        assert_eq!(p, Percentages { presented: 20, validated: 10 });

        let p = compute_percentages(&records, 3);
        assert_eq!(p, Percentages { presented: 66, validated: 33 });
    }

    #[test]
    fn percentages_use_exact_integer_math() {
        let records: Vec<_> = (0..29).map(|_| progress(Some(day(2024, 1, 1)), None)).collect();
        assert_eq!(compute_percentages(&records, 100).presented, 29);
    }

    #[test]
    fn percentages_with_no_workshops_are_zero() {
        let records = vec![progress(Some(day(2024, 1, 1)), None)];
        assert_eq!(compute_percentages(&records, 0), Percentages::default());
    }

    #[test]
    fn parse_date_accepts_iso_forms() {
        assert_eq!(parse_date("2024-01-31"), Some(day(2024, 1, 31)));
        assert_eq!(
            parse_date("2024-01-31T10:30"),
            Some(Utc.with_ymd_and_hms(2024, 1, 31, 10, 30, 0).unwrap())
        );
        assert_eq!(
            parse_date("2024-01-31T10:30:00+01:00"),
            Some(Utc.with_ymd_and_hms(2024, 1, 31, 9, 30, 0).unwrap())
        );
        assert_eq!(parse_date("31/01/2024"), None);
    }

    #[test]
    fn period_with_unparsable_bound_matches_nothing() {
        let period = ReportPeriod::parse(Some("not a date"), Some("2024-02-01"));
        assert_eq!(period.interval, Interval::empty());
        assert_eq!(period.from, None);
        assert_eq!(period.to, Some(day(2024, 2, 1)));
    }

    #[test]
    fn reversed_period_matches_nothing() {
        let period = ReportPeriod::parse(Some("2024-02-01"), Some("2024-01-01"));
        assert_eq!(period.from, Some(day(2024, 2, 1)));
        assert_eq!(period.to, Some(day(2024, 1, 1)));

        let records = vec![
            progress(Some(day(2024, 1, 1)), None),
            progress(Some(day(2024, 1, 15)), Some(day(2024, 2, 1))),
            progress(None, Some(day(2024, 2, 1))),
        ];
        let sections = classify(&records, &period.interval);
        assert!(sections.presented.is_empty());
        assert!(sections.validated.is_empty());
        assert!(sections.presented_and_validated.is_empty());
    }

    #[test]
    fn period_treats_blank_bounds_as_absent() {
        let period = ReportPeriod::parse(Some(""), None);
        assert_eq!(period, ReportPeriod::unbounded());
    }

    #[test]
    fn report_skips_unknown_workshops_and_resolves_names() {
        let known = Workshop {
            id: Uuid::new_v4(),
            name: "Transvasement".to_string(),
            created_at: day(2023, 9, 1),
            updated_at: day(2023, 9, 1),
        };
        let kid = Kid {
            id: Uuid::new_v4(),
            name: "Léa".to_string(),
            level: KidLevel::Beginner,
            photo_url: None,
            created_at: day(2023, 9, 1),
            updated_at: day(2023, 9, 1),
        };
        let mut on_known = progress(Some(day(2024, 1, 10)), None);
        on_known.workshop_id = known.id;
        let orphan = progress(Some(day(2024, 1, 11)), None);

        let period = ReportPeriod::parse(Some("2024-01-01"), Some("2024-01-31"));
        let report = KidReport::build(kid, &[on_known, orphan], &[known], &period, true);

        assert_eq!(report.presented.len(), 1);
        assert_eq!(report.presented[0].workshop_name, "Transvasement");
        assert_eq!(
            report.percentages,
            Some(Percentages { presented: 200, validated: 0 })
        );
        assert_eq!(report.from, Some(day(2024, 1, 1)));
    }
}
