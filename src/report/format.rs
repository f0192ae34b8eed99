use chrono::{DateTime, Datelike, Utc};

use super::ReportEntry;

const MONTHS: [&str; 12] = [
    "janv.", "févr.", "mars", "avr.", "mai", "juin", "juil.", "août", "sept.", "oct.", "nov.",
    "déc.",
];

/// Format a date the way French medium dates read: `10 janv. 2024`.
pub fn format_date(dt: DateTime<Utc>) -> String {
    let month = MONTHS[dt.month0() as usize];
    format!("{} {} {}", dt.day(), month, dt.year())
}

/// The dated part of a report line, e.g. ` - présenté le 10 janv. 2024`.
pub(crate) fn entry_dates(entry: &ReportEntry) -> String {
    let mut out = String::new();
    if let Some(at) = entry.presented_at {
        out.push_str(" - présenté le ");
        out.push_str(&format_date(at));
    }
    if let Some(at) = entry.validated_at {
        out.push_str(" - validé le ");
        out.push_str(&format_date(at));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_day_month_year() {
        let dt = Utc.with_ymd_and_hms(2024, 1, 10, 15, 0, 0).unwrap();
        assert_eq!(format_date(dt), "10 janv. 2024");
    }

    #[test]
    fn short_month_names_have_no_dot() {
        let may = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let august = Utc.with_ymd_and_hms(2023, 8, 31, 0, 0, 0).unwrap();
        assert_eq!(format_date(may), "1 mai 2024");
        assert_eq!(format_date(august), "31 août 2023");
    }
}
