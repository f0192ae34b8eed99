//! Plain-text rendering of a progress report for the terminal.

use super::format::{entry_dates, format_date};
use super::KidReport;

/// Render a report as indented plain text.
///
/// Example output:
/// ```text
/// Progression de Léa depuis 1 janv. 2024 jusqu'au 31 janv. 2024
/// Présentés: 20%
/// Validés: 10%
///
/// Présentés
///   - Transvasement - présenté le 10 janv. 2024
/// ```
pub fn render_text(report: &KidReport) -> String {
    let mut output = format!("Progression de {}", report.kid.name);
    if let Some(from) = report.from {
        output.push_str(" depuis ");
        output.push_str(&format_date(from));
    }
    if let Some(to) = report.to {
        output.push_str(" jusqu'au ");
        output.push_str(&format_date(to));
    }
    output.push('\n');

    if let Some(p) = report.percentages {
        output.push_str(&format!("Présentés: {}%\nValidés: {}%\n", p.presented, p.validated));
    }

    for (kind, entries) in report.sections() {
        if entries.is_empty() {
            continue;
        }
        output.push('\n');
        output.push_str(kind.title());
        output.push('\n');
        for entry in entries {
            output.push_str("  - ");
            output.push_str(&entry.workshop_name);
            output.push_str(&entry_dates(entry));
            output.push('\n');
        }
    }

    output
}
