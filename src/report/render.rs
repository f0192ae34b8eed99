//! HTML rendering of progress reports, laid out for printing.
//!
//! Sections are wrapped in `break-inside-avoid` blocks and consecutive kid
//! reports are separated by a `break-before-page` rule, so each kid starts
//! on a fresh page when printed.

use super::format::{entry_dates, format_date};
use super::{KidReport, ReportEntry, SectionKind};

/// Inline message shown when a single-kid report is requested without an id.
pub const MISSING_KID_ID: &str = "Missing param kidId";

const PAGE_BREAK: &str = "<hr class=\"break-before-page\">\n";

const PRINT_CSS: &str = "\
.flex { display: flex; }
.flex-col { flex-direction: column; }
.gap-4 { gap: 1rem; }
.text-4xl { font-size: 2.25rem; }
.text-2xl { font-size: 1.5rem; }
.text-xl { font-size: 1.25rem; }
.break-inside-avoid { break-inside: avoid; }
.break-before-page { break-before: page; border: 0; }
";

/// Render one kid's report as an HTML fragment.
pub fn render_kid_report(report: &KidReport) -> String {
    let mut out = String::from("<div class=\"flex flex-col gap-4\">\n");

    out.push_str("<div>");
    out.push_str(&format!(
        "<span class=\"text-4xl\">Progression de {}</span>",
        escape(&report.kid.name)
    ));
    if let Some(from) = report.from {
        out.push_str(&format!(
            "<span class=\"text-xl\"> depuis {}</span>",
            format_date(from)
        ));
    }
    if let Some(to) = report.to {
        out.push_str(&format!(
            "<span class=\"text-xl\"> jusqu'au {}</span>",
            format_date(to)
        ));
    }
    out.push_str("</div>\n");

    if let Some(percentages) = report.percentages {
        out.push_str(&format!(
            "<div><div>Présentés: {}%</div><div>Validés: {}%</div></div>\n",
            percentages.presented, percentages.validated
        ));
    }

    for (kind, entries) in report.sections() {
        if !entries.is_empty() {
            render_section(&mut out, kind, entries);
        }
    }

    out.push_str("</div>\n");
    out
}

fn render_section(out: &mut String, kind: SectionKind, entries: &[ReportEntry]) {
    out.push_str("<div class=\"break-inside-avoid\">\n");
    out.push_str(&format!("<div class=\"text-2xl\">{}</div>\n", kind.title()));
    out.push_str("<ul>\n");
    for entry in entries {
        out.push_str(&format!(
            "<li><span class=\"text-xl\">{}</span>{}</li>\n",
            escape(&entry.workshop_name),
            entry_dates(entry)
        ));
    }
    out.push_str("</ul>\n</div>\n");
}

/// Render several reports back to back, one page per kid.
pub fn render_reports(reports: &[KidReport]) -> String {
    reports
        .iter()
        .map(render_kid_report)
        .collect::<Vec<_>>()
        .join(PAGE_BREAK)
}

/// Wrap a fragment into a standalone printable document.
pub fn render_page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"fr\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>\n{}</style>\n</head>\n<body>\n{}</body>\n</html>\n",
        escape(title),
        PRINT_CSS,
        body
    )
}

/// The inline error fragment for a missing `kidId` parameter.
pub fn render_missing_kid_id() -> String {
    format!("<div>{}</div>\n", MISSING_KID_ID)
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
