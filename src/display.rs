//! Terminal rendering of cached results.

use crossterm::style::{Color, Stylize, style};

use crate::DocumentKind;
use crate::pipeline::{DocumentReport, SiteScan};
use crate::score::Verdict;
use crate::storage::SiteRecord;

const NO_SCORE: &str = "No score available.";

fn verdict_color(verdict: Verdict) -> Color {
    match verdict {
        Verdict::Poor => Color::Red,
        Verdict::Good => Color::Green,
    }
}

fn missing_summary(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::PrivacyPolicy => "No policy text found.",
        DocumentKind::TermsOfService => "No terms text found.",
    }
}

/// Renders everything cached for an origin, the way the popup shows it.
pub fn render_site(origin: &str, record: &SiteRecord) -> String {
    let mut out = format!("{}\n\n", style(origin).bold());

    for (kind, heading) in [
        (DocumentKind::PrivacyPolicy, "Privacy Policy"),
        (DocumentKind::TermsOfService, "Terms of Service"),
    ] {
        out.push_str(&format!(
            "{}\n{}\n\n",
            style(heading).underlined(),
            record.summary(kind).unwrap_or(missing_summary(kind))
        ));
    }

    out.push_str(&render_score(record.score));
    out
}

/// Renders the privacy score line and its color-coded verdict.
pub fn render_score(score: Option<u32>) -> String {
    match score {
        Some(score) => {
            let verdict = Verdict::from_score(score);
            let color = verdict_color(verdict);
            format!(
                "Privacy score: {}\n{}\n",
                style(score).with(color).bold(),
                style(verdict.message()).with(color)
            )
        }
        None => format!("Privacy score: {NO_SCORE}\nNo privacy score available.\n"),
    }
}

/// Renders the outcome of a site scan.
pub fn render_scan(scan: &SiteScan) -> String {
    let mut out = format!("{}\n\n", style(&scan.origin).bold());
    let mut score = None;

    for kind in DocumentKind::ALL {
        let body = match scan.report(kind) {
            DocumentReport::Analyzed(analysis) => {
                score = analysis.score.or(score);
                let source = if analysis.cached { " (cached)" } else { "" };
                format!("{}{source}\n{}", kind, analysis.summary)
            }
            DocumentReport::NotFound => format!("{kind}\n{}", missing_summary(kind)),
            DocumentReport::Failed(message) => {
                format!("{kind}\n{}", style(format!("Error: {message}")).with(Color::Red))
            }
        };
        out.push_str(&body);
        out.push_str("\n\n");
    }

    out.push_str(&render_score(score));
    out
}
