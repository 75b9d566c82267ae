//! Terminal display logic for the url-check CLI.
//!
//! Headers, live progress, per-category summaries and the list of broken
//! URLs. Decorations go to stdout in text mode; progress always goes to
//! stderr so `--json` output stays clean.

use console::{pad_str, style, Alignment, StyledObject, Term};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url_check_lib::{
    DocumentReport, ExtractedUrls, Progress, ProgressSink, StatusTally, StatusValue,
    UrlCategory, UrlCheckError,
};

/// Broken rows listed per document before truncating.
const MAX_LISTED_PROBLEMS: usize = 10;

// ── Progress ─────────────────────────────────────────────────────────────────

/// Progress sink that writes `Processed N out of M URLs` lines to stderr.
pub struct ConsoleProgress {
    term: Term,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ConsoleProgress {
    fn report(&self, progress: Progress) -> Result<(), UrlCheckError> {
        self.term
            .write_line(&format!("  {}", style(progress).dim()))
            .map_err(UrlCheckError::from)
    }
}

// ── Header ───────────────────────────────────────────────────────────────────

/// Print the header for one input document.
pub fn print_header(path: &Path, urls: &ExtractedUrls, workers: usize) {
    println!(
        "{} {} {}",
        style("url-check").bold(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim(),
        style(path.display()).cyan(),
    );
    println!(
        "{}",
        style(format!(
            "{} | {} | Workers: {}",
            plural(urls.images.len(), "image URL"),
            plural(urls.attachments.len(), "attachment URL"),
            workers
        ))
        .dim()
    );
}

// ── Dry run ──────────────────────────────────────────────────────────────────

/// Print the tasks of a document without checking them.
pub fn print_dry_run(path: &Path, urls: &ExtractedUrls) {
    println!("{}", style(path.display()).bold());
    for category in [UrlCategory::Image, UrlCategory::Attachment] {
        for task in urls.get(category) {
            let label = if task.label.is_empty() {
                "-"
            } else {
                task.label.as_str()
            };
            println!(
                "  {}  {}  {}",
                pad_str(label, 16, Alignment::Left, Some("..")),
                style(format!("{:<10}", category.to_string())).dim(),
                task.url
            );
        }
    }
}

// ── Results ──────────────────────────────────────────────────────────────────

/// Colored short label for a status.
pub fn styled_status(status: &StatusValue) -> StyledObject<String> {
    let text = status.to_string();
    match status {
        StatusValue::Working => style(text).green(),
        StatusValue::Redirect(_) => style(text).cyan(),
        StatusValue::NotWorking(_) => style(text).red(),
        StatusValue::Timeout => style(text).yellow(),
        StatusValue::Failed(_) => style(text).red().dim(),
    }
}

/// Print the URLs that did not come back working.
pub fn print_problems(report: &DocumentReport) {
    let mut problems = Vec::new();
    for category in [UrlCategory::Image, UrlCategory::Attachment] {
        for (label, url, status) in report.sheet(category).rows() {
            if !status.is_working() {
                problems.push((category, label, url, status));
            }
        }
    }

    if problems.is_empty() {
        return;
    }

    println!();
    println!("  {}", style("Broken URLs:").yellow());
    for (category, label, url, status) in problems.iter().take(MAX_LISTED_PROBLEMS) {
        println!(
            "    {} {} {} {}  {}",
            style("•").dim(),
            style(format!("[{}]", category)).dim(),
            label,
            url,
            styled_status(status)
        );
    }
    if problems.len() > MAX_LISTED_PROBLEMS {
        println!(
            "    {}",
            style(format!(
                "... and {} more (see the result sheets)",
                problems.len() - MAX_LISTED_PROBLEMS
            ))
            .dim()
        );
    }
}

// ── Summary ──────────────────────────────────────────────────────────────────

/// Print per-category counts, elapsed time and the files written.
pub fn print_summary(report: &DocumentReport, duration: Duration, saved: &[PathBuf]) {
    println!(
        "  {}",
        style("────────────────────────────────────────────────────").dim()
    );
    for category in [UrlCategory::Image, UrlCategory::Attachment] {
        let tally = report.sheet(category).tally();
        println!(
            "  {}  {}",
            style(format!("{:<11}", category.to_string())).bold(),
            format_counts(&tally)
        );
    }
    println!(
        "  {} in {:.1}s  {}  {}",
        plural(report.tally().total(), "URL"),
        duration.as_secs_f64(),
        style("|").dim(),
        saved_line(saved)
    );
    println!();
}

/// Print where the bundle archive went.
pub fn print_bundle(archive: &Path, files: usize) {
    println!(
        "{} {} into {}",
        style("Bundled").bold(),
        plural(files, "result file"),
        style(archive.display()).cyan()
    );
}

fn saved_line(saved: &[PathBuf]) -> StyledObject<String> {
    if saved.is_empty() {
        return style("Not saved".to_string()).yellow();
    }

    let paths: Vec<String> = saved.iter().map(|p| p.display().to_string()).collect();
    style(format!("Saved to {}", paths.join(", "))).dim()
}

/// One-line tally like `3 working | 1 redirect | 0 not working | ...`.
pub fn format_counts(tally: &StatusTally) -> String {
    format!(
        "{} working | {} redirect | {} not working | {} timeout | {} failed",
        tally.working, tally.redirect, tally.not_working, tally.timeout, tally.failed
    )
}

fn plural(count: usize, noun: &str) -> String {
    format!("{} {}{}", count, noun, if count == 1 { "" } else { "s" })
}
