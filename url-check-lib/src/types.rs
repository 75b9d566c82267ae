//! Core data types for URL checking.
//!
//! This module defines the task and result types that flow through the
//! worker pool, the closed status classification, and the checker
//! configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Referer sent with every probe unless configured otherwise.
pub const DEFAULT_REFERER: &str = "https://www.google.com/";

/// One URL to check, paired with the entity it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlTask {
    /// The URL to probe
    pub url: String,

    /// Owning entity, e.g. the product model name
    pub label: String,
}

impl UrlTask {
    pub fn new<U: Into<String>, L: Into<String>>(url: U, label: L) -> Self {
        Self {
            url: url.into(),
            label: label.into(),
        }
    }

    /// Blank tasks are dropped before dispatch and never produce a result.
    pub fn is_blank(&self) -> bool {
        self.url.trim().is_empty()
    }
}

/// Classification of a single probe.
///
/// Every probe ends in exactly one of these; transport errors and timeouts
/// are values here rather than errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum StatusValue {
    /// HTTP 200
    Working,

    /// HTTP 3xx, observed but not followed
    Redirect(u16),

    /// Any other HTTP status
    NotWorking(u16),

    /// The request did not finish within the configured timeout
    Timeout,

    /// Transport failure or lost worker, with a short diagnostic
    Failed(String),
}

impl StatusValue {
    /// Classify an HTTP status code.
    pub fn from_http_status(code: u16) -> Self {
        match code {
            200 => Self::Working,
            300..=399 => Self::Redirect(code),
            _ => Self::NotWorking(code),
        }
    }

    pub fn is_working(&self) -> bool {
        matches!(self, Self::Working)
    }
}

impl fmt::Display for StatusValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Working => write!(f, "Working"),
            Self::Redirect(code) => write!(f, "Redirect - Status Code: {}", code),
            Self::NotWorking(code) => write!(f, "Not Working - Status Code: {}", code),
            Self::Timeout => write!(f, "Timeout"),
            Self::Failed(reason) => write!(f, "Failed - {}", reason),
        }
    }
}

/// Outcome of checking one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub url: String,
    pub label: String,
    pub status: StatusValue,
}

impl CheckResult {
    /// Attach a status to the task it was produced for.
    pub fn new(task: UrlTask, status: StatusValue) -> Self {
        Self {
            url: task.url,
            label: task.label,
            status,
        }
    }
}

/// Which part of a document a URL came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrlCategory {
    Image,
    Attachment,
}

impl UrlCategory {
    /// Name of the exported sheet holding this category.
    pub fn sheet_name(&self) -> &'static str {
        match self {
            UrlCategory::Image => "image_status",
            UrlCategory::Attachment => "pdf_status",
        }
    }
}

impl fmt::Display for UrlCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrlCategory::Image => write!(f, "image"),
            UrlCategory::Attachment => write!(f, "attachment"),
        }
    }
}

/// Progress of a running batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Results collected so far
    pub completed: usize,

    /// Non-blank tasks in the batch
    pub total: usize,
}

impl Progress {
    pub fn is_finished(&self) -> bool {
        self.completed == self.total
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Processed {} out of {} URLs", self.completed, self.total)
    }
}

/// Configuration options for URL checking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Maximum number of probes in flight at once
    /// Default: 5, Range: 1-100
    pub max_workers: usize,

    /// Timeout for each individual probe
    /// Default: 5 seconds
    #[serde(skip)]
    pub timeout: Duration,

    /// Referer header sent with every probe
    pub referer: String,

    /// Optional file of user agents, one per line
    /// Default: None (built-in list)
    pub user_agents: Option<PathBuf>,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            max_workers: 5,
            timeout: Duration::from_secs(5),
            referer: DEFAULT_REFERER.to_string(),
            user_agents: None,
        }
    }
}

impl CheckConfig {
    /// Set the worker count, clamped to 1-100.
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.clamp(1, 100);
        self
    }

    /// Set custom timeout for probes.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_referer<R: Into<String>>(mut self, referer: R) -> Self {
        self.referer = referer.into();
        self
    }

    /// Load user agents from a file instead of the built-in list.
    pub fn with_user_agents<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.user_agents = Some(path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_policy() {
        assert_eq!(StatusValue::from_http_status(200), StatusValue::Working);
        assert_eq!(StatusValue::from_http_status(301), StatusValue::Redirect(301));
        assert_eq!(StatusValue::from_http_status(300), StatusValue::Redirect(300));
        assert_eq!(StatusValue::from_http_status(399), StatusValue::Redirect(399));
        assert_eq!(StatusValue::from_http_status(404), StatusValue::NotWorking(404));
        assert_eq!(StatusValue::from_http_status(500), StatusValue::NotWorking(500));
        // Only 200 counts as working, other 2xx codes do not
        assert_eq!(StatusValue::from_http_status(204), StatusValue::NotWorking(204));
        assert_eq!(StatusValue::from_http_status(199), StatusValue::NotWorking(199));
    }

    #[test]
    fn test_status_display() {
        assert_eq!(StatusValue::Working.to_string(), "Working");
        assert_eq!(
            StatusValue::Redirect(302).to_string(),
            "Redirect - Status Code: 302"
        );
        assert_eq!(
            StatusValue::NotWorking(404).to_string(),
            "Not Working - Status Code: 404"
        );
        assert_eq!(StatusValue::Timeout.to_string(), "Timeout");
        assert_eq!(
            StatusValue::Failed("connection refused".to_string()).to_string(),
            "Failed - connection refused"
        );
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&StatusValue::NotWorking(404)).unwrap();
        assert_eq!(json, r#"{"kind":"not_working","detail":404}"#);

        let json = serde_json::to_string(&StatusValue::Working).unwrap();
        assert_eq!(json, r#"{"kind":"working"}"#);
    }

    #[test]
    fn test_blank_tasks() {
        assert!(UrlTask::new("", "m1").is_blank());
        assert!(UrlTask::new("   ", "m1").is_blank());
        assert!(!UrlTask::new("http://x/", "").is_blank());
    }

    #[test]
    fn test_progress_display() {
        let progress = Progress {
            completed: 10,
            total: 42,
        };
        assert_eq!(progress.to_string(), "Processed 10 out of 42 URLs");
        assert!(!progress.is_finished());
        assert!(Progress { completed: 42, total: 42 }.is_finished());
    }

    #[test]
    fn test_config_defaults_and_clamping() {
        let config = CheckConfig::default();
        assert_eq!(config.max_workers, 5);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.referer, DEFAULT_REFERER);

        assert_eq!(CheckConfig::default().with_max_workers(0).max_workers, 1);
        assert_eq!(CheckConfig::default().with_max_workers(500).max_workers, 100);
    }

    #[test]
    fn test_sheet_names() {
        assert_eq!(UrlCategory::Image.sheet_name(), "image_status");
        assert_eq!(UrlCategory::Attachment.sheet_name(), "pdf_status");
    }
}
