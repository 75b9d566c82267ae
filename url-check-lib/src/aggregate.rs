//! Collection of batch results into parallel columns.
//!
//! Exporters consume results as three equally long columns (labels, urls,
//! statuses) where index `i` of each column describes the same result.
//! Row order is completion order.

use crate::types::{CheckResult, StatusValue};
use serde::{Deserialize, Serialize};

/// Parallel columns for one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultColumns {
    pub labels: Vec<String>,
    pub urls: Vec<String>,
    pub statuses: Vec<StatusValue>,
}

impl ResultColumns {
    /// Collect results into columns, keeping each row intact.
    pub fn collect<I>(results: I) -> Self
    where
        I: IntoIterator<Item = CheckResult>,
    {
        let mut columns = Self::default();
        for result in results {
            columns.push(result);
        }
        columns
    }

    pub fn push(&mut self, result: CheckResult) {
        self.labels.push(result.label);
        self.urls.push(result.url);
        self.statuses.push(result.status);
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    /// Iterate rows as `(label, url, status)`.
    pub fn rows(&self) -> impl Iterator<Item = (&str, &str, &StatusValue)> + '_ {
        self.labels
            .iter()
            .zip(&self.urls)
            .zip(&self.statuses)
            .map(|((label, url), status)| (label.as_str(), url.as_str(), status))
    }

    /// Count rows per status class.
    pub fn tally(&self) -> StatusTally {
        let mut tally = StatusTally::default();
        for status in &self.statuses {
            tally.record(status);
        }
        tally
    }
}

impl FromIterator<CheckResult> for ResultColumns {
    fn from_iter<T: IntoIterator<Item = CheckResult>>(iter: T) -> Self {
        Self::collect(iter)
    }
}

/// Number of results in each status class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTally {
    pub working: usize,
    pub redirect: usize,
    pub not_working: usize,
    pub timeout: usize,
    pub failed: usize,
}

impl StatusTally {
    pub fn record(&mut self, status: &StatusValue) {
        match status {
            StatusValue::Working => self.working += 1,
            StatusValue::Redirect(_) => self.redirect += 1,
            StatusValue::NotWorking(_) => self.not_working += 1,
            StatusValue::Timeout => self.timeout += 1,
            StatusValue::Failed(_) => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.working + self.redirect + self.not_working + self.timeout + self.failed
    }

    /// Results that did not come back as `Working` or `Redirect`.
    pub fn broken(&self) -> usize {
        self.not_working + self.timeout + self.failed
    }

    pub fn merge(&mut self, other: &StatusTally) {
        self.working += other.working;
        self.redirect += other.redirect;
        self.not_working += other.not_working;
        self.timeout += other.timeout;
        self.failed += other.failed;
    }
}
