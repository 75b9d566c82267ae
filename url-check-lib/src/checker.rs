//! Main URL checker implementation.
//!
//! This module provides the primary `UrlChecker` struct that ties the
//! dispatcher, worker pool and aggregator together behind one API.

use crate::aggregate::ResultColumns;
use crate::concurrent::{ProgressSink, WorkerPool};
use crate::dispatcher::Dispatcher;
use crate::error::UrlCheckError;
use crate::export::DocumentReport;
use crate::extract::ExtractedUrls;
use crate::identity::{load_identity_provider, IdentityProvider};
use crate::types::{CheckConfig, CheckResult, StatusValue, UrlCategory, UrlTask};
use std::sync::Arc;

/// Main URL checker that coordinates probing operations.
///
/// # Example
///
/// ```rust,no_run
/// use url_check_lib::{NoProgress, UrlChecker, UrlTask};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let checker = UrlChecker::new()?;
///     let tasks = vec![
///         UrlTask::new("https://example.com/", "home"),
///         UrlTask::new("https://example.com/missing.png", "home"),
///     ];
///     let columns = checker.check_batch(tasks, &NoProgress).await;
///     for (label, url, status) in columns.rows() {
///         println!("{} {} {}", label, url, status);
///     }
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct UrlChecker {
    /// Configuration settings for this checker instance
    config: CheckConfig,
    /// Prober shared by all workers
    dispatcher: Dispatcher,
    /// Bounded pool sized from the configuration
    pool: WorkerPool,
}

impl UrlChecker {
    /// Create a new URL checker with default configuration.
    ///
    /// Default settings:
    /// - Workers: 5
    /// - Timeout: 5 seconds
    /// - Referer: https://www.google.com/
    /// - User agents: built-in rotation
    pub fn new() -> Result<Self, UrlCheckError> {
        Self::with_config(CheckConfig::default())
    }

    /// Create a new URL checker with custom configuration.
    ///
    /// The identity provider is loaded from `config.user_agents` when set,
    /// falling back to the static default agent if that file is unusable.
    ///
    /// # Example
    ///
    /// ```rust
    /// use url_check_lib::{CheckConfig, UrlChecker};
    /// use std::time::Duration;
    ///
    /// let config = CheckConfig::default()
    ///     .with_max_workers(10)
    ///     .with_timeout(Duration::from_secs(3));
    ///
    /// let checker = UrlChecker::with_config(config).unwrap();
    /// assert_eq!(checker.config().max_workers, 10);
    /// ```
    pub fn with_config(config: CheckConfig) -> Result<Self, UrlCheckError> {
        let identity = load_identity_provider(config.user_agents.as_deref());
        Self::with_identity(config, identity)
    }

    /// Create a checker with an explicit identity provider.
    pub fn with_identity(
        config: CheckConfig,
        identity: Arc<dyn IdentityProvider>,
    ) -> Result<Self, UrlCheckError> {
        let dispatcher = Dispatcher::new(&config, identity)?;
        let pool = WorkerPool::new(config.max_workers);

        Ok(Self {
            config,
            dispatcher,
            pool,
        })
    }

    /// Probe a single URL.
    pub async fn check_url(&self, url: &str) -> StatusValue {
        self.dispatcher.probe(url).await
    }

    /// Check a batch of tasks concurrently.
    ///
    /// Returns one result per non-blank task, in completion order.
    pub async fn process(
        &self,
        tasks: Vec<UrlTask>,
        progress: &dyn ProgressSink,
    ) -> Vec<CheckResult> {
        let dispatcher = self.dispatcher.clone();
        let probe = move |url: String| {
            let dispatcher = dispatcher.clone();
            async move { dispatcher.probe(&url).await }
        };

        self.pool.process(tasks, probe, progress).await
    }

    /// Check a batch and collect the results into parallel columns.
    pub async fn check_batch(
        &self,
        tasks: Vec<UrlTask>,
        progress: &dyn ProgressSink,
    ) -> ResultColumns {
        let results = self.process(tasks, progress).await;
        let columns = ResultColumns::collect(results);
        tracing::info!(
            results = columns.len(),
            broken = columns.tally().broken(),
            "batch complete"
        );
        columns
    }

    /// Check every URL of a document, images first, then attachments.
    pub async fn check_document(
        &self,
        source: &str,
        urls: &ExtractedUrls,
        progress: &dyn ProgressSink,
    ) -> DocumentReport {
        let mut report = DocumentReport::new(source);
        for category in [UrlCategory::Image, UrlCategory::Attachment] {
            let tasks = urls.get(category).to_vec();
            *report.sheet_mut(category) = self.check_batch(tasks, progress).await;
        }
        report
    }

    /// Get the current configuration for this checker.
    pub fn config(&self) -> &CheckConfig {
        &self.config
    }
}
