//! # URL Check Library
//!
//! A bounded, concurrent URL liveness checker.
//!
//! URLs are probed with a single GET each (redirects observed, never
//! followed) by a fixed-size worker pool. Every probe ends in a
//! [`StatusValue`]; network failures are results, not errors. Results keep
//! the label of the entity each URL belongs to so they can be exported as
//! `Model_name, URL, Status` sheets.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use url_check_lib::{CheckConfig, TracingProgress, UrlChecker, UrlTask};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CheckConfig::default()
//!         .with_max_workers(5)
//!         .with_timeout(Duration::from_secs(5));
//!     let checker = UrlChecker::with_config(config)?;
//!
//!     let tasks = vec![UrlTask::new("https://example.com/logo.png", "M100")];
//!     let columns = checker.check_batch(tasks, &TracingProgress).await;
//!     println!("{:?}", columns.statuses);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Bounded concurrency**: never more than `max_workers` probes in flight
//! - **Closed classification**: `Working`, `Redirect`, `NotWorking`, `Timeout`, `Failed`
//! - **Identity rotation**: per-request user agents with a static fallback
//! - **Document extraction and sheet export** for product JSON files, as
//!   xlsx workbooks or CSV, with an optional zip bundle

// Re-export main public API types and functions
// This makes them available as url_check_lib::TypeName
pub use aggregate::{ResultColumns, StatusTally};
pub use checker::UrlChecker;
pub use concurrent::{NoProgress, ProgressSink, TracingProgress, WorkerPool, PROGRESS_INTERVAL};
pub use config::{
    load_env_config, parse_timeout, ConfigManager, DefaultsConfig, EnvConfig, FileConfig,
    OutputConfig,
};
pub use dispatcher::Dispatcher;
pub use error::UrlCheckError;
pub use export::{
    bundle_results, report_dir, save_report, workbook_path, write_sheet, write_workbook,
    DocumentReport, ExportFormat, ExportOptions, BUNDLE_NAME, SHEET_HEADERS,
};
pub use extract::{extract_urls, read_document, ExtractedUrls};
pub use identity::{
    load_identity_provider, IdentityProvider, RotatingIdentity, StaticIdentity,
    DEFAULT_USER_AGENT,
};
pub use types::{
    CheckConfig, CheckResult, Progress, StatusValue, UrlCategory, UrlTask, DEFAULT_REFERER,
};

// Internal modules - these are not part of the public API
mod aggregate;
mod checker;
mod concurrent;
mod config;
mod dispatcher;
mod error;
mod export;
mod extract;
mod identity;
mod types;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, UrlCheckError>;

// Library version and metadata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
