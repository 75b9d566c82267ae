//! Single-URL probe.
//!
//! The dispatcher issues one GET per URL with redirects disabled and folds
//! every outcome, including transport errors and timeouts, into a
//! [`StatusValue`]. It never returns an error to the caller.

use crate::error::UrlCheckError;
use crate::identity::IdentityProvider;
use crate::types::{CheckConfig, StatusValue};
use reqwest::header::{REFERER, USER_AGENT};
use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;

/// HTTP prober shared by all workers of a pool.
///
/// Cloning is cheap: the HTTP client and identity provider are reference
/// counted.
#[derive(Clone)]
pub struct Dispatcher {
    /// HTTP client with redirects disabled
    http_client: reqwest::Client,
    /// Per-request timeout
    timeout: Duration,
    /// Fixed referer header value
    referer: String,
    /// Source of the user agent for each request
    identity: Arc<dyn IdentityProvider>,
}

impl Dispatcher {
    /// Create a dispatcher from checker settings and an identity provider.
    ///
    /// # Errors
    ///
    /// Returns `UrlCheckError::Network` if the HTTP client cannot be built
    /// (for example when the TLS backend fails to initialize).
    pub fn new(
        config: &CheckConfig,
        identity: Arc<dyn IdentityProvider>,
    ) -> Result<Self, UrlCheckError> {
        let http_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                UrlCheckError::network_with_source("Failed to create HTTP client", e.to_string())
            })?;

        Ok(Self {
            http_client,
            timeout: config.timeout,
            referer: config.referer.clone(),
            identity,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Probe one URL and classify the outcome.
    ///
    /// - 200 is `Working`
    /// - 3xx is `Redirect(code)` (the redirect is not followed)
    /// - any other status is `NotWorking(code)`
    /// - exceeding the timeout is `Timeout`
    /// - anything else is `Failed(reason)`
    pub async fn probe(&self, url: &str) -> StatusValue {
        let request = self
            .http_client
            .get(url)
            .header(USER_AGENT, self.identity.next_identity())
            .header(REFERER, self.referer.as_str())
            .timeout(self.timeout);

        let status = match tokio::time::timeout(self.timeout, request.send()).await {
            Ok(Ok(response)) => StatusValue::from_http_status(response.status().as_u16()),
            Ok(Err(e)) if e.is_timeout() => StatusValue::Timeout,
            Ok(Err(e)) => StatusValue::Failed(describe_error(&e)),
            Err(_) => StatusValue::Timeout,
        };

        tracing::debug!(url, status = %status, "probe finished");
        status
    }
}

/// Render an error and its source chain as one line.
///
/// Sources whose text already appears in the message are skipped, since
/// some error types fold their cause into their own `Display`.
pub(crate) fn describe_error(err: &(dyn StdError + 'static)) -> String {
    let mut description = err.to_string();
    let mut source = err.source();

    while let Some(cause) = source {
        let text = cause.to_string();
        if !text.is_empty() && !description.contains(&text) {
            description.push_str(": ");
            description.push_str(&text);
        }
        source = cause.source();
    }

    description
}
