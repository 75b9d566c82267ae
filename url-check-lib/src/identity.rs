//! Client identity (user-agent) providers.
//!
//! Every probe presents a browser user agent taken from an
//! [`IdentityProvider`]. Providers are injected into the dispatcher.

use crate::error::UrlCheckError;
use reqwest::header::HeaderValue;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// User agent used when no provider can be initialized.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3";

const BUILTIN_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/130.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14.7; rv:132.0) Gecko/20100101 Firefox/132.0",
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:131.0) Gecko/20100101 Firefox/131.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/18.1 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36 Edg/131.0.0.0",
];

/// Supplies the user agent for each request.
pub trait IdentityProvider: Send + Sync {
    fn next_identity(&self) -> String;
}

/// Always returns the same user agent.
#[derive(Debug, Clone)]
pub struct StaticIdentity {
    user_agent: String,
}

impl StaticIdentity {
    pub fn new<S: Into<String>>(user_agent: S) -> Self {
        Self {
            user_agent: user_agent.into(),
        }
    }
}

impl Default for StaticIdentity {
    fn default() -> Self {
        Self::new(DEFAULT_USER_AGENT)
    }
}

impl IdentityProvider for StaticIdentity {
    fn next_identity(&self) -> String {
        self.user_agent.clone()
    }
}

/// Picks a user agent uniformly at random per request.
#[derive(Debug, Clone)]
pub struct RotatingIdentity {
    agents: Vec<String>,
}

impl RotatingIdentity {
    /// Rotate over the built-in desktop browser agents.
    pub fn builtin() -> Self {
        Self {
            agents: BUILTIN_USER_AGENTS.iter().map(|ua| ua.to_string()).collect(),
        }
    }

    /// Rotate over a caller-supplied list.
    ///
    /// Blank entries and entries that are not valid header values are
    /// dropped; an empty list is an error.
    pub fn from_agents<I, S>(agents: I) -> Result<Self, UrlCheckError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let agents: Vec<String> = agents
            .into_iter()
            .map(Into::into)
            .map(|ua| ua.trim().to_string())
            .filter(|ua| !ua.is_empty())
            .filter(|ua| {
                let valid = HeaderValue::from_str(ua).is_ok();
                if !valid {
                    tracing::warn!("Skipping user agent that is not a valid header value: {:?}", ua);
                }
                valid
            })
            .collect();

        if agents.is_empty() {
            return Err(UrlCheckError::config("User agent list is empty"));
        }

        Ok(Self { agents })
    }

    /// Load agents from a file with one user agent per line.
    ///
    /// Lines starting with '#' are comments.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, UrlCheckError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            UrlCheckError::file_error(
                path.to_string_lossy(),
                format!("Failed to read user agent file: {}", e),
            )
        })?;

        Self::from_agents(content.lines().filter(|line| !line.trim_start().starts_with('#')))
            .map_err(|_| {
                UrlCheckError::file_error(path.to_string_lossy(), "No user agents found in file")
            })
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

impl IdentityProvider for RotatingIdentity {
    fn next_identity(&self) -> String {
        self.agents[rand::random_range(0..self.agents.len())].clone()
    }
}

/// Build the identity provider for a run.
///
/// Without a path the built-in rotation is used. If the file cannot be
/// loaded, the static [`DEFAULT_USER_AGENT`] is used for the rest of the
/// process.
pub fn load_identity_provider(path: Option<&Path>) -> Arc<dyn IdentityProvider> {
    match path {
        None => Arc::new(RotatingIdentity::builtin()),
        Some(path) => match RotatingIdentity::from_file(path) {
            Ok(provider) => {
                tracing::debug!(
                    count = provider.len(),
                    path = %path.display(),
                    "loaded user agents"
                );
                Arc::new(provider)
            }
            Err(e) => {
                tracing::warn!("Failed to initialize user agents ({}), using fallback", e);
                Arc::new(StaticIdentity::default())
            }
        },
    }
}
