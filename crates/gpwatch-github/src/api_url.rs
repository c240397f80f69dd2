//! API base URL and repository reference types.

use std::fmt;
use std::str::FromStr;

use url::Url;

use gpwatch_core::error::{Error, SubmissionError};

fn config_error(message: String) -> Error {
    Error::Submission(SubmissionError::Config { message })
}

/// A validated API base URL.
///
/// Must use HTTPS; plain HTTP is allowed only for localhost so tests can
/// point the client at a mock server.
///
/// # Example
///
/// ```
/// use gpwatch_github::ApiUrl;
///
/// let api = ApiUrl::new("https://api.github.com").unwrap();
/// assert_eq!(api.endpoint("repos/octo/demo/pulls"),
///            "https://api.github.com/repos/octo/demo/pulls");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiUrl(Url);

impl ApiUrl {
    /// Create a new API URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not absolute, not HTTPS (or HTTP on
    /// localhost), or has no host.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| config_error(format!("invalid API URL '{s}': {e}")))?;

        if url.cannot_be_a_base() {
            return Err(config_error(format!(
                "invalid API URL '{s}': must be an absolute URL"
            )));
        }

        let is_localhost = url
            .host_str()
            .is_some_and(|h| h == "localhost" || h == "127.0.0.1" || h == "::1");

        let scheme = url.scheme();
        if scheme != "https" && !(scheme == "http" && is_localhost) {
            return Err(config_error(format!(
                "invalid API URL '{s}': must use HTTPS (HTTP allowed only for localhost)"
            )));
        }

        if url.host_str().is_none() {
            return Err(config_error(format!("invalid API URL '{s}': must have a host")));
        }

        Ok(Self(url))
    }

    /// Returns the full URL for an API endpoint path.
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.0.as_str().trim_end_matches('/');
        format!("{}/{}", base, path.trim_start_matches('/'))
    }

    /// Returns the base URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ApiUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ApiUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// A validated `owner/name` repository reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepoRef {
    owner: String,
    name: String,
}

impl RepoRef {
    /// Create a repository reference from an `owner/name` string.
    ///
    /// # Errors
    ///
    /// Returns an error unless the string is exactly two non-empty
    /// segments separated by one `/`.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        match s.split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(config_error(format!(
                "invalid repository '{s}': expected 'owner/name'"
            ))),
        }
    }

    /// Returns the repository owner.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Returns the repository name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
