//! GitHub REST API client.

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, instrument, trace};

use gpwatch_core::error::{Error, SubmissionError};

use crate::api_url::ApiUrl;

/// Media type for structured API responses.
const ACCEPT_JSON: &str = "application/vnd.github+json";

/// Media type that returns a file's raw content from the contents API.
const ACCEPT_RAW: &str = "application/vnd.github.raw+json";

/// Error body shape the API returns for failed requests.
#[derive(Debug, serde::Deserialize)]
struct ApiErrorResponse {
    message: Option<String>,
}

fn map_reqwest(err: reqwest::Error) -> Error {
    let submission = if err.is_timeout() {
        SubmissionError::Timeout
    } else {
        SubmissionError::Transport {
            message: err.to_string(),
        }
    };
    Error::Submission(submission)
}

/// HTTP client for GitHub REST requests.
#[derive(Debug, Clone)]
pub struct GithubClient {
    client: reqwest::Client,
    api: ApiUrl,
    token: String,
}

impl GithubClient {
    /// Create a new client for the given API base URL and token.
    pub fn new(api: ApiUrl, token: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("gpwatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            api,
            token: token.into(),
        }
    }

    /// Returns the API base URL this client is configured for.
    pub fn api(&self) -> &ApiUrl {
        &self.api
    }

    /// Make a GET request expecting a JSON response.
    #[instrument(skip(self), fields(api = %self.api))]
    pub async fn get<Q, R>(&self, path: &str, query: &Q) -> Result<R, Error>
    where
        Q: Serialize + std::fmt::Debug,
        R: DeserializeOwned,
    {
        let url = self.api.endpoint(path);
        debug!(path, "GET");
        trace!(?query, "query parameters");

        let response = self
            .client
            .get(&url)
            .query(query)
            .headers(self.headers(ACCEPT_JSON))
            .send()
            .await
            .map_err(map_reqwest)?;

        self.handle_response(response).await
    }

    /// Make a GET request expecting the raw file media type.
    #[instrument(skip(self), fields(api = %self.api))]
    pub async fn get_raw<Q>(&self, path: &str, query: &Q) -> Result<String, Error>
    where
        Q: Serialize + std::fmt::Debug,
    {
        let url = self.api.endpoint(path);
        debug!(path, "GET (raw)");

        let response = self
            .client
            .get(&url)
            .query(query)
            .headers(self.headers(ACCEPT_RAW))
            .send()
            .await
            .map_err(map_reqwest)?;

        let status = response.status();
        if status.is_success() {
            response.text().await.map_err(map_reqwest)
        } else {
            Err(Error::Submission(self.parse_error_response(response).await))
        }
    }

    /// Make a POST request with a JSON body, expecting a JSON response.
    #[instrument(skip(self, body), fields(api = %self.api))]
    pub async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, Error>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let url = self.api.endpoint(path);
        debug!(path, "POST");

        let response = self
            .client
            .post(&url)
            .json(body)
            .headers(self.headers(ACCEPT_JSON))
            .send()
            .await
            .map_err(map_reqwest)?;

        self.handle_response(response).await
    }

    /// Make a POST request and discard the response body.
    #[instrument(skip(self, body), fields(api = %self.api))]
    pub async fn post_no_response<B>(&self, path: &str, body: &B) -> Result<(), Error>
    where
        B: Serialize,
    {
        let url = self.api.endpoint(path);
        debug!(path, "POST (no response)");

        let response = self
            .client
            .post(&url)
            .json(body)
            .headers(self.headers(ACCEPT_JSON))
            .send()
            .await
            .map_err(map_reqwest)?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Error::Submission(self.parse_error_response(response).await))
        }
    }

    /// Make a PUT request with a JSON body, expecting a JSON response.
    #[instrument(skip(self, body), fields(api = %self.api))]
    pub async fn put<B, R>(&self, path: &str, body: &B) -> Result<R, Error>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let url = self.api.endpoint(path);
        debug!(path, "PUT");

        let response = self
            .client
            .put(&url)
            .json(body)
            .headers(self.headers(ACCEPT_JSON))
            .send()
            .await
            .map_err(map_reqwest)?;

        self.handle_response(response).await
    }

    fn headers(&self, accept: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let auth_value = format!("Bearer {}", self.token);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth_value).expect("invalid token characters"),
        );
        headers.insert(ACCEPT, HeaderValue::from_static(accept));
        headers
    }

    /// Handle an API response, parsing the body or error.
    async fn handle_response<R: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<R, Error> {
        let status = response.status();
        trace!(status = %status, "API response");

        if status.is_success() {
            response
                .json::<R>()
                .await
                .map_err(|e| {
                    Error::Submission(SubmissionError::InvalidResponse {
                        message: e.to_string(),
                    })
                })
        } else {
            Err(Error::Submission(self.parse_error_response(response).await))
        }
    }

    /// Parse an API error response body.
    async fn parse_error_response(&self, response: reqwest::Response) -> SubmissionError {
        let status = response.status().as_u16();

        match response.json::<ApiErrorResponse>().await {
            Ok(body) => SubmissionError::Api {
                status,
                message: body.message,
            },
            Err(_) => SubmissionError::Api {
                status,
                message: None,
            },
        }
    }
}
