//! gpwatch-github - GitHub-backed change-request client for gpwatch.

mod api_url;
mod client;
mod requests;

pub use api_url::{ApiUrl, RepoRef};
pub use client::GithubClient;
pub use requests::GithubRequests;
