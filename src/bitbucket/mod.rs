//! Blocking REST client for the Bitbucket Cloud API.
//!
//! This module provides the paginated pull-request retrieval used by check
//! and the commit build-status publishing used by out. The trait-based
//! [`PullRequestSource`] seam enables command-level tests to substitute an
//! in-memory source for real HTTP requests.

mod error;
mod models;
mod status;

pub use error::ApiError;
pub use models::{PullRequest, PullRequestState};
pub use status::{BuildStatus, BuildStatusUpdate};

use reqwest::blocking::Response;
use reqwest::header::ACCEPT;
use tracing::debug;
use url::Url;

use crate::repo::CommitSha;
use models::{ApiPullRequest, Paged};

/// Production API base for repository endpoints.
const API_BASE_URL: &str = "https://api.bitbucket.org/2.0/repositories";

/// Production base for HTTPS clone URLs.
const REPO_BASE_URL: &str = "https://bitbucket.org";

/// Page-size hint sent with the first pull-request request.
const PAGE_SIZE: u32 = 50;

/// Basic-auth credentials for the API and the git remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account username.
    pub username: String,
    /// Account password or app-specific token.
    pub password: String,
}

impl Credentials {
    /// Creates new credentials.
    #[must_use]
    pub const fn new(username: String, password: String) -> Self {
        Self { username, password }
    }
}

/// Source of pull-request snapshots for a tracked repository.
pub trait PullRequestSource {
    /// Fetches every visible pull request, following pagination to the end.
    ///
    /// Relative order across pages is not guaranteed; the version resolver
    /// re-sorts.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] on a non-2xx response,
    /// [`ApiError::Network`] on connection failure, or [`ApiError::Decode`]
    /// on malformed JSON. No retries are attempted.
    fn fetch_all(&self) -> Result<Vec<PullRequest>, ApiError>;
}

/// Blocking Bitbucket client bound to one repository.
#[derive(Debug)]
pub struct Client {
    http: reqwest::blocking::Client,
    api_base: Url,
    repo_url: String,
    credentials: Credentials,
}

impl Client {
    /// Creates a client for `workspace/slug` against the production API.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] when the repository coordinates do
    /// not form a valid URL.
    pub fn new(workspace: &str, slug: &str, credentials: Credentials) -> Result<Self, ApiError> {
        Self::with_base_urls(API_BASE_URL, REPO_BASE_URL, workspace, slug, credentials)
    }

    /// Creates a client against explicit base URLs.
    ///
    /// Intended for tests pointing at a local mock server.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] when a base URL cannot be parsed or
    /// extended with the repository path.
    pub fn with_base_urls(
        api_base: &str,
        repo_base: &str,
        workspace: &str,
        slug: &str,
        credentials: Credentials,
    ) -> Result<Self, ApiError> {
        let mut api = Url::parse(api_base).map_err(|error| ApiError::InvalidUrl {
            message: error.to_string(),
        })?;
        extend_path(&mut api, &[workspace, slug])?;

        let repo_url = format!("{repo_base}/{workspace}/{slug}.git");

        Ok(Self {
            http: reqwest::blocking::Client::new(),
            api_base: api,
            repo_url,
            credentials,
        })
    }

    /// Returns the HTTPS clone URL for the tracked repository.
    #[must_use]
    pub fn repo_url(&self) -> &str {
        &self.repo_url
    }

    /// Reports a build outcome against `commit`.
    ///
    /// POSTs to `<repo>/commit/<hash>/statuses/build`. The commit is the
    /// live HEAD of the materialized tree, which may differ from the hash in
    /// the persisted version when intermediate steps created commits.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] with the endpoint and raw body on a
    /// non-2xx response, or [`ApiError::Network`] on connection failure.
    pub fn publish_build_status(
        &self,
        commit: &CommitSha,
        update: &BuildStatusUpdate,
    ) -> Result<(), ApiError> {
        let url = self.api_url(&["commit", commit.as_str(), "statuses", "build"])?;
        let endpoint = url.to_string();

        debug!(%endpoint, state = update.state.as_str(), "publishing build status");

        let response = self
            .http
            .post(url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .header(ACCEPT, "application/json")
            .json(update)
            .send()
            .map_err(|error| ApiError::Network {
                endpoint: endpoint.clone(),
                message: error.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = read_body(response, &endpoint)?;
            return Err(ApiError::Transport {
                endpoint,
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }

    fn pull_request_page(&self, url: Url) -> Result<Paged<ApiPullRequest>, ApiError> {
        let endpoint = url.to_string();

        let response = self
            .http
            .get(url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .header(ACCEPT, "application/json")
            .send()
            .map_err(|error| ApiError::Network {
                endpoint: endpoint.clone(),
                message: error.to_string(),
            })?;

        let status = response.status();
        let body = read_body(response, &endpoint)?;

        if !status.is_success() {
            return Err(ApiError::Transport {
                endpoint,
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|error| ApiError::Decode {
            endpoint,
            message: error.to_string(),
        })
    }

    fn api_url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.api_base.clone();
        extend_path(&mut url, segments)?;
        Ok(url)
    }
}

impl PullRequestSource for Client {
    fn fetch_all(&self) -> Result<Vec<PullRequest>, ApiError> {
        let mut first = self.api_url(&["pullrequests"])?;
        first
            .query_pairs_mut()
            .append_pair("pagelen", &PAGE_SIZE.to_string());

        let mut collected = Vec::new();
        let mut next = Some(first);

        while let Some(page_url) = next {
            let page = self.pull_request_page(page_url)?;
            debug!(
                page_values = page.values.len(),
                reported_size = page.size,
                "fetched pull-request page"
            );

            collected.extend(page.values.into_iter().map(PullRequest::from));

            next = page
                .next
                .map(|raw| {
                    Url::parse(&raw).map_err(|error| ApiError::InvalidUrl {
                        message: format!("next page pointer '{raw}': {error}"),
                    })
                })
                .transpose()?;
        }

        Ok(collected)
    }
}

fn extend_path(url: &mut Url, segments: &[&str]) -> Result<(), ApiError> {
    let mut path = url.path_segments_mut().map_err(|()| ApiError::InvalidUrl {
        message: "API base cannot carry a path".to_owned(),
    })?;
    for segment in segments {
        path.push(segment);
    }
    drop(path);
    Ok(())
}

fn read_body(response: Response, endpoint: &str) -> Result<String, ApiError> {
    response.text().map_err(|error| ApiError::Network {
        endpoint: endpoint.to_owned(),
        message: error.to_string(),
    })
}
