use super::types::{commits_by, ApiRepository, ApiUser, ContributorStats, TrafficSummary};
use super::{RepoListing, RepoMetrics};
use crate::error::{Result, StarboardError};
use crate::model::ListedRepository;
use chrono::Utc;
use reqwest::blocking::{Client, Response};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const PER_PAGE: usize = 100;

/// Blocking client for the handful of REST endpoints the tracker needs.
pub struct GitHubClient {
    http: Client,
    api_url: String,
    owner: String,
}

impl GitHubClient {
    pub fn new(token: &str, owner: impl Into<String>, api_url: &str) -> Result<Self> {
        let http = build_http(token)?;
        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            owner: owner.into(),
        })
    }

    /// Builds a client whose owner is the login the token belongs to.
    pub fn for_token_owner(token: &str, api_url: &str) -> Result<Self> {
        let mut client = Self::new(token, String::new(), api_url)?;
        client.owner = client.authenticated_login()?;
        Ok(client)
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn authenticated_login(&self) -> Result<String> {
        let user: ApiUser = self.get_json(&format!("{}/user", self.api_url), &[])?;
        Ok(user.login)
    }

    fn repo_url(&self, repo: &str, tail: &str) -> String {
        format!("{}/repos/{}/{}/{}", self.api_url, self.owner, repo, tail)
    }

    fn send(&self, url: &str, query: &[(&str, String)]) -> Result<Response> {
        debug!(url, "GET");
        let response = self.http.get(url).query(query).send()?;
        let status = response.status();
        if status == StatusCode::ACCEPTED {
            return Err(StarboardError::StatsPending(url.to_string()));
        }
        if !status.is_success() {
            return Err(StarboardError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        let response = self.send(url, query)?;
        Ok(response.json()?)
    }

    fn traffic(&self, repo: &str, kind: &str) -> Result<u64> {
        let url = self.repo_url(repo, &format!("traffic/{kind}"));
        // cache buster
        let query = [("ts", Utc::now().timestamp().to_string())];
        let summary: TrafficSummary = self.get_json(&url, &query)?;
        Ok(summary.count)
    }
}

fn build_http(token: &str) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static("application/vnd.github+json"),
    );
    let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|_| StarboardError::Credentials("token contains invalid characters".to_string()))?;
    auth.set_sensitive(true);
    headers.insert(header::AUTHORIZATION, auth);

    let client = Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .default_headers(headers)
        .timeout(REQUEST_TIMEOUT)
        .build()?;
    Ok(client)
}

impl RepoListing for GitHubClient {
    fn list_repositories(&self) -> Result<Vec<ListedRepository>> {
        let url = format!("{}/user/repos", self.api_url);
        let mut repos = Vec::new();
        let mut page = 1usize;
        loop {
            let query = [
                ("visibility", "public".to_string()),
                ("affiliation", "owner".to_string()),
                ("per_page", PER_PAGE.to_string()),
                ("page", page.to_string()),
            ];
            let batch: Vec<ApiRepository> = self.get_json(&url, &query)?;
            let done = batch.len() < PER_PAGE;
            repos.extend(batch.into_iter().map(ListedRepository::from));
            if done {
                break;
            }
            page += 1;
        }
        debug!(count = repos.len(), "listed repositories");
        Ok(repos)
    }
}

impl RepoMetrics for GitHubClient {
    fn commits(&self, repo: &str) -> Result<u64> {
        let url = self.repo_url(repo, "stats/contributors");
        let response = self.send(&url, &[])?;
        // empty repositories have no contributor stats
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(0);
        }
        let stats: Vec<ContributorStats> = response.json()?;
        Ok(commits_by(&stats, &self.owner))
    }

    fn views(&self, repo: &str) -> Result<u64> {
        self.traffic(repo, "views")
    }

    fn clones(&self, repo: &str) -> Result<u64> {
        self.traffic(repo, "clones")
    }
}
