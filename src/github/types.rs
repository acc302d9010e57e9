use crate::model::ListedRepository;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ApiRepository {
    pub name: String,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    pub description: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub fork: bool,
}

impl From<ApiRepository> for ListedRepository {
    fn from(repo: ApiRepository) -> Self {
        Self {
            name: repo.name,
            stars: repo.stargazers_count,
            forks: repo.forks_count,
            description: repo.description,
            url: repo.html_url,
            fork: repo.fork,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiUser {
    pub login: String,
}

#[derive(Debug, Deserialize)]
pub struct ContributorStats {
    #[serde(default)]
    pub total: u64,
    pub author: Option<ApiUser>,
}

/// Body shared by the `traffic/views` and `traffic/clones` endpoints.
#[derive(Debug, Deserialize)]
pub struct TrafficSummary {
    pub count: u64,
}

/// Total commits attributed to `login`, or 0 when it is not a contributor.
/// Logins compare case-insensitively.
pub fn commits_by(stats: &[ContributorStats], login: &str) -> u64 {
    stats
        .iter()
        .filter(|c| c.author.as_ref().is_some_and(|a| a.login.eq_ignore_ascii_case(login)))
        .map(|c| c.total)
        .next()
        .unwrap_or(0)
}
