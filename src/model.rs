use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Per-repository stats as persisted between runs.
///
/// Field names follow the existing `previous.json` layout so that snapshots
/// written by earlier runs load unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RepositoryRecord {
    pub name: String,
    pub description: String,
    #[serde(rename = "URL")]
    pub url: String,
    pub stars: u64,
    pub stars_increase: i64,
    pub forks: u64,
    pub forks_increase: i64,
    pub commits: u64,
    pub commits_increase: i64,
    pub views: u64,
    pub views_increase: i64,
    pub clones: u64,
    pub clones_increase: i64,
}

impl RepositoryRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "repoStats", default)]
    pub repo_stats: Vec<RepositoryRecord>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a snapshot keeping only the first record seen for each name.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = RepositoryRecord>,
    {
        let mut seen = HashSet::new();
        let repo_stats = records
            .into_iter()
            .filter(|r| seen.insert(r.name.clone()))
            .collect();
        Self { repo_stats }
    }

    pub fn find_by_name(&self, name: &str) -> Option<&RepositoryRecord> {
        self.repo_stats.iter().find(|r| r.name == name)
    }

    pub fn len(&self) -> usize {
        self.repo_stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repo_stats.is_empty()
    }
}

/// A repository as reported by the hosting platform's listing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedRepository {
    pub name: String,
    pub stars: u64,
    pub forks: u64,
    pub description: Option<String>,
    pub url: String,
    pub fork: bool,
}

#[derive(Debug, Clone)]
pub struct PageData {
    pub owner: String,
    pub date: String,
    pub source_url: Option<String>,
    pub records: Vec<RepositoryRecord>,
}
