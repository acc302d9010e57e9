pub mod client;
pub mod types;

pub use client::{GitHubClient, DEFAULT_API_URL};

use crate::error::Result;
use crate::model::ListedRepository;

/// Source of the owner's repository listing.
pub trait RepoListing {
    fn list_repositories(&self) -> Result<Vec<ListedRepository>>;
}

/// Per-repository metrics that need their own API calls and may fail
/// independently of each other.
pub trait RepoMetrics {
    fn commits(&self, repo: &str) -> Result<u64>;
    fn views(&self, repo: &str) -> Result<u64>;
    fn clones(&self, repo: &str) -> Result<u64>;
}
