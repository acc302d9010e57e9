//! Matching freshly observed repositories against the last saved snapshot.
//!
//! Every increase is `current - previous`, signed and unclamped: traffic
//! counts cover a rolling window and legitimately go down. A repository
//! missing from the previous snapshot is compared against zero.

use crate::error::Result;
use crate::github::RepoMetrics;
use crate::model::{ListedRepository, RepositoryRecord, Snapshot};
use crate::retry::RetryPolicy;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;
use tracing::{debug, info, warn};

static ZERO_BASELINE: RepositoryRecord = RepositoryRecord {
    name: String::new(),
    description: String::new(),
    url: String::new(),
    stars: 0,
    stars_increase: 0,
    forks: 0,
    forks_increase: 0,
    commits: 0,
    commits_increase: 0,
    views: 0,
    views_increase: 0,
    clones: 0,
    clones_increase: 0,
};

pub fn delta(current: u64, previous: u64) -> i64 {
    current as i64 - previous as i64
}

/// Drops forks and repeated names, then orders by descending stars. The sort
/// is stable so ties keep their listing order.
pub fn order_repositories(listed: Vec<ListedRepository>) -> Vec<ListedRepository> {
    let mut seen = HashSet::new();
    let mut repos: Vec<_> = listed
        .into_iter()
        .filter(|r| !r.fork)
        .filter(|r| seen.insert(r.name.clone()))
        .collect();
    repos.sort_by(|a, b| b.stars.cmp(&a.stars));
    repos
}

/// Record for `repo` with stars and forks filled in from the listing.
fn base_record(repo: &ListedRepository, previous: &RepositoryRecord) -> RepositoryRecord {
    RepositoryRecord {
        name: repo.name.clone(),
        description: repo.description.clone().unwrap_or_default(),
        url: repo.url.clone(),
        stars: repo.stars,
        stars_increase: delta(repo.stars, previous.stars),
        forks: repo.forks,
        forks_increase: delta(repo.forks, previous.forks),
        ..RepositoryRecord::default()
    }
}

/// One full attempt: commits, then views, then clones. The first failing
/// sub-fetch aborts the attempt.
fn attempt<M: RepoMetrics>(
    repo: &ListedRepository,
    previous: &RepositoryRecord,
    metrics: &M,
) -> Result<RepositoryRecord> {
    let mut record = base_record(repo, previous);

    record.commits = metrics.commits(&repo.name)?;
    record.commits_increase = delta(record.commits, previous.commits);

    record.views = metrics.views(&repo.name)?;
    record.views_increase = delta(record.views, previous.views);

    record.clones = metrics.clones(&repo.name)?;
    record.clones_increase = delta(record.clones, previous.clones);

    Ok(record)
}

/// Reconciles one repository, retrying the whole attempt under `policy`.
/// Returns `None` when every attempt failed; no partial record is kept.
pub fn reconcile_repository<M: RepoMetrics>(
    repo: &ListedRepository,
    prior: &Snapshot,
    metrics: &M,
    policy: &RetryPolicy,
) -> Option<RepositoryRecord> {
    let previous = prior.find_by_name(&repo.name).unwrap_or(&ZERO_BASELINE);
    let record = policy.run(&repo.name, |_| attempt(repo, previous, metrics));
    match &record {
        Some(r) => debug!(
            repo = %r.name,
            stars = r.stars_increase,
            views = r.views_increase,
            clones = r.clones_increase,
            "reconciled"
        ),
        None => warn!(repo = %repo.name, "dropping repository from this run"),
    }
    record
}

pub fn reconcile_all<M: RepoMetrics>(
    listed: Vec<ListedRepository>,
    prior: &Snapshot,
    metrics: &M,
    policy: &RetryPolicy,
) -> Snapshot {
    reconcile_all_with_progress(listed, prior, metrics, policy, false)
}

pub fn reconcile_all_with_progress<M: RepoMetrics>(
    listed: Vec<ListedRepository>,
    prior: &Snapshot,
    metrics: &M,
    policy: &RetryPolicy,
    show_progress: bool,
) -> Snapshot {
    let repos = order_repositories(listed);

    let pb = if show_progress {
        let pb = ProgressBar::new(repos.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let records: Vec<RepositoryRecord> = repos
        .iter()
        .filter_map(|repo| {
            pb.set_message(repo.name.clone());
            let record = reconcile_repository(repo, prior, metrics, policy);
            pb.inc(1);
            record
        })
        .collect();

    pb.finish_with_message("Repositories reconciled");
    info!(
        listed = repos.len(),
        reconciled = records.len(),
        dropped = repos.len() - records.len(),
        "reconciliation finished"
    );
    Snapshot::from_records(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StarboardError;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct FakeMetrics {
        values: HashMap<String, (u64, u64, u64)>,
        always_fail: HashSet<String>,
        // repo -> number of leading attempts whose views call fails
        flaky_views: RefCell<HashMap<String, u32>>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeMetrics {
        fn with(mut self, name: &str, commits: u64, views: u64, clones: u64) -> Self {
            self.values.insert(name.to_string(), (commits, views, clones));
            self
        }

        fn failing(mut self, name: &str) -> Self {
            self.always_fail.insert(name.to_string());
            self
        }

        fn flaky_views(self, name: &str, failures: u32) -> Self {
            self.flaky_views.borrow_mut().insert(name.to_string(), failures);
            self
        }

        fn lookup(&self, repo: &str) -> Result<(u64, u64, u64)> {
            if self.always_fail.contains(repo) {
                return Err(StarboardError::StatsPending(repo.to_string()));
            }
            Ok(self.values.get(repo).copied().unwrap_or_default())
        }
    }

    impl RepoMetrics for FakeMetrics {
        fn commits(&self, repo: &str) -> Result<u64> {
            self.calls.borrow_mut().push(format!("commits:{repo}"));
            Ok(self.lookup(repo)?.0)
        }

        fn views(&self, repo: &str) -> Result<u64> {
            self.calls.borrow_mut().push(format!("views:{repo}"));
            if let Some(left) = self.flaky_views.borrow_mut().get_mut(repo) {
                if *left > 0 {
                    *left -= 1;
                    return Err(StarboardError::Status {
                        status: 502,
                        url: repo.to_string(),
                    });
                }
            }
            Ok(self.lookup(repo)?.1)
        }

        fn clones(&self, repo: &str) -> Result<u64> {
            self.calls.borrow_mut().push(format!("clones:{repo}"));
            Ok(self.lookup(repo)?.2)
        }
    }

    fn listed(name: &str, stars: u64, forks: u64) -> ListedRepository {
        ListedRepository {
            name: name.to_string(),
            stars,
            forks,
            description: Some(format!("{name} repo")),
            url: format!("https://github.com/octo/{name}"),
            fork: false,
        }
    }

    fn prior_record(name: &str, stars: u64, views: u64) -> RepositoryRecord {
        RepositoryRecord {
            stars,
            views,
            ..RepositoryRecord::new(name)
        }
    }

    #[test]
    fn delta_is_signed() {
        assert_eq!(delta(12, 10), 2);
        assert_eq!(delta(40, 50), -10);
        assert_eq!(delta(0, 0), 0);
    }

    #[test]
    fn known_repository_gets_signed_increases() {
        let prior = Snapshot::from_records(vec![prior_record("foo", 10, 50)]);
        let metrics = FakeMetrics::default().with("foo", 0, 40, 0);

        let policy = RetryPolicy::immediate(3);
        let foo = listed("foo", 12, 0);
        let record = reconcile_repository(&foo, &prior, &metrics, &policy).unwrap();

        assert_eq!(record.stars_increase, 2);
        assert_eq!(record.views_increase, -10);
    }

    #[test]
    fn new_repository_increases_equal_current_values() {
        let metrics = FakeMetrics::default().with("bar", 7, 30, 4);

        let record = reconcile_repository(
            &listed("bar", 5, 1),
            &Snapshot::new(),
            &metrics,
            &RetryPolicy::immediate(3),
        )
        .unwrap();

        assert_eq!(record.stars_increase, 5);
        assert_eq!(record.forks_increase, 1);
        assert_eq!(record.commits_increase, 7);
        assert_eq!(record.views_increase, 30);
        assert_eq!(record.clones_increase, 4);
    }

    #[test]
    fn every_increase_is_current_minus_previous() {
        let previous = RepositoryRecord {
            stars: 20,
            forks: 4,
            commits: 100,
            views: 80,
            clones: 9,
            ..RepositoryRecord::new("foo")
        };
        let prior = Snapshot::from_records(vec![previous.clone()]);
        let metrics = FakeMetrics::default().with("foo", 103, 61, 12);

        let policy = RetryPolicy::immediate(1);
        let foo = listed("foo", 19, 4);
        let record = reconcile_repository(&foo, &prior, &metrics, &policy).unwrap();

        assert_eq!(record.stars_increase, delta(record.stars, previous.stars));
        assert_eq!(record.forks_increase, delta(record.forks, previous.forks));
        assert_eq!(record.commits_increase, delta(record.commits, previous.commits));
        assert_eq!(record.views_increase, delta(record.views, previous.views));
        assert_eq!(record.clones_increase, delta(record.clones, previous.clones));
        assert_eq!(record.stars_increase, -1);
        assert_eq!(record.views_increase, -19);
    }

    #[test]
    fn record_carries_listing_fields() {
        let metrics = FakeMetrics::default().with("foo", 1, 2, 3);
        let mut repo = listed("foo", 1, 0);
        repo.description = None;

        let record =
            reconcile_repository(&repo, &Snapshot::new(), &metrics, &RetryPolicy::immediate(1))
                .unwrap();

        assert_eq!(record.name, "foo");
        assert_eq!(record.description, "");
        assert_eq!(record.url, "https://github.com/octo/foo");
        assert_eq!((record.commits, record.views, record.clones), (1, 2, 3));
    }

    #[test]
    fn transient_failure_is_retried_until_success() {
        let metrics = FakeMetrics::default()
            .with("foo", 1, 2, 3)
            .flaky_views("foo", 2);

        let policy = RetryPolicy::immediate(15);
        let foo = listed("foo", 1, 0);
        let record = reconcile_repository(&foo, &Snapshot::new(), &metrics, &policy);

        assert!(record.is_some());
        let calls = metrics.calls.borrow();
        assert_eq!(calls.iter().filter(|c| *c == "commits:foo").count(), 3);
        assert_eq!(calls.iter().filter(|c| *c == "clones:foo").count(), 1);
    }

    #[test]
    fn failed_sub_fetch_skips_the_rest_of_the_attempt() {
        let metrics = FakeMetrics::default().flaky_views("foo", 1);

        let policy = RetryPolicy::immediate(1);
        reconcile_repository(&listed("foo", 1, 0), &Snapshot::new(), &metrics, &policy);

        assert_eq!(
            *metrics.calls.borrow(),
            vec!["commits:foo".to_string(), "views:foo".to_string()]
        );
    }

    #[test]
    fn exhausted_repository_is_dropped_and_others_survive() {
        let metrics = FakeMetrics::default()
            .with("foo", 1, 1, 1)
            .with("qux", 2, 2, 2)
            .failing("baz");

        let snapshot = reconcile_all(
            vec![listed("foo", 3, 0), listed("baz", 2, 0), listed("qux", 1, 0)],
            &Snapshot::new(),
            &metrics,
            &RetryPolicy::immediate(15),
        );

        let names: Vec<_> = snapshot.repo_stats.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["foo", "qux"]);
        let baz_attempts = metrics
            .calls
            .borrow()
            .iter()
            .filter(|c| *c == "commits:baz")
            .count();
        assert_eq!(baz_attempts, 15);
    }

    #[test]
    fn nothing_reconciled_yields_empty_snapshot() {
        let metrics = FakeMetrics::default().failing("a").failing("b");

        let snapshot = reconcile_all(
            vec![listed("a", 1, 0), listed("b", 2, 0)],
            &Snapshot::new(),
            &metrics,
            &RetryPolicy::immediate(2),
        );

        assert!(snapshot.is_empty());
    }

    #[test]
    fn output_is_ordered_by_descending_stars_with_stable_ties() {
        let metrics = FakeMetrics::default();

        let snapshot = reconcile_all(
            vec![
                listed("low", 1, 0),
                listed("tie-a", 5, 0),
                listed("high", 9, 0),
                listed("tie-b", 5, 0),
            ],
            &Snapshot::new(),
            &metrics,
            &RetryPolicy::immediate(1),
        );

        let names: Vec<_> = snapshot.repo_stats.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["high", "tie-a", "tie-b", "low"]);
    }

    #[test]
    fn forks_and_duplicate_names_are_excluded() {
        let mut forked = listed("forked", 100, 0);
        forked.fork = true;
        let mut dup = listed("foo", 50, 0);
        dup.description = Some("second".to_string());

        let repos = order_repositories(vec![listed("foo", 1, 0), forked, dup]);

        assert_eq!(repos.len(), 1);
        assert_eq!(repos[0].name, "foo");
        assert_eq!(repos[0].stars, 1);
    }

    #[test]
    fn reconciled_snapshot_has_unique_names() {
        let metrics = FakeMetrics::default();

        let snapshot = reconcile_all(
            vec![listed("foo", 1, 0), listed("foo", 2, 0)],
            &Snapshot::new(),
            &metrics,
            &RetryPolicy::immediate(1),
        );

        assert_eq!(snapshot.len(), 1);
    }
}
