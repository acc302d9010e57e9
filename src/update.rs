use crate::cli::{CommonArgs, UpdateArgs};
use crate::credentials::TokenSource;
use crate::github::{GitHubClient, RepoListing};
use crate::model::{PageData, Snapshot};
use crate::publish::{PublishOutcome, Publisher};
use crate::reconcile::reconcile_all_with_progress;
use crate::render::write_page;
use crate::snapshot::SnapshotStore;
use crate::util::{page_date, signed};
use anyhow::Context;
use chrono::Local;
use console::style;
use std::path::Path;
use tracing::{info, warn};

pub fn exec(common: CommonArgs, args: UpdateArgs) -> anyhow::Result<()> {
    let token = TokenSource::new(args.token_env.clone(), args.token_file.clone())
        .resolve()
        .context("No usable API token")?;

    let client = match &args.owner {
        Some(owner) => GitHubClient::new(&token, owner.clone(), &args.api_url),
        None => GitHubClient::for_token_owner(&token, &args.api_url),
    }
    .context("Failed to initialize API client")?;
    info!(owner = client.owner(), "tracking repositories");

    let store = SnapshotStore::new(Some(&common.snapshot));
    let prior = store.load();

    let listed = client
        .list_repositories()
        .context("Failed to list repositories")?;

    let next = reconcile_all_with_progress(
        listed,
        &prior,
        &client,
        &args.retry_policy(),
        !args.no_progress,
    );

    let saved = store
        .save_nonempty(&next)
        .context("Failed to save snapshot")?;
    if !saved {
        warn!("nothing reconciled, leaving page and snapshot as they were");
        println!("{}", style("No valid data fetched, not updating the snapshot").yellow());
        return Ok(());
    }

    print_summary(&next);

    let page = PageData {
        owner: client.owner().to_string(),
        date: page_date(&Local::now()),
        source_url: args.source_url.clone(),
        records: next.repo_stats,
    };
    write_page(&args.output, &page).context("Failed to write page")?;

    if args.publish {
        let dir = args
            .output
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let publisher = Publisher::open(Some(dir)).context("Failed to locate git work tree")?;
        match publisher
            .publish(&args.commit_message)
            .context("Failed to publish page")?
        {
            PublishOutcome::Pushed => println!("{}", style("Published").green()),
            PublishOutcome::NothingToCommit => {
                println!("{}", style("Nothing new to commit, pushed existing history").dim())
            }
        }
    }

    Ok(())
}

fn print_summary(snapshot: &Snapshot) {
    println!(
        "{:<40} {:>10} {:>10} {:>10} {:>10} {:>10}",
        style("Repository").bold(),
        style("Stars").bold(),
        style("Forks").bold(),
        style("Commits").bold(),
        style("Views").bold(),
        style("Clones").bold()
    );
    println!("{}", "─".repeat(95));
    for r in &snapshot.repo_stats {
        println!(
            "{:<40} {:>10} {:>10} {:>10} {:>10} {:>10}",
            r.name,
            signed(r.stars_increase),
            signed(r.forks_increase),
            signed(r.commits_increase),
            signed(r.views_increase),
            signed(r.clones_increase)
        );
    }
}
