use crate::cli::CommonArgs;
use crate::model::{RepositoryRecord, Snapshot};
use crate::snapshot::SnapshotStore;
use crate::util::signed;
use console::style;

pub fn exec(common: CommonArgs, json: bool, ndjson: bool) -> anyhow::Result<()> {
    let store = SnapshotStore::new(Some(&common.snapshot));
    let snapshot = store.load();

    if json {
        output_json(&snapshot)?;
    } else if ndjson {
        output_ndjson(&snapshot.repo_stats)?;
    } else {
        output_table(&snapshot.repo_stats);
    }

    Ok(())
}

fn output_json(snapshot: &Snapshot) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(snapshot)?);
    Ok(())
}

fn output_ndjson(records: &[RepositoryRecord]) -> anyhow::Result<()> {
    for r in records {
        println!("{}", serde_json::to_string(r)?);
    }
    Ok(())
}

fn cell(current: u64, increase: i64) -> String {
    format!("{current} ({})", signed(increase))
}

fn output_table(records: &[RepositoryRecord]) {
    if records.is_empty() {
        println!("No snapshot data");
        return;
    }

    println!(
        "{:<32} {:>14} {:>14} {:>14} {:>14} {:>14}",
        style("Repository").bold(),
        style("Stars").bold(),
        style("Forks").bold(),
        style("Commits").bold(),
        style("Views").bold(),
        style("Clones").bold()
    );
    println!("{}", "─".repeat(107));
    for r in records {
        println!(
            "{:<32} {:>14} {:>14} {:>14} {:>14} {:>14}",
            r.name,
            cell(r.stars, r.stars_increase),
            cell(r.forks, r.forks_increase),
            cell(r.commits, r.commits_increase),
            cell(r.views, r.views_increase),
            cell(r.clones, r.clones_increase)
        );
    }
    println!("\n{} repositories", style(records.len()).cyan());
}
