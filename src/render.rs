use crate::cli::CommonArgs;
use crate::error::{Result, StarboardError};
use crate::model::{PageData, RepositoryRecord};
use crate::snapshot::{atomic_write, SnapshotStore};
use crate::util::{escape_html, page_date, signed};
use anyhow::Context;
use chrono::Local;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_OUTPUT_FILE: &str = "index.html";

/// Rebuilds the page from the stored snapshot; no network access.
pub fn exec(
    common: CommonArgs,
    owner: String,
    output: PathBuf,
    source_url: Option<String>,
) -> anyhow::Result<()> {
    let snapshot = SnapshotStore::new(Some(&common.snapshot)).load();
    let page = PageData {
        owner,
        date: page_date(&Local::now()),
        source_url,
        records: snapshot.repo_stats,
    };
    write_page(&output, &page).context("Failed to write page")?;
    println!("Wrote {} ({} repositories)", output.display(), page.records.len());
    Ok(())
}

pub fn render_page(page: &PageData) -> Result<String> {
    let mut out = String::new();
    write_document(&mut out, page)
        .map_err(|e| StarboardError::Other(format!("render failed: {e}")))?;
    Ok(out)
}

pub fn write_page<P: AsRef<Path>>(path: P, page: &PageData) -> Result<()> {
    let html = render_page(page)?;
    atomic_write(path.as_ref(), html.as_bytes())?;
    info!(path = %path.as_ref().display(), repositories = page.records.len(), "page written");
    Ok(())
}

fn write_document(out: &mut String, page: &PageData) -> std::fmt::Result {
    let owner = escape_html(&page.owner);

    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html lang=\"en\">")?;
    writeln!(out, "<head>")?;
    writeln!(out, "    <meta charset=\"UTF-8\">")?;
    writeln!(
        out,
        "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">"
    )?;
    writeln!(out, "    <title>{owner}</title>")?;
    writeln!(out, "    <link rel=\"stylesheet\" href=\"style.css\">")?;
    writeln!(out, "</head>")?;
    writeln!(out, "<body>")?;
    writeln!(out, "    <header>")?;
    writeln!(out, "        <h1>{owner} Public Repositories</h1>")?;
    writeln!(
        out,
        "        <h4>&gt;&gt; only public, non-forked repositories owned by {owner} are listed</h4>"
    )?;
    writeln!(
        out,
        "        <h4>&gt;&gt; {} {}</h4>",
        "repositories missing from this page are usually still being indexed",
        "and will return on a later run"
    )?;
    match &page.source_url {
        Some(url) => writeln!(
            out,
            "        <h5>Updated on {} via <a href=\"{}\">{}</a></h5>",
            escape_html(&page.date),
            escape_html(url),
            escape_html(url)
        )?,
        None => writeln!(out, "        <h5>Updated on {}</h5>", escape_html(&page.date))?,
    }
    writeln!(out, "    </header>")?;
    writeln!(out, "    <main>")?;
    writeln!(out, "        <div id=\"exp\">")?;
    writeln!(
        out,
        "            <h3>*** {} {} ***</h3>",
        "repository stats for the past <em>14</em> days",
        "with +/- changes since the previous update"
    )?;
    writeln!(out, "        </div>")?;
    writeln!(out, "        <div class=\"grid\">")?;
    for record in &page.records {
        write_card(out, record)?;
    }
    writeln!(out, "        </div>")?;
    writeln!(out, "    </main>")?;
    writeln!(out, "</body>")?;
    writeln!(out, "</html>")?;
    Ok(())
}

fn write_card(out: &mut String, r: &RepositoryRecord) -> std::fmt::Result {
    writeln!(out, "            <article>")?;
    writeln!(
        out,
        "                <h2><a href=\"{}\">{}</a></h2>",
        escape_html(&r.url),
        escape_html(&r.name)
    )?;
    writeln!(out, "                <p>{}</p>", escape_html(&r.description))?;
    for (label, current, increase) in [
        ("Stars", r.stars, r.stars_increase),
        ("Forks", r.forks, r.forks_increase),
        ("Commits", r.commits, r.commits_increase),
        ("Views", r.views, r.views_increase),
        ("Clones", r.clones, r.clones_increase),
    ] {
        writeln!(
            out,
            "                <p><strong>{label}:</strong> {current} <span>({})</span></p>",
            signed(increase)
        )?;
    }
    writeln!(out, "            </article>")?;
    Ok(())
}
