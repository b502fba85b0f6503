use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::state::AppState;
use crate::transfer::move_changes_location;
use crate::tree::{CopyOutcome, CopyRequest, TreeCopyReport};

use super::{resolve_parent, resolve_project};

pub struct CopyArgs {
    pub article: String,
    pub project: String,
    pub parent: Option<String>,
    pub include_descendants: bool,
    pub json: bool,
}

pub struct MoveArgs {
    pub article: String,
    pub project: String,
    pub parent: Option<String>,
}

/// Copy an article (with attachments, optionally with descendants).
pub async fn copy(state: &AppState, args: &CopyArgs) -> Result<String> {
    state.cache.clear().await;

    let project = resolve_project(state, &args.project).await?;
    let target_parent = resolve_parent(state, &project, args.parent.as_deref()).await?;

    let report = state
        .copier
        .copy_tree(&CopyRequest {
            source_id: args.article.clone(),
            target_project: project.to_ref(),
            target_parent,
            include_descendants: args.include_descendants,
        })
        .await?;

    if args.json {
        return serde_json::to_string_pretty(&report).context("Failed to serialize copy report");
    }
    Ok(render_report(&report, &project.name))
}

fn render_report(report: &TreeCopyReport, project: &str) -> String {
    let root = report.new_root();
    let elapsed = report.finished_at - report.started_at;
    let mut output = if report.succeeded() {
        format!(
            "Copied to {} as {} ({} article(s), {} ms)\n",
            project,
            root.id_readable,
            report.root.copied_count(),
            elapsed.num_milliseconds()
        )
    } else {
        format!(
            "Copied to {} as {}, completed with some errors ({} of {} article(s) copied)\n",
            project,
            root.id_readable,
            report.root.copied_count(),
            report.root.node_count()
        )
    };
    if !report.succeeded() {
        render_failures(&report.root, &mut output);
    }
    output
}

fn render_failures(outcome: &CopyOutcome, output: &mut String) {
    let label = &outcome.source.id_readable;
    if let Some(err) = &outcome.error {
        output.push_str(&format!("  {}: not copied ({})\n", label, err));
    }
    if let Some(err) = &outcome.attachment_error {
        output.push_str(&format!("  {}: attachments not read ({})\n", label, err));
    }
    for att in &outcome.attachment_failures {
        output.push_str(&format!(
            "  {}: attachment {} not copied\n",
            label,
            att.name.as_deref().unwrap_or(&att.id)
        ));
    }
    for child in &outcome.children {
        render_failures(child, output);
    }
}

/// Move an article in place. Refused without a store call when nothing changes.
pub async fn relocate(state: &AppState, args: &MoveArgs) -> Result<String> {
    state.cache.clear().await;

    let project = resolve_project(state, &args.project).await?;
    let target_parent = resolve_parent(state, &project, args.parent.as_deref()).await?;
    let article = state.client.load_article(&args.article).await?;

    if !move_changes_location(&article, &project.to_ref(), &target_parent) {
        warn!(article = %article.id_readable, "move target equals current location");
        return Ok(format!(
            "{} is already in {} at that position; nothing to move.\n",
            article.id_readable, project.name
        ));
    }

    let moved = state
        .client
        .move_article(&article.id_readable, &project.to_ref(), target_parent.article())
        .await?;
    info!(article = %moved.id, "move complete");

    let destination = match target_parent.article() {
        Some(parent) => format!("under {}", parent.id_readable),
        None => "at top level".to_string(),
    };
    Ok(format!(
        "Moved {} to {} {}\n",
        article.id_readable, project.name, destination
    ))
}
