mod browse;
mod transfer;

pub use browse::{articles, projects, show};
pub use transfer::{copy, relocate, CopyArgs, MoveArgs};

use crate::error::{Result, TransferError};
use crate::state::AppState;
use crate::types::{ParentTarget, Project};

/// Resolve a project given by id, short name or name.
async fn resolve_project(state: &AppState, key: &str) -> Result<Project> {
    state
        .cache
        .find_project(&state.client, key)
        .await?
        .ok_or_else(|| TransferError::NotFound(format!("project '{}'", key)))
}

/// Resolve an optional parent article among the target project's articles.
async fn resolve_parent(
    state: &AppState,
    project: &Project,
    parent: Option<&str>,
) -> Result<ParentTarget> {
    let Some(key) = parent else {
        return Ok(ParentTarget::TopLevel);
    };
    let articles = state.cache.project_articles(&state.client, &project.id).await?;
    articles
        .into_iter()
        .find(|a| a.id == key || a.id_readable.eq_ignore_ascii_case(key))
        .map(ParentTarget::Article)
        .ok_or_else(|| {
            TransferError::Validation(format!(
                "article '{}' is not in project '{}'",
                key, project.name
            ))
        })
}
