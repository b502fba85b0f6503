use anyhow::Result;

use crate::state::AppState;

use super::resolve_project;

/// List projects that can be used as targets.
pub async fn projects(state: &AppState) -> Result<String> {
    let projects = state.cache.projects(&state.client).await?;
    if projects.is_empty() {
        return Ok("No projects available.".to_string());
    }

    let mut output = String::from("Projects:\n");
    for p in &projects {
        match &p.short_name {
            Some(short) => output.push_str(&format!("  {} [{}] ({})\n", p.name, short, p.id)),
            None => output.push_str(&format!("  {} ({})\n", p.name, p.id)),
        }
    }
    Ok(output)
}

/// List candidate parent articles within a project.
pub async fn articles(state: &AppState, project: &str) -> Result<String> {
    let project = resolve_project(state, project).await?;
    let articles = state
        .cache
        .project_articles(&state.client, &project.id)
        .await?;

    let mut output = format!("Articles in {}:\n", project.name);
    if articles.is_empty() {
        output.push_str("  (none; copies can only go top-level)\n");
    }
    for a in &articles {
        output.push_str(&format!("  {} {}\n", a.id_readable, a.summary));
    }
    Ok(output)
}

/// Show where an article lives and what a copy of it would carry.
pub async fn show(state: &AppState, article: &str) -> Result<String> {
    let article = state.client.load_article(article).await?;

    let mut output = format!("{} {}\n", article.id_readable, article.summary);
    output.push_str(&format!(
        "  project: {}\n",
        article.project.name.as_deref().unwrap_or(&article.project.id)
    ));
    match &article.parent_article {
        Some(parent) => output.push_str(&format!("  parent: {} {}\n", parent.id_readable, parent.summary)),
        None => output.push_str("  parent: (top-level)\n"),
    }
    output.push_str(&format!("  attachments: {}\n", article.attachments.len()));
    if article.has_children {
        output.push_str(&format!("  children: {}\n", article.child_articles.len()));
        for child in &article.child_articles {
            output.push_str(&format!("    {} {}\n", child.id_readable, child.summary));
        }
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TransferConfig;
    use crate::store::memory::MemoryStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn show_lists_children_and_attachments() {
        let store = Arc::new(MemoryStore::new());
        store.add_article("A1", "Doc", "P1", None);
        store.add_article("C1", "Child", "P1", Some("A1"));
        store.add_attachment("A1", "T1", "t1.txt");
        let state = AppState::new(store, &TransferConfig::default());

        let out = show(&state, "A1").await.unwrap();
        assert!(out.starts_with("R-A1 Doc\n"));
        assert!(out.contains("parent: (top-level)"));
        assert!(out.contains("attachments: 1"));
        assert!(out.contains("R-C1 Child"));
    }

    #[tokio::test]
    async fn articles_resolves_project_by_name() {
        let store = Arc::new(MemoryStore::new());
        store.add_project("P1", "Docs");
        store.add_article("A1", "Doc", "P1", None);
        let state = AppState::new(store, &TransferConfig::default());

        let out = articles(&state, "docs").await.unwrap();
        assert!(out.contains("R-A1 Doc"));
        assert!(articles(&state, "missing").await.is_err());
    }
}
