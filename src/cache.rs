use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::debug;

use crate::error::Result;
use crate::transfer::TransferClient;
use crate::types::{ArticleRef, Project};

/// Memoized project and project-article lists for populating target choices.
///
/// Owned by the front end. Call [`TaxonomyCache::clear`] at the start of each
/// user-initiated operation so a copy or move never targets stale data.
#[derive(Default)]
pub struct TaxonomyCache {
    projects: RwLock<Option<Vec<Project>>>,
    project_articles: RwLock<HashMap<String, Vec<ArticleRef>>>,
}

impl TaxonomyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn clear(&self) {
        *self.projects.write().await = None;
        self.project_articles.write().await.clear();
        debug!("taxonomy cache cleared");
    }

    pub async fn projects(&self, client: &TransferClient) -> Result<Vec<Project>> {
        {
            let cached = self.projects.read().await;
            if let Some(projects) = cached.as_ref() {
                return Ok(projects.clone());
            }
        }

        let projects = client.load_projects().await?;
        *self.projects.write().await = Some(projects.clone());
        Ok(projects)
    }

    pub async fn project_articles(
        &self,
        client: &TransferClient,
        project_id: &str,
    ) -> Result<Vec<ArticleRef>> {
        {
            let cached = self.project_articles.read().await;
            if let Some(articles) = cached.get(project_id) {
                return Ok(articles.clone());
            }
        }

        let articles = client.load_project_articles(project_id).await?;
        self.project_articles
            .write()
            .await
            .insert(project_id.to_string(), articles.clone());
        Ok(articles)
    }

    /// Resolve a project by id, short name or name (case-insensitive).
    pub async fn find_project(&self, client: &TransferClient, key: &str) -> Result<Option<Project>> {
        let projects = self.projects(client).await?;
        Ok(projects.into_iter().find(|p| {
            p.id == key
                || p.short_name.as_deref().is_some_and(|s| s.eq_ignore_ascii_case(key))
                || p.name.eq_ignore_ascii_case(key)
        }))
    }
}
