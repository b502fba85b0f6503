pub mod http;
#[cfg(test)]
pub(crate) mod memory;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Article, ArticleRef, Attachment, NewArticle, Project, ProjectRef};

/// Raw operations against the external article store.
///
/// One method per HTTP call. Implementations own transport concerns (auth,
/// timeouts, status mapping) and nothing else: no retries, no caching.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Fetch full article detail by id or readable id.
    async fn get_article(&self, id: &str) -> Result<Article>;

    async fn list_projects(&self) -> Result<Vec<Project>>;

    async fn list_project_articles(&self, project_id: &str) -> Result<Vec<ArticleRef>>;

    /// Create an article; the store assigns its identity.
    async fn create_article(&self, article: &NewArticle) -> Result<ArticleRef>;

    /// Reparent and/or reproject an existing article in place.
    async fn move_article(
        &self,
        id_readable: &str,
        project: &ProjectRef,
        parent: Option<&ArticleRef>,
    ) -> Result<ArticleRef>;

    /// List attachments of an article, payloads included.
    async fn list_attachments(&self, article_id: &str) -> Result<Vec<Attachment>>;

    async fn upload_attachment(
        &self,
        article_id: &str,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<()>;
}
