use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::join::join_settled;
use crate::store::http::decode_data_uri;
use crate::store::ArticleStore;
use crate::types::{
    Article, ArticleRef, AttachmentCopyResult, CopyStatus, NewArticle, ParentTarget, Project,
    ProjectRef,
};

/// Domain operations over an article store. Holds no state between calls.
#[derive(Clone)]
pub struct TransferClient {
    store: Arc<dyn ArticleStore>,
}

impl TransferClient {
    pub fn new(store: Arc<dyn ArticleStore>) -> Self {
        Self { store }
    }

    pub async fn load_article(&self, id: &str) -> Result<Article> {
        self.store.get_article(id).await
    }

    pub async fn load_projects(&self) -> Result<Vec<Project>> {
        self.store.list_projects().await
    }

    /// Candidate parent articles within a project.
    pub async fn load_project_articles(&self, project_id: &str) -> Result<Vec<ArticleRef>> {
        self.store.list_project_articles(project_id).await
    }

    /// Create a new article with the source's content under the target.
    /// Not idempotent: every call creates another article.
    pub async fn copy_article(
        &self,
        article: &Article,
        target_project: &ProjectRef,
        target_parent: &ParentTarget,
    ) -> Result<ArticleRef> {
        let body = NewArticle {
            summary: article.summary.clone(),
            content: article.content.clone(),
            project: ProjectRef {
                id: target_project.id.clone(),
                name: None,
            },
            parent_article: target_parent.article().cloned(),
            visibility: article.visibility.clone(),
        };
        let created = self.store.create_article(&body).await?;
        debug!(
            source = %article.id_readable,
            new_id = %created.id,
            project = %target_project.id,
            "article copied"
        );
        Ok(created)
    }

    /// Reparent an existing article in place. Callers must check
    /// [`move_changes_location`] first.
    pub async fn move_article(
        &self,
        id_readable: &str,
        target_project: &ProjectRef,
        target_parent: Option<&ArticleRef>,
    ) -> Result<ArticleRef> {
        let moved = self
            .store
            .move_article(id_readable, target_project, target_parent)
            .await?;
        info!(
            article = id_readable,
            project = %target_project.id,
            parent = ?target_parent.map(|p| &p.id_readable),
            "article moved"
        );
        Ok(moved)
    }

    /// Re-upload every attachment of `source_id` onto `target_id`.
    ///
    /// Uploads are independent; one result per source attachment, in listing
    /// order. Only a failure to list the source attachments is an error.
    pub async fn copy_attachments(
        &self,
        source_id: &str,
        target_id: &str,
    ) -> Result<Vec<AttachmentCopyResult>> {
        let attachments = self.store.list_attachments(source_id).await?;

        let settled = join_settled(attachments.iter().map(|att| async move {
            let content = decode_data_uri(att.base64_content.as_deref())?;
            self.store
                .upload_attachment(target_id, att.file_name(), content)
                .await
        }))
        .await;

        let results: Vec<AttachmentCopyResult> = settled
            .zip(&attachments)
            .map(|(att, res)| {
                let (status, error) = match res {
                    Ok(()) => (CopyStatus::Success, None),
                    Err(e) => {
                        warn!(
                            attachment = %att.id,
                            name = att.file_name(),
                            target = target_id,
                            "attachment copy failed: {}",
                            e
                        );
                        (CopyStatus::Failed, Some(e.to_string()))
                    }
                };
                AttachmentCopyResult {
                    attachment_id: att.id.clone(),
                    name: att.name.clone(),
                    status,
                    error,
                }
            })
            .collect();

        debug!(
            source = source_id,
            target = target_id,
            count = results.len(),
            "attachments copied"
        );
        Ok(results)
    }
}

/// True when moving `article` to the target would change its project or parent.
/// A move that changes nothing must not be issued.
pub fn move_changes_location(
    article: &Article,
    target_project: &ProjectRef,
    target_parent: &ParentTarget,
) -> bool {
    article.project.id != target_project.id || !target_parent.is(article.parent_article.as_ref())
}
