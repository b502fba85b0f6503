//! In-memory `ArticleStore` with call recording and failure injection.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use super::ArticleStore;
use crate::error::{Result, TransferError};
use crate::types::{
    Article, ArticleRef, Attachment, AttachmentRef, NewArticle, Project, ProjectRef,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Get(String),
    Create {
        summary: String,
        project: String,
        parent: Option<String>,
    },
    Move {
        id_readable: String,
        project: String,
        parent: Option<String>,
    },
    ListAttachments(String),
    Upload { article: String, file_name: String },
}

#[derive(Default)]
struct Inner {
    articles: HashMap<String, Article>,
    attachments: HashMap<String, Vec<Attachment>>,
    projects: Vec<Project>,
    calls: Vec<Call>,
    next_id: u32,
    fail_create: HashSet<String>,
    fail_get: HashSet<String>,
    fail_upload: HashSet<String>,
    fail_list_attachments: HashSet<String>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_project(&self, id: &str, name: &str) {
        self.inner.lock().unwrap().projects.push(Project {
            id: id.to_string(),
            name: name.to_string(),
            short_name: None,
        });
    }

    /// Insert an article and link it into its parent's child list.
    pub fn add_article(&self, id: &str, summary: &str, project: &str, parent: Option<&str>) {
        let mut inner = self.inner.lock().unwrap();
        let parent_ref = parent.and_then(|p| inner.articles.get(p)).map(Article::to_ref);
        let article = Article {
            id: id.to_string(),
            id_readable: format!("R-{}", id),
            summary: summary.to_string(),
            content: Some(format!("content of {}", id)),
            project: ProjectRef {
                id: project.to_string(),
                name: None,
            },
            parent_article: parent_ref,
            has_children: false,
            child_articles: vec![],
            attachments: vec![],
            visibility: None,
        };
        let child_ref = article.to_ref();
        inner.articles.insert(id.to_string(), article);
        if let Some(parent) = parent.and_then(|p| inner.articles.get_mut(p)) {
            parent.has_children = true;
            parent.child_articles.push(child_ref);
        }
    }

    pub fn add_attachment(&self, article_id: &str, attachment_id: &str, name: &str) {
        let mut inner = self.inner.lock().unwrap();
        let attachment = Attachment {
            id: attachment_id.to_string(),
            name: Some(name.to_string()),
            base64_content: Some("data:text/plain;base64,aGVsbG8=".to_string()),
            visibility: None,
        };
        if let Some(article) = inner.articles.get_mut(article_id) {
            article.attachments.push(attachment.to_ref());
        }
        inner
            .attachments
            .entry(article_id.to_string())
            .or_default()
            .push(attachment);
    }

    /// Creating a copy of the article with this source summary fails.
    pub fn fail_create(&self, summary: &str) {
        self.inner.lock().unwrap().fail_create.insert(summary.to_string());
    }

    pub fn fail_get(&self, id: &str) {
        self.inner.lock().unwrap().fail_get.insert(id.to_string());
    }

    /// Uploading a file with this name fails.
    pub fn fail_upload(&self, file_name: &str) {
        self.inner.lock().unwrap().fail_upload.insert(file_name.to_string());
    }

    pub fn fail_list_attachments(&self, article_id: &str) {
        self.inner
            .lock()
            .unwrap()
            .fail_list_attachments
            .insert(article_id.to_string());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn creates(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Create { .. }))
            .collect()
    }

    pub fn uploads(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Upload { .. }))
            .collect()
    }

    pub fn moves(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Move { .. }))
            .collect()
    }

    pub fn article(&self, id: &str) -> Option<Article> {
        self.inner.lock().unwrap().articles.get(id).cloned()
    }
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn get_article(&self, id: &str) -> Result<Article> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::Get(id.to_string()));
        if inner.fail_get.contains(id) {
            return Err(TransferError::Transient(format!("get {} failed", id)));
        }
        inner
            .articles
            .values()
            .find(|a| a.id == id || a.id_readable == id)
            .cloned()
            .ok_or_else(|| TransferError::NotFound(format!("article {}", id)))
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        Ok(self.inner.lock().unwrap().projects.clone())
    }

    async fn list_project_articles(&self, project_id: &str) -> Result<Vec<ArticleRef>> {
        let inner = self.inner.lock().unwrap();
        let mut refs: Vec<ArticleRef> = inner
            .articles
            .values()
            .filter(|a| a.project.id == project_id)
            .map(Article::to_ref)
            .collect();
        refs.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(refs)
    }

    async fn create_article(&self, article: &NewArticle) -> Result<ArticleRef> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::Create {
            summary: article.summary.clone(),
            project: article.project.id.clone(),
            parent: article.parent_article.as_ref().map(|p| p.id.clone()),
        });
        if article.summary.trim().is_empty() {
            return Err(TransferError::Validation("Summary is required".to_string()));
        }
        if inner.fail_create.contains(&article.summary) {
            return Err(TransferError::Transient(format!(
                "create {} failed",
                article.summary
            )));
        }

        inner.next_id += 1;
        let id = format!("new-{}", inner.next_id);
        let created = Article {
            id: id.clone(),
            id_readable: format!("R-{}", id),
            summary: article.summary.clone(),
            content: article.content.clone(),
            project: article.project.clone(),
            parent_article: article.parent_article.clone(),
            has_children: false,
            child_articles: vec![],
            attachments: vec![],
            visibility: article.visibility.clone(),
        };
        let new_ref = created.to_ref();
        inner.articles.insert(id, created);
        if let Some(parent) = article
            .parent_article
            .as_ref()
            .and_then(|p| inner.articles.get_mut(&p.id))
        {
            parent.has_children = true;
            parent.child_articles.push(new_ref.clone());
        }
        Ok(new_ref)
    }

    async fn move_article(
        &self,
        id_readable: &str,
        project: &ProjectRef,
        parent: Option<&ArticleRef>,
    ) -> Result<ArticleRef> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::Move {
            id_readable: id_readable.to_string(),
            project: project.id.clone(),
            parent: parent.map(|p| p.id.clone()),
        });
        let article = inner
            .articles
            .values_mut()
            .find(|a| a.id_readable == id_readable || a.id == id_readable)
            .ok_or_else(|| TransferError::NotFound(format!("article {}", id_readable)))?;
        article.project = project.clone();
        article.parent_article = parent.cloned();
        Ok(article.to_ref())
    }

    async fn list_attachments(&self, article_id: &str) -> Result<Vec<Attachment>> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::ListAttachments(article_id.to_string()));
        if inner.fail_list_attachments.contains(article_id) {
            return Err(TransferError::Transient(format!(
                "list attachments of {} failed",
                article_id
            )));
        }
        Ok(inner.attachments.get(article_id).cloned().unwrap_or_default())
    }

    async fn upload_attachment(
        &self,
        article_id: &str,
        file_name: &str,
        _content: Vec<u8>,
    ) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::Upload {
            article: article_id.to_string(),
            file_name: file_name.to_string(),
        });
        if inner.fail_upload.contains(file_name) {
            return Err(TransferError::Transient(format!("upload {} failed", file_name)));
        }
        inner.next_id += 1;
        let id = format!("att-{}", inner.next_id);
        inner.attachments.entry(article_id.to_string()).or_default().push(Attachment {
            id: id.clone(),
            name: Some(file_name.to_string()),
            base64_content: None,
            visibility: None,
        });
        if let Some(article) = inner.articles.get_mut(article_id) {
            article.attachments.push(AttachmentRef {
                id,
                name: Some(file_name.to_string()),
            });
        }
        Ok(())
    }
}
