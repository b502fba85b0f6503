use serde::{Deserialize, Serialize};

/// Store-assigned article id (e.g. "171-5").
pub type ArticleId = String;

/// Minimal identity of an article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRef {
    pub id: ArticleId,
    /// e.g. "DOC-A-12"
    #[serde(default)]
    pub id_readable: String,
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Opaque visibility settings, passed through to copies unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visibility {
    #[serde(rename = "$type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRef {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Full article snapshot as returned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: ArticleId,
    #[serde(default)]
    pub id_readable: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub content: Option<String>,
    pub project: ProjectRef,
    #[serde(default)]
    pub parent_article: Option<ArticleRef>,
    #[serde(default)]
    pub has_children: bool,
    #[serde(default)]
    pub child_articles: Vec<ArticleRef>,
    #[serde(default)]
    pub attachments: Vec<AttachmentRef>,
    #[serde(default)]
    pub visibility: Option<Visibility>,
}

impl Article {
    pub fn to_ref(&self) -> ArticleRef {
        ArticleRef {
            id: self.id.clone(),
            id_readable: self.id_readable.clone(),
            summary: self.summary.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
}

impl Project {
    pub fn to_ref(&self) -> ProjectRef {
        ProjectRef {
            id: self.id.clone(),
            name: Some(self.name.clone()),
        }
    }
}

/// An attachment with its payload, as listed on the source article.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// `data:<mime>;base64,<payload>` URI
    #[serde(default)]
    pub base64_content: Option<String>,
    #[serde(default)]
    pub visibility: Option<Visibility>,
}

impl Attachment {
    pub fn file_name(&self) -> &str {
        self.name.as_deref().unwrap_or("missing-name")
    }

    pub fn to_ref(&self) -> AttachmentRef {
        AttachmentRef {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

/// Where a copied or moved article should be placed inside its project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentTarget {
    TopLevel,
    Article(ArticleRef),
}

impl ParentTarget {
    pub fn article(&self) -> Option<&ArticleRef> {
        match self {
            Self::TopLevel => None,
            Self::Article(a) => Some(a),
        }
    }

    /// True when this target is the given (possibly absent) parent.
    pub fn is(&self, parent: Option<&ArticleRef>) -> bool {
        match (self, parent) {
            (Self::TopLevel, None) => true,
            (Self::Article(a), Some(p)) => {
                a.id == p.id || (!a.id_readable.is_empty() && a.id_readable == p.id_readable)
            }
            _ => false,
        }
    }
}

impl From<Option<ArticleRef>> for ParentTarget {
    fn from(parent: Option<ArticleRef>) -> Self {
        parent.map_or(Self::TopLevel, Self::Article)
    }
}

/// Body of an article creation request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewArticle {
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub project: ProjectRef,
    pub parent_article: Option<ArticleRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyStatus {
    Success,
    Failed,
}

/// Outcome of copying one attachment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentCopyResult {
    pub attachment_id: String,
    pub name: Option<String>,
    pub status: CopyStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AttachmentCopyResult {
    pub fn succeeded(&self) -> bool {
        self.status == CopyStatus::Success
    }

    pub fn to_ref(&self) -> AttachmentRef {
        AttachmentRef {
            id: self.attachment_id.clone(),
            name: self.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn article_deserializes_from_store_json() {
        let json = serde_json::json!({
            "id": "171-5",
            "idReadable": "DOC-A-5",
            "summary": "Doc",
            "content": "body",
            "project": {"id": "0-1", "name": "Docs", "$type": "Project"},
            "parentArticle": null,
            "hasChildren": true,
            "childArticles": [{"id": "171-6", "idReadable": "DOC-A-6", "summary": "Child"}],
            "attachments": [{"id": "232-1", "name": "a.png"}],
            "visibility": {"$type": "UnlimitedVisibility"}
        });
        let article: Article = serde_json::from_value(json).unwrap();
        assert_eq!(article.id_readable, "DOC-A-5");
        assert!(article.parent_article.is_none());
        assert_eq!(article.child_articles.len(), 1);
        assert_eq!(
            article.visibility.unwrap().kind.as_deref(),
            Some("UnlimitedVisibility")
        );
    }

    #[test]
    fn top_level_target_serializes_as_null_parent() {
        let body = NewArticle {
            summary: "Doc".into(),
            content: None,
            project: ProjectRef { id: "0-2".into(), name: None },
            parent_article: ParentTarget::TopLevel.article().cloned(),
            visibility: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json["parentArticle"].is_null());
        assert_eq!(json["project"]["id"], "0-2");
        assert!(json.get("content").is_none());
    }

    #[test]
    fn parent_target_matches_by_id_or_readable_id() {
        let parent = ArticleRef {
            id: "1-1".into(),
            id_readable: "DOC-A-1".into(),
            summary: String::new(),
        };
        let by_readable = ParentTarget::Article(ArticleRef {
            id: "other".into(),
            id_readable: "DOC-A-1".into(),
            summary: String::new(),
        });
        assert!(by_readable.is(Some(&parent)));
        assert!(ParentTarget::TopLevel.is(None));
        assert!(!ParentTarget::TopLevel.is(Some(&parent)));
    }

    #[test]
    fn missing_attachment_name_falls_back() {
        let att = Attachment {
            id: "1".into(),
            name: None,
            base64_content: None,
            visibility: None,
        };
        assert_eq!(att.file_name(), "missing-name");
    }
}
