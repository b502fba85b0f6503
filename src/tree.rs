//! Recursive copy of an article, its attachments and its descendants.
//!
//! Each node is copied first; its attachments and child subtrees are then
//! copied concurrently against the new article. A failure below the root
//! marks the failing branch and every ancestor as not succeeded, but never
//! stops sibling branches. Only the root's own load or copy is a hard error.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Result, TransferError};
use crate::join::{join_settled, Settled};
use crate::transfer::TransferClient;
use crate::types::{Article, ArticleId, ArticleRef, AttachmentRef, ParentTarget, ProjectRef};

/// What to do with the children of a node whose own copy failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrphanPolicy {
    /// Do not attempt them; record them as failed. Only the direct children
    /// are known (they come with the failed article), so deeper descendants
    /// of a skipped child are not listed.
    #[default]
    Skip,
    /// Attempt them under the parent the failed node was meant to go under.
    FallbackParent,
}

impl FromStr for OrphanPolicy {
    type Err = TransferError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "fallback-parent" | "fallback" => Ok(Self::FallbackParent),
            other => Err(TransferError::Config(format!(
                "Unknown orphan policy '{}'. Valid: skip, fallback-parent",
                other
            ))),
        }
    }
}

/// Result of copying one node of the tree.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyOutcome {
    pub source: ArticleRef,
    /// Absent when the node itself could not be copied.
    pub new_article: Option<ArticleRef>,
    pub attachment_failures: Vec<AttachmentRef>,
    /// Set when the attachment list of the source could not be read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment_error: Option<String>,
    /// Descendants whose own copy failed or was skipped. Failures are listed
    /// at any depth; a skipped child stands for its whole unvisited subtree,
    /// which is not enumerated.
    pub subtree_failures: Vec<ArticleRef>,
    pub children: Vec<CopyOutcome>,
    /// Why this node's own copy failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub succeeded: bool,
}

impl CopyOutcome {
    fn failed(source: ArticleRef, error: String) -> Self {
        Self {
            source,
            new_article: None,
            attachment_failures: vec![],
            attachment_error: None,
            subtree_failures: vec![],
            children: vec![],
            error: Some(error),
            succeeded: false,
        }
    }

    pub fn new_article_id(&self) -> Option<&str> {
        self.new_article.as_ref().map(|a| a.id.as_str())
    }

    /// Number of nodes in this outcome's subtree, itself included.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(CopyOutcome::node_count).sum::<usize>()
    }

    pub fn copied_count(&self) -> usize {
        usize::from(self.new_article.is_some())
            + self.children.iter().map(CopyOutcome::copied_count).sum::<usize>()
    }

    /// Attachment failures in the whole subtree. An unreadable attachment
    /// list counts as one failure.
    pub fn failed_attachment_count(&self) -> usize {
        self.attachment_failures.len()
            + usize::from(self.attachment_error.is_some())
            + self
                .children
                .iter()
                .map(CopyOutcome::failed_attachment_count)
                .sum::<usize>()
    }
}

/// Aggregate result of one `copy_tree` run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeCopyReport {
    pub root: CopyOutcome,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl TreeCopyReport {
    pub fn new_root(&self) -> &ArticleRef {
        // the root copy always exists: its failure is returned as an error
        self.root
            .new_article
            .as_ref()
            .unwrap_or(&self.root.source)
    }

    pub fn succeeded(&self) -> bool {
        self.root.succeeded
    }

    /// Strict view: a partially failed copy becomes `PartialFailure`.
    pub fn into_result(self) -> Result<ArticleRef> {
        if self.root.succeeded {
            return Ok(self.new_root().clone());
        }
        Err(TransferError::PartialFailure {
            failed_articles: self.root.subtree_failures.len(),
            failed_attachments: self.root.failed_attachment_count(),
        })
    }
}

/// Options for one tree copy.
#[derive(Debug, Clone)]
pub struct CopyRequest {
    pub source_id: String,
    pub target_project: ProjectRef,
    pub target_parent: ParentTarget,
    pub include_descendants: bool,
}

pub struct TreeCopier {
    client: TransferClient,
    orphan_policy: OrphanPolicy,
}

impl TreeCopier {
    pub fn new(client: TransferClient, orphan_policy: OrphanPolicy) -> Self {
        Self {
            client,
            orphan_policy,
        }
    }

    pub async fn copy_tree(&self, request: &CopyRequest) -> Result<TreeCopyReport> {
        let started_at = Utc::now();
        info!(
            source = %request.source_id,
            project = %request.target_project.id,
            descendants = request.include_descendants,
            policy = ?self.orphan_policy,
            "tree copy started"
        );

        let article = self.client.load_article(&request.source_id).await?;
        let new_root = self
            .client
            .copy_article(&article, &request.target_project, &request.target_parent)
            .await?;

        let run = Run {
            project: &request.target_project,
            include_descendants: request.include_descendants,
            root_copy: new_root.id.clone(),
        };
        let root = self.finish_node(&run, article, new_root).await;

        let report = TreeCopyReport {
            root,
            started_at,
            finished_at: Utc::now(),
        };
        info!(
            new_root = %report.new_root().id,
            nodes = report.root.node_count(),
            copied = report.root.copied_count(),
            succeeded = report.succeeded(),
            "tree copy finished"
        );
        Ok(report)
    }

    /// Copy one descendant. Never fails: errors become the outcome.
    fn copy_node<'a>(
        &'a self,
        run: &'a Run<'a>,
        source: ArticleRef,
        parent: ParentTarget,
    ) -> BoxFuture<'a, CopyOutcome> {
        async move {
            let article = match self.client.load_article(&source.id).await {
                Ok(article) => article,
                Err(e) => {
                    warn!(article = %source.id, "failed to load article: {}", e);
                    return CopyOutcome::failed(source, e.to_string());
                }
            };

            match self.client.copy_article(&article, run.project, &parent).await {
                Ok(new_article) => self.finish_node(run, article, new_article).await,
                Err(e) => {
                    warn!(article = %article.id_readable, "failed to copy article: {}", e);
                    self.orphaned(run, article, e.to_string(), parent).await
                }
            }
        }
        .boxed()
    }

    /// Copy attachments and children of a node that was copied to `new_article`.
    async fn finish_node(
        &self,
        run: &Run<'_>,
        article: Article,
        new_article: ArticleRef,
    ) -> CopyOutcome {
        let children = run.children_of(&article);
        let child_parent = ParentTarget::Article(new_article.clone());

        let (attachments, children) = futures::join!(
            self.client.copy_attachments(&article.id, &new_article.id),
            self.copy_children(run, children, &child_parent),
        );

        let (attachment_failures, attachment_error) = match attachments {
            Ok(results) => (
                results
                    .iter()
                    .filter(|r| !r.succeeded())
                    .map(|r| r.to_ref())
                    .collect::<Vec<_>>(),
                None,
            ),
            Err(e) => {
                warn!(article = %article.id_readable, "failed to list attachments: {}", e);
                (vec![], Some(e.to_string()))
            }
        };

        let children_ok = children.all_ok();
        let children = outcomes(children);
        let subtree_failures = collect_failures(&children);
        let succeeded = attachment_failures.is_empty() && attachment_error.is_none() && children_ok;

        CopyOutcome {
            source: article.to_ref(),
            new_article: Some(new_article),
            attachment_failures,
            attachment_error,
            subtree_failures,
            children,
            error: None,
            succeeded,
        }
    }

    /// Outcome for a node whose own copy failed, applying the orphan policy.
    async fn orphaned(
        &self,
        run: &Run<'_>,
        article: Article,
        error: String,
        parent: ParentTarget,
    ) -> CopyOutcome {
        let mut outcome = CopyOutcome::failed(article.to_ref(), error);
        let children = run.children_of(&article);
        if children.is_empty() {
            return outcome;
        }

        match self.orphan_policy {
            OrphanPolicy::Skip => {
                info!(
                    article = %article.id_readable,
                    skipped = children.len(),
                    "skipping children of failed article"
                );
                outcome.subtree_failures = children;
            }
            OrphanPolicy::FallbackParent => {
                info!(
                    article = %article.id_readable,
                    parent = ?parent.article().map(|p| &p.id_readable),
                    "copying children of failed article under its target parent"
                );
                let children = self.copy_children(run, children, &parent).await;
                outcome.children = outcomes(children);
                outcome.subtree_failures = collect_failures(&outcome.children);
            }
        }
        outcome
    }

    /// Copy sibling subtrees concurrently; a branch is `Err` when anything in it failed.
    async fn copy_children(
        &self,
        run: &Run<'_>,
        children: Vec<ArticleRef>,
        parent: &ParentTarget,
    ) -> Settled<CopyOutcome, CopyOutcome> {
        join_settled(children.into_iter().map(|child| {
            self.copy_node(run, child, parent.clone()).map(|outcome| {
                if outcome.succeeded {
                    Ok(outcome)
                } else {
                    Err(outcome)
                }
            })
        }))
        .await
    }
}

/// Settings shared by every node of one `copy_tree` run.
struct Run<'a> {
    project: &'a ProjectRef,
    include_descendants: bool,
    /// The root copy may land inside the source subtree (a target parent
    /// below the source); it then shows up among the children of a source
    /// node and must not be copied again. Every other copy is created under
    /// another copy, never under a source node.
    root_copy: ArticleId,
}

impl Run<'_> {
    /// Source children of `article` still to be copied in this run.
    fn children_of(&self, article: &Article) -> Vec<ArticleRef> {
        if !self.include_descendants {
            return vec![];
        }
        article
            .child_articles
            .iter()
            .filter(|child| {
                let created_here = child.id == self.root_copy;
                if created_here {
                    debug!(article = %article.id_readable, "not descending into the root copy");
                }
                !created_here
            })
            .cloned()
            .collect()
    }
}

fn outcomes(settled: Settled<CopyOutcome, CopyOutcome>) -> Vec<CopyOutcome> {
    settled
        .results
        .into_iter()
        .map(|r| r.unwrap_or_else(|failed| failed))
        .collect()
}

/// Failed nodes among `children` plus everything they already report.
fn collect_failures(children: &[CopyOutcome]) -> Vec<ArticleRef> {
    children
        .iter()
        .flat_map(|c| {
            let own = c.new_article.is_none().then(|| c.source.clone());
            own.into_iter().chain(c.subtree_failures.iter().cloned())
        })
        .collect()
}
