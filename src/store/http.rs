use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use reqwest::{multipart, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::ArticleStore;
use crate::config::TransferConfig;
use crate::error::{Result, TransferError};
use crate::types::{Article, ArticleRef, Attachment, NewArticle, Project, ProjectRef};

const ARTICLE_FIELDS: &str = "id,idReadable,summary,content,hasChildren,\
project(id,name,shortName),parentArticle(id,idReadable,summary),\
childArticles(id,idReadable,summary),attachments(id,name),visibility($type,id)";
const ARTICLE_REF_FIELDS: &str = "id,idReadable,summary";
const PROJECT_FIELDS: &str = "id,name,shortName";
const ATTACHMENT_FIELDS: &str = "id,name,base64Content,visibility($type,id)";

/// Error body returned by the store on failed requests.
#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// `ArticleStore` over the YouTrack REST API.
pub struct HttpStore {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    page_size: usize,
}

impl HttpStore {
    pub fn new(config: &TransferConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TransferError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: api_base(&config.base_url),
            token: config.token.clone(),
            page_size: config.page_size.max(1),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        let req = req.header("Accept", "application/json");
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let req = self.authorize(self.client.get(self.url(path)).query(query));
        let resp = check(req.send().await?).await?;
        Ok(resp.json::<T>().await?)
    }

    /// Fetch a whole collection, `page_size` items per request.
    /// The store caps unpaged collections, so every listing goes through here.
    async fn get_paged<T: DeserializeOwned>(
        &self,
        path: &str,
        fields: &str,
        extra: &[(&str, &str)],
    ) -> Result<Vec<T>> {
        let mut results = Vec::new();
        loop {
            let mut query = vec![
                ("fields", fields.to_string()),
                ("$top", self.page_size.to_string()),
                ("$skip", results.len().to_string()),
            ];
            query.extend(extra.iter().map(|(k, v)| (*k, v.to_string())));

            let page: Vec<T> = self.get_json(path, &query).await?;
            let last = is_last_page(page.len(), self.page_size);
            results.extend(page);
            if last {
                return Ok(results);
            }
        }
    }

    async fn post_json<B, T>(&self, path: &str, fields: &str, body: &B) -> Result<T>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let req = self.authorize(
            self.client
                .post(self.url(path))
                .query(&[("fields", fields)])
                .json(body),
        );
        let resp = check(req.send().await?).await?;
        Ok(resp.json::<T>().await?)
    }
}

/// Normalize the configured base URL to the REST root (".../api").
fn api_base(base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if base.ends_with("/api") {
        base.to_string()
    } else {
        format!("{}/api", base)
    }
}

/// A short page ends the collection; a full one may be followed by more.
fn is_last_page(len: usize, page_size: usize) -> bool {
    len < page_size
}

/// Body of a move request. A missing parent moves the article to top level.
fn move_body(project: &ProjectRef, parent: Option<&ArticleRef>) -> serde_json::Value {
    serde_json::json!({
        "parentArticle": parent.map(|p| serde_json::json!({ "idReadable": p.id_readable })),
        "project": { "id": project.id },
    })
}

/// Turn non-2xx responses into typed errors, keeping the store's message.
async fn check(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    debug!(status = status.as_u16(), body = %text, "store request failed");
    Err(TransferError::from_status(status.as_u16(), error_message(status.as_u16(), &text)))
}

fn error_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<ApiError>(body) {
        Ok(ApiError {
            error_description: Some(desc),
            ..
        }) => desc,
        Ok(ApiError { error: Some(err), .. }) => err,
        _ if !body.trim().is_empty() => format!("HTTP {}: {}", status, body.trim()),
        _ => format!("HTTP {}", status),
    }
}

/// Decode a `data:[<mime>];base64,<payload>` URI. A missing URI is an empty file.
pub fn decode_data_uri(uri: Option<&str>) -> Result<Vec<u8>> {
    let Some(uri) = uri else {
        return Ok(Vec::new());
    };
    let payload = match uri.strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map_or("", |(_, payload)| payload),
        None => uri,
    };
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| TransferError::Validation(format!("Invalid attachment payload: {}", e)))
}

#[async_trait]
impl ArticleStore for HttpStore {
    async fn get_article(&self, id: &str) -> Result<Article> {
        self.get_json(
            &format!("articles/{}", id),
            &[("fields", ARTICLE_FIELDS.to_string())],
        )
        .await
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        self.get_paged("admin/projects", PROJECT_FIELDS, &[]).await
    }

    async fn list_project_articles(&self, project_id: &str) -> Result<Vec<ArticleRef>> {
        let results = self
            .get_paged(
                &format!("admin/projects/{}/articles", project_id),
                ARTICLE_REF_FIELDS,
                &[],
            )
            .await?;
        debug!(project_id, count = results.len(), "project articles listed");
        Ok(results)
    }

    async fn create_article(&self, article: &NewArticle) -> Result<ArticleRef> {
        self.post_json("articles", ARTICLE_REF_FIELDS, article).await
    }

    async fn move_article(
        &self,
        id_readable: &str,
        project: &ProjectRef,
        parent: Option<&ArticleRef>,
    ) -> Result<ArticleRef> {
        let body = move_body(project, parent);
        self.post_json(&format!("articles/{}", id_readable), ARTICLE_REF_FIELDS, &body)
            .await
    }

    async fn list_attachments(&self, article_id: &str) -> Result<Vec<Attachment>> {
        self.get_paged(
            &format!("articles/{}/attachments", article_id),
            ATTACHMENT_FIELDS,
            &[("muteUpdateNotifications", "true")],
        )
        .await
    }

    async fn upload_attachment(
        &self,
        article_id: &str,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<()> {
        let part = multipart::Part::bytes(content).file_name(file_name.to_string());
        let form = multipart::Form::new().part(file_name.to_string(), part);
        let req = self.authorize(
            self.client
                .post(self.url(&format!("articles/{}/attachments", article_id)))
                .query(&[("fields", "id,name")])
                .multipart(form),
        );
        check(req.send().await?).await?;
        Ok(())
    }
}
