//! HTTP client for the catalog store

use crate::error::{CatalogError, Result};
use crate::gateway::CatalogGateway;
use crate::types::*;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{header, Client, RequestBuilder, StatusCode};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;
use tracing::debug;

/// HTTP client for the catalog REST API
///
/// # Example
///
/// ```rust,no_run
/// use catalog_client::{CatalogClient, CatalogConfig, CatalogGateway};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = CatalogClient::new(CatalogConfig {
///     base_url: "http://localhost:8080/api".into(),
///     api_token: Some("session-token".into()),
///     ..Default::default()
/// })?;
///
/// // Top-level categories
/// let tops = client.list_top_level().await?;
///
/// // Children of the first one
/// if let Some(first) = tops.first() {
///     let children = client.list_children(&first.id).await?;
///     println!("{} has {} children", first.name, children.len());
/// }
/// # Ok(())
/// # }
/// ```
pub struct CatalogClient {
    base_url: String,
    client: Client,
    credential: RwLock<Option<String>>,
}

impl CatalogClient {
    /// Create a new catalog client
    pub fn new(config: CatalogConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            credential: RwLock::new(config.api_token),
        })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Replace the bearer credential, e.g. after the session was refreshed
    pub fn set_credential(&self, token: Option<String>) {
        *self
            .credential
            .write()
            .unwrap_or_else(PoisonError::into_inner) = token;
    }

    fn credential(&self) -> Option<String> {
        self.credential
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.credential() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ==================== Helper Methods ====================

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response> {
        let response = self.authorize(request).send().await?;
        debug!(status = %response.status(), url = %response.url(), "catalog response");
        Ok(response)
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
        resource: &str,
    ) -> Result<T> {
        if response.status() == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(resource.to_string()));
        }

        if !response.status().is_success() {
            return Err(remote_error(response).await);
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Build a `Remote` error, preferring the store's `message` field
async fn remote_error(response: reqwest::Response) -> CatalogError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or(body);
    CatalogError::Remote { status, message }
}

fn file_part(file: UploadFile) -> Result<Part> {
    Ok(Part::bytes(file.bytes)
        .file_name(file.file_name)
        .mime_str(&file.mime_type)?)
}

#[async_trait]
impl CatalogGateway for CatalogClient {
    async fn list_top_level(&self) -> Result<Vec<Category>> {
        let request = self.client.get(self.url("/categories/parents"));
        let response = self.send(request).await?;
        let entries: Vec<ParentsEntry> = self.handle_response(response, "parents").await?;
        Ok(entries
            .into_iter()
            .next()
            .map(|entry| entry.parents)
            .unwrap_or_default())
    }

    async fn list_children(&self, parent_id: &str) -> Result<Vec<Category>> {
        let url = self.url(&format!(
            "/categories/subcategories/{}",
            urlencoding::encode(parent_id)
        ));
        let response = self.send(self.client.get(url)).await?;
        let body: SubcategoriesResponse = self.handle_response(response, parent_id).await?;
        Ok(body.into_categories())
    }

    async fn list_all(&self) -> Result<Vec<Category>> {
        let response = self.send(self.client.get(self.url("/categories"))).await?;
        self.handle_response(response, "categories").await
    }

    async fn get_category(&self, id: &str) -> Result<Category> {
        let url = self.url(&format!("/categories/{}", urlencoding::encode(id)));
        let response = self.send(self.client.get(url)).await?;
        self.handle_response(response, id).await
    }

    async fn create_category(&self, input: NewCategory) -> Result<Category> {
        if input.name.trim().is_empty() {
            return Err(CatalogError::Validation(
                "category name must not be empty".to_string(),
            ));
        }

        let request = self
            .client
            .post(self.url("/categories"))
            .header(header::CONTENT_TYPE, "application/json")
            .json(&input);
        let response = self.send(request).await?;
        self.handle_response(response, &input.name).await
    }

    async fn delete_category(&self, id: &str) -> Result<bool> {
        let url = self.url(&format!("/categories/{}", urlencoding::encode(id)));
        let response = self.send(self.client.delete(url)).await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(id, "category already deleted");
            return Ok(false);
        }
        if !response.status().is_success() {
            return Err(remote_error(response).await);
        }
        Ok(true)
    }

    async fn attach_content(
        &self,
        leaf_id: &str,
        payload: ContentPayload,
    ) -> Result<ContentAttachResult> {
        payload.check_shape().map_err(CatalogError::Validation)?;

        let kind = payload.kind();
        let mut form = Form::new().text("categoryid", leaf_id.to_string());
        form = match payload {
            ContentPayload::Text(text) => form.text("text", text),
            ContentPayload::Images(files) => {
                for file in files {
                    form = form.part("images", file_part(file)?);
                }
                form
            }
            ContentPayload::Pdf(file) => form.part("pdf", file_part(file)?),
            ContentPayload::Video(url) => form.text("videoUrl", url),
        };

        debug!(leaf_id, %kind, "attaching content");
        let request = self.client.post(self.url("/categories/content")).multipart(form);
        let response = self.send(request).await?;
        self.handle_response(response, leaf_id).await
    }
}
