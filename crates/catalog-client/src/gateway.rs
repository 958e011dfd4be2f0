//! The gateway seam between the console core and the remote store

use crate::error::Result;
use crate::types::{Category, ContentAttachResult, ContentPayload, NewCategory};
use async_trait::async_trait;

/// Remote catalog operations used by the console.
///
/// Implementations own no state beyond their credential. Nothing is cached
/// and nothing is retried; callers decide whether to try again. Every
/// operation except `create_category` is safe to repeat.
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    /// Top-level categories
    async fn list_top_level(&self) -> Result<Vec<Category>>;

    /// Immediate children of `parent_id`. An empty list is a valid answer.
    async fn list_children(&self, parent_id: &str) -> Result<Vec<Category>>;

    /// Every category, unscoped
    async fn list_all(&self) -> Result<Vec<Category>>;

    /// Single lookup, used to rebuild ancestry from `parent_id`
    async fn get_category(&self, id: &str) -> Result<Category>;

    /// Create a category. Not idempotent.
    async fn create_category(&self, input: NewCategory) -> Result<Category>;

    /// Delete a category and its subtree.
    ///
    /// Returns `false` when the id was already gone; that is not an error.
    async fn delete_category(&self, id: &str) -> Result<bool>;

    /// Attach media to a leaf. Each call only replaces its own kind.
    async fn attach_content(
        &self,
        leaf_id: &str,
        payload: ContentPayload,
    ) -> Result<ContentAttachResult>;
}
