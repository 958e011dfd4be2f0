//! Console facade
//!
//! Wires the navigation store, the draft controller and the deletion
//! coordinator to one gateway, and turns their results into the status
//! lines an operator sees.

use crate::deletion::DeletionCoordinator;
use crate::draft::{AttachOutcome, DraftController};
use crate::error::Result;
use crate::navigation::NavigationStore;
use crate::view::{ContentPreview, NavigationView};
use catalog_client::{CatalogGateway, Category};
use std::sync::Arc;

/// Operator-facing result of an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice<T> {
    pub value: T,
    pub message: String,
}

pub struct CatalogConsole {
    gateway: Arc<dyn CatalogGateway>,
    navigation: Arc<NavigationStore>,
    drafts: DraftController,
    deletion: DeletionCoordinator,
}

impl CatalogConsole {
    pub fn new(gateway: Arc<dyn CatalogGateway>) -> Self {
        let navigation = Arc::new(NavigationStore::new(gateway.clone()));
        Self {
            drafts: DraftController::new(gateway.clone()),
            deletion: DeletionCoordinator::new(gateway.clone(), navigation.clone()),
            navigation,
            gateway,
        }
    }

    pub fn navigation(&self) -> &NavigationStore {
        &self.navigation
    }

    pub fn drafts(&self) -> &DraftController {
        &self.drafts
    }

    pub fn deletion(&self) -> &DeletionCoordinator {
        &self.deletion
    }

    pub async fn view(&self) -> NavigationView {
        NavigationView::from_snapshot(&self.navigation.snapshot().await)
    }

    /// Fetch a category by id
    pub async fn category(&self, id: &str) -> Result<Category> {
        Ok(self.gateway.get_category(id).await?)
    }

    /// Fetch a leaf by id and render its content, if it has any
    pub async fn preview(&self, id: &str) -> Result<Option<ContentPreview>> {
        Ok(ContentPreview::of(&self.category(id).await?))
    }

    /// Enter each id in turn, starting from the top level
    pub async fn browse(&self, ids: &[String]) -> Result<NavigationView> {
        self.navigation.load().await?;
        for id in ids {
            let node = self.category(id).await?;
            self.navigation.enter(node).await?;
        }
        Ok(self.view().await)
    }

    pub async fn add_category(&self, name: &str, as_leaf: bool) -> Result<Notice<Category>> {
        let created = self.navigation.add_category(name, as_leaf).await?;
        Ok(Notice {
            message: format!("{} added successfully", created.name),
            value: created,
        })
    }

    pub async fn add_top_level(&self, name: &str) -> Result<Notice<Category>> {
        let created = self.navigation.add_top_level(name).await?;
        Ok(Notice {
            message: format!("{} added successfully", created.name),
            value: created,
        })
    }

    /// Submit the open draft and fold the result into the navigation state
    pub async fn submit_draft(&self) -> Result<Notice<AttachOutcome>> {
        let outcome = self.drafts.submit().await?;
        self.navigation
            .reconcile_attached(&outcome.target, outcome.content.clone())
            .await;

        let message = if outcome.message.trim().is_empty() {
            format!("{} content added successfully", outcome.kind)
        } else {
            outcome.message.clone()
        };
        Ok(Notice {
            value: outcome,
            message,
        })
    }

    pub async fn confirm_delete(&self) -> Result<Notice<Category>> {
        let deleted = self.deletion.confirm().await?;
        Ok(Notice {
            message: format!("{} deleted successfully", deleted.name),
            value: deleted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeCatalog;
    use catalog_client::CategoryKind::{Leaf, Structural};
    use catalog_client::{ContentKind, UploadFile};

    fn console() -> (FakeCatalog, CatalogConsole) {
        let fake = FakeCatalog::new();
        fake.seed("A", "Science", Structural, None);
        fake.seed("B", "Physics", Structural, Some("A"));
        fake.seed("C", "Optics", Leaf, Some("B"));
        let console = CatalogConsole::new(Arc::new(fake.clone()));
        (fake, console)
    }

    #[tokio::test]
    async fn test_browse_builds_view() {
        let (_, console) = console();
        let view = console
            .browse(&["A".to_string(), "B".to_string()])
            .await
            .unwrap();

        assert_eq!(view.title, "Physics");
        assert_eq!(view.breadcrumb, vec!["Science", "Physics"]);
        assert!(view.can_go_back);
        assert_eq!(view.children.len(), 1);
        assert_eq!(view.children[0].name, "Optics");
        assert!(!view.top_level[0].selected);
    }

    #[tokio::test]
    async fn test_browse_unknown_id() {
        let (_, console) = console();
        let err = console.browse(&["nope".to_string()]).await.unwrap_err();
        assert!(matches!(err, crate::ConsoleError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_submit_updates_children_badges() {
        let (fake, console) = console();
        console
            .browse(&["A".to_string(), "B".to_string()])
            .await
            .unwrap();

        let leaf = fake.get("C").unwrap();
        console.drafts().open_draft(&leaf, ContentKind::Image).await.unwrap();
        console
            .drafts()
            .stage_files(vec![UploadFile::new("a.png", "image/png", vec![1])])
            .await
            .unwrap();
        let notice = console.submit_draft().await.unwrap();

        assert_eq!(notice.message, "image content added");
        let view = console.view().await;
        assert_eq!(view.children[0].badges.images, 1);

        let preview = console.preview("C").await.unwrap().unwrap();
        assert_eq!(preview.image_urls, vec!["https://cdn.test/a.png"]);
        assert_eq!(preview.breadcrumb, "Science > Physics > Optics");
    }

    #[tokio::test]
    async fn test_add_and_delete_messages() {
        let (_, console) = console();
        console.browse(&["A".to_string()]).await.unwrap();

        let added = console.add_category("Biology", false).await.unwrap();
        assert_eq!(added.message, "Biology added successfully");
        assert_eq!(console.view().await.children.len(), 2);

        console.deletion().request_delete(added.value).await.unwrap();
        let deleted = console.confirm_delete().await.unwrap();
        assert_eq!(deleted.message, "Biology deleted successfully");
        assert_eq!(console.view().await.children.len(), 1);

        let main = console.add_top_level("Arts").await.unwrap();
        assert_eq!(main.message, "Arts added successfully");
        assert_eq!(console.view().await.top_level.len(), 2);
    }
}
