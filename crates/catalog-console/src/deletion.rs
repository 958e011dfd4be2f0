//! Two-step category deletion: request, then confirm or cancel.

use crate::error::{ConsoleError, Result};
use crate::navigation::NavigationStore;
use catalog_client::{CatalogGateway, Category};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DeletionState {
    #[default]
    Idle,
    Confirming(Category),
    Deleting(Category),
}

/// Deletion coordinator
///
/// The only component besides the store itself that touches the store's
/// selection, through [`NavigationStore::apply_deletion`].
pub struct DeletionCoordinator {
    gateway: Arc<dyn CatalogGateway>,
    navigation: Arc<NavigationStore>,
    state: Mutex<DeletionState>,
}

impl DeletionCoordinator {
    pub fn new(gateway: Arc<dyn CatalogGateway>, navigation: Arc<NavigationStore>) -> Self {
        Self {
            gateway,
            navigation,
            state: Mutex::new(DeletionState::Idle),
        }
    }

    pub async fn state(&self) -> DeletionState {
        self.state.lock().await.clone()
    }

    /// Ask for confirmation. A pending request for another node is replaced.
    pub async fn request_delete(&self, target: Category) -> Result<()> {
        let mut state = self.state.lock().await;
        if let DeletionState::Deleting(current) = &*state {
            return Err(ConsoleError::Busy(format!("deleting {}", current.name)));
        }
        *state = DeletionState::Confirming(target);
        Ok(())
    }

    /// Delete the pending target and reconcile navigation.
    ///
    /// A target that is already gone on the store side counts as deleted.
    pub async fn confirm(&self) -> Result<Category> {
        let target = {
            let mut state = self.state.lock().await;
            match std::mem::take(&mut *state) {
                DeletionState::Confirming(target) => {
                    *state = DeletionState::Deleting(target.clone());
                    target
                }
                DeletionState::Deleting(current) => {
                    let name = current.name.clone();
                    *state = DeletionState::Deleting(current);
                    return Err(ConsoleError::Busy(format!("deleting {}", name)));
                }
                DeletionState::Idle => {
                    return Err(ConsoleError::Validation(
                        "no deletion is pending".to_string(),
                    ))
                }
            }
        };

        let result = self.gateway.delete_category(&target.id).await;
        *self.state.lock().await = DeletionState::Idle;

        match result {
            Ok(existed) => {
                if existed {
                    info!(id = %target.id, name = %target.name, "category deleted");
                } else {
                    info!(id = %target.id, "category was already gone");
                }
                self.navigation.apply_deletion(&target).await;
                Ok(target)
            }
            Err(e) => {
                warn!(id = %target.id, error = %e, "delete failed");
                Err(e.into())
            }
        }
    }

    /// Drop the pending request without contacting the store
    pub async fn cancel(&self) {
        let mut state = self.state.lock().await;
        if matches!(*state, DeletionState::Confirming(_)) {
            *state = DeletionState::Idle;
        }
    }
}
