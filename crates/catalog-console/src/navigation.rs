//! Tree navigation store
//!
//! Tracks where the operator is in the category tree: the selected node,
//! its children, the top-level list and a visit stack used by "back".
//!
//! The stack is a cache. When it runs dry while the selection still has a
//! parent, ancestry is rebuilt by looking the parent up by id, so the store
//! keeps working after a reload or a deletion-triggered refresh.
//!
//! Store state sits behind a mutex that is never held across a gateway
//! call. Each fetch takes a ticket before it suspends; a result is applied
//! only if no newer fetch of the same list (or selection change) was issued
//! in the meantime. The latest action wins.

use crate::error::{ConsoleError, Result};
use catalog_client::{CatalogGateway, Category, CategoryContent, CategoryKind, NewCategory};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Whether a fetched result made it into the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    Applied,
    /// A newer action superseded the request while it was in flight
    Discarded,
}

/// Point-in-time copy of the store for rendering
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavigationSnapshot {
    pub selected: Option<Category>,
    pub children: Vec<Category>,
    pub top_level: Vec<Category>,
    pub stack: Vec<Category>,
    pub last_error: Option<String>,
    pub busy: bool,
}

#[derive(Debug, Default)]
struct NavState {
    selected: Option<Category>,
    children: Vec<Category>,
    top_level: Vec<Category>,
    stack: Vec<Category>,
    last_error: Option<String>,
    /// Bumped on every selection change
    nav_epoch: u64,
    children_seq: u64,
    top_level_seq: u64,
}

impl NavState {
    fn children_ticket(&mut self) -> u64 {
        self.children_seq += 1;
        self.children_seq
    }

    fn top_level_ticket(&mut self) -> u64 {
        self.top_level_seq += 1;
        self.top_level_seq
    }

    fn select(&mut self, node: Option<Category>) {
        self.selected = node;
        self.nav_epoch += 1;
    }

    /// Clear the children list and invalidate any children fetch in flight
    fn clear_children(&mut self) {
        self.children.clear();
        self.children_seq += 1;
    }

    fn selected_id(&self) -> Option<&str> {
        self.selected.as_ref().map(|s| s.id.as_str())
    }

    /// Drop `target_id` and every stacked descendant of it from the local
    /// view. Returns true when the selection went with it.
    fn purge_subtree(&mut self, target_id: &str) -> bool {
        let mut removed: HashSet<String> = HashSet::from([target_id.to_string()]);
        let is_gone = |c: &Category, removed: &HashSet<String>| {
            removed.contains(&c.id) || c.parent_id.as_ref().is_some_and(|p| removed.contains(p))
        };

        // Stack order is visit order, so ancestors precede descendants
        self.stack.retain(|c| {
            let gone = is_gone(c, &removed);
            if gone {
                removed.insert(c.id.clone());
            }
            !gone
        });

        let selection_gone = self
            .selected
            .as_ref()
            .is_some_and(|s| is_gone(s, &removed));
        if selection_gone {
            self.select(None);
        }

        self.children.retain(|c| c.id != target_id);
        self.top_level.retain(|c| c.id != target_id);
        selection_gone
    }

    fn snapshot(&self, busy: bool) -> NavigationSnapshot {
        NavigationSnapshot {
            selected: self.selected.clone(),
            children: self.children.clone(),
            top_level: self.top_level.clone(),
            stack: self.stack.clone(),
            last_error: self.last_error.clone(),
            busy,
        }
    }
}

/// What `go_back` decided while holding the lock
enum BackStep {
    Restore {
        node: Category,
        children: u64,
        top_level: Option<u64>,
    },
    Reconstruct {
        parent_id: String,
        epoch: u64,
    },
    Reset {
        top_level: u64,
    },
}

/// Marks the store busy for as long as it lives
struct BusyGuard<'a>(&'a AtomicUsize);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Category tree navigation store
pub struct NavigationStore {
    gateway: Arc<dyn CatalogGateway>,
    state: Mutex<NavState>,
    in_flight: AtomicUsize,
}

impl NavigationStore {
    pub fn new(gateway: Arc<dyn CatalogGateway>) -> Self {
        Self {
            gateway,
            state: Mutex::new(NavState::default()),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// True while any action is waiting on the gateway.
    ///
    /// Set before the first suspension point of an action, so a UI can
    /// disable re-entrant triggers.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    fn begin(&self) -> BusyGuard<'_> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        BusyGuard(&self.in_flight)
    }

    pub async fn snapshot(&self) -> NavigationSnapshot {
        self.state.lock().await.snapshot(self.is_busy())
    }

    pub async fn selected(&self) -> Option<Category> {
        self.state.lock().await.selected.clone()
    }

    // ==================== Fetch helpers ====================

    async fn fetch_children(&self, parent_id: &str, ticket: u64) -> Result<Refresh> {
        let result = self.gateway.list_children(parent_id).await;

        let mut state = self.state.lock().await;
        if state.children_seq != ticket {
            debug!(parent_id, ticket, "discarding stale children result");
            return Ok(Refresh::Discarded);
        }
        match result {
            Ok(children) => {
                state.children = children;
                state.last_error = None;
                Ok(Refresh::Applied)
            }
            Err(e) => {
                // Keep the previous list on screen
                warn!(parent_id, error = %e, "failed to fetch children");
                state.last_error = Some(format!("Failed to fetch categories: {}", e));
                Err(e.into())
            }
        }
    }

    async fn fetch_top_level(&self, ticket: u64) -> Result<Refresh> {
        let result = self.gateway.list_top_level().await;

        let mut state = self.state.lock().await;
        if state.top_level_seq != ticket {
            debug!(ticket, "discarding stale top-level result");
            return Ok(Refresh::Discarded);
        }
        match result {
            Ok(top_level) => {
                state.top_level = top_level;
                state.last_error = None;
                Ok(Refresh::Applied)
            }
            Err(e) => {
                warn!(error = %e, "failed to fetch top-level categories");
                state.last_error = Some(format!("Failed to fetch parent categories: {}", e));
                Err(e.into())
            }
        }
    }

    /// Show `node` with its children, and the top-level list when asked
    async fn show(&self, node: &Category, children: u64, top_level: Option<u64>) -> Result<Refresh> {
        match top_level {
            Some(top) => {
                let (children, top) = tokio::join!(
                    self.fetch_children(&node.id, children),
                    self.fetch_top_level(top)
                );
                top?;
                children
            }
            None => self.fetch_children(&node.id, children).await,
        }
    }

    async fn record_error(&self, message: String) {
        self.state.lock().await.last_error = Some(message);
    }

    // ==================== Navigation ====================

    /// Load the top-level list for the initial screen
    pub async fn load(&self) -> Result<Refresh> {
        self.refresh_top_level().await
    }

    pub async fn refresh_top_level(&self) -> Result<Refresh> {
        let _busy = self.begin();
        let ticket = self.state.lock().await.top_level_ticket();
        self.fetch_top_level(ticket).await
    }

    /// Reload the children of the current selection
    pub async fn refresh_children(&self) -> Result<Refresh> {
        let _busy = self.begin();
        let (parent_id, ticket) = {
            let mut state = self.state.lock().await;
            match state.selected_id().map(str::to_string) {
                Some(id) => (id, state.children_ticket()),
                None => return Ok(Refresh::Discarded),
            }
        };
        self.fetch_children(&parent_id, ticket).await
    }

    /// Open a category.
    ///
    /// The current selection goes on the stack. If the fetch of the new
    /// children fails, the previous children stay in place.
    pub async fn enter(&self, node: Category) -> Result<Refresh> {
        let _busy = self.begin();
        let ticket = {
            let mut state = self.state.lock().await;
            if let Some(current) = state.selected.take() {
                if current.id != node.id {
                    state.stack.push(current);
                }
            }
            // Re-entering something already on the stack rewinds to it
            if let Some(pos) = state.stack.iter().position(|c| c.id == node.id) {
                state.stack.truncate(pos);
            }
            state.select(Some(node.clone()));
            state.children_ticket()
        };

        debug!(id = %node.id, name = %node.name, "entering category");
        self.fetch_children(&node.id, ticket).await
    }

    /// Step back one level.
    ///
    /// 1. Pop the stack when it has entries. Popping a top-level node
    ///    collapses the whole stack.
    /// 2. Otherwise follow `parent_id` of the selection through the store.
    /// 3. Otherwise return to the top-level view.
    ///
    /// In the first two cases the restored node is shown with its own
    /// children, which is the screen the operator had before descending.
    pub async fn go_back(&self) -> Result<Refresh> {
        let _busy = self.begin();
        let step = {
            let mut state = self.state.lock().await;
            if let Some(prev) = state.stack.pop() {
                if prev.parent_id.is_none() {
                    state.stack.clear();
                }
                state.select(Some(prev.clone()));
                let top_level = prev.is_top_level().then(|| state.top_level_ticket());
                BackStep::Restore {
                    node: prev,
                    children: state.children_ticket(),
                    top_level,
                }
            } else if let Some(parent_id) =
                state.selected.as_ref().and_then(|s| s.parent_id.clone())
            {
                BackStep::Reconstruct {
                    parent_id,
                    epoch: state.nav_epoch,
                }
            } else {
                state.select(None);
                state.clear_children();
                BackStep::Reset {
                    top_level: state.top_level_ticket(),
                }
            }
        };

        match step {
            BackStep::Restore {
                node,
                children,
                top_level,
            } => {
                debug!(id = %node.id, "back to stacked category");
                self.show(&node, children, top_level).await
            }
            BackStep::Reconstruct { parent_id, epoch } => {
                debug!(%parent_id, "stack empty, rebuilding ancestry");
                let parent = match self.gateway.get_category(&parent_id).await {
                    Ok(parent) => parent,
                    Err(e) => {
                        warn!(%parent_id, error = %e, "failed to fetch parent category");
                        self.record_error(format!("Failed to fetch parent category: {}", e))
                            .await;
                        return Err(e.into());
                    }
                };

                let (children, top_level) = {
                    let mut state = self.state.lock().await;
                    if state.nav_epoch != epoch {
                        debug!(%parent_id, "selection moved during ancestry lookup");
                        return Ok(Refresh::Discarded);
                    }
                    state.select(Some(parent.clone()));
                    let top_level = parent.is_top_level().then(|| state.top_level_ticket());
                    (state.children_ticket(), top_level)
                };
                self.show(&parent, children, top_level).await
            }
            BackStep::Reset { top_level } => {
                debug!("back to top level");
                self.fetch_top_level(top_level).await
            }
        }
    }

    // ==================== Structure edits ====================

    /// Create a child of the selection, or a top-level node when nothing is
    /// selected.
    ///
    /// A new leaf is entered immediately so it can be filled. Structural
    /// children are never auto-selected.
    pub async fn add_category(&self, name: &str, as_leaf: bool) -> Result<Category> {
        let _busy = self.begin();
        let name = name.trim();
        if name.is_empty() {
            return Err(ConsoleError::Validation(
                "category name must not be empty".to_string(),
            ));
        }

        let (parent, epoch) = {
            let state = self.state.lock().await;
            (state.selected.clone(), state.nav_epoch)
        };
        if let Some(parent) = parent.as_ref().filter(|p| p.is_leaf()) {
            return Err(ConsoleError::invalid_target(
                &parent.id,
                "content categories cannot contain subcategories",
            ));
        }

        let kind = if as_leaf {
            CategoryKind::Leaf
        } else {
            CategoryKind::Structural
        };
        let input = NewCategory::child(name, kind, parent.as_ref().map(|p| p.id.clone()));
        let created = match self.gateway.create_category(input).await {
            Ok(created) => created,
            Err(e) => {
                self.record_error(format!("Failed to add category: {}", e)).await;
                return Err(e.into());
            }
        };
        info!(id = %created.id, name = %created.name, kind = %created.kind, "category created");

        let (children, top_level, auto_enter) = {
            let mut state = self.state.lock().await;
            let current = state.nav_epoch == epoch;
            let children = (current && !as_leaf && parent.is_some())
                .then(|| state.children_ticket());
            let top_level = parent.is_none().then(|| state.top_level_ticket());
            (children, top_level, current && as_leaf)
        };

        if let Some(ticket) = top_level {
            self.follow_up(self.fetch_top_level(ticket).await);
        }
        if let (Some(ticket), Some(parent)) = (children, parent.as_ref()) {
            self.follow_up(self.fetch_children(&parent.id, ticket).await);
        }
        if auto_enter {
            self.follow_up(self.enter(created.clone()).await);
        }
        Ok(created)
    }

    /// Create a structural top-level category whatever the selection is
    pub async fn add_top_level(&self, name: &str) -> Result<Category> {
        let _busy = self.begin();
        let name = name.trim();
        if name.is_empty() {
            return Err(ConsoleError::Validation(
                "category name must not be empty".to_string(),
            ));
        }

        let created = match self.gateway.create_category(NewCategory::top_level(name)).await {
            Ok(created) => created,
            Err(e) => {
                self.record_error(format!("Failed to create main category: {}", e))
                    .await;
                return Err(e.into());
            }
        };
        info!(id = %created.id, name = %created.name, "top-level category created");

        let ticket = self.state.lock().await.top_level_ticket();
        self.follow_up(self.fetch_top_level(ticket).await);
        Ok(created)
    }

    /// A refresh after a successful mutation. Failures are already recorded
    /// in `last_error`; the mutation itself stands.
    fn follow_up(&self, result: Result<Refresh>) {
        if let Err(e) = result {
            debug!(error = %e, "follow-up refresh failed");
        }
    }

    // ==================== Reconciliation ====================

    /// Fold freshly attached content into every local copy of `leaf`, then
    /// reload the list that shows it.
    pub async fn reconcile_attached(&self, leaf: &Category, content: CategoryContent) {
        let _busy = self.begin();
        let (children, top_level) = {
            let mut state = self.state.lock().await;
            let NavState {
                selected,
                children,
                top_level,
                stack,
                ..
            } = &mut *state;
            selected
                .iter_mut()
                .chain(children.iter_mut())
                .chain(top_level.iter_mut())
                .chain(stack.iter_mut())
                .filter(|c| c.id == leaf.id)
                .for_each(|c| c.content = Some(content.clone()));

            let shows_parent = leaf.parent_id.is_some()
                && state.selected_id() == leaf.parent_id.as_deref();
            let children = shows_parent.then(|| state.children_ticket());
            let top_level = leaf.is_top_level().then(|| state.top_level_ticket());
            (children, top_level)
        };

        if let (Some(ticket), Some(parent_id)) = (children, leaf.parent_id.as_deref()) {
            self.follow_up(self.fetch_children(parent_id, ticket).await);
        }
        if let Some(ticket) = top_level {
            self.follow_up(self.fetch_top_level(ticket).await);
        }
    }

    /// Bring the store in line after `target` was deleted.
    ///
    /// The selection is cleared if it was the target or one of its known
    /// descendants. A child target reloads its former parent's children
    /// when that parent (or nothing) is selected. A top-level target reloads
    /// the top-level list and clears the children list unless the selection
    /// survived elsewhere in the tree.
    pub async fn apply_deletion(&self, target: &Category) {
        let _busy = self.begin();
        let (children, top_level) = {
            let mut state = self.state.lock().await;
            let selection_cleared = state.purge_subtree(&target.id);
            match target.parent_id.as_deref() {
                Some(parent_id) => {
                    let shows_parent = state.selected_id().map_or(true, |id| id == parent_id);
                    (shows_parent.then(|| state.children_ticket()), None)
                }
                None => {
                    if selection_cleared || state.selected.is_none() {
                        state.clear_children();
                    }
                    (None, Some(state.top_level_ticket()))
                }
            }
        };

        if let (Some(ticket), Some(parent_id)) = (children, target.parent_id.as_deref()) {
            self.follow_up(self.fetch_children(parent_id, ticket).await);
        }
        if let Some(ticket) = top_level {
            self.follow_up(self.fetch_top_level(ticket).await);
        }
    }
}
