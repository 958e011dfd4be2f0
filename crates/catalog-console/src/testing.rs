//! In-memory catalog used by the unit tests

use async_trait::async_trait;
use catalog_client::{
    CatalogError, CatalogGateway, Category, CategoryContent, CategoryKind, ContentAttachResult,
    ContentPayload, NewCategory, Result,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

#[derive(Default)]
struct Tree {
    /// Insertion order doubles as listing order
    order: Vec<String>,
    nodes: HashMap<String, Category>,
    next_id: u64,
    failing: HashSet<&'static str>,
    gates: HashMap<String, Arc<Notify>>,
    calls: Vec<String>,
}

/// Gateway fake with store-side semantics: ids, paths, subtree deletion,
/// per-kind content accumulation.
#[derive(Default, Clone)]
pub struct FakeCatalog {
    tree: Arc<Mutex<Tree>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a node directly, bypassing the call log
    pub fn seed(&self, id: &str, name: &str, kind: CategoryKind, parent: Option<&str>) -> Category {
        let mut tree = self.tree.lock().unwrap();
        let mut path = parent
            .and_then(|p| tree.nodes.get(p))
            .map(|p| p.path.clone())
            .unwrap_or_default();
        path.push(name.to_string());
        let category = Category {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            parent_id: parent.map(str::to_string),
            path,
            content: None,
        };
        tree.order.push(id.to_string());
        tree.nodes.insert(id.to_string(), category.clone());
        category
    }

    pub fn get(&self, id: &str) -> Option<Category> {
        self.tree.lock().unwrap().nodes.get(id).cloned()
    }

    /// Remove a node and its subtree behind the console's back
    pub fn delete_category_now(&self, id: &str) {
        let mut tree = self.tree.lock().unwrap();
        Self::remove_subtree(&mut tree, id);
    }

    pub fn set_content_now(&self, id: &str, content: CategoryContent) {
        if let Some(node) = self.tree.lock().unwrap().nodes.get_mut(id) {
            node.content = Some(content);
        }
    }

    fn remove_subtree(tree: &mut Tree, id: &str) -> bool {
        if !tree.nodes.contains_key(id) {
            return false;
        }
        let mut doomed = HashSet::from([id.to_string()]);
        // Parents precede children in insertion order
        for node_id in tree.order.clone() {
            let parent = tree.nodes[&node_id].parent_id.clone();
            if parent.is_some_and(|p| doomed.contains(&p)) {
                doomed.insert(node_id);
            }
        }
        tree.order.retain(|n| !doomed.contains(n));
        tree.nodes.retain(|n, _| !doomed.contains(n));
        true
    }

    /// Make every call of `op` fail with a remote error until `heal`
    pub fn fail(&self, op: &'static str) {
        self.tree.lock().unwrap().failing.insert(op);
    }

    pub fn heal(&self, op: &'static str) {
        self.tree.lock().unwrap().failing.remove(op);
    }

    /// Hold `list_children(parent_id)` until the returned handle is notified
    pub fn gate_children(&self, parent_id: &str) -> Arc<Notify> {
        self.gate("list_children", parent_id)
    }

    /// Hold `get_category(id)` until the returned handle is notified
    pub fn gate_lookup(&self, id: &str) -> Arc<Notify> {
        self.gate("get_category", id)
    }

    fn gate(&self, op: &str, arg: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.tree
            .lock()
            .unwrap()
            .gates
            .insert(format!("{}:{}", op, arg), notify.clone());
        notify
    }

    /// One-shot: a gate only holds the first matching call
    async fn pass_gate(&self, op: &str, arg: &str) {
        let gate = self
            .tree
            .lock()
            .unwrap()
            .gates
            .remove(&format!("{}:{}", op, arg));
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.tree.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.tree.lock().unwrap().calls.clear();
    }

    fn record(&self, op: &'static str, arg: &str) -> Result<()> {
        let mut tree = self.tree.lock().unwrap();
        tree.calls.push(format!("{}:{}", op, arg));
        if tree.failing.contains(op) {
            return Err(CatalogError::Remote {
                status: 500,
                message: format!("{} failed", op),
            });
        }
        Ok(())
    }

    fn children_of(tree: &Tree, parent: Option<&str>) -> Vec<Category> {
        tree.order
            .iter()
            .filter_map(|id| tree.nodes.get(id))
            .filter(|c| c.parent_id.as_deref() == parent)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl CatalogGateway for FakeCatalog {
    async fn list_top_level(&self) -> Result<Vec<Category>> {
        self.record("list_top_level", "")?;
        let tree = self.tree.lock().unwrap();
        Ok(Self::children_of(&tree, None))
    }

    async fn list_children(&self, parent_id: &str) -> Result<Vec<Category>> {
        self.pass_gate("list_children", parent_id).await;
        self.record("list_children", parent_id)?;
        let tree = self.tree.lock().unwrap();
        Ok(Self::children_of(&tree, Some(parent_id)))
    }

    async fn list_all(&self) -> Result<Vec<Category>> {
        self.record("list_all", "")?;
        let tree = self.tree.lock().unwrap();
        Ok(tree.order.iter().filter_map(|id| tree.nodes.get(id)).cloned().collect())
    }

    async fn get_category(&self, id: &str) -> Result<Category> {
        self.pass_gate("get_category", id).await;
        self.record("get_category", id)?;
        self.get(id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    async fn create_category(&self, input: NewCategory) -> Result<Category> {
        self.record("create_category", &input.name)?;
        if input.name.trim().is_empty() {
            return Err(CatalogError::Validation("category name must not be empty".into()));
        }
        let id = {
            let mut tree = self.tree.lock().unwrap();
            tree.next_id += 1;
            format!("new-{}", tree.next_id)
        };
        Ok(self.seed(&id, &input.name, input.kind, input.parent_id.as_deref()))
    }

    async fn delete_category(&self, id: &str) -> Result<bool> {
        self.record("delete_category", id)?;
        let mut tree = self.tree.lock().unwrap();
        Ok(Self::remove_subtree(&mut tree, id))
    }

    async fn attach_content(
        &self,
        leaf_id: &str,
        payload: ContentPayload,
    ) -> Result<ContentAttachResult> {
        self.record("attach_content", leaf_id)?;
        payload.check_shape().map_err(CatalogError::Validation)?;

        let mut tree = self.tree.lock().unwrap();
        let node = tree
            .nodes
            .get_mut(leaf_id)
            .ok_or_else(|| CatalogError::NotFound(leaf_id.to_string()))?;
        if node.kind != CategoryKind::Leaf {
            return Err(CatalogError::Remote {
                status: 400,
                message: "not a content category".into(),
            });
        }

        let kind = payload.kind();
        let content = node.content.get_or_insert_with(CategoryContent::default);
        match payload {
            ContentPayload::Text(text) => content.text = Some(text),
            ContentPayload::Images(files) => {
                content.image_urls = files
                    .iter()
                    .map(|f| format!("https://cdn.test/{}", f.file_name))
                    .collect()
            }
            ContentPayload::Pdf(file) => {
                content.pdf_url = Some(format!("https://cdn.test/{}", file.file_name))
            }
            ContentPayload::Video(url) => content.video_url = Some(url),
        }

        Ok(ContentAttachResult {
            message: format!("{} content added", kind),
            content: content.clone(),
        })
    }
}
