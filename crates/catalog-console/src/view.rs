//! Presentation adapters
//!
//! Pure functions from store snapshots to render-ready structures. Nothing
//! here talks to the gateway.

use crate::navigation::NavigationSnapshot;
use crate::video;
use catalog_client::{Category, CategoryKind};
use serde::Serialize;

const ROOT_TITLE: &str = "Categories";
const LEAF_HINT: &str = "Add a new content using the form above";
const STRUCTURAL_HINT: &str = "Add a new subcategory using the form above";

/// Which kinds of content a category carries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ContentBadges {
    pub text: bool,
    pub images: usize,
    pub pdf: bool,
    pub video: bool,
}

impl ContentBadges {
    pub fn of(category: &Category) -> Self {
        match category.attached() {
            Some(content) => Self {
                text: content.text.as_deref().is_some_and(|t| !t.is_empty()),
                images: content.image_urls.len(),
                pdf: content.pdf_url.is_some(),
                video: content.video_url.is_some(),
            },
            None => Self::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Short labels such as `["text", "3 images", "pdf"]`
    pub fn labels(&self) -> Vec<String> {
        let mut labels = Vec::new();
        if self.text {
            labels.push("text".to_string());
        }
        match self.images {
            0 => {}
            1 => labels.push("1 image".to_string()),
            n => labels.push(format!("{} images", n)),
        }
        if self.pdf {
            labels.push("pdf".to_string());
        }
        if self.video {
            labels.push("video".to_string());
        }
        labels
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeRow {
    pub id: String,
    pub name: String,
    pub kind: CategoryKind,
    pub selected: bool,
    pub badges: ContentBadges,
}

impl TreeRow {
    fn new(category: &Category, selected_id: Option<&str>) -> Self {
        Self {
            id: category.id.clone(),
            name: category.name.clone(),
            kind: category.kind,
            selected: selected_id == Some(category.id.as_str()),
            badges: ContentBadges::of(category),
        }
    }
}

/// Everything the navigation screen shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationView {
    pub title: String,
    pub breadcrumb: Vec<String>,
    pub can_go_back: bool,
    pub top_level: Vec<TreeRow>,
    pub children: Vec<TreeRow>,
    /// Set when the selection has no children to list
    pub empty_hint: Option<String>,
}

impl NavigationView {
    pub fn from_snapshot(snapshot: &NavigationSnapshot) -> Self {
        let selected = snapshot.selected.as_ref();
        let selected_id = selected.map(|s| s.id.as_str());
        let rows = |list: &[Category]| {
            list.iter()
                .map(|c| TreeRow::new(c, selected_id))
                .collect::<Vec<_>>()
        };

        let breadcrumb = match selected {
            Some(node) if !node.path.is_empty() => node.path.clone(),
            Some(node) => ancestry(node, &snapshot.stack),
            None => Vec::new(),
        };

        let empty_hint = match selected {
            Some(node) if snapshot.children.is_empty() => {
                let hint = if node.is_leaf() { LEAF_HINT } else { STRUCTURAL_HINT };
                Some(hint.to_string())
            }
            _ => None,
        };

        Self {
            title: selected.map_or_else(|| ROOT_TITLE.to_string(), |s| s.name.clone()),
            breadcrumb,
            // A cleared selection can still have history to return to
            can_go_back: selected.is_some() || !snapshot.stack.is_empty(),
            top_level: rows(&snapshot.top_level),
            children: rows(&snapshot.children),
            empty_hint,
        }
    }
}

/// Names from the outermost known ancestor down to `node`.
///
/// Only stack entries on the `parent_id` chain count; the stack also holds
/// nodes the operator merely passed through.
fn ancestry(node: &Category, stack: &[Category]) -> Vec<String> {
    let mut names = vec![node.name.clone()];
    let mut parent = node.parent_id.as_deref();
    for visited in stack.iter().rev() {
        if parent == Some(visited.id.as_str()) {
            names.push(visited.name.clone());
            parent = visited.parent_id.as_deref();
        }
    }
    names.reverse();
    names
}

/// Read-only rendering of a leaf's content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentPreview {
    pub title: String,
    /// Ancestor names joined as `A > B > C`
    pub breadcrumb: String,
    pub text: Option<String>,
    pub image_urls: Vec<String>,
    pub pdf_url: Option<String>,
    pub video_embed_url: Option<String>,
}

impl ContentPreview {
    /// `None` for structural categories and leaves without content
    pub fn of(category: &Category) -> Option<Self> {
        let content = category.attached()?;
        let breadcrumb = if category.path.is_empty() {
            category.name.clone()
        } else {
            category.path.join(" > ")
        };
        Some(Self {
            title: category.name.clone(),
            breadcrumb,
            text: content.text.clone(),
            image_urls: content.image_urls.clone(),
            pdf_url: content.pdf_url.clone(),
            video_embed_url: content.video_url.as_deref().map(video::embed_url),
        })
    }
}
