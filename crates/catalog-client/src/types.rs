//! Types for the catalog store API

use serde::{Deserialize, Serialize};

/// Maximum number of images a leaf category may carry
pub const MAX_IMAGES: usize = 5;

/// MIME type accepted for PDF attachments
pub const PDF_MIME: &str = "application/pdf";

/// Client configuration
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL for the catalog REST API (e.g. "https://catalog.example.com/api")
    pub base_url: String,
    /// Bearer credential issued by the session collaborator
    pub api_token: Option<String>,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            api_token: None,
            timeout_secs: 30,
        }
    }
}

/// Category kind. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CategoryKind {
    /// Organizes other categories, never holds content
    #[serde(rename = "category")]
    Structural,
    /// Terminal node that can carry attached media
    #[serde(rename = "content")]
    Leaf,
}

impl CategoryKind {
    /// Wire name of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKind::Structural => "category",
            CategoryKind::Leaf => "content",
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, CategoryKind::Leaf)
    }
}

impl std::fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Media attached to a leaf category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
    /// Reference to an external video platform
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

impl CategoryContent {
    /// True when no field carries any material
    pub fn is_empty(&self) -> bool {
        self.text.as_deref().map_or(true, str::is_empty)
            && self.image_urls.is_empty()
            && self.pdf_url.is_none()
            && self.video_url.is_none()
    }
}

/// A node in the category tree
///
/// Decoding goes through [`CategoryRecord`] so that a structural category
/// never carries content, whatever the store sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CategoryRecord")]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CategoryKind,
    #[serde(rename = "parentId", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Ancestor names from the root to this node. Computed by the store.
    pub path: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<CategoryContent>,
}

impl Category {
    pub fn is_leaf(&self) -> bool {
        self.kind.is_leaf()
    }

    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Attached content, if any material is present
    pub fn attached(&self) -> Option<&CategoryContent> {
        self.content.as_ref().filter(|c| !c.is_empty())
    }
}

/// Raw wire shape of a category
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CategoryKind,
    #[serde(rename = "parentId", default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub path: Vec<String>,
    #[serde(default)]
    pub content: Option<CategoryContent>,
}

impl From<CategoryRecord> for Category {
    fn from(record: CategoryRecord) -> Self {
        let content = match record.kind {
            CategoryKind::Structural => None,
            CategoryKind::Leaf => record.content,
        };
        Self {
            id: record.id,
            name: record.name,
            kind: record.kind,
            parent_id: record.parent_id,
            path: record.path,
            content,
        }
    }
}

/// Request body for creating a category
#[derive(Debug, Clone, Serialize)]
pub struct NewCategory {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CategoryKind,
    #[serde(rename = "parentId", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl NewCategory {
    /// Top-level structural category
    pub fn top_level(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: CategoryKind::Structural,
            parent_id: None,
        }
    }

    /// Child of `parent_id`, or a top-level node when `None`
    pub fn child(name: impl Into<String>, kind: CategoryKind, parent_id: Option<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            parent_id,
        }
    }
}

/// Entry of the `GET /categories/parents` response
#[derive(Debug, Clone, Deserialize)]
pub struct ParentsEntry {
    #[serde(default)]
    pub parents: Vec<Category>,
}

/// `GET /categories/subcategories/{id}` response. Some deployments answer
/// with the bare list instead of the wrapped form.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SubcategoriesResponse {
    Wrapped(Vec<SubcategoriesEntry>),
    Flat(Vec<Category>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubcategoriesEntry {
    pub subcategories: Vec<Category>,
}

impl SubcategoriesResponse {
    pub fn into_categories(self) -> Vec<Category> {
        match self {
            SubcategoriesResponse::Wrapped(entries) => entries
                .into_iter()
                .next()
                .map(|entry| entry.subcategories)
                .unwrap_or_default(),
            SubcategoriesResponse::Flat(categories) => categories,
        }
    }
}

/// A file picked for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn is_pdf(&self) -> bool {
        self.mime_type.eq_ignore_ascii_case(PDF_MIME)
    }

    /// PNG or JPEG
    pub fn is_image(&self) -> bool {
        matches!(
            self.mime_type.to_ascii_lowercase().as_str(),
            "image/png" | "image/jpeg" | "image/jpg"
        )
    }
}

/// Content kinds that can be attached to a leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
    Image,
    Pdf,
    Video,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Text => "text",
            ContentKind::Image => "image",
            ContentKind::Pdf => "pdf",
            ContentKind::Video => "video",
        }
    }

    /// Kinds that are staged as files
    pub fn takes_files(&self) -> bool {
        matches!(self, ContentKind::Image | ContentKind::Pdf)
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload for `POST /categories/content`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPayload {
    Text(String),
    Images(Vec<UploadFile>),
    Pdf(UploadFile),
    /// Must already be validated by the caller
    Video(String),
}

impl ContentPayload {
    pub fn kind(&self) -> ContentKind {
        match self {
            ContentPayload::Text(_) => ContentKind::Text,
            ContentPayload::Images(_) => ContentKind::Image,
            ContentPayload::Pdf(_) => ContentKind::Pdf,
            ContentPayload::Video(_) => ContentKind::Video,
        }
    }

    /// Shape check run before anything is sent
    pub fn check_shape(&self) -> Result<(), String> {
        match self {
            ContentPayload::Text(text) if text.trim().is_empty() => {
                Err("text content must not be blank".to_string())
            }
            ContentPayload::Images(files) if files.is_empty() => {
                Err("at least one image is required".to_string())
            }
            ContentPayload::Images(files) if files.len() > MAX_IMAGES => Err(format!(
                "at most {} images can be attached, got {}",
                MAX_IMAGES,
                files.len()
            )),
            ContentPayload::Images(files) => match files.iter().find(|f| !f.is_image()) {
                Some(file) => Err(format!(
                    "{} is not an image ({})",
                    file.file_name, file.mime_type
                )),
                None => Ok(()),
            },
            ContentPayload::Pdf(file) if !file.is_pdf() => Err(format!(
                "{} is not a PDF ({})",
                file.file_name, file.mime_type
            )),
            ContentPayload::Video(url) if url.trim().is_empty() => {
                Err("video URL must not be blank".to_string())
            }
            _ => Ok(()),
        }
    }
}

/// Response from `POST /categories/content`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentAttachResult {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub content: CategoryContent,
}

/// Error body returned by the store
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_category_drops_content() {
        let json = r#"{
            "_id": "c1",
            "name": "Physics",
            "type": "category",
            "path": ["Physics"],
            "content": {"text": "stray", "imageUrls": []}
        }"#;

        let category: Category = serde_json::from_str(json).unwrap();
        assert_eq!(category.kind, CategoryKind::Structural);
        assert!(category.content.is_none());
        assert!(category.is_top_level());
    }

    #[test]
    fn test_leaf_category_keeps_all_content_kinds() {
        let json = r#"{
            "_id": "l1",
            "name": "Kinematics",
            "type": "content",
            "parentId": "c1",
            "path": ["Physics", "Kinematics"],
            "content": {
                "text": "notes",
                "imageUrls": ["https://cdn.example.com/a.png"],
                "pdfUrl": "https://cdn.example.com/a.pdf",
                "videoUrl": "https://youtu.be/abc123"
            }
        }"#;

        let category: Category = serde_json::from_str(json).unwrap();
        let content = category.attached().unwrap();
        assert_eq!(content.text.as_deref(), Some("notes"));
        assert_eq!(content.image_urls.len(), 1);
        assert!(content.pdf_url.is_some());
        assert!(content.video_url.is_some());
        assert_eq!(category.parent_id.as_deref(), Some("c1"));
    }

    #[test]
    fn test_missing_path_and_image_urls_default() {
        let json = r#"{"_id": "l2", "name": "Empty", "type": "content", "content": {}}"#;
        let category: Category = serde_json::from_str(json).unwrap();
        assert!(category.path.is_empty());
        assert!(category.content.as_ref().unwrap().is_empty());
        assert!(category.attached().is_none());
    }

    #[test]
    fn test_new_category_wire_shape() {
        let body = serde_json::to_value(NewCategory::child(
            "Optics",
            CategoryKind::Leaf,
            Some("c1".into()),
        ))
        .unwrap();
        assert_eq!(body["type"], "content");
        assert_eq!(body["parentId"], "c1");

        let body = serde_json::to_value(NewCategory::top_level("Maths")).unwrap();
        assert_eq!(body["type"], "category");
        assert!(body.get("parentId").is_none());
    }

    #[test]
    fn test_subcategories_accepts_wrapped_and_flat() {
        let wrapped = r#"[{"subcategories": [{"_id": "a", "name": "A", "type": "category"}]}]"#;
        let parsed: SubcategoriesResponse = serde_json::from_str(wrapped).unwrap();
        assert_eq!(parsed.into_categories()[0].id, "a");

        let flat = r#"[{"_id": "b", "name": "B", "type": "content", "parentId": "a"}]"#;
        let parsed: SubcategoriesResponse = serde_json::from_str(flat).unwrap();
        assert_eq!(parsed.into_categories()[0].id, "b");

        let parsed: SubcategoriesResponse = serde_json::from_str("[]").unwrap();
        assert!(parsed.into_categories().is_empty());
    }

    #[test]
    fn test_payload_shape_checks() {
        let png = UploadFile::new("a.png", "image/png", vec![1]);
        let pdf = UploadFile::new("a.pdf", PDF_MIME, vec![1]);

        assert!(ContentPayload::Text("  ".into()).check_shape().is_err());
        assert!(ContentPayload::Images(vec![]).check_shape().is_err());
        assert!(ContentPayload::Images(vec![png.clone(); 6]).check_shape().is_err());
        assert!(ContentPayload::Images(vec![png.clone(); 5]).check_shape().is_ok());
        assert!(ContentPayload::Images(vec![pdf.clone()]).check_shape().is_err());
        assert!(ContentPayload::Pdf(png).check_shape().is_err());
        assert!(ContentPayload::Pdf(pdf).check_shape().is_ok());
        assert!(ContentPayload::Video(String::new()).check_shape().is_err());
    }
}
