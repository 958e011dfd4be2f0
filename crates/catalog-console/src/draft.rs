//! Content draft controller
//!
//! One draft at a time, bound to one leaf category:
//!
//! ```text
//! Idle ──open──▶ Composing(kind) ──submit──▶ Submitting ──ok──▶ Idle
//!                     ▲                          │
//!                     └──────────failed──────────┘
//! ```
//!
//! A failed submission puts the draft back untouched so the operator can
//! correct it and retry.

use crate::error::{ConsoleError, Result};
use crate::video;
use catalog_client::{
    CatalogGateway, Category, CategoryContent, ContentKind, ContentPayload, UploadFile,
    MAX_IMAGES,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Payload being composed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Staged {
    Text(String),
    Files(Vec<UploadFile>),
    VideoUrl(String),
}

impl Staged {
    fn empty_for(kind: ContentKind) -> Self {
        match kind {
            ContentKind::Text => Staged::Text(String::new()),
            ContentKind::Image | ContentKind::Pdf => Staged::Files(Vec::new()),
            ContentKind::Video => Staged::VideoUrl(String::new()),
        }
    }
}

/// An open authoring session for one leaf
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub target: Category,
    pub kind: ContentKind,
    pub staged: Staged,
}

impl Draft {
    /// Build the wire payload, or say what is missing
    fn payload(&self) -> Result<ContentPayload> {
        match (&self.staged, self.kind) {
            (Staged::Text(text), _) => {
                if text.trim().is_empty() {
                    return Err(ConsoleError::Validation("Please enter some text".into()));
                }
                Ok(ContentPayload::Text(text.clone()))
            }
            (Staged::Files(files), kind) => {
                let Some(first) = files.first() else {
                    return Err(ConsoleError::Validation(format!(
                        "Please select at least one {} file",
                        kind
                    )));
                };
                Ok(match kind {
                    ContentKind::Pdf => ContentPayload::Pdf(first.clone()),
                    _ => ContentPayload::Images(files.clone()),
                })
            }
            (Staged::VideoUrl(url), _) => {
                validate_video_url(url)?;
                Ok(ContentPayload::Video(url.trim().to_string()))
            }
        }
    }
}

/// Draft lifecycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DraftState {
    #[default]
    Idle,
    Composing(Draft),
    Submitting(Draft),
}

impl DraftState {
    pub fn draft(&self) -> Option<&Draft> {
        match self {
            DraftState::Idle => None,
            DraftState::Composing(draft) | DraftState::Submitting(draft) => Some(draft),
        }
    }
}

/// Result of a `stage_files` call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageReport {
    pub accepted: usize,
    /// Names of files that were dropped
    pub rejected: Vec<String>,
}

/// A successful submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachOutcome {
    pub target: Category,
    pub kind: ContentKind,
    /// Store-provided message, may be empty
    pub message: String,
    /// Content of the leaf after the attach
    pub content: CategoryContent,
}

/// Accept absolute YouTube URLs only
pub fn validate_video_url(value: &str) -> Result<()> {
    match video::video_id(value) {
        Some(_) => Ok(()),
        None => Err(ConsoleError::Validation(
            "Please enter a valid YouTube URL".to_string(),
        )),
    }
}

/// Content draft controller
pub struct DraftController {
    gateway: Arc<dyn CatalogGateway>,
    state: Mutex<DraftState>,
}

impl DraftController {
    pub fn new(gateway: Arc<dyn CatalogGateway>) -> Self {
        Self {
            gateway,
            state: Mutex::new(DraftState::Idle),
        }
    }

    pub async fn state(&self) -> DraftState {
        self.state.lock().await.clone()
    }

    /// Start (or restart) composing `kind` for `target`.
    ///
    /// Reopening for the same leaf switches kind and resets the payload.
    pub async fn open_draft(&self, target: &Category, kind: ContentKind) -> Result<()> {
        if !target.is_leaf() {
            return Err(ConsoleError::invalid_target(
                &target.id,
                "content can only be attached to content categories",
            ));
        }

        let mut state = self.state.lock().await;
        match &*state {
            DraftState::Submitting(_) => {
                return Err(ConsoleError::Busy("content submission".into()));
            }
            DraftState::Composing(open) if open.target.id != target.id => {
                return Err(ConsoleError::DraftConflict {
                    open: open.target.id.clone(),
                });
            }
            _ => {}
        }

        debug!(target = %target.id, %kind, "draft opened");
        *state = DraftState::Composing(Draft {
            target: target.clone(),
            kind,
            staged: Staged::empty_for(kind),
        });
        Ok(())
    }

    async fn with_draft<T>(&self, f: impl FnOnce(&mut Draft) -> Result<T>) -> Result<T> {
        let mut state = self.state.lock().await;
        match &mut *state {
            DraftState::Composing(draft) => f(draft),
            DraftState::Submitting(_) => Err(ConsoleError::Busy("content submission".into())),
            DraftState::Idle => Err(ConsoleError::Validation("no draft is open".into())),
        }
    }

    /// Replace the staged files.
    ///
    /// Images keep up to five PNG/JPEG files; PDF keeps the first PDF.
    /// Everything else is reported back as rejected.
    pub async fn stage_files(&self, files: Vec<UploadFile>) -> Result<StageReport> {
        self.with_draft(|draft| {
            if !draft.kind.takes_files() {
                return Err(ConsoleError::Validation(format!(
                    "{} content does not take files",
                    draft.kind
                )));
            }
            let (limit, accepts): (usize, fn(&UploadFile) -> bool) = match draft.kind {
                ContentKind::Pdf => (1, UploadFile::is_pdf),
                _ => (MAX_IMAGES, UploadFile::is_image),
            };

            let mut report = StageReport::default();
            let mut kept = Vec::new();
            for file in files {
                if kept.len() < limit && accepts(&file) {
                    kept.push(file);
                } else {
                    report.rejected.push(file.file_name);
                }
            }
            report.accepted = kept.len();
            if !report.rejected.is_empty() {
                debug!(rejected = ?report.rejected, "files dropped while staging");
            }
            draft.staged = Staged::Files(kept);
            Ok(report)
        })
        .await
    }

    /// Drop one staged file by position
    pub async fn remove_staged_file(&self, index: usize) -> Result<UploadFile> {
        self.with_draft(|draft| match &mut draft.staged {
            Staged::Files(files) if index < files.len() => Ok(files.remove(index)),
            Staged::Files(_) => Err(ConsoleError::Validation(format!(
                "no staged file at position {}",
                index
            ))),
            _ => Err(ConsoleError::Validation(format!(
                "{} content does not take files",
                draft.kind
            ))),
        })
        .await
    }

    pub async fn set_text(&self, value: impl Into<String>) -> Result<()> {
        let value = value.into();
        self.with_draft(|draft| match &mut draft.staged {
            Staged::Text(text) => {
                *text = value;
                Ok(())
            }
            _ => Err(ConsoleError::Validation(format!(
                "cannot set text on a {} draft",
                draft.kind
            ))),
        })
        .await
    }

    /// Stage a video URL. Checked on submit, not here.
    pub async fn set_video_url(&self, value: impl Into<String>) -> Result<()> {
        let value = value.into();
        self.with_draft(|draft| match &mut draft.staged {
            Staged::VideoUrl(url) => {
                *url = value;
                Ok(())
            }
            _ => Err(ConsoleError::Validation(format!(
                "cannot set a video URL on a {} draft",
                draft.kind
            ))),
        })
        .await
    }

    /// Send the draft to the store.
    ///
    /// Validation failures never leave the process. On any failure the
    /// draft stays open as it was.
    pub async fn submit(&self) -> Result<AttachOutcome> {
        let (draft, payload) = {
            let mut state = self.state.lock().await;
            let draft = match &*state {
                DraftState::Composing(draft) => draft.clone(),
                DraftState::Submitting(_) => {
                    return Err(ConsoleError::Busy("content submission".into()))
                }
                DraftState::Idle => {
                    return Err(ConsoleError::Validation("no draft is open".into()))
                }
            };
            let payload = draft.payload()?;
            *state = DraftState::Submitting(draft.clone());
            (draft, payload)
        };

        let result = self.gateway.attach_content(&draft.target.id, payload).await;

        let mut state = self.state.lock().await;
        match result {
            Ok(attached) => {
                info!(target = %draft.target.id, kind = %draft.kind, "content attached");
                *state = DraftState::Idle;
                Ok(AttachOutcome {
                    target: draft.target,
                    kind: draft.kind,
                    message: attached.message,
                    content: attached.content,
                })
            }
            Err(e) => {
                warn!(target = %draft.target.id, kind = %draft.kind, error = %e, "attach failed");
                *state = DraftState::Composing(draft);
                Err(e.into())
            }
        }
    }

    /// Discard the draft
    pub async fn cancel(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        if matches!(*state, DraftState::Submitting(_)) {
            return Err(ConsoleError::Busy("content submission".into()));
        }
        *state = DraftState::Idle;
        Ok(())
    }
}
