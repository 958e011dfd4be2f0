//! Catalog Console - category tree administration core
//!
//! State and workflows behind an admin console for a hierarchical content
//! catalog. The remote store is reached only through
//! [`catalog_client::CatalogGateway`], so every component can run against
//! the HTTP client or an in-memory fake.
//!
//! # Components
//!
//! - [`NavigationStore`]: selection, children, top-level list, back stack
//! - [`DraftController`]: one content draft at a time, bound to a leaf
//! - [`DeletionCoordinator`]: confirm-then-delete, reconciling navigation
//! - [`view`]: render-ready structures built from snapshots
//! - [`CatalogConsole`]: wires the above to one gateway
//!
//! # Example
//!
//! ```rust,no_run
//! use catalog_client::{CatalogClient, CatalogConfig};
//! use catalog_console::CatalogConsole;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = CatalogClient::new(CatalogConfig::default())?;
//! let console = CatalogConsole::new(Arc::new(client));
//!
//! let view = console.browse(&["science".to_string()]).await?;
//! for row in &view.children {
//!     println!("{} ({})", row.name, row.kind);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod console;
pub mod deletion;
pub mod draft;
pub mod error;
pub mod navigation;
pub mod video;
pub mod view;

#[cfg(test)]
mod testing;

pub use config::{ConnectionArgs, ConsoleConfig};
pub use console::{CatalogConsole, Notice};
pub use deletion::{DeletionCoordinator, DeletionState};
pub use draft::{AttachOutcome, Draft, DraftController, DraftState, StageReport, Staged};
pub use error::{ConsoleError, Result};
pub use navigation::{NavigationSnapshot, NavigationStore, Refresh};
pub use view::{ContentBadges, ContentPreview, NavigationView, TreeRow};
