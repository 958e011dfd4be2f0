//! Rust client for the category catalog REST store
//!
//! The store owns persistence, id generation and path computation. This
//! crate is a thin, stateless gateway over it: list, look up, create and
//! delete categories, and attach media to leaf categories.
//!
//! # Example
//!
//! ```rust,no_run
//! use catalog_client::{CatalogClient, CatalogConfig, CatalogGateway, ContentPayload};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = CatalogClient::new(CatalogConfig {
//!     base_url: "http://localhost:8080/api".into(),
//!     api_token: Some("session-token".into()),
//!     ..Default::default()
//! })?;
//!
//! // Attach a text note to a leaf category
//! let result = client
//!     .attach_content("leaf-id", ContentPayload::Text("Chapter notes".into()))
//!     .await?;
//! println!("{}", result.message);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod gateway;
pub mod types;

// Re-export main types
pub use client::CatalogClient;
pub use error::{CatalogError, Result};
pub use gateway::CatalogGateway;
pub use types::*;
