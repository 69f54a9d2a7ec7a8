//! legaldata harvester - Enumerate and download regulatory documents from
//! Japanese government and industry sites.
//!
//! Each supported site has a loader that lists the documents it currently
//! publishes as [`Link`] values. Links can then be persisted with their
//! metadata, either as fetched or as extracted text.
//!
//! # Example
//!
//! ```
//! use legaldata_harvester::uri::resolve_url;
//!
//! // Resolve a relative href found on a harvested page
//! assert_eq!(
//!     resolve_url("/sesc/jirei/index.html", "https://www.fsa.go.jp"),
//!     "https://www.fsa.go.jp/sesc/jirei/index.html"
//! );
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Base URLs, fetch settings and validation helpers
//! - [`error`]: Error types and Result alias
//! - [`uri`]: Relative URL resolution
//! - [`http`]: HTTP client and content retrieval with encoding detection
//! - [`text`]: Visible text extraction from HTML
//! - [`html`], [`xml`]: Parsing helpers
//! - [`link`]: The Link data model
//! - [`loader`]: The Loader contract and per-row harvest results
//! - [`persist`]: Saving links and metadata to disk
//! - [`sources`]: Site loaders
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod error;
pub mod html;
pub mod http;
pub mod link;
pub mod loader;
pub mod persist;
pub mod sources;
pub mod text;
pub mod uri;
pub mod xml;

// Re-export commonly used items
pub use config::FetchConfig;
pub use error::{HarvesterError, Result};
pub use http::{create_client, fetch, fetch_text, DecodePolicy, FetchedContent};
pub use link::{Link, LinkDetails, MediaType};
pub use loader::{Harvest, Loader};
pub use persist::{
    save_all, save_content, save_content_with_metadata, save_text, save_text_with_metadata,
    SaveMode, SaveOptions,
};
pub use sources::{build_loader, LoaderOptions, Source};
pub use text::extract_text;
pub use uri::resolve_url;
