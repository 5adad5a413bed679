//! Internet Archive API module
//!
//! Search client, metadata resolution, and the response-to-track pipeline.

pub mod archive;
pub mod model;

pub use archive::{ArchiveClient, FetchError};
