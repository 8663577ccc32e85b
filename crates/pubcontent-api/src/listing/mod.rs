//! `PublishedContent` listing API client module.
//!
//! Handles HTTP requests to the `/PublishedContent/List` endpoint family,
//! normalizes listing responses, and parses published XML files.

mod api;
mod client;
mod error;
mod path;
mod types;
mod util;
mod xml;

pub use api::{ContentListingApi, LocalContentListingApi};
pub use client::{ContentListingClient, ContentListingClientBuilder};
pub use error::{ErrorKind, ListingError};
pub use path::ListingPath;
pub use types::{AvailablePath, DirectoryListing, FileEntry};
pub use util::collect_files;
pub use xml::{XmlError, XmlValue, parse_xml};
