//! `ContentListingApi` trait definition.
#![allow(clippy::future_not_send)]

use super::error::ListingError;
use super::path::ListingPath;
use super::types::{AvailablePath, DirectoryListing, FileEntry};
use super::xml::XmlValue;

/// `PublishedContent` listing API trait.
///
/// Abstracts API operations for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(ContentListingApi: Send)]
pub trait LocalContentListingApi {
    /// Lists the roots available on the host, deriving each entry's `Root`.
    ///
    /// # Errors
    ///
    /// Returns [`ListingError::AvailablePaths`] if the request fails or the
    /// server answers with a non-2xx status.
    async fn list_available_paths(&self) -> Result<Vec<AvailablePath>, ListingError>;

    /// Lists directories and files at `path` under `root`.
    ///
    /// # Errors
    ///
    /// Returns [`ListingError::ItemsForPath`] if the request fails or the
    /// server answers with a non-2xx status.
    async fn get_items_for_path(
        &self,
        root: &str,
        path: &ListingPath,
    ) -> Result<DirectoryListing, ListingError>;

    /// Fetches a listed file and parses it as XML.
    ///
    /// # Errors
    ///
    /// Returns [`ListingError::PublishedFile`] if the request fails, or
    /// [`ListingError::Xml`] if the body is not well-formed XML.
    async fn get_published_file(&self, entry: &FileEntry) -> Result<XmlValue, ListingError>;
}
