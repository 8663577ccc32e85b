//! Listing utility functions.

use tracing::instrument;

use super::api::LocalContentListingApi;
use super::error::ListingError;
use super::path::ListingPath;
use super::types::FileEntry;

/// Walks `root` depth-first from `start` and returns every file found.
///
/// Sub-directory names are treated as path segments relative to the
/// listing that returned them. Files come back in visit order: a
/// directory's own files first, then each sub-directory in server order.
///
/// # Errors
///
/// Returns the first error reported by `get_items_for_path`; the walk
/// stops there.
#[instrument(skip_all, fields(root = %root, start = %start))]
pub async fn collect_files(
    api: &(impl LocalContentListingApi + Sync),
    root: &str,
    start: &ListingPath,
) -> Result<Vec<FileEntry>, ListingError> {
    let mut files = Vec::new();
    let mut pending = vec![start.clone()];
    let mut visited: usize = 0;

    while let Some(path) = pending.pop() {
        let listing = api.get_items_for_path(root, &path).await?;
        visited = visited.saturating_add(1);

        tracing::info!(
            path = %path,
            files = listing.files.len(),
            directories = listing.directories.len(),
            "Directory listed"
        );

        files.extend(listing.files);
        // Reversed so the first directory is popped next.
        pending.extend(listing.directories.iter().rev().map(|dir| path.join(dir)));
    }

    tracing::debug!(visited, total = files.len(), "Walk completed");
    Ok(files)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;
    use crate::listing::types::DirectoryListing;
    use crate::listing::xml::XmlValue;

    /// In-memory listing keyed by canonical path.
    #[derive(Debug, Default)]
    struct FakeApi {
        listings: HashMap<String, DirectoryListing>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeApi {
        fn with(mut self, path: &str, dirs: &[&str], files: &[&str]) -> Self {
            let segments = ListingPath::from(path).segments().to_vec();
            let listing = DirectoryListing {
                directories: dirs.iter().map(|d| String::from(*d)).collect(),
                files: files
                    .iter()
                    .map(|name| FileEntry {
                        full_web_path: format!("/PublishedContent/Root{path}/{name}"),
                        file_name: String::from(*name),
                        path: segments.clone(),
                        creation_time: String::new(),
                        last_write_time: String::new(),
                    })
                    .collect(),
            };
            self.listings.insert(String::from(path), listing);
            self
        }
    }

    impl LocalContentListingApi for FakeApi {
        async fn list_available_paths(
            &self,
        ) -> Result<Vec<crate::listing::AvailablePath>, ListingError> {
            Ok(Vec::new())
        }

        async fn get_items_for_path(
            &self,
            root: &str,
            path: &ListingPath,
        ) -> Result<DirectoryListing, ListingError> {
            let key = path.to_query_value();
            self.calls.lock().unwrap().push(key.clone());
            self.listings
                .get(&key)
                .cloned()
                .ok_or_else(|| ListingError::ItemsForPath {
                    path: key,
                    root: String::from(root),
                })
        }

        async fn get_published_file(&self, _entry: &FileEntry) -> Result<XmlValue, ListingError> {
            Ok(XmlValue::Text(String::new()))
        }
    }

    #[tokio::test]
    async fn test_collect_files_depth_first() {
        // Arrange
        let api = FakeApi::default()
            .with("/", &["a", "b"], &["top.xml"])
            .with("/a", &["c"], &["a1.xml"])
            .with("/a/c", &[], &["c1.xml", "c2.xml"])
            .with("/b", &[], &["b1.xml"]);

        // Act
        let files = collect_files(&api, "Root", &ListingPath::root()).await.unwrap();

        // Assert
        let names: Vec<_> = files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, ["top.xml", "a1.xml", "c1.xml", "c2.xml", "b1.xml"]);
        assert_eq!(files[2].path, ["a", "c"]);
        assert_eq!(*api.calls.lock().unwrap(), ["/", "/a", "/a/c", "/b"]);
    }

    #[tokio::test]
    async fn test_collect_files_from_sub_path() {
        // Arrange
        let api = FakeApi::default().with("/a/c", &[], &["c1.xml"]);

        // Act
        let files = collect_files(&api, "Root", &ListingPath::from("a/c"))
            .await
            .unwrap();

        // Assert
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, ["a", "c"]);
    }

    #[tokio::test]
    async fn test_collect_files_stops_on_error() {
        // Arrange: "/b" is listed but missing
        let api = FakeApi::default().with("/", &["b"], &["top.xml"]);

        // Act
        let err = collect_files(&api, "Root", &ListingPath::root())
            .await
            .unwrap_err();

        // Assert
        assert_eq!(
            err.to_string(),
            "Unable to get items for path, /b, under the root, Root."
        );
    }
}
