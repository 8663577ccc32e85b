//! Listing client error types.

use thiserror::Error;

use super::xml::XmlError;

/// Broad classification of a [`ListingError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input rejected before any request was made.
    Validation,
    /// Network failure or non-2xx response.
    Transport,
    /// A 2xx response whose body could not be decoded.
    Decode,
}

/// Errors returned by the listing client operations.
///
/// The `Display` output of each variant is the message callers of the
/// listing client have always matched on; use [`ListingError::kind`] to
/// branch on the failure class instead.
#[derive(Debug, Error)]
#[allow(clippy::module_name_repetitions)]
pub enum ListingError {
    /// `path` was neither a string nor a list of strings.
    #[error("Invalid type for path")]
    InvalidPathType,

    /// Fetching the list of available roots failed.
    #[error("Unable to fetch available paths.")]
    AvailablePaths,

    /// Fetching a directory listing failed.
    #[error("Unable to get items for path, {path}, under the root, {root}.")]
    ItemsForPath {
        /// Canonical path (e.g. `/foo/bar`).
        path: String,
        /// Listing root.
        root: String,
    },

    /// Fetching a published file failed.
    #[error("Unable to fetch published file, {full_web_path}.")]
    PublishedFile {
        /// Requested web path.
        full_web_path: String,
    },

    /// The published file was fetched but is not well-formed XML.
    #[error("Cannot process XML")]
    Xml(#[source] XmlError),

    /// A listing response was fetched but is not the expected JSON.
    #[error("Cannot process {operation} response")]
    Json {
        /// Operation whose response failed to decode.
        operation: &'static str,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },
}

impl ListingError {
    /// Returns the failure class of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidPathType => ErrorKind::Validation,
            Self::AvailablePaths | Self::ItemsForPath { .. } | Self::PublishedFile { .. } => {
                ErrorKind::Transport
            }
            Self::Xml(_) | Self::Json { .. } => ErrorKind::Decode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_items_for_path_message() {
        // Arrange
        let err = ListingError::ItemsForPath {
            path: String::from("/chicken"),
            root: String::from("Root"),
        };

        // Act & Assert
        assert_eq!(
            err.to_string(),
            "Unable to get items for path, /chicken, under the root, Root."
        );
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[test]
    fn test_published_file_message() {
        // Arrange
        let err = ListingError::PublishedFile {
            full_web_path: String::from("/PublishedContent/Test/Test.xml"),
        };

        // Act & Assert
        assert_eq!(
            err.to_string(),
            "Unable to fetch published file, /PublishedContent/Test/Test.xml."
        );
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[test]
    fn test_kinds() {
        // Arrange & Act & Assert
        assert_eq!(ListingError::InvalidPathType.kind(), ErrorKind::Validation);
        assert_eq!(ListingError::AvailablePaths.kind(), ErrorKind::Transport);
        assert_eq!(
            ListingError::Xml(XmlError::NoRootElement).kind(),
            ErrorKind::Decode
        );
        assert_eq!(
            ListingError::Xml(XmlError::NoRootElement).to_string(),
            "Cannot process XML"
        );
    }
}
