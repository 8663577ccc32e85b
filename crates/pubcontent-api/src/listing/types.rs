//! `PublishedContent` listing response types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::path::ListingPath;

/// An available listing root, as returned by `list_available_paths`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailablePath {
    /// Human-readable name (e.g. "Best Bets").
    #[serde(rename = "DisplayName")]
    pub display_name: String,
    /// Listing URL (e.g. `/PublishedContent/List?root=BestBets&fmt=json`).
    #[serde(rename = "Url")]
    pub url: String,
    /// `root` query parameter extracted from `url`.
    #[serde(rename = "Root")]
    pub root: Option<String>,
    /// Any other fields sent by the server, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Contents of one directory under a listing root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DirectoryListing {
    /// Sub-directory names, in server order.
    #[serde(rename = "Directories")]
    pub directories: Vec<String>,
    /// Files, in server order.
    #[serde(rename = "Files")]
    pub files: Vec<FileEntry>,
}

/// A published file in a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Absolute web path on the listing host.
    #[serde(rename = "FullWebPath")]
    pub full_web_path: String,
    /// File name.
    #[serde(rename = "FileName")]
    pub file_name: String,
    /// Canonical segments of the directory the file was listed under.
    #[serde(rename = "Path", default)]
    pub path: Vec<String>,
    /// Creation time (ISO-8601 with offset).
    #[serde(rename = "CreationTime")]
    pub creation_time: String,
    /// Last write time (ISO-8601 with offset).
    #[serde(rename = "LastWriteTime")]
    pub last_write_time: String,
}

/// Raw entry of the root list (`/PublishedContent/List?fmt=json`).
#[derive(Debug, Deserialize)]
pub struct RawAvailablePath {
    #[serde(rename = "DisplayName")]
    pub display_name: String,
    #[serde(rename = "Url")]
    pub url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Raw directory listing; both arrays may be absent or `null`.
#[derive(Debug, Default, Deserialize)]
pub struct RawListing {
    #[serde(rename = "Directories", default)]
    pub directories: Option<Vec<String>>,
    #[serde(rename = "Files", default)]
    pub files: Option<Vec<RawFileEntry>>,
}

/// Raw file entry; any server-side `Path` is ignored and `null` fields
/// become empty strings.
#[derive(Debug, Deserialize)]
pub struct RawFileEntry {
    #[serde(rename = "FullWebPath", default)]
    pub full_web_path: Option<String>,
    #[serde(rename = "FileName", default)]
    pub file_name: Option<String>,
    #[serde(rename = "CreationTime", default)]
    pub creation_time: Option<String>,
    #[serde(rename = "LastWriteTime", default)]
    pub last_write_time: Option<String>,
}

impl RawListing {
    /// Parses a listing body. An empty body or a JSON `null` is an empty
    /// listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is neither empty nor a listing object.
    pub fn from_body(body: &str) -> Result<Self, serde_json::Error> {
        if body.trim().is_empty() {
            return Ok(Self::default());
        }
        let raw: Option<Self> = serde_json::from_str(body)?;
        Ok(raw.unwrap_or_default())
    }

    /// Normalizes into a [`DirectoryListing`], stamping every file with `path`.
    pub fn into_listing(self, path: &ListingPath) -> DirectoryListing {
        let files = self
            .files
            .unwrap_or_default()
            .into_iter()
            .map(|f| FileEntry {
                full_web_path: f.full_web_path.unwrap_or_default(),
                file_name: f.file_name.unwrap_or_default(),
                path: path.segments().to_vec(),
                creation_time: f.creation_time.unwrap_or_default(),
                last_write_time: f.last_write_time.unwrap_or_default(),
            })
            .collect();

        DirectoryListing {
            directories: self.directories.unwrap_or_default(),
            files,
        }
    }
}
