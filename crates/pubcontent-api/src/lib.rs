//! API client library for pubcontent.
//!
//! Provides a client for the `PublishedContent` listing endpoints.

/// `PublishedContent` listing API client.
pub mod listing;
