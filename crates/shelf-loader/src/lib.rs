//! Shelf Loader Library
//!
//! Loads the `reads`, `posts` and `notes` collections from a content
//! directory, enforcing their schemas.
//!
//! # Modules
//!
//! - [`collector`] - Content discovery, validation and typed access

pub mod collector;

pub use collector::{
    CollectorError, ContentCollector, Entry, LoadFailure, LoadWarning, RawEntry, SiteContent,
};
