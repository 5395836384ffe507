//! Shelf Core Library
//!
//! Collection schemas, front-matter parsing, site configuration and the
//! asset declarations shared by the shelf loader, parser and CLI.

pub mod assets;
pub mod collections;
pub mod config;
pub mod content;
pub mod date;
pub mod error;
pub mod frontmatter;
pub mod schema;

pub use assets::{FetchPriority, ImageFormat, ImageModule, ImgAttributes, ModuleDeclarations};
pub use collections::{CollectionRecord, CollectionRegistry, NoteRecord, PostRecord, ReadRecord};
pub use config::Config;
pub use content::{ContentType, entry_id};
pub use date::ContentDate;
pub use error::{CoreError, Result};
pub use frontmatter::Frontmatter;
pub use schema::{
    CollectionSchema, FieldIssue, FieldSpec, FieldType, IssueKind, SchemaError,
    UnknownFieldPolicy, ValidatedFrontmatter,
};
