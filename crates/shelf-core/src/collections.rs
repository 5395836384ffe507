//! The content schema registry: `reads`, `posts` and `notes`.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    date::ContentDate,
    schema::{CollectionSchema, FieldType},
};

/// Books and articles read.
pub const READS: &str = "reads";
/// Long-form posts.
pub const POSTS: &str = "posts";
/// Short notes.
pub const NOTES: &str = "notes";

/// A typed record belonging to one collection.
pub trait CollectionRecord: DeserializeOwned {
    /// Fixed collection key.
    const COLLECTION: &'static str;

    /// The field schema documents of this collection must satisfy.
    fn schema() -> CollectionSchema;
}

/// Front-matter of a `reads` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadRecord {
    pub id: String,
    pub title: String,
    pub author: String,
    pub published_date: ContentDate,
}

impl CollectionRecord for ReadRecord {
    const COLLECTION: &'static str = READS;

    fn schema() -> CollectionSchema {
        CollectionSchema::new(READS)
            .required("id", FieldType::String)
            .required("title", FieldType::String)
            .required("author", FieldType::String)
            .required("publishedDate", FieldType::Date)
    }
}

/// Front-matter of a `posts` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    pub title: String,
    pub date: ContentDate,
    #[serde(default)]
    pub description: Option<String>,
    /// Empty when the field is absent.
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
}

impl CollectionRecord for PostRecord {
    const COLLECTION: &'static str = POSTS;

    fn schema() -> CollectionSchema {
        CollectionSchema::new(POSTS)
            .required("title", FieldType::String)
            .required("date", FieldType::Date)
            .optional("description", FieldType::String)
            .optional("tags", FieldType::StringList)
            .optional("coverImage", FieldType::String)
    }
}

/// Front-matter of a `notes` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRecord {
    pub title: String,
    pub date: ContentDate,
    /// Empty when the field is absent.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl CollectionRecord for NoteRecord {
    const COLLECTION: &'static str = NOTES;

    fn schema() -> CollectionSchema {
        CollectionSchema::new(NOTES)
            .required("title", FieldType::String)
            .required("date", FieldType::Date)
            .optional("tags", FieldType::StringList)
    }
}

/// Mapping from collection name to schema, in registration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionRegistry {
    schemas: Vec<CollectionSchema>,
}

impl Default for CollectionRegistry {
    fn default() -> Self {
        Self {
            schemas: vec![ReadRecord::schema(), PostRecord::schema(), NoteRecord::schema()],
        }
    }
}

impl CollectionRegistry {
    /// A registry with no collections.
    pub fn empty() -> Self {
        Self {
            schemas: Vec::new(),
        }
    }

    /// Register a schema, replacing any schema with the same name.
    pub fn insert(&mut self, schema: CollectionSchema) {
        match self.schemas.iter_mut().find(|s| s.name() == schema.name()) {
            Some(existing) => *existing = schema,
            None => self.schemas.push(schema),
        }
    }

    /// Look up a collection schema by name.
    pub fn get(&self, name: &str) -> Option<&CollectionSchema> {
        self.schemas.iter().find(|s| s.name() == name)
    }

    /// Whether a collection is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Registered collection names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.iter().map(CollectionSchema::name)
    }

    /// Registered schemas.
    pub fn iter(&self) -> impl Iterator<Item = &CollectionSchema> {
        self.schemas.iter()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
