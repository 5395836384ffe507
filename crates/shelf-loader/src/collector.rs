//! Content collection and validation.
//!
//! Walks one directory per registered collection, validates every content
//! file against its schema and yields the accepted entries. Any rejected file
//! fails the whole load.

use std::{
    collections::{BTreeMap, btree_map::Entry as MapEntry},
    fmt, fs, io,
    path::{Path, PathBuf},
};

use rayon::prelude::*;
use shelf_core::{
    CollectionRecord, CollectionRegistry, CollectionSchema, Config, CoreError, ContentType,
    ModuleDeclarations, NoteRecord, PostRecord, ReadRecord, ValidatedFrontmatter,
    collections::POSTS, entry_id, frontmatter::parse_frontmatter,
};
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Content collection errors.
#[derive(Debug, Error)]
pub enum CollectorError {
    /// IO error outside of an individual content file.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Directory traversal error.
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// One or more content files were rejected.
    #[error("{} content file(s) rejected", .0.len())]
    Rejected(Vec<LoadFailure>),
}

/// Result type for collector operations.
pub type Result<T> = std::result::Result<T, CollectorError>;

/// Why a single content file was rejected.
#[derive(Debug, Error)]
pub enum LoadFailure {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Front-matter was unreadable or failed its schema.
    #[error(transparent)]
    Invalid(#[from] CoreError),

    /// Two files in one collection map to the same entry id.
    #[error("{collection} entry id `{id}` is used by both {first} and {second}")]
    DuplicateId {
        collection: String,
        id: String,
        first: PathBuf,
        second: PathBuf,
    },
}

impl LoadFailure {
    /// Path of the offending file.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Read { path, .. } => Some(path),
            Self::Invalid(CoreError::Schema(e)) => Some(&e.path),
            Self::Invalid(CoreError::Frontmatter { path, .. } | CoreError::Decode { path, .. }) => {
                Some(path)
            }
            Self::Invalid(_) => None,
            Self::DuplicateId { second, .. } => Some(second),
        }
    }
}

/// A non-fatal observation made while loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadWarning {
    pub path: PathBuf,
    pub message: String,
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

/// A validated entry whose front-matter has not been decoded yet.
#[derive(Debug, Clone)]
pub struct RawEntry {
    pub id: String,
    pub collection: String,
    pub path: PathBuf,
    pub data: ValidatedFrontmatter,
    /// Content body without front-matter.
    pub body: String,
}

/// A decoded entry of one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry<T> {
    pub id: String,
    pub path: PathBuf,
    pub data: T,
    pub body: String,
}

/// Everything loaded from the content directory.
#[derive(Debug, Default)]
pub struct SiteContent {
    /// Entries per collection, sorted by id.
    pub collections: BTreeMap<String, Vec<RawEntry>>,

    pub warnings: Vec<LoadWarning>,
}

impl SiteContent {
    /// Raw entries of a collection, empty for unknown names.
    pub fn raw(&self, collection: &str) -> &[RawEntry] {
        self.collections
            .get(collection)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Decode every entry of `T`'s collection.
    pub fn entries<T: CollectionRecord>(&self) -> shelf_core::Result<Vec<Entry<T>>> {
        self.raw(T::COLLECTION)
            .iter()
            .map(|raw| -> shelf_core::Result<Entry<T>> {
                Ok(Entry {
                    id: raw.id.clone(),
                    path: raw.path.clone(),
                    data: raw.data.decode()?,
                    body: raw.body.clone(),
                })
            })
            .collect()
    }

    pub fn reads(&self) -> shelf_core::Result<Vec<Entry<ReadRecord>>> {
        self.entries()
    }

    pub fn posts(&self) -> shelf_core::Result<Vec<Entry<PostRecord>>> {
        self.entries()
    }

    pub fn notes(&self) -> shelf_core::Result<Vec<Entry<NoteRecord>>> {
        self.entries()
    }

    /// Total number of entries across all collections.
    pub fn len(&self) -> usize {
        self.collections.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Content collector that walks collection directories and validates files.
#[derive(Debug)]
pub struct ContentCollector {
    config: Config,
    registry: CollectionRegistry,
    declarations: ModuleDeclarations,
    content_dir: PathBuf,
}

impl ContentCollector {
    /// Create a collector over `config.site.content_dir` with the built-in
    /// collections.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let content_dir = config.site.content_dir.clone();
        Self {
            config,
            registry: CollectionRegistry::default(),
            declarations: ModuleDeclarations::default(),
            content_dir,
        }
    }

    /// Use a different content directory.
    #[must_use]
    pub fn with_content_dir(mut self, content_dir: impl Into<PathBuf>) -> Self {
        self.content_dir = content_dir.into();
        self
    }

    /// Use a different collection registry.
    #[must_use]
    pub fn with_registry(mut self, registry: CollectionRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn content_dir(&self) -> &Path {
        &self.content_dir
    }

    pub fn registry(&self) -> &CollectionRegistry {
        &self.registry
    }

    /// Collect and validate all content.
    ///
    /// Returns [`CollectorError::Rejected`] with every failure if any file is
    /// rejected.
    pub fn collect(&self) -> Result<SiteContent> {
        info!(dir = %self.content_dir.display(), "collecting content");

        let mut content = SiteContent::default();
        for name in self.registry.names() {
            content.collections.insert(name.to_string(), Vec::new());
        }

        if !self.content_dir.is_dir() {
            warn!(dir = %self.content_dir.display(), "content directory does not exist");
            content.warnings.push(LoadWarning {
                path: self.content_dir.clone(),
                message: "content directory does not exist".to_string(),
            });
            return Ok(content);
        }

        content.warnings.extend(self.check_unmatched_entries()?);

        let files = self.find_content_files()?;
        info!(count = files.len(), "found content files");

        let results: Vec<_> = files
            .par_iter()
            .map(|(schema, path)| self.load_file(schema, path))
            .collect();

        let mut failures = Vec::new();
        let mut by_id: BTreeMap<(String, String), RawEntry> = BTreeMap::new();

        for result in results {
            match result {
                Ok(entry) => match by_id.entry((entry.collection.clone(), entry.id.clone())) {
                    MapEntry::Vacant(slot) => {
                        slot.insert(entry);
                    }
                    MapEntry::Occupied(existing) => failures.push(LoadFailure::DuplicateId {
                        collection: entry.collection,
                        id: entry.id,
                        first: existing.get().path.clone(),
                        second: entry.path,
                    }),
                },
                Err(failure) => failures.push(failure),
            }
        }

        if !failures.is_empty() {
            for failure in &failures {
                warn!(error = %failure, "content file rejected");
            }
            return Err(CollectorError::Rejected(failures));
        }

        for ((collection, _), entry) in by_id {
            for field in entry.data.ignored() {
                content.warnings.push(LoadWarning {
                    path: entry.path.clone(),
                    message: format!("ignoring undeclared {collection} field `{field}`"),
                });
            }
            content.warnings.extend(self.check_cover_image(&entry));
            content
                .collections
                .entry(collection)
                .or_default()
                .push(entry);
        }

        info!(
            entries = content.len(),
            warnings = content.warnings.len(),
            "content collection complete"
        );

        Ok(content)
    }

    /// Load and validate a single file.
    fn load_file(
        &self,
        schema: &CollectionSchema,
        path: &Path,
    ) -> std::result::Result<RawEntry, LoadFailure> {
        let collection_dir = self.content_dir.join(schema.name());
        let id = entry_id(&collection_dir, path).ok_or_else(|| {
            LoadFailure::Invalid(CoreError::frontmatter(
                path,
                "path does not map to an entry id",
            ))
        })?;

        let source = fs::read_to_string(path).map_err(|source| LoadFailure::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let (frontmatter, body) = parse_frontmatter(&source, path)?;
        let policy = self.config.content.policy_for(schema.name());
        let data = schema
            .validate(frontmatter, path, policy)
            .map_err(CoreError::from)?;

        debug!(collection = schema.name(), id = %id, "validated entry");

        Ok(RawEntry {
            id,
            collection: schema.name().to_string(),
            path: path.to_path_buf(),
            data,
            body,
        })
    }

    /// Warn when a post's `coverImage` is not a declared image module, or is a
    /// relative path with no file behind it.
    fn check_cover_image(&self, entry: &RawEntry) -> Option<LoadWarning> {
        if entry.collection != POSTS {
            return None;
        }
        let cover = entry.data.fields().get("coverImage")?.as_str()?;

        let message = if !self.declarations.is_image(cover) {
            format!("coverImage '{cover}' is not a png, svg or jpeg module")
        } else if (cover.starts_with("./") || cover.starts_with("../"))
            && !entry
                .path
                .parent()
                .unwrap_or(Path::new(""))
                .join(cover)
                .exists()
        {
            format!("coverImage '{cover}' does not exist")
        } else {
            return None;
        };

        warn!(path = %entry.path.display(), cover, "cover image warning");
        Some(LoadWarning {
            path: entry.path.clone(),
            message,
        })
    }

    /// Find content files of every registered collection.
    fn find_content_files(&self) -> Result<Vec<(&CollectionSchema, PathBuf)>> {
        let mut files = Vec::new();

        for schema in self.registry.iter() {
            let dir = self.content_dir.join(schema.name());
            if !dir.is_dir() {
                debug!(collection = schema.name(), "collection directory missing, no entries");
                continue;
            }

            for entry in WalkDir::new(&dir)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| e.depth() == 0 || !is_hidden(e.path()))
            {
                let entry = entry?;
                if !entry.file_type().is_file() {
                    continue;
                }
                if ContentType::from_path(entry.path()).is_some() {
                    files.push((schema, entry.into_path()));
                } else {
                    debug!(path = %entry.path().display(), "skipping non-content file");
                }
            }
        }

        Ok(files)
    }

    /// Warn about top-level entries that belong to no collection.
    fn check_unmatched_entries(&self) -> Result<Vec<LoadWarning>> {
        let mut warnings = Vec::new();
        let mut entries: Vec<_> = fs::read_dir(&self.content_dir)?.collect::<io::Result<_>>()?;
        entries.sort_by_key(fs::DirEntry::file_name);

        for entry in entries {
            let path = entry.path();
            if is_hidden(&path) {
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            if path.is_dir() && !self.registry.contains(&name) {
                warnings.push(LoadWarning {
                    path,
                    message: format!("directory `{name}` does not match any collection"),
                });
            } else if path.is_file() && ContentType::from_path(&path).is_some() {
                warnings.push(LoadWarning {
                    path,
                    message: "content file outside any collection directory".to_string(),
                });
            }
        }

        Ok(warnings)
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|n| n.to_string_lossy().starts_with('.'))
}
