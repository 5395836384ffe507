//! Frontmatter parsing for content files.
//!
//! Front-matter is read into an untyped field map first. Typing is the job of
//! the collection schema, so a wrong type surfaces as a schema issue that names
//! the field instead of as an opaque deserializer error.

use std::{collections::BTreeMap, path::Path};

use serde_yaml::Value;

use crate::error::{CoreError, Result};

/// Untyped front-matter fields, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter {
    fields: BTreeMap<String, Value>,
}

/// Delimiter types for frontmatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontmatterFormat {
    /// YAML frontmatter delimited by `---`.
    Yaml,
    /// TOML frontmatter delimited by `+++`.
    Toml,
}

impl FrontmatterFormat {
    /// Get the delimiter string for this format.
    pub fn delimiter(&self) -> &'static str {
        match self {
            Self::Yaml => "---",
            Self::Toml => "+++",
        }
    }
}

impl Frontmatter {
    /// Build front-matter from an existing field map.
    pub fn from_fields(fields: BTreeMap<String, Value>) -> Self {
        Self { fields }
    }

    /// Parse YAML front-matter text.
    pub fn from_yaml_str(source: &str, path: &Path) -> Result<Self> {
        let value: Value =
            serde_yaml::from_str(source).map_err(|e| CoreError::frontmatter(path, e.to_string()))?;

        match value {
            Value::Null => Ok(Self::default()),
            Value::Mapping(mapping) => {
                let mut fields = BTreeMap::new();
                for (key, value) in mapping {
                    let Some(key) = scalar_key(&key) else {
                        return Err(CoreError::frontmatter(
                            path,
                            format!("field names must be scalars, found {key:?}"),
                        ));
                    };
                    fields.insert(key, value);
                }
                Ok(Self { fields })
            }
            _ => Err(CoreError::frontmatter(
                path,
                "front-matter must be a mapping of field names to values",
            )),
        }
    }

    /// Parse TOML front-matter text.
    ///
    /// TOML dates and date-times are carried as their string form so that
    /// `date` fields validate the same way regardless of format.
    pub fn from_toml_str(source: &str, path: &Path) -> Result<Self> {
        let table: toml::Table =
            toml::from_str(source).map_err(|e| CoreError::frontmatter(path, e.to_string()))?;

        let fields = table
            .into_iter()
            .map(|(key, value)| (key, toml_to_yaml(value)))
            .collect();

        Ok(Self { fields })
    }

    /// Look up a field.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Whether a field is present (including explicit nulls).
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Field names in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether there are no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Consume into the underlying field map.
    pub fn into_fields(self) -> BTreeMap<String, Value> {
        self.fields
    }
}

/// Field name for a mapping key. Numbers, booleans and null are named by their
/// plain text so the schema can decide whether they are allowed.
fn scalar_key(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some("null".to_string()),
        Value::Sequence(_) | Value::Mapping(_) | Value::Tagged(_) => None,
    }
}

fn toml_to_yaml(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => Value::Number(f.into()),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Sequence(items.into_iter().map(toml_to_yaml).collect()),
        toml::Value::Table(table) => Value::Mapping(
            table
                .into_iter()
                .map(|(k, v)| (Value::String(k), toml_to_yaml(v)))
                .collect(),
        ),
    }
}

/// Split content into frontmatter and body.
///
/// The closing delimiter must start a line.
pub fn split_frontmatter(content: &str) -> Option<(FrontmatterFormat, &str, &str)> {
    let content = content.trim_start();

    let format = if content.starts_with("---") {
        FrontmatterFormat::Yaml
    } else if content.starts_with("+++") {
        FrontmatterFormat::Toml
    } else {
        return None;
    };

    let delimiter = format.delimiter();
    let after_first = &content[delimiter.len()..];

    let closing_pos = if after_first.trim_start_matches([' ', '\t', '\r', '\n']).is_empty() {
        return None;
    } else if after_first.starts_with('\n') && after_first[1..].starts_with(delimiter) {
        // empty block: "---\n---"
        0
    } else {
        after_first.find(&format!("\n{delimiter}"))?
    };

    let frontmatter = after_first[..closing_pos].trim();
    let rest = &after_first[closing_pos..];
    let rest = rest.strip_prefix('\n').unwrap_or(rest);
    let body = rest[delimiter.len()..].trim_start();

    Some((format, frontmatter, body))
}

/// Parse frontmatter and body from a content file.
///
/// A file without front-matter yields an empty field map and the full body.
pub fn parse_frontmatter(content: &str, path: &Path) -> Result<(Frontmatter, String)> {
    let Some((format, fm_str, body)) = split_frontmatter(content) else {
        return Ok((Frontmatter::default(), content.to_string()));
    };

    let frontmatter = match format {
        FrontmatterFormat::Yaml => Frontmatter::from_yaml_str(fm_str, path)?,
        FrontmatterFormat::Toml => Frontmatter::from_toml_str(fm_str, path)?,
    };

    Ok((frontmatter, body.to_string()))
}
