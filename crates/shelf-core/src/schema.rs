//! Declarative collection schemas and the validation gate.

use std::{
    collections::BTreeMap,
    fmt,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_yaml::Value;
use thiserror::Error;

use crate::{
    date::ContentDate,
    error::{CoreError, Result},
    frontmatter::Frontmatter,
};

/// Type of a front-matter field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// A string scalar.
    String,
    /// A date or date-time, see [`ContentDate`].
    ///
    /// YAML front-matter reads unquoted dates as strings, so quoted and
    /// unquoted values are both accepted when they parse as a date.
    Date,
    /// An ordered sequence of strings.
    StringList,
}

impl FieldType {
    /// Human-readable type name used in issue messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Date => "date",
            Self::StringList => "array of strings",
        }
    }

    /// Check a value against this type, returning what was found on mismatch.
    fn check(self, value: &Value) -> std::result::Result<(), Mismatch> {
        match (self, value) {
            (Self::String, Value::String(_)) => Ok(()),
            (Self::Date, Value::String(s)) if ContentDate::parse(s).is_some() => Ok(()),
            (Self::StringList, Value::Sequence(items)) => {
                match items.iter().position(|item| !matches!(item, Value::String(_))) {
                    None => Ok(()),
                    Some(index) => Err(Mismatch {
                        index: Some(index),
                        found: describe_value(&items[index]),
                    }),
                }
            }
            _ => Err(Mismatch {
                index: None,
                found: describe_value(value),
            }),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

struct Mismatch {
    index: Option<usize>,
    found: String,
}

fn describe_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {b}"),
        Value::Number(n) => format!("number {n}"),
        Value::String(s) => format!("string \"{s}\""),
        Value::Sequence(_) => "array".to_string(),
        Value::Mapping(_) => "mapping".to_string(),
        Value::Tagged(tagged) => format!("tagged value {}", tagged.tag),
    }
}

/// What to do with front-matter fields a schema does not declare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownFieldPolicy {
    /// Drop undeclared fields from the validated record.
    #[default]
    Ignore,
    /// Reject the document.
    Reject,
}

/// One declared field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub ty: FieldType,
    pub required: bool,
}

/// The field schema of one named collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSchema {
    name: String,
    fields: Vec<FieldSpec>,
}

impl CollectionSchema {
    /// Start an empty schema for a collection.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Declare a required field.
    #[must_use]
    pub fn required(self, name: impl Into<String>, ty: FieldType) -> Self {
        self.field(name, ty, true)
    }

    /// Declare an optional field.
    #[must_use]
    pub fn optional(self, name: impl Into<String>, ty: FieldType) -> Self {
        self.field(name, ty, false)
    }

    fn field(mut self, name: impl Into<String>, ty: FieldType, required: bool) -> Self {
        let name = name.into();
        self.fields.retain(|f| f.name != name);
        self.fields.push(FieldSpec { name, ty, required });
        self
    }

    /// Collection name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared fields in declaration order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Look up a declared field.
    pub fn field_spec(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Validate front-matter against this schema.
    ///
    /// Every issue is collected; the error lists all of them.
    pub fn validate(
        &self,
        frontmatter: Frontmatter,
        path: &Path,
        policy: UnknownFieldPolicy,
    ) -> std::result::Result<ValidatedFrontmatter, SchemaError> {
        let mut issues = Vec::new();

        for spec in &self.fields {
            match frontmatter.get(&spec.name) {
                None if spec.required => issues.push(FieldIssue::new(
                    &spec.name,
                    IssueKind::Missing { expected: spec.ty },
                )),
                None => {}
                Some(value) => {
                    if let Err(mismatch) = spec.ty.check(value) {
                        let field = match mismatch.index {
                            Some(i) => format!("{}[{i}]", spec.name),
                            None => spec.name.clone(),
                        };
                        let expected = match mismatch.index {
                            Some(_) => FieldType::String,
                            None => spec.ty,
                        };
                        issues.push(FieldIssue::new(
                            field,
                            IssueKind::Mismatch {
                                expected,
                                found: mismatch.found,
                            },
                        ));
                    }
                }
            }
        }

        let mut fields = frontmatter.into_fields();
        let undeclared: Vec<String> = fields
            .keys()
            .filter(|k| self.field_spec(k).is_none())
            .cloned()
            .collect();

        if policy == UnknownFieldPolicy::Reject {
            issues.extend(
                undeclared
                    .iter()
                    .map(|name| FieldIssue::new(name, IssueKind::Undeclared)),
            );
        }

        if !issues.is_empty() {
            return Err(SchemaError::new(&self.name, path, issues));
        }

        for name in &undeclared {
            fields.remove(name);
        }

        Ok(ValidatedFrontmatter {
            collection: self.name.clone(),
            path: path.to_path_buf(),
            fields,
            ignored: undeclared,
        })
    }
}

/// Front-matter that passed its collection schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedFrontmatter {
    collection: String,
    path: PathBuf,
    fields: BTreeMap<String, Value>,
    ignored: Vec<String>,
}

impl ValidatedFrontmatter {
    /// Collection the front-matter was validated against.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Source path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Declared fields that were present.
    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    /// Undeclared fields dropped under [`UnknownFieldPolicy::Ignore`].
    pub fn ignored(&self) -> &[String] {
        &self.ignored
    }

    /// Decode into a typed record.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        let mapping = self
            .fields
            .iter()
            .map(|(k, v)| (Value::String(k.clone()), v.clone()))
            .collect();

        serde_yaml::from_value(Value::Mapping(mapping))
            .map_err(|e| CoreError::decode(&self.path, e.to_string()))
    }
}

/// Kind of a single schema violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    /// A required field is absent.
    Missing { expected: FieldType },
    /// A field is present with the wrong type.
    Mismatch { expected: FieldType, found: String },
    /// A field the schema does not declare.
    Undeclared,
}

/// A schema violation on one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    /// Field name, with an index suffix for sequence elements (`tags[1]`).
    pub field: String,
    pub kind: IssueKind,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, kind: IssueKind) -> Self {
        Self {
            field: field.into(),
            kind,
        }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            IssueKind::Missing { expected } => {
                write!(f, "`{}`: required {expected} field is missing", self.field)
            }
            IssueKind::Mismatch { expected, found } => {
                write!(f, "`{}`: expected {expected}, found {found}", self.field)
            }
            IssueKind::Undeclared => write!(f, "`{}`: field is not declared", self.field),
        }
    }
}

/// A document rejected by its collection schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{collection} entry {path} is invalid: {}", join_issues(.issues))]
pub struct SchemaError {
    pub collection: String,
    pub path: PathBuf,
    pub issues: Vec<FieldIssue>,
}

impl SchemaError {
    pub fn new(
        collection: impl Into<String>,
        path: impl Into<PathBuf>,
        issues: Vec<FieldIssue>,
    ) -> Self {
        Self {
            collection: collection.into(),
            path: path.into(),
            issues,
        }
    }

    /// Whether any issue concerns the given field (index suffixes included).
    pub fn has_issue_for(&self, field: &str) -> bool {
        self.issues.iter().any(|issue| {
            issue.field == field
                || issue
                    .field
                    .strip_prefix(field)
                    .is_some_and(|rest| rest.starts_with('['))
        })
    }
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fm(yaml: &str) -> Frontmatter {
        Frontmatter::from_yaml_str(yaml, Path::new("test.md")).expect("yaml")
    }

    fn schema() -> CollectionSchema {
        CollectionSchema::new("posts")
            .required("title", FieldType::String)
            .required("date", FieldType::Date)
            .optional("tags", FieldType::StringList)
    }

    #[test]
    fn test_valid_document() {
        let validated = schema()
            .validate(
                fm("title: Hello\ndate: 2024-01-01\ntags: [a, b]"),
                Path::new("test.md"),
                UnknownFieldPolicy::Ignore,
            )
            .expect("valid");
        assert_eq!(validated.collection(), "posts");
        assert_eq!(validated.fields().len(), 3);
        assert!(validated.ignored().is_empty());
    }

    #[test]
    fn test_missing_required_field() {
        let err = schema()
            .validate(fm("title: Hello"), Path::new("test.md"), UnknownFieldPolicy::Ignore)
            .expect_err("missing date");
        assert_eq!(err.issues.len(), 1);
        assert_eq!(
            err.issues[0],
            FieldIssue::new("date", IssueKind::Missing { expected: FieldType::Date })
        );
    }

    #[test]
    fn test_reports_every_issue() {
        let err = schema()
            .validate(fm("tags: [1]"), Path::new("test.md"), UnknownFieldPolicy::Ignore)
            .expect_err("invalid");
        assert_eq!(err.issues.len(), 3);
        assert!(err.has_issue_for("title"));
        assert!(err.has_issue_for("date"));
        assert!(err.has_issue_for("tags"));
        assert_eq!(err.issues[2].field, "tags[0]");
    }

    #[test]
    fn test_yaml_timestamp_dates() {
        for date in ["2024-01-14 10:30:00", "2001-12-14 21:59:43.10 -5", "\"2024-01-01\""] {
            schema()
                .validate(
                    fm(&format!("title: Hello\ndate: {date}")),
                    Path::new("test.md"),
                    UnknownFieldPolicy::Ignore,
                )
                .expect("timestamp accepted");
        }
    }

    #[test]
    fn test_numeric_key_follows_policy() {
        let source = "title: Hello\ndate: 2024-01-01\n2024: extra";
        let validated = schema()
            .validate(fm(source), Path::new("test.md"), UnknownFieldPolicy::Ignore)
            .expect("ignored");
        assert_eq!(validated.ignored(), ["2024".to_string()]);

        let err = schema()
            .validate(fm(source), Path::new("test.md"), UnknownFieldPolicy::Reject)
            .expect_err("rejected");
        assert_eq!(err.issues, vec![FieldIssue::new("2024", IssueKind::Undeclared)]);
    }

    #[test]
    fn test_date_type_mismatch() {
        let err = schema()
            .validate(
                fm("title: Hello\ndate: not-a-date"),
                Path::new("test.md"),
                UnknownFieldPolicy::Ignore,
            )
            .expect_err("bad date");
        assert!(err.has_issue_for("date"));
        let msg = err.to_string();
        assert!(msg.contains("posts"));
        assert!(msg.contains("test.md"));
        assert!(msg.contains("expected date, found string \"not-a-date\""));
    }

    #[test]
    fn test_string_does_not_accept_number() {
        let err = schema()
            .validate(
                fm("title: 42\ndate: 2024-01-01"),
                Path::new("test.md"),
                UnknownFieldPolicy::Ignore,
            )
            .expect_err("number title");
        assert!(err.to_string().contains("found number 42"));
    }

    #[test]
    fn test_optional_null_is_mismatch() {
        let err = schema()
            .validate(
                fm("title: Hello\ndate: 2024-01-01\ntags:"),
                Path::new("test.md"),
                UnknownFieldPolicy::Ignore,
            )
            .expect_err("null tags");
        assert!(err.to_string().contains("found null"));
    }

    #[test]
    fn test_unknown_field_ignored() {
        let validated = schema()
            .validate(
                fm("title: Hello\ndate: 2024-01-01\ndraft: true"),
                Path::new("test.md"),
                UnknownFieldPolicy::Ignore,
            )
            .expect("ignored");
        assert_eq!(validated.ignored(), ["draft".to_string()]);
        assert!(!validated.fields().contains_key("draft"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = schema()
            .validate(
                fm("title: Hello\ndate: 2024-01-01\ndraft: true"),
                Path::new("test.md"),
                UnknownFieldPolicy::Reject,
            )
            .expect_err("rejected");
        assert_eq!(err.issues, vec![FieldIssue::new("draft", IssueKind::Undeclared)]);
    }

    #[test]
    fn test_redeclaring_field_replaces_it() {
        let schema = CollectionSchema::new("x")
            .optional("title", FieldType::String)
            .required("title", FieldType::String);
        assert_eq!(schema.fields().len(), 1);
        assert!(schema.fields()[0].required);
    }

    #[test]
    fn test_has_issue_for_does_not_match_prefix() {
        let err = SchemaError::new(
            "posts",
            "test.md",
            vec![FieldIssue::new("tagsExtra", IssueKind::Undeclared)],
        );
        assert!(!err.has_issue_for("tags"));
    }
}
