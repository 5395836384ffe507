//! New command - create a collection entry with its required fields

use std::{
    fs,
    path::{Component, Path},
};

use chrono::Utc;
use color_eyre::eyre::{Result, WrapErr, bail};
use shelf_core::{CollectionRegistry, CollectionSchema, FieldType};

/// Run the new command.
///
/// Creates `<content_dir>/<collection>/<name>.md` with front-matter covering
/// every required field of the collection's schema.
pub fn run(config_path: &Path, collection: &str, name: &Path, title: Option<&str>) -> Result<()> {
    tracing::info!(?config_path, collection, ?name, "Creating new entry");

    let config = crate::load_config(config_path)?;
    let registry = CollectionRegistry::default();
    let Some(schema) = registry.get(collection) else {
        bail!(
            "Unknown collection '{collection}' (expected one of: {})",
            registry.names().collect::<Vec<_>>().join(", ")
        );
    };

    if !name
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
    {
        bail!(
            "Entry name {} must stay inside the {collection} directory",
            name.display()
        );
    }

    let full_path = config.site.content_dir.join(collection).join(name);
    let file_path = if full_path.extension().is_some() {
        full_path
    } else {
        full_path.with_extension("md")
    };

    if file_path.exists() {
        bail!("Refusing to overwrite {}", file_path.display());
    }

    let slug = name
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("untitled");
    let title = title.map_or_else(|| slug.replace('-', " "), ToString::to_string);
    let content = generate_entry(schema, slug, &title);

    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent).wrap_err("Failed to create directories")?;
    }

    fs::write(&file_path, content).wrap_err("Failed to write file")?;

    tracing::info!(?file_path, "Created new entry");
    println!("Created: {}", file_path.display());

    Ok(())
}

/// Front-matter with a placeholder for each required field, plus empty
/// optional lists.
fn generate_entry(schema: &CollectionSchema, slug: &str, title: &str) -> String {
    let today = Utc::now().format("%Y-%m-%d").to_string();
    let mut frontmatter = String::from("---\n");

    for field in schema.fields() {
        let value = match (field.ty, field.required) {
            (FieldType::String, true) => match field.name.as_str() {
                "title" => yaml_quote(title),
                "id" => yaml_quote(slug),
                _ => yaml_quote(""),
            },
            (FieldType::Date, true) => today.clone(),
            (FieldType::StringList, _) => "[]".to_string(),
            (_, false) => continue,
        };
        frontmatter.push_str(&format!("{}: {value}\n", field.name));
    }

    frontmatter.push_str("---\n\nWrite your content here.\n");
    frontmatter
}

fn yaml_quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}
