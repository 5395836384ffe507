//! Shelf CLI
//!
//! Validates, scaffolds and previews content for a shelf site.
//!
//! This is the binary entry point. The library functionality is in `lib.rs`.

use clap::Parser;
use color_eyre::eyre::Result;

/// Command-line interface for shelf.
#[derive(Parser)]
#[command(
    name = "shelf",
    version,
    about = "Content collections for a static site"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "shelf.toml")]
    config: std::path::PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(clap::Subcommand)]
enum Commands {
    /// Validate configuration and every collection entry
    Check {
        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },
    /// Create a new entry with the collection's required fields
    New {
        /// Collection to add to (reads, posts, notes)
        collection: String,
        /// Entry path inside the collection (e.g., 2024/my-post)
        name: std::path::PathBuf,
        /// Title for the new entry
        #[arg(short, long)]
        title: Option<String>,
    },
    /// Render a content file's body to HTML on stdout
    Render {
        /// Content file to render
        file: std::path::PathBuf,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    shelf::init_tracing(cli.verbose);

    match cli.command {
        Commands::Check { strict } => {
            shelf::cmd::check::run(&cli.config, strict)?;
        }
        Commands::New {
            collection,
            name,
            title,
        } => {
            shelf::cmd::new::run(&cli.config, &collection, &name, title.as_deref())?;
        }
        Commands::Render { file } => {
            shelf::cmd::render::run(&cli.config, &file)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn test_cli_check_command_parsing() {
        let args = ["shelf", "check", "--strict"];
        let cli = Cli::parse_from(args);

        assert_eq!(cli.config, std::path::PathBuf::from("shelf.toml"));
        match cli.command {
            Commands::Check { strict } => {
                assert!(strict);
            }
            _ => panic!("Expected Check command"),
        }
    }

    #[test]
    fn test_cli_new_command_parsing() {
        let args = ["shelf", "new", "posts", "2024/my-post", "--title", "My Post"];
        let cli = Cli::parse_from(args);

        match cli.command {
            Commands::New {
                collection,
                name,
                title,
            } => {
                assert_eq!(collection, "posts");
                assert_eq!(name, std::path::PathBuf::from("2024/my-post"));
                assert_eq!(title.as_deref(), Some("My Post"));
            }
            _ => panic!("Expected New command"),
        }
    }

    #[test]
    fn test_cli_render_command_parsing() {
        let args = ["shelf", "render", "content/posts/hello.md"];
        let cli = Cli::parse_from(args);

        match cli.command {
            Commands::Render { file } => {
                assert_eq!(file, std::path::PathBuf::from("content/posts/hello.md"));
            }
            _ => panic!("Expected Render command"),
        }
    }

    #[test]
    fn test_cli_verbosity_flags() {
        let args = ["shelf", "-vvv", "check"];
        let cli = Cli::parse_from(args);
        assert_eq!(cli.verbose, 3);
    }

    #[test]
    fn test_cli_custom_config_path() {
        let args = ["shelf", "--config", "site/shelf.toml", "check"];
        let cli = Cli::parse_from(args);
        assert_eq!(cli.config, std::path::PathBuf::from("site/shelf.toml"));
    }
}
