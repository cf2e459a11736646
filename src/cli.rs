use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use rum::config;
use rum::render::{self, OutputFormat};
use rum::{Field, ProjectContext, Rum, logging};
use tracing::info;

const STARTER_CONFIG: &str = "rum.yml";

const STARTER_TEMPLATE: &str = r#"# Project context for rum. Any key can be overridden with RUM_<KEY>,
# e.g. RUM_ENVIRONMENT=staging.
workspace: ~/Sites
project_domain: example.local
project_dir: ~/Sites/example
project_name: example
host_name: localhost
os: linux
environment: dev
# Defaults to the moment rum runs when left out.
# time: "2024-01-01T00:00:00Z"
core_version: ""
document_root: ~/Sites/example/web
"#;

/// Root CLI for rum
#[derive(Parser)]
#[command(name = "rum")]
#[command(about = "Project and environment context for local web development")]
#[command(version)]
pub struct Cli {
    /// Read context from this file instead of rum.yml/rum.yaml/rum.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Override the core version after loading
    #[arg(long, global = true)]
    pub core_version: Option<String>,
    /// Override the document root after loading
    #[arg(long, global = true)]
    pub document_root: Option<PathBuf>,
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print every context field
    Show {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Print a single context field
    Get {
        /// Field name (e.g. project-domain, document-root)
        #[arg(value_enum)]
        field: Field,
    },
    /// Write a starter rum.yml in the current directory
    Init {
        /// Overwrite an existing rum.yml
        #[arg(long)]
        force: bool,
    },
}

/// Dispatch after parse
pub fn run() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match &cli.command {
        Commands::Show { format } => {
            if let Err(e) = show(&cli, *format) {
                eprintln!("error (show): {e:#}");
                std::process::exit(1);
            }
        }
        Commands::Get { field } => {
            if let Err(e) = get(&cli, *field) {
                eprintln!("error (get): {e:#}");
                std::process::exit(1);
            }
        }
        Commands::Init { force } => {
            if let Err(e) = init(Path::new(STARTER_CONFIG), *force) {
                eprintln!("error (init): {e:#}");
                std::process::exit(1);
            }
        }
    }
}

fn load_context(cli: &Cli) -> Result<Rum> {
    let mut rum = config::resolve_context(cli.config.as_deref())?;
    if let Some(version) = &cli.core_version {
        rum.set_core_version(version.clone());
    }
    if let Some(root) = &cli.document_root {
        rum.set_document_root(root.clone());
    }
    Ok(rum)
}

fn show(cli: &Cli, format: OutputFormat) -> Result<()> {
    let rum = load_context(cli)?;
    let output = render::render(&rum, format)?;
    println!("{}", output.trim_end());
    Ok(())
}

fn get(cli: &Cli, field: Field) -> Result<()> {
    let rum = load_context(cli)?;
    println!("{}", field.read(&rum));
    Ok(())
}

fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists; pass --force to overwrite it",
            path.display()
        );
    }
    fs::write(path, STARTER_TEMPLATE)
        .with_context(|| format!("writing starter config to {}", path.display()))?;
    info!(path = %path.display(), "starter config written");
    println!("Created {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn starter_template_is_a_complete_context() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join(STARTER_CONFIG);
        fs::write(&path, STARTER_TEMPLATE).expect("write template");

        let loaded = config::load_context_config_from_file(&path).expect("template parses");
        let rum = loaded.data.into_context().expect("template is complete");
        assert_eq!(rum.project_domain(), "example.local");
        assert_eq!(rum.core_version(), "");
    }

    #[test]
    fn global_overrides_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "rum",
            "get",
            "core_version",
            "--core-version",
            "9.5.0",
            "-vv",
        ])
        .expect("valid args");
        assert_eq!(cli.core_version.as_deref(), Some("9.5.0"));
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Commands::Get {
                field: Field::CoreVersion
            }
        ));
    }
}
