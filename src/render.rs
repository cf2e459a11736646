use anyhow::{Context, Result};
use chrono::SecondsFormat;
use serde::Serialize;

use crate::context::ProjectContext;
use crate::field::Field;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Yaml,
    Toml,
}

/// Serializable view with the same keys `rum.yml` accepts, so rendered
/// YAML/TOML can be fed back in as config.
#[derive(Debug, Serialize)]
struct Snapshot {
    workspace: String,
    project_domain: String,
    project_dir: String,
    project_name: String,
    host_name: String,
    os: String,
    environment: String,
    time: String,
    core_version: String,
    document_root: String,
}

impl Snapshot {
    fn capture(ctx: &dyn ProjectContext) -> Self {
        Self {
            workspace: Field::Workspace.read(ctx),
            project_domain: Field::ProjectDomain.read(ctx),
            project_dir: Field::ProjectDir.read(ctx),
            project_name: Field::ProjectName.read(ctx),
            host_name: Field::HostName.read(ctx),
            os: Field::Os.read(ctx),
            environment: Field::Environment.read(ctx),
            // Full precision so the value survives being loaded back.
            time: ctx.time().to_rfc3339_opts(SecondsFormat::AutoSi, true),
            core_version: Field::CoreVersion.read(ctx),
            document_root: Field::DocumentRoot.read(ctx),
        }
    }
}

pub fn render(ctx: &dyn ProjectContext, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(ctx)),
        OutputFormat::Yaml => {
            serde_yaml::to_string(&Snapshot::capture(ctx)).context("serializing context as YAML")
        }
        OutputFormat::Toml => {
            toml::to_string(&Snapshot::capture(ctx)).context("serializing context as TOML")
        }
    }
}

/// One `name: value` line per field, values aligned in a single column.
pub fn render_text(ctx: &dyn ProjectContext) -> String {
    let width = Field::ALL
        .iter()
        .map(|field| field.name().len() + 1)
        .max()
        .unwrap_or_default();

    Field::ALL
        .iter()
        .map(|field| {
            let label = format!("{}:", field.name());
            format!("{label:<width$} {}", field.read(ctx))
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
