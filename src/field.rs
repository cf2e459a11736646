use std::fmt;
use std::str::FromStr;

use chrono::SecondsFormat;

use crate::context::ProjectContext;
use crate::error::ContextError;

/// Names one accessor of [`ProjectContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Field {
    Workspace,
    #[value(alias = "project_domain")]
    ProjectDomain,
    #[value(alias = "project_dir")]
    ProjectDir,
    #[value(alias = "project_name")]
    ProjectName,
    #[value(alias = "host_name")]
    HostName,
    Os,
    Environment,
    Time,
    #[value(alias = "core_version")]
    CoreVersion,
    #[value(alias = "document_root")]
    DocumentRoot,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::Workspace,
        Field::ProjectDomain,
        Field::ProjectDir,
        Field::ProjectName,
        Field::HostName,
        Field::Os,
        Field::Environment,
        Field::Time,
        Field::CoreVersion,
        Field::DocumentRoot,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::Workspace => "workspace",
            Field::ProjectDomain => "project-domain",
            Field::ProjectDir => "project-dir",
            Field::ProjectName => "project-name",
            Field::HostName => "host-name",
            Field::Os => "os",
            Field::Environment => "environment",
            Field::Time => "time",
            Field::CoreVersion => "core-version",
            Field::DocumentRoot => "document-root",
        }
    }

    /// Whether the contract exposes a setter for this field.
    pub fn is_mutable(self) -> bool {
        matches!(self, Field::CoreVersion | Field::DocumentRoot)
    }

    /// Renders the field's current value as display text.
    pub fn read(self, ctx: &dyn ProjectContext) -> String {
        match self {
            Field::Workspace => ctx.workspace().display().to_string(),
            Field::ProjectDomain => ctx.project_domain().to_string(),
            Field::ProjectDir => ctx.project_dir().display().to_string(),
            Field::ProjectName => ctx.project_name().to_string(),
            Field::HostName => ctx.host_name().to_string(),
            Field::Os => ctx.os().to_string(),
            Field::Environment => ctx.environment().to_string(),
            Field::Time => ctx.time().to_rfc3339_opts(SecondsFormat::Secs, true),
            Field::CoreVersion => ctx.core_version().to_string(),
            Field::DocumentRoot => ctx.document_root().display().to_string(),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = ContextError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase().replace('_', "-");
        Field::ALL
            .into_iter()
            .find(|field| field.name() == normalized)
            .ok_or_else(|| ContextError::UnknownField(raw.to_string()))
    }
}
