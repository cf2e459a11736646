use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{ContextError, Result};

/// Read access to the metadata describing a project and the machine it is
/// being worked on.
///
/// Only the core version and the document root can change after
/// construction; every other value is fixed by whoever built the context.
pub trait ProjectContext {
    /// Root of the development workspace that holds the project.
    fn workspace(&self) -> &Path;

    fn project_domain(&self) -> &str;

    fn project_dir(&self) -> &Path;

    fn project_name(&self) -> &str;

    fn host_name(&self) -> &str;

    fn os(&self) -> &str;

    /// Deployment label such as `dev`, `staging` or `prod`.
    fn environment(&self) -> &str;

    fn time(&self) -> DateTime<Utc>;

    fn core_version(&self) -> &str;

    fn set_core_version(&mut self, version: String);

    /// Web-server content root, usually bound late.
    fn document_root(&self) -> &Path;

    fn set_document_root(&mut self, document_root: PathBuf);
}

/// Plain-value context used by the `rum` binary and config loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rum {
    workspace: PathBuf,
    project_domain: String,
    project_dir: PathBuf,
    project_name: String,
    host_name: String,
    os: String,
    environment: String,
    time: DateTime<Utc>,
    core_version: String,
    document_root: PathBuf,
}

impl Rum {
    pub fn builder() -> RumBuilder {
        RumBuilder::default()
    }
}

impl ProjectContext for Rum {
    fn workspace(&self) -> &Path {
        &self.workspace
    }

    fn project_domain(&self) -> &str {
        &self.project_domain
    }

    fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    fn project_name(&self) -> &str {
        &self.project_name
    }

    fn host_name(&self) -> &str {
        &self.host_name
    }

    fn os(&self) -> &str {
        &self.os
    }

    fn environment(&self) -> &str {
        &self.environment
    }

    fn time(&self) -> DateTime<Utc> {
        self.time
    }

    fn core_version(&self) -> &str {
        &self.core_version
    }

    fn set_core_version(&mut self, version: String) {
        debug!(from = %self.core_version, to = %version, "core version updated");
        self.core_version = version;
    }

    fn document_root(&self) -> &Path {
        &self.document_root
    }

    fn set_document_root(&mut self, document_root: PathBuf) {
        debug!(
            from = %self.document_root.display(),
            to = %document_root.display(),
            "document root updated"
        );
        self.document_root = document_root;
    }
}

/// Collects context values and checks that the required ones are present.
#[derive(Debug, Clone, Default)]
pub struct RumBuilder {
    workspace: Option<PathBuf>,
    project_domain: Option<String>,
    project_dir: Option<PathBuf>,
    project_name: Option<String>,
    host_name: Option<String>,
    os: Option<String>,
    environment: Option<String>,
    time: Option<DateTime<Utc>>,
    core_version: Option<String>,
    document_root: Option<PathBuf>,
}

impl RumBuilder {
    pub fn workspace(mut self, workspace: impl Into<PathBuf>) -> Self {
        self.workspace = Some(workspace.into());
        self
    }

    pub fn project_domain(mut self, domain: impl Into<String>) -> Self {
        self.project_domain = Some(domain.into());
        self
    }

    pub fn project_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.project_dir = Some(dir.into());
        self
    }

    pub fn project_name(mut self, name: impl Into<String>) -> Self {
        self.project_name = Some(name.into());
        self
    }

    pub fn host_name(mut self, host_name: impl Into<String>) -> Self {
        self.host_name = Some(host_name.into());
        self
    }

    pub fn os(mut self, os: impl Into<String>) -> Self {
        self.os = Some(os.into());
        self
    }

    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    pub fn time(mut self, time: DateTime<Utc>) -> Self {
        self.time = Some(time);
        self
    }

    pub fn core_version(mut self, version: impl Into<String>) -> Self {
        self.core_version = Some(version.into());
        self
    }

    pub fn document_root(mut self, document_root: impl Into<PathBuf>) -> Self {
        self.document_root = Some(document_root.into());
        self
    }

    /// Builds the context, reporting every missing required field at once.
    pub fn build(self) -> Result<Rum> {
        let mut missing = Vec::new();
        if self.workspace.is_none() {
            missing.push("workspace");
        }
        if self.project_domain.is_none() {
            missing.push("project_domain");
        }
        if self.project_dir.is_none() {
            missing.push("project_dir");
        }
        if self.project_name.is_none() {
            missing.push("project_name");
        }
        if self.host_name.is_none() {
            missing.push("host_name");
        }
        if self.os.is_none() {
            missing.push("os");
        }
        if self.environment.is_none() {
            missing.push("environment");
        }

        let (
            Some(workspace),
            Some(project_domain),
            Some(project_dir),
            Some(project_name),
            Some(host_name),
            Some(os),
            Some(environment),
        ) = (
            self.workspace,
            self.project_domain,
            self.project_dir,
            self.project_name,
            self.host_name,
            self.os,
            self.environment,
        )
        else {
            return Err(ContextError::MissingFields(missing));
        };

        Ok(Rum {
            workspace,
            project_domain,
            project_dir,
            project_name,
            host_name,
            os,
            environment,
            time: self.time.unwrap_or_else(Utc::now),
            core_version: self.core_version.unwrap_or_default(),
            document_root: self.document_root.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 17, 9, 30, 0).unwrap()
    }

    fn sample() -> Rum {
        Rum::builder()
            .workspace("/home/dev/Sites")
            .project_domain("shop.local")
            .project_dir("/home/dev/Sites/shop")
            .project_name("shop")
            .host_name("devbox")
            .os("linux")
            .environment("dev")
            .time(fixed_time())
            .core_version("1.0.0")
            .document_root("/home/dev/Sites/shop/web")
            .build()
            .expect("complete builder")
    }

    type ReadOnlyView = (
        PathBuf,
        String,
        PathBuf,
        String,
        String,
        String,
        String,
        DateTime<Utc>,
    );

    fn read_only_view(ctx: &dyn ProjectContext) -> ReadOnlyView {
        (
            ctx.workspace().to_path_buf(),
            ctx.project_domain().to_string(),
            ctx.project_dir().to_path_buf(),
            ctx.project_name().to_string(),
            ctx.host_name().to_string(),
            ctx.os().to_string(),
            ctx.environment().to_string(),
            ctx.time(),
        )
    }

    #[test]
    fn getters_return_built_values() {
        let rum = sample();
        assert_eq!(rum.workspace(), Path::new("/home/dev/Sites"));
        assert_eq!(rum.project_domain(), "shop.local");
        assert_eq!(rum.project_dir(), Path::new("/home/dev/Sites/shop"));
        assert_eq!(rum.project_name(), "shop");
        assert_eq!(rum.host_name(), "devbox");
        assert_eq!(rum.os(), "linux");
        assert_eq!(rum.environment(), "dev");
        assert_eq!(rum.time(), fixed_time());
        assert_eq!(rum.core_version(), "1.0.0");
        assert_eq!(rum.document_root(), Path::new("/home/dev/Sites/shop/web"));
    }

    #[test]
    fn core_version_can_be_bumped() {
        let mut rum = sample();
        rum.set_core_version("1.1.0".to_string());
        assert_eq!(rum.core_version(), "1.1.0");
    }

    #[test]
    fn setters_work_through_trait_object() {
        let mut boxed: Box<dyn ProjectContext> = Box::new(sample());
        boxed.set_document_root(PathBuf::from("/srv/www"));
        boxed.set_core_version(String::new());
        assert_eq!(boxed.document_root(), Path::new("/srv/www"));
        assert_eq!(boxed.core_version(), "");
    }

    #[test]
    fn late_bound_fields_default_to_empty() {
        let rum = Rum::builder()
            .workspace("/ws")
            .project_domain("a.local")
            .project_dir("/ws/a")
            .project_name("a")
            .host_name("h")
            .os("macos")
            .environment("staging")
            .build()
            .expect("required fields present");
        assert_eq!(rum.core_version(), "");
        assert_eq!(rum.document_root(), Path::new(""));
    }

    #[test]
    fn build_without_time_uses_current_clock() {
        let before = Utc::now();
        let rum = Rum::builder()
            .workspace("/ws")
            .project_domain("a.local")
            .project_dir("/ws/a")
            .project_name("a")
            .host_name("h")
            .os("linux")
            .environment("dev")
            .build()
            .expect("required fields present");
        assert!(rum.time() >= before);
        assert!(rum.time() <= Utc::now());
    }

    #[test]
    fn build_reports_every_missing_field() {
        let err = Rum::builder()
            .project_name("shop")
            .os("linux")
            .build()
            .expect_err("incomplete builder");
        match err {
            ContextError::MissingFields(fields) => assert_eq!(
                fields,
                vec!["workspace", "project_domain", "project_dir", "host_name", "environment"]
            ),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_fields_message_lists_names() {
        let err = Rum::builder().build().expect_err("empty builder");
        assert_eq!(
            err.to_string(),
            "missing required context fields: workspace, project_domain, project_dir, \
             project_name, host_name, os, environment"
        );
    }

    proptest! {
        #[test]
        fn core_version_round_trips(version in ".*") {
            let mut rum = sample();
            let before = read_only_view(&rum);
            rum.set_core_version(version.clone());
            prop_assert_eq!(rum.core_version(), version.as_str());
            prop_assert_eq!(read_only_view(&rum), before);
            prop_assert_eq!(rum.document_root(), Path::new("/home/dev/Sites/shop/web"));
        }

        #[test]
        fn document_root_round_trips(root in "(/[a-zA-Z0-9_.-]{1,12}){0,6}") {
            let mut rum = sample();
            let before = read_only_view(&rum);
            rum.set_document_root(PathBuf::from(&root));
            prop_assert_eq!(rum.document_root(), Path::new(&root));
            prop_assert_eq!(read_only_view(&rum), before);
            prop_assert_eq!(rum.core_version(), "1.0.0");
        }
    }
}
