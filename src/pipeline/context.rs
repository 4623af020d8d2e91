//! Per-invocation build settings shared by the target actions.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::{
    parse_interpolation, resolve_string, Configuration, KilnConfig, PackageConfig, Segment,
    ToolchainConfig, Variables,
};
use crate::error::{KilnError, Result};
use crate::shell::{execute_checked, is_ci, CommandOptions};
use crate::sys;

use super::templates::default_template;

/// Name of the NUnit results file written by the `test` target.
pub const TEST_RESULTS_FILE: &str = "TestResults.xml";

/// Build configuration used when neither the CLI nor the config sets one.
///
/// Local builds default to `Debug`, CI builds to `Release`.
pub fn default_configuration() -> Configuration {
    if is_ci() {
        Configuration::Release
    } else {
        Configuration::Debug
    }
}

/// Everything a target action needs to know about the build.
///
/// Paths are absolute, anchored at the project root. The solution file is
/// located on first use so targets that never need it still work in a
/// directory without one.
#[derive(Debug, Clone)]
pub struct BuildContext {
    root: PathBuf,
    configuration: Configuration,
    app_name: Option<String>,
    solution: Option<PathBuf>,
    source_dir: PathBuf,
    tests_dir: PathBuf,
    output_dir: PathBuf,
    toolchain: ToolchainConfig,
    package: PackageConfig,
    coverage_filters: Vec<String>,
    templates: BTreeMap<String, String>,
    dry_run: bool,
}

impl BuildContext {
    /// Create a context for `root` from loaded configuration.
    ///
    /// A relative `root` is made absolute against the current directory,
    /// since commands run with the root as their working directory.
    pub fn new(root: impl Into<PathBuf>, config: &KilnConfig) -> Self {
        let root = root.into();
        let root = std::path::absolute(&root).unwrap_or(root);
        let dirs = &config.directories;

        Self {
            configuration: config.configuration.unwrap_or_else(default_configuration),
            app_name: config.app_name.clone(),
            solution: config.solution.as_ref().map(|s| root.join(s)),
            source_dir: root.join(&dirs.source),
            tests_dir: root.join(&dirs.tests),
            output_dir: root.join(&dirs.output),
            toolchain: config.toolchain.clone(),
            package: config.package.clone(),
            coverage_filters: config.coverage.filters.clone(),
            templates: config.commands.clone(),
            dry_run: false,
            root,
        }
    }

    /// Override the build configuration.
    pub fn with_configuration(mut self, configuration: Configuration) -> Self {
        self.configuration = configuration;
        self
    }

    /// Log commands and file-system changes instead of performing them.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn configuration(&self) -> Configuration {
        self.configuration
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn tests_dir(&self) -> &Path {
        &self.tests_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn package(&self) -> &PackageConfig {
        &self.package
    }

    /// The application name.
    ///
    /// # Errors
    ///
    /// Returns `ConfigValidationError` when `app_name` is not configured.
    pub fn app_name(&self) -> Result<&str> {
        self.app_name
            .as_deref()
            .ok_or_else(|| KilnError::ConfigValidationError {
                message: "app_name must be set in .kiln/config.yml for this target".to_string(),
            })
    }

    /// Locate the solution file.
    ///
    /// A configured path must exist. Otherwise the root must contain exactly
    /// one `*.sln` file.
    pub fn solution(&self) -> Result<PathBuf> {
        if let Some(configured) = &self.solution {
            return if configured.is_file() {
                Ok(configured.clone())
            } else {
                Err(KilnError::SolutionNotFound {
                    root: self.root.clone(),
                    message: format!("configured solution {} does not exist", configured.display()),
                })
            };
        }

        let mut found = sys::files_with_extension(&self.root, "sln")?;
        match found.len() {
            1 => Ok(found.remove(0)),
            0 => Err(KilnError::SolutionNotFound {
                root: self.root.clone(),
                message: "no *.sln file found; set 'solution' in .kiln/config.yml".to_string(),
            }),
            n => Err(KilnError::SolutionNotFound {
                root: self.root.clone(),
                message: format!("{} *.sln files found; set 'solution' in .kiln/config.yml", n),
            }),
        }
    }

    /// The project published by `pack`.
    pub fn package_project(&self) -> Result<PathBuf> {
        match &self.package.project {
            Some(project) => Ok(self.root.join(project)),
            None => {
                let app = self.app_name()?;
                Ok(self.source_dir.join(app).join(format!("{}.csproj", app)))
            }
        }
    }

    /// NUnit logger argument for `dotnet test`.
    pub fn logger(&self) -> String {
        format!(
            "nunit;LogFilePath={}",
            self.output_dir.join(TEST_RESULTS_FILE).display()
        )
    }

    /// dotCover filter expression.
    pub fn coverage_filter(&self) -> String {
        if !self.coverage_filters.is_empty() {
            return self.coverage_filters.join(";");
        }
        match &self.app_name {
            Some(app) => format!("+:type={}.*", app),
            None => "+:type=*".to_string(),
        }
    }

    /// The command template for `name`, honoring overrides.
    pub fn template(&self, name: &str) -> Result<&str> {
        if let Some(custom) = self.templates.get(name) {
            return Ok(custom);
        }
        default_template(name).ok_or_else(|| KilnError::ConfigValidationError {
            message: format!("Unknown command template '{}'", name),
        })
    }

    /// Variables available to every template.
    ///
    /// `solution` is left out; [`render`](Self::render) adds it on demand.
    pub fn variables(&self) -> Variables {
        let mut vars = Variables::new()
            .with("dotnet", &self.toolchain.dotnet)
            .with("dotcover", &self.toolchain.dotcover)
            .with("converter", &self.toolchain.converter)
            .with("configuration", self.configuration.to_string())
            .with("root", self.root.display().to_string())
            .with("source_dir", self.source_dir.display().to_string())
            .with("tests_dir", self.tests_dir.display().to_string())
            .with("output_dir", self.output_dir.display().to_string())
            .with("logger", self.logger())
            .with("runtime", &self.package.runtime)
            .with("self_contained", self.package.self_contained.to_string())
            .with("coverage_filter", self.coverage_filter());

        if let Some(app) = &self.app_name {
            vars.insert("app", app);
        }
        vars
    }

    /// Render a template with the context variables plus `extra`.
    pub fn render(&self, template: &str, extra: &Variables) -> Result<String> {
        let mut vars = self.variables();

        let needs_solution = parse_interpolation(template)
            .iter()
            .any(|s| matches!(s, Segment::Variable(name) if name == "solution"));
        if needs_solution && extra.get("solution").is_none() {
            vars.insert("solution", self.solution()?.display().to_string());
        }

        for (name, value) in extra.iter() {
            vars.insert(name, value);
        }

        resolve_string(template, &vars)
    }

    /// Render the named template and run it.
    pub fn run_template(&self, name: &str, extra: &Variables) -> Result<()> {
        let line = self.render(self.template(name)?, extra)?;
        self.run_command(&line)
    }

    /// Run a command line in the project root.
    pub fn run_command(&self, line: &str) -> Result<()> {
        if self.dry_run {
            info!("[dry-run] {}", line);
            return Ok(());
        }
        execute_checked(line, &CommandOptions::in_dir(&self.root))?;
        Ok(())
    }

    /// Empty (or create) a directory.
    pub fn clean_directory(&self, path: &Path) -> Result<()> {
        if self.dry_run {
            info!("[dry-run] clean {}", path.display());
            return Ok(());
        }
        sys::ensure_clean_directory(path)
    }

    /// Delete a directory tree if present.
    pub fn delete_directory(&self, path: &Path) -> Result<()> {
        if self.dry_run {
            info!("[dry-run] delete {}", path.display());
            return Ok(());
        }
        sys::delete_directory(path)
    }

    /// Delete a file if present.
    pub fn delete_file(&self, path: &Path) -> Result<()> {
        if self.dry_run {
            info!("[dry-run] delete {}", path.display());
            return Ok(());
        }
        sys::delete_file(path)
    }

    /// Make sure the output directory exists.
    pub fn ensure_output_dir(&self) -> Result<()> {
        if !self.dry_run {
            std::fs::create_dir_all(&self.output_dir)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn context(root: &Path) -> BuildContext {
        BuildContext::new(root, &KilnConfig::default())
    }

    #[test]
    fn paths_are_anchored_at_root() {
        let temp = TempDir::new().unwrap();
        let ctx = context(temp.path());

        assert_eq!(ctx.source_dir(), temp.path().join("src"));
        assert_eq!(ctx.tests_dir(), temp.path().join("tests"));
        assert_eq!(ctx.output_dir(), temp.path().join("output"));
    }

    #[test]
    fn relative_root_is_made_absolute() {
        let ctx = BuildContext::new("app", &KilnConfig::default());
        let cwd = std::env::current_dir().unwrap();

        assert!(ctx.root().is_absolute());
        assert_eq!(ctx.root(), cwd.join("app"));
        assert_eq!(ctx.output_dir(), cwd.join("app").join("output"));
    }

    #[test]
    fn configured_configuration_wins_over_default() {
        let temp = TempDir::new().unwrap();
        let config = KilnConfig {
            configuration: Some(Configuration::Release),
            ..Default::default()
        };
        let ctx = BuildContext::new(temp.path(), &config);
        assert_eq!(ctx.configuration(), Configuration::Release);

        let ctx = ctx.with_configuration(Configuration::Debug);
        assert_eq!(ctx.configuration(), Configuration::Debug);
    }

    #[test]
    fn solution_is_discovered_when_unique() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("App.sln"), "").unwrap();

        let ctx = context(temp.path());
        assert_eq!(ctx.solution().unwrap(), temp.path().join("App.sln"));
    }

    #[test]
    fn solution_missing_or_ambiguous_is_an_error() {
        let temp = TempDir::new().unwrap();
        let ctx = context(temp.path());
        assert!(matches!(
            ctx.solution(),
            Err(KilnError::SolutionNotFound { .. })
        ));

        fs::write(temp.path().join("A.sln"), "").unwrap();
        fs::write(temp.path().join("B.sln"), "").unwrap();
        let err = ctx.solution().unwrap_err();
        assert!(err.to_string().contains("2 *.sln files"));
    }

    #[test]
    fn configured_solution_must_exist() {
        let temp = TempDir::new().unwrap();
        let config = KilnConfig {
            solution: Some(PathBuf::from("build/App.sln")),
            ..Default::default()
        };
        let ctx = BuildContext::new(temp.path(), &config);
        assert!(ctx.solution().is_err());

        fs::create_dir_all(temp.path().join("build")).unwrap();
        fs::write(temp.path().join("build/App.sln"), "").unwrap();
        assert_eq!(ctx.solution().unwrap(), temp.path().join("build/App.sln"));
    }

    #[test]
    fn logger_points_into_output_dir() {
        let temp = TempDir::new().unwrap();
        let ctx = context(temp.path());
        let logger = ctx.logger();
        assert!(logger.starts_with("nunit;LogFilePath="));
        assert!(logger.ends_with(TEST_RESULTS_FILE));
    }

    #[test]
    fn coverage_filter_defaults_to_app_types() {
        let temp = TempDir::new().unwrap();
        let mut config = KilnConfig {
            app_name: Some("YAGNI".to_string()),
            ..Default::default()
        };
        assert_eq!(
            BuildContext::new(temp.path(), &config).coverage_filter(),
            "+:type=YAGNI.*"
        );

        config.coverage.filters = vec!["+:type=A.*".to_string(), "-:type=B".to_string()];
        assert_eq!(
            BuildContext::new(temp.path(), &config).coverage_filter(),
            "+:type=A.*;-:type=B"
        );
    }

    #[test]
    fn package_project_defaults_under_source() {
        let temp = TempDir::new().unwrap();
        assert!(context(temp.path()).package_project().is_err());

        let config = KilnConfig {
            app_name: Some("YAGNI".to_string()),
            ..Default::default()
        };
        let ctx = BuildContext::new(temp.path(), &config);
        assert_eq!(
            ctx.package_project().unwrap(),
            temp.path().join("src/YAGNI/YAGNI.csproj")
        );
    }

    #[test]
    fn render_only_requires_solution_when_referenced() {
        let temp = TempDir::new().unwrap();
        let ctx = context(temp.path());

        let line = ctx
            .render("${dotnet} --info", &Variables::new())
            .unwrap();
        assert_eq!(line, "dotnet --info");

        let err = ctx
            .render("${dotnet} restore ${solution}", &Variables::new())
            .unwrap_err();
        assert!(matches!(err, KilnError::SolutionNotFound { .. }));

        let line = ctx
            .render(
                "${dotnet} restore ${solution}",
                &Variables::new().with("solution", "X.sln"),
            )
            .unwrap();
        assert_eq!(line, "dotnet restore X.sln");
    }

    #[test]
    fn template_overrides_take_precedence() {
        let temp = TempDir::new().unwrap();
        let mut config = KilnConfig::default();
        config
            .commands
            .insert("compile".to_string(), "make ${configuration}".to_string());
        let ctx = BuildContext::new(temp.path(), &config).with_configuration(Configuration::Release);

        assert_eq!(ctx.template("compile").unwrap(), "make ${configuration}");
        assert!(ctx.template("restore").unwrap().contains("restore"));
        assert!(ctx.template("deploy").is_err());
        assert_eq!(
            ctx.render(ctx.template("compile").unwrap(), &Variables::new())
                .unwrap(),
            "make Release"
        );
    }

    #[test]
    fn run_command_executes_in_root() {
        let temp = TempDir::new().unwrap();
        let ctx = context(temp.path());

        ctx.run_command("echo built > marker.txt").unwrap();
        assert!(temp.path().join("marker.txt").exists());
    }

    #[test]
    fn run_command_failure_is_reported() {
        let temp = TempDir::new().unwrap();
        let err = context(temp.path()).run_command("exit 4").unwrap_err();
        assert!(matches!(err, KilnError::CommandFailed { code: Some(4), .. }));
    }

    #[test]
    fn dry_run_touches_nothing() {
        let temp = TempDir::new().unwrap();
        let ctx = context(temp.path()).with_dry_run(true);

        ctx.run_command("echo built > marker.txt").unwrap();
        ctx.clean_directory(ctx.output_dir()).unwrap();
        ctx.ensure_output_dir().unwrap();

        assert!(!temp.path().join("marker.txt").exists());
        assert!(!ctx.output_dir().exists());
    }
}
