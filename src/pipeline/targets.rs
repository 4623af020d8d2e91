//! Declarations of the built-in targets and of targets from configuration.

use std::collections::BTreeMap;
use std::rc::Rc;

use anyhow::Context as _;
use tracing::debug;

use crate::config::{TargetConfig, Variables};
use crate::error::Result;
use crate::runner::TargetGraphBuilder;

use super::context::BuildContext;
use super::templates;

pub const CLEAN: &str = "clean";
pub const RESTORE: &str = "restore";
pub const COMPILE: &str = "compile";
pub const TEST: &str = "test";
pub const COVERAGE: &str = "coverage";
pub const GITHUB_COVERAGE: &str = "github-coverage";
pub const PACK: &str = "pack";

/// Built-in targets, in declaration order.
pub const BUILTIN_TARGETS: &[&str] = &[
    CLEAN,
    RESTORE,
    COMPILE,
    TEST,
    COVERAGE,
    GITHUB_COVERAGE,
    PACK,
];

/// Target run when neither the command line nor the config names one.
pub const DEFAULT_TARGET: &str = COMPILE;

const COVERAGE_HTML: &str = "Coverage.html";
const COVERAGE_XML: &str = "Coverage.xml";
const COBERTURA_XML: &str = "Cobertura.xml";

/// Declare the built-in targets on `builder`.
pub fn declare_builtin(builder: &mut TargetGraphBuilder, ctx: &Rc<BuildContext>) -> Result<()> {
    let c = Rc::clone(ctx);
    builder
        .declare(CLEAN, move || clean(&c))?
        .describe("Delete bin/obj directories and empty the output directory")
        .before(RESTORE);

    let c = Rc::clone(ctx);
    builder
        .declare(RESTORE, move || {
            Ok(c.run_template(templates::RESTORE, &Variables::new())?)
        })?
        .describe("Restore packages for the solution");

    let c = Rc::clone(ctx);
    builder
        .declare(COMPILE, move || {
            Ok(c.run_template(templates::COMPILE, &Variables::new())?)
        })?
        .describe("Build the solution")
        .depends_on(RESTORE);

    let c = Rc::clone(ctx);
    builder
        .declare(TEST, move || Ok(c.run_template(templates::TEST, &Variables::new())?))?
        .describe("Run tests with coverage collection and NUnit results")
        .depends_on(COMPILE);

    let c = Rc::clone(ctx);
    builder
        .declare(COVERAGE, move || run_coverage(&c, "HTML", COVERAGE_HTML))?
        .describe("Write an HTML coverage report")
        .depends_on(COMPILE);

    let c = Rc::clone(ctx);
    let f = Rc::clone(ctx);
    builder
        .declare(GITHUB_COVERAGE, move || {
            run_coverage(&c, "DetailedXml", COVERAGE_XML)
        })?
        .describe("Write an XML coverage report and convert it to Cobertura")
        .depends_on(COMPILE)
        .always(move || convert_coverage(&f));

    let c = Rc::clone(ctx);
    builder
        .declare(PACK, move || pack(&c))?
        .describe("Publish a self-contained release build and archive it");

    Ok(())
}

/// Declare targets from the `targets:` section of the config.
///
/// Edges may name built-in targets or each other; unknown names surface
/// when the graph is built.
pub fn declare_custom(
    builder: &mut TargetGraphBuilder,
    ctx: &Rc<BuildContext>,
    targets: &BTreeMap<String, TargetConfig>,
) -> Result<()> {
    for (name, target) in targets {
        debug!("Declaring custom target '{}'", name);

        let c = Rc::clone(ctx);
        let command = target.command.clone();
        let mut handle = builder.declare(name.as_str(), move || run_custom(&c, &command))?;

        if let Some(description) = &target.description {
            handle = handle.describe(description);
        }
        for dep in &target.depends_on {
            handle = handle.depends_on(dep);
        }
        for prior in &target.after {
            handle = handle.after(prior);
        }
        for next in &target.before {
            handle = handle.before(next);
        }
        if let Some(always) = &target.always {
            let c = Rc::clone(ctx);
            let always = always.clone();
            handle.always(move || run_custom(&c, &always));
        }
    }

    Ok(())
}

fn run_custom(ctx: &BuildContext, template: &str) -> anyhow::Result<()> {
    let line = ctx.render(template, &Variables::new())?;
    Ok(ctx.run_command(&line)?)
}

fn clean(ctx: &BuildContext) -> anyhow::Result<()> {
    for base in [ctx.source_dir(), ctx.tests_dir()] {
        let found = crate::sys::find_directories(base, &["bin", "obj"])
            .with_context(|| format!("Failed to scan {}", base.display()))?;
        for dir in found {
            ctx.delete_directory(&dir)
                .with_context(|| format!("Failed to delete {}", dir.display()))?;
        }
    }

    ctx.clean_directory(ctx.output_dir())
        .with_context(|| format!("Failed to clean {}", ctx.output_dir().display()))?;
    Ok(())
}

fn run_coverage(ctx: &BuildContext, report_type: &str, report_file: &str) -> anyhow::Result<()> {
    ctx.ensure_output_dir()?;
    let report = ctx.output_dir().join(report_file);
    let extra = Variables::new()
        .with("report_type", report_type)
        .with("report_file", report.display().to_string());
    Ok(ctx.run_template(templates::COVERAGE, &extra)?)
}

fn convert_coverage(ctx: &BuildContext) -> anyhow::Result<()> {
    let extra = Variables::new()
        .with("input", ctx.output_dir().join(COVERAGE_XML).display().to_string())
        .with(
            "output",
            ctx.output_dir().join(COBERTURA_XML).display().to_string(),
        );
    ctx.run_template(templates::CONVERT, &extra)
        .context("Cobertura conversion failed")
}

fn pack(ctx: &BuildContext) -> anyhow::Result<()> {
    let app = ctx.app_name()?;
    let publish_dir = ctx.output_dir().join(app);
    let archive = ctx.output_dir().join(format!("{}.zip", app));
    let project = ctx.package_project()?;

    ctx.clean_directory(&publish_dir)?;

    let extra = Variables::new()
        .with("project", project.display().to_string())
        .with("publish_dir", publish_dir.display().to_string())
        .with("archive", archive.display().to_string());

    ctx.run_template(templates::PUBLISH, &extra)
        .context("Publish failed")?;
    ctx.delete_file(&archive)?;
    ctx.run_template(templates::ARCHIVE, &extra)
        .with_context(|| format!("Failed to archive {}", publish_dir.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KilnConfig;
    use crate::runner::{Executor, NullReporter, StepStatus, TargetGraph};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn graph_for(root: &Path, config: &KilnConfig) -> TargetGraph {
        let ctx = Rc::new(BuildContext::new(root, config));
        let mut builder = TargetGraph::builder();
        declare_builtin(&mut builder, &ctx).unwrap();
        declare_custom(&mut builder, &ctx, &config.targets).unwrap();
        builder.build().unwrap()
    }

    fn custom(command: &str) -> TargetConfig {
        TargetConfig {
            command: command.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn builtin_targets_are_declared_in_order() {
        let temp = TempDir::new().unwrap();
        let graph = graph_for(temp.path(), &KilnConfig::default());
        assert_eq!(graph.names(), BUILTIN_TARGETS.to_vec());
        assert!(graph.find_cycle().is_none());
    }

    #[test]
    fn test_plan_pulls_in_build_chain() {
        let temp = TempDir::new().unwrap();
        let graph = graph_for(temp.path(), &KilnConfig::default());

        let plan = graph.resolve(TEST).unwrap();
        assert_eq!(plan.names(), vec![RESTORE, COMPILE, TEST]);

        let plan = graph.resolve_all(&[TEST, CLEAN]).unwrap();
        assert_eq!(plan.names(), vec![CLEAN, RESTORE, COMPILE, TEST]);
    }

    #[test]
    fn coverage_targets_depend_on_compile() {
        let temp = TempDir::new().unwrap();
        let graph = graph_for(temp.path(), &KilnConfig::default());

        let plan = graph.resolve(GITHUB_COVERAGE).unwrap();
        assert_eq!(plan.names(), vec![RESTORE, COMPILE, GITHUB_COVERAGE]);
        assert!(graph.get(GITHUB_COVERAGE).unwrap().has_follow_up());
        assert!(!graph.get(COVERAGE).unwrap().has_follow_up());
    }

    #[test]
    fn pack_stands_alone() {
        let temp = TempDir::new().unwrap();
        let graph = graph_for(temp.path(), &KilnConfig::default());
        assert_eq!(graph.resolve(PACK).unwrap().names(), vec![PACK]);
    }

    #[test]
    fn clean_removes_build_output() {
        let temp = TempDir::new().unwrap();
        for dir in ["src/App/bin/Debug", "src/App/obj", "tests/App.Tests/bin", "output/old"] {
            fs::create_dir_all(temp.path().join(dir)).unwrap();
        }
        fs::write(temp.path().join("src/App/Program.cs"), "").unwrap();

        let graph = graph_for(temp.path(), &KilnConfig::default());
        let plan = graph.resolve(CLEAN).unwrap();
        let mut reporter = NullReporter;
        let report = Executor::new(&mut reporter).run(&plan);

        assert!(report.success);
        assert!(!temp.path().join("src/App/bin").exists());
        assert!(!temp.path().join("src/App/obj").exists());
        assert!(!temp.path().join("tests/App.Tests/bin").exists());
        assert!(temp.path().join("src/App/Program.cs").exists());
        assert!(temp.path().join("output").is_dir());
        assert!(!temp.path().join("output/old").exists());
    }

    #[test]
    fn clean_tolerates_missing_directories() {
        let temp = TempDir::new().unwrap();
        let graph = graph_for(temp.path(), &KilnConfig::default());
        let plan = graph.resolve(CLEAN).unwrap();
        let mut reporter = NullReporter;
        assert!(Executor::new(&mut reporter).run(&plan).success);
    }

    #[test]
    fn restore_without_solution_fails_the_step() {
        let temp = TempDir::new().unwrap();
        let graph = graph_for(temp.path(), &KilnConfig::default());
        let plan = graph.resolve(COMPILE).unwrap();
        let mut reporter = NullReporter;
        let report = Executor::new(&mut reporter).run(&plan);

        assert!(!report.success);
        let failed = report.failed_step().unwrap();
        assert_eq!(failed.name, RESTORE);
        assert!(failed.error.as_deref().unwrap().contains("Solution not found"));
        assert_eq!(report.names_with_status(StepStatus::NotRun), vec![COMPILE]);
    }

    #[test]
    fn overridden_templates_drive_builtin_targets() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("App.sln"), "").unwrap();

        let mut config = KilnConfig::default();
        config
            .commands
            .insert("restore".to_string(), "echo restore > restored.txt".to_string());
        config.commands.insert(
            "compile".to_string(),
            "echo ${configuration} > compiled.txt".to_string(),
        );

        let graph = graph_for(temp.path(), &config);
        let plan = graph.resolve(COMPILE).unwrap();
        let mut reporter = NullReporter;
        let report = Executor::new(&mut reporter).run(&plan);

        assert!(report.success, "{:?}", report.error());
        assert!(temp.path().join("restored.txt").exists());
        assert!(temp.path().join("compiled.txt").exists());
    }

    #[test]
    fn github_coverage_converts_even_when_coverage_fails() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("App.sln"), "").unwrap();

        let mut config = KilnConfig::default();
        for name in ["restore", "compile"] {
            config.commands.insert(name.to_string(), "echo ok".to_string());
        }
        config
            .commands
            .insert("coverage".to_string(), "exit 1".to_string());
        config
            .commands
            .insert("convert".to_string(), "echo converted > converted.txt".to_string());

        let graph = graph_for(temp.path(), &config);
        let plan = graph.resolve(GITHUB_COVERAGE).unwrap();
        let mut reporter = NullReporter;
        let report = Executor::new(&mut reporter).run(&plan);

        assert!(!report.success);
        assert_eq!(report.failed_step().unwrap().name, GITHUB_COVERAGE);
        assert!(temp.path().join("converted.txt").exists());
    }

    #[test]
    fn pack_requires_app_name() {
        let temp = TempDir::new().unwrap();
        let graph = graph_for(temp.path(), &KilnConfig::default());
        let plan = graph.resolve(PACK).unwrap();
        let mut reporter = NullReporter;
        let report = Executor::new(&mut reporter).run(&plan);

        let failed = report.failed_step().unwrap();
        assert!(failed.error.as_deref().unwrap().contains("app_name"));
    }

    #[test]
    fn pack_publishes_then_archives() {
        let temp = TempDir::new().unwrap();
        let mut config = KilnConfig {
            app_name: Some("YAGNI".to_string()),
            ..Default::default()
        };
        config.commands.insert(
            "publish".to_string(),
            "echo ${project} > published.txt".to_string(),
        );
        config
            .commands
            .insert("archive".to_string(), "echo zip > archived.txt".to_string());
        fs::create_dir_all(temp.path().join("output")).unwrap();
        fs::write(temp.path().join("output/YAGNI.zip"), "stale").unwrap();

        let graph = graph_for(temp.path(), &config);
        let plan = graph.resolve(PACK).unwrap();
        let mut reporter = NullReporter;
        let report = Executor::new(&mut reporter).run(&plan);

        assert!(report.success, "{:?}", report.error());
        assert!(temp.path().join("output/YAGNI").is_dir());
        assert!(!temp.path().join("output/YAGNI.zip").exists());
        let published = fs::read_to_string(temp.path().join("published.txt")).unwrap();
        assert!(published.contains("YAGNI.csproj"));
        assert!(temp.path().join("archived.txt").exists());
    }

    #[test]
    fn custom_targets_join_the_graph() {
        let temp = TempDir::new().unwrap();
        let mut config = KilnConfig::default();
        config.targets.insert(
            "lint".to_string(),
            TargetConfig {
                description: Some("Run analyzers".to_string()),
                depends_on: vec![RESTORE.to_string()],
                before: vec![COMPILE.to_string()],
                ..custom("echo lint")
            },
        );

        let graph = graph_for(temp.path(), &config);
        assert_eq!(graph.get("lint").unwrap().description(), Some("Run analyzers"));

        let plan = graph.resolve_all(&[COMPILE, "lint"]).unwrap();
        assert_eq!(plan.names(), vec![RESTORE, "lint", COMPILE]);
    }

    #[test]
    fn custom_target_follow_up_always_runs() {
        let temp = TempDir::new().unwrap();
        let mut config = KilnConfig::default();
        config.targets.insert(
            "flaky".to_string(),
            TargetConfig {
                always: Some("echo cleanup > cleanup.txt".to_string()),
                ..custom("exit 1")
            },
        );

        let graph = graph_for(temp.path(), &config);
        let plan = graph.resolve("flaky").unwrap();
        let mut reporter = NullReporter;
        let report = Executor::new(&mut reporter).run(&plan);

        assert!(!report.success);
        assert!(temp.path().join("cleanup.txt").exists());
    }

    #[test]
    fn custom_target_unknown_edge_fails_build() {
        let temp = TempDir::new().unwrap();
        let mut config = KilnConfig::default();
        config.targets.insert(
            "deploy".to_string(),
            TargetConfig {
                depends_on: vec!["publsh".to_string()],
                ..custom("echo deploy")
            },
        );

        let ctx = Rc::new(BuildContext::new(temp.path(), &config));
        let mut builder = TargetGraph::builder();
        declare_builtin(&mut builder, &ctx).unwrap();
        declare_custom(&mut builder, &ctx, &config.targets).unwrap();
        let err = builder.build().unwrap_err();
        assert!(err.to_string().contains("publsh"));
    }
}
