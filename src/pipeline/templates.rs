//! Default command templates for the built-in targets.
//!
//! Every toolchain invocation is a `${var}` template so a project can swap
//! in its own command line under `commands:` in `.kiln/config.yml`.

use crate::shell::ShellType;

pub const RESTORE: &str = "restore";
pub const COMPILE: &str = "compile";
pub const TEST: &str = "test";
pub const COVERAGE: &str = "coverage";
pub const CONVERT: &str = "convert";
pub const PUBLISH: &str = "publish";
pub const ARCHIVE: &str = "archive";

/// Names accepted under `commands:`.
pub const TEMPLATE_NAMES: &[&str] = &[RESTORE, COMPILE, TEST, COVERAGE, CONVERT, PUBLISH, ARCHIVE];

const RESTORE_TEMPLATE: &str = r#"${dotnet} restore "${solution}""#;

const COMPILE_TEMPLATE: &str =
    r#"${dotnet} build "${solution}" --configuration ${configuration} --no-restore"#;

const TEST_TEMPLATE: &str = concat!(
    r#"${dotnet} test "${solution}" --configuration ${configuration}"#,
    r#" --no-build --no-restore /p:CollectCoverage=true"#,
    r#" --results-directory "${output_dir}" --logger "${logger}""#,
);

const COVERAGE_TEMPLATE: &str = concat!(
    r#"${dotcover} cover /ReportType=${report_type}"#,
    r#" --TargetExecutable="${dotnet}""#,
    r#" --TargetArguments="test ${solution} --logger=${logger}""#,
    r#" --Filters="${coverage_filter}" --Output="${report_file}""#,
);

const CONVERT_TEMPLATE: &str = r#"${converter} --input "${input}" --output "${output}""#;

const PUBLISH_TEMPLATE: &str = concat!(
    r#"${dotnet} publish "${project}" --configuration Release"#,
    r#" --output "${publish_dir}" --self-contained ${self_contained} --runtime ${runtime}"#,
);

const ARCHIVE_TEMPLATE_POSIX: &str = r#"cd "${publish_dir}" && zip -q -r "${archive}" ."#;

const ARCHIVE_TEMPLATE_CMD: &str = r#"tar -a -c -f "${archive}" -C "${publish_dir}" ."#;

/// The built-in command line for a template name.
pub fn default_template(name: &str) -> Option<&'static str> {
    let template = match name {
        RESTORE => RESTORE_TEMPLATE,
        COMPILE => COMPILE_TEMPLATE,
        TEST => TEST_TEMPLATE,
        COVERAGE => COVERAGE_TEMPLATE,
        CONVERT => CONVERT_TEMPLATE,
        PUBLISH => PUBLISH_TEMPLATE,
        ARCHIVE => match ShellType::current() {
            ShellType::Posix => ARCHIVE_TEMPLATE_POSIX,
            ShellType::Cmd => ARCHIVE_TEMPLATE_CMD,
        },
        _ => return None,
    };
    Some(template)
}
