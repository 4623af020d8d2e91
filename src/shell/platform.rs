//! Platform-specific shell detection.

/// Known shell types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellType {
    Posix,
    Cmd,
}

impl ShellType {
    /// The shell for the current platform.
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            ShellType::Cmd
        } else {
            ShellType::Posix
        }
    }

    /// Executable used to run command lines.
    pub fn program(&self) -> String {
        match self {
            ShellType::Cmd => std::env::var("COMSPEC").unwrap_or_else(|_| "cmd.exe".to_string()),
            ShellType::Posix => "/bin/sh".to_string(),
        }
    }

    /// Flag that passes a command line to the shell.
    pub fn flag(&self) -> &'static str {
        match self {
            ShellType::Cmd => "/C",
            ShellType::Posix => "-c",
        }
    }
}

/// Check if running in a CI environment.
///
/// Decides the default build configuration (release on CI, debug locally).
/// Checks common CI environment variables: `CI`, `GITHUB_ACTIONS`,
/// `GITLAB_CI`, `CIRCLECI`, `TRAVIS`, `JENKINS_URL`, `TF_BUILD`.
pub fn is_ci() -> bool {
    ["CI", "GITHUB_ACTIONS", "GITLAB_CI", "CIRCLECI", "TRAVIS", "JENKINS_URL", "TF_BUILD"]
        .iter()
        .any(|var| std::env::var(var).is_ok())
}
