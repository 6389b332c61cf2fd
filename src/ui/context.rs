//! UI context for detecting interactive vs CI environments

use std::io::IsTerminal;

/// Environment variables set by common CI systems
const CI_VARS: &[&str] = &[
    "CI",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "CIRCLECI",
    "TRAVIS",
    "JENKINS_URL",
    "BUILDKITE",
    "TEAMCITY_VERSION",
    "TF_BUILD",
];

/// UI context that determines output behavior
#[derive(Debug, Clone)]
pub struct UiContext {
    /// Whether a person is watching a terminal
    interactive: bool,
    /// Whether to surface skipped entries and other diagnostics
    verbose: bool,
}

impl UiContext {
    /// Detect the current environment
    pub fn detect() -> Self {
        Self {
            interactive: Self::detect_interactive(),
            verbose: false,
        }
    }

    /// Create a non-interactive context (for testing or piping)
    pub fn non_interactive() -> Self {
        Self {
            interactive: false,
            verbose: false,
        }
    }

    /// Report diagnostics such as skipped directories
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Check if prompts can be shown
    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Check if we should use fancy output (spinners, colors)
    pub fn use_fancy_output(&self) -> bool {
        self.interactive
    }

    /// Results go to stdout, so a pipe there also rules out prompts
    fn detect_interactive() -> bool {
        if !std::io::stdout().is_terminal()
            || !std::io::stderr().is_terminal()
            || !std::io::stdin().is_terminal()
        {
            return false;
        }

        !CI_VARS.iter().any(|var| std::env::var_os(var).is_some())
    }
}
