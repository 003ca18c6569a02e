//! Preflight checks for loader staging.
//!
//! Validates that the host and the lookup tree can provide everything a
//! staging run needs BEFORE any directory is wiped.
//!
//! # Checks Performed
//!
//! - **Host tools**: bash and cp, plus gfxboot when a theme is configured
//! - **Loader files**: every syslinux file is found in a candidate directory
//! - **Theme**: the configured theme directory exists
//!
//! # Usage
//!
//! ```rust,ignore
//! use isolinux_config::preflight::PreflightChecker;
//!
//! let report = PreflightChecker::new(lookup_path, theme).run_all();
//!
//! if !report.is_ok() {
//!     report.print_summary();
//!     std::process::exit(1);
//! }
//! ```

mod host_tools;

pub use host_tools::{check_host_tools, has_tool};

use std::path::{Path, PathBuf};

use crate::bootloader::loader::LoaderAssetSet;

/// Loader files without which isolinux cannot boot at all.
const ESSENTIAL_FILES: &[&str] = &["isolinux.bin", "ldlinux.c32"];

/// Result of a single preflight check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// Name of the check
    pub name: String,
    /// Whether the check passed
    pub passed: bool,
    /// Human-readable message
    pub message: String,
    /// Optional suggestion for fixing the issue
    pub suggestion: Option<String>,
}

impl CheckResult {
    /// Create a passing check result.
    pub fn pass(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            message: message.into(),
            suggestion: None,
        }
    }

    /// Create a failing check result.
    pub fn fail(
        name: impl Into<String>,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            passed: false,
            message: message.into(),
            suggestion: Some(suggestion.into()),
        }
    }

    /// Create a warning check result (passes but with a note).
    pub fn warn(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            message: message.into(),
            suggestion: None,
        }
    }
}

/// Comprehensive preflight report.
#[derive(Debug, Default)]
pub struct PreflightReport {
    pub checks: Vec<CheckResult>,
}

impl PreflightReport {
    /// Check if all preflight checks passed.
    pub fn is_ok(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    /// Get all failing checks.
    pub fn errors(&self) -> Vec<&CheckResult> {
        self.checks.iter().filter(|c| !c.passed).collect()
    }

    pub fn passed_count(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }

    pub fn total_count(&self) -> usize {
        self.checks.len()
    }

    /// Print a summary of the preflight checks.
    pub fn print_summary(&self) {
        println!("=== Preflight Check Results ===\n");

        for check in &self.checks {
            let status = if check.passed { "[OK]" } else { "[FAIL]" };
            println!("{} {}: {}", status, check.name, check.message);
            if let Some(suggestion) = &check.suggestion {
                println!("     Suggestion: {}", suggestion);
            }
        }

        println!();
        if self.is_ok() {
            println!(
                "All preflight checks passed ({}/{})",
                self.passed_count(),
                self.total_count()
            );
        } else {
            println!(
                "Preflight checks failed: {} of {} passed",
                self.passed_count(),
                self.total_count()
            );
        }
    }
}

/// Preflight checker for a loader staging run.
pub struct PreflightChecker {
    lookup_path: PathBuf,
    theme: Option<String>,
}

impl PreflightChecker {
    pub fn new(lookup_path: impl Into<PathBuf>, theme: Option<String>) -> Self {
        Self {
            lookup_path: lookup_path.into(),
            theme,
        }
    }

    /// Run all preflight checks and return a comprehensive report.
    pub fn run_all(&self) -> PreflightReport {
        let mut report = PreflightReport::default();
        let assets = LoaderAssetSet::new(&self.lookup_path, self.theme.as_deref());

        report.checks.extend(check_host_tools(self.theme.is_some()));
        report.checks.extend(check_loader_files(&assets));
        if let Some(theme_dir) = &assets.theme_dir {
            report.checks.push(check_theme(theme_dir));
        }

        report
    }
}

/// One check per syslinux file: found in a candidate directory or not.
pub fn check_loader_files(assets: &LoaderAssetSet) -> Vec<CheckResult> {
    assets
        .files
        .iter()
        .map(|name| {
            let found = assets
                .source_dirs
                .iter()
                .rev()
                .map(|dir| dir.join(name))
                .find(|path| path.exists());
            let check = format!("{} loader file", name);

            match found {
                Some(path) => CheckResult::pass(check, format!("Using {}", path.display())),
                None if ESSENTIAL_FILES.contains(name) => CheckResult::fail(
                    check,
                    "Not found in any syslinux directory",
                    "Install syslinux into the image root or pass --lookup-path",
                ),
                None => CheckResult::warn(check, "Not found, will be skipped"),
            }
        })
        .collect()
}

fn check_theme(theme_dir: &Path) -> CheckResult {
    if theme_dir.is_dir() {
        CheckResult::pass("theme", format!("Found at {}", theme_dir.display()))
    } else {
        CheckResult::warn(
            "theme",
            format!("{} not found, no theme will be staged", theme_dir.display()),
        )
    }
}
