//! Host tool validation for loader staging.
//!
//! Checks that the external tools the stager shells out to are installed.

use super::CheckResult;
use crate::process::{exists, which};

/// Tools every staging run needs, with their purpose and install hint.
const REQUIRED_TOOLS: &[(&str, &str, &str)] = &[
    ("bash", "Expand memtest and theme globs", "sudo dnf install bash"),
    ("cp", "Copy theme and memtest files", "sudo dnf install coreutils"),
];

/// Tool needed only when a gfxboot theme is staged.
const THEME_TOOL: (&str, &str, &str) = (
    "gfxboot",
    "Patch the theme gfxboot.cfg",
    "sudo zypper install gfxboot",
);

/// Check that the host tools for a staging run are installed.
pub fn check_host_tools(with_theme: bool) -> Vec<CheckResult> {
    let mut results: Vec<CheckResult> = REQUIRED_TOOLS
        .iter()
        .map(|(tool, purpose, install)| check_tool(tool, purpose, install))
        .collect();

    if with_theme {
        let (tool, purpose, install) = THEME_TOOL;
        results.push(check_tool(tool, purpose, install));
    }

    results
}

fn check_tool(tool: &str, purpose: &str, install_cmd: &str) -> CheckResult {
    match which(tool) {
        Some(path) => CheckResult::pass(
            format!("{} tool", tool),
            format!("Found at {} ({})", path.display(), purpose),
        ),
        None => CheckResult::fail(
            format!("{} tool", tool),
            format!("Not found (needed for: {})", purpose),
            install_cmd,
        ),
    }
}

/// Check if a specific tool is available.
pub fn has_tool(tool: &str) -> bool {
    exists(tool)
}
