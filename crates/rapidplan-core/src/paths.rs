use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Manifest files
// ---------------------------------------------------------------------------

pub const PACKAGE_JSON: &str = "package.json";
pub const CARGO_TOML: &str = "Cargo.toml";
pub const REQUIREMENTS_TXT: &str = "requirements.txt";
pub const PYPROJECT_TOML: &str = "pyproject.toml";
pub const GO_MOD: &str = "go.mod";

// ---------------------------------------------------------------------------
// Source layout conventions
// ---------------------------------------------------------------------------

pub const COMPONENTS_DIR: &str = "src/components";
pub const API_DIR: &str = "src/app/api";
pub const PRISMA_SCHEMA: &str = "src/prisma/schema.prisma";
pub const AUTH_DIR: &str = "src/lib/auth";

/// File names that define an API route inside [`API_DIR`].
pub const ROUTE_FILES: &[&str] = &["route.ts", "route.js"];

// ---------------------------------------------------------------------------
// Workflow files
// ---------------------------------------------------------------------------

pub const CURRENT_MODE_FILE: &str = ".claude/current_mode";
pub const CONFIG_FILE: &str = ".claude/rapidplan.yaml";
pub const CLAUDE_MD: &str = "CLAUDE.md";
pub const PRD_MD: &str = "PRD.md";
pub const TASK_TEMPLATE: &str = "docs/TASK-ISSUE-TEMP.md";
pub const GITIGNORE: &str = ".gitignore";

pub const SCRATCH_DIR: &str = ".tmp";
pub const RAPID_TASK_FILE: &str = "rapid-task-content.md";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn manifest_path(root: &Path, name: &str) -> PathBuf {
    root.join(name)
}

pub fn api_dir(root: &Path) -> PathBuf {
    root.join(API_DIR)
}

pub fn components_dir(root: &Path) -> PathBuf {
    root.join(COMPONENTS_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn current_mode_path(root: &Path) -> PathBuf {
    root.join(CURRENT_MODE_FILE)
}

pub fn claude_md_path(root: &Path) -> PathBuf {
    root.join(CLAUDE_MD)
}

pub fn prd_path(root: &Path) -> PathBuf {
    root.join(PRD_MD)
}

pub fn gitignore_path(root: &Path) -> PathBuf {
    root.join(GITIGNORE)
}
