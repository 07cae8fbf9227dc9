//! Project bootstrap: discover a [`ProjectProfile`], rewrite the workflow
//! documents with it, and report which toolchain programs are on `PATH`.

use crate::error::Result;
use crate::paths;
use crate::stack::{detect_stack, Commands, Ecosystem};
use crate::template::{Substitutions, PROJECT_NAME};
use regex::Regex;
use serde::Serialize;
use std::path::Path;
use std::process::Command;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

pub const NOT_SET: &str = "Not set";
pub const NOT_SPECIFIED: &str = "Not specified";

pub const REPOSITORY_URL: &str = "[REPOSITORY_URL]";
pub const AUTHOR_NAME: &str = "[AUTHOR_NAME]";
pub const EMAIL: &str = "[EMAIL]";
pub const PRIMARY_LANGUAGE: &str = "[PRIMARY_LANGUAGE]";
pub const WEB_FRAMEWORK: &str = "[WEB_FRAMEWORK]";
pub const DATABASE: &str = "[DATABASE]";
pub const DEPLOYMENT_PLATFORM: &str = "[DEPLOYMENT_PLATFORM]";

/// Any of these at the root means there is existing code to analyze.
pub const SOURCE_INDICATORS: &[&str] = &[
    "src",
    "lib",
    "app",
    "components",
    "services",
    "models",
    "package.json",
    "Cargo.toml",
    "requirements.txt",
    "pyproject.toml",
    "go.mod",
    "pom.xml",
    "build.gradle",
    "Gemfile",
];

pub const STRUCTURE_DIRS: &[&str] = &[
    "src",
    "lib",
    "app",
    "components",
    "services",
    "models",
    "migrations",
    "config",
];

// ---------------------------------------------------------------------------
// PRD.md
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PrdInfo {
    pub project_name: Option<String>,
    pub language: Option<String>,
    pub framework: Option<String>,
    pub database: Option<String>,
    pub deployment: Option<String>,
}

struct PrdPatterns {
    name: Regex,
    language: Regex,
    framework: Regex,
    database: Regex,
    deployment: Regex,
}

fn stack_field(field: &str) -> Regex {
    let pattern = format!(r"(?i)## Technology Stack\s*[\s\S]*?\*\*{field}\*\*:[ \t]*([^\n]+)");
    Regex::new(&pattern).expect("valid PRD field regex")
}

static PRD_RE: OnceLock<PrdPatterns> = OnceLock::new();

fn prd_patterns() -> &'static PrdPatterns {
    PRD_RE.get_or_init(|| PrdPatterns {
        name: Regex::new(r"(?i)## Project Name:[ \t]*(.+)").expect("valid PRD name regex"),
        language: stack_field("Language"),
        framework: stack_field("Framework"),
        database: stack_field("Database"),
        deployment: stack_field("Deployment"),
    })
}

fn capture(re: &Regex, content: &str) -> Option<String> {
    let value = re.captures(content)?.get(1)?.as_str().trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Extract the project name and the `## Technology Stack` fields.
pub fn parse_prd(content: &str) -> PrdInfo {
    let re = prd_patterns();
    PrdInfo {
        project_name: capture(&re.name, content),
        language: capture(&re.language, content),
        framework: capture(&re.framework, content),
        database: capture(&re.database, content),
        deployment: capture(&re.deployment, content),
    }
}

// ---------------------------------------------------------------------------
// Git
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GitInfo {
    pub author_name: String,
    pub author_email: String,
    pub repository_url: String,
}

impl Default for GitInfo {
    fn default() -> Self {
        Self {
            author_name: NOT_SET.to_string(),
            author_email: NOT_SET.to_string(),
            repository_url: NOT_SET.to_string(),
        }
    }
}

impl GitInfo {
    pub fn has_remote(&self) -> bool {
        self.repository_url != NOT_SET
    }

    /// Last path segment of the remote URL without `.git`.
    pub fn repository_name(&self) -> Option<String> {
        if !self.has_remote() {
            return None;
        }
        let last = self.repository_url.trim_end_matches('/').rsplit(['/', ':']).next()?;
        let name = last.strip_suffix(".git").unwrap_or(last);
        (!name.is_empty()).then(|| name.to_string())
    }
}

fn git_output(root: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new("git").arg("-C").arg(root).args(args).output();
    match output {
        Ok(out) if out.status.success() => {
            let value = String::from_utf8_lossy(&out.stdout).trim().to_string();
            (!value.is_empty()).then_some(value)
        }
        Ok(out) => {
            debug!(?args, status = %out.status, "git query returned nothing");
            None
        }
        Err(e) => {
            warn!(error = %e, "could not run git");
            None
        }
    }
}

pub fn read_git_info(root: &Path) -> GitInfo {
    let defaults = GitInfo::default();
    GitInfo {
        author_name: git_output(root, &["config", "user.name"]).unwrap_or(defaults.author_name),
        author_email: git_output(root, &["config", "user.email"]).unwrap_or(defaults.author_email),
        repository_url: git_output(root, &["remote", "get-url", "origin"])
            .unwrap_or(defaults.repository_url),
    }
}

// ---------------------------------------------------------------------------
// ProjectProfile
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectKind {
    /// `PRD.md` present; the stack comes from the document.
    Planned,
    /// Source code or a manifest present; the stack is detected.
    Existing,
    Empty,
}

impl ProjectKind {
    pub fn describe(self) -> &'static str {
        match self {
            ProjectKind::Planned => "New project with PRD",
            ProjectKind::Existing => "Existing project",
            ProjectKind::Empty => "Empty project",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectProfile {
    pub kind: ProjectKind,
    pub project_name: String,
    pub ecosystem: Option<Ecosystem>,
    pub language: Option<String>,
    pub framework: Option<String>,
    pub database: Option<String>,
    pub deployment: Option<String>,
    pub commands: Commands,
    pub structure: Vec<String>,
    pub git: GitInfo,
}

pub fn has_source_code(root: &Path) -> bool {
    SOURCE_INDICATORS.iter().any(|i| root.join(i).exists())
}

pub fn project_structure(root: &Path) -> Vec<String> {
    STRUCTURE_DIRS
        .iter()
        .filter(|d| root.join(d).is_dir())
        .map(|d| d.to_string())
        .collect()
}

impl ProjectProfile {
    pub fn discover(root: &Path) -> Result<Self> {
        Self::discover_with_git(root, read_git_info(root))
    }

    pub fn discover_with_git(root: &Path, git: GitInfo) -> Result<Self> {
        let mut profile = ProjectProfile {
            kind: ProjectKind::Empty,
            project_name: String::new(),
            ecosystem: None,
            language: None,
            framework: None,
            database: None,
            deployment: None,
            commands: Commands::placeholders(),
            structure: Vec::new(),
            git,
        };

        let mut prd_name = None;
        if let Some(prd) = crate::io::read_optional(&paths::prd_path(root))? {
            let info = parse_prd(&prd);
            profile.kind = ProjectKind::Planned;
            prd_name = info.project_name;
            profile.language = info.language;
            profile.framework = info.framework;
            profile.database = info.database;
            profile.deployment = info.deployment;
        } else if has_source_code(root) {
            let stack = detect_stack(root);
            profile.kind = ProjectKind::Existing;
            profile.ecosystem = stack.descriptor.ecosystem;
            profile.language = stack.descriptor.language;
            profile.framework = stack.descriptor.framework;
            profile.commands = stack.descriptor.commands;
            profile.structure = project_structure(root);
        }

        profile.project_name = prd_name
            .or_else(|| profile.git.repository_name())
            .or_else(|| root.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "project".to_string());
        debug!(kind = ?profile.kind, name = %profile.project_name, "project discovered");
        Ok(profile)
    }

    fn or_unspecified(value: &Option<String>) -> &str {
        value.as_deref().unwrap_or(NOT_SPECIFIED)
    }

    pub fn claude_md_substitutions(&self) -> Substitutions {
        Substitutions::new()
            .with(PROJECT_NAME, self.project_name.as_str())
            .with(REPOSITORY_URL, self.git.repository_url.as_str())
            .with(AUTHOR_NAME, self.git.author_name.as_str())
            .with(EMAIL, self.git.author_email.as_str())
            .with(PRIMARY_LANGUAGE, Self::or_unspecified(&self.language))
            .with(WEB_FRAMEWORK, Self::or_unspecified(&self.framework))
            .with(DATABASE, Self::or_unspecified(&self.database))
            .with(DEPLOYMENT_PLATFORM, Self::or_unspecified(&self.deployment))
            .with_commands(&self.commands)
    }

    pub fn apply_to_claude_md(&self, content: &str) -> String {
        self.claude_md_substitutions().apply(content)
    }

    pub fn apply_commands(&self, content: &str) -> String {
        Substitutions::new().with_commands(&self.commands).apply(content)
    }
}

// ---------------------------------------------------------------------------
// Toolchain
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolCheck {
    pub tool: &'static str,
    pub programs: Vec<&'static str>,
    pub available: bool,
    pub hint: &'static str,
}

fn check_tool(tool: &'static str, programs: &[&'static str], hint: &'static str) -> ToolCheck {
    ToolCheck {
        tool,
        programs: programs.to_vec(),
        available: programs.iter().all(|p| which::which(p).is_ok()),
        hint,
    }
}

/// `gh` plus the programs the project language needs.
pub fn check_toolchain(language: Option<&str>) -> Vec<ToolCheck> {
    let mut checks = vec![check_tool(
        "GitHub CLI",
        &["gh"],
        "Install from: https://cli.github.com/",
    )];
    match language {
        Some("TypeScript" | "JavaScript") => {
            checks.push(check_tool("Node.js and npm", &["node", "npm"], "Please install Node.js"))
        }
        Some("Rust") => checks.push(check_tool("Rust and Cargo", &["rustc", "cargo"], "Please install Rust")),
        Some("Python") => checks.push(check_tool("Python", &["python"], "Please install Python")),
        Some("Go") => checks.push(check_tool("Go", &["go"], "Please install Go")),
        _ => {}
    }
    checks
}

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct InitReport {
    pub profile: ProjectProfile,
    pub claude_md_updated: bool,
    pub template_updated: bool,
    pub tools: Vec<ToolCheck>,
}

/// Rewrite `path` in place with `edit`. Returns `false` when the file is absent.
fn rewrite_file(path: &Path, edit: impl FnOnce(&str) -> String) -> Result<bool> {
    let Some(content) = crate::io::read_optional(path)? else {
        warn!(path = %path.display(), "file not found, skipping update");
        return Ok(false);
    };
    let updated = edit(&content);
    if updated != content {
        crate::io::atomic_write(path, updated.as_bytes())?;
        info!(path = %path.display(), "updated");
    }
    Ok(true)
}

pub fn init_project(root: &Path, template: &Path) -> Result<InitReport> {
    let profile = ProjectProfile::discover(root)?;
    init_with_profile(root, template, profile)
}

pub fn init_with_profile(root: &Path, template: &Path, profile: ProjectProfile) -> Result<InitReport> {
    let claude_md_updated =
        rewrite_file(&paths::claude_md_path(root), |c| profile.apply_to_claude_md(c))?;
    let template_updated = rewrite_file(&root.join(template), |c| profile.apply_commands(c))?;
    let tools = check_toolchain(profile.language.as_deref());
    for check in tools.iter().filter(|c| !c.available) {
        warn!(tool = check.tool, hint = check.hint, "tool not found");
    }
    Ok(InitReport {
        profile,
        claude_md_updated,
        template_updated,
        tools,
    })
}
