//! Technology stack detection from ecosystem manifests.
//!
//! Detection walks a fixed, ordered list of [`EcosystemDetector`]s and stops
//! at the first whose predicate holds. The winning detector alone decides the
//! ecosystem, so a project carrying both `package.json` and `Cargo.toml` is a
//! Node project. Manifest read or parse failures never abort detection: they
//! are logged and the dependency set comes back empty.

use crate::error::{PlanError, Result};
use crate::paths;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// Ecosystem
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ecosystem {
    Node,
    Rust,
    Python,
    Go,
}

impl Ecosystem {
    pub fn as_str(self) -> &'static str {
        match self {
            Ecosystem::Node => "node",
            Ecosystem::Rust => "rust",
            Ecosystem::Python => "python",
            Ecosystem::Go => "go",
        }
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

pub const BUILD_PLACEHOLDER: &str = "[build command]";
pub const LINT_PLACEHOLDER: &str = "[lint command]";
pub const FORMAT_PLACEHOLDER: &str = "[format command]";
pub const TEST_PLACEHOLDER: &str = "[test command]";
pub const TYPECHECK_PLACEHOLDER: &str = "[typecheck command]";

/// Static command table for one toolchain.
#[derive(Debug, Clone, Copy)]
pub struct CommandTable {
    pub build: &'static str,
    pub lint: &'static str,
    pub format: &'static str,
    pub test: &'static str,
    pub typecheck: &'static str,
}

pub const NODE_COMMANDS: CommandTable = CommandTable {
    build: "npm run build",
    lint: "npm run lint",
    format: "prettier --check .",
    test: "npm test",
    typecheck: "tsc --noEmit",
};

pub const RUST_COMMANDS: CommandTable = CommandTable {
    build: "cargo build --release",
    lint: "cargo clippy --all-targets --all-features",
    format: "cargo fmt -- --check",
    test: "cargo test",
    typecheck: "cargo check",
};

pub const PYTHON_COMMANDS: CommandTable = CommandTable {
    build: "python -m build",
    lint: "ruff check",
    format: "black --check .",
    test: "pytest",
    typecheck: "mypy",
};

/// Overrides [`PYTHON_COMMANDS`] when `pyproject.toml` declares Poetry.
pub const POETRY_COMMANDS: CommandTable = CommandTable {
    build: "poetry build",
    lint: "poetry run ruff check",
    format: "poetry run black --check .",
    test: "poetry run pytest",
    typecheck: "poetry run mypy",
};

pub const GO_COMMANDS: CommandTable = CommandTable {
    build: "go build ./...",
    lint: "golangci-lint run",
    format: "gofmt -d .",
    test: "go test ./...",
    typecheck: "go vet ./...",
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commands {
    pub build: String,
    pub lint: String,
    pub format: String,
    pub test: String,
    pub typecheck: String,
}

impl Commands {
    /// Commands for a project whose ecosystem is unknown: the literal template slots.
    pub fn placeholders() -> Self {
        Self {
            build: BUILD_PLACEHOLDER.to_string(),
            lint: LINT_PLACEHOLDER.to_string(),
            format: FORMAT_PLACEHOLDER.to_string(),
            test: TEST_PLACEHOLDER.to_string(),
            typecheck: TYPECHECK_PLACEHOLDER.to_string(),
        }
    }

    /// `(placeholder, command)` pairs in template order.
    pub fn slots(&self) -> [(&'static str, &str); 5] {
        [
            (BUILD_PLACEHOLDER, self.build.as_str()),
            (LINT_PLACEHOLDER, self.lint.as_str()),
            (FORMAT_PLACEHOLDER, self.format.as_str()),
            (TEST_PLACEHOLDER, self.test.as_str()),
            (TYPECHECK_PLACEHOLDER, self.typecheck.as_str()),
        ]
    }
}

impl From<CommandTable> for Commands {
    fn from(t: CommandTable) -> Self {
        Self {
            build: t.build.to_string(),
            lint: t.lint.to_string(),
            format: t.format.to_string(),
            test: t.test.to_string(),
            typecheck: t.typecheck.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// DependencySet
// ---------------------------------------------------------------------------

/// Declared packages in insertion order. Production entries go in first and
/// are never overwritten by a development entry with the same name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencySet {
    entries: Vec<(String, String)>,
}

impl DependencySet {
    pub fn merge<P, D>(production: P, development: D) -> Self
    where
        P: IntoIterator<Item = (String, String)>,
        D: IntoIterator<Item = (String, String)>,
    {
        let mut set = Self::default();
        for (name, version) in production.into_iter().chain(development) {
            set.insert(name, version);
        }
        set
    }

    /// Insert unless the name is already present. Returns whether it was added.
    pub fn insert(&mut self, name: impl Into<String>, version: impl Into<String>) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.entries.push((name, version.into()));
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn version(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Split `required` into packages that are declared and packages that are not.
    pub fn check(&self, required: &[&str]) -> DependencyCheck {
        let mut check = DependencyCheck::default();
        for pkg in required {
            if self.contains(pkg) {
                check.available.push(pkg.to_string());
            } else {
                check.missing.push(pkg.to_string());
                check.requires_install.push(pkg.to_string());
            }
        }
        check
    }
}

impl Serialize for DependencySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, version) in &self.entries {
            map.serialize_entry(name, version)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependencyCheck {
    pub available: Vec<String>,
    pub missing: Vec<String>,
    pub requires_install: Vec<String>,
}

// ---------------------------------------------------------------------------
// ManifestDescriptor / DetectedStack
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestDescriptor {
    pub ecosystem: Option<Ecosystem>,
    pub language: Option<String>,
    pub framework: Option<String>,
    pub commands: Commands,
}

impl Default for ManifestDescriptor {
    fn default() -> Self {
        Self {
            ecosystem: None,
            language: None,
            framework: None,
            commands: Commands::placeholders(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DetectedStack {
    pub descriptor: ManifestDescriptor,
    pub dependencies: DependencySet,
}

impl DetectedStack {
    /// Commands worth substituting into documents. `None` when no ecosystem was found.
    pub fn known_commands(&self) -> Option<&Commands> {
        self.descriptor.ecosystem.map(|_| &self.descriptor.commands)
    }
}

// ---------------------------------------------------------------------------
// Detectors
// ---------------------------------------------------------------------------

/// One entry of the priority list: a predicate deciding whether the project
/// belongs to this ecosystem and the extractor that describes it.
pub struct EcosystemDetector {
    pub ecosystem: Ecosystem,
    pub predicate: fn(&Path) -> bool,
    pub extract: fn(&Path) -> DetectedStack,
}

/// Ecosystems in detection priority order.
pub fn default_detectors() -> Vec<EcosystemDetector> {
    vec![
        EcosystemDetector {
            ecosystem: Ecosystem::Node,
            predicate: |root| root.join(paths::PACKAGE_JSON).is_file(),
            extract: extract_node,
        },
        EcosystemDetector {
            ecosystem: Ecosystem::Rust,
            predicate: |root| root.join(paths::CARGO_TOML).is_file(),
            extract: extract_rust,
        },
        EcosystemDetector {
            ecosystem: Ecosystem::Python,
            predicate: |root| {
                root.join(paths::REQUIREMENTS_TXT).is_file()
                    || root.join(paths::PYPROJECT_TOML).is_file()
            },
            extract: extract_python,
        },
        EcosystemDetector {
            ecosystem: Ecosystem::Go,
            predicate: |root| root.join(paths::GO_MOD).is_file(),
            extract: extract_go,
        },
    ]
}

pub struct StackDetector {
    detectors: Vec<EcosystemDetector>,
}

impl Default for StackDetector {
    fn default() -> Self {
        Self::new(default_detectors())
    }
}

impl StackDetector {
    pub fn new(detectors: Vec<EcosystemDetector>) -> Self {
        Self { detectors }
    }

    pub fn detect(&self, root: &Path) -> DetectedStack {
        for detector in &self.detectors {
            if (detector.predicate)(root) {
                debug!(ecosystem = %detector.ecosystem, "manifest found");
                return (detector.extract)(root);
            }
        }
        debug!(root = %root.display(), "no known manifest, using defaults");
        DetectedStack::default()
    }
}

/// Detect with the default priority list.
pub fn detect_stack(root: &Path) -> DetectedStack {
    StackDetector::default().detect(root)
}

// ---------------------------------------------------------------------------
// Framework candidates (order is significant: first present key wins)
// ---------------------------------------------------------------------------

pub const NODE_FRAMEWORKS: &[(&str, &str)] = &[
    ("react", "React"),
    ("next", "Next.js"),
    ("express", "Express"),
    ("fastify", "Fastify"),
    ("vue", "Vue"),
];

pub const RUST_FRAMEWORKS: &[(&str, &str)] = &[
    ("actix-web", "Actix-web"),
    ("rocket", "Rocket"),
    ("axum", "Axum"),
    ("tokio", "Tokio"),
];

pub const PYTHON_FRAMEWORKS: &[(&str, &str)] = &[
    ("fastapi", "FastAPI"),
    ("django", "Django"),
    ("flask", "Flask"),
];

/// Matched by module path prefix so major-version suffixes (`/v4`) still count.
pub const GO_FRAMEWORKS: &[(&str, &str)] = &[
    ("github.com/gin-gonic/gin", "Gin"),
    ("github.com/labstack/echo", "Echo"),
    ("github.com/gofiber/fiber", "Fiber"),
];

fn first_framework(deps: &DependencySet, candidates: &[(&str, &str)]) -> Option<String> {
    candidates
        .iter()
        .find(|(key, _)| deps.contains(key))
        .map(|(_, name)| name.to_string())
}

fn or_warn(result: Result<DependencySet>) -> DependencySet {
    result.unwrap_or_else(|e| {
        warn!(error = %e, "continuing with an empty dependency set");
        DependencySet::default()
    })
}

fn read_manifest(root: &Path, name: &str) -> Result<String> {
    let path = paths::manifest_path(root, name);
    std::fs::read_to_string(&path).map_err(|e| PlanError::ManifestUnreadable {
        path,
        reason: e.to_string(),
    })
}

fn malformed(root: &Path, name: &str, reason: impl ToString) -> PlanError {
    PlanError::ManifestMalformed {
        path: paths::manifest_path(root, name),
        reason: reason.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

type JsonDeps = serde_json::Map<String, serde_json::Value>;

/// Groups keep manifest order; an absent or `null` group is empty.
#[derive(Debug, Default, Deserialize)]
struct PackageJson {
    #[serde(default)]
    dependencies: Option<JsonDeps>,
    #[serde(default, rename = "devDependencies")]
    dev_dependencies: Option<JsonDeps>,
}

fn json_version(v: serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

pub fn read_package_json(root: &Path) -> Result<DependencySet> {
    let raw = read_manifest(root, paths::PACKAGE_JSON)?;
    let pkg: PackageJson =
        serde_json::from_str(&raw).map_err(|e| malformed(root, paths::PACKAGE_JSON, e))?;
    Ok(DependencySet::merge(
        pkg.dependencies
            .unwrap_or_default()
            .into_iter()
            .map(|(k, v)| (k, json_version(v))),
        pkg.dev_dependencies
            .unwrap_or_default()
            .into_iter()
            .map(|(k, v)| (k, json_version(v))),
    ))
}

fn extract_node(root: &Path) -> DetectedStack {
    let dependencies = or_warn(read_package_json(root));
    let language = if dependencies.contains("typescript") {
        "TypeScript"
    } else {
        "JavaScript"
    };
    DetectedStack {
        descriptor: ManifestDescriptor {
            ecosystem: Some(Ecosystem::Node),
            language: Some(language.to_string()),
            framework: first_framework(&dependencies, NODE_FRAMEWORKS),
            commands: NODE_COMMANDS.into(),
        },
        dependencies,
    }
}

// ---------------------------------------------------------------------------
// Rust
// ---------------------------------------------------------------------------

fn toml_version(v: &toml::Value) -> String {
    match v {
        toml::Value::String(s) => s.clone(),
        toml::Value::Table(t) => t
            .get("version")
            .and_then(|v| v.as_str())
            .unwrap_or("*")
            .to_string(),
        _ => "*".to_string(),
    }
}

fn toml_table_entries(table: Option<&toml::Value>) -> Vec<(String, String)> {
    table
        .and_then(|v| v.as_table())
        .map(|t| t.iter().map(|(k, v)| (k.clone(), toml_version(v))).collect())
        .unwrap_or_default()
}

pub fn read_cargo_toml(root: &Path) -> Result<DependencySet> {
    let raw = read_manifest(root, paths::CARGO_TOML)?;
    let doc: toml::Table =
        toml::from_str(&raw).map_err(|e| malformed(root, paths::CARGO_TOML, e))?;
    let mut production = toml_table_entries(doc.get("dependencies"));
    production.extend(toml_table_entries(
        doc.get("workspace").and_then(|w| w.get("dependencies")),
    ));
    Ok(DependencySet::merge(
        production,
        toml_table_entries(doc.get("dev-dependencies")),
    ))
}

fn extract_rust(root: &Path) -> DetectedStack {
    let dependencies = or_warn(read_cargo_toml(root));
    DetectedStack {
        descriptor: ManifestDescriptor {
            ecosystem: Some(Ecosystem::Rust),
            language: Some("Rust".to_string()),
            framework: first_framework(&dependencies, RUST_FRAMEWORKS),
            commands: RUST_COMMANDS.into(),
        },
        dependencies,
    }
}

// ---------------------------------------------------------------------------
// Python
// ---------------------------------------------------------------------------

/// Split a PEP 508 requirement (`fastapi[all]>=0.100; python_version>"3.8"`)
/// into a lowercase name and the remaining version spec.
fn parse_requirement(line: &str) -> Option<(String, String)> {
    let line = line.split('#').next().unwrap_or("").trim();
    if line.is_empty() || line.starts_with('-') {
        return None;
    }
    let end = line
        .find(|c: char| matches!(c, '=' | '<' | '>' | '!' | '~' | '[' | ';' | '@' | ' '))
        .unwrap_or(line.len());
    let name = line[..end].trim().to_lowercase();
    if name.is_empty() {
        return None;
    }
    let rest = line[end..].split(';').next().unwrap_or("");
    let version = match rest.rfind(']') {
        Some(i) => &rest[i + 1..],
        None => rest,
    }
    .trim();
    let version = if version.is_empty() { "*" } else { version };
    Some((name, version.to_string()))
}

pub fn read_requirements_txt(root: &Path) -> Result<Vec<(String, String)>> {
    let raw = read_manifest(root, paths::REQUIREMENTS_TXT)?;
    Ok(raw.lines().filter_map(parse_requirement).collect())
}

#[derive(Debug, Default)]
pub struct PyProject {
    pub production: Vec<(String, String)>,
    pub development: Vec<(String, String)>,
    pub uses_poetry: bool,
}

fn requirement_array(v: Option<&toml::Value>) -> Vec<(String, String)> {
    v.and_then(|v| v.as_array())
        .map(|a| {
            a.iter()
                .filter_map(|s| s.as_str())
                .filter_map(parse_requirement)
                .collect()
        })
        .unwrap_or_default()
}

fn lowercase_names(entries: Vec<(String, String)>) -> impl Iterator<Item = (String, String)> {
    entries
        .into_iter()
        .filter(|(k, _)| k != "python")
        .map(|(k, v)| (k.to_lowercase(), v))
}

pub fn read_pyproject(root: &Path) -> Result<PyProject> {
    let raw = read_manifest(root, paths::PYPROJECT_TOML)?;
    let doc: toml::Table =
        toml::from_str(&raw).map_err(|e| malformed(root, paths::PYPROJECT_TOML, e))?;

    let mut py = PyProject::default();
    let project = doc.get("project");
    py.production
        .extend(requirement_array(project.and_then(|p| p.get("dependencies"))));
    if let Some(optional) = project
        .and_then(|p| p.get("optional-dependencies"))
        .and_then(|o| o.as_table())
    {
        for group in optional.values() {
            py.development.extend(requirement_array(Some(group)));
        }
    }

    let poetry = doc.get("tool").and_then(|t| t.get("poetry"));
    let backend_is_poetry = doc
        .get("build-system")
        .and_then(|b| b.get("build-backend"))
        .and_then(|b| b.as_str())
        .is_some_and(|b| b.contains("poetry"));
    py.uses_poetry = poetry.is_some() || backend_is_poetry;

    if let Some(poetry) = poetry {
        py.production
            .extend(lowercase_names(toml_table_entries(poetry.get("dependencies"))));
        py.development.extend(lowercase_names(toml_table_entries(
            poetry.get("dev-dependencies"),
        )));
        if let Some(groups) = poetry.get("group").and_then(|g| g.as_table()) {
            for group in groups.values() {
                py.development
                    .extend(lowercase_names(toml_table_entries(group.get("dependencies"))));
            }
        }
    }
    Ok(py)
}

fn extract_python(root: &Path) -> DetectedStack {
    let mut production = Vec::new();
    let mut development = Vec::new();
    let mut commands = PYTHON_COMMANDS;

    if root.join(paths::REQUIREMENTS_TXT).is_file() {
        match read_requirements_txt(root) {
            Ok(reqs) => production.extend(reqs),
            Err(e) => warn!(error = %e, "ignoring requirements.txt"),
        }
    }
    if root.join(paths::PYPROJECT_TOML).is_file() {
        match read_pyproject(root) {
            Ok(py) => {
                if py.uses_poetry {
                    commands = POETRY_COMMANDS;
                }
                production.extend(py.production);
                development.extend(py.development);
            }
            Err(e) => warn!(error = %e, "ignoring pyproject.toml"),
        }
    }

    let dependencies = DependencySet::merge(production, development);
    DetectedStack {
        descriptor: ManifestDescriptor {
            ecosystem: Some(Ecosystem::Python),
            language: Some("Python".to_string()),
            framework: first_framework(&dependencies, PYTHON_FRAMEWORKS),
            commands: commands.into(),
        },
        dependencies,
    }
}

// ---------------------------------------------------------------------------
// Go
// ---------------------------------------------------------------------------

fn parse_go_require(line: &str) -> Option<(String, String)> {
    let line = line.split("//").next().unwrap_or("").trim();
    let mut parts = line.split_whitespace();
    let module = parts.next()?;
    let version = parts.next().unwrap_or("*");
    Some((module.to_string(), version.to_string()))
}

pub fn read_go_mod(root: &Path) -> Result<DependencySet> {
    let raw = read_manifest(root, paths::GO_MOD)?;
    let mut deps = DependencySet::default();
    let mut in_block = false;
    for line in raw.lines() {
        let trimmed = line.trim();
        if in_block {
            if trimmed.starts_with(')') {
                in_block = false;
            } else if let Some((m, v)) = parse_go_require(trimmed) {
                deps.insert(m, v);
            }
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("require") {
            let rest = rest.trim();
            if rest.starts_with('(') {
                in_block = true;
            } else if let Some((m, v)) = parse_go_require(rest) {
                deps.insert(m, v);
            }
        }
    }
    if in_block {
        return Err(malformed(root, paths::GO_MOD, "unterminated require block"));
    }
    Ok(deps)
}

fn extract_go(root: &Path) -> DetectedStack {
    let dependencies = or_warn(read_go_mod(root));
    let framework = GO_FRAMEWORKS
        .iter()
        .find(|(prefix, _)| dependencies.names().any(|m| m.starts_with(prefix)))
        .map(|(_, name)| name.to_string());
    DetectedStack {
        descriptor: ManifestDescriptor {
            ecosystem: Some(Ecosystem::Go),
            language: Some("Go".to_string()),
            framework,
            commands: GO_COMMANDS.into(),
        },
        dependencies,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
