use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::warn;

// ---------------------------------------------------------------------------
// ExecutionMode
// ---------------------------------------------------------------------------

pub const DEFAULT_MODE: &str = "MANUAL";
pub const COPILOT_MODE: &str = "COPILOT";

/// Free-form mode name as read from `.claude/current_mode`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionMode(String);

impl Default for ExecutionMode {
    fn default() -> Self {
        Self::new(DEFAULT_MODE)
    }
}

impl ExecutionMode {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Uppercased form used in documents.
    pub fn label(&self) -> String {
        self.0.to_uppercase()
    }

    /// Exact match on the raw value.
    pub fn is_copilot(&self) -> bool {
        self.0 == COPILOT_MODE
    }

    pub fn assignment_label(&self) -> String {
        format!("{}-assignment", self.0.to_lowercase())
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read the current mode. A missing or empty file means `MANUAL`; a read
/// error is logged and also falls back to `MANUAL`.
pub fn current_mode(root: &Path) -> ExecutionMode {
    let path = paths::current_mode_path(root);
    match crate::io::read_optional(&path) {
        Ok(Some(raw)) if !raw.trim().is_empty() => ExecutionMode::new(&raw),
        Ok(_) => ExecutionMode::default(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not read current mode");
            ExecutionMode::default()
        }
    }
}

// ---------------------------------------------------------------------------
// PlannerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IssueConfig {
    /// Issue tracker CLI invoked to publish.
    pub program: String,
    /// Labels added after `task-rapid` and the mode assignment label.
    pub labels: Vec<String>,
}

impl Default for IssueConfig {
    fn default() -> Self {
        Self {
            program: "gh".to_string(),
            labels: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Task template, relative to the project root.
    pub template: PathBuf,
    /// Scratch directory for the issue body, relative to the project root.
    pub scratch_dir: PathBuf,
    pub issue: IssueConfig,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            template: PathBuf::from(paths::TASK_TEMPLATE),
            scratch_dir: PathBuf::from(paths::SCRATCH_DIR),
            issue: IssueConfig::default(),
        }
    }
}

impl PlannerConfig {
    /// Load `.claude/rapidplan.yaml`; defaults when the file is absent.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        match crate::io::read_optional(&path)? {
            Some(data) if !data.trim().is_empty() => Ok(serde_yaml::from_str(&data)?),
            _ => Ok(Self::default()),
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&paths::config_path(root), data.as_bytes())
    }

    pub fn template_path(&self, root: &Path) -> PathBuf {
        root.join(&self.template)
    }

    pub fn scratch_path(&self, root: &Path) -> PathBuf {
        root.join(&self.scratch_dir)
    }

    /// Ignore-list line covering the scratch directory, e.g. `.tmp/`.
    pub fn scratch_ignore_entry(&self) -> String {
        let dir = self.scratch_dir.to_string_lossy();
        format!("{}/", dir.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn mode_defaults_to_manual() {
        let dir = TempDir::new().unwrap();
        assert_eq!(current_mode(dir.path()).as_str(), "MANUAL");

        std::fs::create_dir_all(dir.path().join(".claude")).unwrap();
        std::fs::write(dir.path().join(".claude/current_mode"), "  \n").unwrap();
        assert_eq!(current_mode(dir.path()).as_str(), "MANUAL");
    }

    #[test]
    fn mode_is_trimmed() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".claude")).unwrap();
        std::fs::write(dir.path().join(".claude/current_mode"), "Copilot\n").unwrap();
        let mode = current_mode(dir.path());
        assert_eq!(mode.as_str(), "Copilot");
        assert_eq!(mode.label(), "COPILOT");
        assert_eq!(mode.assignment_label(), "copilot-assignment");
        assert!(!mode.is_copilot());
        assert!(ExecutionMode::new("COPILOT").is_copilot());
    }

    #[test]
    fn missing_config_is_default() {
        let dir = TempDir::new().unwrap();
        let cfg = PlannerConfig::load(dir.path()).unwrap();
        assert_eq!(cfg, PlannerConfig::default());
        assert_eq!(cfg.scratch_ignore_entry(), ".tmp/");
        assert_eq!(cfg.issue.program, "gh");
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".claude")).unwrap();
        std::fs::write(
            dir.path().join(".claude/rapidplan.yaml"),
            "issue:\n  labels: [frontend]\n",
        )
        .unwrap();
        let cfg = PlannerConfig::load(dir.path()).unwrap();
        assert_eq!(cfg.issue.labels, ["frontend"]);
        assert_eq!(cfg.issue.program, "gh");
        assert_eq!(cfg.template, PathBuf::from("docs/TASK-ISSUE-TEMP.md"));
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".claude")).unwrap();
        std::fs::write(dir.path().join(".claude/rapidplan.yaml"), "issue: [unclosed").unwrap();
        assert!(PlannerConfig::load(dir.path()).is_err());
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let mut cfg = PlannerConfig::default();
        cfg.scratch_dir = PathBuf::from("scratch");
        cfg.save(dir.path()).unwrap();
        let loaded = PlannerConfig::load(dir.path()).unwrap();
        assert_eq!(loaded.scratch_ignore_entry(), "scratch/");
    }
}
