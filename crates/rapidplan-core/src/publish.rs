//! Issue tracker boundary.
//!
//! The planner hands a title, labels and a body file to an [`IssuePublisher`].
//! The default adapter shells out to `gh issue create`; the only coupling to
//! its output is the issue URL pattern.

use crate::error::{PlanError, Result};
use regex::Regex;
use std::path::Path;
use std::process::Command;
use std::sync::OnceLock;
use tracing::debug;

pub trait IssuePublisher {
    /// Create an issue. `Ok(None)` means the tracker accepted the issue but
    /// reported no recognizable locator.
    fn publish(&self, title: &str, labels: &[String], body_file: &Path) -> Result<Option<String>>;
}

fn issue_url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"https://github\.com/[^/\s]+/[^/\s]+/issues/\d+").expect("valid issue URL regex")
    })
}

/// First GitHub issue URL in `text`, if any.
pub fn extract_issue_url(text: &str) -> Option<String> {
    issue_url_re().find(text).map(|m| m.as_str().to_string())
}

// ---------------------------------------------------------------------------
// GhCliPublisher
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GhCliPublisher {
    program: String,
}

impl Default for GhCliPublisher {
    fn default() -> Self {
        Self::new("gh")
    }
}

impl GhCliPublisher {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn args(title: &str, labels: &[String], body_file: &Path) -> Vec<String> {
        let mut args = vec![
            "issue".to_string(),
            "create".to_string(),
            "--title".to_string(),
            title.to_string(),
        ];
        for label in labels {
            args.push("--label".to_string());
            args.push(label.clone());
        }
        args.push("--body-file".to_string());
        args.push(body_file.to_string_lossy().into_owned());
        args
    }
}

impl IssuePublisher for GhCliPublisher {
    fn publish(&self, title: &str, labels: &[String], body_file: &Path) -> Result<Option<String>> {
        let program = which::which(&self.program)
            .map_err(|_| PlanError::PublisherNotFound(self.program.clone()))?;
        let args = Self::args(title, labels, body_file);
        debug!(program = %program.display(), ?args, "creating issue");

        let output = Command::new(&program)
            .args(&args)
            .output()
            .map_err(|e| PlanError::Publish(format!("could not run {}: {e}", self.program)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let reason = if stderr.is_empty() {
                format!("{} exited with {}", self.program, output.status)
            } else {
                stderr
            };
            return Err(PlanError::Publish(reason));
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(extract_issue_url(&stdout))
    }
}
