//! The rapid task pipeline.
//!
//! triage → analysis → synthesis → publish → cleanup, strictly in order.
//! Cleanup of the scratch body file runs whether or not publishing worked.

use crate::config::{current_mode, ExecutionMode, PlannerConfig};
use crate::error::Result;
use crate::paths;
use crate::publish::IssuePublisher;
use crate::summary::analyze;
use crate::template::{load_template, synthesize, TaskContext};
use crate::triage::{ComplexityVerdict, TriagePolicy};
use chrono::NaiveDate;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const TITLE_PREFIX: &str = "[TASK-RAPID]";
pub const RAPID_LABEL: &str = "task-rapid";

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// Result of triage plus synthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Triaged {
    Rejected(ComplexityVerdict),
    Ready(TaskDraft),
}

/// A synthesized issue that has not been published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskDraft {
    pub verdict: ComplexityVerdict,
    pub forced: bool,
    pub title: String,
    pub labels: Vec<String>,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlanOutcome {
    /// Complex task without override; nothing was written or published.
    Rejected { verdict: ComplexityVerdict },
    /// Synthesized without publishing.
    Drafted { draft: TaskDraft },
    Created {
        verdict: ComplexityVerdict,
        forced: bool,
        title: String,
        locator: Option<String>,
    },
}

pub fn issue_title(description: &str) -> String {
    format!("{TITLE_PREFIX} {description}")
}

/// `task-rapid`, the mode assignment label, then configured extras.
pub fn issue_labels(mode: &ExecutionMode, extra: &[String]) -> Vec<String> {
    let mut labels = vec![RAPID_LABEL.to_string(), mode.assignment_label()];
    for label in extra {
        if !labels.contains(label) {
            labels.push(label.clone());
        }
    }
    labels
}

// ---------------------------------------------------------------------------
// RapidPlanner
// ---------------------------------------------------------------------------

pub struct RapidPlanner<'a, P: IssuePublisher> {
    root: &'a Path,
    config: PlannerConfig,
    policy: TriagePolicy,
    publisher: P,
    mode: ExecutionMode,
    date: NaiveDate,
}

impl<'a, P: IssuePublisher> RapidPlanner<'a, P> {
    pub fn new(root: &'a Path, config: PlannerConfig, publisher: P) -> Self {
        Self {
            root,
            config,
            policy: TriagePolicy::default(),
            publisher,
            mode: current_mode(root),
            date: chrono::Local::now().date_naive(),
        }
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    /// Directory name of the root, resolved first so `.` still has a name.
    fn project_name(&self) -> String {
        let resolved = std::fs::canonicalize(self.root).unwrap_or_else(|e| {
            warn!(root = %self.root.display(), error = %e, "could not resolve project root");
            self.root.to_path_buf()
        });
        resolved
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string())
    }

    /// Triage and synthesize. A complex task without `force` stops at triage.
    pub fn draft(&self, description: &str, force: bool) -> Result<Triaged> {
        let verdict = self.policy.triage(description);
        if verdict.is_complex && !force {
            info!(reason = ?verdict.reason, "task rejected for rapid mode");
            return Ok(Triaged::Rejected(verdict));
        }
        let forced = verdict.is_complex && force;

        let analysis = analyze(self.root);
        let template = load_template(&self.config.template_path(self.root))?;
        let ctx = TaskContext {
            description: description.to_string(),
            mode: self.mode.clone(),
            date: self.date,
            forced,
            project_name: self.project_name(),
            commands: analysis.stack.known_commands().cloned(),
        };
        let body = synthesize(&template, &ctx);

        Ok(Triaged::Ready(TaskDraft {
            verdict,
            forced,
            title: issue_title(description),
            labels: issue_labels(&self.mode, &self.config.issue.labels),
            body,
        }))
    }

    /// Synthesize only; no files are written.
    pub fn dry_run(&self, description: &str, force: bool) -> Result<PlanOutcome> {
        Ok(match self.draft(description, force)? {
            Triaged::Ready(draft) => PlanOutcome::Drafted { draft },
            Triaged::Rejected(verdict) => PlanOutcome::Rejected { verdict },
        })
    }

    /// Full pipeline: synthesize, publish through the scratch file, clean up.
    pub fn run(&self, description: &str, force: bool) -> Result<PlanOutcome> {
        let draft = match self.draft(description, force)? {
            Triaged::Ready(draft) => draft,
            Triaged::Rejected(verdict) => return Ok(PlanOutcome::Rejected { verdict }),
        };

        let body_file = self.prepare_scratch()?;
        let published = crate::io::atomic_write(&body_file, draft.body.as_bytes())
            .and_then(|()| self.publisher.publish(&draft.title, &draft.labels, &body_file));
        remove_scratch(&body_file);
        let locator = published?;

        match &locator {
            Some(url) => info!(url = %url, "issue created"),
            None => warn!("issue created but no URL was reported"),
        }
        Ok(PlanOutcome::Created {
            verdict: draft.verdict,
            forced: draft.forced,
            title: draft.title,
            locator,
        })
    }

    /// Create the scratch directory and keep it out of version control.
    fn prepare_scratch(&self) -> Result<PathBuf> {
        let dir = self.config.scratch_path(self.root);
        crate::io::ensure_dir(&dir)?;
        if crate::io::ensure_gitignore_entry(self.root, &self.config.scratch_ignore_entry())? {
            info!(entry = %self.config.scratch_ignore_entry(), "added scratch directory to .gitignore");
        }
        Ok(dir.join(paths::RAPID_TASK_FILE))
    }
}

fn remove_scratch(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "could not remove scratch file"),
    }
}
