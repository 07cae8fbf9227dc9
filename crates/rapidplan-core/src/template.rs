//! Task document synthesis.
//!
//! Two phases run over the template text:
//!
//! 1. **Scalars**: every recognized `[PLACEHOLDER]` is replaced globally.
//! 2. **Structure**: a rapid-mode banner goes in after the first heading,
//!    and the test-requirements and acceptance-criteria sections are swapped
//!    for their reduced variants. Each edit is anchored on verbatim marker
//!    text; when a marker is absent the document is left as it is.
//!
//! Text outside placeholders and marker spans is copied through unchanged.
//! Synthesis is not idempotent: feeding the output back in adds a second
//! banner under the same heading.

use crate::config::ExecutionMode;
use crate::error::{PlanError, Result};
use crate::stack::Commands;
use chrono::NaiveDate;
use std::path::Path;

// ---------------------------------------------------------------------------
// Placeholders
// ---------------------------------------------------------------------------

pub const TASK_DESCRIPTION: &str = "[TASK_DESCRIPTION]";
pub const EXECUTION_MODE: &str = "[EXECUTION_MODE]";
pub const DATE: &str = "[DATE]";
pub const ASSIGNEE: &str = "[ASSIGNEE]";
pub const PROJECT_NAME: &str = "[PROJECT_NAME]";
pub const TASK_ID: &str = "[TASK-XXX-X]";
pub const TASK_NUMBER: &str = "[TASK_NUMBER]";

pub const RAPID_TASK_ID: &str = "TASK-RAPID";
pub const RAPID_TASK_NUMBER: &str = "RAPID";

pub const COPILOT_ASSIGNEE: &str = "@copilot";
pub const DEFAULT_ASSIGNEE: &str = "Assign to developer";

/// Ordered `(token, value)` pairs applied as global literal replacements.
#[derive(Debug, Clone, Default)]
pub struct Substitutions {
    entries: Vec<(String, String)>,
}

impl Substitutions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, token: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.push((token.into(), value.into()));
        self
    }

    pub fn with_commands(mut self, commands: &Commands) -> Self {
        for (token, value) in commands.slots() {
            self.entries.push((token.to_string(), value.to_string()));
        }
        self
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(t, _)| t.as_str())
    }

    /// Apply each replacement in order over the whole document. A value that
    /// itself contains a later token is substituted by that later step.
    pub fn apply(&self, content: &str) -> String {
        self.entries
            .iter()
            .fold(content.to_string(), |doc, (token, value)| {
                doc.replace(token.as_str(), value)
            })
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// A replaceable block: from the first byte of `start` through the last byte
/// of the first `end` that follows it.
#[derive(Debug, Clone, Copy)]
pub struct Section {
    pub start: &'static str,
    pub end: &'static str,
    pub replacement: &'static str,
}

pub const TEST_REQUIREMENTS: Section = Section {
    start: "### 🧪 TEST-FIRST REQUIREMENTS (MANDATORY)",
    end: "Test Acceptance Criteria:",
    replacement: "### 🧪 TEST-FIRST REQUIREMENTS (RAPID MODE)
**Essential tests only (focus on core functionality):**
- [ ] Core function test: Main functionality works
- [ ] Basic error handling test: Edge cases covered
- [ ] Integration test: Connects properly to existing system

**Rapid Test Acceptance Criteria:**",
};

pub const ACCEPTANCE_CRITERIA: Section = Section {
    start: "### ✅ ACCEPTANCE CRITERIA (100% MANDATORY)",
    end: "- [ ] Language/typecheck passes",
    replacement: "### ✅ ACCEPTANCE CRITERIA (RAPID MODE - BASIC)
- [ ] Build command passes ([build command]) - Basic validation
- [ ] Lint command passes with critical fixes only ([lint command])
- [ ] Core tests pass ([test command]) - Essential coverage
- [ ] Basic functionality works end-to-end
- [ ] No critical errors or regressions
- [ ] Language/typecheck passes",
};

/// Byte span `[start, end)` of the first occurrence of `section` at or after `from`.
fn find_section(content: &str, section: &Section, from: usize) -> Option<(usize, usize)> {
    let start = from + content[from..].find(section.start)?;
    let body = start + section.start.len();
    let end = body + content[body..].find(section.end)? + section.end.len();
    Some((start, end))
}

/// Replace every complete occurrence of `section` with `replacement`.
/// Returns the new document and the number of spans replaced.
pub fn replace_section(content: &str, section: &Section, replacement: &str) -> (String, usize) {
    let mut out = String::with_capacity(content.len());
    let mut cursor = 0;
    let mut replaced = 0;
    while let Some((start, end)) = find_section(content, section, cursor) {
        out.push_str(&content[cursor..start]);
        out.push_str(replacement);
        cursor = end;
        replaced += 1;
    }
    out.push_str(&content[cursor..]);
    (out, replaced)
}

/// Insert `block` on its own line right after the first line starting with
/// `#`. Returns `None` when the document has no heading.
pub fn insert_after_first_heading(content: &str, block: &str) -> Option<String> {
    let mut offset = 0;
    for line in content.split('\n') {
        if line.starts_with('#') {
            let at = offset + line.len();
            let mut out = String::with_capacity(content.len() + block.len() + 1);
            out.push_str(&content[..at]);
            out.push('\n');
            out.push_str(block);
            out.push_str(&content[at..]);
            return Some(out);
        }
        offset += line.len() + 1;
    }
    None
}

pub const BANNER_HEADING: &str = "## 🚀 RAPID MODE TASK";

pub fn rapid_banner(forced: bool) -> String {
    let status = if forced {
        "- ⚠️  Forced creation (task appears complex for rapid mode)"
    } else {
        "- ✅ Verified as suitable for rapid implementation"
    };
    format!(
        "\n\n{BANNER_HEADING}
**Current Mode: RAPID PLANNING**
- Focus on speed and core functionality delivery
- Basic validation and essential testing only
- Minimal documentation overhead
{status}

---

"
    )
}

// ---------------------------------------------------------------------------
// TaskContext / synthesis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct TaskContext {
    pub description: String,
    pub mode: ExecutionMode,
    pub date: NaiveDate,
    pub forced: bool,
    pub project_name: String,
    /// Known toolchain commands; `None` leaves command slots for `init`.
    pub commands: Option<Commands>,
}

impl TaskContext {
    pub fn assignee(&self) -> &'static str {
        if self.mode.is_copilot() {
            COPILOT_ASSIGNEE
        } else {
            DEFAULT_ASSIGNEE
        }
    }

    fn command_substitutions(&self) -> Substitutions {
        match &self.commands {
            Some(c) => Substitutions::new().with_commands(c),
            None => Substitutions::new(),
        }
    }

    pub fn substitutions(&self) -> Substitutions {
        let subs = Substitutions::new()
            .with(TASK_DESCRIPTION, self.description.as_str())
            .with(EXECUTION_MODE, self.mode.label())
            .with(DATE, self.date.format("%Y-%m-%d").to_string())
            .with(ASSIGNEE, self.assignee())
            .with(PROJECT_NAME, self.project_name.as_str())
            .with(TASK_ID, RAPID_TASK_ID)
            .with(TASK_NUMBER, RAPID_TASK_NUMBER);
        match &self.commands {
            Some(c) => subs.with_commands(c),
            None => subs,
        }
    }
}

pub fn load_template(path: &Path) -> Result<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(PlanError::TemplateMissing(path.to_path_buf()))
        }
        Err(e) => Err(e.into()),
    }
}

pub fn synthesize(template: &str, ctx: &TaskContext) -> String {
    let doc = ctx.substitutions().apply(template);
    let doc = insert_after_first_heading(&doc, &rapid_banner(ctx.forced)).unwrap_or(doc);
    let (doc, _) = replace_section(&doc, &TEST_REQUIREMENTS, TEST_REQUIREMENTS.replacement);
    let acceptance = ctx
        .command_substitutions()
        .apply(ACCEPTANCE_CRITERIA.replacement);
    let (doc, _) = replace_section(&doc, &ACCEPTANCE_CRITERIA, &acceptance);
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::{Commands, RUST_COMMANDS};

    const TEMPLATE: &str = "# [TASK-XXX-X]: [TASK_DESCRIPTION]

**Mode:** [EXECUTION_MODE] | **Date:** [DATE] | **Assignee:** [ASSIGNEE]

### 🧪 TEST-FIRST REQUIREMENTS (MANDATORY)
- [ ] Unit tests for every branch
- [ ] Property tests

Test Acceptance Criteria:
- 100% coverage

### ✅ ACCEPTANCE CRITERIA (100% MANDATORY)
- [ ] Build passes ([build command])
- [ ] Docs updated
- [ ] Language/typecheck passes ([typecheck command])

Task number: [TASK_NUMBER]
";

    fn ctx(mode: &str, forced: bool, commands: Option<Commands>) -> TaskContext {
        TaskContext {
            description: "Add dark mode toggle".to_string(),
            mode: ExecutionMode::new(mode),
            date: NaiveDate::from_ymd_opt(2026, 10, 14).unwrap(),
            forced,
            project_name: "demo".to_string(),
            commands,
        }
    }

    #[test]
    fn project_name_replaced_everywhere() {
        let template = "[PROJECT_NAME] / [PROJECT_NAME]\nsee [PROJECT_NAME]\n";
        let out = synthesize(template, &ctx("MANUAL", false, None));
        assert_eq!(out.matches("[PROJECT_NAME]").count(), 0);
        assert_eq!(out.matches("demo").count(), 3);
    }

    #[test]
    fn scalars_leave_no_recognized_placeholder() {
        let c = ctx("MANUAL", false, Some(RUST_COMMANDS.into()));
        let out = synthesize(TEMPLATE, &c);
        for token in c.substitutions().tokens() {
            assert!(!out.contains(token), "{token} left in output");
        }
        assert!(out.starts_with("# TASK-RAPID: Add dark mode toggle\n"));
        assert!(out.contains("**Date:** 2026-10-14"));
        assert!(out.contains("Task number: RAPID"));
    }

    #[test]
    fn tokens_inside_the_description_are_substituted() {
        let mut c = ctx("MANUAL", false, None);
        c.description = "Show [DATE] in header".to_string();
        let out = synthesize("# [TASK_DESCRIPTION]\n", &c);
        for token in c.substitutions().tokens() {
            assert!(!out.contains(token), "{token} left in output");
        }
        assert!(out.starts_with("# Show 2026-10-14 in header\n"));
    }

    #[test]
    fn assignee_follows_mode() {
        let out = synthesize(TEMPLATE, &ctx("COPILOT", false, None));
        assert!(out.contains("**Assignee:** @copilot"));
        let out = synthesize(TEMPLATE, &ctx("manual", false, None));
        assert!(out.contains("**Mode:** MANUAL"));
        assert!(out.contains("**Assignee:** Assign to developer"));
    }

    #[test]
    fn banner_goes_under_first_heading() {
        let out = synthesize(TEMPLATE, &ctx("MANUAL", false, None));
        let expected_head = format!(
            "# TASK-RAPID: Add dark mode toggle\n{}\n\n**Mode:**",
            rapid_banner(false)
        );
        assert!(out.starts_with(&expected_head));
        assert!(out.contains("✅ Verified as suitable"));
    }

    #[test]
    fn forced_banner_mentions_override() {
        let out = synthesize(TEMPLATE, &ctx("MANUAL", true, None));
        assert!(out.contains("Forced creation (task appears complex for rapid mode)"));
    }

    #[test]
    fn missing_heading_is_silent() {
        let template = "no heading here\n[DATE]\n";
        let out = synthesize(template, &ctx("MANUAL", false, None));
        assert_eq!(out, "no heading here\n2026-10-14\n");
    }

    #[test]
    fn heading_on_last_line_without_newline() {
        let out = insert_after_first_heading("intro\n# Title", "BLOCK").unwrap();
        assert_eq!(out, "intro\n# Title\nBLOCK");
    }

    #[test]
    fn both_sections_replaced() {
        let out = synthesize(TEMPLATE, &ctx("MANUAL", false, Some(RUST_COMMANDS.into())));
        assert!(!out.contains("MANDATORY)"));
        assert!(!out.contains("Property tests"));
        assert!(out.contains("**Rapid Test Acceptance Criteria:**\n- 100% coverage"));
        assert!(out.contains("- [ ] Build command passes (cargo build --release) - Basic validation"));
        // text after the acceptance end marker survives
        assert!(out.contains("- [ ] Language/typecheck passes (cargo check)\n\nTask number: RAPID"));
    }

    #[test]
    fn unknown_commands_keep_slots_in_rapid_block() {
        let out = synthesize(TEMPLATE, &ctx("MANUAL", false, None));
        assert!(out.contains("- [ ] Build command passes ([build command])"));
    }

    #[test]
    fn absent_acceptance_marker_is_byte_identical() {
        let acceptance = "### ✅ Acceptance Criteria (100% mandatory)\n- [ ] Docs updated\n- [ ] Language/typecheck passes\n";
        let template = format!("# [TASK_DESCRIPTION]\n\n{acceptance}");
        let out = synthesize(&template, &ctx("MANUAL", false, None));
        assert!(out.ends_with(acceptance));
        assert!(out.starts_with("# Add dark mode toggle\n"));
    }

    #[test]
    fn start_without_end_marker_is_untouched() {
        let doc = "### 🧪 TEST-FIRST REQUIREMENTS (MANDATORY)\n- [ ] anything\n";
        let (out, n) = replace_section(doc, &TEST_REQUIREMENTS, "X");
        assert_eq!(n, 0);
        assert_eq!(out, doc);
    }

    #[test]
    fn every_section_occurrence_is_replaced() {
        let one = "### 🧪 TEST-FIRST REQUIREMENTS (MANDATORY)\nbody\nTest Acceptance Criteria:";
        let doc = format!("a\n{one}\nb\n{one}\nc");
        let (out, n) = replace_section(&doc, &TEST_REQUIREMENTS, "X");
        assert_eq!(n, 2);
        assert_eq!(out, "a\nX\nb\nX\nc");
    }

    #[test]
    fn second_pass_adds_another_banner() {
        let c = ctx("MANUAL", false, None);
        let once = synthesize(TEMPLATE, &c);
        let twice = synthesize(&once, &c);
        assert_eq!(once.matches(BANNER_HEADING).count(), 1);
        assert_eq!(twice.matches(BANNER_HEADING).count(), 2);
        assert_ne!(once, twice);
    }

    #[test]
    fn missing_template_is_reported() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = load_template(&dir.path().join("docs/TASK-ISSUE-TEMP.md")).unwrap_err();
        assert!(matches!(err, PlanError::TemplateMissing(_)));
    }
}
