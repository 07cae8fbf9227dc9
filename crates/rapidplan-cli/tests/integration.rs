#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

const TEMPLATE: &str = "# TASK-[TASK_NUMBER]: [TASK_DESCRIPTION]

**Mode:** [EXECUTION_MODE]
**Created:** [DATE]
**Assignee:** [ASSIGNEE]

### 🧪 TEST-FIRST REQUIREMENTS (MANDATORY)
- [ ] Unit tests for every branch
- [ ] Property tests
Test Acceptance Criteria:
- [ ] 100% coverage

### ✅ ACCEPTANCE CRITERIA (100% MANDATORY)
- [ ] Build passes ([build command])
- [ ] Language/typecheck passes
";

fn rapidplan(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("rapidplan").unwrap();
    cmd.current_dir(dir.path())
        .env("RAPIDPLAN_ROOT", dir.path())
        .env_remove("RUST_LOG");
    cmd
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn project_with_template() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "docs/TASK-ISSUE-TEMP.md", TEMPLATE);
    dir
}

// ---------------------------------------------------------------------------
// rapidplan triage
// ---------------------------------------------------------------------------

#[test]
fn triage_flags_security_work() {
    let dir = TempDir::new().unwrap();
    rapidplan(&dir)
        .args(["triage", "Add authentication to login form"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "complex: Security-critical features need detailed planning",
        ));
}

#[test]
fn triage_json_for_simple_task() {
    let dir = TempDir::new().unwrap();
    let out = rapidplan(&dir)
        .args(["--json", "triage", "Fix footer spacing"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["is_complex"], false);
    assert!(v["reason"].is_null());
}

// ---------------------------------------------------------------------------
// rapidplan rapid
// ---------------------------------------------------------------------------

#[test]
fn rapid_rejects_complex_task() {
    let dir = project_with_template();
    rapidplan(&dir)
        .args(["rapid", "Add a payment checkout page"])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("Task too complex for rapid mode"))
        .stdout(predicate::str::contains("--force"));
    assert!(!dir.path().join(".tmp").exists());
}

#[test]
fn rapid_fails_without_template() {
    let dir = TempDir::new().unwrap();
    rapidplan(&dir)
        .args(["rapid", "Add dark mode toggle", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("TASK-ISSUE-TEMP.md not found"));
}

#[test]
fn rapid_dry_run_prints_rapid_document() {
    let dir = project_with_template();
    write(dir.path(), "package.json", r#"{"dependencies": {"next": "14"}}"#);

    rapidplan(&dir)
        .args(["rapid", "Add dark mode toggle", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("title:  [TASK-RAPID] Add dark mode toggle"))
        .stdout(predicate::str::contains("labels: task-rapid, manual-assignment"))
        .stdout(predicate::str::contains("# TASK-RAPID: Add dark mode toggle"))
        .stdout(predicate::str::contains("## 🚀 RAPID MODE TASK"))
        .stdout(predicate::str::contains("TEST-FIRST REQUIREMENTS (RAPID MODE)"))
        .stdout(predicate::str::contains("Build command passes (npm run build)"))
        .stdout(predicate::str::contains("Property tests").not());
    assert!(!dir.path().join(".tmp").exists());
    assert!(!dir.path().join(".gitignore").exists());
}

#[test]
fn rapid_dry_run_reads_current_mode() {
    let dir = project_with_template();
    write(dir.path(), ".claude/current_mode", "COPILOT\n");
    let out = rapidplan(&dir)
        .args(["--json", "rapid", "Add dark mode toggle", "--dry-run"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["status"], "drafted");
    assert_eq!(v["draft"]["labels"][1], "copilot-assignment");
    assert!(v["draft"]["body"].as_str().unwrap().contains("@copilot"));
}

#[test]
fn forced_dry_run_is_marked() {
    let dir = project_with_template();
    rapidplan(&dir)
        .args(["rapid", "Add JWT refresh", "--force", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Forced creation"));
}

#[cfg(unix)]
#[test]
fn rapid_publishes_and_cleans_up() {
    let dir = project_with_template();
    write(dir.path(), ".claude/rapidplan.yaml", "issue:\n  program: echo\n");
    write(dir.path(), ".gitignore", "node_modules/");

    rapidplan(&dir)
        .args(["rapid", "Add dark mode toggle"])
        .assert()
        .success()
        .stdout(predicate::str::contains("created: [TASK-RAPID] Add dark mode toggle"));

    assert!(!dir.path().join(".tmp/rapid-task-content.md").exists());
    let gitignore = std::fs::read_to_string(dir.path().join(".gitignore")).unwrap();
    assert_eq!(gitignore, "node_modules/\n.tmp/\n");

    // A second run leaves the ignore list alone.
    rapidplan(&dir)
        .args(["rapid", "Add dark mode toggle"])
        .assert()
        .success();
    let again = std::fs::read_to_string(dir.path().join(".gitignore")).unwrap();
    assert_eq!(again, gitignore);
}

#[cfg(unix)]
#[test]
fn rapid_publish_failure_exits_nonzero() {
    let dir = project_with_template();
    write(dir.path(), ".claude/rapidplan.yaml", "issue:\n  program: \"false\"\n");

    rapidplan(&dir)
        .args(["rapid", "Add dark mode toggle"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to create issue"));
    assert!(!dir.path().join(".tmp/rapid-task-content.md").exists());
}

// ---------------------------------------------------------------------------
// rapidplan analyze / validate / deps
// ---------------------------------------------------------------------------

#[test]
fn analyze_json_reports_stack() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "package.json",
        r#"{"dependencies": {"next": "14", "zod": "^3"}, "devDependencies": {"typescript": "^5"}}"#,
    );
    write(dir.path(), "src/app/api/users/route.ts", "");
    write(dir.path(), "src/components/Button/Button.tsx", "");

    let out = rapidplan(&dir).args(["--json", "analyze"]).output().unwrap();
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["summary"]["framework"], "Next.js");
    assert_eq!(v["summary"]["language"], "TypeScript");
    assert_eq!(v["summary"]["api_endpoints"][0], "users");
    assert_eq!(v["summary"]["existing_components"][0], "Button");
    let patterns = v["summary"]["patterns"].as_array().unwrap();
    assert!(patterns.contains(&serde_json::json!("api-routes")));
    assert!(patterns.contains(&serde_json::json!("zod-validation")));
}

#[test]
fn analyze_empty_project_uses_placeholders() {
    let dir = TempDir::new().unwrap();
    rapidplan(&dir)
        .arg("analyze")
        .assert()
        .success()
        .stdout(predicate::str::contains("Ecosystem:  -"))
        .stdout(predicate::str::contains("[build command]"));
}

#[test]
fn validate_database_work_without_orm() {
    let dir = TempDir::new().unwrap();
    rapidplan(&dir)
        .args(["validate", "add a database migration for users"])
        .assert()
        .success()
        .stdout(predicate::str::contains("realistic: no"))
        .stdout(predicate::str::contains("Database ORM (Prisma)"));
}

#[test]
fn deps_splits_available_and_missing() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "package.json",
        r#"{"dependencies": {"react": "18"}, "devDependencies": {"jest": "29"}}"#,
    );
    let out = rapidplan(&dir)
        .args(["--json", "deps", "react", "jest", "zod"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["available"], serde_json::json!(["react", "jest"]));
    assert_eq!(v["missing"], serde_json::json!(["zod"]));
    assert_eq!(v["requires_install"], serde_json::json!(["zod"]));
}

// ---------------------------------------------------------------------------
// rapidplan init
// ---------------------------------------------------------------------------

#[test]
fn init_fills_claude_md_from_prd() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "PRD.md",
        "## Project Name: Orbit\n\n## Technology Stack\n**Language**: Rust\n**Database**: SQLite\n",
    );
    write(
        dir.path(),
        "CLAUDE.md",
        "# [PROJECT_NAME]\n- Language: [PRIMARY_LANGUAGE]\n- Database: [DATABASE]\n",
    );

    rapidplan(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Project type: New project with PRD"))
        .stdout(predicate::str::contains("updated: CLAUDE.md"));

    let claude = std::fs::read_to_string(dir.path().join("CLAUDE.md")).unwrap();
    assert_eq!(claude, "# Orbit\n- Language: Rust\n- Database: SQLite\n");
}

#[test]
fn init_without_documents_still_succeeds() {
    let dir = TempDir::new().unwrap();
    rapidplan(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("missing: CLAUDE.md"));
}
