//! Architectural pattern scan over the source tree.
//!
//! Every check is independent and best-effort: an unreadable directory is
//! logged and the corresponding flag is simply left unset.

use crate::error::PlanError;
use crate::paths;
use crate::stack::DetectedStack;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::warn;

// ---------------------------------------------------------------------------
// PatternFlag
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternFlag {
    ApiRoutes,
    PrismaOrm,
    AuthSystem,
    ReactHookForm,
    ZodValidation,
    HookformResolvers,
}

impl PatternFlag {
    pub fn as_str(self) -> &'static str {
        match self {
            PatternFlag::ApiRoutes => "api-routes",
            PatternFlag::PrismaOrm => "prisma-orm",
            PatternFlag::AuthSystem => "auth-system",
            PatternFlag::ReactHookForm => "react-hook-form",
            PatternFlag::ZodValidation => "zod-validation",
            PatternFlag::HookformResolvers => "hookform-resolvers",
        }
    }
}

impl fmt::Display for PatternFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flags set by exact membership of a package name in the dependency set.
pub const LIBRARY_FLAGS: &[(&str, PatternFlag)] = &[
    ("react-hook-form", PatternFlag::ReactHookForm),
    ("zod", PatternFlag::ZodValidation),
    ("@hookform/resolvers", PatternFlag::HookformResolvers),
];

// ---------------------------------------------------------------------------
// Scan output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentRecord {
    pub name: String,
    pub files: Vec<String>,
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PatternReport {
    pub patterns: Vec<PatternFlag>,
    /// In traversal order; not sorted.
    pub api_endpoints: Vec<String>,
    pub components: Vec<ComponentRecord>,
}

impl PatternReport {
    pub fn has(&self, flag: PatternFlag) -> bool {
        self.patterns.contains(&flag)
    }
}

// ---------------------------------------------------------------------------
// Scanning
// ---------------------------------------------------------------------------

fn scan_error(path: &Path, e: &std::io::Error) -> PlanError {
    PlanError::ScanFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}

fn exists_or_warn(path: &Path) -> bool {
    match path.try_exists() {
        Ok(found) => found,
        Err(e) => {
            warn!(error = %scan_error(path, &e), "could not check path");
            false
        }
    }
}

pub fn scan_patterns(root: &Path, stack: &DetectedStack) -> PatternReport {
    let mut report = PatternReport {
        components: scan_components(root),
        ..Default::default()
    };

    let api_dir = paths::api_dir(root);
    if exists_or_warn(&api_dir) {
        report.patterns.push(PatternFlag::ApiRoutes);
        report.api_endpoints = find_api_endpoints(&api_dir);
    }
    if exists_or_warn(&root.join(paths::PRISMA_SCHEMA)) {
        report.patterns.push(PatternFlag::PrismaOrm);
    }
    if exists_or_warn(&root.join(paths::AUTH_DIR)) {
        report.patterns.push(PatternFlag::AuthSystem);
    }
    for (package, flag) in LIBRARY_FLAGS {
        if stack.dependencies.contains(package) {
            report.patterns.push(*flag);
        }
    }
    report
}

/// Depth-first walk of `api_dir`. Each route file yields the slash-joined
/// directory segments leading to it; a route file at the top yields `""`.
pub fn find_api_endpoints(api_dir: &Path) -> Vec<String> {
    let mut endpoints = Vec::new();
    let mut segments = Vec::new();
    walk_api_dir(api_dir, &mut segments, &mut endpoints);
    endpoints
}

fn walk_api_dir(dir: &Path, segments: &mut Vec<String>, out: &mut Vec<String>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %scan_error(dir, &e), "could not scan API directory");
            return;
        }
    };
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %scan_error(dir, &e), "skipping unreadable API entry");
                continue;
            }
        };
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        if path.is_dir() {
            segments.push(name);
            walk_api_dir(&path, segments, out);
            segments.pop();
        } else if paths::ROUTE_FILES.contains(&name.as_str()) {
            out.push(segments.join("/"));
        }
    }
}

/// Directories under `src/components` that hold at least one `.ts`/`.tsx` file.
pub fn scan_components(root: &Path) -> Vec<ComponentRecord> {
    let dir = paths::components_dir(root);
    if !exists_or_warn(&dir) {
        return Vec::new();
    }
    let entries = match std::fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %scan_error(&dir, &e), "could not analyze components");
            return Vec::new();
        }
    };

    let mut components = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %scan_error(&dir, &e), "skipping unreadable component entry");
                continue;
            }
        };
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let files = match std::fs::read_dir(&path) {
            Ok(files) => typescript_files(&path, files),
            Err(e) => {
                warn!(error = %scan_error(&path, &e), "skipping component directory");
                continue;
            }
        };
        if !files.is_empty() {
            components.push(ComponentRecord {
                path: format!("{}/{}", paths::COMPONENTS_DIR, name),
                name,
                files,
            });
        }
    }
    components
}

/// `.ts`/`.tsx` file names in one component directory.
fn typescript_files(dir: &Path, entries: std::fs::ReadDir) -> Vec<String> {
    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(entry) => {
                let name = entry.file_name().to_string_lossy().into_owned();
                if name.ends_with(".tsx") || name.ends_with(".ts") {
                    files.push(name);
                }
            }
            Err(e) => warn!(error = %scan_error(dir, &e), "skipping unreadable component file"),
        }
    }
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::DependencySet;
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let p = root.join(rel);
        std::fs::create_dir_all(p.parent().unwrap()).unwrap();
        std::fs::write(p, "").unwrap();
    }

    #[test]
    fn endpoints_follow_route_files() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "src/app/api/users/route.ts");
        touch(dir.path(), "src/app/api/users/[id]/route.js");
        touch(dir.path(), "src/app/api/health/route.ts");
        touch(dir.path(), "src/app/api/health/helpers.ts");
        std::fs::create_dir_all(dir.path().join("src/app/api/empty")).unwrap();

        let found: HashSet<String> = find_api_endpoints(&paths::api_dir(dir.path()))
            .into_iter()
            .collect();
        let expected: HashSet<String> = ["users", "users/[id]", "health"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(found, expected);
    }

    #[test]
    fn route_at_api_root_is_empty_path() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "src/app/api/route.ts");
        assert_eq!(find_api_endpoints(&paths::api_dir(dir.path())), [""]);
    }

    #[test]
    fn file_flags_are_independent() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "src/prisma/schema.prisma");
        std::fs::create_dir_all(dir.path().join("src/lib/auth")).unwrap();

        let report = scan_patterns(dir.path(), &DetectedStack::default());
        assert!(report.has(PatternFlag::PrismaOrm));
        assert!(report.has(PatternFlag::AuthSystem));
        assert!(!report.has(PatternFlag::ApiRoutes));
        assert!(report.api_endpoints.is_empty());
    }

    #[test]
    fn library_flags_use_exact_keys() {
        let dir = TempDir::new().unwrap();
        let stack = DetectedStack {
            dependencies: DependencySet::merge(
                [
                    ("zod".to_string(), "^3".to_string()),
                    ("react-hook-form-lite".to_string(), "1".to_string()),
                ],
                [("@hookform/resolvers".to_string(), "^3".to_string())],
            ),
            ..Default::default()
        };
        let report = scan_patterns(dir.path(), &stack);
        assert_eq!(
            report.patterns,
            [PatternFlag::ZodValidation, PatternFlag::HookformResolvers]
        );
    }

    #[test]
    fn components_need_typescript_files() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "src/components/Toast/Toast.tsx");
        touch(dir.path(), "src/components/Toast/index.ts");
        touch(dir.path(), "src/components/Legacy/legacy.js");
        touch(dir.path(), "src/components/README.md");

        let components = scan_components(dir.path());
        assert_eq!(components.len(), 1);
        let toast = &components[0];
        assert_eq!(toast.name, "Toast");
        assert_eq!(toast.path, "src/components/Toast");
        let files: HashSet<&str> = toast.files.iter().map(String::as_str).collect();
        assert_eq!(files, HashSet::from(["Toast.tsx", "index.ts"]));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_directories_do_not_stop_the_scan() {
        use std::os::unix::fs::PermissionsExt;
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "src/components/Toast/Toast.tsx");
        touch(dir.path(), "src/components/Locked/Locked.tsx");
        touch(dir.path(), "src/app/api/users/route.ts");
        touch(dir.path(), "src/app/api/locked/route.ts");
        let locked = [
            dir.path().join("src/components/Locked"),
            dir.path().join("src/app/api/locked"),
        ];
        for path in &locked {
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o000)).unwrap();
        }

        let names: Vec<String> = scan_components(dir.path()).into_iter().map(|c| c.name).collect();
        let endpoints = find_api_endpoints(&dir.path().join("src/app/api"));

        for path in &locked {
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
        }
        assert!(names.contains(&"Toast".to_string()));
        assert!(endpoints.contains(&"users".to_string()));
    }

    #[test]
    fn flag_names_are_kebab_case() {
        assert_eq!(
            serde_json::to_string(&PatternFlag::HookformResolvers).unwrap(),
            "\"hookform-resolvers\""
        );
        assert_eq!(PatternFlag::PrismaOrm.to_string(), "prisma-orm");
    }
}
