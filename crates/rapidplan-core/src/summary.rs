use crate::patterns::{scan_patterns, PatternFlag, PatternReport};
use crate::stack::{detect_stack, Commands, DetectedStack, Ecosystem};
use serde::Serialize;
use std::path::Path;

// ---------------------------------------------------------------------------
// Analysis (detection + pattern scan)
// ---------------------------------------------------------------------------

/// Output of the analysis path: the detected stack and the pattern scan run
/// against it. Both halves are fixed once built.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub stack: DetectedStack,
    pub patterns: PatternReport,
}

impl Analysis {
    pub fn summary(&self) -> CodebaseSummary {
        CodebaseSummary::build(&self.stack, &self.patterns)
    }
}

pub fn analyze(root: &Path) -> Analysis {
    let stack = detect_stack(root);
    let patterns = scan_patterns(root, &stack);
    Analysis { stack, patterns }
}

// ---------------------------------------------------------------------------
// CodebaseSummary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildTools {
    pub has_typescript: bool,
    pub has_eslint: bool,
    pub has_prettier: bool,
    pub has_jest: bool,
}

/// Reality snapshot of the codebase used to ground planning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodebaseSummary {
    pub ecosystem: Option<Ecosystem>,
    pub language: Option<String>,
    pub framework: Option<String>,
    pub orm: Option<String>,
    pub available_packages: Vec<String>,
    pub existing_components: Vec<String>,
    pub api_endpoints: Vec<String>,
    pub patterns: Vec<PatternFlag>,
    pub build_tools: BuildTools,
    pub commands: Commands,
}

impl CodebaseSummary {
    pub fn build(stack: &DetectedStack, report: &PatternReport) -> Self {
        let deps = &stack.dependencies;
        Self {
            ecosystem: stack.descriptor.ecosystem,
            language: stack.descriptor.language.clone(),
            framework: stack.descriptor.framework.clone(),
            orm: report
                .has(PatternFlag::PrismaOrm)
                .then(|| "Prisma".to_string()),
            available_packages: deps.names().map(String::from).collect(),
            existing_components: report.components.iter().map(|c| c.name.clone()).collect(),
            api_endpoints: report.api_endpoints.clone(),
            patterns: report.patterns.clone(),
            build_tools: BuildTools {
                has_typescript: deps.contains("typescript"),
                has_eslint: deps.contains("eslint"),
                has_prettier: deps.contains("prettier"),
                has_jest: deps.contains("jest") || deps.contains("@testing-library/react"),
            },
            commands: stack.descriptor.commands.clone(),
        }
    }

    pub fn has_package(&self, name: &str) -> bool {
        self.available_packages.iter().any(|p| p == name)
    }

    pub fn has_pattern(&self, flag: PatternFlag) -> bool {
        self.patterns.contains(&flag)
    }
}
