use crate::patterns::PatternFlag;
use crate::summary::CodebaseSummary;
use serde::Serialize;

// ---------------------------------------------------------------------------
// FeatureValidation (output)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureValidation {
    pub is_realistic: bool,
    pub missing_requirements: Vec<String>,
    pub recommendations: Vec<String>,
}

impl Default for FeatureValidation {
    fn default() -> Self {
        Self {
            is_realistic: true,
            missing_requirements: Vec::new(),
            recommendations: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Checks
// ---------------------------------------------------------------------------

/// A `(missing requirement, recommendation)` pair.
pub type Gap = (&'static str, &'static str);

/// One capability check. Fires when any keyword is a substring of the
/// lowercased description; `gaps` reports what the codebase lacks. Only
/// `blocking` checks make the feature unrealistic.
pub struct FeasibilityCheck {
    pub keywords: &'static [&'static str],
    pub blocking: bool,
    pub gaps: fn(&CodebaseSummary) -> Vec<Gap>,
}

fn form_gaps(s: &CodebaseSummary) -> Vec<Gap> {
    let mut gaps = Vec::new();
    if !s.has_package("react-hook-form") {
        gaps.push((
            "react-hook-form for form management",
            "Install: npm install react-hook-form @hookform/resolvers",
        ));
    }
    if !s.has_package("zod") {
        gaps.push(("zod for schema validation", "Install: npm install zod"));
    }
    gaps
}

fn toast_gaps(s: &CodebaseSummary) -> Vec<Gap> {
    let has_toast = s
        .existing_components
        .iter()
        .any(|c| c.to_lowercase().contains("toast"));
    if has_toast {
        return Vec::new();
    }
    vec![(
        "Toast/notification system",
        "Implement using existing Card/Alert components or install toast library",
    )]
}

fn testing_gaps(s: &CodebaseSummary) -> Vec<Gap> {
    if s.build_tools.has_jest {
        return Vec::new();
    }
    vec![(
        "Testing framework",
        "Install: npm install --save-dev jest @testing-library/react",
    )]
}

fn database_gaps(s: &CodebaseSummary) -> Vec<Gap> {
    if s.has_pattern(PatternFlag::PrismaOrm) {
        return Vec::new();
    }
    vec![(
        "Database ORM (Prisma)",
        "Setup Prisma first before database operations",
    )]
}

pub fn default_checks() -> Vec<FeasibilityCheck> {
    vec![
        FeasibilityCheck {
            keywords: &["form", "validation"],
            blocking: false,
            gaps: form_gaps,
        },
        FeasibilityCheck {
            keywords: &["toast", "notification"],
            blocking: false,
            gaps: toast_gaps,
        },
        FeasibilityCheck {
            keywords: &["test", "testing"],
            blocking: false,
            gaps: testing_gaps,
        },
        // Schema work without an ORM cannot be planned realistically.
        FeasibilityCheck {
            keywords: &["database", "migration", "schema"],
            blocking: true,
            gaps: database_gaps,
        },
    ]
}

// ---------------------------------------------------------------------------
// Validator
// ---------------------------------------------------------------------------

pub struct FeatureValidator {
    checks: Vec<FeasibilityCheck>,
}

impl Default for FeatureValidator {
    fn default() -> Self {
        Self::new(default_checks())
    }
}

impl FeatureValidator {
    pub fn new(checks: Vec<FeasibilityCheck>) -> Self {
        Self { checks }
    }

    /// Run every check against `description`. Checks are not exclusive.
    pub fn validate(&self, description: &str, summary: &CodebaseSummary) -> FeatureValidation {
        let lower = description.to_lowercase();
        let mut validation = FeatureValidation::default();
        for check in &self.checks {
            if !check.keywords.iter().any(|k| lower.contains(k)) {
                continue;
            }
            let gaps = (check.gaps)(summary);
            if check.blocking && !gaps.is_empty() {
                validation.is_realistic = false;
            }
            for (missing, recommendation) in gaps {
                validation.missing_requirements.push(missing.to_string());
                validation.recommendations.push(recommendation.to_string());
            }
        }
        validation
    }
}

pub fn validate_feature(description: &str, summary: &CodebaseSummary) -> FeatureValidation {
    FeatureValidator::default().validate(description, summary)
}
