use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ComplexityVerdict (output)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexityVerdict {
    pub is_complex: bool,
    pub reason: Option<String>,
    pub matched_keywords: Vec<String>,
}

impl ComplexityVerdict {
    pub fn simple() -> Self {
        Self {
            is_complex: false,
            reason: None,
            matched_keywords: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// TriageRule / TriagePolicy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriageRule {
    pub keywords: Vec<String>,
    pub rationale: String,
}

impl TriageRule {
    pub fn new(keywords: &[&str], rationale: &str) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            rationale: rationale.to_string(),
        }
    }

    /// Keywords of this rule that occur in `lowered`, in rule order.
    fn matches(&self, lowered: &str) -> Vec<String> {
        self.keywords
            .iter()
            .filter(|k| lowered.contains(k.as_str()))
            .cloned()
            .collect()
    }
}

/// Ordered rules; the first rule with any matching keyword decides the verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriagePolicy {
    rules: Vec<TriageRule>,
}

impl Default for TriagePolicy {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl TriagePolicy {
    pub fn new(rules: Vec<TriageRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[TriageRule] {
        &self.rules
    }

    pub fn triage(&self, description: &str) -> ComplexityVerdict {
        let lowered = description.to_lowercase();
        for rule in &self.rules {
            let matched = rule.matches(&lowered);
            if !matched.is_empty() {
                return ComplexityVerdict {
                    is_complex: true,
                    reason: Some(rule.rationale.clone()),
                    matched_keywords: matched,
                };
            }
        }
        ComplexityVerdict::simple()
    }
}

/// Priority-ordered rules: security first, architecture last.
pub fn default_rules() -> Vec<TriageRule> {
    vec![
        TriageRule::new(
            &["authentication", "security", "password", "token", "jwt", "auth"],
            "Security-critical features need detailed planning",
        ),
        TriageRule::new(
            &["database", "migration", "schema", "sql", "query"],
            "Database changes need careful analysis",
        ),
        TriageRule::new(
            &["api", "endpoint", "rest", "graphql", "webhook"],
            "API design needs comprehensive planning",
        ),
        TriageRule::new(
            &["payment", "stripe", "transaction", "billing", "checkout"],
            "Payment processing requires detailed planning",
        ),
        TriageRule::new(
            &["architecture", "system", "infrastructure", "design pattern"],
            "System architecture changes need thorough planning",
        ),
    ]
}

pub fn triage(description: &str) -> ComplexityVerdict {
    TriagePolicy::default().triage(description)
}
