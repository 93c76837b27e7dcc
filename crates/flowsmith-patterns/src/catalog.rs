//! Pattern catalog — the static library of known workflow shapes.
//!
//! The built-in catalog is assembled once, on first access, and shared for
//! the lifetime of the process.  Additional catalogs can be loaded from a
//! JSON document with [`PatternCatalog::from_json`].

use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PatternError, Result};
use crate::pattern::{Difficulty, Platform, PlatformTemplate, WorkflowPattern};

/// Version of the built-in catalog data.  Bump whenever entries change.
pub const BUILTIN_CATALOG_VERSION: u32 = 1;

static BUILTIN: LazyLock<PatternCatalog> = LazyLock::new(|| PatternCatalog {
    version: BUILTIN_CATALOG_VERSION,
    patterns: builtin_patterns(),
});

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// An ordered, immutable collection of workflow patterns.
///
/// Catalog order is significant: the matcher uses it to break score ties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternCatalog {
    /// Data version of this catalog.
    #[serde(default)]
    pub version: u32,
    patterns: Vec<WorkflowPattern>,
}

impl PatternCatalog {
    /// The process-wide built-in catalog.
    pub fn builtin() -> &'static PatternCatalog {
        &BUILTIN
    }

    /// Build a catalog from patterns, rejecting duplicate identifiers.
    pub fn new(version: u32, patterns: Vec<WorkflowPattern>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(patterns.len());
        for pattern in &patterns {
            if !seen.insert(pattern.id.as_str()) {
                return Err(PatternError::DuplicateId {
                    id: pattern.id.clone(),
                });
            }
        }
        Ok(Self { version, patterns })
    }

    /// Parse a catalog document of the form `{"version": N, "patterns": [...]}`.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: PatternCatalog = serde_json::from_str(json)?;
        let catalog = Self::new(raw.version, raw.patterns)?;
        debug!(
            version = catalog.version,
            patterns = catalog.len(),
            "pattern catalog loaded"
        );
        Ok(catalog)
    }

    /// All patterns in catalog order.
    pub fn patterns(&self) -> &[WorkflowPattern] {
        &self.patterns
    }

    /// Look up a pattern by id.
    pub fn get(&self, id: &str) -> Option<&WorkflowPattern> {
        self.patterns.iter().find(|p| p.id == id)
    }

    /// Patterns in the given category, in catalog order.
    pub fn by_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a WorkflowPattern> {
        self.patterns
            .iter()
            .filter(move |p| p.category.eq_ignore_ascii_case(category))
    }

    /// Patterns that carry a template for `platform`, in catalog order.
    pub fn for_platform(&self, platform: Platform) -> impl Iterator<Item = &WorkflowPattern> {
        self.patterns.iter().filter(move |p| p.supports(platform))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Built-in data
// ---------------------------------------------------------------------------

struct Entry<'a> {
    id: &'a str,
    name: &'a str,
    description: &'a str,
    keywords: &'a [&'a str],
    category: &'a str,
    difficulty: Difficulty,
    platforms: &'a [(Platform, &'a [&'a str])],
    services: &'a [&'a str],
    examples: &'a [&'a str],
    tags: &'a [&'a str],
}

impl Entry<'_> {
    fn build(&self) -> WorkflowPattern {
        let strings = |items: &[&str]| items.iter().map(|s| (*s).to_owned()).collect::<Vec<_>>();

        let platforms: BTreeMap<Platform, Option<PlatformTemplate>> = self
            .platforms
            .iter()
            .map(|(platform, steps)| (*platform, Some(PlatformTemplate::steps(steps.iter().copied()))))
            .collect();

        WorkflowPattern {
            id: self.id.to_owned(),
            name: self.name.to_owned(),
            description: self.description.to_owned(),
            keywords: self.keywords.iter().map(|k| (*k).to_owned()).collect(),
            category: self.category.to_owned(),
            difficulty: self.difficulty,
            platforms,
            required_services: strings(self.services),
            examples: strings(self.examples),
            tags: strings(self.tags),
        }
    }
}

fn builtin_patterns() -> Vec<WorkflowPattern> {
    use Platform::{Make, N8n, PowerAutomate, Zapier};

    let entries = [
        Entry {
            id: "webhook-slack-alert",
            name: "Webhook to Slack alert",
            description: "Post a Slack message whenever an incoming webhook fires",
            keywords: &["webhook", "slack", "alert", "notify", "notification"],
            category: "notifications",
            difficulty: Difficulty::Simple,
            platforms: &[
                (N8n, &["n8n-nodes-base.webhook", "n8n-nodes-base.slack"]),
                (Zapier, &["Webhooks by Zapier: Catch Hook", "Slack: Send Channel Message"]),
                (Make, &["Webhooks: Custom webhook", "Slack: Create a Message"]),
            ],
            services: &["slack"],
            examples: &["send a slack message when a webhook is called"],
            tags: &["webhook", "chat"],
        },
        Entry {
            id: "form-to-crm",
            name: "Sync CRM contact on form submit",
            description: "Create or update a CRM contact from a form submission",
            keywords: &["form", "crm", "contact", "lead", "hubspot", "salesforce"],
            category: "crm",
            difficulty: Difficulty::Intermediate,
            platforms: &[
                (N8n, &["n8n-nodes-base.formTrigger", "n8n-nodes-base.hubspot"]),
                (Zapier, &["Forms: New Submission", "HubSpot: Create or Update Contact"]),
                (Make, &["Forms: Watch Responses", "HubSpot CRM: Create a Contact"]),
                (PowerAutomate, &["Microsoft Forms: When a new response is submitted", "Dynamics 365: Create a new record"]),
            ],
            services: &["crm"],
            examples: &["add new form submissions to hubspot as contacts"],
            tags: &["sales", "forms"],
        },
        Entry {
            id: "conditional-branch",
            name: "Conditional branching",
            description: "Route items down different branches based on a threshold",
            keywords: &["condition", "conditional", "branch", "risk score", "threshold", "approve"],
            category: "logic",
            difficulty: Difficulty::Intermediate,
            platforms: &[
                (N8n, &["n8n-nodes-base.webhook", "n8n-nodes-base.if"]),
                (Make, &["Flow Control: Router", "Flow Control: Filter"]),
                (PowerAutomate, &["Control: Condition"]),
            ],
            services: &[],
            examples: &["approve orders when the risk score is low"],
            tags: &["routing"],
        },
        Entry {
            id: "merge-streams",
            name: "Merge data streams",
            description: "Combine the output of two branches into a single stream",
            keywords: &["merge", "merges", "combine", "join", "two branches"],
            category: "logic",
            difficulty: Difficulty::Intermediate,
            platforms: &[
                (N8n, &["n8n-nodes-base.merge"]),
                (Make, &["Flow Control: Aggregator"]),
            ],
            services: &[],
            examples: &["merge results from two apis"],
            tags: &["data"],
        },
        Entry {
            id: "scheduled-report",
            name: "Scheduled report",
            description: "Build and send a report on a fixed schedule",
            keywords: &["schedule", "scheduled", "daily", "weekly", "every morning", "report", "cron"],
            category: "reporting",
            difficulty: Difficulty::Simple,
            platforms: &[
                (N8n, &["n8n-nodes-base.scheduleTrigger", "n8n-nodes-base.httpRequest", "n8n-nodes-base.emailSend"]),
                (Zapier, &["Schedule by Zapier: Every Day", "Email by Zapier: Send Outbound Email"]),
                (Make, &["Schedule", "Email: Send an Email"]),
                (PowerAutomate, &["Recurrence", "Office 365 Outlook: Send an email"]),
            ],
            services: &["email"],
            examples: &["email me a sales report every morning"],
            tags: &["schedule"],
        },
        Entry {
            id: "error-alerting",
            name: "Error handling and alerting",
            description: "Catch workflow failures and alert the team",
            keywords: &["error", "errors", "failure", "failed", "retry", "on error"],
            category: "operations",
            difficulty: Difficulty::Complex,
            platforms: &[(N8n, &["n8n-nodes-base.errorTrigger", "n8n-nodes-base.slack"])],
            services: &["slack"],
            examples: &["notify me when a workflow fails"],
            tags: &["monitoring"],
        },
        Entry {
            id: "payment-router",
            name: "Route payments by method",
            description: "Send each payment down a branch for its payment method",
            keywords: &["payment", "payments", "stripe", "paypal", "card", "invoice"],
            category: "finance",
            difficulty: Difficulty::Complex,
            platforms: &[
                (N8n, &["n8n-nodes-base.webhook", "n8n-nodes-base.switch"]),
                (Make, &["Webhooks: Custom webhook", "Flow Control: Router"]),
            ],
            services: &["stripe"],
            examples: &["handle card and paypal payments differently"],
            tags: &["routing", "payments"],
        },
        Entry {
            id: "sheets-sync",
            name: "Sync Google Sheets rows",
            description: "Append or update spreadsheet rows from another app",
            keywords: &["google sheets", "spreadsheet", "sheet", "rows"],
            category: "data",
            difficulty: Difficulty::Simple,
            platforms: &[
                (N8n, &["n8n-nodes-base.googleSheets"]),
                (Zapier, &["Google Sheets: Create Spreadsheet Row"]),
                (Make, &["Google Sheets: Add a Row"]),
                (PowerAutomate, &["Excel Online: Add a row into a table"]),
            ],
            services: &["google"],
            examples: &["save new orders to a google sheet"],
            tags: &["data"],
        },
    ];

    entries.iter().map(Entry::build).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_has_unique_ids() {
        let catalog = PatternCatalog::builtin();
        assert!(!catalog.is_empty());
        let rebuilt = PatternCatalog::new(catalog.version, catalog.patterns().to_vec());
        assert!(rebuilt.is_ok());
    }

    #[test]
    fn every_builtin_pattern_has_keywords_and_an_n8n_template() {
        for pattern in PatternCatalog::builtin().patterns() {
            assert!(!pattern.keywords.is_empty(), "{} has no keywords", pattern.id);
            assert!(
                pattern.supports(Platform::N8n),
                "{} is missing an n8n template",
                pattern.id
            );
        }
    }

    #[test]
    fn lookup_and_filters() {
        let catalog = PatternCatalog::builtin();
        assert_eq!(
            catalog.get("merge-streams").map(|p| p.name.as_str()),
            Some("Merge data streams")
        );
        assert!(catalog.get("nope").is_none());
        assert_eq!(catalog.by_category("LOGIC").count(), 2);
        assert!(
            catalog
                .for_platform(Platform::Zapier)
                .all(|p| p.supports(Platform::Zapier))
        );
    }

    #[test]
    fn from_json_rejects_duplicates() {
        let json = r#"{"version": 2, "patterns": [
            {"id": "a", "name": "A", "description": "", "keywords": [], "category": "x",
             "difficulty": "simple", "platforms": {}},
            {"id": "a", "name": "B", "description": "", "keywords": [], "category": "x",
             "difficulty": "simple", "platforms": {}}
        ]}"#;
        let err = PatternCatalog::from_json(json).unwrap_err();
        assert!(matches!(err, PatternError::DuplicateId { id } if id == "a"));
    }

    #[test]
    fn from_json_rejects_malformed_documents() {
        assert!(matches!(
            PatternCatalog::from_json("{not json"),
            Err(PatternError::Json(_))
        ));
    }
}
