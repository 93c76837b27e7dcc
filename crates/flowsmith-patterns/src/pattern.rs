//! Catalog entry types.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PatternError;

// ---------------------------------------------------------------------------
// Platform
// ---------------------------------------------------------------------------

/// An automation platform a pattern can be rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// n8n workflow engine.
    N8n,
    /// Zapier zaps.
    Zapier,
    /// Make (formerly Integromat) scenarios.
    Make,
    /// Microsoft Power Automate flows.
    PowerAutomate,
}

impl Platform {
    /// All supported platforms, in declaration order.
    pub const ALL: [Platform; 4] = [
        Platform::N8n,
        Platform::Zapier,
        Platform::Make,
        Platform::PowerAutomate,
    ];

    /// Stable lowercase identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::N8n => "n8n",
            Platform::Zapier => "zapier",
            Platform::Make => "make",
            Platform::PowerAutomate => "power_automate",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "n8n" => Ok(Platform::N8n),
            "zapier" => Ok(Platform::Zapier),
            "make" | "integromat" => Ok(Platform::Make),
            "powerautomate" => Ok(Platform::PowerAutomate),
            _ => Err(PatternError::UnknownPlatform { name: s.to_owned() }),
        }
    }
}

// ---------------------------------------------------------------------------
// Difficulty
// ---------------------------------------------------------------------------

/// Rough build complexity of a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Simple,
    Intermediate,
    Complex,
}

// ---------------------------------------------------------------------------
// Pattern
// ---------------------------------------------------------------------------

/// A platform-specific rendering of a pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformTemplate {
    /// Ordered node types (or app actions) that make up the pattern.
    pub steps: Vec<String>,
    /// Free-form notes for whoever instantiates the template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl PlatformTemplate {
    /// Build a template from a list of step identifiers.
    pub fn steps<I, S>(steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            steps: steps.into_iter().map(Into::into).collect(),
            notes: None,
        }
    }
}

/// An immutable, catalogued workflow shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowPattern {
    pub id: String,
    pub name: String,
    pub description: String,
    pub keywords: BTreeSet<String>,
    pub category: String,
    pub difficulty: Difficulty,
    /// Per-platform templates.  A missing key or a `null` value both mean
    /// the pattern is not available on that platform.
    pub platforms: BTreeMap<Platform, Option<PlatformTemplate>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_services: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl WorkflowPattern {
    /// Return the template for `platform`, if the pattern supports it.
    pub fn template_for(&self, platform: Platform) -> Option<&PlatformTemplate> {
        self.platforms.get(&platform).and_then(Option::as_ref)
    }

    /// Whether the pattern can be rendered for `platform`.
    pub fn supports(&self, platform: Platform) -> bool {
        self.template_for(platform).is_some()
    }
}
