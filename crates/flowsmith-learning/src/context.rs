//! Learning context derivation.
//!
//! Everything here is a pure function of a history snapshot and a query
//! prompt, so it can run outside the history lock.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::config::LearningConfig;
use crate::record::GenerationRecord;

/// Minimum length of a word that counts as a significant term.
const MIN_TERM_LEN: usize = 4;

/// Words too common to say anything about a workflow.
const STOP_WORDS: &[&str] = &[
    "about", "after", "also", "been", "before", "each", "every", "from", "have", "into", "just",
    "like", "make", "more", "need", "please", "should", "some", "that", "them", "then", "there",
    "these", "they", "this", "want", "when", "which", "while", "will", "with", "workflow", "would",
    "your",
];

/// Error-text fragments and the advice that addresses them.
const ERROR_RULES: &[(&str, &str)] = &[
    ("json", "Respond with a single JSON object and no surrounding prose"),
    ("connection", "Connect every node to at least one other node"),
    ("unknown node type", "Use node types from the n8n-nodes-base namespace"),
    ("timeout", "Keep workflows small; split long chains into sub-workflows"),
    ("missing field", "Give every node a type and a name"),
    ("credential", "Reference credentials by name instead of embedding secrets"),
];

/// Hints distilled from past generations for one prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningContext {
    pub common_patterns: Vec<String>,
    pub avoid_errors: Vec<String>,
    pub best_practices: Vec<String>,
}

impl LearningContext {
    pub fn is_empty(&self) -> bool {
        self.common_patterns.is_empty()
            && self.avoid_errors.is_empty()
            && self.best_practices.is_empty()
    }

    /// Render the context as a prompt suffix.  Empty sections are skipped.
    pub fn render(&self) -> String {
        let mut out = String::from("Context from previous generations:\n");
        let sections = [
            ("Successful similar workflows", &self.common_patterns),
            ("Errors to avoid", &self.avoid_errors),
            ("Best practices", &self.best_practices),
        ];
        for (title, items) in sections {
            if items.is_empty() {
                continue;
            }
            out.push_str(title);
            out.push_str(":\n");
            for item in items {
                out.push_str("- ");
                out.push_str(item);
                out.push('\n');
            }
        }
        out
    }
}

/// Derive the context for `prompt` from `history`.
pub fn derive_context(
    history: &[GenerationRecord],
    prompt: &str,
    config: &LearningConfig,
) -> LearningContext {
    let query = significant_terms(prompt);
    let similar: Vec<&GenerationRecord> = if query.is_empty() {
        Vec::new()
    } else {
        history
            .iter()
            .filter(|r| r.success)
            .filter(|r| shared_terms(&query, &r.prompt) >= config.min_shared_terms.max(1))
            .collect()
    };

    let common_patterns = rank_by_frequency(
        similar
            .iter()
            .map(|r| r.workflow.name.as_str())
            .filter(|name| !name.trim().is_empty()),
        config.max_context_items,
    );

    let avoid_errors = common_errors(history, config.max_context_items);

    let mut best_practices = practices_for_errors(history, config.max_context_items);
    if let Some(avg) = average_node_count(&similar) {
        if best_practices.len() < config.max_context_items {
            best_practices.push(format!("Similar successful workflows used about {avg} nodes"));
        }
    }

    LearningContext {
        common_patterns,
        avoid_errors,
        best_practices,
    }
}

/// Distinct error messages of failed records, most frequent first.
pub fn common_errors(history: &[GenerationRecord], limit: usize) -> Vec<String> {
    rank_by_frequency(
        history
            .iter()
            .filter(|r| !r.success)
            .filter_map(|r| r.error.as_deref())
            .filter(|e| !e.trim().is_empty()),
        limit,
    )
}

/// Advice triggered by the error text of failed records, ordered by how
/// often each rule fired.
pub fn practices_for_errors(history: &[GenerationRecord], limit: usize) -> Vec<String> {
    let hits = history
        .iter()
        .filter(|r| !r.success)
        .filter_map(|r| r.error.as_deref())
        .flat_map(|error| {
            let lower = error.to_lowercase();
            ERROR_RULES
                .iter()
                .filter(move |(needle, _)| lower.contains(*needle))
                .map(|(_, advice)| *advice)
                .collect::<Vec<_>>()
        });
    rank_by_frequency(hits, limit)
}

/// Lowercase words of at least [`MIN_TERM_LEN`] characters, minus stop-words.
pub fn significant_terms(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= MIN_TERM_LEN)
        .map(str::to_lowercase)
        .filter(|w| !STOP_WORDS.contains(&w.as_str()))
        .collect()
}

fn shared_terms(query: &BTreeSet<String>, prompt: &str) -> usize {
    significant_terms(prompt).intersection(query).count()
}

fn average_node_count(records: &[&GenerationRecord]) -> Option<usize> {
    let counted: Vec<usize> = records
        .iter()
        .map(|r| r.workflow.node_count)
        .filter(|&n| n > 0)
        .collect();
    if counted.is_empty() {
        return None;
    }
    let total: usize = counted.iter().sum();
    Some((total as f64 / counted.len() as f64).round() as usize)
}

/// Distinct items, most frequent first; ties keep first-appearance order.
fn rank_by_frequency<'a>(items: impl Iterator<Item = &'a str>, limit: usize) -> Vec<String> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (index, item) in items.enumerate() {
        counts.entry(item).or_insert((0, index)).0 += 1;
    }
    let mut ranked: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .map(|(item, (count, first))| (item, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    ranked
        .into_iter()
        .take(limit)
        .map(|(item, _, _)| item.to_owned())
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
