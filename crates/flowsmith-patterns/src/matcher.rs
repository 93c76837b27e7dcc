//! Pattern matcher — ranks catalog patterns against a free-text request.
//!
//! Scoring is purely lexical.  For every pattern:
//!
//! | Signal | Points |
//! |--------|--------|
//! | each keyword found in the description | 2 |
//! | pattern name found in the description | 3 |
//! | pattern description found in the description | 1 |
//! | each example contained in (or containing) the description | 1.5 |
//!
//! Keywords are located with one case-insensitive [`aho_corasick`] automaton
//! per pattern, compiled once when the matcher is built.  Patterns that
//! score zero, or that lack a template for the requested platform, are
//! dropped.  Results are sorted by score, highest first; the sort is stable
//! so equal scores keep catalog order.

use aho_corasick::AhoCorasick;
use tracing::{debug, error, trace};

use crate::catalog::PatternCatalog;
use crate::pattern::{Platform, WorkflowPattern};

const KEYWORD_POINTS: f64 = 2.0;
const NAME_POINTS: f64 = 3.0;
const DESCRIPTION_POINTS: f64 = 1.0;
const EXAMPLE_POINTS: f64 = 1.5;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// A pattern together with its relevance score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredPattern<'a> {
    pub pattern: &'a WorkflowPattern,
    pub score: f64,
}

/// A pattern prepared for matching.
struct CompiledPattern {
    /// Keyword automaton; `None` when the pattern has no usable keywords.
    keywords: Option<AhoCorasick>,
    keyword_count: usize,
    name: String,
    description: String,
    examples: Vec<String>,
}

// ---------------------------------------------------------------------------
// Matcher
// ---------------------------------------------------------------------------

/// Stateless, reentrant pattern matcher over a fixed catalog.
pub struct PatternMatcher<'c> {
    catalog: &'c PatternCatalog,
    compiled: Vec<CompiledPattern>,
}

impl PatternMatcher<'static> {
    /// A matcher over the process-wide built-in catalog.
    pub fn builtin() -> Self {
        Self::new(PatternCatalog::builtin())
    }
}

impl<'c> PatternMatcher<'c> {
    /// Compile a matcher for `catalog`.
    pub fn new(catalog: &'c PatternCatalog) -> Self {
        let compiled = catalog.patterns().iter().map(compile).collect();
        Self { catalog, compiled }
    }

    /// The catalog this matcher ranks.
    pub fn catalog(&self) -> &'c PatternCatalog {
        self.catalog
    }

    /// Return matching patterns, most relevant first.
    pub fn match_patterns(
        &self,
        description: &str,
        platform: Option<Platform>,
    ) -> Vec<&'c WorkflowPattern> {
        self.score_patterns(description, platform)
            .into_iter()
            .map(|scored| scored.pattern)
            .collect()
    }

    /// Return matching patterns with their scores, most relevant first.
    pub fn score_patterns(
        &self,
        description: &str,
        platform: Option<Platform>,
    ) -> Vec<ScoredPattern<'c>> {
        let lowered = description.trim().to_lowercase();
        if lowered.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<ScoredPattern<'c>> = self
            .catalog
            .patterns()
            .iter()
            .zip(&self.compiled)
            .filter(|(pattern, _)| platform.is_none_or(|p| pattern.supports(p)))
            .filter_map(|(pattern, compiled)| {
                let score = compiled.score(&lowered);
                trace!(pattern = %pattern.id, score, "pattern scored");
                (score > 0.0).then_some(ScoredPattern { pattern, score })
            })
            .collect();

        // `sort_by` is stable, so ties keep catalog order.
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));

        debug!(
            matches = scored.len(),
            platform = ?platform,
            top = scored.first().map(|s| s.pattern.id.as_str()),
            "patterns matched"
        );
        scored
    }
}

impl CompiledPattern {
    fn score(&self, lowered: &str) -> f64 {
        let mut score = 0.0;

        if let Some(ac) = &self.keywords {
            let mut hit = vec![false; self.keyword_count];
            for mat in ac.find_overlapping_iter(lowered) {
                hit[mat.pattern().as_usize()] = true;
            }
            score += KEYWORD_POINTS * hit.iter().filter(|h| **h).count() as f64;
        }

        if !self.name.is_empty() && lowered.contains(&self.name) {
            score += NAME_POINTS;
        }

        if !self.description.is_empty() && lowered.contains(&self.description) {
            score += DESCRIPTION_POINTS;
        }

        let example_hits = self
            .examples
            .iter()
            .filter(|example| lowered.contains(example.as_str()) || example.contains(lowered))
            .count();
        score += EXAMPLE_POINTS * example_hits as f64;

        score
    }
}

fn compile(pattern: &WorkflowPattern) -> CompiledPattern {
    let mut keywords: Vec<String> = pattern
        .keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();
    keywords.sort();
    keywords.dedup();

    let automaton = if keywords.is_empty() {
        None
    } else {
        match AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(&keywords)
        {
            Ok(ac) => Some(ac),
            Err(e) => {
                error!(pattern = %pattern.id, error = %e, "failed to build keyword automaton");
                None
            }
        }
    };

    let normalize = |s: &str| s.trim().to_lowercase();

    CompiledPattern {
        keywords: automaton,
        keyword_count: keywords.len(),
        name: normalize(&pattern.name),
        description: normalize(&pattern.description),
        examples: pattern
            .examples
            .iter()
            .map(|e| normalize(e))
            .filter(|e| !e.is_empty())
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::pattern::{Difficulty, PlatformTemplate};

    fn pattern(id: &str, name: &str, keywords: &[&str], platforms: &[Platform]) -> WorkflowPattern {
        WorkflowPattern {
            id: id.into(),
            name: name.into(),
            description: format!("{name} pattern"),
            keywords: keywords.iter().map(|k| (*k).to_owned()).collect(),
            category: "test".into(),
            difficulty: Difficulty::Simple,
            platforms: platforms
                .iter()
                .map(|p| (*p, Some(PlatformTemplate::steps(["step"]))))
                .collect::<BTreeMap<_, _>>(),
            required_services: vec![],
            examples: vec![],
            tags: vec![],
        }
    }

    fn catalog(patterns: Vec<WorkflowPattern>) -> PatternCatalog {
        PatternCatalog::new(1, patterns).unwrap()
    }

    #[test]
    fn keyword_hits_score_two_each() {
        let catalog = catalog(vec![pattern("a", "Alpha", &["slack", "webhook"], &[Platform::N8n])]);
        let matcher = PatternMatcher::new(&catalog);
        let scored = matcher.score_patterns("Webhook into SLACK", None);
        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].score, 4.0);
    }

    #[test]
    fn repeated_keyword_counts_once() {
        let catalog = catalog(vec![pattern("a", "Alpha", &["slack"], &[Platform::N8n])]);
        let matcher = PatternMatcher::new(&catalog);
        let scored = matcher.score_patterns("slack slack slack", None);
        assert_eq!(scored[0].score, 2.0);
    }

    #[test]
    fn name_and_example_bonuses() {
        let mut p = pattern("a", "Daily digest", &["digest"], &[Platform::N8n]);
        p.examples = vec!["email me a daily digest".into()];
        let catalog = catalog(vec![p]);
        let matcher = PatternMatcher::new(&catalog);

        // keyword (2) + name (3) + example contained in description (1.5)
        let scored = matcher.score_patterns("please email me a daily digest", None);
        assert_eq!(scored[0].score, 6.5);

        // description contained in the example: keyword + name + example
        let scored = matcher.score_patterns("a daily digest", None);
        assert_eq!(scored[0].score, 2.0 + 3.0 + 1.5);
    }

    #[test]
    fn description_bonus() {
        let catalog = catalog(vec![pattern("a", "Zeta", &[], &[Platform::N8n])]);
        let matcher = PatternMatcher::new(&catalog);
        let scored = matcher.score_patterns("I want the zeta pattern please", None);
        // name (3) + description "zeta pattern" (1)
        assert_eq!(scored[0].score, 4.0);
    }

    #[test]
    fn no_overlap_returns_empty() {
        let matcher = PatternMatcher::builtin();
        assert!(matcher.match_patterns("xyzzy plugh", None).is_empty());
        assert!(matcher.match_patterns("   ", None).is_empty());
    }

    #[test]
    fn platform_filter_excludes_unsupported() {
        let catalog = catalog(vec![
            pattern("n8n-only", "One", &["sync"], &[Platform::N8n]),
            pattern("zapier-only", "Two", &["sync"], &[Platform::Zapier]),
        ]);
        let matcher = PatternMatcher::new(&catalog);

        let ids: Vec<_> = matcher
            .match_patterns("sync things", Some(Platform::Zapier))
            .into_iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(ids, vec!["zapier-only"]);

        assert_eq!(matcher.match_patterns("sync things", None).len(), 2);
    }

    #[test]
    fn ties_keep_catalog_order() {
        let catalog = catalog(vec![
            pattern("first", "One", &["report"], &[Platform::N8n]),
            pattern("second", "Two", &["report"], &[Platform::N8n]),
            pattern("third", "Three", &["report", "weekly"], &[Platform::N8n]),
        ]);
        let matcher = PatternMatcher::new(&catalog);

        let scored = matcher.score_patterns("weekly report", None);
        let ids: Vec<_> = scored.iter().map(|s| s.pattern.id.as_str()).collect();
        assert_eq!(ids, vec!["third", "first", "second"]);
        assert!(scored.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn branch_and_merge_both_match() {
        let catalog = catalog(vec![
            pattern("branch", "Branch on condition", &["risk score"], &[Platform::N8n]),
            pattern("merge", "Merge inputs", &["merges"], &[Platform::N8n]),
        ]);
        let matcher = PatternMatcher::new(&catalog);

        let scored = matcher.score_patterns(
            "I need a webhook that checks risk score and merges two branches",
            None,
        );
        assert_eq!(scored.len(), 2);
        let branch = scored.iter().find(|s| s.pattern.id == "branch").unwrap();
        let merge = scored.iter().find(|s| s.pattern.id == "merge").unwrap();
        assert_eq!(branch.score, 2.0);
        assert_eq!(merge.score, 2.0);
        // Equal scores: catalog order.
        assert_eq!(scored[0].pattern.id, "branch");
    }

    #[test]
    fn builtin_catalog_ranks_payment_router_for_payment_request() {
        let matcher = PatternMatcher::builtin();
        let top = matcher.match_patterns(
            "route stripe payments: card goes one way, paypal another",
            Some(Platform::N8n),
        );
        assert_eq!(top.first().map(|p| p.id.as_str()), Some("payment-router"));
    }
}
