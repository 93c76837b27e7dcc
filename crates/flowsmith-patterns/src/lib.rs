//! Workflow pattern catalog and matcher for flowsmith.
//!
//! - **Catalog**: the immutable library of known workflow shapes, with
//!   per-platform templates, via [`catalog::PatternCatalog`].
//! - **Matcher**: deterministic lexical ranking of catalog patterns against
//!   a free-text request via [`matcher::PatternMatcher`].

pub mod catalog;
pub mod error;
pub mod matcher;
pub mod pattern;

pub use catalog::{BUILTIN_CATALOG_VERSION, PatternCatalog};
pub use error::{PatternError, Result};
pub use matcher::{PatternMatcher, ScoredPattern};
pub use pattern::{Difficulty, Platform, PlatformTemplate, WorkflowPattern};
