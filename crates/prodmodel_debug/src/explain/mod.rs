//! Explanation system for prodmodel runs.
//!
//! Answers "why" questions about a solver's current state:
//! - `why` - which pending rules are blocked, and on what
//! - `why <fact>` - how a fact got into working memory, or why it has not

pub mod why;

pub use why::{
    BlockedExplanation, BlockedRule, Blocker, ExplanationDisplay, FactOrigin, MissingCondition,
    WhyQuery,
};
