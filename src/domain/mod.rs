//! Deal title parsing.
//!
//! A deal title such as `"Sony WH-1000XM4 Headphones $160 + Free Shipping"`
//! is split into a product name, a price span and trailing notes by
//! evaluating the ordered rule tables in [`rules`].

pub mod rules;
pub mod title;

pub use rules::{post_price_note_rules, price_rules, trailing_note_rules};
pub use title::{parse_title, ParseTrace, TitleParser};

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

/// A deal title split into its three parts.
///
/// `price` and `note` are empty when the title carries none.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedTitle {
    pub name: String,
    pub price: String,
    pub note: String,
}

impl ParsedTitle {
    /// Returns true if a price span was found.
    pub fn has_price(&self) -> bool {
        !self.price.is_empty()
    }

    /// Returns true if any note was extracted.
    pub fn has_note(&self) -> bool {
        !self.note.is_empty()
    }
}

/// A named regular expression in one of the rule tables.
#[derive(Debug, Clone)]
pub struct PatternRule {
    label: &'static str,
    pattern: Regex,
}

impl PatternRule {
    /// Compiles a rule. Rule sources are static, so an invalid pattern is a
    /// programming error.
    pub(crate) fn new(label: &'static str, source: &str) -> Self {
        Self {
            label,
            pattern: Regex::new(source).expect("Valid title rule regex"),
        }
    }

    /// Short identifier of the rule, e.g. `"bare-amount"`.
    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    pub fn captures<'t>(&self, text: &'t str) -> Option<Captures<'t>> {
        self.pattern.captures(text)
    }
}
