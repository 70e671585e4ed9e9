//! Deal title segmentation.
//!
//! Parsing runs in four phases over a shrinking view of the title:
//!
//! 1. Trailing notes ("+ Free Shipping", "& More", ...) are stripped from
//!    the end until no rule matches.
//! 2. The price span is located at the new end of the text.
//! 3. A note directly after the price ("(Email Delivery)") is taken as well.
//! 4. Whatever precedes the price is the product name.
//!
//! Every output field is a slice of the input; nothing is synthesized.

use super::rules::{post_price_note_rules, price_rules, trailing_note_rules};
use super::ParsedTitle;

/// Splits deal titles into name, price and note.
///
/// The parser holds no state. Rule tables are shared, compiled once and
/// never mutated, so one instance can be used from any number of threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct TitleParser;

/// Result of a parse together with the rules that produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseTrace {
    pub parsed: ParsedTitle,
    /// Trailing-note rules in the order they fired (outermost first).
    pub trailing_rules: Vec<&'static str>,
    pub price_rule: Option<&'static str>,
    pub post_price_rule: Option<&'static str>,
}

impl TitleParser {
    pub fn new() -> Self {
        Self
    }

    /// Parses a title. Never fails: a title with no recognizable price comes
    /// back whole as the name.
    pub fn parse(&self, title: &str) -> ParsedTitle {
        self.trace(title).parsed
    }

    /// Parses a title and records which rules matched.
    pub fn trace(&self, title: &str) -> ParseTrace {
        let mut trace = ParseTrace::default();
        // Collected right to left; reversed when joined.
        let mut notes: Vec<&str> = Vec::new();
        // Leading whitespace stays so that `" $10"` still has a price.
        let mut remaining = title.trim_end();

        let mut changed = true;
        while changed {
            changed = false;
            for rule in trailing_note_rules() {
                if let Some(found) = rule.pattern().find(remaining) {
                    notes.push(found.as_str().trim());
                    remaining = remaining[..found.start()].trim();
                    trace.trailing_rules.push(rule.label());
                    changed = true;
                    break;
                }
            }
        }

        let mut price = "";
        for rule in price_rules() {
            let Some(caps) = rule.captures(remaining) else {
                continue;
            };
            let (Some(whole), Some(span)) = (caps.get(0), caps.get(1)) else {
                continue;
            };

            price = span.as_str().trim();
            trace.price_rule = Some(rule.label());

            let after = remaining[span.end()..].trim();
            for post in post_price_note_rules() {
                if let Some(found) = post.captures(after).and_then(|c| c.get(1)) {
                    notes.push(found.as_str().trim());
                    trace.post_price_rule = Some(post.label());
                    break;
                }
            }

            remaining = remaining[..whole.start()].trim();
            break;
        }

        let name = [remaining.trim(), title.trim()]
            .into_iter()
            .find(|candidate| !candidate.is_empty())
            .unwrap_or(title);
        notes.reverse();

        trace.parsed = ParsedTitle {
            name: name.to_string(),
            price: price.to_string(),
            note: notes.join(" "),
        };
        trace
    }
}

/// Parses a deal title with the default rule tables.
///
/// ```
/// use dealparse::parse_title;
///
/// let parsed = parse_title("Hasbro Winning Moves Scrabble Slam Card Game 2 for $6");
/// assert_eq!(parsed.name, "Hasbro Winning Moves Scrabble Slam Card Game");
/// assert_eq!(parsed.price, "2 for $6");
/// assert_eq!(parsed.note, "");
/// ```
pub fn parse_title(title: &str) -> ParsedTitle {
    TitleParser::new().parse(title)
}
