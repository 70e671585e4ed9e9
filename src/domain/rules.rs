//! Ordered rule tables for deal title parsing.
//!
//! Each table is evaluated top to bottom and the first matching rule wins,
//! so the position of a rule is part of its meaning. Generic rules (a bare
//! dollar amount, "Free") sit below the specific ones they would otherwise
//! shadow.

use super::PatternRule;
use once_cell::sync::Lazy;

/// Dollar amount with optional thousands separators and cents.
const AMOUNT: &str = r"\$[\d,]+(?:\.\d{2})?";

/// Notes that may directly follow a price span.
const POST_PRICE_NOTE: &str =
    r"\([^)]+\)|In-Store\s+(?:Only|Pick\s+Up\s+Only)|Digital\s+Delivery|Valid\s+[^$+&]+";

fn trailing(label: &'static str, body: &str) -> PatternRule {
    PatternRule::new(label, &format!(r"(?i)\s+{}$", body))
}

fn price(label: &'static str, body: &str) -> PatternRule {
    PatternRule::new(
        label,
        &format!(r"(?i)\s+({})(?:\s+(?:{}))?$", body, POST_PRICE_NOTE),
    )
}

fn post_price(label: &'static str, body: &str) -> PatternRule {
    PatternRule::new(label, &format!(r"(?i)^({})", body))
}

/// Qualifiers stripped from the end of a title before the price is located.
///
/// All rules are end-anchored and include the whitespace that separates
/// them from the preceding text.
pub fn trailing_note_rules() -> &'static [PatternRule] {
    static RULES: Lazy<Vec<PatternRule>> = Lazy::new(|| {
        vec![
            trailing(
                "free-shipping",
                r"\+\s+Free\s+(?:Shipping|S/H|S&H|Store\s+Pickup)(?:\s+(?:w/|on)(?:(?:Amazon\s+)?\s+Prime(?:\s+or\s+on)?)?\s+[^$+&]+)?",
            ),
            trailing("and-more", r"&\s+More(?:\s+\+\s+Free\s+[^$]+)?"),
            trailing("subscribe-and-save", r"w/\s+Subscribe\s+&\s+Save"),
            // w/ 2-Yr Samsung Care+
            trailing("care-plan", r"w/\s+\d+-Yr\s+[\w\s]+(?:Care\+?)?"),
            trailing("amazon-prime", r"w/\s+Amazon\s+Prime"),
            trailing("text-signup", r"w/\s+Text\s+Signup"),
            trailing("paid-shipping", r"\+\s+(?:\$[\d.]+\s+)?Shipping"),
            trailing(
                "shipping-threshold",
                r"\+\s+Free\s+S/H\s+(?:Orders|on)\s+\$[\d+]+",
            ),
        ]
    });
    &RULES
}

/// Price spans, most specific first.
///
/// Group 1 holds the price text. A match may be followed by a single
/// post-price note and nothing else.
pub fn price_rules() -> &'static [PatternRule] {
    static RULES: Lazy<Vec<PatternRule>> = Lazy::new(|| {
        vec![
            price("bundle-packs", &format!(r"\d+\s+Packs?\s+for\s+{}", AMOUNT)),
            price("bundle", &format!(r"\d+\s+for\s+{}", AMOUNT)),
            price(
                "monthly-financing",
                &format!(r"from\s+{}/mos\s+for\s+\d+\s+mos", AMOUNT),
            ),
            price(
                "price-plus-reward",
                &format!(r"{}\s+\+\s+\d+%\s+[^$&+()\s]+(?:\s+[^$&+()\s]+)*", AMOUNT),
            ),
            price("per-unit", &format!(r"{}\s+per\s+\w+", AMOUNT)),
            price("subscription", &format!(r"{}/(?:month|yr|mos)", AMOUNT)),
            price("each", &format!(r"{}\s+Each", AMOUNT)),
            // must precede "from"
            price("from-each", &format!(r"from\s+{}\s+each", AMOUNT)),
            price("or-less", &format!(r"{}\s+or\s+Less", AMOUNT)),
            price("from", &format!(r"from\s+{}", AMOUNT)),
            price(
                "amount-off",
                &format!(r"{}\s+(?:Off|Statement\s+Credit)", AMOUNT),
            ),
            price(
                "percent-off",
                &format!(
                    r"(?:Up\s+to\s+)?(?:{}|\d+%)\s+Off(?:\s+[^$()\s]+(?:\s+[^$()\s]+)*)?",
                    AMOUNT
                ),
            ),
            price("cash-back", r"\d+%\s+Cash\s+Back"),
            price("amount-in", &format!(r"{}\s+in\s+[^$&()+]+", AMOUNT)),
            price("get-amount", &format!(r"Get\s+{}\s+[^$&()+]+", AMOUNT)),
            price("bare-amount", AMOUNT),
            price("official-rules", r"\(See\s+Official\s+Rules\)"),
            price("free", r"Free(?:\s+to\s+Claim)?"),
        ]
    });
    &RULES
}

/// Notes that directly follow the price span, anchored at its end.
pub fn post_price_note_rules() -> &'static [PatternRule] {
    static RULES: Lazy<Vec<PatternRule>> = Lazy::new(|| {
        vec![
            post_price("parenthetical", r"\([^)]+\)"),
            post_price("in-store", r"In-Store\s+(?:Only|Pick\s+Up\s+Only)"),
            post_price("digital-delivery", r"Digital\s+Delivery"),
            post_price("valid", r"Valid\s+[^$+&]+"),
        ]
    });
    &RULES
}
