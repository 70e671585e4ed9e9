//! Custom assertions for title parsing tests.
//!
//! Provides domain-specific assertions that make tests more readable
//! and provide better error messages.

use dealparse::ParsedTitle;

/// Asserts that a parse produced exactly the given fields.
///
/// # Panics
/// Panics with the input title and both triples on mismatch.
pub fn assert_parsed(title: &str, actual: &ParsedTitle, name: &str, price: &str, note: &str) {
    let expected = ParsedTitle {
        name: name.to_string(),
        price: price.to_string(),
        note: note.to_string(),
    };
    assert_eq!(
        actual, &expected,
        "Unexpected parse of '{}'\n  actual:   {:?}\n  expected: {:?}",
        title, actual, expected
    );
}

/// Asserts that every field of a parse is text taken from the title.
///
/// # Panics
/// Panics if a field is not a substring of the title, or if the name is
/// empty for a non-empty title.
pub fn assert_no_fabrication(title: &str, parsed: &ParsedTitle) {
    assert!(
        title.contains(parsed.name.as_str()),
        "Name '{}' is not part of title '{}'",
        parsed.name,
        title
    );
    assert!(
        title.contains(parsed.price.as_str()),
        "Price '{}' is not part of title '{}'",
        parsed.price,
        title
    );
    for token in parsed.note.split(' ').filter(|t| !t.is_empty()) {
        assert!(
            title.contains(token),
            "Note token '{}' is not part of title '{}'",
            token,
            title
        );
    }
    if !title.is_empty() {
        assert!(!parsed.name.is_empty(), "Empty name for title '{}'", title);
    }
}

/// Asserts that the name is a leading part of the trimmed title.
pub fn assert_name_is_prefix(title: &str, parsed: &ParsedTitle) {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return;
    }
    assert!(
        trimmed.starts_with(parsed.name.as_str()),
        "Name '{}' is not a prefix of '{}'",
        parsed.name,
        trimmed
    );
}
