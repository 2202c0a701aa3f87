use std::borrow::Cow;

use crate::options::Quote;

/// Quote a string literal, preferring `preferred` but switching to the
/// alternate quote character when that strictly reduces the number of
/// characters that need escaping. Only the finally chosen quote character is
/// ever escaped.
pub(crate) fn quote(value: &str, preferred: Quote) -> String {
    let preferred_char = preferred.char();
    let alternate_char = preferred.alternate();

    let preferred_hits = value.chars().filter(|c| *c == preferred_char).count();
    let alternate_hits = value.chars().filter(|c| *c == alternate_char).count();
    let chosen = if alternate_hits < preferred_hits {
        alternate_char
    } else {
        preferred_char
    };

    let mut out = String::with_capacity(value.len() + 2);
    out.push(chosen);
    for c in value.chars() {
        if c == chosen {
            out.push('\\');
        }
        out.push(c);
    }
    out.push(chosen);
    out
}

/// Choose the delimiter for a markup attribute value. Double quotes are the
/// default; a value containing double quotes (and no single quotes) switches
/// to single quotes so the text needs no rewriting. A value containing both
/// kinds keeps double quotes and gets entity-escaped by [`escape_attr_text`].
pub(crate) fn attr_delimiter(contains_double: bool, contains_single: bool) -> &'static str {
    if contains_double && !contains_single {
        "'"
    } else {
        "\""
    }
}

/// Replace any character that would terminate `delimiter` early with its
/// character entity, so the attribute value always re-parses.
pub(crate) fn escape_attr_text<'v>(text: Cow<'v, str>, delimiter: &str) -> Cow<'v, str> {
    if delimiter == "\"" && text.contains('"') {
        Cow::Owned(text.replace('"', "&quot;"))
    } else if delimiter == "'" && text.contains('\'') {
        Cow::Owned(text.replace('\'', "&#39;"))
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ntest::timeout(100)]
    fn test_plain_value_keeps_preferred_quote() {
        assert_eq!(quote("hello", Quote::Double), "\"hello\"");
        assert_eq!(quote("hello", Quote::Single), "'hello'");
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_switches_when_strictly_fewer_escapes() {
        // Two doubles, zero singles: switching removes both escapes.
        assert_eq!(quote("say \"hi\"", Quote::Double), "'say \"hi\"'");
        // Two singles, zero doubles, single preferred: same the other way.
        assert_eq!(quote("it's Bob's", Quote::Single), "\"it's Bob's\"");
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_does_not_switch_on_a_tie() {
        // One of each: switching does not strictly reduce escapes, so the
        // preferred quote stays and its occurrence is escaped.
        assert_eq!(quote("\"x'", Quote::Double), "\"\\\"x'\"");
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_escapes_only_the_chosen_quote() {
        assert_eq!(quote("a'b'c", Quote::Double), "\"a'b'c\"");
        assert_eq!(quote("empty", Quote::Double), "\"empty\"");
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_attr_delimiter_avoids_the_embedded_quote() {
        assert_eq!(attr_delimiter(false, false), "\"");
        assert_eq!(attr_delimiter(false, true), "\"");
        assert_eq!(attr_delimiter(true, false), "'");
        assert_eq!(attr_delimiter(true, true), "\"");
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_attr_text_with_both_quote_kinds_is_entity_escaped() {
        assert_eq!(
            escape_attr_text(Cow::Borrowed("a\"b'c"), "\""),
            "a&quot;b'c"
        );
        // Nothing to escape: the text passes through without allocating.
        assert!(matches!(
            escape_attr_text(Cow::Borrowed("it's"), "\""),
            Cow::Borrowed("it's")
        ));
    }
}
