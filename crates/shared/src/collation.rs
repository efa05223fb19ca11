//! Name ordering for display trees.
//!
//! Follows the script order of the Korean locale: digits and punctuation
//! first, then Hangul, then Hanja, then every other script (Latin
//! included). Within a script, case-folded code points decide; precomposed
//! Hangul syllables (U+AC00..U+D7A3) are already in dictionary order.

use std::cmp::Ordering;

/// Script groups in Korean locale order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Group {
    Common,
    Hangul,
    Han,
    Other,
}

fn group(c: char) -> Group {
    match c {
        '\u{AC00}'..='\u{D7A3}'
        | '\u{1100}'..='\u{11FF}'
        | '\u{3130}'..='\u{318F}'
        | '\u{A960}'..='\u{A97F}'
        | '\u{D7B0}'..='\u{D7FF}' => Group::Hangul,
        '\u{4E00}'..='\u{9FFF}' | '\u{3400}'..='\u{4DBF}' | '\u{F900}'..='\u{FAFF}' => Group::Han,
        c if c.is_alphabetic() => Group::Other,
        _ => Group::Common,
    }
}

fn keys(s: &str) -> impl Iterator<Item = (Group, char)> + '_ {
    s.chars()
        .flat_map(char::to_lowercase)
        .map(|c| (group(c), c))
}

/// Compares two display names.
///
/// Case-insensitive first, then by raw code points so the order is total
/// and deterministic.
pub fn compare(a: &str, b: &str) -> Ordering {
    keys(a).cmp(keys(b)).then_with(|| a.cmp(b))
}

/// Sorts values in place by a name key using [`compare`].
pub fn sort_by_name<T, F>(values: &mut [T], name: F)
where
    F: Fn(&T) -> &str,
{
    values.sort_by(|a, b| compare(name(a), name(b)));
}
