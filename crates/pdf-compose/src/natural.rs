//! Numeric-aware filename ordering
//!
//! Names are split into runs of ASCII digits and runs of everything else.
//! Digit runs compare by value (`img2` before `img10`), other runs compare
//! case-insensitively by code point.

use std::cmp::Ordering;

#[derive(Debug, PartialEq, Eq)]
enum Chunk<'a> {
    Digits(&'a str),
    Text(&'a str),
}

fn chunks(name: &str) -> Vec<Chunk<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_digits: Option<bool> = None;

    for (i, ch) in name.char_indices() {
        let is_digit = ch.is_ascii_digit();
        match in_digits {
            Some(prev) if prev != is_digit => {
                out.push(make_chunk(&name[start..i], prev));
                start = i;
            }
            _ => {}
        }
        in_digits = Some(is_digit);
    }

    if let Some(prev) = in_digits {
        out.push(make_chunk(&name[start..], prev));
    }
    out
}

fn make_chunk(s: &str, digits: bool) -> Chunk<'_> {
    if digits { Chunk::Digits(s) } else { Chunk::Text(s) }
}

/// Compare digit runs by numeric value without parsing, so arbitrarily long
/// runs never overflow. Equal values with more leading zeros sort later.
fn cmp_digits(a: &str, b: &str) -> Ordering {
    let a_trim = a.trim_start_matches('0');
    let b_trim = b.trim_start_matches('0');
    a_trim
        .len()
        .cmp(&b_trim.len())
        .then_with(|| a_trim.cmp(b_trim))
        .then_with(|| a.len().cmp(&b.len()))
}

fn cmp_text(a: &str, b: &str) -> Ordering {
    let a_lower = a.chars().flat_map(char::to_lowercase);
    let b_lower = b.chars().flat_map(char::to_lowercase);
    a_lower.cmp(b_lower)
}

/// Natural order of two display names
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let a_chunks = chunks(a);
    let b_chunks = chunks(b);

    for (x, y) in a_chunks.iter().zip(b_chunks.iter()) {
        let ord = match (x, y) {
            (Chunk::Digits(x), Chunk::Digits(y)) => cmp_digits(x, y),
            (Chunk::Text(x), Chunk::Text(y)) => cmp_text(x, y),
            // Mixed kinds: fall back to the characters themselves
            (Chunk::Digits(x), Chunk::Text(y)) | (Chunk::Text(x), Chunk::Digits(y)) => {
                cmp_text(x, y)
            }
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    a_chunks
        .len()
        .cmp(&b_chunks.len())
        // Names equal under the rules above still need a total order
        .then_with(|| a.cmp(b))
}

/// Sort items in place by the natural order of the key
pub fn sort_naturally<T>(items: &mut [T], key: impl Fn(&T) -> &str) {
    items.sort_by(|a, b| natural_cmp(key(a), key(b)));
}
