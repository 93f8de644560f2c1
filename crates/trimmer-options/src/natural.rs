//! Natural-order string comparison
//!
//! Orders strings the way people read numbered lists: `item2` before
//! `item10`. Used to keep array variant renumbering stable.
//!
//! Rules:
//! - When both sides sit on an ASCII digit, each consumes its maximal digit
//!   run. The shorter run sorts first; equal-length runs compare digit by
//!   digit. Leading zeros are not stripped, so `1 < 9 < 01 < 10`.
//! - Any other characters compare by code point.
//! - A strict prefix sorts before the longer string.
//! - An absent key sorts before any present key.

use std::cmp::Ordering;

/// Compare two strings in natural order
#[must_use]
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        if a[i].is_ascii_digit() && b[j].is_ascii_digit() {
            let run_a = digit_run(&a[i..]);
            let run_b = digit_run(&b[j..]);
            let ordering = run_a.len().cmp(&run_b.len()).then_with(|| run_a.cmp(run_b));
            if ordering != Ordering::Equal {
                return ordering;
            }
            i += run_a.len();
            j += run_b.len();
        } else {
            // Byte-wise comparison of UTF-8 preserves code point order
            let ordering = a[i].cmp(&b[j]);
            if ordering != Ordering::Equal {
                return ordering;
            }
            i += 1;
            j += 1;
        }
    }

    (a.len() - i).cmp(&(b.len() - j))
}

/// [`natural_cmp`] over optional keys, absent first
#[must_use]
pub fn natural_cmp_opt(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => natural_cmp(a, b),
    }
}

fn digit_run(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(bytes.len());
    &bytes[..end]
}
