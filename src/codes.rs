//! Comma-encoded code sets.
//!
//! Multi-valued attributes (job categories, locations, gender requirements,
//! benefits) are stored in a single text column as comma-joined integer
//! codes, e.g. `"1,2,3"`. The domain layer works with `Vec<i32>`; this module
//! is the only place that encodes/decodes the storage form.

use std::collections::HashMap;

/// Decode a stored comma-joined list into codes. Blank and malformed tokens
/// are skipped rather than failing the whole row.
pub fn decode(raw: &str) -> Vec<i32> {
    raw.split(',')
        .filter_map(|tok| tok.trim().parse::<i32>().ok())
        .collect()
}

/// Encode codes into the stored comma-joined form, dropping duplicates while
/// keeping first-seen order.
pub fn encode(codes: &[i32]) -> String {
    let mut seen = Vec::with_capacity(codes.len());
    for &code in codes {
        if !seen.contains(&code) {
            seen.push(code);
        }
    }
    seen.iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Whole-token membership test against a stored list.
///
/// A code matches only as a complete comma-delimited element, so `10` does
/// not match inside `"100"` or `"1,100"`.
pub fn contains(raw: &str, code: i32) -> bool {
    decode(raw).contains(&code)
}

/// Tally code occurrences across many stored lists. A row listing a code
/// twice still counts it once.
pub fn tally<'a, I>(rows: I) -> HashMap<i32, i64>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts = HashMap::new();
    for raw in rows {
        let mut codes = decode(raw);
        codes.sort_unstable();
        codes.dedup();
        for code in codes {
            *counts.entry(code).or_insert(0) += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_splits_on_commas() {
        assert_eq!(decode("1,2,3"), vec![1, 2, 3]);
        assert_eq!(decode("7"), vec![7]);
    }

    #[test]
    fn decode_skips_blank_and_garbage_tokens() {
        assert_eq!(decode("1,,2"), vec![1, 2]);
        assert_eq!(decode(" 3 , x ,4"), vec![3, 4]);
        assert_eq!(decode(""), Vec::<i32>::new());
    }

    #[test]
    fn encode_joins_and_dedupes() {
        assert_eq!(encode(&[10, 20, 10]), "10,20");
        assert_eq!(encode(&[5]), "5");
        assert_eq!(encode(&[]), "");
    }

    #[test]
    fn contains_matches_whole_tokens_only() {
        assert!(contains("10,20", 10));
        assert!(contains("10,20", 20));
        assert!(!contains("10,20", 1));
        assert!(!contains("10,20", 0));
        assert!(!contains("10,20", 100));
        assert!(!contains("100", 10));
    }

    #[test]
    fn tally_counts_each_list_once_per_code() {
        let counts = tally(["1,2", "2", "3", "2,2"]);
        assert_eq!(counts[&1], 1);
        assert_eq!(counts[&2], 3);
        assert_eq!(counts[&3], 1);
    }
}
