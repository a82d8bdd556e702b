//! String edit distances and similarities.
//!
//! All functions work on Unicode scalar values, so `"año"` has length 3.

use std::cmp::min;
use std::collections::HashMap;

/// Calculate the Levenshtein distance between two strings.
///
/// This is the minimum number of single-character insertions, deletions or
/// substitutions required to change one string into the other.
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();
    let (len1, len2) = (s1_chars.len(), s2_chars.len());

    if len1 == 0 {
        return len2;
    }
    if len2 == 0 {
        return len1;
    }

    let mut prev_row: Vec<usize> = (0..=len2).collect();
    let mut curr_row = vec![0; len2 + 1];

    for i in 1..=len1 {
        curr_row[0] = i;
        for j in 1..=len2 {
            let cost = usize::from(s1_chars[i - 1] != s2_chars[j - 1]);
            curr_row[j] = min(
                min(prev_row[j] + 1, curr_row[j - 1] + 1),
                prev_row[j - 1] + cost,
            );
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[len2]
}

/// Calculate Levenshtein distance with a maximum threshold for early termination.
///
/// Returns `None` if the distance exceeds the threshold.
pub fn levenshtein_distance_threshold(s1: &str, s2: &str, threshold: usize) -> Option<usize> {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();
    let (len1, len2) = (s1_chars.len(), s2_chars.len());

    if len1.abs_diff(len2) > threshold {
        return None;
    }
    if len1 == 0 || len2 == 0 {
        let distance = len1.max(len2);
        return (distance <= threshold).then_some(distance);
    }

    let mut prev_row: Vec<usize> = (0..=len2).collect();
    let mut curr_row = vec![0; len2 + 1];

    for i in 1..=len1 {
        curr_row[0] = i;
        let mut min_in_row = i;

        for j in 1..=len2 {
            let cost = usize::from(s1_chars[i - 1] != s2_chars[j - 1]);
            curr_row[j] = min(
                min(prev_row[j] + 1, curr_row[j - 1] + 1),
                prev_row[j - 1] + cost,
            );
            min_in_row = min(min_in_row, curr_row[j]);
        }

        if min_in_row > threshold {
            return None;
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    let distance = prev_row[len2];
    (distance <= threshold).then_some(distance)
}

/// Calculate the (unrestricted) Damerau-Levenshtein distance.
///
/// Transpositions of adjacent characters count as one edit, and substrings
/// may be edited more than once (`"ca"` to `"abc"` is 2).
pub fn damerau_levenshtein_distance(s1: &str, s2: &str) -> usize {
    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();
    let (len1, len2) = (a.len(), b.len());

    if len1 == 0 {
        return len2;
    }
    if len2 == 0 {
        return len1;
    }

    let max_dist = len1 + len2;
    let mut last_row: HashMap<char, usize> = HashMap::new();
    // Matrix with an extra border row/column holding `max_dist`
    let mut d = vec![vec![0usize; len2 + 2]; len1 + 2];
    d[0][0] = max_dist;
    for i in 0..=len1 {
        d[i + 1][0] = max_dist;
        d[i + 1][1] = i;
    }
    for j in 0..=len2 {
        d[0][j + 1] = max_dist;
        d[1][j + 1] = j;
    }

    for i in 1..=len1 {
        let mut last_match_col = 0;
        for j in 1..=len2 {
            let i1 = last_row.get(&b[j - 1]).copied().unwrap_or(0);
            let j1 = last_match_col;
            let cost = if a[i - 1] == b[j - 1] {
                last_match_col = j;
                0
            } else {
                1
            };

            d[i + 1][j + 1] = min(
                min(d[i][j] + cost, d[i + 1][j] + 1),
                min(
                    d[i][j + 1] + 1,
                    d[i1][j1] + (i - i1 - 1) + 1 + (j - j1 - 1),
                ),
            );
        }
        last_row.insert(a[i - 1], i);
    }

    d[len1 + 1][len2 + 1]
}

/// Number of positions at which two strings differ; extra characters of the
/// longer string count as differences.
pub fn hamming_distance(s1: &str, s2: &str) -> usize {
    let mut a = s1.chars();
    let mut b = s2.chars();
    let mut distance = 0;
    loop {
        match (a.next(), b.next()) {
            (Some(x), Some(y)) => distance += usize::from(x != y),
            (Some(_), None) | (None, Some(_)) => distance += 1,
            (None, None) => return distance,
        }
    }
}

/// Jaro similarity in `[0, 1]`.
pub fn jaro_similarity(s1: &str, s2: &str) -> f64 {
    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();

    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let window = (a.len().max(b.len()) / 2).saturating_sub(1);
    let mut a_matched = vec![false; a.len()];
    let mut b_matched = vec![false; b.len()];
    let mut matches = 0usize;

    for (i, &c) in a.iter().enumerate() {
        let lo = i.saturating_sub(window);
        let hi = min(i + window + 1, b.len());
        for j in lo..hi {
            if !b_matched[j] && b[j] == c {
                a_matched[i] = true;
                b_matched[j] = true;
                matches += 1;
                break;
            }
        }
    }

    if matches == 0 {
        return 0.0;
    }

    let a_seq = a.iter().zip(&a_matched).filter(|(_, m)| **m).map(|(c, _)| c);
    let b_seq = b.iter().zip(&b_matched).filter(|(_, m)| **m).map(|(c, _)| c);
    let transpositions = a_seq.zip(b_seq).filter(|(x, y)| x != y).count() / 2;

    let m = matches as f64;
    (m / a.len() as f64 + m / b.len() as f64 + (m - transpositions as f64) / m) / 3.0
}

/// Jaro-Winkler similarity in `[0, 1]`, boosting strings that share a prefix
/// of up to four characters.
pub fn jaro_winkler_similarity(s1: &str, s2: &str) -> f64 {
    let jaro = jaro_similarity(s1, s2);
    let prefix = s1
        .chars()
        .zip(s2.chars())
        .take(4)
        .take_while(|(x, y)| x == y)
        .count();
    jaro + prefix as f64 * 0.1 * (1.0 - jaro)
}

/// Normalized Levenshtein similarity: 1.0 for identical strings, 0.0 for
/// completely different ones.
pub fn levenshtein_ratio(s1: &str, s2: &str) -> f64 {
    let max_len = s1.chars().count().max(s2.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - levenshtein_distance(s1, s2) as f64 / max_len as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(levenshtein_distance("", ""), 0);
        assert_eq!(levenshtein_distance("", "a"), 1);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("año", "ano"), 1);
        assert_eq!(levenshtein_distance("casa", "csaa"), 2);
    }

    #[test]
    fn test_levenshtein_distance_threshold() {
        assert_eq!(levenshtein_distance_threshold("kitten", "sitting", 3), Some(3));
        assert_eq!(levenshtein_distance_threshold("kitten", "sitting", 2), None);
        assert_eq!(levenshtein_distance_threshold("casa", "casa", 0), Some(0));
        assert_eq!(levenshtein_distance_threshold("a", "abc", 1), None);
        assert_eq!(levenshtein_distance_threshold("", "ab", 2), Some(2));
    }

    #[test]
    fn test_damerau_levenshtein_distance() {
        assert_eq!(damerau_levenshtein_distance("", "abc"), 3);
        assert_eq!(damerau_levenshtein_distance("ab", "ba"), 1);
        assert_eq!(damerau_levenshtein_distance("casa", "csaa"), 1);
        assert_eq!(damerau_levenshtein_distance("ca", "abc"), 2);
        assert_eq!(damerau_levenshtein_distance("kitten", "sitting"), 3);
    }

    #[test]
    fn test_hamming_distance() {
        assert_eq!(hamming_distance("casa", "cosa"), 1);
        assert_eq!(hamming_distance("casa", "casas"), 1);
        assert_eq!(hamming_distance("", ""), 0);
    }

    #[test]
    fn test_jaro() {
        assert!(close(jaro_similarity("martha", "marhta"), 0.944));
        assert!(close(jaro_similarity("dixon", "dicksonx"), 0.767));
        assert!(close(jaro_similarity("abc", "xyz"), 0.0));
        assert!(close(jaro_winkler_similarity("martha", "marhta"), 0.961));
        assert!(close(jaro_winkler_similarity("dwayne", "duane"), 0.84));
    }

    #[test]
    fn test_levenshtein_ratio() {
        assert!(close(levenshtein_ratio("", ""), 1.0));
        assert!(close(levenshtein_ratio("abc", "abc"), 1.0));
        assert!(close(levenshtein_ratio("abc", "def"), 0.0));
        assert!(close(levenshtein_ratio("casa", "cosa"), 0.75));
    }
}
