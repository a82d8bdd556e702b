//! Detection of atypical words and of text fragments repeated across documents.
//!
//! Scanned documents and web pages often carry noise such as `"aaaa"`,
//! `"abcde"` or `"xkcdq"`, and boilerplate (headers, disclaimers) that shows
//! up in most documents of a collection. Both are removed here.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::analysis::tokenizer::{detokenize, tokenize};
use crate::cleaning::basic::remove_accents;
use crate::error::Result;

/// Find the longest common substring of `a[alo..ahi]` and `b[blo..bhi]`.
///
/// Ties resolve to the earliest position in `a`, then in `b`.
fn longest_match(
    a: &[char],
    b: &[char],
    (alo, ahi): (usize, usize),
    (blo, bhi): (usize, usize),
) -> (usize, usize, usize) {
    let mut best = (alo, blo, 0);
    let mut prev = vec![0usize; bhi - blo + 1];
    let mut curr = vec![0usize; bhi - blo + 1];

    for i in alo..ahi {
        for j in blo..bhi {
            let k = j - blo + 1;
            curr[k] = if a[i] == b[j] { prev[k - 1] + 1 } else { 0 };
            if curr[k] > best.2 {
                best = (i + 1 - curr[k], j + 1 - curr[k], curr[k]);
            }
        }
        std::mem::swap(&mut prev, &mut curr);
        curr.iter_mut().for_each(|v| *v = 0);
    }
    best
}

/// Non-overlapping matching blocks of two strings, in order of appearance.
fn matching_blocks(a: &[char], b: &[char]) -> Vec<(usize, usize, usize)> {
    let mut blocks = Vec::new();
    let mut queue = vec![((0, a.len()), (0, b.len()))];

    while let Some((ar, br)) = queue.pop() {
        if ar.0 >= ar.1 || br.0 >= br.1 {
            continue;
        }
        let (i, j, k) = longest_match(a, b, ar, br);
        if k > 0 {
            blocks.push((i, j, k));
            queue.push(((ar.0, i), (br.0, j)));
            queue.push(((i + k, ar.1), (j + k, br.1)));
        }
    }

    blocks.sort_unstable();
    blocks
}

/// Substrings shared by two texts with at least `min_len` characters.
pub fn common_substrings(s1: &str, s2: &str, min_len: usize) -> Vec<String> {
    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();
    matching_blocks(&a, &b)
        .into_iter()
        .filter(|&(_, _, k)| k >= min_len)
        .map(|(i, _, k)| a[i..i + k].iter().collect())
        .collect()
}

/// Fragments repeated across a collection of texts.
///
/// Every pair of texts contributes its common substrings. A fragment is
/// kept when it was found in at least `texts.len() * prop` pairs and has at
/// least `n_min` words. Fragments are returned in first-seen order.
pub fn detect_matches(texts: &[&str], prop: f64, n_min: usize, min_len: usize) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut order = Vec::new();

    for i in 0..texts.len() {
        for j in i + 1..texts.len() {
            for fragment in common_substrings(texts[i], texts[j], min_len) {
                let count = counts.entry(fragment.clone()).or_insert(0);
                if *count == 0 {
                    order.push(fragment);
                }
                *count += 1;
            }
        }
    }

    let threshold = texts.len() as f64 * prop;
    order
        .into_iter()
        .filter(|fragment| counts[fragment] as f64 >= threshold)
        .filter(|fragment| fragment.split_whitespace().count() >= n_min)
        .collect()
}

/// Replace every fragment found by [`detect_matches`] with a space.
pub fn remove_matches(texts: &[&str], prop: f64, n_min: usize, min_len: usize) -> Vec<String> {
    let matches = detect_matches(texts, prop, n_min, min_len);
    texts
        .iter()
        .map(|text| {
            matches
                .iter()
                .fold(text.to_string(), |acc, fragment| acc.replace(fragment.as_str(), " "))
        })
        .collect()
}

fn prepare(word: &str, clean: bool) -> String {
    if clean {
        remove_accents(word).to_lowercase()
    } else {
        word.to_string()
    }
}

/// Whether some ASCII letter or digit appears `n` times in a row.
pub fn repeated_chars(word: &str, n: usize, clean: bool) -> bool {
    if n == 0 {
        return false;
    }
    let word = prepare(word, clean);
    let mut run = 0;
    let mut last = None;
    for c in word.chars() {
        if c.is_ascii_alphanumeric() && Some(c) == last {
            run += 1;
        } else {
            run = 1;
        }
        last = Some(c);
        if c.is_ascii_alphanumeric() && run >= n {
            return true;
        }
    }
    false
}

/// Whether `n` ascending characters (`abc`, `345`) appear in a row.
pub fn consecutive_chars(word: &str, n: usize, clean: bool) -> bool {
    if n == 0 {
        return false;
    }
    let word = prepare(word, clean);
    let same_class = |a: char, b: char| {
        (a.is_ascii_digit() && b.is_ascii_digit()) || (a.is_ascii_lowercase() && b.is_ascii_lowercase())
    };

    let mut run = 0;
    let mut last: Option<char> = None;
    for c in word.chars() {
        run = match last {
            Some(prev) if same_class(prev, c) && c as u32 == prev as u32 + 1 => run + 1,
            _ if c.is_ascii_digit() || c.is_ascii_lowercase() => 1,
            _ => 0,
        };
        last = Some(c);
        if run >= n {
            return true;
        }
    }
    false
}

/// Whether `n` consonants appear in a row. `y` counts as a vowel when
/// `include_y` is set.
pub fn consecutive_consonants(word: &str, n: usize, include_y: bool, clean: bool) -> bool {
    if n == 0 {
        return false;
    }
    let word = prepare(word, clean).to_lowercase();
    let mut run = 0;
    for c in word.chars() {
        let vowel = matches!(c, 'a' | 'e' | 'i' | 'o' | 'u') || (include_y && c == 'y');
        if c.is_ascii_lowercase() && !vowel {
            run += 1;
            if run >= n {
                return true;
            }
        } else {
            run = 0;
        }
    }
    false
}

/// Thresholds for [`remove_atypical_words`].
///
/// `None` disables a criterion. `Some(0)` picks the threshold from the word
/// length: 1 char never fires, 2 or 3 chars use 2, 4 chars use 3, longer words
/// use 4.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtypicalConfig {
    pub n_repeated: Option<usize>,
    pub n_consecutive: Option<usize>,
    pub n_consonants: Option<usize>,
    pub include_y: bool,
    pub clean: bool,
}

impl Default for AtypicalConfig {
    fn default() -> Self {
        AtypicalConfig {
            n_repeated: Some(0),
            n_consecutive: Some(0),
            n_consonants: Some(0),
            include_y: true,
            clean: true,
        }
    }
}

fn threshold_for_length(len: usize) -> usize {
    match len {
        1 => 0,
        2 | 3 => 2,
        4 => 3,
        _ => 4,
    }
}

/// Whether a single word meets any of the criteria of `config`.
pub fn is_atypical(word: &str, config: &AtypicalConfig) -> bool {
    let checked = prepare(word, config.clean);
    let by_length = threshold_for_length(checked.chars().count());
    let resolve = |n: Option<usize>| n.map(|n| if n == 0 { by_length } else { n });

    resolve(config.n_repeated).is_some_and(|n| repeated_chars(&checked, n, false))
        || resolve(config.n_consecutive).is_some_and(|n| consecutive_chars(&checked, n, false))
        || resolve(config.n_consonants)
            .is_some_and(|n| consecutive_consonants(&checked, n, config.include_y, false))
}

/// Drop the words of a text that look like noise.
pub fn remove_atypical_words(text: &str, config: &AtypicalConfig) -> Result<String> {
    let kept: Vec<String> = tokenize(text, None)?
        .into_iter()
        .filter(|word| !is_atypical(word, config))
        .collect();
    Ok(detokenize(&kept, None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_substrings() {
        let found = common_substrings(
            "Documento oficial de la alcaldía: informe anual",
            "Resumen. Documento oficial de la alcaldía: cuentas",
            10,
        );
        assert_eq!(found, vec!["Documento oficial de la alcaldía: "]);
        assert!(common_substrings("abc", "xyz", 1).is_empty());
    }

    #[test]
    fn test_detect_and_remove_matches() {
        let texts = [
            "Alcaldía de Bogotá - informe de gestión: vías",
            "Alcaldía de Bogotá - informe de gestión: salud",
            "Otro texto sin encabezado alguno",
        ];
        let matches = detect_matches(&texts, 0.3, 2, 10);
        assert_eq!(matches, vec!["Alcaldía de Bogotá - informe de gestión: "]);

        let cleaned = remove_matches(&texts, 0.3, 2, 10);
        assert_eq!(cleaned[0], " vías");
        assert_eq!(cleaned[2], texts[2]);
    }

    #[test]
    fn test_character_criteria() {
        assert!(repeated_chars("animaaal", 3, true));
        assert!(!repeated_chars("animaal", 3, true));
        assert!(repeated_chars("ÁÁh", 2, true));

        assert!(consecutive_chars("1234555", 4, true));
        assert!(consecutive_chars("xabcdx", 4, true));
        assert!(!consecutive_chars("abd", 3, true));
        assert!(!consecutive_chars("a1b2", 2, true));

        assert!(consecutive_consonants("Abstracto", 4, true, true));
        assert!(!consecutive_consonants("reyna", 2, true, true));
        assert!(consecutive_consonants("reyna", 2, false, true));
    }

    #[test]
    fn test_remove_atypical_words() {
        let config = AtypicalConfig::default();
        let cleaned = remove_atypical_words("El informe xkcdq tiene aaaa errores abcd", &config).unwrap();
        assert_eq!(cleaned, "El informe tiene errores");

        let only_repeated = AtypicalConfig {
            n_repeated: Some(3),
            n_consecutive: None,
            n_consonants: None,
            ..AtypicalConfig::default()
        };
        let cleaned = remove_atypical_words("xkcdq y aaaa", &only_repeated).unwrap();
        assert_eq!(cleaned, "xkcdq y");
    }
}
