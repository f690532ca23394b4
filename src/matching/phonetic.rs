// src/matching/phonetic.rs
use rphonetic::{Encoder, Soundex};

use crate::matching::similarity::to_percent;

/// Soundex code for every word of a normalized name.
///
/// Only the ASCII letters of a word are encoded; letters such as Ł, Ø or Cyrillic
/// that survive accent folding are dropped first, and words left without letters are skipped.
pub fn soundex_codes(normalized_name: &str) -> Vec<String> {
    let soundex = Soundex::default();
    normalized_name
        .split_whitespace()
        .map(|token| token.chars().filter(char::is_ascii_alphabetic).collect::<String>())
        .filter(|letters| !letters.is_empty())
        .map(|letters| soundex.encode(&letters))
        .filter(|code| !code.is_empty())
        .collect()
}

/// Share of the shorter name's codes found among the longer name's codes.
/// Each code on the longer side can only be matched once.
pub fn soundex_score(a: &[String], b: &[String]) -> u8 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    let mut used = vec![false; longer.len()];
    let mut matched = 0usize;
    for code in shorter {
        if let Some(idx) = (0..longer.len()).find(|&i| !used[i] && longer[i] == *code) {
            used[idx] = true;
            matched += 1;
        }
    }
    to_percent(matched as f64 / shorter.len() as f64)
}
