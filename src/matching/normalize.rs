// src/matching/normalize.rs
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

static ADDRESS_ABBREVIATIONS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"\b(ST|STR)\b", "STREET"),
        (r"\b(AVE|AV)\b", "AVENUE"),
        (r"\bRD\b", "ROAD"),
        (r"\b(BLVD|BLV)\b", "BOULEVARD"),
        (r"\bDR\b", "DRIVE"),
        (r"\bHWY\b", "HIGHWAY"),
        (r"\bEXT\b", "EXTENSION"),
        (r"\b(BRGY|BRG|BGY)\b", "BARANGAY"),
        (r"\bPOB\b", "POBLACION"),
        (r"\bPROV\b", "PROVINCE"),
        (r"\bMUN\b", "MUNICIPALITY"),
        (r"\bSUBD\b", "SUBDIVISION"),
        (r"\bSTO\b", "SANTO"),
        (r"\bSTA\b", "SANTA"),
    ]
    .into_iter()
    .filter_map(|(pattern, replacement)| Regex::new(pattern).ok().map(|re| (re, replacement)))
    .collect()
});

/// Strips accents, so "Peñaranda" and "Penaranda" compare equal.
pub fn fold_diacritics(s: &str) -> String {
    s.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Uppercased, accent-free text with punctuation removed and whitespace collapsed.
fn normalize_text(s: &str) -> String {
    let folded = fold_diacritics(s).to_uppercase();
    let mut cleaned = String::with_capacity(folded.len());
    for c in folded.chars() {
        match c {
            '\'' | '’' | '`' => {}
            c if c.is_alphanumeric() => cleaned.push(c),
            _ => cleaned.push(' '),
        }
    }
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn normalize_name(name: &str) -> String {
    normalize_text(name)
}

/// Normalizes a free-text location and expands common street and locality abbreviations.
pub fn normalize_address(address: &str) -> String {
    let mut normalized = normalize_text(address);
    for (re, replacement) in ADDRESS_ABBREVIATIONS.iter() {
        normalized = re.replace_all(&normalized, *replacement).into_owned();
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_normalization() {
        assert_eq!(normalize_name("Dela Cruz"), "DELA CRUZ");
        assert_eq!(normalize_name("  DELA   CRUZ "), "DELA CRUZ");
        assert_eq!(normalize_name("José Peñaranda-Ibáñez"), "JOSE PENARANDA IBANEZ");
        assert_eq!(normalize_name("O'Brien, Ma. Teresa"), "OBRIEN MA TERESA");
        assert_eq!(normalize_name(" \t "), "");
    }

    #[test]
    fn test_address_normalization() {
        assert_eq!(
            normalize_address("123 Rizal St, Baler, Aurora"),
            "123 RIZAL STREET BALER AURORA"
        );
        assert_eq!(
            normalize_address("123 RIZAL STREET,  BALER, AURORA"),
            "123 RIZAL STREET BALER AURORA"
        );
        assert_eq!(
            normalize_address("Brgy. Sto. Niño, Dipaculao"),
            "BARANGAY SANTO NINO DIPACULAO"
        );
    }

    #[test]
    fn test_abbreviation_only_whole_words() {
        // "STREET" and "STAR" must not be touched by the ST/STA rules
        assert_eq!(normalize_address("Star Street"), "STAR STREET");
    }
}
