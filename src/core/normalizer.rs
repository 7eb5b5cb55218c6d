use unicode_normalization::UnicodeNormalization;

fn is_combining_diacritic(ch: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&ch)
}

/// Canonical comparison form: NBSP folded, NFD with combining marks
/// stripped, lower-cased, whitespace collapsed and trimmed.
///
/// Lower-casing runs before decomposition so that case mappings which emit
/// combining marks (`İ` -> `i̇`) are stripped in the same pass.
pub fn normalize(s: &str) -> String {
    let folded: String = s
        .replace('\u{00a0}', " ")
        .to_lowercase()
        .nfd()
        .filter(|ch| !is_combining_diacritic(*ch))
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `normalize` padded with one space on each side for boundary checks.
pub fn padded(s: &str) -> String {
    format!(" {} ", normalize(s))
}
