//! Text helpers shared by the ads and content catalogs.

/// Replaces Romanian diacritics (both comma-below and legacy cedilla forms)
/// and a few common Latin accents with their ASCII base letter.
pub fn fold_diacritics(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            'ă' | 'â' | 'á' | 'à' | 'ä' => 'a',
            'Ă' | 'Â' | 'Á' | 'À' | 'Ä' => 'A',
            'î' | 'í' | 'ì' | 'ï' => 'i',
            'Î' | 'Í' | 'Ì' | 'Ï' => 'I',
            'ș' | 'ş' | 'š' => 's',
            'Ș' | 'Ş' | 'Š' => 'S',
            'ț' | 'ţ' => 't',
            'Ț' | 'Ţ' => 'T',
            'é' | 'è' | 'ë' => 'e',
            'É' | 'È' | 'Ë' => 'E',
            'ó' | 'ö' | 'ò' => 'o',
            'Ó' | 'Ö' | 'Ò' => 'O',
            'ú' | 'ü' | 'ù' => 'u',
            'Ú' | 'Ü' | 'Ù' => 'U',
            other => other,
        })
        .collect()
}

/// Trims and collapses runs of whitespace to a single space.
pub fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cuts `input` to at most `max_chars` characters, preferring a word boundary.
pub fn truncate_chars(input: &str, max_chars: usize) -> String {
    if input.chars().count() <= max_chars {
        return input.to_string();
    }
    let cut: String = input.chars().take(max_chars).collect();
    match cut.rfind(' ') {
        Some(space) if space > 0 => cut[..space].trim_end().to_string(),
        _ => cut,
    }
}

/// Uppercases the first character.
pub fn capitalize(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
