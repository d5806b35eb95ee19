//! Loose text comparison for labels typed by hand in journal exports.

/// Folds a label for comparison.
///
/// Lowercases, strips French diacritics, unifies apostrophes and removes all
/// whitespace (including a leading byte-order mark), so `"N° Ordre"`,
/// `"n°ordre"` and `" N°  ORDRE "` fold to the same value.
///
/// # Examples
///
/// ```
/// use habitat_common::fold_label;
///
/// assert_eq!(fold_label("Code Décision"), fold_label("code decision"));
/// assert_eq!(fold_label("Aïn Témouchent"), "aintemouchent");
/// ```
pub fn fold_label(value: &str) -> String {
    value
        .chars()
        .filter(|ch| !ch.is_whitespace() && *ch != '\u{feff}')
        .flat_map(char::to_lowercase)
        .map(fold_char)
        .collect()
}

fn fold_char(ch: char) -> char {
    match ch {
        'à' | 'â' | 'ä' | 'á' => 'a',
        'ç' => 'c',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'î' | 'ï' | 'í' => 'i',
        'ô' | 'ö' | 'ó' => 'o',
        'ù' | 'û' | 'ü' | 'ú' => 'u',
        'ÿ' => 'y',
        '’' | '‘' | '`' => '\'',
        other => other,
    }
}
