//! Text normalization for OCR label matching.
//!
//! OCR output and user-spoken targets rarely agree on quoting, trailing
//! punctuation or case, so every comparison in the locator goes through
//! [`normalize`] first.

/// Quote variants deleted outright (not replaced with a space).
const QUOTE_CHARS: [char; 8] = ['‘', '’', '“', '”', '\'', '"', '«', '»'];

/// Normalize a label for comparison: delete quote variants, trim leading
/// and trailing ASCII punctuation and spaces, lower-case.
///
/// Only ASCII punctuation is trimmed; non-ASCII punctuation other than the
/// quote set above survives. Cyrillic and other scripts are lower-cased
/// with plain Unicode case conversion, nothing locale-specific.
pub fn normalize(text: &str) -> String {
    let unquoted: String = text.chars().filter(|c| !QUOTE_CHARS.contains(c)).collect();
    unquoted
        .trim_matches(|c: char| c.is_ascii_punctuation() || c == ' ')
        .to_lowercase()
}

/// Make a window title safe to use as a file name: anything that is not
/// alphanumeric, space, underscore or hyphen becomes an underscore.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == ' ' || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_guillemets_and_lowercases() {
        assert_eq!(normalize("«Вход/Регистрация»"), "вход/регистрация");
    }

    #[test]
    fn test_normalize_trims_punctuation_and_spaces() {
        assert_eq!(normalize("  'Submit.'  "), "submit");
    }

    #[test]
    fn test_normalize_deletes_curly_quotes() {
        assert_eq!(normalize("“Save”"), "save");
        assert_eq!(normalize("don’t"), "dont");
    }

    #[test]
    fn test_normalize_keeps_interior_punctuation() {
        assert_eq!(normalize("file.txt"), "file.txt");
        assert_eq!(normalize("..a..b.."), "a..b");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            "«Вход/Регистрация»",
            "  'Submit.'  ",
            "“Save As…”",
            "ALREADY lower",
            "",
            "!!!",
            "временные файлы",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_normalize_can_return_empty() {
        assert_eq!(normalize("\"\""), "");
        assert_eq!(normalize("---"), "");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(
            sanitize_filename("Chrome - Вход | Сайт"),
            "Chrome - Вход _ Сайт"
        );
        assert_eq!(sanitize_filename("a/b\\c:d"), "a_b_c_d");
        assert_eq!(sanitize_filename("plain_name-1"), "plain_name-1");
    }
}
