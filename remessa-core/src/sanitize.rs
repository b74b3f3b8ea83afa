//! Text sanitization for positional fields
//!
//! The bank accepts a restricted alphabet. Names and keys are transliterated
//! to ASCII ("Ø" -> "O", "Æ" -> "AE"), upper-cased and stripped of anything
//! else.

use deunicode::deunicode;
use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref NON_DIGIT: Regex = Regex::new(r"[^0-9]").unwrap();
    static ref STRICT_REJECT: Regex = Regex::new(r"[^A-Z0-9 ]").unwrap();
    static ref PIX_KEY_REJECT: Regex = Regex::new(r"[^A-Z0-9 @.\-_]").unwrap();
}

/// Which characters survive sanitization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextPolicy {
    /// `A-Z`, `0-9` and space
    Strict,
    /// Strict plus `@ . - _` (e-mail and random PIX keys)
    PixKey,
}

/// Remove every character outside ASCII `0-9`
pub fn digits_only(value: &str) -> String {
    NON_DIGIT.replace_all(value, "").into_owned()
}

/// Drop diacritics: "Avó" -> "Avo", "Ç" -> "C"
pub fn strip_accents(value: &str) -> String {
    value.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Transliterate, upper-case, filter by policy and trim
pub fn sanitize_text(value: &str, policy: TextPolicy) -> String {
    if value.is_empty() {
        return String::new();
    }

    let upper = deunicode(value).to_uppercase();
    let filtered = match policy {
        TextPolicy::Strict => STRICT_REJECT.replace_all(&upper, ""),
        TextPolicy::PixKey => PIX_KEY_REJECT.replace_all(&upper, ""),
    };
    filtered.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digits_only() {
        assert_eq!(digits_only("111.222.333-44"), "11122233344");
        assert_eq!(digits_only("12.345.678/0001-99"), "12345678000199");
        assert_eq!(digits_only(""), "");
        assert_eq!(digits_only("abc"), "");
    }

    #[test]
    fn test_strict_removes_accents_and_symbols() {
        assert_eq!(
            sanitize_text("João da Conceição & Filhos", TextPolicy::Strict),
            "JOAO DA CONCEICAO  FILHOS"
        );
        assert_eq!(sanitize_text("  Avó  ", TextPolicy::Strict), "AVO");
    }

    #[test]
    fn test_pix_key_keeps_email_characters() {
        assert_eq!(
            sanitize_text("maria.silva_01@pix-exemplo.com", TextPolicy::PixKey),
            "MARIA.SILVA_01@PIX-EXEMPLO.COM"
        );
        assert_eq!(
            sanitize_text("maria@pix.com", TextPolicy::Strict),
            "MARIAPIXCOM"
        );
    }

    #[test]
    fn test_phone_key_loses_plus_sign() {
        assert_eq!(
            sanitize_text("+55 11 98888-7777", TextPolicy::PixKey),
            "55 11 98888-7777"
        );
    }

    #[test]
    fn test_letters_without_decomposition_are_transliterated() {
        assert_eq!(
            sanitize_text("Søren Ærø Łukasz Đorđe", TextPolicy::Strict),
            "SOREN AERO LUKASZ DORDE"
        );
        assert_eq!(sanitize_text("Cœur Straße", TextPolicy::Strict), "COEUR STRASSE");
    }

    #[test]
    fn test_non_ascii_digits_are_dropped() {
        // Arabic-Indic and fullwidth digits
        assert_eq!(digits_only("\u{0661}\u{0662}3"), "3");
        assert_eq!(digits_only("\u{FF11}\u{FF12}45"), "45");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(sanitize_text("", TextPolicy::Strict), "");
    }
}
