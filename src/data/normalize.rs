//! Accent- and case-insensitive text folding used for name matching.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Lowercase, decompose (NFD) and drop combining marks: "São Paulo" -> "sao paulo".
pub fn normalize(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    value
        .to_lowercase()
        .nfd()
        .filter(|ch| !is_combining_mark(*ch))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::normalize;

    #[test]
    fn strips_accents_and_case() {
        assert_eq!(normalize("São Paulo"), "sao paulo");
        assert_eq!(normalize("JOÃO Conceição"), "joao conceicao");
        assert_eq!(normalize("Florianópolis"), "florianopolis");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn accent_variants_fold_together() {
        assert_eq!(normalize("São"), normalize("Sao"));
        assert_eq!(normalize("ÁGUA"), normalize("agua"));
    }

    #[test]
    fn is_idempotent() {
        for input in ["São José", "Içara", "plain ascii", "Ñandú", "  Brusque  "] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn precomposed_and_decomposed_forms_match() {
        let decomposed = "Sa\u{0303}o";
        assert_eq!(normalize(decomposed), "sao");
    }
}
