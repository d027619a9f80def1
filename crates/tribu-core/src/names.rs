//! Name-field normalization.
//!
//! Name fields accept only Latin letters, including the accented vowels and
//! ñ/Ñ used in Spanish names. Everything else (spaces, digits, punctuation)
//! is stripped before the remainder is capitalized.

fn is_name_letter(c: char) -> bool {
    c.is_ascii_alphabetic()
        || matches!(
            c,
            'á' | 'é' | 'í' | 'ó' | 'ú' | 'Á' | 'É' | 'Í' | 'Ó' | 'Ú' | 'ñ' | 'Ñ'
        )
}

/// Strip every non-letter character, then capitalize: first letter uppercase,
/// the rest lowercase. Returns an empty string when nothing survives the
/// stripping — callers treat that as a validation failure for required names.
pub fn normalize_name(raw: &str) -> String {
    let mut letters = raw.chars().filter(|c| is_name_letter(*c));
    match letters.next() {
        None => String::new(),
        Some(first) => first
            .to_uppercase()
            .chain(letters.flat_map(char::to_lowercase))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_name;

    #[test]
    fn capitalizes_accented_first_letter() {
        assert_eq!(normalize_name("maría"), "María");
    }

    #[test]
    fn strips_digits_and_punctuation() {
        assert_eq!(normalize_name("gómez123"), "Gómez");
        assert_eq!(normalize_name("o'brien"), "Obrien");
    }

    #[test]
    fn lowercases_the_rest() {
        assert_eq!(normalize_name("JOSÉ"), "José");
    }

    #[test]
    fn keeps_enye() {
        assert_eq!(normalize_name("ñandú"), "Ñandú");
    }

    #[test]
    fn strips_spaces() {
        assert_eq!(normalize_name("ana maría"), "Anamaría");
    }

    #[test]
    fn empty_when_nothing_remains() {
        assert_eq!(normalize_name("12 34 !?"), "");
        assert_eq!(normalize_name(""), "");
    }
}
