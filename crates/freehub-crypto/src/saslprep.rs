//! SASL-style password preparation ([RFC 4013](https://datatracker.ietf.org/doc/html/rfc4013)).
//!
//! The hub derives its stored verifiers from the prepared form of the
//! password, so the exact mapping and removal sets below are part of the
//! wire contract and must not drift.

use thiserror::Error;
use unicode_bidi::{bidi_class, BidiClass};
use unicode_normalization::UnicodeNormalization;
use unicode_properties::{GeneralCategoryGroup, UnicodeGeneralCategory};

/// The password cannot be used for authentication as provided.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SaslPrepError {
    /// A character outside the letter/mark/number/punctuation/symbol/
    /// whitespace categories survived normalization.
    #[error("Password contains a prohibited character")]
    ProhibitedCharacter(
        /// The offending character.
        char,
    ),
    /// Left-to-right and right-to-left runs are mixed in a way the bidi
    /// rule does not allow.
    #[error("Password mixes bidirectional text")]
    MixedBidi,
}

/// Non-ASCII space separators that fold to a plain ASCII space.
fn is_mapped_to_space(c: char) -> bool {
    matches!(
        c,
        '\u{00A0}' | '\u{1680}' | '\u{2000}'..='\u{200A}' | '\u{202F}' | '\u{205F}' | '\u{3000}'
    )
}

/// Invisible and formatting code points that are mapped to nothing.
fn is_mapped_to_nothing(c: char) -> bool {
    matches!(
        c,
        '\u{00AD}'
            | '\u{034F}'
            | '\u{1806}'
            | '\u{180B}'..='\u{180D}'
            | '\u{200B}'..='\u{200D}'
            | '\u{2060}'
            | '\u{FE00}'..='\u{FE0F}'
            | '\u{FEFF}'
    )
}

fn is_prohibited(c: char) -> bool {
    if c.is_whitespace() {
        return false;
    }
    !matches!(
        c.general_category_group(),
        GeneralCategoryGroup::Letter
            | GeneralCategoryGroup::Mark
            | GeneralCategoryGroup::Number
            | GeneralCategoryGroup::Punctuation
            | GeneralCategoryGroup::Symbol
    )
}

fn is_right_to_left(c: char) -> bool {
    matches!(bidi_class(c), BidiClass::R | BidiClass::AL)
}

/// Prepares a raw password for cryptographic use.
///
/// Applies, in order: space folding, invisible-character removal, NFKC
/// normalization, the prohibited-character check and the bidi rule. Pure;
/// idempotent over its own output.
pub fn saslprep(raw: &str) -> Result<String, SaslPrepError> {
    let mapped = raw
        .chars()
        .filter(|c| !is_mapped_to_nothing(*c))
        .map(|c| if is_mapped_to_space(c) { ' ' } else { c });
    let normalized: String = mapped.nfkc().collect();

    if let Some(c) = normalized.chars().find(|c| is_prohibited(*c)) {
        return Err(SaslPrepError::ProhibitedCharacter(c));
    }

    // RandALCat rule: a string containing any right-to-left character must
    // both start and end right-to-left. Digits and other non-R/AL characters
    // at a boundary break the rule just like strong left-to-right letters.
    if normalized.chars().any(is_right_to_left) {
        let first_rtl = normalized.chars().next().is_some_and(is_right_to_left);
        let last_rtl = normalized.chars().next_back().is_some_and(is_right_to_left);
        if !(first_rtl && last_rtl) {
            return Err(SaslPrepError::MixedBidi);
        }
    }

    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_unicode_spaces_to_ascii_space() {
        assert_eq!(saslprep("pa\u{00A0}ss").unwrap(), "pa ss");
        assert_eq!(saslprep("a\u{2003}b").unwrap(), "a b");
        assert_eq!(saslprep("a\u{3000}b").unwrap(), "a b");
    }

    #[test]
    fn strips_invisible_characters() {
        assert_eq!(saslprep("a\u{200B}b").unwrap(), "ab");
        assert_eq!(saslprep("a\u{00AD}b").unwrap(), "ab");
        assert_eq!(saslprep("\u{FEFF}ab").unwrap(), "ab");
    }

    #[test]
    fn applies_nfkc() {
        // Roman numeral one and fullwidth digits compose to their
        // compatibility equivalents.
        assert_eq!(saslprep("\u{2160}").unwrap(), "I");
        assert_eq!(saslprep("\u{FF11}\u{FF12}").unwrap(), "12");
    }

    #[test]
    fn idempotent_over_accepted_output() {
        for input in ["Tr0ub4dor&3", "pa\u{00A0}ss", "a\u{200B}b", "\u{2160}x"] {
            let once = saslprep(input).unwrap();
            assert_eq!(saslprep(&once).unwrap(), once);
        }
    }

    #[test]
    fn rejects_control_characters() {
        assert_eq!(
            saslprep("pass\u{0007}word"),
            Err(SaslPrepError::ProhibitedCharacter('\u{0007}'))
        );
        assert_eq!(
            saslprep("ab\u{E000}"),
            Err(SaslPrepError::ProhibitedCharacter('\u{E000}'))
        );
    }

    #[test]
    fn whitespace_is_not_prohibited() {
        assert_eq!(saslprep("a b\tc").unwrap(), "a b\tc");
    }

    #[test]
    fn rejects_mixed_bidi_ending_left_to_right() {
        // Hebrew alef followed by a Latin letter: starts RTL, ends LTR.
        assert_eq!(saslprep("\u{05D0}x"), Err(SaslPrepError::MixedBidi));
        assert_eq!(saslprep("x\u{05D0}"), Err(SaslPrepError::MixedBidi));
    }

    #[test]
    fn rejects_rtl_string_with_digit_at_a_boundary() {
        // Digits are not R/AL, so they break the rule at either end even
        // though they are not strong left-to-right characters.
        assert_eq!(saslprep("\u{05D0}\u{05D1}123"), Err(SaslPrepError::MixedBidi));
        assert_eq!(saslprep("123\u{05D0}\u{05D1}"), Err(SaslPrepError::MixedBidi));
    }

    #[test]
    fn accepts_rtl_string_with_interior_digits() {
        assert_eq!(
            saslprep("\u{05D0}12\u{05D1}").unwrap(),
            "\u{05D0}12\u{05D1}"
        );
    }

    #[test]
    fn accepts_rtl_wrapped_mixed_string() {
        // RTL at both ends, Latin in the middle.
        assert_eq!(saslprep("\u{05D0}x\u{05D1}").unwrap(), "\u{05D0}x\u{05D1}");
    }

    #[test]
    fn accepts_pure_rtl_string() {
        assert_eq!(saslprep("\u{05D0}\u{05D1}").unwrap(), "\u{05D0}\u{05D1}");
    }
}
