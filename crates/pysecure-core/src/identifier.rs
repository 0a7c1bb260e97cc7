//! Login identifier classification.
//!
//! Decides whether what the user typed in the single login field looks like
//! an e-mail, a CPF or a plain user name. Only used to pick the badge and
//! icon next to the field; CPF check digits are deliberately not verified.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierKind {
    #[default]
    Unknown,
    Email,
    Cpf,
    Name,
}

impl IdentifierKind {
    pub fn as_str(self) -> &'static str {
        match self {
            IdentifierKind::Email => "email",
            IdentifierKind::Cpf => "cpf",
            IdentifierKind::Name => "name",
            IdentifierKind::Unknown => "unknown",
        }
    }

    /// Badge text shown next to the login label.
    pub fn label(self) -> &'static str {
        match self {
            IdentifierKind::Email => "E-mail Detectado",
            IdentifierKind::Cpf => "CPF Detectado",
            IdentifierKind::Name => "Nome de Usuário",
            IdentifierKind::Unknown => "Identificador",
        }
    }

    /// Icon drawn inside the field, if any.
    pub fn icon(self) -> Option<&'static str> {
        match self {
            IdentifierKind::Email => Some("mail"),
            IdentifierKind::Cpf => Some("id-card"),
            IdentifierKind::Name => Some("user"),
            IdentifierKind::Unknown => None,
        }
    }

    pub fn is_detected(self) -> bool {
        self != IdentifierKind::Unknown
    }
}

lazy_static! {
    static ref CPF_DIGITS: Regex = Regex::new(r"^[0-9]{11}$").unwrap();
}

/// Classify a raw login identifier. Total and side-effect free.
pub fn classify(input: &str) -> IdentifierKind {
    if input.is_empty() {
        return IdentifierKind::Unknown;
    }
    if input.contains('@') {
        return IdentifierKind::Email;
    }

    let stripped: String = input.chars().filter(|c| *c != '.' && *c != '-').collect();
    if CPF_DIGITS.is_match(&stripped) {
        IdentifierKind::Cpf
    } else {
        IdentifierKind::Name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_empty_is_unknown() {
        assert_eq!(classify(""), IdentifierKind::Unknown);
        assert_eq!(classify("   "), IdentifierKind::Name);
    }

    #[test]
    fn test_at_sign_is_enough_for_email() {
        assert_eq!(classify("joao@exemplo.com"), IdentifierKind::Email);
        assert_eq!(classify("a@b"), IdentifierKind::Email);
        assert_eq!(classify("@"), IdentifierKind::Email);
        // digits do not win over '@'
        assert_eq!(classify("123.456.789-09@x"), IdentifierKind::Email);
    }

    #[test]
    fn test_eleven_digits_is_cpf() {
        assert_eq!(classify("123.456.789-09"), IdentifierKind::Cpf);
        assert_eq!(classify("123.456.789-01"), IdentifierKind::Cpf);
        assert_eq!(classify("12345678901"), IdentifierKind::Cpf);
        assert_eq!(classify("1.2.3.4.5.6.7.8.9.0.1"), IdentifierKind::Cpf);
    }

    #[test]
    fn test_wrong_digit_count_is_name() {
        assert_eq!(classify("1234567890"), IdentifierKind::Name);
        assert_eq!(classify("123456789012"), IdentifierKind::Name);
        assert_eq!(classify("123.456.789-0"), IdentifierKind::Name);
    }

    #[test]
    fn test_other_punctuation_is_not_stripped() {
        assert_eq!(classify("123 456 789 01"), IdentifierKind::Name);
        assert_eq!(classify("123/456/789-01"), IdentifierKind::Name);
        // non-ASCII digits are not CPF digits
        assert_eq!(classify("١٢٣٤٥٦٧٨٩٠١"), IdentifierKind::Name);
    }

    #[test]
    fn test_plain_text_is_name() {
        assert_eq!(classify("Maria Silva"), IdentifierKind::Name);
        assert_eq!(classify("x"), IdentifierKind::Name);
        assert_eq!(classify(".-"), IdentifierKind::Name);
    }

    #[test]
    fn test_classify_is_deterministic() {
        for input in ["", "joao@exemplo.com", "123.456.789-09", "Maria Silva"] {
            assert_eq!(classify(input), classify(input));
        }
    }

    #[test]
    fn test_labels_and_icons() {
        assert_eq!(IdentifierKind::Cpf.label(), "CPF Detectado");
        assert_eq!(IdentifierKind::Unknown.icon(), None);
        assert_eq!(IdentifierKind::Email.icon(), Some("mail"));
        assert!(!IdentifierKind::Unknown.is_detected());
        assert!(IdentifierKind::Name.is_detected());
    }
}
