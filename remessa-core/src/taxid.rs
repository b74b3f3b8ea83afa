//! CPF / CNPJ normalization
//!
//! Spreadsheets routinely drop the leading zero of numeric-looking ids, so
//! a 10-digit value is read as a CPF and a 13-digit value as a CNPJ after
//! restoring one leading zero.

use crate::sanitize::digits_only;
use serde::Serialize;

/// CPF length (individuals)
pub const CPF_LEN: usize = 11;

/// CNPJ length (organizations)
pub const CNPJ_LEN: usize = 14;

/// Registration type of a tax id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TaxIdKind {
    /// CPF, code "1"
    Individual,
    /// CNPJ, code "2"
    Organization,
    /// Neither length, code "0"
    Unclassified,
}

impl TaxIdKind {
    /// Registration type code written to the file
    pub fn code(&self) -> &'static str {
        match self {
            TaxIdKind::Individual => "1",
            TaxIdKind::Organization => "2",
            TaxIdKind::Unclassified => "0",
        }
    }
}

/// Normalized tax id
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxId {
    /// Registration type
    pub kind: TaxIdKind,
    /// Digits, with a recovered leading zero where applicable
    pub digits: String,
}

impl TaxId {
    /// Normalize a raw tax id
    pub fn normalize(raw: &str) -> Self {
        let mut digits = digits_only(raw);
        if digits.len() == CPF_LEN - 1 || digits.len() == CNPJ_LEN - 1 {
            digits.insert(0, '0');
        }

        let kind = match digits.len() {
            CPF_LEN => TaxIdKind::Individual,
            CNPJ_LEN => TaxIdKind::Organization,
            _ => TaxIdKind::Unclassified,
        };

        Self { kind, digits }
    }

    /// Registration type code
    pub fn type_code(&self) -> &'static str {
        self.kind.code()
    }

    /// Whether the id is a CPF or a CNPJ
    pub fn is_classified(&self) -> bool {
        self.kind != TaxIdKind::Unclassified
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpf() {
        let id = TaxId::normalize("111.222.333-44");
        assert_eq!(id.kind, TaxIdKind::Individual);
        assert_eq!(id.type_code(), "1");
        assert_eq!(id.digits, "11122233344");
    }

    #[test]
    fn test_cnpj() {
        let id = TaxId::normalize("12.345.678/0001-99");
        assert_eq!(id.kind, TaxIdKind::Organization);
        assert_eq!(id.type_code(), "2");
    }

    #[test]
    fn test_ten_digits_recovers_cpf() {
        let id = TaxId::normalize("1234567890");
        assert_eq!(id.digits, "01234567890");
        assert_eq!(id.kind, TaxIdKind::Individual);
    }

    #[test]
    fn test_thirteen_digits_recovers_cnpj() {
        let id = TaxId::normalize("1234567000199");
        assert_eq!(id.digits, "01234567000199");
        assert_eq!(id.kind, TaxIdKind::Organization);
    }

    #[test]
    fn test_non_ascii_digits_do_not_count() {
        let id = TaxId::normalize("111.222.333-44\u{0661}\u{FF12}");
        assert_eq!(id.digits, "11122233344");
        assert_eq!(id.kind, TaxIdKind::Individual);
    }

    #[test]
    fn test_other_lengths_unclassified() {
        for raw in ["", "123", "123456789", "123456789012", "123456789012345"] {
            let id = TaxId::normalize(raw);
            assert_eq!(id.kind, TaxIdKind::Unclassified, "{raw}");
            assert_eq!(id.type_code(), "0");
            assert!(!id.is_classified());
        }
    }
}
