//! Settlement method classification
//!
//! Priority: PIX key present → PIX; destination is the payer's own bank →
//! same-bank credit; anything else → TED. The user-declared payment type
//! label is advisory and never consulted.

use crate::sanitize::{digits_only, strip_accents};
use crate::types::PaymentInstruction;
use crate::PAYER_BANK_CODE;
use serde::Serialize;
use std::fmt;

/// How a payment settles. Ordered by settlement form code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum SettlementMethod {
    /// Credit to an account at the payer's own bank (form 01)
    SameBankCredit,
    /// Interbank TED transfer (form 41)
    Ted,
    /// PIX transfer (form 45)
    Pix,
}

impl SettlementMethod {
    /// All methods in batch emission order
    pub const ALL: [SettlementMethod; 3] = [
        SettlementMethod::SameBankCredit,
        SettlementMethod::Ted,
        SettlementMethod::Pix,
    ];

    /// Settlement form code (forma de lançamento)
    pub fn form_code(&self) -> &'static str {
        match self {
            SettlementMethod::SameBankCredit => "01",
            SettlementMethod::Ted => "41",
            SettlementMethod::Pix => "45",
        }
    }

    /// Clearing house code for Segment A
    pub fn clearing_house(&self) -> &'static str {
        match self {
            SettlementMethod::SameBankCredit => "000",
            SettlementMethod::Ted => "018",
            SettlementMethod::Pix => "009",
        }
    }

    /// Batch layout version tag
    pub fn batch_layout(&self) -> &'static str {
        match self {
            SettlementMethod::Pix => "045",
            _ => "040",
        }
    }

    /// TED purpose code for Segment A (credit in current account)
    pub fn ted_purpose(&self) -> Option<&'static str> {
        match self {
            SettlementMethod::Ted => Some("00005"),
            _ => None,
        }
    }

    /// Whether each Segment A is followed by a Segment B
    pub fn has_segment_b(&self) -> bool {
        matches!(self, SettlementMethod::Pix)
    }
}

impl fmt::Display for SettlementMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SettlementMethod::SameBankCredit => "same-bank credit",
            SettlementMethod::Ted => "TED",
            SettlementMethod::Pix => "PIX",
        };
        write!(f, "{} ({})", name, self.form_code())
    }
}

/// Classify one instruction
pub fn classify(instruction: &PaymentInstruction) -> SettlementMethod {
    if instruction.pix_key().is_some() {
        SettlementMethod::Pix
    } else if digits_only(&instruction.bank_code) == PAYER_BANK_CODE {
        SettlementMethod::SameBankCredit
    } else {
        SettlementMethod::Ted
    }
}

/// Declared type of a PIX key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PixKeyType {
    /// E-mail address
    Email,
    /// Phone number
    Phone,
    /// CPF or CNPJ
    TaxId,
    /// Random key (EVP)
    Random,
}

impl PixKeyType {
    /// Parse a spreadsheet label; accents and case are ignored
    pub fn from_label(label: &str) -> Option<Self> {
        let label = strip_accents(label).to_uppercase();
        if label.contains("EMAIL") || label.contains("E-MAIL") {
            Some(PixKeyType::Email)
        } else if label.contains("TELEFONE") || label.contains("CELULAR") || label.contains("PHONE") {
            Some(PixKeyType::Phone)
        } else if label.contains("CPF") || label.contains("CNPJ") {
            Some(PixKeyType::TaxId)
        } else if label.contains("ALEATORIA") || label.contains("EVP") || label.contains("RANDOM") {
            Some(PixKeyType::Random)
        } else {
            None
        }
    }

    /// Initiation method code for Segment B
    pub fn initiation_code(&self) -> &'static str {
        match self {
            PixKeyType::Email => "01",
            PixKeyType::Phone => "02",
            PixKeyType::TaxId => "03",
            PixKeyType::Random => "04",
        }
    }

    /// Whether the key itself is written; a CPF/CNPJ key is already carried
    /// by the tax id field
    pub fn writes_key(&self) -> bool {
        !matches!(self, PixKeyType::TaxId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn instruction(bank: &str, pix_key: Option<&str>) -> PaymentInstruction {
        PaymentInstruction {
            ordinal: 1,
            favored_name: "FULANO".to_string(),
            tax_id: "11122233344".to_string(),
            bank_code: bank.to_string(),
            agency: "1234".to_string(),
            account: "5555".to_string(),
            account_digit: "0".to_string(),
            amount: Decimal::new(100, 0),
            payment_date: NaiveDate::from_ymd_opt(2026, 12, 25).unwrap(),
            pix_key: pix_key.map(str::to_string),
            pix_key_type: None,
            description: None,
        }
    }

    #[test]
    fn test_pix_key_wins_over_bank() {
        assert_eq!(classify(&instruction("237", Some("a@b.com"))), SettlementMethod::Pix);
        assert_eq!(classify(&instruction("341", Some("a@b.com"))), SettlementMethod::Pix);
    }

    #[test]
    fn test_same_bank_credit() {
        assert_eq!(classify(&instruction("237", None)), SettlementMethod::SameBankCredit);
        assert_eq!(classify(&instruction(" 2-3-7 ", None)), SettlementMethod::SameBankCredit);
        assert_eq!(classify(&instruction("237", Some("  "))), SettlementMethod::SameBankCredit);
    }

    #[test]
    fn test_other_bank_is_ted() {
        assert_eq!(classify(&instruction("341", None)), SettlementMethod::Ted);
        assert_eq!(classify(&instruction("", None)), SettlementMethod::Ted);
    }

    #[test]
    fn test_codes() {
        assert_eq!(SettlementMethod::Pix.form_code(), "45");
        assert_eq!(SettlementMethod::Pix.clearing_house(), "009");
        assert_eq!(SettlementMethod::Pix.batch_layout(), "045");
        assert_eq!(SettlementMethod::SameBankCredit.form_code(), "01");
        assert_eq!(SettlementMethod::SameBankCredit.clearing_house(), "000");
        assert_eq!(SettlementMethod::Ted.form_code(), "41");
        assert_eq!(SettlementMethod::Ted.clearing_house(), "018");
        assert_eq!(SettlementMethod::Ted.batch_layout(), "040");
        assert_eq!(SettlementMethod::Ted.ted_purpose(), Some("00005"));
        assert_eq!(SettlementMethod::Pix.ted_purpose(), None);
    }

    #[test]
    fn test_order_follows_form_code() {
        let mut methods = SettlementMethod::ALL.to_vec();
        methods.sort();
        let codes: Vec<_> = methods.iter().map(|m| m.form_code()).collect();
        let mut sorted = codes.clone();
        sorted.sort();
        assert_eq!(codes, sorted);
    }

    #[test]
    fn test_pix_key_type_labels() {
        assert_eq!(PixKeyType::from_label("Email"), Some(PixKeyType::Email));
        assert_eq!(PixKeyType::from_label("Telefone"), Some(PixKeyType::Phone));
        assert_eq!(PixKeyType::from_label("CPF"), Some(PixKeyType::TaxId));
        assert_eq!(PixKeyType::from_label("cnpj"), Some(PixKeyType::TaxId));
        assert_eq!(PixKeyType::from_label("Aleatória"), Some(PixKeyType::Random));
        assert_eq!(PixKeyType::from_label("Banco"), None);
        assert_eq!(PixKeyType::from_label(""), None);
    }

    #[test]
    fn test_initiation_codes() {
        assert_eq!(PixKeyType::Email.initiation_code(), "01");
        assert_eq!(PixKeyType::Phone.initiation_code(), "02");
        assert_eq!(PixKeyType::TaxId.initiation_code(), "03");
        assert_eq!(PixKeyType::Random.initiation_code(), "04");
        assert!(!PixKeyType::TaxId.writes_key());
        assert!(PixKeyType::Random.writes_key());
    }
}
