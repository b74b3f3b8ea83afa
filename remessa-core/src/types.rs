//! Core types for remittance generation

use crate::amount::from_cents;
use crate::classify::SettlementMethod;
use crate::sanitize::{digits_only, sanitize_text, TextPolicy};
use crate::taxid::TaxId;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Caller-assigned row number, stable across runs
pub type RowOrdinal = u32;

/// Paying company, as configured by the caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayerProfile {
    /// Company name (razão social)
    pub company_name: String,

    /// Company tax id (CNPJ), any punctuation
    pub tax_id: String,

    /// Bank agreement code (convênio)
    pub agreement_code: String,

    /// Agency number, without check digit
    pub agency: String,

    /// Account number, without check digit
    pub account: String,

    /// Account check digit
    #[serde(default)]
    pub account_digit: String,

    /// Whether the agreement is enabled for PIX
    #[serde(default)]
    pub pix_enabled: bool,
}

impl PayerProfile {
    /// Normalized copy used by the encoder; the caller's profile is untouched
    pub fn normalized(&self) -> NormalizedPayer {
        NormalizedPayer {
            company_name: sanitize_text(&self.company_name, TextPolicy::Strict),
            tax_id: TaxId::normalize(&self.tax_id),
            agreement_code: digits_only(&self.agreement_code),
            agency: digits_only(&self.agency),
            account: digits_only(&self.account),
            account_digit: sanitize_text(&self.account_digit, TextPolicy::Strict),
            pix_enabled: self.pix_enabled,
        }
    }
}

/// Payer profile after normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPayer {
    /// Upper-case, accent-free company name
    pub company_name: String,
    /// Normalized company tax id
    pub tax_id: TaxId,
    /// Agreement code digits
    pub agreement_code: String,
    /// Agency digits
    pub agency: String,
    /// Account digits
    pub account: String,
    /// Account check digit
    pub account_digit: String,
    /// PIX enabled
    pub pix_enabled: bool,
}

/// One payment, already validated upstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInstruction {
    /// Row ordinal; becomes the company document number
    pub ordinal: RowOrdinal,

    /// Favored party name
    pub favored_name: String,

    /// Favored party CPF or CNPJ, any punctuation
    pub tax_id: String,

    /// Destination bank code
    pub bank_code: String,

    /// Destination agency
    pub agency: String,

    /// Destination account
    pub account: String,

    /// Destination account check digit
    pub account_digit: String,

    /// Amount in currency units
    pub amount: Decimal,

    /// Payment date
    pub payment_date: NaiveDate,

    /// PIX key, when paying by PIX
    pub pix_key: Option<String>,

    /// Declared PIX key type label (Email, Telefone, CPF, CNPJ, Aleatoria)
    pub pix_key_type: Option<String>,

    /// Free-text description
    pub description: Option<String>,
}

impl PaymentInstruction {
    /// PIX key with surrounding whitespace removed, if non-empty
    pub fn pix_key(&self) -> Option<&str> {
        self.pix_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

/// Degraded input the encoder represented instead of rejecting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Anomaly {
    /// Favored tax id is neither 11 nor 14 digits; emitted with type "0"
    UnclassifiedTaxId {
        /// Row ordinal
        ordinal: RowOrdinal,
        /// Digits after normalization
        digits: String,
    },

    /// Negative amount; emitted as the "000" sentinel
    NegativeAmount {
        /// Row ordinal
        ordinal: RowOrdinal,
        /// Amount as received
        amount: Decimal,
    },

    /// PIX key type label not recognized; initiation method defaulted to 01
    UnrecognizedPixKeyType {
        /// Row ordinal
        ordinal: RowOrdinal,
        /// Label as received
        label: String,
    },

    /// Payer tax id is neither 11 nor 14 digits
    UnclassifiedPayerTaxId {
        /// Digits after normalization
        digits: String,
    },
}

/// Bookkeeping for one emitted batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Batch sequence number (1-based, file-wide)
    pub sequence: u32,

    /// Settlement method of every instruction in the batch
    pub method: SettlementMethod,

    /// Ordinals of the instructions routed here, in emission order
    pub ordinals: Vec<RowOrdinal>,

    /// Detail records (Segment A and B)
    pub detail_records: u32,

    /// Total in cents
    pub total_cents: u128,
}

impl BatchSummary {
    /// Records including the batch header and trailer
    pub fn record_count(&self) -> u32 {
        self.detail_records + 2
    }

    /// Total as a decimal amount
    pub fn total_amount(&self) -> Decimal {
        from_cents(self.total_cents)
    }
}

/// Result bookkeeping of one generation call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationSummary {
    /// File sequence number (NSA) written to the header
    pub file_sequence: u32,

    /// Generation timestamp written to the header
    pub generated_at: NaiveDateTime,

    /// Batches, in emission order
    pub batches: Vec<BatchSummary>,

    /// Every record in the file, headers and trailers included
    pub total_records: u32,

    /// Sum of all batch totals, in cents
    pub total_cents: u128,

    /// Degraded inputs
    pub anomalies: Vec<Anomaly>,
}

impl GenerationSummary {
    /// Number of instructions across all batches
    pub fn instruction_count(&self) -> usize {
        self.batches.iter().map(|b| b.ordinals.len()).sum()
    }

    /// Total as a decimal amount
    pub fn total_amount(&self) -> Decimal {
        from_cents(self.total_cents)
    }
}
