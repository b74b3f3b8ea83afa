//! Row-level business validation
//!
//! Turns raw sheet rows into [`PaymentInstruction`]s. Blocking problems
//! (bad amount, bad or past date, tax id that is neither CPF nor CNPJ) are
//! errors and keep the row out; suspicious but legal rows get warnings.

use crate::classify::PixKeyType;
use crate::input::InputRow;
use crate::sanitize::digits_only;
use crate::taxid::TaxId;
use crate::types::{PaymentInstruction, RowOrdinal};
use crate::PAYER_BANK_CODE;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;

/// Issue severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    /// Blocks the row
    Error,
    /// Reported, row still generated
    Warning,
}

/// One problem found in a row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowIssue {
    /// Row ordinal
    pub ordinal: RowOrdinal,
    /// Sheet line (header is line 1)
    pub line: u32,
    /// Machine-readable code
    pub code: &'static str,
    /// Severity
    pub severity: Severity,
    /// Human-readable message
    pub message: String,
}

/// Result of validating a sheet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Blocking issues
    pub errors: Vec<RowIssue>,
    /// Non-blocking issues
    pub warnings: Vec<RowIssue>,
}

impl ValidationReport {
    fn add_error(&mut self, row: &InputRow, code: &'static str, message: String) {
        self.errors.push(RowIssue {
            ordinal: row.ordinal,
            line: row.line_number(),
            code,
            severity: Severity::Error,
            message,
        });
    }

    fn add_warning(&mut self, row: &InputRow, code: &'static str, message: String) {
        self.warnings.push(RowIssue {
            ordinal: row.ordinal,
            line: row.line_number(),
            code,
            severity: Severity::Warning,
            message,
        });
    }

    /// Whether any row was rejected
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Parse a sheet amount: `150.50`, `150,50`, `R$ 1.234,56`
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .replace("R$", "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let normalized = if cleaned.contains(',') {
        cleaned.replace('.', "").replace(',', ".")
    } else {
        cleaned
    };
    Decimal::from_str(&normalized).ok()
}

/// Parse a sheet date: `DD/MM/YYYY`, or `YYYY-MM-DD` with an optional time
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let token = raw.split_whitespace().next()?;
    NaiveDate::parse_from_str(token, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(token, "%Y-%m-%d"))
        .ok()
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Validate rows against `today`; returns the accepted instructions
pub fn validate_rows(
    rows: &[InputRow],
    today: NaiveDate,
) -> (Vec<PaymentInstruction>, ValidationReport) {
    let mut report = ValidationReport::default();
    let mut instructions = Vec::with_capacity(rows.len());

    for row in rows {
        let before = report.errors.len();

        let amount = match parse_amount(&row.amount) {
            Some(amount) if amount > Decimal::ZERO => Some(amount),
            Some(amount) => {
                report.add_error(
                    row,
                    "NON_POSITIVE_AMOUNT",
                    format!("Amount must be positive (R$ {})", amount),
                );
                None
            }
            None => {
                report.add_error(
                    row,
                    "INVALID_AMOUNT",
                    format!("Invalid amount format ({:?})", row.amount),
                );
                None
            }
        };

        let payment_date = match parse_date(&row.payment_date) {
            Some(date) if date >= today => Some(date),
            Some(date) => {
                report.add_error(
                    row,
                    "PAST_DATE",
                    format!("Payment date {} is in the past", date.format("%d/%m/%Y")),
                );
                None
            }
            None => {
                report.add_error(
                    row,
                    "INVALID_DATE",
                    format!("Invalid payment date ({:?})", row.payment_date),
                );
                None
            }
        };

        let tax_id = TaxId::normalize(&row.tax_id);
        if !tax_id.is_classified() {
            report.add_error(
                row,
                "INVALID_TAX_ID",
                format!(
                    "Tax id has {} digits; expected CPF (11) or CNPJ (14)",
                    tax_id.digits.len()
                ),
            );
        }

        let pix_key = non_empty(&row.pix_key);
        let pix_key_type = non_empty(&row.pix_key_type);
        let bank = digits_only(&row.bank_code);

        if pix_key.is_none() && !bank.is_empty() && bank != PAYER_BANK_CODE {
            report.add_warning(
                row,
                "TED_TO_OTHER_BANK",
                format!("Transfer to bank {} will be sent as TED", bank),
            );
        }

        if let (Some(_), Some(label)) = (&pix_key, &pix_key_type) {
            if PixKeyType::from_label(label).is_none() {
                report.add_warning(
                    row,
                    "UNKNOWN_PIX_KEY_TYPE",
                    format!("PIX key type {:?} not recognized; e-mail assumed", label),
                );
            }
        }

        if report.errors.len() > before {
            continue;
        }

        if let (Some(amount), Some(payment_date)) = (amount, payment_date) {
            instructions.push(PaymentInstruction {
                ordinal: row.ordinal,
                favored_name: row.favored_name.trim().to_string(),
                tax_id: row.tax_id.clone(),
                bank_code: row.bank_code.clone(),
                agency: row.agency.clone(),
                account: row.account.clone(),
                account_digit: row.account_digit.trim().to_string(),
                amount,
                payment_date,
                pix_key,
                pix_key_type,
                description: non_empty(&row.description),
            });
        }
    }

    tracing::info!(
        "Validated {} rows: {} accepted, {} errors, {} warnings",
        rows.len(),
        instructions.len(),
        report.errors.len(),
        report.warnings.len()
    );

    (instructions, report)
}
