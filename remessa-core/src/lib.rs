//! # Remessa Core
//!
//! Encoder for Bradesco Multipag remittance files (CNAB 240, layout 089).
//!
//! Turns validated payment instructions plus a payer profile into a
//! byte-exact, position-addressed file whose records are grouped into
//! batches ("lotes") by settlement method:
//!
//! - PIX transfer (form 45)
//! - same-bank account credit (form 01)
//! - interbank TED transfer (form 41)
//!
//! ## Architecture
//!
//! ```text
//! rows ──► validation ──► PaymentInstruction ──┐
//!                                              ▼
//!   PayerProfile ──► FileAssembler ──► BatchingEngine ──► classify
//!                         │                  │
//!                         │                  ▼
//!                         │            RecordBuilder ──► format_field
//!                         ▼                  ▲
//!                  CP-1252 bytes ◄───────────┘
//! ```
//!
//! Generation is a total function: it always produces a file of the
//! correct shape. Degraded inputs are reported as [`Anomaly`] values in the
//! [`GenerationSummary`] instead of failing the whole file.
//!
//! # Example
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use remessa_core::{FileAssembler, PayerProfile, PaymentInstruction};
//! use rust_decimal::Decimal;
//!
//! let profile = PayerProfile {
//!     company_name: "Construtora Exemplo Ltda".to_string(),
//!     tax_id: "95.258.174/0001-65".to_string(),
//!     agreement_code: "458049".to_string(),
//!     agency: "0268".to_string(),
//!     account: "559461".to_string(),
//!     account_digit: "8".to_string(),
//!     pix_enabled: true,
//! };
//!
//! let instruction = PaymentInstruction {
//!     ordinal: 1,
//!     favored_name: "Maria Silva".to_string(),
//!     tax_id: "123.456.789-01".to_string(),
//!     bank_code: "341".to_string(),
//!     agency: "1234".to_string(),
//!     account: "55555".to_string(),
//!     account_digit: "0".to_string(),
//!     amount: Decimal::new(10000, 2),
//!     payment_date: NaiveDate::from_ymd_opt(2026, 12, 25).unwrap(),
//!     pix_key: None,
//!     pix_key_type: None,
//!     description: None,
//! };
//!
//! let file = FileAssembler::new(&profile, 1).generate(&[instruction]);
//! println!("{} bytes, {} records", file.bytes.len(), file.summary.total_records);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod amount;
pub mod assembler;
pub mod batching;
pub mod classify;
pub mod config;
pub mod error;
pub mod input;
pub mod inspect;
pub mod layout;
pub mod record;
pub mod sanitize;
pub mod state;
pub mod taxid;
pub mod types;
pub mod validation;

pub use assembler::{remittance_file_name, FileAssembler, GeneratedFile};
pub use batching::{BatchRun, BatchingEngine};
pub use classify::{classify, PixKeyType, SettlementMethod};
pub use config::Config;
pub use error::{Error, Result};
pub use types::*;

/// Width of every record in the file, in characters
pub const RECORD_LENGTH: usize = 240;

/// Bank code of the payer's bank (Bradesco)
pub const PAYER_BANK_CODE: &str = "237";

/// Record separator in the emitted file
pub const LINE_TERMINATOR: &str = "\r\n";
