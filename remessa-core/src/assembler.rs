//! File assembly and encoding
//!
//! Wraps the batch records in the file header and trailer, joins them with
//! CRLF and encodes the text as Windows-1252. Characters outside the
//! charset become `?`, one byte each, so record widths survive encoding.

use crate::batching::BatchingEngine;
use crate::layout::{FILE_HEADER, FILE_TRAILER};
use crate::record::{FieldValues, RecordBuilder};
use crate::types::*;
use crate::LINE_TERMINATOR;
use chrono::{Local, NaiveDate, NaiveDateTime};
use encoding_rs::{EncoderResult, WINDOWS_1252};

/// Replacement byte for unencodable characters
pub const REPLACEMENT_BYTE: u8 = b'?';

/// Encoded file plus its bookkeeping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Windows-1252 bytes, records separated by CRLF
    pub bytes: Vec<u8>,

    /// Batch and record bookkeeping
    pub summary: GenerationSummary,
}

impl GeneratedFile {
    /// Conventional file name, dated by the generation timestamp
    pub fn file_name(&self) -> String {
        remittance_file_name(self.summary.generated_at.date(), self.summary.file_sequence)
    }
}

/// Conventional remittance file name: `CB<DDMM><NSA, at least 2 digits>.REM`
pub fn remittance_file_name(date: NaiveDate, file_sequence: u32) -> String {
    format!("CB{}{:02}.REM", date.format("%d%m"), file_sequence)
}

/// Encode text as Windows-1252, replacing unmappable characters
pub fn encode_latin(text: &str) -> Vec<u8> {
    let mut encoder = WINDOWS_1252.new_encoder();
    let mut out = Vec::with_capacity(text.len());
    let mut buffer = [0u8; 4096];
    let mut remaining = text;

    loop {
        let (result, read, written) =
            encoder.encode_from_utf8_without_replacement(remaining, &mut buffer, true);
        out.extend_from_slice(&buffer[..written]);
        remaining = &remaining[read..];

        match result {
            EncoderResult::InputEmpty => break,
            EncoderResult::OutputFull => {}
            EncoderResult::Unmappable(c) => {
                tracing::debug!("Character {:?} not representable, replaced", c);
                out.push(REPLACEMENT_BYTE);
            }
        }
    }

    out
}

/// Builds a complete remittance file for one payer
///
/// The file sequence number is read, never incremented: persisting the next
/// value is the caller's job.
#[derive(Debug, Clone)]
pub struct FileAssembler {
    payer: NormalizedPayer,
    file_sequence: u32,
}

impl FileAssembler {
    /// Create an assembler; the profile is normalized into a private copy
    pub fn new(profile: &PayerProfile, file_sequence: u32) -> Self {
        Self {
            payer: profile.normalized(),
            file_sequence,
        }
    }

    /// Normalized payer used in headers
    pub fn payer(&self) -> &NormalizedPayer {
        &self.payer
    }

    /// Generate with the current local time
    pub fn generate(&self, instructions: &[PaymentInstruction]) -> GeneratedFile {
        self.generate_at(instructions, Local::now().naive_local())
    }

    /// Generate with an explicit timestamp; identical inputs give identical bytes
    pub fn generate_at(
        &self,
        instructions: &[PaymentInstruction],
        generated_at: NaiveDateTime,
    ) -> GeneratedFile {
        let (records, summary) = self.assemble(instructions, generated_at);
        let bytes = encode_latin(&records.join(LINE_TERMINATOR));

        tracing::info!(
            "Generated remittance NSA {}: {} batches, {} records, {} instructions",
            summary.file_sequence,
            summary.batches.len(),
            summary.total_records,
            summary.instruction_count()
        );

        GeneratedFile { bytes, summary }
    }

    /// Records (unencoded) and summary of a file
    pub fn assemble(
        &self,
        instructions: &[PaymentInstruction],
        generated_at: NaiveDateTime,
    ) -> (Vec<String>, GenerationSummary) {
        let mut anomalies = Vec::new();
        if !self.payer.tax_id.is_classified() {
            tracing::warn!(
                "Payer tax id with {} digits is neither CPF nor CNPJ",
                self.payer.tax_id.digits.len()
            );
            anomalies.push(Anomaly::UnclassifiedPayerTaxId {
                digits: self.payer.tax_id.digits.clone(),
            });
        }

        let run = BatchingEngine::new(&self.payer).run(instructions);
        anomalies.extend(run.anomalies.iter().cloned());

        let total_records = u32::try_from(run.records.len() + 2).unwrap_or(u32::MAX);
        let batch_count = run.batches.len();

        let mut records = Vec::with_capacity(run.records.len() + 2);
        records.push(self.file_header(generated_at));
        records.extend(run.records.iter().cloned());
        records.push(Self::file_trailer(batch_count, total_records));

        let summary = GenerationSummary {
            file_sequence: self.file_sequence,
            generated_at,
            total_cents: run.total_cents(),
            batches: run.batches,
            total_records,
            anomalies,
        };

        (records, summary)
    }

    fn file_header(&self, generated_at: NaiveDateTime) -> String {
        let payer = &self.payer;
        let mut values = FieldValues::new()
            .with("payer_tax_id_type", payer.tax_id.type_code())
            .with("payer_tax_id", payer.tax_id.digits.clone())
            .with("agreement_code", payer.agreement_code.clone())
            .with("agency", payer.agency.clone())
            .with("account", payer.account.clone())
            .with("account_digit", payer.account_digit.clone())
            .with("company_name", payer.company_name.clone())
            .with("generation_date", generated_at.format("%d%m%Y").to_string())
            .with("generation_time", generated_at.format("%H%M%S").to_string())
            .with("file_sequence", self.file_sequence.to_string());

        if payer.pix_enabled {
            values.set("bank_reserved", "PIX");
        }

        RecordBuilder::build(&FILE_HEADER, &values)
    }

    fn file_trailer(batch_count: usize, total_records: u32) -> String {
        let values = FieldValues::new()
            .with("batch_count", batch_count.to_string())
            .with("record_count", total_records.to_string());

        RecordBuilder::build(&FILE_TRAILER, &values)
    }
}
