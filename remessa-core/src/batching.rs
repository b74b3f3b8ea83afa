//! Batching engine
//!
//! Partitions instructions into batches by settlement method and emits the
//! batch header, detail segments and batch trailer of each one.
//!
//! # Ordering
//!
//! Batches are emitted in ascending settlement form code (01, 41, 45),
//! never in order of first appearance, so identical inputs always produce
//! identical files. Inside a batch, instructions keep their input order.
//!
//! # Numbering
//!
//! ```text
//! batch 1  header                    (batch seq 1)
//!          segment A   record 1
//!          trailer     count = 1 + 2
//! batch 2  header                    (batch seq 2)
//!          segment A   record 1
//!          segment B   record 2      (PIX only)
//!          trailer     count = 2 + 2
//! ```

use crate::amount::{render_total, to_cents, AMOUNT_SENTINEL};
use crate::classify::{classify, PixKeyType, SettlementMethod};
use crate::layout::{BATCH_HEADER, BATCH_TRAILER, SEGMENT_A, SEGMENT_A_PIX, SEGMENT_B};
use crate::record::{FieldValues, RecordBuilder};
use crate::sanitize::{digits_only, sanitize_text, TextPolicy};
use crate::taxid::TaxId;
use crate::types::*;
use std::collections::BTreeMap;

/// Width of the tax id root written to the PIX Segment A
const PIX_TAX_ID_ROOT_LEN: usize = 8;

/// Records and bookkeeping produced for every batch of a file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchRun {
    /// Batch records in emission order (no file header or trailer)
    pub records: Vec<String>,

    /// One summary per emitted batch
    pub batches: Vec<BatchSummary>,

    /// Degraded inputs seen while encoding
    pub anomalies: Vec<Anomaly>,
}

impl BatchRun {
    /// Sum of batch totals, in cents
    pub fn total_cents(&self) -> u128 {
        self.batches.iter().map(|b| b.total_cents).sum()
    }
}

/// A batch under construction
struct Batch<'i> {
    method: SettlementMethod,
    sequence: u32,
    instructions: Vec<&'i PaymentInstruction>,
    record_counter: u32,
    total_cents: u128,
}

impl<'i> Batch<'i> {
    fn next_record_number(&mut self) -> u32 {
        self.record_counter += 1;
        self.record_counter
    }
}

/// Batching engine
///
/// Holds no counters of its own: batch and record sequences live in the
/// per-call state of [`BatchingEngine::run`], so independent generations
/// never share mutable state.
#[derive(Debug, Clone, Copy)]
pub struct BatchingEngine<'p> {
    payer: &'p NormalizedPayer,
}

impl<'p> BatchingEngine<'p> {
    /// Create a batching engine for a payer
    pub fn new(payer: &'p NormalizedPayer) -> Self {
        Self { payer }
    }

    /// Group instructions by settlement method, in emission order
    pub fn partition(
        instructions: &[PaymentInstruction],
    ) -> BTreeMap<SettlementMethod, Vec<&PaymentInstruction>> {
        let mut groups: BTreeMap<SettlementMethod, Vec<&PaymentInstruction>> = BTreeMap::new();
        for instruction in instructions {
            groups
                .entry(classify(instruction))
                .or_insert_with(Vec::new)
                .push(instruction);
        }
        groups
    }

    /// Emit every batch for the given instructions.
    ///
    /// Batch sequence numbers start at 1. No instruction is dropped.
    pub fn run(&self, instructions: &[PaymentInstruction]) -> BatchRun {
        let mut run = BatchRun::default();
        let mut next_sequence = 0u32;

        for (method, group) in Self::partition(instructions) {
            next_sequence += 1;
            let mut batch = Batch {
                method,
                sequence: next_sequence,
                instructions: group,
                record_counter: 0,
                total_cents: 0,
            };

            tracing::info!(
                "Batch {}: {} with {} instructions",
                batch.sequence,
                batch.method,
                batch.instructions.len()
            );

            run.records.push(self.batch_header(&batch));

            let members = std::mem::take(&mut batch.instructions);
            for instruction in &members {
                self.emit_details(&mut batch, instruction, &mut run);
            }
            batch.instructions = members;

            run.records.push(Self::batch_trailer(&batch));
            run.batches.push(BatchSummary {
                sequence: batch.sequence,
                method: batch.method,
                ordinals: batch.instructions.iter().map(|i| i.ordinal).collect(),
                detail_records: batch.record_counter,
                total_cents: batch.total_cents,
            });
        }

        run
    }

    fn batch_header(&self, batch: &Batch<'_>) -> String {
        let payer = self.payer;
        let values = FieldValues::new()
            .with("batch", batch.sequence.to_string())
            .with("settlement_form", batch.method.form_code())
            .with("batch_layout", batch.method.batch_layout())
            .with("payer_tax_id_type", payer.tax_id.type_code())
            .with("payer_tax_id", payer.tax_id.digits.clone())
            .with("agreement_code", payer.agreement_code.clone())
            .with("agency", payer.agency.clone())
            .with("account", payer.account.clone())
            .with("account_digit", payer.account_digit.clone())
            .with("company_name", payer.company_name.clone());

        RecordBuilder::build(&BATCH_HEADER, &values)
    }

    fn emit_details(
        &self,
        batch: &mut Batch<'_>,
        instruction: &PaymentInstruction,
        run: &mut BatchRun,
    ) {
        let tax_id = TaxId::normalize(&instruction.tax_id);
        if !tax_id.is_classified() {
            tracing::warn!(
                "Row {}: tax id with {} digits is neither CPF nor CNPJ, emitting type 0",
                instruction.ordinal,
                tax_id.digits.len()
            );
            run.anomalies.push(Anomaly::UnclassifiedTaxId {
                ordinal: instruction.ordinal,
                digits: tax_id.digits.clone(),
            });
        }

        let amount = match to_cents(instruction.amount) {
            Some(cents) => {
                batch.total_cents += cents;
                render_total(cents)
            }
            None => {
                tracing::warn!(
                    "Row {}: negative amount {}, emitting sentinel",
                    instruction.ordinal,
                    instruction.amount
                );
                run.anomalies.push(Anomaly::NegativeAmount {
                    ordinal: instruction.ordinal,
                    amount: instruction.amount,
                });
                AMOUNT_SENTINEL.to_string()
            }
        };

        let record_number = batch.next_record_number();
        let segment_a = self.segment_a(batch, instruction, &tax_id, record_number, amount);
        tracing::debug!(
            "Batch {} record {}: segment A for row {}",
            batch.sequence,
            record_number,
            instruction.ordinal
        );
        run.records.push(segment_a);

        if batch.method.has_segment_b() {
            let record_number = batch.next_record_number();
            let segment_b = Self::segment_b(batch, instruction, &tax_id, record_number, run);
            tracing::debug!(
                "Batch {} record {}: segment B for row {}",
                batch.sequence,
                record_number,
                instruction.ordinal
            );
            run.records.push(segment_b);
        }
    }

    fn segment_a(
        &self,
        batch: &Batch<'_>,
        instruction: &PaymentInstruction,
        tax_id: &TaxId,
        record_number: u32,
        amount: String,
    ) -> String {
        let mut values = FieldValues::new()
            .with("batch", batch.sequence.to_string())
            .with("record_number", record_number.to_string())
            .with("clearing_house", batch.method.clearing_house())
            .with("favored_bank", digits_only(&instruction.bank_code))
            .with("favored_agency", digits_only(&instruction.agency))
            .with("favored_account", digits_only(&instruction.account))
            .with(
                "favored_account_digit",
                sanitize_text(&instruction.account_digit, TextPolicy::Strict),
            )
            .with(
                "favored_name",
                sanitize_text(&instruction.favored_name, TextPolicy::Strict),
            )
            .with("company_document", format!("{:010}", instruction.ordinal))
            .with(
                "payment_date",
                instruction.payment_date.format("%d%m%Y").to_string(),
            )
            .with("payment_amount", amount)
            .with("favored_tax_id_type", tax_id.type_code());

        if let Some(description) = instruction.description.as_deref() {
            values.set(
                "complementary_info",
                sanitize_text(description, TextPolicy::Strict),
            );
        }

        match batch.method {
            SettlementMethod::Pix => {
                let root: String = tax_id.digits.chars().take(PIX_TAX_ID_ROOT_LEN).collect();
                values.set("favored_tax_id_root", root);
                RecordBuilder::build(&SEGMENT_A_PIX, &values)
            }
            method => {
                values.set("favored_tax_id", tax_id.digits.clone());
                if let Some(purpose) = method.ted_purpose() {
                    values.set("ted_purpose", purpose);
                }
                RecordBuilder::build(&SEGMENT_A, &values)
            }
        }
    }

    fn segment_b(
        batch: &Batch<'_>,
        instruction: &PaymentInstruction,
        tax_id: &TaxId,
        record_number: u32,
        run: &mut BatchRun,
    ) -> String {
        let label = instruction
            .pix_key_type
            .as_deref()
            .map(str::trim)
            .unwrap_or_default();

        let key_type = match PixKeyType::from_label(label) {
            Some(key_type) => key_type,
            None => {
                if !label.is_empty() {
                    tracing::warn!(
                        "Row {}: unrecognized PIX key type {:?}, defaulting to e-mail",
                        instruction.ordinal,
                        label
                    );
                    run.anomalies.push(Anomaly::UnrecognizedPixKeyType {
                        ordinal: instruction.ordinal,
                        label: label.to_string(),
                    });
                }
                PixKeyType::Email
            }
        };

        let key = if key_type.writes_key() {
            sanitize_text(instruction.pix_key().unwrap_or_default(), TextPolicy::PixKey)
        } else {
            String::new()
        };

        let values = FieldValues::new()
            .with("batch", batch.sequence.to_string())
            .with("record_number", record_number.to_string())
            .with("initiation_method", key_type.initiation_code())
            .with("favored_tax_id_type", tax_id.type_code())
            .with("favored_tax_id", tax_id.digits.clone())
            .with("pix_key", key);

        RecordBuilder::build(&SEGMENT_B, &values)
    }

    fn batch_trailer(batch: &Batch<'_>) -> String {
        let values = FieldValues::new()
            .with("batch", batch.sequence.to_string())
            .with("record_count", (batch.record_counter + 2).to_string())
            .with("total_amount", render_total(batch.total_cents));

        RecordBuilder::build(&BATCH_TRAILER, &values)
    }
}
