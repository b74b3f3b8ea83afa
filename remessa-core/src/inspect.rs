//! Structural audit of a remittance file
//!
//! Re-reads emitted bytes and cross-checks what the trailers declare
//! against what the file actually contains. Problems are collected, never
//! raised, so a damaged file still yields a full report.

use crate::layout::{
    FieldSpec, RecordLayout, BATCH_HEADER, BATCH_TRAILER, FILE_HEADER, FILE_TRAILER, SEGMENT_A,
};
use crate::{Error, Result, PAYER_BANK_CODE, RECORD_LENGTH};
use encoding_rs::WINDOWS_1252;
use serde::Serialize;

/// One structural problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InspectionIssue {
    /// 1-based line number, 0 for file-level problems
    pub line: usize,
    /// Description
    pub message: String,
}

/// What one batch contains
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchAudit {
    /// Batch number from the header
    pub sequence: u32,
    /// Settlement form code from the header
    pub settlement_form: String,
    /// Segment A records seen
    pub segment_a: u32,
    /// Segment B records seen
    pub segment_b: u32,
    /// Sum of Segment A amounts, in cents
    pub total_cents: u128,
}

impl BatchAudit {
    /// Detail records seen
    pub fn detail_records(&self) -> u32 {
        self.segment_a + self.segment_b
    }
}

/// Inspection outcome
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InspectionReport {
    /// Number of records read
    pub records: usize,
    /// File sequence number from the header
    pub file_sequence: Option<u32>,
    /// Batches in file order
    pub batches: Vec<BatchAudit>,
    /// Problems found
    pub issues: Vec<InspectionIssue>,
}

impl InspectionReport {
    /// No problems found
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    /// Turn a report with issues into an error
    pub fn into_result(self) -> Result<Self> {
        if self.is_valid() {
            return Ok(self);
        }
        let details: Vec<String> = self
            .issues
            .iter()
            .map(|i| format!("line {}: {}", i.line, i.message))
            .collect();
        Err(Error::Inspection(details.join("; ")))
    }

    fn issue(&mut self, line: usize, message: impl Into<String>) {
        self.issues.push(InspectionIssue {
            line,
            message: message.into(),
        });
    }
}

/// A decoded record, indexed by character
struct Line {
    number: usize,
    chars: Vec<char>,
}

impl Line {
    fn at(&self, position: usize) -> Option<char> {
        self.chars.get(position - 1).copied()
    }

    fn field(&self, spec: &FieldSpec) -> String {
        let range = spec.range();
        if range.end > self.chars.len() {
            return String::new();
        }
        self.chars[range].iter().collect()
    }

    fn named(&self, layout: &RecordLayout, name: &str) -> String {
        layout
            .field(name)
            .map(|spec| self.field(spec))
            .unwrap_or_default()
    }
}

fn parse_number<T: std::str::FromStr>(
    report: &mut InspectionReport,
    line: usize,
    what: &str,
    raw: &str,
) -> Option<T> {
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            report.issue(line, format!("{} is not numeric ({:?})", what, raw));
            None
        }
    }
}

/// Audit a remittance file
pub fn inspect(bytes: &[u8]) -> InspectionReport {
    let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
    let mut report = InspectionReport::default();

    let mut raw_lines: Vec<&str> = text.split("\r\n").collect();
    if raw_lines.last().map_or(false, |l| l.is_empty()) {
        raw_lines.pop();
    }

    let lines: Vec<Line> = raw_lines
        .iter()
        .enumerate()
        .map(|(i, l)| Line {
            number: i + 1,
            chars: l.chars().collect(),
        })
        .collect();
    report.records = lines.len();

    if lines.is_empty() {
        report.issue(0, "file is empty");
        return report;
    }

    let mut open: Option<BatchAudit> = None;
    let mut saw_trailer = false;

    for line in &lines {
        let n = line.number;

        if line.chars.len() != RECORD_LENGTH {
            report.issue(
                n,
                format!("record has {} characters, expected {}", line.chars.len(), RECORD_LENGTH),
            );
            continue;
        }

        let bank: String = line.chars[..3].iter().collect();
        if bank != PAYER_BANK_CODE {
            report.issue(n, format!("bank code {:?}, expected {}", bank, PAYER_BANK_CODE));
        }

        if saw_trailer {
            report.issue(n, "record after file trailer");
        }

        match line.at(8) {
            Some('0') => {
                if n != 1 {
                    report.issue(n, "file header outside first line");
                }
                let raw = line.named(&FILE_HEADER, "file_sequence");
                let sequence = parse_number(&mut report, n, "file sequence", &raw);
                report.file_sequence = sequence;
            }
            Some('1') => {
                if let Some(batch) = open.take() {
                    report.issue(n, format!("batch {} has no trailer", batch.sequence));
                    report.batches.push(batch);
                }
                let expected = report.batches.len() + 1;
                let raw = line.named(&BATCH_HEADER, "batch");
                let sequence = parse_number::<u32>(&mut report, n, "batch number", &raw)
                    .unwrap_or_default();
                if sequence as usize != expected {
                    report.issue(n, format!("batch number {}, expected {}", sequence, expected));
                }
                open = Some(BatchAudit {
                    sequence,
                    settlement_form: line.named(&BATCH_HEADER, "settlement_form"),
                    ..Default::default()
                });
            }
            Some('3') => {
                let Some(batch) = open.as_mut() else {
                    report.issue(n, "detail record outside a batch");
                    continue;
                };
                match line.at(14) {
                    Some('A') => {
                        batch.segment_a += 1;
                        // Amount sits at the same slot in both Segment A variants
                        let raw = line.named(&SEGMENT_A, "payment_amount");
                        match raw.parse::<u128>() {
                            Ok(cents) => batch.total_cents += cents,
                            Err(_) => report.issue(n, format!("amount is not numeric ({:?})", raw)),
                        }
                    }
                    Some('B') => batch.segment_b += 1,
                    other => {
                        report.issue(n, format!("unknown segment {:?}", other));
                        continue;
                    }
                }
                let expected = batch.detail_records();
                let raw = line.named(&SEGMENT_A, "record_number");
                if let Some(number) = parse_number::<u32>(&mut report, n, "record number", &raw) {
                    if number != expected {
                        report.issue(n, format!("record number {}, expected {}", number, expected));
                    }
                }
            }
            Some('5') => {
                let Some(batch) = open.take() else {
                    report.issue(n, "batch trailer without header");
                    continue;
                };
                let raw = line.named(&BATCH_TRAILER, "record_count");
                if let Some(count) = parse_number::<u32>(&mut report, n, "record count", &raw) {
                    let actual = batch.detail_records() + 2;
                    if count != actual {
                        report.issue(
                            n,
                            format!("batch {} declares {} records, has {}", batch.sequence, count, actual),
                        );
                    }
                }
                let raw = line.named(&BATCH_TRAILER, "total_amount");
                if let Some(total) = parse_number::<u128>(&mut report, n, "batch total", &raw) {
                    if total != batch.total_cents {
                        report.issue(
                            n,
                            format!(
                                "batch {} declares total {}, details sum to {}",
                                batch.sequence, total, batch.total_cents
                            ),
                        );
                    }
                }
                report.batches.push(batch);
            }
            Some('9') => {
                saw_trailer = true;
                if let Some(batch) = open.take() {
                    report.issue(n, format!("batch {} has no trailer", batch.sequence));
                    report.batches.push(batch);
                }
                let raw = line.named(&FILE_TRAILER, "batch_count");
                if let Some(count) = parse_number::<usize>(&mut report, n, "batch count", &raw) {
                    if count != report.batches.len() {
                        report.issue(
                            n,
                            format!("file declares {} batches, has {}", count, report.batches.len()),
                        );
                    }
                }
                let raw = line.named(&FILE_TRAILER, "record_count");
                if let Some(count) = parse_number::<usize>(&mut report, n, "record count", &raw) {
                    if count != lines.len() {
                        report.issue(
                            n,
                            format!("file declares {} records, has {}", count, lines.len()),
                        );
                    }
                }
            }
            other => report.issue(n, format!("unknown record type {:?}", other)),
        }
    }

    if lines[0].at(8) != Some('0') {
        report.issue(1, "first record is not a file header");
    }
    if !saw_trailer {
        report.issue(0, "file trailer missing");
    }

    if report.is_valid() {
        tracing::info!(
            "Inspected {} records in {} batches: no issues",
            report.records,
            report.batches.len()
        );
    } else {
        for issue in &report.issues {
            tracing::warn!("line {}: {}", issue.line, issue.message);
        }
    }

    report
}
