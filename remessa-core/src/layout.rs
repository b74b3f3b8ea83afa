//! Record layouts for Bradesco Multipag CNAB 240 (layout 089)
//!
//! Each record type is a static table of fields with 1-based inclusive
//! offsets, a pad policy and a default value. Positions not covered by any
//! field are rendered as spaces by the record builder.
//!
//! ```text
//! File Header    (record type 0)
//!   Batch Header (record type 1)
//!     Segment A  (record type 3, segment A)
//!     Segment B  (record type 3, segment B, PIX batches only)
//!   Batch Trailer (record type 5)
//! File Trailer   (record type 9)
//! ```

use crate::{Error, Result, RECORD_LENGTH};
use serde::Serialize;

/// How a value is padded into its slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PadPolicy {
    /// Numeric: right-aligned, left-padded with `'0'`
    ZeroLeft,
    /// Text: left-aligned, right-padded with spaces
    SpaceRight,
}

/// One named slot inside a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    /// Field name
    pub name: &'static str,
    /// First position (1-based, inclusive)
    pub start: usize,
    /// Last position (1-based, inclusive)
    pub end: usize,
    /// Pad policy
    pub pad: PadPolicy,
    /// Value used when none is supplied
    pub default: &'static str,
}

impl FieldSpec {
    /// Slot width in characters
    pub const fn width(&self) -> usize {
        self.end - self.start + 1
    }

    /// Zero-based byte range covered by this field
    pub fn range(&self) -> std::ops::Range<usize> {
        (self.start - 1)..self.end
    }
}

const fn num(name: &'static str, start: usize, end: usize, default: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        start,
        end,
        pad: PadPolicy::ZeroLeft,
        default,
    }
}

const fn text(name: &'static str, start: usize, end: usize, default: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        start,
        end,
        pad: PadPolicy::SpaceRight,
        default,
    }
}

/// Record type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RecordKind {
    /// File header
    FileHeader,
    /// Batch header
    BatchHeader,
    /// Segment A (TED / same-bank credit)
    SegmentA,
    /// Segment A, PIX variant
    SegmentAPix,
    /// Segment B (PIX key)
    SegmentB,
    /// Batch trailer
    BatchTrailer,
    /// File trailer
    FileTrailer,
}

/// Immutable layout of one record type
#[derive(Debug, Clone, Copy)]
pub struct RecordLayout {
    /// Record type
    pub kind: RecordKind,
    /// Human-readable name
    pub name: &'static str,
    /// Fields, ordered by start offset
    pub fields: &'static [FieldSpec],
}

impl RecordLayout {
    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Check offsets: inside 1..=240, ordered, non-overlapping, unique names
    pub fn validate(&self) -> Result<()> {
        let err = |reason: String| Error::Layout {
            layout: self.name,
            reason,
        };

        let mut last_end = 0;
        for (i, field) in self.fields.iter().enumerate() {
            if field.start == 0 || field.end < field.start {
                return Err(err(format!(
                    "field {} has invalid range {}..={}",
                    field.name, field.start, field.end
                )));
            }
            if field.end > RECORD_LENGTH {
                return Err(err(format!(
                    "field {} ends at {} past column {}",
                    field.name, field.end, RECORD_LENGTH
                )));
            }
            if field.start <= last_end {
                return Err(err(format!(
                    "field {} starts at {} overlapping previous field ending at {}",
                    field.name, field.start, last_end
                )));
            }
            if self.fields[..i].iter().any(|f| f.name == field.name) {
                return Err(err(format!("duplicate field name {}", field.name)));
            }
            last_end = field.end;
        }

        Ok(())
    }
}

/// Every layout in the registry
pub fn all() -> [&'static RecordLayout; 7] {
    [
        &FILE_HEADER,
        &BATCH_HEADER,
        &SEGMENT_A,
        &SEGMENT_A_PIX,
        &SEGMENT_B,
        &BATCH_TRAILER,
        &FILE_TRAILER,
    ]
}

/// Layout for a record type
pub fn for_kind(kind: RecordKind) -> &'static RecordLayout {
    match kind {
        RecordKind::FileHeader => &FILE_HEADER,
        RecordKind::BatchHeader => &BATCH_HEADER,
        RecordKind::SegmentA => &SEGMENT_A,
        RecordKind::SegmentAPix => &SEGMENT_A_PIX,
        RecordKind::SegmentB => &SEGMENT_B,
        RecordKind::BatchTrailer => &BATCH_TRAILER,
        RecordKind::FileTrailer => &FILE_TRAILER,
    }
}

/// File header (record type 0)
pub static FILE_HEADER: RecordLayout = RecordLayout {
    kind: RecordKind::FileHeader,
    name: "file_header",
    fields: &[
        num("bank_code", 1, 3, "237"),
        num("batch", 4, 7, "0000"),
        num("record_type", 8, 8, "0"),
        text("cnab_blank", 9, 17, ""),
        num("payer_tax_id_type", 18, 18, ""),
        num("payer_tax_id", 19, 32, ""),
        text("agreement_code", 33, 52, ""),
        num("agency", 53, 57, ""),
        text("agency_digit", 58, 58, ""),
        num("account", 59, 70, ""),
        text("account_digit", 71, 71, ""),
        text("agency_account_digit", 72, 72, ""),
        text("company_name", 73, 102, ""),
        text("bank_name", 103, 132, "BRADESCO"),
        text("cnab_blank_2", 133, 142, ""),
        num("remittance_code", 143, 143, "1"),
        num("generation_date", 144, 151, ""),
        num("generation_time", 152, 157, ""),
        num("file_sequence", 158, 163, ""),
        num("file_layout", 164, 166, "089"),
        num("density", 167, 171, "01600"),
        text("bank_reserved", 172, 174, ""),
        text("bank_reserved_2", 175, 240, ""),
    ],
};

/// Batch header (record type 1)
pub static BATCH_HEADER: RecordLayout = RecordLayout {
    kind: RecordKind::BatchHeader,
    name: "batch_header",
    fields: &[
        num("bank_code", 1, 3, "237"),
        num("batch", 4, 7, ""),
        num("record_type", 8, 8, "1"),
        text("operation", 9, 9, "C"),
        num("service_type", 10, 11, "20"),
        num("settlement_form", 12, 13, ""),
        num("batch_layout", 14, 16, "045"),
        text("cnab_blank", 17, 17, ""),
        num("payer_tax_id_type", 18, 18, ""),
        num("payer_tax_id", 19, 32, ""),
        text("agreement_code", 33, 52, ""),
        num("agency", 53, 57, ""),
        text("agency_digit", 58, 58, ""),
        num("account", 59, 70, ""),
        text("account_digit", 71, 71, ""),
        text("agency_account_digit", 72, 72, ""),
        text("company_name", 73, 102, ""),
        text("message", 103, 142, ""),
        text("street", 143, 172, ""),
        num("street_number", 173, 177, ""),
        text("complement", 178, 192, ""),
        text("city", 193, 212, ""),
        num("zip_code", 213, 217, ""),
        text("zip_suffix", 218, 220, ""),
        text("state", 221, 222, ""),
        num("payment_form", 223, 224, "01"),
        text("cnab_blank_2", 225, 230, ""),
        text("occurrences", 231, 240, ""),
    ],
};

/// Segment A for TED and same-bank credit batches
pub static SEGMENT_A: RecordLayout = RecordLayout {
    kind: RecordKind::SegmentA,
    name: "segment_a",
    fields: &[
        num("bank_code", 1, 3, "237"),
        num("batch", 4, 7, ""),
        num("record_type", 8, 8, "3"),
        num("record_number", 9, 13, ""),
        text("segment", 14, 14, "A"),
        num("movement_type", 15, 15, "0"),
        num("instruction_code", 16, 17, "00"),
        num("clearing_house", 18, 20, ""),
        num("favored_bank", 21, 23, ""),
        num("favored_agency", 24, 28, ""),
        text("favored_agency_digit", 29, 29, ""),
        num("favored_account", 30, 41, ""),
        text("favored_account_digit", 42, 42, ""),
        text("favored_agency_account_digit", 43, 43, ""),
        text("favored_name", 44, 73, ""),
        text("company_document", 74, 93, ""),
        num("payment_date", 94, 101, ""),
        text("currency_type", 102, 104, "BRL"),
        num("currency_quantity", 105, 119, "0"),
        num("payment_amount", 120, 134, ""),
        text("bank_document", 135, 154, ""),
        num("effective_date", 155, 162, "0"),
        num("effective_amount", 163, 177, "0"),
        text("complementary_info", 178, 217, ""),
        num("favored_tax_id_type", 218, 218, ""),
        num("favored_tax_id", 219, 233, ""),
        text("doc_purpose", 234, 235, ""),
        text("ted_purpose", 236, 240, ""),
    ],
};

/// Segment A for PIX batches: positions 227-240 stay blank
pub static SEGMENT_A_PIX: RecordLayout = RecordLayout {
    kind: RecordKind::SegmentAPix,
    name: "segment_a_pix",
    fields: &[
        num("bank_code", 1, 3, "237"),
        num("batch", 4, 7, ""),
        num("record_type", 8, 8, "3"),
        num("record_number", 9, 13, ""),
        text("segment", 14, 14, "A"),
        num("movement_type", 15, 15, "0"),
        num("instruction_code", 16, 17, "00"),
        num("clearing_house", 18, 20, ""),
        num("favored_bank", 21, 23, ""),
        num("favored_agency", 24, 28, ""),
        text("favored_agency_digit", 29, 29, ""),
        num("favored_account", 30, 41, ""),
        text("favored_account_digit", 42, 42, ""),
        text("favored_agency_account_digit", 43, 43, ""),
        text("favored_name", 44, 73, ""),
        text("company_document", 74, 93, ""),
        num("payment_date", 94, 101, ""),
        text("currency_type", 102, 104, "BRL"),
        num("currency_quantity", 105, 119, "0"),
        num("payment_amount", 120, 134, ""),
        text("bank_document", 135, 154, ""),
        num("effective_date", 155, 162, "0"),
        num("effective_amount", 163, 177, "0"),
        text("complementary_info", 178, 217, ""),
        num("favored_tax_id_type", 218, 218, ""),
        num("favored_tax_id_root", 219, 226, "0"),
        text("febraban_reserved", 227, 229, ""),
        text("bank_reserved", 230, 240, ""),
    ],
};

/// Segment B: favored party identity and PIX key
pub static SEGMENT_B: RecordLayout = RecordLayout {
    kind: RecordKind::SegmentB,
    name: "segment_b",
    fields: &[
        num("bank_code", 1, 3, "237"),
        num("batch", 4, 7, ""),
        num("record_type", 8, 8, "3"),
        num("record_number", 9, 13, ""),
        text("segment", 14, 14, "B"),
        text("initiation_method", 15, 17, ""),
        num("favored_tax_id_type", 18, 18, ""),
        num("favored_tax_id", 19, 32, ""),
        text("info_10", 33, 67, ""),
        text("info_11", 68, 127, ""),
        text("pix_key", 128, 226, ""),
        text("cnab_blank", 227, 240, ""),
    ],
};

/// Batch trailer (record type 5)
pub static BATCH_TRAILER: RecordLayout = RecordLayout {
    kind: RecordKind::BatchTrailer,
    name: "batch_trailer",
    fields: &[
        num("bank_code", 1, 3, "237"),
        num("batch", 4, 7, ""),
        num("record_type", 8, 8, "5"),
        text("cnab_blank", 9, 17, ""),
        num("record_count", 18, 23, ""),
        num("total_amount", 24, 41, ""),
        num("currency_quantity", 42, 59, "0"),
        num("debit_notice", 60, 65, "0"),
        text("cnab_blank_2", 66, 230, ""),
        text("occurrences", 231, 240, ""),
    ],
};

/// File trailer (record type 9)
pub static FILE_TRAILER: RecordLayout = RecordLayout {
    kind: RecordKind::FileTrailer,
    name: "file_trailer",
    fields: &[
        num("bank_code", 1, 3, "237"),
        num("batch", 4, 7, "9999"),
        num("record_type", 8, 8, "9"),
        text("cnab_blank", 9, 17, ""),
        num("batch_count", 18, 23, ""),
        num("record_count", 24, 29, ""),
        num("account_count", 30, 35, "0"),
        text("cnab_blank_2", 36, 240, ""),
    ],
};
