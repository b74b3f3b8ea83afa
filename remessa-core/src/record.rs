//! Fixed-width field formatting and record assembly
//!
//! Widths are counted in characters: the emitted file uses a single-byte
//! charset, so one character is one byte once encoded.

use crate::layout::{FieldSpec, PadPolicy, RecordLayout};
use crate::RECORD_LENGTH;
use std::collections::BTreeMap;

/// Render one value into its slot.
///
/// Empty or absent values fall back to the field default. Oversized values
/// keep their leftmost characters; nothing is ever rejected.
pub fn format_field(value: Option<&str>, spec: &FieldSpec) -> String {
    let width = spec.width();
    let raw = match value {
        Some(v) if !v.is_empty() => v,
        _ => spec.default,
    };

    let mut out: String = raw.chars().take(width).collect();
    let len = out.chars().count();
    if len < width {
        let fill = width - len;
        match spec.pad {
            PadPolicy::ZeroLeft => {
                out = format!("{}{}", "0".repeat(fill), out);
            }
            PadPolicy::SpaceRight => {
                out.push_str(&" ".repeat(fill));
            }
        }
    }
    out
}

/// Sparse set of field values for one record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldValues(BTreeMap<&'static str, String>);

impl FieldValues {
    /// Empty value set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field value (builder style)
    pub fn with(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.0.insert(name, value.into());
        self
    }

    /// Set a field value
    pub fn set(&mut self, name: &'static str, value: impl Into<String>) {
        self.0.insert(name, value.into());
    }

    /// Get a field value
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Field names that are set
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }
}

/// Assembles 240-character records from a layout and a value set
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordBuilder;

impl RecordBuilder {
    /// Build one record.
    ///
    /// Fields are walked in start order; gaps between fields become spaces.
    /// The result is clamped to exactly [`RECORD_LENGTH`] characters.
    pub fn build(layout: &RecordLayout, values: &FieldValues) -> String {
        debug_assert!(
            values.names().all(|n| layout.field(n).is_some()),
            "value set for {} names fields outside the layout",
            layout.name
        );

        let mut fields: Vec<&FieldSpec> = layout.fields.iter().collect();
        fields.sort_by_key(|f| f.start);

        let mut line = String::with_capacity(RECORD_LENGTH);
        let mut position = 1;

        for spec in fields {
            if spec.start > position {
                line.push_str(&" ".repeat(spec.start - position));
            }
            line.push_str(&format_field(values.get(spec.name), spec));
            position = spec.end + 1;
        }

        let len = line.chars().count();
        if len < RECORD_LENGTH {
            line.push_str(&" ".repeat(RECORD_LENGTH - len));
        } else if len > RECORD_LENGTH {
            line = line.chars().take(RECORD_LENGTH).collect();
        }
        line
    }
}
