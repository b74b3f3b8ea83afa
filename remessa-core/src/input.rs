//! Payment sheet ingestion
//!
//! Reads the payment sheet exported as CSV. Column keys follow the sheet
//! template; every cell is read as text and interpreted later by
//! [`crate::validation`].

use crate::types::RowOrdinal;
use crate::{Error, Result};
use csv::{ReaderBuilder, Trim, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Every column of the sheet template, in template order
pub const COLUMNS: [&str; 11] = [
    "NOME_FAVORECIDO",
    "CPF_CNPJ",
    "COD_BANCO",
    "AGENCIA",
    "CONTA",
    "DIGITO_CONTA",
    "VALOR_PAGAMENTO",
    "DATA_PAGAMENTO",
    "TIPO_CHAVE_PIX",
    "CHAVE_PIX",
    "DESCRICAO",
];

/// Columns a sheet must carry
pub const REQUIRED_COLUMNS: [&str; 5] = [
    "NOME_FAVORECIDO",
    "CPF_CNPJ",
    "COD_BANCO",
    "VALOR_PAGAMENTO",
    "DATA_PAGAMENTO",
];

/// One raw sheet row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRow {
    /// 1-based position among the sheet's data rows, assigned before
    /// blank rows are dropped
    #[serde(skip)]
    pub ordinal: RowOrdinal,

    /// Favored party name
    #[serde(rename = "NOME_FAVORECIDO", default)]
    pub favored_name: String,

    /// CPF or CNPJ
    #[serde(rename = "CPF_CNPJ", default)]
    pub tax_id: String,

    /// Destination bank code
    #[serde(rename = "COD_BANCO", default)]
    pub bank_code: String,

    /// Destination agency
    #[serde(rename = "AGENCIA", default)]
    pub agency: String,

    /// Destination account
    #[serde(rename = "CONTA", default)]
    pub account: String,

    /// Destination account check digit
    #[serde(rename = "DIGITO_CONTA", default)]
    pub account_digit: String,

    /// Amount, e.g. `150.50`, `150,50` or `R$ 150,50`
    #[serde(rename = "VALOR_PAGAMENTO", default)]
    pub amount: String,

    /// Payment date, `DD/MM/YYYY`
    #[serde(rename = "DATA_PAGAMENTO", default)]
    pub payment_date: String,

    /// PIX key type label
    #[serde(rename = "TIPO_CHAVE_PIX", default)]
    pub pix_key_type: String,

    /// PIX key
    #[serde(rename = "CHAVE_PIX", default)]
    pub pix_key: String,

    /// Free-text description
    #[serde(rename = "DESCRICAO", default)]
    pub description: String,
}

impl InputRow {
    /// A row without a name or an amount is treated as filler
    pub fn is_blank(&self) -> bool {
        self.favored_name.trim().is_empty() || self.amount.trim().is_empty()
    }

    /// Sheet line number (header is line 1)
    pub fn line_number(&self) -> u32 {
        self.ordinal + 1
    }
}

/// Read sheet rows, dropping blank ones
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<InputRow>> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(Error::MissingColumns(missing));
    }

    let mut rows = Vec::new();
    let mut dropped = 0usize;
    for (index, record) in rdr.deserialize::<InputRow>().enumerate() {
        let mut row = record?;
        row.ordinal = RowOrdinal::try_from(index + 1)
            .map_err(|_| Error::Other("too many rows in sheet".to_string()))?;
        if row.is_blank() {
            dropped += 1;
            continue;
        }
        rows.push(row);
    }

    tracing::info!("Read {} rows ({} blank rows skipped)", rows.len(), dropped);
    Ok(rows)
}

/// Sheet template: header row plus one example row
pub fn template_csv() -> Result<String> {
    let example = InputRow {
        ordinal: 1,
        favored_name: "FULANO DE TAL".to_string(),
        tax_id: "000.123.456-78".to_string(),
        bank_code: "237".to_string(),
        agency: "1234".to_string(),
        account: "0012345".to_string(),
        account_digit: "0".to_string(),
        amount: "150.50".to_string(),
        payment_date: "25/12/2026".to_string(),
        pix_key_type: "Email".to_string(),
        pix_key: "pix@exemplo.com".to_string(),
        description: "Servico Prestado".to_string(),
    };

    let mut wtr = WriterBuilder::new().from_writer(Vec::new());
    wtr.serialize(&example)?;
    let bytes = wtr
        .into_inner()
        .map_err(|e| Error::Other(format!("Failed to flush template: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| Error::Other(e.to_string()))
}
