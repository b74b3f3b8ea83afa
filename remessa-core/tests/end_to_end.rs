//! End-to-end tests for remittance generation
//!
//! Covers the whole pipeline:
//! - sheet -> rows -> validation -> instructions
//! - instructions -> batches -> encoded file
//! - encoded file -> structural audit
//! - NSA bookkeeping around a written file

use chrono::{NaiveDate, NaiveDateTime};
use remessa_core::input::read_rows;
use remessa_core::inspect::inspect;
use remessa_core::state::SequenceStore;
use remessa_core::validation::validate_rows;
use remessa_core::*;
use rust_decimal_macros::dec;
use tempfile::TempDir;

fn payer() -> PayerProfile {
    PayerProfile {
        company_name: "Construtora Exemplo Ltda".to_string(),
        tax_id: "95.258.174/0001-65".to_string(),
        agreement_code: "458049".to_string(),
        agency: "0268".to_string(),
        account: "559461".to_string(),
        account_digit: "8".to_string(),
        pix_enabled: true,
    }
}

fn generated_at() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 1, 13)
        .unwrap()
        .and_hms_opt(10, 15, 0)
        .unwrap()
}

fn payment_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
}

fn instruction(ordinal: u32, name: &str, tax_id: &str, bank: &str) -> PaymentInstruction {
    PaymentInstruction {
        ordinal,
        favored_name: name.to_string(),
        tax_id: tax_id.to_string(),
        bank_code: bank.to_string(),
        agency: "1234".to_string(),
        account: "55555".to_string(),
        account_digit: "0".to_string(),
        amount: dec!(100.00),
        payment_date: payment_date(),
        pix_key: None,
        pix_key_type: None,
        description: None,
    }
}

fn lines(file: &GeneratedFile) -> Vec<String> {
    String::from_utf8(file.bytes.clone())
        .expect("sanitized output is ASCII")
        .split("\r\n")
        .map(str::to_string)
        .collect()
}

#[test]
fn test_ted_and_pix_batches() {
    let ted = instruction(1, "Joao Ted", "11122233344", "341");
    let mut pix = instruction(2, "Maria Pix", "55566677788", "237");
    pix.amount = dec!(50.00);
    pix.pix_key = Some("maria@pix.com".to_string());
    pix.pix_key_type = Some("Email".to_string());

    let file = FileAssembler::new(&payer(), 1).generate_at(&[ted, pix], generated_at());
    let records = lines(&file);

    assert_eq!(records.len(), 9);
    assert_eq!(file.summary.batches.len(), 2);

    let ted_batch = &file.summary.batches[0];
    assert_eq!(ted_batch.method, SettlementMethod::Ted);
    assert_eq!(ted_batch.record_count(), 3);

    let pix_batch = &file.summary.batches[1];
    assert_eq!(pix_batch.method, SettlementMethod::Pix);
    assert_eq!(pix_batch.record_count(), 4);

    // Batch trailers
    assert_eq!(&records[3][7..8], "5");
    assert_eq!(&records[3][17..23], "000003");
    assert_eq!(&records[3][23..41], "000000000000010000");
    assert_eq!(&records[7][7..8], "5");
    assert_eq!(&records[7][17..23], "000004");
    assert_eq!(&records[7][23..41], "000000000000005000");

    // File trailer
    assert_eq!(&records[8][17..23], "000002");
    assert_eq!(&records[8][23..29], "000009");

    // PIX detail pair
    assert_eq!(&records[5][13..14], "A");
    assert_eq!(&records[5][17..20], "009");
    assert_eq!(&records[6][13..14], "B");
    assert_eq!(&records[6][14..17], "01 ");
    assert_eq!(&records[6][127..140], "MARIA@PIX.COM");

    assert!(file.summary.anomalies.is_empty());
    assert_eq!(file.summary.total_amount(), dec!(150.00));
}

#[test]
fn test_ten_digit_tax_id_restored_as_cpf() {
    let row = instruction(1, "Ana", "1234567890", "341");
    let file = FileAssembler::new(&payer(), 1).generate_at(&[row], generated_at());
    let segment_a = &lines(&file)[2];

    assert_eq!(&segment_a[217..218], "1");
    assert_eq!(&segment_a[218..233], "000001234567890");
    assert!(file.summary.anomalies.is_empty());
}

#[test]
fn test_long_accented_name_truncated() {
    let name = "José da Conceição Albuquerque Figueirêdo";
    assert_eq!(name.chars().count(), 40);

    let row = instruction(1, name, "11122233344", "341");
    let file = FileAssembler::new(&payer(), 1).generate_at(&[row], generated_at());
    let segment_a = &lines(&file)[2];

    assert_eq!(&segment_a[43..73], "JOSE DA CONCEICAO ALBUQUERQUE ");
    assert_eq!(segment_a.len(), RECORD_LENGTH);
}

#[test]
fn test_sheet_to_inspected_file() {
    let sheet = "\
NOME_FAVORECIDO,CPF_CNPJ,COD_BANCO,AGENCIA,CONTA,DIGITO_CONTA,VALOR_PAGAMENTO,DATA_PAGAMENTO,TIPO_CHAVE_PIX,CHAVE_PIX,DESCRICAO
Fornecedor Alfa,12.345.678/0001-90,341,1234,98765,4,\"R$ 1.500,00\",15/01/2026,,,Nota 123
,,,,,,,,,,
Joana Souza,123.456.789-01,237,0268,11111,1,250.75,2026-01-15,,,
Pedro Chave,987.654.321-00,001,,,,\"99,99\",15/01/2026,CPF,987.654.321-00,
Lucas Tel,111.222.333-44,033,,,,10,15/01/2026,Celular,+5511999998888,
";

    let rows = read_rows(sheet.as_bytes()).unwrap();
    assert_eq!(rows.len(), 4);

    let today = NaiveDate::from_ymd_opt(2026, 1, 13).unwrap();
    let (instructions, report) = validate_rows(&rows, today);
    assert!(!report.has_errors(), "{:?}", report.errors);
    assert_eq!(instructions.len(), 4);
    assert_eq!(instructions[1].ordinal, 3);

    let file = FileAssembler::new(&payer(), 12).generate_at(&instructions, generated_at());
    assert_eq!(file.file_name(), "CB130112.REM");

    let methods: Vec<_> = file.summary.batches.iter().map(|b| b.method).collect();
    assert_eq!(
        methods,
        vec![
            SettlementMethod::SameBankCredit,
            SettlementMethod::Ted,
            SettlementMethod::Pix
        ]
    );
    assert_eq!(file.summary.batches[2].ordinals, vec![4, 5]);
    assert_eq!(file.summary.total_amount(), dec!(1860.74));

    let records = lines(&file);
    // Same-bank batch: company document carries the sheet ordinal
    assert_eq!(&records[2][73..83], "0000000003");
    // TED batch: description and purpose code
    assert_eq!(&records[5][177..185], "NOTA 123");
    assert_eq!(&records[5][235..240], "00005");
    // PIX by CPF: key suppressed
    assert_eq!(&records[9][14..17], "03 ");
    assert_eq!(records[9][127..226].trim(), "");
    // PIX by phone: key kept
    assert_eq!(&records[11][14..17], "02 ");
    assert_eq!(records[11][127..226].trim(), "5511999998888");

    let audit = inspect(&file.bytes);
    assert!(audit.is_valid(), "{:?}", audit.issues);
    assert_eq!(audit.records, records.len());
    assert_eq!(audit.file_sequence, Some(12));
}

#[test]
fn test_degraded_rows_still_produce_a_file() {
    let mut negative = instruction(1, "Neg", "11122233344", "341");
    negative.amount = dec!(-5.00);
    let odd_id = instruction(2, "Odd", "123", "341");
    let mut odd_key = instruction(3, "Key", "11122233344", "001");
    odd_key.pix_key = Some("chave".to_string());
    odd_key.pix_key_type = Some("Banco".to_string());

    let file =
        FileAssembler::new(&payer(), 1).generate_at(&[negative, odd_id, odd_key], generated_at());
    let records = lines(&file);

    assert!(records.iter().all(|r| r.len() == RECORD_LENGTH));
    assert_eq!(&records[2][119..134], "000000000000000");
    assert_eq!(&records[3][217..218], "0");
    assert_eq!(&records[7][14..17], "01 ");

    assert_eq!(
        file.summary.anomalies,
        vec![
            Anomaly::NegativeAmount {
                ordinal: 1,
                amount: dec!(-5.00)
            },
            Anomaly::UnclassifiedTaxId {
                ordinal: 2,
                digits: "123".to_string()
            },
            Anomaly::UnrecognizedPixKeyType {
                ordinal: 3,
                label: "Banco".to_string()
            },
        ]
    );
    assert!(inspect(&file.bytes).is_valid());
}

#[test]
fn test_nsa_flows_through_state_file() {
    let dir = TempDir::new().unwrap();
    let state_path = dir.path().join("state.toml");
    let rows = vec![instruction(1, "Ana", "11122233344", "237")];

    let mut store = SequenceStore::load(&state_path).unwrap();
    let first = FileAssembler::new(&payer(), store.current()).generate_at(&rows, generated_at());
    std::fs::write(dir.path().join(first.file_name()), &first.bytes).unwrap();
    store
        .commit_after_success(first.summary.file_sequence)
        .unwrap();

    let store = SequenceStore::load(&state_path).unwrap();
    let second = FileAssembler::new(&payer(), store.current()).generate_at(&rows, generated_at());

    assert_eq!(first.file_name(), "CB130101.REM");
    assert_eq!(second.file_name(), "CB130102.REM");
    assert_eq!(&lines(&second)[0][157..163], "000002");
    assert!(dir.path().join("CB130101.REM").exists());
}
