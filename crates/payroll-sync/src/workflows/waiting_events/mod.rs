//! Waiting-events export ingestion.
//!
//! The HR system exports one row per (employee record, field) pair. The importer
//! reads the header, folds rows sharing a (person id, record number) key into a
//! single [`ChangeRecord`], and drops records that carry nothing submittable.

mod aggregator;
mod columns;
mod fields;
mod normalizer;
pub mod record;
pub mod source;

use aggregator::EventAggregator;
use columns::ColumnMap;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;
use tracing::{error, warn};

pub use record::{
    ChangeRecord, EventKind, PayElementFields, PersonalFields, PositionFields, RecordField,
    RecordKey, TerminationFields,
};
pub use source::{CsvSource, TabularSource, XlsxSource};

pub(crate) use normalizer::normalize_label;
pub(crate) use normalizer::parse_date;
pub(crate) use normalizer::parse_decimal;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read waiting events export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid waiting events CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid waiting events workbook: {0}")]
    Xlsx(String),
}

/// Non-fatal findings collected while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseWarning {
    MissingColumns {
        columns: Vec<String>,
    },
    InvalidDate {
        row: usize,
        key: RecordKey,
        label: String,
        value: String,
    },
    InvalidDecimal {
        row: usize,
        key: RecordKey,
        label: String,
        value: String,
    },
    UnrecognizedLabel {
        row: usize,
        category: String,
        label: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParseReport {
    pub rows_read: usize,
    /// Spreadsheet row numbers (header = 1) skipped for a blank identity.
    pub skipped_rows: Vec<usize>,
    pub dropped: Vec<RecordKey>,
    pub warnings: Vec<ParseWarning>,
}

/// Output of one parse. Records keep first-seen key order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedEvents {
    pub records: Vec<ChangeRecord>,
    pub logical_id_prefix: String,
    pub report: ParseReport,
}

impl ParsedEvents {
    fn empty() -> Self {
        Self {
            records: Vec::new(),
            logical_id_prefix: String::new(),
            report: ParseReport::default(),
        }
    }

    pub fn summary(&self) -> ParseSummary {
        ParseSummary::from_records(&self.records)
    }
}

/// Headline figures shown to an operator before submitting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseSummary {
    pub total_records: usize,
    pub unique_employees: usize,
    pub pay_elements: usize,
    pub total_amount: Decimal,
}

impl ParseSummary {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a ChangeRecord>,
    {
        let mut total_records = 0;
        let mut employees = BTreeSet::new();
        let mut pay_elements = BTreeSet::new();
        let mut total_amount = Decimal::ZERO;

        for record in records {
            total_records += 1;
            employees.insert(record.person_id());
            if let Some(id) = record.pay_element_id() {
                pay_elements.insert(id);
            }
            if let Some(amount) = record.pay_element.amount {
                total_amount += amount;
            }
        }

        Self {
            total_records,
            unique_employees: employees.len(),
            pay_elements: pay_elements.len(),
            total_amount,
        }
    }
}

pub struct WaitingEventsImporter;

impl WaitingEventsImporter {
    /// Opens a CSV or XLSX export, chosen by file extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<ParsedEvents, ImportError> {
        let path = path.as_ref();
        let is_xlsx = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("xlsx"))
            .unwrap_or(false);

        if is_xlsx {
            Self::from_xlsx_bytes(std::fs::read(path)?)
        } else {
            Self::from_csv_reader(std::fs::File::open(path)?)
        }
    }

    /// Parses an uploaded export, sniffing the format from its first bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<ParsedEvents, ImportError> {
        if source::looks_like_xlsx(&bytes) {
            Self::from_xlsx_bytes(bytes)
        } else {
            Self::from_csv_reader(std::io::Cursor::new(bytes))
        }
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<ParsedEvents, ImportError> {
        Self::from_source(&mut CsvSource::new(reader))
    }

    pub fn from_xlsx_bytes(bytes: Vec<u8>) -> Result<ParsedEvents, ImportError> {
        Self::from_source(&mut XlsxSource::from_bytes(bytes)?)
    }

    pub fn from_source<S: TabularSource + ?Sized>(
        source: &mut S,
    ) -> Result<ParsedEvents, ImportError> {
        let Some(header) = source.next_row()? else {
            warn!("waiting events export has no header row");
            return Ok(ParsedEvents::empty());
        };

        let columns = ColumnMap::from_header(&header);
        let mut aggregator = EventAggregator::new();

        if !columns.has_identity() {
            error!("waiting events export has neither a Person ID nor a Record Number column");
        }
        let missing = columns.missing_required();
        if !missing.is_empty() {
            warn!(?missing, "waiting events export is missing expected columns");
            aggregator.warn(ParseWarning::MissingColumns {
                columns: missing.iter().map(|name| name.to_string()).collect(),
            });
        }

        let mut row_number = 1;
        while let Some(cells) = source.next_row()? {
            row_number += 1;
            if cells.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }
            aggregator.push_row(row_number, columns.row(&cells));
        }

        Ok(aggregator.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Cursor;
    use std::str::FromStr;

    const HEADER: &str =
        "Person ID,Record Number,Event,Category / Form Name,Field Label,Value,Logical ID,Start Date,End Date,Employee Name,Action\n";

    fn parse(body: &str) -> ParsedEvents {
        WaitingEventsImporter::from_csv_reader(Cursor::new(format!("{HEADER}{body}")))
            .expect("parse succeeds")
    }

    #[test]
    fn empty_input_yields_empty_result() {
        let parsed =
            WaitingEventsImporter::from_csv_reader(Cursor::new("")).expect("empty parse");
        assert!(parsed.records.is_empty());
        assert_eq!(parsed.logical_id_prefix, "");

        let parsed = parse("");
        assert!(parsed.records.is_empty());
    }

    #[test]
    fn pay_element_rows_build_one_record() {
        let parsed = parse(
            "1001,7,Pay Element,Pay Element,Pay Element,BONUS,ACME-001,,,Ann Lee,ADD\n\
1001,7,Pay Element,Pay Element,Unit Type,Amount,ACME-002,,,,\n\
1001,7,Pay Element,Pay Element,Amount,1500.50,ACME-003,,,,\n",
        );

        assert_eq!(parsed.records.len(), 1);
        let record = &parsed.records[0];
        assert_eq!(record.pay_element_id(), Some("BONUS"));
        assert_eq!(record.pay_element.amount, Decimal::from_str("1500.50").ok());
        assert_eq!(record.logical_id.as_deref(), Some("ACME-003"));
        assert_eq!(record.employee_name.as_deref(), Some("Ann Lee"));
        assert_eq!(parsed.logical_id_prefix, "ACME");
    }

    #[test]
    fn retained_count_matches_distinct_keys_with_signal() {
        let parsed = parse(
            "1001,1,Data Change,Personal Data,Given Name,Ann,,,,,\n\
1002,1,Data Change,Communication,Email Address,bo@example.com,,,,,\n\
1001,2,Termination,Deployment,Termination Reason,Resigned,,,,,\n\
,3,Termination,Deployment,Termination Reason,Resigned,,,,,\n\
1003,1,Data Change,Personal Data,Favourite Colour,Blue,,,,,\n\
1001,1,Data Change,Personal Data,Family Name,Lee,,,,,\n",
        );

        let keys: Vec<_> = parsed.records.iter().map(|r| r.key().to_string()).collect();
        assert_eq!(keys, vec!["1001|1", "1002|1", "1001|2"]);
        assert_eq!(parsed.report.dropped, vec![RecordKey::new("1003", "1")]);
        assert_eq!(parsed.report.skipped_rows, vec![5]);
    }

    #[test]
    fn typed_bucket_carries_payment_instruction_values() {
        let parsed = parse(
            "1001,4,Data Change,Payment Instruction,Bank Name,First Bank,,,,,CHANGE\n\
1001,4,Data Change,Payment Instruction,Account No,000123,,,,,\n",
        );

        let record = &parsed.records[0];
        assert_eq!(record.field(RecordField::BankName), Some("First Bank"));
        assert_eq!(record.field(RecordField::AccountNumber), Some("000123"));
    }

    #[test]
    fn missing_columns_are_reported_but_parsing_continues() {
        let parsed = WaitingEventsImporter::from_csv_reader(Cursor::new(
            "Person ID,Record Number,Event,Category / Form Name,Field Label\n1001,1,Termination,Deployment,Termination Reason\n",
        ))
        .expect("parse succeeds");

        assert!(parsed.records.is_empty());
        assert_eq!(
            parsed.report.warnings,
            vec![ParseWarning::MissingColumns {
                columns: vec!["Value".to_string()]
            }]
        );
    }

    #[test]
    fn reparsing_identical_input_is_idempotent() {
        let body = "1001,1,Hiring,Personal Data,Birth Date,1990-04-12,X-1,2025-01-01,,,ADD\n\
1001,1,Hiring,Deployment,Position Title,Analyst,X-2,,,,\n";
        assert_eq!(parse(body), parse(body));
        assert_eq!(
            parse(body).records[0].personal.birth_date,
            NaiveDate::from_ymd_opt(1990, 4, 12)
        );
    }

    #[test]
    fn summary_counts_employees_pay_elements_and_amounts() {
        let parsed = parse(
            "1001,1,Pay Element,Pay Element,Pay Element,BONUS,,,,,\n\
1001,1,Pay Element,Pay Element,Amount,100,,,,,\n\
1002,1,Pay Element,Pay Element,Pay Element,BONUS,,,,,\n\
1002,1,Pay Element,Pay Element,Amount,50.25,,,,,\n\
1002,2,Data Change,Personal Data,Given Name,Bo,,,,,\n",
        );

        let summary = parsed.summary();
        assert_eq!(summary.total_records, 3);
        assert_eq!(summary.unique_employees, 2);
        assert_eq!(summary.pay_elements, 1);
        assert_eq!(summary.total_amount, Decimal::from_str("150.25").expect("decimal"));
    }

    #[test]
    fn from_path_propagates_io_errors() {
        match WaitingEventsImporter::from_path("./does-not-exist.csv") {
            Err(ImportError::Io(_)) => {}
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
