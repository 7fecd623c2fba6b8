use super::columns::EventRow;
use super::fields::{target_for, Coercion, FormCategory};
use super::normalizer::{logical_id_prefix, normalize_label, parse_date};
use super::record::{ChangeRecord, RecordKey};
use super::{ParseReport, ParseWarning, ParsedEvents};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Folds export rows into one [`ChangeRecord`] per (person id, record number).
#[derive(Debug, Default)]
pub(crate) struct EventAggregator {
    records: Vec<ChangeRecord>,
    index: HashMap<RecordKey, usize>,
    logical_id_prefix: Option<String>,
    report: ParseReport,
}

impl EventAggregator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn warn(&mut self, warning: ParseWarning) {
        self.report.warnings.push(warning);
    }

    pub(crate) fn push_row(&mut self, row_number: usize, row: EventRow<'_>) {
        self.report.rows_read += 1;

        if row.person_id.is_empty() || row.record_number.is_empty() {
            debug!(
                row = row_number,
                person_id = row.person_id,
                record_number = row.record_number,
                "skipping row without identity"
            );
            self.report.skipped_rows.push(row_number);
            return;
        }

        let key = RecordKey::new(row.person_id, row.record_number);
        let position = match self.index.get(&key) {
            Some(&position) => position,
            None => {
                debug!(row = row_number, key = %key, "new change record");
                self.records.push(ChangeRecord::new(key.clone()));
                self.index.insert(key, self.records.len() - 1);
                self.records.len() - 1
            }
        };

        if self.logical_id_prefix.is_none() && !row.logical_id.is_empty() {
            let prefix = logical_id_prefix(row.logical_id);
            debug!(logical_id = row.logical_id, prefix = %prefix, "logical id prefix detected");
            self.logical_id_prefix = Some(prefix);
        }

        let record = &mut self.records[position];
        merge_metadata(record, &row);

        let mut label_start_date = false;
        let mut label_end_date = false;

        if !row.field_label.is_empty() && !row.value.is_empty() {
            let category = record.category.as_deref().and_then(FormCategory::from_label);
            match category {
                Some(category) => {
                    let label = normalize_label(row.field_label);
                    match target_for(category, record.event_kind(), &label) {
                        Some(target) => match target.apply(record, row.value) {
                            Ok(()) => {
                                label_start_date = target.is_start_date();
                                label_end_date = target.is_end_date();
                            }
                            Err(coercion) => {
                                let warning =
                                    coercion_warning(coercion, row_number, &row, record.key());
                                warn!(row = row_number, key = %record.key(), ?warning, "value ignored");
                                self.report.warnings.push(warning);
                            }
                        },
                        None => {
                            warn!(
                                row = row_number,
                                category = row.category,
                                label = row.field_label,
                                "unrecognized field label"
                            );
                            self.report.warnings.push(ParseWarning::UnrecognizedLabel {
                                row: row_number,
                                category: record.category.clone().unwrap_or_default(),
                                label: row.field_label.to_string(),
                            });
                        }
                    }
                }
                None => debug!(
                    row = row_number,
                    category = ?record.category,
                    label = row.field_label,
                    "category not handled"
                ),
            }
        }

        if !label_start_date && record.start_date.is_none() && !row.start_date.is_empty() {
            match parse_date(row.start_date) {
                Some(date) => record.start_date = Some(date),
                None => self.report.warnings.push(ParseWarning::InvalidDate {
                    row: row_number,
                    key: record.key().clone(),
                    label: "Start Date".to_string(),
                    value: row.start_date.to_string(),
                }),
            }
        }

        if !label_end_date && record.end_date.is_none() && !row.end_date.is_empty() {
            match parse_date(row.end_date) {
                Some(date) => record.end_date = Some(date),
                None => self.report.warnings.push(ParseWarning::InvalidDate {
                    row: row_number,
                    key: record.key().clone(),
                    label: "End Date".to_string(),
                    value: row.end_date.to_string(),
                }),
            }
        }
    }

    pub(crate) fn finish(self) -> ParsedEvents {
        let EventAggregator {
            records,
            logical_id_prefix,
            mut report,
            ..
        } = self;

        let aggregated = records.len();
        let mut retained = Vec::with_capacity(aggregated);
        for record in records {
            if record.has_signal() {
                retained.push(record);
            } else {
                debug!(key = %record.key(), "dropping change record without signal");
                report.dropped.push(record.key().clone());
            }
        }

        info!(
            rows = report.rows_read,
            skipped = report.skipped_rows.len(),
            aggregated,
            retained = retained.len(),
            warnings = report.warnings.len(),
            "waiting events aggregated"
        );

        ParsedEvents {
            records: retained,
            logical_id_prefix: logical_id_prefix.unwrap_or_default(),
            report,
        }
    }
}

fn merge_metadata(record: &mut ChangeRecord, row: &EventRow<'_>) {
    let overwrite = |slot: &mut Option<String>, value: &str| {
        if !value.is_empty() {
            *slot = Some(value.to_string());
        }
    };

    overwrite(&mut record.employee_name, row.employee_name);
    overwrite(&mut record.event, row.event);
    overwrite(&mut record.action, row.action);
    overwrite(&mut record.category, row.category);
    overwrite(&mut record.logical_id, row.logical_id);
}

fn coercion_warning(
    coercion: Coercion,
    row_number: usize,
    row: &EventRow<'_>,
    key: &RecordKey,
) -> ParseWarning {
    let label = row.field_label.to_string();
    let value = row.value.to_string();
    let key = key.clone();
    match coercion {
        Coercion::Date => ParseWarning::InvalidDate {
            row: row_number,
            key,
            label,
            value,
        },
        Coercion::Decimal => ParseWarning::InvalidDecimal {
            row: row_number,
            key,
            label,
            value,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row<'a>(
        person_id: &'a str,
        record_number: &'a str,
        event: &'a str,
        category: &'a str,
        field_label: &'a str,
        value: &'a str,
    ) -> EventRow<'a> {
        EventRow {
            person_id,
            record_number,
            event,
            category,
            field_label,
            value,
            ..EventRow::default()
        }
    }

    #[test]
    fn rows_with_same_key_merge_into_one_record() {
        let mut aggregator = EventAggregator::new();
        aggregator.push_row(2, row("1001", "1", "Data Change", "Personal Data", "Given Name", "Ann"));
        aggregator.push_row(3, row("1001", "1", "", "", "Family Name", "Lee"));
        aggregator.push_row(4, row("1001", "2", "Data Change", "Personal Data", "Gender Code", "F"));

        let parsed = aggregator.finish();
        assert_eq!(parsed.records.len(), 2);
        let first = &parsed.records[0];
        assert_eq!(first.category.as_deref(), Some("Personal Data"));
        assert_eq!(first.personal.first_name.as_deref(), Some("Ann"));
        assert_eq!(first.personal.last_name.as_deref(), Some("Lee"));
    }

    #[test]
    fn rows_without_identity_are_skipped() {
        let mut aggregator = EventAggregator::new();
        aggregator.push_row(2, row("", "1", "Data Change", "Personal Data", "Given Name", "Ann"));
        aggregator.push_row(3, row("1001", "", "Data Change", "Personal Data", "Given Name", "Ann"));
        aggregator.push_row(4, row("1002", "1", "Hiring", "Benefits", "Plan", "Gold"));

        let parsed = aggregator.finish();
        assert!(parsed.records.is_empty());
        assert_eq!(parsed.report.rows_read, 3);
        assert_eq!(parsed.report.skipped_rows, vec![2, 3]);
        assert_eq!(parsed.report.dropped, vec![RecordKey::new("1002", "1")]);
    }

    #[test]
    fn invalid_values_warn_and_leave_attribute_unset() {
        let mut aggregator = EventAggregator::new();
        aggregator.push_row(2, row("1001", "1", "Data Change", "Personal Data", "Given Name", "Ann"));
        aggregator.push_row(3, row("1001", "1", "", "", "Birth Date", "31/31/1990"));
        aggregator.push_row(4, row("1001", "1", "", "", "Favourite Colour", "Blue"));

        let parsed = aggregator.finish();
        let record = &parsed.records[0];
        assert!(record.personal.birth_date.is_none());
        assert!(matches!(
            parsed.report.warnings[0],
            ParseWarning::InvalidDate { row: 3, .. }
        ));
        assert!(matches!(
            &parsed.report.warnings[1],
            ParseWarning::UnrecognizedLabel { label, .. } if label == "Favourite Colour"
        ));
    }

    #[test]
    fn start_date_column_only_fills_unset_dates() {
        let mut aggregator = EventAggregator::new();
        let mut first = row("1001", "1", "Data Change", "Deployment", "Start Date", "2025-02-01");
        first.start_date = "2025-01-01";
        aggregator.push_row(2, first);

        let mut second = row("1001", "1", "", "", "Position Title", "Analyst");
        second.start_date = "2025-03-01";
        aggregator.push_row(3, second);

        let mut other = row("1002", "1", "Data Change", "Cost Assignment", "Cost Center Code", "CC-9");
        other.start_date = "2025-04-01";
        aggregator.push_row(4, other);

        let parsed = aggregator.finish();
        assert_eq!(
            parsed.records[0].start_date,
            NaiveDate::from_ymd_opt(2025, 2, 1)
        );
        assert_eq!(
            parsed.records[1].start_date,
            NaiveDate::from_ymd_opt(2025, 4, 1)
        );
    }

    #[test]
    fn unparseable_label_date_falls_back_to_date_columns() {
        let mut aggregator = EventAggregator::new();
        let mut start = row("1001", "1", "Data Change", "Deployment", "Start Date", "not-a-date");
        start.start_date = "2025-01-01";
        aggregator.push_row(2, start);

        let mut end = row("1001", "1", "", "", "End Date", "31/31/2025");
        end.end_date = "2025-12-31";
        aggregator.push_row(3, end);

        let mut title = row("1001", "1", "", "", "Position Title", "Analyst");
        title.start_date = "2025-06-01";
        aggregator.push_row(4, title);

        let parsed = aggregator.finish();
        let record = &parsed.records[0];
        assert_eq!(record.start_date, NaiveDate::from_ymd_opt(2025, 1, 1));
        assert_eq!(record.end_date, NaiveDate::from_ymd_opt(2025, 12, 31));
        assert_eq!(
            parsed
                .report
                .warnings
                .iter()
                .filter(|warning| matches!(warning, ParseWarning::InvalidDate { .. }))
                .count(),
            2
        );
    }

    #[test]
    fn prefix_comes_from_first_logical_id_only() {
        let mut aggregator = EventAggregator::new();
        let mut first = row("1001", "1", "Termination", "Deployment", "Termination Reason", "Resigned");
        first.logical_id = "ACME-001";
        aggregator.push_row(2, first);
        let mut second = row("1002", "1", "Termination", "Deployment", "Termination Reason", "Resigned");
        second.logical_id = "OTHER-002";
        aggregator.push_row(3, second);

        let parsed = aggregator.finish();
        assert_eq!(parsed.logical_id_prefix, "ACME");
        assert_eq!(parsed.records[1].logical_id.as_deref(), Some("OTHER-002"));
    }

    #[test]
    fn blank_label_row_only_merges_metadata() {
        let mut aggregator = EventAggregator::new();
        aggregator.push_row(2, row("1001", "1", "Termination", "Deployment", "Termination Date", "2025-05-31"));
        let mut metadata = row("1001", "1", "", "", "", "");
        metadata.action = "TERMINATE";
        metadata.employee_name = "Ann Lee";
        aggregator.push_row(3, metadata);

        let parsed = aggregator.finish();
        let record = &parsed.records[0];
        assert_eq!(record.action.as_deref(), Some("TERMINATE"));
        assert_eq!(record.employee_name.as_deref(), Some("Ann Lee"));
        assert_eq!(
            record.termination.date,
            NaiveDate::from_ymd_opt(2025, 5, 31)
        );
    }
}
