//! Best-effort run history.
//!
//! A failing sink is logged and otherwise ignored: the submission result never
//! depends on whether the audit write landed.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use super::result::{SubmissionSummary, UnitResult};
use crate::workflows::mapping::MappedRecord;
use crate::workflows::waiting_events::PayElementFields;

pub const DEFAULT_DETAIL_LIMIT: usize = 50;

const NAME_WIDTH: usize = 100;
const CODE_WIDTH: usize = 50;
const FILE_NAME_WIDTH: usize = 255;
const ERROR_WIDTH: usize = 500;
const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditDetail {
    pub employee_id: String,
    pub employee_name: String,
    pub pay_element_id: String,
    pub component_code: String,
    pub success: bool,
    pub error_message: Option<String>,
    pub input_type: String,
    pub input_value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditRun {
    pub company_name: String,
    pub company_code: String,
    pub frequency: String,
    pub run: String,
    pub file_name: String,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub success: bool,
    pub message: String,
    pub recorded_at: DateTime<Utc>,
    pub details: Vec<AuditDetail>,
}

/// Identifies a run in the history, independent of its outcome.
#[derive(Debug, Clone, Default)]
pub struct AuditContext {
    pub company_name: String,
    pub company_code: String,
    pub frequency: String,
    pub run: String,
    pub file_name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("audit store unavailable: {0}")]
    Unavailable(String),
}

pub trait AuditSink: Send + Sync {
    fn record(&self, run: &AuditRun) -> Result<(), AuditError>;
}

fn truncate(value: &str, width: usize) -> String {
    value.chars().take(width).collect()
}

/// History rows echo the source unit type when it is not a standard one.
fn history_input(fields: &PayElementFields) -> (String, Decimal) {
    let unit_type = fields.unit_type.as_deref().map(str::trim).unwrap_or_default();
    match unit_type.to_ascii_lowercase().as_str() {
        "days" => ("Days".to_string(), fields.number_of_units.unwrap_or(Decimal::ZERO)),
        "hours" => ("Hours".to_string(), fields.number_of_units.unwrap_or(Decimal::ZERO)),
        "units" => ("Units".to_string(), fields.number_of_units.unwrap_or(Decimal::ZERO)),
        _ => match (fields.amount, fields.number_of_units) {
            (Some(amount), _) => ("Amount".to_string(), amount),
            (None, Some(units)) if !unit_type.is_empty() => (unit_type.to_string(), units),
            _ => ("Amount".to_string(), Decimal::ZERO),
        },
    }
}

pub struct AuditRecorder<A> {
    sink: Arc<A>,
    detail_limit: usize,
}

impl<A> AuditRecorder<A>
where
    A: AuditSink + 'static,
{
    pub fn new(sink: Arc<A>, detail_limit: usize) -> Self {
        Self { sink, detail_limit }
    }

    pub fn build(
        &self,
        context: &AuditContext,
        summary: &SubmissionSummary,
        records: &[MappedRecord],
    ) -> AuditRun {
        let details = summary
            .results
            .iter()
            .take(self.detail_limit)
            .map(|result| detail(result, records))
            .collect();

        AuditRun {
            company_name: truncate(&context.company_name, NAME_WIDTH),
            company_code: truncate(&context.company_code, CODE_WIDTH),
            frequency: truncate(&context.frequency, CODE_WIDTH),
            run: truncate(&context.run, CODE_WIDTH),
            file_name: truncate(&context.file_name, FILE_NAME_WIDTH),
            total: summary.total,
            succeeded: summary.succeeded,
            failed: summary.failed,
            success: summary.success,
            message: summary.message.clone(),
            recorded_at: Utc::now(),
            details,
        }
    }

    /// Writes the run history; returns whether the write landed.
    pub fn record(
        &self,
        context: &AuditContext,
        summary: &SubmissionSummary,
        records: &[MappedRecord],
    ) -> bool {
        let run = self.build(context, summary, records);
        match self.sink.record(&run) {
            Ok(()) => {
                info!(
                    company = %run.company_code,
                    details = run.details.len(),
                    "submission history recorded"
                );
                true
            }
            Err(err) => {
                warn!(error = %err, company = %run.company_code, "failed to record submission history");
                false
            }
        }
    }
}

fn detail(result: &UnitResult, records: &[MappedRecord]) -> AuditDetail {
    let exact = records.iter().find(|mapped| {
        mapped.employee_id() == result.employee_id
            && mapped.record.pay_element_id() == Some(result.unit.as_str())
            && result
                .record_number
                .as_deref()
                .map_or(true, |number| mapped.record.record_number() == number)
    });
    let origin = exact.or_else(|| {
        records
            .iter()
            .find(|mapped| mapped.employee_id() == result.employee_id)
    });

    let (input_type, input_value) = exact
        .map(|mapped| history_input(&mapped.record.pay_element))
        .unwrap_or_else(|| ("Amount".to_string(), Decimal::ZERO));
    let component_code = result
        .component_code
        .as_deref()
        .or_else(|| exact.and_then(MappedRecord::component_code))
        .unwrap_or_default();

    AuditDetail {
        employee_id: truncate(non_blank(&result.employee_id), CODE_WIDTH),
        employee_name: truncate(
            origin
                .and_then(|mapped| mapped.record.employee_name.as_deref())
                .unwrap_or(UNKNOWN),
            NAME_WIDTH,
        ),
        pay_element_id: truncate(non_blank(&result.unit), CODE_WIDTH),
        component_code: truncate(component_code, CODE_WIDTH),
        success: result.success,
        error_message: result
            .error_message
            .as_deref()
            .map(|message| truncate(message, ERROR_WIDTH)),
        input_type,
        input_value,
    }
}

fn non_blank(value: &str) -> &str {
    if value.trim().is_empty() {
        UNKNOWN
    } else {
        value
    }
}
