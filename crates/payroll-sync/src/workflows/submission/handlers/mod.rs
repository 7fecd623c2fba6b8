//! Per-category submission handlers.
//!
//! Employee-centric categories share [`run_per_employee`]: records are grouped by
//! employee in first-seen order and each group becomes one fetch, apply, upsert
//! cycle whose failure never affects its siblings.

mod banking;
mod employee;
mod employment;
mod pay_element;
mod pay_rate;
mod position;

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::{error, info, warn};

use super::category::SubmissionCategory;
use super::payroll::{AccessToken, Company, PayrollApi, PayrollError};
use super::result::{CategoryOutcome, UnitResult};
use crate::workflows::mapping::MappedRecord;

pub(crate) use banking::BankDetailHandler;
pub(crate) use employee::EmployeeDataHandler;
pub(crate) use employment::EmploymentStatusHandler;
pub(crate) use pay_element::submit_pay_elements;
pub(crate) use pay_rate::PayRateHandler;
pub(crate) use position::PositionHandler;

/// Request-scoped collaborators and parameters shared by every handler of a run.
pub(crate) struct RunContext<'a> {
    pub api: &'a dyn PayrollApi,
    pub token: &'a AccessToken,
    pub company: &'a Company,
    pub frequency: &'a str,
    pub run: &'a str,
    pub today: NaiveDate,
}

/// Action column of the first record in an employee group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SourceAction {
    Add,
    Change,
    Terminate,
    Reinstate { new_tax_record: bool },
    Other(String),
    Missing,
}

impl SourceAction {
    pub(crate) fn parse(value: Option<&str>) -> Self {
        let Some(value) = value.map(str::trim).filter(|value| !value.is_empty()) else {
            return SourceAction::Missing;
        };
        let upper = value.to_ascii_uppercase();
        match upper.as_str() {
            "ADD" => SourceAction::Add,
            "CHANGE" => SourceAction::Change,
            "TERMINATE" => SourceAction::Terminate,
            other if other.contains("REINSTATE") => SourceAction::Reinstate {
                new_tax_record: other.contains("NEWTAX"),
            },
            _ => SourceAction::Other(value.to_string()),
        }
    }

    pub(crate) fn is_add(&self) -> bool {
        matches!(self, SourceAction::Add)
    }
}

/// One employee-centric category: how to load, create, fill, and store its
/// backing payroll record.
pub(crate) trait EmployeeHandler {
    type Record;

    /// Unit name reported in results, e.g. `PersonalData`.
    fn unit(&self) -> &'static str;

    /// Lower-case noun used in failure messages.
    fn noun(&self) -> &'static str;

    fn fetch(
        &self,
        ctx: &RunContext<'_>,
        employee_id: &str,
    ) -> Result<Option<Self::Record>, PayrollError>;

    fn create(&self, employee_id: &str, today: NaiveDate) -> Self::Record;

    fn missing(&self, employee_id: &str) -> String;

    /// Copies the group's values onto the record, returning non-fatal warnings.
    fn apply(
        &self,
        record: &mut Self::Record,
        entries: &[&MappedRecord],
        action: &SourceAction,
        today: NaiveDate,
    ) -> Vec<String>;

    fn upsert(&self, ctx: &RunContext<'_>, record: &Self::Record) -> Result<(), PayrollError>;
}

/// Groups records by employee id, keeping first-seen order of employees and of
/// each employee's records.
pub(crate) fn group_by_employee(records: &[MappedRecord]) -> Vec<(&str, Vec<&MappedRecord>)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<&MappedRecord>)> = Vec::new();
    for mapped in records {
        let employee_id = mapped.employee_id();
        match index.get(employee_id) {
            Some(position) => groups[*position].1.push(mapped),
            None => {
                index.insert(employee_id, groups.len());
                groups.push((employee_id, vec![mapped]));
            }
        }
    }
    groups
}

enum EmployeeFailure {
    Missing(String),
    Api(PayrollError),
}

pub(crate) fn run_per_employee<H: EmployeeHandler>(
    handler: &H,
    category: SubmissionCategory,
    ctx: &RunContext<'_>,
    records: &[MappedRecord],
) -> CategoryOutcome {
    let groups = group_by_employee(records);
    info!(
        category = %category,
        employees = groups.len(),
        "processing employee-centric category"
    );

    let mut outcome = CategoryOutcome::new(category, groups.len());
    for (employee_id, entries) in groups {
        match process_employee(handler, ctx, employee_id, &entries) {
            Ok(()) => outcome.push(UnitResult::succeeded(category, employee_id, handler.unit())),
            Err(EmployeeFailure::Api(PayrollError::Rejected(messages))) if !messages.is_empty() => {
                let message = messages.join("; ");
                warn!(
                    category = %category,
                    employee_id,
                    error = %message,
                    "payroll system rejected update"
                );
                for message in messages {
                    outcome.error(message);
                }
                outcome.push(UnitResult::failed(category, employee_id, handler.unit(), message));
            }
            Err(failure) => {
                let reason = match failure {
                    EmployeeFailure::Missing(message) => message,
                    EmployeeFailure::Api(error) => error.to_string(),
                };
                let message = format!(
                    "Error processing {} for employee {employee_id}: {reason}",
                    handler.noun()
                );
                error!(category = %category, employee_id, error = %message, "employee update failed");
                outcome.error(message.clone());
                outcome.push(UnitResult::failed(category, employee_id, handler.unit(), message));
            }
        }
    }

    outcome.finish()
}

fn process_employee<H: EmployeeHandler>(
    handler: &H,
    ctx: &RunContext<'_>,
    employee_id: &str,
    entries: &[&MappedRecord],
) -> Result<(), EmployeeFailure> {
    let action = SourceAction::parse(entries.first().and_then(|mapped| mapped.record.action.as_deref()));

    let mut record = match handler.fetch(ctx, employee_id).map_err(EmployeeFailure::Api)? {
        Some(record) => record,
        None if action.is_add() => handler.create(employee_id, ctx.today),
        None => return Err(EmployeeFailure::Missing(handler.missing(employee_id))),
    };

    for warning in handler.apply(&mut record, entries, &action, ctx.today) {
        warn!(employee_id, unit = handler.unit(), warning = %warning, "field not applied");
    }

    handler.upsert(ctx, &record).map_err(EmployeeFailure::Api)
}

/// Sets `slot` when `value` is present and non-blank.
pub(crate) fn set_text(slot: &mut Option<String>, value: Option<&str>) {
    if let Some(value) = value.map(str::trim).filter(|value| !value.is_empty()) {
        *slot = Some(value.to_string());
    }
}

pub(crate) fn set_date(
    slot: &mut Option<NaiveDate>,
    value: Option<&str>,
    label: &str,
    warnings: &mut Vec<String>,
) {
    let Some(value) = value.map(str::trim).filter(|value| !value.is_empty()) else {
        return;
    };
    match crate::workflows::waiting_events::parse_date(value) {
        Some(date) => *slot = Some(date),
        None => warnings.push(format!("{label}: '{value}' is not a valid date")),
    }
}
