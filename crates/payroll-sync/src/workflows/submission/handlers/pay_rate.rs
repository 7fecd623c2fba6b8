use chrono::NaiveDate;

use super::{set_text, EmployeeHandler, RunContext, SourceAction};
use crate::workflows::mapping::MappedRecord;
use crate::workflows::submission::payroll::{PayRateRecord, PayrollError};
use crate::workflows::waiting_events::{parse_decimal, RecordField};

pub(crate) struct PayRateHandler;

fn parse_indicator(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "true" | "1" => Some(true),
        "n" | "no" | "false" | "0" => Some(false),
        _ => None,
    }
}

impl EmployeeHandler for PayRateHandler {
    type Record = PayRateRecord;

    fn unit(&self) -> &'static str {
        "PayRate"
    }

    fn noun(&self) -> &'static str {
        "pay rate"
    }

    fn fetch(
        &self,
        ctx: &RunContext<'_>,
        employee_id: &str,
    ) -> Result<Option<PayRateRecord>, PayrollError> {
        ctx.api.pay_rate(ctx.token, ctx.company, employee_id)
    }

    fn create(&self, employee_id: &str, today: NaiveDate) -> PayRateRecord {
        PayRateRecord {
            employee_number: employee_id.to_string(),
            effective_date: Some(today),
            ..PayRateRecord::default()
        }
    }

    fn missing(&self, employee_id: &str) -> String {
        format!("Pay rate for employee {employee_id} not found and action is not ADD")
    }

    fn apply(
        &self,
        rate: &mut PayRateRecord,
        entries: &[&MappedRecord],
        _action: &SourceAction,
        _today: NaiveDate,
    ) -> Vec<String> {
        let mut warnings = Vec::new();
        for mapped in entries {
            let record = &mapped.record;
            if let Some(start) = record.start_date {
                rate.effective_date = Some(start);
            }

            if let Some(salary) = record.field(RecordField::BasicSalary) {
                match parse_decimal(salary) {
                    Some(package) => rate.package = Some(package),
                    None => warnings.push(format!("Basic Salary: '{salary}' is not a number")),
                }
            }
            if let Some(indicator) = record.field(RecordField::AutomaticPayIndicator) {
                match parse_indicator(indicator) {
                    Some(flag) => rate.automatic_pay = Some(flag),
                    None => warnings.push(format!(
                        "Automatic Pay Indicator: '{indicator}' is not a yes/no value"
                    )),
                }
            }
            set_text(&mut rate.pay_frequency, record.field(RecordField::PayFrequency));
            set_text(&mut rate.reason, record.field(RecordField::PayRateReason));
            set_text(&mut rate.comments, record.field(RecordField::PayRateComments));
        }
        warnings
    }

    fn upsert(&self, ctx: &RunContext<'_>, rate: &PayRateRecord) -> Result<(), PayrollError> {
        ctx.api.upsert_pay_rate(ctx.token, ctx.company, rate)
    }
}
