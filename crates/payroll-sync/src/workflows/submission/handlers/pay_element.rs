use tracing::{error, info, warn};

use super::{group_by_employee, RunContext};
use crate::workflows::mapping::MappedRecord;
use crate::workflows::submission::category::SubmissionCategory;
use crate::workflows::submission::payroll::{InputType, PayslipEntry};
use crate::workflows::submission::result::{CategoryOutcome, UnitResult};

const CATEGORY: SubmissionCategory = SubmissionCategory::PayElement;
const UNKNOWN: &str = "Unknown";

struct Validated<'a> {
    employee_id: &'a str,
    record_number: &'a str,
    pay_element_id: &'a str,
    component_code: &'a str,
    entry: PayslipEntry,
}

fn pay_element_id(mapped: &MappedRecord) -> &str {
    mapped
        .record
        .pay_element_id()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .unwrap_or(UNKNOWN)
}

/// Two-phase, all-or-nothing payslip submission: nothing is sent unless every
/// entry carries a component code.
pub(crate) fn submit_pay_elements(ctx: &RunContext<'_>, records: &[MappedRecord]) -> CategoryOutcome {
    let mut outcome = CategoryOutcome::new(CATEGORY, records.len());

    let parameter_error = if ctx.frequency.trim().is_empty() {
        Some("Frequency cannot be empty")
    } else if ctx.run.trim().is_empty() {
        Some("Run cannot be empty")
    } else {
        None
    };
    if let Some(message) = parameter_error {
        warn!(entries = records.len(), error = message, "pay element submission rejected");
        for mapped in records {
            outcome.push(
                UnitResult::failed(CATEGORY, mapped.employee_id(), pay_element_id(mapped), message)
                    .with_component(mapped.component_code())
                    .with_record(mapped.record.record_number()),
            );
        }
        outcome.error(message);
        outcome.message = "Invalid parameters".to_string();
        return outcome;
    }

    let mut validated = Vec::new();
    let mut invalid = Vec::new();
    for (employee_id, entries) in group_by_employee(records) {
        for mapped in entries {
            let pay_element_id = pay_element_id(mapped);
            match mapped.component_code() {
                Some(component_code) => {
                    let (input_type, input_value) = InputType::derive(&mapped.record.pay_element);
                    validated.push(Validated {
                        employee_id,
                        record_number: mapped.record.record_number(),
                        pay_element_id,
                        component_code,
                        entry: PayslipEntry {
                            employee_number: employee_id.to_string(),
                            component_code: component_code.to_string(),
                            input_type,
                            input_value,
                            payslip_action: "Add".to_string(),
                            comments: format!("Added by API for {pay_element_id}"),
                        },
                    });
                }
                None => invalid.push((employee_id, mapped.record.record_number(), pay_element_id)),
            }
        }
    }

    if !invalid.is_empty() {
        warn!(
            errors = invalid.len(),
            "pay element validation failed; nothing submitted"
        );
        for (employee_id, record_number, pay_element_id) in &invalid {
            let reason = "No component code mapped for pay element";
            outcome.error(format!(
                "Validation error for employee {employee_id}, pay element {pay_element_id}: {reason}"
            ));
            outcome.push(
                UnitResult::failed(CATEGORY, *employee_id, *pay_element_id, reason)
                    .with_record(record_number),
            );
        }
        // Valid entries were held back too, so the whole batch counts as failed.
        outcome.failed = records.len();
        outcome.message = format!(
            "Validation failed with {} errors. No entries were submitted.",
            invalid.len()
        );
        return outcome;
    }

    info!(entries = validated.len(), "all pay elements validated; submitting");
    for item in validated {
        match ctx
            .api
            .submit_payslip_entry(ctx.token, ctx.company, ctx.frequency, ctx.run, &item.entry)
        {
            Ok(()) => outcome.push(
                UnitResult::succeeded(CATEGORY, item.employee_id, item.pay_element_id)
                    .with_component(Some(item.component_code))
                    .with_record(item.record_number),
            ),
            Err(err) => {
                let message = format!("API error ({err})");
                error!(
                    employee_id = item.employee_id,
                    pay_element_id = item.pay_element_id,
                    error = %message,
                    "payslip entry rejected"
                );
                outcome.error(message.clone());
                outcome.push(
                    UnitResult::failed(CATEGORY, item.employee_id, item.pay_element_id, message)
                        .with_component(Some(item.component_code))
                        .with_record(item.record_number),
                );
            }
        }
    }

    outcome.message = if outcome.success() {
        format!("Successfully processed all {} entries", outcome.succeeded)
    } else {
        format!(
            "Processed with {} failures and {} successes",
            outcome.failed, outcome.succeeded
        )
    };
    outcome
}
