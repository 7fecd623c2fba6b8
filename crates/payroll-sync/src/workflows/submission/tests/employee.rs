use super::common::*;
use std::sync::Arc;

use crate::workflows::submission::{EmploymentAction, SubmissionCategory};
use crate::workflows::waiting_events::RecordField;

#[test]
fn hiring_with_add_creates_a_new_employee() {
    let api = Arc::new(MemoryPayrollApi::default());
    let mut hire = with_action(record("3001", "1", "Hiring", "Personal Data"), "add");
    hire.personal.first_name = Some("Katherine".to_string());
    hire.personal.last_name = Some("Johnson".to_string());
    hire.fields.insert(RecordField::MiddleName, "G".to_string());

    let summary = orchestrator(api.clone()).submit(&monthly_target(), vec![mapped(hire)]);

    assert!(summary.success, "{summary:?}");
    let created = api.employee_record("3001").expect("employee created");
    assert_eq!(created.first_name.as_deref(), Some("Katherine"));
    assert_eq!(created.middle_name.as_deref(), Some("G"));
    assert_eq!(created.date_created, Some(today()));
    assert_eq!(summary.results[0].unit, "PersonalData");
}

#[test]
fn missing_employee_fails_only_that_employee() {
    let api = Arc::new(MemoryPayrollApi::with_employees(&["1001", "1003"]));
    let records = ["1001", "1002", "1003"]
        .into_iter()
        .map(|id| {
            let mut change = with_action(record(id, "1", "Data Change", "Personal Data"), "CHANGE");
            change.personal.title = Some("Dr".to_string());
            mapped(change)
        })
        .collect();

    let summary = orchestrator(api.clone()).submit(&monthly_target(), records);

    assert_eq!((summary.total, summary.succeeded, summary.failed), (3, 2, 1));
    assert_eq!(
        summary.results[1].error_message.as_deref(),
        Some("Error processing personal data for employee 1002: Employee 1002 not found and action is not ADD")
    );
    assert_eq!(
        api.calls_starting_with("upsert_"),
        vec!["upsert_employee 1001", "upsert_employee 1003"]
    );
    assert_eq!(summary.aborted_at, Some(SubmissionCategory::PersonalData));
}

#[test]
fn rejected_upsert_reports_each_business_message() {
    let api = Arc::new(MemoryPayrollApi::with_employees(&["1001"]));
    api.reject_employee("1001");
    let mut change = record("1001", "1", "Data Change", "Pay Rate");
    change
        .fields
        .insert(RecordField::BasicSalary, "41000".to_string());

    let summary = orchestrator(api).submit(&monthly_target(), vec![mapped(change)]);

    assert_eq!(summary.failed, 1);
    assert_eq!(
        summary.results[0].error_message.as_deref(),
        Some("Employee 1001 is locked; Period is closed")
    );
    assert_eq!(
        summary.errors,
        vec![
            "Employee 1001 is locked".to_string(),
            "Period is closed".to_string()
        ]
    );
}

#[test]
fn failed_upsert_does_not_block_the_next_employee() {
    let api = Arc::new(MemoryPayrollApi::with_employees(&["1001", "1002"]));
    api.reject_employee("1001");
    let records = ["1001", "1002"]
        .into_iter()
        .map(|id| {
            let mut change = with_action(record(id, "1", "Data Change", "Personal Data"), "CHANGE");
            change.personal.last_name = Some(format!("Surname-{id}"));
            mapped(change)
        })
        .collect();

    let summary = orchestrator(api.clone()).submit(&monthly_target(), records);

    assert_eq!((summary.total, summary.succeeded, summary.failed), (2, 1, 1));
    assert!(!summary.results[0].success);
    assert_eq!(summary.results[0].employee_id, "1001");
    assert!(summary.results[1].success);
    assert_eq!(summary.results[1].employee_id, "1002");

    let updated = api.employee_record("1002").expect("employee 1002 stored");
    assert_eq!(updated.last_name.as_deref(), Some("Surname-1002"));
    let untouched = api.employee_record("1001").expect("employee 1001 seeded");
    assert_eq!(untouched.last_name, None);
}

#[test]
fn missing_bank_detail_names_the_record_type() {
    let api = Arc::new(MemoryPayrollApi::default());
    let mut change = record("1001", "1", "Data Change", "Payment Instruction");
    change
        .fields
        .insert(RecordField::AccountNumber, "123".to_string());

    let summary = orchestrator(api).submit(&monthly_target(), vec![mapped(change)]);

    assert_eq!(
        summary.results[0].error_message.as_deref(),
        Some("Error processing bank details for employee 1001: Bank detail for employee 1001 not found and action is not ADD")
    );
}

#[test]
fn termination_defaults_the_date_to_today() {
    let api = Arc::new(MemoryPayrollApi::with_employees(&["1001"]));
    let mut change = with_action(record("1001", "1", "Termination", "Employment"), "TERMINATE");
    change.termination.reason = Some("Retirement".to_string());

    let summary = orchestrator(api.clone()).submit(&monthly_target(), vec![mapped(change)]);

    assert!(summary.success);
    let status = api.employment_status("1001").expect("status stored");
    assert_eq!(status.employment_action, Some(EmploymentAction::Terminate));
    assert_eq!(status.termination_date, Some(today()));
    assert_eq!(status.termination_reason.as_deref(), Some("Retirement"));
}

#[test]
fn position_changes_produce_one_upsert_per_employee() {
    let api = Arc::new(MemoryPayrollApi::with_employees(&["1001"]));
    let mut deployment = record("1001", "1", "Data Change", "Deployment");
    deployment.fields.insert(RecordField::Job, "Pilot".to_string());
    let mut cost = record("1001", "2", "Data Change", "Cost Assignment");
    cost.position.cost_center = Some("CC-1".to_string());
    let mut approver = record("1001", "3", "Data Change", "Approver");
    approver
        .fields
        .insert(RecordField::ApproverType, "Line".to_string());

    let summary = orchestrator(api.clone()).submit(
        &monthly_target(),
        vec![mapped(deployment), mapped(cost), mapped(approver)],
    );

    assert!(summary.success);
    assert_eq!(summary.total, 1);
    assert_eq!(api.calls_starting_with("upsert_"), vec!["upsert_position 1001"]);
}
