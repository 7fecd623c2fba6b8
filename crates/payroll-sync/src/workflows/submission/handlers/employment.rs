use chrono::NaiveDate;

use super::{set_date, set_text, EmployeeHandler, RunContext, SourceAction};
use crate::workflows::mapping::MappedRecord;
use crate::workflows::submission::payroll::{EmploymentAction, EmploymentStatus, PayrollError};
use crate::workflows::waiting_events::RecordField;

pub(crate) struct EmploymentStatusHandler;

impl EmploymentStatusHandler {
    fn action(action: &SourceAction) -> Option<EmploymentAction> {
        match action {
            SourceAction::Add | SourceAction::Change => Some(EmploymentAction::New),
            SourceAction::Terminate => Some(EmploymentAction::Terminate),
            SourceAction::Reinstate { new_tax_record: true } => {
                Some(EmploymentAction::ReinstateWithNewTaxRecord)
            }
            SourceAction::Reinstate { new_tax_record: false } => {
                Some(EmploymentAction::ReinstateResumingTaxRecord)
            }
            SourceAction::Other(_) | SourceAction::Missing => None,
        }
    }
}

impl EmployeeHandler for EmploymentStatusHandler {
    type Record = EmploymentStatus;

    fn unit(&self) -> &'static str {
        "Employment"
    }

    fn noun(&self) -> &'static str {
        "employment status"
    }

    fn fetch(
        &self,
        ctx: &RunContext<'_>,
        employee_id: &str,
    ) -> Result<Option<EmploymentStatus>, PayrollError> {
        ctx.api.employment_status(ctx.token, ctx.company, employee_id)
    }

    fn create(&self, employee_id: &str, today: NaiveDate) -> EmploymentStatus {
        EmploymentStatus {
            employee_number: employee_id.to_string(),
            employment_date: Some(today),
            ..EmploymentStatus::default()
        }
    }

    fn missing(&self, employee_id: &str) -> String {
        format!("Employment status for employee {employee_id} not found and action is not ADD")
    }

    fn apply(
        &self,
        status: &mut EmploymentStatus,
        entries: &[&MappedRecord],
        action: &SourceAction,
        today: NaiveDate,
    ) -> Vec<String> {
        let mut warnings = Vec::new();
        match Self::action(action) {
            Some(employment_action) => status.employment_action = Some(employment_action),
            None => warnings.push(format!(
                "action {action:?} does not change the employment action"
            )),
        }

        for mapped in entries {
            let record = &mapped.record;
            if let Some(start) = record.start_date {
                status.employment_date = Some(start);
            }
            if let Some(date) = record.termination.date {
                status.termination_date = Some(date);
            }
            set_text(&mut status.termination_reason, record.termination.reason.as_deref());

            set_date(
                &mut status.group_join_date,
                record.field(RecordField::GroupJoinDate),
                "Group Join Date",
                &mut warnings,
            );
            set_text(&mut status.nature_of_person, record.field(RecordField::NatureOfPerson));
            set_text(&mut status.identity_type, record.field(RecordField::IdentityType));
            set_text(&mut status.id_number, record.field(RecordField::IdNumber));
            set_text(&mut status.passport_number, record.field(RecordField::PassportNumber));
            set_text(&mut status.passport_country, record.field(RecordField::PassportCountry));
            set_text(&mut status.tax_status, record.field(RecordField::TaxStatus));
            set_text(&mut status.tax_reference, record.field(RecordField::TaxReference));
        }

        if matches!(action, SourceAction::Terminate) && status.termination_date.is_none() {
            status.termination_date = Some(today);
        }
        warnings
    }

    fn upsert(&self, ctx: &RunContext<'_>, status: &EmploymentStatus) -> Result<(), PayrollError> {
        ctx.api.upsert_employment_status(ctx.token, ctx.company, status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::mapping::tests::common::record;

    fn apply(action: &str, change: crate::workflows::waiting_events::ChangeRecord) -> EmploymentStatus {
        let entries = [MappedRecord::unmapped(change)];
        let refs: Vec<&MappedRecord> = entries.iter().collect();
        let today = NaiveDate::from_ymd_opt(2025, 6, 30).expect("date");
        let mut status = EmploymentStatusHandler.create("1001", today);
        EmploymentStatusHandler.apply(
            &mut status,
            &refs,
            &SourceAction::parse(Some(action)),
            today,
        );
        status
    }

    #[test]
    fn terminate_without_date_defaults_to_today() {
        let mut change = record("1001", "1", "Termination", "Employment");
        change.termination.reason = Some("Resignation".to_string());
        let status = apply("TERMINATE", change);

        assert_eq!(status.employment_action, Some(EmploymentAction::Terminate));
        assert_eq!(status.termination_date, NaiveDate::from_ymd_opt(2025, 6, 30));
        assert_eq!(status.termination_reason.as_deref(), Some("Resignation"));
    }

    #[test]
    fn explicit_termination_date_wins() {
        let mut change = record("1001", "1", "Termination", "Employment");
        change.termination.date = NaiveDate::from_ymd_opt(2025, 5, 31);
        let status = apply("terminate", change);
        assert_eq!(status.termination_date, NaiveDate::from_ymd_opt(2025, 5, 31));
    }

    #[test]
    fn reinstatement_variants() {
        let change = record("1001", "1", "Termination", "Employment");
        assert_eq!(
            apply("REINSTATE_NEWTAX", change.clone()).employment_action,
            Some(EmploymentAction::ReinstateWithNewTaxRecord)
        );
        assert_eq!(
            apply("Reinstate", change.clone()).employment_action,
            Some(EmploymentAction::ReinstateResumingTaxRecord)
        );
        assert_eq!(
            apply("CHANGE", change).employment_action,
            Some(EmploymentAction::New)
        );
    }
}
