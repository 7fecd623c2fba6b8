use chrono::NaiveDate;

use super::{set_text, EmployeeHandler, RunContext, SourceAction};
use crate::workflows::mapping::MappedRecord;
use crate::workflows::submission::payroll::{EmployeeRecord, PayrollError};
use crate::workflows::waiting_events::RecordField;

/// Hiring and personal data changes both land on the employee master record.
pub(crate) struct EmployeeDataHandler;

impl EmployeeHandler for EmployeeDataHandler {
    type Record = EmployeeRecord;

    fn unit(&self) -> &'static str {
        "PersonalData"
    }

    fn noun(&self) -> &'static str {
        "personal data"
    }

    fn fetch(
        &self,
        ctx: &RunContext<'_>,
        employee_id: &str,
    ) -> Result<Option<EmployeeRecord>, PayrollError> {
        ctx.api.employee(ctx.token, ctx.company, employee_id)
    }

    fn create(&self, employee_id: &str, today: NaiveDate) -> EmployeeRecord {
        EmployeeRecord {
            employee_number: employee_id.to_string(),
            date_created: Some(today),
            ..EmployeeRecord::default()
        }
    }

    fn missing(&self, employee_id: &str) -> String {
        format!("Employee {employee_id} not found and action is not ADD")
    }

    fn apply(
        &self,
        employee: &mut EmployeeRecord,
        entries: &[&MappedRecord],
        _action: &SourceAction,
        _today: NaiveDate,
    ) -> Vec<String> {
        for mapped in entries {
            let record = &mapped.record;
            let personal = &record.personal;

            set_text(&mut employee.first_name, personal.first_name.as_deref());
            set_text(&mut employee.last_name, personal.last_name.as_deref());
            set_text(&mut employee.title, personal.title.as_deref());
            set_text(&mut employee.gender, personal.gender.as_deref());
            set_text(&mut employee.language, personal.language.as_deref());
            set_text(&mut employee.citizenship, personal.citizenship.as_deref());
            set_text(&mut employee.email, personal.email.as_deref());
            if let Some(birth_date) = personal.birth_date {
                employee.birth_date = Some(birth_date);
            }

            set_text(&mut employee.middle_name, record.field(RecordField::MiddleName));
            set_text(&mut employee.preferred_name, record.field(RecordField::PreferredName));
            set_text(&mut employee.initials, record.field(RecordField::Initials));
            set_text(&mut employee.maiden_name, record.field(RecordField::MaidenName));
            set_text(&mut employee.marital_status, record.field(RecordField::MaritalStatus));
            set_text(&mut employee.nationality, record.field(RecordField::Nationality));
            set_text(&mut employee.home_number, record.field(RecordField::HomeNumber));
            set_text(&mut employee.work_number, record.field(RecordField::WorkNumber));
            set_text(&mut employee.cell_number, record.field(RecordField::CellNumber));
        }
        Vec::new()
    }

    fn upsert(&self, ctx: &RunContext<'_>, employee: &EmployeeRecord) -> Result<(), PayrollError> {
        ctx.api.upsert_employee(ctx.token, ctx.company, employee)
    }
}
