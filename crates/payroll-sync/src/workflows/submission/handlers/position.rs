use chrono::NaiveDate;

use super::{set_date, set_text, EmployeeHandler, RunContext, SourceAction};
use crate::workflows::mapping::MappedRecord;
use crate::workflows::submission::payroll::{PayrollError, PositionRecord};
use crate::workflows::waiting_events::{normalize_label, ChangeRecord, RecordField};

/// Deployment, cost assignment, and approver changes folded into a single
/// position upsert per employee.
pub(crate) struct PositionHandler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PositionForm {
    Deployment,
    CostAssignment,
    Approver,
}

impl PositionForm {
    fn of(record: &ChangeRecord) -> Option<Self> {
        match normalize_label(record.category.as_deref().unwrap_or_default()).as_str() {
            "deployment" => Some(Self::Deployment),
            "cost assignment" => Some(Self::CostAssignment),
            "approver" => Some(Self::Approver),
            _ => None,
        }
    }

    fn apply(self, position: &mut PositionRecord, record: &ChangeRecord, warnings: &mut Vec<String>) {
        match self {
            PositionForm::Deployment => {
                set_text(
                    &mut position.organization_position,
                    record.position.position_title.as_deref(),
                );
                set_text(&mut position.position_type, record.field(RecordField::PositionType));
                set_text(&mut position.grade, record.field(RecordField::Grade));
                set_text(
                    &mut position.organization_group,
                    record.field(RecordField::OrganizationGroup),
                );
                set_text(
                    &mut position.organization_region,
                    record.field(RecordField::OrganizationRegion),
                );
                set_text(&mut position.job, record.field(RecordField::Job));
                set_text(
                    &mut position.employment_category,
                    record.field(RecordField::EmploymentCategory),
                );
                set_text(
                    &mut position.employment_sub_category,
                    record.field(RecordField::EmploymentSubCategory),
                );
                set_text(&mut position.comments, record.field(RecordField::PositionComments));
                set_date(
                    &mut position.effective_date,
                    record.field(RecordField::PositionEffectiveDate),
                    "Position Effective Date",
                    warnings,
                );
            }
            PositionForm::CostAssignment => {
                set_text(&mut position.cost_center, record.position.cost_center.as_deref());
            }
            PositionForm::Approver => {
                set_text(&mut position.approver_type, record.field(RecordField::ApproverType));
                set_text(&mut position.reports_to, record.field(RecordField::ReportsTo));
                set_text(
                    &mut position.reports_to_employee_number,
                    record.field(RecordField::ReportsToEmployeeNumber),
                );
            }
        }
    }
}

impl EmployeeHandler for PositionHandler {
    type Record = PositionRecord;

    fn unit(&self) -> &'static str {
        "PositionData"
    }

    fn noun(&self) -> &'static str {
        "position data"
    }

    fn fetch(
        &self,
        ctx: &RunContext<'_>,
        employee_id: &str,
    ) -> Result<Option<PositionRecord>, PayrollError> {
        ctx.api.position(ctx.token, ctx.company, employee_id)
    }

    fn create(&self, employee_id: &str, today: NaiveDate) -> PositionRecord {
        PositionRecord {
            employee_number: employee_id.to_string(),
            effective_date: Some(today),
            ..PositionRecord::default()
        }
    }

    fn missing(&self, employee_id: &str) -> String {
        format!("Position for employee {employee_id} not found and action is not ADD")
    }

    fn apply(
        &self,
        position: &mut PositionRecord,
        entries: &[&MappedRecord],
        _action: &SourceAction,
        _today: NaiveDate,
    ) -> Vec<String> {
        let mut warnings = Vec::new();
        if let Some(effective) = entries.iter().find_map(|mapped| mapped.record.start_date) {
            position.effective_date = Some(effective);
        }

        for mapped in entries {
            match PositionForm::of(&mapped.record) {
                Some(form) => form.apply(position, &mapped.record, &mut warnings),
                None => warnings.push(format!(
                    "record {} has no position form",
                    mapped.record.key()
                )),
            }
        }
        warnings
    }

    fn upsert(&self, ctx: &RunContext<'_>, position: &PositionRecord) -> Result<(), PayrollError> {
        ctx.api.upsert_position(ctx.token, ctx.company, position)
    }
}
