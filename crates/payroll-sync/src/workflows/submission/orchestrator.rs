use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde::Deserialize;
use tracing::{error, info, warn};

use super::category::{Classified, SubmissionCategory};
use super::handlers::{
    run_per_employee, submit_pay_elements, BankDetailHandler, EmployeeDataHandler,
    EmploymentStatusHandler, PayRateHandler, PositionHandler, RunContext,
};
use super::payroll::PayrollApi;
use super::result::{CategoryOutcome, SubmissionSummary};
use crate::workflows::mapping::MappedRecord;

/// Target of one submission run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubmissionTarget {
    pub company_id: i64,
    pub frequency: String,
    pub run: String,
}

/// Drives every classified bucket through its handler in fixed category order.
pub struct SubmissionOrchestrator<P> {
    api: Arc<P>,
    today: Option<NaiveDate>,
}

impl<P> SubmissionOrchestrator<P>
where
    P: PayrollApi + 'static,
{
    pub fn new(api: Arc<P>) -> Self {
        Self { api, today: None }
    }

    /// Pins the date used for defaulted effective and termination dates.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn api(&self) -> &Arc<P> {
        &self.api
    }

    pub fn submit(&self, target: &SubmissionTarget, records: Vec<MappedRecord>) -> SubmissionSummary {
        let total_records = records.len();
        let classified = Classified::from_records(records);
        let unclassified = classified.unclassified.len();
        for mapped in &classified.unclassified {
            warn!(
                record = %mapped.record.key(),
                event = mapped.record.event.as_deref().unwrap_or_default(),
                category = mapped.record.category.as_deref().unwrap_or_default(),
                "record has no submission category; skipped"
            );
        }

        let buckets = classified.in_order();
        if buckets.is_empty() {
            info!(unclassified, "no submittable records");
            return SubmissionSummary::empty(unclassified).finish();
        }
        let submittable = total_records - unclassified;

        let token = match self.api.authorize() {
            Ok(token) => token,
            Err(err) => {
                error!(error = %err, "payroll authorization failed");
                return SubmissionSummary::rejected(submittable, unclassified, err.to_string());
            }
        };

        let company = match self.api.companies(&token) {
            Ok(companies) => companies
                .into_iter()
                .find(|company| company.company_id == target.company_id),
            Err(err) => {
                error!(error = %err, "company enumeration failed");
                return SubmissionSummary::rejected(submittable, unclassified, err.to_string());
            }
        };
        let Some(company) = company else {
            let message = format!("Company {} not found in payroll system", target.company_id);
            error!(company_id = target.company_id, "{message}");
            return SubmissionSummary::rejected(submittable, unclassified, message);
        };

        let ctx = RunContext {
            api: self.api.as_ref(),
            token: &token,
            company: &company,
            frequency: &target.frequency,
            run: &target.run,
            today: self.today.unwrap_or_else(|| Local::now().date_naive()),
        };

        info!(
            company = %company.company_code,
            frequency = %target.frequency,
            run = %target.run,
            categories = buckets.len(),
            "submitting categories"
        );

        let mut summary = SubmissionSummary::empty(unclassified);
        for (category, records) in buckets {
            let outcome = process_category(&ctx, category, &records);
            let failed = !outcome.success();
            info!(
                category = %category,
                succeeded = outcome.succeeded,
                failed = outcome.failed,
                "category processed"
            );
            summary.merge(outcome);

            if failed {
                let message = format!("Failed to process {category}, aborting all other categories");
                error!(category = %category, "{message}");
                summary.aborted_at = Some(category);
                summary.message = message;
                break;
            }
        }

        summary.finish()
    }
}

fn process_category(
    ctx: &RunContext<'_>,
    category: SubmissionCategory,
    records: &[MappedRecord],
) -> CategoryOutcome {
    match category {
        SubmissionCategory::Hiring | SubmissionCategory::PersonalData => {
            run_per_employee(&EmployeeDataHandler, category, ctx, records)
        }
        SubmissionCategory::PayElement => submit_pay_elements(ctx, records),
        SubmissionCategory::PositionData => run_per_employee(&PositionHandler, category, ctx, records),
        SubmissionCategory::PayRate => run_per_employee(&PayRateHandler, category, ctx, records),
        SubmissionCategory::PaymentInstruction => {
            run_per_employee(&BankDetailHandler, category, ctx, records)
        }
        SubmissionCategory::Employment => {
            run_per_employee(&EmploymentStatusHandler, category, ctx, records)
        }
    }
}
