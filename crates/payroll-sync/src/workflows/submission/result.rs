use serde::Serialize;

use super::category::SubmissionCategory;

/// Outcome for one submission unit: a pay element entry or one employee's
/// record in an employee-centric category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitResult {
    pub category: SubmissionCategory,
    pub employee_id: String,
    pub unit: String,
    /// Source record for per-entry units; unset for employee-centric units.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_number: Option<String>,
    pub component_code: Option<String>,
    pub success: bool,
    pub error_message: Option<String>,
}

impl UnitResult {
    pub fn succeeded(
        category: SubmissionCategory,
        employee_id: impl Into<String>,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            category,
            employee_id: employee_id.into(),
            unit: unit.into(),
            record_number: None,
            component_code: None,
            success: true,
            error_message: None,
        }
    }

    pub fn failed(
        category: SubmissionCategory,
        employee_id: impl Into<String>,
        unit: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            employee_id: employee_id.into(),
            unit: unit.into(),
            record_number: None,
            component_code: None,
            success: false,
            error_message: Some(message.into()),
        }
    }

    pub fn with_component(mut self, component_code: Option<&str>) -> Self {
        self.component_code = component_code.map(str::to_string);
        self
    }

    pub fn with_record(mut self, record_number: &str) -> Self {
        self.record_number = Some(record_number.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryOutcome {
    pub category: SubmissionCategory,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub errors: Vec<String>,
    pub results: Vec<UnitResult>,
    pub message: String,
}

impl CategoryOutcome {
    pub fn new(category: SubmissionCategory, total: usize) -> Self {
        Self {
            category,
            total,
            succeeded: 0,
            failed: 0,
            errors: Vec::new(),
            results: Vec::new(),
            message: String::new(),
        }
    }

    pub fn success(&self) -> bool {
        self.failed == 0 && self.succeeded > 0
    }

    pub(crate) fn push(&mut self, result: UnitResult) {
        if result.success {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.results.push(result);
    }

    pub(crate) fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        if !self.errors.contains(&message) {
            self.errors.push(message);
        }
    }

    pub(crate) fn finish(mut self) -> Self {
        if self.message.is_empty() {
            self.message = format!(
                "{}: {} succeeded, {} failed",
                self.category, self.succeeded, self.failed
            );
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub category: SubmissionCategory,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub success: bool,
    pub message: String,
}

/// Aggregate over every processed category of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionSummary {
    pub success: bool,
    pub message: String,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub errors: Vec<String>,
    pub results: Vec<UnitResult>,
    pub categories: Vec<CategorySummary>,
    pub aborted_at: Option<SubmissionCategory>,
    pub unclassified: usize,
}

impl SubmissionSummary {
    pub(crate) fn empty(unclassified: usize) -> Self {
        Self {
            success: false,
            message: String::new(),
            total: 0,
            succeeded: 0,
            failed: 0,
            errors: Vec::new(),
            results: Vec::new(),
            categories: Vec::new(),
            aborted_at: None,
            unclassified,
        }
    }

    /// A run that failed before any category was processed.
    pub(crate) fn rejected(total: usize, unclassified: usize, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            total,
            failed: total,
            errors: vec![message.clone()],
            message,
            ..Self::empty(unclassified)
        }
    }

    pub(crate) fn merge(&mut self, outcome: CategoryOutcome) {
        self.total += outcome.total;
        self.succeeded += outcome.succeeded;
        self.failed += outcome.failed;
        let success = outcome.success();
        for error in outcome.errors {
            if !self.errors.contains(&error) {
                self.errors.push(error);
            }
        }
        self.categories.push(CategorySummary {
            category: outcome.category,
            total: outcome.total,
            succeeded: outcome.succeeded,
            failed: outcome.failed,
            success,
            message: outcome.message,
        });
        self.results.extend(outcome.results);
    }

    pub(crate) fn finish(mut self) -> Self {
        self.success = self.failed == 0 && self.succeeded > 0;
        if self.message.is_empty() {
            self.message = if self.categories.is_empty() {
                "No submittable records".to_string()
            } else {
                format!(
                    "Processed {} categories: {} succeeded, {} failed",
                    self.categories.len(),
                    self.succeeded,
                    self.failed
                )
            };
        }
        self
    }
}
