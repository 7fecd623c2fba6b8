//! Category-ordered payroll submission.
//!
//! Mapped records are classified into buckets, then each bucket runs through its
//! handler in a fixed order. A failed category stops every later one; results
//! already collected are kept.

pub mod audit;
pub mod category;
mod handlers;
pub mod orchestrator;
pub mod payroll;
pub mod result;

#[cfg(test)]
pub(crate) mod tests;

pub use audit::{
    AuditContext, AuditDetail, AuditError, AuditRecorder, AuditRun, AuditSink,
    DEFAULT_DETAIL_LIMIT,
};
pub use category::{classify, SubmissionCategory};
pub use orchestrator::{SubmissionOrchestrator, SubmissionTarget};
pub use payroll::{
    AccessToken, BankAccountOwner, BankDetail, Company, EmployeeRecord, EmploymentAction,
    EmploymentStatus, InputType, PayRateRecord, PaymentMethod, PayrollApi, PayrollError,
    PayrollRun, PayslipEntry, PositionRecord,
};
pub use result::{CategoryOutcome, CategorySummary, SubmissionSummary, UnitResult};
