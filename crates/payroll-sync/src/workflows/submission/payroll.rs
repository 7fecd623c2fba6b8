//! Capability interface of the external payroll system.
//!
//! Calls are synchronous; each adapter enforces its own per-call timeout and
//! never retries.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::workflows::waiting_events::PayElementFields;

/// Bearer credential obtained once per submission run.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(..)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub company_id: i64,
    pub company_code: String,
    pub company_name: String,
}

/// One open payroll period for a frequency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRun {
    pub frequency: String,
    pub period: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub employee_number: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub middle_name: Option<String>,
    pub initials: Option<String>,
    pub preferred_name: Option<String>,
    pub maiden_name: Option<String>,
    pub title: Option<String>,
    pub language: Option<String>,
    pub gender: Option<String>,
    pub nationality: Option<String>,
    pub citizenship: Option<String>,
    pub marital_status: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub home_number: Option<String>,
    pub work_number: Option<String>,
    pub cell_number: Option<String>,
    pub email: Option<String>,
    pub date_created: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub employee_number: String,
    pub effective_date: Option<NaiveDate>,
    pub organization_position: Option<String>,
    pub position_type: Option<String>,
    pub grade: Option<String>,
    pub organization_group: Option<String>,
    pub organization_region: Option<String>,
    pub job: Option<String>,
    pub employment_category: Option<String>,
    pub employment_sub_category: Option<String>,
    pub cost_center: Option<String>,
    pub comments: Option<String>,
    pub approver_type: Option<String>,
    pub reports_to: Option<String>,
    pub reports_to_employee_number: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    Eft,
    Cash,
    Cheque,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BankAccountOwner {
    Own,
    Joint,
    ThirdParty,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankDetail {
    pub employee_number: String,
    pub payment_method: Option<PaymentMethod>,
    pub account_owner: Option<BankAccountOwner>,
    pub account_type: Option<String>,
    pub bank_name: Option<String>,
    pub branch_code: Option<String>,
    pub account_number: Option<String>,
    pub account_holder_name: Option<String>,
    pub comments: Option<String>,
    pub swift_code: Option<String>,
    pub routing_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayRateRecord {
    pub employee_number: String,
    pub effective_date: Option<NaiveDate>,
    pub package: Option<Decimal>,
    pub pay_frequency: Option<String>,
    pub automatic_pay: Option<bool>,
    pub reason: Option<String>,
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmploymentAction {
    New,
    Terminate,
    ReinstateResumingTaxRecord,
    ReinstateWithNewTaxRecord,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmploymentStatus {
    pub employee_number: String,
    pub employment_action: Option<EmploymentAction>,
    pub employment_date: Option<NaiveDate>,
    pub group_join_date: Option<NaiveDate>,
    pub termination_date: Option<NaiveDate>,
    pub termination_reason: Option<String>,
    pub nature_of_person: Option<String>,
    pub identity_type: Option<String>,
    pub id_number: Option<String>,
    pub passport_number: Option<String>,
    pub passport_country: Option<String>,
    pub tax_status: Option<String>,
    pub tax_reference: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputType {
    Amount,
    Days,
    Hours,
    Units,
}

impl InputType {
    /// Day/hour/unit based elements submit their unit count; everything else
    /// submits the monetary amount. Missing values read as zero.
    pub fn derive(fields: &PayElementFields) -> (InputType, Decimal) {
        let unit_type = fields
            .unit_type
            .as_deref()
            .map(|value| value.trim().to_ascii_lowercase());
        let units = fields.number_of_units.unwrap_or(Decimal::ZERO);

        match unit_type.as_deref() {
            Some("days") => (InputType::Days, units),
            Some("hours") => (InputType::Hours, units),
            Some("units") => (InputType::Units, units),
            _ => (
                InputType::Amount,
                fields.amount.unwrap_or(Decimal::ZERO),
            ),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            InputType::Amount => "Amount",
            InputType::Days => "Days",
            InputType::Hours => "Hours",
            InputType::Units => "Units",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayslipEntry {
    pub employee_number: String,
    pub component_code: String,
    pub input_type: InputType,
    pub input_value: Decimal,
    pub payslip_action: String,
    pub comments: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayrollError {
    #[error("authorization failed: {0}")]
    Unauthorized(String),
    #[error("payroll API unreachable: {0}")]
    Transport(String),
    #[error("{}", .0.join("; "))]
    Rejected(Vec<String>),
}

impl PayrollError {
    /// Messages to surface in the run's error list.
    pub fn messages(&self) -> Vec<String> {
        match self {
            PayrollError::Rejected(messages) if !messages.is_empty() => messages.clone(),
            other => vec![other.to_string()],
        }
    }
}

pub trait PayrollApi: Send + Sync {
    fn authorize(&self) -> Result<AccessToken, PayrollError>;
    fn companies(&self, token: &AccessToken) -> Result<Vec<Company>, PayrollError>;
    fn frequencies(&self, token: &AccessToken, company_id: i64)
        -> Result<Vec<String>, PayrollError>;
    fn runs(
        &self,
        token: &AccessToken,
        company_id: i64,
        frequency: &str,
    ) -> Result<Vec<PayrollRun>, PayrollError>;

    fn employee(
        &self,
        token: &AccessToken,
        company: &Company,
        employee_number: &str,
    ) -> Result<Option<EmployeeRecord>, PayrollError>;
    fn upsert_employee(
        &self,
        token: &AccessToken,
        company: &Company,
        record: &EmployeeRecord,
    ) -> Result<(), PayrollError>;

    fn position(
        &self,
        token: &AccessToken,
        company: &Company,
        employee_number: &str,
    ) -> Result<Option<PositionRecord>, PayrollError>;
    fn upsert_position(
        &self,
        token: &AccessToken,
        company: &Company,
        record: &PositionRecord,
    ) -> Result<(), PayrollError>;

    fn bank_detail(
        &self,
        token: &AccessToken,
        company: &Company,
        employee_number: &str,
    ) -> Result<Option<BankDetail>, PayrollError>;
    fn upsert_bank_detail(
        &self,
        token: &AccessToken,
        company: &Company,
        record: &BankDetail,
    ) -> Result<(), PayrollError>;

    fn pay_rate(
        &self,
        token: &AccessToken,
        company: &Company,
        employee_number: &str,
    ) -> Result<Option<PayRateRecord>, PayrollError>;
    fn upsert_pay_rate(
        &self,
        token: &AccessToken,
        company: &Company,
        record: &PayRateRecord,
    ) -> Result<(), PayrollError>;

    fn employment_status(
        &self,
        token: &AccessToken,
        company: &Company,
        employee_number: &str,
    ) -> Result<Option<EmploymentStatus>, PayrollError>;
    fn upsert_employment_status(
        &self,
        token: &AccessToken,
        company: &Company,
        record: &EmploymentStatus,
    ) -> Result<(), PayrollError>;

    fn submit_payslip_entry(
        &self,
        token: &AccessToken,
        company: &Company,
        frequency: &str,
        run: &str,
        entry: &PayslipEntry,
    ) -> Result<(), PayrollError>;
}
