use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use crate::workflows::mapping::MappedRecord;
use crate::workflows::submission::{
    AccessToken, BankDetail, Company, EmployeeRecord, EmploymentStatus, PayRateRecord,
    PayrollApi, PayrollError, PayrollRun, PayslipEntry, PositionRecord, SubmissionOrchestrator,
    SubmissionTarget,
};

pub(crate) use crate::workflows::mapping::tests::common::{pay_element_record, record};

/// Payroll double that keeps records in memory and logs every call in order.
#[derive(Default)]
pub(crate) struct MemoryPayrollApi {
    fail_authorize: bool,
    employees: Mutex<HashMap<String, EmployeeRecord>>,
    positions: Mutex<HashMap<String, PositionRecord>>,
    banks: Mutex<HashMap<String, BankDetail>>,
    rates: Mutex<HashMap<String, PayRateRecord>>,
    statuses: Mutex<HashMap<String, EmploymentStatus>>,
    rejected_employees: Mutex<HashSet<String>>,
    rejected_components: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
    submitted: Mutex<Vec<PayslipEntry>>,
}

impl MemoryPayrollApi {
    /// Every employee id given already exists for every record type.
    pub(crate) fn with_employees(ids: &[&str]) -> Self {
        let api = Self::default();
        for id in ids {
            let id = id.to_string();
            api.employees.lock().expect("employees mutex poisoned").insert(
                id.clone(),
                EmployeeRecord {
                    employee_number: id.clone(),
                    ..EmployeeRecord::default()
                },
            );
            api.positions.lock().expect("positions mutex poisoned").insert(
                id.clone(),
                PositionRecord {
                    employee_number: id.clone(),
                    ..PositionRecord::default()
                },
            );
            api.banks.lock().expect("banks mutex poisoned").insert(
                id.clone(),
                BankDetail {
                    employee_number: id.clone(),
                    ..BankDetail::default()
                },
            );
            api.rates.lock().expect("rates mutex poisoned").insert(
                id.clone(),
                PayRateRecord {
                    employee_number: id.clone(),
                    ..PayRateRecord::default()
                },
            );
            api.statuses.lock().expect("statuses mutex poisoned").insert(
                id.clone(),
                EmploymentStatus {
                    employee_number: id,
                    ..EmploymentStatus::default()
                },
            );
        }
        api
    }

    pub(crate) fn unauthorized() -> Self {
        Self {
            fail_authorize: true,
            ..Self::default()
        }
    }

    /// Upserts for this employee are rejected with two business messages.
    pub(crate) fn reject_employee(&self, id: &str) {
        self.rejected_employees
            .lock()
            .expect("rejections mutex poisoned")
            .insert(id.to_string());
    }

    pub(crate) fn reject_component(&self, code: &str) {
        self.rejected_components
            .lock()
            .expect("rejections mutex poisoned")
            .insert(code.to_string());
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }

    /// Calls with the given prefix, e.g. `upsert_`.
    pub(crate) fn calls_starting_with(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| call.starts_with(prefix))
            .collect()
    }

    pub(crate) fn submitted(&self) -> Vec<PayslipEntry> {
        self.submitted.lock().expect("submitted mutex poisoned").clone()
    }

    pub(crate) fn employee_record(&self, id: &str) -> Option<EmployeeRecord> {
        self.employees
            .lock()
            .expect("employees mutex poisoned")
            .get(id)
            .cloned()
    }

    pub(crate) fn employment_status(&self, id: &str) -> Option<EmploymentStatus> {
        self.statuses
            .lock()
            .expect("statuses mutex poisoned")
            .get(id)
            .cloned()
    }

    fn log(&self, call: String) {
        self.calls.lock().expect("calls mutex poisoned").push(call);
    }

    fn check_rejection(&self, employee_number: &str) -> Result<(), PayrollError> {
        let rejected = self
            .rejected_employees
            .lock()
            .expect("rejections mutex poisoned")
            .contains(employee_number);
        if rejected {
            Err(PayrollError::Rejected(vec![
                format!("Employee {employee_number} is locked"),
                "Period is closed".to_string(),
            ]))
        } else {
            Ok(())
        }
    }

    fn store<T: Clone>(
        &self,
        table: &Mutex<HashMap<String, T>>,
        call: &str,
        employee_number: &str,
        record: &T,
    ) -> Result<(), PayrollError> {
        self.log(format!("{call} {employee_number}"));
        self.check_rejection(employee_number)?;
        table
            .lock()
            .expect("records mutex poisoned")
            .insert(employee_number.to_string(), record.clone());
        Ok(())
    }

    fn load<T: Clone>(
        &self,
        table: &Mutex<HashMap<String, T>>,
        call: &str,
        employee_number: &str,
    ) -> Result<Option<T>, PayrollError> {
        self.log(format!("{call} {employee_number}"));
        Ok(table
            .lock()
            .expect("records mutex poisoned")
            .get(employee_number)
            .cloned())
    }
}

pub(crate) fn acme_company() -> Company {
    Company {
        company_id: 7,
        company_code: "ACME".to_string(),
        company_name: "Acme Holdings".to_string(),
    }
}

impl PayrollApi for MemoryPayrollApi {
    fn authorize(&self) -> Result<AccessToken, PayrollError> {
        self.log("authorize".to_string());
        if self.fail_authorize {
            return Err(PayrollError::Unauthorized("invalid client secret".to_string()));
        }
        Ok(AccessToken::new("test-token"))
    }

    fn companies(&self, _token: &AccessToken) -> Result<Vec<Company>, PayrollError> {
        self.log("companies".to_string());
        Ok(vec![acme_company()])
    }

    fn frequencies(&self, _token: &AccessToken, _company_id: i64) -> Result<Vec<String>, PayrollError> {
        Ok(vec!["Monthly".to_string()])
    }

    fn runs(
        &self,
        _token: &AccessToken,
        _company_id: i64,
        frequency: &str,
    ) -> Result<Vec<PayrollRun>, PayrollError> {
        Ok(vec![PayrollRun {
            frequency: frequency.to_string(),
            period: "202501".to_string(),
            description: "January 2025".to_string(),
        }])
    }

    fn employee(
        &self,
        _token: &AccessToken,
        _company: &Company,
        employee_number: &str,
    ) -> Result<Option<EmployeeRecord>, PayrollError> {
        self.load(&self.employees, "get_employee", employee_number)
    }

    fn upsert_employee(
        &self,
        _token: &AccessToken,
        _company: &Company,
        record: &EmployeeRecord,
    ) -> Result<(), PayrollError> {
        self.store(&self.employees, "upsert_employee", &record.employee_number, record)
    }

    fn position(
        &self,
        _token: &AccessToken,
        _company: &Company,
        employee_number: &str,
    ) -> Result<Option<PositionRecord>, PayrollError> {
        self.load(&self.positions, "get_position", employee_number)
    }

    fn upsert_position(
        &self,
        _token: &AccessToken,
        _company: &Company,
        record: &PositionRecord,
    ) -> Result<(), PayrollError> {
        self.store(&self.positions, "upsert_position", &record.employee_number, record)
    }

    fn bank_detail(
        &self,
        _token: &AccessToken,
        _company: &Company,
        employee_number: &str,
    ) -> Result<Option<BankDetail>, PayrollError> {
        self.load(&self.banks, "get_bank_detail", employee_number)
    }

    fn upsert_bank_detail(
        &self,
        _token: &AccessToken,
        _company: &Company,
        record: &BankDetail,
    ) -> Result<(), PayrollError> {
        self.store(&self.banks, "upsert_bank_detail", &record.employee_number, record)
    }

    fn pay_rate(
        &self,
        _token: &AccessToken,
        _company: &Company,
        employee_number: &str,
    ) -> Result<Option<PayRateRecord>, PayrollError> {
        self.load(&self.rates, "get_pay_rate", employee_number)
    }

    fn upsert_pay_rate(
        &self,
        _token: &AccessToken,
        _company: &Company,
        record: &PayRateRecord,
    ) -> Result<(), PayrollError> {
        self.store(&self.rates, "upsert_pay_rate", &record.employee_number, record)
    }

    fn employment_status(
        &self,
        _token: &AccessToken,
        _company: &Company,
        employee_number: &str,
    ) -> Result<Option<EmploymentStatus>, PayrollError> {
        self.load(&self.statuses, "get_employment_status", employee_number)
    }

    fn upsert_employment_status(
        &self,
        _token: &AccessToken,
        _company: &Company,
        record: &EmploymentStatus,
    ) -> Result<(), PayrollError> {
        self.store(
            &self.statuses,
            "upsert_employment_status",
            &record.employee_number,
            record,
        )
    }

    fn submit_payslip_entry(
        &self,
        _token: &AccessToken,
        _company: &Company,
        _frequency: &str,
        _run: &str,
        entry: &PayslipEntry,
    ) -> Result<(), PayrollError> {
        self.log(format!(
            "submit_payslip {} {}",
            entry.employee_number, entry.component_code
        ));
        let rejected = self
            .rejected_components
            .lock()
            .expect("rejections mutex poisoned")
            .contains(&entry.component_code);
        if rejected {
            return Err(PayrollError::Rejected(vec![format!(
                "component {} is not open for input",
                entry.component_code
            )]));
        }
        self.submitted
            .lock()
            .expect("submitted mutex poisoned")
            .push(entry.clone());
        Ok(())
    }
}

pub(crate) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 15).expect("valid date")
}

pub(crate) fn orchestrator(api: Arc<MemoryPayrollApi>) -> SubmissionOrchestrator<MemoryPayrollApi> {
    SubmissionOrchestrator::new(api).with_today(today())
}

pub(crate) fn monthly_target() -> SubmissionTarget {
    SubmissionTarget {
        company_id: 7,
        frequency: "Monthly".to_string(),
        run: "202501".to_string(),
    }
}

pub(crate) fn mapped(record: crate::workflows::waiting_events::ChangeRecord) -> MappedRecord {
    MappedRecord::unmapped(record)
}

pub(crate) fn with_action(
    mut change: crate::workflows::waiting_events::ChangeRecord,
    action: &str,
) -> crate::workflows::waiting_events::ChangeRecord {
    change.action = Some(action.to_string());
    change
}
