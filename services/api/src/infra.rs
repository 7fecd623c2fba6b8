use chrono::{Datelike, Local};
use metrics_exporter_prometheus::PrometheusHandle;
use payroll_sync::workflows::mapping::{
    LegalEntity, MappingEntry, MappingStore, MappingStoreError,
};
use payroll_sync::workflows::submission::{
    AccessToken, AuditError, AuditRun, AuditSink, BankDetail, Company, EmployeeRecord,
    EmploymentStatus, PayRateRecord, PayrollApi, PayrollError, PayrollRun, PayslipEntry,
    PositionRecord,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn sandbox_entity() -> LegalEntity {
    LegalEntity {
        id: 1,
        company_code: "SANDBOX".to_string(),
        company_name: "Sandbox Company".to_string(),
        logical_id_prefix: "SANDBOX".to_string(),
        active: true,
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryMappingStore {
    entries: Arc<Mutex<BTreeMap<i64, MappingEntry>>>,
    entities: Arc<Mutex<Vec<LegalEntity>>>,
}

impl InMemoryMappingStore {
    pub(crate) fn with_entities(entities: Vec<LegalEntity>) -> Self {
        let store = Self::default();
        *store.entities.lock().expect("entity mutex poisoned") = entities;
        store
    }
}

impl MappingStore for InMemoryMappingStore {
    fn list_mappings(&self, legal_entity_id: i64) -> Result<Vec<MappingEntry>, MappingStoreError> {
        let guard = self.entries.lock().expect("mapping mutex poisoned");
        Ok(guard
            .values()
            .filter(|entry| entry.legal_entity_id == legal_entity_id && entry.active)
            .cloned()
            .collect())
    }

    fn fetch(&self, id: i64) -> Result<Option<MappingEntry>, MappingStoreError> {
        let guard = self.entries.lock().expect("mapping mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    fn create(&self, mut entry: MappingEntry) -> Result<MappingEntry, MappingStoreError> {
        let mut guard = self.entries.lock().expect("mapping mutex poisoned");
        entry.id = guard.keys().next_back().copied().unwrap_or(0) + 1;
        guard.insert(entry.id, entry.clone());
        Ok(entry)
    }

    fn update(&self, entry: MappingEntry) -> Result<(), MappingStoreError> {
        let mut guard = self.entries.lock().expect("mapping mutex poisoned");
        if guard.contains_key(&entry.id) {
            guard.insert(entry.id, entry);
            Ok(())
        } else {
            Err(MappingStoreError::NotFound)
        }
    }

    fn delete(&self, id: i64) -> Result<(), MappingStoreError> {
        let mut guard = self.entries.lock().expect("mapping mutex poisoned");
        guard
            .remove(&id)
            .map(|_| ())
            .ok_or(MappingStoreError::NotFound)
    }

    fn legal_entity(&self, id: i64) -> Result<Option<LegalEntity>, MappingStoreError> {
        let guard = self.entities.lock().expect("entity mutex poisoned");
        Ok(guard.iter().find(|entity| entity.id == id).cloned())
    }

    fn legal_entity_by_prefix(
        &self,
        prefix: &str,
    ) -> Result<Option<LegalEntity>, MappingStoreError> {
        let guard = self.entities.lock().expect("entity mutex poisoned");
        Ok(guard
            .iter()
            .find(|entity| entity.active && entity.logical_id_prefix.eq_ignore_ascii_case(prefix))
            .cloned())
    }
}

/// Payroll sandbox: accepts every write and keeps the latest copy of each record.
#[derive(Default, Clone)]
pub(crate) struct InMemoryPayrollApi {
    companies: Vec<Company>,
    employees: Arc<Mutex<HashMap<String, EmployeeRecord>>>,
    positions: Arc<Mutex<HashMap<String, PositionRecord>>>,
    banks: Arc<Mutex<HashMap<String, BankDetail>>>,
    rates: Arc<Mutex<HashMap<String, PayRateRecord>>>,
    statuses: Arc<Mutex<HashMap<String, EmploymentStatus>>>,
    payslips: Arc<Mutex<Vec<PayslipEntry>>>,
}

impl InMemoryPayrollApi {
    pub(crate) fn for_entities(entities: &[LegalEntity]) -> Self {
        Self {
            companies: entities
                .iter()
                .map(|entity| Company {
                    company_id: entity.id,
                    company_code: entity.company_code.clone(),
                    company_name: entity.company_name.clone(),
                })
                .collect(),
            ..Self::default()
        }
    }

    #[cfg(test)]
    pub(crate) fn payslips(&self) -> Vec<PayslipEntry> {
        self.payslips.lock().expect("payslip mutex poisoned").clone()
    }

    fn known_company(&self, company_id: i64) -> Result<(), PayrollError> {
        if self.companies.iter().any(|company| company.company_id == company_id) {
            Ok(())
        } else {
            Err(PayrollError::Rejected(vec![format!(
                "company {company_id} is not accessible"
            )]))
        }
    }
}

fn get<T: Clone>(table: &Mutex<HashMap<String, T>>, employee_number: &str) -> Option<T> {
    table
        .lock()
        .expect("payroll mutex poisoned")
        .get(employee_number)
        .cloned()
}

fn put<T: Clone>(table: &Mutex<HashMap<String, T>>, employee_number: &str, record: &T) {
    table
        .lock()
        .expect("payroll mutex poisoned")
        .insert(employee_number.to_string(), record.clone());
}

impl PayrollApi for InMemoryPayrollApi {
    fn authorize(&self) -> Result<AccessToken, PayrollError> {
        Ok(AccessToken::new("sandbox"))
    }

    fn companies(&self, _token: &AccessToken) -> Result<Vec<Company>, PayrollError> {
        Ok(self.companies.clone())
    }

    fn frequencies(&self, _token: &AccessToken, company_id: i64) -> Result<Vec<String>, PayrollError> {
        self.known_company(company_id)?;
        Ok(vec!["Monthly".to_string(), "Weekly".to_string()])
    }

    fn runs(
        &self,
        _token: &AccessToken,
        company_id: i64,
        frequency: &str,
    ) -> Result<Vec<PayrollRun>, PayrollError> {
        self.known_company(company_id)?;
        let today = Local::now().date_naive();
        let period = format!("{:04}{:02}", today.year(), today.month());
        Ok(vec![PayrollRun {
            frequency: frequency.to_string(),
            description: format!("{frequency} run {period}"),
            period,
        }])
    }

    fn employee(
        &self,
        _token: &AccessToken,
        _company: &Company,
        employee_number: &str,
    ) -> Result<Option<EmployeeRecord>, PayrollError> {
        Ok(get(&self.employees, employee_number))
    }

    fn upsert_employee(
        &self,
        _token: &AccessToken,
        _company: &Company,
        record: &EmployeeRecord,
    ) -> Result<(), PayrollError> {
        put(&self.employees, &record.employee_number, record);
        Ok(())
    }

    fn position(
        &self,
        _token: &AccessToken,
        _company: &Company,
        employee_number: &str,
    ) -> Result<Option<PositionRecord>, PayrollError> {
        Ok(get(&self.positions, employee_number))
    }

    fn upsert_position(
        &self,
        _token: &AccessToken,
        _company: &Company,
        record: &PositionRecord,
    ) -> Result<(), PayrollError> {
        put(&self.positions, &record.employee_number, record);
        Ok(())
    }

    fn bank_detail(
        &self,
        _token: &AccessToken,
        _company: &Company,
        employee_number: &str,
    ) -> Result<Option<BankDetail>, PayrollError> {
        Ok(get(&self.banks, employee_number))
    }

    fn upsert_bank_detail(
        &self,
        _token: &AccessToken,
        _company: &Company,
        record: &BankDetail,
    ) -> Result<(), PayrollError> {
        put(&self.banks, &record.employee_number, record);
        Ok(())
    }

    fn pay_rate(
        &self,
        _token: &AccessToken,
        _company: &Company,
        employee_number: &str,
    ) -> Result<Option<PayRateRecord>, PayrollError> {
        Ok(get(&self.rates, employee_number))
    }

    fn upsert_pay_rate(
        &self,
        _token: &AccessToken,
        _company: &Company,
        record: &PayRateRecord,
    ) -> Result<(), PayrollError> {
        put(&self.rates, &record.employee_number, record);
        Ok(())
    }

    fn employment_status(
        &self,
        _token: &AccessToken,
        _company: &Company,
        employee_number: &str,
    ) -> Result<Option<EmploymentStatus>, PayrollError> {
        Ok(get(&self.statuses, employee_number))
    }

    fn upsert_employment_status(
        &self,
        _token: &AccessToken,
        _company: &Company,
        record: &EmploymentStatus,
    ) -> Result<(), PayrollError> {
        put(&self.statuses, &record.employee_number, record);
        Ok(())
    }

    fn submit_payslip_entry(
        &self,
        _token: &AccessToken,
        company: &Company,
        frequency: &str,
        run: &str,
        entry: &PayslipEntry,
    ) -> Result<(), PayrollError> {
        info!(
            company = %company.company_code,
            frequency,
            run,
            employee_number = %entry.employee_number,
            component_code = %entry.component_code,
            "sandbox payslip entry accepted"
        );
        self.payslips
            .lock()
            .expect("payslip mutex poisoned")
            .push(entry.clone());
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryAuditLog {
    runs: Arc<Mutex<Vec<AuditRun>>>,
}

impl AuditSink for InMemoryAuditLog {
    fn record(&self, run: &AuditRun) -> Result<(), AuditError> {
        let mut guard = self.runs.lock().expect("audit mutex poisoned");
        guard.push(run.clone());
        Ok(())
    }
}

impl InMemoryAuditLog {
    #[cfg(test)]
    pub(crate) fn runs(&self) -> Vec<AuditRun> {
        self.runs.lock().expect("audit mutex poisoned").clone()
    }
}
