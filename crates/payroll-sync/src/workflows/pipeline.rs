//! Request-scoped parse → map → submit → audit flow.
//!
//! Every stage hands its output to the next as a value; nothing survives the
//! call except what the audit sink and the payroll system persist.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::workflows::mapping::{MappingError, MappingResolver, MappingStore};
use crate::workflows::submission::{
    AuditContext, AuditRecorder, AuditSink, PayrollApi, SubmissionOrchestrator, SubmissionSummary,
    SubmissionTarget,
};
use crate::workflows::waiting_events::{
    ImportError, ParseSummary, ParsedEvents, WaitingEventsImporter,
};

#[derive(Debug, Clone, Deserialize)]
pub struct SyncRequest {
    pub legal_entity_id: i64,
    pub frequency: String,
    pub run: String,
    #[serde(default)]
    pub file_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub parse: ParseSummary,
    pub warnings: usize,
    pub submission: SubmissionSummary,
    pub audited: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    Mapping(#[from] MappingError),
}

pub struct SyncPipeline<S, P, A> {
    store: Arc<S>,
    resolver: MappingResolver<S>,
    orchestrator: SubmissionOrchestrator<P>,
    audit: AuditRecorder<A>,
}

impl<S, P, A> SyncPipeline<S, P, A>
where
    S: MappingStore + 'static,
    P: PayrollApi + 'static,
    A: AuditSink + 'static,
{
    pub fn new(store: Arc<S>, api: Arc<P>, audit: Arc<A>, detail_limit: usize) -> Self {
        Self {
            resolver: MappingResolver::new(store.clone()),
            store,
            orchestrator: SubmissionOrchestrator::new(api),
            audit: AuditRecorder::new(audit, detail_limit),
        }
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.orchestrator = self.orchestrator.with_today(today);
        self
    }

    /// Parses an uploaded CSV or XLSX export and submits it.
    pub fn run_bytes(&self, bytes: Vec<u8>, request: &SyncRequest) -> Result<SyncReport, PipelineError> {
        let parsed = WaitingEventsImporter::from_bytes(bytes)?;
        self.run(parsed, request)
    }

    /// Maps and submits already parsed events.
    ///
    /// Fails without contacting the payroll system when the legal entity is
    /// unknown or any pay element lacks a mapping.
    pub fn run(&self, parsed: ParsedEvents, request: &SyncRequest) -> Result<SyncReport, PipelineError> {
        let entity = self
            .store
            .legal_entity(request.legal_entity_id)
            .map_err(MappingError::from)?
            .ok_or(MappingError::UnknownLegalEntity(request.legal_entity_id))?;

        let parse = parsed.summary();
        let warnings = parsed.report.warnings.len();
        let mapped = self.resolver.resolve_or_fail(
            entity.id,
            Some(request.frequency.as_str()),
            &parsed.records,
        )?;

        let target = SubmissionTarget {
            company_id: entity.id,
            frequency: request.frequency.clone(),
            run: request.run.clone(),
        };
        let submission = self.orchestrator.submit(&target, mapped.clone());

        let context = AuditContext {
            company_name: entity.company_name,
            company_code: entity.company_code,
            frequency: request.frequency.clone(),
            run: request.run.clone(),
            file_name: request.file_name.clone(),
        };
        let audited = self.audit.record(&context, &submission, &mapped);

        info!(
            legal_entity_id = entity.id,
            success = submission.success,
            succeeded = submission.succeeded,
            failed = submission.failed,
            audited,
            "waiting events sync finished"
        );

        Ok(SyncReport {
            parse,
            warnings,
            submission,
            audited,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::mapping::tests::common::{acme, MemoryMappingStore};
    use crate::workflows::submission::tests::common::MemoryPayrollApi;
    use crate::workflows::submission::{AuditError, AuditRun};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemorySink {
        runs: Mutex<Vec<AuditRun>>,
    }

    impl AuditSink for MemorySink {
        fn record(&self, run: &AuditRun) -> Result<(), AuditError> {
            self.runs.lock().expect("runs mutex poisoned").push(run.clone());
            Ok(())
        }
    }

    const EXPORT: &str = "\
Person ID,Record Number,Event,Category / Form Name,Field Label,Value,Logical ID,Employee Name
1001,1,Pay Element,Pay Element,Pay Element ID,BONUS,ACME-0001,Ada Lovelace
1001,1,Pay Element,Pay Element,Amount,1500.00,ACME-0001,Ada Lovelace
1002,1,Pay Element,Pay Element,Pay Element ID,TRAVEL,ACME-0001,Alan Turing
1002,1,Pay Element,Pay Element,Amount,80,ACME-0001,Alan Turing
";

    fn request() -> SyncRequest {
        SyncRequest {
            legal_entity_id: 7,
            frequency: "Monthly".to_string(),
            run: "202501".to_string(),
            file_name: "waiting-events.csv".to_string(),
        }
    }

    fn pipeline(
        store: Arc<MemoryMappingStore>,
        api: Arc<MemoryPayrollApi>,
        sink: Arc<MemorySink>,
    ) -> SyncPipeline<MemoryMappingStore, MemoryPayrollApi, MemorySink> {
        SyncPipeline::new(store, api, sink, 50)
            .with_today(NaiveDate::from_ymd_opt(2025, 1, 15).expect("date"))
    }

    #[test]
    fn mapped_export_is_submitted_and_audited() {
        let store = Arc::new(MemoryMappingStore::with_entity(acme()));
        store.seed(7, "BONUS", "ZBON", "Monthly");
        store.seed(7, "TRAVEL", "ZTRV", "Monthly");
        let api = Arc::new(MemoryPayrollApi::with_employees(&["1001", "1002"]));
        let sink = Arc::new(MemorySink::default());

        let report = pipeline(store, api.clone(), sink.clone())
            .run_bytes(EXPORT.as_bytes().to_vec(), &request())
            .expect("pipeline runs");

        assert!(report.submission.success);
        assert_eq!(report.parse.unique_employees, 2);
        assert_eq!(api.submitted().len(), 2);
        assert!(report.audited);

        let runs = sink.runs.lock().expect("runs mutex poisoned");
        assert_eq!(runs[0].company_code, "ACME");
        assert_eq!(runs[0].file_name, "waiting-events.csv");
        assert_eq!(runs[0].details[0].employee_name, "Ada Lovelace");
    }

    #[test]
    fn unmapped_pay_element_stops_before_payroll_is_contacted() {
        let store = Arc::new(MemoryMappingStore::with_entity(acme()));
        store.seed(7, "BONUS", "ZBON", "Monthly");
        let api = Arc::new(MemoryPayrollApi::with_employees(&["1001", "1002"]));
        let sink = Arc::new(MemorySink::default());

        let result = pipeline(store, api.clone(), sink.clone())
            .run_bytes(EXPORT.as_bytes().to_vec(), &request());

        match result {
            Err(PipelineError::Mapping(MappingError::Unmapped { pay_element_ids, .. })) => {
                assert_eq!(pay_element_ids, vec!["TRAVEL".to_string()])
            }
            other => panic!("expected unmapped failure, got {other:?}"),
        }
        assert!(api.calls().is_empty());
        assert!(sink.runs.lock().expect("runs mutex poisoned").is_empty());
    }

    #[test]
    fn unknown_legal_entity_is_rejected() {
        let store = Arc::new(MemoryMappingStore::with_entity(acme()));
        let api = Arc::new(MemoryPayrollApi::default());
        let sink = Arc::new(MemorySink::default());
        let mut request = request();
        request.legal_entity_id = 42;

        match pipeline(store, api, sink).run_bytes(EXPORT.as_bytes().to_vec(), &request) {
            Err(PipelineError::Mapping(MappingError::UnknownLegalEntity(42))) => {}
            other => panic!("expected unknown legal entity, got {other:?}"),
        }
    }
}
