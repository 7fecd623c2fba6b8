use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use serde::Serialize;

use crate::workflows::mapping::MappedRecord;
use crate::workflows::waiting_events::{normalize_label, EventKind};

/// Payroll submission buckets, declared in processing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum SubmissionCategory {
    Hiring,
    PayElement,
    PersonalData,
    PositionData,
    PayRate,
    PaymentInstruction,
    Employment,
}

impl SubmissionCategory {
    pub const ORDER: [SubmissionCategory; 7] = [
        SubmissionCategory::Hiring,
        SubmissionCategory::PayElement,
        SubmissionCategory::PersonalData,
        SubmissionCategory::PositionData,
        SubmissionCategory::PayRate,
        SubmissionCategory::PaymentInstruction,
        SubmissionCategory::Employment,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SubmissionCategory::Hiring => "Hiring",
            SubmissionCategory::PayElement => "PayElement",
            SubmissionCategory::PersonalData => "PersonalData",
            SubmissionCategory::PositionData => "PositionData",
            SubmissionCategory::PayRate => "PayRate",
            SubmissionCategory::PaymentInstruction => "PaymentInstruction",
            SubmissionCategory::Employment => "Employment",
        }
    }
}

impl fmt::Display for SubmissionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// `None` in the category column matches any category for that event.
const CLASSIFICATION: &[(EventKind, Option<&str>, SubmissionCategory)] = &[
    (EventKind::Hiring, None, SubmissionCategory::Hiring),
    (EventKind::PayElement, None, SubmissionCategory::PayElement),
    (EventKind::DataChange, Some("personal data"), SubmissionCategory::PersonalData),
    (EventKind::DataChange, Some("communication"), SubmissionCategory::PersonalData),
    (EventKind::DataChange, Some("deployment"), SubmissionCategory::PositionData),
    (EventKind::DataChange, Some("approver"), SubmissionCategory::PositionData),
    (EventKind::DataChange, Some("cost assignment"), SubmissionCategory::PositionData),
    (EventKind::DataChange, Some("pay rate"), SubmissionCategory::PayRate),
    (
        EventKind::DataChange,
        Some("payment instruction"),
        SubmissionCategory::PaymentInstruction,
    ),
    (EventKind::Termination, None, SubmissionCategory::Employment),
];

type ClassificationTable = HashMap<(EventKind, Option<&'static str>), SubmissionCategory>;

fn classification_table() -> &'static ClassificationTable {
    static TABLE: OnceLock<ClassificationTable> = OnceLock::new();
    TABLE.get_or_init(|| {
        CLASSIFICATION
            .iter()
            .map(|(event, category, bucket)| ((*event, *category), *bucket))
            .collect()
    })
}

/// Bucket for an event/category pair, or `None` when the pair is not submittable.
pub fn classify(event: Option<&str>, category: Option<&str>) -> Option<SubmissionCategory> {
    let event = event.and_then(EventKind::from_label)?;
    let table = classification_table();
    if let Some(bucket) = table.get(&(event, None)) {
        return Some(*bucket);
    }

    let category = normalize_label(category?);
    table
        .iter()
        .find_map(|((kind, label), bucket)| {
            (*kind == event && *label == Some(category.as_str())).then_some(*bucket)
        })
}

/// Records split by bucket, each bucket keeping input order.
#[derive(Debug, Default)]
pub struct Classified {
    buckets: HashMap<SubmissionCategory, Vec<MappedRecord>>,
    pub unclassified: Vec<MappedRecord>,
}

impl Classified {
    pub fn from_records(records: Vec<MappedRecord>) -> Self {
        let mut classified = Self::default();
        for mapped in records {
            match classify(mapped.record.event.as_deref(), mapped.record.category.as_deref()) {
                Some(bucket) => classified.buckets.entry(bucket).or_default().push(mapped),
                None => classified.unclassified.push(mapped),
            }
        }
        classified
    }

    /// Non-empty buckets in processing order.
    pub fn in_order(mut self) -> Vec<(SubmissionCategory, Vec<MappedRecord>)> {
        SubmissionCategory::ORDER
            .iter()
            .filter_map(|category| {
                self.buckets
                    .remove(category)
                    .filter(|records| !records.is_empty())
                    .map(|records| (*category, records))
            })
            .collect()
    }
}
