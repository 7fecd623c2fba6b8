use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// Identity of a change record within a single parse.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RecordKey {
    pub person_id: String,
    pub record_number: String,
}

impl RecordKey {
    pub fn new(person_id: impl Into<String>, record_number: impl Into<String>) -> Self {
        Self {
            person_id: person_id.into(),
            record_number: record_number.into(),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.person_id, self.record_number)
    }
}

/// Event families exported by the HR system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Hiring,
    DataChange,
    Termination,
    PayElement,
}

impl EventKind {
    pub fn from_label(label: &str) -> Option<Self> {
        match super::normalizer::normalize_label(label).as_str() {
            "hiring" | "hire" => Some(Self::Hiring),
            "data change" => Some(Self::DataChange),
            "termination" => Some(Self::Termination),
            "pay element" => Some(Self::PayElement),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EventKind::Hiring => "Hiring",
            EventKind::DataChange => "Data Change",
            EventKind::Termination => "Termination",
            EventKind::PayElement => "Pay Element",
        }
    }
}

/// Closed vocabulary for values that have no fixed attribute on [`ChangeRecord`].
///
/// The aggregator is the only writer of [`ChangeRecord::fields`]; submission
/// handlers read the same keys back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordField {
    // personal / communication
    MiddleName,
    PreferredName,
    Initials,
    MaidenName,
    MaritalStatus,
    Nationality,
    HomeNumber,
    WorkNumber,
    CellNumber,
    // deployment
    PositionType,
    Grade,
    OrganizationGroup,
    OrganizationRegion,
    Job,
    EmploymentCategory,
    EmploymentSubCategory,
    PositionEffectiveDate,
    PositionComments,
    // approver
    ApproverType,
    ReportsTo,
    ReportsToEmployeeNumber,
    // pay rate
    BasicSalary,
    PayFrequency,
    AutomaticPayIndicator,
    PayRateReason,
    PayRateComments,
    // payment instruction
    PaymentMethod,
    BankAccountOwner,
    AccountType,
    BankName,
    BranchCode,
    AccountNumber,
    NameOnAccount,
    BankComments,
    SwiftCode,
    RoutingCode,
    // employment
    GroupJoinDate,
    NatureOfPerson,
    IdentityType,
    IdNumber,
    PassportNumber,
    PassportCountry,
    TaxStatus,
    TaxReference,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PayElementFields {
    pub pay_element_id: Option<String>,
    pub pay_element_type: Option<String>,
    pub component_code: Option<String>,
    pub unit_type: Option<String>,
    pub number_of_units: Option<Decimal>,
    pub amount: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PersonalFields {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub title: Option<String>,
    pub gender: Option<String>,
    pub language: Option<String>,
    pub citizenship: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub email: Option<String>,
}

impl PersonalFields {
    fn has_signal(&self) -> bool {
        self.first_name.is_some()
            || self.last_name.is_some()
            || self.birth_date.is_some()
            || self.title.is_some()
            || self.gender.is_some()
            || self.language.is_some()
            || self.citizenship.is_some()
            || self.email.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TerminationFields {
    pub reason: Option<String>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PositionFields {
    pub position_title: Option<String>,
    pub cost_center: Option<String>,
}

/// One employee record rebuilt from every export row sharing its [`RecordKey`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeRecord {
    #[serde(flatten)]
    key: RecordKey,
    pub employee_name: Option<String>,
    pub event: Option<String>,
    pub action: Option<String>,
    pub category: Option<String>,
    pub logical_id: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub pay_element: PayElementFields,
    pub personal: PersonalFields,
    pub termination: TerminationFields,
    pub position: PositionFields,
    pub fields: BTreeMap<RecordField, String>,
}

impl ChangeRecord {
    pub fn new(key: RecordKey) -> Self {
        Self {
            key,
            employee_name: None,
            event: None,
            action: None,
            category: None,
            logical_id: None,
            start_date: None,
            end_date: None,
            pay_element: PayElementFields::default(),
            personal: PersonalFields::default(),
            termination: TerminationFields::default(),
            position: PositionFields::default(),
            fields: BTreeMap::new(),
        }
    }

    pub fn key(&self) -> &RecordKey {
        &self.key
    }

    pub fn person_id(&self) -> &str {
        &self.key.person_id
    }

    pub fn record_number(&self) -> &str {
        &self.key.record_number
    }

    pub fn event_kind(&self) -> Option<EventKind> {
        self.event.as_deref().and_then(EventKind::from_label)
    }

    pub fn field(&self, field: RecordField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn pay_element_id(&self) -> Option<&str> {
        self.pay_element.pay_element_id.as_deref()
    }

    /// Whether the record carries anything worth submitting.
    pub fn has_signal(&self) -> bool {
        let position = self.position.position_title.is_some() || self.position.cost_center.is_some();
        let termination = self.termination.reason.is_some() || self.termination.date.is_some();
        let pay_element_value = self.pay_element.pay_element_id.is_some()
            && (self.pay_element.amount.is_some() || self.pay_element.number_of_units.is_some());
        let dated = (self.start_date.is_some() || self.end_date.is_some())
            && (self.pay_element.pay_element_id.is_some() || position);

        position
            || termination
            || self.personal.has_signal()
            || pay_element_value
            || dated
            || !self.fields.is_empty()
    }
}
