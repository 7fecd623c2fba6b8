//! Label dispatch tables.
//!
//! Every recognized form category owns a `label -> target` table. Labels are
//! matched after [`normalize_label`], so the tables hold the normalized spelling.

use super::normalizer::{country_name, language_name, normalize_label, parse_date, parse_decimal};
use super::record::{ChangeRecord, EventKind, RecordField};
use std::collections::HashMap;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldTarget {
    StartDate,
    EndDate,
    PayElementId,
    PayElementType,
    ComponentCode,
    UnitType,
    NumberOfUnits,
    Amount,
    FirstName,
    LastName,
    Title,
    Gender,
    Language,
    Citizenship,
    BirthDate,
    Email,
    TerminationReason,
    TerminationDate,
    PositionTitle,
    CostCenter,
    Extra(RecordField),
}

/// Why a non-blank value could not be stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Coercion {
    Date,
    Decimal,
}

impl FieldTarget {
    pub(crate) fn is_start_date(&self) -> bool {
        matches!(self, FieldTarget::StartDate)
    }

    pub(crate) fn is_end_date(&self) -> bool {
        matches!(self, FieldTarget::EndDate)
    }

    pub(crate) fn apply(self, record: &mut ChangeRecord, value: &str) -> Result<(), Coercion> {
        let text = || Some(value.to_string());
        let date = || parse_date(value).map(Some).ok_or(Coercion::Date);
        let decimal = || parse_decimal(value).map(Some).ok_or(Coercion::Decimal);

        match self {
            FieldTarget::StartDate => record.start_date = date()?,
            FieldTarget::EndDate => record.end_date = date()?,
            FieldTarget::PayElementId => record.pay_element.pay_element_id = text(),
            FieldTarget::PayElementType => record.pay_element.pay_element_type = text(),
            FieldTarget::ComponentCode => record.pay_element.component_code = text(),
            FieldTarget::UnitType => record.pay_element.unit_type = text(),
            FieldTarget::NumberOfUnits => record.pay_element.number_of_units = decimal()?,
            FieldTarget::Amount => record.pay_element.amount = decimal()?,
            FieldTarget::FirstName => record.personal.first_name = text(),
            FieldTarget::LastName => record.personal.last_name = text(),
            FieldTarget::Title => record.personal.title = text(),
            FieldTarget::Gender => record.personal.gender = text(),
            FieldTarget::Language => record.personal.language = Some(language_name(value)),
            FieldTarget::Citizenship => record.personal.citizenship = Some(country_name(value)),
            FieldTarget::BirthDate => record.personal.birth_date = date()?,
            FieldTarget::Email => record.personal.email = text(),
            FieldTarget::TerminationReason => record.termination.reason = text(),
            FieldTarget::TerminationDate => record.termination.date = date()?,
            FieldTarget::PositionTitle => record.position.position_title = text(),
            FieldTarget::CostCenter => record.position.cost_center = text(),
            FieldTarget::Extra(field) => {
                record.fields.insert(field, value.to_string());
            }
        }

        Ok(())
    }
}

type Table = &'static [(&'static str, FieldTarget)];

const DATE_WINDOW: Table = &[
    ("start date", FieldTarget::StartDate),
    ("effective date", FieldTarget::StartDate),
    ("end date", FieldTarget::EndDate),
];

const DEPLOYMENT: Table = &[
    ("position title", FieldTarget::PositionTitle),
    ("position", FieldTarget::PositionTitle),
    ("position type", FieldTarget::Extra(RecordField::PositionType)),
    ("grade", FieldTarget::Extra(RecordField::Grade)),
    ("organization group", FieldTarget::Extra(RecordField::OrganizationGroup)),
    ("organization region", FieldTarget::Extra(RecordField::OrganizationRegion)),
    ("job", FieldTarget::Extra(RecordField::Job)),
    ("employment category", FieldTarget::Extra(RecordField::EmploymentCategory)),
    (
        "employment sub category",
        FieldTarget::Extra(RecordField::EmploymentSubCategory),
    ),
    (
        "position effective date",
        FieldTarget::Extra(RecordField::PositionEffectiveDate),
    ),
    ("comments", FieldTarget::Extra(RecordField::PositionComments)),
];

const TERMINATION: Table = &[
    ("termination reason", FieldTarget::TerminationReason),
    ("termination date", FieldTarget::TerminationDate),
    ("last working day", FieldTarget::TerminationDate),
];

const COST_ASSIGNMENT: Table = &[
    ("cost center code", FieldTarget::CostCenter),
    ("cost center", FieldTarget::CostCenter),
];

const PERSONAL_DATA: Table = &[
    ("given name", FieldTarget::FirstName),
    ("first name", FieldTarget::FirstName),
    ("family name", FieldTarget::LastName),
    ("last name", FieldTarget::LastName),
    ("preferred salutation", FieldTarget::Title),
    ("title", FieldTarget::Title),
    ("birth date", FieldTarget::BirthDate),
    ("gender code", FieldTarget::Gender),
    ("gender", FieldTarget::Gender),
    ("primary language code", FieldTarget::Language),
    ("citizenship country code", FieldTarget::Citizenship),
    ("middle name", FieldTarget::Extra(RecordField::MiddleName)),
    ("preferred name", FieldTarget::Extra(RecordField::PreferredName)),
    ("initials", FieldTarget::Extra(RecordField::Initials)),
    ("maiden name", FieldTarget::Extra(RecordField::MaidenName)),
    ("marital status code", FieldTarget::Extra(RecordField::MaritalStatus)),
    ("nationality", FieldTarget::Extra(RecordField::Nationality)),
];

const COMMUNICATION: Table = &[
    ("email address", FieldTarget::Email),
    ("email", FieldTarget::Email),
    ("home number", FieldTarget::Extra(RecordField::HomeNumber)),
    ("work number", FieldTarget::Extra(RecordField::WorkNumber)),
    ("cell number", FieldTarget::Extra(RecordField::CellNumber)),
    ("mobile number", FieldTarget::Extra(RecordField::CellNumber)),
];

const PAY_ELEMENT: Table = &[
    ("pay element", FieldTarget::PayElementId),
    ("pay element id", FieldTarget::PayElementId),
    ("pay element type", FieldTarget::PayElementType),
    ("component code", FieldTarget::ComponentCode),
    ("unit type", FieldTarget::UnitType),
    ("number of units", FieldTarget::NumberOfUnits),
    ("units", FieldTarget::NumberOfUnits),
    ("amount", FieldTarget::Amount),
];

const PAY_RATE: Table = &[
    ("basic salary", FieldTarget::Extra(RecordField::BasicSalary)),
    ("salary", FieldTarget::Extra(RecordField::BasicSalary)),
    ("pay frequency", FieldTarget::Extra(RecordField::PayFrequency)),
    (
        "automatic pay indicator",
        FieldTarget::Extra(RecordField::AutomaticPayIndicator),
    ),
    ("reason", FieldTarget::Extra(RecordField::PayRateReason)),
    ("comments", FieldTarget::Extra(RecordField::PayRateComments)),
];

const PAYMENT_INSTRUCTION: Table = &[
    ("payment method", FieldTarget::Extra(RecordField::PaymentMethod)),
    ("bank account owner", FieldTarget::Extra(RecordField::BankAccountOwner)),
    ("account type", FieldTarget::Extra(RecordField::AccountType)),
    ("bank name", FieldTarget::Extra(RecordField::BankName)),
    ("branch code", FieldTarget::Extra(RecordField::BranchCode)),
    ("account no", FieldTarget::Extra(RecordField::AccountNumber)),
    ("account number", FieldTarget::Extra(RecordField::AccountNumber)),
    ("name on account", FieldTarget::Extra(RecordField::NameOnAccount)),
    ("comments", FieldTarget::Extra(RecordField::BankComments)),
    ("swift code", FieldTarget::Extra(RecordField::SwiftCode)),
    ("routing code", FieldTarget::Extra(RecordField::RoutingCode)),
];

const APPROVER: Table = &[
    ("approver type", FieldTarget::Extra(RecordField::ApproverType)),
    ("reports to", FieldTarget::Extra(RecordField::ReportsTo)),
    (
        "reports to employee number",
        FieldTarget::Extra(RecordField::ReportsToEmployeeNumber),
    ),
];

const EMPLOYMENT: Table = &[
    ("group join date", FieldTarget::Extra(RecordField::GroupJoinDate)),
    ("nature of person", FieldTarget::Extra(RecordField::NatureOfPerson)),
    ("identity type", FieldTarget::Extra(RecordField::IdentityType)),
    ("id number", FieldTarget::Extra(RecordField::IdNumber)),
    ("passport number", FieldTarget::Extra(RecordField::PassportNumber)),
    ("passport country", FieldTarget::Extra(RecordField::PassportCountry)),
    ("tax status", FieldTarget::Extra(RecordField::TaxStatus)),
    ("tax ref. number", FieldTarget::Extra(RecordField::TaxReference)),
    ("tax reference", FieldTarget::Extra(RecordField::TaxReference)),
];

/// Form categories the aggregator knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum FormCategory {
    Deployment,
    CostAssignment,
    PersonalData,
    Communication,
    PayElement,
    PayRate,
    PaymentInstruction,
    Approver,
    Employment,
}

impl FormCategory {
    pub(crate) fn from_label(label: &str) -> Option<Self> {
        let normalized = normalize_label(label);
        match normalized.as_str() {
            "deployment" => Some(Self::Deployment),
            "cost assignment" => Some(Self::CostAssignment),
            "personal data" => Some(Self::PersonalData),
            "communication" => Some(Self::Communication),
            "pay rate" => Some(Self::PayRate),
            "payment instruction" => Some(Self::PaymentInstruction),
            "approver" => Some(Self::Approver),
            "employment" | "employment status" => Some(Self::Employment),
            other if other.contains("pay element") => Some(Self::PayElement),
            _ => None,
        }
    }

    fn tables(self, event: Option<EventKind>) -> &'static [Table] {
        match (self, event) {
            (FormCategory::Deployment, Some(EventKind::Termination)) => &[TERMINATION, DEPLOYMENT],
            (FormCategory::Deployment, _) => &[DEPLOYMENT],
            (FormCategory::CostAssignment, _) => &[COST_ASSIGNMENT],
            (FormCategory::PersonalData, _) => &[PERSONAL_DATA],
            (FormCategory::Communication, _) => &[COMMUNICATION],
            (FormCategory::PayElement, _) => &[PAY_ELEMENT],
            (FormCategory::PayRate, _) => &[PAY_RATE],
            (FormCategory::PaymentInstruction, _) => &[PAYMENT_INSTRUCTION],
            (FormCategory::Approver, _) => &[APPROVER],
            (FormCategory::Employment, Some(EventKind::Termination)) => &[TERMINATION, EMPLOYMENT],
            (FormCategory::Employment, _) => &[EMPLOYMENT],
        }
    }
}

type DispatchKey = (FormCategory, Option<EventKind>);

static DISPATCH: OnceLock<HashMap<DispatchKey, HashMap<&'static str, FieldTarget>>> =
    OnceLock::new();

/// Resolves a normalized field label for the given category and event.
pub(crate) fn target_for(
    category: FormCategory,
    event: Option<EventKind>,
    normalized_label: &str,
) -> Option<FieldTarget> {
    let table = DISPATCH
        .get_or_init(build_dispatch)
        .get(&(category, event))?;
    table.get(normalized_label).copied()
}

fn build_dispatch() -> HashMap<DispatchKey, HashMap<&'static str, FieldTarget>> {
    const CATEGORIES: &[FormCategory] = &[
        FormCategory::Deployment,
        FormCategory::CostAssignment,
        FormCategory::PersonalData,
        FormCategory::Communication,
        FormCategory::PayElement,
        FormCategory::PayRate,
        FormCategory::PaymentInstruction,
        FormCategory::Approver,
        FormCategory::Employment,
    ];
    const EVENTS: &[Option<EventKind>] = &[
        None,
        Some(EventKind::Hiring),
        Some(EventKind::DataChange),
        Some(EventKind::Termination),
        Some(EventKind::PayElement),
    ];

    let mut dispatch = HashMap::new();
    for &category in CATEGORIES {
        for &event in EVENTS {
            let mut labels = HashMap::new();
            for (label, target) in DATE_WINDOW.iter().copied() {
                labels.insert(label, target);
            }
            // category tables listed first take precedence
            for table in category.tables(event).iter().rev() {
                for (label, target) in table.iter().copied() {
                    labels.insert(label, target);
                }
            }
            dispatch.insert((category, event), labels);
        }
    }
    dispatch
}

#[cfg(test)]
pub(crate) fn all_tables_for_tests() -> Vec<Table> {
    vec![
        DATE_WINDOW,
        DEPLOYMENT,
        TERMINATION,
        COST_ASSIGNMENT,
        PERSONAL_DATA,
        COMMUNICATION,
        PAY_ELEMENT,
        PAY_RATE,
        PAYMENT_INSTRUCTION,
        APPROVER,
        EMPLOYMENT,
    ]
}
