use chrono::NaiveDate;

use super::{set_text, EmployeeHandler, RunContext, SourceAction};
use crate::workflows::mapping::MappedRecord;
use crate::workflows::submission::payroll::{
    BankAccountOwner, BankDetail, PaymentMethod, PayrollError,
};
use crate::workflows::waiting_events::RecordField;

pub(crate) struct BankDetailHandler;

const ACCOUNT_TYPES: &[&str] = &["Current", "Savings", "Transmission", "Bond", "Credit Card"];

fn compact(value: &str) -> String {
    value
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase()
}

fn payment_method(value: &str) -> Option<PaymentMethod> {
    match compact(value).as_str() {
        "eft" => Some(PaymentMethod::Eft),
        "cash" => Some(PaymentMethod::Cash),
        "cheque" | "check" => Some(PaymentMethod::Cheque),
        _ => None,
    }
}

fn account_owner(value: &str) -> Option<BankAccountOwner> {
    match compact(value).as_str() {
        "own" => Some(BankAccountOwner::Own),
        "joint" => Some(BankAccountOwner::Joint),
        "thirdparty" => Some(BankAccountOwner::ThirdParty),
        _ => None,
    }
}

fn account_type(value: &str) -> Option<&'static str> {
    let wanted = compact(value);
    ACCOUNT_TYPES
        .iter()
        .copied()
        .find(|candidate| compact(candidate) == wanted)
}

impl EmployeeHandler for BankDetailHandler {
    type Record = BankDetail;

    fn unit(&self) -> &'static str {
        "PaymentInstruction"
    }

    fn noun(&self) -> &'static str {
        "bank details"
    }

    fn fetch(
        &self,
        ctx: &RunContext<'_>,
        employee_id: &str,
    ) -> Result<Option<BankDetail>, PayrollError> {
        ctx.api.bank_detail(ctx.token, ctx.company, employee_id)
    }

    fn create(&self, employee_id: &str, _today: NaiveDate) -> BankDetail {
        BankDetail {
            employee_number: employee_id.to_string(),
            ..BankDetail::default()
        }
    }

    fn missing(&self, employee_id: &str) -> String {
        format!("Bank detail for employee {employee_id} not found and action is not ADD")
    }

    fn apply(
        &self,
        bank: &mut BankDetail,
        entries: &[&MappedRecord],
        _action: &SourceAction,
        _today: NaiveDate,
    ) -> Vec<String> {
        let mut warnings = Vec::new();
        for mapped in entries {
            let record = &mapped.record;

            if let Some(value) = record.field(RecordField::PaymentMethod) {
                match payment_method(value) {
                    Some(method) => bank.payment_method = Some(method),
                    None => warnings.push(format!("Payment Method: unknown value '{value}'")),
                }
            }
            if let Some(value) = record.field(RecordField::BankAccountOwner) {
                match account_owner(value) {
                    Some(owner) => bank.account_owner = Some(owner),
                    None => warnings.push(format!("Bank Account Owner: unknown value '{value}'")),
                }
            }
            if let Some(value) = record.field(RecordField::AccountType) {
                match account_type(value) {
                    Some(kind) => bank.account_type = Some(kind.to_string()),
                    None => warnings.push(format!("Account Type: unknown value '{value}'")),
                }
            }

            set_text(&mut bank.bank_name, record.field(RecordField::BankName));
            set_text(&mut bank.branch_code, record.field(RecordField::BranchCode));
            set_text(&mut bank.account_number, record.field(RecordField::AccountNumber));
            set_text(&mut bank.account_holder_name, record.field(RecordField::NameOnAccount));
            set_text(&mut bank.comments, record.field(RecordField::BankComments));
            set_text(&mut bank.swift_code, record.field(RecordField::SwiftCode));
            set_text(&mut bank.routing_code, record.field(RecordField::RoutingCode));
        }
        warnings
    }

    fn upsert(&self, ctx: &RunContext<'_>, bank: &BankDetail) -> Result<(), PayrollError> {
        ctx.api.upsert_bank_detail(ctx.token, ctx.company, bank)
    }
}
