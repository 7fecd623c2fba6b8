use std::collections::HashMap;

pub(crate) const PERSON_ID: &str = "Person ID";
pub(crate) const RECORD_NUMBER: &str = "Record Number";
pub(crate) const EVENT: &str = "Event";
pub(crate) const CATEGORY: &str = "Category / Form Name";
pub(crate) const FIELD_LABEL: &str = "Field Label";
pub(crate) const VALUE: &str = "Value";
pub(crate) const LOGICAL_ID: &str = "Logical ID";
pub(crate) const START_DATE: &str = "Start Date";
pub(crate) const END_DATE: &str = "End Date";
pub(crate) const EMPLOYEE_NAME: &str = "Employee Name";
pub(crate) const ACTION: &str = "Action";

/// Header positions, resolved once per parse.
#[derive(Debug, Clone, Default)]
pub(crate) struct ColumnMap {
    person_id: Option<usize>,
    record_number: Option<usize>,
    event: Option<usize>,
    category: Option<usize>,
    field_label: Option<usize>,
    value: Option<usize>,
    logical_id: Option<usize>,
    start_date: Option<usize>,
    end_date: Option<usize>,
    employee_name: Option<usize>,
    action: Option<usize>,
}

impl ColumnMap {
    pub(crate) fn from_header(header: &[String]) -> Self {
        let mut positions: HashMap<&str, usize> = HashMap::new();
        for (index, name) in header.iter().enumerate() {
            let name = name.trim().trim_start_matches('\u{feff}');
            if !name.is_empty() {
                positions.entry(name).or_insert(index);
            }
        }
        let find = |name: &str| positions.get(name).copied();

        Self {
            person_id: find(PERSON_ID),
            record_number: find(RECORD_NUMBER),
            event: find(EVENT),
            category: find(CATEGORY),
            field_label: find(FIELD_LABEL),
            value: find(VALUE),
            logical_id: find(LOGICAL_ID),
            start_date: find(START_DATE),
            end_date: find(END_DATE),
            employee_name: find(EMPLOYEE_NAME),
            action: find(ACTION),
        }
    }

    pub(crate) fn has_identity(&self) -> bool {
        self.person_id.is_some() || self.record_number.is_some()
    }

    pub(crate) fn missing_required(&self) -> Vec<&'static str> {
        [
            (PERSON_ID, self.person_id),
            (RECORD_NUMBER, self.record_number),
            (EVENT, self.event),
            (CATEGORY, self.category),
            (FIELD_LABEL, self.field_label),
            (VALUE, self.value),
        ]
        .into_iter()
        .filter_map(|(name, position)| position.is_none().then_some(name))
        .collect()
    }

    pub(crate) fn row<'a>(&self, cells: &'a [String]) -> EventRow<'a> {
        let cell = |position: Option<usize>| {
            position
                .and_then(|index| cells.get(index))
                .map(|value| value.trim())
                .unwrap_or("")
        };

        EventRow {
            person_id: cell(self.person_id),
            record_number: cell(self.record_number),
            event: cell(self.event),
            category: cell(self.category),
            field_label: cell(self.field_label),
            value: cell(self.value),
            logical_id: cell(self.logical_id),
            start_date: cell(self.start_date),
            end_date: cell(self.end_date),
            employee_name: cell(self.employee_name),
            action: cell(self.action),
        }
    }
}

/// Trimmed cell values for one data row; absent columns read as blank.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct EventRow<'a> {
    pub(crate) person_id: &'a str,
    pub(crate) record_number: &'a str,
    pub(crate) event: &'a str,
    pub(crate) category: &'a str,
    pub(crate) field_label: &'a str,
    pub(crate) value: &'a str,
    pub(crate) logical_id: &'a str,
    pub(crate) start_date: &'a str,
    pub(crate) end_date: &'a str,
    pub(crate) employee_name: &'a str,
    pub(crate) action: &'a str,
}
