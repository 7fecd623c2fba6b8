use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::OnceLock;

static LANGUAGE_CODES: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
static COUNTRY_CODES: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d", "%d-%b-%Y", "%d %b %Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Trim, drop zero-width characters, collapse whitespace and case-fold.
pub(crate) fn normalize_label(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_lowercase()
}

pub(crate) fn language_name(code: &str) -> String {
    lookup_code(
        LANGUAGE_CODES.get_or_init(|| {
            const LANGUAGES: &[(&str, &str)] = &[
                ("EN", "English"),
                ("AF", "Afrikaans"),
                ("PT", "Portuguese"),
                ("ZU", "Zulu"),
                ("XH", "Xhosa"),
                ("ST", "Sotho"),
                ("TN", "Tswana"),
                ("FR", "French"),
                ("DE", "German"),
                ("ES", "Spanish"),
            ];
            LANGUAGES.iter().copied().collect()
        }),
        code,
    )
}

pub(crate) fn country_name(code: &str) -> String {
    lookup_code(
        COUNTRY_CODES.get_or_init(|| {
            const COUNTRIES: &[(&str, &str)] = &[
                ("ZA", "South Africa"),
                ("PT", "Portugal"),
                ("US", "United States"),
                ("GB", "United Kingdom"),
                ("NA", "Namibia"),
                ("BW", "Botswana"),
                ("ZW", "Zimbabwe"),
                ("MZ", "Mozambique"),
                ("LS", "Lesotho"),
                ("SZ", "Eswatini"),
            ];
            COUNTRIES.iter().copied().collect()
        }),
        code,
    )
}

fn lookup_code(table: &HashMap<&'static str, &'static str>, code: &str) -> String {
    let trimmed = code.trim();
    match table.get(trimmed.to_ascii_uppercase().as_str()) {
        Some(name) => (*name).to_string(),
        None => trimmed.to_string(),
    }
}

/// Parses a date using fixed formats only; the host locale never matters.
pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt.date());
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
}

/// Accepts `[+-]digits[.digits]`, nothing else.
pub(crate) fn parse_decimal(value: &str) -> Option<Decimal> {
    let trimmed = value.trim();
    let unsigned = trimmed
        .strip_prefix(['+', '-'])
        .unwrap_or(trimmed);

    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (unsigned, None),
    };

    let digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    if !digits(whole) || !fraction.map_or(true, digits) {
        return None;
    }

    Decimal::from_str(trimmed.trim_start_matches('+')).ok()
}

/// Strips one trailing `-<digits>` suffix, keeping the value as-is when there is none.
pub(crate) fn logical_id_prefix(logical_id: &str) -> String {
    if let Some((head, tail)) = logical_id.rsplit_once('-') {
        if !head.is_empty() && !tail.is_empty() && tail.bytes().all(|b| b.is_ascii_digit()) {
            return head.to_string();
        }
    }
    logical_id.to_string()
}
