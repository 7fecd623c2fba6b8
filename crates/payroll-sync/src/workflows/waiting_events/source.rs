use super::ImportError;
use calamine::{open_workbook_from_rs, Data, Range, Reader, Xlsx};
use std::io::{Cursor, Read};

/// Row-oriented view over a tabular export. The first row returned is the header.
pub trait TabularSource {
    fn next_row(&mut self) -> Result<Option<Vec<String>>, ImportError>;
}

/// CSV export reader. Rows may be ragged; short rows read as blank cells.
pub struct CsvSource<R: Read> {
    reader: csv::Reader<R>,
    record: csv::StringRecord,
}

impl<R: Read> CsvSource<R> {
    pub fn new(reader: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        Self {
            reader,
            record: csv::StringRecord::new(),
        }
    }
}

impl<R: Read> TabularSource for CsvSource<R> {
    fn next_row(&mut self) -> Result<Option<Vec<String>>, ImportError> {
        if !self.reader.read_record(&mut self.record)? {
            return Ok(None);
        }
        Ok(Some(self.record.iter().map(str::to_string).collect()))
    }
}

/// First worksheet of an XLSX workbook.
pub struct XlsxSource {
    rows: std::vec::IntoIter<Vec<String>>,
}

impl XlsxSource {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, ImportError> {
        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))
            .map_err(|err: calamine::XlsxError| ImportError::Xlsx(err.to_string()))?;

        let Some(sheet_name) = workbook.sheet_names().first().cloned() else {
            return Ok(Self {
                rows: Vec::new().into_iter(),
            });
        };

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|err| ImportError::Xlsx(err.to_string()))?;

        Ok(Self {
            rows: sheet_rows(&range).into_iter(),
        })
    }
}

impl TabularSource for XlsxSource {
    fn next_row(&mut self) -> Result<Option<Vec<String>>, ImportError> {
        Ok(self.rows.next())
    }
}

fn sheet_rows(range: &Range<Data>) -> Vec<Vec<String>> {
    range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect()
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(value) => value.trim().to_string(),
        Data::DateTime(value) => match value.as_datetime() {
            Some(dt) => dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
            None => value.to_string(),
        },
        Data::DateTimeIso(value) => value.trim().to_string(),
        other => other.to_string().trim().to_string(),
    }
}

/// XLSX files are zip archives.
pub(crate) fn looks_like_xlsx(bytes: &[u8]) -> bool {
    bytes.starts_with(b"PK\x03\x04")
}
