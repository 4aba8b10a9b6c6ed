use crate::utils::error::{ImportError, Result};
use calamine::{Data, Range, Reader, Xls, Xlsx};
use std::io::Cursor;

/// Column holding the process numbers in CSV and spreadsheet input.
pub const ID_COLUMN: &str = "numero_processo";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Xlsx,
    Xls,
    PlainText,
}

impl InputFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" => Some(Self::Xlsx),
            "xls" => Some(Self::Xls),
            "txt" | "text" => Some(Self::PlainText),
            _ => None,
        }
    }
}

/// Detects the input format from MIME type, magic bytes and extension.
///
/// OOXML spreadsheets share the generic ZIP header, so the magic bytes alone
/// only narrow the candidates; the extension decides between them.
pub fn sniff_format(mime: Option<&str>, path: &str, magic: Option<&[u8]>) -> Option<InputFormat> {
    if let Some(mime_str) = mime {
        let mime_lower = mime_str.trim().to_ascii_lowercase();
        let by_mime = match mime_lower.as_str() {
            "text/csv" | "application/csv" => Some(InputFormat::Csv),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => {
                Some(InputFormat::Xlsx)
            }
            "application/vnd.ms-excel" => Some(InputFormat::Xls),
            "text/plain" => Some(InputFormat::PlainText),
            _ => None,
        };
        if by_mime.is_some() {
            return by_mime;
        }
    }

    if let Some(magic_bytes) = magic {
        if magic_bytes.starts_with(&[0x50, 0x4B, 0x03, 0x04]) {
            return match extension(path).as_deref() {
                Some("xlsx") => Some(InputFormat::Xlsx),
                _ => None,
            };
        }
        // Legacy OLE compound document header used by .xls
        if magic_bytes.starts_with(&[0xD0, 0xCF, 0x11, 0xE0]) {
            return Some(InputFormat::Xls);
        }
    }

    match extension(path).as_deref() {
        Some("csv") => Some(InputFormat::Csv),
        Some("xlsx") => Some(InputFormat::Xlsx),
        Some("xls") => Some(InputFormat::Xls),
        Some("txt") | Some("text") => Some(InputFormat::PlainText),
        _ => None,
    }
}

fn extension(path: &str) -> Option<String> {
    std::path::Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Extracts the ordered list of raw process numbers from the input bytes.
///
/// Duplicates are kept; collisions are only detected later, against the
/// backend, when the batch is actually imported.
pub fn parse_identifiers(data: &[u8], format: InputFormat) -> Result<Vec<String>> {
    match format {
        InputFormat::Csv => parse_csv(data),
        InputFormat::Xlsx => {
            let mut workbook: Xlsx<_> =
                Xlsx::new(Cursor::new(data)).map_err(calamine::Error::from)?;
            parse_sheet(first_worksheet(&mut workbook)?)
        }
        InputFormat::Xls => {
            let mut workbook: Xls<_> =
                Xls::new(Cursor::new(data)).map_err(calamine::Error::from)?;
            parse_sheet(first_worksheet(&mut workbook)?)
        }
        InputFormat::PlainText => parse_text(data),
    }
}

fn parse_csv(data: &[u8]) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    let column = headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(ID_COLUMN))
        .ok_or_else(|| ImportError::UnsupportedFormat {
            detail: format!("CSV file is missing the '{}' column", ID_COLUMN),
        })?;

    let mut ids = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(value) = record.get(column) {
            let value = value.trim();
            if !value.is_empty() {
                ids.push(value.to_string());
            }
        }
    }
    Ok(ids)
}

fn first_worksheet<RS, R>(workbook: &mut R) -> Result<Range<Data>>
where
    RS: std::io::Read + std::io::Seek,
    R: Reader<RS>,
    calamine::Error: From<R::Error>,
{
    workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ImportError::UnsupportedFormat {
            detail: "workbook contains no worksheets".to_string(),
        })?
        .map_err(|e| ImportError::Spreadsheet(calamine::Error::from(e)))
}

fn parse_sheet(range: Range<Data>) -> Result<Vec<String>> {
    let mut rows = range.rows();

    let header = rows.next().ok_or_else(|| ImportError::UnsupportedFormat {
        detail: "first worksheet is empty".to_string(),
    })?;
    let column = header
        .iter()
        .position(|cell| cell_text(cell).eq_ignore_ascii_case(ID_COLUMN))
        .ok_or_else(|| ImportError::UnsupportedFormat {
            detail: format!("first worksheet is missing the '{}' column", ID_COLUMN),
        })?;

    let mut ids = Vec::new();
    for row in rows {
        if let Some(cell) = row.get(column) {
            let value = cell_text(cell);
            if !value.is_empty() {
                ids.push(value);
            }
        }
    }
    Ok(ids)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        // Spreadsheets routinely coerce number-like cells to floats
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        other => other.to_string().trim().to_string(),
    }
}

fn parse_text(data: &[u8]) -> Result<Vec<String>> {
    let text = String::from_utf8_lossy(data);
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.eq_ignore_ascii_case(ID_COLUMN))
        .map(ToString::to_string)
        .collect())
}
