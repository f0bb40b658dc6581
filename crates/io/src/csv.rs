// Sample CSV import: one row per sample, one column per element

use std::path::Path;

use geochem_engine::{Dataset, Sample};

use crate::error::LoadError;
use crate::{LATITUDE_COLUMN, LONGITUDE_COLUMN, SHEET_COLUMN};

/// Load a sample file. The delimiter is sniffed from the header; text with
/// no BOM that is not UTF-8 is read as Windows-1252.
pub fn load_dataset(path: &Path) -> Result<Dataset, LoadError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    let dataset = parse_dataset(&content, delimiter)?;
    log::info!(
        "loaded {} samples, {} element columns, {} sheets from {}",
        dataset.len(),
        dataset.elements().len(),
        dataset.sheet_ids().len(),
        path.display()
    );
    Ok(dataset)
}

/// Parse sample rows from CSV text.
///
/// Required columns are `toposheet`, `latitude`, `longitude`. Every other
/// column whose non-empty cells all parse as numbers becomes an element
/// column, named by its lower-cased header. Empty and `nan` cells are absent
/// values; columns with any other text are skipped.
pub fn parse_dataset(content: &str, delimiter: u8) -> Result<Dataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| LoadError::Csv(e.to_string()))?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_ascii_lowercase())
        .collect();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| LoadError::MissingColumn(name.to_string()))
    };
    let sheet_col = column(SHEET_COLUMN)?;
    let lat_col = column(LATITUDE_COLUMN)?;
    let lon_col = column(LONGITUDE_COLUMN)?;

    let records: Vec<csv::StringRecord> = reader
        .records()
        .collect::<Result<_, _>>()
        .map_err(|e| LoadError::Csv(e.to_string()))?;
    if records.is_empty() {
        return Err(LoadError::Empty);
    }

    let element_cols: Vec<usize> = (0..headers.len())
        .filter(|&c| c != sheet_col && c != lat_col && c != lon_col)
        .filter(|&c| {
            let numeric = records.iter().all(|r| parse_cell(r.get(c).unwrap_or("")).is_ok());
            if !numeric {
                log::debug!("skipping non-numeric column '{}'", headers[c]);
            }
            numeric
        })
        .collect();

    let mut samples = Vec::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        let row = i + 1;
        let coordinate = |c: usize| -> Result<f64, LoadError> {
            let raw = record.get(c).unwrap_or("");
            match parse_cell(raw) {
                Ok(Some(v)) => Ok(v),
                _ => Err(LoadError::InvalidNumber {
                    row,
                    column: headers[c].clone(),
                    value: raw.to_string(),
                }),
            }
        };
        let mut sample = Sample::new(record.get(sheet_col).unwrap_or(""), coordinate(lat_col)?, coordinate(lon_col)?);
        for &c in &element_cols {
            if let Ok(Some(v)) = parse_cell(record.get(c).unwrap_or("")) {
                sample = sample.with(&headers[c], v);
            }
        }
        samples.push(sample);
    }

    let elements = element_cols.iter().map(|&c| headers[c].clone()).collect();
    Ok(Dataset::new(elements, samples))
}

/// `Ok(None)` for an absent value, `Err` for text that is not a number.
fn parse_cell(raw: &str) -> Result<Option<f64>, ()> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    raw.parse::<f64>().map(Some).map_err(|_| ())
}

/// Delimiters tried, in order, when sniffing the header line.
const DELIMITERS: &[u8] = &[b',', b';', b'\t', b'|'];

/// The first delimiter whose header line splits into all three required
/// columns. Comma when none does, so the parse reports the missing column.
fn sniff_delimiter(content: &str) -> u8 {
    let header = content.lines().next().unwrap_or("");
    DELIMITERS
        .iter()
        .copied()
        .find(|&delim| {
            let fields: Vec<String> = header
                .split(delim as char)
                .map(|f| f.trim_start_matches('\u{feff}').trim().trim_matches('"').to_ascii_lowercase())
                .collect();
            [SHEET_COLUMN, LATITUDE_COLUMN, LONGITUDE_COLUMN]
                .iter()
                .all(|required| fields.iter().any(|f| f == required))
        })
        .unwrap_or(b',')
}

fn read_file_as_utf8(path: &Path) -> Result<String, LoadError> {
    let bytes = std::fs::read(path).map_err(|e| LoadError::Io(format!("{}: {e}", path.display())))?;
    Ok(decode(&bytes))
}

/// BOM-marked text (UTF-8, UTF-16 from spreadsheet exports) in its own
/// encoding, plain UTF-8 as is, anything else as Windows-1252.
fn decode(bytes: &[u8]) -> String {
    if let Some((encoding, bom_len)) = encoding_rs::Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return text.into_owned();
    }
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            log::debug!("input is not UTF-8, decoding as Windows-1252");
            let (text, _) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(bytes);
            text.into_owned()
        }
    }
}
