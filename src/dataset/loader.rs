//! Best-effort CSV loader for scraped product exports.
//!
//! Scraped catalogs are messy: delimiters vary, quoting is inconsistent and
//! individual lines are sometimes truncated. The loader therefore runs a
//! fallback chain instead of failing on the first parse error:
//!
//! 1. strict comma-delimited parse;
//! 2. delimiter sniffing (`;`, tab, `|`) with ragged rows allowed;
//! 3. lenient comma-delimited parse with quoting disabled, skipping any
//!    record that still fails.
//!
//! A parse attempt is only accepted when its header resolves at least one of
//! the known product columns, which is what distinguishes "parsed the wrong
//! delimiter into one fat column" from an actual success.

use std::collections::BTreeMap;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, info, warn};

use crate::dataset::table::{ProductRecord, ProductTable};
use crate::error::DatasetError;

/// Summary of a completed load.
#[derive(Debug, Clone)]
pub struct LoadReport {
    /// Which parser in the fallback chain produced the table.
    pub parser: String,
    /// Rows successfully loaded.
    pub rows_loaded: usize,
    /// Malformed rows dropped by the lenient parsers.
    pub rows_skipped: usize,
}

/// Role of a resolved CSV column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnRole {
    Price,
    Rating,
    Availability,
    Extra,
}

/// Header indices after alias resolution.
#[derive(Debug, Default)]
struct ColumnMap {
    price: Option<usize>,
    rating: Option<usize>,
    availability: Option<usize>,
    extras: Vec<(usize, String)>,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Self {
        let mut map = Self::default();
        for (idx, raw) in headers.iter().enumerate() {
            let name = raw.trim();
            match resolve_alias(name) {
                ColumnRole::Price if map.price.is_none() => map.price = Some(idx),
                ColumnRole::Rating if map.rating.is_none() => map.rating = Some(idx),
                ColumnRole::Availability if map.availability.is_none() => {
                    map.availability = Some(idx)
                }
                _ => map.extras.push((idx, name.to_string())),
            }
        }
        map
    }

    /// Number of known product columns the header resolved.
    fn known_columns(&self) -> usize {
        [
            self.price.is_some(),
            self.rating.is_some(),
            self.availability.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count()
    }
}

/// Maps a header name to its column role.
///
/// The original export uses French headers; English spellings are accepted
/// as aliases.
fn resolve_alias(name: &str) -> ColumnRole {
    match name.to_ascii_lowercase().as_str() {
        "prix" | "price" => ColumnRole::Price,
        "note_moyenne" | "note" | "average_rating" | "rating" => ColumnRole::Rating,
        "disponibilite" | "disponibilité" | "availability" | "availability_label" => {
            ColumnRole::Availability
        }
        _ => ColumnRole::Extra,
    }
}

/// Parses a numeric cell, tolerating French decimal commas and a trailing
/// currency symbol.
fn parse_numeric(cell: &str) -> Option<f64> {
    let cleaned = cell
        .trim()
        .trim_end_matches('€')
        .trim_end_matches('$')
        .trim()
        .replace(',', ".");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Loads the product table from a CSV file via the fallback chain.
///
/// # Errors
///
/// Returns [`DatasetError::FileNotFound`] when the path does not exist and
/// [`DatasetError::Unparsable`] when every parser in the chain fails to
/// recover a usable header.
pub fn load_products(path: impl AsRef<Path>) -> Result<(ProductTable, LoadReport), DatasetError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(DatasetError::FileNotFound(path.display().to_string()));
    }

    // Attempt 1: strict comma-delimited parse.
    match read_with(path, b',', false, false) {
        Ok(Some((table, report))) => {
            info!(
                parser = %report.parser,
                rows = report.rows_loaded,
                "Loaded product table"
            );
            return Ok((table, report));
        }
        Ok(None) => debug!("Strict parse did not resolve any known column"),
        Err(e) => debug!(error = %e, "Strict parse failed"),
    }

    // Attempt 2: delimiter sniffing with ragged rows allowed.
    for delimiter in [b';', b'\t', b'|'] {
        match read_with(path, delimiter, true, false) {
            Ok(Some((table, report))) => {
                info!(
                    parser = %report.parser,
                    rows = report.rows_loaded,
                    skipped = report.rows_skipped,
                    "Loaded product table via delimiter sniffing"
                );
                return Ok((table, report));
            }
            Ok(None) => {}
            Err(e) => debug!(delimiter = %(delimiter as char), error = %e, "Sniff parse failed"),
        }
    }

    // Attempt 3: lenient parse, quoting disabled, bad records skipped.
    match read_with(path, b',', true, true) {
        Ok(Some((table, report))) => {
            warn!(
                rows = report.rows_loaded,
                skipped = report.rows_skipped,
                "Loaded product table with lenient parser; some records were dropped"
            );
            Ok((table, report))
        }
        _ => Err(DatasetError::Unparsable {
            path: path.display().to_string(),
        }),
    }
}

/// Runs one parse attempt. Returns `Ok(None)` when the attempt technically
/// parses but its header resolves no known product column.
fn read_with(
    path: &Path,
    delimiter: u8,
    flexible: bool,
    disable_quoting: bool,
) -> Result<Option<(ProductTable, LoadReport)>, DatasetError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(flexible)
        .quoting(!disable_quoting)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let columns = ColumnMap::from_headers(&headers);
    if columns.known_columns() == 0 {
        return Ok(None);
    }

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for result in reader.records() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                // Strict mode propagates; lenient modes drop the record.
                if !flexible && !disable_quoting {
                    return Err(e.into());
                }
                skipped += 1;
                continue;
            }
        };
        records.push(record_from_row(&row, &columns));
    }

    let extra_columns = columns
        .extras
        .iter()
        .map(|(_, name)| name.clone())
        .collect();
    let parser = match (delimiter, flexible, disable_quoting) {
        (b',', false, false) => "strict".to_string(),
        (_, _, true) => "lenient".to_string(),
        (d, _, _) => format!("sniff({})", d as char),
    };
    let report = LoadReport {
        parser,
        rows_loaded: records.len(),
        rows_skipped: skipped,
    };

    Ok(Some((
        ProductTable::with_columns(records, extra_columns),
        report,
    )))
}

fn record_from_row(row: &StringRecord, columns: &ColumnMap) -> ProductRecord {
    let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i));

    let mut extra = BTreeMap::new();
    for (idx, name) in &columns.extras {
        if let Some(value) = row.get(*idx) {
            extra.insert(name.clone(), value.to_string());
        }
    }

    ProductRecord {
        price: cell(columns.price).and_then(parse_numeric),
        average_rating: cell(columns.rating).and_then(parse_numeric),
        availability_label: cell(columns.availability)
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .map(str::to_string),
        estimated_sales: None,
        availability_score: None,
        global_score: None,
        extra,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        write_csv_bytes(content.as_bytes())
    }

    fn write_csv_bytes(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(content).expect("write csv");
        file
    }

    #[test]
    fn test_strict_parse_with_french_headers() {
        let file = write_csv(
            "titre,prix,note_moyenne,disponibilite\n\
             Souris,19.99,4.2,En stock\n\
             Clavier,49.50,3.8,Rupture\n",
        );

        let (table, report) = load_products(file.path()).expect("load");
        assert_eq!(report.parser, "strict");
        assert_eq!(table.len(), 2);
        assert_eq!(table.records()[0].price, Some(19.99));
        assert_eq!(table.records()[1].availability_label.as_deref(), Some("Rupture"));
        assert_eq!(table.extra_columns(), &["titre".to_string()]);
    }

    #[test]
    fn test_english_aliases_resolve() {
        let file = write_csv("price,rating,availability\n10.0,4.0,En stock\n");

        let (table, _) = load_products(file.path()).expect("load");
        assert_eq!(table.records()[0].price, Some(10.0));
        assert_eq!(table.records()[0].average_rating, Some(4.0));
    }

    #[test]
    fn test_semicolon_fallback() {
        let file = write_csv(
            "titre;prix;note_moyenne;disponibilite\n\
             Souris;19,99;4,2;En stock\n",
        );

        let (table, report) = load_products(file.path()).expect("load");
        assert_eq!(report.parser, "sniff(;)");
        assert_eq!(table.records()[0].price, Some(19.99));
        assert_eq!(table.records()[0].average_rating, Some(4.2));
    }

    #[test]
    fn test_missing_cells_stay_none() {
        let file = write_csv("prix,note_moyenne,disponibilite\n,4.0,\n19.0,,En stock\n");

        let (table, _) = load_products(file.path()).expect("load");
        assert_eq!(table.records()[0].price, None);
        assert_eq!(table.records()[0].availability_label, None);
        assert_eq!(table.records()[1].average_rating, None);
    }

    #[test]
    fn test_unclosed_quote_recovered_by_lenient_parser() {
        // The open quote swallows the rest of the file in quoting mode, so
        // both the strict and sniffing attempts fail; the lenient parser
        // reads the rows with the quote as literal data.
        let file = write_csv(
            "titre,prix,note_moyenne,disponibilite\n\
             \"Souris sans fil,19.99,4.2,En stock\n\
             Clavier,49.50,3.8,Rupture\n",
        );

        let (table, report) = load_products(file.path()).expect("load");
        assert_eq!(report.parser, "lenient");
        assert_eq!(table.len(), 2);
        assert_eq!(table.records()[0].price, Some(19.99));
        assert_eq!(table.records()[1].availability_label.as_deref(), Some("Rupture"));
    }

    #[test]
    fn test_invalid_utf8_record_is_skipped() {
        let mut content = b"prix,note_moyenne,disponibilite\n10.0,4.0,En stock\n".to_vec();
        content.extend_from_slice(b"19.0,\xff\xfe,Rupture\n");
        content.extend_from_slice(b"25.0,3.5,Rupture\n");
        let file = write_csv_bytes(&content);

        let (table, report) = load_products(file.path()).expect("load");
        assert_eq!(report.parser, "lenient");
        assert_eq!(report.rows_loaded, 2);
        assert_eq!(report.rows_skipped, 1);
        assert_eq!(table.records()[1].price, Some(25.0));
    }

    #[test]
    fn test_missing_file_errors() {
        let result = load_products("/nonexistent/produits.csv");
        assert!(matches!(result, Err(DatasetError::FileNotFound(_))));
    }

    #[test]
    fn test_unknown_headers_are_unparsable() {
        let file = write_csv("a,b,c\n1,2,3\n");
        let result = load_products(file.path());
        assert!(matches!(result, Err(DatasetError::Unparsable { .. })));
    }

    #[test]
    fn test_currency_and_comma_decimals() {
        assert_eq!(parse_numeric(" 19,99 € "), Some(19.99));
        assert_eq!(parse_numeric("42"), Some(42.0));
        assert_eq!(parse_numeric(""), None);
        assert_eq!(parse_numeric("n/a"), None);
    }
}
