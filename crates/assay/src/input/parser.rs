//! CSV/TSV loader with delimiter detection and column typing.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use super::coerce::{parse_integer, parse_number};
use super::dataset::{Column, Dataset, Scalar};
use super::source::{is_null_value, RawTable, SourceMetadata};
use crate::error::{AssayError, Result};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Parser configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Whether the file has a header row.
    pub has_header: bool,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
    /// Quote character.
    pub quote: u8,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_header: true,
            max_rows: None,
            quote: b'"',
        }
    }
}

/// Loads delimited files into typed datasets.
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self {
            config: ParserConfig::default(),
        }
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse a file and return the dataset and source metadata.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<(Dataset, SourceMetadata)> {
        let path = path.as_ref();
        let io_err = |e| AssayError::Io {
            path: path.to_path_buf(),
            source: e,
        };

        let mut file = File::open(path).map_err(io_err)?;
        let size_bytes = file.metadata().map_err(io_err)?.len();

        let mut contents = Vec::new();
        file.read_to_end(&mut contents).map_err(io_err)?;

        let mut hasher = Sha256::new();
        hasher.update(&contents);
        let hash = format!("sha256:{:x}", hasher.finalize());

        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(&contents)?,
        };

        let dataset = self.parse_bytes(&contents, delimiter)?;

        let format = match delimiter {
            b'\t' => "tsv",
            b',' => "csv",
            b';' => "csv-semicolon",
            b'|' => "psv",
            _ => "delimited",
        }
        .to_string();

        debug!(
            path = %path.display(),
            rows = dataset.row_count(),
            columns = dataset.column_count(),
            format = %format,
            "loaded dataset"
        );

        let source_metadata = SourceMetadata::new(
            path.to_path_buf(),
            hash,
            size_bytes,
            format,
            dataset.row_count(),
            dataset.column_count(),
        );

        Ok((dataset, source_metadata))
    }

    /// Parse in-memory bytes, detecting the delimiter unless configured.
    pub fn parse_slice(&self, bytes: &[u8]) -> Result<Dataset> {
        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(bytes)?,
        };
        self.parse_bytes(bytes, delimiter)
    }

    fn parse_bytes(&self, bytes: &[u8], delimiter: u8) -> Result<Dataset> {
        let raw = self.read_raw(bytes, delimiter)?;
        let columns = raw
            .headers
            .iter()
            .enumerate()
            .map(|(idx, name)| type_column(name, raw.column_values(idx)))
            .collect();
        Dataset::new(columns)
    }

    fn read_raw(&self, bytes: &[u8], delimiter: u8) -> Result<RawTable> {
        let builder = || {
            let mut builder = csv::ReaderBuilder::new();
            builder
                .delimiter(delimiter)
                .has_headers(self.config.has_header)
                .quote(self.config.quote)
                .flexible(true);
            builder
        };

        let mut reader = builder().from_reader(bytes);
        let headers: Vec<String> = if self.config.has_header {
            reader.headers()?.iter().map(|s| s.to_string()).collect()
        } else {
            match reader.records().next() {
                Some(Ok(record)) => (0..record.len())
                    .map(|i| format!("column_{}", i + 1))
                    .collect(),
                Some(Err(e)) => return Err(e.into()),
                None => return Err(AssayError::EmptyData("No data rows found".to_string())),
            }
        };

        if headers.is_empty() {
            return Err(AssayError::EmptyData("No columns found".to_string()));
        }
        let headers = dedupe_headers(headers);

        let expected_cols = headers.len();
        let mut rows = Vec::new();
        let mut reader = builder().from_reader(bytes);

        for (row_idx, result) in reader.records().enumerate() {
            if let Some(max) = self.config.max_rows {
                if row_idx >= max {
                    break;
                }
            }

            let record = result?;
            let mut row: Vec<String> = record.iter().map(|s| s.to_string()).collect();
            row.resize(expected_cols, String::new());
            rows.push(row);
        }

        if rows.is_empty() {
            return Err(AssayError::EmptyData("No data rows found".to_string()));
        }

        Ok(RawTable::new(headers, rows))
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Choose a storage type for one column of cell texts.
///
/// Integers become `Int64` unless a null is present (then `Float64`), any
/// other all-numeric column is `Float64`, `True`/`False` text is `Boolean`,
/// and everything else is `Object`. An all-null column is `Float64`.
fn type_column<'a>(name: &str, cells: impl Iterator<Item = &'a str>) -> Column {
    let cells: Vec<Option<&str>> = cells
        .map(|c| if is_null_value(c) { None } else { Some(c) })
        .collect();
    let has_null = cells.iter().any(Option::is_none);
    let present: Vec<&str> = cells.iter().flatten().copied().collect();

    if present.is_empty() {
        return Column::from_floats(name, cells.iter().map(|_| None));
    }

    if !has_null && present.iter().all(|c| parse_integer(c).is_some()) {
        return Column::from_ints(name, cells.iter().map(|c| c.and_then(parse_integer)));
    }

    if present.iter().all(|c| parse_number(c).is_some()) {
        return Column::from_floats(name, cells.iter().map(|c| c.and_then(parse_number)));
    }

    if present.iter().all(|c| parse_bool(c).is_some()) {
        return Column::from_bools(name, cells.iter().map(|c| c.and_then(parse_bool)));
    }

    Column::from_values(
        name,
        cells
            .iter()
            .map(|c| c.map(|s| Scalar::Str(s.to_string())))
            .collect(),
    )
}

/// Rename repeated header names to `name.1`, `name.2`, ... in file order.
///
/// A generated name that collides with a later header keeps counting, so
/// `a,a,a.1` becomes `a,a.1,a.1.1`.
fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    headers
        .into_iter()
        .map(|original| {
            let mut name = original.clone();
            let mut seen = counts.get(&name).copied().unwrap_or(0);
            while seen > 0 {
                counts.insert(name.clone(), seen + 1);
                name = format!("{}.{}", name, seen);
                seen = counts.get(&name).copied().unwrap_or(0);
            }
            counts.insert(name.clone(), seen + 1);
            if name != original {
                debug!(header = %original, renamed = %name, "renamed duplicate header");
            }
            name
        })
        .collect()
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.trim() {
        "True" | "TRUE" | "true" => Some(true),
        "False" | "FALSE" | "false" => Some(false),
        _ => None,
    }
}

/// Detect the delimiter by analyzing the first few lines.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let reader = BufReader::new(bytes);
    let lines: Vec<String> = reader
        .lines()
        .take(10)
        .filter_map(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(AssayError::EmptyData("No lines to analyze".to_string()));
    }

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let first_count = counts[0];
        if first_count == 0 {
            continue;
        }

        let consistent = counts.iter().all(|&c| c == first_count);
        let variance: f64 = if counts.len() > 1 {
            let mean = counts.iter().sum::<usize>() as f64 / counts.len() as f64;
            counts.iter().map(|&c| (c as f64 - mean).powi(2)).sum::<f64>() / counts.len() as f64
        } else {
            0.0
        };

        // Tab gets a slight bonus as it rarely appears inside values
        let score = if consistent {
            first_count * 1000 + (if delim == b'\t' { 100 } else { 0 })
        } else if variance < 1.0 {
            first_count * 100
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    Ok(best_delimiter)
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}
