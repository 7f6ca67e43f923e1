//! Fuzz target for the delimited loader.
//!
//! Builds a small table from fuzzer-chosen cells, joins it with a
//! fuzzer-chosen delimiter and sprinkles in null tokens, then checks that
//! detection, header renaming and null handling hold up.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use assay::{Parser, ParserConfig};

const DELIMITERS: [u8; 4] = [b',', b'\t', b';', b'|'];
const NULL_TOKENS: [&str; 6] = ["", "NA", "N/A", "NaN", "null", "None"];

#[derive(Debug, Arbitrary)]
struct Table {
    delimiter: u8,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    null_slot: u8,
}

fuzz_target!(|table: Table| {
    if table.headers.is_empty() || table.headers.len() > 16 || table.rows.len() > 64 {
        return;
    }
    let delimiter = DELIMITERS[table.delimiter as usize % DELIMITERS.len()];
    let clean = |cell: &str| {
        cell.chars()
            .filter(|c| *c != delimiter as char && *c != '"' && *c != '\n' && *c != '\r')
            .collect::<String>()
    };

    let width = table.headers.len();
    let mut doc = table
        .headers
        .iter()
        .map(|h| clean(h))
        .collect::<Vec<_>>()
        .join(&(delimiter as char).to_string());
    doc.push('\n');
    for (i, row) in table.rows.iter().enumerate() {
        let mut cells: Vec<String> = (0..width)
            .map(|j| row.get(j).map(|c| clean(c)).unwrap_or_default())
            .collect();
        let slot = (table.null_slot as usize + i) % width;
        cells[slot] = NULL_TOKENS[i % NULL_TOKENS.len()].to_string();
        doc.push_str(&cells.join(&(delimiter as char).to_string()));
        doc.push('\n');
    }

    // Auto-detection must never panic, whatever it picks.
    let _ = Parser::new().parse_slice(doc.as_bytes());

    // With the delimiter pinned the table must come back rectangular and
    // with unique column names.
    let pinned = Parser::with_config(ParserConfig {
        delimiter: Some(delimiter),
        ..ParserConfig::default()
    });
    if let Ok(dataset) = pinned.parse_slice(doc.as_bytes()) {
        assert_eq!(dataset.column_count(), width);
        let names = dataset.column_names();
        let unique: std::collections::HashSet<&str> = names.iter().copied().collect();
        assert_eq!(unique.len(), names.len(), "duplicate header survived: {names:?}");
        for column in dataset.columns() {
            assert_eq!(column.len(), dataset.row_count());
        }
        // Every row carries at least one null token.
        assert!(dataset.total_missing() >= dataset.row_count());
    }
});
