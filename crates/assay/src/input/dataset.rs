//! In-memory typed tabular data.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

use chrono::NaiveDateTime;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{AssayError, Result};

/// Display format for datetime scalars.
pub const DATETIME_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single non-null cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    Str(String),
}

impl Scalar {
    /// Numeric view of the value. Booleans count as 0/1.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(v) => Some(*v as f64),
            Scalar::Float(v) => Some(*v),
            Scalar::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Scalar::DateTime(_) | Scalar::Str(_) => None,
        }
    }

    /// Borrow the string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Str(s) => Some(s),
            _ => None,
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            Scalar::Bool(_) | Scalar::Int(_) | Scalar::Float(_) => 0,
            Scalar::DateTime(_) => 1,
            Scalar::Str(_) => 2,
        }
    }

    /// Total order used for picking the smallest mode and sorting keys.
    ///
    /// Numbers compare numerically, datetimes chronologically, strings
    /// lexicographically; values of different kinds order by kind.
    pub fn total_cmp(&self, other: &Scalar) -> Ordering {
        match (self, other) {
            (Scalar::DateTime(a), Scalar::DateTime(b)) => a.cmp(b),
            (Scalar::Str(a), Scalar::Str(b)) => a.cmp(b),
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a.total_cmp(&b),
                _ => self.kind_rank().cmp(&other.kind_rank()),
            },
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(v) => write!(f, "{v}"),
            Scalar::Float(v) => f.write_str(&format_float(*v)),
            Scalar::Bool(b) => f.write_str(if *b { "True" } else { "False" }),
            Scalar::DateTime(dt) => write!(f, "{}", dt.format(DATETIME_DISPLAY_FORMAT)),
            Scalar::Str(s) => f.write_str(s),
        }
    }
}

/// Format a float so integral values keep one decimal digit (`25.0`).
pub fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// Storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DType {
    Int64,
    Float64,
    Boolean,
    DateTime,
    /// Strings drawn from a declared category set.
    Categorical,
    /// Arbitrary values, usually strings, possibly mixed.
    Object,
}

impl DType {
    /// Returns true for integer and float storage.
    pub fn is_numeric(&self) -> bool {
        matches!(self, DType::Int64 | DType::Float64)
    }

    /// Returns true for storage that analysis treats as numbers (adds booleans).
    pub fn is_numeric_like(&self) -> bool {
        self.is_numeric() || *self == DType::Boolean
    }

    /// Returns true for string-like storage.
    pub fn is_string_like(&self) -> bool {
        matches!(self, DType::Object | DType::Categorical)
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DType::Int64 => "int64",
            DType::Float64 => "float64",
            DType::Boolean => "bool",
            DType::DateTime => "datetime64",
            DType::Categorical => "category",
            DType::Object => "object",
        };
        f.write_str(name)
    }
}

/// A named, typed column. `None` is the only null representation.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    dtype: DType,
    values: Vec<Option<Scalar>>,
}

impl Column {
    /// Integer column.
    pub fn from_ints(name: impl Into<String>, values: impl IntoIterator<Item = Option<i64>>) -> Self {
        Self::raw(name, DType::Int64, values.into_iter().map(|v| v.map(Scalar::Int)).collect())
    }

    /// Float column. NaN becomes null.
    pub fn from_floats(
        name: impl Into<String>,
        values: impl IntoIterator<Item = Option<f64>>,
    ) -> Self {
        let values = values
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()).map(Scalar::Float))
            .collect();
        Self::raw(name, DType::Float64, values)
    }

    /// Boolean column.
    pub fn from_bools(
        name: impl Into<String>,
        values: impl IntoIterator<Item = Option<bool>>,
    ) -> Self {
        Self::raw(name, DType::Boolean, values.into_iter().map(|v| v.map(Scalar::Bool)).collect())
    }

    /// Datetime column.
    pub fn from_datetimes(
        name: impl Into<String>,
        values: impl IntoIterator<Item = Option<NaiveDateTime>>,
    ) -> Self {
        Self::raw(
            name,
            DType::DateTime,
            values.into_iter().map(|v| v.map(Scalar::DateTime)).collect(),
        )
    }

    /// String (object) column.
    pub fn from_strs<S: Into<String>>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = Option<S>>,
    ) -> Self {
        Self::raw(
            name,
            DType::Object,
            values.into_iter().map(|v| v.map(|s| Scalar::Str(s.into()))).collect(),
        )
    }

    /// Categorical column of strings.
    pub fn categorical<S: Into<String>>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = Option<S>>,
    ) -> Self {
        let mut column = Self::from_strs(name, values);
        column.dtype = DType::Categorical;
        column
    }

    /// Build a column from loose scalars, choosing the narrowest storage type.
    ///
    /// Integers with nulls or mixed with floats become `Float64`; anything
    /// heterogeneous stays `Object`.
    pub fn from_values(name: impl Into<String>, values: Vec<Option<Scalar>>) -> Self {
        let values: Vec<Option<Scalar>> = values
            .into_iter()
            .map(|v| match v {
                Some(Scalar::Float(x)) if x.is_nan() => None,
                other => other,
            })
            .collect();

        let has_null = values.iter().any(Option::is_none);
        let present: Vec<&Scalar> = values.iter().flatten().collect();
        if present.is_empty() {
            return Self::raw(name, DType::Object, values);
        }

        let all = |pred: fn(&Scalar) -> bool| present.iter().all(|v| pred(v));

        if all(|v| matches!(v, Scalar::Int(_))) && !has_null {
            Self::raw(name, DType::Int64, values)
        } else if all(|v| matches!(v, Scalar::Int(_) | Scalar::Float(_))) {
            let values = values
                .into_iter()
                .map(|v| v.and_then(|s| s.as_f64()).map(Scalar::Float))
                .collect();
            Self::raw(name, DType::Float64, values)
        } else if all(|v| matches!(v, Scalar::Bool(_))) {
            Self::raw(name, DType::Boolean, values)
        } else if all(|v| matches!(v, Scalar::DateTime(_))) {
            Self::raw(name, DType::DateTime, values)
        } else {
            Self::raw(name, DType::Object, values)
        }
    }

    pub(crate) fn raw(name: impl Into<String>, dtype: DType, values: Vec<Option<Scalar>>) -> Self {
        Self {
            name: name.into(),
            dtype,
            values,
        }
    }

    /// Column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Storage type.
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// All cells, nulls included.
    pub fn values(&self) -> &[Option<Scalar>] {
        &self.values
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of null cells.
    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }

    /// Iterate over the non-null cells in order.
    pub fn non_null(&self) -> impl Iterator<Item = &Scalar> {
        self.values.iter().flatten()
    }

    /// Non-null values with a numeric view, in order.
    pub fn numeric_values(&self) -> Vec<f64> {
        self.non_null().filter_map(Scalar::as_f64).collect()
    }

    /// Stringified cells, nulls preserved.
    pub fn display_values(&self) -> Vec<Option<String>> {
        self.values
            .iter()
            .map(|v| v.as_ref().map(ToString::to_string))
            .collect()
    }

    /// Get a cell by row index.
    pub fn get(&self, row: usize) -> Option<&Scalar> {
        self.values.get(row).and_then(Option::as_ref)
    }
}

/// An ordered set of equal-length, uniquely named columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
}

impl Dataset {
    /// Create a dataset, checking lengths and name uniqueness.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        if let Some(first) = columns.first() {
            let expected = first.len();
            if let Some(bad) = columns.iter().find(|c| c.len() != expected) {
                return Err(AssayError::InvalidDataset(format!(
                    "column '{}' has {} rows, expected {}",
                    bad.name(),
                    bad.len(),
                    expected
                )));
            }
        }

        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name()) {
                return Err(AssayError::InvalidDataset(format!(
                    "duplicate column name '{}'",
                    column.name()
                )));
            }
        }

        Ok(Self { columns })
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.row_count(), self.column_count())
    }

    /// All columns in order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Column names in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    /// Keep only the named columns, in the order given.
    ///
    /// Repeated names are kept once. Every unknown name is reported in one
    /// [`AssayError::ColumnNotFound`].
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Dataset> {
        let missing: Vec<String> = names
            .iter()
            .map(AsRef::as_ref)
            .filter(|name| self.column(name).is_none())
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(AssayError::ColumnNotFound { columns: missing });
        }

        let mut seen = HashSet::new();
        let columns = names
            .iter()
            .map(AsRef::as_ref)
            .filter(|name| seen.insert(*name))
            .filter_map(|name| self.column(name).cloned())
            .collect();
        Dataset::new(columns)
    }

    /// Draw `n` rows without replacement using a seeded generator.
    ///
    /// Sampled rows keep their original relative order and every column
    /// keeps its dtype. With `n` at or above the row count the dataset is
    /// returned unchanged.
    pub fn sample_rows(&self, n: usize, seed: u64) -> Dataset {
        let rows = self.row_count();
        if n >= rows {
            return self.clone();
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut picked = rand::seq::index::sample(&mut rng, rows, n).into_vec();
        picked.sort_unstable();

        let columns = self
            .columns
            .iter()
            .map(|c| {
                let values = picked.iter().map(|&row| c.values[row].clone()).collect();
                Column::raw(c.name(), c.dtype(), values)
            })
            .collect();
        Dataset { columns }
    }

    /// Replace the column with the same name. Length must match.
    pub fn replace_column(&mut self, column: Column) -> Result<()> {
        let rows = self.row_count();
        if column.len() != rows {
            return Err(AssayError::InvalidDataset(format!(
                "replacement column '{}' has {} rows, expected {}",
                column.name(),
                column.len(),
                rows
            )));
        }
        let slot = self
            .columns
            .iter_mut()
            .find(|c| c.name() == column.name())
            .ok_or_else(|| {
                AssayError::InvalidDataset(format!("no column named '{}'", column.name()))
            })?;
        *slot = column;
        Ok(())
    }

    /// Total number of null cells.
    pub fn total_missing(&self) -> usize {
        self.columns.iter().map(Column::null_count).sum()
    }

    /// Number of rows that repeat an earlier row exactly (nulls compare equal).
    pub fn duplicate_row_count(&self) -> usize {
        let mut seen = HashSet::new();
        (0..self.row_count())
            .filter(|&row| {
                let key: Vec<Option<String>> = self
                    .columns
                    .iter()
                    .map(|c| c.get(row).map(ToString::to_string))
                    .collect();
                !seen.insert(key)
            })
            .count()
    }

    /// Rough deep memory footprint in bytes.
    ///
    /// Fixed-width columns cost their element width; object cells cost a
    /// pointer plus a boxed-string estimate.
    pub fn memory_usage_bytes(&self) -> usize {
        const INDEX_BYTES: usize = 128;
        const POINTER: usize = 8;
        const STRING_OVERHEAD: usize = 49;
        const BOXED_SCALAR: usize = 24;

        let columns: usize = self
            .columns
            .iter()
            .map(|c| match c.dtype() {
                DType::Int64 | DType::Float64 | DType::DateTime => c.len() * 8,
                DType::Boolean => c.len(),
                DType::Categorical | DType::Object => c
                    .values()
                    .iter()
                    .map(|v| match v {
                        Some(Scalar::Str(s)) => POINTER + STRING_OVERHEAD + s.len(),
                        _ => POINTER + BOXED_SCALAR,
                    })
                    .sum(),
            })
            .sum();

        INDEX_BYTES + columns
    }
}
