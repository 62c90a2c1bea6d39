//! Tabserve - Multi-format input support
//!
//! Detects the source format of the dataset file and reads it into a column
//! list plus rows of scalar [`Value`]s. CSV columns are typed by inference,
//! JSONL and Parquet carry their own types.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use arrow::json::LineDelimitedWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Map;

use crate::data::Value;
use crate::error::LoadError;

/// Header plus rows, before they become a [`crate::data::Dataset`].
pub type RawTable = (Vec<String>, Vec<Vec<Value>>);

/// Supported input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// JSON Lines format (one JSON object per line)
    Jsonl,
    /// Apache Parquet columnar format
    Parquet,
    /// Comma-separated values with header row
    Csv,
    /// Tab-separated values with header row
    Tsv,
}

impl InputFormat {
    /// Detect format from file extension
    pub fn detect<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("parquet") | Some("pq") => InputFormat::Parquet,
            Some("csv") => InputFormat::Csv,
            Some("tsv") => InputFormat::Tsv,
            _ => InputFormat::Jsonl, // Default to JSONL
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            InputFormat::Jsonl => "jsonl",
            InputFormat::Parquet => "parquet",
            InputFormat::Csv => "csv",
            InputFormat::Tsv => "tsv",
        }
    }
}

// ─── CSV ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Integer,
    Float,
    Text,
}

/// Pick the narrowest type every non-empty cell of a column parses as.
fn infer_kind<'a>(cells: impl Iterator<Item = &'a str> + Clone) -> ColumnKind {
    let mut present = cells.filter(|c| !c.is_empty());
    if present.clone().all(|c| c.parse::<i64>().is_ok()) {
        ColumnKind::Integer
    } else if present.all(|c| c.parse::<f64>().is_ok()) {
        ColumnKind::Float
    } else {
        ColumnKind::Text
    }
}

fn typed_cell(cell: &str, kind: ColumnKind) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }
    match kind {
        ColumnKind::Integer => cell.parse().map(Value::Integer).unwrap_or(Value::Null),
        ColumnKind::Float => cell.parse().map(Value::Float).unwrap_or(Value::Null),
        ColumnKind::Text => Value::Text(cell.to_string()),
    }
}

/// Read a CSV (or TSV, by extension) file with a header row.
pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<RawTable, LoadError> {
    let path = path.as_ref();
    let delimiter = match InputFormat::detect(path) {
        InputFormat::Tsv => b'\t',
        _ => b',',
    };

    let file = File::open(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_reader(BufReader::new(file));

    let headers: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();
    let raw = reader
        .records()
        .collect::<Result<Vec<csv::StringRecord>, csv::Error>>()?;

    let kinds: Vec<ColumnKind> = (0..headers.len())
        .map(|col| infer_kind(raw.iter().map(move |r| r.get(col).unwrap_or(""))))
        .collect();

    let rows = raw
        .iter()
        .map(|record| {
            record
                .iter()
                .zip(&kinds)
                .map(|(cell, &kind)| typed_cell(cell, kind))
                .collect()
        })
        .collect();

    Ok((headers, rows))
}

// ─── JSON-shaped sources ────────────────────────────────────────────────────

fn json_to_value(value: serde_json::Value, column: &str) -> Result<Value, LoadError> {
    Ok(match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => Value::Text(s),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            return Err(LoadError::Schema(format!(
                "column '{}' holds a nested value, only scalars are supported",
                column
            )))
        }
    })
}

/// Project one JSON object onto the column list.
///
/// `missing_is_null` covers writers that drop null fields instead of
/// emitting them.
fn object_to_row(
    mut object: Map<String, serde_json::Value>,
    columns: &[String],
    missing_is_null: bool,
    line: usize,
) -> Result<Vec<Value>, LoadError> {
    if object.keys().any(|k| !columns.contains(k)) {
        return Err(LoadError::Schema(format!(
            "line {} has fields outside the header set",
            line
        )));
    }

    columns
        .iter()
        .map(|column| match object.remove(column) {
            Some(v) => json_to_value(v, column),
            None if missing_is_null => Ok(Value::Null),
            None => Err(LoadError::Schema(format!(
                "line {} is missing field '{}'",
                line, column
            ))),
        })
        .collect()
}

fn parse_object(text: &str, line: usize) -> Result<Map<String, serde_json::Value>, LoadError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|source| LoadError::Json { line, source })?;
    match value {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err(LoadError::Schema(format!("line {} is not a JSON object", line))),
    }
}

/// Read a JSONL file. The first object's key order defines the columns.
pub fn read_jsonl<P: AsRef<Path>>(path: P) -> Result<RawTable, LoadError> {
    let file = File::open(path.as_ref())?;
    let reader = BufReader::new(file);

    let mut columns: Option<Vec<String>> = None;
    let mut rows = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let object = parse_object(&line, i + 1)?;
        let columns = columns.get_or_insert_with(|| object.keys().cloned().collect());
        rows.push(object_to_row(object, columns, false, i + 1)?);
    }

    Ok((columns.unwrap_or_default(), rows))
}

/// Read a Parquet file, keeping the Arrow schema's field order.
pub fn read_parquet<P: AsRef<Path>>(path: P) -> Result<RawTable, LoadError> {
    let file = File::open(path.as_ref())?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();

    let reader = builder.build()?;
    let mut rows = Vec::new();

    for batch in reader {
        let batch = batch?;

        let mut buf = Vec::new();
        {
            let mut writer = LineDelimitedWriter::new(&mut buf);
            writer.write(&batch)?;
            writer.finish()?;
        }

        for line in buf.split(|&b| b == b'\n') {
            if line.is_empty() {
                continue;
            }
            let text = std::str::from_utf8(line)
                .map_err(|e| LoadError::Schema(format!("invalid UTF-8 in row: {}", e)))?;
            let n = rows.len() + 1;
            let object = parse_object(text, n)?;
            rows.push(object_to_row(object, &columns, true, n)?);
        }
    }

    Ok((columns, rows))
}
