//! Tabserve - In-memory dataset store
//!
//! Holds the immutable, ordered collection of records that every request
//! reads from. The dataset is loaded exactly once and shared behind an `Arc`;
//! nothing ever writes to it afterwards, so readers need no synchronization.

use std::path::Path;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::info;

use crate::error::LoadError;
use crate::format::{self, InputFormat};

/// A single scalar cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Integer(i) => serializer.serialize_i64(*i),
            // JSON has no NaN/inf
            Value::Float(f) if !f.is_finite() => serializer.serialize_unit(),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// One row: values positionally matched to the dataset's shared column list.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Record {
    /// Look up a field by column name.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| &self.values[i])
    }

    /// Iterate `(column, value)` pairs in column order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(String::as_str).zip(self.values.iter())
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (column, value) in self.fields() {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// The ordered, schema-homogeneous dataset.
///
/// Positions are 0-indexed here; the 1-indexed view only exists at the
/// HTTP boundary and in [`crate::window::RangeRequest`].
#[derive(Debug)]
pub struct Dataset {
    columns: Arc<[String]>,
    records: Vec<Record>,
    /// Where the data came from, for logging
    pub source: String,
}

impl Dataset {
    /// Build a dataset from a header and raw rows.
    ///
    /// Every row must have exactly one value per column.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self, LoadError> {
        let columns: Arc<[String]> = columns.into();
        let mut records = Vec::with_capacity(rows.len());

        for (i, values) in rows.into_iter().enumerate() {
            if values.len() != columns.len() {
                return Err(LoadError::Schema(format!(
                    "row {} has {} values, expected {}",
                    i + 1,
                    values.len(),
                    columns.len()
                )));
            }
            records.push(Record {
                columns: Arc::clone(&columns),
                values,
            });
        }

        Ok(Self {
            columns,
            records,
            source: "<memory>".to_string(),
        })
    }

    /// Load a dataset file, picking the reader from the file extension.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let input_format = InputFormat::detect(path);

        let (columns, rows) = match input_format {
            InputFormat::Csv | InputFormat::Tsv => format::read_csv(path)?,
            InputFormat::Jsonl => format::read_jsonl(path)?,
            InputFormat::Parquet => format::read_parquet(path)?,
        };

        let mut dataset = Self::new(columns, rows)?;
        dataset.source = path.display().to_string();

        info!(
            source = %dataset.source,
            format = input_format.name(),
            rows = dataset.len(),
            columns = dataset.columns.len(),
            "dataset loaded"
        );
        Ok(dataset)
    }

    /// Number of records. Fixed for the lifetime of the dataset.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All records in original order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Record at a 0-indexed position.
    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }
}

/// Build a dataset of `n` rows with columns `id` (1-based) and `name`.
#[cfg(test)]
pub(crate) fn numbered(n: usize) -> Dataset {
    let rows = (1..=n)
        .map(|i| vec![Value::Integer(i as i64), Value::Text(format!("row-{}", i))])
        .collect();
    Dataset::new(vec!["id".into(), "name".into()], rows).expect("uniform rows")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_rejects_ragged_rows() {
        let err = Dataset::new(
            vec!["a".into(), "b".into()],
            vec![
                vec![Value::Integer(1), Value::Integer(2)],
                vec![Value::Integer(3)],
            ],
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::Schema(_)));
        assert!(err.to_string().contains("row 2"));
    }

    #[test]
    fn test_record_serializes_in_column_order() {
        let ds = Dataset::new(
            vec!["zeta".into(), "alpha".into(), "mid".into()],
            vec![vec![
                Value::Text("z".into()),
                Value::Float(1.5),
                Value::Null,
            ]],
        )
        .unwrap();

        let json = serde_json::to_string(ds.get(0).unwrap()).unwrap();
        assert_eq!(json, r#"{"zeta":"z","alpha":1.5,"mid":null}"#);
    }

    #[test]
    fn test_non_finite_float_serializes_as_null() {
        let json = serde_json::to_string(&Value::Float(f64::NAN)).unwrap();
        assert_eq!(json, "null");
    }

    #[test]
    fn test_accessors() {
        let ds = numbered(3);
        assert_eq!(ds.len(), 3);
        assert!(!ds.is_empty());
        assert_eq!(ds.columns(), &["id".to_string(), "name".to_string()]);
        assert_eq!(ds.get(2).unwrap().get("id"), Some(&Value::Integer(3)));
        assert!(ds.get(3).is_none());
        assert!(ds.get(0).unwrap().get("missing").is_none());
    }

    fn temp_with_suffix(suffix: &str, body: &str) -> anyhow::Result<tempfile::NamedTempFile> {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile()?;
        file.write_all(body.as_bytes())?;
        file.flush()?;
        Ok(file)
    }

    fn names(ds: &Dataset) -> Vec<Option<&Value>> {
        ds.records().iter().map(|r| r.get("name")).collect()
    }

    #[test]
    fn test_open_csv() -> anyhow::Result<()> {
        let file = temp_with_suffix(".csv", "id,name\n1,Ann\n2,Bob\n")?;
        let ds = Dataset::open(file.path())?;
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.source, file.path().display().to_string());
        assert_eq!(ds.get(1).unwrap().get("id"), Some(&Value::Integer(2)));
        Ok(())
    }

    #[test]
    fn test_open_tsv() -> anyhow::Result<()> {
        let file = temp_with_suffix(".tsv", "id\tname\n1\tAnn, Jr.\n2\tBob\n")?;
        let ds = Dataset::open(file.path())?;
        assert_eq!(ds.columns(), &["id".to_string(), "name".to_string()]);
        assert_eq!(
            names(&ds),
            vec![
                Some(&Value::Text("Ann, Jr.".into())),
                Some(&Value::Text("Bob".into()))
            ]
        );
        Ok(())
    }

    #[test]
    fn test_open_jsonl() -> anyhow::Result<()> {
        let file = temp_with_suffix(
            ".jsonl",
            "{\"id\": 1, \"name\": \"Ann\"}\n{\"id\": 2, \"name\": null}\n",
        )?;
        let ds = Dataset::open(file.path())?;
        assert_eq!(ds.len(), 2);
        assert_eq!(names(&ds), vec![Some(&Value::Text("Ann".into())), Some(&Value::Null)]);
        Ok(())
    }

    #[test]
    fn test_open_parquet() -> anyhow::Result<()> {
        use arrow::array::{ArrayRef, Int64Array, StringArray};
        use arrow::datatypes::{DataType, Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int64, false),
            Field::new("name", DataType::Utf8, false),
        ]));
        let batch = RecordBatch::try_new(
            Arc::clone(&schema),
            vec![
                Arc::new(Int64Array::from(vec![1, 2, 3])) as ArrayRef,
                Arc::new(StringArray::from(vec!["Ann", "Bob", "Cy"])) as ArrayRef,
            ],
        )?;

        let file = tempfile::Builder::new().suffix(".parquet").tempfile()?;
        let mut writer = ArrowWriter::try_new(file.as_file().try_clone()?, schema, None)?;
        writer.write(&batch)?;
        writer.close()?;

        let ds = Dataset::open(file.path())?;
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.get(2).unwrap().get("name"), Some(&Value::Text("Cy".into())));
        Ok(())
    }

    #[test]
    fn test_open_missing_file() {
        assert!(matches!(
            Dataset::open("/definitely/not/here.csv"),
            Err(LoadError::Io(_))
        ));
    }
}
