use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

/// Leading CSV column holding each record's key (mapping form) or row index
/// (array form).
pub const KEY_COLUMN: &str = "MessierKey";

pub fn json_file_to_csv(input: &Path, output: &Path) -> Result<usize> {
    let reader = BufReader::new(
        File::open(input).with_context(|| format!("opening {}", input.display()))?,
    );
    let document: Value =
        serde_json::from_reader(reader).with_context(|| format!("parsing {}", input.display()))?;

    let writer = File::create(output).with_context(|| format!("creating {}", output.display()))?;
    write_csv(&document, writer).with_context(|| format!("writing {}", output.display()))
}

pub fn csv_file_to_json(input: &Path, output: &Path) -> Result<usize> {
    let reader = File::open(input).with_context(|| format!("opening {}", input.display()))?;
    let records = read_csv(reader).with_context(|| format!("reading {}", input.display()))?;

    let mut writer = BufWriter::new(
        File::create(output).with_context(|| format!("creating {}", output.display()))?,
    );
    write_pretty_json(&records, &mut writer)?;
    writer.flush()?;
    Ok(records.len())
}

/// Flatten a catalog document into CSV. Columns after [`KEY_COLUMN`] appear
/// in the order they are first seen.
pub fn write_csv<W: Write>(document: &Value, writer: W) -> Result<usize> {
    let rows = keyed_records(document)?;

    let mut columns: Vec<&str> = Vec::new();
    for (_, record) in &rows {
        for field in record.keys() {
            if !columns.contains(&field.as_str()) {
                columns.push(field.as_str());
            }
        }
    }

    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(std::iter::once(KEY_COLUMN).chain(columns.iter().copied()))?;

    for (key, record) in &rows {
        let cells = columns
            .iter()
            .map(|column| record.get(*column).map(cell_text).unwrap_or_default());
        csv_writer.write_record(std::iter::once(key.clone()).chain(cells))?;
    }

    csv_writer.flush()?;
    Ok(rows.len())
}

fn keyed_records(document: &Value) -> Result<Vec<(String, &Map<String, Value>)>> {
    let entries: Vec<(String, &Value)> = match document {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| (index.to_string(), item))
            .collect(),
        Value::Object(map) => match map.get("data") {
            Some(Value::Object(data)) => data.iter().map(|(k, v)| (k.clone(), v)).collect(),
            _ => bail!("expected an array of records or an object with a \"data\" mapping"),
        },
        _ => bail!("expected an array of records or an object with a \"data\" mapping"),
    };

    entries
        .into_iter()
        .map(|(key, value)| match value {
            Value::Object(record) => Ok((key, record)),
            _ => bail!("record {} is not an object", key),
        })
        .collect()
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One CSV row, serialized as an object in header order
#[derive(Debug, Clone, PartialEq)]
pub struct CsvRecord {
    pub fields: Vec<(String, Option<String>)>,
}

impl Serialize for CsvRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl CsvRecord {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .and_then(|(_, value)| value.as_deref())
    }
}

/// Read a headed CSV. Short rows leave the trailing fields null; surplus
/// cells are dropped.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<CsvRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();
    let mut records = Vec::new();

    for (index, row) in csv_reader.records().enumerate() {
        let row = row.with_context(|| format!("CSV row {}", index + 1))?;
        let fields = headers
            .iter()
            .enumerate()
            .map(|(column, name)| (name.clone(), row.get(column).map(str::to_string)))
            .collect();
        records.push(CsvRecord { fields });
    }

    tracing::debug!("Read {} CSV rows with {} columns", records.len(), headers.len());
    Ok(records)
}

/// Pretty JSON with four-space indentation
pub fn write_pretty_json<T: Serialize, W: Write>(value: &T, writer: W) -> Result<()> {
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);
    value
        .serialize(&mut serializer)
        .context("serializing JSON output")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn to_csv(document: Value) -> String {
        let mut out = Vec::new();
        write_csv(&document, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_mapping_form_keys_column() {
        let csv = to_csv(json!({
            "data": {
                "M1": {"name": "Crab Nebula", "magnitude": 8.4},
                "M57": {"name": "Ring Nebula", "constellation": "Lyra"}
            }
        }));

        assert_eq!(
            csv,
            "MessierKey,magnitude,name,constellation\n\
             M1,8.4,Crab Nebula,\n\
             M57,,Ring Nebula,Lyra\n"
        );
    }

    #[test]
    fn test_array_form_row_index() {
        let csv = to_csv(json!([{"name": "M31"}, {"name": "M42, Orion"}]));
        assert_eq!(csv, "MessierKey,name\n0,M31\n1,\"M42, Orion\"\n");
    }

    #[test]
    fn test_unexpected_shapes_rejected() {
        let mut out = Vec::new();
        assert!(write_csv(&json!({"M1": {"name": "Crab"}}), &mut out).is_err());
        assert!(write_csv(&json!("catalog"), &mut out).is_err());
        assert!(write_csv(&json!([1, 2]), &mut out).is_err());
    }

    #[test]
    fn test_read_csv_keeps_header_order() {
        let records = read_csv("name,type,ra\nM57,PN,18:53:35\nM1,SNR\n".as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("type"), Some("PN"));
        assert_eq!(records[1].get("ra"), None);

        let mut out = Vec::new();
        write_pretty_json(&records, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("[\n    {\n        \"name\": \"M57\",\n        \"type\": \"PN\""));
        assert!(text.contains("\"ra\": null"));
    }

    #[test]
    fn test_file_conversion() {
        let dir = TempDir::new().unwrap();
        let json_in = dir.path().join("catalog.json");
        let csv_path = dir.path().join("catalog.csv");
        let json_out = dir.path().join("catalog_v1.json");

        std::fs::write(&json_in, r#"{"data":{"M13":{"name":"Hercules Cluster","type":"GC"}}}"#).unwrap();

        assert_eq!(json_file_to_csv(&json_in, &csv_path).unwrap(), 1);
        assert_eq!(csv_file_to_json(&csv_path, &json_out).unwrap(), 1);

        let records: Value = serde_json::from_str(&std::fs::read_to_string(&json_out).unwrap()).unwrap();
        assert_eq!(
            records,
            json!([{"MessierKey": "M13", "name": "Hercules Cluster", "type": "GC"}])
        );
    }

    #[test]
    fn test_missing_input() {
        let dir = TempDir::new().unwrap();
        let err = json_file_to_csv(&dir.path().join("nope.json"), &dir.path().join("out.csv")).unwrap_err();
        assert!(err.to_string().contains("opening"));
    }
}
