//! Implementation of `xtf load`.

use std::{
    collections::BTreeSet,
    fs,
    path::Path,
    process::ExitCode,
};

use serde_json::{Map, Value};
use tantivy::{
    Index, IndexWriter, TantivyDocument,
    schema::{STORED, STRING, Schema, TEXT},
};
use tracing::{debug, info, warn};

use crate::cli::args::LoadCommand;

/// Memory budget for the index writer.
const WRITER_HEAP_SIZE: usize = 50_000_000;

/// Field tokenized when no `--text-field` is given.
const DEFAULT_TEXT_FIELD: &str = "text";

/// One parsed input line.
type Record = Map<String, Value>;

/// Builds a new index from a JSON lines file.
pub fn run(cmd: &LoadCommand) -> ExitCode {
    let records = match read_records(&cmd.file) {
        Ok(records) => records,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let text_fields: Vec<&str> = if cmd.text_fields.is_empty() {
        vec![DEFAULT_TEXT_FIELD]
    } else {
        cmd.text_fields.iter().map(String::as_str).collect()
    };
    let schema = build_schema(&records, &text_fields);

    if let Err(e) = fs::create_dir_all(&cmd.index) {
        eprintln!("error: failed to create {}: {e}", cmd.index.display());
        return ExitCode::FAILURE;
    }
    let index = match Index::create_in_dir(&cmd.index, schema.clone()) {
        Ok(index) => index,
        Err(e) => {
            eprintln!("error: failed to create index {}: {e}", cmd.index.display());
            return ExitCode::FAILURE;
        }
    };

    match write_records(&index, &schema, &records) {
        Ok(()) => {
            println!(
                "Loaded {} documents into {}",
                records.len(),
                cmd.index.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: indexing failed: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Reads every non-blank line of `path` as a JSON object.
fn read_records(path: &Path) -> Result<Vec<Record>, String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;

    let mut records = Vec::new();
    for (i, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(line) {
            Ok(Value::Object(record)) => records.push(record),
            Ok(_) => return Err(format!("{}:{}: expected a JSON object", path.display(), i + 1)),
            Err(e) => return Err(format!("{}:{}: {e}", path.display(), i + 1)),
        }
    }
    debug!(records = records.len(), "read input records");
    Ok(records)
}

/// One field per key seen in the input. Text fields are tokenized; every
/// other field is indexed as whole terms.
fn build_schema(records: &[Record], text_fields: &[&str]) -> Schema {
    let names: BTreeSet<&str> = records
        .iter()
        .flat_map(|record| record.keys().map(String::as_str))
        .chain(text_fields.iter().copied())
        .collect();

    let mut builder = Schema::builder();
    for name in names {
        if text_fields.contains(&name) {
            builder.add_text_field(name, TEXT | STORED);
        } else {
            builder.add_text_field(name, STRING | STORED);
        }
    }
    builder.build()
}

/// Adds every record to the index and commits.
fn write_records(index: &Index, schema: &Schema, records: &[Record]) -> tantivy::Result<()> {
    let mut writer: IndexWriter = index.writer(WRITER_HEAP_SIZE)?;

    for record in records {
        let mut document = TantivyDocument::new();
        for (name, value) in record {
            let field = schema.get_field(name)?;
            for term in field_values(value) {
                document.add_text(field, term);
            }
            if matches!(value, Value::Object(_)) {
                warn!(field = name.as_str(), "skipping nested object value");
            }
        }
        writer.add_document(document)?;
    }

    writer.commit()?;
    info!(documents = records.len(), "committed index");
    Ok(())
}

/// The indexable strings of a JSON value. Arrays contribute one value per
/// scalar element; nulls and objects contribute nothing.
fn field_values(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(scalar).collect(),
        other => scalar(other).into_iter().collect(),
    }
}

/// A scalar value as text.
fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn values_flatten() {
        assert_eq!(field_values(&json!("a")), vec!["a"]);
        assert_eq!(field_values(&json!(["a", 1, null, true])), vec!["a", "1", "true"]);
        assert!(field_values(&json!(null)).is_empty());
        assert!(field_values(&json!({"x": 1})).is_empty());
    }

    #[test]
    fn schema_covers_every_key() {
        let records = vec![
            record(json!({"subject": "Fiction", "text": "a whale"})),
            record(json!({"title": "Typee"})),
        ];
        let schema = build_schema(&records, &["text"]);
        let names: Vec<&str> = schema.fields().map(|(_, entry)| entry.name()).collect();
        assert_eq!(names, vec!["subject", "text", "title"]);

        let text = schema.get_field_entry(schema.get_field("text").unwrap());
        let subject = schema.get_field_entry(schema.get_field("subject").unwrap());
        assert!(text.is_indexed() && subject.is_indexed());
        assert_ne!(text.field_type(), subject.field_type());
    }

    #[test]
    fn rejects_non_objects() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs.jsonl");
        fs::write(&path, "{\"a\": 1}\n\n[1, 2]\n").unwrap();
        let err = read_records(&path).unwrap_err();
        assert!(err.ends_with(":3: expected a JSON object"), "{err}");
    }
}
