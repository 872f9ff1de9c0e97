//! Field decoding and result mapping.
//!
//! Turns the columnar `GetStatementResult` payload into [`Row`]s keyed by
//! column name.

use tracing::warn;

use crate::api::models::{ColumnMetadata, Field};
use crate::models::{RedshiftDataError, Result, Row, Value};

/// How to treat result cells whose member this client does not recognise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeMode {
    /// Unrecognised members decode to an empty string, like nulls.
    #[default]
    Lenient,
    /// Unrecognised members fail the mapping with an encoding error.
    Strict,
}

impl DecodeMode {
    pub fn decode(self, field: Field) -> Result<Value> {
        match (self, field) {
            (DecodeMode::Strict, Field::Unknown(tag)) => Err(RedshiftDataError::Encoding(format!(
                "unrecognised field member `{}`",
                tag
            ))),
            (_, field) => Ok(decode_field(field)),
        }
    }
}

/// Decodes one cell. Null and unrecognised members become an empty string.
pub fn decode_field(field: Field) -> Value {
    match field {
        Field::Blob(bytes) => Value::Bytes(bytes),
        Field::Boolean(v) => Value::Bool(v),
        Field::Double(v) => Value::Double(v),
        Field::Long(v) => Value::Long(v),
        Field::String(v) => Value::String(v),
        Field::IsNull(_) => Value::String(String::new()),
        Field::Unknown(tag) => {
            warn!("Decoding unrecognised field member `{}` as empty string", tag);
            Value::String(String::new())
        }
    }
}

/// Column names in result order. A column without a name maps to its label, or "".
pub fn column_names(metadata: &[ColumnMetadata]) -> Vec<String> {
    metadata
        .iter()
        .map(|column| {
            column
                .name
                .clone()
                .or_else(|| column.label.clone())
                .unwrap_or_default()
        })
        .collect()
}

/// Maps every record onto the columns positionally.
///
/// Every record must have exactly one field per column. When a column name
/// repeats, the row keeps one entry holding the rightmost value.
pub fn map_records(
    columns: &[String],
    records: Vec<Vec<Field>>,
    mode: DecodeMode,
) -> Result<Vec<Row>> {
    let mut rows = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        if record.len() != columns.len() {
            return Err(RedshiftDataError::Encoding(format!(
                "row {} has {} fields but the result has {} columns",
                index,
                record.len(),
                columns.len()
            )));
        }

        let mut row = Row::with_capacity(columns.len());
        for (column, field) in columns.iter().zip(record) {
            row.push(column.as_str(), mode.decode(field)?);
        }
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_decode_field_mapping() {
        assert_eq!(decode_field(Field::Blob(vec![0, 1])), Value::Bytes(vec![0, 1]));
        assert_eq!(decode_field(Field::Boolean(true)), Value::Bool(true));
        assert_eq!(decode_field(Field::Double(21.5)), Value::Double(21.5));
        assert_eq!(decode_field(Field::Long(i64::MIN)), Value::Long(i64::MIN));
        assert_eq!(
            decode_field(Field::String("Tokyo".to_string())),
            Value::String("Tokyo".to_string())
        );
        assert_eq!(decode_field(Field::IsNull(true)), Value::String(String::new()));
        assert_eq!(
            decode_field(Field::Unknown("arrayValue".to_string())),
            Value::String(String::new())
        );
    }

    #[test]
    fn test_lenient_mode_never_fails() {
        let value = DecodeMode::Lenient
            .decode(Field::Unknown("arrayValue".to_string()))
            .unwrap();
        assert_eq!(value, Value::String(String::new()));
    }

    #[test]
    fn test_strict_mode_rejects_unknown_but_not_null() {
        let err = DecodeMode::Strict
            .decode(Field::Unknown("arrayValue".to_string()))
            .unwrap_err();
        assert!(matches!(err, RedshiftDataError::Encoding(ref msg) if msg.contains("arrayValue")));

        let value = DecodeMode::Strict.decode(Field::IsNull(true)).unwrap();
        assert_eq!(value, Value::String(String::new()));
    }

    #[test]
    fn test_column_names_fall_back_to_label() {
        let metadata = vec![
            ColumnMetadata::named("id"),
            ColumnMetadata {
                label: Some("avg_temp".to_string()),
                ..Default::default()
            },
            ColumnMetadata::default(),
        ];
        assert_eq!(column_names(&metadata), columns(&["id", "avg_temp", ""]));
    }

    #[test]
    fn test_map_records_every_variant() {
        let cols = columns(&["blob", "flag", "temperature", "id", "city", "note"]);
        let records = vec![
            vec![
                Field::Blob(b"ab".to_vec()),
                Field::Boolean(false),
                Field::Double(12.25),
                Field::Long(1),
                Field::String("Osaka".to_string()),
                Field::IsNull(true),
            ],
            vec![
                Field::Blob(Vec::new()),
                Field::Boolean(true),
                Field::Double(-0.5),
                Field::Long(2),
                Field::String(String::new()),
                Field::Unknown("arrayValue".to_string()),
            ],
        ];

        let rows = map_records(&cols, records, DecodeMode::Lenient).unwrap();
        assert_eq!(rows.len(), 2);
        for row in &rows {
            assert_eq!(row.columns().collect::<Vec<_>>(), cols);
        }
        assert_eq!(rows[0].get("blob"), Some(&Value::Bytes(b"ab".to_vec())));
        assert_eq!(rows[0].get("flag"), Some(&Value::Bool(false)));
        assert_eq!(rows[0].get("temperature"), Some(&Value::Double(12.25)));
        assert_eq!(rows[0].get("id"), Some(&Value::Long(1)));
        assert_eq!(rows[0].get("city"), Some(&Value::String("Osaka".to_string())));
        assert_eq!(rows[0].get("note"), Some(&Value::String(String::new())));
        assert_eq!(rows[1].get("id"), Some(&Value::Long(2)));
        assert_eq!(rows[1].get("note"), Some(&Value::String(String::new())));
    }

    #[test]
    fn test_map_records_repeated_column_keeps_last_value() {
        let cols = columns(&["id", "city", "id"]);
        let records = vec![vec![
            Field::Long(1),
            Field::String("Nagoya".to_string()),
            Field::Long(2),
        ]];

        let rows = map_records(&cols, records, DecodeMode::Lenient).unwrap();
        assert_eq!(rows[0].len(), 2);
        assert_eq!(rows[0].columns().collect::<Vec<_>>(), vec!["id", "city"]);
        assert_eq!(rows[0].get("id"), Some(&Value::Long(2)));

        let json = serde_json::to_string(&rows).unwrap();
        assert_eq!(json, r#"[{"id":2,"city":"Nagoya"}]"#);

        #[derive(serde::Deserialize)]
        struct Joined {
            id: i64,
        }
        let parsed: Vec<Joined> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0].id, 2);
    }

    #[test]
    fn test_map_records_empty_result() {
        let rows = map_records(&columns(&["id"]), Vec::new(), DecodeMode::Lenient).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_map_records_rejects_short_row() {
        let cols = columns(&["id", "city"]);
        let records = vec![
            vec![Field::Long(1), Field::String("Kyoto".to_string())],
            vec![Field::Long(2)],
        ];

        let err = map_records(&cols, records, DecodeMode::Lenient).unwrap_err();
        assert_eq!(
            err.to_string(),
            "encode result: row 1 has 1 fields but the result has 2 columns"
        );
    }

    #[test]
    fn test_map_records_rejects_wide_row() {
        let cols = columns(&["id"]);
        let records = vec![vec![Field::Long(1), Field::Long(2)]];
        assert!(map_records(&cols, records, DecodeMode::Lenient).is_err());
    }
}
