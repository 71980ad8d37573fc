use bson::Bson;
use bson::spec::BinarySubtype;
use tabson_schema::{Cell, RowMeta};

use crate::error::BuildError;

/// Convert a row cell to a BSON value.
///
/// `Ok(None)` means the cell was null — omitted, never written as an
/// explicit null. With `value_is_json`, string cells are parsed as
/// document literals and spliced in whole.
pub fn cell_to_bson(
    column: &str,
    cell: &Cell,
    value_is_json: bool,
) -> Result<Option<Bson>, BuildError> {
    let value = match cell {
        Cell::Null => return Ok(None),
        Cell::String(s) => {
            if value_is_json {
                serde_json::from_str::<Bson>(s).map_err(|e| BuildError::InvalidJson {
                    column: column.to_string(),
                    reason: e.to_string(),
                })?
            } else {
                Bson::String(s.clone())
            }
        }
        Cell::Bool(b) => Bson::Boolean(*b),
        Cell::Int(i) => Bson::Int64(*i),
        Cell::Float(f) => Bson::Double(*f),
        Cell::Date(millis) => Bson::DateTime(bson::DateTime::from_millis(*millis)),
        Cell::Binary(bytes) => Bson::Binary(bson::Binary {
            subtype: BinarySubtype::Generic,
            bytes: bytes.clone(),
        }),
        // string rendering; the consumer converts back on read
        Cell::BigDecimal(s) => Bson::String(s.clone()),
        Cell::Opaque(_) => return Err(BuildError::UnsupportedCellType(column.to_string())),
    };
    Ok(Some(value))
}

/// Look up the cell a mapping's incoming column points at.
pub(crate) fn cell_for_column<'a>(
    meta: &RowMeta,
    row: &'a [Cell],
    name: &str,
) -> Result<&'a Cell, BuildError> {
    let index = meta
        .index_of(name)
        .ok_or_else(|| BuildError::ColumnNotFound(name.to_string()))?;
    row.get(index)
        .ok_or_else(|| BuildError::ColumnNotFound(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn null_is_omitted() {
        assert_eq!(cell_to_bson("c", &Cell::Null, false).unwrap(), None);
    }

    #[test]
    fn primitives_map_to_native_types() {
        assert_eq!(
            cell_to_bson("c", &Cell::String("x".into()), false).unwrap(),
            Some(Bson::String("x".into()))
        );
        assert_eq!(
            cell_to_bson("c", &Cell::Bool(true), false).unwrap(),
            Some(Bson::Boolean(true))
        );
        assert_eq!(
            cell_to_bson("c", &Cell::Int(7), false).unwrap(),
            Some(Bson::Int64(7))
        );
        assert_eq!(
            cell_to_bson("c", &Cell::Float(2.5), false).unwrap(),
            Some(Bson::Double(2.5))
        );
    }

    #[test]
    fn date_is_document_native() {
        let v = cell_to_bson("c", &Cell::Date(1_700_000_000_000), false)
            .unwrap()
            .unwrap();
        assert_eq!(
            v,
            Bson::DateTime(bson::DateTime::from_millis(1_700_000_000_000))
        );
    }

    #[test]
    fn big_decimal_stored_as_string() {
        let v = cell_to_bson("c", &Cell::BigDecimal("12345.6789".into()), false)
            .unwrap()
            .unwrap();
        assert_eq!(v, Bson::String("12345.6789".into()));
    }

    #[test]
    fn json_literal_is_spliced() {
        let cell = Cell::String(r#"{"a": "one", "b": ["x", "y"]}"#.into());
        let v = cell_to_bson("c", &cell, true).unwrap().unwrap();
        assert_eq!(v, Bson::Document(doc! { "a": "one", "b": ["x", "y"] }));
    }

    #[test]
    fn bad_json_literal_is_an_error() {
        let cell = Cell::String("{not json".into());
        assert!(matches!(
            cell_to_bson("c", &cell, true),
            Err(BuildError::InvalidJson { .. })
        ));
    }

    #[test]
    fn opaque_values_are_rejected() {
        assert_eq!(
            cell_to_bson("c", &Cell::Opaque(vec![1, 2]), false),
            Err(BuildError::UnsupportedCellType("c".into()))
        );
    }
}
