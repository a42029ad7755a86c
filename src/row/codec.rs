//! Row encoding and decoding.
//!
//! Rows are packed field by field with no padding between fields:
//! - `Int { width }`: big-endian two's complement, `width` bytes
//! - `Text { width }`: UTF-8 bytes, right-padded with zeros to `width`,
//!   silently truncated when longer
//!
//! Decoding strips trailing zero bytes from text fields and sign-extends
//! integers back to `i64`.

use crate::error::{Result, StorageError};
use crate::row::{FieldKind, Row, RowSchema, Value, MAX_INT_WIDTH};

/// Bytes occupied by one row of `schema`
pub fn row_size(schema: &RowSchema) -> usize {
    schema.row_size()
}

/// Encode a row into exactly `row_size(schema)` bytes
pub fn encode_row(schema: &RowSchema, values: &[Value]) -> Result<Vec<u8>> {
    if values.len() != schema.len() {
        return Err(StorageError::ArityMismatch {
            expected: schema.len(),
            found: values.len(),
        });
    }

    let mut buf = Vec::with_capacity(schema.row_size());
    for (field, (kind, value)) in schema.fields().iter().zip(values).enumerate() {
        match (*kind, value) {
            (FieldKind::Int { width }, Value::Int(v)) => {
                if !int_fits(*v, width) {
                    return Err(StorageError::ValueOutOfRange {
                        field,
                        value: *v,
                        width,
                    });
                }
                buf.extend_from_slice(&v.to_be_bytes()[MAX_INT_WIDTH - width..]);
            }
            (FieldKind::Text { width }, Value::Text(s)) => {
                let bytes = s.as_bytes();
                let n = bytes.len().min(width);
                buf.extend_from_slice(&bytes[..n]);
                buf.resize(buf.len() + (width - n), 0);
            }
            (kind, value) => {
                return Err(StorageError::TypeMismatch {
                    field,
                    expected: kind.to_string(),
                    found: value.kind_name().to_string(),
                });
            }
        }
    }

    debug_assert_eq!(buf.len(), schema.row_size());
    Ok(buf)
}

/// Decode one row; `bytes` must be exactly `row_size(schema)` long
pub fn decode_row(schema: &RowSchema, bytes: &[u8]) -> Result<Row> {
    if bytes.len() != schema.row_size() {
        return Err(StorageError::corruption(format!(
            "row is {} bytes, schema expects {}",
            bytes.len(),
            schema.row_size()
        )));
    }

    let mut row = Vec::with_capacity(schema.len());
    let mut offset = 0;
    for kind in schema.fields() {
        let width = kind.width();
        let field = &bytes[offset..offset + width];
        offset += width;

        let value = match kind {
            FieldKind::Int { .. } => Value::Int(decode_int(field)),
            FieldKind::Text { .. } => {
                let end = field.iter().rposition(|&b| b != 0).map_or(0, |p| p + 1);
                Value::Text(String::from_utf8_lossy(&field[..end]).into_owned())
            }
        };
        row.push(value);
    }

    Ok(row)
}

/// Check whether `value` is representable as a signed `width`-byte integer
fn int_fits(value: i64, width: usize) -> bool {
    if width >= MAX_INT_WIDTH {
        return true;
    }
    let bits = (width * 8) as u32;
    let min = -(1i64 << (bits - 1));
    let max = (1i64 << (bits - 1)) - 1;
    (min..=max).contains(&value)
}

/// Sign-extend a big-endian integer of up to 8 bytes
fn decode_int(field: &[u8]) -> i64 {
    let negative = field.first().is_some_and(|&b| b & 0x80 != 0);
    let mut buf = if negative {
        [0xFFu8; MAX_INT_WIDTH]
    } else {
        [0u8; MAX_INT_WIDTH]
    };
    buf[MAX_INT_WIDTH - field.len()..].copy_from_slice(field);
    i64::from_be_bytes(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn id_name_schema() -> RowSchema {
        RowSchema::new(vec![FieldKind::Int { width: 4 }, FieldKind::Text { width: 8 }])
            .unwrap()
    }

    #[test]
    fn test_encode_int_and_padded_text() -> Result<()> {
        let schema = id_name_schema();
        let encoded = encode_row(&schema, &[Value::Int(42), Value::from("hello")])?;

        assert_eq!(encoded.len(), 12);
        assert_eq!(&encoded[0..4], &[0, 0, 0, 42]);
        assert_eq!(&encoded[4..9], b"hello");
        assert_eq!(&encoded[9..12], &[0, 0, 0]);

        let decoded = decode_row(&schema, &encoded)?;
        assert_eq!(decoded, vec![Value::Int(42), Value::from("hello")]);
        Ok(())
    }

    #[test]
    fn test_long_text_is_truncated() -> Result<()> {
        let schema = id_name_schema();
        let encoded = encode_row(&schema, &[Value::Int(1), Value::from("abcdefghij")])?;

        assert_eq!(&encoded[4..12], b"abcdefgh");
        let decoded = decode_row(&schema, &encoded)?;
        assert_eq!(decoded[1], Value::from("abcdefgh"));
        Ok(())
    }

    #[test]
    fn test_text_exactly_width() -> Result<()> {
        let schema = id_name_schema();
        let row = vec![Value::Int(0), Value::from("12345678")];
        assert_eq!(decode_row(&schema, &encode_row(&schema, &row)?)?, row);
        Ok(())
    }

    #[test]
    fn test_int_range_per_width() {
        let schema = RowSchema::new(vec![FieldKind::Int { width: 1 }]).unwrap();
        assert!(encode_row(&schema, &[Value::Int(127)]).is_ok());
        assert!(encode_row(&schema, &[Value::Int(-128)]).is_ok());
        assert!(matches!(
            encode_row(&schema, &[Value::Int(128)]),
            Err(StorageError::ValueOutOfRange { field: 0, value: 128, width: 1 })
        ));
        assert!(matches!(
            encode_row(&schema, &[Value::Int(-129)]),
            Err(StorageError::ValueOutOfRange { .. })
        ));

        let wide = RowSchema::new(vec![FieldKind::Int { width: 8 }]).unwrap();
        assert!(encode_row(&wide, &[Value::Int(i64::MIN)]).is_ok());
        assert!(encode_row(&wide, &[Value::Int(i64::MAX)]).is_ok());
    }

    #[test]
    fn test_negative_ints_sign_extend() -> Result<()> {
        let schema = RowSchema::new(vec![
            FieldKind::Int { width: 2 },
            FieldKind::Int { width: 3 },
        ])?;
        let row = vec![Value::Int(-2), Value::Int(-8_388_608)];
        let encoded = encode_row(&schema, &row)?;
        assert_eq!(&encoded[0..2], &[0xFF, 0xFE]);
        assert_eq!(decode_row(&schema, &encoded)?, row);
        Ok(())
    }

    #[test]
    fn test_arity_and_type_mismatch() {
        let schema = id_name_schema();
        assert!(matches!(
            encode_row(&schema, &[Value::Int(1)]),
            Err(StorageError::ArityMismatch { expected: 2, found: 1 })
        ));
        assert!(matches!(
            encode_row(&schema, &[Value::from("x"), Value::from("y")]),
            Err(StorageError::TypeMismatch { field: 0, .. })
        ));
    }

    #[test]
    fn test_decode_wrong_length() {
        let schema = id_name_schema();
        assert!(decode_row(&schema, &[0u8; 11]).is_err());
    }

    #[test]
    fn test_truncation_inside_multibyte_char_decodes() -> Result<()> {
        let schema = RowSchema::new(vec![FieldKind::Text { width: 2 }])?;
        // "é" is two bytes; the second copy is cut in half
        let encoded = encode_row(&schema, &[Value::from("aé")])?;
        let decoded = decode_row(&schema, &encoded)?;
        assert_eq!(decoded, vec![Value::from("a\u{FFFD}")]);
        Ok(())
    }

    #[test]
    fn test_random_rows_round_trip() -> Result<()> {
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..200 {
            let field_count = rng.gen_range(1..6);
            let mut fields = Vec::new();
            let mut row = Vec::new();
            for _ in 0..field_count {
                if rng.gen_bool(0.5) {
                    let width = rng.gen_range(1..=MAX_INT_WIDTH);
                    let bits = (width * 8) as u32;
                    let value = if width == MAX_INT_WIDTH {
                        rng.gen::<i64>()
                    } else {
                        rng.gen_range(-(1i64 << (bits - 1))..(1i64 << (bits - 1)))
                    };
                    fields.push(FieldKind::Int { width });
                    row.push(Value::Int(value));
                } else {
                    let width = rng.gen_range(1..24);
                    let len = rng.gen_range(0..=width);
                    let text: String = (0..len)
                        .map(|_| rng.gen_range(b'a'..=b'z') as char)
                        .collect();
                    fields.push(FieldKind::Text { width });
                    row.push(Value::Text(text));
                }
            }

            let schema = RowSchema::new(fields)?;
            let encoded = encode_row(&schema, &row)?;
            assert_eq!(encoded.len(), row_size(&schema));
            assert_eq!(decode_row(&schema, &encoded)?, row);
        }
        Ok(())
    }

    #[test]
    fn test_random_long_text_truncates_to_width() -> Result<()> {
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..100 {
            let width = rng.gen_range(1..16);
            let len = rng.gen_range(width + 1..width + 32);
            let text: String = (0..len)
                .map(|_| rng.gen_range(b'A'..=b'Z') as char)
                .collect();

            let schema = RowSchema::new(vec![FieldKind::Text { width }])?;
            let decoded = decode_row(&schema, &encode_row(&schema, &[Value::Text(text.clone())])?)?;
            assert_eq!(decoded, vec![Value::Text(text[..width].to_string())]);
        }
        Ok(())
    }
}
