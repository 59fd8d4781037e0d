//! Typed access to bencoded fields.
//!
//! Each reader takes the field name so a type mismatch reports which key
//! was malformed.

use super::error::MetainfoError;
use crate::bencode::Value;
use bytes::Bytes;
use std::collections::BTreeMap;

/// Picks between a legacy field and its `.utf-8` counterpart.
///
/// The `.utf-8` value wins whenever it is non-empty; otherwise the legacy
/// value is used. The outcome does not depend on which key came first in
/// the source.
pub fn resolve_alias(legacy: Option<String>, utf8: Option<String>) -> String {
    match utf8 {
        Some(s) if !s.is_empty() => s,
        _ => legacy.unwrap_or_default(),
    }
}

/// Reads a byte string as text, replacing invalid UTF-8 sequences.
pub fn string(value: &Value, field: &'static str) -> Result<String, MetainfoError> {
    value
        .as_bytes()
        .map(|b| String::from_utf8_lossy(b).into_owned())
        .ok_or(MetainfoError::InvalidField(field))
}

pub fn opt_string(
    value: Option<&Value>,
    field: &'static str,
) -> Result<Option<String>, MetainfoError> {
    value.map(|v| string(v, field)).transpose()
}

pub fn integer(value: &Value, field: &'static str) -> Result<i64, MetainfoError> {
    value.as_integer().ok_or(MetainfoError::InvalidField(field))
}

/// Reads a non-negative integer, as used for sizes.
pub fn length(value: &Value, field: &'static str) -> Result<u64, MetainfoError> {
    u64::try_from(integer(value, field)?).map_err(|_| MetainfoError::InvalidField(field))
}

pub fn bytes(value: &Value, field: &'static str) -> Result<Bytes, MetainfoError> {
    value
        .as_bytes()
        .cloned()
        .ok_or(MetainfoError::InvalidField(field))
}

pub fn opt_bytes(
    value: Option<&Value>,
    field: &'static str,
) -> Result<Option<Bytes>, MetainfoError> {
    value.map(|v| bytes(v, field)).transpose()
}

pub fn list<'a>(value: &'a Value, field: &'static str) -> Result<&'a [Value], MetainfoError> {
    value.as_list().ok_or(MetainfoError::InvalidField(field))
}

pub fn dict<'a>(
    value: &'a Value,
    field: &'static str,
) -> Result<&'a BTreeMap<Bytes, Value>, MetainfoError> {
    value.as_dict().ok_or(MetainfoError::InvalidField(field))
}

/// Reads a list whose every element is a byte string.
pub fn string_list(value: &Value, field: &'static str) -> Result<Vec<String>, MetainfoError> {
    list(value, field)?
        .iter()
        .map(|item| string(item, field))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_alias_wins_when_non_empty() {
        assert_eq!(
            resolve_alias(Some("a".into()), Some("b".into())),
            "b".to_string()
        );
    }

    #[test]
    fn test_empty_utf8_alias_falls_back() {
        assert_eq!(resolve_alias(Some("a".into()), Some(String::new())), "a");
        assert_eq!(resolve_alias(Some("a".into()), None), "a");
        assert_eq!(resolve_alias(None, Some(String::new())), "");
        assert_eq!(resolve_alias(None, None), "");
    }

    #[test]
    fn test_length_rejects_negative() {
        assert_eq!(length(&Value::Integer(7), "length").unwrap(), 7);
        assert!(matches!(
            length(&Value::Integer(-1), "length"),
            Err(MetainfoError::InvalidField("length"))
        ));
        assert!(length(&Value::string("7"), "length").is_err());
    }

    #[test]
    fn test_string_is_lossy() {
        let value = Value::Bytes(Bytes::from_static(b"caf\xe9"));
        assert_eq!(string(&value, "name").unwrap(), "caf\u{fffd}");
    }

    #[test]
    fn test_string_list_rejects_non_strings() {
        let value = Value::List(vec![Value::string("a"), Value::Integer(1)]);
        assert!(matches!(
            string_list(&value, "path"),
            Err(MetainfoError::InvalidField("path"))
        ));
    }
}
