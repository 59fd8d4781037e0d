use super::error::BencodeError;
use super::value::Value;
use crate::constants::MAX_DEPTH;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::ops::Range;

/// Decodes a single bencode value that must span the whole input.
pub fn decode(data: &[u8]) -> Result<Value, BencodeError> {
    let mut pos = 0;
    let value = decode_value(data, &mut pos, 0)?;

    if pos != data.len() {
        return Err(BencodeError::TrailingData(pos));
    }

    Ok(value)
}

/// Returns the exact source bytes of `key`'s value in the top-level
/// dictionary of `data`.
///
/// The slice is taken straight from the input, so hashing it gives the
/// same digest other implementations compute from the same file, even
/// when the source dictionary is not in canonical key order. When a key
/// repeats, the last occurrence wins, matching [`decode`].
///
/// # Examples
///
/// ```
/// use torrent_metainfo::bencode::find_raw_value;
///
/// let data = b"d4:infod4:name1:ae3:zzzi1ee";
/// let raw = find_raw_value(data, b"info").unwrap();
/// assert_eq!(raw, Some(&b"d4:name1:ae"[..]));
/// ```
pub fn find_raw_value<'a>(data: &'a [u8], key: &[u8]) -> Result<Option<&'a [u8]>, BencodeError> {
    Ok(dict_value_span(data, key)?.map(|span| &data[span]))
}

fn dict_value_span(data: &[u8], key: &[u8]) -> Result<Option<Range<usize>>, BencodeError> {
    match data.first() {
        Some(b'd') => {}
        Some(_) => return Err(BencodeError::NotADictionary),
        None => return Err(BencodeError::UnexpectedEof),
    }

    let mut pos = 1;
    let mut found = None;

    while pos < data.len() && data[pos] != b'e' {
        let key_pos = pos;
        let current = match decode_value(data, &mut pos, 1)? {
            Value::Bytes(b) => b,
            _ => return Err(BencodeError::NonStringKey(key_pos)),
        };

        let start = pos;
        decode_value(data, &mut pos, 1)?;

        if current.as_ref() == key {
            found = Some(start..pos);
        }
    }

    if pos >= data.len() {
        return Err(BencodeError::UnexpectedEof);
    }

    Ok(found)
}

fn decode_value(data: &[u8], pos: &mut usize, depth: usize) -> Result<Value, BencodeError> {
    if depth > MAX_DEPTH {
        return Err(BencodeError::NestingTooDeep);
    }

    if *pos >= data.len() {
        return Err(BencodeError::UnexpectedEof);
    }

    match data[*pos] {
        b'i' => decode_integer(data, pos),
        b'l' => decode_list(data, pos, depth),
        b'd' => decode_dict(data, pos, depth),
        b'0'..=b'9' => decode_bytes(data, pos),
        c => Err(BencodeError::UnexpectedChar {
            pos: *pos,
            found: c as char,
        }),
    }
}

fn decode_integer(data: &[u8], pos: &mut usize) -> Result<Value, BencodeError> {
    *pos += 1;

    let start = *pos;
    while *pos < data.len() && data[*pos] != b'e' {
        *pos += 1;
    }

    if *pos >= data.len() {
        return Err(BencodeError::UnexpectedEof);
    }

    let int_str = std::str::from_utf8(&data[start..*pos])
        .map_err(|_| BencodeError::InvalidInteger("invalid utf8".into()))?;

    if int_str.is_empty() {
        return Err(BencodeError::InvalidInteger("empty".into()));
    }

    if int_str.starts_with("-0") || (int_str.starts_with('0') && int_str.len() > 1) {
        return Err(BencodeError::InvalidInteger("leading zeros".into()));
    }

    // `parse` accepts a leading '+', bencode does not.
    if int_str.starts_with('+') {
        return Err(BencodeError::InvalidInteger(int_str.into()));
    }

    let value: i64 = int_str
        .parse()
        .map_err(|_| BencodeError::InvalidInteger(int_str.into()))?;

    *pos += 1;
    Ok(Value::Integer(value))
}

fn decode_bytes(data: &[u8], pos: &mut usize) -> Result<Value, BencodeError> {
    let start = *pos;
    while *pos < data.len() && data[*pos] != b':' {
        *pos += 1;
    }

    if *pos >= data.len() {
        return Err(BencodeError::UnexpectedEof);
    }

    let len: usize = std::str::from_utf8(&data[start..*pos])
        .ok()
        .filter(|s| s.bytes().all(|c| c.is_ascii_digit()))
        .and_then(|s| s.parse().ok())
        .ok_or(BencodeError::InvalidStringLength(start))?;

    *pos += 1;

    let end = pos
        .checked_add(len)
        .filter(|end| *end <= data.len())
        .ok_or(BencodeError::UnexpectedEof)?;

    let bytes = Bytes::copy_from_slice(&data[*pos..end]);
    *pos = end;

    Ok(Value::Bytes(bytes))
}

fn decode_list(data: &[u8], pos: &mut usize, depth: usize) -> Result<Value, BencodeError> {
    *pos += 1;
    let mut list = Vec::new();

    while *pos < data.len() && data[*pos] != b'e' {
        list.push(decode_value(data, pos, depth + 1)?);
    }

    if *pos >= data.len() {
        return Err(BencodeError::UnexpectedEof);
    }

    *pos += 1;
    Ok(Value::List(list))
}

fn decode_dict(data: &[u8], pos: &mut usize, depth: usize) -> Result<Value, BencodeError> {
    *pos += 1;
    let mut dict = BTreeMap::new();

    while *pos < data.len() && data[*pos] != b'e' {
        let key_pos = *pos;
        let key = match decode_value(data, pos, depth + 1)? {
            Value::Bytes(b) => b,
            _ => return Err(BencodeError::NonStringKey(key_pos)),
        };

        let value = decode_value(data, pos, depth + 1)?;
        dict.insert(key, value);
    }

    if *pos >= data.len() {
        return Err(BencodeError::UnexpectedEof);
    }

    *pos += 1;
    Ok(Value::Dict(dict))
}
