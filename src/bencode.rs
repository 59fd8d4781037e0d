//! Bencode encoding and decoding ([BEP-3]).
//!
//! Bencode is the serialization format of `.torrent` files. This module
//! turns raw bytes into a [`Value`] tree and back, and can locate the raw
//! source slice of a top-level dictionary entry with [`find_raw_value`],
//! which is what the info-hash is computed from.
//!
//! | Type | Format | Example |
//! |------|--------|---------|
//! | Integer | `i<number>e` | `i42e` → 42 |
//! | Byte String | `<length>:<data>` | `4:spam` → "spam" |
//! | List | `l<items>e` | `l4:spami42ee` → ["spam", 42] |
//! | Dictionary | `d<key><value>...e` | `d3:foo3:bare` → {"foo": "bar"} |
//!
//! ```
//! use torrent_metainfo::bencode::{decode, encode};
//!
//! let value = decode(b"d3:cow3:moo4:spam4:eggse").unwrap();
//! assert_eq!(value.get(b"cow").and_then(|v| v.as_str()), Some("moo"));
//! assert_eq!(encode(&value).unwrap(), b"d3:cow3:moo4:spam4:eggse");
//! ```
//!
//! Decoding rejects leading zeros and negative zero in integers, string
//! lengths that run past the input, non-string dictionary keys, trailing
//! data and nesting deeper than [`MAX_DEPTH`](crate::constants::MAX_DEPTH).
//!
//! [BEP-3]: http://bittorrent.org/beps/bep_0003.html

mod decode;
mod encode;
mod error;
mod value;

pub use decode::{decode, find_raw_value};
pub use encode::encode;
pub use error::BencodeError;
pub use value::Value;
