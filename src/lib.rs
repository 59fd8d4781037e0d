//! torrent-metainfo - A BitTorrent metainfo interpreter
//!
//! Reads `.torrent` files and exposes what a client needs before it can
//! start downloading: the file list, where every file sits in the piece
//! stream, the piece hashes, the tracker tiers and the info hash.
//!
//! # Modules
//!
//! - [`bencode`] - BEP-3 Bencode encoding/decoding
//! - [`metainfo`] - Torrent metainfo, piece layout and info hash
//! - [`constants`] - Decoding limits and fetch defaults

pub mod bencode;
pub mod constants;
pub mod metainfo;

pub use bencode::{decode, encode, BencodeError, Value};
pub use metainfo::{
    fetch_to_file, FetchConfig, File, Info, InfoHash, Metainfo, MetainfoError, PieceHashes,
};
