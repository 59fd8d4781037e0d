//! Torrent metainfo handling ([BEP-3], [BEP-12], [BEP-19]).
//!
//! Turns the bytes of a `.torrent` file into a [`Metainfo`]: validated file
//! list, per-file piece spans, tracker tiers and the info hash.
//!
//! # Examples
//!
//! ```no_run
//! use torrent_metainfo::metainfo::Metainfo;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = std::fs::read("example.torrent")?;
//! let torrent = Metainfo::from_bytes(&data)?;
//!
//! println!("Name: {}", torrent.info.name);
//! println!("Info hash: {}", torrent.info_hash);
//! println!("Number of pieces: {}", torrent.info.piece_count());
//!
//! for file in &torrent.info.files {
//!     println!("  {} ({} bytes)", file.path.display(), file.length);
//! }
//!
//! for tracker in torrent.trackers() {
//!     println!("Tracker: {}", tracker);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Piece layout
//!
//! Files are laid end to end in declared order and the resulting stream is
//! cut into `piece length` chunks. Each [`File`] records the first and last
//! piece holding its bytes. A zero-length file is placed on the last piece
//! of the file before it.
//!
//! # Info hash
//!
//! The [`InfoHash`] is the SHA-1 of the info dictionary exactly as it
//! appears in the source, so torrents with non-canonical encoding keep the
//! hash every other client computes for them.
//!
//! [BEP-3]: http://bittorrent.org/beps/bep_0003.html
//! [BEP-12]: http://bittorrent.org/beps/bep_0012.html
//! [BEP-19]: http://bittorrent.org/beps/bep_0019.html

mod error;
mod fetch;
mod fields;
mod info;
mod info_hash;
mod layout;
mod path;
mod piece_hashes;
mod torrent;

pub use error::MetainfoError;
pub use fetch::{fetch_to_file, FetchConfig};
pub use fields::resolve_alias;
pub use info::{File, Info};
pub use info_hash::InfoHash;
pub use layout::{piece_span, single_file_span, FileLayout, PieceSpan};
pub use path::sanitize_path;
pub use piece_hashes::PieceHashes;
pub use torrent::{creation_date_from_timestamp, Metainfo};
