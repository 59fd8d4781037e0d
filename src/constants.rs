//! Limits and tuning parameters.
//!
//! Defaults used when reading, fetching and interpreting `.torrent` files.

use std::time::Duration;

// ============================================================================
// Client identification
// ============================================================================

/// User agent string for HTTP requests
pub const USER_AGENT: &str = concat!("torrent-metainfo/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Decoding limits
// ============================================================================

/// Maximum nesting depth of lists and dictionaries accepted by the decoder
pub const MAX_DEPTH: usize = 64;

/// Largest `.torrent` file read from disk or fetched over HTTP (16 MiB)
pub const MAX_METAINFO_SIZE: u64 = 16 * 1024 * 1024;

/// Length of a SHA-1 digest, the size of every entry in `pieces`
pub const PIECE_HASH_LEN: usize = 20;

// ============================================================================
// Piece length sanity range
// ============================================================================

/// Smallest piece length considered usual (16 KiB); smaller ones are only logged
pub const MIN_USUAL_PIECE_LENGTH: u64 = 16 * 1024;

/// Largest piece length considered usual (64 MiB); larger ones are only logged
pub const MAX_USUAL_PIECE_LENGTH: u64 = 64 * 1024 * 1024;

// ============================================================================
// Creation date range
// ============================================================================

/// 0001-01-01T00:00:00Z as Unix seconds, the earliest accepted creation date
pub const MIN_CREATION_DATE_SECS: i64 = -62_135_596_800;

/// 9999-12-31T23:59:59Z as Unix seconds, the latest accepted creation date
pub const MAX_CREATION_DATE_SECS: i64 = 253_402_300_799;

// ============================================================================
// Remote fetch
// ============================================================================

/// Timeout for establishing the HTTP connection when fetching a `.torrent`
pub const FETCH_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for the whole HTTP request when fetching a `.torrent`
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
