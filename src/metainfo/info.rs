use super::error::MetainfoError;
use super::fields::{self, resolve_alias};
use super::layout::{single_file_span, FileLayout, PieceSpan};
use super::path::sanitize_path;
use super::piece_hashes::PieceHashes;
use crate::bencode::Value;
use crate::constants::{MAX_USUAL_PIECE_LENGTH, MIN_USUAL_PIECE_LENGTH};
use bytes::Bytes;
use std::collections::BTreeMap;
use std::num::NonZeroU64;
use std::path::PathBuf;
use tracing::{trace, warn};

/// The info dictionary from a torrent file.
///
/// Contains the core metadata that identifies the torrent content. The
/// SHA-1 hash of this dictionary's source bytes is the info hash.
#[derive(Debug, Clone)]
pub struct Info {
    /// Display name. For a single-file torrent this is also the file name,
    /// for a multi-file torrent it is the root directory name.
    pub name: String,
    /// Number of bytes per piece.
    pub piece_length: u64,
    /// SHA-1 digest of each piece.
    pub pieces: PieceHashes,
    /// Files in declared order. Never empty.
    pub files: Vec<File>,
    /// Total size of all files combined.
    pub total_length: u64,
    /// If true, clients should only use the trackers in the metainfo (no DHT/PEX).
    pub private: bool,
    pub publisher: String,
    pub publisher_url: String,
    /// Tracker-specific source tag, used to give cross-seeded torrents distinct info hashes.
    pub source: String,
    /// Whole-content SHA-1, when the creator supplied one.
    pub sha1: Option<Bytes>,
    /// Whole-content eD2k hash, when the creator supplied one.
    pub ed2k: Option<Bytes>,
    single_file: bool,
}

/// A file within a torrent and the pieces it occupies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    /// Path relative to the torrent root. Never absolute, never escapes the root.
    pub path: PathBuf,
    /// Size of the file in bytes.
    pub length: u64,
    /// Byte offset of the file within the concatenated piece stream.
    pub offset: u64,
    /// First piece holding data of this file.
    pub start_piece: u64,
    /// Last piece holding data of this file (inclusive).
    pub end_piece: u64,
    /// Offset of the file's first byte within `start_piece`.
    pub offset_in_first_piece: u64,
    pub md5: Option<Bytes>,
    pub ed2k: Option<Bytes>,
    pub sha1: Option<Bytes>,
}

impl File {
    fn new(path: PathBuf, length: u64, offset: u64, span: PieceSpan, digests: Digests) -> Self {
        Self {
            path,
            length,
            offset,
            start_piece: span.start_piece,
            end_piece: span.end_piece,
            offset_in_first_piece: span.offset_in_first_piece,
            md5: digests.md5,
            ed2k: digests.ed2k,
            sha1: digests.sha1,
        }
    }

    /// Returns true if piece `index` holds bytes of this file.
    pub fn contains_piece(&self, index: u64) -> bool {
        self.length > 0 && (self.start_piece..=self.end_piece).contains(&index)
    }
}

struct Digests {
    md5: Option<Bytes>,
    ed2k: Option<Bytes>,
    sha1: Option<Bytes>,
}

impl Digests {
    fn read(
        md5: Option<&Value>,
        ed2k: Option<&Value>,
        sha1: Option<&Value>,
    ) -> Result<Self, MetainfoError> {
        Ok(Self {
            md5: fields::opt_bytes(md5, "md5sum")?,
            ed2k: fields::opt_bytes(ed2k, "ed2k")?,
            sha1: fields::opt_bytes(sha1, "sha1")?,
        })
    }
}

/// Recognized keys of the info dictionary, gathered in one pass before
/// anything is interpreted.
#[derive(Default)]
struct InfoFields<'a> {
    name: Option<&'a Value>,
    name_utf8: Option<&'a Value>,
    piece_length: Option<&'a Value>,
    pieces: Option<&'a Value>,
    length: Option<&'a Value>,
    files: Option<&'a Value>,
    private: Option<&'a Value>,
    publisher: Option<&'a Value>,
    publisher_utf8: Option<&'a Value>,
    publisher_url: Option<&'a Value>,
    publisher_url_utf8: Option<&'a Value>,
    source: Option<&'a Value>,
    md5sum: Option<&'a Value>,
    sha1: Option<&'a Value>,
    ed2k: Option<&'a Value>,
}

impl<'a> InfoFields<'a> {
    fn collect(dict: &'a BTreeMap<Bytes, Value>) -> Self {
        let mut found = Self::default();
        for (key, value) in dict {
            let slot = match key.as_ref() {
                b"name" => &mut found.name,
                b"name.utf-8" => &mut found.name_utf8,
                b"piece length" => &mut found.piece_length,
                b"pieces" => &mut found.pieces,
                b"length" => &mut found.length,
                b"files" => &mut found.files,
                b"private" => &mut found.private,
                b"publisher" => &mut found.publisher,
                b"publisher.utf-8" => &mut found.publisher_utf8,
                b"publisher-url" => &mut found.publisher_url,
                b"publisher-url.utf-8" => &mut found.publisher_url_utf8,
                b"source" => &mut found.source,
                b"md5sum" => &mut found.md5sum,
                b"sha1" => &mut found.sha1,
                b"ed2k" => &mut found.ed2k,
                _ => continue,
            };
            *slot = Some(value);
        }
        found
    }
}

/// Recognized keys of one entry of the `files` list.
#[derive(Default)]
struct FileFields<'a> {
    length: Option<&'a Value>,
    path: Option<&'a Value>,
    path_utf8: Option<&'a Value>,
    md5sum: Option<&'a Value>,
    ed2k: Option<&'a Value>,
    sha1: Option<&'a Value>,
}

impl<'a> FileFields<'a> {
    fn collect(dict: &'a BTreeMap<Bytes, Value>) -> Self {
        let mut found = Self::default();
        for (key, value) in dict {
            let slot = match key.as_ref() {
                b"length" => &mut found.length,
                b"path" => &mut found.path,
                b"path.utf-8" => &mut found.path_utf8,
                b"md5sum" => &mut found.md5sum,
                b"ed2k" => &mut found.ed2k,
                b"sha1" => &mut found.sha1,
                _ => continue,
            };
            *slot = Some(value);
        }
        found
    }

    /// Path segments, preferring a non-empty `path.utf-8`.
    fn segments(&self) -> Result<Vec<String>, MetainfoError> {
        if let Some(value) = self.path_utf8 {
            let segments = fields::string_list(value, "path.utf-8")?;
            if !segments.is_empty() {
                return Ok(segments);
            }
        }

        let value = self.path.ok_or(MetainfoError::MissingField("path"))?;
        fields::string_list(value, "path")
    }
}

impl Info {
    /// Interprets a decoded info dictionary.
    ///
    /// # Errors
    ///
    /// Fails if `piece length` is missing or not positive, if `pieces` is
    /// missing or not a whole number of digests, if a single-file torrent
    /// has no `length`, if any file path is unsafe, or if a file ends in a
    /// piece without a hash.
    pub fn from_value(value: &Value) -> Result<Self, MetainfoError> {
        let dict = fields::dict(value, "info")?;
        let keys = InfoFields::collect(dict);

        // Every file's layout depends on these two.
        let piece_length = parse_piece_length(keys.piece_length)?;
        let pieces = keys.pieces.ok_or(MetainfoError::MissingField("pieces"))?;
        let pieces = PieceHashes::from_bytes(&fields::bytes(pieces, "pieces")?)?;

        let name = resolve_alias(
            fields::opt_string(keys.name, "name")?,
            fields::opt_string(keys.name_utf8, "name.utf-8")?,
        );
        let publisher = resolve_alias(
            fields::opt_string(keys.publisher, "publisher")?,
            fields::opt_string(keys.publisher_utf8, "publisher.utf-8")?,
        );
        let publisher_url = resolve_alias(
            fields::opt_string(keys.publisher_url, "publisher-url")?,
            fields::opt_string(keys.publisher_url_utf8, "publisher-url.utf-8")?,
        );
        let source = fields::opt_string(keys.source, "source")?.unwrap_or_default();

        let private = match keys.private {
            Some(v) => fields::integer(v, "private")? == 1,
            None => false,
        };

        let (files, total_length, single_file) = match keys.files {
            Some(files) => {
                check_root_name(&name)?;
                let (files, total) = layout_files(fields::list(files, "files")?, piece_length)?;
                (files, total, false)
            }
            None => {
                let length = keys.length.ok_or(MetainfoError::MissingField("length"))?;
                let length = fields::length(length, "length")?;
                let digests = Digests::read(keys.md5sum, keys.ed2k, keys.sha1)?;
                let file = single_file_entry(&name, length, piece_length, pieces.len(), digests)?;
                (vec![file], length, true)
            }
        };

        check_piece_bounds(&files, &pieces)?;

        Ok(Info {
            name,
            piece_length: piece_length.get(),
            pieces,
            files,
            total_length,
            private,
            publisher,
            publisher_url,
            source,
            sha1: fields::opt_bytes(keys.sha1, "sha1")?,
            ed2k: fields::opt_bytes(keys.ed2k, "ed2k")?,
            single_file,
        })
    }

    /// Returns the number of pieces.
    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    /// Returns the size of piece `index`; only the last piece may be shorter
    /// than `piece_length`.
    pub fn piece_size(&self, index: usize) -> Option<u64> {
        if index >= self.pieces.len() {
            return None;
        }
        let start = (index as u64).checked_mul(self.piece_length)?;
        let remaining = self.total_length.checked_sub(start)?;
        Some(remaining.min(self.piece_length))
    }

    /// Returns the files holding bytes of piece `index`, in declared order.
    pub fn files_for_piece(&self, index: usize) -> impl Iterator<Item = &File> {
        let index = index as u64;
        self.files.iter().filter(move |f| f.contains_piece(index))
    }

    /// Returns true if the torrent describes one file rather than a directory.
    pub fn is_single_file(&self) -> bool {
        self.single_file
    }
}

fn parse_piece_length(value: Option<&Value>) -> Result<NonZeroU64, MetainfoError> {
    let value = value.ok_or(MetainfoError::MissingField("piece length"))?;
    let piece_length = fields::integer(value, "piece length")?;
    let piece_length = u64::try_from(piece_length)
        .ok()
        .and_then(NonZeroU64::new)
        .ok_or(MetainfoError::InvalidField("piece length"))?;

    if !(MIN_USUAL_PIECE_LENGTH..=MAX_USUAL_PIECE_LENGTH).contains(&piece_length.get()) {
        warn!(
            "Unusual piece length {} (typical range: {} - {})",
            piece_length, MIN_USUAL_PIECE_LENGTH, MAX_USUAL_PIECE_LENGTH
        );
    }

    Ok(piece_length)
}

fn single_file_entry(
    name: &str,
    length: u64,
    piece_length: NonZeroU64,
    piece_count: usize,
    digests: Digests,
) -> Result<File, MetainfoError> {
    let path = check_root_name(name)?;
    let span = single_file_span(length, piece_length, piece_count);
    Ok(File::new(path, length, 0, span, digests))
}

/// Validates `name`, which is the file itself in a single-file torrent and
/// the directory every file sits under in a multi-file one.
fn check_root_name(name: &str) -> Result<PathBuf, MetainfoError> {
    if name.is_empty() {
        return Err(MetainfoError::MissingField("name"));
    }
    sanitize_path(&[name])
}

/// Walks the `files` list in declared order, threading the running byte
/// offset through [`FileLayout`].
fn layout_files(
    entries: &[Value],
    piece_length: NonZeroU64,
) -> Result<(Vec<File>, u64), MetainfoError> {
    if entries.is_empty() {
        return Err(MetainfoError::InvalidField("files"));
    }

    let (layout, files) = entries.iter().try_fold(
        (FileLayout::new(piece_length), Vec::with_capacity(entries.len())),
        |(layout, mut files), entry| {
            let keys = FileFields::collect(fields::dict(entry, "files")?);

            let length = keys.length.ok_or(MetainfoError::MissingField("length"))?;
            let length = fields::length(length, "length")?;
            let path = sanitize_path(&keys.segments()?)?;
            let digests = Digests::read(keys.md5sum, keys.ed2k, keys.sha1)?;

            let offset = layout.total_length();
            let (layout, span) = layout.advance(length)?;
            trace!(
                "File {} ({} bytes): pieces {}..={}, offset {}",
                path.display(),
                length,
                span.start_piece,
                span.end_piece,
                span.offset_in_first_piece
            );

            files.push(File::new(path, length, offset, span, digests));
            Ok::<_, MetainfoError>((layout, files))
        },
    )?;

    Ok((files, layout.total_length()))
}

fn check_piece_bounds(files: &[File], pieces: &PieceHashes) -> Result<(), MetainfoError> {
    match files
        .iter()
        .enumerate()
        .find(|(_, f)| f.end_piece >= pieces.len() as u64)
    {
        Some((index, file)) => Err(MetainfoError::PieceCountMismatch {
            file: index,
            end_piece: file.end_piece,
            piece_count: pieces.len(),
        }),
        None => Ok(()),
    }
}
