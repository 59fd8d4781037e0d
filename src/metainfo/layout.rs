//! Mapping of files onto the piece stream.
//!
//! The files of a torrent are concatenated in declared order into one
//! byte stream that is cut into fixed-size pieces. These functions work
//! out which pieces each file touches.

use super::error::MetainfoError;
use std::num::NonZeroU64;

/// The pieces a file occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceSpan {
    /// Index of the piece holding the file's first byte.
    pub start_piece: u64,
    /// Index of the piece holding the file's last byte (inclusive).
    pub end_piece: u64,
    /// Byte offset of the file's first byte within `start_piece`.
    pub offset_in_first_piece: u64,
}

/// Computes the span of a file that starts `running_offset` bytes into the
/// stream.
///
/// A zero-length file has no bytes of its own; it is placed on
/// `previous_end`, the end piece of the file before it (piece 0 for the
/// first file). A file that ends exactly on a piece boundary does not
/// claim the following piece.
pub fn piece_span(
    running_offset: u64,
    length: u64,
    piece_length: NonZeroU64,
    previous_end: Option<u64>,
) -> PieceSpan {
    let piece_length = piece_length.get();
    let offset_in_first_piece = running_offset % piece_length;

    if length == 0 {
        let piece = previous_end.unwrap_or(0);
        return PieceSpan {
            start_piece: piece,
            end_piece: piece,
            offset_in_first_piece,
        };
    }

    let end_offset = running_offset.saturating_add(length);
    let mut end_piece = end_offset / piece_length;
    if end_offset % piece_length == 0 {
        end_piece -= 1;
    }

    PieceSpan {
        start_piece: running_offset / piece_length,
        end_piece,
        offset_in_first_piece,
    }
}

/// Computes the span of the only file of a single-file torrent.
///
/// Unlike [`piece_span`], the end piece is `ceil(length / piece_length)`
/// clamped to the last hashed piece. When the length is an exact multiple
/// of the piece length the unclamped value is one past the general
/// formula.
pub fn single_file_span(length: u64, piece_length: NonZeroU64, piece_count: usize) -> PieceSpan {
    let last_piece = (piece_count as u64).saturating_sub(1);
    PieceSpan {
        start_piece: 0,
        end_piece: last_piece.min(length.div_ceil(piece_length.get())),
        offset_in_first_piece: 0,
    }
}

/// Fold state threaded through the files of a multi-file torrent.
///
/// Each [`advance`](FileLayout::advance) consumes the state and returns the
/// span of the next file together with the state for the file after it.
#[derive(Debug, Clone, Copy)]
pub struct FileLayout {
    piece_length: NonZeroU64,
    running_offset: u64,
    previous_end: Option<u64>,
}

impl FileLayout {
    pub fn new(piece_length: NonZeroU64) -> Self {
        Self {
            piece_length,
            running_offset: 0,
            previous_end: None,
        }
    }

    /// Places a file of `length` bytes after everything placed so far.
    ///
    /// # Errors
    ///
    /// Returns [`MetainfoError::InvalidField`] if the total size overflows.
    pub fn advance(self, length: u64) -> Result<(Self, PieceSpan), MetainfoError> {
        let running_offset = self
            .running_offset
            .checked_add(length)
            .ok_or(MetainfoError::InvalidField("length"))?;

        let span = piece_span(
            self.running_offset,
            length,
            self.piece_length,
            self.previous_end,
        );

        let next = Self {
            piece_length: self.piece_length,
            running_offset,
            previous_end: Some(span.end_piece),
        };

        Ok((next, span))
    }

    /// Bytes placed so far.
    pub fn total_length(&self) -> u64 {
        self.running_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pl(n: u64) -> NonZeroU64 {
        NonZeroU64::new(n).unwrap()
    }

    fn layout(lengths: &[u64], piece_length: u64) -> Vec<PieceSpan> {
        let mut state = FileLayout::new(pl(piece_length));
        let mut spans = Vec::new();
        for &length in lengths {
            let (next, span) = state.advance(length).unwrap();
            spans.push(span);
            state = next;
        }
        spans
    }

    #[test]
    fn test_file_ending_on_boundary_keeps_its_last_piece() {
        let span = piece_span(0, 512, pl(512), None);
        assert_eq!(
            span,
            PieceSpan {
                start_piece: 0,
                end_piece: 0,
                offset_in_first_piece: 0
            }
        );
    }

    #[test]
    fn test_file_straddling_pieces() {
        let span = piece_span(300, 500, pl(512), Some(0));
        assert_eq!(span.start_piece, 0);
        assert_eq!(span.end_piece, 1);
        assert_eq!(span.offset_in_first_piece, 300);
    }

    #[test]
    fn test_multi_file_packing() {
        let spans = layout(&[512, 256, 256], 512);
        assert_eq!((spans[0].start_piece, spans[0].end_piece), (0, 0));
        assert_eq!(spans[0].offset_in_first_piece, 0);
        assert_eq!((spans[1].start_piece, spans[1].end_piece), (1, 1));
        assert_eq!(spans[1].offset_in_first_piece, 0);
        assert_eq!((spans[2].start_piece, spans[2].end_piece), (1, 1));
        assert_eq!(spans[2].offset_in_first_piece, 256);
    }

    #[test]
    fn test_zero_length_file_sits_on_previous_end() {
        let span = piece_span(2000, 0, pl(512), Some(3));
        assert_eq!((span.start_piece, span.end_piece), (3, 3));
        assert_eq!(span.offset_in_first_piece, 2000 % 512);
    }

    #[test]
    fn test_zero_length_first_file() {
        let spans = layout(&[0, 100], 64);
        assert_eq!((spans[0].start_piece, spans[0].end_piece), (0, 0));
        assert_eq!((spans[1].start_piece, spans[1].end_piece), (0, 1));
    }

    #[test]
    fn test_zero_length_after_boundary_aligned_file() {
        // The empty file stays on piece 0 even though the stream is now at
        // the start of piece 1.
        let spans = layout(&[512, 0, 10], 512);
        assert_eq!((spans[1].start_piece, spans[1].end_piece), (0, 0));
        assert_eq!(spans[1].offset_in_first_piece, 0);
        assert_eq!((spans[2].start_piece, spans[2].end_piece), (1, 1));
    }

    #[test]
    fn test_consecutive_files_are_contiguous() {
        let spans = layout(&[700, 10, 0, 1300, 1, 511, 512], 512);
        for pair in spans.windows(2) {
            let gap = pair[1].start_piece - pair[0].end_piece;
            assert!(gap <= 1, "gap of {} pieces between {:?}", gap, pair);
        }
    }

    #[test]
    fn test_single_file_formula_quirk() {
        // 1024 bytes in two 512-byte pieces: ceil gives 2, clamped to 1.
        let span = single_file_span(1024, pl(512), 2);
        assert_eq!(
            span,
            PieceSpan {
                start_piece: 0,
                end_piece: 1,
                offset_in_first_piece: 0
            }
        );

        // With a spare hash the unclamped value shows through and overshoots
        // the general formula by one.
        assert_eq!(single_file_span(1024, pl(512), 3).end_piece, 2);
        assert_eq!(piece_span(0, 1024, pl(512), None).end_piece, 1);
    }

    #[test]
    fn test_single_file_partial_last_piece() {
        assert_eq!(single_file_span(1000, pl(512), 2).end_piece, 1);
        assert_eq!(single_file_span(100, pl(512), 1).end_piece, 0);
    }

    #[test]
    fn test_total_overflow_is_rejected() {
        let state = FileLayout::new(pl(512));
        let (state, _) = state.advance(u64::MAX).unwrap();
        assert!(state.advance(1).is_err());
    }

    #[test]
    fn test_total_length() {
        let state = FileLayout::new(pl(16));
        let (state, _) = state.advance(10).unwrap();
        let (state, _) = state.advance(0).unwrap();
        let (state, _) = state.advance(7).unwrap();
        assert_eq!(state.total_length(), 17);
    }
}
