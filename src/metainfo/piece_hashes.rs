use super::error::MetainfoError;
use crate::constants::PIECE_HASH_LEN;
use sha1::{Digest, Sha1};
use std::ops::Index;

/// One SHA-1 digest per piece, indexed by piece number.
///
/// Built from the `pieces` blob of an info dictionary, which is the
/// concatenation of every piece's digest.
#[derive(Clone, PartialEq, Eq)]
pub struct PieceHashes(Vec<[u8; PIECE_HASH_LEN]>);

impl PieceHashes {
    /// Splits a `pieces` blob into digests.
    ///
    /// # Errors
    ///
    /// Returns [`MetainfoError::InvalidPieceData`] if the blob length is not
    /// a multiple of 20.
    pub fn from_bytes(blob: &[u8]) -> Result<Self, MetainfoError> {
        if blob.len() % PIECE_HASH_LEN != 0 {
            return Err(MetainfoError::InvalidPieceData { len: blob.len() });
        }

        let hashes = blob
            .chunks_exact(PIECE_HASH_LEN)
            .map(|chunk| {
                let mut arr = [0u8; PIECE_HASH_LEN];
                arr.copy_from_slice(chunk);
                arr
            })
            .collect();

        Ok(PieceHashes(hashes))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&[u8; PIECE_HASH_LEN]> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, [u8; PIECE_HASH_LEN]> {
        self.0.iter()
    }

    /// Checks `data` against the digest of piece `index`.
    ///
    /// Returns `false` for an index with no digest.
    pub fn verify(&self, index: usize, data: &[u8]) -> bool {
        match self.get(index) {
            Some(expected) => {
                let actual: [u8; PIECE_HASH_LEN] = Sha1::digest(data).into();
                actual == *expected
            }
            None => false,
        }
    }
}

impl Index<usize> for PieceHashes {
    type Output = [u8; PIECE_HASH_LEN];

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl<'a> IntoIterator for &'a PieceHashes {
    type Item = &'a [u8; PIECE_HASH_LEN];
    type IntoIter = std::slice::Iter<'a, [u8; PIECE_HASH_LEN]>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl std::fmt::Debug for PieceHashes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PieceHashes({} pieces)", self.0.len())
    }
}
