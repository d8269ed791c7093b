//! Embedding tables and id codecs.
//!
//! Two core abstractions for working with precomputed embedding artifacts:
//!
//! - EmbeddingTable: a dense, read-only matrix of item vectors indexed by
//!   encoded index 0..N-1, with allocation-free dot products against a
//!   query slice.
//! - IdCodec: the bidirectional mapping between an external entity id
//!   (anime_id or user_id, sparse) and the dense encoded index of its row.
//!
//! Both are frozen after construction; every operation is a read. The
//! constructors enforce shape invariants with panics because in-memory
//! assembly is a programmer contract; external artifacts are validated
//! before these constructors run (see [`crate::store`]), where violations
//! surface as [`crate::error::ArtifactError`] instead.

use std::collections::HashMap;

use smartcore::linalg::basic::arrays::{Array, Array2};
use smartcore::linalg::basic::matrix::DenseMatrix;

use log::debug;

/// A dense, read-only table of equal-length embedding vectors.
///
/// Rows are items in encoded-index order; columns are vector dimensions.
///
/// # Examples
///
/// ```
/// use anirec::embedding::EmbeddingTable;
///
/// let table = EmbeddingTable::from_rows(vec![
///     vec![1.0, 0.0],
///     vec![0.9, 0.1],
///     vec![-1.0, 0.0],
/// ]);
/// assert_eq!(table.shape(), (3, 2));
/// assert_eq!(table.dot_row(0, &[1.0, 0.0]), 1.0);
/// ```
///
/// # Panics
///
/// - Constructors panic on empty input or inconsistent row lengths.
/// - Row accessors panic on out-of-bounds indices.
#[derive(Clone, Debug)]
pub struct EmbeddingTable {
    data: DenseMatrix<f64>,
    nitems: usize,
    nfeatures: usize,
}

impl EmbeddingTable {
    /// Builds a table from item rows, validating a consistent width.
    ///
    /// # Panics
    ///
    /// - If `rows` is empty.
    /// - If rows have differing lengths.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Self {
        assert!(!rows.is_empty(), "embedding table cannot be empty");
        let nitems = rows.len();
        let nfeatures = rows[0].len();
        assert!(nfeatures > 0, "embedding rows cannot be zero-length");
        assert!(
            rows.iter().all(|row| row.len() == nfeatures),
            "all embedding rows must have the same length"
        );

        let data = DenseMatrix::from_2d_vec(&rows).unwrap();
        debug!("EmbeddingTable built: {} items x {} features", nitems, nfeatures);
        Self { data, nitems, nfeatures }
    }

    /// Number of item rows.
    #[inline]
    pub fn nitems(&self) -> usize {
        self.nitems
    }

    /// Vector dimensionality.
    #[inline]
    pub fn nfeatures(&self) -> usize {
        self.nfeatures
    }

    /// Returns (nitems, nfeatures).
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.nitems, self.nfeatures)
    }

    /// Returns an owned copy of the requested item row.
    ///
    /// # Panics
    ///
    /// Panics if `item >= nitems`.
    #[inline]
    pub fn row(&self, item: usize) -> Vec<f64> {
        assert!(item < self.nitems, "item index out of bounds");
        self.data.get_row(item).iterator(0).copied().collect()
    }

    /// Single matrix entry.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    #[inline]
    pub fn value(&self, item: usize, feature: usize) -> f64 {
        assert!(item < self.nitems, "item index out of bounds");
        assert!(feature < self.nfeatures, "feature index out of bounds");
        *self.data.get((item, feature))
    }

    /// Dot product between the requested row and a query slice, without
    /// allocating the row.
    ///
    /// # Panics
    ///
    /// Panics if `item >= nitems` or the query length differs from the
    /// table width.
    #[inline]
    pub fn dot_row(&self, item: usize, query: &[f64]) -> f64 {
        assert!(item < self.nitems, "item index out of bounds");
        assert_eq!(query.len(), self.nfeatures, "query dimension mismatch");
        self.data
            .get_row(item)
            .iterator(0)
            .zip(query.iter())
            .map(|(a, b)| a * b)
            .sum()
    }
}

/// Bidirectional mapping between external ids and encoded indices.
///
/// Total on the table it pairs with: every id maps to exactly one encoded
/// index and every encoded index decodes to exactly one id.
///
/// # Examples
///
/// ```
/// use anirec::embedding::IdCodec;
///
/// let codec = IdCodec::from_pairs(vec![(199, 0), (5, 1), (430, 2)]);
/// assert_eq!(codec.encode(5), Some(1));
/// assert_eq!(codec.decode(2), Some(430));
/// assert_eq!(codec.encode(7), None);
/// ```
#[derive(Clone, Debug, Default)]
pub struct IdCodec {
    encode: HashMap<i64, usize>,
    decode: HashMap<usize, i64>,
}

impl IdCodec {
    /// Builds a codec from (external id, encoded index) pairs.
    ///
    /// # Panics
    ///
    /// Panics if any id or any index appears more than once.
    pub fn from_pairs(pairs: Vec<(i64, usize)>) -> Self {
        let mut encode = HashMap::with_capacity(pairs.len());
        let mut decode = HashMap::with_capacity(pairs.len());
        for (id, index) in pairs {
            let stale = encode.insert(id, index);
            assert!(stale.is_none(), "duplicate id {} in codec", id);
            let stale = decode.insert(index, id);
            assert!(stale.is_none(), "duplicate encoded index {} in codec", index);
        }
        debug!("IdCodec built with {} entries", encode.len());
        Self { encode, decode }
    }

    /// External id to encoded index; `None` when the id is not in the
    /// embedding domain.
    #[inline]
    pub fn encode(&self, id: i64) -> Option<usize> {
        self.encode.get(&id).copied()
    }

    /// Encoded index back to external id; `None` when out of the domain.
    #[inline]
    pub fn decode(&self, index: usize) -> Option<i64> {
        self.decode.get(&index).copied()
    }

    /// Number of mapped entities.
    #[inline]
    pub fn len(&self) -> usize {
        self.encode.len()
    }

    /// True when the codec maps nothing.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.encode.is_empty()
    }
}
