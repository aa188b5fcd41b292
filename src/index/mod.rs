//! A minimal in-memory index: columnar value storage plus per-field
//! postings, split into segments.
//!
//! This is the substrate the search driver and the collectors run against.
//! Group keys, count values and sort keys are all read from [`Column`]s;
//! term matching goes through the postings.

mod column;
mod segment;
mod writer;

pub use self::column::{Column, ColumnType};
pub use self::segment::SegmentReader;
pub use self::writer::{Document, IndexBuilder};

use crate::Searcher;

/// A searchable set of sealed segments.
pub struct Index {
    segments: Vec<SegmentReader>,
}

impl Index {
    pub(crate) fn new(segments: Vec<SegmentReader>) -> Index {
        Index { segments }
    }

    /// The index's segments, in the order they are scanned.
    pub fn segments(&self) -> &[SegmentReader] {
        &self.segments
    }

    /// Returns a searcher over this index.
    pub fn searcher(&self) -> Searcher<'_> {
        Searcher::new(self)
    }
}
