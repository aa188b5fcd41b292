use std::collections::BTreeMap;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::index::Column;
use crate::DocId;

/// An independently scannable slice of the index.
///
/// Columns are shared behind `Arc` so that value accessors can hold on to
/// them after the driver has moved past the `set_segment` call.
pub struct SegmentReader {
    max_doc: DocId,
    columns: FxHashMap<String, Arc<Column>>,
    postings: FxHashMap<String, BTreeMap<String, Vec<DocId>>>,
}

impl SegmentReader {
    pub(crate) fn new(
        max_doc: DocId,
        columns: FxHashMap<String, Arc<Column>>,
        postings: FxHashMap<String, BTreeMap<String, Vec<DocId>>>,
    ) -> SegmentReader {
        SegmentReader {
            max_doc,
            columns,
            postings,
        }
    }

    /// Returns the number of documents in the segment.
    ///
    /// Documents are numbered `0..max_doc`, local to the segment.
    pub fn max_doc(&self) -> DocId {
        self.max_doc
    }

    /// Returns the column of the given field, if any document of this
    /// segment carries it.
    pub fn column(&self, field: &str) -> Option<&Arc<Column>> {
        self.columns.get(field)
    }

    /// Returns the sorted doc ids holding `term` in the given indexed text
    /// field.
    pub fn postings(&self, field: &str, term: &str) -> Option<&[DocId]> {
        self.postings.get(field)?.get(term).map(Vec::as_slice)
    }
}
