//! Queries select the documents pushed to the collectors.
//!
//! Query parsing and boolean composition live outside this crate; the two
//! implementations here are the forms the grouping engine is driven with.

use crate::index::SegmentReader;
use crate::DocId;

/// A query over one segment at a time.
pub trait Query {
    /// Returns the matching doc ids of the segment, in ascending order.
    fn matching_docs(&self, segment: &SegmentReader) -> crate::Result<Vec<DocId>>;
}

/// Matches the documents holding `term` in an indexed text field.
pub struct TermQuery {
    field: String,
    term: String,
}

impl TermQuery {
    /// Creates a term query.
    pub fn new(field: &str, term: &str) -> TermQuery {
        TermQuery {
            field: field.to_string(),
            term: term.to_string(),
        }
    }
}

impl Query for TermQuery {
    fn matching_docs(&self, segment: &SegmentReader) -> crate::Result<Vec<DocId>> {
        Ok(segment
            .postings(&self.field, &self.term)
            .map(<[DocId]>::to_vec)
            .unwrap_or_default())
    }
}

/// Matches every document.
pub struct AllQuery;

impl Query for AllQuery {
    fn matching_docs(&self, segment: &SegmentReader) -> crate::Result<Vec<DocId>> {
        Ok((0..segment.max_doc()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::{AllQuery, Query, TermQuery};
    use crate::index::{Document, IndexBuilder};

    #[test]
    fn test_term_query() {
        let mut builder = IndexBuilder::new();
        for text in ["random text", "some more text", "random blob"] {
            let mut doc = Document::new();
            doc.add_text("content", text);
            builder.add_document(doc).unwrap();
        }
        let index = builder.build();
        let segment = &index.segments()[0];
        let query = TermQuery::new("content", "random");
        assert_eq!(query.matching_docs(segment).unwrap(), vec![0, 2]);
        let query = TermQuery::new("content", "nothing");
        assert!(query.matching_docs(segment).unwrap().is_empty());
        let query = TermQuery::new("missing_field", "random");
        assert!(query.matching_docs(segment).unwrap().is_empty());
    }

    #[test]
    fn test_all_query() {
        let mut builder = IndexBuilder::new();
        for _ in 0..3 {
            builder.add_document(Document::new()).unwrap();
        }
        let index = builder.build();
        let segment = &index.segments()[0];
        assert_eq!(AllQuery.matching_docs(segment).unwrap(), vec![0, 1, 2]);
    }
}
