use std::collections::BTreeMap;
use std::sync::Arc;

use itertools::Itertools;
use log::info;
use rustc_hash::FxHashMap;

use crate::index::{Column, ColumnType, Index, SegmentReader};
use crate::value::OwnedValue;
use crate::{DocId, GroupingError};

/// A document to be added to an [`IndexBuilder`].
///
/// Text fields are indexed (tokenized on whitespace) and drive term
/// matching; value fields are stored columnar and feed group keys, count
/// values and sort keys. A field left out of a document is simply absent
/// for it.
#[derive(Default)]
pub struct Document {
    texts: Vec<(String, String)>,
    values: Vec<(String, OwnedValue)>,
}

impl Document {
    /// Creates an empty document.
    pub fn new() -> Document {
        Document::default()
    }

    /// Adds an indexed text field.
    pub fn add_text(&mut self, field: &str, text: &str) {
        self.texts.push((field.to_string(), text.to_string()));
    }

    /// Adds a columnar value field. If the document already holds a value
    /// for this field, the last value wins.
    pub fn add_value(&mut self, field: &str, value: impl Into<OwnedValue>) {
        self.values.push((field.to_string(), value.into()));
    }

    /// Adds a columnar string field.
    pub fn add_str(&mut self, field: &str, value: &str) {
        self.add_value(field, value);
    }

    /// Adds a columnar bytes field.
    pub fn add_bytes(&mut self, field: &str, value: &[u8]) {
        self.add_value(field, value);
    }

    /// Adds a columnar i64 field.
    pub fn add_i64(&mut self, field: &str, value: i64) {
        self.add_value(field, value);
    }

    /// Adds a columnar u64 field.
    pub fn add_u64(&mut self, field: &str, value: u64) {
        self.add_value(field, value);
    }

    /// Adds a columnar f64 field.
    pub fn add_f64(&mut self, field: &str, value: f64) {
        self.add_value(field, value);
    }
}

enum ColumnWriter {
    Str(Vec<Option<String>>),
    Bytes(Vec<Option<Vec<u8>>>),
    I64(Vec<Option<i64>>),
    U64(Vec<Option<u64>>),
    F64(Vec<Option<f64>>),
}

fn record_at<T>(vals: &mut Vec<Option<T>>, doc: DocId, value: T) {
    let doc = doc as usize;
    if vals.len() <= doc {
        vals.resize_with(doc + 1, || None);
    }
    vals[doc] = Some(value);
}

fn pad<T>(mut vals: Vec<Option<T>>, num_docs: usize) -> Vec<Option<T>> {
    if vals.len() < num_docs {
        vals.resize_with(num_docs, || None);
    }
    vals
}

impl ColumnWriter {
    fn for_type(typ: ColumnType) -> ColumnWriter {
        match typ {
            ColumnType::Str => ColumnWriter::Str(Vec::new()),
            ColumnType::Bytes => ColumnWriter::Bytes(Vec::new()),
            ColumnType::I64 => ColumnWriter::I64(Vec::new()),
            ColumnType::U64 => ColumnWriter::U64(Vec::new()),
            ColumnType::F64 => ColumnWriter::F64(Vec::new()),
        }
    }

    fn column_type(&self) -> ColumnType {
        match self {
            ColumnWriter::Str(_) => ColumnType::Str,
            ColumnWriter::Bytes(_) => ColumnType::Bytes,
            ColumnWriter::I64(_) => ColumnType::I64,
            ColumnWriter::U64(_) => ColumnType::U64,
            ColumnWriter::F64(_) => ColumnType::F64,
        }
    }

    fn record(&mut self, field: &str, doc: DocId, value: OwnedValue) -> crate::Result<()> {
        match (self, value) {
            (ColumnWriter::Str(vals), OwnedValue::Str(val)) => record_at(vals, doc, val),
            (ColumnWriter::Bytes(vals), OwnedValue::Bytes(val)) => record_at(vals, doc, val),
            (ColumnWriter::I64(vals), OwnedValue::I64(val)) => record_at(vals, doc, val),
            (ColumnWriter::U64(vals), OwnedValue::U64(val)) => record_at(vals, doc, val),
            (ColumnWriter::F64(vals), OwnedValue::F64(val)) => record_at(vals, doc, val),
            (writer, value) => {
                return Err(GroupingError::SchemaError(format!(
                    "field '{}' holds {:?} values, got a {:?} value",
                    field,
                    writer.column_type(),
                    ColumnType::for_value(&value)
                )));
            }
        }
        Ok(())
    }

    fn seal(self, num_docs: usize) -> Column {
        match self {
            ColumnWriter::Str(vals) => Column::Str(pad(vals, num_docs)),
            ColumnWriter::Bytes(vals) => Column::Bytes(pad(vals, num_docs)),
            ColumnWriter::I64(vals) => Column::I64(pad(vals, num_docs)),
            ColumnWriter::U64(vals) => Column::U64(pad(vals, num_docs)),
            ColumnWriter::F64(vals) => Column::F64(pad(vals, num_docs)),
        }
    }
}

#[derive(Default)]
struct SegmentScratch {
    num_docs: DocId,
    columns: FxHashMap<String, ColumnWriter>,
    postings: FxHashMap<String, BTreeMap<String, Vec<DocId>>>,
}

impl SegmentScratch {
    fn add_document(&mut self, doc: Document) -> crate::Result<DocId> {
        let doc_id = self.num_docs;
        for (field, text) in doc.texts {
            let field_postings = self.postings.entry(field).or_default();
            for token in text.split_whitespace() {
                field_postings
                    .entry(token.to_string())
                    .or_default()
                    .push(doc_id);
            }
        }
        for (field, value) in doc.values {
            let writer = self
                .columns
                .entry(field.clone())
                .or_insert_with(|| ColumnWriter::for_type(ColumnType::for_value(&value)));
            writer.record(&field, doc_id, value)?;
        }
        self.num_docs += 1;
        Ok(doc_id)
    }

    fn seal(self) -> SegmentReader {
        let num_docs = self.num_docs;
        let columns = self
            .columns
            .into_iter()
            .map(|(field, writer)| (field, Arc::new(writer.seal(num_docs as usize))))
            .collect();
        let postings = self
            .postings
            .into_iter()
            .map(|(field, terms)| {
                let terms = terms
                    .into_iter()
                    .map(|(term, docs)| (term, docs.into_iter().dedup().collect()))
                    .collect();
                (field, terms)
            })
            .collect();
        SegmentReader::new(num_docs, columns, postings)
    }
}

/// Builds an in-memory [`Index`], one segment at a time.
///
/// Calling [`commit`](IndexBuilder::commit) seals the documents added since
/// the previous commit into a new segment. Segments are scanned in commit
/// order at search time.
#[derive(Default)]
pub struct IndexBuilder {
    segments: Vec<SegmentReader>,
    current: SegmentScratch,
}

impl IndexBuilder {
    /// Creates an empty index builder.
    pub fn new() -> IndexBuilder {
        IndexBuilder::default()
    }

    /// Adds a document to the segment under construction and returns its
    /// segment-local doc id.
    pub fn add_document(&mut self, doc: Document) -> crate::Result<DocId> {
        self.current.add_document(doc)
    }

    /// Seals the segment under construction. A no-op if no document was
    /// added since the last commit.
    pub fn commit(&mut self) {
        if self.current.num_docs == 0 {
            return;
        }
        let scratch = std::mem::take(&mut self.current);
        info!(
            "sealing segment {} with {} docs",
            self.segments.len(),
            scratch.num_docs
        );
        self.segments.push(scratch.seal());
    }

    /// Commits any pending documents and returns the finished index.
    pub fn build(mut self) -> Index {
        self.commit();
        Index::new(self.segments)
    }
}

#[cfg(test)]
mod tests {
    use super::{Document, IndexBuilder};
    use crate::value::ValueRef;
    use crate::GroupingError;

    #[test]
    fn test_commit_seals_segments() {
        let mut builder = IndexBuilder::new();
        let mut doc = Document::new();
        doc.add_str("author", "1");
        builder.add_document(doc).unwrap();
        builder.commit();
        let mut doc = Document::new();
        doc.add_str("author", "2");
        builder.add_document(doc).unwrap();
        let index = builder.build();
        assert_eq!(index.segments().len(), 2);
        assert_eq!(index.segments()[0].max_doc(), 1);
    }

    #[test]
    fn test_missing_field_reads_as_absent() {
        let mut builder = IndexBuilder::new();
        let mut doc = Document::new();
        doc.add_str("author", "1");
        builder.add_document(doc).unwrap();
        builder.add_document(Document::new()).unwrap();
        let index = builder.build();
        let segment = &index.segments()[0];
        let column = segment.column("author").unwrap();
        assert_eq!(column.value(0), Some(ValueRef::Str("1")));
        assert_eq!(column.value(1), None);
    }

    #[test]
    fn test_column_type_conflict() {
        let mut builder = IndexBuilder::new();
        let mut doc = Document::new();
        doc.add_str("author", "1");
        builder.add_document(doc).unwrap();
        let mut doc = Document::new();
        doc.add_i64("author", 1);
        let err = builder.add_document(doc).unwrap_err();
        assert!(matches!(err, GroupingError::SchemaError(_)));
    }

    #[test]
    fn test_repeated_token_posts_once() {
        let mut builder = IndexBuilder::new();
        let mut doc = Document::new();
        doc.add_text("content", "random text random");
        builder.add_document(doc).unwrap();
        let index = builder.build();
        let segment = &index.segments()[0];
        assert_eq!(segment.postings("content", "random"), Some(&[0u32][..]));
    }
}
