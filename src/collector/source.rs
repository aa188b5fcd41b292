//! Value extraction strategies.
//!
//! A [`ValueSource`] resolves, per segment, an accessor mapping a local doc
//! id to a value of the grouping domain. Two strategies exist:
//!
//! - [`TermValueSource`] reads the literal indexed value of a field;
//! - [`FunctionValueSource`] computes a value per document and materializes
//!   it into a reusable [`ValueHolder`].
//!
//! Both honor the same value/ordering contract, so the two passes can mix
//! strategies freely. Accessor views are only valid for the current
//! document: collectors snapshot them into owned values before storing
//! them in any persistent state.

use std::sync::Arc;

use crate::index::{Column, ColumnType, SegmentReader};
use crate::value::{OwnedValue, ValueRef};
use crate::{DocId, GroupingError};

/// A per-segment value extraction strategy.
pub trait ValueSource: Send + Sync {
    /// Resolves an accessor against `segment`.
    ///
    /// Accessors are not valid across segment boundaries; the collectors
    /// call this again on every segment change.
    fn for_segment(&self, segment: &SegmentReader) -> crate::Result<Box<dyn SegmentValueSource>>;
}

/// A resolved accessor over one segment.
pub trait SegmentValueSource {
    /// Returns the value of `doc`, or `None` if the document lacks the
    /// field.
    ///
    /// The returned view is invalidated by the next call; repeated calls
    /// for the same document return equal values.
    fn value(&mut self, doc: DocId) -> crate::Result<Option<ValueRef<'_>>>;
}

impl std::fmt::Debug for dyn SegmentValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn SegmentValueSource")
    }
}

impl ValueSource for Box<dyn ValueSource> {
    fn for_segment(&self, segment: &SegmentReader) -> crate::Result<Box<dyn SegmentValueSource>> {
        self.as_ref().for_segment(segment)
    }
}

/// Term strategy: the value is the literal indexed value of the field,
/// equality is exact (byte-for-byte for the string-like domains).
pub struct TermValueSource {
    field: String,
}

impl TermValueSource {
    /// A term source over the given field.
    pub fn new(field: &str) -> TermValueSource {
        TermValueSource {
            field: field.to_string(),
        }
    }
}

impl ValueSource for TermValueSource {
    fn for_segment(&self, segment: &SegmentReader) -> crate::Result<Box<dyn SegmentValueSource>> {
        let column = segment.column(&self.field).cloned();
        if let Some(column) = &column {
            match column.column_type() {
                ColumnType::Str | ColumnType::Bytes => {}
                other => {
                    return Err(GroupingError::SchemaError(format!(
                        "term source over field '{}' requires an indexed term column, found {:?}",
                        self.field, other
                    )));
                }
            }
        }
        Ok(Box::new(TermSegmentValues { column }))
    }
}

struct TermSegmentValues {
    column: Option<Arc<Column>>,
}

impl SegmentValueSource for TermSegmentValues {
    fn value(&mut self, doc: DocId) -> crate::Result<Option<ValueRef<'_>>> {
        Ok(self.column.as_ref().and_then(|column| column.value(doc)))
    }
}

/// A mutable value holder, reused across documents by the function
/// strategy so that reading a value does not allocate per document.
///
/// `clear` marks the holder as not carrying a value; the buffer of the
/// previous string or bytes value is kept around for reuse.
#[derive(Default)]
pub struct ValueHolder {
    value: Option<OwnedValue>,
    exists: bool,
}

impl ValueHolder {
    /// Creates an empty holder.
    pub fn new() -> ValueHolder {
        ValueHolder::default()
    }

    /// Marks the holder as holding no value.
    pub fn clear(&mut self) {
        self.exists = false;
    }

    /// Sets a string value, reusing the previous buffer when possible.
    pub fn set_str(&mut self, val: &str) {
        match &mut self.value {
            Some(OwnedValue::Str(buf)) => {
                buf.clear();
                buf.push_str(val);
            }
            _ => self.value = Some(OwnedValue::Str(val.to_string())),
        }
        self.exists = true;
    }

    /// Sets a bytes value, reusing the previous buffer when possible.
    pub fn set_bytes(&mut self, val: &[u8]) {
        match &mut self.value {
            Some(OwnedValue::Bytes(buf)) => {
                buf.clear();
                buf.extend_from_slice(val);
            }
            _ => self.value = Some(OwnedValue::Bytes(val.to_vec())),
        }
        self.exists = true;
    }

    /// Sets an i64 value.
    pub fn set_i64(&mut self, val: i64) {
        self.value = Some(OwnedValue::I64(val));
        self.exists = true;
    }

    /// Sets a u64 value.
    pub fn set_u64(&mut self, val: u64) {
        self.value = Some(OwnedValue::U64(val));
        self.exists = true;
    }

    /// Sets an f64 value.
    pub fn set_f64(&mut self, val: f64) {
        self.value = Some(OwnedValue::F64(val));
        self.exists = true;
    }

    /// Returns a view over the held value, if any.
    pub fn get(&self) -> Option<ValueRef<'_>> {
        if self.exists {
            self.value.as_ref().map(OwnedValue::as_value_ref)
        } else {
            None
        }
    }
}

/// Fills the holder with the value of one document.
pub trait FillValue: Send {
    /// Writes `doc`'s value into `holder`. Leaving the holder cleared means
    /// the document has no value.
    fn fill(&mut self, doc: DocId, holder: &mut ValueHolder) -> crate::Result<()>;
}

type Resolver = dyn Fn(&SegmentReader) -> crate::Result<Box<dyn FillValue>> + Send + Sync;

/// Function strategy: values are produced per document by a fill function
/// and materialized into a reusable [`ValueHolder`].
pub struct FunctionValueSource {
    resolver: Arc<Resolver>,
}

impl FunctionValueSource {
    /// A function source backed by an arbitrary per-segment resolver.
    pub fn new<F>(resolver: F) -> FunctionValueSource
    where F: Fn(&SegmentReader) -> crate::Result<Box<dyn FillValue>> + Send + Sync + 'static {
        FunctionValueSource {
            resolver: Arc::new(resolver),
        }
    }

    /// A function source reading a columnar field of any type.
    pub fn from_column(field: &str) -> FunctionValueSource {
        let field = field.to_string();
        FunctionValueSource::new(move |segment| {
            Ok(Box::new(ColumnFill {
                column: segment.column(&field).cloned(),
            }))
        })
    }
}

impl ValueSource for FunctionValueSource {
    fn for_segment(&self, segment: &SegmentReader) -> crate::Result<Box<dyn SegmentValueSource>> {
        Ok(Box::new(FunctionSegmentValues {
            fill: (self.resolver)(segment)?,
            holder: ValueHolder::new(),
        }))
    }
}

struct FunctionSegmentValues {
    fill: Box<dyn FillValue>,
    holder: ValueHolder,
}

impl SegmentValueSource for FunctionSegmentValues {
    fn value(&mut self, doc: DocId) -> crate::Result<Option<ValueRef<'_>>> {
        self.holder.clear();
        self.fill.fill(doc, &mut self.holder)?;
        Ok(self.holder.get())
    }
}

struct ColumnFill {
    column: Option<Arc<Column>>,
}

impl FillValue for ColumnFill {
    fn fill(&mut self, doc: DocId, holder: &mut ValueHolder) -> crate::Result<()> {
        match self.column.as_ref().and_then(|column| column.value(doc)) {
            Some(ValueRef::Str(val)) => holder.set_str(val),
            Some(ValueRef::Bytes(val)) => holder.set_bytes(val),
            Some(ValueRef::I64(val)) => holder.set_i64(val),
            Some(ValueRef::U64(val)) => holder.set_u64(val),
            Some(ValueRef::F64(val)) => holder.set_f64(val),
            None => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{FunctionValueSource, TermValueSource, ValueHolder, ValueSource};
    use crate::index::{Document, IndexBuilder};
    use crate::value::ValueRef;
    use crate::GroupingError;

    #[test]
    fn test_holder_reuses_buffer_and_overwrites() {
        let mut holder = ValueHolder::new();
        holder.set_str("first");
        assert_eq!(holder.get(), Some(ValueRef::Str("first")));
        holder.clear();
        assert_eq!(holder.get(), None);
        holder.set_str("second");
        assert_eq!(holder.get(), Some(ValueRef::Str("second")));
    }

    #[test]
    fn test_term_source_rejects_numeric_column() {
        let mut builder = IndexBuilder::new();
        let mut doc = Document::new();
        doc.add_i64("rating", 3);
        builder.add_document(doc).unwrap();
        let index = builder.build();
        let err = TermValueSource::new("rating")
            .for_segment(&index.segments()[0])
            .unwrap_err();
        assert!(matches!(err, GroupingError::SchemaError(_)));
    }

    #[test]
    fn test_function_source_snapshots_per_doc() {
        let mut builder = IndexBuilder::new();
        for author in ["a", "b"] {
            let mut doc = Document::new();
            doc.add_str("author", author);
            builder.add_document(doc).unwrap();
        }
        let index = builder.build();
        let mut accessor = FunctionValueSource::from_column("author")
            .for_segment(&index.segments()[0])
            .unwrap();
        // The view from doc 0 must be copied before doc 1 is read: the
        // holder's contents change underneath it.
        let first = accessor.value(0).unwrap().map(ValueRef::into_owned);
        let second = accessor.value(1).unwrap().map(ValueRef::into_owned);
        assert_eq!(first, Some("a".into()));
        assert_eq!(second, Some("b".into()));
    }

    #[test]
    fn test_missing_field_is_absent_for_both_strategies() {
        let mut builder = IndexBuilder::new();
        builder.add_document(Document::new()).unwrap();
        let index = builder.build();
        let segment = &index.segments()[0];
        let mut term = TermValueSource::new("author").for_segment(segment).unwrap();
        assert_eq!(term.value(0).unwrap(), None);
        let mut func = FunctionValueSource::from_column("author")
            .for_segment(segment)
            .unwrap();
        assert_eq!(func.value(0).unwrap(), None);
    }
}
