use crate::value::{OwnedValue, ValueRef};
use crate::DocId;

/// The type of the values held by a [`Column`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// UTF-8 string values.
    Str,
    /// Raw byte values.
    Bytes,
    /// Signed 64-bit integers.
    I64,
    /// Unsigned 64-bit integers.
    U64,
    /// 64-bit floats.
    F64,
}

impl ColumnType {
    /// Returns the column type matching a value's domain.
    pub fn for_value(value: &OwnedValue) -> ColumnType {
        match value {
            OwnedValue::Str(_) => ColumnType::Str,
            OwnedValue::Bytes(_) => ColumnType::Bytes,
            OwnedValue::I64(_) => ColumnType::I64,
            OwnedValue::U64(_) => ColumnType::U64,
            OwnedValue::F64(_) => ColumnType::F64,
        }
    }
}

/// A single-valued, optional column over all documents of one segment.
///
/// A slot holding `None` means the document does not carry the field.
#[derive(Debug)]
pub enum Column {
    /// UTF-8 string values.
    Str(Vec<Option<String>>),
    /// Raw byte values.
    Bytes(Vec<Option<Vec<u8>>>),
    /// Signed 64-bit integers.
    I64(Vec<Option<i64>>),
    /// Unsigned 64-bit integers.
    U64(Vec<Option<u64>>),
    /// 64-bit floats.
    F64(Vec<Option<f64>>),
}

impl Column {
    /// The type of the values held by this column.
    pub fn column_type(&self) -> ColumnType {
        match self {
            Column::Str(_) => ColumnType::Str,
            Column::Bytes(_) => ColumnType::Bytes,
            Column::I64(_) => ColumnType::I64,
            Column::U64(_) => ColumnType::U64,
            Column::F64(_) => ColumnType::F64,
        }
    }

    /// Returns the value of `doc`, or `None` if the document does not carry
    /// the field.
    pub fn value(&self, doc: DocId) -> Option<ValueRef<'_>> {
        let doc = doc as usize;
        match self {
            Column::Str(vals) => vals.get(doc)?.as_ref().map(|val| ValueRef::Str(val.as_str())),
            Column::Bytes(vals) => vals
                .get(doc)?
                .as_ref()
                .map(|val| ValueRef::Bytes(val.as_slice())),
            Column::I64(vals) => vals.get(doc).copied().flatten().map(ValueRef::I64),
            Column::U64(vals) => vals.get(doc).copied().flatten().map(ValueRef::U64),
            Column::F64(vals) => vals.get(doc).copied().flatten().map(ValueRef::F64),
        }
    }
}
