//! The sort specification: how two groups' representative documents are
//! compared when selecting the top-N groups.

use std::cmp::Ordering;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::index::{Column, ColumnType, SegmentReader};
use crate::value::{GroupKey, OwnedValue, ValueRef};
use crate::{DocId, GroupingError};

/// Sort order, ascending or descending.
///
/// A descending field reverses the whole per-slot comparison, including the
/// position of documents lacking the field: absent sorts first ascending,
/// last descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Order {
    /// Ascending order, absent values first.
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

#[derive(Debug, Clone)]
enum SortBy {
    Column { field: String, typ: ColumnType },
    DocId,
}

/// One field of a [`Sort`]: what to read, and in which direction.
#[derive(Debug, Clone)]
pub struct SortField {
    by: SortBy,
    order: Order,
}

impl SortField {
    /// Sorts by a columnar field of the declared type.
    ///
    /// The declared type is checked against the column actually stored in
    /// each segment when the scan enters it; a mismatch is an
    /// `InvalidArgument` error, not a per-document condition.
    pub fn by_column(field: &str, typ: ColumnType, order: Order) -> SortField {
        SortField {
            by: SortBy::Column {
                field: field.to_string(),
                typ,
            },
            order,
        }
    }

    /// Sorts by global doc id (segment scan order).
    pub fn by_doc_id(order: Order) -> SortField {
        SortField {
            by: SortBy::DocId,
            order,
        }
    }
}

/// An ordered list of [`SortField`]s.
///
/// Fields are compared in specification order; the first non-equal slot
/// decides. Full equality falls back to first-seen order, which for a
/// single query execution is ascending global doc id.
#[derive(Debug, Clone, Default)]
pub struct Sort {
    fields: Vec<SortField>,
}

impl Sort {
    /// A sort over the given fields.
    pub fn new(fields: Vec<SortField>) -> Sort {
        Sort { fields }
    }

    /// The empty sort: groups are kept in the order their first document
    /// was seen.
    pub fn insertion_order() -> Sort {
        Sort::default()
    }

    /// Resolves the sort's per-document readers against a segment.
    ///
    /// `base_doc` is the number of documents in all previously scanned
    /// segments; it globalizes doc ids for [`SortField::by_doc_id`] slots.
    pub(crate) fn resolve(
        &self,
        segment: &SegmentReader,
        base_doc: DocId,
    ) -> crate::Result<SegmentSortKeyReader> {
        let mut slots = Vec::with_capacity(self.fields.len());
        for sort_field in &self.fields {
            let slot = match &sort_field.by {
                SortBy::Column { field, typ } => {
                    let column = segment.column(field).cloned();
                    if let Some(column) = &column {
                        if column.column_type() != *typ {
                            return Err(GroupingError::InvalidArgument(format!(
                                "sort field '{}' declared as {:?} but the segment stores {:?}",
                                field,
                                typ,
                                column.column_type()
                            )));
                        }
                    }
                    SlotReader::Column {
                        column,
                        order: sort_field.order,
                    }
                }
                SortBy::DocId => SlotReader::DocId {
                    base: base_doc,
                    order: sort_field.order,
                },
            };
            slots.push(slot);
        }
        Ok(SegmentSortKeyReader { slots })
    }
}

pub(crate) enum SlotReader {
    Column {
        column: Option<Arc<Column>>,
        order: Order,
    },
    DocId {
        base: DocId,
        order: Order,
    },
}

/// Reads a document's rank slots within one segment.
pub(crate) struct SegmentSortKeyReader {
    slots: Vec<SlotReader>,
}

impl std::fmt::Debug for SegmentSortKeyReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentSortKeyReader").finish_non_exhaustive()
    }
}

impl SegmentSortKeyReader {
    pub(crate) fn rank_slots(&self, doc: DocId) -> Vec<RankSlot> {
        self.slots
            .iter()
            .map(|slot| match slot {
                SlotReader::Column { column, order } => RankSlot {
                    value: column
                        .as_ref()
                        .and_then(|column| column.value(doc))
                        .map(ValueRef::into_owned),
                    order: *order,
                },
                SlotReader::DocId { base, order } => RankSlot {
                    value: Some(OwnedValue::U64(u64::from(base + doc))),
                    order: *order,
                },
            })
            .collect()
    }
}

/// One slot of a candidate's comparison key, with the direction baked in so
/// the ordering is pure data and usable inside a heap.
#[derive(Debug, Clone)]
pub(crate) struct RankSlot {
    pub(crate) value: GroupKey,
    pub(crate) order: Order,
}

// Equality ignores the direction, keeping `eq` consistent with
// `cmp(..) == Equal` whatever the slots' orders.
impl PartialEq for RankSlot {
    fn eq(&self, other: &RankSlot) -> bool {
        self.value == other.value
    }
}

impl Eq for RankSlot {}

impl Ord for RankSlot {
    fn cmp(&self, other: &RankSlot) -> Ordering {
        // Option's ordering puts None first, which is the absent-first rule.
        let natural = self.value.cmp(&other.value);
        match self.order {
            Order::Asc => natural,
            Order::Desc => natural.reverse(),
        }
    }
}

impl PartialOrd for RankSlot {
    fn partial_cmp(&self, other: &RankSlot) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A candidate group's full comparison key: the sort slots of its
/// first-seen document, tie-broken by first-seen sequence number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CandidateRank {
    pub(crate) slots: Vec<RankSlot>,
    pub(crate) seq: u64,
}

impl CandidateRank {
    pub(crate) fn into_sort_values(self) -> Vec<GroupKey> {
        self.slots.into_iter().map(|slot| slot.value).collect()
    }
}

impl Ord for CandidateRank {
    fn cmp(&self, other: &CandidateRank) -> Ordering {
        self.slots
            .cmp(&other.slots)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for CandidateRank {
    fn partial_cmp(&self, other: &CandidateRank) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The sort values of a selected group's representative document, one slot
/// per [`SortField`], without direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortKey(pub Vec<GroupKey>);
