//! First pass: select the top-N groups among the matching documents.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::collector::sort_key::{CandidateRank, SegmentSortKeyReader};
use crate::collector::{Collector, SegmentValueSource, Sort, SortKey, ValueSource};
use crate::index::SegmentReader;
use crate::value::{GroupKey, ValueRef};
use crate::{DocId, GroupingError, SegmentOrdinal};

/// A group selected by the first pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchGroup {
    /// The group's key; `None` is the group of documents lacking the field.
    pub group_value: GroupKey,
    /// The representative sort values, filled on request in
    /// [`FirstPassGroupCollector::top_groups`].
    pub sort_key: Option<SortKey>,
}

struct TrackedGroup {
    rank: CandidateRank,
    group_value: GroupKey,
}

impl PartialEq for TrackedGroup {
    fn eq(&self, other: &TrackedGroup) -> bool {
        self.rank == other.rank
    }
}

impl Eq for TrackedGroup {}

impl Ord for TrackedGroup {
    fn cmp(&self, other: &TrackedGroup) -> Ordering {
        self.rank.cmp(&other.rank)
    }
}

impl PartialOrd for TrackedGroup {
    fn partial_cmp(&self, other: &TrackedGroup) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

struct SegmentState {
    values: Box<dyn SegmentValueSource>,
    sort_reader: SegmentSortKeyReader,
}

/// Single scan over the query matches, bucketing documents by group key and
/// keeping a bounded top-N set of groups under the [`Sort`] specification.
///
/// A group's comparison rank is fixed when its key is first observed; later
/// documents of the same key never alter first-pass state. A group that was
/// compared against a full top-N and lost is remembered as rejected for the
/// rest of the scan.
///
/// The top-N structure is a `BinaryHeap` with the worst tracked group on
/// top, so collecting `N` groups out of `n` matches is `O(n log N)`.
pub struct FirstPassGroupCollector {
    group_source: Box<dyn ValueSource>,
    sort: Sort,
    top_n: usize,
    seen: FxHashSet<GroupKey>,
    heap: BinaryHeap<TrackedGroup>,
    next_seq: u64,
    next_base_doc: DocId,
    segment: Option<SegmentState>,
}

impl std::fmt::Debug for FirstPassGroupCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirstPassGroupCollector")
            .finish_non_exhaustive()
    }
}

impl FirstPassGroupCollector {
    /// Creates a first-pass collector keeping `top_n` groups.
    ///
    /// An empty `sort` keeps groups in first-seen order. Fails with
    /// `InvalidArgument` if `top_n < 1`.
    pub fn new(
        group_source: impl ValueSource + 'static,
        sort: Sort,
        top_n: usize,
    ) -> crate::Result<FirstPassGroupCollector> {
        if top_n < 1 {
            return Err(GroupingError::InvalidArgument(
                "top_n must be at least 1".to_string(),
            ));
        }
        Ok(FirstPassGroupCollector {
            group_source: Box::new(group_source),
            sort,
            top_n,
            seen: FxHashSet::default(),
            heap: BinaryHeap::with_capacity(top_n),
            next_seq: 0,
            next_base_doc: 0,
            segment: None,
        })
    }

    /// True if `top_n` groups are currently tracked.
    pub fn at_capacity(&self) -> bool {
        self.heap.len() >= self.top_n
    }

    /// Returns the tracked groups sorted by the sort specification, with
    /// the first `offset` entries skipped.
    ///
    /// This finalizes the pass: the returned sequence is a pure snapshot,
    /// and the collector's candidate state is discarded. An `offset` beyond
    /// the tracked count yields an empty sequence. Sort keys are only
    /// carried over when `fill_sort_key` is set.
    pub fn top_groups(self, offset: usize, fill_sort_key: bool) -> Vec<SearchGroup> {
        // Max-heap with worst on top: the ascending sorted order is best
        // first, which is the output order.
        self.heap
            .into_sorted_vec()
            .into_iter()
            .skip(offset)
            .map(|tracked| SearchGroup {
                group_value: tracked.group_value,
                sort_key: if fill_sort_key {
                    Some(SortKey(tracked.rank.into_sort_values()))
                } else {
                    None
                },
            })
            .collect()
    }
}

impl Collector for FirstPassGroupCollector {
    fn set_segment(
        &mut self,
        _segment_ord: SegmentOrdinal,
        segment: &SegmentReader,
    ) -> crate::Result<()> {
        let base_doc = self.next_base_doc;
        self.next_base_doc += segment.max_doc();
        self.segment = Some(SegmentState {
            values: self.group_source.for_segment(segment)?,
            sort_reader: self.sort.resolve(segment, base_doc)?,
        });
        Ok(())
    }

    fn collect(&mut self, doc: DocId) -> crate::Result<()> {
        let state = self.segment.as_mut().ok_or_else(|| {
            GroupingError::InvalidArgument("collect called before set_segment".to_string())
        })?;
        let group_value: GroupKey = state.values.value(doc)?.map(ValueRef::into_owned);
        if self.seen.contains(&group_value) {
            // Tracked or previously rejected: first-seen rank stands.
            return Ok(());
        }
        let rank = CandidateRank {
            slots: state.sort_reader.rank_slots(doc),
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.seen.insert(group_value.clone());
        if !self.at_capacity() {
            self.heap.push(TrackedGroup { rank, group_value });
        } else if let Some(mut worst) = self.heap.peek_mut() {
            if rank < worst.rank {
                *worst = TrackedGroup { rank, group_value };
            }
        }
        Ok(())
    }
}
