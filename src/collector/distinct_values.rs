//! Second pass: gather the distinct count-field values of each selected
//! group.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

use crate::collector::{Collector, SearchGroup, SegmentValueSource, ValueSource};
use crate::index::SegmentReader;
use crate::value::{GroupKey, ValueRef};
use crate::{DocId, GroupingError, SegmentOrdinal};

/// A selected group together with the distinct count-field values observed
/// across its matching documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupCount {
    /// The group's key.
    pub group_value: GroupKey,
    /// The distinct count-field values; `None` is the value of documents
    /// lacking the count field. Iteration order is unspecified.
    pub unique_values: FxHashSet<GroupKey>,
}

struct SegmentState {
    group_values: Box<dyn SegmentValueSource>,
    count_values: Box<dyn SegmentValueSource>,
}

/// Second scan over the query matches, parameterized by the first pass's
/// snapshot.
///
/// Documents whose group key was not selected by the first pass are
/// skipped; that is the expected common case, not an error. A selected
/// group that receives no match keeps an empty value set, which is a legal
/// outcome when the two passes run different queries.
pub struct DistinctValuesCollector {
    group_source: Box<dyn ValueSource>,
    count_source: Box<dyn ValueSource>,
    groups: Vec<GroupCount>,
    index_by_key: FxHashMap<GroupKey, usize>,
    segment: Option<SegmentState>,
}

impl DistinctValuesCollector {
    /// Creates a second-pass collector over the groups selected by the
    /// first pass, preserving their order.
    pub fn new(
        selected: Vec<SearchGroup>,
        group_source: impl ValueSource + 'static,
        count_source: impl ValueSource + 'static,
    ) -> DistinctValuesCollector {
        let mut groups = Vec::with_capacity(selected.len());
        let mut index_by_key = FxHashMap::default();
        for (ord, search_group) in selected.into_iter().enumerate() {
            index_by_key.insert(search_group.group_value.clone(), ord);
            groups.push(GroupCount {
                group_value: search_group.group_value,
                unique_values: FxHashSet::default(),
            });
        }
        DistinctValuesCollector {
            group_source: Box::new(group_source),
            count_source: Box::new(count_source),
            groups,
            index_by_key,
            segment: None,
        }
    }

    /// The per-group distinct value sets, in first-pass order.
    pub fn groups(&self) -> &[GroupCount] {
        &self.groups
    }

    /// Consumes the collector and returns the per-group distinct value
    /// sets, in first-pass order.
    pub fn into_groups(self) -> Vec<GroupCount> {
        self.groups
    }
}

impl Collector for DistinctValuesCollector {
    fn set_segment(
        &mut self,
        _segment_ord: SegmentOrdinal,
        segment: &SegmentReader,
    ) -> crate::Result<()> {
        self.segment = Some(SegmentState {
            group_values: self.group_source.for_segment(segment)?,
            count_values: self.count_source.for_segment(segment)?,
        });
        Ok(())
    }

    fn collect(&mut self, doc: DocId) -> crate::Result<()> {
        let state = self.segment.as_mut().ok_or_else(|| {
            GroupingError::InvalidArgument("collect called before set_segment".to_string())
        })?;
        let group_value: GroupKey = state.group_values.value(doc)?.map(ValueRef::into_owned);
        let Some(&ord) = self.index_by_key.get(&group_value) else {
            return Ok(());
        };
        // Snapshot before insertion: the accessor's view does not survive
        // the next document.
        let count_value: GroupKey = state.count_values.value(doc)?.map(ValueRef::into_owned);
        self.groups[ord].unique_values.insert(count_value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rustc_hash::FxHashSet;

    use super::DistinctValuesCollector;
    use crate::collector::{FirstPassGroupCollector, Sort, TermValueSource};
    use crate::index::{Document, Index, IndexBuilder};
    use crate::query::{AllQuery, TermQuery};
    use crate::value::{GroupKey, OwnedValue};

    fn fixture_index() -> Index {
        let fixtures: [(Option<&str>, Option<&str>); 6] = [
            (Some("1"), Some("1")),
            (Some("1"), Some("1")),
            (Some("1"), Some("2")),
            (None, None),
            (Some("3"), Some("1")),
            (Some("3"), Some("1")),
        ];
        let mut builder = IndexBuilder::new();
        for (author, publisher) in fixtures {
            let mut doc = Document::new();
            doc.add_text("content", "random text");
            if let Some(author) = author {
                doc.add_str("author", author);
            }
            if let Some(publisher) = publisher {
                doc.add_str("publisher", publisher);
            }
            builder.add_document(doc).unwrap();
        }
        builder.build()
    }

    fn value_set(values: &[Option<&str>]) -> FxHashSet<GroupKey> {
        values
            .iter()
            .map(|value| value.map(OwnedValue::from))
            .collect()
    }

    #[test]
    fn test_distinct_values_per_group() {
        let index = fixture_index();
        let searcher = index.searcher();
        let mut first_pass = FirstPassGroupCollector::new(
            TermValueSource::new("author"),
            Sort::insertion_order(),
            10,
        )
        .unwrap();
        searcher.search(&AllQuery, &mut first_pass).unwrap();
        let mut collector = DistinctValuesCollector::new(
            first_pass.top_groups(0, false),
            TermValueSource::new("author"),
            TermValueSource::new("publisher"),
        );
        searcher.search(&AllQuery, &mut collector).unwrap();

        let groups = collector.into_groups();
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].group_value, Some(OwnedValue::from("1")));
        assert_eq!(
            groups[0].unique_values,
            value_set(&[Some("1"), Some("2")])
        );
        assert_eq!(groups[1].group_value, None);
        assert_eq!(groups[1].unique_values, value_set(&[None]));
        assert_eq!(groups[2].group_value, Some(OwnedValue::from("3")));
        assert_eq!(groups[2].unique_values, value_set(&[Some("1")]));
    }

    #[test]
    fn test_unselected_groups_are_skipped() {
        let index = fixture_index();
        let searcher = index.searcher();
        let mut first_pass = FirstPassGroupCollector::new(
            TermValueSource::new("author"),
            Sort::insertion_order(),
            1,
        )
        .unwrap();
        searcher.search(&AllQuery, &mut first_pass).unwrap();
        let mut collector = DistinctValuesCollector::new(
            first_pass.top_groups(0, false),
            TermValueSource::new("author"),
            TermValueSource::new("publisher"),
        );
        searcher.search(&AllQuery, &mut collector).unwrap();

        let groups = collector.into_groups();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].group_value, Some(OwnedValue::from("1")));
    }

    #[test]
    fn test_group_without_pass_two_match_keeps_empty_set() {
        let index = fixture_index();
        let searcher = index.searcher();
        let mut first_pass = FirstPassGroupCollector::new(
            TermValueSource::new("author"),
            Sort::insertion_order(),
            10,
        )
        .unwrap();
        searcher.search(&AllQuery, &mut first_pass).unwrap();
        let mut collector = DistinctValuesCollector::new(
            first_pass.top_groups(0, false),
            TermValueSource::new("author"),
            TermValueSource::new("publisher"),
        );
        // A different query in pass 2: no document matches at all.
        searcher
            .search(&TermQuery::new("content", "nothing"), &mut collector)
            .unwrap();

        for group in collector.groups() {
            assert!(group.unique_values.is_empty());
        }
    }

    #[test]
    fn test_dedup_law() {
        let mut values: FxHashSet<GroupKey> = FxHashSet::default();
        for _ in 0..100 {
            values.insert(Some(OwnedValue::from("1")));
            values.insert(None);
        }
        assert_eq!(values.len(), 2);
    }
}
