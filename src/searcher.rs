use log::debug;

use crate::collector::Collector;
use crate::index::Index;
use crate::query::Query;
use crate::SegmentOrdinal;

/// The search driver.
///
/// For each segment, in index order, the searcher informs the collector of
/// the segment change and then pushes every matching document in ascending
/// doc id order:
///
/// - `.set_segment(0, segment_reader_0)`
/// - `.collect(doc0_of_segment_0)`
/// - `.collect(...)`
/// - `.set_segment(1, segment_reader_1)`
/// - `.collect(doc0_of_segment_1)`
/// - `...`
///
/// Running the two grouping passes means calling [`search`](Searcher::search)
/// twice against the same searcher, once per collector.
pub struct Searcher<'a> {
    index: &'a Index,
}

impl<'a> Searcher<'a> {
    pub(crate) fn new(index: &'a Index) -> Searcher<'a> {
        Searcher { index }
    }

    /// Executes `query` and pushes every match to `collector`.
    pub fn search<Q, C>(&self, query: &Q, collector: &mut C) -> crate::Result<()>
    where
        Q: Query + ?Sized,
        C: Collector,
    {
        for (segment_ord, segment) in self.index.segments().iter().enumerate() {
            collector.set_segment(segment_ord as SegmentOrdinal, segment)?;
            let docs = query.matching_docs(segment)?;
            debug!("segment {}: {} matching docs", segment_ord, docs.len());
            for doc in docs {
                collector.collect(doc)?;
            }
        }
        Ok(())
    }
}
