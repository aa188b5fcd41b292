/*!
Defines how the documents matching a search query should be processed.

The two collectors of this crate implement result grouping in two passes
over the same query:

- [`FirstPassGroupCollector`] buckets matches by group key and keeps the
  top-N groups under a [`Sort`] specification;
- [`DistinctValuesCollector`], built from the first pass's snapshot,
  gathers the distinct values of a second field for each selected group.

Both read their keys and values through a [`ValueSource`], the pluggable
value extraction strategy.
*/

mod distinct_values;
mod first_pass;
mod sort_key;
mod source;

pub use self::distinct_values::{DistinctValuesCollector, GroupCount};
pub use self::first_pass::{FirstPassGroupCollector, SearchGroup};
pub use self::sort_key::{Order, Sort, SortField, SortKey};
pub use self::source::{
    FillValue, FunctionValueSource, SegmentValueSource, TermValueSource, ValueHolder, ValueSource,
};

use crate::index::SegmentReader;
use crate::{DocId, SegmentOrdinal};

/// Collectors are in charge of collecting and retaining relevant
/// information from the documents matched by the query.
///
/// The search driver works on multiple segments: it first informs the
/// collector of a change of segment, then calls the `collect` method for
/// every matching document of that segment, in ascending doc id order.
/// Segments are visited in index order, so the sequence of calls is fully
/// deterministic for a fixed index.
pub trait Collector {
    /// `set_segment` is called before enumerating the matches of a segment.
    ///
    /// Accessors resolved against a previous segment are invalid here;
    /// implementations must re-resolve them against `segment`.
    fn set_segment(
        &mut self,
        segment_ord: SegmentOrdinal,
        segment: &SegmentReader,
    ) -> crate::Result<()>;

    /// The driver pushes a matching document via this method.
    fn collect(&mut self, doc: DocId) -> crate::Result<()>;
}
