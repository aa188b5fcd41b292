#![warn(missing_docs)]

//! Two-pass result grouping for search indexes.
//!
//! Given a query, the engine first selects the top-N distinct groups of
//! matching documents under a caller-supplied sort, then computes, for each
//! selected group, the set of distinct values of a second field across all
//! matching documents of that group ("group by X, count distinct Y").
//!
//! Both passes stream over the query matches exactly once, and the result
//! does not depend on how the index is split into segments.
//!
//! ```rust
//! use search_grouping::collector::{
//!     DistinctValuesCollector, FirstPassGroupCollector, Sort, TermValueSource,
//! };
//! use search_grouping::index::{Document, IndexBuilder};
//! use search_grouping::query::AllQuery;
//! use search_grouping::OwnedValue;
//!
//! # fn main() -> search_grouping::Result<()> {
//! let mut builder = IndexBuilder::new();
//! let docs: [(Option<&str>, Option<&str>); 6] = [
//!     (Some("1"), Some("1")),
//!     (Some("1"), Some("1")),
//!     (Some("1"), Some("2")),
//!     (None, None),
//!     (Some("3"), Some("1")),
//!     (Some("3"), Some("1")),
//! ];
//! for (author, publisher) in docs {
//!     let mut doc = Document::new();
//!     if let Some(author) = author {
//!         doc.add_str("author", author);
//!     }
//!     if let Some(publisher) = publisher {
//!         doc.add_str("publisher", publisher);
//!     }
//!     builder.add_document(doc)?;
//! }
//! let index = builder.build();
//! let searcher = index.searcher();
//!
//! // Pass 1: select the top groups of the "author" field.
//! let mut first_pass = FirstPassGroupCollector::new(
//!     TermValueSource::new("author"),
//!     Sort::insertion_order(),
//!     10,
//! )?;
//! searcher.search(&AllQuery, &mut first_pass)?;
//! let top_groups = first_pass.top_groups(0, false);
//!
//! // Pass 2: distinct "publisher" values per selected group.
//! let mut distinct = DistinctValuesCollector::new(
//!     top_groups,
//!     TermValueSource::new("author"),
//!     TermValueSource::new("publisher"),
//! );
//! searcher.search(&AllQuery, &mut distinct)?;
//!
//! let groups = distinct.into_groups();
//! assert_eq!(groups.len(), 3);
//! assert_eq!(groups[0].group_value, Some(OwnedValue::from("1")));
//! assert_eq!(groups[0].unique_values.len(), 2);
//! assert_eq!(groups[1].group_value, None);
//! # Ok(())
//! # }
//! ```

pub mod collector;
mod error;
pub mod index;
pub mod query;
mod searcher;
mod value;

pub use crate::collector::Order;
pub use crate::error::GroupingError;
pub use crate::searcher::Searcher;
pub use crate::value::{GroupKey, OwnedValue, ValueRef};

/// A doc id, local to its segment.
pub type DocId = u32;

/// The position of a segment in the index's scan order.
pub type SegmentOrdinal = u32;

/// The crate's result type.
pub type Result<T> = std::result::Result<T, GroupingError>;
