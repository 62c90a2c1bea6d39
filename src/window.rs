//! Tabserve - Windowing engine
//!
//! Selects a sub-collection of the dataset by prefix, random sample or
//! 1-indexed inclusive range. Inputs are already validated; every boundary
//! case here (empty, truncated, single row) is a normal result, not an error.
//!
//! ```text
//!   1-indexed (HTTP)     start ............ end
//!                          │                  │
//!   0-indexed (store)   [start-1 .. min(end, ceiling))
//! ```

use tracing::debug;

use crate::data::{Dataset, Record};
use crate::error::{QueryError, RangeViolation};
use crate::fault::RandomSource;

/// Validated 1-indexed inclusive bounds, `1 <= start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeRequest {
    start: usize,
    end: usize,
}

impl RangeRequest {
    pub fn new(start: usize, end: usize) -> Result<Self, QueryError> {
        if start == 0 || end == 0 {
            return Err(RangeViolation::NotPositiveInteger.into());
        }
        if start > end {
            return Err(RangeViolation::StartAfterEnd.into());
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }
}

/// Every record, in original order.
pub fn complete(dataset: &Dataset) -> &[Record] {
    dataset.records()
}

/// The first `count` records.
pub fn prefix(dataset: &Dataset, count: usize) -> &[Record] {
    let count = count.min(dataset.len());
    debug!(count, "prefix window");
    &dataset.records()[..count]
}

/// `count` distinct records drawn without replacement, in random order.
pub fn random_sample<'a>(
    dataset: &'a Dataset,
    count: usize,
    rng: &RandomSource,
) -> Vec<&'a Record> {
    let records = dataset.records();
    let picked: Vec<&Record> = rng
        .sample_indices(records.len(), count)
        .into_iter()
        .map(|i| &records[i])
        .collect();
    debug!(count = picked.len(), "random window");
    picked
}

/// Records `start..=end` (1-indexed), limited to the first `max_rows` rows.
///
/// `max_rows` of `None` means the whole dataset is eligible. A window that
/// starts past the ceiling is empty; one that ends past it is truncated.
pub fn ranged(dataset: &Dataset, range: RangeRequest, max_rows: Option<usize>) -> &[Record] {
    let records = dataset.records();
    let ceiling = max_rows.unwrap_or(records.len()).min(records.len());

    if range.start > ceiling {
        debug!(start = range.start, ceiling, "range starts beyond ceiling");
        return &[];
    }

    let last = range.end.min(ceiling);
    debug!(start = range.start, end = range.end, last, "ranged window");
    &records[range.start - 1..last]
}
